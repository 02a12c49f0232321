pub mod admin;
pub mod notification;
pub mod project;
pub mod project_status_update;
pub mod refresh_token;
pub mod schedule;
pub mod student;
pub mod supervisor;
pub mod task;
pub mod task_status_update;
pub mod task_submission;

pub use admin::Entity as Admin;
pub use notification::Entity as Notification;
pub use project::Entity as Project;
pub use project_status_update::Entity as ProjectStatusUpdate;
pub use schedule::Entity as Schedule;
pub use student::Entity as Student;
pub use supervisor::Entity as Supervisor;
pub use task::Entity as Task;
pub use task_status_update::Entity as TaskStatusUpdate;
pub use task_submission::Entity as TaskSubmission;
