pub mod m202601120001_create_supervisors;
pub mod m202601120002_create_students;
pub mod m202601120003_create_admins;
pub mod m202601120004_create_projects;
pub mod m202601120005_create_tasks;
pub mod m202601120006_create_task_submissions;
pub mod m202601120007_create_task_status_updates;
pub mod m202601120008_create_project_status_updates;
pub mod m202601120009_create_schedules;
pub mod m202601120010_create_notifications;
pub mod m202601120011_create_refresh_tokens;
