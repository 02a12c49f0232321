use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202601120001_create_supervisors::Migration),
            Box::new(migrations::m202601120002_create_students::Migration),
            Box::new(migrations::m202601120003_create_admins::Migration),
            Box::new(migrations::m202601120004_create_projects::Migration),
            Box::new(migrations::m202601120005_create_tasks::Migration),
            Box::new(migrations::m202601120006_create_task_submissions::Migration),
            Box::new(migrations::m202601120007_create_task_status_updates::Migration),
            Box::new(migrations::m202601120008_create_project_status_updates::Migration),
            Box::new(migrations::m202601120009_create_schedules::Migration),
            Box::new(migrations::m202601120010_create_notifications::Migration),
            Box::new(migrations::m202601120011_create_refresh_tokens::Migration),
        ]
    }
}
