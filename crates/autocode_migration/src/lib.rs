pub use sea_orm_migration::prelude::*;

mod m20240801_000001_create_auto_code_history;
mod m20240801_000002_create_system_registrations;
mod m20240905_000001_add_api_ids;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240801_000001_create_auto_code_history::Migration),
            Box::new(m20240801_000002_create_system_registrations::Migration),
            Box::new(m20240905_000001_add_api_ids::Migration),
        ]
    }
}
