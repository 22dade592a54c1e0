pub use sea_orm_migration::prelude::*;

mod m20260505_093000_add_users_table;
mod m20260505_131500_add_alert_tables;
mod m20260512_101200_add_alert_investigations;
mod m20260519_114500_add_case_tables;
mod m20260526_090100_add_log_management;
mod m20260602_150000_seed_reference_data;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260505_093000_add_users_table::Migration),
            Box::new(m20260505_131500_add_alert_tables::Migration),
            Box::new(m20260512_101200_add_alert_investigations::Migration),
            Box::new(m20260519_114500_add_case_tables::Migration),
            Box::new(m20260526_090100_add_log_management::Migration),
            Box::new(m20260602_150000_seed_reference_data::Migration),
        ]
    }
}
