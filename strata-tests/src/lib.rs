mod conditions;
mod pagination;
mod registry;
mod simple;
mod transaction;
mod upsert;

use crate::{
    conditions::{conditions, joins},
    pagination::pagination,
    registry::registry,
    simple::simple,
    transaction::{savepoints, transaction},
    upsert::upsert,
};
use log::LevelFilter;
use std::{env, rc::Rc};
use strata_core::Database;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs every group against a live database, the driver decides which optional features it
/// opts out of.
pub fn execute_tests(database: Rc<Database>) {
    simple(&database);
    conditions(&database);
    joins(&database);
    upsert(&database);
    transaction(&database);
    savepoints(&database);
    pagination(&database);
    registry(&database);
}

/// Drops and creates `table`, the columns are portable DDL.
pub(crate) fn recreate(database: &Database, table: &str, columns: &str) {
    database
        .execute_sql(&format!("DROP TABLE IF EXISTS {}", table))
        .unwrap_or_else(|e| panic!("Failed to drop {}: {:#}", table, e));
    database
        .execute_sql(&format!("CREATE TABLE {} ({})", table, columns))
        .unwrap_or_else(|e| panic!("Failed to create {}: {:#}", table, e));
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
