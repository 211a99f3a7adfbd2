//! Synchronous SQL statement compiler and resilient connection layer.
//!
//! Statements are built with [`Query`] and compiled for MySQL, PostgreSQL or SQLite. A
//! [`Database`] runs them through a native driver, recovering from deadlocks and lost
//! connections. The sqlite driver ships behind the default `sqlite` feature.
//!
//! ```rust
//! use strata::{Conditional, Dialect, Query, StatementKind};
//! let sql = Query::new(Dialect::MySql)
//!     .table("orders o")
//!     .columns("o.id")
//!     .where_in("o.status", ["new", "paid"])
//!     .sql(StatementKind::Select)
//!     .unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT `o`.`id` FROM `orders` AS `o` WHERE (`o`.`status` IN ('new', 'paid'))"
//! );
//! ```

pub use strata_core::*;

#[cfg(feature = "sqlite")]
pub use strata_sqlite as sqlite;

/// Opens a database from its url, picking the driver from the scheme.
#[cfg(feature = "sqlite")]
pub fn connect(url: &str) -> Result<Database> {
    let config = Config::new(url)?;
    match config.dialect {
        Dialect::Sqlite => Database::connect(sqlite::SqliteDriver::new(), config),
        dialect => {
            let error = DatabaseError::configuration(format!(
                "No driver bundled for {}, connect through Database::connect",
                dialect
            ));
            log::error!("{}", error);
            Err(error.into())
        }
    }
}
