use crate::{Config, NativeError, Params, RowNames, Value};

/// Entry point of a backend implementation.
pub trait Driver {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn connect(&self, config: &Config) -> Result<Box<dyn NativeConnection>, NativeError>;
}

/// Live connection owned by a [`Database`](crate::Database).
///
/// Implementations report raw failures, classification and retries happen above them.
pub trait NativeConnection {
    /// Runs one statement. Named parameters appear in `sql` as `:name`, positional ones as `?`.
    fn execute(&mut self, sql: &str, params: &Params) -> Result<Box<dyn NativeRows>, NativeError>;

    fn last_insert_id(&self) -> Option<i64>;
}

/// Rows produced by one statement, forward only.
pub trait NativeRows {
    fn labels(&self) -> RowNames;

    fn next_row(&mut self) -> Result<Option<Box<[Value]>>, NativeError>;

    fn rows_affected(&self) -> u64;
}

/// Rows of a statement that returns nothing.
#[derive(Default, Debug)]
pub struct NoRows {
    pub rows_affected: u64,
}

impl NativeRows for NoRows {
    fn labels(&self) -> RowNames {
        RowNames::from([])
    }

    fn next_row(&mut self) -> Result<Option<Box<[Value]>>, NativeError> {
        Ok(None)
    }

    fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}
