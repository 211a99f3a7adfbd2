use crate::{
    CBox, error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use libsqlite3_sys::*;
use strata_core::{NativeError, NativeRows, Row, RowNames};

/// Rows of a running statement.
///
/// The first step runs when the statement is executed so writes (and their failures) happen
/// before the caller gets the rows.
pub struct SqliteRows {
    statement: CBox<sqlite3_stmt>,
    labels: RowNames,
    pending: Option<Row>,
    done: bool,
    rows_affected: u64,
}

impl SqliteRows {
    pub(crate) fn start(statement: CBox<sqlite3_stmt>) -> Result<Self, NativeError> {
        let labels = unsafe {
            let count = sqlite3_column_count(*statement);
            (0..count).map(|i| extract_name(*statement, i)).collect()
        };
        let mut result = Self {
            statement,
            labels,
            pending: None,
            done: false,
            rows_affected: 0,
        };
        result.pending = result.step()?;
        unsafe {
            if sqlite3_stmt_readonly(*result.statement) == 0 {
                let db = sqlite3_db_handle(*result.statement);
                result.rows_affected = sqlite3_changes64(db).max(0) as u64;
            }
        }
        Ok(result)
    }

    fn step(&mut self) -> Result<Option<Row>, NativeError> {
        if self.done {
            return Ok(None);
        }
        unsafe {
            let statement = *self.statement;
            match sqlite3_step(statement) {
                SQLITE_ROW => {
                    let count = self.labels.len() as i32;
                    let values = (0..count)
                        .map(|i| extract_value(statement, i))
                        .collect::<Result<Row, _>>()?;
                    Ok(Some(values))
                }
                SQLITE_DONE => {
                    self.done = true;
                    Ok(None)
                }
                _ => {
                    self.done = true;
                    let db = sqlite3_db_handle(statement);
                    Err(NativeError::new(
                        sqlite3_extended_errcode(db).to_string(),
                        error_message_from_ptr(&sqlite3_errmsg(db)),
                    ))
                }
            }
        }
    }
}

impl NativeRows for SqliteRows {
    fn labels(&self) -> RowNames {
        self.labels.clone()
    }

    fn next_row(&mut self) -> Result<Option<Row>, NativeError> {
        if let Some(row) = self.pending.take() {
            return Ok(Some(row));
        }
        self.step()
    }

    fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}
