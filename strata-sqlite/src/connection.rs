use crate::{CBox, SqliteRows, bind::bind_params, error_message_from_ptr};
use libsqlite3_sys::*;
use std::{
    ffi::{CStr, CString},
    ptr,
};
use strata_core::{NativeConnection, NativeError, NativeRows, NoRows, Params, truncate_long};

// Missing from libsqlite3-sys's pre-generated bundled bindings; the symbol is
// provided by the bundled SQLite library.
unsafe extern "C" {
    fn sqlite3_close_v2(db: *mut sqlite3) -> std::os::raw::c_int;
}

pub struct SqliteConnection {
    pub(crate) connection: CBox<sqlite3>,
}

impl SqliteConnection {
    /// Opens `filename`, a path or a `file:` uri.
    pub fn open(filename: &str, flags: i32) -> Result<Self, NativeError> {
        let filename = CString::new(filename).map_err(|e| {
            NativeError::new(
                SQLITE_MISUSE.to_string(),
                format!("Invalid database file name: {}", e),
            )
        })?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close_v2(p);
        });
        let rc = unsafe { sqlite3_open_v2(filename.as_ptr(), &mut *connection, flags, ptr::null()) };
        if rc != SQLITE_OK {
            let message = if connection.is_null() {
                "Out of memory".to_string()
            } else {
                unsafe { error_message_from_ptr(&sqlite3_errmsg(*connection)) }
            };
            return Err(NativeError::new(
                rc.to_string(),
                format!(
                    "Cannot open `{}`: {}",
                    filename.to_string_lossy(),
                    message
                ),
            ));
        }
        unsafe {
            sqlite3_extended_result_codes(*connection, 1);
        }
        Ok(Self { connection })
    }

    fn error(&self, context: &str) -> NativeError {
        unsafe {
            NativeError::new(
                sqlite3_extended_errcode(*self.connection).to_string(),
                format!(
                    "{}: {}",
                    context,
                    error_message_from_ptr(&sqlite3_errmsg(*self.connection))
                ),
            )
        }
    }
}

impl NativeConnection for SqliteConnection {
    fn execute(&mut self, sql: &str, params: &Params) -> Result<Box<dyn NativeRows>, NativeError> {
        let query = CString::new(sql).map_err(|e| {
            NativeError::new(
                SQLITE_MISUSE.to_string(),
                format!("Could not create a CString from the query: {}", e),
            )
        })?;
        let mut statement = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_finalize(p);
        });
        let mut tail = ptr::null();
        let rc = unsafe {
            sqlite3_prepare_v2(
                *self.connection,
                query.as_ptr(),
                -1,
                &mut *statement,
                &mut tail,
            )
        };
        if rc != SQLITE_OK {
            return Err(self.error(&format!(
                "While preparing the query `{}`",
                truncate_long!(sql)
            )));
        }
        if !tail.is_null() {
            let rest = unsafe { CStr::from_ptr(tail) }.to_string_lossy();
            if !rest.trim_matches(|c: char| c.is_whitespace() || c == ';').is_empty() {
                return Err(NativeError::new(
                    SQLITE_MISUSE.to_string(),
                    "Cannot prepare more than one statement at a time",
                ));
            }
        }
        if statement.is_null() {
            // Only comments or whitespace
            return Ok(Box::new(NoRows::default()));
        }
        bind_params(*statement, params)?;
        Ok(Box::new(SqliteRows::start(statement)?))
    }

    fn last_insert_id(&self) -> Option<i64> {
        let id = unsafe { sqlite3_last_insert_rowid(*self.connection) };
        (id != 0).then_some(id)
    }
}
