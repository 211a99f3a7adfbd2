use libsqlite3_sys::*;
use std::{
    ffi::{CStr, c_int},
    slice,
};
use strata_core::{NativeError, Value};

/// Value of column `index` in the current row.
///
/// # Safety
/// `statement` must point to a statement positioned on a row.
pub(crate) unsafe fn extract_value(
    statement: *mut sqlite3_stmt,
    index: c_int,
) -> Result<Value, NativeError> {
    unsafe {
        let column_type = sqlite3_column_type(statement, index);
        Ok(match column_type {
            SQLITE_NULL => Value::Null,
            SQLITE_INTEGER => Value::Int(sqlite3_column_int64(statement, index)),
            SQLITE_FLOAT => Value::Float(sqlite3_column_double(statement, index)),
            SQLITE_BLOB => {
                let ptr = sqlite3_column_blob(statement, index) as *const u8;
                let len = sqlite3_column_bytes(statement, index) as usize;
                if ptr.is_null() {
                    Value::Blob(Box::new([]))
                } else {
                    Value::Blob(slice::from_raw_parts(ptr, len).into())
                }
            }
            SQLITE_TEXT => {
                let ptr = sqlite3_column_text(statement, index);
                let len = sqlite3_column_bytes(statement, index) as usize;
                if ptr.is_null() {
                    Value::Varchar(String::new())
                } else {
                    let bytes = slice::from_raw_parts(ptr, len);
                    Value::Varchar(String::from_utf8_lossy(bytes).into_owned())
                }
            }
            _ => {
                return Err(NativeError::new(
                    SQLITE_MISMATCH.to_string(),
                    format!("Unexpected column type {}", column_type),
                ));
            }
        })
    }
}

/// Label of column `index`.
///
/// # Safety
/// `statement` must point to a prepared statement.
pub(crate) unsafe fn extract_name(statement: *mut sqlite3_stmt, index: c_int) -> String {
    unsafe {
        let name = sqlite3_column_name(statement, index);
        if name.is_null() {
            return String::new();
        }
        CStr::from_ptr(name).to_string_lossy().into_owned()
    }
}
