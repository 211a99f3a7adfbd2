use crate::error_message_from_ptr;
use libsqlite3_sys::*;
use rust_decimal::prelude::ToPrimitive;
use std::{
    ffi::{CStr, c_int},
    os::raw::{c_char, c_void},
};
use strata_core::{Dialect, NativeError, Params, Value};

fn bind_text(statement: *mut sqlite3_stmt, index: c_int, value: &str) -> c_int {
    unsafe {
        sqlite3_bind_text(
            statement,
            index,
            value.as_ptr() as *const c_char,
            value.len() as c_int,
            SQLITE_TRANSIENT(),
        )
    }
}

fn range_error(message: String) -> NativeError {
    NativeError::new(SQLITE_RANGE.to_string(), message)
}

/// Binds one value at `index` (from 1).
pub(crate) fn bind_value(
    statement: *mut sqlite3_stmt,
    index: c_int,
    value: &Value,
) -> Result<(), NativeError> {
    let rc = unsafe {
        match value {
            Value::Null => sqlite3_bind_null(statement, index),
            Value::Boolean(v) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int(v) => sqlite3_bind_int64(statement, index, *v),
            Value::UInt(v) => {
                let Ok(v) = i64::try_from(*v) else {
                    return Err(range_error(format!(
                        "Cannot bind u64 value `{}` into sqlite integer because it's out of bounds",
                        v
                    )));
                };
                sqlite3_bind_int64(statement, index, v)
            }
            Value::Float(v) => sqlite3_bind_double(statement, index, *v),
            Value::Decimal(v) => sqlite3_bind_double(
                statement,
                index,
                v.to_f64().ok_or_else(|| {
                    range_error(format!("Cannot convert the Decimal value `{}` to f64", v))
                })?,
            ),
            Value::Varchar(v) => bind_text(statement, index, v),
            Value::Blob(v) => sqlite3_bind_blob(
                statement,
                index,
                v.as_ptr() as *const c_void,
                v.len() as c_int,
                SQLITE_TRANSIENT(),
            ),
            Value::Json(v) => bind_text(statement, index, &v.to_string()),
            Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..)
            | Value::Uuid(..) => {
                let literal = Dialect::Sqlite.writer().literal(value);
                bind_text(statement, index, literal.trim_matches('\''))
            }
            Value::List(..) => {
                return Err(range_error(format!(
                    "Cannot use a {:?} as a query parameter",
                    value
                )));
            }
        }
    };
    if rc != SQLITE_OK {
        let message = unsafe {
            let db = sqlite3_db_handle(statement);
            format!(
                "Cannot bind parameter {} to query `{}`: {}",
                index,
                CStr::from_ptr(sqlite3_sql(statement)).to_string_lossy(),
                error_message_from_ptr(&sqlite3_errmsg(db))
            )
        };
        return Err(NativeError::new(rc.to_string(), message));
    }
    Ok(())
}

/// Binds every parameter of `statement`: `:name` (also `@name`, `$name`) by name, `?` and
/// `?NNN` by position.
pub(crate) fn bind_params(statement: *mut sqlite3_stmt, params: &Params) -> Result<(), NativeError> {
    let count = unsafe { sqlite3_bind_parameter_count(statement) };
    let mut positional = 0;
    for index in 1..=count {
        let name = unsafe { sqlite3_bind_parameter_name(statement, index) };
        let value = if name.is_null() {
            let value = params.positional.get(positional);
            positional += 1;
            value.ok_or_else(|| {
                range_error(format!("Missing value for positional parameter {}", positional))
            })?
        } else {
            let name = unsafe { CStr::from_ptr(name) }.to_string_lossy();
            match name.strip_prefix('?') {
                Some(number) => number
                    .parse::<usize>()
                    .ok()
                    .and_then(|v| params.positional.get(v.wrapping_sub(1))),
                None => params.named.get(&name[1..]),
            }
            .ok_or_else(|| range_error(format!("Missing value for parameter `{}`", name)))?
        };
        bind_value(statement, index, value)?;
    }
    Ok(())
}
