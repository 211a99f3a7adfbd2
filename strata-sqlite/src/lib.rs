mod bind;
mod cbox;
mod connection;
mod driver;
mod extract;
mod rows;

use std::ffi::{CStr, c_char};

pub(crate) use cbox::*;
pub use connection::*;
pub use driver::*;
pub use rows::*;

/// # Safety
/// `ptr` must be null or point to a nul terminated string.
pub(crate) unsafe fn error_message_from_ptr(ptr: &*const c_char) -> String {
    unsafe {
        if !ptr.is_null() {
            CStr::from_ptr(*ptr).to_string_lossy().into_owned()
        } else {
            "Unknown error (could not extract the error message)".to_string()
        }
    }
}
