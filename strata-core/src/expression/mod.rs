mod binder;
mod ordered;
mod sql;

pub use binder::*;
pub use ordered::*;
pub use sql::*;
