mod as_value;
mod column;
mod condition;
mod config;
mod cursor;
mod database;
mod dialect;
mod error;
mod event;
mod expression;
mod identifier;
mod manager;
mod native;
mod paginator;
mod placeholder;
mod policy;
mod query;
mod resolve;
mod table_ref;
mod text;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use column::*;
pub use condition::*;
pub use config::*;
pub use cursor::*;
pub use database::*;
pub use dialect::*;
pub use error::*;
pub use event::*;
pub use expression::*;
pub use identifier::*;
pub use manager::*;
pub use native::*;
pub use paginator::*;
pub use policy::*;
pub use query::*;
pub use resolve::*;
pub use table_ref::*;
pub use text::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
