use crate::NativeError;
use std::rc::Rc;

/// Something that happened on a [`Database`](crate::Database), delivered to its listeners in
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    Connected,
    /// A statement failed, before any classification.
    Failure { sql: &'a str, error: &'a NativeError },
    Reconnected { attempt: u32 },
    ReconnectFailed { attempt: u32, error: &'a NativeError },
    TransactionBegin { depth: u32 },
    TransactionCommit { depth: u32 },
    TransactionRollback { depth: u32 },
}

pub type Listener = Rc<dyn Fn(&Event<'_>)>;
