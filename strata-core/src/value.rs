use crate::{Condition, Query, Sql};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::mem;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed value moved between Rust types, SQL literals and bind parameters.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Decimal(Decimal),
    Varchar(String),
    Blob(Box<[u8]>),
    Date(Date),
    Time(Time),
    Timestamp(PrimitiveDateTime),
    TimestampWithTimezone(OffsetDateTime),
    Uuid(Uuid),
    Json(serde_json::Value),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn same_type(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(v) => Some(v),
            _ => None,
        }
    }
}

/// Bind parameters, named ones keep their insertion order.
///
/// Names are stored without the leading `:`.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Params {
    pub named: IndexMap<String, Value>,
    pub positional: Vec<Value>,
}

impl Params {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn positional(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self {
            named: Default::default(),
            positional: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.named
            .insert(name.trim_start_matches(':').to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named.get(name.trim_start_matches(':'))
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }

    pub fn len(&self) -> usize {
        self.named.len() + self.positional.len()
    }

    /// Adds the missing names from `other`, existing names win.
    pub fn absorb(&mut self, other: &Params) {
        for (k, v) in &other.named {
            if !self.named.contains_key(k) {
                self.named.insert(k.clone(), v.clone());
            }
        }
        self.positional.extend(other.positional.iter().cloned());
    }

    /// Adds every name from `other`, `other` wins.
    pub fn overlay(&mut self, other: &Params) {
        for (k, v) in &other.named {
            self.named.insert(k.clone(), v.clone());
        }
        self.positional.extend(other.positional.iter().cloned());
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut result = Params::new();
        for (k, v) in iter {
            result.insert(k.as_ref(), v);
        }
        result
    }
}

/// Anything that can stand on the value side of a condition or an assignment.
#[derive(Debug, Clone)]
pub enum Arg {
    /// Escaped according to the dialect.
    Value(Value),
    /// Emitted verbatim, no escaping.
    Raw(String),
    List(Vec<Arg>),
    Sql(Sql),
    Condition(Box<Condition>),
    Query(Box<Query>),
}

impl Arg {
    pub fn raw(value: impl Into<String>) -> Self {
        Arg::Raw(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Arg::Value(Value::Null))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Arg::List(..) | Arg::Value(Value::List(..)))
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, Arg::Condition(..) | Arg::Query(..))
    }
}

impl<T: crate::AsValue> From<T> for Arg {
    fn from(value: T) -> Self {
        Arg::Value(value.as_value())
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Value(Value::Varchar(value.into()))
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(value: Vec<Arg>) -> Self {
        Arg::List(value)
    }
}

impl From<Sql> for Arg {
    fn from(value: Sql) -> Self {
        Arg::Sql(value)
    }
}

impl From<Condition> for Arg {
    fn from(value: Condition) -> Self {
        Arg::Condition(value.into())
    }
}

impl From<Query> for Arg {
    fn from(value: Query) -> Self {
        Arg::Query(value.into())
    }
}
