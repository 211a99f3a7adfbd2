use crate::{Error, Result, Value};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::any;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::parse_borrowed};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// `as_value` wraps the type into its canonical variant. `try_from_value` accepts the canonical
/// variant and, where the conversion is lossless, the neighbouring ones: drivers like sqlite
/// only report a handful of storage classes so an `i32` column comes back as `Value::Int` and a
/// timestamp as `Value::Varchar`.
///
/// ```rust
/// use strata_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert_eq!(v, Value::Int(42));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.into())
    }
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} into {}",
        value,
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value_integer {
    ($($source:ty => $destination:path),+ $(,)?) => {
        $(
            impl AsValue for $source {
                fn as_value(self) -> Value {
                    $destination(self as _)
                }
                fn try_from_value(value: Value) -> Result<Self> {
                    let converted = match &value {
                        Value::Int(v) => <$source>::try_from(*v).ok(),
                        Value::UInt(v) => <$source>::try_from(*v).ok(),
                        Value::Boolean(v) => Some(*v as $source),
                        Value::Decimal(v) if v.fract().is_zero() => v.to_i128().and_then(|v| <$source>::try_from(v).ok()),
                        Value::Float(v) if v.fract() == 0.0 => <$source>::try_from(*v as i128).ok(),
                        Value::Varchar(v) => v.trim().parse::<$source>().ok(),
                        _ => None,
                    };
                    converted.ok_or_else(|| mismatch::<$source>(&value))
                }
            }
        )+
    };
}

impl_as_value_integer!(
    i8 => Value::Int,
    i16 => Value::Int,
    i32 => Value::Int,
    i64 => Value::Int,
    isize => Value::Int,
    u8 => Value::UInt,
    u16 => Value::UInt,
    u32 => Value::UInt,
    u64 => Value::UInt,
    usize => Value::UInt,
);

macro_rules! impl_as_value_float {
    ($($source:ty),+) => {
        $(
            impl AsValue for $source {
                fn as_value(self) -> Value {
                    Value::Float(self as f64)
                }
                fn try_from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Float(v) => Ok(v as _),
                        Value::Int(v) => Ok(v as _),
                        Value::UInt(v) => Ok(v as _),
                        Value::Decimal(v) => v.to_f64().map(|v| v as _).ok_or_else(|| mismatch::<$source>(&Value::Decimal(v))),
                        Value::Varchar(ref v) => v.trim().parse::<$source>().map_err(|_| mismatch::<$source>(&value)),
                        v => Err(mismatch::<$source>(&v)),
                    }
                }
            }
        )+
    };
}

impl_as_value_float!(f32, f64);

impl AsValue for bool {
    fn as_value(self) -> Value {
        Value::Boolean(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            Value::UInt(v) => Ok(v != 0),
            Value::Varchar(ref v) => match v.as_str() {
                "t" | "true" | "TRUE" | "1" => Ok(true),
                "f" | "false" | "FALSE" | "0" => Ok(false),
                _ => Err(mismatch::<bool>(&value)),
            },
            v => Err(mismatch::<bool>(&v)),
        }
    }
}

impl AsValue for Decimal {
    fn as_value(self) -> Value {
        Value::Decimal(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Decimal(v) => Some(*v),
            Value::Int(v) => Some(Decimal::from(*v)),
            Value::UInt(v) => Some(Decimal::from(*v)),
            Value::Float(v) => Decimal::from_f64(*v),
            Value::Varchar(v) => v.trim().parse().ok(),
            _ => None,
        };
        converted.ok_or_else(|| mismatch::<Decimal>(&value))
    }
}

impl AsValue for String {
    fn as_value(self) -> Value {
        Value::Varchar(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(v) => Ok(v),
            Value::Json(v) => Ok(v.to_string()),
            Value::Uuid(v) => Ok(v.to_string()),
            v => Err(mismatch::<String>(&v)),
        }
    }
}

impl AsValue for Box<[u8]> {
    fn as_value(self) -> Value {
        Value::Blob(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(v) => Ok(v),
            Value::Varchar(v) => Ok(v.into_bytes().into()),
            v => Err(mismatch::<Box<[u8]>>(&v)),
        }
    }
}

impl AsValue for Uuid {
    fn as_value(self) -> Value {
        Value::Uuid(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(v) => Ok(v),
            Value::Varchar(ref v) => Uuid::parse_str(v).map_err(|_| mismatch::<Uuid>(&value)),
            Value::Blob(ref v) => Uuid::from_slice(v).map_err(|_| mismatch::<Uuid>(&value)),
            v => Err(mismatch::<Uuid>(&v)),
        }
    }
}

impl AsValue for serde_json::Value {
    fn as_value(self) -> Value {
        Value::Json(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(v) => Ok(v),
            Value::Varchar(ref v) => {
                serde_json::from_str(v).map_err(|_| mismatch::<serde_json::Value>(&value))
            }
            v => Err(mismatch::<serde_json::Value>(&v)),
        }
    }
}

macro_rules! impl_as_value_temporal {
    ($source:ty, $destination:path, $($format:literal),+) => {
        impl AsValue for $source {
            fn as_value(self) -> Value {
                $destination(self)
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(v) => Ok(v),
                    Value::Varchar(ref v) => {
                        for format in [$($format),+] {
                            let Ok(format) = parse_borrowed::<2>(format) else {
                                continue;
                            };
                            if let Ok(parsed) = <$source>::parse(v, &format) {
                                return Ok(parsed);
                            }
                        }
                        Err(mismatch::<$source>(&value))
                    }
                    v => Err(mismatch::<$source>(&v)),
                }
            }
        }
    };
}

impl_as_value_temporal!(Date, Value::Date, "[year]-[month]-[day]");
impl_as_value_temporal!(
    Time,
    Value::Time,
    "[hour]:[minute]:[second].[subsecond]",
    "[hour]:[minute]:[second]",
    "[hour]:[minute]"
);
impl_as_value_temporal!(
    PrimitiveDateTime,
    Value::Timestamp,
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]",
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]",
    "[year]-[month]-[day] [hour]:[minute]:[second]",
    "[year]-[month]-[day]T[hour]:[minute]:[second]"
);
impl_as_value_temporal!(
    OffsetDateTime,
    Value::TimestampWithTimezone,
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour]:[offset_minute]",
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour]:[offset_minute]",
    "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour]:[offset_minute]",
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour]:[offset_minute]"
);

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => Value::Null,
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            v => Ok(Some(T::try_from_value(v)?)),
        }
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_value(self) -> Value {
        Value::List(self.into_iter().map(AsValue::as_value).collect())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(v) => v.into_iter().map(T::try_from_value).collect(),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}
