#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use strata_core::{AsValue, Dialect, Value};
    use time::macros::{date, datetime, time};
    use uuid::Uuid;

    fn literal(dialect: Dialect, value: impl Into<Value>) -> String {
        dialect.writer().literal(&value.into())
    }

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(true));
        assert_ne!(val, Value::Varchar("true".into()));
        assert!(bool::try_from_value(val).unwrap());
        assert!(bool::try_from_value(Value::Int(8)).unwrap());
        assert!(!bool::try_from_value(Value::UInt(0)).unwrap());
        assert!(bool::try_from_value(Value::Varchar("t".into())).unwrap());
        assert!(bool::try_from_value(Value::Float(0.5)).is_err());
        assert_eq!(literal(Dialect::Sqlite, true), "1");
        assert_eq!(literal(Dialect::MySql, false), "0");
        assert_eq!(literal(Dialect::Postgres, true), "TRUE");
    }

    #[test]
    fn value_integers() {
        assert_eq!(Value::from(-7i8), Value::Int(-7));
        assert_eq!(Value::from(7u16), Value::UInt(7));
        assert_eq!(i16::try_from_value(Value::UInt(300)).unwrap(), 300);
        assert!(i8::try_from_value(Value::UInt(300)).is_err());
        assert_eq!(u64::try_from_value(Value::Float(12.0)).unwrap(), 12);
        assert!(u64::try_from_value(Value::Float(12.5)).is_err());
        assert_eq!(
            i64::try_from_value(Value::Decimal(Decimal::from(42))).unwrap(),
            42
        );
        assert_eq!(literal(Dialect::Postgres, u64::MAX), "18446744073709551615");
        assert_eq!(literal(Dialect::MySql, i64::MIN), "-9223372036854775808");
    }

    #[test]
    fn value_floats() {
        assert_eq!(f64::try_from_value(Value::Int(3)).unwrap(), 3.0);
        assert_eq!(f32::try_from_value(Value::Varchar("0.25".into())).unwrap(), 0.25);
        assert_eq!(literal(Dialect::Sqlite, 1.5), "1.5");
        assert_eq!(literal(Dialect::Sqlite, f64::INFINITY), "9e999");
        assert_eq!(literal(Dialect::Sqlite, f64::NAN), "NULL");
        assert_eq!(
            literal(Dialect::Postgres, f64::NEG_INFINITY),
            "CAST('-Infinity' AS DOUBLE PRECISION)"
        );
        assert_eq!(literal(Dialect::MySql, f64::NAN), "NULL");
    }

    #[test]
    fn value_decimal() {
        let value = Decimal::from_str("1234.5600").unwrap();
        assert_eq!(literal(Dialect::Postgres, value), "1234.5600");
        assert_eq!(
            Decimal::try_from_value(Value::Varchar("0.1".into())).unwrap(),
            Decimal::from_str("0.1").unwrap()
        );
        assert_eq!(
            Decimal::try_from_value(Value::Int(5)).unwrap(),
            Decimal::from(5)
        );
    }

    #[test]
    fn value_strings() {
        assert_eq!(Value::from("hello"), Value::Varchar("hello".into()));
        assert_eq!(literal(Dialect::Sqlite, "it's"), "'it''s'");
        assert_eq!(literal(Dialect::Postgres, r"a\b"), r"'a\b'");
        assert_eq!(literal(Dialect::MySql, r"it's a\b"), r"'it''s a\\b'");
        assert!(String::try_from_value(Value::Int(1)).is_err());
        assert_eq!(
            String::try_from_value(Value::Json(serde_json::json!({"a": 1}))).unwrap(),
            r#"{"a":1}"#
        );
    }

    #[test]
    fn value_blob() {
        let blob: Box<[u8]> = [0xDEu8, 0xAD, 0xBE, 0xEF].into();
        assert_eq!(literal(Dialect::Sqlite, blob.clone()), "X'DEADBEEF'");
        assert_eq!(literal(Dialect::MySql, blob.clone()), "X'DEADBEEF'");
        assert_eq!(literal(Dialect::Postgres, blob), r"'\xdeadbeef'::BYTEA");
    }

    #[test]
    fn value_temporal() {
        assert_eq!(literal(Dialect::Sqlite, date!(2024 - 02 - 29)), "'2024-02-29'");
        assert_eq!(literal(Dialect::MySql, time!(07:05:00.25)), "'07:05:00.25'");
        assert_eq!(
            literal(Dialect::Postgres, datetime!(2024-02-29 23:59:59.000001)),
            "'2024-02-29 23:59:59.000001'"
        );
        assert_eq!(
            literal(Dialect::Postgres, datetime!(2024-03-01 01:30 +02:00)),
            "'2024-02-29 23:30:00+00:00'"
        );
        assert_eq!(
            literal(Dialect::Sqlite, datetime!(2024-03-01 01:30 +02:00)),
            "'2024-02-29 23:30:00'"
        );
    }

    #[test]
    fn value_uuid_and_json() {
        let id = Uuid::from_str("5b9a2c3e-1f6d-4b8a-9c0e-2d4f6a8b0c1e").unwrap();
        assert_eq!(
            literal(Dialect::Postgres, id),
            "'5b9a2c3e-1f6d-4b8a-9c0e-2d4f6a8b0c1e'"
        );
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(id.to_string())).unwrap(),
            id
        );
        let json = serde_json::json!({"name": "O'Hara", "tags": [1, 2]});
        assert_eq!(
            literal(Dialect::Sqlite, json.clone()),
            r#"'{"name":"O''Hara","tags":[1,2]}'"#
        );
        let document = indoc! {r#"
            {"name": "O'Hara", "tags": [1, 2]}
        "#};
        assert_eq!(
            serde_json::Value::try_from_value(Value::Varchar(document.into())).unwrap(),
            json
        );
    }

    #[test]
    fn value_options_and_lists() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x".to_string())), Value::Varchar("x".into()));
        assert_eq!(
            Option::<i64>::try_from_value(Value::Int(3)).unwrap(),
            Some(3)
        );
        let list = Value::from(vec![1, 2, 3]);
        assert_eq!(literal(Dialect::MySql, list.clone()), "1, 2, 3");
        assert_eq!(Vec::<u8>::try_from_value(list).unwrap(), [1, 2, 3]);
    }
}
