use crate::{
    Dialect, SqlText,
    writer::{Context, SqlWriter},
};
use std::fmt::Write;
use time::OffsetDateTime;

#[derive(Debug, Default)]
pub struct PostgresSqlWriter {}

impl SqlWriter for PostgresSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut SqlText, value: bool) {
        out.push_str(["FALSE", "TRUE"][value as usize]);
    }

    fn write_value_blob(&self, _context: &mut Context, out: &mut SqlText, value: &[u8]) {
        let _ = write!(out, "'\\x{}'::BYTEA", hex::encode(value));
    }

    fn write_value_timestamptz(
        &self,
        context: &mut Context,
        out: &mut SqlText,
        value: &OffsetDateTime,
    ) {
        let date_time = value.to_utc();
        out.push('\'');
        self.write_value_date(context, out, &date_time.date(), true);
        out.push(' ');
        self.write_value_time(context, out, &date_time.time(), true);
        out.push_str("+00:00'");
    }

    fn write_cast(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        expression: SqlText,
        ty: &str,
        simple: bool,
    ) {
        if simple {
            out.append(expression);
        } else {
            out.push('(');
            out.append(expression);
            out.push(')');
        }
        let _ = write!(out, "::{}", ty);
    }

    fn upsert_requires_target(&self) -> bool {
        true
    }
}
