use crate::{
    DatabaseError, Dialect, InsertMode, JoinType, Lock, Result, SqlText, TableRef, Value,
    separated_by,
    writer::{Context, Fragment},
};
use std::fmt::Write;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $context:ident, $out:ident, $value:expr) => {{
        if $value.is_infinite() {
            $this.write_value_infinity($context, $out, $value.is_sign_negative());
        } else if $value.is_nan() {
            $this.write_value_nan($context, $out);
        } else {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        }
    }};
}

/// Dialect printer converting semantic constructs into concrete SQL strings.
///
/// The default implementations follow standard SQL, each dialect overrides what it spells
/// differently or cannot express at all.
pub trait SqlWriter: Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    fn dialect(&self) -> Dialect;

    /// Whether the current fragment declares aliases with `AS`.
    fn alias_declaration(&self, context: &Context) -> bool {
        !matches!(
            context.fragment,
            Fragment::SqlSelectOrderBy | Fragment::SqlSelectGroupBy
        )
    }

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut SqlText, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    /// Quote each segment of a dotted identifier, `*` stays bare.
    fn write_identifier_path(&self, context: &mut Context, out: &mut SqlText, value: &str) {
        separated_by(
            out,
            value.split('.'),
            |out, v| {
                if v == "*" {
                    out.push('*');
                } else {
                    self.write_identifier_quoted(context, out, v.trim());
                }
            },
            ".",
        );
    }

    /// Alias after an expression: `AS "alias"` when declaring, bare otherwise (`DESC`, `ASC`).
    fn write_alias(&self, context: &mut Context, out: &mut SqlText, alias: &str) {
        if self.alias_declaration(context) {
            out.push_str(" AS ");
            self.write_identifier_quoted(context, out, alias);
        } else {
            out.push(' ');
            out.push_str(alias);
        }
    }

    /// Render a table reference with optional alias.
    fn write_table_ref(&self, context: &mut Context, out: &mut SqlText, value: &TableRef) {
        if !value.schema.is_empty() {
            self.write_identifier_quoted(context, out, &value.schema);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, &value.name);
        if !value.alias.is_empty() {
            self.write_alias(context, out, &value.alias);
        }
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, context: &mut Context, out: &mut SqlText, value: &Value) {
        match value {
            Value::Null => self.write_value_none(context, out),
            Value::Boolean(v) => self.write_value_bool(context, out, *v),
            Value::Int(v) => write_integer!(out, *v),
            Value::UInt(v) => write_integer!(out, *v),
            Value::Float(v) => write_float!(self, context, out, *v),
            Value::Decimal(v) => drop(write!(out, "{}", v)),
            Value::Varchar(v) => self.write_value_string(context, out, v),
            Value::Blob(v) => self.write_value_blob(context, out, v.as_ref()),
            Value::Date(v) => self.write_value_date(context, out, v, false),
            Value::Time(v) => self.write_value_time(context, out, v, false),
            Value::Timestamp(v) => self.write_value_timestamp(context, out, v),
            Value::TimestampWithTimezone(v) => self.write_value_timestamptz(context, out, v),
            Value::Uuid(v) => drop(write!(out, "'{}'", v)),
            Value::Json(v) => self.write_value_json(context, out, v),
            Value::List(v) => self.write_value_list(context, out, v),
        };
    }

    /// Render NULL literal.
    fn write_value_none(&self, _context: &mut Context, out: &mut SqlText) {
        out.push_str("NULL");
    }

    /// Render boolean literal.
    fn write_value_bool(&self, _context: &mut Context, out: &mut SqlText, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn write_value_infinity(&self, _context: &mut Context, out: &mut SqlText, negative: bool) {
        out.push_str(if negative {
            "CAST('-Infinity' AS DOUBLE PRECISION)"
        } else {
            "CAST('Infinity' AS DOUBLE PRECISION)"
        });
    }

    fn write_value_nan(&self, _context: &mut Context, out: &mut SqlText) {
        out.push_str("CAST('NaN' AS DOUBLE PRECISION)");
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, context: &mut Context, out: &mut SqlText, value: &str) {
        out.push('\'');
        self.write_escaped(context, out, value, '\'', "''");
        out.push('\'');
    }

    /// Render a blob literal using hex notation.
    fn write_value_blob(&self, _context: &mut Context, out: &mut SqlText, value: &[u8]) {
        let _ = write!(out, "X'{}'", hex::encode_upper(value));
    }

    /// Render a DATE literal (optionally as part of TIMESTAMP composition).
    fn write_value_date(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        value: &Date,
        timestamp: bool,
    ) {
        let b = if timestamp { "" } else { "'" };
        let _ = write!(
            out,
            "{b}{:04}-{:02}-{:02}{b}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    /// Render a TIME literal (optionally as part of TIMESTAMP composition).
    fn write_value_time(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        value: &Time,
        timestamp: bool,
    ) {
        let b = if timestamp { "" } else { "'" };
        let _ = write!(
            out,
            "{b}{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second(),
        );
        let mut subsecond = value.nanosecond();
        if subsecond != 0 {
            let mut width = 9;
            while subsecond % 10 == 0 {
                subsecond /= 10;
                width -= 1;
            }
            let _ = write!(out, ".{:0width$}", subsecond);
        }
        out.push_str(b);
    }

    /// Render a TIMESTAMP literal.
    fn write_value_timestamp(
        &self,
        context: &mut Context,
        out: &mut SqlText,
        value: &PrimitiveDateTime,
    ) {
        out.push('\'');
        self.write_value_date(context, out, &value.date(), true);
        out.push(' ');
        self.write_value_time(context, out, &value.time(), true);
        out.push('\'');
    }

    /// Render a TIMESTAMPTZ literal, normalized to UTC.
    fn write_value_timestamptz(
        &self,
        context: &mut Context,
        out: &mut SqlText,
        value: &OffsetDateTime,
    ) {
        let date_time = value.to_utc();
        self.write_value_timestamp(
            context,
            out,
            &PrimitiveDateTime::new(date_time.date(), date_time.time()),
        );
    }

    fn write_value_json(&self, context: &mut Context, out: &mut SqlText, value: &serde_json::Value) {
        self.write_value_string(context, out, &value.to_string());
    }

    /// Render a list as comma separated values, the caller decides the enclosing delimiters.
    fn write_value_list(&self, context: &mut Context, out: &mut SqlText, value: &[Value]) {
        separated_by(
            out,
            value,
            |out, v| {
                self.write_value(context, out, v);
            },
            ", ",
        );
    }

    /// Render the concatenation of already written operands.
    fn write_concat(&self, _context: &mut Context, out: &mut SqlText, operands: Vec<SqlText>) {
        separated_by(out, operands, |out, v| out.append(v), " || ");
    }

    /// Render a cast, `simple` tells whether the expression is a single operand.
    fn write_cast(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        expression: SqlText,
        ty: &str,
        _simple: bool,
    ) {
        out.push_str("CAST(");
        out.append(expression);
        let _ = write!(out, " AS {})", ty);
    }

    /// Value written as LIMIT when only an offset is requested, `None` when OFFSET stands alone.
    fn limit_all(&self) -> Option<&'static str> {
        None
    }

    fn write_limit_offset(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        limit: Option<u64>,
        offset: Option<u64>,
    ) {
        match (limit, offset.filter(|v| *v > 0)) {
            (Some(limit), offset) => {
                out.push_str(" LIMIT ");
                write_integer!(out, limit);
                if let Some(offset) = offset {
                    out.push_str(" OFFSET ");
                    write_integer!(out, offset);
                }
            }
            (None, Some(offset)) => {
                if let Some(all) = self.limit_all() {
                    out.push_str(" LIMIT ");
                    out.push_str(all);
                }
                out.push_str(" OFFSET ");
                write_integer!(out, offset);
            }
            (None, None) => {}
        }
    }

    /// LIMIT for UPDATE and DELETE.
    fn write_mutation_limit(
        &self,
        _context: &mut Context,
        _out: &mut SqlText,
        _limit: u64,
    ) -> Result<()> {
        Err(DatabaseError::unsupported("LIMIT on UPDATE/DELETE", self.dialect()).into())
    }

    fn write_lock(&self, _context: &mut Context, out: &mut SqlText, lock: Lock) -> Result<()> {
        out.push_str(match lock {
            Lock::Update => " FOR UPDATE",
            Lock::Share => " FOR SHARE",
        });
        Ok(())
    }

    fn write_join_type(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        join_type: JoinType,
    ) -> Result<()> {
        out.push_str(match join_type {
            JoinType::Inner => " INNER JOIN ",
            JoinType::Left => " LEFT JOIN ",
            JoinType::Right => " RIGHT JOIN ",
            JoinType::Full => " FULL OUTER JOIN ",
            JoinType::Cross => " CROSS JOIN ",
        });
        Ok(())
    }

    fn write_insert_prefix(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        mode: InsertMode,
    ) -> Result<()> {
        match mode {
            InsertMode::Insert | InsertMode::Ignore => out.push_str("INSERT INTO "),
            InsertMode::Replace => {
                return Err(DatabaseError::unsupported("REPLACE", self.dialect()).into());
            }
        }
        Ok(())
    }

    /// Trailing clause turning conflicts into no-ops, for dialects without a keyword prefix.
    fn write_insert_ignore_suffix(&self, _context: &mut Context, out: &mut SqlText) {
        out.push_str(" ON CONFLICT DO NOTHING");
    }

    /// Whether the upsert clause needs the conflicting columns.
    fn upsert_requires_target(&self) -> bool {
        false
    }

    /// Opening of the upsert clause, up to the first assignment.
    fn write_upsert_prefix(
        &self,
        context: &mut Context,
        out: &mut SqlText,
        target: &[String],
    ) -> Result<()> {
        out.push_str(" ON CONFLICT");
        if !target.is_empty() {
            out.push_str(" (");
            separated_by(
                out,
                target,
                |out, v| self.write_identifier_quoted(context, out, v),
                ", ",
            );
            out.push(')');
        }
        out.push_str(" DO UPDATE SET ");
        Ok(())
    }

    /// Reference to the value proposed for `column` by the conflicting row.
    fn write_upsert_excluded(&self, context: &mut Context, out: &mut SqlText, column: &str) {
        out.push_str("EXCLUDED.");
        self.write_identifier_quoted(context, out, column);
    }

    fn write_returning(&self, _context: &mut Context, out: &mut SqlText) -> Result<()> {
        out.push_str(" RETURNING ");
        Ok(())
    }

    fn write_truncate(
        &self,
        context: &mut Context,
        out: &mut SqlText,
        table: &TableRef,
    ) -> Result<()> {
        out.push_str("TRUNCATE TABLE ");
        self.write_table_ref(context, out, table);
        Ok(())
    }

    fn write_transaction_begin(&self, out: &mut String) {
        out.push_str("BEGIN");
    }

    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT");
    }

    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK");
    }

    fn supports_savepoints(&self) -> bool {
        true
    }

    fn write_savepoint(&self, out: &mut String, depth: u32) {
        let _ = write!(out, "SAVEPOINT LEVEL{}", depth);
    }

    fn write_savepoint_release(&self, out: &mut String, depth: u32) {
        let _ = write!(out, "RELEASE SAVEPOINT LEVEL{}", depth);
    }

    fn write_savepoint_rollback(&self, out: &mut String, depth: u32) {
        let _ = write!(out, "ROLLBACK TO SAVEPOINT LEVEL{}", depth);
    }

    /// Literal text of a value, no deferred pieces involved.
    fn literal(&self, value: &Value) -> String {
        let mut out = SqlText::new();
        self.write_value(&mut Context::default(), &mut out, value);
        out.render(|v| Ok(v.to_string())).unwrap_or_default()
    }

    /// Quoted identifier path as plain text.
    fn quoted(&self, identifier: &str) -> String {
        let mut out = SqlText::new();
        self.write_identifier_path(&mut Context::default(), &mut out, identifier);
        out.render(|v| Ok(v.to_string())).unwrap_or_default()
    }
}
