use crate::{
    DatabaseError, Dialect, InsertMode, JoinType, Lock, Result, SqlText,
    writer::{Context, SqlWriter},
};
use std::fmt::Write;

#[derive(Debug, Default)]
pub struct MySqlSqlWriter {}

impl SqlWriter for MySqlSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn write_identifier_quoted(&self, context: &mut Context, out: &mut SqlText, value: &str) {
        out.push('`');
        self.write_escaped(context, out, value, '`', "``");
        out.push('`');
    }

    /// Backslash is an escape character inside MySQL strings.
    fn write_value_string(&self, _context: &mut Context, out: &mut SqlText, value: &str) {
        out.push('\'');
        let mut position = 0;
        for (i, c) in value.char_indices() {
            let replace = match c {
                '\'' => "''",
                '\\' => "\\\\",
                _ => continue,
            };
            out.push_str(&value[position..i]);
            out.push_str(replace);
            position = i + 1;
        }
        out.push_str(&value[position..]);
        out.push('\'');
    }

    fn write_value_infinity(&self, _context: &mut Context, out: &mut SqlText, _negative: bool) {
        log::warn!("MySQL cannot represent infinite floating point values, writing NULL");
        out.push_str("NULL");
    }

    fn write_value_nan(&self, _context: &mut Context, out: &mut SqlText) {
        log::warn!("MySQL cannot represent NaN, writing NULL");
        out.push_str("NULL");
    }

    fn write_concat(&self, _context: &mut Context, out: &mut SqlText, operands: Vec<SqlText>) {
        out.push_str("CONCAT(");
        crate::separated_by(out, operands, |out, v| out.append(v), ", ");
        out.push(')');
    }

    fn limit_all(&self) -> Option<&'static str> {
        Some("18446744073709551615")
    }

    fn write_mutation_limit(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        limit: u64,
    ) -> Result<()> {
        let _ = write!(out, " LIMIT {}", limit);
        Ok(())
    }

    fn write_lock(&self, _context: &mut Context, out: &mut SqlText, lock: Lock) -> Result<()> {
        out.push_str(match lock {
            Lock::Update => " FOR UPDATE",
            Lock::Share => " LOCK IN SHARE MODE",
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
            JoinType::Cross => " CROSS JOIN ",
            JoinType::Full => {
                return Err(DatabaseError::unsupported("FULL OUTER JOIN", self.dialect()).into());
            }
        });
        Ok(())
    }

    fn write_insert_prefix(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        mode: InsertMode,
    ) -> Result<()> {
        out.push_str(match mode {
            InsertMode::Insert => "INSERT INTO ",
            InsertMode::Replace => "REPLACE INTO ",
            InsertMode::Ignore => "INSERT IGNORE INTO ",
        });
        Ok(())
    }

    fn write_insert_ignore_suffix(&self, _context: &mut Context, _out: &mut SqlText) {}

    /// MySQL infers the conflict from the unique keys, the target is never written.
    fn write_upsert_prefix(
        &self,
        _context: &mut Context,
        out: &mut SqlText,
        _target: &[String],
    ) -> Result<()> {
        out.push_str(" ON DUPLICATE KEY UPDATE ");
        Ok(())
    }

    fn write_upsert_excluded(&self, context: &mut Context, out: &mut SqlText, column: &str) {
        out.push_str("VALUES(");
        self.write_identifier_quoted(context, out, column);
        out.push(')');
    }

    fn write_returning(&self, _context: &mut Context, _out: &mut SqlText) -> Result<()> {
        Err(DatabaseError::unsupported("RETURNING", self.dialect()).into())
    }

    fn write_transaction_begin(&self, out: &mut String) {
        out.push_str("START TRANSACTION");
    }
}
