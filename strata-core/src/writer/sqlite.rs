use crate::{
    DatabaseError, Dialect, InsertMode, Lock, Result, SqlText, TableRef,
    writer::{Context, SqlWriter},
};

#[derive(Debug, Default)]
pub struct SqliteSqlWriter {}

impl SqlWriter for SqliteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn write_value_infinity(&self, _context: &mut Context, out: &mut SqlText, negative: bool) {
        out.push_str(if negative { "-9e999" } else { "9e999" });
    }

    fn write_value_nan(&self, _context: &mut Context, out: &mut SqlText) {
        out.push_str("NULL");
    }

    fn limit_all(&self) -> Option<&'static str> {
        Some("-1")
    }

    fn write_lock(&self, _context: &mut Context, _out: &mut SqlText, lock: Lock) -> Result<()> {
        let operation = match lock {
            Lock::Update => "FOR UPDATE",
            Lock::Share => "shared lock",
        };
        Err(DatabaseError::unsupported(operation, self.dialect()).into())
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
            InsertMode::Ignore => "INSERT OR IGNORE INTO ",
        });
        Ok(())
    }

    fn write_insert_ignore_suffix(&self, _context: &mut Context, _out: &mut SqlText) {}

    fn write_upsert_excluded(&self, context: &mut Context, out: &mut SqlText, column: &str) {
        out.push_str("excluded.");
        self.write_identifier_quoted(context, out, column);
    }

    fn write_truncate(
        &self,
        _context: &mut Context,
        _out: &mut SqlText,
        _table: &TableRef,
    ) -> Result<()> {
        Err(DatabaseError::unsupported("TRUNCATE", self.dialect()).into())
    }
}
