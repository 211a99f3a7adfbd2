use crate::{
    Query, Result, SqlText, StatementKind, Value,
    writer::{Context, SqlWriter},
};

/// Services an expression needs while it writes itself.
///
/// Statement builders implement it to turn parameters into bind names and to resolve model
/// qualifiers, [`LiteralBinder`] inlines everything.
pub trait Binder {
    fn writer(&self) -> &'static dyn SqlWriter;

    /// Writes `value` either as a bind placeholder (`as_param`) or as an escaped literal.
    fn serialize(&mut self, value: &Value, as_param: bool, out: &mut SqlText) -> Result<()>;

    /// Writes a possibly dotted identifier.
    fn protect(&mut self, identifier: &str, out: &mut SqlText) {
        self.writer()
            .write_identifier_path(&mut Context::default(), out, identifier);
    }

    /// Writes a nested statement, parenthesized.
    fn statement(&mut self, query: &Query, out: &mut SqlText) -> Result<()>;
}

/// Binder producing self contained SQL, parameters included as literals.
#[derive(Clone, Copy)]
pub struct LiteralBinder {
    writer: &'static dyn SqlWriter,
}

impl LiteralBinder {
    pub fn new(writer: &'static dyn SqlWriter) -> Self {
        Self { writer }
    }
}

impl Binder for LiteralBinder {
    fn writer(&self) -> &'static dyn SqlWriter {
        self.writer
    }

    fn serialize(&mut self, value: &Value, _as_param: bool, out: &mut SqlText) -> Result<()> {
        self.writer.write_value(&mut Context::default(), out, value);
        Ok(())
    }

    fn statement(&mut self, query: &Query, out: &mut SqlText) -> Result<()> {
        out.push('(');
        out.push_str(&query.sql(StatementKind::Select)?);
        out.push(')');
        Ok(())
    }
}
