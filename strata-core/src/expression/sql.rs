use crate::{
    AsValue, Binder, Dialect, LiteralBinder, Params, Query, Result, SqlText, Value,
    writer::{Context, Fragment},
};
use std::fmt::Write;

/// Kind specific payload of a [`Sql`] node.
#[derive(Debug, Clone)]
pub enum SqlKind {
    Column(String),
    Param(Value),
    Func(String, Vec<Sql>),
    Cast(Box<Sql>, String),
    Array(Value),
    List(Vec<Sql>),
    Raw(String),
    Json(serde_json::Value),
    Concat(Vec<Sql>),
    Composite(Vec<Part>),
    Value(Value),
    Statement(Box<Query>),
}

/// Element of a composite expression: text is written verbatim, nodes write themselves.
#[derive(Debug, Clone)]
pub enum Part {
    Text(String),
    Node(Sql),
}

impl From<&str> for Part {
    fn from(value: &str) -> Self {
        Part::Text(value.into())
    }
}

impl From<String> for Part {
    fn from(value: String) -> Self {
        Part::Text(value)
    }
}

impl From<Sql> for Part {
    fn from(value: Sql) -> Self {
        Part::Node(value)
    }
}

/// Immutable SQL expression node.
///
/// ```rust
/// use strata_core::{Dialect, Sql};
/// let full_name = Sql::concat([Sql::column("first"), " ".into(), Sql::column("last")]);
/// assert_eq!(
///     full_name.to_sql(Dialect::MySql).unwrap(),
///     "CONCAT(`first`, ' ', `last`)"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Sql {
    kind: SqlKind,
    alias: Option<String>,
    bindings: Params,
}

impl Sql {
    fn new(kind: SqlKind) -> Self {
        Self {
            kind,
            alias: None,
            bindings: Params::new(),
        }
    }

    /// Column reference, possibly qualified (`users.name`, `User.name`).
    pub fn column(name: impl Into<String>) -> Self {
        Self::new(SqlKind::Column(name.into()))
    }

    /// Value sent as a bind parameter.
    pub fn param(value: impl Into<Value>) -> Self {
        Self::new(SqlKind::Param(value.into()))
    }

    pub fn func(name: impl Into<String>, args: impl IntoIterator<Item = impl Into<Sql>>) -> Self {
        Self::new(SqlKind::Func(
            name.into(),
            args.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn cast(expression: impl Into<Sql>, ty: impl Into<String>) -> Self {
        Self::new(SqlKind::Cast(Box::new(expression.into()), ty.into()))
    }

    /// Postgres array literal (`'{1,2,3}'`), nested lists become nested arrays.
    pub fn pg_array(values: impl Into<Value>) -> Self {
        Self::new(SqlKind::Array(values.into()))
    }

    /// Comma separated list of expressions.
    pub fn cs_list(items: impl IntoIterator<Item = impl Into<Sql>>) -> Self {
        Self::new(SqlKind::List(items.into_iter().map(Into::into).collect()))
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(SqlKind::Raw(text.into()))
    }

    /// Raw text with its own named or positional parameters.
    pub fn raw_with(text: impl Into<String>, bindings: Params) -> Self {
        Self {
            bindings,
            ..Self::raw(text)
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::new(SqlKind::Json(value))
    }

    pub fn concat(operands: impl IntoIterator<Item = impl Into<Sql>>) -> Self {
        Self::new(SqlKind::Concat(
            operands.into_iter().map(Into::into).collect(),
        ))
    }

    /// Space separated composite of verbatim text and nodes.
    pub fn expr(parts: impl IntoIterator<Item = impl Into<Part>>) -> Self {
        Self::new(SqlKind::Composite(
            parts.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn case() -> CaseBuilder {
        CaseBuilder::default()
    }

    /// Value written as an escaped literal.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::new(SqlKind::Value(value.into()))
    }

    pub fn sub_query(query: Query) -> Self {
        Self::new(SqlKind::Statement(Box::new(query)))
    }

    /// Same node, written with ` AS "alias"`.
    pub fn alias(self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self
        }
    }

    pub fn kind(&self) -> &SqlKind {
        &self.kind
    }

    pub fn get_alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Whether the node renders as a single operand, no parentheses needed around it.
    pub fn is_simple(&self) -> bool {
        match &self.kind {
            SqlKind::Column(..)
            | SqlKind::Param(..)
            | SqlKind::Value(..)
            | SqlKind::Func(..)
            | SqlKind::Array(..)
            | SqlKind::Json(..)
            | SqlKind::Cast(..)
            | SqlKind::Statement(..) => true,
            SqlKind::Raw(v) => !v.contains(char::is_whitespace),
            SqlKind::List(..) | SqlKind::Concat(..) | SqlKind::Composite(..) => false,
        }
    }

    pub fn write_query(&self, binder: &mut dyn Binder, out: &mut SqlText) -> Result<()> {
        if self.bindings.is_empty() {
            self.write_kind(binder, out)?;
        } else {
            let mut written = SqlText::new();
            self.write_kind(binder, &mut written)?;
            out.append(written.substitute(&self.bindings, |v| {
                let mut value = SqlText::new();
                binder.serialize(v, true, &mut value)?;
                value.render(|t| Ok(t.to_string()))
            })?);
        }
        if let Some(alias) = &self.alias {
            binder.writer().write_alias(
                &mut Context::new(Fragment::SqlSelect),
                out,
                alias,
            );
        }
        Ok(())
    }

    fn write_kind(&self, binder: &mut dyn Binder, out: &mut SqlText) -> Result<()> {
        let writer = binder.writer();
        let mut context = Context::default();
        match &self.kind {
            SqlKind::Column(name) => binder.protect(name, out),
            SqlKind::Param(value) => binder.serialize(value, true, out)?,
            SqlKind::Value(value) => binder.serialize(value, false, out)?,
            SqlKind::Func(name, args) => {
                out.push_str(name);
                out.push('(');
                Self::write_separated(binder, out, args, ", ")?;
                out.push(')');
            }
            SqlKind::Cast(expression, ty) => {
                let mut inner = SqlText::new();
                expression.write_query(binder, &mut inner)?;
                writer.write_cast(&mut context, out, inner, ty, expression.is_simple());
            }
            SqlKind::Array(value) => {
                let mut literal = String::new();
                write_array_element(&mut literal, value);
                binder.serialize(&Value::Varchar(literal), false, out)?;
            }
            SqlKind::List(items) => Self::write_separated(binder, out, items, ", ")?,
            SqlKind::Raw(text) => out.push_str(text),
            SqlKind::Json(value) => binder.serialize(&Value::Json(value.clone()), false, out)?,
            SqlKind::Concat(operands) => {
                let mut written = Vec::with_capacity(operands.len());
                for operand in operands {
                    let mut text = SqlText::new();
                    operand.write_query(binder, &mut text)?;
                    written.push(text);
                }
                writer.write_concat(&mut context, out, written);
            }
            SqlKind::Composite(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    match part {
                        Part::Text(text) => out.push_str(text),
                        Part::Node(node) => node.write_query(binder, out)?,
                    }
                }
            }
            SqlKind::Statement(query) => binder.statement(query, out)?,
        }
        Ok(())
    }

    fn write_separated(
        binder: &mut dyn Binder,
        out: &mut SqlText,
        nodes: &[Sql],
        separator: &str,
    ) -> Result<()> {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            node.write_query(binder, out)?;
        }
        Ok(())
    }

    /// Self contained SQL for `dialect`, parameters written as literals.
    pub fn to_sql(&self, dialect: Dialect) -> Result<String> {
        let mut out = SqlText::new();
        self.write_query(&mut LiteralBinder::new(dialect.writer()), &mut out)?;
        out.render(|v| Ok(dialect.writer().quoted(v)))
    }
}

impl<T: AsValue> From<T> for Sql {
    fn from(value: T) -> Self {
        Sql::value(value.as_value())
    }
}

impl From<&str> for Sql {
    fn from(value: &str) -> Self {
        Sql::value(value)
    }
}

impl From<Value> for Sql {
    fn from(value: Value) -> Self {
        Sql::value(value)
    }
}

/// Writes one element of a Postgres array literal.
fn write_array_element(out: &mut String, value: &Value) {
    match value {
        Value::List(items) => {
            out.push('{');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_array_element(out, item);
            }
            out.push('}');
        }
        Value::Null => out.push_str("NULL"),
        Value::Boolean(v) => out.push(if *v { 't' } else { 'f' }),
        Value::Int(v) => drop(write!(out, "{}", v)),
        Value::UInt(v) => drop(write!(out, "{}", v)),
        Value::Float(v) => drop(write!(out, "{}", v)),
        Value::Decimal(v) => drop(write!(out, "{}", v)),
        Value::Varchar(v) => write_array_string(out, v),
        Value::Json(v) => write_array_string(out, &v.to_string()),
        Value::Uuid(v) => write_array_string(out, &v.to_string()),
        other => {
            let literal = Dialect::Postgres.writer().literal(other);
            write_array_string(out, literal.trim_matches('\''));
        }
    }
}

fn write_array_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

/// Builder of `CASE WHEN .. THEN .. ELSE .. END` expressions.
///
/// Conditions given as text are written verbatim, results given as values are escaped.
#[derive(Default, Debug, Clone)]
pub struct CaseBuilder {
    branches: Vec<(Part, Sql)>,
    otherwise: Option<Sql>,
}

impl CaseBuilder {
    pub fn when(mut self, condition: impl Into<Part>, then: impl Into<Sql>) -> Self {
        self.branches.push((condition.into(), then.into()));
        self
    }

    pub fn otherwise(mut self, value: impl Into<Sql>) -> Self {
        self.otherwise = Some(value.into());
        self
    }

    pub fn end(self) -> Sql {
        let mut parts = vec![Part::Text("CASE".into())];
        for (condition, then) in self.branches {
            parts.push(Part::Text("WHEN".into()));
            parts.push(condition);
            parts.push(Part::Text("THEN".into()));
            parts.push(Part::Node(then));
        }
        if let Some(otherwise) = self.otherwise {
            parts.push(Part::Text("ELSE".into()));
            parts.push(Part::Node(otherwise));
        }
        parts.push(Part::Text("END".into()));
        Sql::new(SqlKind::Composite(parts))
    }
}
