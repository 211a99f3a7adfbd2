use crate::{
    Arg, Binder, DatabaseError, Dialect, Error, Params, Query, Resolver, Result, SqlText,
    StatementKind, Value, find_top_level, placeholder, protect_identifier,
    writer::{Context, Fragment, SqlWriter},
};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Keyword joining two fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    fn keyword(self) -> &'static str {
        match self {
            Combinator::And => " AND ",
            Combinator::Or => " OR ",
        }
    }
}

/// Operators recognized at the end of a column, longest spelling first.
const TRAILING_OPERATORS: &[&str] = &[
    "IS NOT", "NOT LIKE", "NOT IN", "LIKE", "IS", "IN", "!=", "<>", "<=", ">=", "=", "<", ">",
];

/// Operators splitting a value-less expression, in order of precedence.
const EXPRESSION_OPERATORS: &[&str] = &[
    " IS NOT NULL",
    " IS NULL",
    "!=",
    "<=",
    ">=",
    "<>",
    "=",
    "<",
    ">",
];

fn ends_with_ignore_case(value: &str, suffix: &str) -> bool {
    value.len() >= suffix.len()
        && value.as_bytes()[value.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

/// Splits a trailing comparison operator from a column, `("age", Some(">="))` for `"age >="`.
pub(crate) fn split_operator(column: &str) -> (&str, Option<&'static str>) {
    let column = column.trim();
    for &op in TRAILING_OPERATORS {
        let is_word = op.starts_with(|c: char| c.is_ascii_alphabetic());
        let matched = if is_word {
            column.len() > op.len()
                && ends_with_ignore_case(column, op)
                && column.as_bytes()[column.len() - op.len() - 1] == b' '
        } else {
            column.len() > op.len() && column.ends_with(op)
        };
        if matched {
            return (column[..column.len() - op.len()].trim_end(), Some(op));
        }
    }
    (column, None)
}

/// Whether the right side of an expression must be kept verbatim instead of quoted.
pub(crate) fn is_literal(value: &str) -> bool {
    value.starts_with(['\'', ':', '?', '$', '('])
        || (value.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
            && value.parse::<f64>().is_ok())
        || ["NULL", "TRUE", "FALSE"]
            .iter()
            .any(|v| value.eq_ignore_ascii_case(v))
}

/// Values on the right side of `IN`: any iterator of values, a sub statement or a condition.
pub trait InValues {
    fn into_arg(self) -> Arg;
}

impl<I, V> InValues for I
where
    I: IntoIterator<Item = V>,
    V: Into<Arg>,
{
    fn into_arg(self) -> Arg {
        Arg::List(self.into_iter().map(Into::into).collect())
    }
}

impl InValues for Query {
    fn into_arg(self) -> Arg {
        Arg::Query(self.into())
    }
}

impl InValues for Condition {
    fn into_arg(self) -> Arg {
        Arg::Condition(self.into())
    }
}

/// Fragment of a WHERE, HAVING or ON clause.
///
/// Every call appends one parenthesized fragment, joined to the previous one with `AND` or
/// `OR`. Values become auto generated bind parameters named `:p{instance}_{n}`, the instance
/// id is unique across the process so fragments from different conditions never clash.
///
/// ```rust
/// use strata_core::{Condition, Conditional, Dialect};
/// let condition = Condition::new(Dialect::Postgres)
///     .where_("age >=", 18)
///     .or_where("name", "root");
/// assert_eq!(
///     condition.to_literal().unwrap(),
///     r#"("age" >= 18) OR ("name" = 'root')"#
/// );
/// // Until bound, the text keeps its placeholders
/// assert!(condition.to_sql().unwrap().starts_with(r#"("age" >= :p"#));
/// ```
#[derive(Debug)]
pub struct Condition {
    id: u64,
    dialect: Dialect,
    text: SqlText,
    combine: bool,
    depth: u32,
    counter: u32,
    params: Params,
    bindings: Params,
    /// Manual values taken from embedded conditions, they survive a rebind.
    nested_bindings: Params,
    bound: bool,
    resolving: bool,
    error: Option<DatabaseError>,
}

impl Condition {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            dialect,
            text: SqlText::new(),
            combine: false,
            depth: 0,
            counter: 0,
            params: Params::new(),
            bindings: Params::new(),
            nested_bindings: Params::new(),
            bound: false,
            resolving: false,
            error: None,
        }
    }

    /// Condition whose qualifiers are all resolved when the owning statement compiles.
    pub(crate) fn resolving(dialect: Dialect) -> Self {
        Self {
            resolving: true,
            ..Self::new(dialect)
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn text(&self) -> &SqlText {
        &self.text
    }

    pub(crate) fn counter(&self) -> u32 {
        self.counter
    }

    /// Auto generated parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Parameters given through [`Condition::bind`].
    pub fn bindings(&self) -> &Params {
        &self.bindings
    }

    /// First failure recorded while building.
    pub fn check(&self) -> Result<()> {
        if let Some(error) = &self.error {
            return Err(error.clone().into());
        }
        if self.depth > 0 {
            return Err(DatabaseError::configuration(format!(
                "{} group(s) opened and never closed",
                self.depth
            ))
            .into());
        }
        Ok(())
    }

    pub(crate) fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            log::error!("{:#}", error);
            self.error = Some(DatabaseError::capture(&error));
        }
    }

    /// Appends `(text)`, preceded by `combinator` when a fragment is already there.
    pub fn append_fragment(&mut self, text: SqlText, combinator: Combinator) {
        if self.combine {
            self.text.push_str(combinator.keyword());
        }
        self.text.push('(');
        self.text.append(text);
        self.text.push(')');
        self.combine = true;
    }

    fn next_param(&mut self, value: Value) -> String {
        self.counter += 1;
        let name = format!("p{}_{}", self.id, self.counter);
        self.params.insert(&name, value);
        name
    }

    /// Takes the parameters and the failure of a condition that is being embedded.
    pub(crate) fn absorb(&mut self, other: &Condition) {
        self.params.absorb(&other.params);
        self.bindings.absorb(&other.bindings);
        self.nested_bindings.absorb(&other.bindings);
        self.bound |= other.bound;
        if let Err(error) = other.check() {
            self.fail(error);
        }
    }

    /// Writes the value side of a comparison.
    pub fn escape_value(&mut self, value: &Arg, out: &mut SqlText) -> Result<()> {
        match value {
            Arg::Value(Value::List(values)) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.serialize(v, true, out)?;
                }
            }
            Arg::Value(v) => self.serialize(v, true, out)?,
            Arg::Raw(v) => out.push_str(v),
            Arg::List(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.escape_value(v, out)?;
                }
            }
            Arg::Sql(v) => v.write_query(self, out)?,
            Arg::Condition(v) => {
                self.absorb(v);
                out.push('(');
                out.append(v.text.clone());
                out.push(')');
            }
            Arg::Query(v) => self.statement(v, out)?,
        }
        Ok(())
    }

    fn protect_column(&self, column: &str, out: &mut SqlText) {
        protect_identifier(
            self.dialect.writer(),
            &mut Context::new(Fragment::SqlSelectWhere),
            out,
            column,
            None,
            self.resolving,
        );
    }

    fn push_fragment(&mut self, combinator: Combinator, fragment: Result<SqlText>) {
        match fragment {
            Ok(text) => self.append_fragment(text, combinator),
            Err(error) => self.fail(error),
        }
    }

    pub(crate) fn compare(&mut self, combinator: Combinator, column: &str, value: Arg) {
        let fragment = self.comparison(column, value);
        self.push_fragment(combinator, fragment);
    }

    fn comparison(&mut self, column: &str, value: Arg) -> Result<SqlText> {
        let (column, op) = split_operator(column);
        let negated = matches!(op, Some("!=" | "<>" | "IS NOT" | "NOT IN" | "NOT LIKE"));
        if value.is_null() {
            let mut out = SqlText::new();
            self.protect_column(column, &mut out);
            out.push_str(if negated { " IS NOT NULL" } else { " IS NULL" });
            return Ok(out);
        }
        if matches!(op, Some("IN" | "NOT IN")) {
            let values = if value.is_list() || value.is_statement() {
                value
            } else {
                Arg::List(vec![value])
            };
            return self.membership(column, values, negated);
        }
        if value.is_list() && !matches!(op, Some("LIKE" | "NOT LIKE")) {
            return self.membership(column, value, negated);
        }
        let mut out = SqlText::new();
        self.protect_column(column, &mut out);
        out.push(' ');
        out.push_str(op.unwrap_or("="));
        out.push(' ');
        self.escape_value(&value, &mut out)?;
        Ok(out)
    }

    pub(crate) fn expression(&mut self, combinator: Combinator, expression: &str) {
        let fragment = self.parse_expression(expression);
        self.push_fragment(combinator, fragment);
    }

    fn parse_expression(&mut self, expression: &str) -> Result<SqlText> {
        let mut out = SqlText::new();
        for &op in EXPRESSION_OPERATORS {
            let Some(i) = find_top_level(expression, op) else {
                continue;
            };
            let lhs = expression[..i].trim();
            let rhs = expression[i + op.len()..].trim();
            self.protect_column(lhs, &mut out);
            if op.starts_with(" IS") {
                out.push_str(op);
                if !rhs.is_empty() {
                    out.push(' ');
                    out.push_str(rhs);
                }
            } else {
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                if is_literal(rhs) {
                    out.push_str(rhs);
                } else {
                    self.protect_column(rhs, &mut out);
                }
            }
            return Ok(out);
        }
        self.protect_column(expression, &mut out);
        Ok(out)
    }

    pub(crate) fn template(&mut self, combinator: Combinator, template: &str, params: &Params) {
        let fragment = self.substitute_template(template, params);
        self.push_fragment(combinator, fragment);
    }

    fn substitute_template(&mut self, template: &str, params: &Params) -> Result<SqlText> {
        let mut positional = 0;
        let text = placeholder::substitute(template, params, &mut positional, &mut |v: &Value| {
            Ok(match v {
                Value::List(values) => values
                    .iter()
                    .map(|v| format!(":{}", self.next_param(v.clone())))
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => format!(":{}", self.next_param(v.clone())),
            })
        })?;
        Ok(text.as_str().into())
    }

    pub(crate) fn nested(&mut self, combinator: Combinator, condition: &Condition) {
        self.absorb(condition);
        if !condition.is_empty() {
            self.append_fragment(condition.text.clone(), combinator);
        }
    }

    pub(crate) fn within(
        &mut self,
        combinator: Combinator,
        column: &str,
        values: Arg,
        negated: bool,
    ) {
        let fragment = self.membership(column, values, negated);
        self.push_fragment(combinator, fragment);
    }

    fn membership(&mut self, column: &str, values: Arg, negated: bool) -> Result<SqlText> {
        let mut out = SqlText::new();
        let empty = match &values {
            Arg::List(v) => v.is_empty(),
            Arg::Value(Value::List(v)) => v.is_empty(),
            _ => false,
        };
        if empty {
            // Nothing is in an empty set
            out.push_str(if negated { "1 = 1" } else { "1 = 0" });
            return Ok(out);
        }
        self.protect_column(column, &mut out);
        out.push_str(if negated { " NOT IN " } else { " IN " });
        match &values {
            Arg::Query(query) => self.statement(query, &mut out)?,
            Arg::Condition(..) => self.escape_value(&values, &mut out)?,
            _ => {
                out.push('(');
                self.escape_value(&values, &mut out)?;
                out.push(')');
            }
        }
        Ok(out)
    }

    pub(crate) fn between(
        &mut self,
        combinator: Combinator,
        column: &str,
        low: Arg,
        high: Arg,
        negated: bool,
    ) {
        let fragment = (|| -> Result<SqlText> {
            let mut out = SqlText::new();
            self.protect_column(column, &mut out);
            out.push_str(if negated { " NOT BETWEEN " } else { " BETWEEN " });
            self.escape_value(&low, &mut out)?;
            out.push_str(" AND ");
            self.escape_value(&high, &mut out)?;
            Ok(out)
        })();
        self.push_fragment(combinator, fragment);
    }

    pub(crate) fn like(&mut self, combinator: Combinator, column: &str, pattern: Arg, negated: bool) {
        let fragment = (|| -> Result<SqlText> {
            let mut out = SqlText::new();
            self.protect_column(column, &mut out);
            out.push_str(if negated { " NOT LIKE " } else { " LIKE " });
            self.escape_value(&pattern, &mut out)?;
            Ok(out)
        })();
        self.push_fragment(combinator, fragment);
    }

    pub(crate) fn open_group(&mut self, combinator: Combinator, negated: bool) {
        if self.combine {
            self.text.push_str(combinator.keyword());
        }
        self.text.push_str(if negated { "NOT (" } else { "(" });
        self.combine = false;
        self.depth += 1;
    }

    pub(crate) fn close_group(&mut self) {
        if self.depth == 0 {
            self.fail(DatabaseError::configuration("group_end called without an open group").into());
            return;
        }
        self.text.push(')');
        self.depth -= 1;
        self.combine = true;
    }

    /// Records the values of the manual placeholders, the template is left untouched.
    ///
    /// Each call replaces the values of the previous one.
    pub fn bind(mut self, params: Params) -> Self {
        let mut bindings = params;
        bindings.absorb(&self.nested_bindings);
        self.bindings = bindings;
        self.bound = true;
        self
    }

    /// Fragment text, see [`Condition::to_sql_with`].
    pub fn to_sql(&self) -> Result<String> {
        self.to_sql_with(&Resolver::new())
    }

    /// Fragment text with deferred qualifiers resolved through `resolver`.
    ///
    /// Placeholders stay in place until the condition is bound, a bound condition gets its
    /// generated parameters then its manual ones as literals.
    pub fn to_sql_with(&self, resolver: &Resolver) -> Result<String> {
        self.check()?;
        if self.bound {
            return self.to_literal_with(resolver);
        }
        let writer = self.dialect.writer();
        self.text.render(|v| resolver.qualifier(v, writer))
    }

    /// Fragment text with every known value written as a literal, meant for logs and tests.
    pub fn to_literal(&self) -> Result<String> {
        self.to_literal_with(&Resolver::new())
    }

    pub fn to_literal_with(&self, resolver: &Resolver) -> Result<String> {
        self.check()?;
        let writer = self.dialect.writer();
        let text = self
            .text
            .substitute(&self.params, |v| Ok(writer.literal(v)))?
            .substitute(&self.bindings, |v| Ok(writer.literal(v)))?;
        text.render(|v| resolver.qualifier(v, writer))
    }
}

impl Clone for Condition {
    /// The copy is a new instance: it gets its own id so its future parameters are distinct.
    fn clone(&self) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            dialect: self.dialect,
            text: self.text.clone(),
            combine: self.combine,
            depth: self.depth,
            counter: self.counter,
            params: self.params.clone(),
            bindings: self.bindings.clone(),
            nested_bindings: self.nested_bindings.clone(),
            bound: self.bound,
            resolving: self.resolving,
            error: self.error.clone(),
        }
    }
}

impl Binder for Condition {
    fn writer(&self) -> &'static dyn SqlWriter {
        self.dialect.writer()
    }

    fn serialize(&mut self, value: &Value, as_param: bool, out: &mut SqlText) -> Result<()> {
        if as_param {
            let name = self.next_param(value.clone());
            out.push(':');
            out.push_str(&name);
        } else {
            self.dialect
                .writer()
                .write_value(&mut Context::default(), out, value);
        }
        Ok(())
    }

    fn protect(&mut self, identifier: &str, out: &mut SqlText) {
        self.protect_column(identifier, out);
    }

    fn statement(&mut self, query: &Query, out: &mut SqlText) -> Result<()> {
        let statement = query.compile(StatementKind::Select)?;
        out.push('(');
        out.push_str(&statement.sql);
        out.push(')');
        self.params.absorb(&statement.params);
        Ok(())
    }
}

/// Fluent WHERE API shared by [`Condition`] and [`Query`].
///
/// Failures do not interrupt the chain, the first one is reported when the result is compiled.
pub trait Conditional: Sized {
    fn condition(&mut self) -> &mut Condition;

    /// `column = value`, the column may end with its own operator (`"age >="`, `"name LIKE"`).
    fn where_(mut self, column: &str, value: impl Into<Arg>) -> Self {
        self.condition().compare(Combinator::And, column, value.into());
        self
    }

    fn and_where(self, column: &str, value: impl Into<Arg>) -> Self {
        self.where_(column, value)
    }

    fn or_where(mut self, column: &str, value: impl Into<Arg>) -> Self {
        self.condition().compare(Combinator::Or, column, value.into());
        self
    }

    /// Value-less expression like `a.id = b.a_id` or `deleted_at IS NULL`.
    fn where_expr(mut self, expression: &str) -> Self {
        self.condition().expression(Combinator::And, expression);
        self
    }

    fn or_where_expr(mut self, expression: &str) -> Self {
        self.condition().expression(Combinator::Or, expression);
        self
    }

    /// Verbatim template, the `?` and `:name` placeholders with a value in `params` become bind
    /// parameters.
    fn where_params(mut self, template: &str, params: Params) -> Self {
        self.condition().template(Combinator::And, template, &params);
        self
    }

    fn or_where_params(mut self, template: &str, params: Params) -> Self {
        self.condition().template(Combinator::Or, template, &params);
        self
    }

    fn where_condition(mut self, condition: Condition) -> Self {
        self.condition().nested(Combinator::And, &condition);
        self
    }

    fn or_where_condition(mut self, condition: Condition) -> Self {
        self.condition().nested(Combinator::Or, &condition);
        self
    }

    fn where_in(mut self, column: &str, values: impl InValues) -> Self {
        self.condition()
            .within(Combinator::And, column, values.into_arg(), false);
        self
    }

    fn where_not_in(mut self, column: &str, values: impl InValues) -> Self {
        self.condition()
            .within(Combinator::And, column, values.into_arg(), true);
        self
    }

    fn or_where_in(mut self, column: &str, values: impl InValues) -> Self {
        self.condition()
            .within(Combinator::Or, column, values.into_arg(), false);
        self
    }

    fn or_where_not_in(mut self, column: &str, values: impl InValues) -> Self {
        self.condition()
            .within(Combinator::Or, column, values.into_arg(), true);
        self
    }

    fn where_between(mut self, column: &str, low: impl Into<Arg>, high: impl Into<Arg>) -> Self {
        self.condition()
            .between(Combinator::And, column, low.into(), high.into(), false);
        self
    }

    fn where_not_between(
        mut self,
        column: &str,
        low: impl Into<Arg>,
        high: impl Into<Arg>,
    ) -> Self {
        self.condition()
            .between(Combinator::And, column, low.into(), high.into(), true);
        self
    }

    fn or_where_between(
        mut self,
        column: &str,
        low: impl Into<Arg>,
        high: impl Into<Arg>,
    ) -> Self {
        self.condition()
            .between(Combinator::Or, column, low.into(), high.into(), false);
        self
    }

    fn or_where_not_between(
        mut self,
        column: &str,
        low: impl Into<Arg>,
        high: impl Into<Arg>,
    ) -> Self {
        self.condition()
            .between(Combinator::Or, column, low.into(), high.into(), true);
        self
    }

    fn where_like(mut self, column: &str, pattern: impl Into<Arg>) -> Self {
        self.condition()
            .like(Combinator::And, column, pattern.into(), false);
        self
    }

    fn where_not_like(mut self, column: &str, pattern: impl Into<Arg>) -> Self {
        self.condition()
            .like(Combinator::And, column, pattern.into(), true);
        self
    }

    fn or_where_like(mut self, column: &str, pattern: impl Into<Arg>) -> Self {
        self.condition()
            .like(Combinator::Or, column, pattern.into(), false);
        self
    }

    fn or_where_not_like(mut self, column: &str, pattern: impl Into<Arg>) -> Self {
        self.condition()
            .like(Combinator::Or, column, pattern.into(), true);
        self
    }

    fn group_start(mut self) -> Self {
        self.condition().open_group(Combinator::And, false);
        self
    }

    fn or_group_start(mut self) -> Self {
        self.condition().open_group(Combinator::Or, false);
        self
    }

    fn not_group_start(mut self) -> Self {
        self.condition().open_group(Combinator::And, true);
        self
    }

    fn or_not_group_start(mut self) -> Self {
        self.condition().open_group(Combinator::Or, true);
        self
    }

    fn group_end(mut self) -> Self {
        self.condition().close_group();
        self
    }
}

impl Conditional for Condition {
    fn condition(&mut self) -> &mut Condition {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_operators() {
        assert_eq!(split_operator("age >="), ("age", Some(">=")));
        assert_eq!(split_operator("age>"), ("age", Some(">")));
        assert_eq!(split_operator("a <>"), ("a", Some("<>")));
        assert_eq!(split_operator("name not like"), ("name", Some("NOT LIKE")));
        assert_eq!(split_operator("deleted_at IS NOT"), ("deleted_at", Some("IS NOT")));
        assert_eq!(split_operator("status"), ("status", None));
        assert_eq!(split_operator("login"), ("login", None));
        assert_eq!(split_operator("this"), ("this", None));
    }

    #[test]
    fn combinators_between_fragments_only() {
        let condition = Condition::new(Dialect::Postgres)
            .group_start()
            .where_("a", 1)
            .or_where("b", 2)
            .group_end()
            .not_group_start()
            .where_("c", Value::Null)
            .group_end()
            .or_group_start()
            .where_("d !=", Value::Null)
            .group_end();
        assert_eq!(
            condition.to_literal().unwrap(),
            r#"(("a" = 1) OR ("b" = 2)) AND NOT (("c" IS NULL)) OR (("d" IS NOT NULL))"#
        );
    }

    #[test]
    fn unbalanced_groups_fail() {
        let condition = Condition::new(Dialect::Sqlite).group_start().where_("a", 1);
        assert!(condition.to_sql().is_err());
        let condition = Condition::new(Dialect::Sqlite).group_end();
        assert!(matches!(
            condition.check().map_err(|e| DatabaseError::capture(&e)),
            Err(DatabaseError::Configuration(..))
        ));
    }

    #[test]
    fn expressions() {
        let condition = Condition::new(Dialect::MySql)
            .where_expr("u.id = p.user_id")
            .where_expr("p.deleted_at is null")
            .where_expr("p.score >= 10")
            .where_expr("p.title != 'draft'")
            .where_expr("p.owner = :owner");
        assert_eq!(
            condition.to_sql().unwrap(),
            "(`u`.`id` = `p`.`user_id`) AND (`p`.`deleted_at` IS NULL) AND (`p`.`score` >= 10) \
             AND (`p`.`title` != 'draft') AND (`p`.`owner` = :owner)"
        );
    }

    #[test]
    fn rebinding_keeps_the_template() {
        let condition = Condition::new(Dialect::Postgres).where_expr("status = :status");
        let first = condition.clone().bind(Params::new().with("status", 1));
        let second = condition.clone().bind(Params::new().with("status", "closed"));
        assert_eq!(first.to_sql().unwrap(), r#"("status" = 1)"#);
        assert_eq!(second.to_sql().unwrap(), r#"("status" = 'closed')"#);
        assert_eq!(condition.to_sql().unwrap(), r#"("status" = :status)"#);
    }

    #[test]
    fn templates_take_known_placeholders() {
        let condition = Condition::new(Dialect::Sqlite).where_params(
            "a = ? AND b IN (:list) AND c = :later",
            Params::positional([5]).with("list", vec![1, 2]),
        );
        let auto: Vec<_> = condition.params().named.values().cloned().collect();
        assert_eq!(auto, [Value::Int(5), Value::Int(1), Value::Int(2)]);
        assert_eq!(
            condition.to_literal().unwrap(),
            "(a = 5 AND b IN (1, 2) AND c = :later)"
        );
    }

    #[test]
    fn placeholders_until_bound() {
        let condition = Condition::new(Dialect::Postgres).where_("age >=", 18);
        let id = condition.id();
        assert_eq!(condition.to_sql().unwrap(), format!(r#"("age" >= :p{}_1)"#, id));
        assert_eq!(condition.to_literal().unwrap(), r#"("age" >= 18)"#);
        let bound = condition.bind(Params::new());
        assert_eq!(bound.to_sql().unwrap(), r#"("age" >= 18)"#);
    }

    #[test]
    fn rebinding_replaces_the_values() {
        let inner = Condition::new(Dialect::Sqlite)
            .where_expr("kind = :kind")
            .bind(Params::new().with("kind", "post"));
        let condition = Condition::new(Dialect::Sqlite)
            .where_expr("a = :a")
            .where_expr("b = :b")
            .where_condition(inner)
            .bind(Params::new().with("a", 1).with("b", 2))
            .bind(Params::new().with("a", 3));
        assert_eq!(
            condition.to_sql().unwrap(),
            r#"("a" = 3) AND ("b" = :b) AND (("kind" = 'post'))"#
        );
    }

    #[test]
    fn in_operator_with_any_value() {
        let condition = Condition::new(Dialect::MySql)
            .where_("status IN", 5)
            .where_("kind NOT IN", "draft")
            .or_where("id in", vec![1, 2]);
        assert_eq!(
            condition.to_literal().unwrap(),
            "(`status` IN (5)) AND (`kind` NOT IN ('draft')) OR (`id` IN (1, 2))"
        );
    }

    #[test]
    fn literals_on_the_right_side() {
        assert!(is_literal("-1.5"));
        assert!(is_literal(".5"));
        assert!(is_literal("1e3"));
        assert!(is_literal("null"));
        assert!(is_literal(":name"));
        assert!(!is_literal("nan"));
        assert!(!is_literal("inf"));
        assert!(!is_literal("Infinity"));
        let condition = Condition::new(Dialect::Postgres)
            .where_expr("a = nan")
            .where_expr("b = 1e3");
        assert_eq!(condition.to_sql().unwrap(), r#"("a" = "nan") AND ("b" = 1e3)"#);
    }

    #[test]
    fn clones_get_their_own_parameters() {
        let condition = Condition::new(Dialect::Sqlite).where_("a", 1);
        let copy = condition.clone().where_("b", 2);
        assert_ne!(condition.id(), copy.id());
        let names: Vec<_> = copy.params().named.keys().cloned().collect();
        assert_eq!(names.len(), 2);
        assert_ne!(names[0], names[1]);
    }
}
