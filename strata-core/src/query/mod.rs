mod compile;
mod join;

pub use join::*;

use crate::{
    Arg, AsValue, Column, Combinator, Condition, Conditional, Context, Cursor, Database, DatabaseError,
    Dialect, Error, FromRow, IntoColumns, ModelRegistry, Order, Ordered, Params, Record, Resolver,
    Result, RowLabeled, RowsAffected, TableMap, TableRef, Value, normalize_whitespace, placeholder,
    split_alias, truncate_long,
};
use compile::Compiler;
use indexmap::IndexMap;
use std::{
    fmt::{self, Debug, Display},
    rc::Rc,
};

/// Statement a [`Query`] compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Upsert,
    Update,
    Delete,
    Truncate,
    Exists,
    Count,
}

impl StatementKind {
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            StatementKind::Select | StatementKind::Exists | StatementKind::Count
        )
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    #[default]
    Insert,
    Replace,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lock {
    Update,
    Share,
}

/// Compiled SQL text with the values of its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Params,
    pub dialect: Dialect,
}

impl Statement {
    /// The text with every known placeholder replaced by its literal, for debugging.
    pub fn to_literal(&self) -> Result<String> {
        let writer = self.dialect.writer();
        let mut positional = 0;
        placeholder::substitute(&self.sql, &self.params, &mut positional, &mut |v: &Value| {
            Ok(writer.literal(v))
        })
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}

#[derive(Debug, Clone)]
pub(crate) enum TableSource {
    /// Token resolved when compiling: table name, `schema.table` or model name.
    Name {
        token: String,
        alias: Option<String>,
    },
    Fixed(TableRef),
    Statement {
        query: Box<Query>,
        alias: String,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Join {
    pub(crate) kind: JoinType,
    pub(crate) token: String,
    pub(crate) alias: Option<String>,
    pub(crate) on: Option<Condition>,
}

#[derive(Debug, Clone)]
pub(crate) enum Assignment {
    Value(String, Arg),
    Expression(String),
}

#[derive(Default, Debug, Clone)]
pub(crate) struct Upsert {
    pub(crate) target: Vec<String>,
    pub(crate) set: Vec<(String, Arg)>,
    pub(crate) columns: Vec<String>,
}

/// Statement builder.
///
/// Every fluent method takes and returns the builder, failures are kept and reported by the
/// first compilation. Compiling takes `&self`, the same builder can be compiled and executed
/// any number of times with identical results.
///
/// ```rust
/// use strata_core::{Conditional, Dialect, Query, StatementKind};
/// let query = Query::new(Dialect::Postgres)
///     .table("users u")
///     .columns("u.id, u.name")
///     .where_("u.active", true)
///     .order_by_desc("u.created_at")
///     .limit(10);
/// assert_eq!(
///     query.sql(StatementKind::Select).unwrap(),
///     r#"SELECT "u"."id", "u"."name" FROM "users" AS "u" WHERE ("u"."active" = TRUE) ORDER BY "u"."created_at" DESC LIMIT 10"#
/// );
/// ```
#[derive(Clone)]
pub struct Query {
    pub(crate) dialect: Dialect,
    pub(crate) read: Option<Rc<Database>>,
    pub(crate) write: Option<Rc<Database>>,
    pub(crate) use_write: bool,
    pub(crate) resolver: Resolver,
    pub(crate) table: Option<TableSource>,
    pub(crate) record: Option<Rc<dyn Record>>,
    pub(crate) distinct: bool,
    pub(crate) modifier: Option<String>,
    pub(crate) columns: Vec<Column>,
    pub(crate) joins: Vec<Join>,
    pub(crate) condition: Condition,
    pub(crate) having: Condition,
    pub(crate) group_by: Vec<Column>,
    pub(crate) order_by: Vec<Ordered>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) rows: Vec<IndexMap<String, Arg>>,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) bindings: Params,
    pub(crate) upsert: Upsert,
    pub(crate) returning: Vec<Column>,
    pub(crate) mode: InsertMode,
    pub(crate) lock: Option<Lock>,
    pub(crate) error: Option<DatabaseError>,
}

impl Query {
    /// Builder that only compiles, terminals fail until a connection is attached.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            read: None,
            write: None,
            use_write: false,
            resolver: Resolver::new(),
            table: None,
            record: None,
            distinct: false,
            modifier: None,
            columns: Vec::new(),
            joins: Vec::new(),
            condition: Condition::resolving(dialect),
            having: Condition::resolving(dialect),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            rows: Vec::new(),
            assignments: Vec::new(),
            bindings: Params::new(),
            upsert: Default::default(),
            returning: Vec::new(),
            mode: InsertMode::Insert,
            lock: None,
            error: None,
        }
    }

    pub fn on(database: Rc<Database>) -> Self {
        Self::split(database.clone(), database)
    }

    /// Reads go to `read`, writes go to `write`.
    pub fn split(read: Rc<Database>, write: Rc<Database>) -> Self {
        Self {
            read: Some(read),
            ..Self::new(write.dialect())
        }
        .with_write(write)
    }

    fn with_write(mut self, write: Rc<Database>) -> Self {
        self.write = Some(write);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            log::error!("{:#}", error);
            self.error = Some(DatabaseError::capture(&error));
        }
    }

    /// Table to work on, it can embed an alias (`users u`, `users AS u`).
    pub fn table(mut self, table: &str) -> Self {
        let normalized = normalize_whitespace(table);
        let (token, alias) = split_alias(&normalized);
        self.table = Some(TableSource::Name {
            token: token.to_string(),
            alias: alias.map(str::to_string),
        });
        self
    }

    pub fn from(self, table: &str) -> Self {
        self.table(table)
    }

    pub fn from_as(mut self, table: &str, alias: &str) -> Self {
        self.table = Some(TableSource::Name {
            token: normalize_whitespace(table),
            alias: Some(alias.to_string()),
        });
        self
    }

    /// Selects from a sub statement, `(SELECT ..) AS alias`.
    pub fn from_query(mut self, query: Query, alias: &str) -> Self {
        self.table = Some(TableSource::Statement {
            query: query.into(),
            alias: alias.to_string(),
        });
        self
    }

    /// Binds the statement to a record: its table (unless one is set), its identity columns and
    /// its preferred connections.
    pub fn record(mut self, record: Rc<dyn Record>) -> Self {
        if self.table.is_none() {
            self.table = Some(TableSource::Fixed(record.table_ref()));
        }
        if self.read.is_none() {
            self.read = record.read_connection();
        }
        if self.write.is_none() {
            self.write = record.write_connection();
        }
        self.record = Some(record);
        self
    }

    pub fn table_map(mut self, map: Rc<dyn TableMap>) -> Self {
        self.resolver.set_map(map);
        self
    }

    pub fn models(mut self, models: Rc<ModelRegistry>) -> Self {
        self.resolver.set_models(models);
        self
    }

    /// Sends the reads to the write connection too.
    pub fn use_write_connection(mut self) -> Self {
        self.use_write = true;
        self
    }

    pub fn columns(mut self, columns: impl IntoColumns) -> Self {
        self.columns.extend(columns.into_columns());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Text written verbatim right before the column list (`SQL_CALC_FOUND_ROWS`, `TOP 5`).
    pub fn modifier(mut self, modifier: &str) -> Self {
        self.modifier = Some(modifier.to_string());
        self
    }

    fn push_join(mut self, kind: JoinType, table: &str, args: JoinArgs) -> Self {
        let spec = disambiguate_join_args(table, args);
        let on = match spec.on {
            None => None,
            Some(JoinOn::Expression(expression)) => {
                Some(Condition::resolving(self.dialect).where_expr(&expression))
            }
            Some(JoinOn::Condition(condition)) => Some(condition),
        };
        if kind == JoinType::Cross && on.is_some() {
            self.fail(
                DatabaseError::configuration(format!(
                    "CROSS JOIN `{}` cannot have a condition",
                    spec.table
                ))
                .into(),
            );
        }
        self.joins.push(Join {
            kind,
            token: spec.table,
            alias: spec.alias,
            on,
        });
        self
    }

    /// Inner join, `args` gives the alias and/or the condition in any order.
    pub fn join(self, table: &str, args: impl Into<JoinArgs>) -> Self {
        self.push_join(JoinType::Inner, table, args.into())
    }

    pub fn left_join(self, table: &str, args: impl Into<JoinArgs>) -> Self {
        self.push_join(JoinType::Left, table, args.into())
    }

    pub fn right_join(self, table: &str, args: impl Into<JoinArgs>) -> Self {
        self.push_join(JoinType::Right, table, args.into())
    }

    pub fn full_join(self, table: &str, args: impl Into<JoinArgs>) -> Self {
        self.push_join(JoinType::Full, table, args.into())
    }

    pub fn cross_join(self, table: &str, args: impl Into<JoinArgs>) -> Self {
        self.push_join(JoinType::Cross, table, args.into())
    }

    pub fn having(mut self, column: &str, value: impl Into<Arg>) -> Self {
        self.having.compare(Combinator::And, column, value.into());
        self
    }

    pub fn or_having(mut self, column: &str, value: impl Into<Arg>) -> Self {
        self.having.compare(Combinator::Or, column, value.into());
        self
    }

    pub fn having_expr(mut self, expression: &str) -> Self {
        self.having.expression(Combinator::And, expression);
        self
    }

    pub fn or_having_expr(mut self, expression: &str) -> Self {
        self.having.expression(Combinator::Or, expression);
        self
    }

    pub fn group_by(mut self, columns: impl IntoColumns) -> Self {
        self.group_by.extend(columns.into_columns());
        self
    }

    /// Order by an expression, a trailing `ASC` or `DESC` is kept as written.
    pub fn order_by(mut self, column: impl Into<Column>) -> Self {
        self.order_by.push(Ordered::new(column, None));
        self
    }

    pub fn order_by_asc(mut self, column: impl Into<Column>) -> Self {
        self.order_by.push(Ordered::new(column, Some(Order::ASC)));
        self
    }

    pub fn order_by_desc(mut self, column: impl Into<Column>) -> Self {
        self.order_by.push(Ordered::new(column, Some(Order::DESC)));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Adds one row to insert, every row must have the same columns.
    pub fn values<K, V>(mut self, row: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<Arg>,
    {
        let row: IndexMap<String, Arg> = row
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()))
            .collect();
        if let Some(first) = self.rows.first() {
            if first.len() != row.len() || !row.keys().all(|k| first.contains_key(k)) {
                let error = DatabaseError::configuration(format!(
                    "Row with columns ({}) does not match the previous rows ({})",
                    row.keys().cloned().collect::<Vec<_>>().join(", "),
                    first.keys().cloned().collect::<Vec<_>>().join(", "),
                ));
                self.fail(error.into());
                return self;
            }
        }
        self.rows.push(row);
        self
    }

    /// `column = value` in UPDATE.
    pub fn set(mut self, column: &str, value: impl Into<Arg>) -> Self {
        self.assignments
            .push(Assignment::Value(column.to_string(), value.into()));
        self
    }

    /// Assignment written as an expression, `counter = counter + 1`.
    pub fn set_expr(mut self, expression: &str) -> Self {
        self.assignments
            .push(Assignment::Expression(expression.to_string()));
        self
    }

    /// Values of the manual placeholders, they win over any generated parameter.
    pub fn bind(mut self, params: Params) -> Self {
        self.bindings.overlay(&params);
        self
    }

    /// Conflict target of the upsert.
    pub fn on_conflict(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.upsert.target = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Explicit value given to `column` when the upsert hits a conflict.
    pub fn upsert_set(mut self, column: &str, value: impl Into<Arg>) -> Self {
        self.upsert.set.push((column.to_string(), value.into()));
        self
    }

    /// Columns taking the value proposed by the conflicting row.
    pub fn upsert_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.upsert
            .columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn returning(mut self, columns: impl IntoColumns) -> Self {
        self.returning.extend(columns.into_columns());
        self
    }

    pub fn replace(mut self) -> Self {
        self.mode = InsertMode::Replace;
        self
    }

    pub fn ignore(mut self) -> Self {
        self.mode = InsertMode::Ignore;
        self
    }

    pub fn for_update(mut self) -> Self {
        self.lock = Some(Lock::Update);
        self
    }

    pub fn shared_lock(mut self) -> Self {
        self.lock = Some(Lock::Share);
        self
    }

    pub(crate) fn check(&self) -> Result<()> {
        if let Some(error) = &self.error {
            return Err(error.clone().into());
        }
        self.condition.check()?;
        self.having.check()?;
        for join in &self.joins {
            if let Some(on) = &join.on {
                on.check()?;
            }
        }
        Ok(())
    }

    /// Manual bindings, then the parameters generated while building (conditions and joins).
    ///
    /// Parameters generated while compiling only live in the resulting [`Statement`].
    pub fn bindings(&self) -> Params {
        let mut result = self.bindings.clone();
        let conditions = [&self.condition, &self.having]
            .into_iter()
            .chain(self.joins.iter().filter_map(|v| v.on.as_ref()));
        for condition in conditions {
            result.absorb(condition.params());
            result.absorb(condition.bindings());
        }
        result
    }

    pub fn compile(&self, kind: StatementKind) -> Result<Statement> {
        Compiler::new(self).compile(kind)
    }

    /// Compiled text with literal values, meant for logs and tests.
    pub fn sql(&self, kind: StatementKind) -> Result<String> {
        self.compile(kind)?.to_literal()
    }

    pub fn to_sql(&self) -> Result<String> {
        self.sql(StatementKind::Select)
    }

    fn connection(&self, write: bool) -> Result<Rc<Database>> {
        let (first, second) = if write || self.use_write {
            (&self.write, &self.read)
        } else {
            (&self.read, &self.write)
        };
        first.as_ref().or(second.as_ref()).cloned().ok_or_else(|| {
            let error = DatabaseError::configuration("The query is not bound to any database");
            log::error!("{}", error);
            error.into()
        })
    }

    fn execute(&self, statement: Statement, write: bool) -> Result<Cursor> {
        let database = self.connection(write)?;
        database
            .execute(&statement.sql, &statement.params)
            .with_context(|| format!("While executing `{}`", statement))
    }

    /// Compiles and executes, the cursor gives the rows (or the RETURNING rows).
    pub fn run(&self, kind: StatementKind) -> Result<Cursor> {
        self.execute(self.compile(kind)?, kind.is_write())
    }

    pub fn select(&self) -> Result<Cursor> {
        self.run(StatementKind::Select)
    }

    /// First row, the statement is limited to one row unless a limit is set.
    pub fn first(&self) -> Result<Option<RowLabeled>> {
        let statement = Compiler::new(self).single().compile(StatementKind::Select)?;
        self.execute(statement, false)?.next_row()
    }

    pub fn first_as<T: FromRow>(&self) -> Result<Option<T>> {
        self.first()?.map(T::from_row).transpose()
    }

    pub fn all_as<T: FromRow>(&self) -> Result<Vec<T>> {
        self.select()?.hydrate()
    }

    pub fn insert(&self) -> Result<RowsAffected> {
        Ok(self.run(StatementKind::Insert)?.rows_affected())
    }

    pub fn upsert(&self) -> Result<RowsAffected> {
        Ok(self.run(StatementKind::Upsert)?.rows_affected())
    }

    pub fn update(&self) -> Result<RowsAffected> {
        Ok(self.run(StatementKind::Update)?.rows_affected())
    }

    pub fn delete(&self) -> Result<RowsAffected> {
        Ok(self.run(StatementKind::Delete)?.rows_affected())
    }

    pub fn truncate(&self) -> Result<RowsAffected> {
        Ok(self.run(StatementKind::Truncate)?.rows_affected())
    }

    pub fn exists(&self) -> Result<bool> {
        let value = self.run(StatementKind::Exists)?.fetch_scalar()?;
        <bool as AsValue>::try_from_value(value.unwrap_or(Value::Boolean(false)))
    }

    pub fn count(&self) -> Result<u64> {
        let value = self.run(StatementKind::Count)?.fetch_scalar()?;
        <u64 as AsValue>::try_from_value(value.unwrap_or(Value::UInt(0)))
    }
}

impl Conditional for Query {
    fn condition(&mut self) -> &mut Condition {
        &mut self.condition
    }
}

impl Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("dialect", &self.dialect)
            .field("table", &self.table)
            .field("record", &self.record.as_ref().map(|v| v.table_ref()))
            .field("columns", &self.columns)
            .field("joins", &self.joins)
            .field("condition", &self.condition)
            .field("having", &self.having)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("rows", &self.rows.len())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
