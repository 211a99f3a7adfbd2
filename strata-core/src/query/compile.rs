use super::{Assignment, Query, Statement, StatementKind, TableSource};
use crate::{
    Arg, Binder, Column, DatabaseError, Order, Params, Resolver, Result, SqlText, TableRef, Value,
    condition::is_literal,
    find_top_level, placeholder, protect_identifier,
    writer::{Context, Fragment, SqlWriter},
};
use std::borrow::Cow;

/// Compilation of one statement out of a [`Query`].
///
/// Parameters generated here continue the numbering of the query condition, they are not stored
/// in the query so compiling again yields the same text and the same names.
pub(super) struct Compiler<'q> {
    query: &'q Query,
    writer: &'static dyn SqlWriter,
    resolver: Resolver,
    id: u64,
    counter: u32,
    params: Params,
    single: bool,
}

impl<'q> Compiler<'q> {
    pub(super) fn new(query: &'q Query) -> Self {
        Self {
            query,
            writer: query.dialect.writer(),
            resolver: query.resolver.clone(),
            id: query.condition.id(),
            counter: query.condition.counter(),
            params: Params::new(),
            single: false,
        }
    }

    /// Limits the SELECT to one row when no limit is set.
    pub(super) fn single(mut self) -> Self {
        self.single = true;
        self
    }

    pub(super) fn compile(mut self, kind: StatementKind) -> Result<Statement> {
        self.query.check()?;
        self.register_aliases(kind);
        let mut out = SqlText::new();
        match kind {
            StatementKind::Select => self.write_select(&mut out)?,
            StatementKind::Exists => {
                out.push_str("SELECT EXISTS(");
                self.write_select(&mut out)?;
                out.push(')');
                self.writer
                    .write_alias(&mut Context::new(Fragment::SqlSelect), &mut out, "exists");
            }
            StatementKind::Count => self.write_count(&mut out)?,
            StatementKind::Insert => self.write_insert(&mut out, false)?,
            StatementKind::Upsert => self.write_insert(&mut out, true)?,
            StatementKind::Update => self.write_update(&mut out)?,
            StatementKind::Delete => self.write_delete(&mut out)?,
            StatementKind::Truncate => {
                let table = self.target()?;
                self.writer.write_truncate(
                    &mut Context::new(Fragment::SqlDeleteFrom),
                    &mut out,
                    &table,
                )?;
            }
        }
        let sql = out.render(|v| self.resolver.qualifier(v, self.writer))?;
        let mut params = self.query.bindings();
        params.absorb(&self.params);
        Ok(Statement {
            sql,
            params,
            dialect: self.query.dialect,
        })
    }

    /// Aliases must be known before any condition is rendered, ON conditions included.
    fn register_aliases(&mut self, kind: StatementKind) {
        let reading = !kind.is_write();
        match &self.query.table {
            Some(TableSource::Name {
                token,
                alias: Some(alias),
            }) if reading => self.resolver.register_alias(token, alias),
            Some(TableSource::Statement { alias, .. }) => {
                self.resolver.register_alias(alias, alias)
            }
            _ => {}
        }
        for join in &self.query.joins {
            if let Some(alias) = &join.alias {
                self.resolver.register_alias(&join.token, alias);
            }
        }
    }

    fn missing_table(&self) -> DatabaseError {
        DatabaseError::configuration("No table was given to the query")
    }

    /// Table written by INSERT, UPDATE, DELETE and TRUNCATE, aliases are not declared there.
    fn target(&self) -> Result<TableRef> {
        match &self.query.table {
            Some(TableSource::Name { token, .. }) => self.resolver.resolve(token),
            Some(TableSource::Fixed(table)) => Ok(TableRef {
                alias: String::new(),
                ..table.clone()
            }),
            Some(TableSource::Statement { alias, .. }) => Err(DatabaseError::configuration(
                format!("Cannot write into the sub statement `{}`", alias),
            )
            .into()),
            None => Err(self.missing_table().into()),
        }
    }

    fn write_table_source(&mut self, out: &mut SqlText) -> Result<()> {
        let mut context = Context::new(Fragment::SqlSelectFrom);
        match &self.query.table {
            Some(TableSource::Name { token, alias }) => {
                let mut table = self.resolver.resolve(token)?;
                if let Some(alias) = alias {
                    table.alias = alias.clone();
                }
                self.writer.write_table_ref(&mut context, out, &table);
            }
            Some(TableSource::Fixed(table)) => self.writer.write_table_ref(&mut context, out, table),
            Some(TableSource::Statement { query, alias }) => {
                self.statement(query, out)?;
                self.writer.write_alias(&mut context, out, alias);
            }
            None => return Err(self.missing_table().into()),
        }
        Ok(())
    }

    fn write_columns(
        &mut self,
        out: &mut SqlText,
        columns: &[Column],
        fragment: Fragment,
    ) -> Result<()> {
        if columns.is_empty() {
            out.push('*');
            return Ok(());
        }
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_column(out, column, fragment)?;
        }
        Ok(())
    }

    fn write_column(&mut self, out: &mut SqlText, column: &Column, fragment: Fragment) -> Result<()> {
        match column {
            Column::Name(name) => protect_identifier(
                self.writer,
                &mut Context::new(fragment),
                out,
                name,
                None,
                true,
            ),
            Column::Sql(sql) => sql.write_query(self, out)?,
        }
        Ok(())
    }

    fn write_joins(&mut self, out: &mut SqlText) -> Result<()> {
        let mut context = Context::new(Fragment::SqlJoin);
        for join in &self.query.joins {
            self.writer.write_join_type(&mut context, out, join.kind)?;
            let mut table = self.resolver.resolve(&join.token)?;
            if let Some(alias) = &join.alias {
                table.alias = alias.clone();
            }
            self.writer.write_table_ref(&mut context, out, &table);
            if let Some(on) = &join.on {
                if !on.is_empty() {
                    out.push_str(" ON ");
                    out.append(on.text().clone());
                }
            }
        }
        Ok(())
    }

    fn write_where(&self, out: &mut SqlText) {
        if !self.query.condition.is_empty() {
            out.push_str(" WHERE ");
            out.append(self.query.condition.text().clone());
        }
    }

    fn write_select(&mut self, out: &mut SqlText) -> Result<()> {
        let query = self.query;
        out.push_str("SELECT ");
        if query.distinct {
            out.push_str("DISTINCT ");
        }
        if let Some(modifier) = &query.modifier {
            out.push_str(modifier);
            out.push(' ');
        }
        self.write_columns(out, &query.columns, Fragment::SqlSelect)?;
        out.push_str(" FROM ");
        self.write_table_source(out)?;
        self.write_joins(out)?;
        self.write_where(out);
        if !query.group_by.is_empty() {
            out.push_str(" GROUP BY ");
            self.write_columns(out, &query.group_by, Fragment::SqlSelectGroupBy)?;
        }
        if !query.having.is_empty() {
            out.push_str(" HAVING ");
            out.append(query.having.text().clone());
        }
        if !query.order_by.is_empty() {
            out.push_str(" ORDER BY ");
            for (i, ordered) in query.order_by.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.write_column(out, &ordered.expression, Fragment::SqlSelectOrderBy)?;
                match ordered.order {
                    Some(Order::ASC) => out.push_str(" ASC"),
                    Some(Order::DESC) => out.push_str(" DESC"),
                    None => {}
                }
            }
        }
        let limit = match query.limit {
            None if self.single => Some(1),
            limit => limit,
        };
        self.writer
            .write_limit_offset(&mut Context::default(), out, limit, query.offset);
        if let Some(lock) = query.lock {
            self.writer.write_lock(&mut Context::default(), out, lock)?;
        }
        Ok(())
    }

    fn write_count(&mut self, out: &mut SqlText) -> Result<()> {
        out.push_str("SELECT COUNT(*)");
        self.writer
            .write_alias(&mut Context::new(Fragment::SqlSelect), out, "count");
        out.push_str(" FROM ");
        self.write_table_source(out)?;
        self.write_joins(out)?;
        self.write_where(out);
        Ok(())
    }

    fn write_arg(&mut self, arg: &Arg, out: &mut SqlText) -> Result<()> {
        match arg {
            Arg::Value(value) => self.serialize(value, true, out)?,
            Arg::Raw(value) => out.push_str(value),
            Arg::List(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_arg(v, out)?;
                }
            }
            Arg::Sql(sql) => sql.write_query(self, out)?,
            Arg::Condition(condition) => {
                condition.check()?;
                self.params.absorb(condition.params());
                self.params.absorb(condition.bindings());
                out.push('(');
                out.append(condition.text().clone());
                out.push(')');
            }
            Arg::Query(query) => self.statement(query, out)?,
        }
        Ok(())
    }

    /// Columns and rows to insert, the manual bindings stand for a single row when no values
    /// were given.
    fn rows(&self) -> Result<(Vec<String>, Vec<Vec<Cow<'q, Arg>>>)> {
        let query = self.query;
        if let Some(first) = query.rows.first() {
            let columns: Vec<String> = first.keys().cloned().collect();
            let mut rows = Vec::with_capacity(query.rows.len());
            for row in &query.rows {
                let mut values = Vec::with_capacity(columns.len());
                for column in &columns {
                    let value = row.get(column).ok_or_else(|| {
                        DatabaseError::configuration(format!("Row misses column `{}`", column))
                    })?;
                    values.push(Cow::Borrowed(value));
                }
                rows.push(values);
            }
            return Ok((columns, rows));
        }
        if !query.bindings.named.is_empty() {
            let columns: Vec<String> = query.bindings.named.keys().cloned().collect();
            let row = columns
                .iter()
                .map(|v| Cow::Owned(Arg::Raw(format!(":{}", v))))
                .collect();
            return Ok((columns, vec![row]));
        }
        Ok((Vec::new(), Vec::new()))
    }

    fn write_assignment(&mut self, out: &mut SqlText, column: &str, value: &Arg) -> Result<()> {
        self.writer
            .write_identifier_path(&mut Context::new(Fragment::SqlUpdateSet), out, column);
        out.push_str(" = ");
        self.write_arg(value, out)
    }

    fn write_insert(&mut self, out: &mut SqlText, upsert: bool) -> Result<()> {
        let query = self.query;
        let table = self.target()?;
        let (columns, rows) = self.rows()?;
        if rows.is_empty() {
            let error = DatabaseError::configuration(format!(
                "No values to insert into `{}`",
                table.full_name()
            ));
            log::error!("{}", error);
            return Err(error.into());
        }
        let mut context = Context::new(Fragment::SqlInsertInto);
        self.writer.write_insert_prefix(&mut context, out, query.mode)?;
        self.writer.write_table_ref(&mut context, out, &table);
        out.push_str(" (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.writer.write_identifier_quoted(&mut context, out, column);
        }
        out.push_str(") VALUES ");
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push('(');
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    out.push_str(", ");
                }
                self.write_arg(value, out)?;
            }
            out.push(')');
        }
        if upsert {
            self.write_upsert(out, &table, &columns, &rows)?;
        } else if query.mode == crate::InsertMode::Ignore {
            self.writer.write_insert_ignore_suffix(&mut context, out);
        }
        self.write_returning(out)
    }

    fn conflict_target(&self, table: &TableRef) -> Result<Vec<String>> {
        let query = self.query;
        if !query.upsert.target.is_empty() {
            return Ok(query.upsert.target.clone());
        }
        if let Some(record) = &query.record {
            if !record.identity().is_empty() {
                return Ok(record.identity().iter().map(|v| v.to_string()).collect());
            }
        }
        if self.writer.upsert_requires_target() {
            let error = DatabaseError::configuration(format!(
                "Upsert into `{}` needs a conflict target, call on_conflict or bind a record with identity columns",
                table.full_name()
            ));
            log::error!("{}", error);
            return Err(error.into());
        }
        Ok(Vec::new())
    }

    fn write_upsert(
        &mut self,
        out: &mut SqlText,
        table: &TableRef,
        columns: &[String],
        rows: &[Vec<Cow<'q, Arg>>],
    ) -> Result<()> {
        let query = self.query;
        let target = self.conflict_target(table)?;
        let mut context = Context::new(Fragment::SqlInsertIntoOnConflict);
        self.writer.write_upsert_prefix(&mut context, out, &target)?;
        let updated = |column: &String| !target.contains(column);
        let mut written = 0;
        let mut separate = |out: &mut SqlText| {
            if written > 0 {
                out.push_str(", ");
            }
            written += 1;
        };
        if !query.upsert.set.is_empty() {
            for (column, value) in &query.upsert.set {
                separate(out);
                self.write_assignment(out, column, value)?;
            }
        } else if !query.upsert.columns.is_empty() || rows.len() > 1 {
            let excluded = if query.upsert.columns.is_empty() {
                columns
            } else {
                &query.upsert.columns
            };
            for column in excluded.iter().filter(|v| updated(v)) {
                separate(out);
                self.writer.write_identifier_quoted(&mut context, out, column);
                out.push_str(" = ");
                self.writer.write_upsert_excluded(&mut context, out, column);
            }
        } else {
            for (column, value) in columns.iter().zip(&rows[0]) {
                if updated(column) {
                    separate(out);
                    self.write_assignment(out, column, value)?;
                }
            }
        }
        if written == 0 {
            return Err(DatabaseError::configuration(format!(
                "Upsert into `{}` has nothing to update on conflict",
                table.full_name()
            ))
            .into());
        }
        Ok(())
    }

    fn write_returning(&mut self, out: &mut SqlText) -> Result<()> {
        let query = self.query;
        if query.returning.is_empty() {
            return Ok(());
        }
        self.writer
            .write_returning(&mut Context::new(Fragment::SqlReturning), out)?;
        self.write_columns(out, &query.returning, Fragment::SqlReturning)
    }

    fn write_mutation_tail(&mut self, out: &mut SqlText) -> Result<()> {
        self.write_where(out);
        if let Some(limit) = self.query.limit {
            self.writer
                .write_mutation_limit(&mut Context::default(), out, limit)?;
        }
        self.write_returning(out)
    }

    /// Manual bindings not used by the conditions, they name the columns to update.
    fn inferred_assignments(&self) -> Result<Vec<String>> {
        let condition = self.query.condition.text().render(|v| Ok(v.to_string()))?;
        let having = self.query.having.text().render(|v| Ok(v.to_string()))?;
        let used: Vec<&str> = placeholder::names(&condition)
            .into_iter()
            .chain(placeholder::names(&having))
            .collect();
        Ok(self
            .query
            .bindings
            .named
            .keys()
            .filter(|v| !used.contains(&v.as_str()))
            .cloned()
            .collect())
    }

    fn write_update(&mut self, out: &mut SqlText) -> Result<()> {
        let query = self.query;
        let table = self.target()?;
        out.push_str("UPDATE ");
        self.writer
            .write_table_ref(&mut Context::new(Fragment::SqlUpdate), out, &table);
        out.push_str(" SET ");
        if !query.assignments.is_empty() {
            for (i, assignment) in query.assignments.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match assignment {
                    Assignment::Value(column, value) => {
                        self.write_assignment(out, column, value)?
                    }
                    Assignment::Expression(expression) => {
                        self.write_assignment_expression(out, expression)?
                    }
                }
            }
        } else if query.rows.len() == 1 {
            for (i, (column, value)) in query.rows[0].iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.write_assignment(out, column, value)?;
            }
        } else if query.rows.len() > 1 {
            return Err(DatabaseError::configuration(format!(
                "Cannot update `{}` with {} rows of values",
                table.full_name(),
                query.rows.len()
            ))
            .into());
        } else {
            let columns = self.inferred_assignments()?;
            if columns.is_empty() {
                let error = DatabaseError::configuration(format!(
                    "No values to update in `{}`",
                    table.full_name()
                ));
                log::error!("{}", error);
                return Err(error.into());
            }
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.write_assignment(out, column, &Arg::Raw(format!(":{}", column)))?;
            }
        }
        self.write_mutation_tail(out)
    }

    fn write_assignment_expression(&mut self, out: &mut SqlText, expression: &str) -> Result<()> {
        let Some(i) = find_top_level(expression, "=") else {
            return Err(DatabaseError::configuration(format!(
                "Assignment `{}` has no `=`",
                expression
            ))
            .into());
        };
        let mut context = Context::new(Fragment::SqlUpdateSet);
        self.writer
            .write_identifier_path(&mut context, out, expression[..i].trim());
        out.push_str(" = ");
        let value = expression[i + 1..].trim();
        if is_literal(value) {
            out.push_str(value);
        } else {
            protect_identifier(self.writer, &mut context, out, value, None, true);
        }
        Ok(())
    }

    fn write_delete(&mut self, out: &mut SqlText) -> Result<()> {
        let table = self.target()?;
        out.push_str("DELETE FROM ");
        self.writer
            .write_table_ref(&mut Context::new(Fragment::SqlDeleteFrom), out, &table);
        self.write_mutation_tail(out)
    }
}

impl Binder for Compiler<'_> {
    fn writer(&self) -> &'static dyn SqlWriter {
        self.writer
    }

    fn serialize(&mut self, value: &Value, as_param: bool, out: &mut SqlText) -> Result<()> {
        if as_param {
            self.counter += 1;
            let name = format!("p{}_{}", self.id, self.counter);
            self.params.insert(&name, value.clone());
            out.push(':');
            out.push_str(&name);
        } else {
            self.writer.write_value(&mut Context::default(), out, value);
        }
        Ok(())
    }

    fn protect(&mut self, identifier: &str, out: &mut SqlText) {
        protect_identifier(
            self.writer,
            &mut Context::default(),
            out,
            identifier,
            None,
            true,
        );
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
