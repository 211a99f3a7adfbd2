use crate::{AsValue, DatabaseError, Error, FetchShape, NativeError, NativeRows, Result, Value};
use indexmap::IndexMap;
use std::{
    fmt::{self, Debug},
    sync::Arc,
};

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted / affected identifier when available.
    pub last_affected_id: Option<i64>,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }

    pub fn names(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }

    /// Converted value of column `name`.
    pub fn get_as<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| Error::msg(format!("Row has no column `{}`", name)))?;
        T::try_from_value(value.clone())
    }

    pub fn into_map(self) -> IndexMap<String, Value> {
        self.labels
            .iter()
            .cloned()
            .zip(self.values.into_vec())
            .collect()
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

/// Row as requested by [`FetchShape`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Labeled(IndexMap<String, Value>),
    Positional(Row),
}

/// Types built out of one result row.
pub trait FromRow: Sized {
    fn from_row(row: RowLabeled) -> Result<Self>;
}

impl FromRow for RowLabeled {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(row)
    }
}

impl FromRow for IndexMap<String, Value> {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(row.into_map())
    }
}

/// Single column rows.
impl<T: AsValue> FromRow for T {
    fn from_row(row: RowLabeled) -> Result<Self> {
        let Some(value) = row.values.into_vec().into_iter().next() else {
            return Err(Error::msg("Row has no columns"));
        };
        T::try_from_value(value)
    }
}

/// Forward only result of one statement.
///
/// Nothing is cached besides the row peeked by [`Cursor::first`].
pub struct Cursor {
    rows: Box<dyn NativeRows>,
    labels: RowNames,
    fetch: FetchShape,
    peeked: Option<RowLabeled>,
    last_affected_id: Option<i64>,
}

impl Cursor {
    pub fn new(rows: Box<dyn NativeRows>, fetch: FetchShape) -> Self {
        Self {
            labels: rows.labels(),
            rows,
            fetch,
            peeked: None,
            last_affected_id: None,
        }
    }

    pub(crate) fn with_last_affected_id(mut self, id: Option<i64>) -> Self {
        self.last_affected_id = id;
        self
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn native(error: NativeError) -> Error {
        log::error!("{}", error);
        DatabaseError::Driver(error).into()
    }

    pub fn next_row(&mut self) -> Result<Option<RowLabeled>> {
        if let Some(row) = self.peeked.take() {
            return Ok(Some(row));
        }
        Ok(self
            .rows
            .next_row()
            .map_err(Self::native)?
            .map(|values| RowLabeled::new(self.labels.clone(), values)))
    }

    /// Peeks the next row, the following [`Cursor::next_row`] returns it again.
    pub fn first(&mut self) -> Result<Option<&RowLabeled>> {
        if self.peeked.is_none() {
            self.peeked = self.next_row()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Next row in the shape the connection was configured with.
    pub fn fetch(&mut self) -> Result<Option<Fetched>> {
        let fetch = self.fetch;
        Ok(self.next_row()?.map(|row| match fetch {
            FetchShape::Labeled => Fetched::Labeled(row.into_map()),
            FetchShape::Positional => Fetched::Positional(row.values),
        }))
    }

    pub fn fetch_all(&mut self) -> Result<Vec<Fetched>> {
        let mut result = Vec::new();
        while let Some(row) = self.fetch()? {
            result.push(row);
        }
        Ok(result)
    }

    /// First column of the next row.
    pub fn fetch_scalar(&mut self) -> Result<Option<Value>> {
        Ok(self
            .next_row()?
            .and_then(|row| row.values.into_vec().into_iter().next()))
    }

    /// Remaining rows converted into `T`.
    pub fn hydrate<T: FromRow>(self) -> Result<Vec<T>> {
        self.map(|row| row.and_then(T::from_row)).collect()
    }

    pub fn rows_affected(&self) -> RowsAffected {
        RowsAffected {
            rows_affected: self.rows.rows_affected(),
            last_affected_id: self.last_affected_id,
        }
    }
}

impl Iterator for Cursor {
    type Item = Result<RowLabeled>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

impl Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("labels", &self.labels)
            .field("fetch", &self.fetch)
            .field("peeked", &self.peeked.is_some())
            .finish_non_exhaustive()
    }
}
