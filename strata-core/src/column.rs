use crate::Sql;

/// Output column, group or order expression of a statement.
///
/// Names are protected (quoted, qualifiers resolved), expression nodes write themselves.
#[derive(Debug, Clone)]
pub enum Column {
    Name(String),
    Sql(Sql),
}

impl Column {
    /// Column list from a comma separated string, commas inside parentheses or quotes do not split.
    pub fn split(value: &str) -> Vec<Column> {
        let mut result = Vec::new();
        let mut depth = 0usize;
        let mut quote = None;
        let mut start = 0;
        for (i, c) in value.char_indices() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(..) => {}
                None => match c {
                    '\'' | '"' | '`' => quote = Some(c),
                    '(' => depth += 1,
                    ')' => depth = depth.saturating_sub(1),
                    ',' if depth == 0 => {
                        result.push(&value[start..i]);
                        start = i + 1;
                    }
                    _ => {}
                },
            }
        }
        result.push(&value[start..]);
        result
            .into_iter()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Column::Name(v.into()))
            .collect()
    }
}

impl From<&str> for Column {
    fn from(value: &str) -> Self {
        Column::Name(value.into())
    }
}

impl From<String> for Column {
    fn from(value: String) -> Self {
        Column::Name(value)
    }
}

impl From<Sql> for Column {
    fn from(value: Sql) -> Self {
        Column::Sql(value)
    }
}

/// Lists of columns accepted by the builders: a comma separated string, or any iterator.
pub trait IntoColumns {
    fn into_columns(self) -> Vec<Column>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<Column> {
        Column::split(self)
    }
}

impl IntoColumns for Sql {
    fn into_columns(self) -> Vec<Column> {
        vec![Column::Sql(self)]
    }
}

impl<T: Into<Column>, const N: usize> IntoColumns for [T; N] {
    fn into_columns(self) -> Vec<Column> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Column>> IntoColumns for Vec<T> {
    fn into_columns(self) -> Vec<Column> {
        self.into_iter().map(Into::into).collect()
    }
}
