/// Table name with optional schema and alias.
#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct TableRef {
    pub name: String,
    pub schema: String,
    pub alias: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Splits `schema.table`, anything without a dot is a bare table name.
    pub fn parse(value: &str) -> Self {
        match value.split_once('.') {
            Some((schema, name)) => TableRef::new(name.trim()).with_schema(schema.trim()),
            None => TableRef::new(value.trim()),
        }
    }

    /// Unquoted `schema.name`.
    pub fn full_name(&self) -> String {
        if self.schema.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.schema, self.name)
        }
    }
}
