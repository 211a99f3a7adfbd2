use crate::{
    Database, DatabaseError, Result, SqlText, TableRef, looks_like_model,
    writer::{Context, SqlWriter},
};
use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{self, Debug},
    rc::Rc,
};

/// Contract of the application records the compiler needs to know about.
///
/// The compiler only reads these accessors, it never looks at the record fields.
pub trait Record {
    fn table(&self) -> &str;

    fn schema(&self) -> Option<&str> {
        None
    }

    /// Columns uniquely identifying a row, used as default upsert conflict target.
    fn identity(&self) -> &[&str] {
        &[]
    }

    fn read_connection(&self) -> Option<Rc<Database>> {
        None
    }

    fn write_connection(&self) -> Option<Rc<Database>> {
        self.read_connection()
    }

    fn table_ref(&self) -> TableRef {
        let table = TableRef::new(self.table());
        match self.schema() {
            Some(schema) => table.with_schema(schema),
            None => table,
        }
    }
}

/// Declarative name to table mapping.
pub trait TableMap {
    fn lookup(&self, name: &str) -> Option<TableRef>;
}

impl TableMap for HashMap<String, TableRef> {
    fn lookup(&self, name: &str) -> Option<TableRef> {
        self.get(name).cloned()
    }
}

/// Record providers by model name.
///
/// Each provider runs once, its record is cached until [`ModelRegistry::reset`].
#[derive(Default)]
pub struct ModelRegistry {
    providers: HashMap<String, Box<dyn Fn() -> Rc<dyn Record>>>,
    cache: RefCell<HashMap<String, Rc<dyn Record>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn register(&mut self, name: &str, provider: impl Fn() -> Rc<dyn Record> + 'static) {
        let name = Self::key(name);
        self.cache.borrow_mut().remove(name);
        self.providers.insert(name.to_string(), Box::new(provider));
    }

    pub fn register_record(&mut self, name: &str, record: Rc<dyn Record>) {
        self.register(name, move || record.clone());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(Self::key(name))
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Record>> {
        let name = Self::key(name);
        if let Some(record) = self.cache.borrow().get(name) {
            return Some(record.clone());
        }
        let record = (self.providers.get(name)?)();
        self.cache
            .borrow_mut()
            .insert(name.to_string(), record.clone());
        Some(record)
    }

    /// Forgets the cached records, providers stay registered.
    pub fn reset(&self) {
        self.cache.borrow_mut().clear();
    }

    fn key(name: &str) -> &str {
        name.trim_start_matches('\\')
    }
}

impl Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("cached", &self.cache.borrow().len())
            .finish()
    }
}

/// Turns table tokens into table references.
///
/// Lookup order: declarative map, model registry, literal `schema.table`. Aliases declared by
/// the statement take precedence when qualifying columns.
#[derive(Default, Clone)]
pub struct Resolver {
    map: Option<Rc<dyn TableMap>>,
    models: Option<Rc<ModelRegistry>>,
    aliases: HashMap<String, String>,
}

impl Resolver {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_map(mut self, map: Rc<dyn TableMap>) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_models(mut self, models: Rc<ModelRegistry>) -> Self {
        self.models = Some(models);
        self
    }

    pub fn set_map(&mut self, map: Rc<dyn TableMap>) {
        self.map = Some(map);
    }

    pub fn set_models(&mut self, models: Rc<ModelRegistry>) {
        self.models = Some(models);
    }

    pub fn resolve(&self, name: &str) -> Result<TableRef> {
        if let Some(map) = &self.map {
            if let Some(table) = map.lookup(name) {
                return Ok(table);
            }
        }
        if let Some(models) = &self.models {
            if let Some(record) = models.get(name) {
                return Ok(record.table_ref());
            }
            if looks_like_model(name) {
                let error = DatabaseError::configuration(format!("Unknown model `{}`", name));
                log::error!("{}", error);
                return Err(error.into());
            }
        }
        Ok(TableRef::parse(name))
    }

    /// Remembers that `token` is known as `alias` in the statement being compiled.
    pub fn register_alias(&mut self, token: &str, alias: &str) {
        self.aliases.insert(token.to_string(), alias.to_string());
        self.aliases.insert(alias.to_string(), alias.to_string());
    }

    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Quoted text standing for `name` in front of a column.
    pub fn qualifier(&self, name: &str, writer: &dyn SqlWriter) -> Result<String> {
        let mut out = SqlText::new();
        let mut context = Context::default();
        match self.alias(name) {
            Some(alias) => writer.write_identifier_quoted(&mut context, &mut out, alias),
            None => writer.write_table_ref(&mut context, &mut out, &self.resolve(name)?),
        }
        out.render(|v| Ok(v.to_string()))
    }
}

impl Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("map", &self.map.is_some())
            .field("models", &self.models)
            .field("aliases", &self.aliases)
            .finish()
    }
}
