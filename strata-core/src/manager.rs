use crate::{Database, DatabaseError, Query, Result};
use indexmap::IndexMap;
use std::{
    cell::RefCell,
    fmt::{self, Debug},
    rc::Rc,
};

type Factory = Box<dyn FnOnce() -> Result<Database>>;

enum Entry {
    Ready(Rc<Database>),
    Factory(Factory),
    /// The factory is running or failed.
    Taken,
}

/// Connections by role (`default`, `read`, `write`, ...).
///
/// Factories run on first use and are replaced by the connection they produce. One manager per
/// thread, connections are never shared across threads.
pub struct DatabaseManager {
    default_role: String,
    entries: RefCell<IndexMap<String, Entry>>,
}

impl Default for DatabaseManager {
    fn default() -> Self {
        Self {
            default_role: "default".into(),
            entries: Default::default(),
        }
    }
}

impl DatabaseManager {
    pub fn new() -> Self {
        Default::default()
    }

    /// Role used when a requested role is not registered.
    pub fn with_default_role(mut self, role: &str) -> Self {
        self.default_role = role.to_string();
        self
    }

    pub fn register(&self, role: &str, database: Database) {
        self.register_shared(role, Rc::new(database));
    }

    pub fn register_shared(&self, role: &str, database: Rc<Database>) {
        self.entries
            .borrow_mut()
            .insert(role.to_string(), Entry::Ready(database));
    }

    pub fn register_factory(&self, role: &str, factory: impl FnOnce() -> Result<Database> + 'static) {
        self.entries
            .borrow_mut()
            .insert(role.to_string(), Entry::Factory(Box::new(factory)));
    }

    pub fn has(&self, role: &str) -> bool {
        self.entries.borrow().contains_key(role)
    }

    pub fn roles(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Forgets every role, connections close once their last user drops them.
    pub fn reset(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Connection of `role`, falling back to the default role.
    pub fn get(&self, role: &str) -> Result<Rc<Database>> {
        let role = if self.has(role) {
            role
        } else if self.has(&self.default_role) {
            log::debug!("Role `{}` falls back to `{}`", role, self.default_role);
            self.default_role.as_str()
        } else {
            let error = DatabaseError::configuration(format!(
                "No database registered for role `{}` and no default role `{}`",
                role, self.default_role
            ));
            log::error!("{}", error);
            return Err(error.into());
        };
        let factory = {
            let mut entries = self.entries.borrow_mut();
            let Some(entry) = entries.get_mut(role) else {
                return Err(DatabaseError::configuration(format!("Unknown role `{}`", role)).into());
            };
            match std::mem::replace(entry, Entry::Taken) {
                Entry::Ready(database) => {
                    *entry = Entry::Ready(database.clone());
                    return Ok(database);
                }
                Entry::Factory(factory) => factory,
                Entry::Taken => {
                    let error = DatabaseError::configuration(format!(
                        "The factory of role `{}` already failed or is still running",
                        role
                    ));
                    log::error!("{}", error);
                    return Err(error.into());
                }
            }
        };
        // The borrow is released, the factory may use the manager
        let database = Rc::new(factory()?);
        self.register_shared(role, database.clone());
        Ok(database)
    }

    /// Builder reading from role `read` and writing to role `write`.
    pub fn query(&self) -> Result<Query> {
        Ok(Query::split(self.get("read")?, self.get("write")?))
    }
}

impl Debug for DatabaseManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        let mut debug = f.debug_map();
        for (role, entry) in entries.iter() {
            debug.entry(
                role,
                &match entry {
                    Entry::Ready(..) => "ready",
                    Entry::Factory(..) => "factory",
                    Entry::Taken => "taken",
                },
            );
        }
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, Dialect, Driver, NativeConnection, NativeError, NativeRows, NoRows, Params};
    use std::cell::Cell;

    struct Idle;

    impl NativeConnection for Idle {
        fn execute(
            &mut self,
            _: &str,
            _: &Params,
        ) -> std::result::Result<Box<dyn NativeRows>, NativeError> {
            Ok(Box::new(NoRows::default()))
        }

        fn last_insert_id(&self) -> Option<i64> {
            None
        }
    }

    struct IdleDriver;

    impl Driver for IdleDriver {
        fn name(&self) -> &'static str {
            "idle"
        }

        fn connect(
            &self,
            _: &Config,
        ) -> std::result::Result<Box<dyn NativeConnection>, NativeError> {
            Ok(Box::new(Idle))
        }
    }

    fn database(url: &str) -> Result<Database> {
        Database::connect(IdleDriver, Config::new(url)?)
    }

    #[test]
    fn factories_run_once() {
        let manager = Rc::new(DatabaseManager::new());
        let runs = Rc::new(Cell::new(0));
        {
            let runs = runs.clone();
            manager.register_factory("default", move || {
                runs.set(runs.get() + 1);
                database("postgres://primary/app")
            });
        }
        assert_eq!(format!("{:?}", manager), r#"{"default": "factory"}"#);
        let first = manager.get("default").unwrap();
        let second = manager.get("default").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(runs.get(), 1);
        assert_eq!(format!("{:?}", manager), r#"{"default": "ready"}"#);
    }

    #[test]
    fn roles_fall_back_to_the_default() {
        let manager = DatabaseManager::new().with_default_role("primary");
        assert!(manager.get("read").is_err());
        manager.register("primary", database("mysql://primary/app").unwrap());
        manager.register("read", database("mysql://replica/app").unwrap());
        assert_eq!(manager.roles(), ["primary", "read"]);
        assert_eq!(manager.get("read").unwrap().config().location, "replica/app");
        assert_eq!(manager.get("write").unwrap().config().location, "primary/app");
        let query = manager.query().unwrap();
        assert_eq!(query.dialect(), Dialect::MySql);
        manager.reset();
        assert!(!manager.has("primary"));
    }

    #[test]
    fn failed_factory() {
        let manager = DatabaseManager::new();
        manager.register_factory("default", || database("unknown://nowhere"));
        assert!(manager.get("default").is_err());
        let error = manager.get("default").unwrap_err();
        assert!(format!("{}", error).contains("already failed"));
    }

    #[test]
    fn factory_can_use_the_manager() {
        let manager = Rc::new(DatabaseManager::new());
        manager.register("read", database("sqlite://replica.db").unwrap());
        {
            let inner = manager.clone();
            manager.register_factory("write", move || {
                assert!(inner.has("read"));
                database("sqlite://primary.db")
            });
        }
        assert_eq!(
            manager.get("write").unwrap().config().location,
            "primary.db"
        );
    }
}
