use crate::{
    Config, Context, Cursor, DatabaseError, Dialect, Driver, Event, Failure, Listener,
    NativeConnection, NativeError, Params, Query, Result, RowsAffected, Value, truncate_long,
};
use std::{
    cell::{Cell, RefCell},
    fmt::{self, Debug},
    rc::Rc,
    thread,
};

type ReconnectCallback = Rc<dyn Fn(&Database)>;

/// Synchronous connection with transaction nesting and failure recovery.
///
/// The only place where native failures are classified: a deadlock outside transactions is
/// retried once, a lost connection is re-established according to the configured
/// [`ReconnectPolicy`](crate::ReconnectPolicy). Shared through `Rc`, it is not `Sync`.
pub struct Database {
    config: Config,
    driver: Rc<dyn Driver>,
    connection: RefCell<Box<dyn NativeConnection>>,
    depth: Cell<u32>,
    listeners: RefCell<Vec<Listener>>,
    on_reconnect: RefCell<Option<ReconnectCallback>>,
}

impl Database {
    pub fn connect(driver: impl Driver + 'static, config: Config) -> Result<Self> {
        Self::open(Rc::new(driver), config, Vec::new())
    }

    /// Connects with `listener` already registered, so it also sees the first [`Event::Connected`].
    pub fn connect_with_listener(
        driver: impl Driver + 'static,
        config: Config,
        listener: impl Fn(&Event<'_>) + 'static,
    ) -> Result<Self> {
        Self::open(Rc::new(driver), config, vec![Rc::new(listener)])
    }

    fn open(driver: Rc<dyn Driver>, config: Config, listeners: Vec<Listener>) -> Result<Self> {
        let connection = driver.connect(&config).map_err(|e| {
            log::error!("{}", e);
            DatabaseError::Driver(e)
        });
        let connection = connection.with_context(|| {
            format!(
                "Could not connect to {} database `{}` using {}",
                config.dialect,
                config.location,
                driver.name()
            )
        })?;
        let result = Self {
            config,
            driver,
            connection: RefCell::new(connection),
            depth: Cell::new(0),
            listeners: RefCell::new(listeners),
            on_reconnect: RefCell::new(None),
        };
        result.emit(&Event::Connected);
        Ok(result)
    }

    pub fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current nesting depth, 0 outside transactions.
    pub fn transaction_depth(&self) -> u32 {
        self.depth.get()
    }

    pub fn add_listener(&self, listener: impl Fn(&Event<'_>) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Called after every successful reconnection, before the statement is re-issued.
    pub fn on_reconnect(&self, callback: impl Fn(&Database) + 'static) {
        *self.on_reconnect.borrow_mut() = Some(Rc::new(callback));
    }

    fn emit(&self, event: &Event<'_>) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(event);
        }
    }

    /// Statement builder bound to this connection.
    pub fn query(self: &Rc<Self>) -> Query {
        Query::on(self.clone())
    }

    pub fn last_insert_id(&self) -> Option<i64> {
        self.connection.borrow().last_insert_id()
    }

    pub fn quote_identifier(&self, identifier: &str) -> String {
        self.dialect().writer().quoted(identifier)
    }

    pub fn quote(&self, value: impl Into<Value>) -> String {
        self.dialect().writer().literal(&value.into())
    }

    /// Runs one statement, recovering from deadlocks and lost connections where it is safe.
    pub fn execute(&self, sql: &str, params: &Params) -> Result<Cursor> {
        log::debug!("{}", truncate_long!(sql));
        let mut retried = false;
        // One reconnect budget for every re-issue of this statement
        let mut attempts = 0;
        loop {
            let result = self.connection.borrow_mut().execute(sql, params);
            let error = match result {
                Ok(rows) => {
                    let last_id = if rows.rows_affected() > 0 {
                        self.last_insert_id()
                    } else {
                        None
                    };
                    return Ok(Cursor::new(rows, self.config.fetch).with_last_affected_id(last_id));
                }
                Err(error) => error,
            };
            self.emit(&Event::Failure { sql, error: &error });
            let depth = self.depth.get();
            let error = match self.dialect().classify(&error.code) {
                Failure::Deadlock if depth > 0 => DatabaseError::TransactionLost {
                    depth,
                    cause: error,
                },
                Failure::Deadlock if !retried => {
                    log::warn!("Deadlock, retrying once: {}", error);
                    retried = true;
                    continue;
                }
                Failure::Deadlock => DatabaseError::Deadlock(error),
                Failure::ConnectionLost if self.config.policy.enabled => {
                    self.recover(&error, &mut attempts)?;
                    if depth > 0 {
                        DatabaseError::TransactionLost {
                            depth,
                            cause: error,
                        }
                    } else {
                        continue;
                    }
                }
                Failure::ConnectionLost => DatabaseError::ConnectionLost(error),
                Failure::Other => DatabaseError::Driver(error),
            };
            log::error!("{}", error);
            return Err(error.into());
        }
    }

    /// Runs a statement that returns no rows.
    pub fn execute_sql(&self, sql: &str) -> Result<RowsAffected> {
        Ok(self.execute(sql, &Params::new())?.rows_affected())
    }

    fn reopen(&self) -> std::result::Result<(), NativeError> {
        let connection = self.driver.connect(&self.config)?;
        *self.connection.borrow_mut() = connection;
        self.depth.set(0);
        self.emit(&Event::Connected);
        Ok(())
    }

    fn reconnected(&self, attempt: u32) {
        let callback = self.on_reconnect.borrow().clone();
        if let Some(callback) = callback {
            callback(self);
        }
        self.emit(&Event::Reconnected { attempt });
    }

    /// Drops the current connection and opens a new one, any open transaction is gone.
    pub fn reconnect(&self) -> Result<()> {
        self.reopen().map_err(|e| {
            log::error!("{}", e);
            DatabaseError::ConnectionLost(e)
        })?;
        self.reconnected(0);
        Ok(())
    }

    /// Reconnect loop, fails with the original error once the attempts are exhausted.
    ///
    /// `attempts` counts every attempt made for the current statement, successful ones included.
    fn recover(&self, original: &NativeError, attempts: &mut u32) -> Result<()> {
        let policy = &self.config.policy;
        while policy.allows(*attempts) {
            let attempt = *attempts;
            *attempts = attempt.saturating_add(1);
            let sleep = policy.sleep_before(attempt);
            if !sleep.is_zero() {
                thread::sleep(sleep);
            }
            log::warn!(
                "Connection lost ({}), reconnect attempt {}",
                original,
                attempt + 1
            );
            match self.reopen() {
                Ok(()) => {
                    self.reconnected(attempt);
                    return Ok(());
                }
                Err(error) => {
                    log::warn!("Reconnect attempt {} failed: {}", attempt + 1, error);
                    self.emit(&Event::ReconnectFailed {
                        attempt,
                        error: &error,
                    });
                }
            }
        }
        let error = DatabaseError::ConnectionLost(original.clone());
        log::error!("{}", error);
        Err(error.into())
    }

    /// Opens a transaction, or a savepoint when one is already open.
    ///
    /// Without `use_savepoints` (or on a backend without them) nested levels only count.
    pub fn begin_transaction(&self, use_savepoints: bool) -> Result<()> {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        let writer = self.dialect().writer();
        let mut sql = String::new();
        if depth == 1 {
            writer.write_transaction_begin(&mut sql);
        } else if use_savepoints && writer.supports_savepoints() {
            writer.write_savepoint(&mut sql, depth);
        }
        if !sql.is_empty() {
            if let Err(error) = self.execute_sql(&sql) {
                if self.depth.get() == depth {
                    self.depth.set(depth - 1);
                }
                return Err(error);
            }
        }
        self.emit(&Event::TransactionBegin { depth });
        Ok(())
    }

    fn leave(&self, use_savepoints: bool, commit: bool) -> Result<u32> {
        let depth = self.depth.get();
        if depth == 0 {
            let error = DatabaseError::NoActiveTransaction;
            log::error!("{}", error);
            return Err(error.into());
        }
        self.depth.set(depth - 1);
        let writer = self.dialect().writer();
        let mut sql = String::new();
        match (depth, commit) {
            (1, true) => writer.write_transaction_commit(&mut sql),
            (1, false) => writer.write_transaction_rollback(&mut sql),
            _ if !use_savepoints || !writer.supports_savepoints() => {}
            (_, true) => writer.write_savepoint_release(&mut sql, depth),
            (_, false) => writer.write_savepoint_rollback(&mut sql, depth),
        }
        if !sql.is_empty() {
            self.execute_sql(&sql)?;
        }
        Ok(depth)
    }

    pub fn commit(&self, use_savepoints: bool) -> Result<()> {
        let depth = self.leave(use_savepoints, true)?;
        self.emit(&Event::TransactionCommit { depth });
        Ok(())
    }

    pub fn rollback(&self, use_savepoints: bool) -> Result<()> {
        let depth = self.leave(use_savepoints, false)?;
        self.emit(&Event::TransactionRollback { depth });
        Ok(())
    }

    /// Runs `f` in a transaction (a savepoint when nested): commits on `Ok`, rolls back on `Err`.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.begin_transaction(true)?;
        let depth = self.depth.get();
        match f(self) {
            Ok(value) => {
                self.commit(true)?;
                Ok(value)
            }
            Err(error) => {
                // A lost transaction already reset the depth
                if self.depth.get() >= depth {
                    if let Err(e) = self.rollback(true) {
                        log::warn!("Rollback failed: {:#}", e);
                    }
                }
                Err(error)
            }
        }
    }
}

impl Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("driver", &self.driver.name())
            .field("dialect", &self.config.dialect)
            .field("location", &self.config.location)
            .field("depth", &self.depth.get())
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}
