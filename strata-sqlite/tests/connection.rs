#[cfg(test)]
mod tests {
    use std::{cell::RefCell, fs, path::Path, rc::Rc, sync::Mutex};
    use strata_core::{
        Config, Database, DatabaseError, Event, FetchShape, Fetched, Params, Value,
    };
    use strata_sqlite::SqliteDriver;
    use strata_tests::{init_logs, silent_logs};

    static MUTEX: Mutex<()> = Mutex::new(());

    fn open(url: &str) -> strata_core::Result<Database> {
        Database::connect(SqliteDriver::new(), Config::new(url)?)
    }

    #[test]
    fn create_database() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/creation.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .expect(format!("Failed to remove test database file {}", DB_PATH).as_str());
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        let database =
            open(&format!("sqlite://{}?mode=rwc", DB_PATH)).expect("Could not open the database");
        database
            .execute_sql("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT)")
            .expect("Could not create a table");
        drop(database);
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        let database =
            open(&format!("sqlite://{}?mode=ro", DB_PATH)).expect("Could not open the database");
        silent_logs! {
            let error = database
                .execute_sql("INSERT INTO kv VALUES ('a', 'b')")
                .expect_err("A read only database does not accept writes");
            assert!(matches!(
                DatabaseError::of(&error),
                Some(DatabaseError::Driver(..))
            ));
        }
        drop(database);
        fs::remove_file(DB_PATH)
            .expect(format!("Failed to remove existing test database file {}", DB_PATH).as_str());
        silent_logs! {
            assert!(
                open(&format!("sqlite://{}?mode=ro", DB_PATH)).is_err(),
                "Should not be able to open in read only unexisting database"
            );
        }
    }

    #[test]
    fn wrong_url() {
        silent_logs! {
            assert!(open("duckdb://some_value").is_err());
            assert!(open("postgres://localhost/app").is_err());
        };
    }

    #[test]
    fn statements() {
        init_logs();
        let database = open("sqlite://:memory:").expect("Could not open the database");
        database
            .execute_sql("CREATE TABLE kv (k TEXT PRIMARY KEY, v BLOB, n REAL)")
            .expect("Could not create a table");
        let affected = database
            .execute(
                "INSERT INTO kv VALUES (:k, :v, ?), ('b', NULL, ?)",
                &Params::positional([1.5, 2.5])
                    .with("k", "a")
                    .with("v", Value::Blob([1u8, 2, 3].into())),
            )
            .expect("Could not insert")
            .rows_affected();
        assert_eq!(affected.rows_affected, 2);
        assert!(database.last_insert_id().is_some());

        let mut cursor = database
            .execute("SELECT k, v, n FROM kv ORDER BY k", &Params::new())
            .unwrap();
        assert_eq!(cursor.labels(), ["k", "v", "n"]);
        let first = cursor.next_row().unwrap().unwrap();
        assert_eq!(first.get("k"), Some(&Value::Varchar("a".into())));
        assert_eq!(first.get("v"), Some(&Value::Blob([1u8, 2, 3].into())));
        assert_eq!(first.get_as::<f64>("n").unwrap(), 1.5);
        let second = cursor.next_row().unwrap().unwrap();
        assert_eq!(second.get("v"), Some(&Value::Null));
        assert_eq!(second.get_as::<f64>("n").unwrap(), 2.5);
        assert!(cursor.next_row().unwrap().is_none());

        silent_logs! {
            let error = database
                .execute_sql("SELEC 1")
                .expect_err("Syntax errors are reported");
            assert!(matches!(
                DatabaseError::of(&error),
                Some(DatabaseError::Driver(..))
            ));
            assert!(database.execute_sql("SELECT 1; SELECT 2").is_err());
            assert!(
                database
                    .execute("SELECT :missing", &Params::new())
                    .is_err()
            );
        }
        database
            .execute_sql("-- nothing to run")
            .expect("Comments only are accepted");
    }

    #[test]
    fn positional_fetch() {
        let database = open("sqlite://:memory:?fetch=positional").unwrap();
        assert_eq!(database.config().fetch, FetchShape::Positional);
        let mut cursor = database
            .execute("SELECT 1 AS one, 'two' AS two", &Params::new())
            .unwrap();
        assert_eq!(
            cursor.fetch().unwrap(),
            Some(Fetched::Positional(
                [Value::Int(1), Value::Varchar("two".into())].into()
            ))
        );
        assert_eq!(cursor.fetch().unwrap(), None);
    }

    #[test]
    fn reconnect() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/reconnect.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH).unwrap();
        }
        let database = Rc::new(
            open(&format!("sqlite://{}?reconnect=true", DB_PATH))
                .expect("Could not open the database"),
        );
        let events = Rc::new(RefCell::new(Vec::new()));
        {
            let events = events.clone();
            database.add_listener(move |event| {
                if let Event::Reconnected { attempt } = event {
                    events.borrow_mut().push(*attempt);
                }
            });
        }
        let callbacks = Rc::new(RefCell::new(0));
        {
            let callbacks = callbacks.clone();
            database.on_reconnect(move |_| *callbacks.borrow_mut() += 1);
        }
        database
            .execute_sql("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT)")
            .unwrap();
        database.begin_transaction(false).unwrap();
        database
            .execute_sql("INSERT INTO kv VALUES ('a', 'b')")
            .unwrap();
        database.reconnect().expect("Could not reconnect");
        assert_eq!(database.transaction_depth(), 0);
        assert_eq!(*events.borrow(), [0]);
        assert_eq!(*callbacks.borrow(), 1);
        // The open transaction was dropped with the old connection
        assert_eq!(database.query().table("kv").count().unwrap(), 0);
        drop(database);
        fs::remove_file(DB_PATH).unwrap();
    }
}
