#[cfg(test)]
mod tests {
    use std::{fs, path::Path, rc::Rc, sync::Mutex};
    use strata_core::{Config, Database};
    use strata_sqlite::SqliteDriver;
    use strata_tests::{execute_tests, init_logs};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn sqlite() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/tests.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH).expect(
                format!("Failed to remove existing test database file {}", DB_PATH).as_str(),
            );
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        let config = Config::new(&format!("sqlite://{}?mode=rwc", DB_PATH))
            .expect("Could not parse the url");
        let database =
            Database::connect(SqliteDriver::new(), config).expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        execute_tests(Rc::new(database));
    }

    #[test]
    fn sqlite_memory() {
        init_logs();
        let config = Config::new("sqlite://:memory:").expect("Could not parse the url");
        let database =
            Database::connect(SqliteDriver::new(), config).expect("Could not open the database");
        execute_tests(Rc::new(database));
    }
}
