#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use strata::{DatabaseError, Dialect};
    use strata_tests::{execute_tests, init_logs, silent_logs};

    #[test]
    fn bundled_sqlite() {
        init_logs();
        let database = strata::connect("sqlite://:memory:").expect("Could not open the database");
        assert_eq!(database.dialect(), Dialect::Sqlite);
        execute_tests(Rc::new(database));
    }

    #[test]
    fn other_schemes_need_a_driver() {
        init_logs();
        silent_logs! {
            let error = strata::connect("postgres://localhost/app")
                .expect_err("No postgres driver is bundled");
            assert!(matches!(
                DatabaseError::of(&error),
                Some(DatabaseError::Configuration(..))
            ));
            assert!(strata::connect("duckdb://local.db").is_err());
        }
    }
}
