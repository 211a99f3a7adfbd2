use crate::silent_logs;
use std::rc::Rc;
use strata_core::{Conditional, Database, DatabaseManager, Error, ModelRegistry, Query, Record};

struct Person {
    database: Rc<Database>,
}

impl Record for Person {
    fn table(&self) -> &str {
        "strata_people"
    }

    fn identity(&self) -> &[&str] {
        &["id"]
    }

    fn read_connection(&self) -> Option<Rc<Database>> {
        Some(self.database.clone())
    }
}

/// Records, models and roles on top of the tables created by the condition group.
pub fn registry(database: &Rc<Database>) {
    let person: Rc<dyn Record> = Rc::new(Person {
        database: database.clone(),
    });

    // The record brings its table and its connection
    let names = Query::new(database.dialect())
        .record(person.clone())
        .columns("name")
        .where_("age >", 70)
        .order_by_asc("id")
        .all_as::<String>()
        .expect("Failed to select through a record");
    assert_eq!(names, ["Grace", "Barbara"]);

    // Model names resolve in FROM, JOIN and qualifiers
    let mut models = ModelRegistry::new();
    models.register_record("Person", person);
    let titles = database
        .query()
        .models(Rc::new(models))
        .table("Person")
        .columns("strata_posts.title")
        .join("strata_posts", "strata_posts.author_id = Person.id")
        .where_("Person.name", "Linus")
        .all_as::<String>()
        .expect("Failed to select through a model");
    assert_eq!(titles, ["Kernels"]);

    let manager = DatabaseManager::new();
    manager.register_shared("default", database.clone());
    assert!(Rc::ptr_eq(&manager.get("read").unwrap(), database));
    let count = manager
        .query()
        .expect("Failed to build a split query")
        .table("strata_people")
        .count()
        .expect("Failed to count through the manager");
    assert_eq!(count, 5);

    manager.register_factory("write", || Err(Error::msg("The primary is down")));
    silent_logs! {
        assert!(manager.get("write").is_err());
        assert!(manager.get("write").is_err(), "A failed factory does not run again");
    }

    manager.reset();
    silent_logs! {
        assert!(manager.get("read").is_err());
    }
}
