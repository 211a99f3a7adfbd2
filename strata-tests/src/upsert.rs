use crate::recreate;
use std::rc::Rc;
use strata_core::{Arg, Conditional, Database, Dialect, Value};

fn counter(database: &Rc<Database>, id: i32) -> (String, i64) {
    let row = database
        .query()
        .table("strata_counters")
        .where_("id", id)
        .first()
        .expect("Failed to read the counter")
        .expect("The counter must exist");
    (
        row.get_as::<String>("name").unwrap(),
        row.get_as::<i64>("hits").unwrap(),
    )
}

pub fn upsert(database: &Rc<Database>) {
    recreate(
        database,
        "strata_counters",
        "id INTEGER PRIMARY KEY, name VARCHAR(64) NOT NULL, hits INTEGER NOT NULL",
    );
    let row = |id: i32, name: &str, hits: i32| {
        [
            ("id", Value::from(id)),
            ("name", name.into()),
            ("hits", hits.into()),
        ]
    };

    database
        .query()
        .table("strata_counters")
        .values(row(1, "home", 1))
        .insert()
        .expect("Failed to insert the first counter");

    // Conflict: the row's own values win, except the explicit assignment
    database
        .query()
        .table("strata_counters")
        .values(row(1, "index", 1))
        .on_conflict(["id"])
        .upsert_set("hits", Arg::raw("hits + 1"))
        .upsert()
        .expect("Failed to upsert an existing row");
    assert_eq!(counter(database, 1), ("index".into(), 2));

    // No conflict: plain insert
    database
        .query()
        .table("strata_counters")
        .values(row(2, "about", 7))
        .on_conflict(["id"])
        .upsert()
        .expect("Failed to upsert a new row");
    assert_eq!(counter(database, 2), ("about".into(), 7));

    // Several rows, only the listed columns take the proposed values
    database
        .query()
        .table("strata_counters")
        .values(row(1, "landing", 100))
        .values(row(3, "contact", 3))
        .on_conflict(["id"])
        .upsert_columns(["name"])
        .upsert()
        .expect("Failed to upsert several rows");
    assert_eq!(counter(database, 1), ("landing".into(), 2));
    assert_eq!(counter(database, 3), ("contact".into(), 3));

    database
        .query()
        .table("strata_counters")
        .values(row(2, "ignored", 0))
        .ignore()
        .insert()
        .expect("Failed to insert ignoring conflicts");
    assert_eq!(counter(database, 2), ("about".into(), 7));
    assert_eq!(
        database.query().table("strata_counters").count().unwrap(),
        3
    );

    if database.dialect() != Dialect::Postgres {
        database
            .query()
            .table("strata_counters")
            .values(row(3, "replaced", 9))
            .replace()
            .insert()
            .expect("Failed to replace a row");
        assert_eq!(counter(database, 3), ("replaced".into(), 9));
    }
}
