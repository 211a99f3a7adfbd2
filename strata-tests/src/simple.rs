use crate::recreate;
use std::rc::Rc;
#[cfg(not(feature = "disable-returning"))]
use strata_core::StatementKind;
use strata_core::{Conditional, Database, Value};

pub fn simple(database: &Rc<Database>) {
    recreate(
        database,
        "strata_simple",
        "id INTEGER PRIMARY KEY, name VARCHAR(64) NOT NULL, score INTEGER, active BOOLEAN NOT NULL",
    );

    let affected = database
        .query()
        .table("strata_simple")
        .values([
            ("id", Value::from(1)),
            ("name", "alpha".into()),
            ("score", 10.into()),
            ("active", true.into()),
        ])
        .values([
            ("id", Value::from(2)),
            ("name", "beta".into()),
            ("score", 20.into()),
            ("active", false.into()),
        ])
        .values([
            ("id", Value::from(3)),
            ("name", "gamma".into()),
            ("score", Value::Null),
            ("active", true.into()),
        ])
        .insert()
        .expect("Failed to insert 3 rows");
    assert_eq!(affected.rows_affected, 3);

    let names = database
        .query()
        .table("strata_simple")
        .columns("name")
        .where_("active", true)
        .order_by_asc("id")
        .all_as::<String>()
        .expect("Failed to select the active names");
    assert_eq!(names, ["alpha", "gamma"]);

    // Hand written statements through the quoting helpers
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        database.quote_identifier("id"),
        database.quote_identifier("strata_simple"),
        database.quote_identifier("name"),
        database.quote("beta"),
    );
    let id = database
        .execute(&sql, &Default::default())
        .and_then(|mut v| v.fetch_scalar())
        .expect("Failed to run the quoted statement");
    assert_eq!(id, Some(Value::Int(2)));

    let count = database
        .query()
        .table("strata_simple")
        .where_("score >", 5)
        .count()
        .expect("Failed to count");
    assert_eq!(count, 2);
    let count = database
        .query()
        .table("strata_simple")
        .where_("score", Value::Null)
        .count()
        .expect("Failed to count the null scores");
    assert_eq!(count, 1);

    assert!(
        database
            .query()
            .table("strata_simple")
            .where_("name", "beta")
            .exists()
            .expect("Failed to check existence")
    );
    assert!(
        !database
            .query()
            .table("strata_simple")
            .where_("name", "delta")
            .exists()
            .expect("Failed to check existence")
    );

    let row = database
        .query()
        .table("strata_simple")
        .where_("id", 2)
        .first()
        .expect("Failed to select the first row")
        .expect("Row 2 must exist");
    assert_eq!(row.get_as::<String>("name").unwrap(), "beta");
    assert!(!row.get_as::<bool>("active").unwrap());
    assert_eq!(row.get_as::<i64>("score").unwrap(), 20);

    // Same builder, same result
    let query = database.query().table("strata_simple").where_("id <", 3);
    assert_eq!(query.count().unwrap(), 2);
    assert_eq!(query.count().unwrap(), 2);

    let affected = database
        .query()
        .table("strata_simple")
        .set("score", 30)
        .where_("id", 2)
        .update()
        .expect("Failed to update");
    assert_eq!(affected.rows_affected, 1);
    let affected = database
        .query()
        .table("strata_simple")
        .set_expr("score = score + 1")
        .where_("id", 1)
        .update()
        .expect("Failed to update with an expression");
    assert_eq!(affected.rows_affected, 1);
    let scores = database
        .query()
        .table("strata_simple")
        .columns("score")
        .where_in("id", [1, 2])
        .order_by_asc("id")
        .all_as::<i64>()
        .expect("Failed to read the scores");
    assert_eq!(scores, [11, 30]);

    let affected = database
        .query()
        .table("strata_simple")
        .where_("id", 3)
        .delete()
        .expect("Failed to delete");
    assert_eq!(affected.rows_affected, 1);
    assert_eq!(
        database.query().table("strata_simple").count().unwrap(),
        2
    );

    #[cfg(not(feature = "disable-returning"))]
    {
        let mut cursor = database
            .query()
            .table("strata_simple")
            .values([
                ("id", Value::from(4)),
                ("name", "delta".into()),
                ("score", 40.into()),
                ("active", true.into()),
            ])
            .returning("id, name")
            .run(StatementKind::Insert)
            .expect("Failed to insert with returning");
        let row = cursor
            .next_row()
            .expect("Failed to read the returned row")
            .expect("The insert must return a row");
        assert_eq!(row.get_as::<i64>("id").unwrap(), 4);
        assert_eq!(row.get_as::<String>("name").unwrap(), "delta");
        assert!(cursor.next_row().unwrap().is_none());
    }

    #[cfg(not(feature = "disable-truncate"))]
    {
        database
            .query()
            .table("strata_simple")
            .truncate()
            .expect("Failed to truncate");
        assert_eq!(
            database.query().table("strata_simple").count().unwrap(),
            0
        );
    }
}
