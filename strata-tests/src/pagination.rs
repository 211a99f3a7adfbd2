use crate::recreate;
use std::rc::Rc;
use strata_core::{Conditional, Database, DatabaseError, Paginator, Value};

pub fn pagination(database: &Rc<Database>) {
    recreate(
        database,
        "strata_items",
        "id INTEGER PRIMARY KEY, visible BOOLEAN NOT NULL",
    );
    let mut insert = database.query().table("strata_items");
    for id in 1..=23 {
        insert = insert.values([("id", Value::from(id)), ("visible", (id % 5 != 0).into())]);
    }
    insert.insert().expect("Failed to insert the items");

    let query = database
        .query()
        .table("strata_items")
        .columns("id")
        .where_("visible", true)
        .order_by_asc("id");
    let ids = |rows: &[strata_core::RowLabeled]| {
        rows.iter()
            .map(|v| v.get_as::<i64>("id").unwrap())
            .collect::<Vec<_>>()
    };

    let paginator = Paginator::new(query.clone(), 5);
    assert_eq!(paginator.total().unwrap(), 19);
    assert_eq!(paginator.pages().unwrap(), 4);
    let page = paginator.page(1).expect("Failed to read page 1");
    assert_eq!(ids(&page.rows), [1, 2, 3, 4, 6]);
    assert_eq!((page.number, page.total, page.pages), (1, 19, 4));
    let page = paginator.page(4).expect("Failed to read page 4");
    assert_eq!(ids(&page.rows), [19, 21, 22, 23]);
    assert!(paginator.page(5).unwrap().rows.is_empty());

    let paginator = Paginator::new(query, 5).reverse(true);
    let page = paginator.page(1).expect("Failed to read reverse page 1");
    assert_eq!(ids(&page.rows), [18, 19, 21, 22, 23]);
    let page = paginator.page(4).expect("Failed to read reverse page 4");
    assert_eq!(ids(&page.rows), [1, 2, 3, 4]);

    let error = paginator.page(0).expect_err("Page 0 does not exist");
    assert!(matches!(
        DatabaseError::of(&error),
        Some(DatabaseError::Configuration(..))
    ));
}
