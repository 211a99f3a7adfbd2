use crate::recreate;
use std::{cell::RefCell, rc::Rc};
use strata_core::{Database, DatabaseError, Error, Event, Value};

fn add(database: &Rc<Database>, id: i32) {
    database
        .query()
        .table("strata_ledger")
        .values([("id", Value::from(id)), ("amount", (id * 10).into())])
        .insert()
        .unwrap_or_else(|e| panic!("Failed to insert ledger row {}: {:#}", id, e));
}

fn ids(database: &Rc<Database>) -> Vec<i64> {
    database
        .query()
        .table("strata_ledger")
        .columns("id")
        .order_by_asc("id")
        .all_as::<i64>()
        .expect("Failed to read the ledger")
}

pub fn transaction(database: &Rc<Database>) {
    recreate(
        database,
        "strata_ledger",
        "id INTEGER PRIMARY KEY, amount INTEGER NOT NULL",
    );
    let events = Rc::new(RefCell::new(Vec::new()));
    {
        let events = events.clone();
        database.add_listener(move |event| match event {
            Event::TransactionBegin { depth } => events.borrow_mut().push(format!("begin {}", depth)),
            Event::TransactionCommit { depth } => {
                events.borrow_mut().push(format!("commit {}", depth))
            }
            Event::TransactionRollback { depth } => {
                events.borrow_mut().push(format!("rollback {}", depth))
            }
            _ => {}
        });
    }

    database.begin_transaction(false).expect("Failed to begin");
    assert_eq!(database.transaction_depth(), 1);
    add(database, 1);
    database.commit(false).expect("Failed to commit");
    assert_eq!(database.transaction_depth(), 0);

    database.begin_transaction(false).expect("Failed to begin");
    add(database, 2);
    database.rollback(false).expect("Failed to rollback");
    assert_eq!(ids(database), [1]);

    let result = database.transaction(|_| {
        add(database, 3);
        Ok(3)
    });
    assert_eq!(result.unwrap(), 3);
    let result: Result<(), Error> = database.transaction(|_| {
        add(database, 4);
        Err(Error::msg("Changed my mind"))
    });
    assert!(result.is_err());
    assert_eq!(ids(database), [1, 3]);
    assert_eq!(database.transaction_depth(), 0);

    let error = database
        .commit(false)
        .expect_err("Commit without a transaction must fail");
    assert!(matches!(
        DatabaseError::of(&error),
        Some(DatabaseError::NoActiveTransaction)
    ));

    assert_eq!(
        *events.borrow(),
        [
            "begin 1",
            "commit 1",
            "begin 1",
            "rollback 1",
            "begin 1",
            "commit 1",
            "begin 1",
            "rollback 1",
        ]
    );
}

pub fn savepoints(database: &Rc<Database>) {
    recreate(
        database,
        "strata_ledger",
        "id INTEGER PRIMARY KEY, amount INTEGER NOT NULL",
    );

    database.begin_transaction(true).expect("Failed to begin");
    add(database, 1);
    database
        .begin_transaction(true)
        .expect("Failed to create a savepoint");
    assert_eq!(database.transaction_depth(), 2);
    add(database, 2);
    database
        .rollback(true)
        .expect("Failed to rollback to the savepoint");
    assert_eq!(database.transaction_depth(), 1);
    database
        .begin_transaction(true)
        .expect("Failed to create a savepoint");
    add(database, 3);
    database.commit(true).expect("Failed to release the savepoint");
    database.commit(true).expect("Failed to commit");
    assert_eq!(ids(database), [1, 3]);

    // Nested helpers: the inner failure only undoes its own work
    let result = database.transaction(|_| {
        add(database, 4);
        let inner: Result<(), Error> = database.transaction(|_| {
            add(database, 5);
            Err(Error::msg("Inner failure"))
        });
        assert!(inner.is_err());
        assert_eq!(database.transaction_depth(), 1);
        Ok(())
    });
    assert!(result.is_ok());
    assert_eq!(ids(database), [1, 3, 4]);

    // Without savepoints the nested levels only count
    database.begin_transaction(false).expect("Failed to begin");
    database.begin_transaction(false).expect("Failed to nest");
    add(database, 6);
    database.commit(false).expect("Failed to leave the nested level");
    assert_eq!(database.transaction_depth(), 1);
    database.rollback(false).expect("Failed to rollback");
    assert_eq!(ids(database), [1, 3, 4]);
}
