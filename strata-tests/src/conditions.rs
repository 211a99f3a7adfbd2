use crate::recreate;
use std::rc::Rc;
use strata_core::{Condition, Conditional, Database, Params, Value};

fn seed_people(database: &Rc<Database>) {
    recreate(
        database,
        "strata_people",
        "id INTEGER PRIMARY KEY, name VARCHAR(64) NOT NULL, age INTEGER NOT NULL, city VARCHAR(64)",
    );
    let rows = [
        (1, "Ada", 36, Some("London")),
        (2, "Alan", 41, Some("Manchester")),
        (3, "Grace", 85, None),
        (4, "Linus", 28, Some("Helsinki")),
        (5, "Barbara", 72, Some("Boston")),
    ];
    let mut query = database.query().table("strata_people");
    for (id, name, age, city) in rows {
        query = query.values([
            ("id", Value::from(id)),
            ("name", name.into()),
            ("age", age.into()),
            ("city", city.map(Value::from).unwrap_or(Value::Null)),
        ]);
    }
    query.insert().expect("Failed to insert the people");
}

fn names(query: strata_core::Query) -> Vec<String> {
    query
        .columns("name")
        .order_by_asc("id")
        .all_as::<String>()
        .unwrap_or_else(|e| panic!("Failed to select the names: {:#}", e))
}

pub fn conditions(database: &Rc<Database>) {
    seed_people(database);
    let people = || database.query().table("strata_people");

    assert_eq!(
        names(people().where_("age >=", 70).or_where("name", "Ada")),
        ["Ada", "Grace", "Barbara"]
    );
    assert_eq!(
        names(people().where_between("age", 30, 50)),
        ["Ada", "Alan"]
    );
    assert_eq!(
        names(people().where_not_between("age", 30, 80)),
        ["Grace", "Linus"]
    );
    assert_eq!(names(people().where_like("name", "A%")), ["Ada", "Alan"]);
    assert_eq!(
        names(people().where_not_in("id", [1, 2, 3])),
        ["Linus", "Barbara"]
    );
    assert_eq!(names(people().where_expr("city IS NULL")), ["Grace"]);
    assert_eq!(
        names(
            people()
                .where_("age >", 30)
                .group_start()
                .where_("city", "London")
                .or_where("city", "Boston")
                .group_end()
        ),
        ["Ada", "Barbara"]
    );
    assert_eq!(
        names(
            people()
                .not_group_start()
                .where_("age <", 40)
                .group_end()
                .where_("city IS NOT", Value::Null)
        ),
        ["Alan", "Barbara"]
    );

    // Manual placeholders
    assert_eq!(
        names(people().where_params(
            "age > :min AND city = :city",
            Params::new().with("min", 30).with("city", "Manchester"),
        )),
        ["Alan"]
    );
    assert_eq!(
        names(people().where_params("age < ?", Params::positional([40]))),
        ["Ada", "Linus"]
    );
    let template = people().where_expr("age > :min");
    assert_eq!(
        names(template.clone().bind(Params::new().with("min", 80))),
        ["Grace"]
    );
    assert_eq!(
        names(template.bind(Params::new().with("min", 70))),
        ["Grace", "Barbara"]
    );

    // Nested conditions keep their own parameters
    let young = Condition::new(database.dialect()).where_("age <", 30);
    let old = Condition::new(database.dialect()).where_("age >", 80);
    assert_eq!(
        names(people().where_condition(young).or_where_condition(old)),
        ["Grace", "Linus"]
    );

    // Sub statements
    let adults = database
        .query()
        .table("strata_people")
        .columns("id")
        .where_("age >", 70);
    assert_eq!(
        names(people().where_in("id", adults)),
        ["Grace", "Barbara"]
    );

    // Large lists
    let ids: Vec<i64> = (1..=2000).collect();
    assert_eq!(people().where_in("id", ids).count().unwrap(), 5);
}

pub fn joins(database: &Rc<Database>) {
    recreate(
        database,
        "strata_posts",
        "id INTEGER PRIMARY KEY, author_id INTEGER NOT NULL, title VARCHAR(128) NOT NULL",
    );
    database
        .query()
        .table("strata_posts")
        .values([
            ("id", Value::from(1)),
            ("author_id", 1.into()),
            ("title", "Notes".into()),
        ])
        .values([
            ("id", Value::from(2)),
            ("author_id", 1.into()),
            ("title", "Engines".into()),
        ])
        .values([
            ("id", Value::from(3)),
            ("author_id", 4.into()),
            ("title", "Kernels".into()),
        ])
        .values([
            ("id", Value::from(4)),
            ("author_id", 9.into()),
            ("title", "Orphan".into()),
        ])
        .insert()
        .expect("Failed to insert the posts");

    let titles = database
        .query()
        .table("strata_people u")
        .columns("p.title")
        .join("strata_posts", ("p", "p.author_id = u.id"))
        .where_("u.name", "Ada")
        .order_by_asc("p.id")
        .all_as::<String>()
        .expect("Failed to select with an inner join");
    assert_eq!(titles, ["Notes", "Engines"]);

    let counts = database
        .query()
        .table("strata_people u")
        .columns("u.name, COUNT(p.id) AS posts")
        .left_join("strata_posts p", "p.author_id = u.id")
        .group_by("u.id, u.name")
        .having("COUNT(p.id) >", 0)
        .order_by_asc("u.id")
        .all_as::<strata_core::RowLabeled>()
        .expect("Failed to select with a left join");
    let counts = counts
        .iter()
        .map(|v| {
            (
                v.get_as::<String>("name").unwrap(),
                v.get_as::<i64>("posts").unwrap(),
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(counts, [("Ada".to_string(), 2), ("Linus".to_string(), 1)]);

    // ON condition with its own values
    let on = Condition::new(database.dialect())
        .where_expr("p.author_id = u.id")
        .where_("p.title LIKE", "K%");
    let names = database
        .query()
        .table("strata_people u")
        .columns("u.name")
        .join("strata_posts", (on, "p"))
        .all_as::<String>()
        .expect("Failed to join on a condition");
    assert_eq!(names, ["Linus"]);

    #[cfg(not(feature = "disable-right-join"))]
    {
        let orphans = database
            .query()
            .table("strata_people u")
            .columns("p.title")
            .right_join("strata_posts p", "p.author_id = u.id")
            .where_("u.id", Value::Null)
            .all_as::<String>()
            .expect("Failed to select with a right join");
        assert_eq!(orphans, ["Orphan"]);
    }
}
