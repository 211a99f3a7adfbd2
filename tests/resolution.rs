#[cfg(test)]
mod tests {
    use std::{collections::HashMap, rc::Rc};
    use strata::{
        Condition, Conditional, DatabaseError, Dialect, ModelRegistry, Params, Query, Record,
        Resolver, StatementKind, TableRef,
    };

    struct User;

    impl Record for User {
        fn table(&self) -> &str {
            "users"
        }

        fn schema(&self) -> Option<&str> {
            Some("app")
        }

        fn identity(&self) -> &[&str] {
            &["id"]
        }
    }

    fn models() -> Rc<ModelRegistry> {
        let mut models = ModelRegistry::new();
        models.register("User", || Rc::new(User));
        Rc::new(models)
    }

    fn accounts() -> Rc<HashMap<String, TableRef>> {
        Rc::new(HashMap::from([(
            "Account".to_string(),
            TableRef::new("accounts").with_schema("billing"),
        )]))
    }

    #[test]
    fn model_qualifiers() {
        let query = Query::new(Dialect::Postgres)
            .models(models())
            .table("User")
            .columns("User.name")
            .where_("User.id", 1);
        assert_eq!(
            query.to_sql().unwrap(),
            r#"SELECT "app"."users"."name" FROM "app"."users" WHERE ("app"."users"."id" = 1)"#
        );

        // Once aliased, the model qualifier stands for the alias
        let query = Query::new(Dialect::Postgres)
            .models(models())
            .table("User u")
            .columns("User.name, u.email")
            .where_("User.id", 1);
        assert_eq!(
            query.to_sql().unwrap(),
            r#"SELECT "u"."name", "u"."email" FROM "app"."users" AS "u" WHERE ("u"."id" = 1)"#
        );

        let error = Query::new(Dialect::Postgres)
            .models(models())
            .table("Missing")
            .to_sql()
            .expect_err("The model is not registered");
        assert!(matches!(
            DatabaseError::of(&error),
            Some(DatabaseError::Configuration(..))
        ));
    }

    #[test]
    fn conditions_are_resolved_by_each_statement() {
        let positive = Condition::new(Dialect::Sqlite)
            .where_("Account.balance >", 0)
            .where_("users.active", true);

        let aliased = Query::new(Dialect::Sqlite)
            .table_map(accounts())
            .table("Account a")
            .where_condition(positive.clone());
        assert_eq!(
            aliased.to_sql().unwrap(),
            r#"SELECT * FROM "billing"."accounts" AS "a" WHERE (("a"."balance" > 0) AND ("users"."active" = 1))"#
        );

        let plain = Query::new(Dialect::Sqlite)
            .table_map(accounts())
            .table("Account")
            .where_condition(positive.clone());
        assert_eq!(
            plain.to_sql().unwrap(),
            r#"SELECT * FROM "billing"."accounts" WHERE (("billing"."accounts"."balance" > 0) AND ("users"."active" = 1))"#
        );

        // Standalone rendering goes through the resolver it is given
        let resolver = Resolver::new().with_map(accounts());
        assert_eq!(
            positive.to_literal_with(&resolver).unwrap(),
            r#"("billing"."accounts"."balance" > 0) AND ("users"."active" = 1)"#
        );
        assert_eq!(
            positive.to_literal().unwrap(),
            r#"("Account"."balance" > 0) AND ("users"."active" = 1)"#
        );
        let bound = Condition::new(Dialect::Sqlite)
            .where_expr("Account.owner = :owner")
            .bind(Params::new().with("owner", 9));
        assert_eq!(
            bound.to_sql_with(&resolver).unwrap(),
            r#"("billing"."accounts"."owner" = 9)"#
        );
    }

    #[test]
    fn join_conditions_with_bindings() {
        let on = Condition::new(Dialect::Postgres)
            .where_expr("p.user_id = User.id")
            .where_expr("p.status = :status")
            .bind(Params::new().with("status", "live"));
        let query = Query::new(Dialect::Postgres)
            .models(models())
            .table("User u")
            .columns("User.name, p.title")
            .join("posts p", on)
            .order_by_asc("p.id");
        let statement = query.compile(StatementKind::Select).unwrap();
        assert_eq!(
            statement.sql,
            r#"SELECT "u"."name", "p"."title" FROM "app"."users" AS "u" INNER JOIN "posts" AS "p" ON ("p"."user_id" = "u"."id") AND ("p"."status" = :status) ORDER BY "p"."id" ASC"#
        );
        assert_eq!(statement.params.get("status"), Some(&"live".into()));

        let query = Query::new(Dialect::MySql)
            .table("users u")
            .left_join("posts", ("p", "p.user_id = u.id"))
            .columns("u.name")
            .where_("p.id", strata::Value::Null);
        assert_eq!(
            query.to_sql().unwrap(),
            "SELECT `u`.`name` FROM `users` AS `u` LEFT JOIN `posts` AS `p` ON (`p`.`user_id` = `u`.`id`) WHERE (`p`.`id` IS NULL)"
        );
    }

    #[test]
    fn records_give_table_and_identity() {
        let query = Query::new(Dialect::Postgres)
            .record(Rc::new(User))
            .values([("id", strata::Value::from(1)), ("name", "Ada".into())]);
        assert_eq!(
            query.sql(StatementKind::Upsert).unwrap(),
            r#"INSERT INTO "app"."users" ("id", "name") VALUES (1, 'Ada') ON CONFLICT ("id") DO UPDATE SET "name" = 'Ada'"#
        );
        assert_eq!(
            Query::new(Dialect::Postgres)
                .record(Rc::new(User))
                .where_("id", 1)
                .sql(StatementKind::Delete)
                .unwrap(),
            r#"DELETE FROM "app"."users" WHERE ("id" = 1)"#
        );
        // An explicit table wins over the record one
        assert_eq!(
            Query::new(Dialect::Postgres)
                .table("archive.users")
                .record(Rc::new(User))
                .to_sql()
                .unwrap(),
            r#"SELECT * FROM "archive"."users""#
        );
    }
}
