#[cfg(test)]
mod tests {
    use strata::{
        Arg, Conditional, DatabaseError, Dialect, Error, Params, Query, Sql, StatementKind, Value,
    };

    fn kind(error: &Error) -> &DatabaseError {
        DatabaseError::of(error).expect("Expected a classified error")
    }

    fn user(id: i64, name: &str) -> [(&'static str, Value); 2] {
        [("id", id.into()), ("name", name.into())]
    }

    #[test]
    fn insert_quoting() {
        let insert = |dialect| {
            Query::new(dialect)
                .table("users")
                .values(user(1, "O'Hara"))
                .sql(StatementKind::Insert)
                .unwrap()
        };
        assert_eq!(
            insert(Dialect::Sqlite),
            r#"INSERT INTO "users" ("id", "name") VALUES (1, 'O''Hara')"#
        );
        assert_eq!(
            insert(Dialect::Postgres),
            r#"INSERT INTO "users" ("id", "name") VALUES (1, 'O''Hara')"#
        );
        assert_eq!(
            insert(Dialect::MySql),
            "INSERT INTO `users` (`id`, `name`) VALUES (1, 'O''Hara')"
        );

        let several = Query::new(Dialect::Postgres)
            .table("public.users")
            .values(user(1, "Ada"))
            .values(user(2, "Alan"));
        let statement = several.compile(StatementKind::Insert).unwrap();
        assert_eq!(statement.params.named.len(), 4);
        assert_eq!(
            statement.to_literal().unwrap(),
            r#"INSERT INTO "public"."users" ("id", "name") VALUES (1, 'Ada'), (2, 'Alan')"#
        );
    }

    #[test]
    fn insert_failures() {
        let error = Query::new(Dialect::Sqlite)
            .table("users")
            .sql(StatementKind::Insert)
            .expect_err("Nothing to insert");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));

        let error = Query::new(Dialect::Sqlite)
            .table("users")
            .values(user(1, "Ada"))
            .values([("id", 2)])
            .sql(StatementKind::Insert)
            .expect_err("Rows must share their columns");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));

        let error = Query::new(Dialect::Sqlite)
            .values(user(1, "Ada"))
            .sql(StatementKind::Insert)
            .expect_err("No table");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));
    }

    #[test]
    fn insert_modes() {
        let ignore = |dialect| {
            Query::new(dialect)
                .table("tags")
                .values([("name", "rust")])
                .ignore()
                .sql(StatementKind::Insert)
                .unwrap()
        };
        assert_eq!(
            ignore(Dialect::Sqlite),
            r#"INSERT OR IGNORE INTO "tags" ("name") VALUES ('rust')"#
        );
        assert_eq!(
            ignore(Dialect::MySql),
            "INSERT IGNORE INTO `tags` (`name`) VALUES ('rust')"
        );
        assert_eq!(
            ignore(Dialect::Postgres),
            r#"INSERT INTO "tags" ("name") VALUES ('rust') ON CONFLICT DO NOTHING"#
        );

        let replace = |dialect| {
            Query::new(dialect)
                .table("tags")
                .values([("name", "rust")])
                .replace()
                .sql(StatementKind::Insert)
        };
        assert_eq!(
            replace(Dialect::MySql).unwrap(),
            "REPLACE INTO `tags` (`name`) VALUES ('rust')"
        );
        assert_eq!(
            replace(Dialect::Sqlite).unwrap(),
            r#"REPLACE INTO "tags" ("name") VALUES ('rust')"#
        );
        let error = replace(Dialect::Postgres).expect_err("Postgres has no REPLACE");
        assert!(matches!(
            kind(&error),
            DatabaseError::UnsupportedOperation { .. }
        ));
    }

    #[test]
    fn upsert_forms() {
        let counter = |dialect| {
            Query::new(dialect)
                .table("counters")
                .values([("id", 1), ("hits", 1)])
                .on_conflict(["id"])
                .upsert_set("hits", Arg::raw("hits + 1"))
                .sql(StatementKind::Upsert)
                .unwrap()
        };
        assert_eq!(
            counter(Dialect::Sqlite),
            r#"INSERT INTO "counters" ("id", "hits") VALUES (1, 1) ON CONFLICT ("id") DO UPDATE SET "hits" = hits + 1"#
        );
        assert_eq!(
            counter(Dialect::MySql),
            "INSERT INTO `counters` (`id`, `hits`) VALUES (1, 1) ON DUPLICATE KEY UPDATE `hits` = hits + 1"
        );

        // One row: the row values are assigned again, the target is left alone
        let single = Query::new(Dialect::Postgres)
            .table("users")
            .values(user(1, "Ada"))
            .on_conflict(["id"]);
        assert_eq!(
            single.sql(StatementKind::Upsert).unwrap(),
            r#"INSERT INTO "users" ("id", "name") VALUES (1, 'Ada') ON CONFLICT ("id") DO UPDATE SET "name" = 'Ada'"#
        );

        // Several rows: the conflicting row proposes the values
        let several = |dialect| {
            Query::new(dialect)
                .table("users")
                .values(user(1, "Ada"))
                .values(user(2, "Alan"))
                .on_conflict(["id"])
                .sql(StatementKind::Upsert)
                .unwrap()
        };
        assert_eq!(
            several(Dialect::Postgres),
            r#"INSERT INTO "users" ("id", "name") VALUES (1, 'Ada'), (2, 'Alan') ON CONFLICT ("id") DO UPDATE SET "name" = EXCLUDED."name""#
        );
        assert_eq!(
            several(Dialect::Sqlite),
            r#"INSERT INTO "users" ("id", "name") VALUES (1, 'Ada'), (2, 'Alan') ON CONFLICT ("id") DO UPDATE SET "name" = excluded."name""#
        );
        assert_eq!(
            several(Dialect::MySql),
            "INSERT INTO `users` (`id`, `name`) VALUES (1, 'Ada'), (2, 'Alan') ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)"
        );

        let listed = Query::new(Dialect::Sqlite)
            .table("users")
            .values([("id", Value::from(1)), ("name", "Ada".into()), ("age", 36.into())])
            .on_conflict(["id"])
            .upsert_columns(["age"]);
        assert_eq!(
            listed.sql(StatementKind::Upsert).unwrap(),
            r#"INSERT INTO "users" ("id", "name", "age") VALUES (1, 'Ada', 36) ON CONFLICT ("id") DO UPDATE SET "age" = excluded."age""#
        );

        // MySQL infers the conflict, the others can go without a target too except Postgres
        assert_eq!(
            Query::new(Dialect::MySql)
                .table("users")
                .values(user(1, "Ada"))
                .sql(StatementKind::Upsert)
                .unwrap(),
            "INSERT INTO `users` (`id`, `name`) VALUES (1, 'Ada') ON DUPLICATE KEY UPDATE `id` = 1, `name` = 'Ada'"
        );
        let error = Query::new(Dialect::Postgres)
            .table("users")
            .values(user(1, "Ada"))
            .sql(StatementKind::Upsert)
            .expect_err("Postgres needs a conflict target");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));

        let error = Query::new(Dialect::Sqlite)
            .table("users")
            .values([("id", 1)])
            .on_conflict(["id"])
            .sql(StatementKind::Upsert)
            .expect_err("Nothing left to update");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));
    }

    #[test]
    fn returning() {
        let insert = |dialect| {
            Query::new(dialect)
                .table("users")
                .values([("name", "Ada")])
                .returning("id, name")
                .sql(StatementKind::Insert)
        };
        assert_eq!(
            insert(Dialect::Postgres).unwrap(),
            r#"INSERT INTO "users" ("name") VALUES ('Ada') RETURNING "id", "name""#
        );
        assert_eq!(
            insert(Dialect::Sqlite).unwrap(),
            r#"INSERT INTO "users" ("name") VALUES ('Ada') RETURNING "id", "name""#
        );
        let error = insert(Dialect::MySql).expect_err("MySQL has no RETURNING");
        assert!(matches!(
            kind(&error),
            DatabaseError::UnsupportedOperation { .. }
        ));
    }

    #[test]
    fn exists_and_count() {
        let query = |dialect| Query::new(dialect).table("users").where_("active", true);
        assert_eq!(
            query(Dialect::Sqlite).sql(StatementKind::Exists).unwrap(),
            r#"SELECT EXISTS(SELECT * FROM "users" WHERE ("active" = 1)) AS "exists""#
        );
        assert_eq!(
            query(Dialect::MySql).sql(StatementKind::Count).unwrap(),
            "SELECT COUNT(*) AS `count` FROM `users` WHERE (`active` = 1)"
        );
        assert_eq!(
            query(Dialect::Postgres)
                .order_by_asc("id")
                .limit(3)
                .sql(StatementKind::Count)
                .unwrap(),
            r#"SELECT COUNT(*) AS "count" FROM "users" WHERE ("active" = TRUE)"#
        );
    }

    #[test]
    fn update() {
        let query = Query::new(Dialect::Sqlite)
            .table("users")
            .set("name", "Bob")
            .set_expr("visits = visits + 1")
            .where_("id", 1);
        assert_eq!(
            query.sql(StatementKind::Update).unwrap(),
            r#"UPDATE "users" SET "name" = 'Bob', "visits" = visits + 1 WHERE ("id" = 1)"#
        );

        // Keywords, numbers and placeholders on the right side are not identifiers
        let flags = Query::new(Dialect::Postgres)
            .table("users")
            .set_expr("active = TRUE")
            .set_expr("name = :name")
            .set_expr("deleted_at = NULL")
            .set_expr("score = -1.5")
            .set_expr("best = score")
            .where_expr("id = 1")
            .bind(Params::new().with("name", "Ada"));
        let statement = flags.compile(StatementKind::Update).unwrap();
        assert_eq!(
            statement.sql,
            r#"UPDATE "users" SET "active" = TRUE, "name" = :name, "deleted_at" = NULL, "score" = -1.5, "best" = "score" WHERE ("id" = 1)"#
        );
        assert_eq!(statement.params.get("name"), Some(&"Ada".into()));

        // The bindings not used by the condition are the columns to update
        let inferred = Query::new(Dialect::Postgres)
            .table("users")
            .where_expr("id = :id")
            .bind(Params::new().with("id", 5).with("name", "Eve"));
        let statement = inferred.compile(StatementKind::Update).unwrap();
        assert_eq!(
            statement.sql,
            r#"UPDATE "users" SET "name" = :name WHERE ("id" = :id)"#
        );
        assert_eq!(
            statement.to_literal().unwrap(),
            r#"UPDATE "users" SET "name" = 'Eve' WHERE ("id" = 5)"#
        );

        let from_row = Query::new(Dialect::MySql)
            .table("users")
            .values(user(7, "Grace"))
            .where_("id", 7);
        assert_eq!(
            from_row.sql(StatementKind::Update).unwrap(),
            "UPDATE `users` SET `id` = 7, `name` = 'Grace' WHERE (`id` = 7)"
        );

        let error = Query::new(Dialect::MySql)
            .table("users")
            .values(user(1, "Ada"))
            .values(user(2, "Alan"))
            .sql(StatementKind::Update)
            .expect_err("Only one row can be the update");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));

        let error = Query::new(Dialect::MySql)
            .table("users")
            .where_("id", 1)
            .sql(StatementKind::Update)
            .expect_err("Nothing to update");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));

        let error = Query::new(Dialect::Sqlite)
            .table("users")
            .set_expr("visits")
            .sql(StatementKind::Update)
            .expect_err("Assignment without `=`");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));
    }

    #[test]
    fn delete_and_truncate() {
        let delete = |dialect| {
            Query::new(dialect)
                .table("logs")
                .where_("level", "debug")
                .limit(100)
                .sql(StatementKind::Delete)
        };
        assert_eq!(
            delete(Dialect::MySql).unwrap(),
            "DELETE FROM `logs` WHERE (`level` = 'debug') LIMIT 100"
        );
        let error = delete(Dialect::Postgres).expect_err("Postgres cannot limit a DELETE");
        assert!(matches!(
            kind(&error),
            DatabaseError::UnsupportedOperation { .. }
        ));
        assert_eq!(
            Query::new(Dialect::Sqlite)
                .table("logs")
                .where_in("level", ["debug", "trace"])
                .sql(StatementKind::Delete)
                .unwrap(),
            r#"DELETE FROM "logs" WHERE ("level" IN ('debug', 'trace'))"#
        );

        let truncate = |dialect| Query::new(dialect).table("logs").sql(StatementKind::Truncate);
        assert_eq!(truncate(Dialect::Postgres).unwrap(), r#"TRUNCATE TABLE "logs""#);
        assert_eq!(truncate(Dialect::MySql).unwrap(), "TRUNCATE TABLE `logs`");
        let error = truncate(Dialect::Sqlite).expect_err("SQLite has no TRUNCATE");
        assert!(matches!(
            kind(&error),
            DatabaseError::UnsupportedOperation { .. }
        ));
    }

    #[test]
    fn limit_offset_and_locks() {
        let skip = |dialect| Query::new(dialect).table("t").offset(10).to_sql().unwrap();
        assert_eq!(skip(Dialect::Sqlite), r#"SELECT * FROM "t" LIMIT -1 OFFSET 10"#);
        assert_eq!(
            skip(Dialect::MySql),
            "SELECT * FROM `t` LIMIT 18446744073709551615 OFFSET 10"
        );
        assert_eq!(skip(Dialect::Postgres), r#"SELECT * FROM "t" OFFSET 10"#);
        assert_eq!(
            Query::new(Dialect::Postgres)
                .table("t")
                .limit(5)
                .offset(0)
                .to_sql()
                .unwrap(),
            r#"SELECT * FROM "t" LIMIT 5"#
        );

        let locked = |dialect| Query::new(dialect).table("t").where_("id", 1);
        assert_eq!(
            locked(Dialect::Postgres).for_update().to_sql().unwrap(),
            r#"SELECT * FROM "t" WHERE ("id" = 1) FOR UPDATE"#
        );
        assert_eq!(
            locked(Dialect::Postgres).shared_lock().to_sql().unwrap(),
            r#"SELECT * FROM "t" WHERE ("id" = 1) FOR SHARE"#
        );
        assert_eq!(
            locked(Dialect::MySql).shared_lock().to_sql().unwrap(),
            "SELECT * FROM `t` WHERE (`id` = 1) LOCK IN SHARE MODE"
        );
        let error = locked(Dialect::Sqlite)
            .for_update()
            .to_sql()
            .expect_err("SQLite has no row locks");
        assert!(matches!(
            kind(&error),
            DatabaseError::UnsupportedOperation { .. }
        ));
    }

    #[test]
    fn select_clauses() {
        let query = Query::new(Dialect::MySql)
            .table("posts")
            .columns("author_id")
            .columns(Sql::func("COUNT", [Sql::raw("*")]).alias("total"))
            .group_by("author_id")
            .having("COUNT(*) >", 2)
            .order_by_desc("total");
        assert_eq!(
            query.to_sql().unwrap(),
            "SELECT `author_id`, COUNT(*) AS `total` FROM `posts` GROUP BY `author_id` HAVING (COUNT(*) > 2) ORDER BY `total` DESC"
        );

        let query = Query::new(Dialect::Postgres)
            .table("users u")
            .distinct()
            .columns("u.country AS nation")
            .order_by("u.country DESC");
        assert_eq!(
            query.to_sql().unwrap(),
            r#"SELECT DISTINCT "u"."country" AS "nation" FROM "users" AS "u" ORDER BY "u"."country" DESC"#
        );

        let query = Query::new(Dialect::MySql)
            .table("users")
            .modifier("SQL_CALC_FOUND_ROWS")
            .columns("id");
        assert_eq!(
            query.to_sql().unwrap(),
            "SELECT SQL_CALC_FOUND_ROWS `id` FROM `users`"
        );
    }

    #[test]
    fn sub_statements() {
        let big = Query::new(Dialect::Sqlite)
            .table("orders")
            .columns("user_id")
            .where_("total >", 100);
        let query = Query::new(Dialect::Sqlite)
            .from_query(big.clone(), "big")
            .columns("big.user_id");
        assert_eq!(
            query.to_sql().unwrap(),
            r#"SELECT "big"."user_id" FROM (SELECT "user_id" FROM "orders" WHERE ("total" > 100)) AS "big""#
        );
        let error = query
            .values([("user_id", 1)])
            .sql(StatementKind::Insert)
            .expect_err("A sub statement is not a table");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));

        let query = Query::new(Dialect::Sqlite)
            .table("users")
            .columns("name")
            .where_in("id", big)
            .where_("active", true);
        let statement = query.compile(StatementKind::Select).unwrap();
        assert_eq!(statement.params.named.len(), 2);
        assert_eq!(
            statement.to_literal().unwrap(),
            r#"SELECT "name" FROM "users" WHERE ("id" IN (SELECT "user_id" FROM "orders" WHERE ("total" > 100))) AND ("active" = 1)"#
        );
    }

    #[test]
    fn long_in_lists() {
        let ids: Vec<i64> = (1..=2000).collect();
        let query = Query::new(Dialect::Postgres).table("t").where_in("id", ids);
        let statement = query.compile(StatementKind::Select).unwrap();
        assert_eq!(statement.params.named.len(), 2000);
        let sql = statement.to_literal().unwrap();
        assert!(sql.starts_with(r#"SELECT * FROM "t" WHERE ("id" IN (1, 2, 3, "#));
        assert!(sql.ends_with("1999, 2000))"));

        let empty: Vec<i64> = Vec::new();
        assert_eq!(
            Query::new(Dialect::Postgres)
                .table("t")
                .where_in("id", empty.clone())
                .or_where_not_in("id", empty)
                .to_sql()
                .unwrap(),
            r#"SELECT * FROM "t" WHERE (1 = 0) OR (1 = 1)"#
        );
    }

    #[test]
    fn compiling_is_repeatable() {
        let query = Query::new(Dialect::Sqlite)
            .table("users")
            .columns(Sql::func("LOWER", [Sql::param("X")]).alias("x"))
            .where_("name LIKE", "A%")
            .limit(1);
        let first = query.compile(StatementKind::Select).unwrap();
        let second = query.compile(StatementKind::Select).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.params.named.len(), 2);
        assert_eq!(
            first.to_literal().unwrap(),
            r#"SELECT LOWER('X') AS "x" FROM "users" WHERE ("name" LIKE 'A%') LIMIT 1"#
        );
    }

    #[test]
    fn builder_failures_surface_on_compile() {
        let query = Query::new(Dialect::Sqlite)
            .table("users")
            .group_start()
            .where_("a", 1);
        assert!(query.to_sql().is_err());

        let query = Query::new(Dialect::MySql)
            .table("users u")
            .full_join("posts p", "p.user_id = u.id");
        let error = query.to_sql().expect_err("MySQL has no FULL OUTER JOIN");
        assert!(matches!(
            kind(&error),
            DatabaseError::UnsupportedOperation { .. }
        ));

        let query = Query::new(Dialect::Postgres)
            .table("users")
            .cross_join("posts", "posts.user_id = users.id");
        let error = query.to_sql().expect_err("CROSS JOIN has no condition");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));

        let error = Query::new(Dialect::Postgres)
            .table("users")
            .select()
            .expect_err("The query has no connection");
        assert!(matches!(kind(&error), DatabaseError::Configuration(..)));
    }
}
