use crate::{
    DatabaseError, Result,
    writer::{MySqlSqlWriter, PostgresSqlWriter, SqlWriter, SqliteSqlWriter},
};
use std::fmt::{self, Display};

/// Backend SQL flavor, it drives every syntax choice of the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySql,
    Postgres,
    Sqlite,
}

/// How the connection layer reacts to a native failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Deadlock,
    ConnectionLost,
    Other,
}

static MYSQL_WRITER: MySqlSqlWriter = MySqlSqlWriter {};
static POSTGRES_WRITER: PostgresSqlWriter = PostgresSqlWriter {};
static SQLITE_WRITER: SqliteSqlWriter = SqliteSqlWriter {};

impl Dialect {
    pub fn from_scheme(scheme: &str) -> Result<Self> {
        Ok(match scheme.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Dialect::MySql,
            "postgres" | "postgresql" | "pgsql" => Dialect::Postgres,
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            _ => {
                let error =
                    DatabaseError::configuration(format!("Unknown database scheme `{}`", scheme));
                log::error!("{}", error);
                return Err(error.into());
            }
        })
    }

    /// Dialect named by the scheme of a connection url like `postgres://localhost/db`.
    pub fn from_url(url: &str) -> Result<Self> {
        let Some((scheme, _)) = url.split_once(':') else {
            return Err(DatabaseError::configuration(format!(
                "Connection url `{}` has no scheme",
                url
            ))
            .into());
        };
        Self::from_scheme(scheme)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    pub fn writer(&self) -> &'static dyn SqlWriter {
        match self {
            Dialect::MySql => &MYSQL_WRITER,
            Dialect::Postgres => &POSTGRES_WRITER,
            Dialect::Sqlite => &SQLITE_WRITER,
        }
    }

    pub fn identifier_quote(&self) -> char {
        match self {
            Dialect::MySql => '`',
            _ => '"',
        }
    }

    /// Classifies a native error code.
    pub fn classify(&self, code: &str) -> Failure {
        match self {
            Dialect::MySql => match code {
                "1213" | "1205" | "40001" => Failure::Deadlock,
                "2006" | "2013" | "2055" | "08S01" => Failure::ConnectionLost,
                _ => Failure::Other,
            },
            Dialect::Postgres => match code {
                "40001" | "40P01" => Failure::Deadlock,
                "57P01" | "57P02" | "57P03" => Failure::ConnectionLost,
                c if c.starts_with("08") => Failure::ConnectionLost,
                _ => Failure::Other,
            },
            // Extended result codes carry the primary code in the low byte
            Dialect::Sqlite => match code.parse::<i32>().map(|v| v & 0xff) {
                Ok(5) | Ok(6) => Failure::Deadlock,
                _ => Failure::Other,
            },
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
