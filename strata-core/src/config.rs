use crate::{DatabaseError, Dialect, ReconnectPolicy, Result};
use indexmap::IndexMap;
use std::time::Duration;
use url::form_urlencoded;

/// Shape of the rows returned by [`Cursor::fetch`](crate::Cursor::fetch).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchShape {
    #[default]
    Labeled,
    Positional,
}

/// Connection settings parsed from `scheme://location?options`.
///
/// ```rust
/// use strata_core::{Config, Dialect};
/// let config = Config::new("sqlite://data.db?reconnect=true&mode=ro").unwrap();
/// assert_eq!(config.dialect, Dialect::Sqlite);
/// assert_eq!(config.location, "data.db");
/// assert!(config.policy.enabled);
/// assert_eq!(config.option("mode"), Some("ro"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub url: String,
    pub dialect: Dialect,
    /// Everything between `scheme://` and `?`, drivers interpret it.
    pub location: String,
    pub fetch: FetchShape,
    pub policy: ReconnectPolicy,
    pub username: Option<String>,
    pub password: Option<String>,
    options: IndexMap<String, String>,
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}

fn parse_seconds(name: &str, value: &str) -> Result<Duration> {
    value
        .parse::<f64>()
        .ok()
        .and_then(|v| Duration::try_from_secs_f64(v).ok())
        .ok_or_else(|| invalid(name, value))
}

fn invalid(name: &str, value: &str) -> crate::Error {
    let error =
        DatabaseError::configuration(format!("Invalid value `{}` for option `{}`", value, name));
    log::error!("{}", error);
    error.into()
}

impl Config {
    pub fn new(url: &str) -> Result<Self> {
        let dialect = Dialect::from_url(url)?;
        let rest = url
            .split_once(':')
            .map(|(_, v)| v.trim_start_matches("//"))
            .unwrap_or_default();
        let (location, query) = rest.split_once('?').unwrap_or((rest, ""));
        let mut result = Self {
            url: url.to_string(),
            dialect,
            location: location.to_string(),
            fetch: Default::default(),
            policy: Default::default(),
            username: None,
            password: None,
            options: IndexMap::new(),
        };
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.as_ref();
            match name.as_ref() {
                "fetch" => {
                    result.fetch = match value {
                        "labeled" => FetchShape::Labeled,
                        "positional" => FetchShape::Positional,
                        _ => return Err(invalid("fetch", value)),
                    }
                }
                "reconnect" => result.policy.enabled = parse_bool("reconnect", value)?,
                "reconnect_attempts" => {
                    result.policy.attempts = match value {
                        "unbounded" => None,
                        v => Some(v.parse().map_err(|_| invalid("reconnect_attempts", v))?),
                    }
                }
                "reconnect_delay" => {
                    result.policy.base_delay = parse_seconds("reconnect_delay", value)?
                }
                "reconnect_backoff" => {
                    result.policy.backoff = value
                        .parse()
                        .map_err(|_| invalid("reconnect_backoff", value))?
                }
                "reconnect_max_delay" => {
                    result.policy.max_delay = parse_seconds("reconnect_max_delay", value)?
                }
                "reconnect_jitter" => result.policy.jitter = parse_bool("reconnect_jitter", value)?,
                "username" => result.username = Some(value.to_string()),
                "password" => result.password = Some(value.to_string()),
                name => {
                    result.options.insert(name.to_string(), value.to_string());
                }
            }
        }
        Ok(result)
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    pub fn with_fetch(mut self, fetch: FetchShape) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn with_option(mut self, name: &str, value: &str) -> Self {
        self.options.insert(name.to_string(), value.to_string());
        self
    }

    /// Driver specific option, the ones understood here are not included.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options() {
        let config = Config::new(
            "postgres://localhost:5432/app?reconnect=1&reconnect_attempts=unbounded&reconnect_delay=0.5&reconnect_backoff=3&reconnect_max_delay=10&reconnect_jitter=true&fetch=positional&username=admin&password=p%40ss&sslmode=require",
        )
        .unwrap();
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.location, "localhost:5432/app");
        assert_eq!(config.fetch, FetchShape::Positional);
        assert_eq!(
            config.policy,
            ReconnectPolicy::new()
                .enabled(true)
                .unbounded()
                .base_delay(Duration::from_millis(500))
                .backoff(3.0)
                .max_delay(Duration::from_secs(10))
                .jitter(true)
        );
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(config.password.as_deref(), Some("p@ss"));
        assert_eq!(config.options().collect::<Vec<_>>(), [("sslmode", "require")]);
    }

    #[test]
    fn defaults() {
        let config = Config::new("sqlite://:memory:").unwrap();
        assert_eq!(config.location, ":memory:");
        assert_eq!(config.fetch, FetchShape::Labeled);
        assert_eq!(config.policy, ReconnectPolicy::default());
        assert!(Config::new("mysql://host?reconnect=maybe").is_err());
        assert!(Config::new("mysql://host?fetch=columns").is_err());
    }

    #[test]
    fn builders() {
        let config = Config::new("mysql://db.internal/shop")
            .unwrap()
            .with_credentials("shop", "secret")
            .with_fetch(FetchShape::Positional)
            .with_policy(ReconnectPolicy::new().enabled(true).attempts(5))
            .with_option("charset", "utf8mb4");
        assert_eq!(config.username.as_deref(), Some("shop"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.fetch, FetchShape::Positional);
        assert!(config.policy.allows(4) && !config.policy.allows(5));
        assert_eq!(config.option("charset"), Some("utf8mb4"));
        assert_eq!(config.option("reconnect"), None);
    }
}
