use crate::SqliteConnection;
use libsqlite3_sys::{SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE, SQLITE_OPEN_URI};
use strata_core::{Config, Dialect, Driver, NativeConnection, NativeError};
use url::form_urlencoded;

/// Driver opening `sqlite://path?options` urls.
///
/// Options the connection layer does not understand (`mode`, `cache`, `vfs`, ...) are passed to
/// sqlite as uri parameters, `mode` can restrict the default read write create access.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteDriver {}

impl SqliteDriver {
    pub const fn new() -> Self {
        Self {}
    }

    /// The `file:` uri opened for `config`.
    pub fn uri(config: &Config) -> Result<String, NativeError> {
        let path = urlencoding::decode(&config.location).map_err(|e| {
            NativeError::new(
                libsqlite3_sys::SQLITE_CANTOPEN.to_string(),
                format!("Error while decoding the path `{}`: {}", config.location, e),
            )
        })?;
        let mut uri = format!("file:{}", path.replace('?', "%3f").replace('#', "%23"));
        let mut options = form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (name, value) in config.options() {
            options.append_pair(name, value);
            any = true;
        }
        if any {
            uri.push('?');
            uri.push_str(&options.finish());
        }
        Ok(uri)
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self, config: &Config) -> Result<Box<dyn NativeConnection>, NativeError> {
        if config.dialect != Dialect::Sqlite {
            return Err(NativeError::new(
                libsqlite3_sys::SQLITE_MISUSE.to_string(),
                format!("Expected a sqlite connection url, got `{}`", config.dialect),
            ));
        }
        let uri = Self::uri(config)?;
        log::debug!("Opening {}", uri);
        let connection = SqliteConnection::open(
            &uri,
            SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
        )?;
        Ok(Box::new(connection))
    }
}
