use crate::error::{BadEnvVarSnafu, ParseNumberSnafu, StudentsResult};
use dotenvy::var;
use snafu::ResultExt;
use std::{env::VarError, path::PathBuf, sync::Arc};

const DEFAULT_DB_PATH: &str = "students.sqlite";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SERVER_IP: &str = "0.0.0.0:8000";

/// Resolves a variable name to its value, or `None` if it isn't set.
type Lookup<'a> = &'a dyn Fn(&'static str) -> StudentsResult<Option<String>>;

fn env_lookup(name: &'static str) -> StudentsResult<Option<String>> {
    match var(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(e) => Err(e).context(BadEnvVarSnafu { name }),
    }
}

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    server_config: Arc<ServerConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> StudentsResult<Self> {
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: Lookup) -> StudentsResult<Self> {
        Ok(Self {
            db_config: Arc::new(DbConfig::from_lookup(lookup)?),
            server_config: Arc::new(ServerConfig::from_lookup(lookup)?),
        })
    }

    #[cfg(test)]
    pub fn for_db(db_config: DbConfig) -> Self {
        Self {
            db_config: Arc::new(db_config),
            server_config: Arc::new(ServerConfig {
                server_ip: DEFAULT_SERVER_IP.to_string(),
            }),
        }
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.server_config.clone()
    }
}

#[derive(Debug)]
pub struct DbConfig {
    path: PathBuf,
    max_connections: u32,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>, max_connections: u32) -> Self {
        Self {
            path: path.into(),
            max_connections,
        }
    }

    fn from_lookup(lookup: Lookup) -> StudentsResult<Self> {
        let path = lookup("STUDENTS_DB_PATH")?.unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let max_connections = match lookup("STUDENTS_DB_MAX_CONNECTIONS")? {
            Some(raw) => raw.trim().parse().context(ParseNumberSnafu {
                name: "STUDENTS_DB_MAX_CONNECTIONS",
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self::new(path, max_connections))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

#[derive(Debug)]
pub struct ServerConfig {
    server_ip: String,
}

impl ServerConfig {
    fn from_lookup(lookup: Lookup) -> StudentsResult<Self> {
        Ok(Self {
            server_ip: lookup("STUDENTS_SERVER_IP")?
                .unwrap_or_else(|| DEFAULT_SERVER_IP.to_string()),
        })
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudentsError;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> StudentsResult<Option<String>> {
        let vars: HashMap<&'static str, String> = vars
            .iter()
            .map(|(name, value)| (*name, (*value).to_string()))
            .collect();
        move |name| Ok(vars.get(name).cloned())
    }

    #[test]
    fn unset_vars_fall_back_to_defaults() {
        let config = RuntimeConfiguration::from_lookup(&lookup_from(&[])).unwrap();

        assert_eq!(config.db_config().path(), &PathBuf::from("students.sqlite"));
        assert_eq!(config.db_config().max_connections(), 5);
        assert_eq!(config.server_config().server_ip(), "0.0.0.0:8000");
    }

    #[test]
    fn set_vars_override_defaults() {
        let config = RuntimeConfiguration::from_lookup(&lookup_from(&[
            ("STUDENTS_DB_PATH", "/tmp/school.sqlite"),
            ("STUDENTS_DB_MAX_CONNECTIONS", " 12 "),
            ("STUDENTS_SERVER_IP", "127.0.0.1:9000"),
        ]))
        .unwrap();

        assert_eq!(
            config.db_config().path(),
            &PathBuf::from("/tmp/school.sqlite")
        );
        assert_eq!(config.db_config().max_connections(), 12);
        assert_eq!(config.server_config().server_ip(), "127.0.0.1:9000");
    }

    #[test]
    fn unparsable_pool_size_is_an_error() {
        let err = RuntimeConfiguration::from_lookup(&lookup_from(&[(
            "STUDENTS_DB_MAX_CONNECTIONS",
            "lots",
        )]))
        .unwrap_err();

        assert!(matches!(
            err,
            StudentsError::ParseNumber {
                name: "STUDENTS_DB_MAX_CONNECTIONS",
                ..
            }
        ));
    }
}
