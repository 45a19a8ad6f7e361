//! Settings are read from, in increasing priority: built-in defaults, an optional
//! `configuration` file (`TRIVIA_CONFIG` names another one) and `TRIVIA__`-prefixed
//! environment variables such as `TRIVIA__DATABASE__PATH` or `TRIVIA__APPLICATION__PORT`.

use config::{Config, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// Path of the SQLite database file.
    pub path: SecretString,
}

fn environment() -> Environment {
    Environment::with_prefix("TRIVIA")
        .prefix_separator("__")
        .separator("__")
}

fn load(file: &str, environment: Environment) -> Result<Settings, ConfigError> {
    Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 8080)?
        .add_source(File::with_name(file).required(false))
        .add_source(environment)
        .build()?
        .try_deserialize()
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let file = std::env::var("TRIVIA_CONFIG").unwrap_or_else(|_| "configuration".to_owned());
    load(&file, environment())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn defaults_and_environment() {
        let settings = load(
            "does-not-exist",
            vars(&[("TRIVIA__DATABASE__PATH", "trivia.db")]),
        )
        .unwrap();
        assert_eq!(settings.application.address(), "0.0.0.0:8080");
        assert_eq!(settings.database.path.expose_secret(), "trivia.db");
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[application]\nhost = \"127.0.0.1\"\nport = 3000\n\n[database]\npath = \"file.db\""
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_owned();

        let settings = load(&path, vars(&[("TRIVIA__APPLICATION__PORT", "5000")])).unwrap();
        assert_eq!(settings.application.address(), "127.0.0.1:5000");
        assert_eq!(settings.database.path.expose_secret(), "file.db");
    }

    #[test]
    fn database_path_is_required() {
        assert!(load("does-not-exist", vars(&[])).is_err());
    }

    #[test]
    fn database_path_is_not_printed() {
        let settings = load(
            "does-not-exist",
            vars(&[("TRIVIA__DATABASE__PATH", "postgres://user:hunter2@db")]),
        )
        .unwrap();
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
