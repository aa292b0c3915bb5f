//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file.
///
/// Not validated here: the environment overlay may still fill in fields.
/// Validate the final config with [`crate::config::validate_config`].
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

impl ServiceConfig {
    /// Overlay `DB_*`, `PORT` and `LOG_LEVEL` from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay environment values obtained through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.database.port = parse_env("DB_PORT", port)?;
        }
        if let Some(user) = lookup("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = name;
        }
        if let Some(port) = lookup("PORT") {
            self.listener.port = parse_env("PORT", port)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.observability.log_level = level;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_config;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_defaults() {
        let mut config = ServiceConfig::default();
        config
            .apply_env_with(lookup_from(&[
                ("DB_HOST", "mysql.local"),
                ("DB_USER", "kpi_reader"),
                ("DB_PASSWORD", "secret"),
                ("DB_NAME", "fleet"),
                ("PORT", "9001"),
            ]))
            .unwrap();

        assert_eq!(config.database.host, "mysql.local");
        assert_eq!(config.database.user, "kpi_reader");
        assert_eq!(config.database.password, "secret");
        assert_eq!(config.database.name, "fleet");
        assert_eq!(config.listener.port, 9001);
        assert_eq!(config.database.port, 3306);
    }

    #[test]
    fn test_empty_env_keeps_defaults() {
        let mut config = ServiceConfig::default();
        config.apply_env_with(|_| None).unwrap();
        assert_eq!(config.database.name, "be_database");
        assert_eq!(config.listener.port, 8000);
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_env_with(lookup_from(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "PORT", .. }));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            port = 8123

            [database]
            name = "kpi_archive"
            pool_size = 5
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.port, 8123);
        assert_eq!(config.database.name, "kpi_archive");
        assert_eq!(config.database.pool_size, 5);
    }

    #[test]
    fn test_env_fills_field_left_empty_in_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nhost = \"\"").unwrap();

        let mut config = load_config(file.path()).unwrap();
        assert!(validate_config(&config).is_err());

        config
            .apply_env_with(lookup_from(&[("DB_HOST", "mysql.local")]))
            .unwrap();
        assert_eq!(config.database.host, "mysql.local");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_file_fails_final_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npool_size = 0").unwrap();

        let mut config = load_config(file.path()).unwrap();
        config.apply_env_with(|_| None).unwrap();
        let err = ConfigError::Validation(validate_config(&config).unwrap_err());
        assert!(err.to_string().contains("database.pool_size"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/driver-kpi.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
