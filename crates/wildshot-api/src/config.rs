//! Server configuration read from environment variables.

use std::path::PathBuf;

use wildshot_expedition::domain::biome::BiomeCatalog;
use wildshot_expedition::domain::countdown::{DEFAULT_TIME_LIMIT_SECS, MAX_TIME_LIMIT_SECS};

use crate::error::AppError;

/// Runtime configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// PostgreSQL connection string (`DATABASE_URL`, required).
    pub database_url: String,
    /// Bind address (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Bind port (`PORT`, default `3000`).
    pub port: u16,
    /// Countdown for new expeditions (`EXPEDITION_TIME_LIMIT_SECS`).
    pub time_limit_secs: u64,
    /// Custom biome catalog YAML (`BIOME_CATALOG_PATH`).
    pub biome_catalog_path: Option<PathBuf>,
    /// fal.ai key (`FAL_KEY`).
    pub fal_key: Option<String>,
    /// Blockade Labs key (`BLOCKADE_API_KEY`).
    pub blockade_api_key: Option<String>,
    /// Gemini key (`GEMINI_API_KEY`).
    pub gemini_api_key: Option<String>,
    /// Groq key (`GROQ_API_KEY`).
    pub groq_api_key: Option<String>,
    /// OTLP collector; tracing export is off when unset.
    pub otel_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when `DATABASE_URL` is missing or a
    /// numeric variable does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// count as unset.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".to_owned())
        })?;
        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let time_limit_secs = match get("EXPEDITION_TIME_LIMIT_SECS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("EXPEDITION_TIME_LIMIT_SECS must be a whole number: {e}"))
            })?,
            None => DEFAULT_TIME_LIMIT_SECS,
        };
        if !(1..=MAX_TIME_LIMIT_SECS).contains(&time_limit_secs) {
            return Err(AppError::Config(format!(
                "EXPEDITION_TIME_LIMIT_SECS must be between 1 and {MAX_TIME_LIMIT_SECS}"
            )));
        }

        Ok(Self {
            database_url,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            time_limit_secs,
            biome_catalog_path: get("BIOME_CATALOG_PATH").map(PathBuf::from),
            fal_key: get("FAL_KEY"),
            blockade_api_key: get("BLOCKADE_API_KEY"),
            gemini_api_key: get("GEMINI_API_KEY"),
            groq_api_key: get("GROQ_API_KEY"),
            otel_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// Loads the configured catalog, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or is invalid.
    pub fn load_catalog(&self) -> Result<BiomeCatalog, AppError> {
        let Some(path) = &self.biome_catalog_path else {
            return Ok(BiomeCatalog::default());
        };
        let source = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read biome catalog {}: {e}", path.display()))
        })?;
        BiomeCatalog::from_yaml(&source).map_err(|e| AppError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        // Act
        let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")])).unwrap();

        // Assert
        assert_eq!(config.database_url, "postgres://db");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.time_limit_secs, 180);
        assert!(config.biome_catalog_path.is_none());
        assert!(config.gemini_api_key.is_none());
        assert!(config.otel_endpoint.is_none());
    }

    #[test]
    fn test_all_variables_are_read() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("EXPEDITION_TIME_LIMIT_SECS", "90"),
            ("BIOME_CATALOG_PATH", "biomes.yaml"),
            ("FAL_KEY", "fal"),
            ("BLOCKADE_API_KEY", "blockade"),
            ("GEMINI_API_KEY", "gemini"),
            ("GROQ_API_KEY", "groq"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://otel:4317"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.time_limit_secs, 90);
        assert_eq!(config.biome_catalog_path, Some(PathBuf::from("biomes.yaml")));
        assert_eq!(config.fal_key.as_deref(), Some("fal"));
        assert_eq!(config.blockade_api_key.as_deref(), Some("blockade"));
        assert_eq!(config.gemini_api_key.as_deref(), Some("gemini"));
        assert_eq!(config.groq_api_key.as_deref(), Some("groq"));
        assert_eq!(config.otel_endpoint.as_deref(), Some("http://otel:4317"));
    }

    #[test]
    fn test_missing_database_url_is_a_config_error() {
        let result = AppConfig::from_lookup(lookup(&[("PORT", "3000")]));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("DATABASE_URL")));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("GROQ_API_KEY", "   "),
        ]))
        .unwrap();

        assert!(config.groq_api_key.is_none());
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        let bad_port =
            AppConfig::from_lookup(lookup(&[("DATABASE_URL", "x"), ("PORT", "eighty")]));
        let zero_limit = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "x"),
            ("EXPEDITION_TIME_LIMIT_SECS", "0"),
        ]));

        assert!(matches!(bad_port, Err(AppError::Config(msg)) if msg.contains("PORT")));
        assert!(matches!(zero_limit, Err(AppError::Config(_))));

        let huge_limit = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "x"),
            ("EXPEDITION_TIME_LIMIT_SECS", "86400"),
        ]));
        assert!(matches!(huge_limit, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_catalog_defaults_without_path() {
        let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "x")])).unwrap();

        let catalog = config.load_catalog().unwrap();

        assert_eq!(catalog, BiomeCatalog::default());
    }

    #[test]
    fn test_load_catalog_reports_missing_file() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "x"),
            ("BIOME_CATALOG_PATH", "/nonexistent/wildshot/biomes.yaml"),
        ]))
        .unwrap();

        let result = config.load_catalog();

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("biome catalog")));
    }
}
