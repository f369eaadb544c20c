use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "ARMATURE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/armature.toml";
const ENV_PREFIX: &str = "ARMATURE";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;

    load_secrets(&mut config);

    Ok(config)
}

/// Load secrets from environment variables into config
/// Secrets are never stored in TOML files, only in environment
fn load_secrets(config: &mut Config) {
    if let Ok(key) = env::var("ARMATURE_TOKEN_KEY") {
        config.security.token.signing_key = Some(key);
    }

    // Alternative name used by some deployments
    if config.security.token.signing_key.is_none() {
        if let Ok(key) = env::var("TOKEN_SIGNING_KEY") {
            config.security.token.signing_key = Some(key);
        }
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    // Start with defaults (handled by struct Default implementations)
    // Add TOML file if it exists (optional)
    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // Add environment variable overrides
    // ARMATURE__APP__NAME -> app.name
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.app.name, "armature");
        assert_eq!(config.security.hashing.default_handler, "sha512");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[app]
name = "billing"
timezone = "+03:30"

[security.hashing]
default_handler = "sha256"
rounds = 2048
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.app.name, "billing");
        assert_eq!(config.app.timezone, "+03:30");
        assert_eq!(config.security.hashing.default_handler, "sha256");
        assert_eq!(config.security.hashing.rounds, 2048);
        // untouched sections keep defaults
        assert_eq!(config.security.token.default_handler, "hs256");
    }

    // Note: env-override tests are omitted here because they would need
    // unsafe env::set_var; layering is exercised via load_from_sources.

    #[test]
    fn test_signing_key_never_read_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        // signing_key is #[serde(skip)]; a file trying to set it is ignored
        let toml_content = r#"
[security.token]
default_handler = "hs256"
signing_key = "should-not-load"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert!(config.security.token.signing_key.is_none());
    }
}
