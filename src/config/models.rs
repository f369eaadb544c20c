use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            security: SecurityConfig::default(),
            validator: ValidatorConfig::default(),
            admin: AdminConfig::default(),
            audit: AuditConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Application identity and locale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Fixed UTC offset for the application clock, e.g. "+03:30"
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            environment: default_environment(),
            timezone: default_timezone(),
        }
    }
}

fn default_app_name() -> String {
    "armature".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_timezone() -> String {
    "+00:00".to_string()
}

/// Security subsystem configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub hashing: HashingConfig,
    #[serde(default)]
    pub token: TokenConfig,
}

/// Hashing handler defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HashingConfig {
    #[serde(default = "default_hashing_handler")]
    pub default_handler: String,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default = "default_salt_length")]
    pub salt_length: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            default_handler: default_hashing_handler(),
            rounds: default_rounds(),
            salt_length: default_salt_length(),
        }
    }
}

fn default_hashing_handler() -> String {
    "sha512".to_string()
}

fn default_rounds() -> u32 {
    4096
}

fn default_salt_length() -> usize {
    16
}

/// Token handler defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    #[serde(default = "default_token_handler")]
    pub default_handler: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: i64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: i64,
    /// Signing key (loaded from environment, never from config files)
    #[serde(skip)]
    pub signing_key: Option<String>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            default_handler: default_token_handler(),
            access_ttl_secs: default_access_ttl_secs(),
            refresh_ttl_secs: default_refresh_ttl_secs(),
            signing_key: None,
        }
    }
}

fn default_token_handler() -> String {
    "hs256".to_string()
}

fn default_access_ttl_secs() -> i64 {
    900 // 15 minutes
}

fn default_refresh_ttl_secs() -> i64 {
    7 * 24 * 3600 // one week
}

/// Validator defaults applied when callers pass no explicit options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidatorConfig {
    /// Error (instead of reporting back) when no validator matches a field
    #[serde(default)]
    pub force: bool,
    /// Aggregate all field failures instead of failing on the first
    #[serde(default)]
    pub lazy: bool,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            force: false,
            lazy: false,
            nullable: default_nullable(),
        }
    }
}

fn default_nullable() -> bool {
    true
}

/// Admin page registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_enabled")]
    pub enabled: bool,
    #[serde(default = "default_base_route")]
    pub base_route: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: default_admin_enabled(),
            base_route: default_base_route(),
        }
    }
}

fn default_admin_enabled() -> bool {
    true
}

fn default_base_route() -> String {
    "/admin".to_string()
}

/// Audit inspection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
        }
    }
}

fn default_audit_enabled() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// tracing-subscriber filter directive, e.g. "info" or "armature=debug"
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}
