use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "twitter.toml",
    "config/twitter.toml",
    "../twitter.toml",
    "../config/twitter.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Rows per page for paginated list queries.
    #[serde(default = "DatabaseConfig::default_page_size")]
    pub page_size: u32,
}

impl DatabaseConfig {
    const fn default_page_size() -> u32 {
        10
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://twitter.db".to_string(),
            max_connections: 10,
            page_size: Self::default_page_size(),
        }
    }
}

/// Identity options: session lifetime, uniqueness rules, password policy and lockout.
///
/// ```
/// use twitter_config::IdentityConfig;
///
/// let identity = IdentityConfig::default();
/// assert_eq!(identity.password.required_length, 6);
/// assert_eq!(identity.lockout.max_failed_access_attempts, 5);
/// assert!(!identity.lockout_on_failure);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "IdentityConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default = "IdentityConfig::default_require_unique_email")]
    pub require_unique_email: bool,
    #[serde(default)]
    pub require_confirmed_email: bool,
    #[serde(default)]
    pub lockout_on_failure: bool,
    #[serde(default)]
    pub password: PasswordPolicy,
    #[serde(default)]
    pub lockout: LockoutConfig,
}

impl IdentityConfig {
    const fn default_session_ttl() -> u64 {
        86_400
    }

    const fn default_require_unique_email() -> bool {
        true
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
            require_unique_email: Self::default_require_unique_email(),
            require_confirmed_email: false,
            lockout_on_failure: false,
            password: PasswordPolicy::default(),
            lockout: LockoutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    pub max_failed_access_attempts: u32,
    pub lockout_seconds: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_access_attempts: 5,
            lockout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory that relative image paths are served from.
    pub web_root: String,
    pub avatar_dir: String,
    pub avatar_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            web_root: "wwwroot".to_string(),
            avatar_dir: "images/users".to_string(),
            avatar_size: 256,
        }
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use twitter_config::load;
///
/// std::env::remove_var("TWITTER_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.database.url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();
    let password = &defaults.identity.password;
    let lockout = &defaults.identity.lockout;

    let mut builder = config::Config::builder()
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("database.page_size", i64::from(defaults.database.page_size))?
        .set_default(
            "identity.session_ttl_seconds",
            clamp_to_i64(defaults.identity.session_ttl_seconds),
        )?
        .set_default(
            "identity.require_unique_email",
            defaults.identity.require_unique_email,
        )?
        .set_default(
            "identity.require_confirmed_email",
            defaults.identity.require_confirmed_email,
        )?
        .set_default(
            "identity.lockout_on_failure",
            defaults.identity.lockout_on_failure,
        )?
        .set_default(
            "identity.password.required_length",
            clamp_to_i64(password.required_length as u64),
        )?
        .set_default("identity.password.require_digit", password.require_digit)?
        .set_default(
            "identity.password.require_lowercase",
            password.require_lowercase,
        )?
        .set_default(
            "identity.password.require_uppercase",
            password.require_uppercase,
        )?
        .set_default(
            "identity.password.require_non_alphanumeric",
            password.require_non_alphanumeric,
        )?
        .set_default(
            "identity.lockout.max_failed_access_attempts",
            i64::from(lockout.max_failed_access_attempts),
        )?
        .set_default(
            "identity.lockout.lockout_seconds",
            clamp_to_i64(lockout.lockout_seconds),
        )?
        .set_default("storage.web_root", defaults.storage.web_root.clone())?
        .set_default("storage.avatar_dir", defaults.storage.avatar_dir.clone())?
        .set_default(
            "storage.avatar_size",
            i64::from(defaults.storage.avatar_size),
        )?;

    let environment_overrides = config::Environment::with_prefix("TWITTER").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("TWITTER_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via TWITTER_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.identity.session_ttl_seconds > i64::MAX as u64 {
        config.identity.session_ttl_seconds = i64::MAX as u64;
    }

    if config.database.page_size == 0 {
        anyhow::bail!("invalid configuration: database.page_size must be at least 1");
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
