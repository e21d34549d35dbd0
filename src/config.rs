use std::env;
use std::path::PathBuf;

// Defaults
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DATABASE: &str = "database/profiles.json";
const DEFAULT_LOCAL_CACHE: &str = "database/local_cache.json";
const DEFAULT_USER: &str = "octocat";
const DEFAULT_STATIC_DIR: &str = "static";

/// Runtime settings of the profile web server
///
/// Every field has a built-in default that an environment variable can
/// override: `PROFILE_BIND_ADDR`, `PROFILE_DATABASE`, `PROFILE_LOCAL_CACHE`,
/// `PROFILE_USER` and `PROFILE_STATIC_DIR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub local_cache_path: PathBuf,
    /// Github id treated as the signed-in user
    pub current_github_id: String,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_path: PathBuf::from(DEFAULT_DATABASE),
            local_cache_path: PathBuf::from(DEFAULT_LOCAL_CACHE),
            current_github_id: DEFAULT_USER.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = value("PROFILE_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(path) = value("PROFILE_DATABASE") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(path) = value("PROFILE_LOCAL_CACHE") {
            config.local_cache_path = PathBuf::from(path);
        }
        if let Some(user) = value("PROFILE_USER") {
            config.current_github_id = user;
        }
        if let Some(dir) = value("PROFILE_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        config
    }
}
