// SPDX-License-Identifier: GPL-3.0-only
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Unknown log format: {} (expected pretty or json)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database path for the spot store
    pub database_path: PathBuf,

    /// Maximum number of pooled database connections
    pub max_connections: u32,

    /// HTTP API bind address (e.g., "127.0.0.1:8080")
    pub api_bind: SocketAddr,

    /// Page size used when a listing request does not give one
    pub default_page_size: u32,

    /// Larger requested page sizes are clamped to this
    pub max_page_size: u32,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("PARKING_CONFIG")
            .unwrap_or_else(|_| "config.toml".to_string());

        let mut config: Config = if std::path::Path::new(&config_path).exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config file {}", config_path))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file {}", config_path))?
        } else {
            Config::default()
        };

        if let Ok(val) = std::env::var("PARKING_DATABASE_PATH") {
            config.database_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("PARKING_MAX_CONNECTIONS") {
            config.max_connections = val
                .parse::<u32>()
                .with_context(|| format!("invalid PARKING_MAX_CONNECTIONS: {}", val))?;
        }
        if let Ok(val) = std::env::var("PARKING_API_BIND") {
            config.api_bind = SocketAddr::from_str(&val)
                .with_context(|| format!("invalid PARKING_API_BIND: {}", val))?;
        }
        if let Ok(val) = std::env::var("PARKING_DEFAULT_PAGE_SIZE") {
            config.default_page_size = val
                .parse::<u32>()
                .with_context(|| format!("invalid PARKING_DEFAULT_PAGE_SIZE: {}", val))?;
        }
        if let Ok(val) = std::env::var("PARKING_MAX_PAGE_SIZE") {
            config.max_page_size = val
                .parse::<u32>()
                .with_context(|| format!("invalid PARKING_MAX_PAGE_SIZE: {}", val))?;
        }
        if let Ok(val) = std::env::var("PARKING_LOG_LEVEL") {
            config.log_level = val;
        }
        if let Ok(val) = std::env::var("PARKING_LOG_FORMAT") {
            config.log_format = val
                .parse::<LogFormat>()
                .with_context(|| format!("invalid PARKING_LOG_FORMAT: {}", val))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_connections == 0 {
            anyhow::bail!("max_connections must be at least 1");
        }
        if self.default_page_size == 0 || self.max_page_size == 0 {
            anyhow::bail!("page sizes must be at least 1");
        }
        if self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size,
                self.max_page_size
            );
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("parking.db"),
            max_connections: 5,
            api_bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            default_page_size: 10,
            max_page_size: 100,
            log_level: String::from("info"),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    const ENV_VARS: [&str; 8] = [
        "PARKING_CONFIG",
        "PARKING_DATABASE_PATH",
        "PARKING_MAX_CONNECTIONS",
        "PARKING_API_BIND",
        "PARKING_DEFAULT_PAGE_SIZE",
        "PARKING_MAX_PAGE_SIZE",
        "PARKING_LOG_LEVEL",
        "PARKING_LOG_FORMAT",
    ];

    // Tests touching the process environment must not interleave
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // Helper functions to safely modify environment variables in tests
    fn set_env_var(key: &str, value: &str) {
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn remove_env_var(key: &str) {
        unsafe {
            std::env::remove_var(key);
        }
    }

    fn clear_env() {
        for key in ENV_VARS {
            remove_env_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database_path, PathBuf::from("parking.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.api_bind, SocketAddr::from_str("127.0.0.1:8080").unwrap());
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_page_sizes() {
        let config = Config { default_page_size: 0, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { default_page_size: 50, max_page_size: 20, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { max_connections: 0, ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_load_missing_config_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set_env_var("PARKING_CONFIG", "/nonexistent/parking-config.toml");

        let config = Config::load().unwrap();
        assert_eq!(config.database_path, PathBuf::from("parking.db"));
        assert_eq!(config.default_page_size, 10);

        clear_env();
    }

    #[test]
    fn test_load_from_toml() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
database_path = "/custom/parking.db"
max_connections = 8
api_bind = "0.0.0.0:9000"
default_page_size = 20
max_page_size = 50
log_level = "debug"
log_format = "json"
"#;
        fs::write(temp_file.path(), config_content).unwrap();
        set_env_var("PARKING_CONFIG", temp_file.path().to_str().unwrap());

        let config = Config::load().unwrap();
        assert_eq!(config.database_path, PathBuf::from("/custom/parking.db"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.api_bind, SocketAddr::from_str("0.0.0.0:9000").unwrap());
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);

        clear_env();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "log_level = \"warn\"\n").unwrap();
        set_env_var("PARKING_CONFIG", temp_file.path().to_str().unwrap());

        let config = Config::load().unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.database_path, PathBuf::from("parking.db"));
        assert_eq!(config.max_page_size, 100);

        clear_env();
    }

    #[test]
    fn test_env_var_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set_env_var("PARKING_CONFIG", "/nonexistent/parking-config.toml");
        set_env_var("PARKING_DATABASE_PATH", "/env/parking.db");
        set_env_var("PARKING_MAX_CONNECTIONS", "3");
        set_env_var("PARKING_API_BIND", "192.168.1.1:9090");
        set_env_var("PARKING_DEFAULT_PAGE_SIZE", "25");
        set_env_var("PARKING_MAX_PAGE_SIZE", "200");
        set_env_var("PARKING_LOG_LEVEL", "trace");
        set_env_var("PARKING_LOG_FORMAT", "json");

        let config = Config::load().unwrap();
        assert_eq!(config.database_path, PathBuf::from("/env/parking.db"));
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.api_bind, SocketAddr::from_str("192.168.1.1:9090").unwrap());
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.max_page_size, 200);
        assert_eq!(config.log_level, "trace");
        assert_eq!(config.log_format, LogFormat::Json);

        clear_env();
    }

    #[test]
    fn test_env_var_invalid_bind_address() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set_env_var("PARKING_CONFIG", "/nonexistent/parking-config.toml");
        set_env_var("PARKING_API_BIND", "not-an-address");

        assert!(Config::load().is_err());

        clear_env();
    }

    #[test]
    fn test_env_var_parse_error_names_variable() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set_env_var("PARKING_CONFIG", "/nonexistent/parking-config.toml");
        set_env_var("PARKING_MAX_CONNECTIONS", "abc");

        let err = Config::load().unwrap_err();
        assert_eq!(err.to_string(), "invalid PARKING_MAX_CONNECTIONS: abc");

        clear_env();
    }

    #[test]
    fn test_malformed_toml_names_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "max_connections = \"many\"\n").unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();
        set_env_var("PARKING_CONFIG", &path);

        let err = Config::load().unwrap_err();
        assert_eq!(err.to_string(), format!("failed to parse config file {}", path));

        clear_env();
    }

    #[test]
    fn test_env_var_page_sizes_validated() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set_env_var("PARKING_CONFIG", "/nonexistent/parking-config.toml");
        set_env_var("PARKING_DEFAULT_PAGE_SIZE", "500");

        assert!(Config::load().is_err());

        clear_env();
    }
}
