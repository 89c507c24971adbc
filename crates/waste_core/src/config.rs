//! Configuration loading from environment variables.

use crate::constants::*;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration for the paste service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_paste_size: usize,
    /// Minimum identifier size in raw bytes.
    pub id_size_min: usize,
    pub expiry_days: u64,
    /// Content bytes per day of retention lost; `0` disables the bias.
    pub expiry_size_bias: usize,
    pub expiry_interval_secs: u64,
    /// Host used in paste URLs when the request arrived on a punycode host.
    pub canonical_host: String,
    /// Referer hosts allowed to fetch raw content directly.
    pub trusted_hosts: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            port: DEFAULT_PORT,
            max_paste_size: DEFAULT_MAX_PASTE_SIZE,
            id_size_min: DEFAULT_ID_SIZE_MIN,
            expiry_days: DEFAULT_EXPIRY_DAYS,
            expiry_size_bias: DEFAULT_EXPIRY_SIZE_BIAS,
            expiry_interval_secs: DEFAULT_EXPIRY_INTERVAL_SECS,
            canonical_host: DEFAULT_CANONICAL_HOST.to_string(),
            trusted_hosts: DEFAULT_TRUSTED_HOSTS
                .iter()
                .map(|host| host.to_string())
                .collect(),
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn default_db_path() -> String {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache")
        .join("waste")
        .join("db")
        .to_string_lossy()
        .to_string()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring unparseable {}='{}'", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Split a comma separated host list, dropping blanks.
pub fn parse_host_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env::var("DB_PATH")
                .map(expand_tilde)
                .unwrap_or(defaults.db_path),
            port: env_parsed("PORT", defaults.port),
            max_paste_size: env_parsed("MAX_PASTE_SIZE", defaults.max_paste_size),
            // A zero-length id would only ever yield the empty string.
            id_size_min: env_parsed("ID_SIZE_MIN", defaults.id_size_min).max(1),
            expiry_days: env_parsed("EXPIRY_DAYS", defaults.expiry_days),
            expiry_size_bias: env_parsed("EXPIRY_SIZE_BIAS", defaults.expiry_size_bias),
            expiry_interval_secs: env_parsed("EXPIRY_INTERVAL_SECS", defaults.expiry_interval_secs)
                .max(1),
            canonical_host: env::var("CANONICAL_HOST").unwrap_or(defaults.canonical_host),
            trusted_hosts: env::var("TRUSTED_HOSTS")
                .map(|value| parse_host_list(&value))
                .unwrap_or(defaults.trusted_hosts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_env_flag, parse_host_list, Config};
    use crate::test_support::{env_lock, EnvGuard};

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
        assert_eq!(parse_env_flag("enabled"), None);
    }

    #[test]
    fn parse_host_list_trims_and_lowercases() {
        assert_eq!(
            parse_host_list(" Waste.ST , ,localhost:8666"),
            vec!["waste.st".to_string(), "localhost:8666".to_string()]
        );
        assert!(parse_host_list("").is_empty());
    }

    #[test]
    fn from_env_applies_overrides_and_falls_back_on_garbage() {
        let _lock = env_lock().lock().expect("env lock");
        let _db = EnvGuard::set("DB_PATH", "/tmp/waste-config-test");
        let _size = EnvGuard::set("MAX_PASTE_SIZE", "4096");
        let _bias = EnvGuard::set("EXPIRY_SIZE_BIAS", "0");
        let _port = EnvGuard::set("PORT", "not-a-port");
        let _id = EnvGuard::set("ID_SIZE_MIN", "0");
        let _hosts = EnvGuard::set("TRUSTED_HOSTS", "example.org");

        let config = Config::from_env();
        assert_eq!(config.db_path, "/tmp/waste-config-test");
        assert_eq!(config.max_paste_size, 4096);
        assert_eq!(config.expiry_size_bias, 0);
        assert_eq!(config.port, crate::constants::DEFAULT_PORT);
        assert_eq!(config.id_size_min, 1);
        assert_eq!(config.trusted_hosts, vec!["example.org".to_string()]);
    }

    #[test]
    fn from_env_defaults_match_constants() {
        let _lock = env_lock().lock().expect("env lock");
        let _guards = [
            EnvGuard::remove("MAX_PASTE_SIZE"),
            EnvGuard::remove("EXPIRY_DAYS"),
            EnvGuard::remove("EXPIRY_SIZE_BIAS"),
            EnvGuard::remove("ID_SIZE_MIN"),
            EnvGuard::remove("TRUSTED_HOSTS"),
        ];
        let config = Config::from_env();
        assert_eq!(config.max_paste_size, 32 * 1024 * 1024);
        assert_eq!(config.expiry_days, 256);
        assert_eq!(config.expiry_size_bias, 128 * 1024);
        assert_eq!(config.id_size_min, 3);
        assert!(config.trusted_hosts.iter().any(|host| host == "waste.st"));
    }
}
