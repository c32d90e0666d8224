//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `SELLING_PARTNER_REGION` is not set, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. App credentials missing from the file are taken from the environment
//!
//! ## Environment Variables
//! - `SELLING_PARTNER_REGION`: `na`, `eu` or `fe` (required)
//! - `SELLING_PARTNER_REFRESH_TOKEN`: seller refresh token
//! - `SELLING_PARTNER_APP_CLIENT_ID`: LWA client id
//! - `SELLING_PARTNER_APP_CLIENT_SECRET`: LWA client secret
//! - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`: IAM user keys
//! - `AWS_SELLING_PARTNER_ROLE`: IAM role ARN to assume
//! - `SELLING_PARTNER_ONLY_GRANTLESS`: only grantless operations (true/false)
//! - `SELLING_PARTNER_USE_SANDBOX`: call the sandbox hosts (true/false)
//! - `SELLING_PARTNER_SIGN_REQUESTS`: sign calls with role credentials
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./spapi.json` or `./spapi.toml`
//! 2. `./config.json` or `./config.toml`
//! 3. the same names in the parent and grandparent directories
//! 4. the same names next to the executable

use std::path::{Path, PathBuf};

use spapi_domain::{ClientConfig, Result, SpApiError};
use thiserror::Error;

pub const ENV_REGION: &str = "SELLING_PARTNER_REGION";
pub const ENV_REFRESH_TOKEN: &str = "SELLING_PARTNER_REFRESH_TOKEN";
pub const ENV_CLIENT_ID: &str = "SELLING_PARTNER_APP_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SELLING_PARTNER_APP_CLIENT_SECRET";
pub const ENV_AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_ROLE_ARN: &str = "AWS_SELLING_PARTNER_ROLE";
pub const ENV_ONLY_GRANTLESS: &str = "SELLING_PARTNER_ONLY_GRANTLESS";
pub const ENV_USE_SANDBOX: &str = "SELLING_PARTNER_USE_SANDBOX";
pub const ENV_SIGN_REQUESTS: &str = "SELLING_PARTNER_SIGN_REQUESTS";

const FILE_NAMES: [&str; 4] = ["spapi.json", "spapi.toml", "config.json", "config.toml"];

/// Why a configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No config file found in any of the standard locations")]
    NoConfigFile,

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML format: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigLoadError> for SpApiError {
    fn from(err: ConfigLoadError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `SpApiError::Config` if neither the environment nor any file
/// yields a configuration, or the file cannot be parsed
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "environment incomplete, trying config file");
            let mut config = load_from_file(None)?;
            fill_credentials_from_env(&mut config);
            Ok(config)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `SpApiError::Config` if `SELLING_PARTNER_REGION` is not set
pub fn load_from_env() -> Result<ClientConfig> {
    let region = env_var(ENV_REGION)?;

    let mut config = ClientConfig {
        region: Some(region),
        refresh_token: std::env::var(ENV_REFRESH_TOKEN).ok(),
        ..ClientConfig::default()
    };
    config.options.only_grantless_operations = env_bool(ENV_ONLY_GRANTLESS, false);
    config.options.use_sandbox = env_bool(ENV_USE_SANDBOX, false);
    config.options.sign_requests = env_bool(ENV_SIGN_REQUESTS, false);
    fill_credentials_from_env(&mut config);

    Ok(config)
}

/// Fill app credentials missing from `config` with environment values
pub fn fill_credentials_from_env(config: &mut ClientConfig) {
    let credentials = &mut config.credentials;
    for (slot, key) in [
        (&mut credentials.client_id, ENV_CLIENT_ID),
        (&mut credentials.client_secret, ENV_CLIENT_SECRET),
        (&mut credentials.aws_access_key_id, ENV_AWS_ACCESS_KEY_ID),
        (&mut credentials.aws_secret_access_key, ENV_AWS_SECRET_ACCESS_KEY),
        (&mut credentials.role_arn, ENV_ROLE_ARN),
    ] {
        if slot.is_none() {
            *slot = std::env::var(key).ok().filter(|v| !v.is_empty());
        }
    }
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `SpApiError::Config` if the file is missing or invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) if !p.exists() => return Err(ConfigLoadError::NotFound(p).into()),
        Some(p) => p,
        None => probe_config_paths().ok_or(ConfigLoadError::NoConfigFile)?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|source| ConfigLoadError::Read { path: config_path.clone(), source })?;

    Ok(parse_config(&contents, &config_path)?)
}

fn parse_config(contents: &str, path: &Path) -> std::result::Result<ClientConfig, ConfigLoadError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => Ok(toml::from_str(contents)?),
        "json" => Ok(serde_json::from_str(contents)?),
        other => Err(ConfigLoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Probe the standard locations for a configuration file
///
/// Returns the first file that exists.
#[must_use]
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &'static str) -> std::result::Result<String, ConfigLoadError> {
    std::env::var(key).ok().filter(|v| !v.is_empty()).ok_or(ConfigLoadError::MissingVar(key))
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 10] = [
        ENV_REGION,
        ENV_REFRESH_TOKEN,
        ENV_CLIENT_ID,
        ENV_CLIENT_SECRET,
        ENV_AWS_ACCESS_KEY_ID,
        ENV_AWS_SECRET_ACCESS_KEY,
        ENV_ROLE_ARN,
        ENV_ONLY_GRANTLESS,
        ENV_USE_SANDBOX,
        ENV_SIGN_REQUESTS,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let path = file.path().with_extension(extension);
        std::fs::copy(file.path(), &path).unwrap();
        (file, path)
    }

    #[test]
    fn env_bool_parsing() {
        let _guard = ENV_LOCK.lock().unwrap();

        for (value, expected) in [
            ("1", true),
            ("TRUE", true),
            ("yes", true),
            ("on", true),
            ("0", false),
            ("off", false),
        ] {
            std::env::set_var("SPAPI_TEST_BOOL", value);
            assert_eq!(env_bool("SPAPI_TEST_BOOL", !expected), expected, "{value}");
        }

        std::env::remove_var("SPAPI_TEST_BOOL");
        assert!(env_bool("SPAPI_TEST_BOOL", true));
        assert!(!env_bool("SPAPI_TEST_BOOL", false));
    }

    #[test]
    fn load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_REGION, "eu");
        std::env::set_var(ENV_REFRESH_TOKEN, "Atzr|env");
        std::env::set_var(ENV_CLIENT_ID, "amzn1.application-oa2-client.env");
        std::env::set_var(ENV_CLIENT_SECRET, "env-secret");
        std::env::set_var(ENV_ROLE_ARN, "arn:aws:iam::1:role/sp");
        std::env::set_var(ENV_USE_SANDBOX, "true");

        let config = load_from_env().unwrap();
        assert_eq!(config.region.as_deref(), Some("eu"));
        assert_eq!(config.refresh_token.as_deref(), Some("Atzr|env"));
        assert!(config.credentials.has_lwa());
        assert_eq!(config.credentials.role_arn.as_deref(), Some("arn:aws:iam::1:role/sp"));
        assert!(config.options.use_sandbox);
        assert!(!config.options.only_grantless_operations);
        assert!(config.options.auto_request_tokens);

        clear_env();
    }

    #[test]
    fn load_from_env_requires_region() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_REFRESH_TOKEN, "Atzr|env");

        let err = load_from_env().unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.message().contains(ENV_REGION));

        clear_env();
    }

    #[test]
    fn load_from_json_file() {
        let (_file, path) = temp_config(
            r#"{
                "region": "fe",
                "refresh_token": "Atzr|file",
                "credentials": {"client_id": "id", "client_secret": "secret"},
                "endpoints_versions": {"catalogItems": "v0"},
                "options": {"version_fallback": false}
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.region.as_deref(), Some("fe"));
        assert_eq!(config.endpoints_versions.get("catalogItems").map(String::as_str), Some("v0"));
        assert!(!config.options.version_fallback);
        assert!(config.options.auto_request_tokens);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_from_toml_file() {
        let (_file, path) = temp_config(
            r#"
region = "na"
refresh_token = "Atzr|toml"

[credentials]
client_id = "id"
client_secret = "secret"

[options]
use_sandbox = true
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.refresh_token.as_deref(), Some("Atzr|toml"));
        assert!(config.options.use_sandbox);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn file_credentials_win_over_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_CLIENT_ID, "from-env");
        std::env::set_var(ENV_CLIENT_SECRET, "secret-from-env");

        let mut config = ClientConfig::new("na", "Atzr|x");
        config.credentials.client_id = Some("from-file".into());
        fill_credentials_from_env(&mut config);

        assert_eq!(config.credentials.client_id.as_deref(), Some("from-file"));
        assert_eq!(config.credentials.client_secret.as_deref(), Some("secret-from-env"));

        clear_env();
    }

    #[test]
    fn load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/spapi.json"))).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.message().contains("not found"));
    }

    #[test]
    fn load_from_file_invalid_json() {
        let (_file, path) = temp_config(r#"{ "region": "na" "#, "json");

        let err = load_from_file(Some(path.clone())).unwrap_err();
        assert!(err.message().contains("Invalid JSON"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unsupported_format() {
        let err = parse_config("region: na", Path::new("spapi.yaml")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedFormat(ext) if ext == "yaml"));
    }
}
