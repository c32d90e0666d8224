//! Configuration loading
//!
//! Builds a [`spapi_domain::ClientConfig`] from environment variables or a
//! JSON/TOML file.

pub mod loader;

pub use loader::{
    fill_credentials_from_env, load, load_from_env, load_from_file, probe_config_paths,
    ConfigLoadError,
};
