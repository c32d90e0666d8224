//! Operation catalog files
//!
//! Reads a catalog in the JSON file format understood by
//! [`OperationCatalog::from_json`].

use std::path::Path;

use spapi_core::OperationCatalog;
use spapi_domain::{Result, SpApiError};
use tracing::info;

/// Read and validate a catalog file
///
/// # Errors
/// `CONFIG_ERROR` if the file cannot be read, `INVALID_CATALOG` if its
/// contents are not a valid catalog
pub fn load_catalog(path: &Path) -> Result<OperationCatalog> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        SpApiError::Config(format!("failed to read catalog file {}: {e}", path.display()))
    })?;

    let catalog = OperationCatalog::from_json(&json)?;
    info!(
        path = %path.display(),
        endpoints = catalog.list_endpoints().len(),
        "operation catalog loaded"
    );
    Ok(catalog)
}
