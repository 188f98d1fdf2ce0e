//! TOML configuration file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::BootstrapError;

/// Load and deserialize a TOML file.
///
/// A missing file deserializes from empty TOML, so every field of `T` must
/// be optional or defaulted.
///
/// # Errors
///
/// Returns [`BootstrapError::InvalidConfig`] if the file exists but cannot be
/// read or parsed.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, BootstrapError> {
    let invalid = |message: String| BootstrapError::InvalidConfig {
        path: path.to_path_buf(),
        message,
    };

    if !path.exists() {
        return toml::from_str("").map_err(|e| invalid(e.to_string()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    toml::from_str(&content).map_err(|e| invalid(e.message().to_string()))
}
