use anyhow::{Context, Result};
use cf_core::Config;
use std::path::Path;

/// Locations searched, in order, when no config path is given.
pub const DEFAULT_PATHS: &[&str] = &[
    "./cmdforge.toml",
    "~/.config/cmdforge/config.toml",
    "/etc/cmdforge/config.toml",
];

/// Load configuration from a TOML file and log any validation warnings.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;

    for warning in config.validate() {
        tracing::warn!("{}: {warning}", path.display());
    }

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("using config {}", path.display());
            return load_config(path);
        }
    }

    Ok(Config::default())
}
