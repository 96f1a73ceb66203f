//! External tool detection.
//!
//! The [`ToolRegistry`] discovers and caches the locations of ffmpeg and
//! ffprobe and resolves program names for the executor.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::ToolCommand;

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &["ffmpeg", "ffprobe"];

/// Upper bound for a `-version` call.
const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

/// A located external tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Human-readable tool name (e.g. "ffmpeg").
    pub name: String,
    /// Resolved path to the executable.
    pub path: PathBuf,
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of `-version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool configurations.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Discover tools by searching `PATH` (or using overrides from config).
    ///
    /// For each known tool, if the [`cf_core::config::ToolsConfig`] supplies a
    /// custom path **and** that path exists, it is used directly.  Otherwise
    /// [`which::which`] is used to locate the tool in `PATH`.  Tools that are
    /// not found are silently omitted from the registry.
    pub fn discover(tools_config: &cf_core::config::ToolsConfig) -> Self {
        let mut tools = HashMap::new();

        for &name in KNOWN_TOOLS {
            let custom_path = match name {
                "ffmpeg" => tools_config.ffmpeg_path.as_deref(),
                "ffprobe" => tools_config.ffprobe_path.as_deref(),
                _ => None,
            };

            let resolved = match custom_path {
                Some(p) if p.exists() => Some(p.to_path_buf()),
                Some(p) => {
                    tracing::warn!(
                        "configured {name} path {} does not exist; searching PATH",
                        p.display()
                    );
                    which::which(name).ok()
                }
                None => which::which(name).ok(),
            };

            if let Some(path) = resolved {
                tracing::debug!("found {name} at {}", path.display());
                tools.insert(
                    name.to_string(),
                    ToolConfig {
                        name: name.to_string(),
                        path,
                    },
                );
            }
        }

        Self { tools }
    }

    /// Register (or replace) a tool at an explicit path.
    pub fn with_tool(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        self.tools.insert(
            name.clone(),
            ToolConfig {
                name,
                path: path.into(),
            },
        );
        self
    }

    /// Return the [`ToolConfig`] for the given tool, or
    /// [`cf_core::Error::ToolNotFound`] if it was not found during discovery.
    pub fn require(&self, name: &str) -> cf_core::Result<&ToolConfig> {
        self.tools
            .get(name)
            .ok_or_else(|| cf_core::Error::ToolNotFound(name.to_string()))
    }

    /// Check all known tools and return availability information.
    pub async fn check_all(&self) -> Vec<ToolInfo> {
        let mut infos = Vec::with_capacity(KNOWN_TOOLS.len());
        for &name in KNOWN_TOOLS {
            let info = match self.tools.get(name) {
                Some(cfg) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(&cfg.path).await,
                    path: Some(cfg.path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            };
            infos.push(info);
        }
        infos
    }
}

/// Run `<tool> -version` and return the first line of stdout.
async fn detect_version(path: &Path) -> Option<String> {
    let output = ToolCommand::new(path.to_path_buf())
        .arg("-version")
        .timeout(VERSION_TIMEOUT)
        .execute()
        .await;

    match output {
        Ok(out) => out.stdout.lines().next().map(str::to_string),
        Err(e) => {
            tracing::warn!("could not read {} version: {e}", path.display());
            None
        }
    }
}
