//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries the
//! tool, execution, default-parameter and documentation sections. Every
//! section defaults sensibly so a completely empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub execution: ExecutionConfig,
    pub defaults: DefaultsConfig,
    pub docs: DocsConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path. A missing or malformed file is
    /// an error.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.execution.timeout_secs == 0 {
            warnings.push("execution.timeout_secs is 0; every run will time out".into());
        }

        if self.defaults.crf > 51 {
            warnings.push(format!(
                "defaults.crf {} is outside 0-51; compress requests without crf will fail",
                self.defaults.crf
            ));
        }

        let presets = [
            "ultrafast",
            "superfast",
            "veryfast",
            "faster",
            "fast",
            "medium",
            "slow",
            "slower",
            "veryslow",
        ];
        if !presets.contains(&self.defaults.preset.as_str()) {
            warnings.push(format!(
                "defaults.preset '{}' is not a recognized preset (valid: {})",
                self.defaults.preset,
                presets.join(", ")
            ));
        }

        if !self.defaults.overlay_position.contains(':') {
            warnings.push(format!(
                "defaults.overlay_position '{}' is not in x:y form",
                self.defaults.overlay_position
            ));
        }

        for (name, path) in [
            ("ffmpeg_path", &self.tools.ffmpeg_path),
            ("ffprobe_path", &self.tools.ffprobe_path),
        ] {
            if let Some(p) = path {
                if !p.exists() {
                    warnings.push(format!(
                        "tools.{name} {} does not exist; falling back to PATH",
                        p.display()
                    ));
                }
            }
        }

        if self.docs.request_timeout_secs == 0 {
            warnings.push("docs.request_timeout_secs is 0; fetches will fail".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// External tool path overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
}

/// Subprocess execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Seconds before a running tool is killed.
    pub timeout_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Defaults for optional operation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub crf: u32,
    pub preset: String,
    pub audio_format: String,
    pub overlay_position: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            crf: 23,
            preset: "medium".into(),
            audio_format: "mp3".into(),
            overlay_position: "0:0".into(),
        }
    }
}

/// Documentation fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Characters of context kept on each side of a search hit.
    pub snippet_radius: usize,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            user_agent: concat!("cmdforge/", env!("CARGO_PKG_VERSION")).into(),
            snippet_radius: 100,
        }
    }
}

impl DocsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.execution.timeout_secs, 300);
        assert_eq!(cfg.defaults.crf, 23);
        assert_eq!(cfg.defaults.preset, "medium");
        assert_eq!(cfg.defaults.audio_format, "mp3");
        assert_eq!(cfg.defaults.overlay_position, "0:0");
        assert_eq!(cfg.docs.snippet_radius, 100);
        assert!(cfg.tools.ffmpeg_path.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            [defaults]
            crf = 28

            [execution]
            timeout_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(cfg.defaults.crf, 28);
        assert_eq!(cfg.defaults.preset, "medium");
        assert_eq!(cfg.execution.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = Config::from_toml("[defaults\ncrf = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn default_config_has_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_defaults() {
        let mut cfg = Config::default();
        cfg.defaults.crf = 60;
        cfg.defaults.preset = "warp".into();
        cfg.execution.timeout_secs = 0;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("defaults.crf")));
        assert!(warnings.iter().any(|w| w.contains("warp")));
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("absent.toml")));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdforge.toml");
        std::fs::write(&path, "[defaults]\npreset = \"slow\"\n").unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.defaults.preset, "slow");
    }
}
