//! The operation catalog: recognized operation kinds and their parameter
//! contracts.
//!
//! A [`Catalog`] is built once from [`cf_core::config::DefaultsConfig`] and
//! passed by reference to the builder; it never changes afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::params::ParameterSet;

/// A supported video operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Trim,
    Convert,
    Compress,
    ExtractAudio,
    Scale,
    Overlay,
    Concat,
}

impl OperationKind {
    /// Every operation, in catalog order.
    pub const ALL: [OperationKind; 7] = [
        OperationKind::Trim,
        OperationKind::Convert,
        OperationKind::Compress,
        OperationKind::ExtractAudio,
        OperationKind::Scale,
        OperationKind::Overlay,
        OperationKind::Concat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Trim => "trim",
            OperationKind::Convert => "convert",
            OperationKind::Compress => "compress",
            OperationKind::ExtractAudio => "extract_audio",
            OperationKind::Scale => "scale",
            OperationKind::Overlay => "overlay",
            OperationKind::Concat => "concat",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            OperationKind::Trim => "Cut a section out of a video without re-encoding",
            OperationKind::Convert => "Re-encode into another container format",
            OperationKind::Compress => "Re-encode video with x264 at a constant rate factor",
            OperationKind::ExtractAudio => "Drop the video stream and keep audio",
            OperationKind::Scale => "Resize the video",
            OperationKind::Overlay => "Draw one video or image on top of another",
            OperationKind::Concat => "Join several files end to end",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = cf_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        OperationKind::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| cf_core::Error::UnknownOperation(s.to_string()))
    }
}

/// How a parameter participates in an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// Must be present.
    Required,
    /// Must be present unless the named alternative is.
    RequiredUnless { alternative: &'static str },
    /// May be omitted; `default` is applied when it is.
    Optional { default: Option<String> },
}

/// One entry of an operation's parameter contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub requirement: Requirement,
    pub description: &'static str,
}

impl ParamSpec {
    fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            requirement: Requirement::Required,
            description,
        }
    }

    fn required_unless(
        name: &'static str,
        alternative: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            aliases: &[],
            requirement: Requirement::RequiredUnless { alternative },
            description,
        }
    }

    fn optional(name: &'static str, default: Option<&str>, description: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            requirement: Requirement::Optional {
                default: default.map(str::to_string),
            },
            description,
        }
    }

    fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Whether `params` supplies this parameter under its name or an alias.
    pub fn is_present(&self, params: &ParameterSet) -> bool {
        params.contains(self.name) || self.aliases.iter().any(|a| params.contains(a))
    }
}

/// The parameter contract of one operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationContract {
    pub operation: OperationKind,
    pub summary: &'static str,
    pub params: Vec<ParamSpec>,
}

impl OperationContract {
    /// Fail with [`cf_core::Error::MissingParameter`] on the first required
    /// parameter that `params` does not supply.
    pub fn check_required(&self, params: &ParameterSet) -> cf_core::Result<()> {
        for spec in &self.params {
            let missing = match &spec.requirement {
                Requirement::Required => !spec.is_present(params),
                Requirement::RequiredUnless { alternative } => {
                    !spec.is_present(params) && !params.contains(alternative)
                }
                Requirement::Optional { .. } => false,
            };
            if missing {
                return Err(cf_core::Error::missing(self.operation.as_str(), spec.name));
            }
        }
        Ok(())
    }

    /// Names (and aliases) of every parameter this operation understands.
    pub fn known_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params
            .iter()
            .flat_map(|p| std::iter::once(p.name).chain(p.aliases.iter().copied()))
    }
}

/// Valid x264 encoder presets, fastest first.
pub const PRESETS: &[&str] = &[
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

/// Named quality levels and the crf each implies.
pub const QUALITY_LEVELS: &[(&str, u32)] = &[("high", 18), ("medium", 23), ("low", 28)];

/// Immutable set of defaults applied to optional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    crf: u32,
    preset: String,
    audio_format: String,
    overlay_position: String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_config(&cf_core::config::DefaultsConfig::default())
    }
}

impl Catalog {
    pub fn from_config(defaults: &cf_core::config::DefaultsConfig) -> Self {
        Self {
            crf: defaults.crf,
            preset: defaults.preset.clone(),
            audio_format: defaults.audio_format.clone(),
            overlay_position: defaults.overlay_position.clone(),
        }
    }

    pub fn default_crf(&self) -> u32 {
        self.crf
    }

    pub fn default_preset(&self) -> &str {
        &self.preset
    }

    pub fn default_audio_format(&self) -> &str {
        &self.audio_format
    }

    pub fn default_overlay_position(&self) -> &str {
        &self.overlay_position
    }

    /// The parameter contract for `kind`.
    pub fn contract(&self, kind: OperationKind) -> OperationContract {
        let output = ParamSpec::optional(
            "output_file",
            None,
            "Output path; derived as <stem>_<operation>.<ext> when omitted",
        );
        let input = ParamSpec::required("input_file", "Source media file");
        let crf = self.crf.to_string();

        let params = match kind {
            OperationKind::Trim => vec![
                input,
                ParamSpec::required("start_time", "Seek position (seconds or [HH:]MM:SS[.fff])"),
                ParamSpec::required_unless(
                    "duration",
                    "end_time",
                    "Length of the cut in seconds or [HH:]MM:SS",
                ),
                ParamSpec::optional("end_time", None, "End position, used instead of duration"),
                ParamSpec::optional("crf", None, "Re-encode at this crf instead of stream copy"),
                ParamSpec::optional("preset", None, "Re-encode with this x264 preset"),
                output,
            ],
            OperationKind::Convert => vec![
                input,
                ParamSpec::required("output_format", "Target container, e.g. mkv or webm"),
                output,
            ],
            OperationKind::Compress => vec![
                input,
                ParamSpec::optional("crf", Some(crf.as_str()), "Constant rate factor, 0-51"),
                ParamSpec::optional("preset", Some(self.preset.as_str()), "x264 encoder preset"),
                ParamSpec::optional("quality", None, "high, medium or low; crf wins"),
                ParamSpec::optional("audio_codec", None, "Re-encode audio instead of copying"),
                ParamSpec::optional("audio_bitrate", None, "Bitrate for audio_codec, e.g. 128k"),
                output,
            ],
            OperationKind::ExtractAudio => vec![
                input,
                ParamSpec::optional(
                    "output_format",
                    Some(self.audio_format.as_str()),
                    "Audio format, e.g. mp3, aac, wav",
                ),
                output,
            ],
            OperationKind::Scale => vec![
                input,
                ParamSpec::required_unless("width", "factor", "Target width, -1 keeps aspect"),
                ParamSpec::required_unless("height", "factor", "Target height, -1 keeps aspect"),
                ParamSpec::optional("factor", None, "Scale both dimensions by this factor"),
                output,
            ],
            OperationKind::Overlay => vec![
                input,
                ParamSpec::required("overlay_file", "Video or image drawn on top"),
                ParamSpec::optional(
                    "position",
                    Some(self.overlay_position.as_str()),
                    "x:y pixel offset of the overlay",
                ),
                output,
            ],
            OperationKind::Concat => vec![
                ParamSpec::required("input_files", "Two or more files, in order")
                    .with_aliases(&["file_list"]),
                output,
            ],
        };

        OperationContract {
            operation: kind,
            summary: kind.summary(),
            params,
        }
    }

    /// Contracts for every operation, in catalog order.
    pub fn contracts(&self) -> Vec<OperationContract> {
        OperationKind::ALL
            .into_iter()
            .map(|k| self.contract(k))
            .collect()
    }
}
