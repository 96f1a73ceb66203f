//! The fixed set of documentation pages, grouped by category.

use serde::Serialize;

/// Selector meaning "every category".
pub const ALL_CATEGORIES: &str = "all";

/// One named documentation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocSource {
    pub name: String,
    pub url: String,
}

/// A named, ordered group of pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocCategory {
    pub name: String,
    pub sources: Vec<DocSource>,
}

impl DocCategory {
    pub fn new<'a>(name: &str, sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            name: name.to_string(),
            sources: sources
                .into_iter()
                .map(|(name, url)| DocSource {
                    name: name.to_string(),
                    url: url.to_string(),
                })
                .collect(),
        }
    }

    /// Look up a page by name, ignoring case.
    pub fn source(&self, name: &str) -> cf_core::Result<&DocSource> {
        let name = name.trim();
        self.sources
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| cf_core::Error::UnknownDocumentation {
                kind: "service",
                name: format!("{}:{name}", self.name),
                available: join_names(self.sources.iter().map(|s| s.name.as_str())),
            })
    }
}

/// Every documentation category, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocCatalog {
    categories: Vec<DocCategory>,
}

impl Default for DocCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DocCatalog {
    pub fn new(categories: Vec<DocCategory>) -> Self {
        Self { categories }
    }

    /// The pages shipped with cmdforge.
    pub fn builtin() -> Self {
        Self::new(vec![
            DocCategory::new(
                "ffmpeg",
                [
                    ("main", "https://ffmpeg.org/documentation.html"),
                    ("wiki", "https://trac.ffmpeg.org/wiki"),
                    ("ffmpeg_docs", "https://ffmpeg.org/ffmpeg.html"),
                    ("ffprobe_docs", "https://ffmpeg.org/ffprobe.html"),
                    ("ffplay_docs", "https://ffmpeg.org/ffplay.html"),
                    ("filters", "https://ffmpeg.org/ffmpeg-filters.html"),
                    ("formats", "https://ffmpeg.org/ffmpeg-formats.html"),
                    ("codecs", "https://ffmpeg.org/ffmpeg-codecs.html"),
                ],
            ),
            DocCategory::new(
                "live_streaming",
                [
                    ("rtmp", "https://www.adobe.com/devnet/rtmp.html"),
                    ("hls", "https://developer.apple.com/documentation/http-live-streaming"),
                    ("dash", "https://dashif.org/docs/DASH-IF-IOP-v4.3.pdf"),
                    ("webrtc", "https://webrtc.org/getting-started/overview"),
                    ("srt", "https://www.srtalliance.org/developers/"),
                    ("mpeg_ts", "https://en.wikipedia.org/wiki/MPEG_transport_stream"),
                ],
            ),
            DocCategory::new(
                "aws",
                [
                    ("main", "https://docs.aws.amazon.com/"),
                    ("mediaconvert", "https://docs.aws.amazon.com/mediaconvert/"),
                    ("mediapackage", "https://docs.aws.amazon.com/mediapackage/"),
                    ("medialive", "https://docs.aws.amazon.com/medialive/"),
                    ("mediastore", "https://docs.aws.amazon.com/mediastore/"),
                    ("mediaconnect", "https://docs.aws.amazon.com/mediaconnect/"),
                    ("ivs", "https://docs.aws.amazon.com/ivs/"),
                    ("elemental", "https://docs.aws.amazon.com/elemental-appliances-software/"),
                    ("s3", "https://docs.aws.amazon.com/s3/"),
                    ("cloudfront", "https://docs.aws.amazon.com/cloudfront/"),
                ],
            ),
        ])
    }

    pub fn categories(&self) -> &[DocCategory] {
        &self.categories
    }

    /// Look up one category by name (case-insensitive).
    pub fn category(&self, name: &str) -> cf_core::Result<&DocCategory> {
        let wanted = name.trim().to_ascii_lowercase();
        self.categories
            .iter()
            .find(|c| c.name == wanted)
            .ok_or_else(|| cf_core::Error::UnknownDocumentation {
                kind: "category",
                name: name.to_string(),
                available: join_names(self.categories.iter().map(|c| c.name.as_str())),
            })
    }

    /// Resolve a selector to the categories it covers. `None` and
    /// [`ALL_CATEGORIES`] select everything.
    pub fn select(&self, selector: Option<&str>) -> cf_core::Result<Vec<&DocCategory>> {
        match selector.map(str::trim) {
            None => Ok(self.categories.iter().collect()),
            Some(s) if s.eq_ignore_ascii_case(ALL_CATEGORIES) => {
                Ok(self.categories.iter().collect())
            }
            Some(s) => Ok(vec![self.category(s)?]),
        }
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
