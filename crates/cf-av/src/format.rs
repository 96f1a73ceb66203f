//! Output formats and the codecs chosen for them.

use std::fmt;
use std::str::FromStr;

/// A container or audio file format the builder knows how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Mp4,
    Mov,
    M4v,
    Mkv,
    Webm,
    Avi,
    Flv,
    Ts,
    Gif,
    Mp3,
    Aac,
    M4a,
    Wav,
    Flac,
    Ogg,
    Opus,
}

const ALL: &[MediaFormat] = &[
    MediaFormat::Mp4,
    MediaFormat::Mov,
    MediaFormat::M4v,
    MediaFormat::Mkv,
    MediaFormat::Webm,
    MediaFormat::Avi,
    MediaFormat::Flv,
    MediaFormat::Ts,
    MediaFormat::Gif,
    MediaFormat::Mp3,
    MediaFormat::Aac,
    MediaFormat::M4a,
    MediaFormat::Wav,
    MediaFormat::Flac,
    MediaFormat::Ogg,
    MediaFormat::Opus,
];

impl MediaFormat {
    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Mov => "mov",
            MediaFormat::M4v => "m4v",
            MediaFormat::Mkv => "mkv",
            MediaFormat::Webm => "webm",
            MediaFormat::Avi => "avi",
            MediaFormat::Flv => "flv",
            MediaFormat::Ts => "ts",
            MediaFormat::Gif => "gif",
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Aac => "aac",
            MediaFormat::M4a => "m4a",
            MediaFormat::Wav => "wav",
            MediaFormat::Flac => "flac",
            MediaFormat::Ogg => "ogg",
            MediaFormat::Opus => "opus",
        }
    }

    /// Audio-only formats carry no video stream.
    pub fn is_audio(self) -> bool {
        matches!(
            self,
            MediaFormat::Mp3
                | MediaFormat::Aac
                | MediaFormat::M4a
                | MediaFormat::Wav
                | MediaFormat::Flac
                | MediaFormat::Ogg
                | MediaFormat::Opus
        )
    }

    /// ffmpeg video encoder for this format, `None` for audio formats.
    pub fn video_codec(self) -> Option<&'static str> {
        match self {
            MediaFormat::Mp4
            | MediaFormat::Mov
            | MediaFormat::M4v
            | MediaFormat::Mkv
            | MediaFormat::Flv
            | MediaFormat::Ts => Some("libx264"),
            MediaFormat::Webm => Some("libvpx-vp9"),
            MediaFormat::Avi => Some("mpeg4"),
            MediaFormat::Gif => Some("gif"),
            _ => None,
        }
    }

    /// ffmpeg audio encoder for this format, `None` when the format holds no
    /// audio (gif).
    pub fn audio_codec(self) -> Option<&'static str> {
        match self {
            MediaFormat::Mp4
            | MediaFormat::Mov
            | MediaFormat::M4v
            | MediaFormat::Mkv
            | MediaFormat::Flv
            | MediaFormat::Ts
            | MediaFormat::Aac
            | MediaFormat::M4a => Some("aac"),
            MediaFormat::Webm | MediaFormat::Opus => Some("libopus"),
            MediaFormat::Avi | MediaFormat::Mp3 => Some("libmp3lame"),
            MediaFormat::Wav => Some("pcm_s16le"),
            MediaFormat::Flac => Some("flac"),
            MediaFormat::Ogg => Some("libvorbis"),
            MediaFormat::Gif => None,
        }
    }

    /// Extra quality arguments for audio encoders that take them.
    pub fn audio_quality_args(self) -> &'static [&'static str] {
        match self {
            // VBR, best quality.
            MediaFormat::Mp3 => &["-q:a", "0"],
            _ => &[],
        }
    }

    /// Comma-separated extensions of every known format.
    pub fn known() -> String {
        ALL.iter().map(|f| f.extension()).collect::<Vec<_>>().join(", ")
    }

    /// Comma-separated extensions of the audio-only formats.
    pub fn known_audio() -> String {
        ALL.iter()
            .filter(|f| f.is_audio())
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MediaFormat {
    type Err = ();

    /// Case-insensitive; a leading dot is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('.').to_ascii_lowercase();
        ALL.iter()
            .copied()
            .find(|f| f.extension() == normalized)
            .ok_or(())
    }
}
