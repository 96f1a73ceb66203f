//! Drop the video stream and keep the audio.

use super::{Request, SpecBuilder};
use crate::format::MediaFormat;
use crate::operation::Catalog;
use crate::CommandSpec;

pub(super) fn build(req: &Request<'_>, catalog: &Catalog) -> cf_core::Result<CommandSpec> {
    let input = req.path("input_file")?;
    let requested = req
        .text("output_format")?
        .unwrap_or(catalog.default_audio_format());
    let format = req.format("output_format", requested)?;

    let codec = match format.audio_codec() {
        Some(codec) if format.is_audio() => codec,
        _ => {
            return Err(cf_core::Error::invalid(
                "output_format",
                format!(
                    "'{format}' is not an audio format (expected one of {})",
                    MediaFormat::known_audio()
                ),
            ))
        }
    };
    req.check_output_extension(format)?;
    let output = req.output(&input, Some(format.extension()))?;

    let mut cmd = SpecBuilder::ffmpeg();
    cmd.input(&input);
    cmd.args(["-vn", "-map", "0:a", "-c:a", codec]);
    cmd.args(format.audio_quality_args().iter().copied());
    cmd.output(output);
    Ok(cmd.finish())
}
