//! Re-encode into another container, picking codecs for the target.

use super::{Request, SpecBuilder};
use crate::format::MediaFormat;
use crate::CommandSpec;

pub(super) fn build(req: &Request<'_>) -> cf_core::Result<CommandSpec> {
    let input = req.path("input_file")?;
    let format = req.format("output_format", req.require("output_format")?)?;
    req.check_output_extension(format)?;
    let output = req.output(&input, Some(format.extension()))?;

    let mut cmd = SpecBuilder::ffmpeg();
    cmd.input(&input);

    match (format.video_codec(), format.audio_codec()) {
        (None, Some(audio)) => {
            cmd.arg("-vn").args(["-c:a", audio]);
            cmd.args(format.audio_quality_args().iter().copied());
        }
        (Some(video), audio) => {
            cmd.args(["-c:v", video]);
            match audio {
                Some(a) => cmd.args(["-c:a", a]),
                None => cmd.arg("-an"),
            };
        }
        (None, None) => {
            return Err(cf_core::Error::invalid(
                "output_format",
                format!("'{format}' has no encoder"),
            ))
        }
    }

    if matches!(format, MediaFormat::Mp4 | MediaFormat::Mov | MediaFormat::M4v) {
        cmd.args(["-movflags", "+faststart"]);
    }

    cmd.output(output);
    Ok(cmd.finish())
}
