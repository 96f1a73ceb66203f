//! Re-encode video with x264 at a constant rate factor.

use super::{validate, Request, SpecBuilder};
use crate::operation::Catalog;
use crate::CommandSpec;

pub(super) fn build(req: &Request<'_>, catalog: &Catalog) -> cf_core::Result<CommandSpec> {
    let input = req.path("input_file")?;

    // An explicit crf wins over a named quality level.
    let quality_crf = req.text("quality")?.map(validate::quality).transpose()?;
    let crf = match (req.text("crf")?, quality_crf) {
        (Some(c), q) => {
            if q.is_some() {
                tracing::debug!("compress: explicit crf {c} overrides quality");
            }
            validate::crf(c)?
        }
        (None, Some(q)) => q,
        (None, None) => validate::crf(&catalog.default_crf().to_string())?,
    };
    let preset = validate::preset(req.text("preset")?.unwrap_or(catalog.default_preset()))?;
    let output = req.output(&input, None)?;

    let mut cmd = SpecBuilder::ffmpeg();
    cmd.input(&input);
    let crf = crf.to_string();
    cmd.args(["-c:v", "libx264", "-crf", crf.as_str(), "-preset", preset]);

    match (req.text("audio_codec")?, req.text("audio_bitrate")?) {
        (Some(codec), bitrate) => {
            validate::codec_name("audio_codec", codec)?;
            cmd.args(["-c:a", codec]);
            if let Some(b) = bitrate {
                validate::bitrate(b)?;
                cmd.args(["-b:a", b]);
            }
        }
        (None, Some(_)) => {
            return Err(cf_core::Error::invalid(
                "audio_bitrate",
                "requires audio_codec; audio is copied otherwise",
            ))
        }
        (None, None) => {
            cmd.args(["-c:a", "copy"]);
        }
    }

    cmd.output(output);
    Ok(cmd.finish())
}
