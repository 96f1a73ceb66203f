//! Cut a section out of the input.
//!
//! `-ss` (and `-to`) go before `-i` so ffmpeg seeks in the demuxer instead
//! of decoding up to the start point. Streams are copied unless the caller
//! asks for re-encoding with `crf` or `preset`.

use super::{validate, Request, SpecBuilder};
use crate::operation::Catalog;
use crate::CommandSpec;

pub(super) fn build(req: &Request<'_>, catalog: &Catalog) -> cf_core::Result<CommandSpec> {
    let input = req.path("input_file")?;
    let start = req.require("start_time")?;
    let start_secs = validate::timestamp("start_time", start)?;
    let duration = req.text("duration")?;
    let end = req.text("end_time")?;

    let mut cmd = SpecBuilder::ffmpeg();
    cmd.args(["-ss", start]);

    match (duration, end) {
        (Some(d), end) => {
            validate::duration("duration", d)?;
            if end.is_some() {
                tracing::debug!("trim: duration given, ignoring end_time");
            }
        }
        (None, Some(e)) => {
            let end_secs = validate::timestamp("end_time", e)?;
            if end_secs <= start_secs {
                return Err(cf_core::Error::invalid(
                    "end_time",
                    format!("'{e}' must be after start_time '{start}'"),
                ));
            }
            cmd.args(["-to", e]);
        }
        (None, None) => return Err(cf_core::Error::missing("trim", "duration")),
    }

    cmd.input(&input);
    if let Some(d) = duration {
        cmd.args(["-t", d]);
    }

    if req.contains("crf") || req.contains("preset") {
        let crf = match req.text("crf")? {
            Some(c) => validate::crf(c)?,
            None => validate::crf(&catalog.default_crf().to_string())?,
        };
        let preset = validate::preset(req.text("preset")?.unwrap_or(catalog.default_preset()))?;
        let crf = crf.to_string();
        cmd.args(["-c:v", "libx264", "-crf", crf.as_str(), "-preset", preset]);
        cmd.args(["-c:a", "copy"]);
    } else {
        cmd.args(["-c", "copy"]);
    }

    cmd.output(req.output(&input, None)?);
    Ok(cmd.finish())
}
