//! Draw a second input on top of the first.

use super::{validate, Request, SpecBuilder};
use crate::operation::Catalog;
use crate::CommandSpec;

pub(super) fn build(req: &Request<'_>, catalog: &Catalog) -> cf_core::Result<CommandSpec> {
    let input = req.path("input_file")?;
    let overlay = req.path("overlay_file")?;
    let position = req
        .text("position")?
        .unwrap_or(catalog.default_overlay_position());
    let (x, y) = validate::position(position)?;
    let output = req.output(&input, None)?;

    let filter = format!("[0:v][1:v]overlay={x}:{y}");
    let mut cmd = SpecBuilder::ffmpeg();
    cmd.input(&input).input(&overlay);
    cmd.args(["-filter_complex", filter.as_str(), "-c:a", "copy"]);
    cmd.output(output);
    Ok(cmd.finish())
}
