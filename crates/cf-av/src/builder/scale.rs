//! Resize the video with the `scale` filter.

use super::{validate, Request, SpecBuilder};
use crate::CommandSpec;

pub(super) fn build(req: &Request<'_>) -> cf_core::Result<CommandSpec> {
    let input = req.path("input_file")?;

    let filter = match (req.text("width")?, req.text("height")?, req.text("factor")?) {
        (Some(w), Some(h), factor) => {
            if factor.is_some() {
                tracing::debug!("scale: width/height given, ignoring factor");
            }
            let width = validate::dimension("width", w)?;
            let height = validate::dimension("height", h)?;
            if width == -1 && height == -1 {
                return Err(cf_core::Error::invalid(
                    "height",
                    "width and height cannot both be -1",
                ));
            }
            format!("scale={width}:{height}")
        }
        (_, _, Some(f)) => {
            validate::factor(f)?;
            format!("scale=iw*{f}:ih*{f}")
        }
        (None, _, None) => return Err(cf_core::Error::missing("scale", "width")),
        (_, None, None) => return Err(cf_core::Error::missing("scale", "height")),
    };
    let output = req.output(&input, None)?;

    let mut cmd = SpecBuilder::ffmpeg();
    cmd.input(&input);
    cmd.args(["-vf", filter.as_str(), "-c:a", "copy"]);
    cmd.output(output);
    Ok(cmd.finish())
}

#[cfg(test)]
mod tests {
    use crate::{build, Catalog, OperationKind, ParameterSet};

    fn scale(params: ParameterSet) -> cf_core::Result<crate::CommandSpec> {
        build(&Catalog::default(), OperationKind::Scale, &params)
    }

    fn base() -> ParameterSet {
        ParameterSet::new().with("input_file", "in.mp4")
    }

    #[test]
    fn aspect_preserving_height() {
        let spec = scale(base().with("width", "1280").with("height", "-1")).unwrap();
        let args = spec.args();
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "scale=1280:-1");
        assert_eq!(spec.output_file(), Some("in_scale.mp4"));
    }

    #[test]
    fn factor_scales_both_dimensions() {
        let spec = scale(base().with("factor", "0.5")).unwrap();
        assert!(spec.args().iter().any(|a| a == "scale=iw*0.5:ih*0.5"));
    }

    #[test]
    fn both_auto_rejected() {
        let err = scale(base().with("width", "-1").with("height", "-1")).unwrap_err();
        assert!(matches!(err, cf_core::Error::InvalidParameterValue { .. }));
    }

    #[test]
    fn non_numeric_rejected() {
        assert!(scale(base().with("width", "wide").with("height", "720")).is_err());
        assert!(scale(base().with("width", "0").with("height", "720")).is_err());
        assert!(scale(base().with("factor", "-2")).is_err());
    }
}
