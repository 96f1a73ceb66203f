//! Join inputs end to end with the concat demuxer.

use super::{normalize_path, Request, SpecBuilder};
use crate::CommandSpec;

pub(super) fn build(req: &Request<'_>) -> cf_core::Result<CommandSpec> {
    let (name, files) = ["input_files", "file_list"]
        .into_iter()
        .find_map(|key| req.params.list(key).map(|files| (key, files)))
        .ok_or_else(|| cf_core::Error::missing("concat", "input_files"))?;

    let files: Vec<String> = files.into_iter().map(normalize_path).collect();
    if files.len() < 2 {
        return Err(cf_core::Error::invalid(
            name,
            format!("concat needs at least 2 files, got {}", files.len()),
        ));
    }
    if files.iter().any(|f| f.contains(['\n', '\r'])) {
        return Err(cf_core::Error::invalid(name, "paths must not contain line breaks"));
    }

    let output = req.output(&files[0], None)?;
    if files.contains(&output) {
        return Err(cf_core::Error::invalid(
            "output_file",
            "must differ from every input file",
        ));
    }

    let mut cmd = SpecBuilder::ffmpeg();
    cmd.args(["-f", "concat", "-safe", "0"]);
    cmd.manifest_input(manifest(&files));
    cmd.args(["-c", "copy"]);
    cmd.output(output);

    Ok(cmd.finish())
}

/// One `file '<path>'` line per input; single quotes are closed, escaped
/// and reopened.
fn manifest(files: &[String]) -> String {
    files
        .iter()
        .map(|f| format!("file '{}'\n", f.replace('\'', r"'\''")))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{build, Catalog, OperationKind, ParameterSet};

    fn concat(params: ParameterSet) -> cf_core::Result<crate::CommandSpec> {
        build(&Catalog::default(), OperationKind::Concat, &params)
    }

    #[test]
    fn manifest_lists_inputs_in_order() {
        let files = vec!["c.mp4", "a.mp4", "b.mp4"];
        let spec = concat(ParameterSet::new().with("input_files", files)).unwrap();
        let manifest = spec.manifest().unwrap();
        assert_eq!(manifest.content, "file 'c.mp4'\nfile 'a.mp4'\nfile 'b.mp4'\n");
        assert_eq!(manifest.content.lines().count(), 3);
        assert_eq!(spec.output_file(), Some("c_concat.mp4"));
        assert_eq!(
            spec.args(),
            &[
                "-hide_banner", "-y", "-f", "concat", "-safe", "0", "-i", "concat_list.txt", "-c",
                "copy", "c_concat.mp4"
            ]
        );
    }

    #[test]
    fn fewer_than_two_rejected() {
        let err = concat(ParameterSet::new().with("input_files", vec!["only.mp4"])).unwrap_err();
        assert!(matches!(err, cf_core::Error::InvalidParameterValue { .. }));
        let err = concat(ParameterSet::new().with("input_files", "only.mp4")).unwrap_err();
        assert!(matches!(err, cf_core::Error::InvalidParameterValue { .. }));
    }

    #[test]
    fn missing_list_rejected() {
        let err = concat(ParameterSet::new()).unwrap_err();
        assert!(matches!(err, cf_core::Error::MissingParameter { .. }));
    }

    #[test]
    fn file_list_alias() {
        let spec = concat(ParameterSet::new().with("file_list", vec!["a.mp4", "b.mp4"])).unwrap();
        assert_eq!(spec.manifest().unwrap().content.lines().count(), 2);
    }

    #[test]
    fn quotes_escaped_in_manifest() {
        let spec =
            concat(ParameterSet::new().with("input_files", vec!["it's.mp4", "b.mp4"])).unwrap();
        assert!(spec.manifest().unwrap().content.starts_with(r"file 'it'\''s.mp4'"));
    }

    #[test]
    fn output_may_not_be_an_input() {
        let err = concat(
            ParameterSet::new()
                .with("input_files", vec!["a.mp4", "b.mp4"])
                .with("output_file", "b.mp4"),
        )
        .unwrap_err();
        assert!(matches!(err, cf_core::Error::InvalidParameterValue { .. }));
    }
}
