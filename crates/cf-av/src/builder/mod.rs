//! Pure translation of an operation request into an ffmpeg argument vector.
//!
//! [`build`] never touches the filesystem or the process table. The one
//! operation that needs an auxiliary file (concat) gets its manifest
//! returned as content inside the [`CommandSpec`]; the executor decides
//! where to write it.

mod compress;
mod concat;
mod convert;
mod extract_audio;
mod overlay;
mod scale;
mod trim;
pub(crate) mod validate;

use std::fmt;

use serde::Serialize;

use crate::argv;
use crate::format::MediaFormat;
use crate::operation::{Catalog, OperationKind};
use crate::params::ParameterSet;

/// Program every built command invokes.
pub const FFMPEG: &str = "ffmpeg";

/// Token standing in for the concat manifest path until it is written.
pub const MANIFEST_PLACEHOLDER: &str = "concat_list.txt";

/// Content of a concat-demuxer manifest and where its path belongs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConcatManifest {
    /// Manifest text, one `file '<path>'` line per input.
    pub content: String,
    /// Index in [`CommandSpec::args`] of the placeholder to replace with the
    /// written manifest's path.
    pub arg_index: usize,
}

/// A fully-formed external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<ConcatManifest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
}

impl CommandSpec {
    /// A spec for an arbitrary pre-split argument vector.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            manifest: None,
            output_file: None,
        }
    }

    /// Attach a manifest to be written at run time.
    pub fn with_manifest(mut self, manifest: ConcatManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn manifest(&self) -> Option<&ConcatManifest> {
        self.manifest.as_ref()
    }

    /// The output path the command writes, when built by [`build`].
    pub fn output_file(&self) -> Option<&str> {
        self.output_file.as_deref()
    }

    /// The arguments with the manifest placeholder replaced by `path`.
    pub fn args_with_manifest(&self, path: &str) -> Vec<String> {
        let mut args = self.args.clone();
        if let Some(m) = &self.manifest {
            if let Some(slot) = args.get_mut(m.arg_index) {
                *slot = path.to_string();
            }
        }
        args
    }

    /// Display form: program and arguments, quoted where needed.
    pub fn command_string(&self) -> String {
        argv::join(&self.program, self.args.iter().map(String::as_str))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_string())
    }
}

/// Build the command for `kind` from `params`.
///
/// # Errors
///
/// - [`cf_core::Error::MissingParameter`] when a required key is absent.
/// - [`cf_core::Error::InvalidParameterValue`] when a value fails its syntax
///   or range check.
///
/// # Example
///
/// ```
/// use cf_av::{build, Catalog, OperationKind, ParameterSet};
///
/// let params = ParameterSet::new()
///     .with("input_file", "in.mp4")
///     .with("start_time", "00:01:00")
///     .with("duration", "30");
/// let spec = build(&Catalog::default(), OperationKind::Trim, &params)?;
/// assert_eq!(spec.output_file(), Some("in_trim.mp4"));
/// # Ok::<(), cf_core::Error>(())
/// ```
pub fn build(
    catalog: &Catalog,
    kind: OperationKind,
    params: &ParameterSet,
) -> cf_core::Result<CommandSpec> {
    let contract = catalog.contract(kind);
    contract.check_required(params)?;

    for key in params.keys() {
        if !contract.known_names().any(|n| n == key) {
            tracing::debug!("{kind}: ignoring unrecognized parameter '{key}'");
        }
    }

    let req = Request { kind, params };
    let spec = match kind {
        OperationKind::Trim => trim::build(&req, catalog)?,
        OperationKind::Convert => convert::build(&req)?,
        OperationKind::Compress => compress::build(&req, catalog)?,
        OperationKind::ExtractAudio => extract_audio::build(&req, catalog)?,
        OperationKind::Scale => scale::build(&req)?,
        OperationKind::Overlay => overlay::build(&req, catalog)?,
        OperationKind::Concat => concat::build(&req)?,
    };

    tracing::debug!("built {kind}: {spec}");
    Ok(spec)
}

/// Derive `<dir>/<stem>_<operation>.<ext>` from an input path.
///
/// `ext` overrides the input's extension; an input without one gets `mp4`.
pub fn derive_output(input: &str, kind: OperationKind, ext: Option<&str>) -> String {
    let (dir, file) = match input.rfind('/') {
        Some(i) => (&input[..=i], &input[i + 1..]),
        None => ("", input),
    };
    let (stem, source_ext) = match file.rfind('.') {
        Some(i) if i > 0 => (&file[..i], Some(&file[i + 1..])),
        _ => (file, None),
    };
    let ext = ext
        .or(source_ext.filter(|e| !e.is_empty()))
        .unwrap_or("mp4");
    format!("{dir}{stem}_{}.{ext}", kind.as_str())
}

/// Agents often pass Windows-style separators; ffmpeg accepts `/` everywhere.
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Extension of a path's final component, if any.
fn extension_of(path: &str) -> Option<&str> {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(i) if i > 0 && i + 1 < file.len() => Some(&file[i + 1..]),
        _ => None,
    }
}

/// Typed access to one request's parameters.
pub(crate) struct Request<'a> {
    kind: OperationKind,
    params: &'a ParameterSet,
}

impl<'a> Request<'a> {
    /// A single optional value exactly as given; a list where one value is
    /// expected is an error.
    fn raw(&self, name: &str) -> cf_core::Result<Option<&'a str>> {
        if self.params.is_list(name) {
            return Err(cf_core::Error::invalid(name, "expected a single value, got a list"));
        }
        Ok(self.params.text(name))
    }

    /// A single optional value with surrounding whitespace removed.
    fn text(&self, name: &str) -> cf_core::Result<Option<&'a str>> {
        Ok(self.raw(name)?.map(str::trim))
    }

    fn require(&self, name: &str) -> cf_core::Result<&'a str> {
        self.text(name)?
            .ok_or_else(|| cf_core::Error::missing(self.kind.as_str(), name))
    }

    fn contains(&self, name: &str) -> bool {
        self.params.contains(name)
    }

    /// A required path, with separators normalized. Whitespace is kept.
    fn path(&self, name: &str) -> cf_core::Result<String> {
        let raw = self
            .raw(name)?
            .ok_or_else(|| cf_core::Error::missing(self.kind.as_str(), name))?;
        let path = normalize_path(raw);
        if path.contains(['\n', '\r']) {
            return Err(cf_core::Error::invalid(name, "path must not contain line breaks"));
        }
        Ok(path)
    }

    /// The explicit `output_file`, or one derived from `input`.
    fn output(&self, input: &str, ext: Option<&str>) -> cf_core::Result<String> {
        let output = match self.raw("output_file")? {
            Some(o) => normalize_path(o),
            None => derive_output(input, self.kind, ext),
        };
        // A leading dash would be read by ffmpeg as an option.
        if output.starts_with('-') {
            return Err(cf_core::Error::invalid(
                "output_file",
                format!("must not start with '-', got '{output}'"),
            ));
        }
        if output == input {
            return Err(cf_core::Error::invalid(
                "output_file",
                "must differ from the input file",
            ));
        }
        Ok(output)
    }

    /// Resolve a format name, failing on anything unknown.
    fn format(&self, name: &str, value: &str) -> cf_core::Result<MediaFormat> {
        value.parse().map_err(|_| {
            cf_core::Error::invalid(
                name,
                format!("unknown format '{value}' (known: {})", MediaFormat::known()),
            )
        })
    }

    /// An explicit `output_file` must carry the extension of `format`.
    fn check_output_extension(&self, format: MediaFormat) -> cf_core::Result<()> {
        let Some(explicit) = self.text("output_file")? else {
            return Ok(());
        };
        match extension_of(explicit) {
            Some(ext) if ext.eq_ignore_ascii_case(format.extension()) => Ok(()),
            _ => Err(cf_core::Error::invalid(
                "output_file",
                format!("extension of '{explicit}' must match output_format '{format}'"),
            )),
        }
    }
}

/// Accumulates arguments for a [`CommandSpec`].
#[derive(Debug)]
pub(crate) struct SpecBuilder {
    args: Vec<String>,
    manifest: Option<ConcatManifest>,
    output_file: Option<String>,
}

impl SpecBuilder {
    /// Start an ffmpeg command that never prompts and keeps its banner quiet.
    fn ffmpeg() -> Self {
        let mut b = Self {
            args: Vec::new(),
            manifest: None,
            output_file: None,
        };
        b.args(["-hide_banner", "-y"]);
        b
    }

    fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    fn input(&mut self, path: &str) -> &mut Self {
        self.arg("-i").arg(path)
    }

    /// Read the concat manifest as input; its path is filled in at run time.
    fn manifest_input(&mut self, content: String) -> &mut Self {
        self.arg("-i");
        let arg_index = self.args.len();
        self.arg(MANIFEST_PLACEHOLDER);
        self.manifest = Some(ConcatManifest { content, arg_index });
        self
    }

    fn output(&mut self, path: String) -> &mut Self {
        self.args.push(path.clone());
        self.output_file = Some(path);
        self
    }

    fn finish(self) -> CommandSpec {
        CommandSpec {
            program: FFMPEG.to_string(),
            args: self.args,
            manifest: self.manifest,
            output_file: self.output_file,
        }
    }
}
