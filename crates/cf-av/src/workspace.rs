//! Scratch files for a single execution.
//!
//! A [`Workspace`] owns the auxiliary files one command needs (today only
//! the concat manifest). Every file gets a unique name, so concurrent runs
//! in the same directory never collide, and all of them are removed when
//! the workspace is dropped. Media outputs are never placed here.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Per-execution scratch space.
///
/// # Example
///
/// ```no_run
/// use cf_av::Workspace;
///
/// let mut workspace = Workspace::new(std::path::Path::new("."));
/// let list = workspace.write_file("concat-", ".txt", "file 'a.mp4'\nfile 'b.mp4'\n")?;
/// // ... run ffmpeg reading `list` ...
/// drop(workspace); // `list` is deleted here
/// # Ok::<(), cf_core::Error>(())
/// ```
pub struct Workspace {
    dir: PathBuf,
    files: Vec<NamedTempFile>,
}

impl Workspace {
    /// Create a workspace whose files live in `dir`.
    ///
    /// Relative paths inside a concat manifest are resolved against the
    /// manifest's own directory, so callers pass the directory the command
    /// runs in.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            files: Vec::new(),
        }
    }

    /// Write `contents` to a new uniquely-named file and return its path.
    ///
    /// # Errors
    ///
    /// Returns [`cf_core::Error::Io`] if the file cannot be created or
    /// written.
    pub fn write_file(
        &mut self,
        prefix: &str,
        suffix: &str,
        contents: &str,
    ) -> cf_core::Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.dir)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;

        let path = file.path().to_path_buf();
        tracing::debug!("wrote scratch file {}", path.display());
        self.files.push(file);
        Ok(path)
    }

    /// Paths of every file written so far.
    pub fn files(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path().to_path_buf()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn write_file_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut ws = Workspace::new(dir.path());
        let path = ws.write_file(".cmdforge-concat-", ".txt", "file 'a.mp4'\n").unwrap();

        assert!(path.starts_with(dir.path()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "file 'a.mp4'\n");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(".cmdforge-concat-"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = Workspace::new(dir.path());
        let mut b = Workspace::new(dir.path());
        let pa = a.write_file("list-", ".txt", "a").unwrap();
        let pb = b.write_file("list-", ".txt", "b").unwrap();
        assert_ne!(pa, pb);
        assert_eq!(fs::read_to_string(&pa).unwrap(), "a");
        assert_eq!(fs::read_to_string(&pb).unwrap(), "b");
    }

    #[test]
    fn files_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let mut ws = Workspace::new(dir.path());
        let path = ws.write_file("list-", ".txt", "x").unwrap();
        assert_eq!(ws.files(), vec![path.clone()]);
        drop(ws);
        assert!(!path.exists());
    }

    #[test]
    fn missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ws = Workspace::new(&dir.path().join("absent"));
        let err = ws.write_file("list-", ".txt", "x").unwrap_err();
        assert!(matches!(err, cf_core::Error::Io { .. }));
    }
}
