use std::fs;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// RAII guard for a private scratch directory handed to external tools as `TMPDIR`.
///
/// The outer directory is created with a random name (mode 0700) so nothing else shares it;
/// the tool-facing `work` subdirectory lives inside it. Both are removed when the guard drops.
#[derive(Debug)]
pub struct ScratchDir {
    root: Option<TempDir>,
    work: PathBuf,
}

impl ScratchDir {
    /// Create a scratch directory under `base` (created if missing) with a `name` subdirectory.
    pub fn create_in(base: &Path, name: &str) -> io::Result<Self> {
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(base)?;
        let root = tempfile::Builder::new().prefix("regrow-").tempdir_in(base)?;
        let work = root.path().join(name);
        if !work.exists() {
            fs::DirBuilder::new().mode(0o700).create(&work)?;
        }
        Ok(Self {
            root: Some(root),
            work,
        })
    }

    /// Directory to export as `TMPDIR`.
    pub fn path(&self) -> &Path {
        &self.work
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        let root_path = root.path().to_path_buf();
        if let Err(err) = root.close() {
            log::warn!(
                "scratch guard failed to remove {}: {}",
                root_path.display(),
                err
            );
        }
    }
}
