use crate::error::{ProvenanceError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Bytes written and fsynced to a sibling temp file, waiting to be renamed
/// over the target.
///
/// Dropping a `StagedFile` without calling [`StagedFile::commit`] removes the
/// temp file, so a failure anywhere before the rename leaves the target as it
/// was.
#[derive(Debug)]
pub struct StagedFile {
    tmp_path: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Write `bytes` next to `path`. Parent directories are created first.
    pub fn stage(path: &Path, bytes: &[u8]) -> Result<Self> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| ProvenanceError::write(parent, e))?;

        let base = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ProvenanceError::Config {
                message: format!("path has no filename: {}", path.display()),
            })?;

        let staged = Self {
            tmp_path: parent.join(format!(".{}.tmp-{}", base, std::process::id())),
            path: path.to_path_buf(),
            committed: false,
        };

        let mut file = std::fs::File::create(&staged.tmp_path)
            .map_err(|e| ProvenanceError::write(&staged.tmp_path, e))?;
        file.write_all(bytes)
            .map_err(|e| ProvenanceError::write(&staged.tmp_path, e))?;
        file.sync_all()
            .map_err(|e| ProvenanceError::write(&staged.tmp_path, e))?;
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temp file over the target.
    pub fn commit(mut self) -> Result<()> {
        std::fs::rename(&self.tmp_path, &self.path)
            .map_err(|e| ProvenanceError::write(&self.path, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.tmp_path);
        }
    }
}

/// Replace `path` with `bytes` via a sibling temp file and rename.
///
/// Parent directories are created first. Readers never observe a half-written
/// file and no temp file survives a failed write.
pub fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    StagedFile::stage(path, bytes)?.commit()
}

/// Pretty JSON (2-space indent) with a trailing newline.
pub(crate) fn to_pretty_json<T: serde::Serialize + ?Sized>(
    value: &T,
    what: &'static str,
) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(value)
        .map_err(|source| ProvenanceError::Serialize { what, source })?;
    out.push(b'\n');
    Ok(out)
}
