//! Rule file enumeration shared by the loader, the hasher and the checker.

use crate::error::{ProvenanceError, Result};
use std::path::{Path, PathBuf};

/// File name suffixes recognized as rule definitions.
pub const RULE_FILE_SUFFIXES: &[&str] = &[".yml", ".yaml"];

pub(crate) fn is_rule_file_name(name: &str) -> bool {
    RULE_FILE_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Recursively list every rule file under `root`, sorted by relative path.
///
/// The sort key is the `/`-joined path relative to `root`, so the order is the
/// same on every platform and independent of directory listing order.
/// Symlinked files are included; symlinked directories are not descended.
pub fn discover_rule_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    collect_rule_files(root, &mut out)?;
    sort_by_relative_path(root, &mut out);
    Ok(out)
}

fn collect_rule_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let dir_err = |e: std::io::Error| ProvenanceError::RulesDir {
        path: dir.to_path_buf(),
        source: e,
    };
    for entry in std::fs::read_dir(dir).map_err(dir_err)? {
        let entry = entry.map_err(dir_err)?;
        let path = entry.path();
        let ft = entry.file_type().map_err(dir_err)?;
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if ft.is_dir() {
            collect_rule_files(&path, out)?;
        } else if ft.is_file() {
            if is_rule_file_name(&name) {
                tracing::debug!(path = %path.display(), "found rule file");
                out.push(path);
            }
        } else if ft.is_symlink() && is_rule_file_name(&name) {
            // Dangling links are ignored.
            if std::fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false) {
                tracing::debug!(path = %path.display(), "found rule file (symlink)");
                out.push(path);
            }
        }
    }
    Ok(())
}

/// Sort paths by their `/`-joined form relative to `root`.
pub(crate) fn sort_by_relative_path(root: &Path, paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|p| relative_key(root, p));
}

pub(crate) fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
