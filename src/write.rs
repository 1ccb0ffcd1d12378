//! File write contract (§6): atomic replace via write-to-temp-in-same-dir
//! then rename, plus an optional `.orig` backup of the pre-merge LOCAL
//! content, written only if one doesn't already exist.

use semerge_core::error::SemergeError;
use std::io::Write;
use std::path::Path;

fn map_io_error(path: &Path, err: std::io::Error) -> SemergeError {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => SemergeError::WritePermission { path: path.display().to_string() },
        std::io::ErrorKind::StorageFull => SemergeError::DiskFull { path: path.display().to_string() },
        std::io::ErrorKind::WouldBlock => SemergeError::FileLocked { path: path.display().to_string() },
        _ => err.into(),
    }
}

/// Write `content` to `path` atomically: a temp file in the same directory
/// is written and fsync'd, then renamed over the target. Never leaves a
/// half-written file in `path`'s place.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), SemergeError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| map_io_error(path, e))?;
    tmp.write_all(content).map_err(|e| map_io_error(path, e))?;
    tmp.flush().map_err(|e| map_io_error(path, e))?;
    tmp.persist(path).map_err(|e| map_io_error(path, e.error))?;
    Ok(())
}

/// Write a `.orig` sidecar holding `pre_merge_local`, unless one is already
/// present (never clobbers a prior backup).
pub fn write_backup_if_absent(path: &Path, pre_merge_local: &[u8]) -> Result<(), SemergeError> {
    let backup_path = sidecar_path(path);
    if backup_path.exists() {
        return Ok(());
    }
    atomic_write(&backup_path, pre_merge_local)
}

fn sidecar_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".orig");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.py");
        std::fs::write(&path, b"old").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn backup_written_once_and_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.py");
        write_backup_if_absent(&path, b"first").unwrap();
        write_backup_if_absent(&path, b"second").unwrap();
        assert_eq!(std::fs::read(sidecar_path(&path)).unwrap(), b"first");
    }

    #[test]
    fn sidecar_path_appends_orig_suffix() {
        let p = Path::new("/a/b/f.py");
        assert_eq!(sidecar_path(p), Path::new("/a/b/f.py.orig"));
    }
}
