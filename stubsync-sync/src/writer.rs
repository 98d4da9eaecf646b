//! Atomic file writer.
//!
//! ## `write_file` protocol
//!
//! 1. Compare with the current file byte for byte → skip if identical.
//!    Line endings are written as given.
//! 2. Dry-run stops here and reports `WouldWrite`.
//! 3. Create parent directories, write `<path>.stubsync.tmp`.
//! 4. Rename over the final path (atomic on POSIX); on failure remove the tmp
//!    file and leave the original untouched.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// Content on disk already matches.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

pub fn tmp_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.stubsync.tmp", path.display()))
}

/// Atomically write `content` to `path` unless it is already there.
pub fn write_file(path: &Path, content: &str, dry_run: bool) -> Result<WriteResult, SyncError> {
    write_file_with_tmp(path, content, dry_run, &tmp_path_for(path))
}

fn write_file_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    if read_existing(path)?.as_deref() == Some(content) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::debug!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Current file content exactly as stored, `None` if absent.
pub fn read_existing(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("emoji.rs");
        let result = write_file(&path, "fn a() {}\n", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn a() {}\n");
    }

    #[test]
    fn same_content_returns_unchanged_and_keeps_mtime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("emoji.rs");
        write_file(&path, "same", false).unwrap();

        let old = filetime::FileTime::from_unix_time(1_000_000, 0);
        filetime::set_file_mtime(&path, old).unwrap();

        let result = write_file(&path, "same", false).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
        let mtime = filetime::FileTime::from_last_modification_time(&fs::metadata(&path).unwrap());
        assert_eq!(mtime, old);
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.rs");
        let result = write_file(&path, "content", true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
    }

    #[test]
    fn tmp_file_removed_and_parents_created() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("src").join("controller").join("mod.rs");
        write_file(&path, "data", false).unwrap();
        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists(), ".stubsync.tmp must be cleaned up");
    }

    #[test]
    fn line_endings_are_kept_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("crlf.rs");
        write_file(&path, "line1\r\nline2\r\n", false).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"line1\r\nline2\r\n");
        assert_eq!(read_existing(&path).unwrap().as_deref(), Some("line1\r\nline2\r\n"));

        let lf = write_file(&path, "line1\nline2\n", false).unwrap();
        assert!(matches!(lf, WriteResult::Written { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"line1\nline2\n");
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();
        let path = readonly_dir.join("emoji.rs");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("emoji.rs.stubsync.tmp");
        let result = write_file_with_tmp(&path, "new content", false, &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Root ignores directory permissions; only assert when rename failed.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&path).unwrap(), "original");
            assert!(!tmp_path.exists(), ".stubsync.tmp should be cleaned up");
        }
    }
}
