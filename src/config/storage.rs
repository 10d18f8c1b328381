use crate::domain::ports::Storage;
use crate::utils::error::{Result, ToolboxError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// Local filesystem storage. Writes go to a temporary file next to the
/// destination and are renamed into place once complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| ToolboxError::io(path, e))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let target = resolve_symlink(path);
        let parent = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        // The temp file is removed on drop if anything below fails.
        let mut staged = stage_in(parent).map_err(|e| ToolboxError::io(path, e))?;

        // An overwritten file keeps its mode; a new one gets what fs::write would give it.
        if let Ok(existing) = fs::metadata(&target) {
            staged
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| ToolboxError::io(path, e))?;
        }

        staged.write_all(data).map_err(|e| ToolboxError::io(path, e))?;
        staged.flush().map_err(|e| ToolboxError::io(path, e))?;
        staged
            .persist(&target)
            .map_err(|e| ToolboxError::io(path, e.error))?;

        tracing::debug!("Wrote {} bytes to {}", data.len(), target.display());
        Ok(())
    }
}

/// Writes land on the file a symlink points to, leaving the link itself in place.
fn resolve_symlink(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

#[cfg(unix)]
fn stage_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    // Mode is masked by the process umask at creation, like a plain create.
    Builder::new()
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn stage_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    Builder::new().tempfile_in(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let storage = LocalStorage::new();

        storage.write_file(&path, b"hello").unwrap();
        assert_eq!(storage.read_file(&path).unwrap(), b"hello");

        storage.write_file(&path, b"replaced").unwrap();
        assert_eq!(storage.read_file(&path).unwrap(), b"replaced");
    }

    #[test]
    fn test_write_into_missing_directory_fails_without_creating_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.txt");

        let err = LocalStorage::new().write_file(&path, b"data").unwrap_err();

        assert!(matches!(err, ToolboxError::IoFailure { .. }));
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_write_leaves_no_stray_temp_files() {
        let dir = TempDir::new().unwrap();
        LocalStorage::new()
            .write_file(&dir.path().join("a.csv"), b"x\n")
            .unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_missing_file_is_io_failure() {
        let err = LocalStorage::new()
            .read_file(Path::new("/no/such/input.json"))
            .unwrap_err();
        assert!(matches!(err, ToolboxError::IoFailure { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shared.csv");
        fs::write(&path, b"old\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        LocalStorage::new().write_file(&path, b"new\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert_eq!(fs::read(&path).unwrap(), b"new\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_mode_matches_plain_create() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let reference = dir.path().join("reference.csv");
        let path = dir.path().join("fresh.csv");
        fs::write(&reference, b"x\n").unwrap();

        LocalStorage::new().write_file(&path, b"x\n").unwrap();

        let mode_of = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode_of(&path), mode_of(&reference));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_goes_through_symlink() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real.csv");
        let link = dir.path().join("link.csv");
        fs::write(&real, b"old\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        LocalStorage::new().write_file(&link, b"new\n").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&real).unwrap(), b"new\n");
    }
}
