//! Filesystem-backed store.
//!
//! Files live under a root directory (the working copy of the versioned
//! tree). Writes go to a temp file in the target directory and are
//! renamed into place.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tracing::trace;

use super::Store;
use crate::core::types::StorePath;
use crate::error::{Result, StoreError, ValidationError};

/// Store rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct Filesystem {
    root: PathBuf,
}

impl Filesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store path onto disk, rejecting anything that could escape
    /// the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        if path.is_empty() || path.contains('\\') || path.contains('\0') {
            return Err(ValidationError::InvalidPath(path.to_string()).into());
        }
        let rel = Path::new(path);
        for component in rel.components() {
            if !matches!(component, Component::Normal(_)) {
                return Err(ValidationError::InvalidPath(path.to_string()).into());
            }
        }
        Ok(self.root.join(rel))
    }

    fn walk(&self, dir: &Path, out: &mut Vec<StorePath>) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|source| StoreError::ReadFailed {
            path: dir.display().to_string(),
            source,
        })?;

        for entry in entries {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                if entry.file_name() == ".git" {
                    continue;
                }
                self.walk(&path, out)?;
            } else if file_type.is_file() {
                if let Ok(rel) = path.strip_prefix(&self.root) {
                    let rel = rel
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    out.push(rel);
                }
            }
        }
        Ok(())
    }

    /// Remove now-empty directories between `path` and the root.
    fn prune_empty_parents(&self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == self.root || !dir.starts_with(&self.root) {
                break;
            }
            if fs::remove_dir(dir).is_err() {
                break;
            }
            current = dir.parent();
        }
    }
}

impl Store for Filesystem {
    fn get(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        trace!(path, "store get");
        fs::read(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.to_string()).into()
            } else {
                StoreError::ReadFailed {
                    path: path.to_string(),
                    source,
                }
                .into()
            }
        })
    }

    fn set(&self, path: &str, data: &[u8]) -> Result<()> {
        let full = self.resolve(path)?;
        trace!(path, len = data.len(), "store set");
        write_atomic(&full, data).map_err(|source| {
            StoreError::WriteFailed {
                path: path.to_string(),
                source,
            }
            .into()
        })
    }

    fn delete(&self, path: &str) -> Result<()> {
        let full = self.resolve(path)?;
        trace!(path, "store delete");
        match fs::remove_file(&full) {
            Ok(()) => {
                self.prune_empty_parents(&full);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_string()).into())
            }
            Err(source) => Err(StoreError::WriteFailed {
                path: path.to_string(),
                source,
            }
            .into()),
        }
    }

    fn list(&self, prefix: &str) -> Result<Vec<StorePath>> {
        let dir = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.resolve(prefix.trim_end_matches('/'))?
        };
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        self.walk(&dir, &mut out)?;
        out.sort();
        Ok(out)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// Write `data` to `path` atomically with owner-only permissions.
///
/// Parent directories are created as needed.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Check that a file has the expected mode (Unix only).
#[cfg(unix)]
pub(crate) fn validate_file_permissions(path: &Path, expected_mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)?;
    let actual_mode = metadata.permissions().mode() & 0o777;

    if actual_mode != expected_mode {
        return Err(ValidationError::InvalidPermissions {
            path: path.display().to_string(),
            expected: format!("{:o}", expected_mode),
            actual: format!("{:o}", actual_mode),
        }
        .into());
    }

    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn validate_file_permissions(_path: &Path, _expected_mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = Filesystem::new(tmp.path());

        store.set("credentials/github.com/bot.age", b"cipher").unwrap();
        assert!(store.exists("credentials/github.com/bot.age"));
        assert_eq!(
            store.get("credentials/github.com/bot.age").unwrap(),
            b"cipher"
        );
    }

    #[test]
    fn test_get_missing() {
        let tmp = TempDir::new().unwrap();
        let store = Filesystem::new(tmp.path());

        let err = store.get("nope.age").unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::NotFound(_))));
    }

    #[test]
    fn test_list_sorted_and_relative() {
        let tmp = TempDir::new().unwrap();
        let store = Filesystem::new(tmp.path());

        store.set("projects/web/prod.env.age", b"3").unwrap();
        store.set("credentials/b.io/x.age", b"2").unwrap();
        store.set("credentials/a.io/y.age", b"1").unwrap();
        store.set(".git/HEAD", b"ref").unwrap();

        assert_eq!(
            store.list("credentials").unwrap(),
            vec!["credentials/a.io/y.age", "credentials/b.io/x.age"]
        );
        assert_eq!(store.list("").unwrap().len(), 3);
        assert!(store.list("missing/").unwrap().is_empty());
    }

    #[test]
    fn test_delete_prunes_empty_dirs() {
        let tmp = TempDir::new().unwrap();
        let store = Filesystem::new(tmp.path());

        store.set("credentials/site/one.age", b"1").unwrap();
        store.delete("credentials/site/one.age").unwrap();

        assert!(!tmp.path().join("credentials").exists());
        assert!(tmp.path().exists());

        let err = store.delete("credentials/site/one.age").unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::NotFound(_))));
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let tmp = TempDir::new().unwrap();
        let store = Filesystem::new(tmp.path());

        for bad in ["../etc/passwd", "/abs", "a/../../b", "", "./x"] {
            let err = store.set(bad, b"x").unwrap_err();
            assert!(
                matches!(err, Error::Validation(ValidationError::InvalidPath(_))),
                "{bad}"
            );
        }
        assert!(!store.exists("../x"));
    }

    #[cfg(unix)]
    #[test]
    fn test_written_files_are_private() {
        let tmp = TempDir::new().unwrap();
        let store = Filesystem::new(tmp.path());

        store.set("f.age", b"x").unwrap();
        validate_file_permissions(&tmp.path().join("f.age"), 0o600).unwrap();
    }
}
