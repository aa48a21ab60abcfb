//! Validated extraction root.

use crate::Result;
use crate::UpdateError;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// The directory rules are extracted into.
///
/// A `DestDir` always refers to an existing directory and holds its
/// canonical absolute path, so containment checks against it are not fooled
/// by `.` components or by the root itself being a symlink.
///
/// # Examples
///
/// ```no_run
/// use etupdate_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/etc/suricata")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Wraps an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::Io` if the path does not exist, is not a
    /// directory, or cannot be canonicalized.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let metadata = fs::metadata(&path).map_err(|e| {
            UpdateError::Io(std::io::Error::new(
                e.kind(),
                format!("extraction root {} is not accessible: {e}", path.display()),
            ))
        })?;

        if !metadata.is_dir() {
            return Err(UpdateError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("extraction root is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|e| {
            UpdateError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {}", path.display(), e),
            ))
        })?;

        Ok(Self(canonical))
    }

    /// Creates the directory (and its parents) if missing, then wraps it.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::Io` if the directory cannot be created or
    /// validated.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path)?;
        Self::new(path)
    }

    /// Returns the canonical path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a validated member path to the root.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dest_dir_valid() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("dest should be valid");
        assert!(dest.as_path().is_absolute());
    }

    #[test]
    fn test_dest_dir_nonexistent() {
        let result = DestDir::new("/nonexistent/directory/that/does/not/exist");
        assert!(matches!(result, Err(UpdateError::Io(_))));
    }

    #[test]
    fn test_dest_dir_not_a_directory() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let file_path = temp.path().join("eto_version");
        fs::write(&file_path, "5").expect("failed to write file");

        let result = DestDir::new(file_path);
        assert!(matches!(result, Err(UpdateError::Io(_))));
    }

    #[test]
    fn test_dest_dir_create_missing() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let root = temp.path().join("etc").join("suricata");

        let dest = DestDir::create(&root).expect("should create root");
        assert!(root.is_dir());
        assert_eq!(dest.as_path(), root.canonicalize().unwrap());
    }

    #[test]
    fn test_dest_dir_canonicalization() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let subdir = temp.path().join("subdir");
        fs::create_dir(&subdir).expect("failed to create subdir");

        let dest = DestDir::new(subdir.join(".").join("..")).expect("should create dest dir");
        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    #[cfg(unix)]
    fn test_dest_dir_through_symlink() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().expect("failed to create temp dir");
        let real_dir = temp.path().join("real");
        fs::create_dir(&real_dir).expect("failed to create real dir");
        let link = temp.path().join("link");
        symlink(&real_dir, &link).expect("failed to create symlink");

        let dest = DestDir::new(link).expect("should create from symlink");
        assert_eq!(dest.as_path(), real_dir.canonicalize().unwrap());
    }
}
