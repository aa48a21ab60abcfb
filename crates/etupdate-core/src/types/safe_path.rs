//! Validated member path type.

use crate::Result;
use crate::UpdateError;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;

/// An archive member path that is safe to write beneath a [`DestDir`].
///
/// `SafePath` represents a path that has been validated to not contain:
/// - Null bytes
/// - A root or platform prefix
/// - Parent directory traversal (`..`) anywhere, including segments spelled
///   with backslashes
/// - Zero normal components
///
/// and whose resolved location, following any symlinks that already exist
/// under the root, stays inside the root.
///
/// # Security Properties
///
/// - Can ONLY be constructed through validation
/// - NO `From<PathBuf>` implementation
/// - Normalized: `.` components are removed
///
/// # Examples
///
/// ```no_run
/// use etupdate_core::types::DestDir;
/// use etupdate_core::types::SafePath;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/etc/suricata")?;
///
/// let safe = SafePath::validate(Path::new("rules/emerging-dns.rules"), &dest)?;
///
/// assert!(SafePath::validate(Path::new("../../etc/passwd"), &dest).is_err());
/// assert!(SafePath::validate(Path::new("rules/../../passwd"), &dest).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates and constructs a `SafePath`.
    ///
    /// # Validation Steps
    ///
    /// 1. Reject null bytes
    /// 2. Walk components, rejecting `..`, root and prefix components and
    ///    dropping `.`
    /// 3. Reject a path with no normal components
    /// 4. Canonicalize the deepest existing ancestor and verify it is still
    ///    inside the root
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::UnsafeArchive` naming the original path and the
    /// failed rule, or `UpdateError::Io` if an existing ancestor cannot be
    /// canonicalized.
    pub fn validate(path: &Path, dest: &DestDir) -> Result<Self> {
        if has_null_bytes(path) {
            return Err(UpdateError::unsafe_member(path, "path contains null bytes"));
        }

        let mut normalized = PathBuf::new();

        for component in path.components() {
            match component {
                Component::ParentDir => {
                    return Err(UpdateError::unsafe_member(
                        path,
                        "parent directory traversal",
                    ));
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(UpdateError::unsafe_member(path, "absolute path"));
                }
                Component::CurDir => {}
                Component::Normal(name) => {
                    if has_backslash_traversal(name.to_string_lossy().as_ref()) {
                        return Err(UpdateError::unsafe_member(
                            path,
                            "parent directory traversal",
                        ));
                    }
                    normalized.push(name);
                }
            }
        }

        if normalized.as_os_str().is_empty() {
            return Err(UpdateError::unsafe_member(path, "empty path"));
        }

        ensure_within(path, &normalized, dest)?;

        Ok(Self(normalized))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Returns `true` for paths made only of `.` components, such as `./`.
///
/// Archives built with `tar -C dir .` start with such a member; it names the
/// extraction root itself.
#[must_use]
pub fn is_root_marker(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.components().all(|c| matches!(c, Component::CurDir))
}

/// Checks the deepest ancestor of `dest/normalized` that already exists.
///
/// Lexically the joined path cannot leave the root, but a directory under
/// the root may already be a symlink pointing elsewhere.
fn ensure_within(original: &Path, normalized: &Path, dest: &DestDir) -> Result<()> {
    let resolved = dest.as_path().join(normalized);

    for ancestor in resolved.ancestors() {
        if ancestor == dest.as_path() {
            return Ok(());
        }
        match ancestor.canonicalize() {
            Ok(canonical) => {
                if canonical.starts_with(dest.as_path()) {
                    return Ok(());
                }
                return Err(UpdateError::unsafe_member(
                    original,
                    format!(
                        "resolves outside the extraction root via {}",
                        ancestor.display()
                    ),
                ));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(UpdateError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to canonicalize {}: {e}", ancestor.display()),
                )));
            }
        }
    }

    Ok(())
}

/// Catches `..\evil` style names that are a single component on Unix but a
/// traversal on Windows.
fn has_backslash_traversal(name: &str) -> bool {
    name.contains('\\') && name.split('\\').any(|segment| segment == "..")
}

/// Checks if a path contains null bytes.
#[cfg(unix)]
fn has_null_bytes(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&b'\0')
}

/// Checks if a path contains null bytes.
#[cfg(not(unix))]
fn has_null_bytes(path: &Path) -> bool {
    path.to_str().is_none_or(|s| s.contains('\0'))
}
