//! Link target validation.

use std::collections::HashSet;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::UpdateError;
use crate::types::DestDir;
use crate::types::SafePath;

/// Validates that a symlink at `link` pointing to `target` stays inside the
/// extraction root.
///
/// The target is resolved lexically relative to the link's directory: every
/// `..` must be matched by a directory level that exists above it within
/// the root.
///
/// # Errors
///
/// Returns `UpdateError::UnsafeArchive` if the target is empty, absolute, or
/// walks above the root.
///
/// # Examples
///
/// ```no_run
/// use etupdate_core::security::validate_symlink;
/// use etupdate_core::types::DestDir;
/// use etupdate_core::types::SafePath;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/etc/suricata")?;
/// let link = SafePath::validate(Path::new("rules/current.rules"), &dest)?;
///
/// assert!(validate_symlink(&link, Path::new("emerging-all.rules")).is_ok());
/// assert!(validate_symlink(&link, Path::new("../../shadow")).is_err());
/// # Ok(())
/// # }
/// ```
pub fn validate_symlink(link: &SafePath, target: &Path) -> Result<()> {
    let reject = |reason: &str| {
        Err(UpdateError::unsafe_member(
            link.as_path(),
            format!("symlink target {} {reason}", target.display()),
        ))
    };

    if target.as_os_str().is_empty() {
        return reject("is empty");
    }

    // Depth of the directory holding the link
    let mut depth = link.as_path().components().count().saturating_sub(1);

    for component in target.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => return reject("is absolute"),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return reject("escapes the extraction root");
                }
                depth -= 1;
            }
            Component::Normal(_) => depth += 1,
        }
    }

    Ok(())
}

/// Validates a symlink target against the other links it passes through.
///
/// [`validate_symlink`] treats every component as a real directory. A
/// component that is itself a link breaks that: with `rules/s -> ..`, the
/// target `s/../secret` of `rules/t` names the parent of the root. So `..`
/// is refused right after any component that is a symlink, whether it is
/// listed in `links` (the archive's own symlinks, normalized) or already
/// exists under `dest`. Links already on disk that are not part of the
/// archive are resolved and must stay inside the root.
///
/// # Errors
///
/// Returns `UpdateError::UnsafeArchive` if resolution could leave the root.
pub fn validate_symlink_chain(
    link: &SafePath,
    target: &Path,
    dest: &DestDir,
    links: &HashSet<PathBuf>,
) -> Result<()> {
    let reject = |reason: String| {
        Err(UpdateError::unsafe_member(
            link.as_path(),
            format!("symlink target {} {reason}", target.display()),
        ))
    };

    let mut current = link
        .as_path()
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    for component in target.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => return reject("is absolute".into()),
            Component::CurDir => {}
            Component::ParentDir => {
                if links.contains(&current) || is_symlink_on_disk(&current, dest) {
                    return reject(format!("steps out of symlink {}", current.display()));
                }
                if !current.pop() {
                    return reject("escapes the extraction root".into());
                }
            }
            Component::Normal(name) => {
                current.push(name);
                if !links.contains(&current) && is_symlink_on_disk(&current, dest) {
                    match dest.as_path().join(&current).canonicalize() {
                        Ok(resolved) if resolved.starts_with(dest.as_path()) => {}
                        Ok(resolved) => {
                            return reject(format!(
                                "resolves outside the extraction root via {}",
                                resolved.display()
                            ));
                        }
                        Err(_) => {
                            return reject(format!(
                                "passes through unresolvable symlink {}",
                                current.display()
                            ));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn is_symlink_on_disk(relative: &Path, dest: &DestDir) -> bool {
    !relative.as_os_str().is_empty()
        && dest
            .as_path()
            .join(relative)
            .symlink_metadata()
            .is_ok_and(|m| m.file_type().is_symlink())
}

/// Validates a hardlink target, which tar stores relative to the archive
/// root.
///
/// # Errors
///
/// Returns `UpdateError::UnsafeArchive` naming the link if its target would
/// not itself be a safe member path.
pub fn validate_hardlink(link: &SafePath, target: &Path, dest: &DestDir) -> Result<SafePath> {
    SafePath::validate(target, dest).map_err(|e| match e {
        UpdateError::UnsafeArchive { reason, .. } => UpdateError::unsafe_member(
            link.as_path(),
            format!("hardlink target {}: {reason}", target.display()),
        ),
        other => other,
    })
}
