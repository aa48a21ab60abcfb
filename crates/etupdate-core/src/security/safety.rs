//! Whole-archive safety gate.

use std::collections::HashSet;
use std::path::Component;
use std::path::PathBuf;

use crate::Result;
use crate::UpdateError;
use crate::archive::ArchiveMember;
use crate::security::link::validate_hardlink;
use crate::security::link::validate_symlink;
use crate::security::link::validate_symlink_chain;
use crate::types::DestDir;
use crate::types::EntryType;
use crate::types::SafePath;
use crate::types::safe_path::is_root_marker;

/// Validates a single member.
///
/// `links` holds the normalized paths of the archive's symlinks that symlink
/// targets may pass through. Returns `None` for members that write nothing:
/// format metadata and the `./` entry naming the root itself.
///
/// # Errors
///
/// Returns `UpdateError::UnsafeArchive` if the member path or link target
/// could escape `dest`, or if the member is a device node or FIFO.
pub fn validate_member(
    member: &ArchiveMember,
    dest: &DestDir,
    links: &HashSet<PathBuf>,
) -> Result<Option<SafePath>> {
    if member.entry_type.is_metadata() {
        return Ok(None);
    }
    if member.entry_type == EntryType::Directory && is_root_marker(&member.path) {
        return Ok(None);
    }

    let safe_path = SafePath::validate(&member.path, dest)?;

    match &member.entry_type {
        EntryType::Symlink { target } => {
            validate_symlink(&safe_path, target)?;
            validate_symlink_chain(&safe_path, target, dest, links)?;
        }
        EntryType::Hardlink { target } => {
            validate_hardlink(&safe_path, target, dest)?;
        }
        EntryType::Special => {
            return Err(UpdateError::unsafe_member(
                &member.path,
                "device nodes and FIFOs are not allowed",
            ));
        }
        EntryType::File | EntryType::Directory | EntryType::Metadata => {}
    }

    Ok(Some(safe_path))
}

/// Rejects the archive if ANY member could write outside `dest`.
///
/// Runs over the complete member list before anything is extracted, so an
/// unsafe member late in the archive still prevents every write.
///
/// # Errors
///
/// Returns `UpdateError::UnsafeArchive` for the first offending member.
///
/// # Examples
///
/// ```no_run
/// use etupdate_core::archive::ArchiveMember;
/// use etupdate_core::security::check_archive_safety;
/// use etupdate_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/etc/suricata")?;
/// let members = vec![
///     ArchiveMember::file("rules/emerging-dns.rules", 120),
///     ArchiveMember::file("../../etc/passwd", 10),
/// ];
/// assert!(check_archive_safety(&members, &dest).is_err());
/// # Ok(())
/// # }
/// ```
pub fn check_archive_safety(members: &[ArchiveMember], dest: &DestDir) -> Result<()> {
    let links = symlink_paths(members);
    for member in members {
        validate_member(member, dest, &links)?;
    }
    Ok(())
}

/// Normalized paths of every symlink member, wherever it sits in the
/// archive, so a link is known before the member that points through it.
fn symlink_paths(members: &[ArchiveMember]) -> HashSet<PathBuf> {
    members
        .iter()
        .filter(|m| matches!(m.entry_type, EntryType::Symlink { .. }))
        .map(|m| {
            m.path
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect()
        })
        .collect()
}
