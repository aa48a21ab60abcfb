//! Unpacking a checked archive into the extraction root.

use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use flate2::read::GzDecoder;

use crate::ExtractionReport;
use crate::Result;
use crate::UpdateError;
use crate::archive::ArchiveMember;
use crate::archive::invalid_archive;
use crate::report::UpdateObserver;
use crate::security::validate_member;
use crate::types::DestDir;
use crate::types::EntryType;

/// Metadata handling during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Keep setuid, setgid and sticky bits. Permission bits 0777 are always
    /// applied.
    pub preserve_permissions: bool,

    /// Set modification times from the archive.
    pub preserve_mtime: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            preserve_permissions: false,
            preserve_mtime: true,
        }
    }
}

/// Unpacks a gzip-compressed tar stream beneath `dest`.
///
/// Relative paths are reproduced under the root and existing files are
/// overwritten. Each member is validated again right before it is written.
/// Without a prior safety pass, members preceding an unsafe one will already
/// be on disk, and a symlink is only checked against the links written
/// before it.
///
/// # Errors
///
/// - `UpdateError::UnsafeArchive` if a member fails validation or the
///   unpacker refuses its path
/// - `UpdateError::Extraction` if writing a member fails
/// - `UpdateError::InvalidArchive` if the stream is corrupt
///
/// There is no rollback: members written before a failure stay on disk.
pub fn extract_all<R: Read>(
    reader: R,
    dest: &DestDir,
    options: &ExtractOptions,
    observer: &mut dyn UpdateObserver,
) -> Result<ExtractionReport> {
    let start = Instant::now();

    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(options.preserve_permissions);
    archive.set_preserve_mtime(options.preserve_mtime);
    archive.set_overwrite(true);
    archive.set_unpack_xattrs(false);

    let mut report = ExtractionReport::new();
    let mut links: HashSet<PathBuf> = HashSet::new();

    for entry in archive.entries().map_err(invalid_archive)? {
        let mut entry = entry.map_err(invalid_archive)?;
        let member = ArchiveMember::from_entry(&entry)?;

        let Some(safe_path) = validate_member(&member, dest, &links)? else {
            continue;
        };

        let unpacked = entry
            .unpack_in(dest.as_path())
            .map_err(|source| UpdateError::Extraction {
                path: member.path.clone(),
                source,
            })?;
        if !unpacked {
            return Err(UpdateError::unsafe_member(
                &member.path,
                "refused by the tar unpacker",
            ));
        }

        if matches!(member.entry_type, EntryType::Symlink { .. }) {
            links.insert(safe_path.as_path().to_path_buf());
        }
        report.record(&member.entry_type, member.size);
        observer.on_member_extracted(safe_path.as_path(), &member.entry_type);
    }

    report.duration = start.elapsed();
    Ok(report)
}
