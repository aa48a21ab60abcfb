//! The downloaded rules archive.

use std::borrow::Cow;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::PathBuf;

use flate2::read::GzDecoder;

use crate::ExtractionReport;
use crate::Result;
use crate::UpdateError;
use crate::extraction::ExtractOptions;
use crate::extraction::extract_all;
use crate::report::UpdateObserver;
use crate::security::check_archive_safety;
use crate::types::DestDir;
use crate::types::EntryType;

/// One member of the archive, as listed in its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Path as stored in the archive, unvalidated.
    pub path: PathBuf,

    /// Member kind, including any link target.
    pub entry_type: EntryType,

    /// Payload size in bytes.
    pub size: u64,

    /// Unix permission bits, if recorded.
    pub mode: Option<u32>,
}

impl ArchiveMember {
    /// A regular file member with mode 0644.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            entry_type: EntryType::File,
            size,
            mode: Some(0o644),
        }
    }

    /// A directory member with mode 0755.
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entry_type: EntryType::Directory,
            size: 0,
            mode: Some(0o755),
        }
    }

    /// Reads the member description from a tar entry header.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::InvalidArchive` if the header is malformed.
    pub fn from_entry<R: Read>(entry: &tar::Entry<'_, R>) -> Result<Self> {
        let path = entry.path().map_err(invalid_archive)?.into_owned();
        let link_target = entry
            .link_name()
            .map_err(invalid_archive)?
            .map(Cow::into_owned);
        let header = entry.header();

        Ok(Self {
            path,
            entry_type: EntryType::from_tar(header.entry_type(), link_target),
            size: header.size().map_err(invalid_archive)?,
            mode: header.mode().ok(),
        })
    }
}

/// A gzip-compressed tar archive backed by a seekable reader.
///
/// Every pass (listing, safety check, extraction) rewinds the reader and
/// decompresses from the start, so the archive never has to fit in memory.
///
/// # Examples
///
/// ```no_run
/// use etupdate_core::NoopObserver;
/// use etupdate_core::archive::RulesArchive;
/// use etupdate_core::extraction::ExtractOptions;
/// use etupdate_core::types::DestDir;
/// use std::fs::File;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/etc/suricata")?;
/// let mut archive = RulesArchive::new(File::open("emerging.rules.tar.gz")?);
///
/// archive.check_safety(&dest)?;
/// let report = archive.extract_all(&dest, &ExtractOptions::default(), &mut NoopObserver)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RulesArchive<R> {
    reader: R,
}

impl<R: Read + Seek> RulesArchive<R> {
    /// Wraps a reader positioned anywhere; it is rewound before each pass.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn rewound(&mut self) -> Result<&mut R> {
        self.reader.seek(SeekFrom::Start(0))?;
        Ok(&mut self.reader)
    }

    /// Lists every member of the archive.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::InvalidArchive` if the data is not a valid
    /// gzip-compressed tar.
    pub fn members(&mut self) -> Result<Vec<ArchiveMember>> {
        let mut archive = tar::Archive::new(GzDecoder::new(self.rewound()?));
        let mut members = Vec::new();

        for entry in archive.entries().map_err(invalid_archive)? {
            let entry = entry.map_err(invalid_archive)?;
            members.push(ArchiveMember::from_entry(&entry)?);
        }

        Ok(members)
    }

    /// Rejects the archive if any member could write outside `dest`.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::UnsafeArchive` for the first unsafe member, or
    /// `UpdateError::InvalidArchive` if the archive cannot be listed.
    pub fn check_safety(&mut self, dest: &DestDir) -> Result<Vec<ArchiveMember>> {
        let members = self.members()?;
        check_archive_safety(&members, dest)?;
        Ok(members)
    }

    /// Unpacks every member beneath `dest`.
    ///
    /// Call only after [`check_safety`](Self::check_safety) succeeded. Each
    /// member is validated again immediately before it is written.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::Extraction` if writing fails; files written
    /// before the failure are left in place.
    pub fn extract_all(
        &mut self,
        dest: &DestDir,
        options: &ExtractOptions,
        observer: &mut dyn UpdateObserver,
    ) -> Result<ExtractionReport> {
        extract_all(self.rewound()?, dest, options, observer)
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

pub(crate) fn invalid_archive(err: std::io::Error) -> UpdateError {
    UpdateError::InvalidArchive(err.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_utils::TarTestBuilder;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_members_lists_entries_in_order() {
        let data = TarTestBuilder::new()
            .add_directory("rules/")
            .add_file("rules/emerging-dns.rules", b"alert dns any any -> any any;")
            .add_symlink("rules/current.rules", "emerging-dns.rules")
            .build_gz();

        let mut archive = RulesArchive::new(Cursor::new(data));
        let members = archive.members().unwrap();

        assert_eq!(members.len(), 3);
        assert_eq!(members[0].entry_type, EntryType::Directory);
        assert_eq!(members[1].path, Path::new("rules/emerging-dns.rules"));
        assert_eq!(members[1].size, 29);
        assert_eq!(members[1].mode, Some(0o644));
        assert_eq!(
            members[2].entry_type,
            EntryType::Symlink {
                target: PathBuf::from("emerging-dns.rules")
            }
        );
    }

    #[test]
    fn test_members_can_be_listed_twice() {
        let data = TarTestBuilder::new().add_file("a.rules", b"x").build_gz();
        let mut archive = RulesArchive::new(Cursor::new(data));
        assert_eq!(archive.members().unwrap(), archive.members().unwrap());
    }

    #[test]
    fn test_into_inner_returns_reader() {
        let data = TarTestBuilder::new().add_file("a.rules", b"x").build_gz();
        let mut archive = RulesArchive::new(Cursor::new(data.clone()));
        archive.members().unwrap();

        let reader = archive.into_inner();
        assert_eq!(reader.get_ref(), &data);
    }

    #[test]
    fn test_not_gzip_is_invalid_archive() {
        let mut archive = RulesArchive::new(Cursor::new(b"definitely not gzip".to_vec()));
        assert!(matches!(
            archive.members(),
            Err(UpdateError::InvalidArchive(_))
        ));
    }

    #[test]
    fn test_check_safety_rejects_traversal() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("failed to create dest");
        let data = TarTestBuilder::new()
            .add_file("rules/a.rules", b"a")
            .add_file_raw_path("../../etc/passwd", b"root::0:0::/:/bin/sh")
            .build_gz();

        let mut archive = RulesArchive::new(Cursor::new(data));
        let result = archive.check_safety(&dest);

        assert!(matches!(result, Err(UpdateError::UnsafeArchive { .. })));
    }

    #[test]
    fn test_check_safety_returns_members() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("failed to create dest");
        let data = TarTestBuilder::new()
            .add_file("rules/a.rules", b"a")
            .add_file("rules/b.rules", b"b")
            .build_gz();

        let mut archive = RulesArchive::new(Cursor::new(data));
        assert_eq!(archive.check_safety(&dest).unwrap().len(), 2);
    }
}
