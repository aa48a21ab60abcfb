//! Archive member kinds.

use std::path::PathBuf;

/// Kind of a member in the rules archive.
///
/// Link targets are carried as stored in the archive and have NOT been
/// validated.
///
/// # Examples
///
/// ```
/// use etupdate_core::types::EntryType;
/// use std::path::PathBuf;
///
/// let symlink = EntryType::Symlink {
///     target: PathBuf::from("emerging-all.rules"),
/// };
/// assert!(symlink.is_link());
/// assert!(!EntryType::File.is_link());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file.
    File,

    /// Directory.
    Directory,

    /// Symbolic link; `target` is relative to the link's own directory.
    Symlink {
        /// The symlink target path (not yet validated).
        target: PathBuf,
    },

    /// Hard link; `target` is relative to the extraction root.
    Hardlink {
        /// The hardlink target path (not yet validated).
        target: PathBuf,
    },

    /// Device node or FIFO.
    Special,

    /// Format bookkeeping (PAX or GNU extension headers) with no filesystem
    /// counterpart.
    Metadata,
}

impl EntryType {
    /// Maps a tar header type onto a member kind.
    ///
    /// Unknown header types are treated as regular files, as tar readers
    /// conventionally do.
    #[must_use]
    pub fn from_tar(kind: tar::EntryType, link_target: Option<PathBuf>) -> Self {
        use tar::EntryType as Tar;

        match kind {
            Tar::Directory => Self::Directory,
            Tar::Symlink => Self::Symlink {
                target: link_target.unwrap_or_default(),
            },
            Tar::Link => Self::Hardlink {
                target: link_target.unwrap_or_default(),
            },
            Tar::Char | Tar::Block | Tar::Fifo => Self::Special,
            Tar::XGlobalHeader | Tar::XHeader | Tar::GNULongName | Tar::GNULongLink => {
                Self::Metadata
            }
            _ => Self::File,
        }
    }

    /// Returns `true` for symlinks and hardlinks.
    #[must_use]
    pub const fn is_link(&self) -> bool {
        matches!(self, Self::Symlink { .. } | Self::Hardlink { .. })
    }

    /// Returns `true` if the member creates nothing on disk.
    #[must_use]
    pub const fn is_metadata(&self) -> bool {
        matches!(self, Self::Metadata)
    }

    /// Short lowercase name used in reports and messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink { .. } => "symlink",
            Self::Hardlink { .. } => "hardlink",
            Self::Special => "special file",
            Self::Metadata => "metadata",
        }
    }
}
