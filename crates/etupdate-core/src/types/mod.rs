//! Type-safe wrappers for extraction.
//!
//! These newtypes enforce validation at the type level: a `SafePath` or
//! `DestDir` can only be obtained by passing its checks.

pub mod dest_dir;
pub mod entry_type;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use entry_type::EntryType;
pub use safe_path::SafePath;
