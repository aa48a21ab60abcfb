//! Security validation for archive members.

pub mod link;
pub mod safety;

// Re-export public types and functions
pub use link::validate_hardlink;
pub use link::validate_symlink;
pub use link::validate_symlink_chain;
pub use safety::check_archive_safety;
pub use safety::validate_member;
