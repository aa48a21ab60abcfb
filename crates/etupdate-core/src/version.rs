//! Local version file handling.

use std::fs;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::Result;
use crate::UpdateError;

/// Parses a version number, ignoring surrounding whitespace.
///
/// # Examples
///
/// ```
/// use etupdate_core::version::parse_version;
///
/// assert_eq!(parse_version("9431\n"), Some(9431));
/// assert_eq!(parse_version("-1"), None);
/// assert_eq!(parse_version(""), None);
/// ```
#[must_use]
pub fn parse_version(text: &str) -> Option<u64> {
    let text = text.trim();
    // u64::from_str accepts a leading '+'
    if text.starts_with('+') {
        return None;
    }
    text.parse().ok()
}

/// Reads the installed version number.
///
/// A missing file means nothing has been installed yet and yields 0.
///
/// # Errors
///
/// Returns `UpdateError::CorruptVersionFile` if the file does not hold a
/// non-negative integer, or `UpdateError::Io` if it cannot be read.
pub fn read_current_version(path: &Path) -> Result<u64> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(UpdateError::CorruptVersionFile {
                path: path.to_path_buf(),
                content: String::from_utf8_lossy(&fs::read(path)?).into_owned(),
            });
        }
        Err(e) => return Err(UpdateError::Io(e)),
    };

    parse_version(&content).ok_or_else(|| UpdateError::CorruptVersionFile {
        path: path.to_path_buf(),
        content,
    })
}

/// Records `version` as the installed version number.
///
/// The number is written to a temporary file in the same directory which is
/// then renamed over `path`, so readers see either the old or the new value.
/// The parent directory is created if needed.
///
/// # Errors
///
/// Returns `UpdateError::Io` if the directory, temporary file or rename fails.
pub fn write_current_version(path: &Path, version: u64) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(version.to_string().as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| UpdateError::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("0"), Some(0));
        assert_eq!(parse_version("  42 \r\n"), Some(42));
        assert_eq!(parse_version("+5"), None);
        assert_eq!(parse_version("4.2"), None);
        assert_eq!(parse_version("abc"), None);
        assert_eq!(parse_version("   "), None);
    }

    #[test]
    fn test_read_missing_file_is_zero() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("rules").join("eto_version");
        assert_eq!(read_current_version(&path).unwrap(), 0);
    }

    #[test]
    fn test_read_existing_version() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("eto_version");
        fs::write(&path, "9431").unwrap();
        assert_eq!(read_current_version(&path).unwrap(), 9431);
    }

    #[test]
    fn test_read_tolerates_trailing_newline() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("eto_version");
        fs::write(&path, "17\n").unwrap();
        assert_eq!(read_current_version(&path).unwrap(), 17);
    }

    #[test]
    fn test_read_corrupt_file() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("eto_version");
        fs::write(&path, "not-a-number").unwrap();

        let err = read_current_version(&path).unwrap_err();
        assert!(matches!(
            err,
            UpdateError::CorruptVersionFile { ref content, .. } if content == "not-a-number"
        ));
    }

    #[test]
    fn test_read_empty_file_is_corrupt() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("eto_version");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            read_current_version(&path),
            Err(UpdateError::CorruptVersionFile { .. })
        ));
    }

    #[test]
    fn test_read_non_utf8_is_corrupt() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("eto_version");
        fs::write(&path, [0xff, 0xfe, 0x31]).unwrap();
        assert!(matches!(
            read_current_version(&path),
            Err(UpdateError::CorruptVersionFile { .. })
        ));
    }

    #[test]
    fn test_write_creates_parent_and_has_no_newline() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("rules").join("eto_version");

        write_current_version(&path, 5).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "5");
        assert_eq!(read_current_version(&path).unwrap(), 5);
    }

    #[test]
    fn test_write_overwrites_and_leaves_no_temp_files() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("eto_version");
        fs::write(&path, "3").unwrap();

        write_current_version(&path, 4).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "4");
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
