//! Mapping entry paths onto the extraction root.

use std::path::Path;
use std::path::PathBuf;

use crate::PakError;
use crate::Result;

/// Joins an archive entry path onto `root`.
///
/// Entry paths are split on `/`. Empty and `.` segments are dropped; a
/// leading `/`, a `..` segment, a drive-style segment or a path that ends up
/// empty is refused, so the result always stays below `root`.
///
/// # Errors
///
/// Returns `UnsafePath` for paths that would escape `root`.
///
/// # Examples
///
/// ```
/// use pakfile_core::extraction::destination_for;
/// use std::path::Path;
///
/// let dest = destination_for(Path::new("out"), "maps//./e1m1.bsp")?;
/// assert_eq!(dest, Path::new("out/maps/e1m1.bsp"));
///
/// assert!(destination_for(Path::new("out"), "../autoexec.cfg").is_err());
/// # Ok::<(), pakfile_core::PakError>(())
/// ```
pub fn destination_for(root: &Path, entry_path: &str) -> Result<PathBuf> {
    let unsafe_path = || PakError::UnsafePath {
        path: entry_path.to_string(),
    };

    if entry_path.starts_with('/') || entry_path.starts_with('\\') {
        return Err(unsafe_path());
    }

    let mut dest = root.to_path_buf();
    let mut depth = 0usize;
    for segment in entry_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(unsafe_path()),
            s if s.contains(['\\', ':']) => return Err(unsafe_path()),
            s => {
                dest.push(s);
                depth += 1;
            }
        }
    }

    if depth == 0 {
        return Err(unsafe_path());
    }
    Ok(dest)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path() {
        let dest = destination_for(Path::new("/tmp/out"), "sound/doors/latch2.wav").unwrap();
        assert_eq!(dest, PathBuf::from("/tmp/out/sound/doors/latch2.wav"));
    }

    #[test]
    fn test_dot_segments_dropped() {
        let dest = destination_for(Path::new("out"), "./gfx//palette.lmp").unwrap();
        assert_eq!(dest, PathBuf::from("out/gfx/palette.lmp"));
    }

    #[test]
    fn test_parent_traversal_rejected() {
        for path in ["../x", "maps/../../x", ".."] {
            assert!(
                matches!(
                    destination_for(Path::new("out"), path),
                    Err(PakError::UnsafePath { .. })
                ),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn test_absolute_rejected() {
        assert!(destination_for(Path::new("out"), "/etc/passwd").is_err());
        assert!(destination_for(Path::new("out"), "\\windows\\win.ini").is_err());
        assert!(destination_for(Path::new("out"), "c:/autoexec.bat").is_err());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(destination_for(Path::new("out"), "").is_err());
        assert!(destination_for(Path::new("out"), "./").is_err());
    }
}
