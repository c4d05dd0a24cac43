//! Numbered archive discovery and load order.

use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

/// Lists `pak0.pak`, `pak1.pak`, … in `location`, lowest number first.
///
/// Discovery stops at the first number that is not a regular file, so
/// `pak3.pak` is never seen when `pak2.pak` is missing.
///
/// # Examples
///
/// ```no_run
/// use pakfile_core::duplicates::discover_archives;
///
/// for pak in discover_archives("quake/id1".as_ref()) {
///     println!("{}", pak.display());
/// }
/// ```
#[must_use]
pub fn discover_archives(location: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for index in 0.. {
        let candidate = location.join(format!("pak{index}.pak"));
        if !candidate.is_file() {
            break;
        }
        found.push(candidate);
    }
    debug!(location = %location.display(), count = found.len(), "discovered archives");
    found
}

/// Archives across `locations` in descending load priority.
///
/// Within a location the highest-numbered archive comes first; locations
/// keep the caller's order, so every archive of the first location outranks
/// those of the second.
#[must_use]
pub fn load_order<P: AsRef<Path>>(locations: &[P]) -> Vec<PathBuf> {
    locations
        .iter()
        .flat_map(|location| {
            let mut found = discover_archives(location.as_ref());
            found.reverse();
            found
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::write_pak;
    use tempfile::TempDir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_stops_at_gap() {
        let temp = TempDir::new().unwrap();
        for name in ["pak0.pak", "pak1.pak", "pak3.pak"] {
            write_pak(temp.path(), name, &[]);
        }
        assert_eq!(names(&discover_archives(temp.path())), ["pak0.pak", "pak1.pak"]);
    }

    #[test]
    fn test_directory_is_not_an_archive() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("pak0.pak")).unwrap();
        write_pak(temp.path(), "pak1.pak", &[]);
        assert!(discover_archives(temp.path()).is_empty());
    }

    #[test]
    fn test_missing_location() {
        let temp = TempDir::new().unwrap();
        assert!(discover_archives(&temp.path().join("nope")).is_empty());
    }

    #[test]
    fn test_load_order_reverses_per_location() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("id1");
        let mission = temp.path().join("hipnotic");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&mission).unwrap();
        for name in ["pak0.pak", "pak1.pak"] {
            write_pak(&base, name, &[]);
        }
        write_pak(&mission, "pak0.pak", &[]);

        let order = load_order(&[&base, &mission]);
        assert_eq!(
            order,
            [base.join("pak1.pak"), base.join("pak0.pak"), mission.join("pak0.pak")]
        );
    }
}
