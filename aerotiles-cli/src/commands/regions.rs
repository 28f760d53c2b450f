//! Region list commands.

use std::io::Write;
use std::path::Path;

use aerotiles::region::{load_regions, region_names};

use crate::error::CliError;

/// Region list read when `--regions` is not given.
pub const DEFAULT_REGIONS_FILE: &str = "pipeline-config.json";

/// Prints one `prefix:bbox:zoom` descriptor per region.
pub fn list(path: &Path, out: &mut impl Write) -> Result<(), CliError> {
    for region in load_regions(path)? {
        writeln!(out, "{}", region.descriptor())?;
    }
    Ok(())
}

/// Prints the sorted, de-duplicated region prefixes on one line.
pub fn names(path: &Path, out: &mut impl Write) -> Result<(), CliError> {
    let regions = load_regions(path)?;
    writeln!(out, "{}", region_names(&regions))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn regions_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join(DEFAULT_REGIONS_FILE);
        std::fs::write(
            &path,
            r#"[
                {"oaci_prefix": "LS", "bbox": [5.96, 45.82, 10.49, 47.81], "zoom": [7, 12]},
                {"oaci_prefix": "ED", "bbox": [5.87, 47.27, 15.04, 55.06], "zoom": [7, 11]},
                {"oaci_prefix": "LS", "bbox": [6.0, 46.0, 7.0, 47.0], "zoom": [12, 13]}
            ]"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_list_prints_descriptors_in_file_order() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        list(&regions_file(&dir), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "LS:5.96,45.82,10.49,47.81:7,12");
        assert!(lines[1].starts_with("ED:"));
    }

    #[test]
    fn test_names_sorted_and_unique() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        names(&regions_file(&dir), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ED, LS\n");
    }

    #[test]
    fn test_missing_file_is_region_error() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let err = list(&dir.path().join("missing.json"), &mut out).unwrap_err();
        assert!(matches!(err, CliError::Region(_)));
    }
}
