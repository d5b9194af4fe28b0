//! Saving the finished plan

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use eyre::{Context, Result};
use tracing::{debug, info};

/// Destination reduced to alphanumerics, `-` and `_`, spaces become `_`
pub fn safe_destination(destination: &str) -> String {
    destination
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// `travel_plan_<destination>_<YYYYmmdd_HHMMSS>.txt`
pub fn plan_filename(destination: &str, now: NaiveDateTime) -> String {
    format!(
        "travel_plan_{}_{}.txt",
        safe_destination(destination),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Write the plan into `dir`, returning the file path
pub fn save_plan(dir: &Path, plan: &str, destination: &str) -> Result<PathBuf> {
    debug!(?dir, %destination, "save_plan: called");
    fs::create_dir_all(dir).context(format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(plan_filename(destination, chrono::Local::now().naive_local()));
    fs::write(&path, plan).context(format!("Failed to write plan to {}", path.display()))?;
    info!(path = %path.display(), "Saved travel plan");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_safe_destination_strips_punctuation() {
        assert_eq!(safe_destination("Paris, France"), "Paris_France");
        assert_eq!(safe_destination("  São Paulo!  "), "São_Paulo");
        assert_eq!(safe_destination("new-york_city"), "new-york_city");
        assert_eq!(safe_destination("../../etc"), "etc");
    }

    #[test]
    fn test_plan_filename_format() {
        assert_eq!(
            plan_filename("Kyoto, Japan", at(7, 5, 3)),
            "travel_plan_Kyoto_Japan_20240309_070503.txt"
        );
    }

    #[test]
    fn test_save_plan_writes_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("plans");
        let path = save_plan(&out, "Day 1: arrive", "Lisbon").unwrap();

        assert!(path.starts_with(&out));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("travel_plan_Lisbon_"));
        assert!(name.ends_with(".txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "Day 1: arrive");
    }
}
