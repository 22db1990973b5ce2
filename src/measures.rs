//! Team measures loader
//!
//! The scouting data is stored as a Feather (Arrow IPC) file with one row
//! per observed event: `team`, `match`, `phase`, `task`, `hit`.

use crate::error::{Error, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

pub const TEAM: &str = "team";
pub const MATCH: &str = "match";
pub const PHASE: &str = "phase";
pub const TASK: &str = "task";
pub const HIT: &str = "hit";

/// Columns every measures table must carry
pub const REQUIRED_COLUMNS: [&str; 5] = [TEAM, MATCH, PHASE, TASK, HIT];

/// Read the measures table from a Feather file.
pub fn load_team_measures(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|source| Error::Storage {
        path: path.to_path_buf(),
        source,
    })?;

    let df = IpcReader::new(file)
        .finish()
        .map_err(|source| Error::Format {
            path: path.to_path_buf(),
            source,
        })?;

    require_columns(&df, &REQUIRED_COLUMNS)?;
    log::debug!("Loaded {} measure rows from {}", df.height(), path.display());
    Ok(df)
}

/// Fail with `MissingColumns` unless every name in `columns` is present.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    let missing: Vec<String> = columns
        .iter()
        .filter(|name| df.get_column_index(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingColumns(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_feather(dir: &TempDir, name: &str, df: &mut DataFrame) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        IpcWriter::new(&mut file).finish(df).unwrap();
        path
    }

    #[test]
    fn test_load_round_trips_columns() {
        let dir = TempDir::new().unwrap();
        let mut df = df!(
            TEAM => [254i64, 254, 1678],
            MATCH => [1i64, 1, 2],
            PHASE => ["auto", "tele", "auto"],
            TASK => ["cube_auto_high", "cube_tele_mid", "cone_auto_low"],
            HIT => [1i64, 2, 1]
        )
        .unwrap();
        let path = write_feather(&dir, "measures.feather", &mut df);

        let loaded = load_team_measures(&path).unwrap();
        assert_eq!(loaded.height(), 3);
        assert!(loaded.equals(&df));
    }

    #[test]
    fn test_missing_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let err = load_team_measures(&dir.path().join("nope.feather")).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
    }

    #[test]
    fn test_garbage_file_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.feather");
        std::fs::write(&path, b"team,match\n1,2\n").unwrap();

        let err = load_team_measures(&path).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn test_missing_columns_rejected_at_load() {
        let dir = TempDir::new().unwrap();
        let mut df = df!(
            TEAM => [1i64],
            MATCH => [1i64],
            PHASE => ["auto"]
        )
        .unwrap();
        let path = write_feather(&dir, "partial.feather", &mut df);

        match load_team_measures(&path).unwrap_err() {
            Error::MissingColumns(cols) => assert_eq!(cols, vec!["task", "hit"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_require_columns_accepts_superset() {
        let df = df!(
            "a" => [1i64],
            "b" => [2i64]
        )
        .unwrap();
        assert!(require_columns(&df, &["a"]).is_ok());
        assert!(require_columns(&df, &["a", "b"]).is_ok());
        assert!(require_columns(&df, &["c"]).is_err());
    }
}
