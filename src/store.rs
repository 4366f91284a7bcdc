use std::{fs, path::Path};

use thiserror::Error;

use crate::models::Db;

pub const DB_PATH: &str = "data/db.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_db() -> Result<Db, StoreError> {
    load_db_from(Path::new(DB_PATH))
}

pub fn save_db(db: &Db) -> Result<(), StoreError> {
    save_db_to(Path::new(DB_PATH), db)
}

pub fn load_db_from(path: &Path) -> Result<Db, StoreError> {
    let text = fs::read_to_string(path)?;
    let db: Db = serde_json::from_str(&text)?;
    Ok(db)
}

// Write-then-rename so a crash mid-save never truncates the db.
pub fn save_db_to(path: &Path, db: &Db) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(db)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp_path, text)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkHours;
    use uuid::Uuid;

    fn sample_db() -> Db {
        Db {
            settings: WorkHours {
                day_start: "09:00".to_string(),
                day_end: "17:00".to_string(),
                work_days: vec![1, 2, 3, 4, 5],
                break_min: 10,
                tz_offset_min: 0,
            },
            tasks: Vec::new(),
            blocks: Vec::new(),
        }
    }

    #[test]
    fn save_then_load_roundtrips() {
        let path = std::env::temp_dir().join(format!("blocksched-{}.json", Uuid::new_v4()));
        let db = sample_db();
        save_db_to(&path, &db).expect("save");
        let loaded = load_db_from(&path).expect("load");
        assert_eq!(loaded.settings, db.settings);
        assert!(loaded.tasks.is_empty());
        assert!(loaded.blocks.is_empty());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("blocksched-{}.json", Uuid::new_v4()));
        match load_db_from(&path) {
            Err(StoreError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn store_error_display_names_the_cause() {
        let path = std::env::temp_dir().join(format!("blocksched-{}.json", Uuid::new_v4()));
        let error = load_db_from(&path).expect_err("missing file");
        assert!(error.to_string().starts_with("I/O error:"));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let path = std::env::temp_dir().join(format!("blocksched-{}.json", Uuid::new_v4()));
        fs::write(&path, "{ not json").expect("write");
        match load_db_from(&path) {
            Err(StoreError::Json(_)) => {}
            other => panic!("expected json error, got {other:?}"),
        }
        let _ = fs::remove_file(&path);
    }
}
