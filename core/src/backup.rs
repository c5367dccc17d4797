use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::ledger::CompletionLedger;
use crate::models::{Plant, UserProfile};
use crate::state::AppState;

pub const BACKUP_VERSION: u32 = 1;

const REQUIRED_FIELDS: [&str; 2] = ["plants", "completedTaskIds"];

/// Errors that can occur while reading a backup document.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("backup is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("backup must be a JSON object")]
    NotAnObject,

    #[error("backup is missing required field {0:?}")]
    MissingField(&'static str),

    #[error("backup contains an invalid record: {0}")]
    InvalidRecord(#[source] serde_json::Error),
}

/// Full snapshot of user data, as written by `export` and read by `import`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    #[serde(default)]
    pub version: u32,
    pub plants: Vec<Plant>,
    pub completed_task_ids: CompletionLedger,
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
    #[serde(default)]
    pub global_notes: Option<String>,
    #[serde(default)]
    pub exported_at: Option<String>,
}

impl ExportData {
    #[must_use]
    pub fn snapshot(state: &AppState, now: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_VERSION,
            plants: state.plants.clone(),
            completed_task_ids: state.ledger.clone(),
            user_profile: Some(state.profile.clone()),
            global_notes: Some(state.notes.clone()),
            exported_at: Some(now.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub plants_imported: usize,
    pub completed_imported: usize,
    pub profile_applied: bool,
    pub notes_applied: bool,
}

/// Parse and validate a backup document without touching any state.
pub fn parse_backup(json: &str) -> Result<ExportData, ImportError> {
    let value: Value = serde_json::from_str(json).map_err(ImportError::Malformed)?;
    let object = value.as_object().ok_or(ImportError::NotAnObject)?;
    for field in REQUIRED_FIELDS {
        if object.get(field).is_none_or(Value::is_null) {
            return Err(ImportError::MissingField(field));
        }
    }
    serde_json::from_value(value).map_err(ImportError::InvalidRecord)
}

/// Replace registry and ledger with the backup's. Profile is replaced when
/// present, notes only when non-empty.
pub fn apply_backup(state: &mut AppState, data: ExportData) -> ImportSummary {
    let summary = ImportSummary {
        plants_imported: data.plants.len(),
        completed_imported: data.completed_task_ids.len(),
        profile_applied: data.user_profile.is_some(),
        notes_applied: data.global_notes.as_deref().is_some_and(|n| !n.is_empty()),
    };

    state.plants = data.plants;
    state.ledger = data.completed_task_ids;
    if let Some(profile) = data.user_profile {
        state.profile = profile;
    }
    if summary.notes_applied {
        state.notes = data.global_notes.unwrap_or_default();
    }

    info!(
        plants = summary.plants_imported,
        completed = summary.completed_imported,
        "applied backup"
    );
    summary
}

/// `sprout_backup_DDMMYYYY.json`
#[must_use]
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("sprout_backup_{}.json", date.format("%d%m%Y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskKey, TaskKind};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_snapshot_shape() {
        let mut state = AppState::fresh(now());
        state.notes = "hello".to_string();
        let data = ExportData::snapshot(&state, now());
        let json = serde_json::to_value(&data).unwrap();

        assert!(json["plants"].is_array());
        assert!(json["completedTaskIds"].is_array());
        assert_eq!(json["globalNotes"], "hello");
        assert_eq!(json["userProfile"]["name"], "");
        assert_eq!(json["exportedAt"], "2024-06-15T08:00:00+00:00");
    }

    #[test]
    fn test_parse_requires_plants_and_ledger() {
        assert!(matches!(
            parse_backup(r#"{"foo": 1}"#),
            Err(ImportError::MissingField("plants"))
        ));
        assert!(matches!(
            parse_backup(r#"{"plants": []}"#),
            Err(ImportError::MissingField("completedTaskIds"))
        ));
        assert!(matches!(
            parse_backup(r#"{"plants": null, "completedTaskIds": []}"#),
            Err(ImportError::MissingField("plants"))
        ));
        assert!(matches!(parse_backup("[1, 2]"), Err(ImportError::NotAnObject)));
        assert!(matches!(parse_backup("{oops"), Err(ImportError::Malformed(_))));
        assert!(matches!(
            parse_backup(r#"{"plants": [{"id": 3}], "completedTaskIds": []}"#),
            Err(ImportError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_minimal_backup_clears_registry_and_ledger() {
        let mut state = AppState::fresh(now());
        state.notes = "kept".to_string();
        state.ledger.insert(TaskKey::new(
            TaskKind::Watering,
            "1",
            NaiveDate::from_ymd_opt(2024, 6, 19).unwrap(),
        ));

        let data = parse_backup(r#"{"plants": [], "completedTaskIds": []}"#).unwrap();
        let summary = apply_backup(&mut state, data);

        assert!(state.plants.is_empty());
        assert!(state.ledger.is_empty());
        assert_eq!(state.notes, "kept");
        assert!(!summary.profile_applied);
        assert!(!summary.notes_applied);
    }

    #[test]
    fn test_empty_notes_do_not_overwrite() {
        let mut state = AppState::fresh(now());
        state.notes = "kept".to_string();
        let data = parse_backup(
            r#"{"plants": [], "completedTaskIds": [], "globalNotes": "", "userProfile": {"name": "Rui"}}"#,
        )
        .unwrap();
        let summary = apply_backup(&mut state, data);
        assert_eq!(state.notes, "kept");
        assert_eq!(state.profile.name, "Rui");
        assert!(summary.profile_applied);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut source = AppState::fresh(now());
        source.notes = "fertilize at half strength".to_string();
        source.profile.email = "me@example.com".to_string();
        source.ledger.insert(TaskKey::new(
            TaskKind::Fertilization,
            "1",
            NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
        ));

        let json = serde_json::to_string_pretty(&ExportData::snapshot(&source, now())).unwrap();
        let mut target = AppState::fresh(now() - chrono::Duration::days(3));
        apply_backup(&mut target, parse_backup(&json).unwrap());

        assert_eq!(target.plants, source.plants);
        assert_eq!(target.ledger, source.ledger);
        assert_eq!(target.profile, source.profile);
        assert_eq!(target.notes, source.notes);
    }

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(backup_file_name(date), "sprout_backup_07032024.json");
    }
}
