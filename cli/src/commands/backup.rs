use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use tracing::info;

use sprout_core::backup::{ExportData, backup_file_name};
use sprout_core::service::SproutService;

fn write_backup(path: &Path, data: &ExportData) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write backup: {}", path.display()))?;
    info!(path = %path.display(), plants = data.plants.len(), "wrote backup");
    Ok(())
}

pub(crate) fn cmd_export(svc: &SproutService, output: Option<PathBuf>, json: bool) -> Result<()> {
    let path =
        output.unwrap_or_else(|| PathBuf::from(backup_file_name(Local::now().date_naive())));
    let data = svc.export(Utc::now());
    write_backup(&path, &data)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "path": path.display().to_string(),
                "plants": data.plants.len(),
                "completed": data.completed_task_ids.len(),
            })
        );
    } else {
        println!(
            "Exported {} plants and {} completed tasks to {}",
            data.plants.len(),
            data.completed_task_ids.len(),
            path.display()
        );
    }

    Ok(())
}

pub(crate) fn cmd_import(svc: &mut SproutService, path: &Path, json: bool) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup: {}", path.display()))?;
    let summary = svc
        .import_json(&raw)
        .with_context(|| format!("Import of {} failed, nothing was changed", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Imported {} plants and {} completed tasks",
            summary.plants_imported, summary.completed_imported
        );
        if summary.profile_applied {
            println!("  Profile restored");
        }
        if summary.notes_applied {
            println!("  Notes restored");
        }
    }

    Ok(())
}

pub(crate) fn cmd_reset(svc: &mut SproutService, yes: bool, json: bool) -> Result<()> {
    if !yes {
        bail!(
            "Reset replaces all plants with the default one and clears completion history. \
             Re-run with --yes to confirm"
        );
    }

    svc.reset(Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(svc.plants())?);
    } else {
        println!("Reset complete. Notes, profile and theme were kept.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sprout_core::store::MemoryStore;

    fn service() -> SproutService {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap();
        SproutService::with_store(Box::new(MemoryStore::new()), now).unwrap()
    }

    #[test]
    fn test_export_file_imports_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");

        let mut source = service();
        source.set_notes("mist on Mondays").unwrap();
        cmd_export(&source, Some(path.clone()), true).unwrap();

        let mut target = service();
        target.set_notes("old").unwrap();
        cmd_import(&mut target, &path, true).unwrap();
        assert_eq!(target.notes(), "mist on Mondays");
        assert_eq!(target.plants(), source.plants());
    }

    #[test]
    fn test_import_bad_file_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"foo": 1}"#).unwrap();

        let mut svc = service();
        let before = svc.state().clone();
        assert!(cmd_import(&mut svc, &path, false).is_err());
        assert_eq!(svc.state(), &before);

        assert!(cmd_import(&mut svc, &dir.path().join("missing.json"), false).is_err());
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let mut svc = service();
        svc.set_notes("x").unwrap();
        assert!(cmd_reset(&mut svc, false, false).is_err());
        cmd_reset(&mut svc, true, true).unwrap();
        assert_eq!(svc.plants().len(), 1);
        assert_eq!(svc.notes(), "x");
    }
}
