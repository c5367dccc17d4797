use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// `db_override` comes from `--db` or `SPROUT_DB`. Without it the database
    /// lives in the platform data directory.
    pub fn load(db_override: Option<PathBuf>) -> Result<Self> {
        let (data_dir, db_path) = if let Some(path) = db_override {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            (dir, path)
        } else {
            let proj_dirs = ProjectDirs::from("", "", "sprout")
                .context("Could not determine home directory")?;
            let dir = proj_dirs.data_dir().to_path_buf();
            let path = dir.join("sprout.db");
            (dir, path)
        };

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config { db_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("plants.db");
        let config = Config::load(Some(path.clone())).unwrap();
        assert_eq!(config.db_path, path);
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_bare_file_name_is_kept() {
        let config = Config::load(Some(PathBuf::from("sprout-test.db"))).unwrap();
        assert_eq!(config.db_path, PathBuf::from("sprout-test.db"));
    }
}
