use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::backup::{self, ExportData, ImportSummary};
use crate::calendar::{self, MonthGrid};
use crate::db::Database;
use crate::models::{Appearance, CareTask, NewPlant, Plant, TaskKey, UserProfile};
use crate::schedule::{self, TaskStats};
use crate::state::AppState;
use crate::store::{KeyValueStore, MemoryStore};

/// Entry point for every front end. Owns the store and the loaded state, and
/// writes each change through before returning.
pub struct SproutService {
    store: Box<dyn KeyValueStore>,
    state: AppState,
}

impl SproutService {
    pub fn open(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Self::with_store(Box::new(db), Utc::now())
    }

    pub fn new_in_memory() -> Result<Self> {
        Self::with_store(Box::new(MemoryStore::new()), Utc::now())
    }

    pub fn with_store(store: Box<dyn KeyValueStore>, now: DateTime<Utc>) -> Result<Self> {
        let state = AppState::load(store.as_ref(), now)?;
        Ok(Self { store, state })
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    // --- Plants ---

    #[must_use]
    pub fn plants(&self) -> &[Plant] {
        &self.state.plants
    }

    pub fn get_plant(&self, id: &str) -> Result<&Plant> {
        self.state
            .plants
            .iter()
            .find(|p| p.id == id)
            .with_context(|| format!("Plant not found: {id}"))
    }

    #[must_use]
    pub fn search_plants(&self, query: &str) -> Vec<&Plant> {
        self.state.plants.iter().filter(|p| p.matches(query)).collect()
    }

    pub fn add_plant(&mut self, plant: NewPlant, now: DateTime<Utc>) -> Result<Plant> {
        crate::models::validate_new_plant(&plant)?;
        let plant = plant.into_plant(Uuid::new_v4().to_string(), now)?;
        self.state.plants.push(plant.clone());
        self.state.save_plants(self.store.as_ref())?;
        info!(id = %plant.id, name = %plant.name, "added plant");
        Ok(plant)
    }

    // --- Tasks ---

    #[must_use]
    pub fn tasks<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<CareTask> {
        schedule::generate_tasks(&self.state.plants, &self.state.ledger, now)
    }

    #[must_use]
    pub fn tasks_on<Tz: TimeZone>(&self, now: &DateTime<Tz>, date: NaiveDate) -> Vec<CareTask> {
        let tasks = self.tasks(now);
        schedule::tasks_on(&tasks, date).into_iter().cloned().collect()
    }

    #[must_use]
    pub fn stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TaskStats {
        schedule::summarize(&self.tasks(now), &self.state.ledger)
    }

    pub fn month<Tz: TimeZone>(&self, now: &DateTime<Tz>, year: i32, month: u32) -> Result<MonthGrid> {
        calendar::month_grid(year, month, &self.tasks(now))
    }

    /// Toggle the task with `key` among the tasks visible at `now`.
    ///
    /// Returns the new completed state, or `None` if no such task is visible.
    pub fn toggle_task<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
        key: &TaskKey,
    ) -> Result<Option<bool>> {
        let tasks = self.tasks(now);
        let state = &mut self.state;
        let Some(completed) = schedule::toggle_task(
            &mut state.plants,
            &mut state.ledger,
            &tasks,
            key,
            &now.timezone(),
        ) else {
            debug!(%key, "no visible task with this key");
            return Ok(None);
        };

        self.state.save_schedule(self.store.as_ref())?;
        info!(%key, completed, "toggled task");
        Ok(Some(completed))
    }

    // --- Notes, profile & appearance ---

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.state.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<()> {
        self.state.notes = notes.into();
        self.state.save_notes(self.store.as_ref())
    }

    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.state.profile
    }

    pub fn set_profile(&mut self, profile: UserProfile) -> Result<()> {
        self.state.profile = profile;
        self.state.save_profile(self.store.as_ref())
    }

    #[must_use]
    pub fn appearance(&self) -> Appearance {
        self.state.appearance
    }

    pub fn set_appearance(&mut self, appearance: Appearance) -> Result<()> {
        self.state.appearance = appearance;
        self.state.save_appearance(self.store.as_ref())
    }

    // --- Backup ---

    #[must_use]
    pub fn export(&self, now: DateTime<Utc>) -> ExportData {
        ExportData::snapshot(&self.state, now)
    }

    /// Replace state with a backup document. Nothing changes unless the whole
    /// document is valid and every record is written.
    pub fn import_json(&mut self, json: &str) -> Result<ImportSummary> {
        let data = backup::parse_backup(json)?;
        let mut next = self.state.clone();
        let summary = backup::apply_backup(&mut next, data);
        next.save_all(self.store.as_ref())
            .context("Failed to save imported data")?;
        self.state = next;
        Ok(summary)
    }

    pub fn reset(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.state.reset(self.store.as_ref(), now)
    }
}
