//! Application state and its persisted form.
//!
//! Every value is stored under its own key as a version-tagged envelope
//! `{"version": 1, "data": ...}`. Values written before envelopes existed
//! (plain JSON, or a raw string for notes, theme and palette) are read as
//! version 0, migrated, and written back in the current format on load.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ledger::CompletionLedger;
use crate::models::{Appearance, Palette, Plant, Theme, UserProfile, default_registry};
use crate::store::KeyValueStore;

pub const PLANTS_KEY: &str = "plants";
pub const COMPLETED_KEY: &str = "completed";
pub const NOTES_KEY: &str = "global_notes";
pub const PROFILE_KEY: &str = "profile";
pub const THEME_KEY: &str = "theme";
pub const PALETTE_KEY: &str = "palette";

pub const RECORD_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

enum Record<T> {
    Missing,
    Current(T),
    Migrated(T),
    Malformed,
}

fn encode<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string(&EnvelopeRef {
        version: RECORD_VERSION,
        data,
    })
    .context("Failed to encode record")
}

fn read_record<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    legacy: fn(&str) -> Option<T>,
) -> Result<Record<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(Record::Missing);
    };

    if let Ok(envelope) = serde_json::from_str::<Envelope<T>>(&raw) {
        if envelope.version == RECORD_VERSION {
            return Ok(Record::Current(envelope.data));
        }
        warn!(key, version = envelope.version, "unsupported record version");
        return Ok(Record::Malformed);
    }

    match legacy(&raw) {
        Some(value) => Ok(Record::Migrated(value)),
        None => {
            warn!(key, "stored record is malformed");
            Ok(Record::Malformed)
        }
    }
}

fn legacy_json<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_str(raw).ok()
}

#[allow(clippy::unnecessary_wraps)]
fn legacy_text(raw: &str) -> Option<String> {
    Some(raw.to_string())
}

fn legacy_theme(raw: &str) -> Option<Theme> {
    raw.parse().ok()
}

fn legacy_palette(raw: &str) -> Option<Palette> {
    raw.parse().ok()
}

/// Everything the user owns, loaded once at start and saved on change.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub plants: Vec<Plant>,
    pub ledger: CompletionLedger,
    pub notes: String,
    pub profile: UserProfile,
    pub appearance: Appearance,
}

impl AppState {
    #[must_use]
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            plants: default_registry(now),
            ledger: CompletionLedger::new(),
            notes: String::new(),
            profile: UserProfile::default(),
            appearance: Appearance::default(),
        }
    }

    /// Load every record from `store`.
    ///
    /// Missing or malformed records fall back to their defaults; plants fall
    /// back to the built-in registry. Legacy records are rewritten in the
    /// current format. Only store failures are errors.
    pub fn load(store: &dyn KeyValueStore, now: DateTime<Utc>) -> Result<Self> {
        let mut state = Self::fresh(now);
        let mut migrated: Vec<(&str, String)> = Vec::new();

        match read_record(store, PLANTS_KEY, legacy_json::<Vec<Plant>>)? {
            Record::Current(plants) => state.plants = plants,
            Record::Migrated(plants) => {
                migrated.push((PLANTS_KEY, encode(&plants)?));
                state.plants = plants;
            }
            Record::Malformed => {
                warn!("falling back to the default plant registry");
                migrated.push((PLANTS_KEY, encode(&state.plants)?));
            }
            Record::Missing => migrated.push((PLANTS_KEY, encode(&state.plants)?)),
        }

        match read_record(store, COMPLETED_KEY, legacy_json::<CompletionLedger>)? {
            Record::Current(ledger) => state.ledger = ledger,
            Record::Migrated(ledger) => {
                migrated.push((COMPLETED_KEY, encode(&ledger)?));
                state.ledger = ledger;
            }
            Record::Malformed => warn!("discarding unreadable completion ledger"),
            Record::Missing => {}
        }

        match read_record(store, NOTES_KEY, legacy_text)? {
            Record::Current(notes) => state.notes = notes,
            Record::Migrated(notes) => {
                migrated.push((NOTES_KEY, encode(&notes)?));
                state.notes = notes;
            }
            Record::Malformed | Record::Missing => {}
        }

        match read_record(store, PROFILE_KEY, legacy_json::<UserProfile>)? {
            Record::Current(profile) => state.profile = profile,
            Record::Migrated(profile) => {
                migrated.push((PROFILE_KEY, encode(&profile)?));
                state.profile = profile;
            }
            Record::Malformed => warn!("discarding unreadable user profile"),
            Record::Missing => {}
        }

        match read_record(store, THEME_KEY, legacy_theme)? {
            Record::Current(theme) => state.appearance.theme = theme,
            Record::Migrated(theme) => {
                migrated.push((THEME_KEY, encode(&theme)?));
                state.appearance.theme = theme;
            }
            Record::Malformed | Record::Missing => {}
        }

        match read_record(store, PALETTE_KEY, legacy_palette)? {
            Record::Current(palette) => state.appearance.palette = palette,
            Record::Migrated(palette) => {
                migrated.push((PALETTE_KEY, encode(&palette)?));
                state.appearance.palette = palette;
            }
            Record::Malformed | Record::Missing => {}
        }

        if !migrated.is_empty() {
            let keys: Vec<&str> = migrated.iter().map(|(k, _)| *k).collect();
            info!(?keys, "wrote migrated or initial records");
            store.set_many(&migrated)?;
        }

        debug!(
            plants = state.plants.len(),
            completed = state.ledger.len(),
            "loaded application state"
        );
        Ok(state)
    }

    pub fn save_plants(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(PLANTS_KEY, &encode(&self.plants)?)
    }

    pub fn save_ledger(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(COMPLETED_KEY, &encode(&self.ledger)?)
    }

    /// Plants and ledger change together when a task is completed.
    pub fn save_schedule(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set_many(&[
            (PLANTS_KEY, encode(&self.plants)?),
            (COMPLETED_KEY, encode(&self.ledger)?),
        ])
    }

    pub fn save_notes(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(NOTES_KEY, &encode(&self.notes)?)
    }

    pub fn save_profile(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(PROFILE_KEY, &encode(&self.profile)?)
    }

    pub fn save_appearance(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set_many(&[
            (THEME_KEY, encode(&self.appearance.theme)?),
            (PALETTE_KEY, encode(&self.appearance.palette)?),
        ])
    }

    pub fn save_all(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set_many(&[
            (PLANTS_KEY, encode(&self.plants)?),
            (COMPLETED_KEY, encode(&self.ledger)?),
            (NOTES_KEY, encode(&self.notes)?),
            (PROFILE_KEY, encode(&self.profile)?),
            (THEME_KEY, encode(&self.appearance.theme)?),
            (PALETTE_KEY, encode(&self.appearance.palette)?),
        ])
    }

    /// Restore the default registry and clear the ledger in one write. Notes,
    /// profile and appearance are kept.
    pub fn reset(&mut self, store: &dyn KeyValueStore, now: DateTime<Utc>) -> Result<()> {
        let plants = default_registry(now);
        let ledger = CompletionLedger::new();
        store.set_many(&[
            (PLANTS_KEY, encode(&plants)?),
            (COMPLETED_KEY, encode(&ledger)?),
        ])?;
        self.plants = plants;
        self.ledger = ledger;
        info!("reset plants and completion history");
        Ok(())
    }
}
