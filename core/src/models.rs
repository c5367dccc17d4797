use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_WATERING_DAYS: u32 = 3;
pub const DEFAULT_FERTILIZATION_DAYS: u32 = 30;
pub const MAX_INTERVAL_DAYS: u32 = 36_500;
pub const DEFAULT_IMAGE: &str =
    "https://images.unsplash.com/photo-1545239351-ef056c0b011a?q=80&w=400&auto=format&fit=crop";

// --- Care intervals ---

/// Number of days between two occurrences of a care task. Always at least 1.
///
/// Decoding is lenient: persisted or imported values below one day (including
/// `null`, which older exports wrote for unparseable form input) are clamped
/// to 1 so the schedule generator never sees a zero interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CareInterval(u32);

impl CareInterval {
    pub fn new(days: u32) -> Result<Self> {
        validate_interval(i64::from(days))?;
        Ok(Self(days))
    }

    #[must_use]
    pub fn days(self) -> u32 {
        self.0
    }

    #[allow(clippy::cast_sign_loss)]
    fn clamped(raw: Option<f64>) -> Self {
        match raw {
            Some(v) if v.is_finite() && v > f64::from(MAX_INTERVAL_DAYS) => {
                warn!(value = v, max = MAX_INTERVAL_DAYS, "care interval too long, clamping");
                Self(MAX_INTERVAL_DAYS)
            }
            Some(v) if v.is_finite() && v >= 1.0 => Self(v.floor() as u32),
            other => {
                warn!(value = ?other, "care interval below one day, clamping to 1");
                Self(1)
            }
        }
    }
}

impl fmt::Display for CareInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.0)
    }
}

impl Serialize for CareInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for CareInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<f64>::deserialize(deserializer)?;
        Ok(Self::clamped(raw))
    }
}

pub fn validate_interval(days: i64) -> Result<()> {
    if days < 1 {
        bail!("Care interval must be at least 1 day (got {days})");
    }
    if days > i64::from(MAX_INTERVAL_DAYS) {
        bail!("Care interval must be at most {MAX_INTERVAL_DAYS} days (got {days})");
    }
    Ok(())
}

// --- Plants ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: String,
    pub name: String,
    #[serde(
        default,
        serialize_with = "none_as_empty",
        deserialize_with = "empty_as_none"
    )]
    pub species: Option<String>,
    pub watering_frequency: CareInterval,
    pub fertilization_frequency: CareInterval,
    pub last_watered: DateTime<Utc>,
    pub last_fertilized: DateTime<Utc>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub notes: String,
}

impl Plant {
    #[must_use]
    pub fn interval(&self, kind: TaskKind) -> CareInterval {
        match kind {
            TaskKind::Watering => self.watering_frequency,
            TaskKind::Fertilization => self.fertilization_frequency,
        }
    }

    #[must_use]
    pub fn last_done(&self, kind: TaskKind) -> DateTime<Utc> {
        match kind {
            TaskKind::Watering => self.last_watered,
            TaskKind::Fertilization => self.last_fertilized,
        }
    }

    pub fn set_last_done(&mut self, kind: TaskKind, at: DateTime<Utc>) {
        match kind {
            TaskKind::Watering => self.last_watered = at,
            TaskKind::Fertilization => self.last_fertilized = at,
        }
    }

    /// Case-insensitive match on name or species.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self
                .species
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&query))
    }
}

#[allow(clippy::ref_option)]
fn none_as_empty<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// Input for registering a plant.
///
/// `start_in_days` places the first task of each kind that many days from now:
/// the anchor is set one interval before that day.
#[derive(Debug, Clone)]
pub struct NewPlant {
    pub name: String,
    pub species: Option<String>,
    pub watering_frequency: CareInterval,
    pub fertilization_frequency: CareInterval,
    pub start_in_days: i64,
    pub image: Option<String>,
    pub notes: String,
}

impl NewPlant {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            species: None,
            watering_frequency: CareInterval(DEFAULT_WATERING_DAYS),
            fertilization_frequency: CareInterval(DEFAULT_FERTILIZATION_DAYS),
            start_in_days: 0,
            image: None,
            notes: String::new(),
        }
    }

    pub fn into_plant(self, id: String, now: DateTime<Utc>) -> Result<Plant> {
        let anchor = |interval: CareInterval| {
            Duration::try_days(self.start_in_days - i64::from(interval.days()))
                .and_then(|offset| now.checked_add_signed(offset))
                .ok_or_else(|| anyhow::anyhow!("First care date is out of range"))
        };
        Ok(Plant {
            id,
            last_watered: anchor(self.watering_frequency)?,
            last_fertilized: anchor(self.fertilization_frequency)?,
            name: self.name.trim().to_string(),
            species: self.species.filter(|s| !s.trim().is_empty()),
            watering_frequency: self.watering_frequency,
            fertilization_frequency: self.fertilization_frequency,
            image: self
                .image
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            notes: self.notes,
        })
    }
}

pub fn validate_new_plant(plant: &NewPlant) -> Result<()> {
    if plant.name.trim().is_empty() {
        bail!("Plant name must not be empty");
    }
    if plant.start_in_days.abs() > 365 {
        bail!(
            "Start offset must be within a year of today (got {} days)",
            plant.start_in_days
        );
    }
    Ok(())
}

/// The registry a fresh install starts with.
#[must_use]
pub fn default_registry(now: DateTime<Utc>) -> Vec<Plant> {
    vec![Plant {
        id: "1".to_string(),
        name: "Golden Pothos".to_string(),
        species: Some("Epipremnum aureum".to_string()),
        watering_frequency: CareInterval(4),
        fertilization_frequency: CareInterval(30),
        last_watered: now,
        last_fertilized: now,
        image: "https://images.unsplash.com/photo-1597055181300-e3633a207519?q=80&w=400&auto=format&fit=crop".to_string(),
        notes: "Loves indirect light and humidity.".to_string(),
    }]
}

// --- Tasks ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Watering,
    Fertilization,
}

impl TaskKind {
    pub const ALL: [TaskKind; 2] = [TaskKind::Watering, TaskKind::Fertilization];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Watering => "watering",
            TaskKind::Fertilization => "fertilization",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TaskKind::Watering => "Water",
            TaskKind::Fertilization => "Fertilize",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = TaskKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "watering" => Ok(TaskKind::Watering),
            "fertilization" => Ok(TaskKind::Fertilization),
            _ => Err(TaskKeyError::UnknownKind(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskKeyError {
    #[error("unknown task kind {0:?} (expected watering or fertilization)")]
    UnknownKind(String),

    #[error("malformed task key {0:?} (expected <kind>-<plant id>-<YYYY-MM-DD>)")]
    Malformed(String),

    #[error("invalid due date in task key {0:?}")]
    InvalidDate(String),
}

/// Identity of one task occurrence: (kind, plant id, due date).
///
/// The text form `<kind>-<plant id>-<YYYY-MM-DD>` is what the completion
/// ledger persists. Plant ids may contain dashes; the date is always the last
/// ten characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskKey {
    pub kind: TaskKind,
    pub plant_id: String,
    pub due: NaiveDate,
}

const KEY_DATE_LEN: usize = 10;

impl TaskKey {
    #[must_use]
    pub fn new(kind: TaskKind, plant_id: impl Into<String>, due: NaiveDate) -> Self {
        Self {
            kind,
            plant_id: plant_id.into(),
            due,
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.kind,
            self.plant_id,
            self.due.format("%Y-%m-%d")
        )
    }
}

impl FromStr for TaskKey {
    type Err = TaskKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TaskKeyError::Malformed(s.to_string());
        let (kind, rest) = s.split_once('-').ok_or_else(malformed)?;
        let kind: TaskKind = kind.parse()?;

        // "<id>-" needs at least two bytes ahead of the date
        if rest.len() < KEY_DATE_LEN + 2 {
            return Err(malformed());
        }
        let split = rest.len() - KEY_DATE_LEN;
        if !rest.is_char_boundary(split) {
            return Err(malformed());
        }
        let (id_part, date_part) = rest.split_at(split);
        let plant_id = id_part.strip_suffix('-').ok_or_else(malformed)?;
        if plant_id.is_empty() {
            return Err(malformed());
        }
        let due = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|_| TaskKeyError::InvalidDate(s.to_string()))?;

        Ok(TaskKey::new(kind, plant_id, due))
    }
}

impl Serialize for TaskKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One generated occurrence of a care task. Derived on every recompute, never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareTask {
    #[serde(rename = "id")]
    pub key: TaskKey,
    pub plant_id: String,
    pub plant_name: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub due_date: NaiveDate,
    pub completed: bool,
}

// --- Profile & appearance ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub age: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => bail!("Invalid theme '{s}'. Use 'light' or 'dark'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteColors {
    pub main: &'static str,
    pub light: &'static str,
    pub dark: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    #[default]
    Emerald,
    Ocean,
    Lavender,
    Rose,
    Amber,
}

impl Palette {
    pub const ALL: [Palette; 5] = [
        Palette::Emerald,
        Palette::Ocean,
        Palette::Lavender,
        Palette::Rose,
        Palette::Amber,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Palette::Emerald => "emerald",
            Palette::Ocean => "ocean",
            Palette::Lavender => "lavender",
            Palette::Rose => "rose",
            Palette::Amber => "amber",
        }
    }

    #[must_use]
    pub fn colors(self) -> PaletteColors {
        let (main, light, dark) = match self {
            Palette::Emerald => ("#000000", "#f8fafc", "#000000"),
            Palette::Ocean => ("#0284c7", "#e0f2fe", "#0c4a6e"),
            Palette::Lavender => ("#8b5cf6", "#ede9fe", "#4c1d95"),
            Palette::Rose => ("#e11d48", "#ffe4e6", "#881337"),
            Palette::Amber => ("#d97706", "#fef3c7", "#78350f"),
        };
        PaletteColors { main, light, dark }
    }
}

impl FromStr for Palette {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Palette::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid palette '{s}'. Use one of: emerald, ocean, lavender, rose, amber"
                )
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub theme: Theme,
    pub palette: Palette,
}
