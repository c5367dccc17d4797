//! Recurring care-task generation.
//!
//! Each plant's watering and fertilization cadence is expanded into dated
//! occurrences inside a fixed window around today. Occurrences are never
//! stored: only the completion ledger and the plants' anchors persist, and the
//! task list is rebuilt from them on every change.

use std::ops::RangeInclusive;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use tracing::debug;

use crate::ledger::CompletionLedger;
use crate::models::{CareTask, Plant, TaskKey, TaskKind};

pub const WINDOW_PAST_DAYS: i64 = 30;
pub const WINDOW_FUTURE_DAYS: i64 = 60;

/// Date range tasks are generated for. Both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub today: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    #[must_use]
    pub fn around(today: NaiveDate) -> Self {
        Self {
            today,
            start: today - Duration::days(WINDOW_PAST_DAYS),
            end: today + Duration::days(WINDOW_FUTURE_DAYS),
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date > self.start && date < self.end
    }

    /// Cycle indices `k` for which `anchor + k * interval` lands inside the window.
    fn cycles(&self, anchor: NaiveDate, interval: i64) -> RangeInclusive<i64> {
        let lo = self.start.signed_duration_since(anchor).num_days() + 1;
        let hi = self.end.signed_duration_since(anchor).num_days() - 1;
        let first = -(-lo).div_euclid(interval);
        let last = hi.div_euclid(interval);
        first..=last
    }
}

/// Calendar day of `at` as seen in `tz`.
pub fn anchor_day<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Expand every plant's schedule into the task instances inside the window
/// around `now`'s calendar day.
///
/// Output order is registry order, watering before fertilization, ascending
/// due date. An occurrence is completed when the ledger holds its key or when
/// it is due strictly before today.
pub fn generate_tasks<Tz: TimeZone>(
    plants: &[Plant],
    ledger: &CompletionLedger,
    now: &DateTime<Tz>,
) -> Vec<CareTask> {
    let tz = now.timezone();
    let window = Window::around(now.date_naive());
    let mut tasks = Vec::new();

    for plant in plants {
        for kind in TaskKind::ALL {
            let anchor = anchor_day(&plant.last_done(kind), &tz);
            let interval = i64::from(plant.interval(kind).days());

            for k in window.cycles(anchor, interval) {
                let Some(due) = anchor.checked_add_signed(Duration::days(k * interval)) else {
                    continue;
                };
                if !window.contains(due) {
                    continue;
                }
                let key = TaskKey::new(kind, plant.id.clone(), due);
                let completed = ledger.contains(&key) || due < window.today;
                tasks.push(CareTask {
                    key,
                    plant_id: plant.id.clone(),
                    plant_name: plant.name.clone(),
                    kind,
                    due_date: due,
                    completed,
                });
            }
        }
    }

    debug!(
        plants = plants.len(),
        tasks = tasks.len(),
        today = %window.today,
        "regenerated care tasks"
    );
    tasks
}

/// Flip the completion state of the task identified by `key`.
///
/// Completing adds the key to the ledger and moves the plant's anchor for that
/// kind forward to the start of the due day when the due day is on or after
/// the current anchor day. Un-completing only removes the key from the ledger.
///
/// Returns the new completed state, or `None` when `key` is not among `tasks`.
pub fn toggle_task<Tz: TimeZone>(
    plants: &mut [Plant],
    ledger: &mut CompletionLedger,
    tasks: &[CareTask],
    key: &TaskKey,
    tz: &Tz,
) -> Option<bool> {
    let task = tasks.iter().find(|t| &t.key == key)?;

    if task.completed {
        ledger.remove(key);
        return Some(false);
    }

    ledger.insert(key.clone());
    if let Some(plant) = plants.iter_mut().find(|p| p.id == task.plant_id) {
        let current = plant.last_done(task.kind);
        if task.due_date >= anchor_day(&current, tz) {
            let due_start = start_of_day(task.due_date, tz);
            if due_start > current {
                plant.set_last_done(task.kind, due_start);
            }
        }
    }
    Some(true)
}

fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
}

/// Tasks due on `date`, in generator order.
#[must_use]
pub fn tasks_on(tasks: &[CareTask], date: NaiveDate) -> Vec<&CareTask> {
    tasks.iter().filter(|t| t.due_date == date).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    /// Completed through the ledger.
    pub done: usize,
    /// Completed only because their due date has passed.
    pub lapsed: usize,
}

#[must_use]
pub fn summarize<'a>(
    tasks: impl IntoIterator<Item = &'a CareTask>,
    ledger: &CompletionLedger,
) -> TaskStats {
    let mut stats = TaskStats::default();
    for task in tasks {
        stats.total += 1;
        if !task.completed {
            stats.pending += 1;
        } else if ledger.contains(&task.key) {
            stats.done += 1;
        } else {
            stats.lapsed += 1;
        }
    }
    stats
}
