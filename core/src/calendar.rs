use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::{CareTask, TaskKind};

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub tasks: Vec<CareTask>,
}

impl DayCell {
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    #[must_use]
    pub fn has_pending(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|t| t.kind == kind && !t.completed)
    }

    #[must_use]
    pub fn has(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|t| t.kind == kind)
    }
}

/// A month laid out in Sunday-first weeks, padded with days of the
/// neighbouring months.
#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<DayCell>>,
}

pub fn month_grid(year: i32, month: u32, tasks: &[CareTask]) -> Result<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid month {year}-{month:02}"))?;
    let (next_year, next_month) = shift_month(year, month, 1);
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .context("Month out of range")?
        - Duration::days(1);

    let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
    let end = last + Duration::days(i64::from(6 - last.weekday().num_days_from_sunday()));

    let mut weeks = Vec::new();
    let mut week = Vec::with_capacity(7);
    for day in start.iter_days().take_while(|d| *d <= end) {
        week.push(DayCell {
            date: day,
            in_month: day.month() == month,
            tasks: tasks.iter().filter(|t| t.due_date == day).cloned().collect(),
        });
        if week.len() == 7 {
            weeks.push(std::mem::replace(&mut week, Vec::with_capacity(7)));
        }
    }

    Ok(MonthGrid { year, month, weeks })
}

/// Parse `YYYY-MM`.
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{s}'. Use YYYY-MM"))?;
    Ok((date.year(), date.month()))
}

#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::CompletionLedger;
    use crate::models::default_registry;
    use crate::schedule::generate_tasks;
    use chrono::{TimeZone, Utc, Weekday};

    #[test]
    fn test_june_2024_grid() {
        let grid = month_grid(2024, 6, &[]).unwrap();
        // June 1st 2024 is a Saturday, June 30th a Sunday
        assert_eq!(grid.weeks.len(), 6);
        assert!(grid.weeks.iter().all(|w| w.len() == 7));
        let first = &grid.weeks[0][0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 5, 26).unwrap());
        assert_eq!(first.date.weekday(), Weekday::Sun);
        assert!(!first.in_month);
        assert!(grid.weeks[0][6].in_month);
        let last = &grid.weeks[5][6];
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2024, 7, 6).unwrap());
    }

    #[test]
    fn test_february_starting_sunday() {
        // Feb 2015: starts on Sunday, 28 days, exactly four rows
        let grid = month_grid(2015, 2, &[]).unwrap();
        assert_eq!(grid.weeks.len(), 4);
        assert!(grid.weeks.iter().flatten().all(|c| c.in_month));
    }

    #[test]
    fn test_tasks_land_on_cells() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap();
        let tasks = generate_tasks(&default_registry(now), &CompletionLedger::new(), &now);
        let grid = month_grid(2024, 6, &tasks).unwrap();
        let cell = grid
            .weeks
            .iter()
            .flatten()
            .find(|c| c.date == now.date_naive())
            .unwrap();
        assert_eq!(cell.tasks.len(), 2);
        assert_eq!(cell.pending(), 2);
        assert!(cell.has_pending(TaskKind::Watering));
        assert!(cell.has(TaskKind::Fertilization));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-02").unwrap(), (2024, 2));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("soon").is_err());
        assert!(month_grid(2024, 13, &[]).is_err());
    }

    #[test]
    fn test_shift_month() {
        assert_eq!(shift_month(2024, 12, 1), (2025, 1));
        assert_eq!(shift_month(2024, 1, -1), (2023, 12));
        assert_eq!(shift_month(2024, 6, 0), (2024, 6));
    }
}
