use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use tabled::{Table, Tabled, settings::Style};

use sprout_core::calendar::{DayCell, parse_month};
use sprout_core::models::TaskKind;
use sprout_core::service::SproutService;

pub(crate) fn cmd_calendar(svc: &SproutService, month: Option<&str>, json: bool) -> Result<()> {
    let now = Local::now();
    let today = now.date_naive();
    let (year, month) = match month {
        Some(m) => parse_month(m)?,
        None => (today.year(), today.month()),
    };

    let grid = svc.month(&now, year, month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
        return Ok(());
    }

    #[derive(Tabled)]
    struct WeekRow {
        #[tabled(rename = "Sun")]
        sun: String,
        #[tabled(rename = "Mon")]
        mon: String,
        #[tabled(rename = "Tue")]
        tue: String,
        #[tabled(rename = "Wed")]
        wed: String,
        #[tabled(rename = "Thu")]
        thu: String,
        #[tabled(rename = "Fri")]
        fri: String,
        #[tabled(rename = "Sat")]
        sat: String,
    }

    let rows: Vec<WeekRow> = grid
        .weeks
        .iter()
        .map(|week| {
            let mut cells = week.iter().map(|c| cell_label(c, today));
            let mut next = || cells.next().unwrap_or_default();
            WeekRow {
                sun: next(),
                mon: next(),
                tue: next(),
                wed: next(),
                thu: next(),
                fri: next(),
                sat: next(),
            }
        })
        .collect();

    let title = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();
    println!("{title}");
    println!("{}", Table::new(&rows).with(Style::rounded()));
    println!("W/F = watering/fertilization due, w/f = done, * = today");

    Ok(())
}

fn cell_label(cell: &DayCell, today: NaiveDate) -> String {
    if !cell.in_month {
        return String::new();
    }
    let mut label = cell.date.day().to_string();
    if cell.date == today {
        label.push('*');
    }
    for (kind, due, done) in [(TaskKind::Watering, 'W', 'w'), (TaskKind::Fertilization, 'F', 'f')] {
        if cell.has_pending(kind) {
            label.push(' ');
            label.push(due);
        } else if cell.has(kind) {
            label.push(' ');
            label.push(done);
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::models::{CareTask, TaskKey};

    fn cell(date: NaiveDate, in_month: bool, tasks: Vec<CareTask>) -> DayCell {
        DayCell {
            date,
            in_month,
            tasks,
        }
    }

    fn task(kind: TaskKind, due: NaiveDate, completed: bool) -> CareTask {
        CareTask {
            key: TaskKey::new(kind, "1", due),
            plant_id: "1".to_string(),
            plant_name: "Golden Pothos".to_string(),
            kind,
            due_date: due,
            completed,
        }
    }

    #[test]
    fn test_cell_label() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 6, 19).unwrap();

        assert_eq!(cell_label(&cell(day, false, vec![]), today), "");
        assert_eq!(cell_label(&cell(today, true, vec![]), today), "15*");
        assert_eq!(
            cell_label(
                &cell(
                    day,
                    true,
                    vec![
                        task(TaskKind::Watering, day, false),
                        task(TaskKind::Fertilization, day, true),
                    ]
                ),
                today
            ),
            "19 W f"
        );
    }
}
