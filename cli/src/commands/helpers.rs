use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use sprout_core::ledger::CompletionLedger;
use sprout_core::models::CareTask;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Tasks completed only because their date has passed are "past due".
pub(crate) fn status(task: &CareTask, ledger: &CompletionLedger, today: NaiveDate) -> &'static str {
    if !task.completed {
        "pending"
    } else if !ledger.contains(&task.key) {
        "past due"
    } else if task.due_date > today {
        "done early"
    } else {
        "done"
    }
}

pub(crate) fn print_task_table(tasks: &[&CareTask], ledger: &CompletionLedger, today: NaiveDate) {
    #[derive(Tabled)]
    struct TaskRow {
        #[tabled(rename = "Due")]
        due: String,
        #[tabled(rename = "In")]
        in_days: String,
        #[tabled(rename = "Plant")]
        plant: String,
        #[tabled(rename = "Task")]
        kind: &'static str,
        #[tabled(rename = "Status")]
        status: &'static str,
        #[tabled(rename = "ID")]
        id: String,
    }

    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|t| TaskRow {
            due: t.due_date.format("%a %Y-%m-%d").to_string(),
            in_days: format!("{}d", t.due_date.signed_duration_since(today).num_days()),
            plant: truncate(&t.plant_name, 25),
            kind: t.kind.label(),
            status: status(t, ledger, today),
            id: t.key.to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(1)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::models::{TaskKey, TaskKind};

    fn task(due: NaiveDate, completed: bool) -> CareTask {
        CareTask {
            key: TaskKey::new(TaskKind::Watering, "1", due),
            plant_id: "1".to_string(),
            plant_name: "Golden Pothos".to_string(),
            kind: TaskKind::Watering,
            due_date: due,
            completed,
        }
    }

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_status() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let past = today - chrono::Duration::days(4);
        let future = today + chrono::Duration::days(4);
        let ledger: CompletionLedger = [task(past, true).key, task(future, true).key]
            .into_iter()
            .collect();
        let empty = CompletionLedger::new();

        assert_eq!(status(&task(today, false), &empty, today), "pending");
        assert_eq!(status(&task(past, true), &ledger, today), "done");
        assert_eq!(status(&task(future, true), &ledger, today), "done early");
        assert_eq!(status(&task(past, true), &empty, today), "past due");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Monstera déliciosa", 10), "Monster...");
        assert_eq!(truncate("Ficus", 10), "Ficus");
        assert_eq!(truncate("観葉植物のポトス", 6), "観葉植...");
    }
}
