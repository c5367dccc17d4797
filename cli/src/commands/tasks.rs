use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use sprout_core::ledger::CompletionLedger;
use sprout_core::models::{CareTask, TaskKey};
use sprout_core::schedule::{Window, summarize};
use sprout_core::service::SproutService;

use super::helpers::{parse_date, print_task_table, status};

pub(crate) fn cmd_tasks(
    svc: &SproutService,
    date: Option<String>,
    pending: bool,
    csv: bool,
    json: bool,
) -> Result<()> {
    let now = Local::now();
    let today = now.date_naive();
    let day = date.map(|d| parse_date(Some(d))).transpose()?;

    let all = svc.tasks(&now);
    let tasks: Vec<&CareTask> = all
        .iter()
        .filter(|t| day.is_none_or(|d| t.due_date == d))
        .filter(|t| !pending || !t.completed)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }
    if csv {
        return write_csv(io::stdout().lock(), &tasks, &svc.state().ledger, today);
    }

    if let Some(d) = day {
        let window = Window::around(today);
        if !window.contains(d) {
            eprintln!(
                "{} is outside the schedule window ({} to {}).",
                d.format("%Y-%m-%d"),
                window.start.format("%Y-%m-%d"),
                window.end.format("%Y-%m-%d")
            );
            return Ok(());
        }
    }

    if tasks.is_empty() {
        match day {
            Some(d) => eprintln!("Nothing to do on {}.", d.format("%Y-%m-%d")),
            None => eprintln!("No tasks. Use `sprout plant add` to register a plant."),
        }
        return Ok(());
    }

    print_task_table(&tasks, &svc.state().ledger, today);

    let stats = summarize(tasks.iter().copied(), &svc.state().ledger);
    println!(
        "{} tasks: {} pending, {} done, {} past due",
        stats.total, stats.pending, stats.done, stats.lapsed
    );

    Ok(())
}

fn write_csv<W: Write>(
    out: W,
    tasks: &[&CareTask],
    ledger: &CompletionLedger,
    today: NaiveDate,
) -> Result<()> {
    #[derive(Serialize)]
    struct CsvRow<'a> {
        id: String,
        due_date: NaiveDate,
        plant_id: &'a str,
        plant_name: &'a str,
        task: &'static str,
        status: &'static str,
    }

    let mut wtr = csv::Writer::from_writer(out);
    for t in tasks {
        wtr.serialize(CsvRow {
            id: t.key.to_string(),
            due_date: t.due_date,
            plant_id: &t.plant_id,
            plant_name: &t.plant_name,
            task: t.kind.as_str(),
            status: status(t, ledger, today),
        })?;
    }
    wtr.flush().context("Failed to write CSV")?;
    Ok(())
}

pub(crate) fn cmd_toggle(svc: &mut SproutService, key: &str, json: bool) -> Result<()> {
    let key: TaskKey = key
        .trim()
        .parse()
        .with_context(|| format!("Invalid task ID '{key}'"))?;

    let Some(completed) = svc.toggle_task(&Local::now(), &key)? else {
        bail!("No task '{key}' in the current schedule. Run `sprout tasks` to list task IDs");
    };

    if json {
        println!(
            "{}",
            serde_json::json!({ "id": key.to_string(), "completed": completed })
        );
    } else {
        let plant = svc
            .get_plant(&key.plant_id)
            .map_or(key.plant_id.as_str(), |p| p.name.as_str());
        let verb = if completed { "Done" } else { "Undone" };
        println!(
            "{verb}: {} {} on {}",
            key.kind.label().to_lowercase(),
            plant,
            key.due.format("%Y-%m-%d")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::models::TaskKind;

    #[test]
    fn test_write_csv() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 6, 19).unwrap();
        let task = CareTask {
            key: TaskKey::new(TaskKind::Watering, "1", due),
            plant_id: "1".to_string(),
            plant_name: "Golden Pothos, variegated".to_string(),
            kind: TaskKind::Watering,
            due_date: due,
            completed: false,
        };

        let lapsed_due = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        let lapsed = CareTask {
            key: TaskKey::new(TaskKind::Watering, "1", lapsed_due),
            due_date: lapsed_due,
            completed: true,
            ..task.clone()
        };

        let mut out = Vec::new();
        write_csv(&mut out, &[&lapsed, &task], &CompletionLedger::new(), today).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,due_date,plant_id,plant_name,task,status");
        assert_eq!(
            lines[1],
            "watering-1-2024-06-11,2024-06-11,1,\"Golden Pothos, variegated\",watering,past due"
        );
        assert_eq!(
            lines[2],
            "watering-1-2024-06-19,2024-06-19,1,\"Golden Pothos, variegated\",watering,pending"
        );
    }
}
