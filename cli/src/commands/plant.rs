use anyhow::{Context, Result};
use chrono::{Local, Utc};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use sprout_core::models::{CareInterval, CareTask, NewPlant, Plant, validate_interval};
use sprout_core::service::SproutService;

use super::helpers::{print_task_table, truncate};

const SHOW_UPCOMING: usize = 6;

fn interval(days: i64, what: &str) -> Result<CareInterval> {
    validate_interval(days).with_context(|| format!("Invalid {what} frequency"))?;
    CareInterval::new(u32::try_from(days)?)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_plant_add(
    svc: &mut SproutService,
    name: String,
    species: Option<String>,
    water: i64,
    fertilize: i64,
    start_in: i64,
    image: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let mut new = NewPlant::new(name);
    new.species = species;
    new.watering_frequency = interval(water, "watering")?;
    new.fertilization_frequency = interval(fertilize, "fertilization")?;
    new.start_in_days = start_in;
    new.image = image;
    new.notes = notes.unwrap_or_default();

    let plant = svc.add_plant(new, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plant)?);
    } else {
        println!("Added {} (ID: {})", plant.name, plant.id);
        println!(
            "  Water every {} days, fertilize every {} days",
            plant.watering_frequency.days(),
            plant.fertilization_frequency.days()
        );
    }

    Ok(())
}

pub(crate) fn cmd_plant_list(svc: &SproutService, search: Option<&str>, json: bool) -> Result<()> {
    let plants: Vec<&Plant> = match search {
        Some(q) => svc.search_plants(q),
        None => svc.plants().iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plants)?);
        return Ok(());
    }

    if plants.is_empty() {
        if search.is_some() {
            eprintln!("No plants match your search.");
        } else {
            eprintln!("No plants yet. Use `sprout plant add` to register one.");
        }
        return Ok(());
    }

    #[derive(Tabled)]
    struct PlantRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Species")]
        species: String,
        #[tabled(rename = "Water")]
        water: String,
        #[tabled(rename = "Fertilize")]
        fertilize: String,
        #[tabled(rename = "Last watered")]
        last_watered: String,
    }

    let rows: Vec<PlantRow> = plants
        .iter()
        .map(|p| PlantRow {
            id: truncate(&p.id, 12),
            name: truncate(&p.name, 25),
            species: p
                .species
                .as_deref()
                .map(|s| truncate(s, 25))
                .unwrap_or_default(),
            water: p.watering_frequency.to_string(),
            fertilize: p.fertilization_frequency.to_string(),
            last_watered: p
                .last_watered
                .with_timezone(&Local)
                .format("%Y-%m-%d")
                .to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_plant_show(svc: &SproutService, id: &str, json: bool) -> Result<()> {
    #[derive(Serialize)]
    struct PlantDetail<'a> {
        #[serde(flatten)]
        plant: &'a Plant,
        upcoming: Vec<&'a CareTask>,
    }

    let plant = svc.get_plant(id)?;
    let now = Local::now();
    let today = now.date_naive();
    let tasks = svc.tasks(&now);
    let upcoming: Vec<&CareTask> = tasks
        .iter()
        .filter(|t| t.plant_id == plant.id && t.due_date >= today)
        .collect();

    if json {
        let detail = PlantDetail { plant, upcoming };
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("{} (ID: {})", plant.name, plant.id);
    if let Some(ref species) = plant.species {
        println!("  Species:        {species}");
    }
    println!(
        "  Watering:       every {} days, last {}",
        plant.watering_frequency.days(),
        plant.last_watered.with_timezone(&Local).format("%Y-%m-%d")
    );
    println!(
        "  Fertilization:  every {} days, last {}",
        plant.fertilization_frequency.days(),
        plant.last_fertilized.with_timezone(&Local).format("%Y-%m-%d")
    );
    if !plant.notes.is_empty() {
        println!("  Notes:          {}", plant.notes);
    }

    let mut upcoming = upcoming;
    upcoming.sort_by_key(|t| t.due_date);
    upcoming.truncate(SHOW_UPCOMING);
    if !upcoming.is_empty() {
        println!();
        print_task_table(&upcoming, &svc.state().ledger, today);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_rejects_out_of_range() {
        assert!(interval(0, "watering").is_err());
        assert!(interval(-3, "watering").is_err());
        assert!(interval(200_000_000, "watering").is_err());
        assert_eq!(interval(7, "watering").unwrap().days(), 7);
    }
}
