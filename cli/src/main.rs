mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_calendar, cmd_export, cmd_import, cmd_notes_clear, cmd_notes_set, cmd_notes_show,
    cmd_plant_add, cmd_plant_list, cmd_plant_show, cmd_profile_set, cmd_profile_show, cmd_reset,
    cmd_tasks, cmd_theme_set, cmd_theme_show, cmd_toggle,
};
use crate::config::Config;
use sprout_core::service::SproutService;

#[derive(Parser)]
#[command(
    name = "sprout",
    version,
    about = "A simple plant-care tracker CLI",
    long_about = "\n\n  ┌─┐┌─┐┬─┐┌─┐┬ ┬┌┬┐
  └─┐├─┘├┬┘│ ││ │ │
  └─┘┴  ┴└─└─┘└─┘ ┴
   water. feed. grow.
"
)]
struct Cli {
    /// Database file (default: platform data directory)
    #[arg(long, global = true, env = "SPROUT_DB")]
    db: Option<PathBuf>,

    /// Show debug logs on stderr (`RUST_LOG` takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage plants
    Plant {
        #[command(subcommand)]
        command: PlantCommands,
    },
    /// Show the care agenda (whole window, or a single day)
    Tasks {
        /// Only show tasks due on this date (YYYY-MM-DD or today/yesterday/tomorrow)
        #[arg(long)]
        date: Option<String>,
        /// Hide completed tasks
        #[arg(long)]
        pending: bool,
        /// Output as CSV
        #[arg(long, conflicts_with = "json")]
        csv: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a month calendar with care markers
    Calendar {
        /// Month to show (YYYY-MM, default: current month)
        #[arg(long)]
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task done, or undo a completion
    Toggle {
        /// Task ID as shown by `sprout tasks` (e.g. watering-1-2024-06-19)
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Free-form care notes
    Notes {
        #[command(subcommand)]
        command: NotesCommands,
    },
    /// User profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Theme mode and color palette
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
    /// Write a JSON backup of all data
    Export {
        /// Output file (default: sprout_backup_DDMMYYYY.json in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace plants and history with a JSON backup
    Import {
        /// Backup file to read
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore the default plant and clear completion history
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PlantCommands {
    /// Register a new plant
    Add {
        /// Plant name
        name: String,
        /// Species (optional)
        #[arg(long)]
        species: Option<String>,
        /// Days between waterings
        #[arg(short, long, default_value = "3", allow_negative_numbers = true)]
        water: i64,
        /// Days between fertilizations
        #[arg(short, long, default_value = "30", allow_negative_numbers = true)]
        fertilize: i64,
        /// Days from today until the first task of each kind
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        start_in: i64,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List plants
    List {
        /// Filter by name or species
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a plant and its upcoming tasks
    Show {
        /// Plant ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum NotesCommands {
    /// Print the notes
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the notes
    Set {
        /// New notes text
        text: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear the notes
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update profile fields (unset fields are kept)
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        age: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Show the current theme and palette
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change theme mode and/or palette
    Set {
        /// light or dark
        #[arg(long)]
        mode: Option<String>,
        /// emerald, ocean, lavender, rose or amber
        #[arg(long)]
        palette: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    let mut svc = SproutService::open(&config.db_path)?;
    tracing::debug!(db = %config.db_path.display(), "opened database");

    match cli.command {
        Commands::Plant { command } => match command {
            PlantCommands::Add {
                name,
                species,
                water,
                fertilize,
                start_in,
                image,
                notes,
                json,
            } => cmd_plant_add(
                &mut svc, name, species, water, fertilize, start_in, image, notes, json,
            ),
            PlantCommands::List { search, json } => cmd_plant_list(&svc, search.as_deref(), json),
            PlantCommands::Show { id, json } => cmd_plant_show(&svc, &id, json),
        },
        Commands::Tasks {
            date,
            pending,
            csv,
            json,
        } => cmd_tasks(&svc, date, pending, csv, json),
        Commands::Calendar { month, json } => cmd_calendar(&svc, month.as_deref(), json),
        Commands::Toggle { key, json } => cmd_toggle(&mut svc, &key, json),
        Commands::Notes { command } => match command {
            NotesCommands::Show { json } => cmd_notes_show(&svc, json),
            NotesCommands::Set { text, json } => cmd_notes_set(&mut svc, text, json),
            NotesCommands::Clear { json } => cmd_notes_clear(&mut svc, json),
        },
        Commands::Profile { command } => match command {
            ProfileCommands::Show { json } => cmd_profile_show(&svc, json),
            ProfileCommands::Set {
                name,
                email,
                age,
                json,
            } => cmd_profile_set(&mut svc, name, email, age, json),
        },
        Commands::Theme { command } => match command {
            ThemeCommands::Show { json } => cmd_theme_show(&svc, json),
            ThemeCommands::Set {
                mode,
                palette,
                json,
            } => cmd_theme_set(&mut svc, mode.as_deref(), palette.as_deref(), json),
        },
        Commands::Export { output, json } => cmd_export(&svc, output, json),
        Commands::Import { path, json } => cmd_import(&mut svc, &path, json),
        Commands::Reset { yes, json } => cmd_reset(&mut svc, yes, json),
    }
}
