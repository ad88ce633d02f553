use anyhow::{anyhow, bail, Context, Result};
use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use growth_engine::ai::{build_backend, AudioClip};
use growth_engine::analytics::{habit_matrix, study_hours_series, HEATMAP_HABITS};
use growth_engine::audit::{parse_day, AuditEntry};
use growth_engine::config::AppConfig;
use growth_engine::grocery::{aggregate_ingredients, collect_ingredient_lines};
use growth_engine::quotes::quote_for;
use growth_engine::recipe::{search_recipes, Recipe, RecipeTag};
use growth_engine::store::RecordStore;
use growth_engine::streaks::{calculate_streaks_as_of_now, default_criteria};

/// Set to `json` for machine-readable log lines
const LOG_FORMAT_ENV: &str = "GROWTH_LOG_FORMAT";

/// Days of history shown on the dashboard
const DASHBOARD_DAYS: u64 = 7;

#[derive(Parser)]
#[command(
    name = "growth-engine",
    about = "Habit streaks, recipe vault and grocery lists",
    long_about = "Track daily habits, keep a recipe vault, build merged grocery lists and log workouts from voice notes or free text."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Data directory override (defaults to GROWTH_DATA_DIR, then the current directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Quote of the day, streaks and the last week of habits
    Dashboard,

    /// Create or update the audit entry for a day
    LogDay {
        /// Day to log, YYYY-MM-DD or "today"
        date: String,

        /// Column=value pairs, e.g. CPA_Hours=2.5 Gym=true Dog_Walks=2
        assignments: Vec<String>,
    },

    /// Merged shopping list for the named recipes
    Grocery {
        /// Recipe names, exactly as stored
        #[arg(required = true)]
        recipes: Vec<String>,
    },

    /// List recipes, optionally filtered by name
    Recipes {
        /// Case-insensitive name filter
        query: Option<String>,
    },

    /// File a recipe from a file with one ingredient per line
    AddRecipe {
        /// Recipe name
        name: String,

        /// File holding the ingredient lines
        file: PathBuf,

        /// Tags: "High Protein", "Low Carb", "Quick", "Meal Prep"
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Preparation notes
        #[arg(long, default_value = "")]
        instructions: String,
    },

    /// Transcribe a recorded voice note
    Transcribe {
        /// WAV file to transcribe
        path: PathBuf,
    },

    /// Extract a workout from a description and save it
    ParseWorkout {
        /// Free-text description, e.g. "3 sets of 10 squats at 80kg"
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if env::var(LOG_FORMAT_ENV).is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging (also picks up `log` records from the library)
    init_logging(cli.verbose);

    let mut config = AppConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    info!(data_dir = %config.data_dir.display(), provider = %config.ai.provider, "Starting growth engine");

    let store = RecordStore::open(&config.data_dir)?;

    match cli.command {
        Command::Dashboard => dashboard(&store),
        Command::LogDay { date, assignments } => log_day(&store, &date, &assignments),
        Command::Grocery { recipes } => grocery(&store, &recipes),
        Command::Recipes { query } => list_recipes(&store, query.as_deref().unwrap_or_default()),
        Command::AddRecipe {
            name,
            file,
            tags,
            instructions,
        } => add_recipe(&store, &name, &file, &tags, &instructions),
        Command::Transcribe { path } => transcribe(&config, &path).await,
        Command::ParseWorkout { text } => parse_workout(&config, &store, &text.join(" ")).await,
    }
}

fn dashboard(store: &RecordStore) -> Result<()> {
    let today = Local::now().date_naive();
    let log = store.load_audit_log()?;

    println!("\"{}\"\n", quote_for(today));

    println!("Streaks");
    for (habit, days) in calculate_streaks_as_of_now(&log, &default_criteria()) {
        println!("  {habit:<6} {days} day(s)");
    }

    let since = today
        .checked_sub_days(Days::new(DASHBOARD_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let recent: Vec<AuditEntry> = log.into_iter().filter(|e| e.date > since).collect();
    if recent.is_empty() {
        return Ok(());
    }

    println!("\nStudy hours (last {DASHBOARD_DAYS} days)");
    for point in study_hours_series(&recent) {
        if point.hours > 0.0 {
            println!("  {}  {:<13} {:.1}", point.date, point.kind, point.hours);
        }
    }

    println!("\nHabits (last {DASHBOARD_DAYS} days)");
    println!("  {:<10} {}", "", HEATMAP_HABITS.join(" "));
    // Cells come date-major, one per heatmap habit
    for row in habit_matrix(&recent).chunks(HEATMAP_HABITS.len()) {
        let marks: Vec<String> = row
            .iter()
            .map(|cell| {
                let mark = if cell.done == 1 { "x" } else { "." };
                format!("{mark:^width$}", width = cell.habit.len())
            })
            .collect();
        println!("  {:<10} {}", row[0].date, marks.join(" "));
    }
    Ok(())
}

fn log_day(store: &RecordStore, date_arg: &str, assignments: &[String]) -> Result<()> {
    let date = if date_arg.eq_ignore_ascii_case("today") {
        Local::now().date_naive()
    } else {
        parse_day(date_arg).ok_or_else(|| anyhow!("Invalid date: {date_arg}"))?
    };

    // Start from the stored entry so unspecified columns keep their values
    let mut entry = store
        .load_audit_log()?
        .into_iter()
        .find(|e| e.date == date)
        .unwrap_or_else(|| AuditEntry::new(date));

    for assignment in assignments {
        let (column, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected Column=value, got '{assignment}'"))?;
        entry
            .set_field(column.trim(), value)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("Cannot set {column}"))?;
    }

    store.save_audit_entry(&entry)?;
    println!("Saved audit entry for {date}");
    Ok(())
}

fn grocery(store: &RecordStore, selected: &[String]) -> Result<()> {
    let recipes = store.load_recipes()?;
    let names: Vec<&str> = selected.iter().map(String::as_str).collect();
    let lines = collect_ingredient_lines(&recipes, &names);

    for item in aggregate_ingredients(&lines) {
        println!("- {item}");
    }
    Ok(())
}

fn list_recipes(store: &RecordStore, query: &str) -> Result<()> {
    let recipes = store.load_recipes()?;
    let found = search_recipes(&recipes, query);
    if found.is_empty() {
        println!("No recipes found");
    }
    for recipe in found {
        if recipe.tags.is_empty() {
            println!("{}", recipe.name);
        } else {
            println!("{} [{}]", recipe.name, recipe.tags);
        }
    }
    Ok(())
}

fn add_recipe(
    store: &RecordStore,
    name: &str,
    file: &Path,
    tag_labels: &[String],
    instructions: &str,
) -> Result<()> {
    let ingredients = fs::read_to_string(file)
        .with_context(|| format!("Failed to read ingredients from {}", file.display()))?;

    let tags = tag_labels
        .iter()
        .map(|label| {
            RecipeTag::from_label(label).ok_or_else(|| {
                let known: Vec<&str> = RecipeTag::ALL.iter().map(|t| t.label()).collect();
                anyhow!("Unknown tag '{label}' (known: {})", known.join(", "))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let recipe = Recipe::new(name, &tags, &ingredients, instructions)
        .map_err(|reason| anyhow!("Invalid recipe ({reason})"))?;
    store.save_recipe(&recipe)?;
    println!("Saved recipe '{}'", recipe.name);
    Ok(())
}

async fn transcribe(config: &AppConfig, path: &Path) -> Result<()> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read audio from {}", path.display()))?;

    let backend = build_backend(&config.ai);
    let text = backend.transcribe(&AudioClip::wav(bytes)).await?;
    println!("{text}");
    Ok(())
}

async fn parse_workout(config: &AppConfig, store: &RecordStore, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("parse-workout needs a workout description");
    }

    let backend = build_backend(&config.ai);
    let workout = backend.parse_workout(text).await?;
    println!("{}", serde_json::to_string_pretty(&workout)?);

    if workout.is_complete() {
        store.save_workout(&workout)?;
        println!("Workout saved");
    } else {
        println!("No exercise recognized, nothing saved");
    }
    Ok(())
}
