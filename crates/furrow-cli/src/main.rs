//! `furrow` — crop rotation planner.
//!
//! # Usage
//!
//! ```text
//! furrow plant --crop Wheat --location Delhi --soil Loamy --season Monsoon
//! furrow recommend --crop Wheat --location Delhi --soil Loamy --season Monsoon
//! furrow feedback --crop Wheat --suggestion Legumes --useful yes --notes "worked well"
//! furrow --config ~/.config/furrow/furrow.toml history --location Delhi
//! ```

mod commands;
mod export;
mod settings;
mod weather;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use furrow_core::{
  crop::{Season, SoilType},
  engine::Engine,
  memory::MemoryStore,
  rules::RuleTable,
};
use furrow_store_sqlite::SqliteStore;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use weather::OpenWeatherClient;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "furrow", version, about = "Plan sustainable crop rotations")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "furrow.toml")]
  config: PathBuf,

  /// SQLite store path (overrides the config file).
  #[arg(long, env = "FURROW_STORE")]
  store: Option<PathBuf>,

  /// OpenWeatherMap API key (overrides the config file).
  #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Keep history and feedback in memory only; nothing is persisted.
  #[arg(long)]
  ephemeral: bool,

  #[command(subcommand)]
  command: Command,
}

/// The plot a command is about.
#[derive(clap::Args, Debug, Clone)]
pub struct PlotArgs {
  /// Current crop (Wheat, Rice, Maize, Legumes or Millets).
  #[arg(long)]
  pub crop:     String,
  /// Free-text location; defaults to `default_location` from the config.
  #[arg(long)]
  pub location: Option<String>,
  #[arg(long)]
  pub soil:     SoilType,
  #[arg(long)]
  pub season:   Season,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Record a crop planted on a plot.
  Plant {
    #[command(flatten)]
    plot: PlotArgs,
    /// Planting date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date: Option<chrono::NaiveDate>,
  },

  /// Suggest the next crop for a plot.
  Recommend {
    #[command(flatten)]
    plot:     PlotArgs,
    /// Use this humidity (percent) instead of asking the weather service.
    #[arg(long)]
    humidity: Option<f64>,
    /// Print the full evaluation as JSON.
    #[arg(long)]
    json:     bool,
  },

  /// Rate a suggestion as useful or not.
  Feedback {
    /// The crop the suggestion was made for.
    #[arg(long)]
    crop:       String,
    #[arg(long)]
    suggestion: String,
    /// Whether the suggestion was useful (yes/no).
    #[arg(long, action = clap::ArgAction::Set, value_parser = commands::parse_verdict)]
    useful:     bool,
    #[arg(long, default_value = "")]
    notes:      String,
  },

  /// Show the planting history.
  History {
    #[arg(long)]
    location: Option<String>,
  },

  /// Forget the planting history for every location.
  Reset {
    /// Required; the reset cannot be undone.
    #[arg(long)]
    yes: bool,
  },

  /// Show live weather and the climate category for a location.
  Climate {
    #[arg(long)]
    location: Option<String>,
  },

  /// Write the current suggestions to a CSV plan.
  Export {
    #[command(flatten)]
    plot: PlotArgs,
    #[arg(long, default_value = "rotation_plan.csv")]
    out:  PathBuf,
  },

  /// Print the rotation rule table, or the rules for one crop.
  Rules {
    #[arg(long)]
    crop: Option<String>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();

  // Logs go to stderr so stdout stays clean for --json.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)?;
  if let Some(store) = cli.store {
    settings.store_path = settings::expand_tilde(&store);
  }
  if cli.api_key.is_some() {
    settings.weather.api_key = cli.api_key;
  }

  let rules = match &settings.rules_path {
    Some(path) => {
      let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading rule table {}", path.display()))?;
      RuleTable::from_json(&raw).context("loading rule table")?
    }
    None => RuleTable::builtin().context("loading built-in rule table")?,
  };

  let weather = OpenWeatherClient::new(&settings.weather)?;

  if cli.ephemeral {
    let store = MemoryStore::new();
    let engine = Engine::new(rules, store.clone(), store, weather);
    return commands::run(cli.command, &engine, &settings).await;
  }

  if let Some(parent) = settings.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  tracing::info!(path = %settings.store_path.display(), "store opened");

  let engine = Engine::new(rules, store.clone(), store, weather);
  commands::run(cli.command, &engine, &settings).await
}
