//! Subcommand handlers. Rendering is kept in plain functions returning
//! `String` so it can be tested without capturing stdout.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use chrono::Local;
use furrow_core::{
  climate::ClimateReading,
  crop::{CropKind, FeedbackRecord, HistoryRecord},
  engine::{Engine, Evaluation, NoSuggestionReason, RecommendationRequest, RecommendationResult},
  store::{FeedbackStore, HistoryStore},
  weather::WeatherProvider,
};

use crate::{
  Command, PlotArgs, export, settings::Settings, weather::OpenWeatherClient,
};

/// Parse a yes/no verdict for `feedback --useful`.
pub fn parse_verdict(s: &str) -> Result<bool, String> {
  match s.trim().to_ascii_lowercase().as_str() {
    "yes" | "y" | "true" | "1" => Ok(true),
    "no" | "n" | "false" | "0" => Ok(false),
    other => Err(format!("expected yes or no, got {other:?}")),
  }
}

/// Crops that may be recorded as planted or rated against.
fn parse_primary_crop(name: &str) -> Result<CropKind> {
  let crop = CropKind::parse(name)?;
  if !crop.is_primary() {
    bail!("{}", NoSuggestionReason::UnsupportedCrop.message());
  }
  Ok(crop)
}

/// Dispatch a parsed subcommand against `engine`.
pub async fn run<S>(
  command: Command,
  engine: &Engine<S, S, OpenWeatherClient>,
  settings: &Settings,
) -> Result<()>
where
  S: HistoryStore + FeedbackStore,
{
  let location_or_default =
    |l: Option<String>| l.unwrap_or_else(|| settings.default_location.clone());

  match command {
    Command::Plant { plot, date } => {
      let crop = parse_primary_crop(&plot.crop)?;
      let mut record = HistoryRecord::planted_today(
        crop,
        location_or_default(plot.location),
        plot.soil,
        plot.season,
      );
      if let Some(date) = date {
        record.date = date;
      }
      engine.plant(record.clone()).await.context("recording planting")?;
      println!(
        "Added {} for {} ({} soil, {})",
        record.crop, record.location, record.soil, record.season
      );
    }

    Command::Recommend { plot, humidity, json } => {
      let Some(request) = request_from(plot, &location_or_default) else {
        println!("{}", NoSuggestionReason::UnsupportedCrop.message());
        return Ok(());
      };
      let eval = evaluate_plot(engine, &request, humidity)
        .await
        .context("computing recommendation")?;

      if json {
        println!("{}", serde_json::to_string_pretty(&eval)?);
      } else {
        print!("{}", render_evaluation(&request, &eval));
      }
    }

    Command::Feedback { crop, suggestion, useful, notes } => {
      let crop = parse_primary_crop(&crop)?;
      let suggestion = CropKind::parse(&suggestion)?;
      engine
        .rate(FeedbackRecord::rate(crop, suggestion, useful, notes))
        .await
        .context("recording feedback")?;
      println!(
        "Feedback recorded: {suggestion} rated as {}",
        if useful { "Yes" } else { "No" }
      );
    }

    Command::History { location } => {
      let records = engine
        .history()
        .list_history(location.as_deref())
        .await
        .map_err(anyhow::Error::from)
        .context("reading history")?;
      print!("{}", render_history(&records));
    }

    Command::Reset { yes } => {
      if !yes {
        bail!("refusing to reset history without --yes");
      }
      engine.reset_history().await.context("resetting history")?;
      println!("Crop history reset.");
    }

    Command::Climate { location } => {
      let location = location_or_default(location);
      let conditions = engine
        .weather()
        .current(&location)
        .await
        .context("Failed to fetch weather data. Check city name or API key.")?;
      let reading = ClimateReading::from_humidity(Some(conditions.humidity));
      println!("City: {location}");
      println!("Temperature: {}°C", conditions.temperature);
      println!("Humidity: {}%", conditions.humidity);
      println!("Coordinates: {}, {}", conditions.latitude, conditions.longitude);
      println!(
        "Climate Category: {} (used for crop suggestion)",
        reading.climate.to_string().to_uppercase()
      );
    }

    Command::Export { plot, out } => {
      let Some(request) = request_from(plot, &location_or_default) else {
        println!("No suggestions to export.");
        return Ok(());
      };
      match engine.recommend(&request).await.context("computing recommendation")? {
        RecommendationResult::Suggestions(s) => {
          export::write_plan_file(&out, request.crop, &s, Local::now().date_naive())?;
          println!("Rotation plan exported to {}", out.display());
        }
        RecommendationResult::NoSuggestions(_) => println!("No suggestions to export."),
      }
    }

    Command::Rules { crop } => {
      let rules = engine.rules();
      let rendered = match crop {
        Some(name) => {
          let crop = CropKind::parse(&name)?;
          let Some(crop_rules) = rules.get(crop) else {
            bail!("{}", NoSuggestionReason::UnsupportedCrop.message());
          };
          serde_json::to_string_pretty(crop_rules)?
        }
        None => serde_json::to_string_pretty(rules)?,
      };
      println!("{rendered}");
    }
  }

  Ok(())
}

/// Evaluate `request`, using `humidity` in place of a live reading when given.
async fn evaluate_plot<S, W>(
  engine: &Engine<S, S, W>,
  request: &RecommendationRequest,
  humidity: Option<f64>,
) -> furrow_core::Result<Evaluation>
where
  S: HistoryStore + FeedbackStore,
  W: WeatherProvider,
{
  match humidity {
    Some(h) => engine.evaluate_with_humidity(request, Some(h)).await,
    None => engine.evaluate(request).await,
  }
}

/// Build a request, or `None` if the crop name is not a crop at all.
fn request_from(
  plot: PlotArgs,
  location_or_default: impl Fn(Option<String>) -> String,
) -> Option<RecommendationRequest> {
  let crop = CropKind::parse(&plot.crop).ok()?;
  Some(RecommendationRequest::new(
    crop,
    location_or_default(plot.location),
    plot.soil,
    plot.season,
  ))
}

// ─── Rendering ────────────────────────────────────────────────────────────────

pub fn render_evaluation(request: &RecommendationRequest, eval: &Evaluation) -> String {
  let mut out = String::new();

  if let Some(reading) = &eval.climate {
    let climate = reading.climate.to_string().to_uppercase();
    match reading.humidity {
      Some(h) => out.push_str(&format!(
        "Climate at {}: {climate} (humidity {h}%)\n",
        request.location
      )),
      None => out.push_str(&format!(
        "Climate at {}: {climate} (fallback, no weather data)\n",
        request.location
      )),
    }
  }

  match &eval.result {
    RecommendationResult::Suggestions(s) => {
      let names: Vec<String> = s.iter().map(ToString::to_string).collect();
      out.push_str(&format!(
        "Suggested crops after {}: {}\n",
        request.crop,
        names.join(", ")
      ));
    }
    RecommendationResult::NoSuggestions(reason) => {
      out.push_str(&reason.message());
      out.push('\n');
    }
  }

  out
}

pub fn render_history(records: &[HistoryRecord]) -> String {
  if records.is_empty() {
    return "No crop history available.\n".to_owned();
  }

  let mut out = String::new();
  out.push_str(&format!(
    "{:<10}  {:<10}  {:<16}  {:<6}  {}\n",
    "date", "crop", "location", "soil", "season"
  ));
  for r in records {
    out.push_str(&format!(
      "{:<10}  {:<10}  {:<16}  {:<6}  {}\n",
      r.date.format("%Y-%m-%d").to_string(),
      r.crop.to_string(),
      r.location,
      r.soil.to_string(),
      r.season
    ));
  }

  let mut counts: BTreeMap<CropKind, usize> = BTreeMap::new();
  for r in records {
    *counts.entry(r.crop).or_default() += 1;
  }
  out.push_str("\nplantings per crop:\n");
  for (crop, n) in counts {
    out.push_str(&format!("  {crop}: {n}\n"));
  }

  out
}
