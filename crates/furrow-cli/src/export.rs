//! Rotation plan export as CSV.

use std::{io, path::Path};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use furrow_core::crop::CropKind;
use serde::Serialize;

/// One exported plan row. Column names match the spreadsheet the source
/// program produced.
#[derive(Debug, Serialize)]
struct PlanRow {
  #[serde(rename = "Current Crop")]
  current_crop: String,
  #[serde(rename = "Suggested Rotations")]
  suggested:    String,
  #[serde(rename = "Date")]
  date:         String,
}

impl PlanRow {
  fn new(crop: CropKind, suggestions: &[CropKind], date: NaiveDate) -> Self {
    let suggested: Vec<String> = suggestions.iter().map(ToString::to_string).collect();
    Self {
      current_crop: crop.to_string(),
      suggested:    suggested.join(", "),
      date:         date.format("%Y-%m-%d").to_string(),
    }
  }
}

/// Write a single-row plan (with header) to `out`.
pub fn write_plan<W: io::Write>(
  out: W,
  crop: CropKind,
  suggestions: &[CropKind],
  date: NaiveDate,
) -> Result<()> {
  let mut writer = csv::Writer::from_writer(out);
  writer
    .serialize(PlanRow::new(crop, suggestions, date))
    .context("writing plan row")?;
  writer.flush().context("flushing plan")?;
  Ok(())
}

/// Write the plan to a file, replacing any previous export.
pub fn write_plan_file(
  path: &Path,
  crop: CropKind,
  suggestions: &[CropKind],
  date: NaiveDate,
) -> Result<()> {
  let file = std::fs::File::create(path)
    .with_context(|| format!("creating {}", path.display()))?;
  write_plan(file, crop, suggestions, date)
}
