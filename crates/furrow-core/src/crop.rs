//! Crop, soil, season and record types — the vocabulary of the planner.
//!
//! Records are immutable once written. Both logs are append-only; the only
//! destructive operation is a bulk reset of the planting history.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{Error, Result};

// ─── Crops ───────────────────────────────────────────────────────────────────

/// Every crop the planner knows about.
///
/// Only the [primary](CropKind::PRIMARY) kinds are accepted as the current
/// crop of a plot. Barley, Sorghum and Vegetables show up as suggestions only.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum CropKind {
  Wheat,
  Rice,
  Maize,
  Legumes,
  Millets,
  Barley,
  Sorghum,
  Vegetables,
}

impl CropKind {
  /// The crops that have rotation rules of their own.
  pub const PRIMARY: [CropKind; 5] = [
    CropKind::Wheat,
    CropKind::Rice,
    CropKind::Maize,
    CropKind::Legumes,
    CropKind::Millets,
  ];

  pub fn is_primary(self) -> bool { Self::PRIMARY.contains(&self) }

  /// Parse a crop name, reporting anything unknown as an unsupported crop.
  pub fn parse(name: &str) -> Result<Self> {
    name
      .trim()
      .parse()
      .map_err(|_| Error::UnsupportedCropKind(name.trim().to_owned()))
  }

  /// Human-readable list of the primary kinds, e.g. for rejection messages.
  pub fn supported_list() -> String {
    let names: Vec<String> =
      Self::PRIMARY.iter().map(ToString::to_string).collect();
    match names.split_last() {
      Some((last, rest)) if !rest.is_empty() => {
        format!("{}, or {last}", rest.join(", "))
      }
      _ => names.join(""),
    }
  }
}

// ─── Context ─────────────────────────────────────────────────────────────────

/// Coarse climate category derived from observed humidity.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Climate {
  Humid,
  Dry,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum SoilType {
  Sandy,
  Clayey,
  Loamy,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Season {
  Monsoon,
  Winter,
  Summer,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One planting on a plot. Recency is decided by insertion order in the
/// store, never by `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
  pub date:     NaiveDate,
  pub crop:     CropKind,
  /// Free-text location, matched exactly.
  pub location: String,
  pub soil:     SoilType,
  pub season:   Season,
}

impl HistoryRecord {
  /// A planting recorded against today's local date.
  pub fn planted_today(
    crop: CropKind,
    location: impl Into<String>,
    soil: SoilType,
    season: Season,
  ) -> Self {
    Self {
      date: Local::now().date_naive(),
      crop,
      location: location.into(),
      soil,
      season,
    }
  }
}

/// A user's verdict on one suggestion made for `crop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
  pub crop:       CropKind,
  pub suggestion: CropKind,
  /// 1.0 = useful, 0.0 = not useful. Aggregated as a mean, so any real works.
  pub rating:     f64,
  pub notes:      String,
}

impl FeedbackRecord {
  pub fn rate(
    crop: CropKind,
    suggestion: CropKind,
    useful: bool,
    notes: impl Into<String>,
  ) -> Self {
    Self {
      crop,
      suggestion,
      rating: if useful { 1.0 } else { 0.0 },
      notes: notes.into(),
    }
  }
}
