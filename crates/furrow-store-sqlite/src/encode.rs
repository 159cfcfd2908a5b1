//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`. Crops, soils and seasons are stored by
//! their capitalised names, exactly as they display.

use std::{fmt::Display, str::FromStr};

use chrono::NaiveDate;
use furrow_core::crop::{CropKind, FeedbackRecord, HistoryRecord, Season, SoilType};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::Decode(format!("bad date {s:?}: {e}")))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn encode_enum(v: impl Display) -> String { v.to_string() }

fn decode_enum<T: FromStr>(what: &str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

pub fn decode_crop(s: &str) -> Result<CropKind> { decode_enum("crop", s) }

pub fn decode_soil(s: &str) -> Result<SoilType> { decode_enum("soil type", s) }

pub fn decode_season(s: &str) -> Result<Season> { decode_enum("season", s) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `history` row.
pub struct RawHistory {
  pub date:      String,
  pub crop:      String,
  pub location:  String,
  pub soil_type: String,
  pub season:    String,
}

impl RawHistory {
  pub fn into_record(self) -> Result<HistoryRecord> {
    Ok(HistoryRecord {
      date:     decode_date(&self.date)?,
      crop:     decode_crop(&self.crop)?,
      location: self.location,
      soil:     decode_soil(&self.soil_type)?,
      season:   decode_season(&self.season)?,
    })
  }
}

/// Raw values read directly from a `feedback` row.
pub struct RawFeedback {
  pub crop:       String,
  pub suggestion: String,
  pub rating:     f64,
  pub notes:      String,
}

impl RawFeedback {
  pub fn into_record(self) -> Result<FeedbackRecord> {
    Ok(FeedbackRecord {
      crop:       decode_crop(&self.crop)?,
      suggestion: decode_crop(&self.suggestion)?,
      rating:     self.rating,
      notes:      self.notes,
    })
  }
}
