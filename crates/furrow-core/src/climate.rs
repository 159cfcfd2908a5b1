//! Humidity → climate classification.

use serde::{Deserialize, Serialize};

use crate::crop::Climate;

/// Humidity (percent) above which a location counts as humid.
pub const HUMIDITY_THRESHOLD: f64 = 50.0;

/// Used when no humidity reading is available.
pub const FALLBACK_CLIMATE: Climate = Climate::Humid;

/// Classify a humidity reading. A missing reading degrades to
/// [`FALLBACK_CLIMATE`] instead of failing.
pub fn classify(humidity: Option<f64>) -> Climate {
  match humidity {
    Some(h) if h > HUMIDITY_THRESHOLD => Climate::Humid,
    Some(_) => Climate::Dry,
    None => FALLBACK_CLIMATE,
  }
}

/// A climate category together with the reading it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateReading {
  /// `None` when the weather collaborator had nothing to offer.
  pub humidity: Option<f64>,
  pub climate:  Climate,
}

impl ClimateReading {
  pub fn from_humidity(humidity: Option<f64>) -> Self {
    Self { humidity, climate: classify(humidity) }
  }

  /// True when `climate` is the fallback rather than a measurement.
  pub fn is_fallback(&self) -> bool { self.humidity.is_none() }
}
