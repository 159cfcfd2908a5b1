//! The weather collaborator seam.
//!
//! The engine only needs a humidity percentage per location. How it is
//! fetched (HTTP, cache, fixture) belongs to the implementor.

use std::future::Future;

/// Source of live humidity readings.
pub trait WeatherProvider: Send + Sync {
  /// Current relative humidity (percent) at `location`, or `None` if it
  /// could not be determined. Failures are never surfaced as errors.
  fn humidity<'a>(
    &'a self,
    location: &'a str,
  ) -> impl Future<Output = Option<f64>> + Send + 'a;
}

/// A provider that answers every location with the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedHumidity(pub Option<f64>);

impl WeatherProvider for FixedHumidity {
  async fn humidity(&self, _location: &str) -> Option<f64> { self.0 }
}
