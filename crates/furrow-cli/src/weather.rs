//! OpenWeatherMap client — the live source of humidity readings.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use furrow_core::weather::WeatherProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::settings::WeatherSettings;

/// Current conditions at a location, as reported by the API.
#[derive(Debug, Clone, Serialize)]
pub struct Conditions {
  pub humidity:    f64,
  pub temperature: f64,
  pub latitude:    f64,
  pub longitude:   f64,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
  main:  OwmMain,
  coord: OwmCoord,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
  temp:     f64,
  humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
  lat: f64,
  lon: f64,
}

impl From<OwmResponse> for Conditions {
  fn from(r: OwmResponse) -> Self {
    Self {
      humidity:    r.main.humidity,
      temperature: r.main.temp,
      latitude:    r.coord.lat,
      longitude:   r.coord.lon,
    }
  }
}

/// Async client for the OpenWeatherMap current-weather endpoint.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OpenWeatherClient {
  client:   Client,
  api_key:  Option<String>,
  base_url: String,
}

impl OpenWeatherClient {
  pub fn new(settings: &WeatherSettings) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(settings.timeout_secs))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      api_key: settings.api_key.clone(),
      base_url: settings.base_url.trim_end_matches('/').to_owned(),
    })
  }

  /// `GET /data/2.5/weather?q=<city>&units=metric`
  pub async fn current(&self, city: &str) -> Result<Conditions> {
    let api_key = self
      .api_key
      .as_deref()
      .ok_or_else(|| anyhow!("no OpenWeatherMap API key configured"))?;

    let resp = self
      .client
      .get(format!("{}/data/2.5/weather", self.base_url))
      .query(&[("q", city), ("appid", api_key), ("units", "metric")])
      .send()
      .await
      .with_context(|| format!("GET weather for {city:?} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET weather for {city:?} → {}", resp.status()));
    }
    let body: OwmResponse = resp.json().await.context("deserialising weather")?;
    Ok(body.into())
  }
}

impl WeatherProvider for OpenWeatherClient {
  async fn humidity(&self, location: &str) -> Option<f64> {
    match self.current(location).await {
      Ok(c) => Some(c.humidity),
      Err(e) => {
        warn!(location, error = %format!("{e:#}"), "weather lookup failed");
        None
      }
    }
  }
}
