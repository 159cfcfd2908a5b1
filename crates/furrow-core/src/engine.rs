//! The recommendation engine.
//!
//! Given a plot's current crop, location, soil and season, the engine looks up
//! candidate successors in the [`RuleTable`], drops anything in the crop's
//! avoid-set or among the last two plantings at that location, and re-ranks
//! what is left by the mean feedback rating of each suggestion.
//!
//! Recommending never writes to a store. Identical store contents and inputs
//! always produce identical output.

use serde::Serialize;
use tracing::debug;

use crate::{
  Error, Result,
  climate::ClimateReading,
  crop::{CropKind, FeedbackRecord, HistoryRecord, Season, SoilType},
  rules::{Lookup, RuleTable},
  store::{FeedbackStore, HistoryStore, Scores},
  weather::WeatherProvider,
};

/// How many of the latest plantings at a location are excluded.
pub const RECENT_WINDOW: usize = 2;

// ─── Request / result ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
  pub crop:     CropKind,
  pub location: String,
  pub soil:     SoilType,
  pub season:   Season,
}

impl RecommendationRequest {
  pub fn new(
    crop: CropKind,
    location: impl Into<String>,
    soil: SoilType,
    season: Season,
  ) -> Self {
    Self { crop, location: location.into(), soil, season }
  }
}

/// Why a recommendation came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoSuggestionReason {
  /// The current crop has no rotation rules.
  UnsupportedCrop,
  /// Every candidate was excluded by the avoid-set or recent history.
  NoOptionsForContext,
}

impl NoSuggestionReason {
  pub fn message(self) -> String {
    match self {
      Self::UnsupportedCrop => {
        format!("Crop not supported. Try {}.", CropKind::supported_list())
      }
      Self::NoOptionsForContext => "No suitable rotation options for this \
                                    season. Try another crop or season."
        .to_owned(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum RecommendationResult {
  /// Ranked successors, best first. Never empty.
  Suggestions(Vec<CropKind>),
  NoSuggestions(NoSuggestionReason),
}

impl RecommendationResult {
  pub fn suggestions(&self) -> &[CropKind] {
    match self {
      Self::Suggestions(s) => s,
      Self::NoSuggestions(_) => &[],
    }
  }
}

/// A recommendation plus the intermediate values that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
  /// `None` when the crop was rejected before the climate was resolved.
  pub climate: Option<ClimateReading>,
  pub lookup:  Option<Lookup>,
  pub recent:  Vec<CropKind>,
  pub scores:  Scores,
  pub result:  RecommendationResult,
}

impl Evaluation {
  fn unsupported(climate: Option<ClimateReading>) -> Self {
    Self {
      climate,
      lookup: None,
      recent: Vec::new(),
      scores: Scores::new(),
      result: RecommendationResult::NoSuggestions(NoSuggestionReason::UnsupportedCrop),
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Stateless apart from the injected rule table, stores and weather source.
pub struct Engine<H, F, W> {
  rules:    RuleTable,
  history:  H,
  feedback: F,
  weather:  W,
}

impl<H, F, W> Engine<H, F, W>
where
  H: HistoryStore,
  F: FeedbackStore,
  W: WeatherProvider,
{
  pub fn new(rules: RuleTable, history: H, feedback: F, weather: W) -> Self {
    Self { rules, history, feedback, weather }
  }

  pub fn rules(&self) -> &RuleTable { &self.rules }

  pub fn history(&self) -> &H { &self.history }

  pub fn feedback(&self) -> &F { &self.feedback }

  pub fn weather(&self) -> &W { &self.weather }

  /// Recommend successors, resolving humidity through the weather provider.
  pub async fn recommend(
    &self,
    request: &RecommendationRequest,
  ) -> Result<RecommendationResult> {
    Ok(self.evaluate(request).await?.result)
  }

  /// Recommend successors for an already-resolved humidity reading.
  pub async fn recommend_with_humidity(
    &self,
    request: &RecommendationRequest,
    humidity: Option<f64>,
  ) -> Result<RecommendationResult> {
    Ok(self.evaluate_with_humidity(request, humidity).await?.result)
  }

  /// Like [`Engine::recommend`], keeping the climate, lookup and scores.
  pub async fn evaluate(&self, request: &RecommendationRequest) -> Result<Evaluation> {
    if !request.crop.is_primary() {
      debug!(crop = %request.crop, "rejecting unsupported crop");
      return Ok(Evaluation::unsupported(None));
    }
    let humidity = self.weather.humidity(&request.location).await;
    self.evaluate_with_humidity(request, humidity).await
  }

  pub async fn evaluate_with_humidity(
    &self,
    request: &RecommendationRequest,
    humidity: Option<f64>,
  ) -> Result<Evaluation> {
    let climate = ClimateReading::from_humidity(humidity);
    if climate.is_fallback() {
      debug!(location = %request.location, "no humidity reading, using fallback climate");
    }

    let lookup = match self.rules.lookup(
      request.crop,
      climate.climate,
      request.soil,
      request.season,
    ) {
      Ok(l) => l,
      Err(Error::UnsupportedCropKind(_)) => {
        debug!(crop = %request.crop, "rejecting unsupported crop");
        return Ok(Evaluation::unsupported(Some(climate)));
      }
      Err(e) => return Err(e),
    };

    let recent = self
      .history
      .recent_crops(&request.location, RECENT_WINDOW)
      .await
      .map_err(Error::storage)?;

    let mut valid: Vec<CropKind> = lookup
      .candidates
      .iter()
      .copied()
      .filter(|c| !recent.contains(c) && !lookup.avoid.contains(c))
      .collect();

    let scores = self
      .feedback
      .mean_rating_by_suggestion(request.crop)
      .await
      .map_err(Error::storage)?;

    if !scores.is_empty() {
      let score = |c: &CropKind| scores.get(c).copied().unwrap_or(0.0);
      // `sort_by` is stable: ties keep rule-table order.
      valid.sort_by(|a, b| score(b).total_cmp(&score(a)));
    }

    debug!(
      crop = %request.crop,
      climate = %climate.climate,
      candidates = ?lookup.candidates,
      recent = ?recent,
      ranked = ?valid,
      "evaluated rotation"
    );

    let result = if valid.is_empty() {
      RecommendationResult::NoSuggestions(NoSuggestionReason::NoOptionsForContext)
    } else {
      RecommendationResult::Suggestions(valid)
    };

    Ok(Evaluation {
      climate: Some(climate),
      lookup: Some(lookup),
      recent,
      scores,
      result,
    })
  }

  // ── Store pass-throughs ─────────────────────────────────────────────────

  /// Record a planting.
  pub async fn plant(&self, record: HistoryRecord) -> Result<()> {
    self.history.append_history(record).await.map_err(Error::storage)
  }

  /// Record a verdict on a suggestion.
  pub async fn rate(&self, record: FeedbackRecord) -> Result<()> {
    self.feedback.append_feedback(record).await.map_err(Error::storage)
  }

  /// Clear the planting history for every location.
  pub async fn reset_history(&self) -> Result<()> {
    self.history.reset_all().await.map_err(Error::storage)
  }
}
