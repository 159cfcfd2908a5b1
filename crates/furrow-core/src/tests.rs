//! Engine behaviour against the in-memory store.

use chrono::NaiveDate;
use serde_json::json;

use crate::{
  Error,
  crop::{Climate, CropKind, FeedbackRecord, HistoryRecord, Season, SoilType},
  engine::{Engine, NoSuggestionReason, RecommendationRequest, RecommendationResult},
  memory::MemoryStore,
  rules::RuleTable,
  store::{FeedbackStore, HistoryStore},
  weather::FixedHumidity,
};

use CropKind::*;

const HUMID: Option<f64> = Some(70.0);

fn engine_with(
  rules: RuleTable,
  humidity: Option<f64>,
) -> (Engine<MemoryStore, MemoryStore, FixedHumidity>, MemoryStore) {
  let store = MemoryStore::new();
  let engine = Engine::new(rules, store.clone(), store.clone(), FixedHumidity(humidity));
  (engine, store)
}

fn engine(
  humidity: Option<f64>,
) -> (Engine<MemoryStore, MemoryStore, FixedHumidity>, MemoryStore) {
  engine_with(RuleTable::builtin().expect("builtin rules"), humidity)
}

fn wheat_loamy_monsoon() -> RecommendationRequest {
  RecommendationRequest::new(Wheat, "Delhi", SoilType::Loamy, Season::Monsoon)
}

fn planting(crop: CropKind, location: &str) -> HistoryRecord {
  HistoryRecord {
    date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    crop,
    location: location.into(),
    soil: SoilType::Loamy,
    season: Season::Monsoon,
  }
}

fn suggestions(result: RecommendationResult) -> Vec<CropKind> {
  match result {
    RecommendationResult::Suggestions(s) => s,
    other => panic!("expected suggestions, got {other:?}"),
  }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn avoid_set_filters_rule_candidates() {
  let (e, _) = engine(HUMID);
  let result = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(result, RecommendationResult::Suggestions(vec![Legumes, Maize]));
}

#[tokio::test]
async fn recent_planting_is_excluded() {
  let (e, store) = engine(HUMID);
  store.append_history(planting(Legumes, "Delhi")).await.unwrap();

  let result = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(result, RecommendationResult::Suggestions(vec![Maize]));
}

#[tokio::test]
async fn feedback_reranks_suggestions() {
  let (e, store) = engine(HUMID);
  store
    .append_feedback(FeedbackRecord::rate(Wheat, Maize, true, "worked well"))
    .await
    .unwrap();

  let result = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(result, RecommendationResult::Suggestions(vec![Maize, Legumes]));
}

#[tokio::test]
async fn successor_only_crop_is_unsupported() {
  let (e, _) = engine(HUMID);
  let req = RecommendationRequest::new(Barley, "Delhi", SoilType::Loamy, Season::Monsoon);
  let result = e.recommend(&req).await.unwrap();
  assert_eq!(
    result,
    RecommendationResult::NoSuggestions(NoSuggestionReason::UnsupportedCrop)
  );
}

#[tokio::test]
async fn empty_season_yields_no_options() {
  let (e, _) = engine(Some(30.0));
  let req = RecommendationRequest::new(Rice, "Jaipur", SoilType::Sandy, Season::Winter);
  let result = e.recommend(&req).await.unwrap();
  assert_eq!(
    result,
    RecommendationResult::NoSuggestions(NoSuggestionReason::NoOptionsForContext)
  );
}

#[tokio::test]
async fn missing_humidity_uses_humid_rules() {
  let (e, _) = engine(None);
  let eval = e.evaluate(&wheat_loamy_monsoon()).await.unwrap();

  let climate = eval.climate.expect("climate resolved");
  assert!(climate.is_fallback());
  assert_eq!(climate.climate, Climate::Humid);
  assert_eq!(eval.result, RecommendationResult::Suggestions(vec![Legumes, Maize]));
}

// ─── Properties ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn output_never_contains_avoided_crops() {
  let (e, _) = engine(HUMID);
  for crop in CropKind::PRIMARY {
    for soil in [SoilType::Sandy, SoilType::Clayey, SoilType::Loamy] {
      for season in [Season::Monsoon, Season::Winter, Season::Summer] {
        for humidity in [Some(80.0), Some(20.0)] {
          let req = RecommendationRequest::new(crop, "Pune", soil, season);
          let eval = e.evaluate_with_humidity(&req, humidity).await.unwrap();
          let avoid = eval.lookup.expect("lookup").avoid;
          for s in eval.result.suggestions() {
            assert!(!avoid.contains(s), "{crop}/{soil}/{season}: {s} is avoided");
            assert_ne!(*s, crop);
          }
        }
      }
    }
  }
}

#[tokio::test]
async fn only_last_two_plantings_are_excluded() {
  let (e, store) = engine(HUMID);
  // Legumes drops out of the window once two newer plantings exist.
  store.append_history(planting(Legumes, "Delhi")).await.unwrap();
  store.append_history(planting(Rice, "Delhi")).await.unwrap();
  store.append_history(planting(Maize, "Delhi")).await.unwrap();

  let result = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(result, RecommendationResult::Suggestions(vec![Legumes]));
}

#[tokio::test]
async fn recency_follows_insertion_not_date() {
  let (e, store) = engine(HUMID);
  store.append_history(planting(Rice, "Delhi")).await.unwrap();
  store.append_history(planting(Millets, "Delhi")).await.unwrap();
  // Backfilled with an old date, but still the newest insertion.
  let mut backfill = planting(Legumes, "Delhi");
  backfill.date = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
  store.append_history(backfill).await.unwrap();

  let result = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(result, RecommendationResult::Suggestions(vec![Maize]));
}

#[tokio::test]
async fn history_at_other_locations_is_ignored() {
  let (e, store) = engine(HUMID);
  store.append_history(planting(Legumes, "Lucknow")).await.unwrap();
  store.append_history(planting(Maize, "Lucknow")).await.unwrap();

  let result = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(result, RecommendationResult::Suggestions(vec![Legumes, Maize]));
}

#[tokio::test]
async fn everything_filtered_yields_no_options() {
  let (e, store) = engine(HUMID);
  store.append_history(planting(Legumes, "Delhi")).await.unwrap();
  store.append_history(planting(Maize, "Delhi")).await.unwrap();

  let result = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(
    result,
    RecommendationResult::NoSuggestions(NoSuggestionReason::NoOptionsForContext)
  );
}

#[tokio::test]
async fn ranking_is_stable_among_ties() {
  let mut table = serde_json::to_value(RuleTable::builtin().unwrap()).unwrap();
  table["Wheat"]["humid"]["Loamy"]["Monsoon"] = json!(["Legumes", "Maize", "Millets"]);
  let rules = RuleTable::from_json(&table.to_string()).unwrap();
  let (e, store) = engine_with(rules, HUMID);

  for (suggestion, useful) in [(Legumes, true), (Legumes, false), (Millets, false), (Millets, true)] {
    store
      .append_feedback(FeedbackRecord::rate(Wheat, suggestion, useful, ""))
      .await
      .unwrap();
  }

  let result = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(suggestions(result), vec![Legumes, Millets, Maize]);
}

#[tokio::test]
async fn zero_mean_ties_with_unrated() {
  let (e, store) = engine(HUMID);
  store
    .append_feedback(FeedbackRecord::rate(Wheat, Maize, false, "poor yield"))
    .await
    .unwrap();

  let result = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(suggestions(result), vec![Legumes, Maize]);
}

#[tokio::test]
async fn feedback_for_other_crops_is_ignored() {
  let (e, store) = engine(HUMID);
  store
    .append_feedback(FeedbackRecord::rate(Rice, Maize, true, ""))
    .await
    .unwrap();

  let result = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(suggestions(result), vec![Legumes, Maize]);
}

#[tokio::test]
async fn recommend_is_idempotent_and_read_only() {
  let (e, store) = engine(HUMID);
  store.append_history(planting(Rice, "Delhi")).await.unwrap();
  store
    .append_feedback(FeedbackRecord::rate(Wheat, Maize, true, ""))
    .await
    .unwrap();

  let first = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  let second = e.recommend(&wheat_loamy_monsoon()).await.unwrap();
  assert_eq!(first, second);

  assert_eq!(store.list_history(None).await.unwrap().len(), 1);
  assert_eq!(store.list_feedback().await.unwrap().len(), 1);
}

#[tokio::test]
async fn dry_climate_selects_dry_rules() {
  let (e, _) = engine(Some(40.0));
  let req = RecommendationRequest::new(Wheat, "Jodhpur", SoilType::Sandy, Season::Monsoon);
  let result = e.recommend(&req).await.unwrap();
  assert_eq!(suggestions(result), vec![Millets, Sorghum]);
}

#[tokio::test]
async fn storage_fault_is_propagated() {
  let (e, store) = engine(HUMID);
  store.set_unavailable(true);

  let err = e.recommend(&wheat_loamy_monsoon()).await.unwrap_err();
  assert!(matches!(err, Error::StorageUnavailable(_)));

  let err = e.plant(planting(Wheat, "Delhi")).await.unwrap_err();
  assert!(matches!(err, Error::StorageUnavailable(_)));
}

#[tokio::test]
async fn unsupported_crop_short_circuits_before_storage() {
  let (e, store) = engine(HUMID);
  store.set_unavailable(true);

  let req = RecommendationRequest::new(Sorghum, "Delhi", SoilType::Loamy, Season::Summer);
  let result = e.recommend(&req).await.unwrap();
  assert_eq!(
    result,
    RecommendationResult::NoSuggestions(NoSuggestionReason::UnsupportedCrop)
  );
}

#[tokio::test]
async fn unsupported_crop_with_given_humidity_skips_storage() {
  let (e, store) = engine(HUMID);
  store.set_unavailable(true);
  let req = RecommendationRequest::new(Barley, "Delhi", SoilType::Loamy, Season::Monsoon);

  let eval = e.evaluate_with_humidity(&req, Some(20.0)).await.unwrap();
  assert_eq!(
    eval.result,
    RecommendationResult::NoSuggestions(NoSuggestionReason::UnsupportedCrop)
  );
  assert!(eval.lookup.is_none());
  assert_eq!(eval.climate.map(|c| c.climate), Some(Climate::Dry));

  // The live path rejects before asking for the weather at all.
  assert!(e.evaluate(&req).await.unwrap().climate.is_none());
}

#[test]
fn no_suggestion_messages() {
  assert_eq!(
    NoSuggestionReason::UnsupportedCrop.message(),
    "Crop not supported. Try Wheat, Rice, Maize, Legumes, or Millets."
  );
  assert_eq!(
    NoSuggestionReason::NoOptionsForContext.message(),
    "No suitable rotation options for this season. Try another crop or season."
  );
}

// ─── MemoryStore ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn recent_crops_returns_tail_in_insertion_order() {
  let store = MemoryStore::new();
  for crop in [Wheat, Rice, Maize] {
    store.append_history(planting(crop, "Delhi")).await.unwrap();
  }
  store.append_history(planting(Millets, "Agra")).await.unwrap();

  assert_eq!(store.recent_crops("Delhi", 2).await.unwrap(), vec![Rice, Maize]);
  assert_eq!(store.recent_crops("Delhi", 10).await.unwrap(), vec![Wheat, Rice, Maize]);
  assert!(store.recent_crops("Nowhere", 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn reset_clears_every_location() {
  let store = MemoryStore::new();
  store.append_history(planting(Wheat, "Delhi")).await.unwrap();
  store.append_history(planting(Rice, "Agra")).await.unwrap();
  store
    .append_feedback(FeedbackRecord::rate(Wheat, Maize, true, ""))
    .await
    .unwrap();

  store.reset_all().await.unwrap();

  assert!(store.list_history(None).await.unwrap().is_empty());
  assert!(store.recent_crops("Agra", 2).await.unwrap().is_empty());
  // Feedback is a separate log and survives.
  assert_eq!(store.list_feedback().await.unwrap().len(), 1);
}

#[tokio::test]
async fn mean_rating_groups_by_suggestion() {
  let store = MemoryStore::new();
  for (suggestion, rating) in [(Maize, 1.0), (Maize, 0.0), (Maize, 1.0), (Legumes, 0.25)] {
    store
      .append_feedback(FeedbackRecord {
        crop: Wheat,
        suggestion,
        rating,
        notes: String::new(),
      })
      .await
      .unwrap();
  }

  let scores = store.mean_rating_by_suggestion(Wheat).await.unwrap();
  assert_eq!(scores.len(), 2);
  assert!((scores[&Maize] - 2.0 / 3.0).abs() < f64::EPSILON);
  assert_eq!(scores[&Legumes], 0.25);
  assert!(!scores.contains_key(&Millets));
  assert!(store.mean_rating_by_suggestion(Rice).await.unwrap().is_empty());
}
