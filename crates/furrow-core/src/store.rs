//! The `HistoryStore` and `FeedbackStore` traits.
//!
//! Implemented by storage backends (`MemoryStore` here, `furrow-store-sqlite`
//! for persistence). The engine and the CLI depend on these abstractions, not
//! on any concrete backend.
//!
//! Both logs are append-only and ordered by insertion. Implementations must
//! serialise appends so that insertion order is observable and reads never
//! see a half-written record.

use std::{collections::BTreeMap, future::Future};

use crate::crop::{CropKind, FeedbackRecord, HistoryRecord};

/// Mean rating per suggested crop.
pub type Scores = BTreeMap<CropKind, f64>;

/// Append-only log of plantings.
pub trait HistoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Durably append one planting.
  fn append_history(
    &self,
    record: HistoryRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The last `n` crops planted at `location`, oldest first.
  ///
  /// Recency is insertion order, not the `date` field: a backfilled record
  /// with an old date still counts as the most recent planting.
  fn recent_crops<'a>(
    &'a self,
    location: &'a str,
    n: usize,
  ) -> impl Future<Output = Result<Vec<CropKind>, Self::Error>> + Send + 'a;

  /// All plantings, optionally restricted to one location, in insertion
  /// order.
  fn list_history<'a>(
    &'a self,
    location: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<HistoryRecord>, Self::Error>> + Send + 'a;

  /// Forget every planting at every location. Irreversible.
  fn reset_all(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Append-only log of user verdicts on suggestions.
pub trait FeedbackStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn append_feedback(
    &self,
    record: FeedbackRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Mean rating per suggestion across all feedback for `crop`.
  /// Suggestions never rated for `crop` are absent, not zero.
  fn mean_rating_by_suggestion(
    &self,
    crop: CropKind,
  ) -> impl Future<Output = Result<Scores, Self::Error>> + Send + '_;

  fn list_feedback(
    &self,
  ) -> impl Future<Output = Result<Vec<FeedbackRecord>, Self::Error>> + Send + '_;
}

/// Fold `(suggestion, rating)` pairs into per-suggestion means.
pub fn mean_scores(
  ratings: impl IntoIterator<Item = (CropKind, f64)>,
) -> Scores {
  let mut sums: BTreeMap<CropKind, (f64, usize)> = BTreeMap::new();
  for (suggestion, rating) in ratings {
    let entry = sums.entry(suggestion).or_insert((0.0, 0));
    entry.0 += rating;
    entry.1 += 1;
  }
  sums
    .into_iter()
    .map(|(crop, (sum, count))| (crop, sum / count as f64))
    .collect()
}
