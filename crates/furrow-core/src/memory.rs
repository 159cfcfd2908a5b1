//! [`MemoryStore`] — an in-process implementation of both store traits.
//!
//! Used as the fake in engine tests and for throwaway CLI sessions. Nothing
//! survives the process.

use std::sync::{
  Arc, RwLock,
  atomic::{AtomicBool, Ordering},
};

use thiserror::Error;

use crate::{
  crop::{CropKind, FeedbackRecord, HistoryRecord},
  store::{FeedbackStore, HistoryStore, Scores, mean_scores},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("store lock poisoned")]
  Poisoned,

  #[error("store marked unavailable")]
  Unavailable,
}

#[derive(Default)]
struct Inner {
  history:     RwLock<Vec<HistoryRecord>>,
  feedback:    RwLock<Vec<FeedbackRecord>>,
  unavailable: AtomicBool,
}

/// Both logs held in memory.
///
/// Clones share the same logs.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Make every subsequent operation fail, simulating a storage fault.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.inner.unavailable.store(unavailable, Ordering::SeqCst);
  }

  fn check(&self) -> Result<(), MemoryError> {
    if self.inner.unavailable.load(Ordering::SeqCst) {
      Err(MemoryError::Unavailable)
    } else {
      Ok(())
    }
  }
}

impl HistoryStore for MemoryStore {
  type Error = MemoryError;

  async fn append_history(&self, record: HistoryRecord) -> Result<(), MemoryError> {
    self.check()?;
    self
      .inner
      .history
      .write()
      .map_err(|_| MemoryError::Poisoned)?
      .push(record);
    Ok(())
  }

  async fn recent_crops(
    &self,
    location: &str,
    n: usize,
  ) -> Result<Vec<CropKind>, MemoryError> {
    self.check()?;
    let history = self.inner.history.read().map_err(|_| MemoryError::Poisoned)?;
    let at_location: Vec<CropKind> = history
      .iter()
      .filter(|r| r.location == location)
      .map(|r| r.crop)
      .collect();
    let skip = at_location.len().saturating_sub(n);
    Ok(at_location[skip..].to_vec())
  }

  async fn list_history(
    &self,
    location: Option<&str>,
  ) -> Result<Vec<HistoryRecord>, MemoryError> {
    self.check()?;
    let history = self.inner.history.read().map_err(|_| MemoryError::Poisoned)?;
    Ok(
      history
        .iter()
        .filter(|r| location.is_none_or(|l| r.location == l))
        .cloned()
        .collect(),
    )
  }

  async fn reset_all(&self) -> Result<(), MemoryError> {
    self.check()?;
    self
      .inner
      .history
      .write()
      .map_err(|_| MemoryError::Poisoned)?
      .clear();
    Ok(())
  }
}

impl FeedbackStore for MemoryStore {
  type Error = MemoryError;

  async fn append_feedback(&self, record: FeedbackRecord) -> Result<(), MemoryError> {
    self.check()?;
    self
      .inner
      .feedback
      .write()
      .map_err(|_| MemoryError::Poisoned)?
      .push(record);
    Ok(())
  }

  async fn mean_rating_by_suggestion(
    &self,
    crop: CropKind,
  ) -> Result<Scores, MemoryError> {
    self.check()?;
    let feedback = self.inner.feedback.read().map_err(|_| MemoryError::Poisoned)?;
    Ok(mean_scores(
      feedback
        .iter()
        .filter(|f| f.crop == crop)
        .map(|f| (f.suggestion, f.rating)),
    ))
  }

  async fn list_feedback(&self) -> Result<Vec<FeedbackRecord>, MemoryError> {
    self.check()?;
    let feedback = self.inner.feedback.read().map_err(|_| MemoryError::Poisoned)?;
    Ok(feedback.clone())
  }
}
