//! Error types for `furrow-core`.

use thiserror::Error;

use crate::crop::CropKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error(
    "crop not supported: {0}. Try {supported}.",
    supported = CropKind::supported_list()
  )]
  UnsupportedCropKind(String),

  #[error("invalid rule table: {0}")]
  InvalidRuleTable(String),

  /// The backing store could not be read or written. Never retried here.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StorageUnavailable(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
