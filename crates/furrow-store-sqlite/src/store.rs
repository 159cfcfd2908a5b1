//! [`SqliteStore`] — the SQLite implementation of [`HistoryStore`] and
//! [`FeedbackStore`].

use std::path::Path;

use furrow_core::{
  crop::{CropKind, FeedbackRecord, HistoryRecord},
  store::{FeedbackStore, HistoryStore, Scores},
};
use tracing::debug;

use crate::{
  Result,
  encode::{RawFeedback, RawHistory, decode_crop, encode_date, encode_enum},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Both furrow logs backed by a single SQLite file.
///
/// Clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── HistoryStore impl ───────────────────────────────────────────────────────

impl HistoryStore for SqliteStore {
  type Error = crate::Error;

  async fn append_history(&self, record: HistoryRecord) -> Result<()> {
    let date_str   = encode_date(record.date);
    let crop_str   = encode_enum(record.crop);
    let soil_str   = encode_enum(record.soil);
    let season_str = encode_enum(record.season);
    let location   = record.location;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO history (date, crop, location, soil_type, season)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![date_str, crop_str, location, soil_str, season_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn recent_crops(&self, location: &str, n: usize) -> Result<Vec<CropKind>> {
    let location = location.to_owned();
    let limit    = i64::try_from(n).unwrap_or(i64::MAX);

    let mut crops: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT crop FROM history
           WHERE location = ?1
           ORDER BY seq DESC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![location, limit], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    // Newest-first from SQL; callers expect oldest-first.
    crops.reverse();
    crops.iter().map(|c| decode_crop(c)).collect()
  }

  async fn list_history(&self, location: Option<&str>) -> Result<Vec<HistoryRecord>> {
    let location = location.map(str::to_owned);

    let raws: Vec<RawHistory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT date, crop, location, soil_type, season FROM history
           WHERE ?1 IS NULL OR location = ?1
           ORDER BY seq",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![location], |row| {
            Ok(RawHistory {
              date:      row.get(0)?,
              crop:      row.get(1)?,
              location:  row.get(2)?,
              soil_type: row.get(3)?,
              season:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistory::into_record).collect()
  }

  async fn reset_all(&self) -> Result<()> {
    let removed = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM history", [])?))
      .await?;
    debug!(removed, "history reset");
    Ok(())
  }
}

// ─── FeedbackStore impl ──────────────────────────────────────────────────────

impl FeedbackStore for SqliteStore {
  type Error = crate::Error;

  async fn append_feedback(&self, record: FeedbackRecord) -> Result<()> {
    let crop_str       = encode_enum(record.crop);
    let suggestion_str = encode_enum(record.suggestion);
    let rating         = record.rating;
    let notes          = record.notes;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO feedback (crop, suggestion, rating, notes)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![crop_str, suggestion_str, rating, notes],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn mean_rating_by_suggestion(&self, crop: CropKind) -> Result<Scores> {
    let crop_str = encode_enum(crop);

    let rows: Vec<(String, f64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT suggestion, AVG(rating) FROM feedback
           WHERE crop = ?1
           GROUP BY suggestion",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![crop_str], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(suggestion, mean)| Ok((decode_crop(&suggestion)?, mean)))
      .collect()
  }

  async fn list_feedback(&self) -> Result<Vec<FeedbackRecord>> {
    let raws: Vec<RawFeedback> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT crop, suggestion, rating, notes FROM feedback ORDER BY seq",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawFeedback {
              crop:       row.get(0)?,
              suggestion: row.get(1)?,
              rating:     row.get(2)?,
              notes:      row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFeedback::into_record).collect()
  }
}
