//! SQL schema for the furrow SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Plantings. Append-only; the only DELETE is the bulk reset.
-- `seq` is the insertion order and decides recency, not `date`.
CREATE TABLE IF NOT EXISTS history (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    date       TEXT NOT NULL,   -- YYYY-MM-DD
    crop       TEXT NOT NULL,
    location   TEXT NOT NULL,
    soil_type  TEXT NOT NULL,   -- 'Sandy' | 'Clayey' | 'Loamy'
    season     TEXT NOT NULL    -- 'Monsoon' | 'Winter' | 'Summer'
);

-- Verdicts on suggestions. Strictly append-only.
CREATE TABLE IF NOT EXISTS feedback (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    crop       TEXT NOT NULL,
    suggestion TEXT NOT NULL,
    rating     REAL NOT NULL,   -- 1 = useful, 0 = not useful
    notes      TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS history_location_idx ON history(location, seq);
CREATE INDEX IF NOT EXISTS feedback_crop_idx    ON feedback(crop);

PRAGMA user_version = 1;
";
