//! The rotation rule table.
//!
//! Rules are reference data: a nested mapping
//! crop → climate → soil → season → ordered candidate successors, plus a
//! per-crop avoid-set. The canonical table is embedded as JSON and parsed once;
//! an alternative table with the same shape can be loaded at startup.
//!
//! Loading enforces the authoring invariants, so [`RuleTable::lookup`] only
//! fails for crops that have no rules of their own.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::{
  Error, Result,
  crop::{Climate, CropKind, Season, SoilType},
};

const BUILTIN_RULES: &str = include_str!("rules.json");

/// Candidate successors per season, in preference order.
pub type SeasonRules = BTreeMap<Season, Vec<CropKind>>;

/// Season rules per soil type.
pub type SoilRules = BTreeMap<SoilType, SeasonRules>;

/// Everything the table knows about one current crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRules {
  pub humid: SoilRules,
  pub dry:   SoilRules,
  /// Never valid as the immediate successor, whatever else applies.
  pub avoid: BTreeSet<CropKind>,
}

impl CropRules {
  pub fn for_climate(&self, climate: Climate) -> &SoilRules {
    match climate {
      Climate::Humid => &self.humid,
      Climate::Dry => &self.dry,
    }
  }
}

/// The result of a single table lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lookup {
  pub candidates:    Vec<CropKind>,
  pub avoid:         BTreeSet<CropKind>,
  /// Set when the requested soil had no entry and Loamy was used instead.
  pub soil_fallback: bool,
}

/// Immutable rotation rules keyed by current crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
  crops: BTreeMap<CropKind, CropRules>,
}

impl RuleTable {
  /// The canonical table shipped with the crate.
  pub fn builtin() -> Result<Self> { Self::from_json(BUILTIN_RULES) }

  /// Parse and validate a table in the embedded JSON shape.
  pub fn from_json(json: &str) -> Result<Self> {
    let table: Self = serde_json::from_str(json)?;
    table.validate()?;
    Ok(table)
  }

  pub fn get(&self, crop: CropKind) -> Option<&CropRules> {
    self.crops.get(&crop)
  }

  /// Candidate successors and avoid-set for a crop in a given context.
  ///
  /// A soil with no entry falls back to Loamy. A season with no entry yields
  /// an empty candidate list.
  pub fn lookup(
    &self,
    crop: CropKind,
    climate: Climate,
    soil: SoilType,
    season: Season,
  ) -> Result<Lookup> {
    let rules = self
      .crops
      .get(&crop)
      .filter(|_| crop.is_primary())
      .ok_or_else(|| Error::UnsupportedCropKind(crop.to_string()))?;

    let by_soil = rules.for_climate(climate);
    let (seasons, soil_fallback) = match by_soil.get(&soil) {
      Some(s) => (Some(s), false),
      None => (by_soil.get(&SoilType::Loamy), true),
    };

    let candidates = seasons
      .and_then(|s| s.get(&season))
      .cloned()
      .unwrap_or_default();

    Ok(Lookup { candidates, avoid: rules.avoid.clone(), soil_fallback })
  }

  fn validate(&self) -> Result<()> {
    for crop in CropKind::PRIMARY {
      if !self.crops.contains_key(&crop) {
        return Err(Error::InvalidRuleTable(format!("no rules for {crop}")));
      }
    }

    for (crop, rules) in &self.crops {
      if !crop.is_primary() {
        return Err(Error::InvalidRuleTable(format!(
          "{crop} is a successor-only crop and cannot have rules"
        )));
      }

      for climate in Climate::iter() {
        let by_soil = rules.for_climate(climate);
        if !by_soil.contains_key(&SoilType::Loamy) {
          return Err(Error::InvalidRuleTable(format!(
            "{crop}/{climate} has no Loamy entry"
          )));
        }
        for (soil, seasons) in by_soil {
          if let Some(missing) = Season::iter().find(|s| !seasons.contains_key(s)) {
            return Err(Error::InvalidRuleTable(format!(
              "{crop}/{climate}/{soil} has no {missing} entry"
            )));
          }
        }
      }
    }

    Ok(())
  }
}
