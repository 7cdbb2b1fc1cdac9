//! Analysis configuration.
//!
//! Stored as a JSON object on disk; every key is optional:
//! ```json
//! {
//!   "haversine_adjustment_factor": 1.2,
//!   "utc_offset_minutes": 60,
//!   "distance_buckets": [{ "label": "short", "min_km": 0.0, "max_km": 3.0 }]
//! }
//! ```

use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::models::DistanceBucket;

/// Default uplift applied to straight-line distances. Bike routes are rarely
/// direct, so the haversine estimate is scaled by 20%.
pub const DEFAULT_HAVERSINE_ADJUSTMENT_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Multiplier for the haversine fallback. `1.0` disables the uplift.
    pub haversine_adjustment_factor: f64,
    /// Offset from UTC used for day keys, month keys, weekday and hour buckets.
    pub utc_offset_minutes: i32,
    pub distance_buckets: Vec<DistanceBucket>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            haversine_adjustment_factor: DEFAULT_HAVERSINE_ADJUSTMENT_FACTOR,
            utc_offset_minutes: 0,
            distance_buckets: DistanceBucket::default_ladder(),
        }
    }
}

impl AnalyticsConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{path}'"))?;
        let config: AnalyticsConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{path}'"))?;
        Ok(config)
    }

    /// The configured offset, or UTC if the minutes are out of range.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
            warn!(
                utc_offset_minutes = self.utc_offset_minutes,
                "Invalid UTC offset, falling back to UTC"
            );
            Utc.fix()
        })
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn with_adjustment_factor(mut self, factor: f64) -> Self {
        self.haversine_adjustment_factor = factor;
        self
    }
}
