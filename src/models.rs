//! Data types shared by the extraction and aggregation pipeline.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// A single entry of the `account.items` array returned by the Nextbike
/// `list.json` endpoint.
///
/// Every field except `node` may be missing; absence is normal and the
/// extractors decide what to do with it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawAccountItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(default)]
    pub node: String,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub start_place_lat: Option<f64>,
    pub start_place_lng: Option<f64>,
    pub end_place_lat: Option<f64>,
    pub end_place_lng: Option<f64>,
    /// Reported distance in meters.
    pub distance: Option<f64>,
    /// Provider-side estimate in meters.
    pub distance_estimated: Option<f64>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub bike: Option<String>,
}

impl RawAccountItem {
    pub const RENTAL_NODE: &'static str = "rental";

    pub fn is_rental(&self) -> bool {
        self.node == Self::RENTAL_NODE
    }

    /// All four endpoint coordinates, if present.
    pub fn coordinates(&self) -> Option<(f64, f64, f64, f64)> {
        match (
            self.start_place_lat,
            self.start_place_lng,
            self.end_place_lat,
            self.end_place_lng,
        ) {
            (Some(lat1), Some(lng1), Some(lat2), Some(lng2)) => Some((lat1, lng1, lat2, lng2)),
            _ => None,
        }
    }

    /// Reported distance if positive, otherwise the estimated one if positive.
    pub fn reported_meters(&self) -> Option<f64> {
        match (self.distance, self.distance_estimated) {
            (Some(m), _) if m > 0.0 => Some(m),
            (_, Some(m)) if m > 0.0 => Some(m),
            _ => None,
        }
    }
}

/// Bike numbers show up both as `"12345"` and `12345` depending on the API version.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Numeric ids, numeric strings, or 0 for anything else. Rides never read
/// the id, so an odd one must not drop the item.
fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// A completed rental with its temporal and distance facts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalRide {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub duration_minutes: f64,
    pub distance_km: f64,
    /// `YYYY-MM-DD` of `start_time` in the configured offset.
    pub day_key: String,
    pub bike_id: Option<String>,
}

impl RentalRide {
    /// `YYYY-MM` of `start_time` in the configured offset.
    pub fn month_key(&self) -> String {
        self.start_time.format("%Y-%m").to_string()
    }
}

/// The spatial view of a rental, used for map display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideSegment {
    pub id: i64,
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_rides: usize,
    pub total_distance_km: f64,
    pub total_duration_minutes: f64,
    pub avg_distance_per_ride_day_km: f64,
    pub avg_trips_per_ride_day: f64,
    pub avg_duration_per_ride_day_minutes: f64,
}

/// Summary statistics restricted to one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub month_key: String,
    #[serde(flatten)]
    pub stats: SummaryStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyHeatmapCell {
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u32,
    /// 0..=23
    pub hour: u32,
    pub distance_km: f64,
}

/// Sparse weekday/hour heatmap plus the largest cell value for colour scaling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlyHeatmap {
    pub cells: Vec<HourlyHeatmapCell>,
    pub max_distance_km: f64,
}

impl HourlyHeatmap {
    /// Dense 24x7 matrix indexed as `grid[hour][weekday]`, zero where no cell exists.
    pub fn to_grid(&self) -> [[f64; 7]; 24] {
        let mut grid = [[0.0; 7]; 24];
        for cell in &self.cells {
            if let Some(row) = grid.get_mut(cell.hour as usize) {
                if let Some(slot) = row.get_mut(cell.weekday as usize) {
                    *slot += cell.distance_km;
                }
            }
        }
        grid
    }
}

/// One rung of the histogram ladder. `max_km = None` means open-ended.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DistanceBucket {
    pub label: String,
    pub min_km: f64,
    pub max_km: Option<f64>,
}

impl DistanceBucket {
    pub fn new(label: &str, min_km: f64, max_km: Option<f64>) -> Self {
        Self {
            label: label.to_string(),
            min_km,
            max_km,
        }
    }

    /// `min_km` inclusive, `max_km` exclusive.
    pub fn contains(&self, distance_km: f64) -> bool {
        distance_km >= self.min_km && self.max_km.is_none_or(|max| distance_km < max)
    }

    /// `< 1, 1–2, 2–3, 3–5, 5–10, 10–20, ≥ 20` km.
    pub fn default_ladder() -> Vec<DistanceBucket> {
        vec![
            DistanceBucket::new("< 1 km", 0.0, Some(1.0)),
            DistanceBucket::new("1–2 km", 1.0, Some(2.0)),
            DistanceBucket::new("2–3 km", 2.0, Some(3.0)),
            DistanceBucket::new("3–5 km", 3.0, Some(5.0)),
            DistanceBucket::new("5–10 km", 5.0, Some(10.0)),
            DistanceBucket::new("10–20 km", 10.0, Some(20.0)),
            DistanceBucket::new("≥ 20 km", 20.0, None),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceHistogramBin {
    pub bucket_label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteBikeResult {
    pub bike_id: String,
    pub ride_count: usize,
}

/// Bounding box over all segment endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentBounds {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

/// Segment endpoints sharing one location, rounded to six decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointCluster {
    pub lat: f64,
    pub lng: f64,
    pub count: usize,
    pub segment_ids: Vec<i64>,
}

/// Popular start points and end points, each ordered by location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EndpointClusters {
    pub starts: Vec<EndpointCluster>,
    pub ends: Vec<EndpointCluster>,
}
