//! Aggregations over an extracted (and optionally filtered) ride collection.
//!
//! Every function here is pure and independent; map iteration goes through
//! `BTreeMap` so repeated calls on the same input give identical output.

use chrono::{Datelike, Timelike};
use std::collections::BTreeMap;

use crate::models::{
    DistanceBucket, DistanceHistogramBin, EndpointCluster, EndpointClusters, FavoriteBikeResult,
    HourlyHeatmap, HourlyHeatmapCell, MonthlyStats, RentalRide, RideSegment, SegmentBounds,
    SummaryStats,
};

#[derive(Debug, Default)]
struct DayTotals {
    distance_km: f64,
    duration_minutes: f64,
    trips: usize,
}

fn group_by_day(rides: &[RentalRide]) -> BTreeMap<&str, DayTotals> {
    let mut per_day: BTreeMap<&str, DayTotals> = BTreeMap::new();
    for ride in rides {
        let day = per_day.entry(ride.day_key.as_str()).or_default();
        day.distance_km += ride.distance_km;
        day.duration_minutes += ride.duration_minutes;
        day.trips += 1;
    }
    per_day
}

/// Totals plus per-ride-day averages. A ride day is a day with at least one ride.
pub fn compute_summary_stats(rides: &[RentalRide]) -> SummaryStats {
    if rides.is_empty() {
        return SummaryStats::default();
    }

    let total_distance_km: f64 = rides.iter().map(|r| r.distance_km).sum();
    let total_duration_minutes: f64 = rides.iter().map(|r| r.duration_minutes).sum();

    let per_day = group_by_day(rides);
    let ride_days: Vec<&DayTotals> = per_day.values().filter(|d| d.trips > 0).collect();
    let ride_day_count = ride_days.len().max(1) as f64;

    let day_distance: f64 = ride_days.iter().map(|d| d.distance_km).sum();
    let day_duration: f64 = ride_days.iter().map(|d| d.duration_minutes).sum();

    SummaryStats {
        total_rides: rides.len(),
        total_distance_km,
        total_duration_minutes,
        avg_distance_per_ride_day_km: day_distance / ride_day_count,
        avg_trips_per_ride_day: rides.len() as f64 / ride_day_count,
        avg_duration_per_ride_day_minutes: day_duration / ride_day_count,
    }
}

/// One [`SummaryStats`] per month that has rides, ascending by `YYYY-MM`.
pub fn compute_monthly_stats(rides: &[RentalRide]) -> Vec<MonthlyStats> {
    let mut by_month: BTreeMap<String, Vec<RentalRide>> = BTreeMap::new();
    for ride in rides {
        by_month.entry(ride.month_key()).or_default().push(ride.clone());
    }

    by_month
        .into_iter()
        .map(|(month_key, month_rides)| MonthlyStats {
            month_key,
            stats: compute_summary_stats(&month_rides),
        })
        .collect()
}

/// Distance summed per (weekday, hour) of ride start. Only non-empty cells are
/// returned, ordered by weekday then hour.
pub fn compute_hourly_heatmap(rides: &[RentalRide]) -> HourlyHeatmap {
    let mut buckets: BTreeMap<(u32, u32), f64> = BTreeMap::new();
    for ride in rides {
        let weekday = ride.start_time.weekday().num_days_from_sunday();
        let hour = ride.start_time.hour();
        *buckets.entry((weekday, hour)).or_default() += ride.distance_km;
    }

    let cells: Vec<HourlyHeatmapCell> = buckets
        .into_iter()
        .map(|((weekday, hour), distance_km)| HourlyHeatmapCell {
            weekday,
            hour,
            distance_km,
        })
        .collect();
    let max_distance_km = cells.iter().map(|c| c.distance_km).fold(0.0, f64::max);

    HourlyHeatmap {
        cells,
        max_distance_km,
    }
}

/// Counts rides per bucket using the first bucket that contains the distance.
/// Empty bins are omitted; the rest keep ladder order.
pub fn compute_distance_histogram(
    rides: &[RentalRide],
    buckets: &[DistanceBucket],
) -> Vec<DistanceHistogramBin> {
    let mut counts = vec![0usize; buckets.len()];
    for ride in rides {
        if let Some(idx) = buckets.iter().position(|b| b.contains(ride.distance_km)) {
            counts[idx] += 1;
        }
    }

    buckets
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(bucket, count)| DistanceHistogramBin {
            bucket_label: bucket.label.clone(),
            count,
        })
        .collect()
}

/// The bike used on the most rides. Ties go to the lowest identifier.
pub fn compute_favorite_bike(rides: &[RentalRide]) -> Option<FavoriteBikeResult> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for bike_id in rides.iter().filter_map(|r| r.bike_id.as_deref()) {
        *counts.entry(bike_id).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (bike_id, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((bike_id, count));
        }
    }

    best.map(|(bike_id, ride_count)| FavoriteBikeResult {
        bike_id: bike_id.to_string(),
        ride_count,
    })
}

/// Bounding box over the start and end points of all segments.
pub fn compute_segment_bounds(segments: &[RideSegment]) -> Option<SegmentBounds> {
    let first = segments.first()?;
    let init = SegmentBounds {
        min_lat: first.start_lat,
        min_lng: first.start_lng,
        max_lat: first.start_lat,
        max_lng: first.start_lng,
    };

    Some(segments.iter().fold(init, |b, s| SegmentBounds {
        min_lat: b.min_lat.min(s.start_lat).min(s.end_lat),
        min_lng: b.min_lng.min(s.start_lng).min(s.end_lng),
        max_lat: b.max_lat.max(s.start_lat).max(s.end_lat),
        max_lng: b.max_lng.max(s.start_lng).max(s.end_lng),
    }))
}

/// Key for a coordinate pair rounded to six decimals (about 0.1 m).
fn location_key(lat: f64, lng: f64) -> (i64, i64) {
    ((lat * 1e6).round() as i64, (lng * 1e6).round() as i64)
}

fn add_endpoint(
    clusters: &mut BTreeMap<(i64, i64), EndpointCluster>,
    lat: f64,
    lng: f64,
    id: i64,
) {
    let cluster = clusters
        .entry(location_key(lat, lng))
        .or_insert_with(|| EndpointCluster {
            lat,
            lng,
            count: 0,
            segment_ids: Vec::new(),
        });
    cluster.count += 1;
    cluster.segment_ids.push(id);
}

/// Groups segment start points and end points by location. Each cluster keeps
/// the coordinates of its first segment and the ids of all its segments.
pub fn compute_endpoint_clusters(segments: &[RideSegment]) -> EndpointClusters {
    let mut starts = BTreeMap::new();
    let mut ends = BTreeMap::new();
    for s in segments {
        add_endpoint(&mut starts, s.start_lat, s.start_lng, s.id);
        add_endpoint(&mut ends, s.end_lat, s.end_lng, s.id);
    }

    EndpointClusters {
        starts: starts.into_values().collect(),
        ends: ends.into_values().collect(),
    }
}
