//! Normalizes a raw account batch into typed rides and segments.
//!
//! Both extractors are filters: items that do not qualify are skipped with a
//! `debug!` line, never reported as errors.

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};

use crate::config::AnalyticsConfig;
use crate::distance::estimate_distance_km;
use crate::models::{RawAccountItem, RentalRide, RideSegment};

/// Rentals shorter than this are treated as cancellations.
pub const MIN_RIDE_MINUTES: f64 = 1.0;

fn to_local(secs: i64, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(secs, 0).map(|t| t.with_timezone(offset))
}

/// Reported distance, then estimated distance, then the adjusted haversine
/// estimate over the endpoints, then zero.
fn resolve_distance_km(item: &RawAccountItem, config: &AnalyticsConfig) -> f64 {
    if let Some(meters) = item.reported_meters() {
        return meters / 1000.0;
    }
    match item.coordinates() {
        Some((lat1, lng1, lat2, lng2)) => {
            estimate_distance_km(lat1, lng1, lat2, lng2, config.haversine_adjustment_factor)
        }
        None => 0.0,
    }
}

fn to_ride(
    item: &RawAccountItem,
    config: &AnalyticsConfig,
    offset: &FixedOffset,
) -> Option<RentalRide> {
    if !item.is_rental() {
        return None;
    }

    let (start_time, end_time) = match (item.start_time, item.end_time) {
        (Some(start), Some(end)) => (to_local(start, offset)?, to_local(end, offset)?),
        _ => {
            debug!(id = item.id, "Skipping rental without start/end time");
            return None;
        }
    };

    let duration_minutes = (end_time - start_time).num_seconds() as f64 / 60.0;
    if duration_minutes < MIN_RIDE_MINUTES {
        debug!(id = item.id, duration_minutes, "Skipping short rental");
        return None;
    }

    Some(RentalRide {
        start_time,
        end_time,
        duration_minutes,
        distance_km: resolve_distance_km(item, config),
        day_key: start_time.format("%Y-%m-%d").to_string(),
        bike_id: item.bike.clone(),
    })
}

fn to_segment(
    item: &RawAccountItem,
    config: &AnalyticsConfig,
    offset: &FixedOffset,
) -> Option<RideSegment> {
    if !item.is_rental() {
        return None;
    }

    let Some((start_lat, start_lng, end_lat, end_lng)) = item.coordinates() else {
        debug!(id = item.id, "Skipping rental without coordinates");
        return None;
    };

    Some(RideSegment {
        id: item.id,
        start_lat,
        start_lng,
        end_lat,
        end_lng,
        start_time: item.start_time.and_then(|t| to_local(t, offset)),
        end_time: item.end_time.and_then(|t| to_local(t, offset)),
        distance_km: resolve_distance_km(item, config),
    })
}

/// Extracts completed rentals lasting at least [`MIN_RIDE_MINUTES`].
#[tracing::instrument(skip_all, fields(items = items.len()))]
pub fn extract_rental_rides(items: &[RawAccountItem], config: &AnalyticsConfig) -> Vec<RentalRide> {
    let offset = config.offset();
    let rides: Vec<RentalRide> = items
        .iter()
        .filter_map(|item| to_ride(item, config, &offset))
        .collect();
    info!(rides = rides.len(), "Rental rides extracted");
    rides
}

/// Extracts every rental that carries all four endpoint coordinates.
#[tracing::instrument(skip_all, fields(items = items.len()))]
pub fn extract_ride_segments(
    items: &[RawAccountItem],
    config: &AnalyticsConfig,
) -> Vec<RideSegment> {
    let offset = config.offset();
    let segments: Vec<RideSegment> = items
        .iter()
        .filter_map(|item| to_segment(item, config, &offset))
        .collect();
    info!(segments = segments.len(), "Ride segments extracted");
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::haversine_km;

    fn rental(start: i64, end: i64) -> RawAccountItem {
        RawAccountItem {
            id: 1,
            node: "rental".to_string(),
            start_time: Some(start),
            end_time: Some(end),
            ..Default::default()
        }
    }

    fn with_coords(mut item: RawAccountItem) -> RawAccountItem {
        item.start_place_lat = Some(51.3397);
        item.start_place_lng = Some(12.3731);
        item.end_place_lat = Some(51.3600);
        item.end_place_lng = Some(12.4000);
        item
    }

    #[test]
    fn test_single_rental_end_to_end() {
        let mut item = rental(1700000000, 1700000600);
        item.distance = Some(2000.0);

        let rides = extract_rental_rides(&[item], &AnalyticsConfig::default());

        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0].duration_minutes, 10.0);
        assert_eq!(rides[0].distance_km, 2.0);
        assert_eq!(rides[0].day_key, "2023-11-14");
    }

    #[test]
    fn test_non_rental_items_are_dropped() {
        let mut item = rental(1700000000, 1700000600);
        item.node = "payment".to_string();
        let other = RawAccountItem {
            node: "booking".to_string(),
            ..Default::default()
        };

        let config = AnalyticsConfig::default();
        assert!(extract_rental_rides(&[item.clone(), other.clone()], &config).is_empty());
        assert!(extract_ride_segments(&[with_coords(item), other], &config).is_empty());
    }

    #[test]
    fn test_missing_timestamps_are_dropped() {
        let mut item = rental(1700000000, 1700000600);
        item.end_time = None;

        assert!(extract_rental_rides(&[item], &AnalyticsConfig::default()).is_empty());
    }

    #[test]
    fn test_rides_under_one_minute_are_dropped() {
        let items = vec![
            rental(1700000000, 1700000059),
            rental(1700000000, 1700000000),
            rental(1700000600, 1700000000),
            rental(1700000000, 1700000060),
        ];

        let rides = extract_rental_rides(&items, &AnalyticsConfig::default());

        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0].duration_minutes, 1.0);
    }

    #[test]
    fn test_reported_distance_beats_coordinates() {
        let mut item = with_coords(rental(1700000000, 1700000600));
        item.distance = Some(5000.0);

        let rides = extract_rental_rides(&[item], &AnalyticsConfig::default());

        assert_eq!(rides[0].distance_km, 5.0);
    }

    #[test]
    fn test_estimated_distance_used_when_reported_is_zero() {
        let mut item = with_coords(rental(1700000000, 1700000600));
        item.distance = Some(0.0);
        item.distance_estimated = Some(3100.0);

        let rides = extract_rental_rides(&[item], &AnalyticsConfig::default());

        assert_eq!(rides[0].distance_km, 3.1);
    }

    #[test]
    fn test_haversine_fallback_applies_factor() {
        let item = with_coords(rental(1700000000, 1700000600));
        let expected = haversine_km(51.3397, 12.3731, 51.3600, 12.4000);

        let adjusted = extract_rental_rides(&[item.clone()], &AnalyticsConfig::default());
        let raw = extract_rental_rides(
            &[item],
            &AnalyticsConfig::default().with_adjustment_factor(1.0),
        );

        assert!((raw[0].distance_km - expected).abs() < 1e-9);
        assert!((adjusted[0].distance_km - expected * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_no_distance_information_is_zero() {
        let rides = extract_rental_rides(&[rental(1700000000, 1700000600)], &AnalyticsConfig::default());
        assert_eq!(rides[0].distance_km, 0.0);
    }

    #[test]
    fn test_day_key_follows_offset() {
        // 2023-11-14T23:30:00Z
        let item = rental(1700004600, 1700005200);

        let utc = extract_rental_rides(&[item.clone()], &AnalyticsConfig::default());
        let cet = extract_rental_rides(
            &[item],
            &AnalyticsConfig::default().with_utc_offset_minutes(60),
        );

        assert_eq!(utc[0].day_key, "2023-11-14");
        assert_eq!(cet[0].day_key, "2023-11-15");
    }

    #[test]
    fn test_bike_id_is_carried() {
        let mut item = rental(1700000000, 1700000600);
        item.bike = Some("4711".to_string());

        let rides = extract_rental_rides(&[item], &AnalyticsConfig::default());

        assert_eq!(rides[0].bike_id.as_deref(), Some("4711"));
    }

    #[test]
    fn test_segments_require_all_coordinates() {
        let mut partial = with_coords(rental(1700000000, 1700000600));
        partial.end_place_lng = None;

        let segments = extract_ride_segments(&[partial], &AnalyticsConfig::default());

        assert!(segments.is_empty());
    }

    #[test]
    fn test_segments_keep_missing_timestamps_as_none() {
        let mut item = with_coords(rental(1700000000, 1700000600));
        item.id = 42;
        item.start_time = None;
        item.end_time = None;
        item.distance_estimated = Some(1234.0);

        let segments = extract_ride_segments(&[item], &AnalyticsConfig::default());

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, 42);
        assert_eq!(segments[0].start_time, None);
        assert_eq!(segments[0].end_time, None);
        assert_eq!(segments[0].distance_km, 1.234);
    }

    #[test]
    fn test_short_rental_still_yields_segment() {
        let item = with_coords(rental(1700000000, 1700000010));
        let config = AnalyticsConfig::default();

        assert!(extract_rental_rides(&[item.clone()], &config).is_empty());
        assert_eq!(extract_ride_segments(&[item], &config).len(), 1);
    }

    #[test]
    fn test_segment_haversine_fallback_applies_factor() {
        let item = with_coords(rental(1700000000, 1700000600));
        let expected = haversine_km(51.3397, 12.3731, 51.3600, 12.4000);

        let adjusted = extract_ride_segments(&[item.clone()], &AnalyticsConfig::default());
        let raw = extract_ride_segments(
            &[item],
            &AnalyticsConfig::default().with_adjustment_factor(1.0),
        );

        assert!((raw[0].distance_km - expected).abs() < 1e-9);
        assert!((adjusted[0].distance_km - expected * 1.2).abs() < 1e-9);
    }
}
