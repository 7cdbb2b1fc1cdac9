//! Calendar-day range filtering of rides and segments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{RentalRide, RideSegment};

/// Inclusive date window. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start.is_none_or(|start| day >= start) && self.end.is_none_or(|end| day <= end)
    }
}

/// Keeps rides whose start day lies in `range`.
pub fn filter_rides(rides: &[RentalRide], range: &DateRange) -> Vec<RentalRide> {
    rides
        .iter()
        .filter(|ride| range.contains(ride.start_time.date_naive()))
        .cloned()
        .collect()
}

/// Keeps segments whose start day lies in `range`. Segments without a start
/// time only pass an unbounded range.
pub fn filter_segments(segments: &[RideSegment], range: &DateRange) -> Vec<RideSegment> {
    if range.is_unbounded() {
        return segments.to_vec();
    }
    segments
        .iter()
        .filter(|segment| {
            segment
                .start_time
                .is_some_and(|start| range.contains(start.date_naive()))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    fn ride(start: DateTime<FixedOffset>) -> RentalRide {
        RentalRide {
            start_time: start,
            end_time: start + chrono::Duration::minutes(10),
            duration_minutes: 10.0,
            distance_km: 1.0,
            day_key: start.format("%Y-%m-%d").to_string(),
            bike_id: None,
        }
    }

    fn segment(start: Option<DateTime<FixedOffset>>) -> RideSegment {
        RideSegment {
            id: 1,
            start_lat: 0.0,
            start_lng: 0.0,
            end_lat: 0.0,
            end_lng: 0.0,
            start_time: start,
            end_time: start,
            distance_km: 1.0,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_is_inclusive_by_day() {
        let rides = vec![
            ride(at(2024, 3, 31, 23)),
            ride(at(2024, 4, 1, 0)),
            ride(at(2024, 4, 30, 23)),
            ride(at(2024, 5, 1, 0)),
        ];

        let range = DateRange::between(day(2024, 4, 1), day(2024, 4, 30));
        let filtered = filter_rides(&rides, &range);

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].day_key, "2024-04-01");
        assert_eq!(filtered[1].day_key, "2024-04-30");
    }

    #[test]
    fn test_open_bounds() {
        let rides = vec![ride(at(2023, 1, 1, 8)), ride(at(2025, 1, 1, 8))];

        let from = DateRange::new(Some(day(2024, 1, 1)), None);
        let until = DateRange::new(None, Some(day(2024, 1, 1)));

        assert_eq!(filter_rides(&rides, &from).len(), 1);
        assert_eq!(filter_rides(&rides, &until).len(), 1);
        assert_eq!(filter_rides(&rides, &DateRange::default()).len(), 2);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let rides = vec![ride(at(2024, 4, 10, 8))];
        let range = DateRange::between(day(2024, 4, 30), day(2024, 4, 1));

        assert!(filter_rides(&rides, &range).is_empty());
    }

    #[test]
    fn test_segments_without_start_time() {
        let segments = vec![segment(None), segment(Some(at(2024, 4, 10, 8)))];

        let range = DateRange::between(day(2024, 4, 1), day(2024, 4, 30));

        assert_eq!(filter_segments(&segments, &range).len(), 1);
        assert_eq!(filter_segments(&segments, &DateRange::default()).len(), 2);
    }
}
