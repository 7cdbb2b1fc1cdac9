//! Bundles every derived view into one serializable report.

use serde::Serialize;
use tracing::info;

use crate::config::AnalyticsConfig;
use crate::extract::{extract_rental_rides, extract_ride_segments};
use crate::filter::{DateRange, filter_rides, filter_segments};
use crate::models::{
    DistanceHistogramBin, EndpointClusters, FavoriteBikeResult, HourlyHeatmap, MonthlyStats,
    RawAccountItem, RentalRide, RideSegment, SegmentBounds, SummaryStats,
};
use crate::stats::{
    compute_distance_histogram, compute_endpoint_clusters, compute_favorite_bike,
    compute_hourly_heatmap, compute_monthly_stats, compute_segment_bounds, compute_summary_stats,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub range: DateRange,
    pub segment_count: usize,
    pub summary: SummaryStats,
    pub monthly: Vec<MonthlyStats>,
    pub heatmap: HourlyHeatmap,
    pub histogram: Vec<DistanceHistogramBin>,
    pub favorite_bike: Option<FavoriteBikeResult>,
    pub bounds: Option<SegmentBounds>,
    pub endpoints: EndpointClusters,
}

impl AnalyticsReport {
    /// Computes all views over rides and segments that were already filtered.
    pub fn build(
        rides: &[RentalRide],
        segments: &[RideSegment],
        range: DateRange,
        config: &AnalyticsConfig,
    ) -> Self {
        AnalyticsReport {
            range,
            segment_count: segments.len(),
            summary: compute_summary_stats(rides),
            monthly: compute_monthly_stats(rides),
            heatmap: compute_hourly_heatmap(rides),
            histogram: compute_distance_histogram(rides, &config.distance_buckets),
            favorite_bike: compute_favorite_bike(rides),
            bounds: compute_segment_bounds(segments),
            endpoints: compute_endpoint_clusters(segments),
        }
    }

    /// Full pass: extract, filter by `range`, aggregate.
    #[tracing::instrument(skip_all, fields(items = items.len()))]
    pub fn from_items(items: &[RawAccountItem], range: DateRange, config: &AnalyticsConfig) -> Self {
        let rides = filter_rides(&extract_rental_rides(items, config), &range);
        let segments = filter_segments(&extract_ride_segments(items, config), &range);

        info!(
            rides = rides.len(),
            segments = segments.len(),
            "Building analytics report"
        );

        Self::build(&rides, &segments, range, config)
    }
}
