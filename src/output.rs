//! Output formatting and persistence for analytics reports.
//!
//! Supports pretty-printing, JSON files, and CSV export of monthly stats.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use tracing::{debug, info};

use crate::models::MonthlyStats;
use crate::report::AnalyticsReport;

/// Flat CSV row; the csv writer cannot serialize flattened structs.
#[derive(Debug, Serialize)]
struct MonthlyRow<'a> {
    month: &'a str,
    total_rides: usize,
    total_distance_km: f64,
    total_duration_minutes: f64,
    avg_distance_per_ride_day_km: f64,
    avg_trips_per_ride_day: f64,
    avg_duration_per_ride_day_minutes: f64,
}

impl<'a> From<&'a MonthlyStats> for MonthlyRow<'a> {
    fn from(m: &'a MonthlyStats) -> Self {
        MonthlyRow {
            month: &m.month_key,
            total_rides: m.stats.total_rides,
            total_distance_km: m.stats.total_distance_km,
            total_duration_minutes: m.stats.total_duration_minutes,
            avg_distance_per_ride_day_km: m.stats.avg_distance_per_ride_day_km,
            avg_trips_per_ride_day: m.stats.avg_trips_per_ride_day,
            avg_duration_per_ride_day_minutes: m.stats.avg_duration_per_ride_day_minutes,
        }
    }
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &AnalyticsReport) {
    debug!("{:#?}", report);
}

/// Logs a human-readable summary of the report.
pub fn print_summary(report: &AnalyticsReport) {
    let s = &report.summary;
    info!(
        total_rides = s.total_rides,
        total_distance_km = %format!("{:.2}", s.total_distance_km),
        total_duration_minutes = %format!("{:.0}", s.total_duration_minutes),
        avg_distance_per_ride_day_km = %format!("{:.2}", s.avg_distance_per_ride_day_km),
        avg_trips_per_ride_day = %format!("{:.2}", s.avg_trips_per_ride_day),
        "Summary"
    );

    for month in &report.monthly {
        info!(
            month = %month.month_key,
            rides = month.stats.total_rides,
            distance_km = %format!("{:.2}", month.stats.total_distance_km),
            "Month"
        );
    }

    for bin in &report.histogram {
        info!(bucket = %bin.bucket_label, count = bin.count, "Distance bucket");
    }

    if let Some(favorite) = &report.favorite_bike {
        info!(bike = %favorite.bike_id, rides = favorite.ride_count, "Favorite bike");
    }
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &AnalyticsReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes any serializable value to `path` as pretty JSON, replacing the file.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create '{path}'"))?;
    serde_json::to_writer_pretty(file, value)?;
    debug!(path, "JSON written");
    Ok(())
}

/// Writes one CSV row per month, headers included, replacing the file.
pub fn write_monthly_csv(path: &str, monthly: &[MonthlyStats]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create '{path}'"))?;

    for month in monthly {
        writer.serialize(MonthlyRow::from(month))?;
    }
    writer.flush()?;

    debug!(path, rows = monthly.len(), "Monthly CSV written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::filter::DateRange;
    use crate::models::SummaryStats;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn empty_report() -> AnalyticsReport {
        AnalyticsReport::build(&[], &[], DateRange::default(), &AnalyticsConfig::default())
    }

    fn month(key: &str, rides: usize) -> MonthlyStats {
        MonthlyStats {
            month_key: key.to_string(),
            stats: SummaryStats {
                total_rides: rides,
                total_distance_km: 2.5,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&empty_report());
        print_summary(&empty_report());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&empty_report()).unwrap();
    }

    #[test]
    fn test_write_json_roundtrips_fields() {
        let path = temp_path("nextbike_analytics_test_report.json");
        let _ = fs::remove_file(&path);

        write_json(&path, &empty_report()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["total_rides"], 0);
        assert!(value["favorite_bike"].is_null());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_monthly_csv_rows() {
        let path = temp_path("nextbike_analytics_test_monthly.csv");
        let _ = fs::remove_file(&path);

        write_monthly_csv(&path, &[month("2024-03", 3), month("2024-04", 1)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("month,total_rides"));
        assert!(lines[1].starts_with("2024-03,3,2.5"));

        fs::remove_file(&path).unwrap();
    }
}
