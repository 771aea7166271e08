//! CSV import of chart series and export of daily totals.

use crate::metrics::{calories_by_kind, net_calorie_balance, total_sodium};
use crate::{
    ActivityKind, ActivityLogEntry, Error, LoggedActivity, Result, SeriesKind, TimeSeries,
    TimeSeriesPoint,
};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::Path;

/// Input row: `label,value`
#[derive(Debug, Deserialize)]
struct SeriesRow {
    label: String,
    value: f64,
}

/// Output row of the daily totals export
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyTotalsRow {
    pub date: NaiveDate,
    pub consumed: i32,
    pub burned: i32,
    pub net: i32,
    pub sodium_mg: u32,
}

/// Load a `label,value` CSV (with headers) as a series of `kind`
///
/// Rows that fail to parse are skipped with a warning.
pub fn load_series_csv(path: &Path, kind: SeriesKind) -> Result<TimeSeries> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut points = Vec::new();
    for (i, result) in reader.deserialize::<SeriesRow>().enumerate() {
        match result {
            Ok(row) if row.value.is_finite() => {
                points.push(TimeSeriesPoint::new(row.label, row.value))
            }
            Ok(row) => tracing::warn!("Skipping non-finite value for '{}'", row.label),
            Err(e) => tracing::warn!("Failed to parse series row {}: {}", i + 1, e),
        }
    }

    if points.is_empty() {
        return Err(Error::EmptySeries(format!(
            "no valid rows in {}",
            path.display()
        )));
    }

    tracing::info!("Loaded {} {:?} points from {:?}", points.len(), kind, path);
    Ok(TimeSeries::new(kind, points))
}

fn group_by_day(records: &[LoggedActivity]) -> BTreeMap<NaiveDate, Vec<ActivityLogEntry>> {
    let mut days: BTreeMap<NaiveDate, Vec<ActivityLogEntry>> = BTreeMap::new();
    for record in records {
        days.entry(record.logged_at.date_naive())
            .or_default()
            .push(record.entry.clone());
    }
    days
}

/// Per-day totals, oldest first
pub fn daily_totals(records: &[LoggedActivity]) -> Vec<DailyTotalsRow> {
    group_by_day(records)
        .into_iter()
        .map(|(date, entries)| {
            let consumed = calories_by_kind(&entries, ActivityKind::Meal);
            let burned = calories_by_kind(&entries, ActivityKind::Workout);
            DailyTotalsRow {
                date,
                consumed,
                burned,
                net: net_calorie_balance(&entries),
                sodium_mg: total_sodium(&entries),
            }
        })
        .collect()
}

/// Build a chart series from journal records, one point per day
///
/// Days are labelled with their short weekday name. Weight has no journal
/// source and yields an empty series.
pub fn journal_series(records: &[LoggedActivity], kind: SeriesKind) -> TimeSeries {
    let points = match kind {
        SeriesKind::Calorie => daily_totals(records)
            .into_iter()
            .map(|row| TimeSeriesPoint::new(row.date.format("%a").to_string(), row.consumed as f64))
            .collect(),
        SeriesKind::Sodium => daily_totals(records)
            .into_iter()
            .map(|row| {
                TimeSeriesPoint::new(row.date.format("%a").to_string(), row.sodium_mg as f64)
            })
            .collect(),
        SeriesKind::Weight => Vec::new(),
    };
    TimeSeries::new(kind, points)
}

/// Write per-day totals to a CSV file, replacing any previous export
///
/// Returns the number of days written.
pub fn export_daily_totals(records: &[LoggedActivity], csv_path: &Path) -> Result<usize> {
    let rows = daily_totals(records);

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(csv_path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    for row in &rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} days to {:?}", rows.len(), csv_path);
    Ok(rows.len())
}
