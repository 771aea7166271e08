//! Derived nutrition and fitness metrics.
//!
//! Every function here is pure: identical inputs always give identical
//! outputs. Degenerate inputs (zero height, zero distance, negative
//! duration) are reported as `Error::InvalidInput` instead of degrading to
//! infinities or placeholder values.

use crate::{ActivityKind, ActivityLogEntry, Error, LoggedActivity, NutritionTarget, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Body mass index: weight / (height in metres)^2
pub fn bmi(weight_kg: f64, height_cm: f64) -> Result<f64> {
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err(Error::invalid(format!(
            "height must be positive, got {}",
            height_cm
        )));
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(Error::invalid(format!(
            "weight must be positive, got {}",
            weight_kg
        )));
    }

    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

/// Estimated calories burned: round(MET x kg x hours)
///
/// A zero duration burns nothing. Negative durations, negative MET values
/// and non-positive weights are rejected.
pub fn calories_burned(met: f64, weight_kg: f64, duration_minutes: f64) -> Result<u32> {
    if !met.is_finite() || met < 0.0 {
        return Err(Error::invalid(format!("MET must be non-negative, got {}", met)));
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(Error::invalid(format!(
            "weight must be positive, got {}",
            weight_kg
        )));
    }
    if !duration_minutes.is_finite() || duration_minutes < 0.0 {
        return Err(Error::invalid(format!(
            "duration must be non-negative, got {}",
            duration_minutes
        )));
    }

    let kcal = (met * weight_kg * (duration_minutes / 60.0)).round();
    if kcal > i32::MAX as f64 {
        return Err(Error::invalid(format!(
            "calorie burn of {} kcal is out of range",
            kcal
        )));
    }
    Ok(kcal as u32)
}

/// Narrow a 64-bit total back to `i32`, pinning at the bounds
pub(crate) fn saturate_i32(total: i64) -> i32 {
    total.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn sum_calories(entries: &[ActivityLogEntry], kind: ActivityKind) -> i64 {
    entries
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.calories as i64)
        .sum()
}

/// Sum of calories for one kind of entry
///
/// Totals are accumulated in 64 bits and saturate at the `i32` bounds.
pub fn calories_by_kind(entries: &[ActivityLogEntry], kind: ActivityKind) -> i32 {
    saturate_i32(sum_calories(entries, kind))
}

/// Intake minus burn over a set of entries
pub fn net_calorie_balance(entries: &[ActivityLogEntry]) -> i32 {
    saturate_i32(
        sum_calories(entries, ActivityKind::Meal) - sum_calories(entries, ActivityKind::Workout),
    )
}

/// Total sodium across meal entries, saturating at `u32::MAX`
pub fn total_sodium(entries: &[ActivityLogEntry]) -> u32 {
    let total: u64 = entries.iter().filter_map(|e| e.sodium_mg).map(u64::from).sum();
    total.min(u32::MAX as u64) as u32
}

/// Running pace in minutes and seconds per kilometre
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pace {
    pub minutes: u32,
    pub seconds: u32,
}

impl Pace {
    /// Placeholder shown before any distance has been covered
    pub const ZERO: Pace = Pace {
        minutes: 0,
        seconds: 0,
    };

    pub fn from_seconds_per_km(total_seconds: u32) -> Self {
        Self {
            minutes: total_seconds / 60,
            seconds: total_seconds % 60,
        }
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

/// Pace for a tracked run
pub fn pace_min_per_km(distance_km: f64, elapsed_seconds: u64) -> Result<Pace> {
    if !distance_km.is_finite() || distance_km <= 0.0 {
        return Err(Error::invalid(format!(
            "distance must be positive to compute pace, got {}",
            distance_km
        )));
    }

    // Round the total before splitting so we never display M:60
    let per_km = (elapsed_seconds as f64 / distance_km).round();
    if per_km > u32::MAX as f64 {
        return Err(Error::invalid("pace exceeds displayable range"));
    }
    Ok(Pace::from_seconds_per_km(per_km as u32))
}

/// Average speed in km/h
pub fn speed_kmh(distance_km: f64, elapsed_seconds: u64) -> Result<f64> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(Error::invalid(format!(
            "distance must be non-negative, got {}",
            distance_km
        )));
    }
    if elapsed_seconds == 0 {
        return Err(Error::invalid("elapsed time must be non-zero to compute speed"));
    }

    Ok(distance_km / (elapsed_seconds as f64 / 3600.0))
}

/// Rounded arithmetic mean, `None` when there is nothing to average
pub fn weekly_average(values: &[i32]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().map(|v| *v as i64).sum();
    Some((sum as f64 / values.len() as f64).round() as i32)
}

/// Total daily energy expenditure, approximated as the mean daily net
/// intake over the supplied days.
pub fn estimate_tdee(daily_net: &[i32]) -> Option<i32> {
    weekly_average(daily_net)
}

/// Percentage of the daily calorie target
pub fn calorie_percent(target: &NutritionTarget, calories: i32) -> f64 {
    calories as f64 * 100.0 / target.daily_calories() as f64
}

/// Percentage of the daily sodium target
pub fn sodium_percent(target: &NutritionTarget, sodium_mg: u32) -> f64 {
    sodium_mg as f64 * 100.0 / target.daily_sodium_mg() as f64
}

/// Dashboard numbers for a single day of entries
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailySummary {
    pub consumed: i32,
    pub burned: i32,
    pub net: i32,
    /// Target minus net; negative once the target is exceeded
    pub remaining: i32,
    pub calorie_percent: f64,
    pub sodium_mg: u32,
    pub sodium_percent: f64,
}

impl DailySummary {
    pub fn from_entries(entries: &[ActivityLogEntry], target: &NutritionTarget) -> Self {
        let consumed = calories_by_kind(entries, ActivityKind::Meal);
        let burned = calories_by_kind(entries, ActivityKind::Workout);
        let net = net_calorie_balance(entries);
        let sodium_mg = total_sodium(entries);

        Self {
            consumed,
            burned,
            net,
            remaining: saturate_i32(target.daily_calories() as i64 - net as i64),
            calorie_percent: calorie_percent(target, net),
            sodium_mg,
            sodium_percent: sodium_percent(target, sodium_mg),
        }
    }
}

/// Net calories per UTC calendar day, oldest first
pub fn daily_net_totals(records: &[LoggedActivity]) -> BTreeMap<NaiveDate, i32> {
    let mut totals: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for record in records {
        let calories = record.entry.calories as i64;
        let delta = match record.entry.kind {
            ActivityKind::Meal => calories,
            ActivityKind::Workout => -calories,
        };
        *totals.entry(record.logged_at.date_naive()).or_insert(0) += delta;
    }
    totals
        .into_iter()
        .map(|(date, net)| (date, saturate_i32(net)))
        .collect()
}
