//! Core domain types for the CalorieKo tracker.
//!
//! This module defines the value records the calculators work on:
//! - Biometric profile and BMI classification
//! - Activity log entries (meals and workouts)
//! - Daily nutrition targets
//! - Time series for the progress charts
//! - MET reference activities

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Biometrics
// ============================================================================

/// Biological sex as entered during onboarding
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl std::str::FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(Error::invalid(format!("unknown sex: {}", other))),
        }
    }
}

/// Body measurements used to derive BMI and calorie burn
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BiometricProfile {
    pub age_years: u32,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl BiometricProfile {
    /// Build a profile, rejecting values no person could have
    pub fn new(age_years: u32, sex: Sex, height_cm: f64, weight_kg: f64) -> Result<Self> {
        if !(1..=120).contains(&age_years) {
            return Err(Error::invalid(format!(
                "age must be between 1 and 120, got {}",
                age_years
            )));
        }
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

        Ok(Self {
            age_years,
            sex,
            height_cm,
            weight_kg,
        })
    }

    pub fn bmi(&self) -> Result<f64> {
        crate::metrics::bmi(self.weight_kg, self.height_cm)
    }

    pub fn bmi_category(&self) -> Result<BmiCategory> {
        self.bmi().map(BmiCategory::from_bmi)
    }
}

/// BMI classification buckets
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Classify a BMI value; boundary values belong to the higher bucket
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Activity Log
// ============================================================================

/// Whether a log entry adds or burns calories
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Meal,
    Workout,
}

/// One row of the dashboard activity feed
///
/// `calories` is always the magnitude; the kind decides whether it counts
/// toward intake or burn.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityLogEntry {
    pub kind: ActivityKind,
    pub time_label: String,
    pub name: String,
    pub calories: i32,
    pub sodium_mg: Option<u32>,
    pub detail: String,
}

impl ActivityLogEntry {
    /// Largest calorie magnitude a single entry may carry
    pub const MAX_CALORIES: i32 = 100_000;

    /// Largest sodium amount a single meal may carry
    pub const MAX_SODIUM_MG: u32 = 100_000;

    pub fn meal(
        time_label: impl Into<String>,
        name: impl Into<String>,
        calories: i32,
        sodium_mg: u32,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActivityKind::Meal,
            time_label: time_label.into(),
            name: name.into(),
            calories,
            sodium_mg: Some(sodium_mg),
            detail: detail.into(),
        }
    }

    pub fn workout(
        time_label: impl Into<String>,
        name: impl Into<String>,
        calories: i32,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActivityKind::Workout,
            time_label: time_label.into(),
            name: name.into(),
            calories,
            sodium_mg: None,
            detail: detail.into(),
        }
    }

    /// Check the calorie and sodium figures are within per-entry bounds
    pub fn validate(&self) -> Result<()> {
        if !(0..=Self::MAX_CALORIES).contains(&self.calories) {
            return Err(Error::invalid(format!(
                "calories for '{}' must be within 0..={}, got {}",
                self.name,
                Self::MAX_CALORIES,
                self.calories
            )));
        }
        if let Some(sodium) = self.sodium_mg {
            if sodium > Self::MAX_SODIUM_MG {
                return Err(Error::invalid(format!(
                    "sodium for '{}' must be at most {} mg, got {}",
                    self.name,
                    Self::MAX_SODIUM_MG,
                    sodium
                )));
            }
        }
        Ok(())
    }
}

/// A journal record: an entry plus the instant it was logged
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedActivity {
    pub logged_at: DateTime<Utc>,
    pub entry: ActivityLogEntry,
}

// ============================================================================
// Nutrition Targets
// ============================================================================

#[derive(Deserialize)]
struct RawNutritionTarget {
    daily_calories: u32,
    daily_sodium_mg: u32,
}

/// Daily denominators for percent-of-target displays
///
/// Both values are guaranteed non-zero.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawNutritionTarget")]
pub struct NutritionTarget {
    daily_calories: u32,
    daily_sodium_mg: u32,
}

impl NutritionTarget {
    pub const DEFAULT_CALORIES: u32 = 2000;
    pub const DEFAULT_SODIUM_MG: u32 = 2300;

    pub fn new(daily_calories: u32, daily_sodium_mg: u32) -> Result<Self> {
        if daily_calories == 0 {
            return Err(Error::invalid("daily calorie target must be non-zero"));
        }
        if daily_sodium_mg == 0 {
            return Err(Error::invalid("daily sodium target must be non-zero"));
        }
        Ok(Self {
            daily_calories,
            daily_sodium_mg,
        })
    }

    pub fn daily_calories(&self) -> u32 {
        self.daily_calories
    }

    pub fn daily_sodium_mg(&self) -> u32 {
        self.daily_sodium_mg
    }
}

impl Default for NutritionTarget {
    fn default() -> Self {
        Self {
            daily_calories: Self::DEFAULT_CALORIES,
            daily_sodium_mg: Self::DEFAULT_SODIUM_MG,
        }
    }
}

impl TryFrom<RawNutritionTarget> for NutritionTarget {
    type Error = Error;

    fn try_from(raw: RawNutritionTarget) -> Result<Self> {
        NutritionTarget::new(raw.daily_calories, raw.daily_sodium_mg)
    }
}

// ============================================================================
// Time Series
// ============================================================================

/// Which progress chart a series feeds
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Calorie,
    Sodium,
    Weight,
}

impl std::str::FromStr for SeriesKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "calorie" | "calories" => Ok(SeriesKind::Calorie),
            "sodium" => Ok(SeriesKind::Sodium),
            "weight" => Ok(SeriesKind::Weight),
            other => Err(Error::invalid(format!("unknown series kind: {}", other))),
        }
    }
}

/// A labelled value on a chart
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimeSeriesPoint {
    pub label: String,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// An ordered series of points of one kind
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimeSeries {
    pub kind: SeriesKind,
    pub points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    pub fn new(kind: SeriesKind, points: Vec<TimeSeriesPoint>) -> Self {
        Self { kind, points }
    }

    /// Build a series from parallel label and value slices
    pub fn from_values(kind: SeriesKind, labels: &[&str], values: &[f64]) -> Self {
        let points = labels
            .iter()
            .zip(values)
            .map(|(label, value)| TimeSeriesPoint::new(*label, *value))
            .collect();
        Self { kind, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ============================================================================
// MET Reference
// ============================================================================

/// Grouping used by the workout picker
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetCategory {
    Cardio,
    Strength,
    Sports,
    Daily,
}

impl fmt::Display for MetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MetCategory::Cardio => "Cardio",
            MetCategory::Strength => "Strength",
            MetCategory::Sports => "Sports",
            MetCategory::Daily => "Daily",
        };
        f.write_str(label)
    }
}

/// A row of the static MET reference table
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MetActivity {
    pub name: &'static str,
    pub category: MetCategory,
    pub met: f64,
}
