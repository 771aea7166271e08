#![forbid(unsafe_code)]

//! Core calculation layer for the CalorieKo tracker.
//!
//! This crate provides:
//! - Domain types (biometrics, activity log entries, targets, time series)
//! - Metrics calculator (BMI, MET burn, balance, pace, weekly aggregates)
//! - Chart data transform (axis scaling, grid lines, plot coordinates)
//! - Pairing and meal-scan state machines
//! - Onboarding reducer
//! - Persistence (profile, activity journal, CSV series)

pub mod types;
pub mod error;
pub mod met;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod chart;
pub mod sequencer;
pub mod onboarding;
pub mod profile;
pub mod journal;
pub mod series;
pub mod fixtures;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use met::{find_activity, met_table};
pub use metrics::{
    bmi, calories_burned, net_calorie_balance, pace_min_per_km, weekly_average, DailySummary,
    Pace,
};
pub use chart::{project, ChartFrame, ChartGeometry};
pub use journal::{read_journal, JournalSink, JsonlJournal};
pub use onboarding::{OnboardingAction, OnboardingState, OnboardingStep};
