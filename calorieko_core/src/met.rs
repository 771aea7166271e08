//! MET reference table for the workout logger.
//!
//! Values follow the Compendium of Physical Activities. The table is static
//! reference data, not user data.

use crate::types::{MetActivity, MetCategory};
use once_cell::sync::Lazy;

static MET_TABLE: Lazy<Vec<MetActivity>> = Lazy::new(build_met_table);

/// Get the cached MET reference table
pub fn met_table() -> &'static [MetActivity] {
    &MET_TABLE
}

/// Look up an activity by name, ignoring case and surrounding whitespace
pub fn find_activity(name: &str) -> Option<&'static MetActivity> {
    let needle = name.trim();
    met_table()
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(needle))
}

/// All activities in a category, in table order
pub fn activities_in(category: MetCategory) -> impl Iterator<Item = &'static MetActivity> {
    met_table().iter().filter(move |a| a.category == category)
}

fn build_met_table() -> Vec<MetActivity> {
    let rows: [(&'static str, MetCategory, f64); 16] = [
        // Cardio
        ("Walking", MetCategory::Cardio, 3.5),
        ("Brisk Walking", MetCategory::Cardio, 4.3),
        ("Running", MetCategory::Cardio, 8.3),
        ("Cycling", MetCategory::Cardio, 7.5),
        ("Swimming", MetCategory::Cardio, 5.8),
        ("Jump Rope", MetCategory::Cardio, 12.3),
        ("Hiking", MetCategory::Cardio, 6.0),
        // Strength
        ("Weight Training", MetCategory::Strength, 5.0),
        ("Bodyweight Circuit", MetCategory::Strength, 8.0),
        ("Yoga", MetCategory::Strength, 2.5),
        // Sports
        ("Basketball", MetCategory::Sports, 6.5),
        ("Badminton", MetCategory::Sports, 5.5),
        ("Volleyball", MetCategory::Sports, 4.0),
        // Daily
        ("Dancing", MetCategory::Daily, 5.0),
        ("House Cleaning", MetCategory::Daily, 3.3),
        ("Gardening", MetCategory::Daily, 3.8),
    ];

    rows.into_iter()
        .map(|(name, category, met)| MetActivity {
            name,
            category,
            met,
        })
        .collect()
}
