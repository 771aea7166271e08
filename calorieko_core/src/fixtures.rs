//! The mock week shown by the dashboard and progress screens.
//!
//! Used as demo data whenever the journal is empty or no CSV is supplied.

use crate::{ActivityLogEntry, SeriesKind, TimeSeries};

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const WEEK_CALORIES: [f64; 7] = [1800.0, 2100.0, 1650.0, 2400.0, 1920.0, 2500.0, 1850.0];

pub const WEEK_SODIUM_MG: [f64; 7] = [2100.0, 2450.0, 1980.0, 2800.0, 2250.0, 3100.0, 2050.0];

pub const WEEK_WEIGHT_KG: [f64; 7] = [72.4, 72.1, 72.3, 71.8, 71.6, 71.9, 71.4];

pub fn series(kind: SeriesKind) -> TimeSeries {
    let values = match kind {
        SeriesKind::Calorie => &WEEK_CALORIES,
        SeriesKind::Sodium => &WEEK_SODIUM_MG,
        SeriesKind::Weight => &WEEK_WEIGHT_KG,
    };
    TimeSeries::from_values(kind, &WEEKDAYS, values)
}

/// Today's feed on the dashboard
pub fn sample_log() -> Vec<ActivityLogEntry> {
    vec![
        ActivityLogEntry::meal("07:45 AM", "Tapsilog", 380, 820, "Beef tapa, garlic rice, egg"),
        ActivityLogEntry::workout("12:10 PM", "Brisk Walking", 150, "35 min around the block"),
        ActivityLogEntry::meal("07:30 PM", "Chicken Adobo", 420, 960, "With 1 cup rice"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::net_calorie_balance;

    #[test]
    fn test_series_have_a_point_per_day() {
        for kind in [SeriesKind::Calorie, SeriesKind::Sodium, SeriesKind::Weight] {
            let s = series(kind);
            assert_eq!(s.kind, kind);
            assert_eq!(s.len(), 7);
            assert_eq!(s.points[0].label, "Mon");
        }
    }

    #[test]
    fn test_sample_log_balance() {
        assert_eq!(net_calorie_balance(&sample_log()), 650);
    }
}
