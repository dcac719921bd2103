use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::model::HourlyAverage;

// ---------------------------------------------------------------------------
// Role-based travel-time recommendation
// ---------------------------------------------------------------------------

// Tourists get the quietest hours, at or below the 30th percentile of hourly
// averages. Workers get the fixed commute bands 07-09 and 17-19 whatever the
// ridership; their reference line sits at the 70th percentile.

const TOURIST_PERCENTILE: f64 = 0.3;
const WORKER_REFERENCE_PERCENTILE: f64 = 0.7;
const WORKER_BANDS: [(u8, u8); 2] = [(7, 9), (17, 19)];

/// Who the recommendation is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Role {
    #[default]
    Tourist,
    Worker,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Tourist, Role::Worker];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Tourist => write!(f, "Tourist"),
            Role::Worker => write!(f, "Worker"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tourist" => Ok(Role::Tourist),
            "worker" => Ok(Role::Worker),
            other => Err(format!("unknown role '{other}' (expected tourist or worker)")),
        }
    }
}

/// Recommended hours plus the value of the reference line drawn with them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub role: Role,
    /// Ascending hours of day.
    pub hours: Vec<u8>,
    pub threshold: f64,
}

/// Percentile with linear interpolation between order statistics
/// (index = p × (n − 1)). `p` is clamped to `[0, 1]`.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

fn in_worker_band(hour: u8) -> bool {
    WORKER_BANDS
        .iter()
        .any(|&(start, end)| (start..=end).contains(&hour))
}

/// Recommend travel hours for `role` from per-hour averages.
///
/// Returns `None` when there are no averages to work from.
pub fn recommend(averages: &[HourlyAverage], role: Role) -> Option<Recommendation> {
    let values: Vec<f64> = averages.iter().map(|a| a.avg_ridership).collect();

    let (hours, threshold) = match role {
        Role::Tourist => {
            let threshold = percentile(&values, TOURIST_PERCENTILE)?;
            let hours = averages
                .iter()
                .filter(|a| a.avg_ridership <= threshold)
                .map(|a| a.hour)
                .collect();
            (hours, threshold)
        }
        Role::Worker => {
            let threshold = percentile(&values, WORKER_REFERENCE_PERCENTILE)?;
            let hours = averages
                .iter()
                .map(|a| a.hour)
                .filter(|&h| in_worker_band(h))
                .collect();
            (hours, threshold)
        }
    };

    Some(Recommendation {
        role,
        hours,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn averages(values: &[(u8, f64)]) -> Vec<HourlyAverage> {
        values
            .iter()
            .map(|&(hour, avg_ridership)| HourlyAverage { hour, avg_ridership })
            .collect()
    }

    /// A full day: quiet nights, two commute peaks.
    fn full_day() -> Vec<HourlyAverage> {
        let values = [
            50.0, 30.0, 20.0, 15.0, 12.0, 25.0, 10.0, 200.0, 180.0, 120.0, 90.0, 85.0, 95.0,
            100.0, 88.0, 110.0, 140.0, 210.0, 190.0, 130.0, 70.0, 60.0, 45.0, 40.0,
        ];
        values
            .iter()
            .enumerate()
            .map(|(h, &v)| HourlyAverage { hour: h as u8, avg_ridership: v })
            .collect()
    }

    #[test]
    fn test_percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&v, 0.0), Some(1.0));
        assert_eq!(percentile(&v, 1.0), Some(4.0));
        // rank 0.9 → 1 + 0.9 × (2 − 1)
        assert!((percentile(&v, 0.3).unwrap() - 1.9).abs() < 1e-12);
        assert_eq!(percentile(&[7.0], 0.3), Some(7.0));
        assert_eq!(percentile(&[], 0.3), None);
    }

    #[test]
    fn test_percentile_ignores_input_order() {
        assert_eq!(
            percentile(&[4.0, 1.0, 3.0, 2.0], 0.5),
            percentile(&[1.0, 2.0, 3.0, 4.0], 0.5)
        );
    }

    #[test]
    fn test_tourist_threshold_matches_manual_percentile() {
        let day = full_day();
        let mut sorted: Vec<f64> = day.iter().map(|a| a.avg_ridership).collect();
        sorted.sort_by(f64::total_cmp);
        // rank = 0.3 × 23 = 6.9
        let expected = sorted[6] + (sorted[7] - sorted[6]) * 0.9;

        let rec = recommend(&day, Role::Tourist).unwrap();
        assert!((rec.threshold - expected).abs() < 1e-9);

        let expected_hours: Vec<u8> = day
            .iter()
            .filter(|a| a.avg_ridership <= expected)
            .map(|a| a.hour)
            .collect();
        assert_eq!(rec.hours, expected_hours);
        assert_eq!(rec.hours, vec![1, 2, 3, 4, 5, 6, 23]);
    }

    #[test]
    fn test_tourist_boundary_is_inclusive() {
        let avgs = averages(&[(1, 10.0), (2, 10.0), (3, 10.0)]);
        let rec = recommend(&avgs, Role::Tourist).unwrap();
        assert_eq!(rec.threshold, 10.0);
        assert_eq!(rec.hours, vec![1, 2, 3]);
    }

    #[test]
    fn test_worker_hours_are_fixed_bands() {
        let rec = recommend(&full_day(), Role::Worker).unwrap();
        assert_eq!(rec.hours, vec![7, 8, 9, 17, 18, 19]);

        // Only hours that exist, regardless of their ridership.
        let sparse = averages(&[(6, 1.0), (8, 0.0), (17, 5.0), (20, 900.0)]);
        let rec = recommend(&sparse, Role::Worker).unwrap();
        assert_eq!(rec.hours, vec![8, 17]);
    }

    #[test]
    fn test_worker_reference_line_is_70th_percentile() {
        let day = full_day();
        let values: Vec<f64> = day.iter().map(|a| a.avg_ridership).collect();
        let rec = recommend(&day, Role::Worker).unwrap();
        assert_eq!(Some(rec.threshold), percentile(&values, 0.7));
    }

    #[test]
    fn test_no_averages_is_no_data() {
        assert!(recommend(&[], Role::Tourist).is_none());
        assert!(recommend(&[], Role::Worker).is_none());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Worker".parse::<Role>(), Ok(Role::Worker));
        assert_eq!(" tourist ".parse::<Role>(), Ok(Role::Tourist));
        assert!("driver".parse::<Role>().is_err());
    }
}
