//! Summary statistics over recorded trials

use serde::Serialize;

use errmap_types::TrialRecord;

/// Descriptive statistics of one measurement column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub column: &'static str,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Most frequent value, smallest first on ties
    pub mode: Option<f64>,
    /// Sample standard deviation (n - 1)
    pub std_dev: f64,
    pub variance: f64,
    pub range: f64,
    pub iqr: f64,
    /// Largest absolute deviation from the mean, as a percentage of the mean
    pub max_difference_pct: f64,
}

impl ColumnStats {
    pub fn from_values(column: &'static str, values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                column,
                count,
                mean: f64::NAN,
                median: f64::NAN,
                mode: None,
                std_dev: f64::NAN,
                variance: f64::NAN,
                range: f64::NAN,
                iqr: f64::NAN,
                max_difference_pct: 0.0,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = if count > 1 {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            f64::NAN
        };
        let max_difference = values
            .iter()
            .map(|v| (v - mean).abs())
            .fold(0.0, f64::max);

        Self {
            column,
            count,
            mean,
            median: quantile(&sorted, 0.5),
            mode: mode(&sorted),
            std_dev: variance.sqrt(),
            variance,
            range: sorted[count - 1] - sorted[0],
            iqr: quantile(&sorted, 0.75) - quantile(&sorted, 0.25),
            max_difference_pct: if mean != 0.0 {
                max_difference / mean * 100.0
            } else {
                0.0
            },
        }
    }

    /// Z, Y and X columns of a ledger
    pub fn for_records(records: &[TrialRecord]) -> [ColumnStats; 3] {
        let z: Vec<f64> = records.iter().map(|r| r.z_axis).collect();
        let y: Vec<f64> = records.iter().map(|r| r.y_axis).collect();
        let x: Vec<f64> = records.iter().map(|r| r.x_axis).collect();
        [
            Self::from_values("Z-Axis", &z),
            Self::from_values("Y-Axis", &y),
            Self::from_values("X-Axis", &x),
        ]
    }
}

/// Linear-interpolated quantile of an ascending slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

fn mode(sorted: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let mut j = i;
        while j < sorted.len() && sorted[j] == value {
            j += 1;
        }
        let run = j - i;
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((value, run));
        }
        i = j.max(i + 1);
    }
    best.map(|(value, _)| value)
}

pub fn generate_statistics_report(records: &[TrialRecord]) -> String {
    let mut report = String::from("Statistics:\n");
    report.push_str(&format!("Trials: {}\n\n", records.len()));

    for stats in ColumnStats::for_records(records) {
        let mode = stats
            .mode
            .map(|m| format!("{:.2}", m))
            .unwrap_or_else(|| "No mode".to_string());
        report.push_str(&format!("Column: {}\n", stats.column));
        report.push_str(&format!("  Mean (Average): {:.2}\n", stats.mean));
        report.push_str(&format!("  Median (Midpoint): {:.2}\n", stats.median));
        report.push_str(&format!("  Mode (Most Frequent): {}\n", mode));
        report.push_str(&format!("  Standard Deviation (Spread): {:.2}\n", stats.std_dev));
        report.push_str(&format!("  Variance: {:.2}\n", stats.variance));
        report.push_str(&format!("  Range (Max - Min): {:.2}\n", stats.range));
        report.push_str(&format!("  Interquartile Range (IQR): {:.2}\n", stats.iqr));
        report.push_str(&format!(
            "  Max Difference (%): {:.2}%\n\n",
            stats.max_difference_pct
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_basic_column() {
        let stats = ColumnStats::from_values("Z-Axis", &[1.0, 2.0, 2.0, 3.0, 7.0]);
        assert_eq!(stats.count, 5);
        assert!(close(stats.mean, 3.0));
        assert!(close(stats.median, 2.0));
        assert_eq!(stats.mode, Some(2.0));
        assert!(close(stats.variance, 5.5));
        assert!(close(stats.std_dev, 5.5f64.sqrt()));
        assert!(close(stats.range, 6.0));
        assert!(close(stats.iqr, 1.0));
        assert!(close(stats.max_difference_pct, 4.0 / 3.0 * 100.0));
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile(&sorted, 0.5), 2.5));
        assert!(close(quantile(&sorted, 0.25), 1.75));
        assert!(close(quantile(&sorted, 0.75), 3.25));
    }

    #[test]
    fn test_mode_ties_pick_smallest() {
        assert_eq!(mode(&[1.0, 2.0, 3.0]), Some(1.0));
        assert_eq!(mode(&[1.0, 1.0, 4.0, 4.0]), Some(1.0));
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn test_zero_mean_and_single_sample() {
        let stats = ColumnStats::from_values("X-Axis", &[-1.0, 1.0]);
        assert_eq!(stats.max_difference_pct, 0.0);

        let single = ColumnStats::from_values("Y-Axis", &[2.0]);
        assert!(single.variance.is_nan());
        assert!(close(single.iqr, 0.0));
    }

    #[test]
    fn test_report_lists_all_columns() {
        let records = vec![
            TrialRecord::new(1, 5.0, 4.0, 3.0),
            TrialRecord::new(2, 1.0, 0.0, -1.0),
        ];
        let report = generate_statistics_report(&records);
        assert!(report.contains("Trials: 2"));
        assert!(report.contains("Column: Z-Axis\n  Mean (Average): 3.00"));
        assert!(report.contains("Column: Y-Axis"));
        assert!(report.contains("Column: X-Axis"));

        let empty = generate_statistics_report(&[]);
        assert!(empty.contains("Mode (Most Frequent): No mode"));
    }
}
