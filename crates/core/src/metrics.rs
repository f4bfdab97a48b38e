//! Metrics rollup — reduces a window of daily performance samples into
//! one summed tuple plus derived ratios.
//!
//! All ratios are percentage points (`ctr = 1.5` means 1.5%) and every
//! denominator is guarded: degenerate input yields 0, never NaN.

use crate::types::PerformanceSample;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// The sum of a window of daily samples plus derived ratios.
///
/// Derived on demand from its source samples and never persisted
/// independently of them. `acos = 0` covers both "no sales" and a
/// genuinely perfect ACOS; callers that care about unprofitable spend
/// with zero sales must check `spend > 0 && sales == 0` themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsRollup {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub spend: f64,
    pub sales: f64,
    /// Click-through rate in percentage points (`clicks / impressions * 100`).
    pub ctr: f64,
    /// Conversion rate in percentage points (`conversions / clicks * 100`).
    pub conversion_rate: f64,
    /// Advertising cost of sale (`spend / sales * 100`), 0 when sales are 0.
    pub acos: f64,
}

impl MetricsRollup {
    /// Sum a collection of samples into one rollup.
    ///
    /// Order-insensitive; an empty collection yields an all-zero rollup.
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a PerformanceSample>) -> Self {
        let mut impressions = 0u64;
        let mut clicks = 0u64;
        let mut conversions = 0u64;
        let mut spend = 0.0f64;
        let mut sales = 0.0f64;

        for sample in samples {
            impressions += sample.impressions;
            clicks += sample.clicks;
            conversions += sample.conversions;
            spend += sample.spend;
            sales += sample.sales;
        }

        let ctr = if impressions > 0 {
            clicks as f64 / impressions as f64 * 100.0
        } else {
            0.0
        };
        let conversion_rate = if clicks > 0 {
            conversions as f64 / clicks as f64 * 100.0
        } else {
            0.0
        };
        let acos = if sales > 0.0 {
            spend / sales * 100.0
        } else {
            0.0
        };

        Self {
            impressions,
            clicks,
            conversions,
            spend,
            sales,
            ctr,
            conversion_rate,
            acos,
        }
    }

    /// Sum only the samples dated within the `days`-long window ending
    /// at `as_of` (inclusive).
    pub fn over_window(samples: &[PerformanceSample], as_of: NaiveDate, days: u32) -> Self {
        Self::from_samples(samples_within_window(samples, as_of, days))
    }

    /// Return on ad spend (`sales / spend`), 0 when spend is 0.
    pub fn roas(&self) -> f64 {
        if self.spend > 0.0 {
            self.sales / self.spend
        } else {
            0.0
        }
    }

    /// Cost per click (`spend / clicks`), 0 when clicks are 0.
    pub fn cpc(&self) -> f64 {
        if self.clicks > 0 {
            self.spend / self.clicks as f64
        } else {
            0.0
        }
    }
}

/// Filter samples to the `days`-long lookback window ending at `as_of`.
pub fn samples_within_window(
    samples: &[PerformanceSample],
    as_of: NaiveDate,
    days: u32,
) -> impl Iterator<Item = &PerformanceSample> {
    let cutoff = as_of - Duration::days(days as i64 - 1);
    samples
        .iter()
        .filter(move |s| s.date >= cutoff && s.date <= as_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn sample(d: u32, impressions: u64, clicks: u64, conversions: u64, spend: f64, sales: f64) -> PerformanceSample {
        PerformanceSample::new(day(d), impressions, clicks, conversions, spend, sales)
    }

    #[test]
    fn test_empty_input_is_all_zeros() {
        let rollup = MetricsRollup::from_samples(&[]);
        assert_eq!(rollup.impressions, 0);
        assert_eq!(rollup.clicks, 0);
        assert!((rollup.ctr).abs() < f64::EPSILON);
        assert!((rollup.conversion_rate).abs() < f64::EPSILON);
        assert!((rollup.acos).abs() < f64::EPSILON);
        assert!((rollup.roas()).abs() < f64::EPSILON);
        assert!((rollup.cpc()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summation_and_derived_ratios() {
        let samples = vec![
            sample(1, 1_000, 20, 2, 10.0, 60.0),
            sample(2, 500, 10, 1, 5.0, 40.0),
        ];
        let rollup = MetricsRollup::from_samples(&samples);

        assert_eq!(rollup.impressions, 1_500);
        assert_eq!(rollup.clicks, 30);
        assert_eq!(rollup.conversions, 3);
        // ctr = 30/1500 * 100 = 2.0 percentage points
        assert!((rollup.ctr - 2.0).abs() < 1e-9);
        // conversion_rate = 3/30 * 100 = 10.0
        assert!((rollup.conversion_rate - 10.0).abs() < 1e-9);
        // acos = 15/100 * 100 = 15.0
        assert!((rollup.acos - 15.0).abs() < 1e-9);
        assert!((rollup.roas() - 100.0 / 15.0).abs() < 1e-9);
        assert!((rollup.cpc() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_order_does_not_matter() {
        let forward = vec![sample(1, 100, 5, 1, 2.0, 8.0), sample(2, 300, 9, 0, 4.0, 0.0)];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(
            MetricsRollup::from_samples(&forward),
            MetricsRollup::from_samples(&reversed)
        );
    }

    #[test]
    fn test_zero_impressions_gives_zero_ctr() {
        let rollup = MetricsRollup::from_samples(&[sample(1, 0, 0, 0, 0.0, 0.0)]);
        assert!((rollup.ctr).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_sales_gives_zero_acos_regardless_of_spend() {
        let rollup = MetricsRollup::from_samples(&[sample(1, 1_000, 50, 0, 75.0, 0.0)]);
        assert!((rollup.acos).abs() < f64::EPSILON);
        assert!((rollup.roas()).abs() < f64::EPSILON);
        assert!(rollup.spend > 0.0);
    }

    #[test]
    fn test_window_filtering_is_inclusive() {
        let samples = vec![
            sample(1, 100, 1, 0, 1.0, 0.0),
            sample(10, 100, 1, 0, 1.0, 0.0),
            sample(15, 100, 1, 0, 1.0, 0.0),
        ];

        // 6-day window ending on the 15th covers the 10th..15th only.
        let rollup = MetricsRollup::over_window(&samples, day(15), 6);
        assert_eq!(rollup.impressions, 200);

        // 30-day window covers everything.
        let rollup = MetricsRollup::over_window(&samples, day(15), 30);
        assert_eq!(rollup.impressions, 300);
    }
}
