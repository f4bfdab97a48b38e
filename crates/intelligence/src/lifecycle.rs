//! Keyword lifecycle classification — maps age, metrics, and quality
//! score to a coarse stage label.
//!
//! Stateless: every call is evaluated fresh from current metrics, so a
//! keyword can move in either direction between evaluations.

use ppc_core::MetricsRollup;
use serde::{Deserialize, Serialize};

/// Coarse maturity/trajectory label for one keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    Discovery,
    Growth,
    Maturity,
    Decline,
}

/// Numeric gates for the ordered decision list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleThresholds {
    /// Below this age a keyword is always still discovering.
    pub discovery_max_age_days: u32,
    /// Below this many clicks there is not enough signal to leave discovery.
    pub discovery_min_clicks: u64,
    /// Quality scores below this mark a decline.
    pub decline_quality_below: u32,
    /// Clicks above this with zero conversions mark a decline.
    pub decline_clicks_without_conversion: u64,
    pub maturity_min_age_days: u32,
    pub maturity_min_quality: u32,
    pub maturity_min_conversions: u64,
    pub growth_min_quality: u32,
    pub growth_min_impressions: u64,
    /// CTR gate for growth, in percentage points.
    pub growth_min_ctr: f64,
}

impl Default for LifecycleThresholds {
    fn default() -> Self {
        Self {
            discovery_max_age_days: 7,
            discovery_min_clicks: 20,
            decline_quality_below: 40,
            decline_clicks_without_conversion: 50,
            maturity_min_age_days: 30,
            maturity_min_quality: 60,
            maturity_min_conversions: 10,
            growth_min_quality: 50,
            growth_min_impressions: 500,
            growth_min_ctr: 1.0,
        }
    }
}

/// Classifies keywords with an ordered decision list; first match wins.
pub struct LifecycleClassifier {
    thresholds: LifecycleThresholds,
}

impl LifecycleClassifier {
    pub fn new() -> Self {
        Self {
            thresholds: LifecycleThresholds::default(),
        }
    }

    pub fn with_thresholds(thresholds: LifecycleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(
        &self,
        age_in_days: u32,
        rollup: &MetricsRollup,
        quality_score: u32,
    ) -> LifecycleStage {
        let t = &self.thresholds;

        if age_in_days < t.discovery_max_age_days || rollup.clicks < t.discovery_min_clicks {
            return LifecycleStage::Discovery;
        }
        if quality_score < t.decline_quality_below
            || (rollup.clicks > t.decline_clicks_without_conversion && rollup.conversions == 0)
        {
            return LifecycleStage::Decline;
        }
        if age_in_days > t.maturity_min_age_days
            && quality_score >= t.maturity_min_quality
            && rollup.conversions >= t.maturity_min_conversions
        {
            return LifecycleStage::Maturity;
        }
        if quality_score >= t.growth_min_quality
            || (rollup.impressions > t.growth_min_impressions && rollup.ctr > t.growth_min_ctr)
        {
            return LifecycleStage::Growth;
        }

        LifecycleStage::Discovery
    }
}

impl Default for LifecycleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ppc_core::PerformanceSample;

    fn rollup(impressions: u64, clicks: u64, conversions: u64) -> MetricsRollup {
        let sample = PerformanceSample::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            impressions,
            clicks,
            conversions,
            clicks as f64 * 0.5,
            conversions as f64 * 25.0,
        );
        MetricsRollup::from_samples(std::iter::once(&sample))
    }

    #[test]
    fn test_age_gate_always_wins() {
        let classifier = LifecycleClassifier::new();
        // Strong metrics and a terrible score both lose to the age gate.
        assert_eq!(
            classifier.classify(3, &rollup(100_000, 5_000, 500), 95),
            LifecycleStage::Discovery
        );
        assert_eq!(
            classifier.classify(3, &rollup(100_000, 5_000, 0), 5),
            LifecycleStage::Discovery
        );
    }

    #[test]
    fn test_too_few_clicks_stays_discovery() {
        let classifier = LifecycleClassifier::new();
        assert_eq!(
            classifier.classify(60, &rollup(10_000, 19, 5), 90),
            LifecycleStage::Discovery
        );
    }

    #[test]
    fn test_low_quality_declines() {
        let classifier = LifecycleClassifier::new();
        assert_eq!(
            classifier.classify(20, &rollup(5_000, 40, 2), 35),
            LifecycleStage::Decline
        );
    }

    #[test]
    fn test_clicks_without_conversions_declines() {
        let classifier = LifecycleClassifier::new();
        assert_eq!(
            classifier.classify(20, &rollup(5_000, 80, 0), 55),
            LifecycleStage::Decline
        );
    }

    #[test]
    fn test_maturity() {
        let classifier = LifecycleClassifier::new();
        assert_eq!(
            classifier.classify(45, &rollup(20_000, 400, 25), 75),
            LifecycleStage::Maturity
        );
    }

    #[test]
    fn test_maturity_needs_age() {
        let classifier = LifecycleClassifier::new();
        // Same metrics at 30 days falls through to growth.
        assert_eq!(
            classifier.classify(30, &rollup(20_000, 400, 25), 75),
            LifecycleStage::Growth
        );
    }

    #[test]
    fn test_growth_via_impressions_and_ctr() {
        let classifier = LifecycleClassifier::new();
        // Quality below 50, but 600 impressions at ctr > 1pp.
        let r = rollup(600, 24, 1);
        assert!(r.ctr > 1.0);
        assert_eq!(classifier.classify(10, &r, 45), LifecycleStage::Growth);
    }

    #[test]
    fn test_default_is_discovery() {
        let classifier = LifecycleClassifier::new();
        // 20 clicks on 5 000 impressions: ctr 0.4pp, quality middling.
        assert_eq!(
            classifier.classify(10, &rollup(5_000, 20, 1), 45),
            LifecycleStage::Discovery
        );
    }
}
