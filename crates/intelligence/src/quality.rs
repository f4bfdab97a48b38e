//! Keyword quality scoring — maps one metrics rollup to a composite
//! 0-100 score with a five-part breakdown and a recommendation.

use ppc_core::MetricsRollup;
use serde::{Deserialize, Serialize};
use tracing::debug;

// Sub-score saturation points. Each sub-score is clamped to [0, 100]
// before weighting.
const CONVERSION_RATE_CAP_PP: f64 = 15.0;
const CONVERSION_COUNT_CAP: f64 = 20.0;
const ROAS_SCORE_MULTIPLIER: f64 = 20.0;
const CTR_SATURATION_PP: f64 = 3.0;
const CPC_PENALTY_PER_DOLLAR: f64 = 20.0;
const NEUTRAL_CPC_SCORE: f64 = 50.0;
const IMPRESSION_CAP: f64 = 1_000.0;
const CLICK_CAP: f64 = 100.0;

// Trend contributions (no historical comparison; thresholds on the
// current window only).
const TREND_CONVERSION_RATE_PP: f64 = 5.0;
const TREND_CTR_PP: f64 = 1.0;
const TREND_ACOS_CEILING: f64 = 30.0;

/// Weights combining the five sub-scores into the composite score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityWeights {
    pub conversion: f64,
    pub profitability: f64,
    pub efficiency: f64,
    pub volume: f64,
    pub trend: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            conversion: 0.30,
            profitability: 0.30,
            efficiency: 0.20,
            volume: 0.10,
            trend: 0.10,
        }
    }
}

/// Composite-score thresholds driving the recommendation text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// At or above: raise-bid territory.
    pub excellent: u32,
    /// At or above: keep and monitor.
    pub good: u32,
    /// Sub-scores below this are called out by name.
    pub weak_component: f64,
    /// Below this the keyword is a pause candidate.
    pub pause: u32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            excellent: 80,
            good: 60,
            weak_component: 40.0,
            pause: 30,
        }
    }
}

/// Per-component sub-scores, each in `[0, 100]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub conversion_score: f64,
    pub profitability_score: f64,
    pub efficiency_score: f64,
    pub volume_score: f64,
    pub trend_score: f64,
}

/// Result of scoring one keyword over one metrics window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityScoreResult {
    /// Composite score in `[0, 100]`.
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    pub recommendation: String,
}

/// Scores keywords from already-aggregated metrics windows.
///
/// Pure and deterministic: the same rollup always yields the same
/// result.
pub struct QualityScorer {
    weights: QualityWeights,
    thresholds: QualityThresholds,
}

impl QualityScorer {
    pub fn new() -> Self {
        Self {
            weights: QualityWeights::default(),
            thresholds: QualityThresholds::default(),
        }
    }

    pub fn with_config(weights: QualityWeights, thresholds: QualityThresholds) -> Self {
        Self {
            weights,
            thresholds,
        }
    }

    /// Score one keyword's rollup.
    pub fn score(&self, rollup: &MetricsRollup) -> QualityScoreResult {
        let breakdown = ScoreBreakdown {
            conversion_score: conversion_score(rollup),
            profitability_score: profitability_score(rollup),
            efficiency_score: efficiency_score(rollup),
            volume_score: volume_score(rollup),
            trend_score: trend_score(rollup),
        };

        let weighted = breakdown.conversion_score * self.weights.conversion
            + breakdown.profitability_score * self.weights.profitability
            + breakdown.efficiency_score * self.weights.efficiency
            + breakdown.volume_score * self.weights.volume
            + breakdown.trend_score * self.weights.trend;
        let score = weighted.round().clamp(0.0, 100.0) as u32;

        let recommendation = self.recommendation(score, &breakdown);

        debug!(
            score,
            conversion = breakdown.conversion_score,
            profitability = breakdown.profitability_score,
            efficiency = breakdown.efficiency_score,
            volume = breakdown.volume_score,
            trend = breakdown.trend_score,
            "keyword scored"
        );

        QualityScoreResult {
            score,
            breakdown,
            recommendation,
        }
    }

    fn recommendation(&self, score: u32, breakdown: &ScoreBreakdown) -> String {
        if score >= self.thresholds.excellent {
            return "Excellent performance. Consider raising the bid to capture more volume."
                .to_string();
        }
        if score >= self.thresholds.good {
            return "Good performance. Monitor and keep the current bid.".to_string();
        }

        let mut weak = Vec::new();
        if breakdown.conversion_score < self.thresholds.weak_component {
            weak.push("conversions");
        }
        if breakdown.profitability_score < self.thresholds.weak_component {
            weak.push("profitability");
        }
        if breakdown.efficiency_score < self.thresholds.weak_component {
            weak.push("efficiency");
        }
        if breakdown.volume_score < self.thresholds.weak_component {
            weak.push("volume");
        }

        let weak_list = if weak.is_empty() {
            "overall performance".to_string()
        } else {
            weak.join(", ")
        };

        if score < self.thresholds.pause {
            format!(
                "Poor performance ({}). Consider pausing this keyword.",
                weak_list
            )
        } else if breakdown.profitability_score < self.thresholds.weak_component {
            format!(
                "Weak areas: {}. Reduce the bid to bring ACOS down.",
                weak_list
            )
        } else {
            format!(
                "Weak areas: {}. Optimize targeting and ad copy.",
                weak_list
            )
        }
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Sub-scores ─────────────────────────────────────────────────────────

/// Up to 50 points for conversion rate, 50 for conversion count.
fn conversion_score(rollup: &MetricsRollup) -> f64 {
    let rate_points = (rollup.conversion_rate / CONVERSION_RATE_CAP_PP * 50.0).min(50.0);
    let count_points = (rollup.conversions as f64 / CONVERSION_COUNT_CAP * 50.0).min(50.0);
    (rate_points + count_points).clamp(0.0, 100.0)
}

/// 60% ACOS band, 40% ROAS. A 5x ROAS saturates the ROAS side.
fn profitability_score(rollup: &MetricsRollup) -> f64 {
    let acos_band = match rollup.acos {
        a if a <= 20.0 => 100.0,
        a if a <= 30.0 => 80.0,
        a if a <= 40.0 => 60.0,
        a if a <= 50.0 => 40.0,
        a if a <= 70.0 => 20.0,
        _ => 10.0,
    };
    let roas_score = (rollup.roas() * ROAS_SCORE_MULTIPLIER).min(100.0);
    (acos_band * 0.6 + roas_score * 0.4).clamp(0.0, 100.0)
}

/// 60% CTR (3pp saturates), 40% CPC (a $5 CPC zeroes it; no spend and
/// no clicks reads as neutral).
fn efficiency_score(rollup: &MetricsRollup) -> f64 {
    let ctr_score = (rollup.ctr / CTR_SATURATION_PP * 100.0).min(100.0);
    let cpc = rollup.cpc();
    let cpc_score = if cpc > 0.0 {
        (100.0 - cpc * CPC_PENALTY_PER_DOLLAR).max(0.0)
    } else {
        NEUTRAL_CPC_SCORE
    };
    (ctr_score * 0.6 + cpc_score * 0.4).clamp(0.0, 100.0)
}

/// Up to 50 points each for impression and click volume.
fn volume_score(rollup: &MetricsRollup) -> f64 {
    let impression_points = (rollup.impressions as f64 / IMPRESSION_CAP * 50.0).min(50.0);
    let click_points = (rollup.clicks as f64 / CLICK_CAP * 50.0).min(50.0);
    (impression_points + click_points).clamp(0.0, 100.0)
}

/// Simplified trend signal from the current window alone.
fn trend_score(rollup: &MetricsRollup) -> f64 {
    let mut score: f64 = 0.0;
    if rollup.conversion_rate > TREND_CONVERSION_RATE_PP {
        score += 30.0;
    }
    if rollup.ctr > TREND_CTR_PP {
        score += 30.0;
    }
    if rollup.acos < TREND_ACOS_CEILING {
        score += 40.0;
    }
    score.min(100.0)
}

// ─── Tests ──────────────────────────────────────────────────────────────
