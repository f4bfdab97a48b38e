//! Budget reallocation across a campaign portfolio.
//!
//! Campaigns are ranked by efficiency, nudged up or down by rank tier,
//! then normalized so the recommended budgets sum to the caller's
//! target total. The whole portfolio is one atomic computation: the
//! normalization step needs every campaign's raw recommendation.

use crate::forecast::PortfolioForecast;
use chrono::{DateTime, Utc};
use ppc_core::{MetricsRollup, PpcError, PpcResult};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

// ─── Types ──────────────────────────────────────────────────────────────

/// Per-campaign efficiency measures over one rollup window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignEfficiencySnapshot {
    pub campaign_id: Uuid,
    pub name: String,
    pub current_budget: f64,
    pub spend: f64,
    pub sales: f64,
    pub acos: f64,
    pub roas: f64,
    pub conversions: u64,
    /// `roas * 100 / max(acos, 1)`, 0 when roas is 0. Ranking measure only.
    pub efficiency: f64,
}

impl CampaignEfficiencySnapshot {
    /// Build a snapshot from a campaign's rollup window.
    pub fn from_rollup(
        campaign_id: Uuid,
        name: impl Into<String>,
        current_budget: f64,
        rollup: &MetricsRollup,
    ) -> Self {
        let acos = rollup.acos;
        let roas = rollup.roas();
        Self {
            campaign_id,
            name: name.into(),
            current_budget,
            spend: rollup.spend,
            sales: rollup.sales,
            acos,
            roas,
            conversions: rollup.conversions,
            efficiency: efficiency(roas, acos),
        }
    }
}

/// `roas * 100 / max(acos, 1)`, 0 when roas is 0.
fn efficiency(roas: f64, acos: f64) -> f64 {
    if roas > 0.0 {
        roas * 100.0 / acos.max(1.0)
    } else {
        0.0
    }
}

/// One campaign's post-normalization budget recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    pub campaign_id: Uuid,
    pub name: String,
    pub current_budget: f64,
    pub spend: f64,
    pub sales: f64,
    pub acos: f64,
    pub roas: f64,
    pub conversions: u64,
    pub efficiency: f64,
    pub recommended_budget: f64,
    /// `recommended_budget - current_budget`, after normalization.
    pub change: f64,
    /// Change relative to the current budget, 0 when the current budget is 0.
    pub change_percent: f64,
    pub reasoning: String,
}

/// Full reallocation output: one recommendation per campaign, ordered
/// by efficiency rank, plus the portfolio forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReallocationPlan {
    pub total_budget: f64,
    pub recommendations: Vec<BudgetRecommendation>,
    pub forecast: PortfolioForecast,
    pub generated_at: DateTime<Utc>,
}

/// Tier boundaries and adjustment rates for the reallocation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReallocationConfig {
    /// Fraction of campaigns (by rank, ceil) in the increase tier.
    pub top_tier_fraction: f64,
    /// Fraction of campaigns (by rank, ceil) in the decrease tier.
    pub bottom_tier_fraction: f64,
    /// Increase for the first-ranked campaign, in percent.
    pub top_base_increase_pct: f64,
    /// Taper per subsequent rank within the top tier, in percentage points.
    pub top_step_pct: f64,
    /// Decrease at the start of the bottom tier, in percent.
    pub bottom_base_decrease_pct: f64,
    /// Extra cut per rank deeper into the bottom tier, in percentage points.
    pub bottom_step_pct: f64,
    /// Mid-tier campaigns above this efficiency get the strong multiplier.
    pub mid_efficiency_threshold: f64,
    pub mid_strong_multiplier: f64,
    pub mid_weak_multiplier: f64,
    /// Pre-normalization floor, in dollars per day.
    pub min_daily_budget: f64,
    /// Fraction of a proportional budget increase assumed to convert
    /// into sales. Cuts are assumed to cost nothing.
    pub sales_elasticity: f64,
}

impl Default for ReallocationConfig {
    fn default() -> Self {
        Self {
            top_tier_fraction: 0.25,
            bottom_tier_fraction: 0.25,
            top_base_increase_pct: 30.0,
            top_step_pct: 5.0,
            bottom_base_decrease_pct: 20.0,
            bottom_step_pct: 5.0,
            mid_efficiency_threshold: 50.0,
            mid_strong_multiplier: 1.10,
            mid_weak_multiplier: 0.95,
            min_daily_budget: 1.0,
            sales_elasticity: 0.70,
        }
    }
}

// ─── Reallocator ────────────────────────────────────────────────────────

/// Reallocates a fixed daily budget across a campaign portfolio.
pub struct BudgetReallocator {
    config: ReallocationConfig,
}

impl BudgetReallocator {
    pub fn new() -> Self {
        Self {
            config: ReallocationConfig::default(),
        }
    }

    pub fn with_config(config: ReallocationConfig) -> Self {
        Self { config }
    }

    /// Produce a reallocation plan whose recommended budgets sum to
    /// `total_budget`.
    ///
    /// Rejects an empty portfolio or a non-positive total up front.
    pub fn reallocate(
        &self,
        snapshots: &[CampaignEfficiencySnapshot],
        total_budget: f64,
    ) -> PpcResult<ReallocationPlan> {
        if snapshots.is_empty() {
            return Err(PpcError::Validation(
                "cannot reallocate an empty portfolio".to_string(),
            ));
        }
        if total_budget <= 0.0 {
            return Err(PpcError::Validation(format!(
                "total_budget must be positive, got {}",
                total_budget
            )));
        }

        let cfg = &self.config;
        let mut ranked = snapshots.to_vec();
        ranked.sort_by(|a, b| {
            b.efficiency
                .partial_cmp(&a.efficiency)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let n = ranked.len();
        let top_len = (n as f64 * cfg.top_tier_fraction).ceil() as usize;
        let bottom_len = (n as f64 * cfg.bottom_tier_fraction).ceil() as usize;
        // Exclusive index ranges keep the partition disjoint and total
        // even when the portfolio is smaller than four campaigns.
        let bottom_start = (n - bottom_len.min(n)).max(top_len);

        let mut raw = Vec::with_capacity(n);
        for (rank, snapshot) in ranked.iter().enumerate() {
            let (budget, reasoning) = if rank < top_len {
                let pct =
                    (cfg.top_base_increase_pct - cfg.top_step_pct * rank as f64).max(0.0);
                (
                    snapshot.current_budget * (1.0 + pct / 100.0),
                    format!(
                        "High efficiency (rank {} of {}): increase budget {:.0}%",
                        rank + 1,
                        n,
                        pct
                    ),
                )
            } else if rank >= bottom_start {
                let depth = (rank - bottom_start) as f64;
                let pct = cfg.bottom_base_decrease_pct + cfg.bottom_step_pct * depth;
                (
                    snapshot.current_budget * (1.0 - pct / 100.0),
                    format!(
                        "Low efficiency (rank {} of {}): decrease budget {:.0}%",
                        rank + 1,
                        n,
                        pct
                    ),
                )
            } else if snapshot.efficiency > cfg.mid_efficiency_threshold {
                (
                    snapshot.current_budget * cfg.mid_strong_multiplier,
                    "Solid efficiency: modest budget increase".to_string(),
                )
            } else {
                (
                    snapshot.current_budget * cfg.mid_weak_multiplier,
                    "Middling efficiency: slight budget decrease".to_string(),
                )
            };

            raw.push((budget.max(cfg.min_daily_budget), reasoning));
        }

        // Normalize so the plan sums to exactly the target total, then
        // compute deltas against the normalized figures.
        let raw_sum: f64 = raw.iter().map(|(b, _)| b).sum();
        let factor = total_budget / raw_sum;

        let recommendations: Vec<BudgetRecommendation> = ranked
            .into_iter()
            .zip(raw)
            .map(|(snapshot, (raw_budget, reasoning))| {
                let recommended_budget = raw_budget * factor;
                let change = recommended_budget - snapshot.current_budget;
                let change_percent = if snapshot.current_budget > 0.0 {
                    change / snapshot.current_budget * 100.0
                } else {
                    0.0
                };
                BudgetRecommendation {
                    campaign_id: snapshot.campaign_id,
                    name: snapshot.name,
                    current_budget: snapshot.current_budget,
                    spend: snapshot.spend,
                    sales: snapshot.sales,
                    acos: snapshot.acos,
                    roas: snapshot.roas,
                    conversions: snapshot.conversions,
                    efficiency: snapshot.efficiency,
                    recommended_budget,
                    change,
                    change_percent,
                    reasoning,
                }
            })
            .collect();

        let forecast = PortfolioForecast::from_recommendations(
            &recommendations,
            total_budget,
            cfg.sales_elasticity,
        );

        info!(
            campaigns = n,
            total_budget,
            expected_sales = forecast.expected_total_sales,
            "reallocation plan computed"
        );

        Ok(ReallocationPlan {
            total_budget,
            recommendations,
            forecast,
            generated_at: Utc::now(),
        })
    }
}

impl Default for BudgetReallocator {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(name: &str, current_budget: f64, sales: f64, efficiency: f64) -> CampaignEfficiencySnapshot {
        CampaignEfficiencySnapshot {
            campaign_id: Uuid::new_v4(),
            name: name.to_string(),
            current_budget,
            spend: current_budget * 0.8,
            sales,
            acos: 30.0,
            roas: 3.0,
            conversions: 10,
            efficiency,
        }
    }

    // 1. Preconditions ------------------------------------------------------

    #[test]
    fn test_empty_portfolio_rejected() {
        let reallocator = BudgetReallocator::new();
        assert!(reallocator.reallocate(&[], 100.0).is_err());
    }

    #[test]
    fn test_non_positive_budget_rejected() {
        let reallocator = BudgetReallocator::new();
        let portfolio = vec![snapshot("a", 10.0, 100.0, 5.0)];
        assert!(reallocator.reallocate(&portfolio, 0.0).is_err());
        assert!(reallocator.reallocate(&portfolio, -50.0).is_err());
    }

    // 2. Tiering ------------------------------------------------------------

    #[test]
    fn test_four_campaign_scenario() {
        let reallocator = BudgetReallocator::new();
        let portfolio = vec![
            snapshot("best", 25.0, 1_000.0, 10.0),
            snapshot("second", 25.0, 800.0, 8.0),
            snapshot("third", 25.0, 400.0, 4.0),
            snapshot("worst", 25.0, 100.0, 1.0),
        ];

        let plan = reallocator.reallocate(&portfolio, 100.0).unwrap();
        let recs = &plan.recommendations;
        assert_eq!(recs.len(), 4);

        // Raw budgets: 32.50 + 23.75 + 23.75 + 20.00 = 100, so the
        // normalization factor is exactly 1 here.
        assert_eq!(recs[0].name, "best");
        assert!((recs[0].recommended_budget - 32.5).abs() < 1e-9);
        assert!((recs[0].change_percent - 30.0).abs() < 1e-9);

        assert!((recs[1].change_percent - (-5.0)).abs() < 1e-9);
        assert!((recs[2].change_percent - (-5.0)).abs() < 1e-9);

        assert_eq!(recs[3].name, "worst");
        assert!((recs[3].recommended_budget - 20.0).abs() < 1e-9);
        assert!((recs[3].change_percent - (-20.0)).abs() < 1e-9);

        let sum: f64 = recs.iter().map(|r| r.recommended_budget).sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_five_campaign_tiers() {
        let reallocator = BudgetReallocator::new();
        let portfolio = vec![
            snapshot("a", 20.0, 500.0, 100.0),
            snapshot("b", 20.0, 500.0, 90.0),
            snapshot("c", 20.0, 500.0, 60.0),
            snapshot("d", 20.0, 500.0, 20.0),
            snapshot("e", 20.0, 500.0, 10.0),
        ];

        // top_len = ceil(5 * 0.25) = 2, bottom_len = 2, middle = 1.
        // Raw: 26 + 25 + 22 + 16 + 15 = 104.
        let plan = reallocator.reallocate(&portfolio, 104.0).unwrap();
        let recs = &plan.recommendations;

        assert!((recs[0].recommended_budget - 26.0).abs() < 1e-9);
        assert!((recs[1].recommended_budget - 25.0).abs() < 1e-9);
        // Middle campaign above the efficiency threshold gets the 1.10x.
        assert!((recs[2].recommended_budget - 22.0).abs() < 1e-9);
        // Bottom tier: -20% then -25%.
        assert!((recs[3].recommended_budget - 16.0).abs() < 1e-9);
        assert!((recs[4].recommended_budget - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_campaign_portfolio() {
        let reallocator = BudgetReallocator::new();
        let portfolio = vec![snapshot("only", 10.0, 100.0, 5.0)];

        // top slice is [0]; the bottom slice must not overlap it.
        let plan = reallocator.reallocate(&portfolio, 100.0).unwrap();
        assert_eq!(plan.recommendations.len(), 1);
        let rec = &plan.recommendations[0];
        assert!(rec.reasoning.contains("High efficiency"));
        assert!((rec.recommended_budget - 100.0).abs() < 1e-6);
    }

    // 3. Normalization ------------------------------------------------------

    #[test]
    fn test_normalized_sum_matches_total() {
        let reallocator = BudgetReallocator::new();
        let portfolio = vec![
            snapshot("a", 12.5, 430.0, 42.0),
            snapshot("b", 80.0, 1_900.0, 17.0),
            snapshot("c", 7.0, 60.0, 3.5),
            snapshot("d", 33.0, 510.0, 88.0),
            snapshot("e", 5.0, 20.0, 0.0),
            snapshot("f", 61.0, 700.0, 55.0),
        ];

        for total in [50.0, 198.5, 1_000.0] {
            let plan = reallocator.reallocate(&portfolio, total).unwrap();
            let sum: f64 = plan
                .recommendations
                .iter()
                .map(|r| r.recommended_budget)
                .sum();
            assert!((sum - total).abs() < 1e-6, "sum {} != total {}", sum, total);
        }
    }

    #[test]
    fn test_minimum_budget_floor_survives_normalization() {
        let reallocator = BudgetReallocator::new();
        // Two campaigns: the cut one would drop to 0.40/day without the
        // floor. Raw budgets: 13.0 and 1.0 (floored), sum 14.
        let portfolio = vec![
            snapshot("big", 10.0, 500.0, 9.0),
            snapshot("tiny", 0.5, 5.0, 0.5),
        ];

        let plan = reallocator.reallocate(&portfolio, 70.0).unwrap();
        let factor = 70.0 / 14.0;
        let tiny = plan
            .recommendations
            .iter()
            .find(|r| r.name == "tiny")
            .unwrap();
        assert!((tiny.recommended_budget - 1.0 * factor).abs() < 1e-9);
        assert!(tiny.recommended_budget > 0.0);
    }

    // 4. Snapshot derivation ------------------------------------------------

    #[test]
    fn test_efficiency_guards() {
        // roas = 0 -> efficiency 0 regardless of acos.
        assert!((efficiency(0.0, 25.0)).abs() < f64::EPSILON);
        // acos below 1 is floored to 1.
        assert!((efficiency(2.0, 0.25) - 200.0).abs() < 1e-9);
        assert!((efficiency(4.0, 50.0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_from_rollup() {
        use chrono::NaiveDate;
        use ppc_core::PerformanceSample;

        let sample = PerformanceSample::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            10_000,
            200,
            12,
            50.0,
            250.0,
        );
        let rollup = MetricsRollup::from_samples(std::iter::once(&sample));
        let snap =
            CampaignEfficiencySnapshot::from_rollup(Uuid::new_v4(), "c", 40.0, &rollup);

        assert!((snap.acos - 20.0).abs() < 1e-9);
        assert!((snap.roas - 5.0).abs() < 1e-9);
        // efficiency = 5 * 100 / 20 = 25
        assert!((snap.efficiency - 25.0).abs() < 1e-9);
        assert_eq!(snap.conversions, 12);
    }
}
