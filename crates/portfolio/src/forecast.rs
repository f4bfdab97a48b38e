//! Outcome forecast for a reallocation plan.
//!
//! Deliberately asymmetric: budget increases are assumed to lift sales
//! at a fixed partial elasticity, while cuts are assumed to cost no
//! sales at all.

use crate::allocator::BudgetRecommendation;
use serde::{Deserialize, Serialize};

/// Expected-vs-current portfolio outcome under a reallocation plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioForecast {
    pub current_total_sales: f64,
    pub current_total_spend: f64,
    /// Portfolio ACOS over the source window, 0 when sales are 0.
    pub current_acos: f64,
    /// Portfolio ROAS over the source window, 0 when spend is 0.
    pub current_roas: f64,
    pub estimated_sales_increase: f64,
    pub expected_total_sales: f64,
    /// `total_budget / expected_total_sales * 100`, 0 when expected sales are 0.
    pub expected_acos: f64,
    /// `expected_total_sales / total_budget`.
    pub expected_roas: f64,
}

impl PortfolioForecast {
    /// Build the forecast from post-normalization recommendations.
    pub fn from_recommendations(
        recommendations: &[BudgetRecommendation],
        total_budget: f64,
        sales_elasticity: f64,
    ) -> Self {
        let current_total_sales: f64 = recommendations.iter().map(|r| r.sales).sum();
        let current_total_spend: f64 = recommendations.iter().map(|r| r.spend).sum();

        let current_acos = if current_total_sales > 0.0 {
            current_total_spend / current_total_sales * 100.0
        } else {
            0.0
        };
        let current_roas = if current_total_spend > 0.0 {
            current_total_sales / current_total_spend
        } else {
            0.0
        };

        // Only budget increases contribute expected lift.
        let estimated_sales_increase: f64 = recommendations
            .iter()
            .filter(|r| r.change_percent > 0.0)
            .map(|r| r.sales * (r.change_percent / 100.0) * sales_elasticity)
            .sum();

        let expected_total_sales = current_total_sales + estimated_sales_increase;
        let expected_acos = if expected_total_sales > 0.0 {
            total_budget / expected_total_sales * 100.0
        } else {
            0.0
        };
        let expected_roas = if total_budget > 0.0 {
            expected_total_sales / total_budget
        } else {
            0.0
        };

        Self {
            current_total_sales,
            current_total_spend,
            current_acos,
            current_roas,
            estimated_sales_increase,
            expected_total_sales,
            expected_acos,
            expected_roas,
        }
    }
}
