//! Keyword profitability — applies cost assumptions to a sales/spend
//! pair and reports net profit, margin, and ROI.

use ppc_core::config::CostConfig;
use ppc_core::{PpcError, PpcResult};
use serde::{Deserialize, Serialize};

/// Full cost breakdown for one keyword or campaign window.
///
/// Negative `net_profit` is a valid, expected output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitCalculation {
    pub revenue: f64,
    pub cogs: f64,
    pub amazon_fees: f64,
    pub ad_spend: f64,
    pub net_profit: f64,
    /// `net_profit / revenue * 100`, 0 when revenue is 0.
    pub profit_margin: f64,
    /// `net_profit / ad_spend * 100`, 0 when ad spend is 0.
    pub roi: f64,
}

/// Compute the profit breakdown for `sales` revenue against `spend` ad
/// cost under the given cost assumptions.
///
/// Fails fast on out-of-range inputs rather than producing silently
/// nonsensical output.
pub fn calculate_keyword_profit(
    sales: f64,
    spend: f64,
    cost: &CostConfig,
) -> PpcResult<ProfitCalculation> {
    if !(0.0..=1.0).contains(&cost.cogs_percent) {
        return Err(PpcError::Validation(format!(
            "cogs_percent must be within [0, 1], got {}",
            cost.cogs_percent
        )));
    }
    if !(0.0..=1.0).contains(&cost.fee_percent) {
        return Err(PpcError::Validation(format!(
            "fee_percent must be within [0, 1], got {}",
            cost.fee_percent
        )));
    }
    if sales < 0.0 || spend < 0.0 {
        return Err(PpcError::Validation(format!(
            "sales and spend must be non-negative, got sales={}, spend={}",
            sales, spend
        )));
    }

    let cogs = sales * cost.cogs_percent;
    let amazon_fees = sales * cost.fee_percent;
    let net_profit = sales - cogs - amazon_fees - spend;
    let profit_margin = if sales > 0.0 {
        net_profit / sales * 100.0
    } else {
        0.0
    };
    let roi = if spend > 0.0 {
        net_profit / spend * 100.0
    } else {
        0.0
    };

    Ok(ProfitCalculation {
        revenue: sales,
        cogs,
        amazon_fees,
        ad_spend: spend,
        net_profit,
        profit_margin,
        roi,
    })
}
