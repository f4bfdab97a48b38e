use serde::Deserialize;

/// Root engine configuration. Loaded from environment variables with
/// the prefix `PPC__` and overridable per call site.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub windows: WindowConfig,
    #[serde(default)]
    pub cost: CostConfig,
}

/// Lookback windows, in days, used when rolling up daily samples.
#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    /// Window for keyword quality scoring.
    #[serde(default = "default_quality_days")]
    pub quality_days: u32,
    /// Window for bid history aggregation.
    #[serde(default = "default_bid_history_days")]
    pub bid_history_days: u32,
    /// Window for campaign audits and portfolio reallocation.
    #[serde(default = "default_audit_days")]
    pub audit_days: u32,
}

/// Cost assumptions applied to gross sales when computing profit.
#[derive(Debug, Clone, Deserialize)]
pub struct CostConfig {
    /// Cost of goods sold as a fraction of sales, in `[0, 1]`.
    #[serde(default = "default_cogs_percent")]
    pub cogs_percent: f64,
    /// Amazon referral/FBA fees as a fraction of sales, in `[0, 1]`.
    #[serde(default = "default_fee_percent")]
    pub fee_percent: f64,
    /// Advertiser's target ACOS in percentage points, if one is set.
    #[serde(default)]
    pub target_acos: Option<f64>,
}

// Default functions
fn default_quality_days() -> u32 {
    30
}
fn default_bid_history_days() -> u32 {
    90
}
fn default_audit_days() -> u32 {
    30
}
fn default_cogs_percent() -> f64 {
    0.30
}
fn default_fee_percent() -> f64 {
    0.15
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            quality_days: default_quality_days(),
            bid_history_days: default_bid_history_days(),
            audit_days: default_audit_days(),
        }
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            cogs_percent: default_cogs_percent(),
            fee_percent: default_fee_percent(),
            target_acos: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            windows: WindowConfig::default(),
            cost: CostConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("PPC")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.windows.quality_days, 30);
        assert_eq!(config.windows.bid_history_days, 90);
        assert_eq!(config.windows.audit_days, 30);
        assert!((config.cost.cogs_percent - 0.30).abs() < f64::EPSILON);
        assert!((config.cost.fee_percent - 0.15).abs() < f64::EPSILON);
        assert!(config.cost.target_acos.is_none());
    }
}
