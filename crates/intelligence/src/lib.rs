//! Keyword intelligence — quality scoring, lifecycle classification,
//! and profitability calculation over metrics rollups.

pub mod lifecycle;
pub mod profit;
pub mod quality;

pub use lifecycle::{LifecycleClassifier, LifecycleStage};
pub use profit::{calculate_keyword_profit, ProfitCalculation};
pub use quality::{QualityScoreResult, QualityScorer, ScoreBreakdown};
