use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of delivery for a single keyword or campaign.
///
/// Samples are immutable once recorded; the engine only ever reads
/// sequences of them. Aggregation is a plain sum, so sample order
/// never matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    /// Orders attributed to the entity on this day.
    pub conversions: u64,
    pub spend: f64,
    pub sales: f64,
}

impl PerformanceSample {
    pub fn new(
        date: NaiveDate,
        impressions: u64,
        clicks: u64,
        conversions: u64,
        spend: f64,
        sales: f64,
    ) -> Self {
        Self {
            date,
            impressions,
            clicks,
            conversions,
            spend,
            sales,
        }
    }
}
