//! Campaign audit composer and in-memory report store.
//!
//! CTR thresholds here follow the same percentage-point convention as
//! the rest of the engine (`0.3` means 0.3%).

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ppc_core::MetricsRollup;
use ppc_intelligence::{LifecycleStage, QualityScoreResult};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

// ─── Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Critical,
    Warning,
    Info,
}

/// A campaign-level finding from the fixed audit rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditIssue {
    pub severity: IssueSeverity,
    pub category: String,
    pub message: String,
    pub recommendation: String,
}

/// A keyword worth scaling up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordOpportunity {
    pub keyword_id: Uuid,
    pub keyword: String,
    pub quality_score: u32,
    pub message: String,
}

/// A keyword with one or more problems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordIssue {
    pub keyword_id: Uuid,
    pub keyword: String,
    pub quality_score: u32,
    pub lifecycle: LifecycleStage,
    pub problems: Vec<String>,
}

/// One keyword's inputs to the audit: its window rollup plus the
/// intelligence computed from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordAuditRecord {
    pub keyword_id: Uuid,
    pub keyword: String,
    pub rollup: MetricsRollup,
    pub quality: QualityScoreResult,
    pub lifecycle: LifecycleStage,
}

/// Everything the composer needs for one campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignAuditInput {
    pub campaign_id: Uuid,
    pub campaign_name: String,
    /// Fraction of the planned budget spent over the window (0.85 = 85%).
    pub budget_utilization: f64,
    /// Advertiser target ACOS in percentage points, if one is set.
    pub target_acos: Option<f64>,
    /// Campaign-level rollup over the audit window.
    pub rollup: MetricsRollup,
    pub keywords: Vec<KeywordAuditRecord>,
}

/// Composed audit result, retained by the engine's report store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignAuditReport {
    pub report_id: Uuid,
    pub campaign_id: Uuid,
    pub campaign_name: String,
    pub overall_score: f64,
    pub issues: Vec<AuditIssue>,
    pub opportunities: Vec<KeywordOpportunity>,
    pub keyword_issues: Vec<KeywordIssue>,
    pub generated_at: DateTime<Utc>,
}

// ─── Configuration ──────────────────────────────────────────────────────

/// Weights combining the four component scores into the overall score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditWeights {
    pub budget: f64,
    pub acos: f64,
    pub ctr: f64,
    pub keyword: f64,
}

impl Default for AuditWeights {
    fn default() -> Self {
        Self {
            budget: 0.20,
            acos: 0.35,
            ctr: 0.15,
            keyword: 0.30,
        }
    }
}

/// Fixed rule thresholds. CTR values are percentage points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditThresholds {
    pub underspend_utilization: f64,
    pub overspend_utilization: f64,
    /// Exclusive band in which the budget component scores 100.
    pub healthy_utilization_low: f64,
    pub healthy_utilization_high: f64,
    /// Campaign ACOS beyond `target * multiplier` is critical.
    pub acos_critical_multiplier: f64,
    /// Keyword ACOS beyond `target * multiplier` is a keyword problem.
    pub keyword_acos_multiplier: f64,
    pub low_ctr_warning: f64,
    pub ctr_good: f64,
    pub ctr_fair: f64,
    pub opportunity_min_quality: u32,
    pub weak_keyword_quality: u32,
    /// ACOS component score when no target is configured.
    pub fallback_acos_score: f64,
    /// Keyword component score when no keyword has data.
    pub fallback_keyword_score: f64,
}

impl Default for AuditThresholds {
    fn default() -> Self {
        Self {
            underspend_utilization: 0.50,
            overspend_utilization: 0.95,
            healthy_utilization_low: 0.70,
            healthy_utilization_high: 0.95,
            acos_critical_multiplier: 1.2,
            keyword_acos_multiplier: 1.5,
            low_ctr_warning: 0.3,
            ctr_good: 1.0,
            ctr_fair: 0.5,
            opportunity_min_quality: 70,
            weak_keyword_quality: 50,
            fallback_acos_score: 75.0,
            fallback_keyword_score: 50.0,
        }
    }
}

// ─── Engine ─────────────────────────────────────────────────────────────

/// Audits campaigns and retains the composed reports in memory.
pub struct AuditEngine {
    weights: AuditWeights,
    thresholds: AuditThresholds,
    reports: DashMap<Uuid, CampaignAuditReport>,
}

impl AuditEngine {
    pub fn new() -> Self {
        Self {
            weights: AuditWeights::default(),
            thresholds: AuditThresholds::default(),
            reports: DashMap::new(),
        }
    }

    pub fn with_config(weights: AuditWeights, thresholds: AuditThresholds) -> Self {
        Self {
            weights,
            thresholds,
            reports: DashMap::new(),
        }
    }

    /// Audit one campaign, retain the report, and return it.
    pub fn audit(&self, input: &CampaignAuditInput) -> CampaignAuditReport {
        let issues = self.campaign_issues(input);
        let opportunities = self.keyword_opportunities(input);
        let keyword_issues = self.keyword_issues(input);
        let overall_score = self.overall_score(input);

        let report = CampaignAuditReport {
            report_id: Uuid::new_v4(),
            campaign_id: input.campaign_id,
            campaign_name: input.campaign_name.clone(),
            overall_score,
            issues,
            opportunities,
            keyword_issues,
            generated_at: Utc::now(),
        };

        info!(
            campaign = %input.campaign_id,
            score = report.overall_score,
            issues = report.issues.len(),
            opportunities = report.opportunities.len(),
            "campaign audited"
        );

        self.reports.insert(report.report_id, report.clone());
        report
    }

    /// Fetch one retained report.
    pub fn get_report(&self, report_id: &Uuid) -> Option<CampaignAuditReport> {
        self.reports.get(report_id).map(|r| r.clone())
    }

    /// All retained reports for a campaign, oldest first.
    pub fn reports_for_campaign(&self, campaign_id: &Uuid) -> Vec<CampaignAuditReport> {
        let mut reports: Vec<CampaignAuditReport> = self
            .reports
            .iter()
            .filter(|r| r.campaign_id == *campaign_id)
            .map(|r| r.clone())
            .collect();
        reports.sort_by_key(|r| r.generated_at);
        reports
    }

    // ── rules ──────────────────────────────────────────────────────────

    fn campaign_issues(&self, input: &CampaignAuditInput) -> Vec<AuditIssue> {
        let t = &self.thresholds;
        let mut issues = Vec::new();

        if input.budget_utilization < t.underspend_utilization {
            issues.push(AuditIssue {
                severity: IssueSeverity::Warning,
                category: "budget".to_string(),
                message: format!(
                    "Only {:.0}% of the budget was used over the window",
                    input.budget_utilization * 100.0
                ),
                recommendation: "Raise bids or broaden targeting to use the available budget."
                    .to_string(),
            });
        } else if input.budget_utilization > t.overspend_utilization {
            issues.push(AuditIssue {
                severity: IssueSeverity::Critical,
                category: "budget".to_string(),
                message: format!(
                    "Budget nearly exhausted ({:.0}% used)",
                    input.budget_utilization * 100.0
                ),
                recommendation:
                    "Increase the daily budget or trim unprofitable spend to avoid lost impressions."
                        .to_string(),
            });
        }

        if let Some(target) = input.target_acos {
            if input.rollup.acos > target * t.acos_critical_multiplier {
                issues.push(AuditIssue {
                    severity: IssueSeverity::Critical,
                    category: "acos".to_string(),
                    message: format!(
                        "Average ACOS {:.1}% is well above the {:.1}% target",
                        input.rollup.acos, target
                    ),
                    recommendation: "Reduce bids on high-ACOS keywords or pause the worst offenders."
                        .to_string(),
                });
            }
        }

        if input.rollup.ctr < t.low_ctr_warning {
            issues.push(AuditIssue {
                severity: IssueSeverity::Warning,
                category: "ctr".to_string(),
                message: format!(
                    "Average CTR {:.2}% is below {:.2}%",
                    input.rollup.ctr, t.low_ctr_warning
                ),
                recommendation: "Refresh the ad creative and review keyword relevance.".to_string(),
            });
        }

        issues
    }

    fn keyword_opportunities(&self, input: &CampaignAuditInput) -> Vec<KeywordOpportunity> {
        input
            .keywords
            .iter()
            .filter(|k| {
                k.quality.score > self.thresholds.opportunity_min_quality
                    && k.lifecycle == LifecycleStage::Growth
            })
            .map(|k| KeywordOpportunity {
                keyword_id: k.keyword_id,
                keyword: k.keyword.clone(),
                quality_score: k.quality.score,
                message: format!(
                    "Quality score {} and still growing: raise the bid to capture more volume",
                    k.quality.score
                ),
            })
            .collect()
    }

    fn keyword_issues(&self, input: &CampaignAuditInput) -> Vec<KeywordIssue> {
        let t = &self.thresholds;
        let mut result = Vec::new();

        for k in &input.keywords {
            let mut problems = Vec::new();
            if k.quality.score < t.weak_keyword_quality {
                problems.push(format!(
                    "quality score {} below {}",
                    k.quality.score, t.weak_keyword_quality
                ));
            }
            if k.lifecycle == LifecycleStage::Decline {
                problems.push("performance is declining".to_string());
            }
            if let Some(target) = input.target_acos {
                if k.rollup.acos > target * t.keyword_acos_multiplier {
                    problems.push(format!(
                        "ACOS {:.1}% exceeds {:.1}x the target",
                        k.rollup.acos, t.keyword_acos_multiplier
                    ));
                }
            }

            if !problems.is_empty() {
                result.push(KeywordIssue {
                    keyword_id: k.keyword_id,
                    keyword: k.keyword.clone(),
                    quality_score: k.quality.score,
                    lifecycle: k.lifecycle,
                    problems,
                });
            }
        }

        result
    }

    // ── scoring ────────────────────────────────────────────────────────

    fn overall_score(&self, input: &CampaignAuditInput) -> f64 {
        let t = &self.thresholds;

        let budget_score = if input.budget_utilization > t.healthy_utilization_low
            && input.budget_utilization < t.healthy_utilization_high
        {
            100.0
        } else {
            50.0
        };

        let acos_score = match input.target_acos {
            Some(target) if target > 0.0 => {
                (100.0 - (input.rollup.acos - target) / target * 100.0).max(0.0)
            }
            _ => t.fallback_acos_score,
        };

        let ctr_score = if input.rollup.ctr > t.ctr_good {
            100.0
        } else if input.rollup.ctr > t.ctr_fair {
            75.0
        } else {
            50.0
        };

        let scored: Vec<u32> = input
            .keywords
            .iter()
            .filter(|k| k.rollup.impressions > 0)
            .map(|k| k.quality.score)
            .collect();
        let keyword_score = if scored.is_empty() {
            t.fallback_keyword_score
        } else {
            scored.iter().sum::<u32>() as f64 / scored.len() as f64
        };

        budget_score * self.weights.budget
            + acos_score * self.weights.acos
            + ctr_score * self.weights.ctr
            + keyword_score * self.weights.keyword
    }
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────
