//! Campaign auditing — combines per-keyword intelligence and campaign
//! rollups into an overall health score, issues, and opportunities.

pub mod audit;

pub use audit::{
    AuditEngine, AuditIssue, CampaignAuditInput, CampaignAuditReport, IssueSeverity,
    KeywordAuditRecord, KeywordIssue, KeywordOpportunity,
};
