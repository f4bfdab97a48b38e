//! PPC Console — command-line front end for the keyword intelligence
//! and budget optimization engine.
//!
//! Reads already-parsed JSON documents (daily performance samples per
//! keyword or campaign), runs the engine, and prints JSON to stdout.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ppc_audit::{AuditEngine, CampaignAuditInput, KeywordAuditRecord};
use ppc_core::config::EngineConfig;
use ppc_core::{MetricsRollup, PerformanceSample};
use ppc_intelligence::{calculate_keyword_profit, LifecycleClassifier, QualityScorer};
use ppc_portfolio::{BudgetReallocator, CampaignEfficiencySnapshot};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "ppc-console")]
#[command(about = "Amazon PPC keyword intelligence and budget optimization engine")]
#[command(version)]
struct Cli {
    /// As-of date for lookback windows (defaults to today, UTC)
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score keywords from a JSON file of daily samples
    Score {
        /// Path to a JSON array of keyword histories
        input: PathBuf,
    },
    /// Reallocate a portfolio's total daily budget across campaigns
    Reallocate {
        /// Path to a JSON array of campaign histories
        input: PathBuf,
        /// Target total daily budget to distribute
        #[arg(long, env = "PPC__TOTAL_BUDGET")]
        total_budget: f64,
    },
    /// Audit campaigns and their keywords
    Audit {
        /// Path to a JSON array of campaign audit documents
        input: PathBuf,
    },
}

// ─── Input documents ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct KeywordHistory {
    keyword_id: Uuid,
    keyword: String,
    age_in_days: u32,
    samples: Vec<PerformanceSample>,
}

#[derive(Debug, Deserialize)]
struct CampaignHistory {
    campaign_id: Uuid,
    name: String,
    current_budget: f64,
    samples: Vec<PerformanceSample>,
}

#[derive(Debug, Deserialize)]
struct CampaignAuditDocument {
    campaign_id: Uuid,
    name: String,
    budget_utilization: f64,
    samples: Vec<PerformanceSample>,
    keywords: Vec<KeywordHistory>,
}

#[derive(Debug, Serialize)]
struct KeywordIntelligence {
    keyword_id: Uuid,
    keyword: String,
    rollup: MetricsRollup,
    quality: ppc_intelligence::QualityScoreResult,
    lifecycle: ppc_intelligence::LifecycleStage,
    profit: ppc_intelligence::ProfitCalculation,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ppc_console=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    let as_of = cli
        .as_of
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    match cli.command {
        Command::Score { input } => run_score(&input, &config, as_of),
        Command::Reallocate {
            input,
            total_budget,
        } => run_reallocate(&input, &config, as_of, total_budget),
        Command::Audit { input } => run_audit(&input, &config, as_of),
    }
}

fn run_score(input: &Path, config: &EngineConfig, as_of: NaiveDate) -> anyhow::Result<()> {
    let keywords: Vec<KeywordHistory> = read_json(input)?;
    info!(keywords = keywords.len(), %as_of, "scoring keywords");

    let scorer = QualityScorer::new();
    let classifier = LifecycleClassifier::new();
    let window = config.windows.quality_days;

    let mut results = Vec::with_capacity(keywords.len());
    for kw in keywords {
        let rollup = MetricsRollup::over_window(&kw.samples, as_of, window);
        let quality = scorer.score(&rollup);
        let lifecycle = classifier.classify(kw.age_in_days, &rollup, quality.score);
        let profit = calculate_keyword_profit(rollup.sales, rollup.spend, &config.cost)?;
        results.push(KeywordIntelligence {
            keyword_id: kw.keyword_id,
            keyword: kw.keyword,
            rollup,
            quality,
            lifecycle,
            profit,
        });
    }

    print_json(&results)
}

fn run_reallocate(
    input: &Path,
    config: &EngineConfig,
    as_of: NaiveDate,
    total_budget: f64,
) -> anyhow::Result<()> {
    let campaigns: Vec<CampaignHistory> = read_json(input)?;
    info!(
        campaigns = campaigns.len(),
        total_budget, "reallocating portfolio budget"
    );

    let snapshots: Vec<CampaignEfficiencySnapshot> = campaigns
        .into_iter()
        .map(|c| {
            let rollup = MetricsRollup::over_window(&c.samples, as_of, config.windows.audit_days);
            CampaignEfficiencySnapshot::from_rollup(
                c.campaign_id,
                c.name,
                c.current_budget,
                &rollup,
            )
        })
        .collect();

    let plan = BudgetReallocator::new().reallocate(&snapshots, total_budget)?;
    print_json(&plan)
}

fn run_audit(input: &Path, config: &EngineConfig, as_of: NaiveDate) -> anyhow::Result<()> {
    let documents: Vec<CampaignAuditDocument> = read_json(input)?;
    info!(campaigns = documents.len(), "auditing campaigns");

    let scorer = QualityScorer::new();
    let classifier = LifecycleClassifier::new();
    let engine = AuditEngine::new();
    let window = config.windows.audit_days;

    let mut reports = Vec::with_capacity(documents.len());
    for doc in documents {
        let keywords = doc
            .keywords
            .into_iter()
            .map(|kw| {
                let rollup = MetricsRollup::over_window(&kw.samples, as_of, window);
                let quality = scorer.score(&rollup);
                let lifecycle = classifier.classify(kw.age_in_days, &rollup, quality.score);
                KeywordAuditRecord {
                    keyword_id: kw.keyword_id,
                    keyword: kw.keyword,
                    rollup,
                    quality,
                    lifecycle,
                }
            })
            .collect();

        let audit_input = CampaignAuditInput {
            campaign_id: doc.campaign_id,
            campaign_name: doc.name,
            budget_utilization: doc.budget_utilization,
            target_acos: config.cost.target_acos,
            rollup: MetricsRollup::over_window(&doc.samples, as_of, window),
            keywords,
        };
        reports.push(engine.audit(&audit_input));
    }

    print_json(&reports)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
