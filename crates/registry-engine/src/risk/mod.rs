//! Jeonse deposit risk scoring
//!
//! Turns a ledger, a valuation and a proposed deposit into a
//! [`RiskAssessment`]. Scoring is pure: the same inputs and configuration
//! always produce the same assessment.

pub mod recommendations;
pub mod rules;
pub mod scoring;

use shared_types::{Region, RegistryLedger, RiskAssessment, Valuation};
use tracing::{debug, info};

use crate::aggregate::{debt_ranking, summarize};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::region::detect_region;

pub use rules::{default_rules, RiskContext, RiskRule};

/// Assess a deposit, detecting the region from the ledger's address.
/// Properties without a readable address fall into [`Region::Other`].
pub fn assess(
    ledger: &RegistryLedger,
    valuation: Option<&Valuation>,
    proposed_deposit: u64,
    config: &EngineConfig,
) -> Result<RiskAssessment, EngineError> {
    let region = ledger
        .property_address
        .as_deref()
        .map(detect_region)
        .unwrap_or(Region::Other);
    assess_in_region(ledger, valuation, proposed_deposit, region, config)
}

/// Assess a deposit for an explicitly chosen region
pub fn assess_in_region(
    ledger: &RegistryLedger,
    valuation: Option<&Valuation>,
    proposed_deposit: u64,
    region: Region,
    config: &EngineConfig,
) -> Result<RiskAssessment, EngineError> {
    let valuation = valuation
        .filter(|v| v.value_mid > 0)
        .ok_or(EngineError::ValuationMissing)?;
    let mid = valuation.value_mid;

    let debt = summarize(ledger, config.estimated_principal_fraction);
    let total_debt = debt.total_mortgage_amount.saturating_add(proposed_deposit);
    let ltv = total_debt as f64 / mid as f64;
    let available_equity = (mid as i128 - total_debt as i128)
        .clamp(i64::MIN as i128, i64::MAX as i128) as i64;

    let small_amount = scoring::small_amount_priority(
        proposed_deposit,
        mid,
        region,
        &config.regional_thresholds,
    );
    let sub_scores = scoring::sub_scores(ltv, &debt, ledger, valuation, config);
    let base = scoring::weighted_score(&sub_scores, &config.score_weights);

    let ctx = RiskContext {
        ledger,
        valuation,
        debt: &debt,
        ltv,
        available_equity,
        proposed_deposit,
        small_amount: &small_amount,
        config,
    };
    let risks = rules::evaluate(&default_rules(), &ctx);
    let impact: f64 = risks.iter().map(|r| r.impact).sum();
    let overall_score = (base + impact).clamp(0.0, 100.0);
    debug!(base, impact, overall_score, "score");

    let risk_level = config.risk_levels.level(overall_score);
    info!(
        ltv,
        overall_score,
        ?risk_level,
        %region,
        risks = risks.len(),
        "assessment complete"
    );

    Ok(RiskAssessment {
        overall_score,
        risk_level,
        ltv,
        total_debt,
        available_equity,
        total_mortgage_amount: debt.total_mortgage_amount,
        total_estimated_principal: debt.total_estimated_principal,
        proposed_deposit,
        valuation_mid: mid,
        sub_scores,
        small_amount_priority: small_amount,
        recommendations: recommendations::recommend(&risks),
        risks,
        debt_ranking: debt_ranking(ledger, proposed_deposit),
    })
}
