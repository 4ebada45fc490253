//! Sub-scores, weighting and small-amount priority
//!
//! All sub-scores lie in [0, 100]. LTV and debt come from the configured band
//! tables; legal starts at 100 and loses a fixed penalty per encumbrance;
//! market and building pass through from the valuation when present.

use shared_types::{Region, RegistryLedger, SmallAmountPriority, SubScores, Valuation};

use crate::aggregate::DebtSummary;
use crate::config::{EngineConfig, LegalPenalties, RegionalThresholds, ScoreWeights};

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

pub fn legal_score(ledger: &RegistryLedger, penalties: &LegalPenalties) -> f64 {
    let mut score = 100.0;
    if ledger.has_auction_filing {
        score -= penalties.auction;
    }
    if ledger.has_provisional_registration {
        score -= penalties.provisional_registration;
    }
    if ledger.has_seizure {
        score -= penalties.seizure;
    }
    if ledger.is_co_owned() {
        score -= penalties.co_ownership;
    }
    clamp_score(score)
}

pub fn sub_scores(
    ltv: f64,
    debt: &DebtSummary,
    ledger: &RegistryLedger,
    valuation: &Valuation,
    config: &EngineConfig,
) -> SubScores {
    SubScores {
        ltv: clamp_score(config.ltv_bands.score(ltv)),
        debt: clamp_score(config.debt_bands.score(debt.senior_debt as f64)),
        legal: legal_score(ledger, &config.legal_penalties),
        market: clamp_score(
            valuation
                .market_score
                .unwrap_or_else(|| config.market_trend_scores.get(valuation.market_trend)),
        ),
        building: clamp_score(
            valuation
                .building_score
                .unwrap_or(config.default_building_score),
        ),
    }
}

/// Weighted mean of the sub-scores; weights need not sum to one
pub fn weighted_score(scores: &SubScores, weights: &ScoreWeights) -> f64 {
    let total = weights.total();
    if total <= 0.0 {
        return 0.0;
    }
    (scores.ltv * weights.ltv
        + scores.debt * weights.debt
        + scores.legal * weights.legal
        + scores.market * weights.market
        + scores.building * weights.building)
        / total
}

/// Small-amount deposit priority (주택임대차보호법 제8조).
///
/// Eligibility is a cliff: a deposit one won over the regional threshold
/// protects nothing. When eligible, the protected amount is the regional
/// amount capped at the deposit itself and at half the property value.
pub fn small_amount_priority(
    proposed_deposit: u64,
    valuation_mid: u64,
    region: Region,
    thresholds: &RegionalThresholds,
) -> SmallAmountPriority {
    let table = thresholds.get(region);
    let is_eligible = proposed_deposit <= table.deposit_threshold;
    let protected_amount = if is_eligible {
        table
            .protected_amount
            .min(proposed_deposit)
            .min(valuation_mid / 2)
    } else {
        0
    };

    SmallAmountPriority {
        is_eligible,
        protected_amount,
        threshold: table.deposit_threshold,
        region,
    }
}
