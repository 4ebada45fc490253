//! Risk rules
//!
//! Each rule looks at one aspect of the ledger and the proposed deposit and
//! either stays silent or reports a [`Risk`] with a signed impact on the
//! overall score. Rules run in a fixed order so the risk list is stable.

use shared_types::{
    Risk, RiskCategory, RegistryLedger, Severity, SmallAmountPriority, Valuation,
};

use crate::aggregate::DebtSummary;
use crate::config::EngineConfig;
use crate::patterns::{contains_distressed_keyword, contains_institution_keyword};

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct RiskContext<'a> {
    pub ledger: &'a RegistryLedger,
    pub valuation: &'a Valuation,
    pub debt: &'a DebtSummary,
    pub ltv: f64,
    pub available_equity: i64,
    pub proposed_deposit: u64,
    pub small_amount: &'a SmallAmountPriority,
    pub config: &'a EngineConfig,
}

/// Trait for risk rules
pub trait RiskRule: Send + Sync {
    /// Stable identifier, reported as the risk type
    fn name(&self) -> &'static str;

    fn category(&self) -> RiskCategory;

    /// Check the context against this rule
    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk>;
}

fn risk(
    rule: &dyn RiskRule,
    severity: Severity,
    title: &str,
    description: String,
    impact: f64,
) -> Risk {
    Risk {
        risk_type: rule.name().to_string(),
        severity,
        title: title.to_string(),
        description,
        impact,
        category: rule.category(),
    }
}

fn eok(amount: u64) -> String {
    format!("{:.2}억원", amount as f64 / 100_000_000.0)
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

pub struct LtvCritical;

impl RiskRule for LtvCritical {
    fn name(&self) -> &'static str {
        "ltv_critical"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Ltv
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        let rules = &ctx.config.rules;
        (ctx.ltv >= rules.ltv_critical).then(|| {
            risk(
                self,
                Severity::Critical,
                "깡통전세 위험",
                format!(
                    "근저당 채권최고액과 보증금의 합이 매매가의 {}입니다. 경매 시 보증금을 돌려받지 못할 가능성이 큽니다.",
                    percent(ctx.ltv)
                ),
                rules.ltv_critical_impact,
            )
        })
    }
}

pub struct LtvHigh;

impl RiskRule for LtvHigh {
    fn name(&self) -> &'static str {
        "ltv_high"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Ltv
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        let rules = &ctx.config.rules;
        (ctx.ltv >= rules.ltv_high && ctx.ltv < rules.ltv_critical).then(|| {
            risk(
                self,
                Severity::High,
                "높은 담보인정비율",
                format!(
                    "LTV가 {}로 경매 낙찰가율을 고려하면 보증금 일부 손실 위험이 있습니다.",
                    percent(ctx.ltv)
                ),
                rules.ltv_high_impact,
            )
        })
    }
}

pub struct NegativeEquity;

impl RiskRule for NegativeEquity {
    fn name(&self) -> &'static str {
        "negative_equity"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Ltv
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        (ctx.available_equity < 0).then(|| {
            risk(
                self,
                Severity::Critical,
                "선순위 채권이 매매가 초과",
                format!(
                    "근저당과 보증금의 합이 매매가보다 {} 많습니다.",
                    eok(ctx.available_equity.unsigned_abs())
                ),
                ctx.config.rules.negative_equity_impact,
            )
        })
    }
}

pub struct SeniorMortgageHeavy;

impl RiskRule for SeniorMortgageHeavy {
    fn name(&self) -> &'static str {
        "senior_mortgage_heavy"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Debt
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        let mid = ctx.valuation.value_mid as f64;
        let share = ctx.debt.total_mortgage_amount as f64 / mid;
        (share > ctx.config.rules.senior_mortgage_fraction).then(|| {
            risk(
                self,
                Severity::Medium,
                "과다한 선순위 근저당",
                format!(
                    "선순위 근저당 채권최고액 합계 {}이 매매가의 {}를 차지합니다.",
                    eok(ctx.debt.total_mortgage_amount),
                    percent(share)
                ),
                ctx.config.rules.senior_mortgage_heavy_impact,
            )
        })
    }
}

pub struct AuctionFiled;

impl RiskRule for AuctionFiled {
    fn name(&self) -> &'static str {
        "auction_filed"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Legal
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        ctx.ledger.has_auction_filing.then(|| {
            risk(
                self,
                Severity::Critical,
                "경매개시결정 등기",
                "경매 절차가 개시된 부동산입니다. 계약 후 전입해도 경매에서 대항력을 인정받기 어렵습니다."
                    .to_string(),
                ctx.config.rules.auction_filed_impact,
            )
        })
    }
}

pub struct ProvisionalRegistration;

impl RiskRule for ProvisionalRegistration {
    fn name(&self) -> &'static str {
        "provisional_registration"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Legal
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        ctx.ledger.has_provisional_registration.then(|| {
            risk(
                self,
                Severity::High,
                "가등기 존재",
                "본등기가 이루어지면 소유자가 바뀌고 이후의 임차권이 소멸할 수 있습니다.".to_string(),
                ctx.config.rules.provisional_registration_impact,
            )
        })
    }
}

pub struct Seizure;

impl RiskRule for Seizure {
    fn name(&self) -> &'static str {
        "seizure"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Legal
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        ctx.ledger.has_seizure.then(|| {
            risk(
                self,
                Severity::High,
                "(가)압류 존재",
                "채권자가 부동산을 압류했습니다. 임대인의 재정 상태가 불안정하다는 신호입니다.".to_string(),
                ctx.config.rules.seizure_impact,
            )
        })
    }
}

pub struct CoOwnership;

impl RiskRule for CoOwnership {
    fn name(&self) -> &'static str {
        "co_ownership"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Legal
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        ctx.ledger.is_co_owned().then(|| {
            risk(
                self,
                Severity::Medium,
                "공동소유",
                format!(
                    "소유자가 {}명입니다. 공유자 과반 지분의 동의 없이 맺은 계약은 다툼의 여지가 있습니다.",
                    ctx.ledger.ownership.len()
                ),
                ctx.config.rules.co_ownership_impact,
            )
        })
    }
}

pub struct SeniorTenancy;

impl RiskRule for SeniorTenancy {
    fn name(&self) -> &'static str {
        "senior_tenancy"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Debt
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        let senior = ctx
            .debt
            .total_jeonse_amount
            .saturating_add(ctx.debt.total_lease_amount);
        (senior > 0).then(|| {
            risk(
                self,
                Severity::Medium,
                "선순위 전세권·임차권",
                format!(
                    "등기된 전세권·임차권 {}이 새 보증금보다 먼저 배당됩니다.",
                    eok(senior)
                ),
                ctx.config.rules.senior_tenancy_impact,
            )
        })
    }
}

pub struct NonBankCreditor;

impl RiskRule for NonBankCreditor {
    fn name(&self) -> &'static str {
        "non_bank_creditor"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Debt
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        let flagged: Vec<&str> = ctx
            .ledger
            .active_mortgages
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.current_creditor.as_str())
            .filter(|name| {
                !name.is_empty()
                    && (contains_distressed_keyword(name) || !contains_institution_keyword(name))
            })
            .collect();
        (!flagged.is_empty()).then(|| {
            risk(
                self,
                Severity::Medium,
                "비금융권 근저당권자",
                format!(
                    "대부업체·개인 등 비금융권 근저당권자가 있습니다: {}",
                    flagged.join(", ")
                ),
                ctx.config.rules.non_bank_creditor_impact,
            )
        })
    }
}

pub struct SmallAmountIneligible;

impl RiskRule for SmallAmountIneligible {
    fn name(&self) -> &'static str {
        "small_amount_ineligible"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Protection
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        let small = ctx.small_amount;
        (!small.is_eligible).then(|| {
            risk(
                self,
                Severity::Medium,
                "최우선변제 대상 아님",
                format!(
                    "보증금 {}이 {} 소액임차인 기준 {}을 넘어 최우선변제를 받을 수 없습니다.",
                    eok(ctx.proposed_deposit),
                    small.region,
                    eok(small.threshold)
                ),
                ctx.config.rules.small_amount_ineligible_impact,
            )
        })
    }
}

pub struct LowValuationConfidence;

impl RiskRule for LowValuationConfidence {
    fn name(&self) -> &'static str {
        "low_valuation_confidence"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Market
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        let confidence = ctx.valuation.confidence;
        (confidence < ctx.config.rules.low_valuation_confidence).then(|| {
            risk(
                self,
                Severity::Low,
                "시세 신뢰도 낮음",
                format!(
                    "시세 추정 신뢰도가 {}로 낮습니다. 추정 범위 {} ~ {}",
                    percent(confidence),
                    eok(ctx.valuation.value_low),
                    eok(ctx.valuation.value_high)
                ),
                ctx.config.rules.low_valuation_confidence_impact,
            )
        })
    }
}

pub struct ExtractionUncertain;

impl RiskRule for ExtractionUncertain {
    fn name(&self) -> &'static str {
        "extraction_uncertain"
    }

    fn category(&self) -> RiskCategory {
        RiskCategory::Data
    }

    fn check(&self, ctx: &RiskContext<'_>) -> Option<Risk> {
        ctx.ledger.has_low_confidence().then(|| {
            risk(
                self,
                Severity::Low,
                "판독 불확실",
                "금액이나 날짜를 확실히 판독하지 못한 등기 항목이 있습니다.".to_string(),
                ctx.config.rules.extraction_uncertain_impact,
            )
        })
    }
}

/// All rules in evaluation order
pub fn default_rules() -> Vec<Box<dyn RiskRule>> {
    vec![
        Box::new(LtvCritical),
        Box::new(LtvHigh),
        Box::new(NegativeEquity),
        Box::new(SeniorMortgageHeavy),
        Box::new(AuctionFiled),
        Box::new(ProvisionalRegistration),
        Box::new(Seizure),
        Box::new(CoOwnership),
        Box::new(SeniorTenancy),
        Box::new(NonBankCreditor),
        Box::new(SmallAmountIneligible),
        Box::new(LowValuationConfidence),
        Box::new(ExtractionUncertain),
    ]
}

pub fn evaluate(rules: &[Box<dyn RiskRule>], ctx: &RiskContext<'_>) -> Vec<Risk> {
    rules.iter().filter_map(|rule| rule.check(ctx)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use crate::risk::scoring::small_amount_priority;
    use shared_types::{ChainKind, ChainStatus, LienChain, Region};

    fn mortgage(creditor: &str, amount: u64) -> LienChain {
        LienChain {
            root_priority: 1,
            kind: ChainKind::Mortgage,
            history: Vec::new(),
            current_creditor: creditor.to_string(),
            current_amount: amount,
            status: ChainStatus::Active,
            registration_date: None,
            pledges: Vec::new(),
            low_confidence: false,
        }
    }

    fn fired(ledger: &RegistryLedger, valuation: &Valuation, deposit: u64) -> Vec<String> {
        let config = EngineConfig::default();
        let debt = summarize(ledger, config.estimated_principal_fraction);
        let total = debt.total_mortgage_amount + deposit;
        let small = small_amount_priority(
            deposit,
            valuation.value_mid,
            Region::Seoul,
            &config.regional_thresholds,
        );
        let ctx = RiskContext {
            ledger,
            valuation,
            debt: &debt,
            ltv: total as f64 / valuation.value_mid as f64,
            available_equity: valuation.value_mid as i64 - total as i64,
            proposed_deposit: deposit,
            small_amount: &small,
            config: &config,
        };
        evaluate(&default_rules(), &ctx)
            .into_iter()
            .map(|r| r.risk_type)
            .collect()
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let names: Vec<&str> = default_rules().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "ltv_critical",
                "ltv_high",
                "negative_equity",
                "senior_mortgage_heavy",
                "auction_filed",
                "provisional_registration",
                "seizure",
                "co_ownership",
                "senior_tenancy",
                "non_bank_creditor",
                "small_amount_ineligible",
                "low_valuation_confidence",
                "extraction_uncertain",
            ]
        );
    }

    #[test]
    fn test_clean_small_deposit_fires_nothing() {
        let ledger = RegistryLedger::default();
        let fired = fired(&ledger, &Valuation::point(1_000_000_000), 100_000_000);
        assert!(fired.is_empty(), "unexpected risks: {:?}", fired);
    }

    #[test]
    fn test_underwater_property() {
        let ledger = RegistryLedger {
            active_mortgages: vec![mortgage("국민은행", 600_000_000)],
            ..Default::default()
        };
        let fired = fired(&ledger, &Valuation::point(1_000_000_000), 500_000_000);
        assert_eq!(
            fired,
            vec![
                "ltv_critical",
                "negative_equity",
                "senior_mortgage_heavy",
                "small_amount_ineligible",
            ]
        );
    }

    #[test]
    fn test_ltv_high_band_excludes_critical() {
        let ledger = RegistryLedger {
            active_mortgages: vec![mortgage("국민은행", 150_000_000)],
            ..Default::default()
        };
        let fired = fired(&ledger, &Valuation::point(1_000_000_000), 650_000_000);
        assert!(fired.contains(&"ltv_high".to_string()));
        assert!(!fired.contains(&"ltv_critical".to_string()));
    }

    #[test]
    fn test_private_and_distressed_creditors() {
        let ledger = RegistryLedger {
            active_mortgages: vec![
                mortgage("김철수", 10_000_000),
                mortgage("에이원대부주식회사", 10_000_000),
                mortgage("신한은행", 10_000_000),
            ],
            ..Default::default()
        };
        let fired = fired(&ledger, &Valuation::point(1_000_000_000), 100_000_000);
        assert_eq!(fired, vec!["non_bank_creditor"]);
    }

    #[test]
    fn test_low_valuation_confidence() {
        let mut valuation = Valuation::point(1_000_000_000);
        valuation.confidence = 0.3;
        let fired = fired(&RegistryLedger::default(), &valuation, 100_000_000);
        assert_eq!(fired, vec!["low_valuation_confidence"]);
    }
}
