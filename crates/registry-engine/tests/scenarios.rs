//! End-to-end scenarios over registry text fixtures

use pretty_assertions::assert_eq;
use registry_engine::{assess, extract, EngineConfig, RegistryEngine};
use shared_types::{
    ChainStatus, DebtKind, Diagnostic, Region, RegistryEntry, RiskLevel, SectionKind, Valuation,
};

const STRAY_INDEX: &str = include_str!("fixtures/summary_stray_index.txt");
const TRANSFER: &str = include_str!("fixtures/summary_transfer.txt");
const FULL_REGISTER: &str = include_str!("fixtures/full_register.txt");
const FULL_REGISTER_NUMBERED: &str = include_str!("fixtures/full_register_numbered.txt");
const LIEN_ONLY: &str = include_str!("fixtures/lien_only.txt");

fn owner(name: &str, numerator: u32, denominator: u32) -> RegistryEntry {
    RegistryEntry::OwnershipShare {
        name: name.to_string(),
        numerator,
        denominator,
    }
}

#[test]
fn test_stray_adjacent_index_yields_one_mortgage() {
    let out = extract(STRAY_INDEX);
    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);

    let mortgages = &out.ledger.active_mortgages;
    assert_eq!(mortgages.len(), 1);
    assert_eq!(mortgages[0].root_priority, 43);
    assert_eq!(mortgages[0].current_amount, 118_800_000);
    assert_eq!(mortgages[0].current_creditor, "신한은행");
    assert_eq!(out.ledger.ownership, vec![owner("정수진", 1, 1)]);
}

#[test]
fn test_amendment_replaces_and_transfer_supersedes_creditor() {
    let out = extract(TRANSFER);
    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
    let ledger = &out.ledger;

    assert_eq!(ledger.active_mortgages.len(), 1);
    let mortgage = &ledger.active_mortgages[0];
    assert_eq!(mortgage.current_amount, 60_000_000);
    assert_eq!(mortgage.current_creditor, "하나은행");
    assert_eq!(mortgage.history.len(), 3);

    assert_eq!(ledger.active_jeonse_rights.len(), 1);
    assert_eq!(ledger.active_jeonse_rights[0].current_amount, 100_000_000);

    assert_eq!(
        ledger.ownership,
        vec![owner("김철수", 1, 2), owner("이영희", 1, 2)]
    );
    assert!(ledger.is_co_owned());

    // The auction filing was cancelled; the seizure stands
    assert!(!ledger.has_auction_filing);
    assert!(ledger.has_seizure);
    assert!(!ledger.has_provisional_registration);
}

#[test]
fn test_transfer_scenario_assessment() {
    let out = extract(TRANSFER);
    let valuation = Valuation::point(500_000_000);
    let result = assess(&out.ledger, Some(&valuation), 140_000_000, &EngineConfig::default())
        .unwrap();

    assert_eq!(result.small_amount_priority.region, Region::OvercrowdingControl);
    assert!(result.small_amount_priority.is_eligible);
    assert_eq!(result.small_amount_priority.protected_amount, 48_000_000);
    assert!((result.ltv - 0.4).abs() < 1e-9);

    let fired: Vec<&str> = result.risks.iter().map(|r| r.risk_type.as_str()).collect();
    assert_eq!(fired, vec!["seizure", "co_ownership", "senior_tenancy"]);

    let ranking: Vec<DebtKind> = result.debt_ranking.iter().map(|e| e.kind).collect();
    assert_eq!(
        ranking,
        vec![DebtKind::Mortgage, DebtKind::Jeonse, DebtKind::ProposedDeposit]
    );
}

#[test]
fn test_full_register() {
    let out = extract(FULL_REGISTER);
    // 갑구 stands in for the share table a full register lacks
    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);

    let ledger = &out.ledger;
    assert_eq!(ledger.ownership, vec![owner("최지훈", 1, 1)]);
    let creditors: Vec<&str> = ledger
        .active_mortgages
        .iter()
        .map(|c| c.current_creditor.as_str())
        .collect();
    assert_eq!(creditors, vec!["주식회사하나은행", "에이원대부주식회사"]);
    assert!(ledger
        .active_mortgages
        .iter()
        .all(|c| c.status == ChainStatus::Active));

    let valuation = Valuation::point(600_000_000);
    let result = assess(ledger, Some(&valuation), 200_000_000, &EngineConfig::default()).unwrap();
    assert_eq!(result.small_amount_priority.region, Region::MetropolitanCity);
    assert_eq!(result.total_mortgage_amount, 290_000_000);
    assert!(result.risks.iter().any(|r| r.risk_type == "non_bank_creditor"));
}

#[test]
fn test_lot_numbers_ending_a_row_are_not_priorities() {
    let out = extract(FULL_REGISTER_NUMBERED);
    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
    let ledger = &out.ledger;
    assert_eq!(ledger.ownership, vec![owner("윤서연", 1, 1)]);

    let active: Vec<u32> = ledger
        .active_mortgages
        .iter()
        .map(|c| c.root_priority)
        .collect();
    assert_eq!(active, vec![1]);
    assert_eq!(ledger.active_mortgages[0].current_creditor, "주식회사국민은행");

    assert_eq!(ledger.discharged_chains.len(), 1);
    assert_eq!(ledger.discharged_chains[0].root_priority, 2);
    assert_eq!(ledger.discharged_chains[0].status, ChainStatus::Discharged);

    assert_eq!(ledger.active_jeonse_rights.len(), 1);
    let jeonse = &ledger.active_jeonse_rights[0];
    assert_eq!(jeonse.root_priority, 4);
    assert_eq!(jeonse.current_amount, 150_000_000);
    assert_eq!(jeonse.current_creditor, "조민호");
}

#[test]
fn test_missing_sections_are_reported_not_fatal() {
    let out = extract(LIEN_ONLY);
    assert_eq!(
        out.diagnostics,
        vec![
            Diagnostic::SectionNotFound {
                section: SectionKind::Ownership
            },
            Diagnostic::SectionNotFound {
                section: SectionKind::OwnershipEncumbrance
            },
        ]
    );
    assert!(out.ledger.ownership.is_empty());
    assert_eq!(out.ledger.active_mortgages.len(), 1);
    assert_eq!(out.ledger.active_mortgages[0].current_creditor, "농협은행주식회사");
}

#[test]
fn test_ltv_scenario() {
    let text = "[집합건물] 서울특별시 송파구 잠실동 40 잠실아파트 제5동 제1001호
3. (근)저당권 및 전세권 등 ( 을구 )
1 근저당권설정 2017년6월1일 제100호 채권최고액 금150,000,000원 근저당권자 주식회사국민은행";
    let engine = RegistryEngine::new();
    let valuation = Valuation::point(1_000_000_000);
    let (_, result) = engine
        .analyze(text, Some(&valuation), 650_000_000, None)
        .unwrap();

    assert!((result.ltv - 0.8).abs() < 1e-9);
    assert_eq!(result.total_debt, 800_000_000);
    assert_eq!(result.available_equity, 200_000_000);
    assert!(!result.small_amount_priority.is_eligible);
    assert_eq!(result.small_amount_priority.protected_amount, 0);
    assert!(result.risks.iter().any(|r| r.risk_type == "ltv_high"));
    assert!(result
        .risks
        .iter()
        .any(|r| r.risk_type == "small_amount_ineligible"));
    assert_ne!(result.risk_level, RiskLevel::Safe);
}

#[test]
fn test_output_is_json_serializable() {
    let out = extract(TRANSFER);
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["ledger"]["has_seizure"], true);
    assert_eq!(
        json["ledger"]["active_mortgages"][0]["current_creditor"],
        "하나은행"
    );
}
