//! Property-based tests for the registry engine
//!
//! Extraction, normalization, creditor cleaning, chain resolution and the
//! small-amount cliff, checked with proptest.

use chrono::NaiveDate;
use proptest::prelude::*;
use registry_engine::chain::resolve;
use registry_engine::config::RegionalThresholds;
use registry_engine::creditor::clean_creditor;
use registry_engine::normalize::normalize;
use registry_engine::risk::scoring::small_amount_priority;
use registry_engine::{assess, extract, EngineConfig};
use shared_types::{Region, RegistryEntry, RegistryRecord, Valuation};

// ============================================================
// Generators
// ============================================================

/// Lines a summary document is assembled from
fn document_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("1. 소유지분현황 ( 갑구 )".to_string()),
        Just("3. (근)저당권 및 전세권 등 ( 을구 )".to_string()),
        Just("2. 소유지분을 제외한 소유권에 관한 사항 ( 갑구 )".to_string()),
        Just("홍길동 (소유자) 800101-******* 단독소유".to_string()),
        (1u32..50, 1u64..900).prop_map(|(p, m)| format!(
            "{} 근저당권설정 2018년3월5일 제{}호 채권최고액 금{},000,000원 근저당권자 우리은행 홍길동",
            p, p, m
        )),
        (1u32..50, 1u32..5).prop_map(|(p, s)| format!(
            "{}-{} 근저당권변경 2020년1월{}일 제9호 채권최고액 금10,000,000원",
            p, s, s
        )),
        (1u32..50, 1u32..50).prop_map(|(p, t)| format!("{} {}번근저당권설정등기말소 2021년1월1일", p, t)),
        (1u32..50).prop_map(|p| format!("{} 가압류 2022년3월1일 제1호 청구금액 금5,000,000원", p)),
        "[가-힣0-9 ]{0,30}",
    ]
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(document_line(), 0..12).prop_map(|lines| lines.join("\n"))
}

fn creditor_token() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("홍길동"),
        Just("김철수"),
        Just("주식회사국민은행"),
        Just("우리"),
        Just("은행"),
        Just("(주)"),
        Just("캐피탈"),
        Just("제123호"),
        Just("800101-*******"),
        Just("서울특별시"),
        Just("강남구"),
        Just("역삼지점"),
        Just("2018년3월5일"),
        Just("대부"),
    ]
}

fn creditor_raw() -> impl Strategy<Value = String> {
    prop::collection::vec((creditor_token(), prop::bool::ANY), 1..7).prop_map(|tokens| {
        tokens
            .into_iter()
            .map(|(t, wide)| if wide { format!("{}  ", t) } else { format!("{} ", t) })
            .collect()
    })
}

fn date(day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2020, 1, day)
}

fn record(entry: RegistryEntry) -> RegistryRecord {
    RegistryRecord::new(entry, "generated")
}

/// A small section's worth of records with chains, subs, a discharge and
/// a standalone seizure
fn section_records() -> Vec<RegistryRecord> {
    vec![
        record(RegistryEntry::MortgageCreated {
            priority: 1,
            date: date(1),
            max_secured_amount: 120_000_000,
            creditor_raw: "우리은행 홍길동".to_string(),
        }),
        record(RegistryEntry::MortgageAmended {
            parent_priority: 1,
            sub_index: 1,
            date: date(5),
            new_max_secured_amount: 90_000_000,
        }),
        record(RegistryEntry::MortgageAmended {
            parent_priority: 1,
            sub_index: 2,
            date: date(9),
            new_max_secured_amount: 60_000_000,
        }),
        record(RegistryEntry::MortgageTransferred {
            parent_priority: 1,
            sub_index: 3,
            date: date(12),
            new_creditor_raw: "하나은행".to_string(),
        }),
        record(RegistryEntry::MortgageCreated {
            priority: 2,
            date: date(2),
            max_secured_amount: 30_000_000,
            creditor_raw: "신한은행".to_string(),
        }),
        record(RegistryEntry::Discharge {
            priority: 4,
            target_priority: 2,
            date: date(20),
        }),
        record(RegistryEntry::Seizure {
            priority: 3,
            date: date(3),
            claim_amount: 5_000_000,
        }),
        record(RegistryEntry::MortgageAmended {
            parent_priority: 9,
            sub_index: 1,
            date: date(4),
            new_max_secured_amount: 1,
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================================
    // Extraction
    // ============================================================

    #[test]
    fn extraction_is_deterministic(text in document()) {
        prop_assert_eq!(extract(&text), extract(&text));
    }

    #[test]
    fn normalization_is_idempotent(text in any::<String>()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(!once.contains("  "));
    }

    #[test]
    fn creditor_cleaning_is_a_fixed_point(raw in creditor_raw()) {
        let once = clean_creditor(&raw);
        prop_assert_eq!(clean_creditor(&once), once.clone());
        prop_assert!(!once.contains("  "));
    }

    // ============================================================
    // Chain resolution
    // ============================================================

    #[test]
    fn resolution_ignores_input_order(
        shuffled in Just(section_records()).prop_shuffle()
    ) {
        prop_assert_eq!(resolve(&shuffled), resolve(&section_records()));
    }

    #[test]
    fn latest_amendment_replaces_amount(
        amounts in prop::collection::vec(1u64..1_000_000_000, 1..10)
    ) {
        let mut records = vec![record(RegistryEntry::MortgageCreated {
            priority: 1,
            date: NaiveDate::from_ymd_opt(2015, 1, 1),
            max_secured_amount: 7,
            creditor_raw: "국민은행".to_string(),
        })];
        for (idx, amount) in amounts.iter().enumerate() {
            records.push(record(RegistryEntry::MortgageAmended {
                parent_priority: 1,
                sub_index: idx as u32 + 1,
                date: NaiveDate::from_ymd_opt(2016 + idx as i32, 1, 1),
                new_max_secured_amount: *amount,
            }));
        }
        let resolution = resolve(&records);
        prop_assert_eq!(resolution.chains.len(), 1);
        prop_assert_eq!(resolution.chains[0].current_amount, *amounts.last().unwrap());
    }

    // ============================================================
    // Scoring
    // ============================================================

    #[test]
    fn small_amount_priority_is_a_cliff(
        deposit in 0u64..400_000_000,
        mid in 1u64..2_000_000_000,
        region in prop_oneof![
            Just(Region::Seoul),
            Just(Region::OvercrowdingControl),
            Just(Region::MetropolitanCity),
            Just(Region::Other),
        ]
    ) {
        let thresholds = RegionalThresholds::default();
        let threshold = thresholds.get(region).deposit_threshold;
        let result = small_amount_priority(deposit, mid, region, &thresholds);

        prop_assert_eq!(result.is_eligible, deposit <= threshold);
        prop_assert!(result.protected_amount <= deposit);
        prop_assert!(result.protected_amount <= mid / 2);
        if !result.is_eligible {
            prop_assert_eq!(result.protected_amount, 0);
        }
    }

    #[test]
    fn overall_score_stays_in_range(
        text in document(),
        mid in 1u64..3_000_000_000,
        deposit in 0u64..3_000_000_000,
    ) {
        let ledger = extract(&text).ledger;
        let result = assess(&ledger, Some(&Valuation::point(mid)), deposit, &EngineConfig::default())
            .unwrap();
        prop_assert!((0.0..=100.0).contains(&result.overall_score));
        prop_assert_eq!(result.debt_ranking.last().map(|e| e.amount), Some(deposit));
    }
}
