// Action items derived from the fired risks
use shared_types::{Recommendations, Risk};

const MOVE_IN_REPORT: &str = "잔금일에 전입신고와 확정일자를 받아 대항력과 우선변제권을 확보하세요.";
const REISSUE_REGISTRY: &str = "잔금 지급 직전에 등기부등본을 다시 발급받아 새 권리변동이 없는지 확인하세요.";
const TAX_CLEARANCE: &str = "임대인의 국세·지방세 완납증명서를 요청하세요.";

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

/// Build the checklist for a set of risks. The two mandatory move-in items
/// are always first; the rest follow the order of the risks.
pub fn recommend(risks: &[Risk]) -> Recommendations {
    let mut out = Recommendations::default();
    push_unique(&mut out.mandatory, MOVE_IN_REPORT);
    push_unique(&mut out.mandatory, REISSUE_REGISTRY);

    for risk in risks {
        match risk.risk_type.as_str() {
            "ltv_critical" | "negative_equity" => {
                push_unique(
                    &mut out.mandatory,
                    "전세보증금 반환보증(HUG·HF·SGI) 가입 가능 여부를 계약 전에 확인하세요.",
                );
                push_unique(
                    &mut out.optional,
                    "보증금을 낮추거나 월세 비중을 높이는 조건으로 재협상하세요.",
                );
            }
            "ltv_high" => {
                push_unique(
                    &mut out.recommended,
                    "전세보증금 반환보증 가입을 권장합니다.",
                );
                push_unique(
                    &mut out.optional,
                    "보증금을 낮추거나 월세 비중을 높이는 조건으로 재협상하세요.",
                );
            }
            "senior_mortgage_heavy" => push_unique(
                &mut out.recommended,
                "잔금일에 근저당 일부 상환 또는 감액등기를 특약으로 요구하세요.",
            ),
            "auction_filed" => push_unique(
                &mut out.mandatory,
                "경매개시결정이 말소되기 전에는 계약하지 마세요.",
            ),
            "provisional_registration" => push_unique(
                &mut out.mandatory,
                "가등기의 원인과 권리자를 확인하고 말소를 계약 조건으로 하세요.",
            ),
            "seizure" => push_unique(
                &mut out.mandatory,
                "(가)압류 해제를 잔금 지급 조건으로 하세요.",
            ),
            "co_ownership" => push_unique(
                &mut out.recommended,
                "공유자 전원(최소 과반 지분)의 동의서와 인감증명서를 받으세요.",
            ),
            "senior_tenancy" => push_unique(
                &mut out.recommended,
                "선순위 전세권·임차권의 보증금과 만기를 확인하세요.",
            ),
            "non_bank_creditor" => push_unique(
                &mut out.recommended,
                "비금융권 근저당권자의 실제 채권액을 확인하세요.",
            ),
            "small_amount_ineligible" => push_unique(
                &mut out.optional,
                "보증금을 소액임차인 기준 이하로 조정하는 방안을 검토하세요.",
            ),
            "low_valuation_confidence" => push_unique(
                &mut out.optional,
                "감정평가나 인근 실거래가로 시세를 다시 확인하세요.",
            ),
            "extraction_uncertain" => push_unique(
                &mut out.optional,
                "판독이 불확실한 항목은 등기부 원본과 직접 대조하세요.",
            ),
            _ => {}
        }
    }

    push_unique(&mut out.recommended, TAX_CLEARANCE);
    out
}
