//! Named layout variants
//!
//! A layout variant is one way a record kind is laid out on the page
//! (amount before the creditor keyword, the reverse, a tabular header row,
//! and so on). Variants are plain compiled patterns with named groups
//! `date`, `amount` and `party`; they hold no cursor or other mutable state.

use std::ops::Range;

use regex::Regex;

use crate::patterns::{spaced, AMOUNT, DATE, PARTY_STOP_WORDS, PERSONAL_NAME, RECEIPT};

/// One layout template for a record kind
#[derive(Debug)]
pub struct LayoutVariant {
    pub name: &'static str,
    pattern: Regex,
}

/// Raw captures of a matched variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMatch<'t> {
    pub layout: &'static str,
    pub span: Range<usize>,
    pub date: Option<&'t str>,
    pub amount: Option<&'t str>,
    pub party: Option<&'t str>,
}

impl LayoutVariant {
    /// Compile a template. Placeholders: `{DATE}`, `{AMT}`, `{NAME?}` (an
    /// optional skippable personal name), `{RCPT}`, `{AKW}` (amount
    /// keyword), `{PKW}` (party keyword), `{END}` (end of a party capture:
    /// the next field label or the end of the body).
    pub fn compile(name: &'static str, template: &str, amount_kw: &str, party_kw: &str) -> Self {
        let stop_words = PARTY_STOP_WORDS
            .iter()
            .map(|w| spaced(w))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = template
            .replace("{END}", &format!(r"(?:\s*(?:{})|\s*$)", stop_words))
            .replace("{DATE}", &format!("(?:{})", DATE))
            .replace("{AMT}", &format!("(?:{})", AMOUNT))
            .replace("{NAME?}", &format!(r"(?:{}\s+)?", PERSONAL_NAME))
            .replace("{RCPT}", &format!("(?:{})", RECEIPT))
            .replace("{AKW}", &format!("(?:{})", amount_kw))
            .replace("{PKW}", &format!("(?:{})", party_kw));
        Self {
            name,
            pattern: Regex::new(&pattern).unwrap(),
        }
    }

    pub fn find<'t>(&self, body: &'t str) -> Option<VariantMatch<'t>> {
        let caps = self.pattern.captures(body)?;
        let whole = caps.get(0)?;
        let field = |group: &str| {
            caps.name(group)
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty())
        };
        Some(VariantMatch {
            layout: self.name,
            span: whole.range(),
            date: field("date"),
            amount: field("amount"),
            party: field("party"),
        })
    }
}

/// Pick the best variant for one occurrence body.
///
/// Every variant is tried; among those that match, the one with the smallest
/// span wins and ties go to the earlier variant in the list.
pub fn best_match<'t>(variants: &[LayoutVariant], body: &'t str) -> Option<VariantMatch<'t>> {
    let mut best: Option<VariantMatch<'t>> = None;
    for variant in variants {
        let Some(candidate) = variant.find(body) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some(current) => candidate.span.len() < current.span.len(),
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// Variants for kinds carrying an amount and a party (creations, pledges)
pub fn secured_variants(amount_kw: &str, party_kw: &str) -> Vec<LayoutVariant> {
    vec![
        LayoutVariant::compile(
            "amount_then_party",
            r"{AKW}\s*{NAME?}금?\s*{NAME?}(?P<amount>{AMT})\s*원?\s*{NAME?}{PKW}\s*(?P<party>\S.*?){END}",
            amount_kw,
            party_kw,
        ),
        LayoutVariant::compile(
            "party_then_amount",
            r"{PKW}\s*(?P<party>\S.*?)\s*{AKW}\s*{NAME?}금?\s*{NAME?}(?P<amount>{AMT})\s*원?",
            amount_kw,
            party_kw,
        ),
        LayoutVariant::compile(
            "tabular",
            r"{AKW}\s*{PKW}(?:.*?)금\s*{NAME?}(?P<amount>{AMT})\s*원?\s*(?P<party>\S.*?){END}",
            amount_kw,
            party_kw,
        ),
        LayoutVariant::compile(
            "separated",
            r"{AKW}(?:.*?)금\s*{NAME?}(?P<amount>{AMT})\s*원?(?:.*?){PKW}\s*(?P<party>\S.*?){END}",
            amount_kw,
            party_kw,
        ),
        LayoutVariant::compile(
            "separated_won",
            r"{AKW}(?:.*?)(?P<amount>{AMT})\s*원(?:.*?){PKW}\s*(?P<party>\S.*?){END}",
            amount_kw,
            party_kw,
        ),
    ]
}

/// Variants for amendments that only restate an amount
pub fn amount_variants(amount_kw: &str) -> Vec<LayoutVariant> {
    vec![
        LayoutVariant::compile(
            "amount",
            r"{AKW}\s*{NAME?}금?\s*{NAME?}(?P<amount>{AMT})\s*원?",
            amount_kw,
            "",
        ),
        LayoutVariant::compile(
            "separated_amount",
            r"{AKW}(?:.*?)금\s*(?P<amount>{AMT})",
            amount_kw,
            "",
        ),
        LayoutVariant::compile("bare_amount", r"금\s*(?P<amount>{AMT})\s*원", amount_kw, ""),
    ]
}

/// Variants for transfers that only name the new party
pub fn party_variants(party_kw: &str) -> Vec<LayoutVariant> {
    vec![
        LayoutVariant::compile("party", r"{PKW}\s*(?P<party>\S.*?){END}", "", party_kw),
        LayoutVariant::compile(
            "after_cause",
            r"{RCPT}\s*(?:{DATE}\s*)?(?:[가-힣]*(?:양도|합병|분할|변경)\s+)(?P<party>\S.*?){END}",
            "",
            party_kw,
        ),
    ]
}

/// Variants for kinds whose only field is the registration date
pub fn dated_variants() -> Vec<LayoutVariant> {
    vec![
        LayoutVariant::compile("dated", r"(?P<date>{DATE})", "", ""),
        LayoutVariant::compile("undated", r"^.*$", "", ""),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mortgage() -> Vec<LayoutVariant> {
        secured_variants("채권최고액", "근저당권자")
    }

    #[test]
    fn test_amount_then_party() {
        let body = "2018년3월5일 제12345호 채권최고액 금118,800,000원 근저당권자 주식회사국민은행 홍길동";
        let m = best_match(&mortgage(), body).unwrap();
        assert_eq!(m.layout, "amount_then_party");
        assert_eq!(m.amount, Some("118,800,000"));
        assert_eq!(m.party, Some("주식회사국민은행 홍길동"));
    }

    #[test]
    fn test_party_then_amount() {
        let body = "2018년3월5일 제12345호 근저당권자 주식회사국민은행 채권최고액 금118,800,000원 홍길동";
        let m = best_match(&mortgage(), body).unwrap();
        assert_eq!(m.layout, "party_then_amount");
        assert_eq!(m.amount, Some("118,800,000"));
        assert_eq!(m.party, Some("주식회사국민은행"));
    }

    #[test]
    fn test_owner_name_inside_amount_span_is_skipped() {
        let body = "2018년3월5일 채권최고액 홍길동 금 홍길동 118,800,000원 근저당권자 신한은행";
        let m = best_match(&mortgage(), body).unwrap();
        assert_eq!(m.amount, Some("118,800,000"));
        assert_eq!(m.party, Some("신한은행"));
    }

    #[test]
    fn test_tabular_header_row() {
        let body = "채권최고액 근저당권자 2018년3월5일 제12345호 금118,800,000원 주식회사하나은행";
        let m = best_match(&mortgage(), body).unwrap();
        assert_eq!(m.layout, "tabular");
        assert_eq!(m.amount, Some("118,800,000"));
        assert_eq!(m.party, Some("주식회사하나은행"));
    }

    #[test]
    fn test_separated_keyword_and_value() {
        let body = "채권최고액 (변경전 표시 생략) 2018년3월5일 접수 금118,800,000원 설정계약 근저당권자 우리은행";
        let m = best_match(&mortgage(), body).unwrap();
        assert_eq!(m.amount, Some("118,800,000"));
        assert_eq!(m.party, Some("우리은행"));
    }

    #[test]
    fn test_party_stops_at_next_field_label() {
        let jeonse = secured_variants("전세금", "전세권자");
        let body = "2019년4월1일 제400호 전세금 금300,000,000원 전세권자 김철수 범위 주거용 건물의 전부 존속기간 2021년3월31일까지";
        let m = best_match(&jeonse, body).unwrap();
        assert_eq!(m.amount, Some("300,000,000"));
        assert_eq!(m.party, Some("김철수"));

        let body = "채권최고액 금90,000,000원 근저당권자 우리은행 김철수 피보전권리 소유권이전등기청구권";
        let m = best_match(&mortgage(), body).unwrap();
        assert_eq!(m.party, Some("우리은행 김철수"));
    }

    #[test]
    fn test_no_variant_matches_garbage() {
        assert!(best_match(&mortgage(), "판독 불가 ###").is_none());
    }

    #[test]
    fn test_smaller_span_wins() {
        let variants = vec![
            LayoutVariant::compile("wide", r"a.*c", "", ""),
            LayoutVariant::compile("narrow", r"b.*c", "", ""),
        ];
        let m = best_match(&variants, "abc").unwrap();
        assert_eq!(m.layout, "narrow");
    }

    #[test]
    fn test_equal_span_keeps_earlier_variant() {
        let variants = vec![
            LayoutVariant::compile("first", r"abc", "", ""),
            LayoutVariant::compile("second", r"a.c", "", ""),
        ];
        let m = best_match(&variants, "abc").unwrap();
        assert_eq!(m.layout, "first");
    }

    #[test]
    fn test_transfer_party_after_cause() {
        let variants = party_variants("근저당권자");
        let m = best_match(&variants, "2022년1월10일 제2345호 2022년1월7일 확정채권양도 케이비캐피탈주식회사")
            .unwrap();
        assert_eq!(m.layout, "after_cause");
        assert_eq!(m.party, Some("케이비캐피탈주식회사"));
    }

    #[test]
    fn test_dated_and_undated() {
        let variants = dated_variants();
        let m = best_match(&variants, "2022년1월5일 제9999호 채권자 국민은행").unwrap();
        assert_eq!(m.date, Some("2022년1월5일"));
        let m = best_match(&variants, "판독 불가").unwrap();
        assert_eq!(m.layout, "undated");
        assert_eq!(m.date, None);
    }
}
