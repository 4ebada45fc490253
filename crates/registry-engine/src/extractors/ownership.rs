// Ownership and co-ownership records
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use shared_types::RegistryEntry;
use tracing::debug;

use crate::patterns::{spaced, REGISTRATION_NUMBER};

lazy_static! {
    /// Summary table row: `홍길동 (소유자) 800101-******* 단독소유`
    /// or `김철수 (공유자) 750101-******* 2분의 1`
    static ref SUMMARY_ROW: Regex = Regex::new(&format!(
        r"(?:^|\s)(?P<name>[^\s(]{{2,30}})\s*\(\s*(?:{}|{})\s*\)\s*(?:(?:{})\s*)?(?:(?P<sole>{})|(?P<den>\d+)\s*{}\s*(?P<num>\d+))",
        spaced("소유자"),
        spaced("공유자"),
        REGISTRATION_NUMBER,
        spaced("단독소유"),
        spaced("분의"),
    ))
    .unwrap();

    /// Full register holder: `소유자 홍길동 800101-*******`
    /// or `공유자 지분 2분의 1 김철수 750101-*******`
    static ref REGISTER_HOLDER: Regex = Regex::new(&format!(
        r"(?:{}\s+(?P<owner>[^\s(]{{2,30}})|{}\s*(?:{}\s*)?(?P<den>\d+)\s*{}\s*(?P<num>\d+)\s+(?P<holder>[^\s(]{{2,30}}))\s+(?:{})",
        spaced("소유자"),
        spaced("공유자"),
        spaced("지분"),
        spaced("분의"),
        REGISTRATION_NUMBER,
    ))
    .unwrap();
}

fn share(name: &str, numerator: u32, denominator: u32) -> RegistryEntry {
    RegistryEntry::OwnershipShare {
        name: name.to_string(),
        numerator,
        denominator,
    }
}

fn fraction(caps: &Captures<'_>) -> Option<(u32, u32)> {
    let denominator = caps.name("den")?.as_str().parse::<u32>().ok()?;
    let numerator = caps.name("num")?.as_str().parse::<u32>().ok()?;
    if denominator == 0 || numerator == 0 || numerator > denominator {
        return None;
    }
    Some((numerator, denominator))
}

fn push_unique(out: &mut Vec<RegistryEntry>, entry: RegistryEntry) {
    if !out.contains(&entry) {
        out.push(entry);
    }
}

/// Read current holders from a summary `소유지분현황` section
pub fn extract_summary_shares(text: &str) -> Vec<RegistryEntry> {
    let mut out = Vec::new();
    for caps in SUMMARY_ROW.captures_iter(text) {
        let Some(name) = caps.name("name").map(|m| m.as_str()) else {
            continue;
        };
        let entry = if caps.name("sole").is_some() {
            share(name, 1, 1)
        } else if let Some((numerator, denominator)) = fraction(&caps) {
            share(name, numerator, denominator)
        } else {
            debug!(name, "ownership row with unreadable share");
            continue;
        };
        push_unique(&mut out, entry);
    }
    out
}

/// Read current holders from a full-register 갑구 section.
///
/// Holders are listed in registration order, so each sole owner replaces
/// everyone before it and each run of co-owners replaces the previous owner.
pub fn extract_register_holders(text: &str) -> Vec<RegistryEntry> {
    let mut out: Vec<RegistryEntry> = Vec::new();
    let mut in_share_run = false;
    for caps in REGISTER_HOLDER.captures_iter(text) {
        if let Some(owner) = caps.name("owner") {
            out.clear();
            out.push(share(owner.as_str(), 1, 1));
            in_share_run = false;
            continue;
        }
        let (Some(holder), Some((numerator, denominator))) = (caps.name("holder"), fraction(&caps))
        else {
            continue;
        };
        if !in_share_run {
            out.clear();
            in_share_run = true;
        }
        push_unique(&mut out, share(holder.as_str(), numerator, denominator));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sole_owner_row() {
        let text = "홍길동 (소유자) 800101-******* 단독소유 서울특별시 강남구 역삼동 2";
        assert_eq!(extract_summary_shares(text), vec![share("홍길동", 1, 1)]);
    }

    #[test]
    fn test_co_owner_rows() {
        let text = "김철수 (공유자) 750101-******* 2분의 1 서울특별시 서초구 3 \
                    이영희 (공유자) 780202-******* 2분의 1 서울특별시 서초구 3";
        assert_eq!(
            extract_summary_shares(text),
            vec![share("김철수", 1, 2), share("이영희", 1, 2)]
        );
    }

    #[test]
    fn test_repeated_rows_are_collapsed() {
        let row = "홍길동 (소유자) 800101-******* 단독소유";
        assert_eq!(
            extract_summary_shares(&format!("{} {}", row, row)),
            vec![share("홍길동", 1, 1)]
        );
    }

    #[test]
    fn test_impossible_fraction_is_skipped() {
        let text = "김철수 (공유자) 750101-******* 2분의 3";
        assert!(extract_summary_shares(text).is_empty());
    }

    #[test]
    fn test_register_keeps_latest_owner() {
        let text = "1 소유권보존 2010년1월1일 제1호 소유자 박영수 600101-******* 서울특별시 \
                    2 소유권이전 2015년3월2일 제2호 매매 소유자 홍길동 800101-******* 서울특별시";
        assert_eq!(extract_register_holders(text), vec![share("홍길동", 1, 1)]);
    }

    #[test]
    fn test_register_co_owners_replace_sole_owner() {
        let text = "1 소유권보존 소유자 박영수 600101-******* \
                    2 소유권이전 매매 공유자 지분 2분의 1 김철수 750101-******* 서울 \
                    공유자 지분 2분의 1 이영희 780202-******* 서울";
        assert_eq!(
            extract_register_holders(text),
            vec![share("김철수", 1, 2), share("이영희", 1, 2)]
        );
    }
}
