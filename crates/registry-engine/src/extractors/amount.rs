// Amount and date parsing for registry captures
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref GROUPED_DIGITS: Regex = Regex::new(r"^\d{1,3}(?:,\d{3})+$").unwrap();
    static ref DATE_PARTS: Regex = Regex::new(r"(\d{4})\D+(\d{1,2})\D+(\d{1,2})").unwrap();
}

const EOK: u64 = 100_000_000;
const MAN: u64 = 10_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("malformed digit grouping: {0}")]
    Malformed(String),

    #[error("amount overflows: {0}")]
    Overflow(String),
}

/// Parse a captured amount such as `118,800,000`, `금 118,800,000 원` or
/// `1억2,000만`. Digits with broken grouping (`1,18,800`) are rejected rather
/// than guessed at.
pub fn parse_amount(raw: &str) -> Result<u64, AmountError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.trim_start_matches('금').trim_end_matches('원');

    if let Some((eok, rest)) = compact.split_once('억') {
        let eok = parse_grouped(eok)?;
        let rest = if rest.is_empty() {
            0
        } else if let Some(man) = rest.strip_suffix('만') {
            scale(parse_grouped(man)?, MAN, raw)?
        } else {
            parse_grouped(rest)?
        };
        return scale(eok, EOK, raw)?
            .checked_add(rest)
            .ok_or_else(|| AmountError::Overflow(raw.to_string()));
    }

    if let Some(man) = compact.strip_suffix('만') {
        return scale(parse_grouped(man)?, MAN, raw);
    }

    parse_grouped(compact)
}

fn scale(value: u64, unit: u64, raw: &str) -> Result<u64, AmountError> {
    value
        .checked_mul(unit)
        .ok_or_else(|| AmountError::Overflow(raw.to_string()))
}

fn parse_grouped(digits: &str) -> Result<u64, AmountError> {
    let digits = digits.trim_end_matches([',', '.']);
    if digits.is_empty() {
        return Err(AmountError::Empty);
    }

    let plain = if digits.chars().all(|c| c.is_ascii_digit()) {
        digits.to_string()
    } else if GROUPED_DIGITS.is_match(digits) {
        digits.replace(',', "")
    } else {
        return Err(AmountError::Malformed(digits.to_string()));
    };

    plain
        .parse::<u64>()
        .map_err(|_| AmountError::Overflow(digits.to_string()))
}

/// Parse a captured registration date. Returns `None` for impossible
/// calendar dates (`2019년2월30일`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let caps = DATE_PARTS.captures(raw)?;
    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let day = caps.get(3)?.as_str().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
