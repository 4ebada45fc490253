//! Creditor name normalization
//!
//! Raw party captures carry whatever sat next to the name on the page:
//! receipt and registration numbers, the owner's name repeated in the
//! 대상소유자 column, an address, column header words. Cleaning is a bounded
//! fixed-point loop so that nested noise (a name revealed only after an ID is
//! removed) is handled, and so that cleaning a cleaned name is a no-op.

use lazy_static::lazy_static;
use regex::Regex;

use crate::normalize::normalize;
use crate::patterns::{
    contains_institution_keyword, is_personal_name_token, spaced, ADDRESS_START,
    COLUMN_HEADER_WORDS, DATE, DETACHABLE_SUFFIXES, INSTITUTION_PREFIXES, RECEIPT,
    REGISTRATION_NUMBER,
};

const MAX_PASSES: usize = 16;

lazy_static! {
    static ref IDENTIFIERS: Regex =
        Regex::new(&format!("{}|{}|{}", RECEIPT, REGISTRATION_NUMBER, DATE)).unwrap();
    static ref ADDRESS: Regex = Regex::new(&format!(r"(?:{})", ADDRESS_START)).unwrap();
    static ref COLUMN_WORDS: Regex = Regex::new(
        &COLUMN_HEADER_WORDS
            .iter()
            .map(|w| spaced(w))
            .collect::<Vec<_>>()
            .join("|")
    )
    .unwrap();
}

/// Reduce a raw capture to the canonical creditor name.
///
/// Names without an institutional keyword (private lenders, individual
/// tenants) only lose identifiers and addresses; personal-name tokens are
/// stripped only around an institution.
pub fn clean_creditor(raw: &str) -> String {
    let mut current = normalize(raw);
    for _ in 0..MAX_PASSES {
        let next = clean_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn clean_pass(text: &str) -> String {
    let stripped = IDENTIFIERS.replace_all(text, " ");
    let mut stripped = COLUMN_WORDS.replace_all(&stripped, " ").into_owned();

    // A trailing address; an address-only capture is left for the caller
    if let Some(m) = ADDRESS.find(&stripped) {
        if !stripped[..m.start()].trim().is_empty() {
            stripped.truncate(m.start());
        }
    }

    let mut tokens = glue_prefixes(glue_detached(stripped.split_whitespace()));

    if tokens.iter().any(|t| contains_institution_keyword(t)) {
        while tokens.len() > 1 && is_personal_name_token(&tokens[0]) {
            tokens.remove(0);
        }
        while tokens.len() > 1 && tokens.last().is_some_and(|t| is_personal_name_token(t)) {
            tokens.pop();
        }
    }

    tokens.join(" ")
}

/// Glue `은행`, `캐피탈` and similar tokens split off by OCR back onto the
/// token before them
fn glue_detached<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in tokens {
        match out.last_mut() {
            Some(prev) if DETACHABLE_SUFFIXES.contains(&token) => prev.push_str(token),
            _ => out.push(token.to_string()),
        }
    }
    out
}

/// Glue a split-off leading word (`한국`, `케이비`) onto the institution
/// token that follows it, so it is not taken for an owner's name
fn glue_prefixes(tokens: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut pending: Option<String> = None;
    for token in tokens {
        match pending.take() {
            Some(mut prefix) if contains_institution_keyword(&token) => {
                prefix.push_str(&token);
                out.push(prefix);
                continue;
            }
            Some(prefix) => out.push(prefix),
            None => {}
        }
        if INSTITUTION_PREFIXES.contains(&token.as_str()) {
            pending = Some(token);
        } else {
            out.push(token);
        }
    }
    out.extend(pending);
    out
}
