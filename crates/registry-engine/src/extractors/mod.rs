//! Entry extractors
//!
//! A section is cut into occurrences at every anchor: a priority token
//! (`3`, `3-1`, or `43 25` where the trailing integer is stray OCR noise)
//! followed by a record-kind keyword. Each occurrence body runs up to the next
//! anchor, and the record kind's layout variants are tried against that body.
//!
//! Integers ahead of a keyword are not all priorities: the previous body may
//! end in a lot number (`을지로 35`). The priority is the integer that opens
//! a printed line or, when line breaks were lost, the one that continues the
//! section's priority sequence.

pub mod amount;
pub mod layout;
pub mod ownership;

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::{Captures, Match, Regex};
use shared_types::{Diagnostic, RegistryEntry, RegistryRecord};
use tracing::debug;

use crate::normalize::normalize_lines;
use crate::patterns::{spaced, DATE};
use amount::{parse_amount, parse_date};
use layout::{
    amount_variants, best_match, dated_variants, party_variants, secured_variants, LayoutVariant,
    VariantMatch,
};

/// Record kinds recognised by the anchor scanner, in keyword match order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Discharge,
    MortgageAmended,
    MortgageTransferred,
    Pledge,
    MortgageCreated,
    JeonseAmended,
    JeonseCreated,
    LeaseCreated,
    AuctionFiled,
    ProvisionalRegistration,
    Seizure,
    /// Ownership transfers, preservation and trusts: not encumbrances
    Ignored,
    Unknown,
}

impl RecordKind {
    const GROUPS: [(&'static str, RecordKind); 12] = [
        ("k_discharge", RecordKind::Discharge),
        ("k_mortgage_amended", RecordKind::MortgageAmended),
        ("k_mortgage_transferred", RecordKind::MortgageTransferred),
        ("k_pledge", RecordKind::Pledge),
        ("k_mortgage_created", RecordKind::MortgageCreated),
        ("k_jeonse_amended", RecordKind::JeonseAmended),
        ("k_jeonse_created", RecordKind::JeonseCreated),
        ("k_lease_created", RecordKind::LeaseCreated),
        ("k_auction", RecordKind::AuctionFiled),
        ("k_provisional", RecordKind::ProvisionalRegistration),
        ("k_seizure", RecordKind::Seizure),
        ("k_other", RecordKind::Unknown),
    ];

    fn from_captures(caps: &Captures<'_>) -> Option<(RecordKind, String)> {
        Self::GROUPS.iter().find_map(|(group, kind)| {
            caps.name(group).map(|m| {
                let keyword = m.as_str().to_string();
                let kind = if *kind == RecordKind::Unknown && is_ignored_keyword(&keyword) {
                    RecordKind::Ignored
                } else {
                    *kind
                };
                (kind, keyword)
            })
        })
    }

    fn is_sub_entry(&self) -> bool {
        matches!(
            self,
            RecordKind::MortgageAmended
                | RecordKind::MortgageTransferred
                | RecordKind::Pledge
                | RecordKind::JeonseAmended
        )
    }
}

fn is_ignored_keyword(keyword: &str) -> bool {
    let compact: String = keyword.chars().filter(|c| !c.is_whitespace()).collect();
    compact.starts_with("소유권") || compact.contains("신탁")
}

/// `근저당권…` keyword that also accepts plain `저당권…`
fn geun(rest: &str) -> String {
    format!(r"(?:근\s*)?{}", spaced(rest))
}

lazy_static! {
    static ref ANCHOR: Regex = {
        let keywords = [
            format!(
                r"(?P<k_discharge>(?P<target>\d{{1,4}})\s*번\s*[가-힣()\s]{{0,30}}?{})",
                spaced("말소")
            ),
            format!(r"(?P<k_mortgage_amended>{})", geun("저당권변경")),
            format!(
                r"(?P<k_mortgage_transferred>{}(?:\s*일\s*부)?\s*{})",
                geun("저당권"),
                spaced("이전")
            ),
            format!(
                r"(?P<k_pledge>(?:{}\s*)?(?:근\s*)?{}(?:\s*{})?)",
                geun("저당권부"),
                spaced("질권"),
                spaced("설정")
            ),
            format!(r"(?P<k_mortgage_created>{})", geun("저당권설정")),
            format!(r"(?P<k_jeonse_amended>{})", spaced("전세권변경")),
            format!(r"(?P<k_jeonse_created>{})", spaced("전세권설정")),
            format!(
                r"(?P<k_lease_created>(?:주\s*택\s*)?{}(?:\s*{}|\s*{})?)",
                spaced("임차권"),
                spaced("설정"),
                spaced("등기")
            ),
            format!(
                r"(?P<k_auction>(?:{}|{})\s*{})",
                spaced("임의"),
                spaced("강제"),
                spaced("경매개시결정")
            ),
            format!(
                r"(?P<k_provisional>(?:{}(?:\s*{}|\s*{})?\s*)?{})",
                spaced("소유권이전"),
                spaced("청구권"),
                spaced("담보"),
                spaced("가등기")
            ),
            format!(r"(?P<k_seizure>{}|{})", spaced("가압류"), spaced("압류")),
            r"(?P<k_other>[가-힣]{2,12}?(?:설정|이전|변경|보존|등기|결정|말소|압류|신탁|해제|경정)|[가-힣]{0,8}?(?:가처분|지상권|지역권|환매특약))"
                .to_string(),
        ];
        Regex::new(&format!(
            r"(?:(?:^|\s)(?P<root>\d{{1,4}})(?:-(?P<sub>\d{{1,3}}))?|[가-힣)\]](?P<glued_root>\d{{1,4}})-(?P<glued_sub>\d{{1,3}}))(?P<strays>(?:\s+\d{{1,4}}(?:-\d{{1,3}})?)*?)\s*(?:{})",
            keywords.join("|")
        ))
        .unwrap()
    };

    static ref PRIORITY_TOKEN: Regex =
        Regex::new(r"(?P<root>\d{1,4})(?:-(?P<sub>\d{1,3}))?").unwrap();

    static ref FIRST_DATE: Regex = Regex::new(&format!("(?:{})", DATE)).unwrap();
    static ref CANCELLATION: Regex = Regex::new(&spaced("말소")).unwrap();

    static ref MORTGAGE_VARIANTS: Vec<LayoutVariant> =
        secured_variants(&spaced("채권최고액"), &spaced("근저당권자"));
    static ref MORTGAGE_AMENDMENT_VARIANTS: Vec<LayoutVariant> =
        amount_variants(&spaced("채권최고액"));
    static ref MORTGAGE_TRANSFER_VARIANTS: Vec<LayoutVariant> =
        party_variants(&spaced("근저당권자"));
    static ref PLEDGE_VARIANTS: Vec<LayoutVariant> =
        secured_variants(&spaced("채권액"), &format!("{}|{}", spaced("질권자"), spaced("채권자")));
    static ref JEONSE_VARIANTS: Vec<LayoutVariant> =
        secured_variants(&spaced("전세금"), &spaced("전세권자"));
    static ref JEONSE_AMENDMENT_VARIANTS: Vec<LayoutVariant> = amount_variants(&spaced("전세금"));
    static ref LEASE_VARIANTS: Vec<LayoutVariant> = secured_variants(
        &format!("{}|{}", spaced("임차보증금"), spaced("보증금")),
        &spaced("임차권자")
    );
    static ref SEIZURE_VARIANTS: Vec<LayoutVariant> = vec![
        LayoutVariant::compile(
            "claim_amount",
            r"{AKW}\s*금?\s*(?P<amount>{AMT})\s*원?",
            &spaced("청구금액"),
            "",
        ),
        LayoutVariant::compile("no_amount", r"^.*$", "", ""),
    ];
    static ref DATED_VARIANTS: Vec<LayoutVariant> = dated_variants();
}

/// Records and diagnostics read from one section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionExtraction {
    pub records: Vec<RegistryRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One anchored occurrence inside a section
#[derive(Debug)]
struct Occurrence<'t> {
    kind: RecordKind,
    root: u32,
    sub: Option<u32>,
    target: Option<u32>,
    body: &'t str,
    snippet: String,
}

/// An integer token that may be an entry's priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    start: usize,
    root: u32,
    sub: Option<u32>,
}

fn parse_number(m: Option<Match<'_>>) -> Option<u32> {
    m.and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Integer tokens between an anchor's start and its keyword, in text order
fn candidates(caps: &Captures<'_>) -> Vec<Candidate> {
    let mut out = Vec::new();
    if let Some(first) = caps.name("root").or_else(|| caps.name("glued_root")) {
        if let Some(root) = parse_number(Some(first)) {
            out.push(Candidate {
                start: first.start(),
                root,
                sub: parse_number(caps.name("sub").or_else(|| caps.name("glued_sub"))),
            });
        }
    }
    if let Some(strays) = caps.name("strays") {
        for token in PRIORITY_TOKEN.captures_iter(strays.as_str()) {
            let (Some(whole), Some(root)) = (token.get(0), parse_number(token.name("root"))) else {
                continue;
            };
            out.push(Candidate {
                start: strays.start() + whole.start(),
                root,
                sub: parse_number(token.name("sub")),
            });
        }
    }
    out.retain(|c| c.root != 0);
    out
}

/// Choose the priority among the integers ahead of one keyword.
///
/// The first integer wins when it opens a printed line (`43 25` keeps 43).
/// Otherwise the last integer opening a line wins. Without line breaks the
/// integers are read against the previous priority: the smallest one not
/// below it continues the sequence, and anything before it belongs to the
/// previous body.
fn pick_root(
    candidates: &[Candidate],
    line_starts: &[usize],
    previous: Option<u32>,
) -> Option<Candidate> {
    let first = *candidates.first()?;
    let opens_line = |c: &Candidate| line_starts.binary_search(&c.start).is_ok();
    if candidates.len() == 1 || opens_line(&first) {
        return Some(first);
    }
    if let Some(opener) = candidates.iter().rev().find(|c| opens_line(*c)) {
        return Some(*opener);
    }
    let Some(previous) = previous else {
        return Some(first);
    };
    candidates
        .iter()
        .filter(|c| c.root >= previous)
        .min_by_key(|c| c.root)
        .copied()
        .or(Some(first))
}

fn scan<'t>(text: &'t str, line_starts: &[usize]) -> Vec<Occurrence<'t>> {
    let mut anchors: Vec<(usize, usize, RecordKind, u32, Option<u32>, Option<u32>)> = Vec::new();
    for caps in ANCHOR.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Some((kind, keyword)) = RecordKind::from_captures(&caps) else {
            continue;
        };
        let previous = anchors.last().map(|anchor| anchor.3);
        let Some(chosen) = pick_root(&candidates(&caps), line_starts, previous) else {
            continue;
        };
        let target = parse_number(caps.name("target"));
        debug!(root = chosen.root, sub = ?chosen.sub, ?kind, keyword = %keyword, "anchor");
        anchors.push((chosen.start, whole.end(), kind, chosen.root, chosen.sub, target));
    }

    let mut occurrences = Vec::with_capacity(anchors.len());
    for (idx, (start, keyword_end, kind, root, sub, target)) in anchors.iter().enumerate() {
        let end = anchors
            .get(idx + 1)
            .map(|next| next.0)
            .unwrap_or(text.len());
        let body = text[*keyword_end..end].trim();
        let snippet = text[*start..end].trim().chars().take(80).collect();
        occurrences.push(Occurrence {
            kind: *kind,
            root: *root,
            sub: *sub,
            target: *target,
            body,
            snippet,
        });
    }
    occurrences
}

/// Extract every encumbrance record from one section's text. Line breaks,
/// when present, mark where entries may start.
pub fn extract_entries(text: &str) -> SectionExtraction {
    let (text, line_starts) = normalize_lines(text);
    extract_lined_entries(&text, &line_starts)
}

/// Extract from normalized text whose printed lines began at `line_starts`
pub fn extract_lined_entries(text: &str, line_starts: &[usize]) -> SectionExtraction {
    let mut out = SectionExtraction::default();
    let mut seen: HashSet<RegistryEntry> = HashSet::new();

    for occurrence in scan(text, line_starts) {
        let Some(record) = build_record(&occurrence, &mut out.diagnostics) else {
            continue;
        };

        if !seen.insert(record.entry.clone()) {
            let priority = record
                .entry
                .priority()
                .or_else(|| record.entry.parent().map(|(parent, _)| parent))
                .unwrap_or(occurrence.root);
            out.diagnostics.push(Diagnostic::DuplicateEntry { priority });
            continue;
        }
        out.records.push(record);
    }

    out
}

fn variants_for(kind: RecordKind) -> &'static [LayoutVariant] {
    match kind {
        RecordKind::MortgageCreated => MORTGAGE_VARIANTS.as_slice(),
        RecordKind::MortgageAmended => MORTGAGE_AMENDMENT_VARIANTS.as_slice(),
        RecordKind::MortgageTransferred => MORTGAGE_TRANSFER_VARIANTS.as_slice(),
        RecordKind::Pledge => PLEDGE_VARIANTS.as_slice(),
        RecordKind::JeonseCreated => JEONSE_VARIANTS.as_slice(),
        RecordKind::JeonseAmended => JEONSE_AMENDMENT_VARIANTS.as_slice(),
        RecordKind::LeaseCreated => LEASE_VARIANTS.as_slice(),
        RecordKind::Seizure => SEIZURE_VARIANTS.as_slice(),
        RecordKind::AuctionFiled
        | RecordKind::ProvisionalRegistration
        | RecordKind::Discharge => DATED_VARIANTS.as_slice(),
        RecordKind::Ignored | RecordKind::Unknown => &[],
    }
}

fn build_record(
    occurrence: &Occurrence<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<RegistryRecord> {
    match occurrence.kind {
        RecordKind::Ignored => return None,
        RecordKind::Unknown => {
            diagnostics.push(Diagnostic::UnrecognizedEntry {
                raw_snippet: occurrence.snippet.clone(),
            });
            return None;
        }
        _ => {}
    }

    let Some(matched) = best_match(variants_for(occurrence.kind), occurrence.body) else {
        debug!(root = occurrence.root, kind = ?occurrence.kind, "no layout matched");
        diagnostics.push(Diagnostic::UnrecognizedEntry {
            raw_snippet: occurrence.snippet.clone(),
        });
        return None;
    };
    debug!(root = occurrence.root, layout = matched.layout, "layout matched");

    let mut low_confidence = false;

    let date_raw = matched
        .date
        .or_else(|| FIRST_DATE.find(occurrence.body).map(|m| m.as_str()));
    let date = date_raw.and_then(parse_date);
    if date.is_none() && occurrence.kind != RecordKind::ProvisionalRegistration {
        low_confidence = true;
    }

    let mut amount = || -> u64 { read_amount(&matched, diagnostics, &mut low_confidence) };

    let root = occurrence.root;
    let parent_priority = root;
    let sub_index = occurrence.sub.unwrap_or(0);
    let party = || matched.party.unwrap_or_default().to_string();

    let entry = match occurrence.kind {
        RecordKind::MortgageCreated => RegistryEntry::MortgageCreated {
            priority: root,
            date,
            max_secured_amount: amount(),
            creditor_raw: party(),
        },
        RecordKind::MortgageAmended => RegistryEntry::MortgageAmended {
            parent_priority,
            sub_index,
            date,
            new_max_secured_amount: amount(),
        },
        RecordKind::MortgageTransferred => RegistryEntry::MortgageTransferred {
            parent_priority,
            sub_index,
            date,
            new_creditor_raw: party(),
        },
        RecordKind::Pledge => RegistryEntry::Pledge {
            parent_priority,
            sub_index,
            date,
            claim_amount: amount(),
            creditor_raw: party(),
        },
        RecordKind::JeonseCreated => RegistryEntry::JeonseCreated {
            priority: root,
            date,
            amount: amount(),
            tenant_raw: party(),
        },
        RecordKind::JeonseAmended => RegistryEntry::JeonseAmended {
            parent_priority,
            sub_index,
            date,
            new_amount: amount(),
        },
        RecordKind::LeaseCreated => RegistryEntry::LeaseCreated {
            priority: root,
            date,
            deposit_amount: amount(),
            tenant_raw: party(),
        },
        RecordKind::AuctionFiled => RegistryEntry::AuctionFiled {
            priority: root,
            date,
        },
        RecordKind::ProvisionalRegistration => {
            RegistryEntry::ProvisionalRegistration { priority: root }
        }
        RecordKind::Seizure => RegistryEntry::Seizure {
            priority: root,
            date,
            claim_amount: if matched.amount.is_some() { amount() } else { 0 },
        },
        RecordKind::Discharge => RegistryEntry::Discharge {
            priority: root,
            target_priority: occurrence.target.unwrap_or_default(),
            date,
        },
        RecordKind::Ignored | RecordKind::Unknown => return None,
    };

    // Sub-entry notation missing: the parent is a guess
    if occurrence.kind.is_sub_entry() && occurrence.sub.is_none() {
        low_confidence = true;
    }

    if occurrence.kind != RecordKind::Discharge && CANCELLATION.is_match(occurrence.body) {
        low_confidence = true;
        diagnostics.push(Diagnostic::AmbiguousDischarge {
            priority: root,
            raw_snippet: occurrence.snippet.clone(),
        });
    }

    Some(RegistryRecord::new(entry, matched.layout).with_low_confidence(low_confidence))
}

fn read_amount(
    matched: &VariantMatch<'_>,
    diagnostics: &mut Vec<Diagnostic>,
    low_confidence: &mut bool,
) -> u64 {
    let Some(raw) = matched.amount else {
        *low_confidence = true;
        return 0;
    };
    match parse_amount(raw) {
        Ok(value) => value,
        Err(err) => {
            debug!(raw, error = %err, "amount parse failure");
            diagnostics.push(Diagnostic::AmountParseFailure {
                raw: raw.to_string(),
            });
            *low_confidence = true;
            0
        }
    }
}
