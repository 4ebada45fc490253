//! Section segmentation
//!
//! Splits a registry summary into its ownership, ownership-encumbrance and
//! lien sections by locating the section headers. Headers may carry
//! OCR-inserted spaces, may repeat at page breaks, or may be missing
//! altogether; a missing section is reported, never fatal.
//!
//! A section runs from the end of its header to whichever comes first: the
//! next header, a reference-notes marker, a footer timestamp, an end-of-table
//! marker, or the end of the document.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{Diagnostic, SectionKind};
use tracing::debug;

use crate::normalize::{normalize, normalize_lines};
use crate::patterns::{spaced, COLUMN_HEADER_WORDS};

/// Normalized text of one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub kind: SectionKind,
    pub text: String,
    /// Offsets in `text` where a printed line began
    pub line_starts: Vec<usize>,
    /// Came from a full register (`【 갑 구 】`) rather than the summary tables
    pub full_register: bool,
}

/// Result of segmenting one document
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub sections: Vec<RawSection>,
    pub property_address: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Segmentation {
    pub fn section(&self, kind: SectionKind) -> Option<&RawSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// What a header match opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    Section(SectionKind, bool),
    /// 표제부 and other headers that only close the previous section
    Other,
}

lazy_static! {
    static ref HEADER_PATTERNS: Vec<(Regex, Header)> = vec![
        (
            Regex::new(&format!(r"(?:\d\s*\.\s*)?{}(?:\s*\(\s*갑\s*구\s*\))?", spaced("소유지분현황"))).unwrap(),
            Header::Section(SectionKind::Ownership, false),
        ),
        (
            Regex::new(&format!(
                r"(?:\d\s*\.\s*)?{}(?:\s*\(\s*갑\s*구\s*\))?",
                spaced("소유지분을제외한소유권에관한사항")
            ))
            .unwrap(),
            Header::Section(SectionKind::OwnershipEncumbrance, false),
        ),
        (
            Regex::new(&format!(
                r"(?:\d\s*\.\s*)?\(?\s*근?\s*\)?\s*{}(?:\s*\(\s*을\s*구\s*\))?",
                spaced("저당권및전세권등")
            ))
            .unwrap(),
            Header::Section(SectionKind::Lien, false),
        ),
        (
            Regex::new(&format!(r"【\s*{}\s*】(?:\s*\(\s*{}\s*\))?", spaced("갑구"), spaced("소유권에관한사항"))).unwrap(),
            Header::Section(SectionKind::OwnershipEncumbrance, true),
        ),
        (
            Regex::new(&format!(r"【\s*{}\s*】(?:\s*\(\s*{}\s*\))?", spaced("을구"), spaced("소유권이외의권리에관한사항"))).unwrap(),
            Header::Section(SectionKind::Lien, true),
        ),
        (
            Regex::new(&format!(r"【\s*{}\s*】", spaced("표제부"))).unwrap(),
            Header::Other,
        ),
    ];

    /// Markers that close a section without opening another
    static ref TERMINATOR_PATTERN: Regex = Regex::new(&format!(
        r"\[\s*{}\s*\]|{}|{}|[-─=]*\s*{}",
        spaced("참고사항"),
        spaced("출력일시"),
        spaced("열람일시"),
        spaced("이하여백"),
    ))
    .unwrap();

    static ref ADDRESS_PATTERN: Regex =
        Regex::new(r"(?m)\[\s*(?:집합건물|건물|토지)\s*\]\s*(?P<addr>[^\n]+)$").unwrap();

    static ref COLUMN_HEADER_PATTERN: Regex = Regex::new(
        &COLUMN_HEADER_WORDS
            .iter()
            .map(|w| spaced(w))
            .collect::<Vec<_>>()
            .join("|")
    )
    .unwrap();
}

/// Split a raw document into sections
pub fn segment(text: &str) -> Segmentation {
    let mut headers: Vec<(usize, usize, Header)> = Vec::new();
    for (pattern, header) in HEADER_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            headers.push((m.start(), m.end(), *header));
        }
    }
    headers.sort_by_key(|(start, end, _)| (*start, std::cmp::Reverse(*end)));
    // Drop header matches nested inside a longer one found at the same spot
    let mut boundaries: Vec<(usize, usize, Header)> = Vec::new();
    for header in headers {
        if boundaries.last().is_some_and(|last| header.0 < last.1) {
            continue;
        }
        boundaries.push(header);
    }

    let terminators: Vec<usize> = TERMINATOR_PATTERN
        .find_iter(text)
        .map(|m| m.start())
        .collect();

    let mut sections: Vec<RawSection> = Vec::new();
    for (idx, (_, header_end, header)) in boundaries.iter().enumerate() {
        let Header::Section(kind, full_register) = header else {
            continue;
        };

        let next_header = boundaries
            .get(idx + 1)
            .map(|(start, _, _)| *start)
            .unwrap_or(text.len());
        let next_terminator = terminators
            .iter()
            .copied()
            .find(|pos| *pos >= *header_end)
            .unwrap_or(text.len());
        let end = next_header.min(next_terminator);

        let body = COLUMN_HEADER_PATTERN.replace_all(&text[*header_end..end], " ");
        let (body, line_starts) = normalize_lines(&body);
        debug!(section = ?kind, bytes = body.len(), "segmented section");

        // Page breaks repeat headers; continue the same section
        if let Some(existing) = sections.iter_mut().find(|s| s.kind == *kind) {
            if !body.is_empty() {
                if !existing.text.is_empty() {
                    existing.text.push(' ');
                }
                let offset = existing.text.len();
                existing
                    .line_starts
                    .extend(line_starts.iter().map(|start| start + offset));
                existing.text.push_str(&body);
            }
            existing.full_register |= *full_register;
        } else {
            sections.push(RawSection {
                kind: *kind,
                text: body,
                line_starts,
                full_register: *full_register,
            });
        }
    }

    let diagnostics = SectionKind::all()
        .into_iter()
        .filter(|kind| !sections.iter().any(|s| s.kind == *kind))
        .map(|section| Diagnostic::SectionNotFound { section })
        .collect();

    let property_address = ADDRESS_PATTERN
        .captures(text)
        .and_then(|caps| caps.name("addr"))
        .map(|m| normalize(m.as_str()))
        .filter(|addr| !addr.is_empty());

    sections.sort_by_key(|s| s.kind);

    Segmentation {
        sections,
        property_address,
        diagnostics,
    }
}
