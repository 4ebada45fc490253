use serde::{Deserialize, Serialize};

/// Named sections of a registry summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// 소유지분현황 (갑구): who owns which share
    Ownership,
    /// 소유지분을 제외한 소유권에 관한 사항 (갑구): auctions, seizures, provisional registrations
    OwnershipEncumbrance,
    /// (근)저당권 및 전세권 등 (을구): mortgages, jeonse and lease rights
    Lien,
}

impl SectionKind {
    pub fn all() -> [SectionKind; 3] {
        [
            SectionKind::Ownership,
            SectionKind::OwnershipEncumbrance,
            SectionKind::Lien,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Ownership => "소유지분현황",
            SectionKind::OwnershipEncumbrance => "소유지분을 제외한 소유권에 관한 사항",
            SectionKind::Lien => "(근)저당권 및 전세권 등",
        }
    }
}

/// Severity of a flagged risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The deposit is very likely unrecoverable
    Critical,
    /// Material exposure
    High,
    /// Worth negotiating or verifying
    Medium,
    /// Informational
    Low,
}

/// Recoverable problems found while extracting a document.
///
/// None of these abort extraction; they are returned next to the ledger so the
/// caller can surface them as warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    SectionNotFound {
        section: SectionKind,
    },
    UnrecognizedEntry {
        raw_snippet: String,
    },
    OrphanAmendment {
        parent_priority: u32,
        sub_index: u32,
    },
    AmountParseFailure {
        raw: String,
    },
    DuplicateEntry {
        priority: u32,
    },
    AmbiguousDischarge {
        priority: u32,
        raw_snippet: String,
    },
}

impl Diagnostic {
    pub fn message(&self) -> String {
        match self {
            Diagnostic::SectionNotFound { section } => {
                format!("Section not found: {}", section.label())
            }
            Diagnostic::UnrecognizedEntry { raw_snippet } => {
                format!("No layout matched entry: {}", raw_snippet)
            }
            Diagnostic::OrphanAmendment {
                parent_priority,
                sub_index,
            } => format!(
                "Sub-entry {}-{} references a missing root and was dropped",
                parent_priority, sub_index
            ),
            Diagnostic::AmountParseFailure { raw } => {
                format!("Could not parse amount '{}', defaulted to 0", raw)
            }
            Diagnostic::DuplicateEntry { priority } => {
                format!("Duplicate registration for priority {}", priority)
            }
            Diagnostic::AmbiguousDischarge {
                priority,
                raw_snippet,
            } => format!(
                "Cancellation at priority {} has no resolvable target: {}",
                priority, raw_snippet
            ),
        }
    }
}
