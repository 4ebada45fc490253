//! Registry ledger types
//!
//! Entries are what the extractors read off the page; chains are what the
//! resolver folds them into; the ledger is the read-only result handed to
//! scoring.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One registration line of the summary, with raw (uncleaned) party captures
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEntry {
    MortgageCreated {
        priority: u32,
        date: Option<NaiveDate>,
        max_secured_amount: u64,
        creditor_raw: String,
    },
    MortgageAmended {
        parent_priority: u32,
        sub_index: u32,
        date: Option<NaiveDate>,
        new_max_secured_amount: u64,
    },
    MortgageTransferred {
        parent_priority: u32,
        sub_index: u32,
        date: Option<NaiveDate>,
        new_creditor_raw: String,
    },
    Pledge {
        parent_priority: u32,
        sub_index: u32,
        date: Option<NaiveDate>,
        claim_amount: u64,
        creditor_raw: String,
    },
    JeonseCreated {
        priority: u32,
        date: Option<NaiveDate>,
        amount: u64,
        tenant_raw: String,
    },
    JeonseAmended {
        parent_priority: u32,
        sub_index: u32,
        date: Option<NaiveDate>,
        new_amount: u64,
    },
    LeaseCreated {
        priority: u32,
        date: Option<NaiveDate>,
        deposit_amount: u64,
        tenant_raw: String,
    },
    AuctionFiled {
        priority: u32,
        date: Option<NaiveDate>,
    },
    ProvisionalRegistration {
        priority: u32,
    },
    /// 가압류 / 압류
    Seizure {
        priority: u32,
        date: Option<NaiveDate>,
        claim_amount: u64,
    },
    /// `N번 … 말소`: cancels the chain rooted at `target_priority`
    Discharge {
        priority: u32,
        target_priority: u32,
        date: Option<NaiveDate>,
    },
    OwnershipShare {
        name: String,
        numerator: u32,
        denominator: u32,
    },
}

impl RegistryEntry {
    /// Priority of a root registration (creations, filings, discharges)
    pub fn priority(&self) -> Option<u32> {
        match self {
            RegistryEntry::MortgageCreated { priority, .. }
            | RegistryEntry::JeonseCreated { priority, .. }
            | RegistryEntry::LeaseCreated { priority, .. }
            | RegistryEntry::AuctionFiled { priority, .. }
            | RegistryEntry::ProvisionalRegistration { priority }
            | RegistryEntry::Seizure { priority, .. }
            | RegistryEntry::Discharge { priority, .. } => Some(*priority),
            _ => None,
        }
    }

    /// `(parent_priority, sub_index)` of an amendment, transfer or pledge
    pub fn parent(&self) -> Option<(u32, u32)> {
        match self {
            RegistryEntry::MortgageAmended {
                parent_priority,
                sub_index,
                ..
            }
            | RegistryEntry::MortgageTransferred {
                parent_priority,
                sub_index,
                ..
            }
            | RegistryEntry::Pledge {
                parent_priority,
                sub_index,
                ..
            }
            | RegistryEntry::JeonseAmended {
                parent_priority,
                sub_index,
                ..
            } => Some((*parent_priority, *sub_index)),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            RegistryEntry::MortgageCreated { date, .. }
            | RegistryEntry::MortgageAmended { date, .. }
            | RegistryEntry::MortgageTransferred { date, .. }
            | RegistryEntry::Pledge { date, .. }
            | RegistryEntry::JeonseCreated { date, .. }
            | RegistryEntry::JeonseAmended { date, .. }
            | RegistryEntry::LeaseCreated { date, .. }
            | RegistryEntry::AuctionFiled { date, .. }
            | RegistryEntry::Seizure { date, .. }
            | RegistryEntry::Discharge { date, .. } => *date,
            RegistryEntry::ProvisionalRegistration { .. }
            | RegistryEntry::OwnershipShare { .. } => None,
        }
    }

    /// Chain kind this entry starts, if it is a chain root
    pub fn root_kind(&self) -> Option<ChainKind> {
        match self {
            RegistryEntry::MortgageCreated { .. } => Some(ChainKind::Mortgage),
            RegistryEntry::JeonseCreated { .. } => Some(ChainKind::Jeonse),
            RegistryEntry::LeaseCreated { .. } => Some(ChainKind::Lease),
            _ => None,
        }
    }

    /// Chain kind a sub-entry must attach to
    pub fn parent_kind(&self) -> Option<ChainKind> {
        match self {
            RegistryEntry::MortgageAmended { .. }
            | RegistryEntry::MortgageTransferred { .. }
            | RegistryEntry::Pledge { .. } => Some(ChainKind::Mortgage),
            RegistryEntry::JeonseAmended { .. } => Some(ChainKind::Jeonse),
            _ => None,
        }
    }
}

/// An entry as extracted: which layout produced it and whether it is trustworthy
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub entry: RegistryEntry,
    /// Name of the layout variant that matched
    pub layout: String,
    /// Amount or date could not be parsed cleanly, or a cancellation was ambiguous
    pub low_confidence: bool,
}

impl RegistryRecord {
    pub fn new(entry: RegistryEntry, layout: impl Into<String>) -> Self {
        Self {
            entry,
            layout: layout.into(),
            low_confidence: false,
        }
    }

    pub fn with_low_confidence(mut self, low_confidence: bool) -> Self {
        self.low_confidence = self.low_confidence || low_confidence;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainKind {
    Mortgage,
    Jeonse,
    Lease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    Active,
    Discharged,
}

/// Current state of one registered right after folding its amendments and transfers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LienChain {
    pub root_priority: u32,
    pub kind: ChainKind,
    /// Root first, then sub-entries by registration date
    pub history: Vec<RegistryRecord>,
    /// Cleaned name of whoever holds the right now
    pub current_creditor: String,
    pub current_amount: u64,
    pub status: ChainStatus,
    /// Registration date of the root entry
    pub registration_date: Option<NaiveDate>,
    /// Pledges taken over this right (근저당권부질권)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pledges: Vec<RegistryRecord>,
    pub low_confidence: bool,
}

impl LienChain {
    pub fn is_active(&self) -> bool {
        self.status == ChainStatus::Active
    }
}

/// Structured, deduplicated view of one registry document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryLedger {
    /// `[집합건물] …` address line, when present
    pub property_address: Option<String>,
    pub ownership: Vec<RegistryEntry>,
    pub active_mortgages: Vec<LienChain>,
    pub active_jeonse_rights: Vec<LienChain>,
    pub active_lease_rights: Vec<LienChain>,
    pub has_auction_filing: bool,
    pub has_provisional_registration: bool,
    pub has_seizure: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discharged_chains: Vec<LienChain>,
}

impl RegistryLedger {
    /// More than one owner, or a single owner holding a fractional share
    pub fn is_co_owned(&self) -> bool {
        let shares: Vec<(u32, u32)> = self
            .ownership
            .iter()
            .filter_map(|entry| match entry {
                RegistryEntry::OwnershipShare {
                    numerator,
                    denominator,
                    ..
                } => Some((*numerator, *denominator)),
                _ => None,
            })
            .collect();

        shares.len() > 1 || shares.iter().any(|(n, d)| n < d)
    }

    pub fn active_chains(&self) -> impl Iterator<Item = &LienChain> {
        self.active_mortgages
            .iter()
            .chain(self.active_jeonse_rights.iter())
            .chain(self.active_lease_rights.iter())
    }

    pub fn has_low_confidence(&self) -> bool {
        self.active_chains()
            .chain(self.discharged_chains.iter())
            .any(|chain| chain.low_confidence)
    }
}
