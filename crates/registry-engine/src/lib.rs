//! Korean real-estate registry (등기부) extraction and jeonse risk scoring
//!
//! [`extract`] turns the OCR text of a registry summary or full register
//! into a [`RegistryLedger`]; [`assess`] scores a proposed deposit against
//! that ledger. Extraction never fails: anything it cannot read becomes a
//! [`Diagnostic`] next to the ledger.

pub mod aggregate;
pub mod chain;
pub mod config;
pub mod creditor;
pub mod error;
pub mod extractors;
pub mod normalize;
pub mod patterns;
pub mod region;
pub mod risk;
pub mod segment;

use serde::{Deserialize, Serialize};
use shared_types::{
    ChainKind, Diagnostic, LienChain, Region, RegistryEntry, RegistryLedger, RiskAssessment,
    SectionKind, Valuation,
};
use tracing::{info, warn};

pub use config::EngineConfig;
pub use error::EngineError;
pub use risk::{assess, assess_in_region};

/// Ledger plus everything that was skipped or uncertain while reading it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub ledger: RegistryLedger,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extract a ledger from one document's text
pub fn extract(text: &str) -> Extraction {
    let segmentation = segment::segment(text);
    let mut diagnostics = segmentation.diagnostics.clone();
    let mut ledger = RegistryLedger {
        property_address: segmentation.property_address.clone(),
        ..Default::default()
    };

    if let Some(section) = segmentation.section(SectionKind::Ownership) {
        ledger.ownership = extractors::ownership::extract_summary_shares(&section.text);
    }
    if ledger.ownership.is_empty() {
        // A full register has no share table; holders come from 갑구
        if let Some(section) = segmentation
            .section(SectionKind::OwnershipEncumbrance)
            .filter(|s| s.full_register)
        {
            ledger.ownership = extractors::ownership::extract_register_holders(&section.text);
            if !ledger.ownership.is_empty() {
                diagnostics.retain(|d| {
                    *d != Diagnostic::SectionNotFound {
                        section: SectionKind::Ownership,
                    }
                });
            }
        }
    }

    // Priorities restart in every section, so each is resolved on its own
    for kind in [SectionKind::OwnershipEncumbrance, SectionKind::Lien] {
        let Some(section) = segmentation.section(kind) else {
            continue;
        };
        let extraction = extractors::extract_lined_entries(&section.text, &section.line_starts);
        diagnostics.extend(extraction.diagnostics);

        let resolution = chain::resolve(&extraction.records);
        diagnostics.extend(resolution.diagnostics);

        for record in &resolution.standalone {
            match record.entry {
                RegistryEntry::AuctionFiled { .. } => ledger.has_auction_filing = true,
                RegistryEntry::ProvisionalRegistration { .. } => {
                    ledger.has_provisional_registration = true
                }
                RegistryEntry::Seizure { .. } => ledger.has_seizure = true,
                _ => {}
            }
        }
        for chain in resolution.chains {
            file_chain(&mut ledger, chain);
        }
    }

    for diagnostic in &diagnostics {
        warn!("{}", diagnostic.message());
    }
    info!(
        owners = ledger.ownership.len(),
        mortgages = ledger.active_mortgages.len(),
        jeonse = ledger.active_jeonse_rights.len(),
        leases = ledger.active_lease_rights.len(),
        discharged = ledger.discharged_chains.len(),
        diagnostics = diagnostics.len(),
        "extracted registry ledger"
    );

    Extraction {
        ledger,
        diagnostics,
    }
}

fn file_chain(ledger: &mut RegistryLedger, chain: LienChain) {
    if !chain.is_active() {
        ledger.discharged_chains.push(chain);
        return;
    }
    match chain.kind {
        ChainKind::Mortgage => ledger.active_mortgages.push(chain),
        ChainKind::Jeonse => ledger.active_jeonse_rights.push(chain),
        ChainKind::Lease => ledger.active_lease_rights.push(chain),
    }
}

/// Extraction and assessment under one configuration
#[derive(Debug, Clone, Default)]
pub struct RegistryEngine {
    config: EngineConfig,
}

impl RegistryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom configuration, rejecting one that breaks an invariant
    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn extract(&self, text: &str) -> Extraction {
        extract(text)
    }

    /// Assess a deposit; `region` overrides the one read from the address
    pub fn assess(
        &self,
        ledger: &RegistryLedger,
        valuation: Option<&Valuation>,
        proposed_deposit: u64,
        region: Option<Region>,
    ) -> Result<RiskAssessment, EngineError> {
        match region {
            Some(region) => {
                assess_in_region(ledger, valuation, proposed_deposit, region, &self.config)
            }
            None => assess(ledger, valuation, proposed_deposit, &self.config),
        }
    }

    /// Extract and assess in one step
    pub fn analyze(
        &self,
        text: &str,
        valuation: Option<&Valuation>,
        proposed_deposit: u64,
        region: Option<Region>,
    ) -> Result<(Extraction, RiskAssessment), EngineError> {
        let extraction = self.extract(text);
        let assessment = self.assess(&extraction.ledger, valuation, proposed_deposit, region)?;
        Ok((extraction, assessment))
    }
}
