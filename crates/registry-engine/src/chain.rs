//! Chain resolution
//!
//! Folds the records of one section into chains keyed by root priority. Input
//! order never matters: records are sorted by (registration date, record)
//! before folding and grouped in `BTreeMap`s.

use std::collections::BTreeMap;

use shared_types::{ChainStatus, Diagnostic, LienChain, RegistryEntry, RegistryRecord};
use tracing::debug;

use crate::creditor::clean_creditor;

/// Chains, non-chain registrations and diagnostics of one section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Every chain, active or discharged, ordered by root priority
    pub chains: Vec<LienChain>,
    /// Auction filings, provisional registrations and seizures still in force
    pub standalone: Vec<RegistryRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

fn sorted(records: &[RegistryRecord]) -> Vec<RegistryRecord> {
    let mut records = records.to_vec();
    records.sort_by(|a, b| {
        a.entry
            .date()
            .cmp(&b.entry.date())
            .then_with(|| a.cmp(b))
    });
    records
}

/// Resolve one section's records. Priorities are only unique within a
/// section, so callers resolve each section separately.
pub fn resolve(records: &[RegistryRecord]) -> Resolution {
    let mut diagnostics = Vec::new();
    let mut roots: BTreeMap<u32, RegistryRecord> = BTreeMap::new();
    let mut standalone: BTreeMap<u32, RegistryRecord> = BTreeMap::new();
    let mut subs: Vec<RegistryRecord> = Vec::new();
    let mut discharges: Vec<RegistryRecord> = Vec::new();

    for record in sorted(records) {
        if record.entry.parent().is_some() {
            subs.push(record);
            continue;
        }
        if matches!(record.entry, RegistryEntry::Discharge { .. }) {
            discharges.push(record);
            continue;
        }
        // Ownership shares carry no priority
        let Some(priority) = record.entry.priority() else {
            continue;
        };
        if roots.contains_key(&priority) || standalone.contains_key(&priority) {
            diagnostics.push(Diagnostic::DuplicateEntry { priority });
            continue;
        }
        if record.entry.root_kind().is_some() {
            roots.insert(priority, record);
        } else {
            standalone.insert(priority, record);
        }
    }

    let mut children: BTreeMap<u32, Vec<RegistryRecord>> = BTreeMap::new();
    for record in subs {
        let Some((parent_priority, sub_index)) = record.entry.parent() else {
            continue;
        };
        let attached = roots
            .get(&parent_priority)
            .and_then(|root| root.entry.root_kind())
            .is_some_and(|kind| Some(kind) == record.entry.parent_kind());
        if !attached {
            debug!(parent_priority, sub_index, "orphan sub-entry dropped");
            diagnostics.push(Diagnostic::OrphanAmendment {
                parent_priority,
                sub_index,
            });
            continue;
        }
        children.entry(parent_priority).or_default().push(record);
    }

    let mut chains: BTreeMap<u32, LienChain> = BTreeMap::new();
    for (priority, root) in roots {
        let history = children.remove(&priority).unwrap_or_default();
        if let Some(chain) = fold_chain(root, history) {
            chains.insert(priority, chain);
        }
    }

    for record in discharges {
        let RegistryEntry::Discharge {
            priority,
            target_priority,
            ..
        } = record.entry
        else {
            continue;
        };
        if let Some(chain) = chains.get_mut(&target_priority) {
            chain.status = ChainStatus::Discharged;
            chain.history.push(record);
        } else if standalone.remove(&target_priority).is_none() {
            diagnostics.push(Diagnostic::AmbiguousDischarge {
                priority,
                raw_snippet: format!("{}번 말소", target_priority),
            });
        }
    }

    Resolution {
        chains: chains.into_values().collect(),
        standalone: standalone.into_values().collect(),
        diagnostics,
    }
}

/// Fold a root and its attached sub-entries into the chain's current state
fn fold_chain(root: RegistryRecord, mut subs: Vec<RegistryRecord>) -> Option<LienChain> {
    let kind = root.entry.root_kind()?;
    let root_priority = root.entry.priority()?;
    subs.sort_by(|a, b| {
        let key = |r: &RegistryRecord| (r.entry.date(), r.entry.parent().map(|(_, sub)| sub));
        key(a).cmp(&key(b)).then_with(|| a.cmp(b))
    });

    let (mut amount, mut creditor_raw) = match &root.entry {
        RegistryEntry::MortgageCreated {
            max_secured_amount,
            creditor_raw,
            ..
        } => (*max_secured_amount, creditor_raw.clone()),
        RegistryEntry::JeonseCreated {
            amount, tenant_raw, ..
        } => (*amount, tenant_raw.clone()),
        RegistryEntry::LeaseCreated {
            deposit_amount,
            tenant_raw,
            ..
        } => (*deposit_amount, tenant_raw.clone()),
        _ => return None,
    };

    let mut pledges = Vec::new();
    // Amendments replace the amount and transfers replace the creditor;
    // the latest registration wins, nothing is summed
    for record in &subs {
        match &record.entry {
            RegistryEntry::MortgageAmended {
                new_max_secured_amount,
                ..
            } => amount = *new_max_secured_amount,
            RegistryEntry::JeonseAmended { new_amount, .. } => amount = *new_amount,
            RegistryEntry::MortgageTransferred {
                new_creditor_raw, ..
            } => creditor_raw = new_creditor_raw.clone(),
            RegistryEntry::Pledge { .. } => pledges.push(record.clone()),
            _ => {}
        }
    }

    let low_confidence = root.low_confidence || subs.iter().any(|r| r.low_confidence);
    let registration_date = root.entry.date();
    let mut history = Vec::with_capacity(subs.len() + 1);
    history.push(root);
    history.extend(subs);

    Some(LienChain {
        root_priority,
        kind,
        history,
        current_creditor: clean_creditor(&creditor_raw),
        current_amount: amount,
        status: ChainStatus::Active,
        registration_date,
        pledges,
        low_confidence,
    })
}
