// Debt totals and repayment ranking
use shared_types::{
    ChainKind, DebtKind, DebtPriority, DebtRankEntry, LienChain, RegistryLedger,
};

/// Sums over the currently effective registered claims
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebtSummary {
    /// Current maximum secured amounts of active mortgages
    pub total_mortgage_amount: u64,
    /// Principal implied by the mortgage total
    pub total_estimated_principal: u64,
    pub total_jeonse_amount: u64,
    pub total_lease_amount: u64,
    /// Everything ranked ahead of a new deposit
    pub senior_debt: u64,
}

fn sum(chains: &[LienChain]) -> u64 {
    chains
        .iter()
        .filter(|c| c.is_active())
        .fold(0u64, |acc, c| acc.saturating_add(c.current_amount))
}

pub fn summarize(ledger: &RegistryLedger, estimated_principal_fraction: f64) -> DebtSummary {
    let total_mortgage_amount = sum(&ledger.active_mortgages);
    let total_jeonse_amount = sum(&ledger.active_jeonse_rights);
    let total_lease_amount = sum(&ledger.active_lease_rights);
    let total_estimated_principal =
        (total_mortgage_amount as f64 * estimated_principal_fraction).round() as u64;

    DebtSummary {
        total_mortgage_amount,
        total_estimated_principal,
        total_jeonse_amount,
        total_lease_amount,
        senior_debt: total_mortgage_amount
            .saturating_add(total_jeonse_amount)
            .saturating_add(total_lease_amount),
    }
}

/// Active chains in repayment order (registration date, then priority),
/// followed by the proposed deposit as the subordinate claim
pub fn debt_ranking(ledger: &RegistryLedger, proposed_deposit: u64) -> Vec<DebtRankEntry> {
    let mut chains: Vec<&LienChain> = ledger.active_chains().filter(|c| c.is_active()).collect();
    // Undated chains sort last: an unreadable date never jumps the queue
    chains.sort_by_key(|c| {
        (
            c.registration_date.is_none(),
            c.registration_date,
            c.root_priority,
            c.kind,
        )
    });

    let mut ranking: Vec<DebtRankEntry> = chains
        .into_iter()
        .map(|chain| DebtRankEntry {
            rank: 0,
            kind: match chain.kind {
                ChainKind::Mortgage => DebtKind::Mortgage,
                ChainKind::Jeonse => DebtKind::Jeonse,
                ChainKind::Lease => DebtKind::Lease,
            },
            creditor: chain.current_creditor.clone(),
            amount: chain.current_amount,
            registration_date: chain.registration_date,
            priority: DebtPriority::Senior,
        })
        .collect();

    ranking.push(DebtRankEntry {
        rank: 0,
        kind: DebtKind::ProposedDeposit,
        creditor: "임차인 (신규 보증금)".to_string(),
        amount: proposed_deposit,
        registration_date: None,
        priority: DebtPriority::Subordinate,
    });

    for (idx, entry) in ranking.iter_mut().enumerate() {
        entry.rank = idx as u32 + 1;
    }
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared_types::ChainStatus;

    fn chain(kind: ChainKind, priority: u32, year: i32, amount: u64) -> LienChain {
        LienChain {
            root_priority: priority,
            kind,
            history: Vec::new(),
            current_creditor: format!("채권자{}", priority),
            current_amount: amount,
            status: ChainStatus::Active,
            registration_date: NaiveDate::from_ymd_opt(year, 1, 1),
            pledges: Vec::new(),
            low_confidence: false,
        }
    }

    #[test]
    fn test_totals_only_count_active_chains() {
        let mut discharged = chain(ChainKind::Mortgage, 2, 2019, 50_000_000);
        discharged.status = ChainStatus::Discharged;
        let ledger = RegistryLedger {
            active_mortgages: vec![chain(ChainKind::Mortgage, 1, 2018, 120_000_000), discharged],
            active_jeonse_rights: vec![chain(ChainKind::Jeonse, 3, 2020, 30_000_000)],
            ..Default::default()
        };
        let summary = summarize(&ledger, 1.0 / 1.2);
        assert_eq!(summary.total_mortgage_amount, 120_000_000);
        assert_eq!(summary.total_estimated_principal, 100_000_000);
        assert_eq!(summary.total_jeonse_amount, 30_000_000);
        assert_eq!(summary.senior_debt, 150_000_000);
    }

    #[test]
    fn test_ranking_orders_by_date_and_appends_deposit() {
        let ledger = RegistryLedger {
            active_mortgages: vec![
                chain(ChainKind::Mortgage, 5, 2021, 10),
                chain(ChainKind::Mortgage, 1, 2018, 20),
            ],
            active_lease_rights: vec![chain(ChainKind::Lease, 2, 2019, 30)],
            ..Default::default()
        };
        let ranking = debt_ranking(&ledger, 99);
        let order: Vec<(u32, u64)> = ranking.iter().map(|e| (e.rank, e.amount)).collect();
        assert_eq!(order, vec![(1, 20), (2, 30), (3, 10), (4, 99)]);
        let last = ranking.last().unwrap();
        assert_eq!(last.kind, DebtKind::ProposedDeposit);
        assert_eq!(last.priority, DebtPriority::Subordinate);
        assert!(ranking[..3].iter().all(|e| e.priority == DebtPriority::Senior));
    }

    #[test]
    fn test_empty_ledger_ranks_only_the_deposit() {
        let ranking = debt_ranking(&RegistryLedger::default(), 100);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].rank, 1);
    }
}
