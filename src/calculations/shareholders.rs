use super::allocation::ratio;
use crate::ledger::Investment;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Bucket for ledger entries with no investor name.
pub const UNNAMED_INVESTOR: &str = "기타";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shareholder {
    pub investor: String,
    pub shares: i64,
    pub amount: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub total_amount: f64,
    pub total_shares: i64,
    pub round_count: usize,
    pub holders: Vec<Shareholder>,
}

pub fn summarize(investments: &[Investment]) -> LedgerSummary {
    let total_amount: f64 = investments.iter().map(|inv| inv.amount).sum();
    let total_shares: i64 = investments.iter().map(|inv| inv.shares).sum();
    let round_count = investments
        .iter()
        .map(|inv| inv.round.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut grouped: BTreeMap<&str, (i64, f64)> = BTreeMap::new();
    for inv in investments {
        let key = match inv.investor.trim() {
            "" => UNNAMED_INVESTOR,
            name => name,
        };
        let entry = grouped.entry(key).or_insert((0, 0.0));
        entry.0 += inv.shares;
        entry.1 += inv.amount;
    }

    let mut holders: Vec<Shareholder> = grouped
        .into_iter()
        .map(|(investor, (shares, amount))| Shareholder {
            investor: investor.to_string(),
            shares,
            amount,
            percent: ratio(shares as f64, total_shares as f64),
        })
        .collect();
    // stable: ties stay in name order
    holders.sort_by(|a, b| b.shares.cmp(&a.shares));

    LedgerSummary {
        total_amount,
        total_shares,
        round_count,
        holders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_investor_and_sorts_by_shares() {
        let investments = vec![
            Investment::new(1, "Seed", "Alpha").with_position(1_000, 100.0),
            Investment::new(2, "Series A", "Beta").with_position(3_000, 900.0),
            Investment::new(3, "Series A", "Alpha").with_position(1_000, 300.0),
            Investment::new(4, "Bridge", " ").with_position(0, 50.0),
        ];
        let summary = summarize(&investments);
        assert_eq!(summary.total_shares, 5_000);
        assert_eq!(summary.total_amount, 1_350.0);
        assert_eq!(summary.round_count, 3);
        let names: Vec<&str> = summary.holders.iter().map(|h| h.investor.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha", UNNAMED_INVESTOR]);
        assert_eq!(summary.holders[0].percent, 60.0);
        assert_eq!(summary.holders[1].amount, 400.0);
    }

    #[test]
    fn empty_ledger_has_no_holders() {
        let summary = summarize(&[]);
        assert_eq!(summary, LedgerSummary::default());
    }
}
