//! Debt-settlement minimization
//!
//! Greedy largest-creditor versus largest-debtor matching over two
//! max-priority queues.
//!
//! # Algorithm
//!
//! 1. Partition members into creditors and debtors, skipping anyone
//!    within tolerance of zero
//! 2. Pop the largest creditor and the largest debtor
//! 3. The debtor pays the creditor `min(credit, debt)`
//! 4. Requeue whichever side still has more than tolerance outstanding
//! 5. Repeat until either queue is empty
//!
//! Each round fully settles at least one side, so a group with `c`
//! creditors and `d` debtors needs at most `c + d - 1` transfers. The
//! heuristic does not guarantee the global minimum transfer count.
//!
//! # Example
//!
//! ```text
//! Net balances:
//!   A: +$25 (is owed)
//!   B: +$15 (is owed)
//!   C: -$40 (owes)
//!
//! Transfers:
//!   C pays A: $25
//!   C pays B: $15
//! ```

use crate::{
    money::Money,
    queue::BalanceQueue,
    types::{MemberBalance, MemberId, Residual, SettlementTransfer},
};
use std::collections::HashMap;

/// Default tolerance: balances of one cent or less count as settled
pub const DEFAULT_TOLERANCE: Money = Money::ONE_CENT;

/// Result of one netting pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NettingOutcome {
    /// Transfers in generation order
    pub transfers: Vec<SettlementTransfer>,

    /// Balances left over when one side ran out first
    pub residual: Vec<Residual>,

    /// Members that entered the creditor queue
    pub creditor_count: usize,

    /// Members that entered the debtor queue
    pub debtor_count: usize,
}

/// Netting engine
#[derive(Debug, Clone, Copy)]
pub struct NettingEngine {
    /// Largest magnitude treated as settled
    tolerance: Money,
}

impl Default for NettingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl NettingEngine {
    /// Create new netting engine
    pub fn new(tolerance: Money) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    /// Settlement tolerance
    pub fn tolerance(&self) -> Money {
        self.tolerance
    }

    /// Compute settlement transfers for one group
    pub fn compute(&self, members: &[MemberBalance]) -> NettingOutcome {
        let (mut creditors, mut debtors) = self.partition(members);
        let creditor_count = creditors.len();
        let debtor_count = debtors.len();

        let transfers = self.match_largest(members, &mut creditors, &mut debtors);

        let residual = creditors
            .into_sorted_vec()
            .into_iter()
            .map(|entry| (entry.index, entry.magnitude))
            .chain(
                debtors
                    .into_sorted_vec()
                    .into_iter()
                    .map(|entry| (entry.index, -entry.magnitude)),
            )
            .map(|(index, remaining)| Residual {
                member: members[index].id.clone(),
                name: members[index].name.clone(),
                remaining,
            })
            .collect();

        NettingOutcome {
            transfers,
            residual,
            creditor_count,
            debtor_count,
        }
    }

    /// Split members into creditor and debtor queues
    fn partition(&self, members: &[MemberBalance]) -> (BalanceQueue, BalanceQueue) {
        let mut creditors = BalanceQueue::with_capacity(members.len());
        let mut debtors = BalanceQueue::with_capacity(members.len());

        for (index, member) in members.iter().enumerate() {
            if member.is_creditor(self.tolerance) {
                creditors.push(member.balance, index);
            } else if member.is_debtor(self.tolerance) {
                // Debt is queued as a positive magnitude
                debtors.push(member.balance.abs(), index);
            }
        }

        (creditors, debtors)
    }

    /// Greedy matching: largest creditor against largest debtor
    fn match_largest(
        &self,
        members: &[MemberBalance],
        creditors: &mut BalanceQueue,
        debtors: &mut BalanceQueue,
    ) -> Vec<SettlementTransfer> {
        let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());

        while !creditors.is_empty() && !debtors.is_empty() {
            let (Some(creditor), Some(debtor)) = (creditors.pop_max(), debtors.pop_max()) else {
                break;
            };

            let amount = creditor.magnitude.min(debtor.magnitude);
            let payer = &members[debtor.index];
            let payee = &members[creditor.index];

            transfers.push(SettlementTransfer {
                from: payer.id.clone(),
                to: payee.id.clone(),
                amount,
                from_name: payer.name.clone(),
                to_name: payee.name.clone(),
            });

            let creditor_remaining = creditor.magnitude - amount;
            let debtor_remaining = debtor.magnitude - amount;

            if creditor_remaining > self.tolerance {
                creditors.push(creditor_remaining, creditor.index);
            }
            if debtor_remaining > self.tolerance {
                debtors.push(debtor_remaining, debtor.index);
            }
        }

        transfers
    }

    /// Apply `transfers` to the original balances and return every member
    /// still outside tolerance afterwards, in input order.
    pub fn outstanding_after(
        &self,
        members: &[MemberBalance],
        transfers: &[SettlementTransfer],
    ) -> Vec<Residual> {
        let mut balances: HashMap<&MemberId, Money> =
            members.iter().map(|m| (&m.id, m.balance)).collect();

        for transfer in transfers {
            // Paying raises the debtor toward zero, receiving lowers the creditor
            if let Some(balance) = balances.get_mut(&transfer.from) {
                *balance += transfer.amount;
            }
            if let Some(balance) = balances.get_mut(&transfer.to) {
                *balance -= transfer.amount;
            }
        }

        members
            .iter()
            .filter_map(|member| {
                let remaining = balances.get(&member.id).copied().unwrap_or(Money::ZERO);
                (remaining.abs() > self.tolerance).then(|| Residual {
                    member: member.id.clone(),
                    name: member.name.clone(),
                    remaining,
                })
            })
            .collect()
    }
}

/// Compute the settlement transfers that zero every balance in a group.
///
/// Uses the default one-cent tolerance. Magnitude left over from input
/// that does not sum to zero is dropped; use [`NettingEngine::compute`]
/// or [`crate::SettlementEngine`] to observe or reject it.
pub fn minimize_settlements(members: &[MemberBalance]) -> Vec<SettlementTransfer> {
    NettingEngine::default().compute(members).transfers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, cents: i64) -> MemberBalance {
        MemberBalance::new(id, id.to_uppercase(), Money::from_cents(cents))
    }

    fn pairs(transfers: &[SettlementTransfer]) -> Vec<(&str, &str, i64)> {
        transfers
            .iter()
            .map(|t| (t.from.as_str(), t.to.as_str(), t.amount.cents()))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(minimize_settlements(&[]).is_empty());
    }

    #[test]
    fn test_all_settled() {
        let members = vec![member("a", 0), member("b", 1), member("c", -1)];
        assert!(minimize_settlements(&members).is_empty());
    }

    #[test]
    fn test_single_exact_pair() {
        let members = vec![member("a", 5000), member("b", -5000)];
        let outcome = NettingEngine::default().compute(&members);

        assert_eq!(pairs(&outcome.transfers), vec![("b", "a", 5000)]);
        assert!(outcome.residual.is_empty());
        assert_eq!(outcome.creditor_count, 1);
        assert_eq!(outcome.debtor_count, 1);
    }

    #[test]
    fn test_one_creditor_two_debtors() {
        // A: +30, B: -10, C: -20
        let members = vec![member("a", 3000), member("b", -1000), member("c", -2000)];
        let transfers = minimize_settlements(&members);

        // Largest debtor pays first
        assert_eq!(pairs(&transfers), vec![("c", "a", 2000), ("b", "a", 1000)]);
    }

    #[test]
    fn test_largest_creditor_paid_first() {
        // A: +25, B: +15, C: -40
        let members = vec![member("a", 2500), member("b", 1500), member("c", -4000)];
        let transfers = minimize_settlements(&members);

        assert_eq!(pairs(&transfers), vec![("c", "a", 2500), ("c", "b", 1500)]);
        assert_eq!(transfers[0].from_name, "C");
        assert_eq!(transfers[0].to_name, "A");
    }

    #[test]
    fn test_equal_magnitudes_follow_input_order() {
        let members = vec![member("a", 1000), member("b", 1000), member("c", -2000)];
        let transfers = minimize_settlements(&members);

        assert_eq!(pairs(&transfers), vec![("c", "a", 1000), ("c", "b", 1000)]);
    }

    #[test]
    fn test_cross_matching() {
        // A: +50, B: +20, C: -40, D: -30
        let members = vec![
            member("a", 5000),
            member("b", 2000),
            member("c", -4000),
            member("d", -3000),
        ];
        let outcome = NettingEngine::default().compute(&members);

        assert_eq!(
            pairs(&outcome.transfers),
            vec![("c", "a", 4000), ("d", "b", 2000), ("d", "a", 1000)]
        );
        assert!(outcome.transfers.len() <= 2 + 2 - 1);
        assert!(NettingEngine::default()
            .outstanding_after(&members, &outcome.transfers)
            .is_empty());
    }

    #[test]
    fn test_dust_never_transferred() {
        // A: +0.02, B: -0.01, C: -0.01
        let members = vec![member("a", 2), member("b", -1), member("c", -1)];
        let outcome = NettingEngine::default().compute(&members);

        assert!(outcome.transfers.is_empty());
        assert_eq!(outcome.debtor_count, 0);
        assert_eq!(outcome.residual.len(), 1);
        assert_eq!(outcome.residual[0].remaining, Money::from_cents(2));
    }

    #[test]
    fn test_thirds_rounded_to_cents() {
        // 10.00 paid by A, split three ways
        let members = vec![member("a", 667), member("b", -333), member("c", -333)];
        let outcome = NettingEngine::default().compute(&members);

        assert_eq!(pairs(&outcome.transfers), vec![("b", "a", 333), ("c", "a", 333)]);
        assert!(outcome.transfers.iter().all(|t| t.amount >= Money::ONE_CENT));

        // The one-cent rounding remainder is within tolerance
        assert!(outcome.residual.is_empty());
    }

    #[test]
    fn test_unbalanced_input_reports_residual() {
        let members = vec![member("a", 5000), member("b", -2000)];
        let outcome = NettingEngine::default().compute(&members);

        assert_eq!(pairs(&outcome.transfers), vec![("b", "a", 2000)]);
        assert_eq!(
            outcome.residual,
            vec![Residual {
                member: MemberId::new("a"),
                name: "A".to_string(),
                remaining: Money::from_cents(3000),
            }]
        );

        // The plain function drops the leftover silently
        assert_eq!(minimize_settlements(&members).len(), 1);
    }

    #[test]
    fn test_custom_tolerance() {
        let engine = NettingEngine::new(Money::from_cents(-100));
        assert_eq!(engine.tolerance(), Money::from_cents(100));

        let members = vec![member("a", 100), member("b", -100), member("c", 500), member("d", -500)];
        let transfers = engine.compute(&members).transfers;

        assert_eq!(pairs(&transfers), vec![("d", "c", 500)]);
    }

    #[test]
    fn test_outstanding_after_partial_application() {
        let members = vec![member("a", 3000), member("b", -1000), member("c", -2000)];
        let transfers = minimize_settlements(&members);

        let outstanding = NettingEngine::default().outstanding_after(&members, &transfers[..1]);
        let remaining: Vec<(&str, i64)> = outstanding
            .iter()
            .map(|r| (r.member.as_str(), r.remaining.cents()))
            .collect();

        assert_eq!(remaining, vec![("a", 1000), ("b", -1000)]);
    }
}
