//! # Balance Calculator
//!
//! Turns a snapshot of ledger entries into net balances, the viewer's
//! pairwise debts and the viewer's totals, in a single pass.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  entries ──► visibility filter ──► validate ──► split_shares ──► apply  │
//! │  (snapshot)   (viewer only)        (skip bad)    (expenses)      (sum)  │
//! │                                                                         │
//! │  compute_balances         = filter + aggregate(viewer)                  │
//! │  compute_global_balances  = aggregate(no viewer, nothing hidden)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Split Policy
//! Shares of an expense always add up to exactly its cost:
//!
//! 1. Members with a split override pay exactly their override.
//! 2. `cost - sum(overrides)` is divided equally among the remaining
//!    participants with [`Money::allocate`]; leftover units go to the
//!    earliest participants in entry order.
//! 3. When every participant has an override, the payer absorbs whatever
//!    the overrides leave uncovered.
//! 4. An expense with no participants at all is charged to the payer and
//!    reported as [`DataIssue::EmptyParticipants`].
//!
//! Validation guarantees overrides are non-negative and never exceed the
//! cost, so every share is non-negative.
//!
//! ## Overflow
//! Each entry's changes are staged and committed together. If any running
//! total would leave the `Money` range the entry is skipped whole and
//! reported as [`DataIssue::AmountOverflow`]; nothing panics.
//!
//! ## Example
//! ```rust
//! use tripledger_core::balance::compute_balances;
//! use tripledger_core::money::Money;
//! use tripledger_core::types::{LedgerEntry, Member, MemberId};
//!
//! let members = [Member::new("a", "Ana"), Member::new("b", "Ben"), Member::new("c", "Cy")];
//! let dinner = LedgerEntry::expense("e1", Money::from_minor(9000), "a", ["a", "b", "c"], "a");
//!
//! let result = compute_balances(&[dinner], &members, &MemberId::from("a")).unwrap();
//! assert_eq!(result.net_of("a"), Money::from_minor(6000));
//! assert_eq!(result.pairwise_with("b"), Money::from_minor(3000));
//! ```

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::money::Money;
use crate::types::{BalanceResult, DataIssue, EntryKind, LedgerEntry, Member, MemberId, Roster};
use crate::validation::{override_total, validate_entry, ValidationResult};
use crate::visibility::visible_entries;

// =============================================================================
// Public Entry Points
// =============================================================================

/// Computes balances as seen by `viewer_id`.
///
/// Private entries created by someone else are excluded before aggregation,
/// so they touch no total at all, not even other members' net balances.
///
/// ## Errors
/// [`LedgerError::UnknownViewer`] when `viewer_id` is not in `members`.
/// Everything else is recovered per entry and listed in
/// [`BalanceResult::issues`].
pub fn compute_balances(
    entries: &[LedgerEntry],
    members: &[Member],
    viewer_id: &MemberId,
) -> LedgerResult<BalanceResult> {
    let roster = Roster::new(members);
    if !roster.contains(viewer_id.as_str()) {
        return Err(LedgerError::UnknownViewer(viewer_id.clone()));
    }

    Ok(aggregate(
        visible_entries(entries, viewer_id),
        &roster,
        Some(viewer_id),
    ))
}

/// Computes trip-wide net balances with no viewer and no privacy filter.
///
/// For audit and administrative views. Pairwise debts and viewer totals are
/// left empty.
pub fn compute_global_balances(entries: &[LedgerEntry], members: &[Member]) -> BalanceResult {
    aggregate(entries, &Roster::new(members), None)
}

/// Aggregates `entries` exactly as given; applies no visibility filter.
///
/// Every roster member appears in `net_balances`. The result does not
/// depend on the order of `entries`.
pub fn aggregate<'a, I>(entries: I, roster: &Roster, viewer: Option<&MemberId>) -> BalanceResult
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let mut pass = Aggregation::new(roster, viewer);
    let mut count = 0usize;

    for entry in entries {
        count += 1;
        pass.apply(entry);
    }

    let result = pass.finish();
    debug!(
        viewer = viewer.map(MemberId::as_str),
        entries = count,
        members = roster.len(),
        issues = result.issues.len(),
        "Balances computed"
    );
    result
}

// =============================================================================
// Share Computation
// =============================================================================

/// The per-member shares of one expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitShares {
    /// `(member, share)` in entry order; sums to the entry cost.
    pub shares: Vec<(MemberId, Money)>,
    /// True when the participant list was empty and the payer was charged.
    pub used_fallback: bool,
}

impl SplitShares {
    pub fn share_of(&self, id: &str) -> Option<Money> {
        self.shares
            .iter()
            .find(|(member, _)| member.as_str() == id)
            .map(|(_, share)| *share)
    }

    pub fn total(&self) -> Money {
        Money::saturating_sum(self.shares.iter().map(|(_, share)| *share))
    }
}

/// Splits an expense's cost among its participants (see the module docs for
/// the policy). Does not validate the entry.
///
/// ## Errors
/// [`ValidationError::AmountOverflow`] when the overrides, or the remainder
/// they leave, do not fit in `Money`. Only reachable for entries that would
/// also fail [`validate_entry`].
pub fn split_shares(entry: &LedgerEntry) -> ValidationResult<SplitShares> {
    let mut order: Vec<&MemberId> = Vec::with_capacity(entry.participant_ids.len());
    for id in entry
        .participant_ids
        .iter()
        .chain(entry.split_overrides.keys())
    {
        if !order.contains(&id) {
            order.push(id);
        }
    }

    if order.is_empty() {
        return Ok(SplitShares {
            shares: vec![(entry.payer_id.clone(), entry.cost)],
            used_fallback: true,
        });
    }

    let overridden = override_total(entry)?;
    let remainder = entry
        .cost
        .checked_sub(overridden)
        .ok_or(ValidationError::AmountOverflow)?;
    let open = order
        .iter()
        .filter(|id| !entry.split_overrides.contains_key(id.as_str()))
        .count();

    // allocate(0) is the every-member-overridden case, handled below
    let mut equal_parts = remainder.allocate(open).unwrap_or_default().into_iter();

    let mut shares: Vec<(MemberId, Money)> = order
        .iter()
        .map(|id| {
            let share = match entry.split_overrides.get(id.as_str()) {
                Some(amount) => *amount,
                None => equal_parts.next().unwrap_or_default(),
            };
            ((*id).clone(), share)
        })
        .collect();

    if open == 0 && !remainder.is_zero() {
        match shares.iter_mut().find(|(id, _)| *id == entry.payer_id) {
            Some((_, share)) => {
                *share = share
                    .checked_add(remainder)
                    .ok_or(ValidationError::AmountOverflow)?;
            }
            None => shares.push((entry.payer_id.clone(), remainder)),
        }
    }

    Ok(SplitShares {
        shares,
        used_fallback: false,
    })
}

// =============================================================================
// Aggregation Pass
// =============================================================================

/// Running total an entry can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Account<'e> {
    Net(&'e MemberId),
    Pairwise(&'e MemberId),
    Spent,
    Paid,
    Received,
}

/// Signed changes one entry makes, committed together or not at all.
type Postings<'e> = Vec<(Account<'e>, Money)>;

/// Mutable accumulator for one pass. Only ever adds, so entry order cannot
/// change the outcome unless a running total overflows.
struct Aggregation<'r> {
    roster: &'r Roster,
    viewer: Option<&'r MemberId>,
    net: BTreeMap<MemberId, Money>,
    pairwise: BTreeMap<MemberId, Money>,
    spent: Money,
    paid: Money,
    received: Money,
    issues: Vec<DataIssue>,
}

impl<'r> Aggregation<'r> {
    fn new(roster: &'r Roster, viewer: Option<&'r MemberId>) -> Self {
        Aggregation {
            roster,
            viewer,
            net: roster.ids().map(|id| (id.clone(), Money::zero())).collect(),
            pairwise: BTreeMap::new(),
            spent: Money::zero(),
            paid: Money::zero(),
            received: Money::zero(),
            issues: Vec::new(),
        }
    }

    fn apply(&mut self, entry: &LedgerEntry) {
        if let Err(err) = validate_entry(entry) {
            self.reject(entry, &err);
            return;
        }

        match entry.kind {
            EntryKind::Expense => self.apply_expense(entry),
            EntryKind::Settlement => self.apply_settlement(entry),
        }
    }

    fn reject(&mut self, entry: &LedgerEntry, err: &ValidationError) {
        self.issues.push(DataIssue::InvalidEntry {
            entry_id: entry.id.clone(),
            reason: err.to_string(),
        });
    }

    fn apply_expense(&mut self, entry: &LedgerEntry) {
        let split = match split_shares(entry) {
            Ok(split) => split,
            Err(err) => {
                self.reject(entry, &err);
                return;
            }
        };
        if split.used_fallback {
            self.issues.push(DataIssue::EmptyParticipants {
                entry_id: entry.id.clone(),
            });
        }

        let mut postings = Postings::new();
        let payer = &entry.payer_id;
        let payer_known = self.known(entry, payer);
        if payer_known {
            postings.push((Account::Net(payer), entry.cost));
        }
        if self.is_viewer(payer) {
            postings.push((Account::Paid, entry.cost));
        }

        // validated shares lie in 0..=cost, so negating them is exact
        for (member, share) in &split.shares {
            if !self.known(entry, member) {
                continue;
            }
            postings.push((Account::Net(member), -*share));

            if self.is_viewer(member) {
                postings.push((Account::Spent, *share));
            }

            if member != payer && payer_known {
                postings.extend(self.pairwise_posting(payer, member, *share));
            }
        }

        self.commit(entry, postings);
    }

    fn apply_settlement(&mut self, entry: &LedgerEntry) {
        let payer = &entry.payer_id;
        let Some(receiver) = entry.receiver() else {
            return;
        };

        let payer_known = self.known(entry, payer);
        let receiver_known = self.known(entry, receiver);

        let mut postings = Postings::new();
        if payer_known {
            postings.push((Account::Net(payer), entry.cost));
        }
        if receiver_known {
            postings.push((Account::Net(receiver), -entry.cost));
        }

        if self.is_viewer(payer) {
            postings.push((Account::Paid, entry.cost));
        }
        if self.is_viewer(receiver) {
            postings.push((Account::Received, entry.cost));
        }

        if payer_known && receiver_known && payer != receiver {
            postings.extend(self.pairwise_posting(payer, receiver, entry.cost));
        }

        self.commit(entry, postings);
    }

    /// `debtor` now owes `creditor` a further `amount` (or, for a
    /// settlement, `creditor` has paid `debtor` back). Only relationships
    /// involving the viewer are tracked.
    fn pairwise_posting<'e>(
        &self,
        creditor: &'e MemberId,
        debtor: &'e MemberId,
        amount: Money,
    ) -> Option<(Account<'e>, Money)> {
        if self.is_viewer(creditor) {
            Some((Account::Pairwise(debtor), amount))
        } else if self.is_viewer(debtor) {
            Some((Account::Pairwise(creditor), -amount))
        } else {
            None
        }
    }

    /// Applies every posting, or none of them when any running total would
    /// leave the `Money` range.
    fn commit(&mut self, entry: &LedgerEntry, postings: Postings<'_>) {
        let mut deltas: BTreeMap<Account<'_>, Money> = BTreeMap::new();
        for (account, amount) in postings {
            let delta = deltas.entry(account).or_default();
            match delta.checked_add(amount) {
                Some(sum) => *delta = sum,
                None => return self.overflowed(entry),
            }
        }

        let mut updates = Vec::with_capacity(deltas.len());
        for (account, delta) in deltas {
            match self.current(account).checked_add(delta) {
                Some(total) => updates.push((account, total)),
                None => return self.overflowed(entry),
            }
        }

        for (account, total) in updates {
            *self.slot(account) = total;
        }
    }

    fn overflowed(&mut self, entry: &LedgerEntry) {
        debug!(entry_id = %entry.id, "Entry skipped: totals would overflow");
        self.issues.push(DataIssue::AmountOverflow {
            entry_id: entry.id.clone(),
        });
    }

    fn current(&self, account: Account<'_>) -> Money {
        match account {
            Account::Net(id) => self.net.get(id).copied().unwrap_or_default(),
            Account::Pairwise(id) => self.pairwise.get(id).copied().unwrap_or_default(),
            Account::Spent => self.spent,
            Account::Paid => self.paid,
            Account::Received => self.received,
        }
    }

    fn slot(&mut self, account: Account<'_>) -> &mut Money {
        match account {
            Account::Net(id) => self.net.entry(id.clone()).or_default(),
            Account::Pairwise(id) => self.pairwise.entry(id.clone()).or_default(),
            Account::Spent => &mut self.spent,
            Account::Paid => &mut self.paid,
            Account::Received => &mut self.received,
        }
    }

    fn is_viewer(&self, member: &MemberId) -> bool {
        self.viewer == Some(member)
    }

    /// Roster check; records an issue for ids the roster does not know.
    fn known(&mut self, entry: &LedgerEntry, member: &MemberId) -> bool {
        if self.roster.contains(member.as_str()) {
            return true;
        }
        self.issues.push(DataIssue::UnknownMember {
            entry_id: entry.id.clone(),
            member_id: member.clone(),
        });
        false
    }

    fn finish(mut self) -> BalanceResult {
        self.issues.sort();
        self.issues.dedup();

        for issue in &self.issues {
            warn!(entry_id = issue.entry_id(), %issue, "Ledger data issue");
        }

        BalanceResult {
            viewer_id: self.viewer.cloned(),
            pairwise: self.pairwise,
            net_balances: self.net,
            spent_total: self.spent,
            paid_total: self.paid,
            received_total: self.received,
            issues: self.issues,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn m(minor: i64) -> Money {
        Money::from_minor(minor)
    }

    fn members() -> Vec<Member> {
        vec![
            Member::new("a", "Ana"),
            Member::new("b", "Ben"),
            Member::new("c", "Cy"),
        ]
    }

    fn viewer(id: &str) -> MemberId {
        MemberId::from(id)
    }

    #[test]
    fn test_empty_entries_give_all_zero_result() {
        let result = compute_balances(&[], &members(), &viewer("a")).unwrap();
        assert_eq!(result.net_balances.len(), 3);
        assert!(result.net_balances.values().all(Money::is_zero));
        assert!(result.pairwise.is_empty());
        assert_eq!(result.spent_total, Money::zero());
        assert_eq!(result.paid_total, Money::zero());
        assert_eq!(result.received_total, Money::zero());
        assert!(!result.has_issues());
    }

    #[test]
    fn test_unknown_viewer_is_rejected() {
        let err = compute_balances(&[], &members(), &viewer("zed")).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownViewer(_)));
    }

    #[test]
    fn test_equal_split_three_ways() {
        let entries = [LedgerEntry::expense("e1", m(3000), "a", ["a", "b", "c"], "a")];
        let result = compute_balances(&entries, &members(), &viewer("a")).unwrap();

        assert_eq!(result.net_of("a"), m(2000));
        assert_eq!(result.net_of("b"), m(-1000));
        assert_eq!(result.net_of("c"), m(-1000));
        assert_eq!(result.pairwise_with("b"), m(1000));
        assert_eq!(result.pairwise_with("c"), m(1000));
        assert_eq!(result.paid_total, m(3000));
        assert_eq!(result.spent_total, m(1000));
        assert_eq!(result.total_net(), Money::zero());
    }

    #[test]
    fn test_participant_view_owes_payer() {
        let entries = [LedgerEntry::expense("e1", m(9000), "a", ["a", "b", "c"], "a")];
        let result = compute_balances(&entries, &members(), &viewer("b")).unwrap();

        assert_eq!(result.pairwise_with("a"), m(-3000));
        // b and c owe a, not each other
        assert_eq!(result.pairwise_with("c"), Money::zero());
        assert_eq!(result.spent_total, m(3000));
        assert_eq!(result.paid_total, Money::zero());
        assert_eq!(result.owed_by_viewer(), m(3000));
    }

    #[test]
    fn test_payer_outside_participants() {
        let entries = [LedgerEntry::expense("e1", m(1000), "a", ["b", "c"], "a")];
        let result = compute_balances(&entries, &members(), &viewer("a")).unwrap();

        assert_eq!(result.net_of("a"), m(1000));
        assert_eq!(result.net_of("b"), m(-500));
        assert_eq!(result.spent_total, Money::zero());
        assert_eq!(result.paid_total, m(1000));
    }

    #[test]
    fn test_uneven_split_conserves_money() {
        let entries = [LedgerEntry::expense("e1", m(10000), "a", ["a", "b", "c"], "a")];
        let result = compute_global_balances(&entries, &members());

        // first participant takes the extra unit
        assert_eq!(result.net_of("a"), Money::from_units(666_666));
        assert_eq!(result.net_of("b"), Money::from_units(-333_333));
        assert_eq!(result.net_of("c"), Money::from_units(-333_333));
        assert_eq!(result.total_net(), Money::zero());
    }

    #[test]
    fn test_override_remainder_goes_to_other_participants() {
        let entries = [LedgerEntry::expense("e1", m(10000), "a", ["a", "b"], "a")
            .with_override("b", m(8000))];
        let result = compute_balances(&entries, &members(), &viewer("a")).unwrap();

        assert_eq!(result.net_of("a"), m(8000));
        assert_eq!(result.net_of("b"), m(-8000));
        assert_eq!(result.spent_total, m(2000));
        assert_eq!(result.pairwise_with("b"), m(8000));
    }

    #[test]
    fn test_override_keys_join_the_participant_set() {
        let entry = LedgerEntry::expense("e1", m(9000), "a", ["a", "b"], "a")
            .with_override("c", m(3000));
        let split = split_shares(&entry).unwrap();

        assert_eq!(split.share_of("a"), Some(m(3000)));
        assert_eq!(split.share_of("b"), Some(m(3000)));
        assert_eq!(split.share_of("c"), Some(m(3000)));
        assert_eq!(split.total(), m(9000));
    }

    #[test]
    fn test_payer_absorbs_uncovered_remainder() {
        // every participant overridden, 10.00 left uncovered
        let entry = LedgerEntry::expense("e1", m(10000), "a", ["b", "c"], "a")
            .with_override("b", m(5000))
            .with_override("c", m(4000));
        let split = split_shares(&entry).unwrap();

        assert_eq!(split.share_of("a"), Some(m(1000)));
        assert_eq!(split.total(), m(10000));

        let result = compute_global_balances(&[entry], &members());
        assert_eq!(result.net_of("a"), m(9000));
        assert_eq!(result.total_net(), Money::zero());
    }

    #[test]
    fn test_empty_participants_fall_back_to_payer() {
        let entries = [LedgerEntry::expense("e1", m(5000), "a", Vec::<&str>::new(), "a")];
        let result = compute_balances(&entries, &members(), &viewer("a")).unwrap();

        assert_eq!(result.net_of("a"), Money::zero());
        assert_eq!(result.spent_total, m(5000));
        assert_eq!(
            result.issues,
            vec![DataIssue::EmptyParticipants {
                entry_id: "e1".to_string()
            }]
        );
    }

    #[test]
    fn test_override_overflow_becomes_invalid_entry() {
        let entry = LedgerEntry::expense("big", Money::from_units(i64::MAX), "a", ["a", "b"], "a")
            .with_override("a", Money::from_units(i64::MAX))
            .with_override("b", Money::from_units(1));
        assert_eq!(split_shares(&entry), Err(ValidationError::AmountOverflow));

        let result = compute_global_balances(&[entry], &members());
        assert!(result.net_balances.values().all(Money::is_zero));
        assert!(matches!(
            result.issues.as_slice(),
            [DataIssue::InvalidEntry { entry_id, .. }] if entry_id == "big"
        ));
    }

    #[test]
    fn test_overflowing_totals_skip_the_whole_entry() {
        let half = Money::from_units(i64::MAX / 2 + 1);
        let entries = [
            LedgerEntry::expense("e1", half, "a", ["b"], "a"),
            LedgerEntry::expense("e2", half, "a", ["b"], "a"),
        ];
        let result = compute_balances(&entries, &members(), &viewer("a")).unwrap();

        // b's side of e2 would still fit; it must not be applied on its own
        assert_eq!(result.net_of("a"), half);
        assert_eq!(result.net_of("b"), -half);
        assert_eq!(result.paid_total, half);
        assert_eq!(result.pairwise_with("b"), half);
        assert_eq!(result.total_net(), Money::zero());
        assert_eq!(
            result.issues,
            vec![DataIssue::AmountOverflow {
                entry_id: "e2".to_string()
            }]
        );
    }

    #[test]
    fn test_overflowing_settlement_is_skipped() {
        let big = Money::from_units(i64::MAX);
        let entries = [
            LedgerEntry::expense("e1", m(1000), "b", ["a", "b"], "b"),
            LedgerEntry::settlement("s1", big, "b", "a", "b"),
        ];
        let result = compute_balances(&entries, &members(), &viewer("b")).unwrap();

        assert_eq!(result.net_of("b"), m(500));
        assert_eq!(result.received_total, Money::zero());
        assert_eq!(
            result.issues,
            vec![DataIssue::AmountOverflow {
                entry_id: "s1".to_string()
            }]
        );
    }

    #[test]
    fn test_settlement_moves_balances() {
        let entries = [
            LedgerEntry::expense("e1", m(9000), "a", ["a", "b", "c"], "a"),
            LedgerEntry::settlement("s1", m(3000), "b", "a", "b"),
        ];

        let for_a = compute_balances(&entries, &members(), &viewer("a")).unwrap();
        assert_eq!(for_a.net_of("a"), m(3000));
        assert_eq!(for_a.net_of("b"), Money::zero());
        assert_eq!(for_a.pairwise_with("b"), Money::zero());
        assert_eq!(for_a.received_total, m(3000));

        let for_b = compute_balances(&entries, &members(), &viewer("b")).unwrap();
        assert_eq!(for_b.pairwise_with("a"), Money::zero());
        assert_eq!(for_b.paid_total, m(3000));
        assert_eq!(for_b.spent_total, m(3000));
    }

    #[test]
    fn test_private_entries_from_others_are_skipped_entirely() {
        let entries = [
            LedgerEntry::expense("e1", m(6000), "b", ["a", "b", "c"], "b").private(),
            LedgerEntry::expense("e2", m(3000), "a", ["a", "c"], "a").private(),
        ];

        let for_a = compute_balances(&entries, &members(), &viewer("a")).unwrap();
        assert_eq!(for_a.net_of("b"), Money::zero());
        assert_eq!(for_a.net_of("a"), m(1500));
        assert_eq!(for_a.pairwise_with("b"), Money::zero());

        let for_c = compute_balances(&entries, &members(), &viewer("c")).unwrap();
        assert!(for_c.net_balances.values().all(Money::is_zero));
        assert_eq!(for_c.spent_total, Money::zero());
    }

    #[test]
    fn test_global_view_ignores_privacy() {
        let entries = [LedgerEntry::expense("e1", m(6000), "b", ["a", "b"], "b").private()];
        let result = compute_global_balances(&entries, &members());

        assert_eq!(result.viewer_id, None);
        assert_eq!(result.net_of("b"), m(3000));
        assert!(result.pairwise.is_empty());
    }

    #[test]
    fn test_unknown_member_contribution_is_skipped() {
        let entries = [LedgerEntry::expense("e1", m(9000), "a", ["a", "b", "ghost"], "a")];
        let result = compute_balances(&entries, &members(), &viewer("a")).unwrap();

        assert_eq!(result.net_of("a"), m(6000));
        assert_eq!(result.net_of("b"), m(-3000));
        assert!(!result.net_balances.contains_key("ghost"));
        assert_eq!(
            result.issues,
            vec![DataIssue::UnknownMember {
                entry_id: "e1".to_string(),
                member_id: "ghost".into(),
            }]
        );
    }

    #[test]
    fn test_unknown_payer_skips_only_payer_credit() {
        let entries = [LedgerEntry::expense("e1", m(2000), "gone", ["a", "b"], "a")];
        let result = compute_balances(&entries, &members(), &viewer("a")).unwrap();

        assert_eq!(result.net_of("a"), m(-1000));
        assert_eq!(result.net_of("b"), m(-1000));
        assert!(result.pairwise.is_empty());
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_invalid_entry_is_reported_not_applied() {
        let entries = [
            LedgerEntry::expense("bad", m(-1000), "a", ["a", "b"], "a"),
            LedgerEntry::expense("good", m(1000), "a", ["a", "b"], "a"),
        ];
        let result = compute_balances(&entries, &members(), &viewer("a")).unwrap();

        assert_eq!(result.net_of("a"), m(500));
        assert_eq!(result.issues.len(), 1);
        assert!(matches!(
            &result.issues[0],
            DataIssue::InvalidEntry { entry_id, .. } if entry_id == "bad"
        ));
    }

    #[test]
    fn test_order_independence_and_idempotence() {
        let entries = vec![
            LedgerEntry::expense("e1", m(10000), "a", ["a", "b", "c"], "a"),
            LedgerEntry::expense("e2", m(4500), "b", ["a", "b"], "b").with_override("a", m(500)),
            LedgerEntry::settlement("s1", m(1200), "c", "a", "c"),
            LedgerEntry::expense("e3", m(700), "ghost", ["c"], "c"),
        ];
        let mut reversed = entries.clone();
        reversed.reverse();

        let first = compute_balances(&entries, &members(), &viewer("a")).unwrap();
        let second = compute_balances(&entries, &members(), &viewer("a")).unwrap();
        let backwards = compute_balances(&reversed, &members(), &viewer("a")).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, backwards);
    }
}
