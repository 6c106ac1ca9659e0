//! # Settlement Optimizer ("Smart Route")
//!
//! Proposes a short list of transfers that, once paid, zero every net
//! balance.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. Round every net balance to cents, keeping the rounded total equal   │
//! │     to the exact total (largest-remainder correction)                   │
//! │  2. Debtors   = balance < -ε, sorted most negative first                │
//! │     Creditors = balance >  ε, sorted most positive first                │
//! │  3. Match the current debtor with the current creditor:                 │
//! │        amount = min(|debtor|, creditor)                                 │
//! │     emit debtor ──amount──► creditor, reduce both, advance whoever      │
//! │     is now within ε of zero                                             │
//! │                                                                         │
//! │  Each step advances at least one side, so the plan never holds more     │
//! │  than |debtors| + |creditors| - 1 transfers.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Greedy matching is deterministic and keeps transfers large, but it is
//! not a proven minimum for every distribution of balances.
//!
//! ## Example
//! ```rust
//! use std::collections::BTreeMap;
//! use tripledger_core::money::Money;
//! use tripledger_core::settlement::optimize_transfers;
//! use tripledger_core::types::MemberId;
//!
//! let mut net = BTreeMap::new();
//! net.insert(MemberId::from("a"), Money::from_minor(6000));
//! net.insert(MemberId::from("b"), Money::from_minor(-3000));
//! net.insert(MemberId::from("c"), Money::from_minor(-3000));
//!
//! let transfers = optimize_transfers(&net);
//! assert_eq!(transfers.len(), 2);
//! assert!(transfers.iter().all(|t| t.to.as_str() == "a"));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::money::{Money, UNITS_PER_MINOR};
use crate::types::{MemberId, Transfer};
use crate::DEFAULT_SETTLEMENT_EPSILON;

// =============================================================================
// Options
// =============================================================================

/// Tuning for the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementOptions {
    /// Balances within this distance of zero are treated as settled. Only
    /// decides who takes part; never used in the arithmetic.
    pub epsilon: Money,
}

impl Default for SettlementOptions {
    fn default() -> Self {
        SettlementOptions {
            epsilon: DEFAULT_SETTLEMENT_EPSILON,
        }
    }
}

// =============================================================================
// Plan
// =============================================================================

/// Transfers plus what each balance would be once they are all paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettlementPlan {
    pub transfers: Vec<Transfer>,
    /// Member → balance after the transfers. Sub-cent leftovers only.
    pub residuals: BTreeMap<MemberId, Money>,
}

impl SettlementPlan {
    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn total_moved(&self) -> Money {
        Money::saturating_sum(self.transfers.iter().map(|t| t.amount))
    }
}

// =============================================================================
// Optimizer
// =============================================================================

/// Proposes transfers with the default options.
pub fn optimize_transfers(net_balances: &BTreeMap<MemberId, Money>) -> Vec<Transfer> {
    optimize_transfers_with(net_balances, &SettlementOptions::default())
}

/// Proposes transfers that zero `net_balances`.
///
/// Output is ordered by debtor (largest debt first). Every amount is a
/// positive whole number of cents.
pub fn optimize_transfers_with(
    net_balances: &BTreeMap<MemberId, Money>,
    options: &SettlementOptions,
) -> Vec<Transfer> {
    let epsilon = options.epsilon.abs();
    let rounded = round_balances(net_balances);

    let mut debtors: Vec<(&MemberId, Money)> = rounded
        .iter()
        .filter(|(_, balance)| balance.less_than(-epsilon))
        .map(|(id, balance)| (*id, *balance))
        .collect();
    let mut creditors: Vec<(&MemberId, Money)> = rounded
        .iter()
        .filter(|(_, balance)| balance.greater_than(epsilon))
        .map(|(id, balance)| (*id, *balance))
        .collect();

    debtors.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut transfers = Vec::new();
    let (mut d, mut c) = (0, 0);

    while d < debtors.len() && c < creditors.len() {
        let owed = debtors[d].1.abs();
        let due = creditors[c].1;
        let amount = owed.min(due).round_to_minor();

        if amount.is_positive() {
            transfers.push(Transfer::new(
                debtors[d].0.clone(),
                creditors[c].0.clone(),
                amount,
            ));
            debtors[d].1 += amount;
            creditors[c].1 -= amount;
        }

        let mut debtor_done = debtors[d].1.is_within(epsilon);
        let mut creditor_done = creditors[c].1.is_within(epsilon);

        // a zero-amount step must still move forward
        if !debtor_done && !creditor_done {
            match owed.cmp(&due) {
                Ordering::Greater => creditor_done = true,
                Ordering::Less | Ordering::Equal => debtor_done = true,
            }
        }

        if debtor_done {
            d += 1;
        }
        if creditor_done {
            c += 1;
        }
    }

    debug!(
        debtors = debtors.len(),
        creditors = creditors.len(),
        transfers = transfers.len(),
        "Settlement plan computed"
    );

    transfers
}

/// Runs the optimizer and reports the balances left afterwards.
pub fn plan(net_balances: &BTreeMap<MemberId, Money>, options: &SettlementOptions) -> SettlementPlan {
    let transfers = optimize_transfers_with(net_balances, options);
    let residuals = apply_transfers(net_balances, &transfers);
    SettlementPlan {
        transfers,
        residuals,
    }
}

/// Balances after every transfer is paid: the sender's balance rises, the
/// receiver's falls. Members missing from `net_balances` start at zero.
pub fn apply_transfers(
    net_balances: &BTreeMap<MemberId, Money>,
    transfers: &[Transfer],
) -> BTreeMap<MemberId, Money> {
    let mut after = net_balances.clone();
    for transfer in transfers {
        let sender = after.entry(transfer.from.clone()).or_default();
        *sender = sender.saturating_add(transfer.amount);
        let receiver = after.entry(transfer.to.clone()).or_default();
        *receiver = receiver.saturating_sub(transfer.amount);
    }
    after
}

/// Rounds each balance to cents so the greedy pass works in exact cents.
///
/// Plain rounding can make the rounded total drift from the exact total by
/// a few cents. The drift is removed one cent at a time from the balances
/// whose rounding moved them furthest in the drift's direction, so no
/// balance ends up more than one cent from its exact value.
///
/// When the totals themselves do not fit in `Money` the balances are rounded
/// individually and no correction is made.
pub fn round_balances(net_balances: &BTreeMap<MemberId, Money>) -> Vec<(&MemberId, Money)> {
    let mut rounded: Vec<(&MemberId, Money, Money)> = net_balances
        .iter()
        .map(|(id, exact)| (id, *exact, exact.round_to_minor()))
        .collect();

    let exact_total = Money::checked_sum(net_balances.values().copied());
    let rounded_total = Money::checked_sum(rounded.iter().map(|(_, _, r)| *r));
    let drift_cents = match (exact_total, rounded_total) {
        (Some(exact), Some(rounded)) => rounded
            .checked_sub(exact.round_to_minor())
            .map_or(0, |drift| drift.units() / UNITS_PER_MINOR),
        _ => 0,
    };

    if drift_cents != 0 {
        let cent = Money::from_minor(drift_cents.signum());
        let mut order: Vec<usize> = (0..rounded.len()).collect();
        // largest rounding error in the drift's direction first
        order.sort_by(|&i, &j| {
            let err_i = (rounded[i].2 - rounded[i].1) * drift_cents.signum();
            let err_j = (rounded[j].2 - rounded[j].1) * drift_cents.signum();
            err_j.cmp(&err_i).then_with(|| rounded[i].0.cmp(rounded[j].0))
        });

        for &index in order.iter().take(drift_cents.unsigned_abs() as usize) {
            if let Some(corrected) = rounded[index].2.checked_sub(cent) {
                rounded[index].2 = corrected;
            }
        }
    }

    rounded.into_iter().map(|(id, _, r)| (id, r)).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
