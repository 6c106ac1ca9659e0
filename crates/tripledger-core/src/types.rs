//! # Domain Types
//!
//! Value types shared by the balance calculator and the settlement optimizer.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (owned by the trip store)        OUTPUT (recomputed on demand)   │
//! │  ┌─────────────────┐                    ┌──────────────────────┐        │
//! │  │     Member      │                    │    BalanceResult     │        │
//! │  │  id, name       │                    │  pairwise (viewer)   │        │
//! │  └─────────────────┘                    │  net_balances (all)  │        │
//! │  ┌─────────────────┐                    │  spent/paid/received │        │
//! │  │  LedgerEntry    │ ── compute ──►     │  issues              │        │
//! │  │  kind, cost     │                    └──────────┬───────────┘        │
//! │  │  payer_id       │                               │ optimize           │
//! │  │  participant_ids│                    ┌──────────▼───────────┐        │
//! │  │  split_overrides│  ◄── recorded ──── │      Transfer        │        │
//! │  │  is_private     │      by caller     │  from, to, amount    │        │
//! │  └─────────────────┘                    └──────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every map keyed by [`MemberId`] is a `BTreeMap`, so serialized output and
//! iteration order are the same on every call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Member
// =============================================================================

/// Identifier of a trip participant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        MemberId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        MemberId(id.to_string())
    }
}

impl From<String> for MemberId {
    fn from(id: String) -> Self {
        MemberId(id)
    }
}

impl Borrow<str> for MemberId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A trip participant. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Member {
    pub id: MemberId,
    /// Display name.
    pub name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Member {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Roster
// =============================================================================

/// Id lookup over the trip's member list.
///
/// Built once per computation; entries are resolved against it and any id
/// it does not know is skipped.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    names: BTreeMap<MemberId, String>,
}

impl Roster {
    pub fn new(members: &[Member]) -> Self {
        Roster {
            names: members
                .iter()
                .map(|m| (m.id.clone(), m.name.clone()))
                .collect(),
        }
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.names.contains_key(id)
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = &MemberId> {
        self.names.keys()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// What kind of financial fact an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// A shared cost paid by one member for a group of participants.
    Expense,
    /// A direct repayment from the payer to a single receiver.
    Settlement,
}

/// A single expense or settlement logged against a trip.
///
/// Entries are immutable snapshots handed to the engine; the engine never
/// edits them. Settlements proposed by the optimizer become new entries via
/// [`Transfer::to_settlement_entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Unique, stable identifier.
    pub id: String,

    pub kind: EntryKind,

    /// Non-negative amount. For settlements, the amount transferred.
    pub cost: Money,

    /// Who paid (or, for a settlement, who sent the money).
    pub payer_id: MemberId,

    /// Who shares the cost, in entry order. For a settlement: the receiver.
    pub participant_ids: Vec<MemberId>,

    /// Explicit per-member shares replacing the equal split for that member.
    #[serde(default)]
    pub split_overrides: BTreeMap<MemberId, Money>,

    /// Author of the entry.
    pub created_by: MemberId,

    /// Private entries only count for their author.
    #[serde(default)]
    pub is_private: bool,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// Creates a public expense split equally among `participants`.
    pub fn expense<I, P>(
        id: impl Into<String>,
        cost: Money,
        payer: impl Into<MemberId>,
        participants: I,
        created_by: impl Into<MemberId>,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<MemberId>,
    {
        LedgerEntry {
            id: id.into(),
            kind: EntryKind::Expense,
            cost,
            payer_id: payer.into(),
            participant_ids: participants.into_iter().map(Into::into).collect(),
            split_overrides: BTreeMap::new(),
            created_by: created_by.into(),
            is_private: false,
            description: String::new(),
            created_at: None,
        }
    }

    /// Creates a public settlement of `amount` from `from` to `to`.
    pub fn settlement(
        id: impl Into<String>,
        amount: Money,
        from: impl Into<MemberId>,
        to: impl Into<MemberId>,
        created_by: impl Into<MemberId>,
    ) -> Self {
        LedgerEntry {
            id: id.into(),
            kind: EntryKind::Settlement,
            cost: amount,
            payer_id: from.into(),
            participant_ids: vec![to.into()],
            split_overrides: BTreeMap::new(),
            created_by: created_by.into(),
            is_private: false,
            description: String::new(),
            created_at: None,
        }
    }

    /// Sets an explicit share for one member.
    pub fn with_override(mut self, member: impl Into<MemberId>, share: Money) -> Self {
        self.split_overrides.insert(member.into(), share);
        self
    }

    /// Marks the entry private to its author.
    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    #[inline]
    pub fn is_settlement(&self) -> bool {
        self.kind == EntryKind::Settlement
    }

    /// The receiver of a settlement, if the entry names one.
    pub fn receiver(&self) -> Option<&MemberId> {
        match self.kind {
            EntryKind::Settlement => self.participant_ids.first(),
            EntryKind::Expense => None,
        }
    }

    /// Every member id the entry mentions (payer, participants, override keys).
    pub fn referenced_members(&self) -> BTreeSet<&MemberId> {
        std::iter::once(&self.payer_id)
            .chain(self.participant_ids.iter())
            .chain(self.split_overrides.keys())
            .collect()
    }
}

// =============================================================================
// Transfer
// =============================================================================

/// One proposed payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    /// Always a whole number of minor units.
    pub amount: Money,
}

impl Transfer {
    pub fn new(from: impl Into<MemberId>, to: impl Into<MemberId>, amount: Money) -> Self {
        Transfer {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// Builds the settlement entry a caller records once this transfer has
    /// actually been paid.
    pub fn to_settlement_entry(&self, created_by: &MemberId, now: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry::settlement(
            Uuid::new_v4().to_string(),
            self.amount,
            self.from.clone(),
            self.to.clone(),
            created_by.clone(),
        )
        .with_created_at(now)
    }
}

// =============================================================================
// Data Issues
// =============================================================================

/// A data-quality signal found while aggregating.
///
/// None of these stop a computation; each describes a contribution that was
/// corrected or skipped so the caller can surface it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataIssue {
    /// An expense had no participants; the payer was charged the whole cost.
    EmptyParticipants { entry_id: String },

    /// An entry referenced an id missing from the roster; that id's
    /// contribution was skipped.
    UnknownMember { entry_id: String, member_id: MemberId },

    /// An entry failed validation and was excluded entirely.
    InvalidEntry { entry_id: String, reason: String },

    /// Applying an entry would push a running total past the `Money` range;
    /// the entry was excluded entirely.
    AmountOverflow { entry_id: String },
}

impl DataIssue {
    pub fn entry_id(&self) -> &str {
        match self {
            DataIssue::EmptyParticipants { entry_id }
            | DataIssue::UnknownMember { entry_id, .. }
            | DataIssue::InvalidEntry { entry_id, .. }
            | DataIssue::AmountOverflow { entry_id } => entry_id,
        }
    }
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIssue::EmptyParticipants { entry_id } => {
                write!(f, "entry {} has no participants", entry_id)
            }
            DataIssue::UnknownMember {
                entry_id,
                member_id,
            } => write!(f, "entry {} references unknown member {}", entry_id, member_id),
            DataIssue::InvalidEntry { entry_id, reason } => {
                write!(f, "entry {} is invalid: {}", entry_id, reason)
            }
            DataIssue::AmountOverflow { entry_id } => {
                write!(f, "entry {} overflows the running totals", entry_id)
            }
        }
    }
}

// =============================================================================
// Balance Result
// =============================================================================

/// Balances for one viewer (or for the whole trip when `viewer_id` is None).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    pub viewer_id: Option<MemberId>,

    /// Counterparty → amount. Positive: the counterparty owes the viewer.
    /// Negative: the viewer owes the counterparty.
    pub pairwise: BTreeMap<MemberId, Money>,

    /// Member → net position. Positive: owed money. Negative: owes money.
    /// Every roster member is present.
    pub net_balances: BTreeMap<MemberId, Money>,

    /// The viewer's own share of expenses.
    pub spent_total: Money,

    /// What the viewer paid out (expenses fronted plus settlements sent).
    pub paid_total: Money,

    /// Settlements the viewer received.
    pub received_total: Money,

    pub issues: Vec<DataIssue>,
}

impl BalanceResult {
    /// Net balance of one member, zero when unknown.
    pub fn net_of(&self, id: &str) -> Money {
        self.net_balances.get(id).copied().unwrap_or_default()
    }

    /// Pairwise amount for one counterparty, zero when untouched.
    pub fn pairwise_with(&self, id: &str) -> Money {
        self.pairwise.get(id).copied().unwrap_or_default()
    }

    /// Sum of what others owe the viewer.
    pub fn owed_to_viewer(&self) -> Money {
        Money::saturating_sum(self.pairwise.values().copied().filter(Money::is_positive))
    }

    /// Sum of what the viewer owes others, as a positive amount.
    pub fn owed_by_viewer(&self) -> Money {
        Money::saturating_sum(
            self.pairwise
                .values()
                .filter(|m| m.is_negative())
                .map(Money::abs),
        )
    }

    /// Sum of every net balance. Zero whenever no contribution was skipped.
    pub fn total_net(&self) -> Money {
        Money::saturating_sum(self.net_balances.values().copied())
    }

    /// Pairwise entries whose magnitude exceeds `epsilon`, for display.
    pub fn outstanding_pairwise(&self, epsilon: Money) -> BTreeMap<MemberId, Money> {
        self.pairwise
            .iter()
            .filter(|(_, amount)| !amount.is_within(epsilon))
            .map(|(id, amount)| (id.clone(), *amount))
            .collect()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
