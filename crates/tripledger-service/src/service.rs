//! # Trip Ledger Facade
//!
//! The one entry point screens and tools use to ask about a trip.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        report_for(snapshot, viewer)                     │
//! │                                                                         │
//! │  TripSnapshot ──► validate_roster ──► compute_balances (viewer view)    │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                          optimize_transfers_with(config epsilon)        │
//! │                                            │                            │
//! │                                            ▼                            │
//! │          TripReport { balances (display-trimmed), transfers, hidden }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is cached. Every call recomputes from the snapshot it is given,
//! so a `TripLedger` can be shared freely across threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use tripledger_core::validation::{validate_entry_against, validate_roster};
use tripledger_core::visibility::hidden_count;
use tripledger_core::{
    compute_balances, compute_global_balances, optimize_transfers_with, BalanceResult,
    LedgerEntry, LedgerError, Member, MemberId, Roster, SettlementOptions, Transfer,
};

use crate::config::LedgerConfig;
use crate::error::ServiceResult;

// =============================================================================
// Snapshot
// =============================================================================

/// Members and entries of one trip as delivered by the trip store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    pub members: Vec<Member>,
    #[serde(default)]
    pub entries: Vec<LedgerEntry>,
}

impl TripSnapshot {
    pub fn new(members: Vec<Member>, entries: Vec<LedgerEntry>) -> Self {
        TripSnapshot { members, entries }
    }

    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> ServiceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON snapshot file.
    pub fn load(path: &Path) -> ServiceResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Id-to-name lookup over the members.
    pub fn roster(&self) -> Roster {
        Roster::new(&self.members)
    }
}

// =============================================================================
// Report
// =============================================================================

/// Everything one viewer's balance screen needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripReport {
    /// Balances for the viewer, pairwise debts under the display threshold
    /// removed.
    pub balances: BalanceResult,

    /// Smart Route proposal over the viewer's visible balances.
    pub transfers: Vec<Transfer>,

    /// Private entries of other members left out of this view.
    pub hidden_entries: usize,

    pub generated_at: DateTime<Utc>,
}

// =============================================================================
// Facade
// =============================================================================

/// Computes balances and settlement plans using the configured thresholds.
#[derive(Debug, Clone, Default)]
pub struct TripLedger {
    config: LedgerConfig,
    options: SettlementOptions,
}

impl TripLedger {
    pub fn new(config: LedgerConfig) -> Self {
        let options = config.settlement_options();
        TripLedger { config, options }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Balances as seen by `viewer`, with other members' private entries
    /// excluded.
    ///
    /// ## Errors
    /// - the roster has duplicate or empty ids
    /// - `viewer` is not a trip member
    pub fn balances_for(
        &self,
        snapshot: &TripSnapshot,
        viewer: &MemberId,
    ) -> ServiceResult<BalanceResult> {
        validate_roster(&snapshot.members).map_err(LedgerError::from)?;
        let result = compute_balances(&snapshot.entries, &snapshot.members, viewer)?;
        flag_issues(&result);
        Ok(result)
    }

    /// Trip-wide net balances with no privacy filter, for audit views.
    pub fn global_balances(&self, snapshot: &TripSnapshot) -> ServiceResult<BalanceResult> {
        validate_roster(&snapshot.members).map_err(LedgerError::from)?;
        let result = compute_global_balances(&snapshot.entries, &snapshot.members);
        flag_issues(&result);
        Ok(result)
    }

    /// Checks a new or edited entry before it is stored in `snapshot`'s
    /// trip. Balance computation skips bad entries; this refuses them.
    ///
    /// ## Errors
    /// - the roster has duplicate or empty ids
    /// - [`LedgerError::InvalidEntry`] when the entry breaks a rule
    /// - [`LedgerError::UnknownMemberReference`] when it names a non-member
    pub fn check_entry(&self, snapshot: &TripSnapshot, entry: &LedgerEntry) -> ServiceResult<()> {
        validate_roster(&snapshot.members).map_err(LedgerError::from)?;
        if let Err(err) = validate_entry_against(entry, &snapshot.roster()) {
            info!(entry_id = %entry.id, error = %err, "Entry refused");
            return Err(err.into());
        }
        Ok(())
    }

    /// Proposes transfers from the viewer's visible net balances, so another
    /// member's private entries never leak into the plan.
    pub fn smart_route(
        &self,
        snapshot: &TripSnapshot,
        viewer: &MemberId,
    ) -> ServiceResult<Vec<Transfer>> {
        let balances = self.balances_for(snapshot, viewer)?;
        Ok(self.route(&balances))
    }

    /// Balances, transfers and the hidden-entry count for one viewer.
    pub fn report_for(&self, snapshot: &TripSnapshot, viewer: &MemberId) -> ServiceResult<TripReport> {
        let mut balances = self.balances_for(snapshot, viewer)?;
        let transfers = self.route(&balances);
        balances.pairwise = balances.outstanding_pairwise(self.config.display_epsilon());
        let hidden_entries = hidden_count(&snapshot.entries, viewer);

        info!(
            viewer = %viewer,
            transfers = transfers.len(),
            hidden_entries,
            issues = balances.issues.len(),
            "Trip report built"
        );

        Ok(TripReport {
            balances,
            transfers,
            hidden_entries,
            generated_at: Utc::now(),
        })
    }

    fn route(&self, balances: &BalanceResult) -> Vec<Transfer> {
        let transfers = optimize_transfers_with(&balances.net_balances, &self.options);
        debug!(
            epsilon = %self.options.epsilon,
            transfers = transfers.len(),
            "Smart route proposed"
        );
        transfers
    }
}

fn flag_issues(result: &BalanceResult) {
    if result.has_issues() {
        warn!(
            issues = result.issues.len(),
            "Balances computed from a snapshot with data-quality issues"
        );
    }
}
