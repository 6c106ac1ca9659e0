//! # Visibility Filter
//!
//! A private entry counts only for the member who created it. The filter is
//! applied before aggregation and never inside it, so the aggregator stays
//! usable for audit views that must see everything.

use crate::types::{LedgerEntry, MemberId};

/// True when `viewer_id` may include `entry` in their aggregation.
#[inline]
pub fn is_visible(entry: &LedgerEntry, viewer_id: &MemberId) -> bool {
    !entry.is_private || entry.created_by == *viewer_id
}

/// The entries `viewer_id` may see, in input order.
pub fn visible_entries<'a>(
    entries: &'a [LedgerEntry],
    viewer_id: &'a MemberId,
) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
    entries.iter().filter(move |entry| is_visible(entry, viewer_id))
}

/// How many entries are hidden from `viewer_id`.
pub fn hidden_count(entries: &[LedgerEntry], viewer_id: &MemberId) -> usize {
    entries
        .iter()
        .filter(|entry| !is_visible(entry, viewer_id))
        .count()
}
