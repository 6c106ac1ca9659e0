//! Invariants of the balance calculator and the settlement optimizer,
//! checked over generated trips.

use chrono::Utc;
use proptest::prelude::*;

use tripledger_core::money::UNITS_PER_MINOR;
use tripledger_core::settlement::{apply_transfers, round_balances};
use tripledger_core::{
    compute_balances, compute_global_balances, optimize_transfers, optimize_transfers_with,
    LedgerEntry, Member, MemberId, Money, SettlementOptions, Transfer, DEFAULT_DISPLAY_EPSILON,
};

// =============================================================================
// Generators
// =============================================================================

fn member_id(i: usize) -> MemberId {
    MemberId::new(format!("m{}", i))
}

fn roster(n: usize) -> Vec<Member> {
    (0..n)
        .map(|i| Member::new(member_id(i), format!("Member {}", i)))
        .collect()
}

fn expense(n: usize) -> BoxedStrategy<LedgerEntry> {
    (
        0i64..200_000,
        0..n,
        proptest::sample::subsequence((0..n).collect::<Vec<_>>(), 0..=n),
        proptest::option::of((0..n, 0i64..=100)),
        any::<bool>(),
        0..n,
    )
        .prop_map(|(cost, payer, participants, share, private, creator)| {
            let cost = Money::from_minor(cost);
            let mut entry = LedgerEntry::expense(
                "",
                cost,
                member_id(payer),
                participants.into_iter().map(member_id),
                member_id(creator),
            );
            if let Some((member, percent)) = share {
                let amount = Money::from_units(cost.units() * percent / 100);
                entry = entry.with_override(member_id(member), amount);
            }
            entry.is_private = private;
            entry
        })
        .boxed()
}

fn settlement(n: usize) -> BoxedStrategy<LedgerEntry> {
    (1i64..100_000, 0..n, 0..n, 0..n)
        .prop_map(|(amount, from, to, creator)| {
            LedgerEntry::settlement(
                "",
                Money::from_minor(amount),
                member_id(from),
                member_id(to),
                member_id(creator),
            )
        })
        .boxed()
}

/// A roster of 2 to 6 members and up to 24 entries with unique ids.
fn trip() -> impl Strategy<Value = (Vec<Member>, Vec<LedgerEntry>)> {
    (2usize..=6).prop_flat_map(|n| {
        let entry = prop_oneof![3 => expense(n), 1 => settlement(n)];
        (Just(roster(n)), proptest::collection::vec(entry, 0..24)).prop_map(
            |(members, mut entries)| {
                for (i, entry) in entries.iter_mut().enumerate() {
                    entry.id = format!("e{}", i);
                }
                (members, entries)
            },
        )
    })
}

/// Records every proposed transfer as a settlement entry, as the trip-edit
/// path would once the money has moved.
fn record(transfers: &[Transfer]) -> Vec<LedgerEntry> {
    let now = Utc::now();
    transfers
        .iter()
        .map(|t| t.to_settlement_entry(&t.from, now))
        .collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn net_balances_always_sum_to_zero((members, entries) in trip()) {
        let global = compute_global_balances(&entries, &members);
        prop_assert_eq!(global.total_net(), Money::zero());
        prop_assert!(global.issues.iter().all(|i| !matches!(i, tripledger_core::DataIssue::InvalidEntry { .. })), "no InvalidEntry issues expected");

        for member in &members {
            let view = compute_balances(&entries, &members, &member.id).unwrap();
            prop_assert_eq!(view.total_net(), Money::zero());
        }
    }

    #[test]
    fn executing_the_plan_settles_everyone((members, entries) in trip()) {
        let before = compute_global_balances(&entries, &members);
        let transfers = optimize_transfers(&before.net_balances);

        let mut settled = entries.clone();
        settled.extend(record(&transfers));
        let after = compute_global_balances(&settled, &members);

        for (member, balance) in &after.net_balances {
            prop_assert!(
                balance.is_within(DEFAULT_DISPLAY_EPSILON),
                "{} left with {:.4}", member, balance
            );
        }
        prop_assert_eq!(after.net_balances, apply_transfers(&before.net_balances, &transfers));
    }

    #[test]
    fn transfer_count_is_bounded((members, entries) in trip()) {
        let net = compute_global_balances(&entries, &members).net_balances;
        let options = SettlementOptions::default();
        let transfers = optimize_transfers_with(&net, &options);

        let rounded = round_balances(&net);
        let debtors = rounded.iter().filter(|(_, b)| b.less_than(-options.epsilon)).count();
        let creditors = rounded.iter().filter(|(_, b)| b.greater_than(options.epsilon)).count();

        prop_assert!(transfers.len() <= (debtors + creditors).saturating_sub(1));
        for transfer in &transfers {
            prop_assert!(transfer.amount.is_positive());
            prop_assert_eq!(transfer.amount.units() % UNITS_PER_MINOR, 0);
            prop_assert_ne!(&transfer.from, &transfer.to);
        }
    }

    #[test]
    fn private_entries_of_others_change_nothing(
        (members, entries) in trip(),
        cost in 1i64..50_000,
    ) {
        let viewer = member_id(1);
        let before = compute_balances(&entries, &members, &viewer).unwrap();

        let mut with_private = entries.clone();
        with_private.push(
            LedgerEntry::expense("secret", Money::from_minor(cost), member_id(0), [member_id(0), member_id(1)], member_id(0))
                .private(),
        );
        let after = compute_balances(&with_private, &members, &viewer).unwrap();

        prop_assert_eq!(before, after);
    }

    #[test]
    fn result_ignores_entry_order((members, entries) in trip()) {
        let viewer = member_id(0);
        let forward = compute_balances(&entries, &members, &viewer).unwrap();
        let again = compute_balances(&entries, &members, &viewer).unwrap();

        let mut rotated = entries.clone();
        rotated.reverse();
        if !rotated.is_empty() {
            let k = rotated.len() / 2;
            rotated.rotate_left(k);
        }
        let shuffled = compute_balances(&rotated, &members, &viewer).unwrap();

        prop_assert_eq!(&forward, &again);
        prop_assert_eq!(&forward, &shuffled);
    }
}

// =============================================================================
// Worked Scenarios
// =============================================================================

fn abc() -> Vec<Member> {
    vec![
        Member::new("A", "Ana"),
        Member::new("B", "Ben"),
        Member::new("C", "Cy"),
    ]
}

#[test]
fn dinner_for_three_paid_by_a() {
    let entries = [LedgerEntry::expense(
        "entry1",
        "90.00".parse().unwrap(),
        "A",
        ["A", "B", "C"],
        "A",
    )];
    let result = compute_balances(&entries, &abc(), &MemberId::from("A")).unwrap();

    assert_eq!(result.net_of("A"), Money::from_minor(6000));
    assert_eq!(result.net_of("B"), Money::from_minor(-3000));
    assert_eq!(result.net_of("C"), Money::from_minor(-3000));

    let mut transfers = optimize_transfers(&result.net_balances);
    transfers.sort_by(|a, b| a.from.cmp(&b.from));
    assert_eq!(
        transfers,
        vec![
            Transfer::new("B", "A", Money::from_minor(3000)),
            Transfer::new("C", "A", Money::from_minor(3000)),
        ]
    );
}

#[test]
fn equal_split_of_thirty() {
    let entries = [LedgerEntry::expense("e", Money::from_minor(3000), "A", ["A", "B", "C"], "A")];
    let result = compute_global_balances(&entries, &abc());

    let shares = tripledger_core::split_shares(&entries[0]).unwrap();
    for (_, share) in &shares.shares {
        assert_eq!(*share, Money::from_minor(1000));
    }
    assert_eq!(result.net_of("A"), Money::from_minor(2000));
}

#[test]
fn override_leaves_payer_the_remainder() {
    let entries = [LedgerEntry::expense("e", Money::from_minor(10000), "A", ["A", "B"], "A")
        .with_override("B", Money::from_minor(8000))];
    let result = compute_balances(&entries, &abc(), &MemberId::from("A")).unwrap();

    assert_eq!(result.net_of("A"), Money::from_minor(8000));
    assert_eq!(result.net_of("B"), Money::from_minor(-8000));
    assert_eq!(result.spent_total, Money::from_minor(2000));
}

#[test]
fn privacy_isolation_for_another_viewer() {
    let entries = [LedgerEntry::expense("e", Money::from_minor(5000), "A", ["A", "B"], "A").private()];

    let for_b = compute_balances(&entries, &abc(), &MemberId::from("B")).unwrap();
    assert!(for_b.net_balances.values().all(Money::is_zero));
    assert!(for_b.pairwise.is_empty());
    assert_eq!(for_b.spent_total, Money::zero());

    let for_a = compute_balances(&entries, &abc(), &MemberId::from("A")).unwrap();
    assert_eq!(for_a.net_of("B"), Money::from_minor(-2500));
}
