mod common;

use common::*;
use proptest::prelude::*;
use staking_core::{Address, SignedAmount, ZERO_ADDRESS};
use staking_mapping::{audit, query, Indexer};
use staking_storage::MemoryEntityStore;

#[derive(Debug, Clone)]
enum Op {
    Stake(u8, u32),
    Withdraw(u8, u32),
    Transfer(u8, u8, u32),
}

fn holder(i: u8) -> Address {
    // Index 0 is the mint/burn address.
    if i == 0 {
        ZERO_ADDRESS
    } else {
        Address::repeat_byte(i)
    }
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u8..5, 1u32..1_000).prop_map(|(u, a)| Op::Stake(u, a)),
        (1u8..5, 1u32..1_000).prop_map(|(u, a)| Op::Withdraw(u, a)),
        // A zero-to-zero transfer would count as a mint without moving any balance.
        (0u8..5, 0u8..5, 1u32..1_000)
            .prop_filter("not zero to zero", |(f, t, _)| *f != 0 || *t != 0)
            .prop_map(|(f, t, a)| Op::Transfer(f, t, a)),
    ]
}

proptest! {
    #[test]
    fn totals_match_user_sums(ops in prop::collection::vec(op(), 1..40)) {
        let store = MemoryEntityStore::new();
        let indexer = Indexer::new(&store, CountingTokenSource::default());
        let mut log = EventLog::new();

        for (i, op) in ops.iter().enumerate() {
            let at = 100 + i as u64;
            let event = match *op {
                Op::Stake(u, a) => staked(holder(u), a.into()),
                Op::Withdraw(u, a) => withdrawn(holder(u), a.into()),
                Op::Transfer(f, t, a) => transfer(holder(f), holder(t), a.into()),
            };
            indexer.apply(&log.next(at, event)).unwrap();
        }

        let report = audit(&store).unwrap();
        prop_assert!(report.total_staked_matches(), "{report:?}");

        // Tokens are conserved: every balance, the zero address included, sums to zero.
        let mut balances = SignedAmount::ZERO;
        for u in query::all::<staking_core::User, _>(&store).unwrap() {
            balances = balances.checked_add(u.token_balance()).unwrap();
        }
        prop_assert!(balances.is_zero());

        // Supply equals what the zero address has handed out.
        let supply = query::global_stats(&store)
            .unwrap()
            .map(|s| s.total_token_supply())
            .unwrap_or_default();
        let zero_balance = query::user(&store, &ZERO_ADDRESS)
            .unwrap()
            .map(|u| u.token_balance())
            .unwrap_or_default();
        prop_assert_eq!(supply.checked_add(zero_balance).unwrap(), SignedAmount::ZERO);
    }

    #[test]
    fn stake_timestamp_tracks_positive_stake(amounts in prop::collection::vec(1u32..50, 1..20)) {
        let store = MemoryEntityStore::new();
        let indexer = Indexer::new(&store, CountingTokenSource::default());
        let alice = Address::repeat_byte(0xaa);
        let mut log = EventLog::new();

        let mut at = 1;
        for a in &amounts {
            indexer.apply(&log.next(at, staked(alice, (*a).into()))).unwrap();
            at += 1;
        }
        for a in &amounts {
            indexer.apply(&log.next(at, withdrawn(alice, (*a).into()))).unwrap();
            at += 1;
            let report = audit(&store).unwrap();
            prop_assert!(report.is_consistent(), "{report:?}");
        }
        let u = query::user(&store, &alice).unwrap().unwrap();
        prop_assert!(u.staked_amount().is_zero());
        prop_assert_eq!(u.staked_at(), None);
    }
}
