//! Property tests encoding the structural invariants from the design
//! doc's "Testable Properties" section: for any sequence of `set`,
//! `delete`, and `incr_by` calls, the dual-index structure must stay
//! consistent and the skip list must stay correctly ordered and spanned.

use proptest::prelude::*;
use sorted_set::SortedSet;

#[derive(Debug, Clone)]
enum Op {
    Set(i64, f64),
    Delete(i64),
    IncrBy(i64, f64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let key = 0i64..40;
    let score = -50.0f64..50.0;
    prop_oneof![
        (key.clone(), score.clone()).prop_map(|(k, s)| Op::Set(k, s)),
        key.clone().prop_map(Op::Delete),
        (key, score).prop_map(|(k, s)| Op::IncrBy(k, s)),
    ]
}

fn apply(set: &mut SortedSet<i64, ()>, op: &Op) {
    match *op {
        Op::Set(k, s) => {
            let _ = set.set(k, s, ());
        }
        Op::Delete(k) => {
            set.delete(&k);
        }
        Op::IncrBy(k, d) => {
            let _ = set.incr_by(k, d);
        }
    }
}

/// Collects the level-0 sequence via `range`, which is the crate's only
/// public full traversal and therefore what "iterating level-0" means
/// from outside the skip list module.
fn level0_sequence(set: &SortedSet<i64, ()>) -> Vec<(f64, i64)> {
    let mut out = Vec::new();
    set.range(0, -1, |score, key, _| out.push((score, *key)));
    out
}

proptest! {
    #[test]
    fn invariant_1_length_matches_traversal_count(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut set = SortedSet::new();
        for op in &ops {
            apply(&mut set, op);
        }
        prop_assert_eq!(level0_sequence(&set).len(), set.len());
    }

    #[test]
    fn invariant_2_level0_is_strictly_increasing(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut set = SortedSet::new();
        for op in &ops {
            apply(&mut set, op);
        }
        let seq = level0_sequence(&set);
        for w in seq.windows(2) {
            prop_assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn invariant_6_rank_and_data_by_rank_round_trip(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut set = SortedSet::new();
        for op in &ops {
            apply(&mut set, op);
        }
        let seq = level0_sequence(&set);
        for (_, key) in &seq {
            let r = set.rank(key, false);
            prop_assert!(r.rank >= 0);
            let by_rank = set.data_by_rank(r.rank, false).unwrap();
            prop_assert_eq!(*by_rank.key, *key);
        }
    }

    #[test]
    fn invariant_7_setting_same_score_twice_preserves_rank(
        ops in prop::collection::vec(op_strategy(), 0..100),
        key in 0i64..40,
        score in -50.0f64..50.0,
    ) {
        let mut set = SortedSet::new();
        for op in &ops {
            apply(&mut set, op);
        }
        set.set(key, score, ()).unwrap();
        let before = set.rank(&key, false).rank;
        set.set(key, score, ()).unwrap();
        let after = set.rank(&key, false).rank;
        prop_assert_eq!(before, after);
    }

    #[test]
    fn invariant_8_set_then_delete_restores_length(
        ops in prop::collection::vec(op_strategy(), 0..100),
        key in 1000i64..1040,
        score in -50.0f64..50.0,
    ) {
        let mut set = SortedSet::new();
        for op in &ops {
            apply(&mut set, op);
        }
        let before = set.len();
        let was_present = set.contains(&key);
        set.set(key, score, ()).unwrap();
        prop_assert!(set.delete(&key));
        let expected = if was_present { before - 1 } else { before };
        prop_assert_eq!(set.len(), expected);
        prop_assert_eq!(set.contains(&key), false);
    }

    #[test]
    fn round_trip_get_score_equals_data_by_rank_score(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut set = SortedSet::new();
        for op in &ops {
            apply(&mut set, op);
        }
        let seq = level0_sequence(&set);
        for (_, key) in &seq {
            let score = set.get_score(key).unwrap();
            let r = set.rank(key, false).rank;
            let by_rank_score = set.data_by_rank(r, false).unwrap().score;
            prop_assert_eq!(score, by_rank_score);
        }
    }

    #[test]
    fn rev_range_mirrors_range_reversed(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut set = SortedSet::new();
        for op in &ops {
            apply(&mut set, op);
        }
        let len = set.len() as i64;
        if len >= 2 {
            let i = 0i64;
            let j = (len - 1).min(3);

            let mut forward = Vec::new();
            set.range(len - 1 - j, len - 1 - i, |_, key, _| forward.push(*key));
            forward.reverse();

            let mut reverse = Vec::new();
            set.rev_range(i, j, |_, key, _| reverse.push(*key));

            prop_assert_eq!(forward, reverse);
        }
    }
}
