use std::collections::BTreeMap;

use avl_index::{DualIndex, IndexError, MembershipLedger, MergeSummary};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 1_000;

fn id_strategy() -> impl Strategy<Value = u32> {
    1u32..300u32
}

fn rank_strategy() -> impl Strategy<Value = i32> {
    0i32..50i32
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum IndexOp {
    Insert(u32, i32),
    Remove(u32),
    UpdateRank(u32, i32),
    FirstAtOrAbove(i32),
}

fn index_op_strategy() -> impl Strategy<Value = IndexOp> {
    prop_oneof![
        4 => (id_strategy(), rank_strategy()).prop_map(|(id, rank)| IndexOp::Insert(id, rank)),
        2 => id_strategy().prop_map(IndexOp::Remove),
        3 => (id_strategy(), rank_strategy()).prop_map(|(id, rank)| IndexOp::UpdateRank(id, rank)),
        2 => rank_strategy().prop_map(IndexOp::FirstAtOrAbove),
    ]
}

/// The id with the smallest rank not below `rank`, lowest id on ties.
fn model_first_at_or_above(model: &BTreeMap<u32, i32>, rank: i32) -> Option<u32> {
    model
        .iter()
        .filter(|&(_, &r)| r >= rank)
        .min_by_key(|&(&id, &r)| (r, id))
        .map(|(&id, _)| id)
}

fn index_of(ids: &[u32]) -> DualIndex<u32, i32> {
    let mut index = DualIndex::new();
    for &id in ids {
        assert_eq!(index.insert(id, 0), Ok(true));
    }
    index
}

// ─── Model checks ────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations against a BTreeMap model; both indexes must agree after
    /// every step.
    #[test]
    fn index_ops_match_btreemap(ops in proptest::collection::vec(index_op_strategy(), TEST_SIZE)) {
        let mut index: DualIndex<u32, i32> = DualIndex::new();
        let mut model: BTreeMap<u32, i32> = BTreeMap::new();

        for op in &ops {
            match *op {
                IndexOp::Insert(id, rank) => {
                    let expected = !model.contains_key(&id);
                    if expected {
                        model.insert(id, rank);
                    }
                    prop_assert_eq!(index.insert(id, rank), Ok(expected), "insert({}, {})", id, rank);
                }
                IndexOp::Remove(id) => {
                    prop_assert_eq!(index.remove(id), Ok(model.remove(&id)), "remove({})", id);
                }
                IndexOp::UpdateRank(id, rank) => {
                    let previous = model.get_mut(&id).map(|r| std::mem::replace(r, rank));
                    prop_assert_eq!(index.update_rank(id, rank), Ok(previous), "update_rank({}, {})", id, rank);
                }
                IndexOp::FirstAtOrAbove(rank) => {
                    let found = index.first_at_or_above(rank).map(|entry| entry.id);
                    prop_assert_eq!(found, model_first_at_or_above(&model, rank), "first_at_or_above({})", rank);
                }
            }
            prop_assert_eq!(index.len(), model.len());
            prop_assert_eq!(index.check_consistency(), Ok(()));
        }

        let by_id: Vec<(u32, i32)> = index.iter_by_id().map(|e| (e.id, e.rank)).collect();
        let expected: Vec<(u32, i32)> = model.into_iter().collect();
        prop_assert_eq!(by_id, expected);
    }

    /// Merging yields the union, counts duplicates, and empties the source.
    #[test]
    fn merge_is_union(
        a in proptest::collection::btree_set(id_strategy(), 0..100),
        b in proptest::collection::btree_set(id_strategy(), 0..100),
    ) {
        let a_ids: Vec<u32> = a.iter().copied().collect();
        let b_ids: Vec<u32> = b.iter().copied().collect();
        let mut target = index_of(&a_ids);
        let mut source = index_of(&b_ids);

        let summary = target.merge_from(&mut source, &mut ()).unwrap();

        let duplicates = a.intersection(&b).count();
        prop_assert_eq!(summary, MergeSummary { moved: b.len() - duplicates, duplicates });
        prop_assert!(source.is_empty());
        prop_assert!(target.iter_by_id().map(|e| e.id).eq(a.union(&b).copied()));
        prop_assert_eq!(target.check_consistency(), Ok(()));
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct Memberships {
    moved_in: Vec<u32>,
    moved_out: Vec<u32>,
}

impl MembershipLedger<u32> for Memberships {
    fn reserve(&mut self, _entity: u32) -> Result<(), IndexError> {
        self.moved_in.try_reserve(1)?;
        Ok(())
    }

    fn joined(&mut self, entity: u32) {
        self.moved_in.push(entity);
    }

    fn left(&mut self, entity: u32) {
        self.moved_out.push(entity);
    }
}

#[test]
fn merge_moves_only_missing_entities() {
    let mut a = index_of(&[1, 3, 5]);
    let mut b = index_of(&[3, 7]);
    let mut memberships = Memberships::default();

    let summary = a.merge_from(&mut b, &mut memberships).unwrap();

    assert_eq!(summary, MergeSummary { moved: 1, duplicates: 1 });
    assert_eq!(a.iter_by_id().map(|e| e.id).collect::<Vec<_>>(), [1, 3, 5, 7]);
    assert!(b.is_empty());
    assert_eq!(memberships.moved_in, [7]);
    assert_eq!(memberships.moved_out, [3, 7]);
}

#[test]
fn ties_resolve_to_lowest_id() {
    let mut index = DualIndex::new();
    for id in [9, 4, 6] {
        index.insert(id, 10).unwrap();
    }
    index.insert(1, 3).unwrap();

    assert_eq!(index.first_at_or_above(4).map(|e| e.id), Some(4));
    assert_eq!(index.first_at_or_above(3).map(|e| e.id), Some(1));
    assert_eq!(index.first_at_or_above(11), None);

    index.update_rank(4, 11).unwrap();
    assert_eq!(index.first_at_or_above(4).map(|e| e.id), Some(6));
    assert_eq!(index.first_at_or_above(11).map(|e| e.id), Some(4));
}

#[test]
fn clone_is_independent() {
    let original = index_of(&[1, 2]);
    let mut copy = original.clone();
    copy.remove(1).unwrap();
    copy.update_rank(2, 5).unwrap();

    assert_eq!(original.len(), 2);
    assert_eq!(original.rank_of(2), Some(0));
    assert_eq!(copy.rank_of(2), Some(5));
}
