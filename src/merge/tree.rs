//! Tournament-tree k-way merge of pre-sorted timestamp-index runs.
//!
//! Equivalent to the native `k_way_merge_long_index`. The tree is implicit
//! in an array of `2 * size` nodes (`size` = run count padded to a power of
//! two); leaves occupy `[size, 2 * size)` and each node carries the current
//! head timestamp of the run that won its subtree plus the leaf it came
//! from. Exhausted and padding leaves sit at [`SENTINEL`], the unsigned
//! maximum, so they lose every comparison until only sentinels remain.
//!
//! Comparisons are strict (`<`) with ties resolved toward the sibling node,
//! which means emission order among equal timestamps depends on tree
//! position, not input order; the merge is not stable.
//!
//! For typical fan-ins the nodes and cursors stay inline on the stack; large
//! `count` spills them to the heap rather than growing the frame.

use smallvec::SmallVec;

use crate::index::IndexRecord;
use crate::mem::prefetch_nta;

/// Leaf value for exhausted or absent runs.
pub(crate) const SENTINEL: u64 = u64::MAX;

#[derive(Clone, Copy)]
struct Node {
    /// Head timestamp of the winning run below this node.
    value: u64,
    /// Leaf index the value originated from.
    leaf: u32,
}

struct Cursor<'a> {
    run: &'a [IndexRecord],
    pos: usize,
}

/// Merge `runs` (each sorted ascending by `ts`, unsigned) into `dest`.
///
/// Empty runs are permitted and contribute nothing. The output is the sorted
/// union of the inputs; records are copied verbatim, tags included.
///
/// The timestamp `u64::MAX` is reserved as the exhaustion sentinel and must
/// not appear in input records.
///
/// # Panics
/// If `dest.len()` differs from the total input length.
pub fn k_way_merge(runs: &[&[IndexRecord]], dest: &mut [IndexRecord]) {
    let count = runs.len();
    let total: usize = runs.iter().map(|r| r.len()).sum();
    assert_eq!(dest.len(), total, "destination length mismatch");
    if count == 0 {
        return;
    }
    if count == 1 {
        dest.copy_from_slice(runs[0]);
        return;
    }

    let size = count.next_power_of_two();

    let mut cursors: SmallVec<[Cursor; 16]> = SmallVec::with_capacity(size);
    for run in runs {
        cursors.push(Cursor { run, pos: 0 });
    }
    // Pad to the power of two with sentinel slots.
    for _ in count..size {
        cursors.push(Cursor { run: &[], pos: 0 });
    }

    // Seed the leaves with each run's head timestamp.
    let mut tree: SmallVec<[Node; 32]> =
        SmallVec::from_elem(Node { value: SENTINEL, leaf: 0 }, 2 * size);
    for (i, cur) in cursors.iter().enumerate() {
        tree[size + i] = Node {
            value: cur.run.first().map_or(SENTINEL, |r| r.ts),
            leaf: (size + i) as u32,
        };
    }

    // Build the interior bottom-up, one sibling pair at a time.
    let mut i = 2 * size - 1;
    while i > 1 {
        let winner = if tree[i].value < tree[i - 1].value { i } else { i - 1 };
        tree[i / 2] = tree[winner];
        i -= 2;
    }

    let mut live = cursors[..count].iter().filter(|c| !c.run.is_empty()).count();
    let mut out = 0;
    while live > 0 {
        // The root always names a live leaf while `live > 0`: sentinels only
        // win once every real run is exhausted.
        let leaf = tree[1].leaf as usize;
        let cur = &mut cursors[leaf - size];
        dest[out] = cur.run[cur.pos];
        out += 1;

        cur.pos += 1;
        if cur.pos < cur.run.len() {
            tree[leaf].value = cur.run[cur.pos].ts;
        } else {
            tree[leaf].value = SENTINEL;
            live -= 1;
            if live == 0 {
                break;
            }
        }

        // Replay the path from the refreshed leaf up to the root.
        prefetch_nta(tree.as_ptr());
        let mut node = leaf;
        while node > 1 {
            let sibling = if node % 2 == 1 { node - 1 } else { node + 1 };
            let parent = node / 2;
            tree[parent] = if tree[node].value < tree[sibling].value {
                tree[node]
            } else {
                tree[sibling]
            };
            node = parent;
        }
    }
    debug_assert_eq!(out, dest.len());
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::RowRef;

    fn run(tss: &[u64], tag: bool) -> Vec<IndexRecord> {
        tss.iter()
            .enumerate()
            .map(|(i, &ts)| {
                let r = if tag {
                    RowRef::tagged(i as u64)
                } else {
                    RowRef::untagged(i as u64)
                };
                IndexRecord::new(ts, r.raw())
            })
            .collect()
    }

    fn merge(runs: &[&[IndexRecord]]) -> Vec<IndexRecord> {
        let total = runs.iter().map(|r| r.len()).sum();
        let mut dest = vec![IndexRecord::default(); total];
        k_way_merge(runs, &mut dest);
        dest
    }

    #[test]
    fn three_way_interleave() {
        let r1 = run(&[1, 4, 7], true);
        let r2 = run(&[2, 5, 8], false);
        let r3 = run(&[3, 6, 9], false);
        let out = merge(&[&r1, &r2, &r3]);
        let ts: Vec<u64> = out.iter().map(|r| r.ts).collect();
        assert_eq!(ts, (1..=9).collect::<Vec<u64>>());
        // Tags travel with the records.
        assert!(RowRef::from_raw(out[0].i).is_tagged()); // ts 1 came from r1
        assert!(!RowRef::from_raw(out[1].i).is_tagged()); // ts 2 came from r2
        assert_eq!(RowRef::from_raw(out[6].i).row(), 2); // ts 7 = r1[2]
    }

    #[test]
    fn non_power_of_two_run_count() {
        let r1 = run(&[10, 40], false);
        let r2 = run(&[20, 50], false);
        let r3 = run(&[30, 60], false);
        let out = merge(&[&r1, &r2, &r3]);
        let ts: Vec<u64> = out.iter().map(|r| r.ts).collect();
        assert_eq!(ts, vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn uneven_and_empty_runs() {
        let r1 = run(&[5], false);
        let r2 = run(&[], false);
        let r3 = run(&[1, 2, 3, 4, 6, 7], false);
        let out = merge(&[&r1, &r2, &r3]);
        let ts: Vec<u64> = out.iter().map(|r| r.ts).collect();
        assert_eq!(ts, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn all_runs_empty_emits_nothing() {
        let r1: Vec<IndexRecord> = Vec::new();
        let r2: Vec<IndexRecord> = Vec::new();
        let mut dest: Vec<IndexRecord> = Vec::new();
        k_way_merge(&[&r1, &r2], &mut dest);
        assert!(dest.is_empty());
    }

    #[test]
    fn single_run_copies_through() {
        let r1 = run(&[3, 5, 9], true);
        let out = merge(&[&r1]);
        assert_eq!(out, r1);
    }

    #[test]
    fn duplicate_timestamps_keep_multiset() {
        let r1 = run(&[1, 3, 3, 7], false);
        let r2 = run(&[3, 3, 5], false);
        let out = merge(&[&r1, &r2]);
        let ts: Vec<u64> = out.iter().map(|r| r.ts).collect();
        assert_eq!(ts, vec![1, 3, 3, 3, 3, 5, 7]);
    }

    #[test]
    fn near_sentinel_timestamps_merge_last() {
        // The largest representable timestamp is one below the sentinel.
        let r1 = run(&[1, SENTINEL - 1], false);
        let r2 = run(&[2], false);
        let out = merge(&[&r1, &r2]);
        let ts: Vec<u64> = out.iter().map(|r| r.ts).collect();
        assert_eq!(ts, vec![1, 2, SENTINEL - 1]);
    }

    #[test]
    fn large_fan_in_spills_cleanly() {
        // More runs than the inline cursor capacity.
        let runs_data: Vec<Vec<IndexRecord>> = (0..40u64)
            .map(|k| run(&[k, k + 100, k + 200], false))
            .collect();
        let runs: Vec<&[IndexRecord]> = runs_data.iter().map(|r| r.as_slice()).collect();
        let out = merge(&runs);
        assert_eq!(out.len(), 120);
        assert!(out.windows(2).all(|w| w[0].ts <= w[1].ts));
    }
}
