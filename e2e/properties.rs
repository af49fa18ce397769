//! E2E Test Suite: property-based kernel invariants.
//!
//! Each property mirrors one of the contracts the host runtime depends on:
//! sort order + multiset preservation, quick/radix agreement, merge
//! correctness over arbitrary run shapes, selector round-trips, var-column
//! reconstruction, and binary-search boundaries.

use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

use tsmerge::index::IndexRecord;
use tsmerge::sort::{quick_sort, radix_sort};
use tsmerge::synth::build_str_column;
use tsmerge::{
    binary_search, flatten_index, k_way_merge, merge_copy_str_column, merge_shuffle, reshuffle,
    sort_timestamp_index, RowRef, ScanDir,
};

fn to_index(ts: Vec<u64>) -> Vec<IndexRecord> {
    ts.into_iter()
        .enumerate()
        .map(|(i, t)| IndexRecord::new(t, i as u64))
        .collect()
}

fn is_sorted(index: &[IndexRecord]) -> bool {
    index.windows(2).all(|w| w[0].ts <= w[1].ts)
}

fn multiset(index: &[IndexRecord]) -> Vec<(u64, u64)> {
    let mut pairs: Vec<(u64, u64)> = index.iter().map(|r| (r.ts, r.i)).collect();
    pairs.sort_unstable();
    pairs
}

proptest! {
    // Sort: output non-decreasing under unsigned comparison, records
    // preserved as a multiset.
    #[test]
    fn sort_orders_and_preserves(ts in vec(any::<u64>(), 0..2000)) {
        let mut index = to_index(ts);
        let before = multiset(&index);
        sort_timestamp_index(&mut index);
        prop_assert!(is_sorted(&index));
        prop_assert_eq!(multiset(&index), before);
    }

    // Both sort kernels agree on the timestamp sequence for any input,
    // including sizes that cross the dispatch threshold.
    #[test]
    fn quick_and_radix_agree(ts in vec(any::<u64>(), 0..1500)) {
        let mut a = to_index(ts.clone());
        let mut b = to_index(ts);
        quick_sort(&mut a);
        radix_sort(&mut b);
        let ts_a: Vec<u64> = a.iter().map(|r| r.ts).collect();
        let ts_b: Vec<u64> = b.iter().map(|r| r.ts).collect();
        prop_assert_eq!(ts_a, ts_b);
        prop_assert_eq!(multiset(&a), multiset(&b));
    }

    // K-way merge: length, order, and multiset of the union. u64::MAX is
    // excluded (reserved as the exhaustion sentinel).
    #[test]
    fn merge_is_sorted_union(runs_ts in vec(vec(any::<u64>(), 0..120), 0..6)) {
        let runs_data: Vec<Vec<IndexRecord>> = runs_ts
            .into_iter()
            .map(|mut ts| {
                for t in ts.iter_mut() {
                    *t = *t % (u64::MAX - 1);
                }
                let mut run = to_index(ts);
                sort_timestamp_index(&mut run);
                run
            })
            .collect();
        let runs: Vec<&[IndexRecord]> = runs_data.iter().map(|r| r.as_slice()).collect();
        let total: usize = runs.iter().map(|r| r.len()).sum();
        let mut dest = vec![IndexRecord::default(); total];
        k_way_merge(&runs, &mut dest);

        prop_assert!(is_sorted(&dest));
        let mut expect: Vec<(u64, u64)> = runs_data
            .iter()
            .flat_map(|r| r.iter().map(|rec| (rec.ts, rec.i)))
            .collect();
        expect.sort_unstable();
        prop_assert_eq!(multiset(&dest), expect);
    }

    // Selector round-trip: the byte gathered for each output row matches the
    // source named by the reference's own selector bit.
    #[test]
    fn merge_selector_round_trip(
        src1 in vec(any::<i64>(), 1..60),
        src2 in vec(any::<i64>(), 1..60),
        picks in vec((any::<bool>(), any::<u64>()), 0..200),
    ) {
        let index: Vec<IndexRecord> = picks
            .iter()
            .map(|&(tagged, row)| {
                let r = if tagged {
                    RowRef::tagged(row % src1.len() as u64)
                } else {
                    RowRef::untagged(row % src2.len() as u64)
                };
                IndexRecord::new(0, r.raw())
            })
            .collect();
        let mut dest = vec![0i64; index.len()];
        merge_shuffle(&src1, &src2, &mut dest, &index);
        for (rec, &value) in index.iter().zip(&dest) {
            let r = RowRef::from_raw(rec.i);
            let expect = if r.is_tagged() {
                src1[r.row() as usize]
            } else {
                src2[r.row() as usize]
            };
            prop_assert_eq!(value, expect);
        }
    }

    // Flatten + reshuffle is the identity on any column.
    #[test]
    fn flatten_reshuffle_identity(column in vec(any::<u32>(), 0..500)) {
        let mut index: Vec<IndexRecord> =
            column.iter().map(|&v| IndexRecord::new(v as u64, 7777)).collect();
        flatten_index(&mut index);
        let mut dest = vec![0u32; column.len()];
        reshuffle(&column, &mut dest, &index);
        prop_assert_eq!(dest, column);
    }

    // Var-column merge-copy reproduces exactly the records the index
    // selects, nulls included.
    #[test]
    fn str_merge_copy_reconstructs_selection(
        data_vals in vec(option::of("[a-z]{0,6}"), 1..20),
        ooo_vals in vec(option::of("[a-z]{0,6}"), 1..20),
        picks in vec((any::<bool>(), any::<u64>()), 1..60),
    ) {
        let data_refs: Vec<Option<&str>> = data_vals.iter().map(|s| s.as_deref()).collect();
        let ooo_refs: Vec<Option<&str>> = ooo_vals.iter().map(|s| s.as_deref()).collect();
        let (data_fix, data_var) = build_str_column(&data_refs);
        let (ooo_fix, ooo_var) = build_str_column(&ooo_refs);

        let index: Vec<IndexRecord> = picks
            .iter()
            .map(|&(tagged, row)| {
                let r = if tagged {
                    RowRef::tagged(row % data_refs.len() as u64)
                } else {
                    RowRef::untagged(row % ooo_refs.len() as u64)
                };
                IndexRecord::new(0, r.raw())
            })
            .collect();
        let selection: Vec<Option<&str>> = index
            .iter()
            .map(|rec| {
                let r = RowRef::from_raw(rec.i);
                if r.is_tagged() {
                    data_refs[r.row() as usize]
                } else {
                    ooo_refs[r.row() as usize]
                }
            })
            .collect();
        let (expect_fix, expect_var) = build_str_column(&selection);

        let mut dst_fix = vec![0i64; index.len()];
        let mut dst_var = vec![0u8; expect_var.len()];
        let end = merge_copy_str_column(
            &index, &data_fix, &data_var, &ooo_fix, &ooo_var, &mut dst_fix, &mut dst_var, 0,
        );
        prop_assert_eq!(end as usize, expect_var.len());
        prop_assert_eq!(dst_fix, expect_fix);
        prop_assert_eq!(dst_var, expect_var);
    }

    // Binary search on a strictly increasing array: unique hit for present
    // values, insertion point minus one otherwise.
    #[test]
    fn binary_search_boundaries(seeds in vec(1u64..1000, 1..200), probe in any::<u64>()) {
        // Strictly increasing by construction (cumulative positive steps).
        let mut data: Vec<i64> = Vec::with_capacity(seeds.len());
        let mut acc = 0i64;
        for s in &seeds {
            acc += *s as i64;
            data.push(acc);
        }
        let high = data.len() as i64 - 1;

        for (i, &v) in data.iter().enumerate() {
            prop_assert_eq!(binary_search(&data, v, 0, high, ScanDir::Up), i as i64);
            prop_assert_eq!(binary_search(&data, v, 0, high, ScanDir::Down), i as i64);
        }

        let probe = (probe % (acc as u64 + 2)) as i64;
        let pos = binary_search(&data, probe, 0, high, ScanDir::Up);
        match data.binary_search(&probe) {
            Ok(i) => prop_assert_eq!(pos, i as i64),
            // Insertion point minus one, i.e. the index of the last element
            // below the probe (-1 when all elements are above it).
            Err(i) => prop_assert_eq!(pos, i as i64 - 1),
        }
    }
}
