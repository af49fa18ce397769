//! E2E Test Suite: full out-of-order ingest path.
//!
//! Exercises the kernels the way the host runtime chains them when a batch
//! of late rows lands in a sorted partition:
//!
//! 1. build an index over the out-of-order timestamps and sort it;
//! 2. pair it with the in-order partition's index and k-way merge;
//! 3. gather every fixed-width column through the merge index;
//! 4. merge-copy the variable-width columns;
//! 5. project the merged timestamps and binary-search the append boundary.
//!
//! Timestamps are chosen so the two sources never collide (data = even,
//! ooo = odd), which makes the merged order fully deterministic even though
//! neither the sort nor the merge is stable.

use tsmerge::index::IndexRecord;
use tsmerge::synth::{build_str_column, SeriesRng};
use tsmerge::{
    binary_search, copy_index_timestamps, flatten_index, k_way_merge, merge_copy_str_column,
    merge_shuffle, merge_timestamp_indexes, reshuffle, sort_timestamp_index, RowRef, ScanDir,
};

const DATA_ROWS: usize = 900;
const OOO_ROWS: usize = 300;

/// In-order partition: even timestamps, tagged references (first source).
fn data_index() -> Vec<IndexRecord> {
    (0..DATA_ROWS)
        .map(|i| IndexRecord::new(2 * i as u64 + 1000, RowRef::tagged(i as u64).raw()))
        .collect()
}

/// Late batch: odd timestamps in shuffled arrival order, untagged references.
fn ooo_index() -> Vec<IndexRecord> {
    let mut rng = SeriesRng::new(0x5eed);
    let mut rows: Vec<u64> = (0..OOO_ROWS as u64).collect();
    // Fisher–Yates with the fixture rng, so arrival order is scrambled but
    // reproducible.
    for i in (1..rows.len()).rev() {
        let j = rng.below(i as u64 + 1) as usize;
        rows.swap(i, j);
    }
    rows.iter()
        .map(|&row| IndexRecord::new(2 * row + 1001, RowRef::untagged(row).raw()))
        .collect()
}

#[test]
fn full_ingest_pipeline() {
    // ── Stage 1: sort the late batch ─────────────────────────────────────────
    let mut ooo = ooo_index();
    sort_timestamp_index(&mut ooo);
    assert!(ooo.windows(2).all(|w| w[0].ts <= w[1].ts));

    // ── Stage 2: merge with the in-order partition ───────────────────────────
    let data = data_index();
    let merged = merge_timestamp_indexes(&[&data, &ooo]).expect("two runs");
    assert_eq!(merged.len(), DATA_ROWS + OOO_ROWS);
    assert!(merged.windows(2).all(|w| w[0].ts <= w[1].ts));

    // ── Stage 3: fixed-width columns follow the merge index ──────────────────
    let data_col: Vec<i64> = (0..DATA_ROWS as i64).map(|v| v * 10).collect();
    let ooo_col: Vec<i64> = (0..OOO_ROWS as i64).map(|v| v * 10 + 5).collect();
    let mut merged_col = vec![0i64; merged.len()];
    merge_shuffle(&data_col, &ooo_col, &mut merged_col, &merged);

    for (rec, &value) in merged.iter().zip(&merged_col) {
        let r = RowRef::from_raw(rec.i);
        let expect = if r.is_tagged() {
            data_col[r.row() as usize]
        } else {
            ooo_col[r.row() as usize]
        };
        assert_eq!(value, expect);
        // Timestamp parity encodes the source; cross-check the selector.
        assert_eq!(rec.ts % 2 == 0, r.is_tagged());
    }

    // ── Stage 4: string column follows the merge index ───────────────────────
    let data_strs: Vec<Option<String>> = (0..DATA_ROWS)
        .map(|i| if i % 7 == 0 { None } else { Some(format!("d{i}")) })
        .collect();
    let ooo_strs: Vec<Option<String>> =
        (0..OOO_ROWS).map(|i| Some(format!("o{i}"))).collect();
    let data_refs: Vec<Option<&str>> = data_strs.iter().map(|s| s.as_deref()).collect();
    let ooo_refs: Vec<Option<&str>> = ooo_strs.iter().map(|s| s.as_deref()).collect();
    let (data_fix, data_var) = build_str_column(&data_refs);
    let (ooo_fix, ooo_var) = build_str_column(&ooo_refs);

    let expected_values: Vec<Option<&str>> = merged
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
    let (expect_fix, expect_var) = build_str_column(&expected_values);

    let mut dst_fix = vec![0i64; merged.len()];
    let mut dst_var = vec![0u8; expect_var.len()];
    let end = merge_copy_str_column(
        &merged, &data_fix, &data_var, &ooo_fix, &ooo_var, &mut dst_fix, &mut dst_var, 0,
    );
    assert_eq!(end as usize, expect_var.len());
    assert_eq!(dst_fix, expect_fix);
    assert_eq!(dst_var, expect_var);

    // ── Stage 5: project timestamps and locate the append boundary ───────────
    let mut merged_ts = vec![0i64; merged.len()];
    copy_index_timestamps(&merged, &mut merged_ts);
    assert!(merged_ts.windows(2).all(|w| w[0] <= w[1]));

    let high = merged_ts.len() as i64 - 1;
    let probe = merged_ts[600];
    let hit = binary_search(&merged_ts, probe, 0, high, ScanDir::Up);
    assert_eq!(merged_ts[hit as usize], probe);
    // Probes outside the partition resolve to the documented boundaries.
    assert_eq!(binary_search(&merged_ts, 0, 0, high, ScanDir::Up), -1);
    assert_eq!(binary_search(&merged_ts, i64::MAX, 0, high, ScanDir::Up), high);
}

#[test]
fn sort_flatten_reshuffle_round() {
    // A partition rewrite: sort a scrambled index, flatten it, then pull
    // every column into sorted order.
    let mut rng = SeriesRng::new(0xabcdef);
    let n = 2048;
    let ts: Vec<u64> = (0..n).map(|_| rng.below(1 << 40)).collect();
    let mut index: Vec<IndexRecord> = ts
        .iter()
        .enumerate()
        .map(|(i, &t)| IndexRecord::new(t, i as u64))
        .collect();
    sort_timestamp_index(&mut index);

    // Column values equal their original timestamps, so after the gather the
    // column must be the sorted timestamp sequence.
    let column: Vec<u64> = ts.clone();
    let mut gathered = vec![0u64; n];
    reshuffle(&column, &mut gathered, &index);
    let mut expect = ts;
    expect.sort_unstable();
    assert_eq!(gathered, expect);

    // Flatten, then reshuffle the gathered column by position: identity.
    flatten_index(&mut index);
    let mut again = vec![0u64; n];
    reshuffle(&gathered, &mut again, &index);
    assert_eq!(again, gathered);
}

#[test]
fn single_run_merge_borrows_without_copy() {
    let data = data_index();
    let merged = merge_timestamp_indexes(&[&data]).expect("one run");
    assert_eq!(merged.as_ptr(), data.as_ptr());
    assert!(merge_timestamp_indexes(&[]).is_none());
}

#[test]
fn merge_into_caller_buffer_matches_owning_wrapper() {
    let mut ooo = ooo_index();
    sort_timestamp_index(&mut ooo);
    let data = data_index();

    let owned = merge_timestamp_indexes(&[&data, &ooo]).unwrap();
    let mut dest = vec![IndexRecord::default(); data.len() + ooo.len()];
    k_way_merge(&[&data, &ooo], &mut dest);
    assert_eq!(owned.as_ref(), dest.as_slice());
}
