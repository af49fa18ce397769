//! Fixed-width column gathers driven by a timestamp index.
//!
//! | Rust function           | Native equivalent            |
//! |-------------------------|------------------------------|
//! | [`reshuffle`]           | `re_shuffle_internal<T>`     |
//! | [`merge_shuffle`]       | `merge_shuffle_internal<T>`  |
//! | [`merge_shuffle_top`]   | `merge_shuffle_internal_top` |
//!
//! The element type is semantic only; all three copy bit-for-bit and are
//! instantiated at the boundary for 8/16/32/64-bit payloads.
//!
//! Each kernel exists twice: a safe slice form whose bounds checks double as
//! the precondition checks of the contract, and a raw `_unchecked` form for
//! the foreign boundary, where source lengths are not transmitted and the
//! host vouches for row validity. Source and destination buffers must not
//! overlap in either form.

use crate::index::{IndexRecord, RowRef};
use crate::mem::prefetch_t0;

// ─────────────────────────────────────────────────────────────────────────────
// Sort-permutation gather
// ─────────────────────────────────────────────────────────────────────────────

/// Apply a sort permutation: `dest[i] = src[index[i].i]`.
///
/// `index` is expected to carry plain positions (after
/// [`crate::index::flatten_index`] or equivalent), not tagged references.
///
/// # Panics
/// If `dest.len() != index.len()` or any reference is out of range for
/// `src`.
pub fn reshuffle<T: Copy>(src: &[T], dest: &mut [T], index: &[IndexRecord]) {
    assert_eq!(dest.len(), index.len());
    for x in 0..index.len() {
        prefetch_t0(index.as_ptr().wrapping_add(x + 64));
        dest[x] = src[index[x].i as usize];
    }
}

/// Raw form of [`reshuffle`] for the foreign boundary.
///
/// # Safety
/// `index` and `dest` must be valid for `count` elements; every `index[x].i`
/// must be a valid row of the `src` allocation; buffers must not overlap.
pub unsafe fn reshuffle_unchecked<T: Copy>(
    src: *const T,
    dest: *mut T,
    index: *const IndexRecord,
    count: usize,
) {
    for x in 0..count {
        prefetch_t0(index.wrapping_add(x + 64));
        *dest.add(x) = *src.add((*index.add(x)).i as usize);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Two-source merge gathers
// ─────────────────────────────────────────────────────────────────────────────

/// Gather from two sources through a merge index: tagged references read
/// `src1`, untagged ones `src2`.
///
/// # Panics
/// If `dest.len() != index.len()` or any decoded row is out of range for its
/// source.
pub fn merge_shuffle<T: Copy>(src1: &[T], src2: &[T], dest: &mut [T], index: &[IndexRecord]) {
    assert_eq!(dest.len(), index.len());
    let sources = [src2, src1];
    for (slot, rec) in dest.iter_mut().zip(index) {
        let r = RowRef::from_raw(rec.i);
        *slot = sources[r.source()][r.row() as usize];
    }
}

/// Raw form of [`merge_shuffle`] for the foreign boundary.
///
/// # Safety
/// `index` and `dest` must be valid for `count` elements; every decoded row
/// must be valid for the selected source allocation; buffers must not
/// overlap.
pub unsafe fn merge_shuffle_unchecked<T: Copy>(
    src1: *const T,
    src2: *const T,
    dest: *mut T,
    index: *const IndexRecord,
    count: usize,
) {
    let sources = [src2, src1];
    for x in 0..count {
        let r = RowRef::from_raw((*index.add(x)).i);
        *dest.add(x) = *sources[r.source()].add(r.row() as usize);
    }
}

/// [`merge_shuffle`] with a column top on the tagged side: tagged rows are
/// shifted by `top_offset / size_of::<T>()` before indexing `src1`; the
/// untagged side is not shifted.
///
/// `top_offset` is in bytes, as supplied by the host.
///
/// # Panics
/// Same conditions as [`merge_shuffle`], with the shift applied.
pub fn merge_shuffle_top<T: Copy>(
    src1: &[T],
    src2: &[T],
    dest: &mut [T],
    index: &[IndexRecord],
    top_offset: i64,
) {
    assert_eq!(dest.len(), index.len());
    let sources = [src2, src1];
    let shifts = [0usize, (top_offset / core::mem::size_of::<T>() as i64) as usize];
    for (slot, rec) in dest.iter_mut().zip(index) {
        let r = RowRef::from_raw(rec.i);
        let s = r.source();
        *slot = sources[s][r.row() as usize + shifts[s]];
    }
}

/// Raw form of [`merge_shuffle_top`] for the foreign boundary.
///
/// # Safety
/// As [`merge_shuffle_unchecked`], with the tagged-side shift applied.
pub unsafe fn merge_shuffle_top_unchecked<T: Copy>(
    src1: *const T,
    src2: *const T,
    dest: *mut T,
    index: *const IndexRecord,
    count: usize,
    top_offset: i64,
) {
    let sources = [src2, src1];
    let shifts = [0usize, (top_offset / core::mem::size_of::<T>() as i64) as usize];
    for x in 0..count {
        let r = RowRef::from_raw((*index.add(x)).i);
        let s = r.source();
        *dest.add(x) = *sources[s].add(r.row() as usize + shifts[s]);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::flatten_index;
    use crate::sort::sort_timestamp_index;

    #[test]
    fn reshuffle_applies_sort_permutation() {
        let column: Vec<i64> = vec![50, 10, 30, 20, 40];
        let mut index: Vec<IndexRecord> = column
            .iter()
            .enumerate()
            .map(|(i, &ts)| IndexRecord::new(ts as u64, i as u64))
            .collect();
        sort_timestamp_index(&mut index);
        let mut dest = vec![0i64; column.len()];
        reshuffle(&column, &mut dest, &index);
        assert_eq!(dest, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn flatten_then_reshuffle_is_identity() {
        let column: Vec<u32> = vec![9, 8, 7, 6];
        let mut index: Vec<IndexRecord> = (0..4).map(|i| IndexRecord::new(i, 99)).collect();
        flatten_index(&mut index);
        let mut dest = vec![0u32; 4];
        reshuffle(&column, &mut dest, &index);
        assert_eq!(dest, column);
    }

    #[test]
    fn merge_shuffle_interleaves_sources() {
        let src1: Vec<i64> = vec![10, 20, 30, 40];
        let src2: Vec<i64> = vec![100, 200, 300];
        let refs = [
            RowRef::tagged(0),
            RowRef::untagged(0),
            RowRef::tagged(1),
            RowRef::untagged(1),
            RowRef::tagged(2),
            RowRef::untagged(2),
            RowRef::tagged(3),
        ];
        let index: Vec<IndexRecord> =
            refs.iter().map(|r| IndexRecord::new(0, r.raw())).collect();
        let mut dest = vec![0i64; index.len()];
        merge_shuffle(&src1, &src2, &mut dest, &index);
        assert_eq!(dest, vec![10, 100, 20, 200, 30, 300, 40]);
    }

    #[test]
    fn merge_shuffle_element_widths() {
        let src1: Vec<u8> = vec![1, 2];
        let src2: Vec<u8> = vec![3];
        let index = vec![
            IndexRecord::new(0, RowRef::untagged(0).raw()),
            IndexRecord::new(0, RowRef::tagged(1).raw()),
            IndexRecord::new(0, RowRef::tagged(0).raw()),
        ];
        let mut dest = vec![0u8; 3];
        merge_shuffle(&src1, &src2, &mut dest, &index);
        assert_eq!(dest, vec![3, 2, 1]);

        let src1: Vec<u16> = vec![0xaaaa, 0xbbbb];
        let src2: Vec<u16> = vec![0xcccc];
        let mut dest = vec![0u16; 3];
        merge_shuffle(&src1, &src2, &mut dest, &index);
        assert_eq!(dest, vec![0xcccc, 0xbbbb, 0xaaaa]);
    }

    #[test]
    fn merge_shuffle_top_shifts_tagged_side_only() {
        let src1: Vec<i64> = vec![333, 444];
        let src2: Vec<i64> = vec![111, 222];
        let index = vec![
            IndexRecord::new(0, RowRef::untagged(0).raw()),
            IndexRecord::new(0, RowRef::tagged(0).raw()),
            IndexRecord::new(0, RowRef::untagged(1).raw()),
            IndexRecord::new(0, RowRef::tagged(1).raw()),
        ];
        // Zero top: tagged rows index the data column directly.
        let mut dest = vec![0i64; 4];
        merge_shuffle_top(&src1, &src2, &mut dest, &index, 0);
        assert_eq!(dest, vec![111, 333, 222, 444]);

        // A 16-byte top shifts tagged rows by two elements.
        let src1_full: Vec<i64> = vec![0, 0, 333, 444];
        let mut dest = vec![0i64; 4];
        merge_shuffle_top(&src1_full, &src2, &mut dest, &index, 16);
        assert_eq!(dest, vec![111, 333, 222, 444]);
    }

    #[test]
    fn unchecked_forms_match_safe_forms() {
        let src1: Vec<u64> = (0..16).map(|v| v * 3).collect();
        let src2: Vec<u64> = (0..16).map(|v| v * 7 + 1).collect();
        let index: Vec<IndexRecord> = (0..16)
            .map(|i| {
                let r = if i % 3 == 0 {
                    RowRef::tagged(i)
                } else {
                    RowRef::untagged(i)
                };
                IndexRecord::new(i, r.raw())
            })
            .collect();
        let mut a = vec![0u64; 16];
        let mut b = vec![0u64; 16];
        merge_shuffle(&src1, &src2, &mut a, &index);
        unsafe {
            merge_shuffle_unchecked(src1.as_ptr(), src2.as_ptr(), b.as_mut_ptr(), index.as_ptr(), 16)
        };
        assert_eq!(a, b);
    }
}
