//! Quicksort path for small timestamp indexes.
//!
//! Equivalent to the native `quick_sort_long_index_asc_in_place` /
//! `partition` pair: Lomuto partition with the last element's `ts` as pivot.
//! Below [`INSERTION_SORT_MAX`] elements the partitioning overhead is not
//! worth it and a straight insertion sort finishes the job, which also keeps
//! the recursion shallow for the already-capped inputs the dispatcher sends
//! here.

use crate::index::IndexRecord;

/// Slices at or below this length are insertion-sorted.
pub(crate) const INSERTION_SORT_MAX: usize = 32;

/// Sort `index` ascending by `ts` (unsigned), in place.
pub fn quick_sort(index: &mut [IndexRecord]) {
    if index.len() <= INSERTION_SORT_MAX {
        insertion_sort(index);
        return;
    }
    let p = partition(index);
    let (lo, rest) = index.split_at_mut(p);
    quick_sort(lo);
    quick_sort(&mut rest[1..]);
}

/// Lomuto partition around the last element's `ts`.
///
/// Places the pivot at its final position and returns that position; smaller
/// or equal elements end up to its left, greater ones to its right.
fn partition(index: &mut [IndexRecord]) -> usize {
    let high = index.len() - 1;
    let pivot = index[high].ts;
    let mut i = 0;
    for j in 0..high {
        if index[j].ts <= pivot {
            index.swap(i, j);
            i += 1;
        }
    }
    index.swap(i, high);
    i
}

fn insertion_sort(index: &mut [IndexRecord]) {
    for i in 1..index.len() {
        let rec = index[i];
        let mut j = i;
        while j > 0 && index[j - 1].ts > rec.ts {
            index[j] = index[j - 1];
            j -= 1;
        }
        index[j] = rec;
    }
}
