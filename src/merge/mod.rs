//! K-way merge of sorted timestamp indexes.
//!
//! The kernel itself lives in [`tree`]; this module adds the public entry
//! point with the ownership contract of the native `mergeLongIndexesAsc`:
//!
//! - no input runs ⇒ nothing to merge, `None`;
//! - one input run ⇒ the caller's own run is the result, returned borrowed
//!   without copying or allocating;
//! - two or more runs ⇒ a freshly allocated merged index, returned owned.
//!
//! `Cow` encodes the borrowed-vs-owned split in the type system, which is
//! the same distinction the C-ABI layer expresses through "do not free the
//! `count == 1` pointer".

pub mod tree;

pub use tree::k_way_merge;

use std::borrow::Cow;

use crate::index::IndexRecord;

/// Merge pre-sorted runs into a single ascending index.
///
/// Returns `None` when `runs` is empty. With exactly one run the input slice
/// is returned as `Cow::Borrowed`; otherwise the merged index is built and
/// returned as `Cow::Owned`.
pub fn merge_timestamp_indexes<'a>(runs: &[&'a [IndexRecord]]) -> Option<Cow<'a, [IndexRecord]>> {
    match runs {
        [] => None,
        [single] => Some(Cow::Borrowed(*single)),
        _ => {
            let total = runs.iter().map(|r| r.len()).sum();
            let mut dest = vec![IndexRecord::default(); total];
            k_way_merge(runs, &mut dest);
            Some(Cow::Owned(dest))
        }
    }
}
