// tsmerge — out-of-order merge kernels, Rust port of the native ooo.cpp

pub mod index;
pub mod mem;
pub mod merge;
pub mod search;
pub mod shuffle;
pub mod sort;
pub mod synth;
pub mod varcol;

#[cfg(feature = "c-abi")]
pub mod abi;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level re-exports for the common entry points.
// These mirror the flat surface the native kernel exposes to its host.
// ─────────────────────────────────────────────────────────────────────────────

/// The 16-byte `(timestamp, reference)` record every kernel operates on.
pub use index::IndexRecord;
/// Bit-63 tagged source-row reference codec.
pub use index::RowRef;

/// Build a tagged timestamp index over a column window.
/// Equivalent to `makeTimestampIndex`.
pub use index::make_timestamp_index;
/// Reset index references to positions after a sort.
/// Equivalent to `flattenIndex`.
pub use index::flatten_index;
/// Project index timestamps into a plain column.
/// Equivalent to `oooCopyIndex`.
pub use index::copy_index_timestamps;

/// Hybrid in-place index sort. Equivalent to `sortLongIndexAscInPlace`.
pub use sort::sort_timestamp_index;
/// Quicksort/radix dispatch threshold (public so tests can force each path).
pub use sort::QUICKSORT_MAX;

/// K-way merge of pre-sorted runs into a caller-provided buffer.
pub use merge::k_way_merge;
/// Owning merge wrapper with the `count == 1` borrow contract.
/// Equivalent to `mergeLongIndexesAsc`.
pub use merge::merge_timestamp_indexes;

/// Sort-permutation gather. Equivalent to `indexReshuffle{8,16,32,64}Bit`.
pub use shuffle::reshuffle;
/// Two-source gather through a merge index.
/// Equivalent to `mergeShuffle{8,16,32,64}Bit`.
pub use shuffle::merge_shuffle;
/// Two-source gather with a data-side column top.
/// Equivalent to `mergeShuffleWithTop{8,16,32,64}Bit`.
pub use shuffle::merge_shuffle_top;

/// Variable-width merge-copies. Equivalent to `oooMergeCopy{Str,Bin}Column`
/// and the `WithTop` variants.
pub use varcol::{
    merge_copy_bin_column, merge_copy_bin_column_top, merge_copy_str_column,
    merge_copy_str_column_top,
};
/// Seed a fix table for prefix-only records.
/// Equivalent to `setVarColumnRefs{32,64}Bit`.
pub use varcol::set_var_refs;

/// Bulk element fill. Equivalent to `setMemory{Long,Int,Short,Double,Float}`.
pub use mem::set_memory;

/// Directional binary search. Equivalent to `binarySearch64Bit` /
/// `binarySearchIndexT`.
pub use search::{binary_search, ScanDir};
