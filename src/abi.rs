//! C-ABI shims — the flat entry points a managed host runtime binds to.
//!
//! Enabled with:
//!   cargo build --release --features c-abi
//!
//! The produced staticlib can replace the native kernel object in the host's
//! link step. Every function takes raw typed pointers plus scalar sizes and
//! flags; the shims validate non-null pointers and non-negative sizes, then
//! hand off to the kernels. Anything beyond that (row validity, aliasing,
//! buffer capacity) remains the host's contract, as it is for the native
//! kernel.
//!
//! Ownership: [`ooo_merge_long_indexes_asc`] returns a `malloc`-ed buffer
//! that must be released with [`ooo_free_merged_index`] — except in the
//! `count == 1` case, where the caller's own input pointer is returned and
//! must NOT be freed through this pairing. Callers detect the case by
//! retaining `count` or comparing pointers.

use core::slice;

use crate::index::{copy_index_timestamps, flatten_index, make_timestamp_index, IndexRecord};
use crate::mem::set_memory_unchecked;
use crate::merge::k_way_merge;
use crate::search::{binary_search, ScanDir};
use crate::shuffle::{merge_shuffle_top_unchecked, merge_shuffle_unchecked, reshuffle_unchecked};
use crate::sort::sort_timestamp_index;
use crate::varcol::{
    merge_copy_var_column, merge_copy_var_column_top, set_var_refs, BIN_MULT, STR_MULT,
};

use smallvec::SmallVec;

// ─────────────────────────────────────────────────────────────────────────────
// Merge input descriptor (host-side struct, one per run)
// ─────────────────────────────────────────────────────────────────────────────

/// One pre-sorted input run: base pointer and record count.
#[repr(C)]
pub struct MergeIndexEntry {
    pub index: *const IndexRecord,
    pub size: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sort
// ─────────────────────────────────────────────────────────────────────────────

/// Sort `len` records ascending by timestamp (unsigned), in place.
/// Equivalent to `sortLongIndexAscInPlace`.
#[no_mangle]
pub unsafe extern "C" fn ooo_sort_long_index_asc_in_place(index: *mut IndexRecord, len: i64) {
    if index.is_null() || len < 1 {
        return;
    }
    sort_timestamp_index(slice::from_raw_parts_mut(index, len as usize));
}

// ─────────────────────────────────────────────────────────────────────────────
// K-way merge + paired free
// ─────────────────────────────────────────────────────────────────────────────

/// Merge `count` pre-sorted runs into one freshly allocated index.
/// Equivalent to `mergeLongIndexesAsc`.
///
/// Returns null when `count < 1`, when any entry is malformed, or when the
/// total record count is zero. With `count == 1` the single input pointer is
/// returned as-is (no allocation — do not free it through
/// [`ooo_free_merged_index`]).
#[no_mangle]
pub unsafe extern "C" fn ooo_merge_long_indexes_asc(
    entries: *const MergeIndexEntry,
    count: i32,
) -> *mut IndexRecord {
    if entries.is_null() || count < 1 {
        return core::ptr::null_mut();
    }
    let entries = slice::from_raw_parts(entries, count as usize);
    if count == 1 {
        return entries[0].index as *mut IndexRecord;
    }

    let mut runs: SmallVec<[&[IndexRecord]; 16]> = SmallVec::with_capacity(entries.len());
    let mut total = 0usize;
    for entry in entries {
        if entry.index.is_null() || entry.size < 0 {
            return core::ptr::null_mut();
        }
        let run = slice::from_raw_parts(entry.index, entry.size as usize);
        total += run.len();
        runs.push(run);
    }
    if total == 0 {
        return core::ptr::null_mut();
    }

    let merged = libc::malloc(total * core::mem::size_of::<IndexRecord>()) as *mut IndexRecord;
    if merged.is_null() {
        return core::ptr::null_mut();
    }
    k_way_merge(&runs, slice::from_raw_parts_mut(merged, total));
    merged
}

/// Release a merged index produced by [`ooo_merge_long_indexes_asc`].
/// Equivalent to `freeMergedIndex`. Null is ignored.
#[no_mangle]
pub unsafe extern "C" fn ooo_free_merged_index(index: *mut IndexRecord) {
    libc::free(index as *mut libc::c_void);
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixed-width reshuffle (sort-permutation gather)
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! reshuffle_abi {
    ($name:ident, $ty:ty, $native:literal) => {
        /// `dest[i] = src[index[i].i]` over fixed-width elements.
        #[doc = concat!("Equivalent to `", $native, "`.")]
        #[no_mangle]
        pub unsafe extern "C" fn $name(
            src: *const $ty,
            dest: *mut $ty,
            index: *const IndexRecord,
            count: i64,
        ) {
            if src.is_null() || dest.is_null() || index.is_null() || count < 1 {
                return;
            }
            reshuffle_unchecked(src, dest, index, count as usize);
        }
    };
}

reshuffle_abi!(ooo_index_reshuffle_8bit, u8, "indexReshuffle8Bit");
reshuffle_abi!(ooo_index_reshuffle_16bit, u16, "indexReshuffle16Bit");
reshuffle_abi!(ooo_index_reshuffle_32bit, u32, "indexReshuffle32Bit");
reshuffle_abi!(ooo_index_reshuffle_64bit, u64, "indexReshuffle64Bit");

// ─────────────────────────────────────────────────────────────────────────────
// Two-source merge shuffles
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! merge_shuffle_abi {
    ($name:ident, $ty:ty, $native:literal) => {
        /// Two-source gather: tagged references read `src1`, untagged `src2`.
        #[doc = concat!("Equivalent to `", $native, "`.")]
        #[no_mangle]
        pub unsafe extern "C" fn $name(
            src1: *const $ty,
            src2: *const $ty,
            dest: *mut $ty,
            index: *const IndexRecord,
            count: i64,
        ) {
            if src1.is_null() || src2.is_null() || dest.is_null() || index.is_null() || count < 1 {
                return;
            }
            merge_shuffle_unchecked(src1, src2, dest, index, count as usize);
        }
    };
}

merge_shuffle_abi!(ooo_merge_shuffle_8bit, u8, "mergeShuffle8Bit");
merge_shuffle_abi!(ooo_merge_shuffle_16bit, u16, "mergeShuffle16Bit");
merge_shuffle_abi!(ooo_merge_shuffle_32bit, u32, "mergeShuffle32Bit");
merge_shuffle_abi!(ooo_merge_shuffle_64bit, u64, "mergeShuffle64Bit");

macro_rules! merge_shuffle_top_abi {
    ($name:ident, $ty:ty, $native:literal) => {
        /// As the plain merge shuffle, with tagged-side rows shifted by
        /// `top_offset` bytes (divided by the element size).
        #[doc = concat!("Equivalent to `", $native, "`.")]
        #[no_mangle]
        pub unsafe extern "C" fn $name(
            src1: *const $ty,
            src2: *const $ty,
            dest: *mut $ty,
            index: *const IndexRecord,
            count: i64,
            top_offset: i64,
        ) {
            if src1.is_null() || src2.is_null() || dest.is_null() || index.is_null() || count < 1 {
                return;
            }
            merge_shuffle_top_unchecked(src1, src2, dest, index, count as usize, top_offset);
        }
    };
}

merge_shuffle_top_abi!(ooo_merge_shuffle_top_8bit, u8, "mergeShuffleWithTop8Bit");
merge_shuffle_top_abi!(ooo_merge_shuffle_top_16bit, u16, "mergeShuffleWithTop16Bit");
merge_shuffle_top_abi!(ooo_merge_shuffle_top_32bit, u32, "mergeShuffleWithTop32Bit");
merge_shuffle_top_abi!(ooo_merge_shuffle_top_64bit, u64, "mergeShuffleWithTop64Bit");

// ─────────────────────────────────────────────────────────────────────────────
// Variable-width merge-copy
// ─────────────────────────────────────────────────────────────────────────────

/// String-column merge-copy (`i32` prefixes, UTF-16 payload).
/// Equivalent to `oooMergeCopyStrColumn`.
#[no_mangle]
pub unsafe extern "C" fn ooo_merge_copy_str_column(
    merge_index: *const IndexRecord,
    merge_index_size: i64,
    src_data_fix: *const i64,
    src_data_var: *const u8,
    src_ooo_fix: *const i64,
    src_ooo_var: *const u8,
    dst_fix: *mut i64,
    dst_var: *mut u8,
    dst_var_offset: i64,
) {
    if merge_index.is_null() || merge_index_size < 1 || dst_fix.is_null() || dst_var.is_null() {
        return;
    }
    merge_copy_var_column::<i32>(
        merge_index,
        merge_index_size as usize,
        src_data_fix,
        src_data_var,
        src_ooo_fix,
        src_ooo_var,
        dst_fix,
        dst_var,
        dst_var_offset,
        STR_MULT,
    );
}

/// String-column merge-copy with a data-side column top (byte offset into
/// the data fix table). Equivalent to `oooMergeCopyStrColumnWithTop`.
#[no_mangle]
pub unsafe extern "C" fn ooo_merge_copy_str_column_with_top(
    merge_index: *const IndexRecord,
    merge_index_size: i64,
    src_data_fix: *const i64,
    src_data_fix_offset: i64,
    src_data_var: *const u8,
    src_ooo_fix: *const i64,
    src_ooo_var: *const u8,
    dst_fix: *mut i64,
    dst_var: *mut u8,
    dst_var_offset: i64,
) {
    if merge_index.is_null() || merge_index_size < 1 || dst_fix.is_null() || dst_var.is_null() {
        return;
    }
    merge_copy_var_column_top::<i32>(
        merge_index,
        merge_index_size as usize,
        src_data_fix,
        src_data_fix_offset,
        src_data_var,
        src_ooo_fix,
        src_ooo_var,
        dst_fix,
        dst_var,
        dst_var_offset,
        STR_MULT,
    );
}

/// Binary-column merge-copy (`i64` prefixes, byte payload).
/// Equivalent to `oooMergeCopyBinColumn`.
#[no_mangle]
pub unsafe extern "C" fn ooo_merge_copy_bin_column(
    merge_index: *const IndexRecord,
    merge_index_size: i64,
    src_data_fix: *const i64,
    src_data_var: *const u8,
    src_ooo_fix: *const i64,
    src_ooo_var: *const u8,
    dst_fix: *mut i64,
    dst_var: *mut u8,
    dst_var_offset: i64,
) {
    if merge_index.is_null() || merge_index_size < 1 || dst_fix.is_null() || dst_var.is_null() {
        return;
    }
    merge_copy_var_column::<i64>(
        merge_index,
        merge_index_size as usize,
        src_data_fix,
        src_data_var,
        src_ooo_fix,
        src_ooo_var,
        dst_fix,
        dst_var,
        dst_var_offset,
        BIN_MULT,
    );
}

/// Binary-column merge-copy with a data-side column top.
/// Equivalent to `oooMergeCopyBinColumnWithTop`.
#[no_mangle]
pub unsafe extern "C" fn ooo_merge_copy_bin_column_with_top(
    merge_index: *const IndexRecord,
    merge_index_size: i64,
    src_data_fix: *const i64,
    src_data_fix_offset: i64,
    src_data_var: *const u8,
    src_ooo_fix: *const i64,
    src_ooo_var: *const u8,
    dst_fix: *mut i64,
    dst_var: *mut u8,
    dst_var_offset: i64,
) {
    if merge_index.is_null() || merge_index_size < 1 || dst_fix.is_null() || dst_var.is_null() {
        return;
    }
    merge_copy_var_column_top::<i64>(
        merge_index,
        merge_index_size as usize,
        src_data_fix,
        src_data_fix_offset,
        src_data_var,
        src_ooo_fix,
        src_ooo_var,
        dst_fix,
        dst_var,
        dst_var_offset,
        BIN_MULT,
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Index construction and projection
// ─────────────────────────────────────────────────────────────────────────────

/// Build a tagged timestamp index over `data[low..=high]`.
/// Equivalent to `makeTimestampIndex`.
#[no_mangle]
pub unsafe extern "C" fn ooo_make_timestamp_index(
    data: *const i64,
    low: i64,
    high: i64,
    dest: *mut IndexRecord,
) {
    if data.is_null() || dest.is_null() || low < 0 || high < low {
        return;
    }
    let count = (high - low + 1) as usize;
    make_timestamp_index(
        slice::from_raw_parts(data, (high + 1) as usize),
        low,
        high,
        slice::from_raw_parts_mut(dest, count),
    );
}

/// Reset references to positions: `index[i].i = i`.
/// Equivalent to `flattenIndex`.
#[no_mangle]
pub unsafe extern "C" fn ooo_flatten_index(index: *mut IndexRecord, count: i64) {
    if index.is_null() || count < 1 {
        return;
    }
    flatten_index(slice::from_raw_parts_mut(index, count as usize));
}

/// Project index timestamps into `dest`. Equivalent to `oooCopyIndex`.
#[no_mangle]
pub unsafe extern "C" fn ooo_copy_index(
    index: *const IndexRecord,
    index_size: i64,
    dest: *mut i64,
) {
    if index.is_null() || dest.is_null() || index_size < 1 {
        return;
    }
    copy_index_timestamps(
        slice::from_raw_parts(index, index_size as usize),
        slice::from_raw_parts_mut(dest, index_size as usize),
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Binary search
// ─────────────────────────────────────────────────────────────────────────────

#[inline(always)]
fn scan_dir_from(raw: i32) -> ScanDir {
    if raw < 0 {
        ScanDir::Down
    } else {
        ScanDir::Up
    }
}

/// Directional binary search over an `i64` column.
/// Equivalent to `binarySearch64Bit`. Returns `-1` on malformed input.
#[no_mangle]
pub unsafe extern "C" fn ooo_binary_search_64bit(
    data: *const i64,
    value: i64,
    low: i64,
    high: i64,
    scan_dir: i32,
) -> i64 {
    if data.is_null() || low < 0 || high < low {
        return -1;
    }
    binary_search(
        slice::from_raw_parts(data, (high + 1) as usize),
        value,
        low,
        high,
        scan_dir_from(scan_dir),
    )
}

/// Directional binary search over an index, comparing `ts` (unsigned)
/// against the probe word. Equivalent to `binarySearchIndexT`.
/// Returns `-1` on malformed input.
#[no_mangle]
pub unsafe extern "C" fn ooo_binary_search_index(
    data: *const IndexRecord,
    value: i64,
    low: i64,
    high: i64,
    scan_dir: i32,
) -> i64 {
    if data.is_null() || low < 0 || high < low {
        return -1;
    }
    binary_search(
        slice::from_raw_parts(data, (high + 1) as usize),
        value,
        low,
        high,
        scan_dir_from(scan_dir),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Fills and fix-table seeding
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! set_memory_abi {
    ($name:ident, $ty:ty, $native:literal) => {
        /// Fill `count` elements with `value`.
        #[doc = concat!("Equivalent to `", $native, "`.")]
        #[no_mangle]
        pub unsafe extern "C" fn $name(addr: *mut $ty, value: $ty, count: i64) {
            if addr.is_null() || count < 1 {
                return;
            }
            set_memory_unchecked(addr, value, count as usize);
        }
    };
}

set_memory_abi!(ooo_set_memory_long, i64, "setMemoryLong");
set_memory_abi!(ooo_set_memory_int, i32, "setMemoryInt");
set_memory_abi!(ooo_set_memory_short, i16, "setMemoryShort");
set_memory_abi!(ooo_set_memory_double, f64, "setMemoryDouble");
set_memory_abi!(ooo_set_memory_float, f32, "setMemoryFloat");

/// Seed a string-column fix table: `addr[i] = offset + i * 4`.
/// Equivalent to `setVarColumnRefs32Bit`.
#[no_mangle]
pub unsafe extern "C" fn ooo_set_var_refs_32bit(addr: *mut i64, offset: i64, count: i64) {
    if addr.is_null() || count < 1 {
        return;
    }
    set_var_refs::<i32>(slice::from_raw_parts_mut(addr, count as usize), offset);
}

/// Seed a binary-column fix table: `addr[i] = offset + i * 8`.
/// Equivalent to `setVarColumnRefs64Bit`.
#[no_mangle]
pub unsafe extern "C" fn ooo_set_var_refs_64bit(addr: *mut i64, offset: i64, count: i64) {
    if addr.is_null() || count < 1 {
        return;
    }
    set_var_refs::<i64>(slice::from_raw_parts_mut(addr, count as usize), offset);
}
