//! 8-pass least-significant-digit radix sort for large timestamp indexes.
//!
//! Equivalent to the native `radix_sort_long_index_asc_in_place` /
//! `radix_shuffle<sh>` pair. One linear scan fills all eight 256-bin digit
//! histograms at once, each histogram is converted to exclusive prefix sums
//! in place, and eight shuffle passes then bounce the records between the
//! input and a scratch buffer, least-significant byte first. Eight passes are
//! an even count, so the final pass lands the sorted result back in the input
//! buffer and the scratch can be dropped.
//!
//! The shuffle passes keep the counts table close (non-temporal hint) and
//! walk the source with a 64-record lookahead, matching the access pattern
//! the native kernel tuned for.

use crate::index::IndexRecord;
use crate::mem::{prefetch_nta, prefetch_t2};

const RADIX_PASSES: usize = 8;
const HIST_BINS: usize = 256;

/// Sort `index` ascending by `ts` (unsigned), in place.
///
/// Allocates a scratch buffer of `index.len()` records for the duration of
/// the call.
pub fn radix_sort(index: &mut [IndexRecord]) {
    let size = index.len();
    if size < 2 {
        return;
    }

    let mut counts = [[0u64; HIST_BINS]; RADIX_PASSES];
    let mut scratch = vec![IndexRecord::default(); size];

    // One scan, all eight digit histograms.
    prefetch_nta(counts.as_ptr());
    for x in 0..size {
        let ts = index[x].ts;
        for (lane, hist) in counts.iter_mut().enumerate() {
            hist[((ts >> (lane * 8)) & 0xff) as usize] += 1;
        }
        prefetch_t2(index.as_ptr().wrapping_add(x + 64));
    }

    // Histograms to exclusive prefix sums, in place.
    for hist in counts.iter_mut() {
        let mut offset = 0u64;
        for bin in hist.iter_mut() {
            let next = offset + *bin;
            *bin = offset;
            offset = next;
        }
    }

    // Eight LSD passes alternating between the two buffers.
    radix_shuffle(&mut counts[0], index, &mut scratch, 0);
    radix_shuffle(&mut counts[1], &scratch, index, 8);
    radix_shuffle(&mut counts[2], index, &mut scratch, 16);
    radix_shuffle(&mut counts[3], &scratch, index, 24);
    radix_shuffle(&mut counts[4], index, &mut scratch, 32);
    radix_shuffle(&mut counts[5], &scratch, index, 40);
    radix_shuffle(&mut counts[6], index, &mut scratch, 48);
    radix_shuffle(&mut counts[7], &scratch, index, 56);
}

/// One counting-sort pass: scatter `src` into `dest` by the digit at `shift`.
#[inline(always)]
fn radix_shuffle(
    counts: &mut [u64; HIST_BINS],
    src: &[IndexRecord],
    dest: &mut [IndexRecord],
    shift: u32,
) {
    debug_assert_eq!(src.len(), dest.len());
    prefetch_nta(counts.as_ptr());
    for x in 0..src.len() {
        let rec = src[x];
        let digit = ((rec.ts >> shift) & 0xff) as usize;
        // SAFETY: `counts` holds exclusive prefix sums of this pass's digit
        // histogram over `src`, so each cursor stays below `src.len()` for
        // exactly as many increments as the digit occurs.
        unsafe {
            *dest.get_unchecked_mut(counts[digit] as usize) = rec;
        }
        counts[digit] += 1;
        prefetch_t2(src.as_ptr().wrapping_add(x + 64));
    }
}
