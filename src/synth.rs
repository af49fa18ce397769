//! Deterministic synthetic data for benches and end-to-end tests.
//!
//! Everything here is seeded and reproducible so failures can be replayed
//! from the reported seed alone. Not part of the kernel surface.

use crate::index::IndexRecord;

/// Small xorshift64* generator; good enough for fixture data and free of
/// dependencies.
#[derive(Clone)]
pub struct SeriesRng(u64);

impl SeriesRng {
    pub fn new(seed: u64) -> Self {
        // Avoid the all-zero fixed point.
        Self(seed | 1)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Uniform value in `[0, bound)`.
    pub fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}

/// Non-decreasing timestamp series of `len` values starting at `start`, with
/// steps in `[0, max_step]` (duplicates included on step 0).
pub fn sorted_timestamps(rng: &mut SeriesRng, len: usize, start: i64, max_step: u64) -> Vec<i64> {
    let mut ts = start;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(ts);
        ts += rng.below(max_step + 1) as i64;
    }
    out
}

/// Unsorted index of `len` records with timestamps below `ts_bound` and
/// `i` = position.
pub fn random_index(rng: &mut SeriesRng, len: usize, ts_bound: u64) -> Vec<IndexRecord> {
    (0..len)
        .map(|i| IndexRecord::new(rng.below(ts_bound), i as u64))
        .collect()
}

/// Build a string column (fix table + var blob): `i32` prefix counting
/// UTF-16 code units, payload in native-endian UTF-16; `None` stores a `-1`
/// prefix and no payload.
pub fn build_str_column(values: &[Option<&str>]) -> (Vec<i64>, Vec<u8>) {
    let mut fix = Vec::with_capacity(values.len());
    let mut var = Vec::new();
    for value in values {
        fix.push(var.len() as i64);
        match value {
            Some(s) => {
                let units: Vec<u16> = s.encode_utf16().collect();
                var.extend_from_slice(&(units.len() as i32).to_ne_bytes());
                for u in units {
                    var.extend_from_slice(&u.to_ne_bytes());
                }
            }
            None => var.extend_from_slice(&(-1i32).to_ne_bytes()),
        }
    }
    (fix, var)
}

/// Build a binary column (fix table + var blob): `i64` prefix counting
/// bytes; `None` stores a `-1` prefix and no payload.
pub fn build_bin_column(values: &[Option<&[u8]>]) -> (Vec<i64>, Vec<u8>) {
    let mut fix = Vec::with_capacity(values.len());
    let mut var = Vec::new();
    for value in values {
        fix.push(var.len() as i64);
        match value {
            Some(bytes) => {
                var.extend_from_slice(&(bytes.len() as i64).to_ne_bytes());
                var.extend_from_slice(bytes);
            }
            None => var.extend_from_slice(&(-1i64).to_ne_bytes()),
        }
    }
    (fix, var)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_is_deterministic() {
        let mut a = SeriesRng::new(42);
        let mut b = SeriesRng::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn sorted_timestamps_are_non_decreasing() {
        let mut rng = SeriesRng::new(7);
        let ts = sorted_timestamps(&mut rng, 1000, 1_000_000, 50);
        assert!(ts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ts[0], 1_000_000);
    }

    #[test]
    fn str_column_layout() {
        let (fix, var) = build_str_column(&[Some("ab"), None, Some("")]);
        assert_eq!(fix, vec![0, 8, 12]);
        assert_eq!(&var[0..4], &2i32.to_ne_bytes());
        assert_eq!(&var[8..12], &(-1i32).to_ne_bytes());
        assert_eq!(&var[12..16], &0i32.to_ne_bytes());
        assert_eq!(var.len(), 16);
    }

    #[test]
    fn bin_column_layout() {
        let (fix, var) = build_bin_column(&[Some(&[0xde, 0xad][..]), None]);
        assert_eq!(fix, vec![0, 10]);
        assert_eq!(&var[0..8], &2i64.to_ne_bytes());
        assert_eq!(&var[8..10], &[0xde, 0xad]);
        assert_eq!(&var[10..18], &(-1i64).to_ne_bytes());
    }
}
