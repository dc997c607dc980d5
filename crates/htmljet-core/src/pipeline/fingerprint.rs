//! Perceptual fingerprints: a coarse luminance signature packed into bits.
//!
//! The image is shrunk onto an `N×N` grid, converted to 8-bit luminance, and
//! each cell contributes one bit: set when the cell is at least as bright as
//! the grid mean. Visually similar images land a few bits apart; uniform
//! brightness changes leave the signature untouched.

use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::config::FingerprintConfig;

const WORD_BITS: u32 = u64::BITS;

/// A fixed-length bit vector holding one bit per grid cell.
///
/// Bit `i` is grid cell `i` in row-major order. Bits are packed
/// little-endian into `u64` words, so an 8×8 fingerprint is a single word.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    words: Vec<u64>,
    len: u32,
}

impl Fingerprint {
    /// Build a fingerprint from bits in cell order.
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut words = Vec::new();
        let mut len = 0u32;
        for bit in bits {
            let offset = len % WORD_BITS;
            if offset == 0 {
                words.push(0);
            }
            if bit {
                if let Some(word) = words.last_mut() {
                    *word |= 1u64 << offset;
                }
            }
            len += 1;
        }
        Self { words, len }
    }

    /// A 64-bit fingerprint (8×8 grid) from its packed word.
    pub fn from_u64(word: u64) -> Self {
        Self {
            words: vec![word],
            len: WORD_BITS,
        }
    }

    /// Number of bits (`L`).
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Value of bit `index`, or `None` past the end.
    pub fn bit(&self, index: u32) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        let word = self.words[(index / WORD_BITS) as usize];
        Some(word & (1u64 << (index % WORD_BITS)) != 0)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Count of differing bit positions.
    ///
    /// Returns `None` when the fingerprints have different lengths and are
    /// therefore not comparable.
    pub fn hamming_distance(&self, other: &Fingerprint) -> Option<u32> {
        if self.len != other.len {
            return None;
        }
        Some(
            self.words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| (a ^ b).count_ones())
                .sum(),
        )
    }

    /// Hex rendering, most significant cell first.
    pub fn to_hex(&self) -> String {
        let digits = self.len.div_ceil(4) as usize;
        let full: String = self
            .words
            .iter()
            .rev()
            .map(|w| format!("{w:016x}"))
            .collect();
        full[full.len() - digits..].to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Computes mean-luminance fingerprints with a fixed grid and filter.
#[derive(Debug, Clone)]
pub struct FingerprintHasher {
    grid_size: u32,
    filter: FilterType,
}

impl Default for FingerprintHasher {
    fn default() -> Self {
        Self::new(&FingerprintConfig::default())
    }
}

impl FingerprintHasher {
    /// Create a hasher from configuration.
    ///
    /// An unknown filter name falls back to `Triangle`; `Config::validate`
    /// rejects such names before a hasher is ever built from a loaded file.
    pub fn new(config: &FingerprintConfig) -> Self {
        Self::with_grid(
            config.grid_size,
            config.filter_type().unwrap_or(FilterType::Triangle),
        )
    }

    /// Create a hasher with an explicit grid side and resampling filter.
    pub fn with_grid(grid_size: u32, filter: FilterType) -> Self {
        Self {
            grid_size: grid_size.max(1),
            filter,
        }
    }

    /// Fingerprint length in bits (`grid_size²`).
    pub fn bit_len(&self) -> u32 {
        self.grid_size * self.grid_size
    }

    /// Fingerprint a decoded image.
    pub fn fingerprint(&self, image: &DynamicImage) -> Fingerprint {
        let grid = image
            .resize_exact(self.grid_size, self.grid_size, self.filter)
            .to_luma8();

        let cells: Vec<u64> = grid.pixels().map(|p| u64::from(p.0[0])).collect();
        let count = cells.len() as u64;
        let total: u64 = cells.iter().sum();

        // cell >= total / count, kept in integers so the mean is exact
        Fingerprint::from_bits(cells.iter().map(|&cell| cell * count >= total))
    }
}
