//! Bit-packed entry planes.
//!
//! A plane holds one fingerprint cell for every bucket. The bucket store keeps
//! one plane per entry slot, because a probe walks a single bucket across all
//! planes and expansion appends whole planes.
//!
//! Four layouts share the [`EntryPlane`] interface:
//!
//! | Width | Plane | Backing |
//! |-------|-------|---------|
//! | 8     | [`BytePlane`]   | `Box<[AtomicU8]>`  |
//! | 16    | [`ShortPlane`]  | `Box<[AtomicU16]>` |
//! | 32    | [`IntPlane`]    | `Box<[AtomicU32]>` |
//! | other | [`PackedPlane`] | `Box<[AtomicU64]>`, cells may straddle words |
//!
//! # Packed Layout
//!
//! Cells are laid out least-significant bit first. Cell `b` starts at bit
//! `b * width`:
//!
//! ```text
//! width = 13
//! word 0: [cell 0: bits 0..13][cell 1: 13..26][cell 2: 26..39][cell 3: 39..52][cell 4: 52..64 ...
//! word 1: ... cell 4 cont: 0..1][cell 5: 1..14] ...
//! ```
//!
//! A straddling cell is split into a low part (top of word `n`) and a high part
//! (bottom of word `n + 1`). Each word is updated with its own CAS loop because
//! neighbouring cells in the same word may be written concurrently.
//!
//! # Dump Format
//!
//! [`EntryPlane::to_bytes`] produces the little-endian byte stream of the plane:
//! `bucket_count * width / 8` bytes, independent of the backing word size.

use crate::core::params;
use crate::error::{CuckooCraftError, Result};
use std::fmt;
use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, AtomicU8, Ordering};

/// Storage for one entry slot of every bucket.
///
/// Bucket indices are trusted: callers derive them from
/// `BucketStore::bucket_index`, which already masks to `[0, bucket_count)`.
/// Out-of-range indices panic on the slice access rather than touching
/// foreign memory.
pub trait EntryPlane: Send + Sync + fmt::Debug + Sized {
    /// Allocate a zero-filled plane.
    ///
    /// # Errors
    ///
    /// Returns [`CuckooCraftError::AllocationFailed`] if the backing buffer
    /// cannot be reserved.
    fn allocate(bucket_count: u64, fingerprint_bits: u32) -> Result<Self>;

    /// Read the cell for `bucket`.
    fn get(&self, bucket: u64) -> u32;

    /// Overwrite the cell for `bucket`. Bits above the width are ignored.
    fn set(&self, bucket: u64, value: u32);

    /// Overwrite the cell for `bucket` and return its previous value.
    fn swap(&self, bucket: u64, value: u32) -> u32;

    /// Number of bytes in the dump of this plane.
    fn byte_len(&self) -> usize;

    /// Little-endian dump of the plane.
    fn to_bytes(&self) -> Vec<u8>;

    /// Replace the plane contents with a dump produced by [`EntryPlane::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`CuckooCraftError::SnapshotMismatch`] if `bytes` has the wrong length.
    fn load_bytes(&self, bytes: &[u8]) -> Result<()>;
}

/// Allocate `len` zeroed atomics, reporting allocation failure instead of aborting.
fn zeroed_cells<A: Default>(len: usize) -> Result<Box<[A]>> {
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(len)
        .map_err(|_| CuckooCraftError::allocation_failed(len.saturating_mul(std::mem::size_of::<A>())))?;
    cells.resize_with(len, A::default);
    Ok(cells.into_boxed_slice())
}

fn cell_count(bucket_count: u64) -> Result<usize> {
    usize::try_from(bucket_count).map_err(|_| CuckooCraftError::allocation_failed(usize::MAX))
}

fn check_dump_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(CuckooCraftError::snapshot_mismatch(format!(
            "plane dump is {} bytes, expected {}",
            actual, expected
        )));
    }
    Ok(())
}

macro_rules! aligned_plane {
    ($(#[$doc:meta])* $name:ident, $atomic:ty, $prim:ty, $bits:expr) => {
        $(#[$doc])*
        pub struct $name {
            cells: Box<[$atomic]>,
        }

        impl EntryPlane for $name {
            fn allocate(bucket_count: u64, fingerprint_bits: u32) -> Result<Self> {
                debug_assert_eq!(fingerprint_bits, $bits);
                Ok(Self {
                    cells: zeroed_cells(cell_count(bucket_count)?)?,
                })
            }

            #[inline]
            fn get(&self, bucket: u64) -> u32 {
                u32::from(self.cells[bucket as usize].load(Ordering::Acquire))
            }

            #[inline]
            fn set(&self, bucket: u64, value: u32) {
                self.cells[bucket as usize].store(value as $prim, Ordering::Release);
            }

            #[inline]
            fn swap(&self, bucket: u64, value: u32) -> u32 {
                u32::from(self.cells[bucket as usize].swap(value as $prim, Ordering::AcqRel))
            }

            fn byte_len(&self) -> usize {
                self.cells.len() * std::mem::size_of::<$prim>()
            }

            fn to_bytes(&self) -> Vec<u8> {
                let mut bytes = Vec::with_capacity(self.byte_len());
                for cell in self.cells.iter() {
                    bytes.extend_from_slice(&cell.load(Ordering::Acquire).to_le_bytes());
                }
                bytes
            }

            fn load_bytes(&self, bytes: &[u8]) -> Result<()> {
                check_dump_len(self.byte_len(), bytes.len())?;
                const WIDTH: usize = std::mem::size_of::<$prim>();
                for (cell, chunk) in self.cells.iter().zip(bytes.chunks_exact(WIDTH)) {
                    let mut raw = [0u8; WIDTH];
                    raw.copy_from_slice(chunk);
                    cell.store(<$prim>::from_le_bytes(raw), Ordering::Release);
                }
                Ok(())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("buckets", &self.cells.len())
                    .finish()
            }
        }
    };
}

aligned_plane!(
    /// Plane for 8-bit fingerprints: one byte per cell, plain atomic loads and stores.
    BytePlane, AtomicU8, u8, 8
);

aligned_plane!(
    /// Plane for 16-bit fingerprints.
    ShortPlane, AtomicU16, u16, 16
);

aligned_plane!(
    /// Plane for 32-bit fingerprints. Swaps are a single atomic exchange.
    IntPlane, AtomicU32, u32, 32
);

/// Plane for any width other than 8, 16 or 32 bits.
///
/// Cells are packed back to back in 64-bit words and may straddle a word
/// boundary. See the module docs for the layout.
pub struct PackedPlane {
    words: Box<[AtomicU64]>,
    bits: u32,
    mask: u64,
    byte_len: usize,
}

/// Where a packed cell lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellPosition {
    word: usize,
    offset: u32,
    /// Bits of the cell that spill into `word + 1` (0 if it fits).
    spill: u32,
}

impl PackedPlane {
    #[inline]
    fn position(&self, bucket: u64) -> CellPosition {
        let bit = bucket * u64::from(self.bits);
        let word = (bit >> 6) as usize;
        let offset = (bit & 63) as u32;
        let end = offset + self.bits;
        CellPosition {
            word,
            offset,
            spill: end.saturating_sub(64),
        }
    }

    /// Write `value` into the cell and return the previous cell value.
    #[inline]
    fn replace(&self, bucket: u64, value: u32) -> u32 {
        let pos = self.position(bucket);
        let value = u64::from(value) & self.mask;

        let low_mask = self.mask << pos.offset;
        let low_value = value << pos.offset;
        let old_low = self.words[pos.word]
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |w| {
                Some((w & !low_mask) | low_value)
            })
            .unwrap_or_else(|w| w);

        let mut previous = old_low >> pos.offset;

        if pos.spill > 0 {
            let kept = 64 - pos.offset;
            let high_mask = (1u64 << pos.spill) - 1;
            let high_value = value >> kept;
            let old_high = self.words[pos.word + 1]
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |w| {
                    Some((w & !high_mask) | high_value)
                })
                .unwrap_or_else(|w| w);
            previous |= old_high << kept;
        }

        (previous & self.mask) as u32
    }

    /// Width of each cell in bits.
    #[must_use]
    pub fn bits(&self) -> u32 {
        self.bits
    }
}

impl EntryPlane for PackedPlane {
    fn allocate(bucket_count: u64, fingerprint_bits: u32) -> Result<Self> {
        params::validate_fingerprint_bits(fingerprint_bits)?;
        let byte_len = usize::try_from(params::plane_bytes(bucket_count, fingerprint_bits))
            .map_err(|_| CuckooCraftError::allocation_failed(usize::MAX))?;
        // One extra word keeps the straddle read of the last cell in bounds.
        let word_count = byte_len.div_ceil(8) + 1;
        Ok(Self {
            words: zeroed_cells(word_count)?,
            bits: fingerprint_bits,
            mask: u64::MAX >> (64 - fingerprint_bits),
            byte_len,
        })
    }

    #[inline]
    fn get(&self, bucket: u64) -> u32 {
        let pos = self.position(bucket);
        let mut value = self.words[pos.word].load(Ordering::Acquire) >> pos.offset;
        if pos.spill > 0 {
            value |= self.words[pos.word + 1].load(Ordering::Acquire) << (64 - pos.offset);
        }
        (value & self.mask) as u32
    }

    #[inline]
    fn set(&self, bucket: u64, value: u32) {
        self.replace(bucket, value);
    }

    #[inline]
    fn swap(&self, bucket: u64, value: u32) -> u32 {
        self.replace(bucket, value)
    }

    fn byte_len(&self) -> usize {
        self.byte_len
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_len + 8);
        for word in self.words.iter() {
            bytes.extend_from_slice(&word.load(Ordering::Acquire).to_le_bytes());
        }
        bytes.truncate(self.byte_len);
        bytes
    }

    fn load_bytes(&self, bytes: &[u8]) -> Result<()> {
        check_dump_len(self.byte_len, bytes.len())?;
        for (i, word) in self.words.iter().enumerate() {
            let start = (i * 8).min(bytes.len());
            let end = (start + 8).min(bytes.len());
            let mut raw = [0u8; 8];
            raw[..end - start].copy_from_slice(&bytes[start..end]);
            word.store(u64::from_le_bytes(raw), Ordering::Release);
        }
        Ok(())
    }
}

impl fmt::Debug for PackedPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedPlane")
            .field("bits", &self.bits)
            .field("words", &self.words.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(bits: u32) -> u32 {
        u32::MAX >> (32 - bits)
    }

    #[test]
    fn test_packed_round_trip_all_widths() {
        let buckets = 64u64;
        for bits in 1..=32 {
            let plane = PackedPlane::allocate(buckets, bits).unwrap();
            for b in 0..buckets {
                let value = (1023u32.wrapping_add(b as u32 * 7919)) & mask(bits);
                plane.set(b, value);
                assert_eq!(plane.get(b), value, "width {} bucket {}", bits, b);
            }
            // Writing later cells must not disturb earlier ones.
            for b in 0..buckets {
                let value = (1023u32.wrapping_add(b as u32 * 7919)) & mask(bits);
                assert_eq!(plane.get(b), value, "width {} bucket {} reread", bits, b);
            }
        }
    }

    #[test]
    fn test_packed_straddling_cell_neighbours() {
        // Width 13: bucket 4 occupies bits 52..65 and straddles words 0 and 1.
        let plane = PackedPlane::allocate(16, 13).unwrap();
        assert_eq!(plane.position(4).spill, 1);

        plane.set(3, 0x1FFF);
        plane.set(5, 0x1FFF);
        plane.set(4, 0x0AAA);
        assert_eq!(plane.get(3), 0x1FFF);
        assert_eq!(plane.get(4), 0x0AAA);
        assert_eq!(plane.get(5), 0x1FFF);

        plane.set(4, 0);
        assert_eq!(plane.get(3), 0x1FFF);
        assert_eq!(plane.get(4), 0);
        assert_eq!(plane.get(5), 0x1FFF);
    }

    #[test]
    fn test_packed_swap_returns_previous() {
        for bits in [1, 3, 7, 13, 17, 31] {
            let plane = PackedPlane::allocate(32, bits).unwrap();
            for b in 0..32u64 {
                let first = (b as u32 + 1) & mask(bits);
                let second = (!(b as u32)) & mask(bits);
                assert_eq!(plane.swap(b, first), 0);
                assert_eq!(plane.swap(b, second), first);
                assert_eq!(plane.get(b), second);
            }
        }
    }

    #[test]
    fn test_set_masks_excess_bits() {
        let plane = PackedPlane::allocate(8, 5).unwrap();
        plane.set(2, 0xFFFF_FFFF);
        assert_eq!(plane.get(2), 0x1F);
        assert_eq!(plane.get(1), 0);
        assert_eq!(plane.get(3), 0);
    }

    #[test]
    fn test_aligned_planes() {
        let byte = BytePlane::allocate(8, 8).unwrap();
        byte.set(7, 0xAB);
        assert_eq!(byte.get(7), 0xAB);
        assert_eq!(byte.swap(7, 0x01), 0xAB);

        let short = ShortPlane::allocate(8, 16).unwrap();
        short.set(0, 0xBEEF);
        assert_eq!(short.get(0), 0xBEEF);

        let int = IntPlane::allocate(8, 32).unwrap();
        int.set(3, u32::MAX);
        assert_eq!(int.swap(3, 42), u32::MAX);
        assert_eq!(int.get(3), 42);
    }

    #[test]
    fn test_dump_length_matches_geometry() {
        assert_eq!(BytePlane::allocate(64, 8).unwrap().to_bytes().len(), 64);
        assert_eq!(ShortPlane::allocate(64, 16).unwrap().to_bytes().len(), 128);
        assert_eq!(IntPlane::allocate(64, 32).unwrap().to_bytes().len(), 256);
        assert_eq!(PackedPlane::allocate(64, 5).unwrap().to_bytes().len(), 40);
    }

    #[test]
    fn test_dump_and_load() {
        let plane = PackedPlane::allocate(32, 11).unwrap();
        for b in 0..32 {
            plane.set(b, (b as u32 * 37 + 1) & mask(11));
        }
        let bytes = plane.to_bytes();

        let restored = PackedPlane::allocate(32, 11).unwrap();
        restored.load_bytes(&bytes).unwrap();
        for b in 0..32 {
            assert_eq!(restored.get(b), plane.get(b));
        }

        assert!(matches!(
            restored.load_bytes(&bytes[1..]),
            Err(CuckooCraftError::SnapshotMismatch { .. })
        ));
    }

    #[test]
    fn test_packed_dump_is_lsb_first_stream() {
        let plane = PackedPlane::allocate(8, 4).unwrap();
        plane.set(0, 0x1);
        plane.set(1, 0x2);
        plane.set(2, 0xF);
        let bytes = plane.to_bytes();
        assert_eq!(bytes, vec![0x21, 0x0F, 0, 0]);
    }
}
