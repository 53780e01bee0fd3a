// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Bitmask Module** - *Packed Boolean Masks*
//!
//! Packed, 64-byte aligned bit mask used for every null and validity mask the
//! operator engine computes.
//!
//! ## Behaviour
//! - LSB corresponds to the first logical element.
//! - Trailing padding bits are always masked off, so byte-wise `&`, `|` and
//!   `!` never leak bits past `len`.
//! - Set means `true`. Whether `true` reads as "missing" or "valid" depends on
//!   the producer, e.g. [`Column::isnull`](crate::Column::isnull) versus
//!   [`Column::notnull`](crate::Column::notnull).

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::ops::{BitAnd, BitOr, Not};

use vec64::Vec64;

/// # Bitmask
///
/// 64-byte aligned packed bit mask.
///
/// # Example
/// ```rust
/// use minframe::Bitmask;
///
/// let mut m = Bitmask::new_set_all(10, false);
/// m.set(3, true);
/// m.set(7, true);
/// assert!(m.get(3) && m.get(7));
/// assert_eq!(m.count_ones(), 2);
/// ```
#[derive(Clone, PartialEq, Default)]
pub struct Bitmask {
    pub bits: Vec64<u8>,
    pub len: usize,
}

impl Bitmask {
    /// Ensures all unused bits above `self.len` are zeroed.
    #[inline]
    pub fn mask_trailing_bits(&mut self) {
        if self.len == 0 || (self.len & 7) == 0 {
            return;
        }
        let last = self.bits.len() - 1;
        let mask = (1u8 << (self.len & 7)) - 1;
        self.bits[last] &= mask;
    }

    /// Create new mask, length = `len`, all bits set if `set` else cleared.
    #[inline]
    pub fn new_set_all(len: usize, set: bool) -> Self {
        let n_bytes = (len + 7) / 8;
        let mut data = Vec64::with_capacity(n_bytes);
        let fill = if set { 0xFF } else { 0 };
        data.resize(n_bytes, fill);
        let mut mask = Self { bits: data, len };
        mask.mask_trailing_bits();
        mask
    }

    /// Construct from a slice of bools (true = set).
    #[inline]
    pub fn from_bools(bits: &[bool]) -> Self {
        let len = bits.len();
        let n_bytes = (len + 7) / 8;
        let mut data = Vec64::with_capacity(n_bytes);
        data.resize(n_bytes, 0);
        for (i, &b) in bits.iter().enumerate() {
            if b {
                data[i >> 3] |= 1u8 << (i & 7);
            }
        }
        Self { bits: data, len }
    }

    /// Builds a mask of `len` bits where bit `i` is `f(i)`.
    #[inline]
    pub fn from_fn(len: usize, mut f: impl FnMut(usize) -> bool) -> Self {
        let n_bytes = (len + 7) / 8;
        let mut data = Vec64::with_capacity(n_bytes);
        data.resize(n_bytes, 0);
        for i in 0..len {
            if f(i) {
                data[i >> 3] |= 1u8 << (i & 7);
            }
        }
        Self { bits: data, len }
    }

    /// Returns the logical length of the bitmask
    ///
    /// *Excludes padding*
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns bit `idx`, or `false` when `idx >= len`.
    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        (self.bits[idx >> 3] >> (idx & 7)) & 1 != 0
    }

    /// Set or clear bit at index `i`, growing the mask when needed.
    #[inline]
    pub fn set(&mut self, i: usize, value: bool) {
        if i >= self.len {
            self.resize(i + 1, false);
        }
        let byte = &mut self.bits[i >> 3];
        let bit = 1u8 << (i & 7);
        if value {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }

    /// Resizes mask to `new_len`. New bits set or cleared per `set`.
    pub fn resize(&mut self, new_len: usize, set: bool) {
        let old_len = self.len;
        let new_bytes = (new_len + 7) / 8;
        let fill = if set { 0xFF } else { 0 };
        self.bits.resize(new_bytes, fill);
        self.len = new_len;
        // bits of the old partial byte were zeroed by the trailing mask
        if set && new_len > old_len {
            for i in old_len..usize::min(new_len, (old_len + 7) / 8 * 8) {
                self.bits[i >> 3] |= 1u8 << (i & 7);
            }
        }
        self.mask_trailing_bits();
    }

    /// Count number of set (1) bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|&b| b.count_ones() as usize).sum()
    }

    /// Count number of cleared (0) bits.
    #[inline]
    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    /// Returns true if every bit is set. Vacuously true when empty.
    #[inline]
    pub fn all_set(&self) -> bool {
        self.count_ones() == self.len
    }

    /// Returns true if any bit is set.
    #[inline]
    pub fn any(&self) -> bool {
        self.bits.iter().any(|&b| b != 0)
    }

    /// Logical 'or' (elementwise) with another mask.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        assert_eq!(self.len, other.len, "Bitmask::union length mismatch");
        let mut out = self.clone();
        for (a, b) in out.bits.iter_mut().zip(other.bits.iter()) {
            *a |= *b;
        }
        out
    }

    /// Logical 'and' (elementwise) with another mask.
    #[inline]
    pub fn intersect(&self, other: &Self) -> Self {
        assert_eq!(self.len, other.len, "Bitmask::intersect length mismatch");
        let mut out = self.clone();
        for (a, b) in out.bits.iter_mut().zip(other.bits.iter()) {
            *a &= *b;
        }
        out
    }

    /// Invert all bits (set <-> clear).
    #[inline]
    pub fn invert(&self) -> Self {
        let mut out = self.clone();
        for b in out.bits.iter_mut() {
            *b = !*b;
        }
        out.mask_trailing_bits();
        out
    }

    /// Iterator over all indices with set bits.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        let n = self.len;
        self.bits.iter().enumerate().flat_map(move |(byte_i, &b)| {
            let base = byte_i * 8;
            (0..8).filter_map(move |bit| {
                let idx = base + bit;
                if idx < n && ((b >> bit) & 1) != 0 {
                    Some(idx)
                } else {
                    None
                }
            })
        })
    }

    /// Iterator over every bit in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Unpacks into one `bool` per position.
    pub fn to_bools(&self) -> Vec<bool> {
        self.iter().collect()
    }
}

impl Debug for Bitmask {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Bitmask")
            .field("len", &self.len)
            .field("ones", &self.count_ones())
            .field("zeros", &self.count_zeros())
            .finish()
    }
}

impl BitAnd for &Bitmask {
    type Output = Bitmask;
    #[inline]
    fn bitand(self, rhs: Self) -> Bitmask {
        self.intersect(rhs)
    }
}

impl BitOr for &Bitmask {
    type Output = Bitmask;
    #[inline]
    fn bitor(self, rhs: Self) -> Bitmask {
        self.union(rhs)
    }
}

impl Not for &Bitmask {
    type Output = Bitmask;
    #[inline]
    fn not(self) -> Bitmask {
        self.invert()
    }
}

impl Not for Bitmask {
    type Output = Bitmask;
    #[inline]
    fn not(self) -> Bitmask {
        self.invert()
    }
}

impl Display for Bitmask {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(
            f,
            "Bitmask [{} bits] (ones: {}, zeros: {})",
            self.len,
            self.count_ones(),
            self.count_zeros()
        )?;

        const MAX_PREVIEW: usize = 64;
        write!(f, "[")?;
        for i in 0..usize::min(self.len, MAX_PREVIEW) {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        if self.len > MAX_PREVIEW {
            write!(f, " … ({} total)", self.len)?;
        }
        write!(f, "]")
    }
}
