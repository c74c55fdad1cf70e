//! Fixed-length bit-vectors used as face keys.

use std::fmt;

const WORD: usize = 64;

/// Bit-vector over a fixed universe `0..size`.
///
/// Invariants:
/// - Bits at positions `>= size` are always zero, so derived `Eq`, `Ord` and
///   `Hash` depend on the set only.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    words: Vec<u64>,
    size: usize,
}

impl Signature {
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size.div_ceil(WORD)],
            size,
        }
    }

    pub fn full(size: usize) -> Self {
        let mut s = Self::new(size);
        for i in 0..size {
            s.set(i);
        }
        s
    }

    pub fn from_indices(size: usize, idx: impl IntoIterator<Item = usize>) -> Self {
        let mut s = Self::new(size);
        for i in idx {
            s.set(i);
        }
        s
    }

    /// Size of the universe, not the number of set bits.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.size);
        (self.words[i / WORD] >> (i % WORD)) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, i: usize) {
        debug_assert!(i < self.size);
        self.words[i / WORD] |= 1 << (i % WORD);
    }

    #[inline]
    pub fn reset(&mut self, i: usize) {
        debug_assert!(i < self.size);
        self.words[i / WORD] &= !(1 << (i % WORD));
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    pub fn none(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        debug_assert_eq!(self.size, other.size);
        self.words
            .iter()
            .zip(&other.words)
            .all(|(a, b)| a & !b == 0)
    }

    pub fn and(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.and_assign(other);
        out
    }

    pub fn or(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.or_assign(other);
        out
    }

    pub fn and_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.size, other.size);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= b;
        }
    }

    pub fn or_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.size, other.size);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
    }

    /// Indices of set bits in increasing order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(k, &w)| {
            let mut w = w;
            std::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let t = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(k * WORD + t)
            })
        })
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.size {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_ops_and_iteration() {
        let a = Signature::from_indices(70, [0, 3, 64, 69]);
        let b = Signature::from_indices(70, [3, 64]);
        assert_eq!(a.count(), 4);
        assert!(b.is_subset_of(&a));
        assert!(!a.is_subset_of(&b));
        assert_eq!(a.and(&b), b);
        assert_eq!(a.ones().collect::<Vec<_>>(), vec![0, 3, 64, 69]);
        let mut c = b.clone();
        c.reset(3);
        c.or_assign(&Signature::from_indices(70, [1]));
        assert_eq!(c.ones().collect::<Vec<_>>(), vec![1, 64]);
        assert!(Signature::new(5).none());
        assert_eq!(Signature::full(5).count(), 5);
        assert_eq!(format!("{:?}", Signature::from_indices(4, [1, 2])), "0110");
    }
}
