//! Growable bitset over a dense id space.
//!
//! Bit ordering: index `n` lives in bit `n % 64` of word `n / 64`, least
//! significant bit first. The word vector only ever grows; binary operations
//! between bitsets of different lengths treat the missing words of the
//! shorter operand as zero.

use std::collections::TryReserveError;

const WORD_BITS: usize = u64::BITS as usize;

#[derive(Debug, Clone, Default)]
pub(crate) struct IdBitset {
    words: Vec<u64>,
}

fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

impl IdBitset {
    /// A bitset with room for indices `0..bits` without further growth.
    pub(crate) fn with_bits(bits: usize) -> Result<Self, TryReserveError> {
        let mut words = Vec::new();
        let len = words_for(bits);
        words.try_reserve_exact(len)?;
        words.resize(len, 0);
        Ok(Self { words })
    }

    /// Number of indices representable without growing.
    pub(crate) fn capacity_bits(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    fn grow_to(&mut self, words: usize) -> Result<(), TryReserveError> {
        if words > self.words.len() {
            self.words.try_reserve(words - self.words.len())?;
            tracing::trace!(from = self.words.len(), to = words, "bitset grown");
            self.words.resize(words, 0);
        }
        Ok(())
    }

    /// Set bit `index`. Returns whether it was previously clear.
    pub(crate) fn insert(&mut self, index: usize) -> Result<bool, TryReserveError> {
        let (word, mask) = (index / WORD_BITS, 1u64 << (index % WORD_BITS));
        self.grow_to(word + 1)?;
        let was_clear = self.words[word] & mask == 0;
        self.words[word] |= mask;
        Ok(was_clear)
    }

    /// Clear bit `index`. Returns whether it was set.
    pub(crate) fn remove(&mut self, index: usize) -> bool {
        let (word, mask) = (index / WORD_BITS, 1u64 << (index % WORD_BITS));
        match self.words.get_mut(word) {
            Some(w) if *w & mask != 0 => {
                *w &= !mask;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .is_some_and(|w| w & (1u64 << (index % WORD_BITS)) != 0)
    }

    pub(crate) fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub(crate) fn clear(&mut self) {
        self.words.fill(0);
    }

    /// The `n`-th set index in ascending order.
    pub(crate) fn nth_set(&self, mut n: usize) -> Option<usize> {
        for (i, &word) in self.words.iter().enumerate() {
            let ones = word.count_ones() as usize;
            if n < ones {
                let mut w = word;
                for _ in 0..n {
                    w &= w - 1;
                }
                return Some(i * WORD_BITS + w.trailing_zeros() as usize);
            }
            n -= ones;
        }
        None
    }

    pub(crate) fn iter(&self) -> Ones<'_> {
        Ones {
            words: &self.words,
            index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    pub(crate) fn union_with(&mut self, other: &Self) -> Result<(), TryReserveError> {
        self.grow_to(other.words.len())?;
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
        Ok(())
    }

    pub(crate) fn intersect_with(&mut self, other: &Self) {
        for (i, a) in self.words.iter_mut().enumerate() {
            *a &= other.words.get(i).copied().unwrap_or(0);
        }
    }

    pub(crate) fn difference_with(&mut self, other: &Self) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !b;
        }
    }

    pub(crate) fn symmetric_difference_with(&mut self, other: &Self) -> Result<(), TryReserveError> {
        self.grow_to(other.words.len())?;
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a ^= b;
        }
        Ok(())
    }

    /// Flip every bit in `first..=last`, growing as needed; bits outside the
    /// range are cleared.
    pub(crate) fn complement_within(&mut self, first: usize, last: usize) -> Result<(), TryReserveError> {
        if first > last {
            self.clear();
            return Ok(());
        }
        self.grow_to(last / WORD_BITS + 1)?;
        for (i, word) in self.words.iter_mut().enumerate() {
            *word = !*word & range_mask(i, first, last);
        }
        Ok(())
    }

    pub(crate) fn is_subset(&self, other: &Self) -> bool {
        self.words
            .iter()
            .enumerate()
            .all(|(i, a)| a & !other.words.get(i).copied().unwrap_or(0) == 0)
    }

    pub(crate) fn is_disjoint(&self, other: &Self) -> bool {
        self.words.iter().zip(&other.words).all(|(a, b)| a & b == 0)
    }
}

/// Mask of the bits of word `word` that fall inside `first..=last`.
fn range_mask(word: usize, first: usize, last: usize) -> u64 {
    let lo = word * WORD_BITS;
    let hi = lo + WORD_BITS - 1;
    if hi < first || lo > last {
        return 0;
    }
    let start = first.saturating_sub(lo);
    let end = (last - lo).min(WORD_BITS - 1);
    let upper = if end == WORD_BITS - 1 {
        u64::MAX
    } else {
        (1u64 << (end + 1)) - 1
    };
    upper & !((1u64 << start) - 1)
}

impl PartialEq for IdBitset {
    fn eq(&self, other: &Self) -> bool {
        let longest = self.words.len().max(other.words.len());
        (0..longest).all(|i| {
            self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0)
        })
    }
}

impl Eq for IdBitset {}

/// Ascending iterator over set indices.
#[derive(Debug, Clone)]
pub(crate) struct Ones<'a> {
    words: &'a [u64],
    index: usize,
    current: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.index * WORD_BITS + bit);
            }
            self.index += 1;
            self.current = *self.words.get(self.index)?;
        }
    }
}
