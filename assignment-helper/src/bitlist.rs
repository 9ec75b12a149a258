//! Compact bit-list backed by a smallvec of 64-bit words.
use smallvec::SmallVec;

pub const INLINE_BIT_WORDS: usize = 4;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BitList {
    len: usize,
    words: SmallVec<[u64; INLINE_BIT_WORDS]>,
}

impl BitList {
    pub fn zeros(len: usize) -> Self {
        let word_len = len.div_ceil(64);
        let mut words: SmallVec<[u64; INLINE_BIT_WORDS]> = SmallVec::new();
        words.resize(word_len, 0);
        Self { len, words }
    }

    pub fn get(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        (self.words[idx / 64] >> (idx % 64)) & 1 == 1
    }

    pub fn set(&mut self, idx: usize, value: bool) {
        if idx >= self.len {
            return;
        }
        let mask = 1u64 << (idx % 64);
        if value {
            self.words[idx / 64] |= mask;
        } else {
            self.words[idx / 64] &= !mask;
        }
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of set bits in `start..end`, ascending.
    pub fn ones_in(&self, start: usize, end: usize) -> impl Iterator<Item = usize> + '_ {
        (start..end.min(self.len)).filter(move |&i| self.get(i))
    }
}
