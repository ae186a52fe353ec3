use crate::types::ColorId;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-k-mer color membership: bit c is set iff the k-mer occurs in sample c.
/// Also used as the live color-support vector carried along a DFS walk, where
/// bits only ever clear.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorSet {
    bits: BitVec,
}

impl ColorSet {
    pub fn new(num_colors: usize) -> Self {
        ColorSet { bits: bitvec![0; num_colors] }
    }

    pub fn from_ids(num_colors: usize, ids: &[ColorId]) -> Self {
        let mut cs = ColorSet::new(num_colors);
        for &id in ids {
            cs.insert(id);
        }
        cs
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn insert(&mut self, color: ColorId) {
        self.bits.set(color, true);
    }

    #[inline]
    pub fn contains(&self, color: ColorId) -> bool {
        self.bits.get(color).map(|b| *b).unwrap_or(false)
    }

    /// True iff no sample bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// In-place intersection: `self := self AND other`.
    pub fn intersect_with(&mut self, other: &ColorSet) {
        debug_assert_eq!(self.bits.len(), other.bits.len());
        for i in 0..self.bits.len() {
            let v = self.bits[i] && other.bits[i];
            self.bits.set(i, v);
        }
    }

    /// Fraction of samples for which `head` and `tail` agree with each other
    /// and with this reference vector. Bits that are zero everywhere count as
    /// agreement, so a colorless neighbor can still score above zero.
    pub fn equal_bit_rate(&self, head: &ColorSet, tail: &ColorSet) -> f64 {
        let n = self.bits.len();
        if n == 0 {
            return 0.0;
        }
        let mut equal = 0usize;
        for i in 0..n {
            let h = head.bits[i];
            let t = tail.bits[i];
            if h == t && t == self.bits[i] {
                equal += 1;
            }
        }
        equal as f64 / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_and_empty() {
        let mut csv = ColorSet::from_ids(4, &[0, 1, 3]);
        let other = ColorSet::from_ids(4, &[1, 2, 3]);
        csv.intersect_with(&other);
        assert!(csv.contains(1));
        assert!(csv.contains(3));
        assert!(!csv.contains(0));
        assert!(!csv.is_empty());
        assert_eq!(csv.count(), 2);

        let none = ColorSet::new(4);
        csv.intersect_with(&none);
        assert!(csv.is_empty());
    }

    #[test]
    fn test_intersection_is_monotone() {
        let mut csv = ColorSet::from_ids(3, &[0, 2]);
        let before = csv.count();
        csv.intersect_with(&ColorSet::from_ids(3, &[0, 1, 2]));
        assert_eq!(csv.count(), before);
        csv.intersect_with(&ColorSet::from_ids(3, &[0]));
        assert!(csv.count() <= before);
    }

    #[test]
    fn test_equal_bit_rate() {
        let reference = ColorSet::from_ids(4, &[0, 1]);
        // full agreement on every bit, set or not
        let full = ColorSet::from_ids(4, &[0, 1]);
        assert_eq!(reference.equal_bit_rate(&full, &full), 1.0);

        // head and tail disagree on bit 1
        let head = ColorSet::from_ids(4, &[0, 1]);
        let tail = ColorSet::from_ids(4, &[0]);
        assert_eq!(reference.equal_bit_rate(&head, &tail), 0.75);

        // a colorless neighbor still scores on the reference's zero bits
        let blank = ColorSet::new(4);
        assert_eq!(reference.equal_bit_rate(&blank, &blank), 0.5);

        // complete disagreement
        let anti = ColorSet::from_ids(2, &[1]);
        let reference2 = ColorSet::from_ids(2, &[0]);
        assert_eq!(reference2.equal_bit_rate(&anti, &anti), 0.0);
    }
}
