//! Workspaces are bits in a mask, a window can be on any number of them at once

use std::{
    fmt,
    ops::{BitAnd, BitOr, BitXor},
};

use common::TagValueError;

/// More than this and the mask doesn't fit in an `u32` with room to spare
pub(crate) const MAX_TAGS: usize = 31;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct TagMask(u32);

impl TagMask {
    pub(crate) const EMPTY: Self = Self(0);

    pub(crate) fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Every tag out of `count`
    pub(crate) fn all(count: usize) -> Self {
        let count = count.min(MAX_TAGS);
        Self(((1_u64 << count) - 1) as u32)
    }

    /// Only the tag with the given (0 based) index
    pub(crate) fn single(index: usize) -> Result<Self, TagValueError> {
        if index >= MAX_TAGS {
            Err(TagValueError { tag_num: index + 1 })
        } else {
            Ok(Self(1 << index))
        }
    }

    pub(crate) fn bits(self) -> u32 {
        self.0
    }

    pub(crate) fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub(crate) fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub(crate) fn contains(self, index: usize) -> bool {
        index < MAX_TAGS && self.0 & (1 << index) != 0
    }

    /// Drop every bit outside of the first `count` tags
    pub(crate) fn masked(self, count: usize) -> Self {
        self & Self::all(count)
    }

    pub(crate) fn first_index(self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }
}

impl BitOr for TagMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for TagMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitXor for TagMask {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl fmt::Display for TagMask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

/// The tags a monitor shows.
///
/// Two of them are kept so `view` can jump back to the previous selection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct TagSet {
    sets: [TagMask; 2],
    selected: usize,
}

impl TagSet {
    pub(crate) fn new(initial: TagMask) -> Self {
        Self {
            sets: [initial, initial],
            selected: 0,
        }
    }

    pub(crate) fn active(&self) -> TagMask {
        self.sets[self.selected]
    }

    /// Show `mask`, or the previous view if `mask` is empty.
    ///
    /// Returns false when nothing changed.
    pub(crate) fn view(&mut self, mask: TagMask) -> bool {
        if mask == self.active() {
            return false;
        }
        self.selected ^= 1;
        if !mask.is_empty() {
            self.sets[self.selected] = mask;
        }
        true
    }

    /// Flip the given tags in the active view, refusing to end up with none visible
    pub(crate) fn toggle(&mut self, mask: TagMask) -> bool {
        let new = self.active() ^ mask;
        if new.is_empty() {
            return false;
        }
        self.sets[self.selected] = new;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(TagMask::all(9).bits(), 0x1ff);
        assert_eq!(TagMask::all(31).bits(), 0x7fff_ffff);
        assert_eq!(TagMask::single(3).unwrap().bits(), 0b1000);
        assert!(TagMask::single(31).is_err());
        assert_eq!(TagMask::from_bits(0xffff).masked(9).bits(), 0x1ff);
        assert_eq!(TagMask::from_bits(0b100).first_index(), Some(2));
        assert_eq!(TagMask::EMPTY.first_index(), None);
    }

    #[test]
    fn view_twice_goes_back() {
        let a = TagMask::single(0).unwrap();
        let b = TagMask::single(4).unwrap();
        let mut set = TagSet::new(a);

        assert!(set.view(b));
        assert_eq!(set.active(), b);
        assert!(!set.view(b));
        // an empty mask recalls the previous view
        assert!(set.view(TagMask::EMPTY));
        assert_eq!(set.active(), a);
        assert!(set.view(TagMask::EMPTY));
        assert_eq!(set.active(), b);
    }

    #[test]
    fn toggle_never_empties() {
        let a = TagMask::single(0).unwrap();
        let b = TagMask::single(1).unwrap();
        let mut set = TagSet::new(a);

        assert!(set.toggle(b));
        assert_eq!(set.active(), a | b);
        assert!(set.toggle(a));
        assert_eq!(set.active(), b);
        assert!(!set.toggle(b));
        assert_eq!(set.active(), b);
    }
}
