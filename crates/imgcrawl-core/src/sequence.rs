//! Growable sequence with balanced recursive splitting.
//!
//! [`SplittableSequence`] is an owned, contiguous buffer. Its [`SplitView`]
//! walks an unconsumed `[index, end)` range and can hand off the back half of
//! that range to another worker without copying anything, which is what the
//! fork-join strategy and [`SplittableSequence::par_iter`] build on.

use rayon::prelude::*;

use crate::error::SequenceError;

/// Capacity allocated on the first append to an empty sequence.
pub const DEFAULT_CAPACITY: usize = 10;

/// Ordered, growable container supporting balanced splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplittableSequence<T> {
    items: Vec<T>,
}

impl<T> SplittableSequence<T> {
    /// Create an empty sequence. Nothing is allocated until the first append.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty sequence with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Append an item, doubling capacity on overflow.
    pub fn append(&mut self, item: T) {
        self.ensure_capacity(self.items.len() + 1);
        self.items.push(item);
    }

    /// Grow to at least `min_capacity`, starting from [`DEFAULT_CAPACITY`]
    /// and doubling.
    fn ensure_capacity(&mut self, min_capacity: usize) {
        let current = self.items.capacity();
        if current >= min_capacity {
            return;
        }
        let mut capacity = if current == 0 { DEFAULT_CAPACITY } else { current };
        while capacity < min_capacity {
            capacity *= 2;
        }
        self.items.reserve_exact(capacity - self.items.len());
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Replace the item at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, item: T) -> Result<T, SequenceError> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(SequenceError::OutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, item))
    }

    /// Remove the item at `index`, shifting later items down.
    pub fn remove_at(&mut self, index: usize) -> Result<T, SequenceError> {
        if index >= self.items.len() {
            return Err(SequenceError::OutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Position of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.items.iter().position(|candidate| candidate == item)
    }

    /// Replace every item with the result of `op`.
    pub fn replace_all<F>(&mut self, mut op: F)
    where
        F: FnMut(&T) -> T,
    {
        for slot in self.items.iter_mut() {
            *slot = op(slot);
        }
    }

    /// Keep only the items matching `keep`, preserving order.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.items.retain(keep);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.clone()
    }

    /// A splittable view over the whole sequence.
    pub fn split_view(&self) -> SplitView<'_, T> {
        SplitView::new(&self.items)
    }

    /// A cursor that can remove the item it last returned.
    pub fn cursor(&mut self) -> Cursor<'_, T> {
        Cursor {
            seq: self,
            next: 0,
            last: None,
        }
    }

    /// Parallel iterator driven by recursive [`SplitView::split`].
    pub fn par_iter(&self) -> impl ParallelIterator<Item = &T>
    where
        T: Sync,
    {
        rayon::iter::split(self.split_view(), |mut view| {
            let rest = view.split();
            (view, rest)
        })
        .flat_map_iter(|view| view)
    }
}

impl<T> Default for SplittableSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for SplittableSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.append(item);
        }
    }
}

impl<T> FromIterator<T> for SplittableSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<T> From<Vec<T>> for SplittableSequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> IntoIterator for SplittableSequence<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a SplittableSequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Borrowed view over the unconsumed range `[index, end)` of a sequence.
///
/// Iterating consumes from the front. [`split`](Self::split) hands the back
/// half to a new view and shrinks this one, so the two views never overlap.
#[derive(Debug)]
pub struct SplitView<'a, T> {
    items: &'a [T],
    index: usize,
    end: usize,
}

impl<'a, T> SplitView<'a, T> {
    fn new(items: &'a [T]) -> Self {
        Self {
            items,
            index: 0,
            end: items.len(),
        }
    }

    /// Number of unconsumed items.
    pub fn len(&self) -> usize {
        self.end - self.index
    }

    pub fn is_empty(&self) -> bool {
        self.index == self.end
    }

    /// Split off `[mid, end)` where `mid = index + (end - index) / 2`.
    ///
    /// This view keeps `[index, mid)`. Returns `None` when fewer than two
    /// items remain.
    pub fn split(&mut self) -> Option<SplitView<'a, T>> {
        if self.len() < 2 {
            return None;
        }
        let mid = self.index + (self.end - self.index) / 2;
        let rest = SplitView {
            items: self.items,
            index: mid,
            end: self.end,
        };
        self.end = mid;
        Some(rest)
    }

    /// The unconsumed items as a slice.
    pub fn as_slice(&self) -> &'a [T] {
        &self.items[self.index..self.end]
    }
}

impl<T> Clone for SplitView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items,
            index: self.index,
            end: self.end,
        }
    }
}

impl<'a, T> Iterator for SplitView<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.end {
            let item = &self.items[self.index];
            self.index += 1;
            Some(item)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl<T> ExactSizeIterator for SplitView<'_, T> {}

/// Single-threaded cursor supporting removal of the last returned item.
pub struct Cursor<'a, T> {
    seq: &'a mut SplittableSequence<T>,
    next: usize,
    last: Option<usize>,
}

impl<T> Cursor<'_, T> {
    /// Move to the next item.
    pub fn advance(&mut self) -> Option<&T> {
        let index = self.next;
        let item = self.seq.items.get(index)?;
        self.last = Some(index);
        self.next = index + 1;
        Some(item)
    }

    /// Remove the item last returned by [`advance`](Self::advance).
    ///
    /// Can be called once per advance.
    pub fn remove(&mut self) -> Result<T, SequenceError> {
        let index = self.last.take().ok_or(SequenceError::NothingToRemove)?;
        let item = self.seq.remove_at(index)?;
        self.next = index;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_starts_at_default_and_doubles() {
        let mut seq = SplittableSequence::new();
        assert_eq!(seq.capacity(), 0);

        seq.append(0);
        assert!(seq.capacity() >= DEFAULT_CAPACITY);

        for i in 1..=DEFAULT_CAPACITY {
            seq.append(i);
        }
        assert!(seq.capacity() >= DEFAULT_CAPACITY * 2);
        assert_eq!(seq.len(), DEFAULT_CAPACITY + 1);
    }

    #[test]
    fn test_remove_at_shifts() {
        let mut seq: SplittableSequence<_> = ["a", "b", "c", "d"].into_iter().collect();
        assert_eq!(seq.remove_at(1), Ok("b"));
        assert_eq!(seq.as_slice(), &["a", "c", "d"]);
        assert_eq!(
            seq.remove_at(3),
            Err(SequenceError::OutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_split_seven() {
        let seq: SplittableSequence<u32> = (0..7).collect();
        let mut front = seq.split_view();
        let back = front.split().unwrap();

        assert_eq!(front.len(), 3);
        assert_eq!(back.len(), 4);

        let rejoined: Vec<u32> = front.chain(back).copied().collect();
        assert_eq!(rejoined, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_after_partial_consumption() {
        let seq: SplittableSequence<u32> = (0..6).collect();
        let mut view = seq.split_view();
        assert_eq!(view.next(), Some(&0));
        assert_eq!(view.next(), Some(&1));

        // Remaining [2, 6): mid = 2 + 2 = 4
        let back = view.split().unwrap();
        assert_eq!(view.as_slice(), &[2, 3]);
        assert_eq!(back.as_slice(), &[4, 5]);
    }

    #[test]
    fn test_split_too_small() {
        let seq: SplittableSequence<u32> = std::iter::once(1).collect();
        let mut view = seq.split_view();
        assert!(view.split().is_none());
        assert_eq!(view.len(), 1);

        let empty: SplittableSequence<u32> = SplittableSequence::new();
        assert!(empty.split_view().split().is_none());
    }

    #[test]
    fn test_cursor_removal() {
        let mut seq: SplittableSequence<u32> = (1..=6).collect();
        let mut cursor = seq.cursor();
        while let Some(&value) = cursor.advance() {
            if value % 2 == 0 {
                cursor.remove().unwrap();
            }
        }
        assert_eq!(seq.as_slice(), &[1, 3, 5]);
    }

    #[test]
    fn test_cursor_double_remove() {
        let mut seq: SplittableSequence<u32> = (1..=3).collect();
        let mut cursor = seq.cursor();
        cursor.advance();
        assert_eq!(cursor.remove(), Ok(1));
        assert_eq!(cursor.remove(), Err(SequenceError::NothingToRemove));
    }

    #[test]
    fn test_par_iter_sum() {
        let seq: SplittableSequence<u64> = (1..=1000).collect();
        let total: u64 = seq.par_iter().sum();
        assert_eq!(total, 500_500);
    }
}
