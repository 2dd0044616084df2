use std::cmp::Ordering;
use std::collections::TryReserveError;

/// Sorted, duplicate-free sequence of child handles.
///
/// The set does not know how its elements compare. Callers pass the comparator to
/// [`OrderedChildSet::search_by`] and insert at the position it reports, which lets the
/// set hold arena ids ordered by the path of the node they point to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedChildSet<T> {
    items: Vec<T>,
}

impl<T> Default for OrderedChildSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> OrderedChildSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Binary search with a caller supplied comparator.
    ///
    /// Returns `Ok(index)` of a matching element or `Err(index)` where a new element
    /// would keep the set sorted.
    pub fn search_by<F>(&self, compare: F) -> Result<usize, usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.items.binary_search_by(compare)
    }

    /// Inserts at `index`, which must come from a failed [`OrderedChildSet::search_by`].
    pub fn insert_at(&mut self, index: usize, item: T) -> Result<(), TryReserveError> {
        self.items.try_reserve(1)?;
        self.items.insert(index, item);
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }
}

impl<'a, T> IntoIterator for &'a OrderedChildSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for OrderedChildSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
