//! A membership set of distinct values.
//!
//! Thin wrapper over `HashSet` whose mutators report whether they changed
//! anything. Not synchronised; owners serialise access themselves.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::collections::hash_set;
use std::hash::Hash;

/// A set of distinct values with O(1) expected membership operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set<T: Eq + Hash>(HashSet<T>);

impl<T: Eq + Hash> Set<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Set(HashSet::new())
    }

    /// Inserts `value`. Returns true if it was not already present.
    pub fn add(&mut self, value: T) -> bool {
        self.0.insert(value)
    }

    /// Inserts every value from `values`.
    pub fn add_multiple<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.0.extend(values);
    }

    /// Removes `value`. Returns true if it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.0.remove(value)
    }

    /// Returns true if `value` is in the set.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.0.contains(value)
    }

    /// Returns true if every one of `values` is in the set.
    pub fn contains_all<'a, Q, I>(&self, values: I) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized + 'a,
        I: IntoIterator<Item = &'a Q>,
    {
        values.into_iter().all(|v| self.0.contains(v))
    }

    /// Removes all values.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the values in arbitrary order.
    pub fn iter(&self) -> hash_set::Iter<'_, T> {
        self.0.iter()
    }

    /// Returns a copy of the values in arbitrary order.
    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.0.iter().cloned().collect()
    }
}

impl<T: Eq + Hash> Default for Set<T> {
    fn default() -> Self {
        Set::new()
    }
}

impl<T: Eq + Hash> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Set(iter.into_iter().collect())
    }
}

impl<T: Eq + Hash> Extend<T> for Set<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<T: Eq + Hash> IntoIterator for Set<T> {
    type Item = T;
    type IntoIter = hash_set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T: Eq + Hash> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = hash_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_reports_novelty() {
        let mut set = Set::new();
        assert!(set.add("a"));
        assert!(!set.add("a"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_reports_presence() {
        let mut set: Set<&str> = ["a", "b"].into_iter().collect();
        assert!(set.remove("a"));
        assert!(!set.remove("a"));
        assert!(!set.contains("a"));
        assert!(set.contains("b"));
    }

    #[test]
    fn byte_strings_are_queried_by_slice() {
        let mut set: Set<Vec<u8>> = Set::new();
        set.add(b"payload".to_vec());
        assert!(set.contains(b"payload".as_slice()));
        assert!(!set.contains(b"other".as_slice()));
        assert!(set.remove(b"payload".as_slice()));
        assert!(set.is_empty());
    }

    #[test]
    fn add_multiple_and_contains_all() {
        let mut set = Set::new();
        set.add_multiple(["a", "b", "c", "a"]);
        assert_eq!(set.len(), 3);
        assert!(set.contains_all(&["a", "c"]));
        assert!(!set.contains_all(&["a", "z"]));
        let none: [&str; 0] = [];
        assert!(set.contains_all(&none));

        let mut values = set.values();
        values.sort();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn clear_empties() {
        let mut set: Set<u32> = (0..10).collect();
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(&3));
    }

    proptest! {
        /// The set agrees with `HashSet` on every add/remove outcome.
        #[test]
        fn matches_hashset_model(ops in prop::collection::vec((any::<bool>(), 0u8..8), 0..64)) {
            let mut set = Set::new();
            let mut model = HashSet::new();
            for (insert, v) in ops {
                if insert {
                    prop_assert_eq!(set.add(v), model.insert(v));
                } else {
                    prop_assert_eq!(set.remove(&v), model.remove(&v));
                }
                prop_assert_eq!(set.len(), model.len());
            }
        }
    }
}
