use std::{
    collections::{HashSet, VecDeque},
    fmt::Debug,
    hash::Hash,
};

/// Something with a stable identity
pub trait Keyed {
    type Key: Clone + Debug + Eq + Hash;

    fn key(&self) -> &Self::Key;
}

impl Keyed for crate::api::Reply {
    type Key = crate::api::CommentId;

    fn key(&self) -> &crate::api::CommentId {
        &self.id
    }
}

/// Insertion-ordered list where each key appears at most once
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyedList<T: Keyed> {
    items: VecDeque<T>,
    keys: HashSet<T::Key>,
}

impl<T: Keyed> Default for KeyedList<T> {
    fn default() -> Self {
        KeyedList {
            items: VecDeque::new(),
            keys: HashSet::new(),
        }
    }
}

impl<T: Keyed> KeyedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.keys.contains(key)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.keys.clear();
    }

    /// Appends `item` unless its key is already present; returns whether it was added
    pub fn push_back(&mut self, item: T) -> bool {
        if !self.keys.insert(item.key().clone()) {
            return false;
        }
        self.items.push_back(item);
        true
    }

    /// Prepends `item` unless its key is already present; returns whether it was added
    pub fn push_front(&mut self, item: T) -> bool {
        if !self.keys.insert(item.key().clone()) {
            return false;
        }
        self.items.push_front(item);
        true
    }

    /// Appends every item whose key is not present yet, returning how many were added
    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) -> usize {
        items
            .into_iter()
            .map(|item| usize::from(self.push_back(item)))
            .sum()
    }

    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        if !self.keys.remove(key) {
            return None;
        }
        let idx = self.items.iter().position(|i| i.key() == key)?;
        self.items.remove(idx)
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        if !self.keys.contains(key) {
            return None;
        }
        self.items.iter().find(|i| i.key() == key)
    }

    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        if !self.keys.contains(key) {
            return None;
        }
        self.items.iter_mut().find(|i| i.key() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().cloned().collect()
    }
}

impl<T: Keyed> FromIterator<T> for KeyedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut res = KeyedList::new();
        res.extend(iter);
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Eq, PartialEq)]
    struct Item(u32, &'static str);

    impl Keyed for Item {
        type Key = u32;

        fn key(&self) -> &u32 {
            &self.0
        }
    }

    #[test]
    fn upsert_keeps_first_occurrence_and_order() {
        let mut l = KeyedList::new();
        assert_eq!(l.extend(vec![Item(1, "a"), Item(2, "b"), Item(1, "dup")]), 2);
        assert!(l.push_front(Item(0, "z")));
        assert!(!l.push_front(Item(2, "dup")));
        assert_eq!(
            l.to_vec(),
            vec![Item(0, "z"), Item(1, "a"), Item(2, "b")]
        );
    }

    #[test]
    fn removal_frees_the_key() {
        let mut l: KeyedList<Item> = vec![Item(1, "a"), Item(2, "b")].into_iter().collect();
        assert_eq!(l.remove(&1), Some(Item(1, "a")));
        assert_eq!(l.remove(&1), None);
        assert!(l.push_back(Item(1, "again")));
        assert_eq!(l.to_vec(), vec![Item(2, "b"), Item(1, "again")]);
    }
}
