//! Natural-key collections owned by an aggregate
//!
//! A [`KeyedSet`] holds at most one element per natural key. Inserting an
//! element whose key is already present replaces the stored element in
//! place, so insertion order is otherwise preserved.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value identified by a natural key
pub trait Keyed {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;
}

/// A set of [`Keyed`] values with upsert-by-key semantics
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedSet<T> {
    items: Vec<T>,
}

impl<T> Default for KeyedSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed> KeyedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item`, replacing and returning any element with the same key
    pub fn upsert(&mut self, item: T) -> Option<T> {
        let key = item.key();
        match self.items.iter().position(|existing| existing.key() == key) {
            Some(index) => Some(std::mem::replace(&mut self.items[index], item)),
            None => {
                self.items.push(item);
                None
            }
        }
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| &item.key() == key)
    }

    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        self.items.iter_mut().find(|item| &item.key() == key)
    }

    /// Removes the element with the given key
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        let index = self.items.iter().position(|item| &item.key() == key)?;
        Some(self.items.remove(index))
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.get(key).is_some()
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, f: F) {
        self.items.retain(f);
    }
}

impl<T> KeyedSet<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Keyed> FromIterator<T> for KeyedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = KeyedSet::new();
        for item in iter {
            set.upsert(item);
        }
        set
    }
}

impl<T: Keyed> Extend<T> for KeyedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.upsert(item);
        }
    }
}

impl<T> IntoIterator for KeyedSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a KeyedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for KeyedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

impl<'de, T> Deserialize<'de> for KeyedSet<T>
where
    T: Keyed + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyedSetVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for KeyedSetVisitor<T>
        where
            T: Keyed + Deserialize<'de>,
        {
            type Value = KeyedSet<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a sequence of keyed values")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut set = KeyedSet::new();
                while let Some(item) = seq.next_element()? {
                    set.upsert(item);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(KeyedSetVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        kind: String,
        value: u32,
    }

    impl Keyed for Entry {
        type Key = String;

        fn key(&self) -> String {
            self.kind.clone()
        }
    }

    fn entry(kind: &str, value: u32) -> Entry {
        Entry {
            kind: kind.to_string(),
            value,
        }
    }

    #[test]
    fn test_upsert_replaces_equal_key() {
        let mut set = KeyedSet::new();
        assert!(set.upsert(entry("home", 1)).is_none());
        assert!(set.upsert(entry("work", 2)).is_none());

        let previous = set.upsert(entry("home", 3));
        assert_eq!(previous, Some(entry("home", 1)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&"home".to_string()).map(|e| e.value), Some(3));
        // Replacement keeps the original position
        assert_eq!(set.as_slice()[0].kind, "home");
    }

    #[test]
    fn test_remove() {
        let mut set: KeyedSet<Entry> = vec![entry("a", 1), entry("b", 2)].into_iter().collect();
        assert_eq!(set.remove(&"a".to_string()), Some(entry("a", 1)));
        assert!(set.remove(&"a".to_string()).is_none());
        assert!(!set.contains(&"a".to_string()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_deserialize_collapses_duplicate_keys() {
        let json = r#"[{"kind":"a","value":1},{"kind":"a","value":2}]"#;
        let set: KeyedSet<Entry> = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.as_slice()[0].value, 2);
    }
}
