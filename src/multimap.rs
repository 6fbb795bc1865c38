//! An ordered map from keys to lists of values.

use std::{borrow::Borrow, fmt, slice};

/// A hook deciding what happens when a missing value is added to a [`MultivaluedMap`].
///
/// The default methods drop the value.
pub trait NullValues<V> {
    /// Called when a missing value is appended to `values`.
    fn add_null(&self, values: &mut Vec<V>) {
        let _ = values;
    }

    /// Called when a missing value is inserted at the head of `values`.
    fn add_first_null(&self, values: &mut Vec<V>) {
        let _ = values;
    }
}

/// Drops missing values. This is the default hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DropNull;

impl<V> NullValues<V> for DropNull {}

/// Stores missing values as empty strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmptyString;

impl NullValues<String> for EmptyString {
    fn add_null(&self, values: &mut Vec<String>) {
        values.push(String::new());
    }

    fn add_first_null(&self, values: &mut Vec<String>) {
        values.insert(0, String::new());
    }
}

/// An ordered map from keys to lists of values.
///
/// Keys keep the order in which they were first inserted, and the values
/// of a key keep the order in which they were added. Missing values
/// (`None`) are handed to the [`NullValues`] hook `N`, which drops them
/// by default.
///
/// # Comparison
///
/// `==` compares the value lists of every key in order, regardless of key order.
/// Use [`equals_ignore_value_order`] to also ignore the order of values.
///
/// [`equals_ignore_value_order`]: Self::equals_ignore_value_order
///
/// # Examples
///
/// ```
/// use uri_template::MultivaluedMap;
///
/// let mut map: MultivaluedMap<&str, &str> = MultivaluedMap::new();
/// map.add("color", "red");
/// map.add("color", None);
/// map.add_first("color", "blue");
/// assert_eq!(map.get("color").unwrap(), &["blue", "red"]);
///
/// map.put_single("color", "green");
/// assert_eq!(map.get_first("color"), Some(&"green"));
/// ```
#[derive(Clone)]
pub struct MultivaluedMap<K, V, N = DropNull> {
    entries: Vec<(K, Vec<V>)>,
    nulls: N,
}

impl<K, V, N: Default> Default for MultivaluedMap<K, V, N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            nulls: N::default(),
        }
    }
}

impl<K, V> MultivaluedMap<K, V> {
    /// Creates an empty map that drops missing values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V, N> MultivaluedMap<K, V, N> {
    /// Creates an empty map with the given hook for missing values.
    #[must_use]
    pub fn with_null_values(nulls: N) -> Self {
        Self {
            entries: Vec::new(),
            nulls,
        }
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether the map has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Returns an iterator over the keys and their value lists, in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

impl<K: Eq, V, N: NullValues<V>> MultivaluedMap<K, V, N> {
    fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries.iter().position(|(k, _)| k.borrow() == key)
    }

    fn index_or_insert(&mut self, key: K) -> usize {
        match self.position(&key) {
            Some(i) => i,
            None => {
                self.entries.push((key, Vec::new()));
                self.entries.len() - 1
            }
        }
    }

    /// Appends a value to the list of a key.
    ///
    /// The key is inserted even if the value is missing and gets dropped.
    pub fn add(&mut self, key: K, value: impl Into<Option<V>>) {
        let value = value.into();
        let i = self.index_or_insert(key);
        let nulls = &self.nulls;
        let values = &mut self.entries[i].1;
        match value {
            Some(v) => values.push(v),
            None => nulls.add_null(values),
        }
    }

    /// Appends several values to the list of a key.
    pub fn add_all<I>(&mut self, key: K, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Option<V>>,
    {
        let i = self.index_or_insert(key);
        let nulls = &self.nulls;
        let list = &mut self.entries[i].1;
        for value in values {
            match value.into() {
                Some(v) => list.push(v),
                None => nulls.add_null(list),
            }
        }
    }

    /// Inserts a value at the head of the list of a key.
    pub fn add_first(&mut self, key: K, value: impl Into<Option<V>>) {
        let value = value.into();
        let i = self.index_or_insert(key);
        let nulls = &self.nulls;
        let values = &mut self.entries[i].1;
        match value {
            Some(v) => values.insert(0, v),
            None => nulls.add_first_null(values),
        }
    }

    /// Replaces the list of a key with a single value.
    pub fn put_single(&mut self, key: K, value: impl Into<Option<V>>) {
        let value = value.into();
        let i = self.index_or_insert(key);
        let nulls = &self.nulls;
        let values = &mut self.entries[i].1;
        values.clear();
        match value {
            Some(v) => values.push(v),
            None => nulls.add_null(values),
        }
    }

    /// Replaces the whole list of a key, returning the previous one.
    pub fn put(&mut self, key: K, values: Vec<V>) -> Option<Vec<V>> {
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, values)),
            None => {
                self.entries.push((key, values));
                None
            }
        }
    }

    /// Returns the list of values of a key.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.position(key).map(|i| &self.entries[i].1[..])
    }

    /// Returns the first value of a key.
    #[must_use]
    pub fn get_first<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.get(key).and_then(<[V]>::first)
    }

    /// Checks whether the map contains a key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.position(key).is_some()
    }

    /// Removes a key, returning its list of values.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Vec<V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Checks whether two maps have the same keys and, for every key,
    /// the same values in any order.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_template::MultivaluedMap;
    ///
    /// let a: MultivaluedMap<_, _> = [("k", 1), ("k", 2), ("j", 3)].into_iter().collect();
    /// let b: MultivaluedMap<_, _> = [("j", 3), ("k", 2), ("k", 1)].into_iter().collect();
    /// assert!(a != b);
    /// assert!(a.equals_ignore_value_order(&b));
    /// ```
    #[must_use]
    pub fn equals_ignore_value_order<M>(&self, other: &MultivaluedMap<K, V, M>) -> bool
    where
        V: PartialEq,
    {
        if self.len() != other.len() {
            return false;
        }
        self.entries.iter().all(|(k, values)| {
            let Some(j) = other.entries.iter().position(|(ok, _)| ok == k) else {
                return false;
            };
            let others = &other.entries[j].1;
            if values.len() != others.len() {
                return false;
            }
            let mut used = vec![false; others.len()];
            values.iter().all(|v| {
                match (0..others.len()).find(|&i| !used[i] && others[i] == *v) {
                    Some(i) => {
                        used[i] = true;
                        true
                    }
                    None => false,
                }
            })
        })
    }
}

impl<K: Eq, V: PartialEq, N, M> PartialEq<MultivaluedMap<K, V, M>> for MultivaluedMap<K, V, N> {
    fn eq(&self, other: &MultivaluedMap<K, V, M>) -> bool {
        self.len() == other.len()
            && self.entries.iter().all(|(k, values)| {
                other
                    .entries
                    .iter()
                    .any(|(ok, others)| ok == k && others == values)
            })
    }
}

impl<K: Eq, V: Eq, N> Eq for MultivaluedMap<K, V, N> {}

impl<K: fmt::Debug, V: fmt::Debug, N> fmt::Debug for MultivaluedMap<K, V, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<K: Eq, V, N: NullValues<V> + Default> FromIterator<(K, V)> for MultivaluedMap<K, V, N> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K: Eq, V, N: NullValues<V>> Extend<(K, V)> for MultivaluedMap<K, V, N> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.add(k, v);
        }
    }
}

/// An iterator over the keys and value lists of a [`MultivaluedMap`].
#[derive(Clone, Debug)]
pub struct Iter<'a, K, V> {
    inner: slice::Iter<'a, (K, Vec<V>)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a [V]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, &v[..]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, N> IntoIterator for &'a MultivaluedMap<K, V, N> {
    type Item = (&'a K, &'a [V]);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_are_dropped_by_default() {
        let mut map: MultivaluedMap<&str, String> = MultivaluedMap::new();
        map.add("a", None);
        assert!(map.contains_key("a"));
        assert_eq!(map.get("a").unwrap().len(), 0);
        map.put_single("a", None);
        assert_eq!(map.get("a").unwrap().len(), 0);
    }

    #[test]
    fn empty_string_hook() {
        let mut map: MultivaluedMap<&str, String, _> = MultivaluedMap::with_null_values(EmptyString);
        map.add("a", "x".to_owned());
        map.add("a", None);
        map.add_first("a", None);
        assert_eq!(map.get("a").unwrap(), ["", "x", ""]);
        map.put_single("b", None);
        assert_eq!(map.get("b").unwrap(), [""]);
    }

    #[test]
    fn key_order_is_insertion_order() {
        let mut map: MultivaluedMap<&str, i32> = MultivaluedMap::new();
        map.add("z", 1);
        map.add("a", 2);
        map.add("z", 3);
        assert!(map.keys().copied().eq(["z", "a"]));
        map.remove("z");
        map.add("z", 4);
        assert!(map.keys().copied().eq(["a", "z"]));
    }

    #[test]
    fn equality() {
        let a: MultivaluedMap<_, _> = [("k", 1), ("k", 1), ("k", 2)].into_iter().collect();
        let b: MultivaluedMap<_, _> = [("k", 2), ("k", 1), ("k", 1)].into_iter().collect();
        let c: MultivaluedMap<_, _> = [("k", 2), ("k", 2), ("k", 1)].into_iter().collect();
        assert!(a.equals_ignore_value_order(&b));
        assert!(!a.equals_ignore_value_order(&c));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
