//! Latest raw jstat line per category.
//!
//! One `RwLock` covers all categories. Writers replace a complete `String`
//! under the write lock, so a reader sees either the previous line or the new
//! one, never a mix.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::category::StatCategory;

#[derive(Debug, Default)]
pub struct SampleStore {
    samples: RwLock<HashMap<StatCategory, String>>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the sample for `category`.
    pub fn put(&self, category: StatCategory, line: impl Into<String>) {
        self.write().insert(category, line.into());
    }

    /// Returns a copy of the latest sample, if one was ever published.
    pub fn get(&self, category: StatCategory) -> Option<String> {
        self.read().get(&category).cloned()
    }

    /// Runs `f` on the latest sample while holding the read lock.
    ///
    /// Empty lines count as absent.
    pub fn with_sample<T>(&self, category: StatCategory, f: impl FnOnce(&str) -> T) -> Option<T> {
        let guard = self.read();
        guard
            .get(&category)
            .map(String::as_str)
            .filter(|line| !line.is_empty())
            .map(f)
    }

    /// Number of categories that currently hold a non-empty sample.
    pub fn populated(&self) -> usize {
        self.read().values().filter(|l| !l.is_empty()).count()
    }

    // The map only ever holds complete strings, so a poisoned lock is still
    // consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<StatCategory, String>> {
        self.samples.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<StatCategory, String>> {
        self.samples.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_before_put_is_absent() {
        let store = SampleStore::new();
        for category in StatCategory::ALL {
            assert_eq!(store.get(category), None);
        }
        assert_eq!(store.populated(), 0);
    }

    #[test]
    fn test_put_overwrites_previous_sample() {
        let store = SampleStore::new();
        store.put(StatCategory::OldGen, "1 2 3 4 5 6");
        store.put(StatCategory::OldGen, "7 8 9 10 11 12");

        assert_eq!(store.get(StatCategory::OldGen).as_deref(), Some("7 8 9 10 11 12"));
    }

    #[test]
    fn test_categories_are_independent() {
        let store = SampleStore::new();
        store.put(StatCategory::FullGc, "gc line");
        store.put(StatCategory::YoungGen, "gcnew line");

        assert_eq!(store.get(StatCategory::FullGc).as_deref(), Some("gc line"));
        assert_eq!(store.get(StatCategory::YoungGen).as_deref(), Some("gcnew line"));
        assert_eq!(store.get(StatCategory::Capacity), None);
        assert_eq!(store.populated(), 2);
    }

    #[test]
    fn test_with_sample_treats_empty_line_as_absent() {
        let store = SampleStore::new();
        store.put(StatCategory::Capacity, "");

        assert_eq!(store.with_sample(StatCategory::Capacity, |l| l.len()), None);
        assert_eq!(store.populated(), 0);

        store.put(StatCategory::Capacity, "abc");
        assert_eq!(store.with_sample(StatCategory::Capacity, |l| l.len()), Some(3));
    }

    #[test]
    fn test_concurrent_readers_never_see_a_mixed_line() {
        let store = Arc::new(SampleStore::new());
        let a = "1 1 1 1 1 1 1 1";
        let b = "2 2 2 2 2 2 2 2";
        store.put(StatCategory::OldGen, a);

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..2000 {
                    store.put(StatCategory::OldGen, if i % 2 == 0 { b } else { a });
                }
            })
        };

        for _ in 0..2000 {
            let seen = store.get(StatCategory::OldGen).unwrap_or_default();
            assert!(seen == a || seen == b, "observed torn sample: {seen}");
        }

        writer.join().unwrap();
    }
}
