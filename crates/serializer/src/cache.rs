//! Reference cache
//!
//! Tracks what a session has already written so repeats can be replaced by a
//! back-reference:
//!
//! - Strings are keyed by value and referenced as `R<index>`
//! - Composites are keyed by kind and identity and referenced as `r<index>`
//!
//! Indices count up from 0 in first-seen order, separately per bucket. One
//! object bucket is shared by every composite kind.

use hxserial_core::Value;
use std::collections::HashMap;
use std::mem::Discriminant;

/// A cache lookup: the bucket is chosen by the variant
#[derive(Debug, Clone, Copy)]
pub enum CacheEntry<'a> {
    String(&'a str),
    Object(&'a Value),
}

/// Per-session record of emitted strings and composites
#[derive(Debug, Default)]
pub struct ReferenceCache {
    use_cache: bool,
    strings: HashMap<String, usize>,
    // One payload may sit behind two kinds (an array and a list over the
    // same vector), which must not refer to each other
    objects: HashMap<(Discriminant<Value>, usize), usize>,
    // Keeps cached composites alive so their addresses cannot be reused by
    // a later, different object within the session
    retained: Vec<Value>,
}

impl ReferenceCache {
    /// `use_cache` enables the object bucket; strings are always cached
    pub fn new(use_cache: bool) -> Self {
        Self {
            use_cache,
            ..Self::default()
        }
    }

    /// Return a back-reference if the entry was seen before, otherwise
    /// record it and return `None`.
    pub fn try_emit_backref(&mut self, entry: CacheEntry<'_>) -> Option<String> {
        match entry {
            CacheEntry::String(s) => {
                if let Some(index) = self.strings.get(s) {
                    return Some(format!("R{}", index));
                }
                let index = self.strings.len();
                self.strings.insert(s.to_string(), index);
                None
            }
            CacheEntry::Object(value) => {
                if !self.use_cache {
                    return None;
                }
                let key = (std::mem::discriminant(value), value.identity()?);
                if let Some(index) = self.objects.get(&key) {
                    return Some(format!("r{}", index));
                }
                self.objects.insert(key, self.retained.len());
                self.retained.push(value.clone());
                None
            }
        }
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    pub fn object_count(&self) -> usize {
        self.retained.len()
    }

    /// Forget everything; indices start again from 0
    pub fn clear(&mut self) {
        self.strings.clear();
        self.objects.clear();
        self.retained.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_string_first_seen_then_backref() {
        let mut cache = ReferenceCache::new(false);
        assert_eq!(cache.try_emit_backref(CacheEntry::String("foo")), None);
        assert_eq!(cache.try_emit_backref(CacheEntry::String("bar")), None);
        assert_eq!(
            cache.try_emit_backref(CacheEntry::String("foo")),
            Some("R0".to_string())
        );
        assert_eq!(
            cache.try_emit_backref(CacheEntry::String("bar")),
            Some("R1".to_string())
        );
        assert_eq!(cache.string_count(), 2);
    }

    #[test]
    fn test_strings_cached_by_value() {
        let mut cache = ReferenceCache::new(false);
        let a = String::from("same");
        let b = String::from("same");
        assert_eq!(cache.try_emit_backref(CacheEntry::String(&a)), None);
        assert_eq!(
            cache.try_emit_backref(CacheEntry::String(&b)),
            Some("R0".to_string())
        );
    }

    #[test]
    fn test_objects_ignored_without_use_cache() {
        let mut cache = ReferenceCache::new(false);
        let obj = Value::object::<&str>([]);
        assert_eq!(cache.try_emit_backref(CacheEntry::Object(&obj)), None);
        assert_eq!(cache.try_emit_backref(CacheEntry::Object(&obj)), None);
        assert_eq!(cache.object_count(), 0);
    }

    #[test]
    fn test_objects_cached_by_identity() {
        let mut cache = ReferenceCache::new(true);
        let a = Value::array([Value::Int(1)]);
        let twin = Value::array([Value::Int(1)]);
        assert_eq!(cache.try_emit_backref(CacheEntry::Object(&a)), None);
        assert_eq!(cache.try_emit_backref(CacheEntry::Object(&twin)), None);
        assert_eq!(
            cache.try_emit_backref(CacheEntry::Object(&a.clone())),
            Some("r0".to_string())
        );
        assert_eq!(
            cache.try_emit_backref(CacheEntry::Object(&twin)),
            Some("r1".to_string())
        );
    }

    #[test]
    fn test_one_object_bucket_for_all_kinds() {
        let mut cache = ReferenceCache::new(true);
        let list = Value::list([]);
        let record = Value::object::<&str>([]);
        assert_eq!(cache.try_emit_backref(CacheEntry::Object(&list)), None);
        assert_eq!(cache.try_emit_backref(CacheEntry::Object(&record)), None);
        assert_eq!(
            cache.try_emit_backref(CacheEntry::Object(&record)),
            Some("r1".to_string())
        );
    }

    #[test]
    fn test_same_payload_under_two_kinds_not_shared() {
        let mut cache = ReferenceCache::new(true);
        let items = Rc::new(RefCell::new(vec![Value::Int(1)]));
        let array = Value::Array(items.clone());
        let list = Value::List(items);
        assert_eq!(cache.try_emit_backref(CacheEntry::Object(&array)), None);
        assert_eq!(cache.try_emit_backref(CacheEntry::Object(&list)), None);
        assert_eq!(
            cache.try_emit_backref(CacheEntry::Object(&list)),
            Some("r1".to_string())
        );
    }

    #[test]
    fn test_buckets_are_independent() {
        let mut cache = ReferenceCache::new(true);
        let obj = Value::object::<&str>([]);
        cache.try_emit_backref(CacheEntry::String("s"));
        assert_eq!(cache.try_emit_backref(CacheEntry::Object(&obj)), None);
        assert_eq!(
            cache.try_emit_backref(CacheEntry::Object(&obj)),
            Some("r0".to_string())
        );
    }

    #[test]
    fn test_clear_restarts_indices() {
        let mut cache = ReferenceCache::new(true);
        cache.try_emit_backref(CacheEntry::String("a"));
        cache.try_emit_backref(CacheEntry::Object(&Value::list([])));
        cache.clear();
        assert_eq!(cache.string_count(), 0);
        assert_eq!(cache.object_count(), 0);
        assert_eq!(cache.try_emit_backref(CacheEntry::String("b")), None);
        assert_eq!(
            cache.try_emit_backref(CacheEntry::String("b")),
            Some("R0".to_string())
        );
    }
}
