//! Haxe-grammar serialization
//!
//! Serializes Values to the Haxe serialization format: a compact prefix
//! notation where every value starts with a one-letter token and composites
//! end with a terminator.
//!
//! # Format Examples
//!
//! - Null / Bool: `n`, `t`, `f`
//! - Int: `z` (zero), `i42`, `i-53`
//! - Float: `d53.333`, `k` (NaN), `p` / `m` (±Infinity)
//! - String: `y17:Hello%20World%20!`, repeats as `R0`, `R1`, ...
//! - Date: `v2022-11-22 19:09:17`
//! - Bytes: `s16:SGVsbG8gV29ybGQh`
//! - Array: `ai4i5u3i7ni1i2h` (null runs compressed)
//! - List: `li4nnh`
//! - Maps: `q:4n:5i45h` (int keys), `by1:xi2h` (string keys), `M...h` (object keys)
//! - Object: `oy3:fooy3:Foog`
//! - Class instance: `cy5:Pointy1:xzy1:yzg`
//! - Enum: `wy3:Fooy3:Bar:0` (by name) or `jy3:Foo:0:0` (by index)
//! - Exception: `xy5:oops`
//! - Composite repeats (with `use_cache`): `r0`, `r1`, ...

use crate::basecode;
use crate::cache::{CacheEntry, ReferenceCache};
use crate::config::SerializerConfig;
use crate::error::SerializeError;
use crate::format;
use hxserial_core::{ClassInstance, EnumValue, Kind, NAME_FIELD, Value, classify};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Remaining stack below which recursion switches to a fresh segment
const RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated by `stacker`
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// A serialization session
///
/// Owns the reference cache. Reusing a session across `run` calls keeps the
/// cache, so later output may refer back to values written by earlier calls.
#[derive(Debug)]
pub struct Serializer {
    config: SerializerConfig,
    cache: ReferenceCache,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::with_config(SerializerConfig::default())
    }
}

impl Serializer {
    /// Create a session with the two grammar options and defaults elsewhere
    pub fn new(use_cache: bool, use_enum_index: bool) -> Self {
        Self::with_config(
            SerializerConfig::new()
                .with_cache(use_cache)
                .with_enum_index(use_enum_index),
        )
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        let cache = ReferenceCache::new(config.use_cache);
        Self { config, cache }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// Drop all cached strings and composites
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Serialize a value to a string
    ///
    /// On error nothing is returned; cache entries recorded before the
    /// failure are kept.
    pub fn run(&mut self, value: &Value) -> Result<String, SerializeError> {
        debug!(
            kind = value.type_name(),
            cached_strings = self.cache.string_count(),
            cached_objects = self.cache.object_count(),
            "serialize start"
        );
        let mut buf = String::new();
        match self.format_value(value, 0, &mut buf) {
            Ok(()) => {
                debug!(len = buf.len(), "serialize done");
                Ok(buf)
            }
            Err(e) => {
                warn!(error = %e, "serialize aborted");
                Err(e)
            }
        }
    }

    /// Internal formatting function with depth tracking
    ///
    /// Grows the stack when less than `RED_ZONE` remains, so nesting is
    /// bounded by `max_depth` and not by the thread's stack size.
    fn format_value(
        &mut self,
        value: &Value,
        depth: usize,
        buf: &mut String,
    ) -> Result<(), SerializeError> {
        stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || {
            self.format_nested(value, depth, buf)
        })
    }

    fn format_nested(
        &mut self,
        value: &Value,
        depth: usize,
        buf: &mut String,
    ) -> Result<(), SerializeError> {
        if depth > self.config.max_depth {
            return Err(SerializeError::RecursionExhausted { depth });
        }

        let kind = classify(value)
            .ok_or_else(|| SerializeError::UnsupportedType(value.type_name().to_string()))?;

        if kind.is_composite()
            && let Some(backref) = self.cache.try_emit_backref(CacheEntry::Object(value))
        {
            trace!(backref = %backref, kind = kind.name(), "object back-reference");
            buf.push_str(&backref);
            return Ok(());
        }

        match kind {
            Kind::Null => buf.push('n'),
            Kind::Bool(b) => buf.push(if b { 't' } else { 'f' }),
            Kind::SafeInteger(0) => buf.push('z'),
            Kind::SafeInteger(n) => {
                buf.push('i');
                buf.push_str(&n.to_string());
            }
            Kind::UnsafeNumber(f) => format::write_unsafe_number(f, buf),
            Kind::String(s) => self.format_string(s, buf),
            Kind::DateTime(d) => format::write_date(d, self.config.timezone, buf)?,
            Kind::ByteBuffer(bytes) => {
                let encoded = basecode::encode(bytes);
                buf.push('s');
                buf.push_str(&encoded.len().to_string());
                buf.push(':');
                buf.push_str(&encoded);
            }
            Kind::RecoverableError(message) => {
                buf.push('x');
                self.format_value(message, depth + 1, buf)?;
            }
            Kind::OrderedList(items) => {
                buf.push('a');
                self.format_array(&items.borrow(), depth, buf)?;
                buf.push('h');
            }
            Kind::StrictList(items) => {
                buf.push('l');
                for item in items.borrow().iter() {
                    self.format_value(item, depth + 1, buf)?;
                }
                buf.push('h');
            }
            Kind::IntKeyedMap(map) => {
                buf.push('q');
                self.format_int_map(&map.borrow(), depth, buf)?;
                buf.push('h');
            }
            Kind::StringKeyedMap(entries) => {
                buf.push('b');
                self.format_fields(&entries.borrow(), depth, buf)?;
                buf.push('h');
            }
            Kind::ValueKeyedMap(entries) => {
                buf.push('M');
                for (key, item) in entries.borrow().iter() {
                    self.format_value(key, depth + 1, buf)?;
                    self.format_value(item, depth + 1, buf)?;
                }
                buf.push('h');
            }
            Kind::Record(fields) => {
                buf.push('o');
                self.format_fields(&fields.borrow(), depth, buf)?;
                buf.push('g');
            }
            Kind::NamedRecord(instance) => {
                buf.push('c');
                self.format_instance(&instance.borrow(), depth, buf)?;
                buf.push('g');
            }
            Kind::TaggedUnion(e) => self.format_enum(e, depth, buf)?,
        }
        Ok(())
    }

    /// Strings go through the string cache first
    fn format_string(&mut self, s: &str, buf: &mut String) {
        if let Some(backref) = self.cache.try_emit_backref(CacheEntry::String(s)) {
            trace!(backref = %backref, "string back-reference");
            buf.push_str(&backref);
            return;
        }
        let escaped = format::escape_string(s);
        buf.push('y');
        buf.push_str(&escaped.len().to_string());
        buf.push(':');
        buf.push_str(&escaped);
    }

    /// Array body: runs of nulls become `n` (one) or `u<count>` (several)
    fn format_array(
        &mut self,
        items: &[Value],
        depth: usize,
        buf: &mut String,
    ) -> Result<(), SerializeError> {
        let mut nulls = 0usize;
        for item in items {
            if matches!(item, Value::Null) {
                nulls += 1;
                continue;
            }
            flush_nulls(&mut nulls, buf);
            self.format_value(item, depth + 1, buf)?;
        }
        flush_nulls(&mut nulls, buf);
        Ok(())
    }

    fn format_int_map(
        &mut self,
        map: &BTreeMap<i32, Value>,
        depth: usize,
        buf: &mut String,
    ) -> Result<(), SerializeError> {
        for (key, item) in map {
            buf.push(':');
            buf.push_str(&key.to_string());
            self.format_value(item, depth + 1, buf)?;
        }
        Ok(())
    }

    /// Name/value pairs of objects and string maps; names are strings
    fn format_fields(
        &mut self,
        fields: &[(String, Value)],
        depth: usize,
        buf: &mut String,
    ) -> Result<(), SerializeError> {
        for (name, item) in fields {
            self.format_string(name, buf);
            self.format_value(item, depth + 1, buf)?;
        }
        Ok(())
    }

    fn format_instance(
        &mut self,
        instance: &ClassInstance,
        depth: usize,
        buf: &mut String,
    ) -> Result<(), SerializeError> {
        self.format_string(&instance.class_name, buf);
        for (name, item) in &instance.fields {
            if name == NAME_FIELD {
                continue;
            }
            self.format_string(name, buf);
            self.format_value(item, depth + 1, buf)?;
        }
        Ok(())
    }

    /// Enum: `w<name><constructor>:<argc>` or `j<name>:<index>:<argc>`,
    /// then the arguments
    fn format_enum(
        &mut self,
        e: &EnumValue,
        depth: usize,
        buf: &mut String,
    ) -> Result<(), SerializeError> {
        if self.config.use_enum_index {
            buf.push('j');
            self.format_string(&e.enum_name, buf);
            buf.push(':');
            buf.push_str(&e.index.to_string());
        } else {
            buf.push('w');
            self.format_string(&e.enum_name, buf);
            self.format_string(&e.constructor, buf);
        }
        buf.push(':');
        buf.push_str(&e.args.len().to_string());
        for arg in &e.args {
            self.format_value(arg, depth + 1, buf)?;
        }
        Ok(())
    }
}

fn flush_nulls(count: &mut usize, buf: &mut String) {
    match *count {
        0 => {}
        1 => buf.push('n'),
        n => {
            buf.push('u');
            buf.push_str(&n.to_string());
        }
    }
    *count = 0;
}

// ============================================================================
// Tests
// ============================================================================
