//! hxserial core: the value graph understood by the Haxe-grammar serializer
//!
//! This crate provides the data side of serialization, independent of any
//! output format:
//!
//! - Value: the runtime values a program hands to the serializer (numbers,
//!   strings, dates, bytes, arrays, lists, maps, records, class instances,
//!   enum values, errors)
//! - Kind: the closed set of semantic kinds the serializer dispatches on,
//!   computed by `classify`
//!
//! # Modules
//!
//! - `value`: Core Value enum and the composite payload types
//! - `kind`: Capability-based classification of values into kinds

pub mod kind;
pub mod value;

pub use kind::{Kind, MAX_SAFE_INTEGER, classify};
pub use value::{ClassInstance, EnumValue, NAME_FIELD, Shared, Value};
