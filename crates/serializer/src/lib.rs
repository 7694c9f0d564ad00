//! hxserial: Haxe serialization format writer
//!
//! Turns a `Value` graph into the text grammar read by Haxe's
//! `haxe.Unserializer`, so state can be handed to a Haxe program, stored as a
//! string, or sent to another process.
//!
//! ```
//! use hxserial::{Serializer, Value, serialize};
//!
//! let point = Value::object([("x", Value::Int(1)), ("y", Value::Float(0.5))]);
//! assert_eq!(serialize(&point).unwrap(), "oy1:xi1y1:yd0.5g");
//!
//! // A session remembers what it wrote
//! let mut session = Serializer::new(false, false);
//! assert_eq!(session.run(&Value::string("hi")).unwrap(), "y2:hi");
//! assert_eq!(session.run(&Value::string("hi")).unwrap(), "R0");
//! ```
//!
//! # Modules
//!
//! - `serializer`: the session type and the per-kind encoding rules
//! - `cache`: string and object back-reference tracking
//! - `basecode`: radix-64 codec for byte buffers
//! - `format`: number, date and string formatting
//! - `config`: session options and TOML loading
//! - `error`: serialization errors

pub mod basecode;
pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod serializer;

pub use cache::{CacheEntry, ReferenceCache};
pub use config::{ConfigError, DEFAULT_MAX_DEPTH, DateZone, SerializerConfig};
pub use error::SerializeError;
pub use serializer::Serializer;

// Value model, re-exported so callers need only this crate
pub use hxserial_core::{ClassInstance, EnumValue, Kind, Value, classify};

/// Serialize a value with a fresh default session
pub fn serialize(value: &Value) -> Result<String, SerializeError> {
    Serializer::default().run(value)
}

/// Serialize a value with a fresh session using `config`
pub fn serialize_with(value: &Value, config: &SerializerConfig) -> Result<String, SerializeError> {
    Serializer::with_config(config.clone()).run(value)
}
