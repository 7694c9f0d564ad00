//! Dynamic values accepted by the serializer
//!
//! Scalars are held inline. Composites sit behind `Rc<RefCell<_>>` handles,
//! so clones share one payload, the payload has an address that serves as
//! its identity, and a composite can contain itself.

use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Shared, mutable handle for composite payloads.
///
/// Cloning a `Shared` clones the handle, not the payload, so two clones are
/// the same object for reference caching. Interior mutability lets callers
/// build graphs that point back at themselves.
pub type Shared<T> = Rc<RefCell<T>>;

/// Field name reserved for the type name of a class instance.
///
/// Fields with this name are never emitted as part of an instance body.
pub const NAME_FIELD: &str = "__name__";

/// Class instance: a field bag carrying the name of its class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInstance {
    pub class_name: String,
    /// Fields in declaration order
    pub fields: Vec<(String, Value)>,
}

impl ClassInstance {
    pub fn new(class_name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        Self {
            class_name: class_name.into(),
            fields,
        }
    }
}

/// Enum value: one constructor of a closed set, with its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// Name of the enum type (e.g., "Color")
    pub enum_name: String,
    /// Constructor name (e.g., "Rgb")
    pub constructor: String,
    /// Position of the constructor in the enum's constructor list
    pub index: usize,
    /// Constructor arguments, in order
    pub args: Vec<Value>,
}

impl EnumValue {
    pub fn new(
        enum_name: impl Into<String>,
        constructor: impl Into<String>,
        index: usize,
        args: Vec<Value>,
    ) -> Self {
        Self {
            enum_name: enum_name.into(),
            constructor: constructor.into(),
            index,
            args,
        }
    }
}

/// Value: what a program hands to the serializer
///
/// Scalars are stored inline. Composites are shared handles, which gives
/// every composite an identity independent of its contents: two arrays with
/// equal elements are still two different objects.
///
/// Numbers come in two flavors. Both are classified the same way at
/// serialization time (safe integer vs. everything else), so `Float(3.0)`
/// and `Int(3)` serialize identically.
#[derive(Debug, Clone)]
pub enum Value {
    Null,

    Bool(bool),

    /// Integer value
    Int(i64),

    /// Floating-point value (IEEE 754 double precision)
    Float(f64),

    /// String (compared by value for caching)
    String(String),

    /// Point in time; the serializer renders it in its configured timezone
    Date(DateTime<Utc>),

    /// Raw byte buffer
    Bytes(Rc<[u8]>),

    /// Exception carrying a message value
    Error(Box<Value>),

    /// Array (runs of nulls are compressed)
    Array(Shared<Vec<Value>>),

    /// Linked list (every element written, nulls included)
    List(Shared<Vec<Value>>),

    /// Map with integer keys, enumerated in ascending key order
    IntMap(Shared<BTreeMap<i32, Value>>),

    /// Map with string keys, enumerated in insertion order
    StringMap(Shared<Vec<(String, Value)>>),

    /// Map with arbitrary value keys, enumerated in insertion order
    ObjectMap(Shared<Vec<(Value, Value)>>),

    /// Anonymous record (plain field bag), fields in insertion order
    Object(Shared<Vec<(String, Value)>>),

    /// Class instance (field bag with a class name)
    Instance(Shared<ClassInstance>),

    /// Enum value (tagged union instance)
    Enum(Rc<EnumValue>),

    /// Host callable, referenced by name. Functions are code, not data,
    /// and cannot be serialized.
    Function(Rc<str>),
}

fn shared<T>(payload: T) -> Shared<T> {
    Rc::new(RefCell::new(payload))
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(Rc::from(data.into()))
    }

    pub fn date(at: DateTime<Utc>) -> Self {
        Value::Date(at)
    }

    /// Build a date from milliseconds since the Unix epoch.
    ///
    /// Returns `None` when the timestamp is outside the representable range.
    pub fn date_from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Value::Date)
    }

    pub fn error(message: impl Into<Value>) -> Self {
        Value::Error(Box::new(message.into()))
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(shared(items.into_iter().collect()))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(shared(items.into_iter().collect()))
    }

    pub fn int_map(entries: impl IntoIterator<Item = (i32, Value)>) -> Self {
        Value::IntMap(shared(entries.into_iter().collect()))
    }

    pub fn string_map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::StringMap(shared(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn object_map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::ObjectMap(shared(entries.into_iter().collect()))
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(shared(
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn instance<K: Into<String>>(
        class_name: impl Into<String>,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Instance(shared(ClassInstance::new(class_name, fields)))
    }

    pub fn enum_value(value: EnumValue) -> Self {
        Value::Enum(Rc::new(value))
    }

    pub fn function(name: impl Into<Rc<str>>) -> Self {
        Value::Function(name.into())
    }

    /// Identity of a composite value, or `None` for scalars.
    ///
    /// Clones of the same handle report the same identity; structurally
    /// equal but separately built composites never do. Array/List and
    /// StringMap/Object share payload types, so one payload wrapped as both
    /// kinds reports the same address: pair it with the variant when the
    /// kind matters.
    pub fn identity(&self) -> Option<usize> {
        let ptr: *const () = match self {
            Value::Array(v) | Value::List(v) => Rc::as_ptr(v).cast(),
            Value::IntMap(m) => Rc::as_ptr(m).cast(),
            Value::StringMap(m) | Value::Object(m) => Rc::as_ptr(m).cast(),
            Value::ObjectMap(m) => Rc::as_ptr(m).cast(),
            Value::Instance(i) => Rc::as_ptr(i).cast(),
            Value::Enum(e) => Rc::as_ptr(e).cast(),
            _ => return None,
        };
        Some(ptr as usize)
    }

    /// Set a field on an anonymous object or class instance.
    ///
    /// Replaces an existing field of the same name, otherwise appends.
    /// Returns false when the value is not a field bag.
    pub fn set_field(&self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        let mut object;
        let mut instance;
        let fields = match self {
            Value::Object(o) => {
                object = o.borrow_mut();
                &mut *object
            }
            Value::Instance(i) => {
                instance = i.borrow_mut();
                &mut instance.fields
            }
            _ => return false,
        };
        match fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => fields.push((name, value)),
        }
        true
    }

    /// Short name of the value's variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Date(_) => "Date",
            Value::Bytes(_) => "Bytes",
            Value::Error(_) => "Error",
            Value::Array(_) => "Array",
            Value::List(_) => "List",
            Value::IntMap(_) => "IntMap",
            Value::StringMap(_) => "StringMap",
            Value::ObjectMap(_) => "ObjectMap",
            Value::Object(_) => "Object",
            Value::Instance(_) => "Instance",
            Value::Enum(_) => "Enum",
            Value::Function(_) => "Function",
        }
    }
}

// Structural equality for scalars, identity for composites.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => match (self.identity(), other.identity()) {
                (Some(a), Some(b)) => {
                    a == b && std::mem::discriminant(self) == std::mem::discriminant(other)
                }
                _ => false,
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(at: DateTime<Utc>) -> Self {
        Value::Date(at)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_identity() {
        let a = Value::array([Value::Int(1)]);
        let b = a.clone();
        assert_eq!(a.identity(), b.identity());
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_contents_distinct_identity() {
        let a = Value::object([("x", Value::Int(1))]);
        let b = Value::object([("x", Value::Int(1))]);
        assert_ne!(a.identity(), b.identity());
        assert_ne!(a, b);
    }

    #[test]
    fn test_scalars_have_no_identity() {
        assert!(Value::Int(1).identity().is_none());
        assert!(Value::string("x").identity().is_none());
        assert!(Value::bytes(b"abc".to_vec()).identity().is_none());
    }

    #[test]
    fn test_set_field_replaces_and_appends() {
        let obj = Value::object([("a", Value::Int(1))]);
        assert!(obj.set_field("a", Value::Int(2)));
        assert!(obj.set_field("b", Value::Bool(true)));

        let Value::Object(fields) = &obj else {
            panic!("Expected object");
        };
        let fields = fields.borrow();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], ("a".to_string(), Value::Int(2)));
        assert_eq!(fields[1], ("b".to_string(), Value::Bool(true)));
    }

    #[test]
    fn test_set_field_on_instance() {
        let point = Value::instance("Point", [("x", Value::Int(0))]);
        assert!(point.set_field("y", Value::Int(3)));

        let Value::Instance(inst) = &point else {
            panic!("Expected instance");
        };
        assert_eq!(inst.borrow().class_name, "Point");
        assert_eq!(inst.borrow().fields.len(), 2);
    }

    #[test]
    fn test_set_field_rejects_non_records() {
        assert!(!Value::array([]).set_field("x", Value::Null));
        assert!(!Value::Int(1).set_field("x", Value::Null));
    }

    #[test]
    fn test_self_reference_can_be_built() {
        let obj = Value::object::<&str>([]);
        assert!(obj.set_field("self", obj.clone()));

        let Value::Object(fields) = &obj else {
            panic!("Expected object");
        };
        assert_eq!(fields.borrow()[0].1.identity(), obj.identity());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(5i64)), Value::Int(5));
    }

    #[test]
    fn test_same_payload_different_kind_not_equal() {
        let items = Rc::new(RefCell::new(vec![Value::Int(1)]));
        let array = Value::Array(items.clone());
        let list = Value::List(items);
        assert_eq!(array.identity(), list.identity());
        assert_ne!(array, list);
    }

    #[test]
    fn test_date_constructor() {
        let at = DateTime::from_timestamp(1_669_140_557, 0).expect("valid timestamp");
        assert_eq!(Value::date(at), Value::from(at));
        assert_eq!(Value::date(at), Value::date_from_millis(1_669_140_557_000).unwrap());
    }

    #[test]
    fn test_date_from_millis() {
        let date = Value::date_from_millis(1_669_140_557_415).expect("valid timestamp");
        let Value::Date(at) = date else {
            panic!("Expected date");
        };
        assert_eq!(at.timestamp(), 1_669_140_557);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "Null");
        assert_eq!(Value::function("callback").type_name(), "Function");
        assert_eq!(Value::list([]).type_name(), "List");
    }
}
