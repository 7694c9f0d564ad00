//! Kind classification
//!
//! The serializer never dispatches on `Value` directly. It first asks which
//! semantic kind a value belongs to, then encodes by kind. Classification is
//! where numbers are split by representability: a value is a safe integer
//! only if it is integral and within ±(2^53 − 1), so that every consumer of
//! the output can hold it exactly in a double.
//!
//! `classify` returns `None` for values with no serializable kind (host
//! functions); callers surface that as an unsupported-type failure.

use crate::value::{ClassInstance, EnumValue, Shared, Value};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Largest integer exactly representable as a double (2^53 − 1)
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Semantic kind of a value, borrowing its payload
#[derive(Debug, Clone, Copy)]
pub enum Kind<'a> {
    Null,
    Bool(bool),
    /// Integral and within ±MAX_SAFE_INTEGER
    SafeInteger(i64),
    /// NaN, ±Infinity, non-integral, or integral beyond the safe range
    UnsafeNumber(f64),
    String(&'a str),
    DateTime(&'a DateTime<Utc>),
    ByteBuffer(&'a [u8]),
    OrderedList(&'a Shared<Vec<Value>>),
    StrictList(&'a Shared<Vec<Value>>),
    IntKeyedMap(&'a Shared<BTreeMap<i32, Value>>),
    StringKeyedMap(&'a Shared<Vec<(String, Value)>>),
    ValueKeyedMap(&'a Shared<Vec<(Value, Value)>>),
    Record(&'a Shared<Vec<(String, Value)>>),
    NamedRecord(&'a Shared<ClassInstance>),
    TaggedUnion(&'a Rc<EnumValue>),
    /// Exception; the payload is its message
    RecoverableError(&'a Value),
}

impl Kind<'_> {
    /// Composite kinds take part in reference caching
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Kind::OrderedList(_)
                | Kind::StrictList(_)
                | Kind::IntKeyedMap(_)
                | Kind::StringKeyedMap(_)
                | Kind::ValueKeyedMap(_)
                | Kind::Record(_)
                | Kind::NamedRecord(_)
                | Kind::TaggedUnion(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::Null => "Null",
            Kind::Bool(_) => "Bool",
            Kind::SafeInteger(_) => "SafeInteger",
            Kind::UnsafeNumber(_) => "UnsafeNumber",
            Kind::String(_) => "String",
            Kind::DateTime(_) => "DateTime",
            Kind::ByteBuffer(_) => "ByteBuffer",
            Kind::OrderedList(_) => "OrderedList",
            Kind::StrictList(_) => "StrictList",
            Kind::IntKeyedMap(_) => "IntKeyedMap",
            Kind::StringKeyedMap(_) => "StringKeyedMap",
            Kind::ValueKeyedMap(_) => "ValueKeyedMap",
            Kind::Record(_) => "Record",
            Kind::NamedRecord(_) => "NamedRecord",
            Kind::TaggedUnion(_) => "TaggedUnion",
            Kind::RecoverableError(_) => "RecoverableError",
        }
    }
}

/// Classify a value into its semantic kind.
///
/// Returns `None` when the value has no serializable kind.
pub fn classify(value: &Value) -> Option<Kind<'_>> {
    let kind = match value {
        Value::Null => Kind::Null,
        Value::Bool(b) => Kind::Bool(*b),
        Value::Int(n) => classify_int(*n),
        Value::Float(f) => classify_float(*f),
        Value::String(s) => Kind::String(s),
        Value::Date(d) => Kind::DateTime(d),
        Value::Bytes(b) => Kind::ByteBuffer(b),
        Value::Error(message) => Kind::RecoverableError(message),
        Value::Array(items) => Kind::OrderedList(items),
        Value::List(items) => Kind::StrictList(items),
        Value::IntMap(m) => Kind::IntKeyedMap(m),
        Value::StringMap(m) => Kind::StringKeyedMap(m),
        Value::ObjectMap(m) => Kind::ValueKeyedMap(m),
        Value::Object(fields) => Kind::Record(fields),
        Value::Instance(inst) => Kind::NamedRecord(inst),
        Value::Enum(e) => Kind::TaggedUnion(e),
        Value::Function(_) => return None,
    };
    Some(kind)
}

fn classify_int(n: i64) -> Kind<'static> {
    if n.unsigned_abs() <= MAX_SAFE_INTEGER as u64 {
        Kind::SafeInteger(n)
    } else {
        Kind::UnsafeNumber(n as f64)
    }
}

fn classify_float(f: f64) -> Kind<'static> {
    // NaN and infinities have a NaN fractional part
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER as f64 {
        Kind::SafeInteger(f as i64)
    } else {
        Kind::UnsafeNumber(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_name(value: &Value) -> &'static str {
        classify(value).map_or("<none>", |k| k.name())
    }

    #[test]
    fn test_int_within_safe_range() {
        assert!(matches!(
            classify(&Value::Int(MAX_SAFE_INTEGER)),
            Some(Kind::SafeInteger(MAX_SAFE_INTEGER))
        ));
        assert!(matches!(
            classify(&Value::Int(-MAX_SAFE_INTEGER)),
            Some(Kind::SafeInteger(n)) if n == -MAX_SAFE_INTEGER
        ));
    }

    #[test]
    fn test_int_beyond_safe_range() {
        match classify(&Value::Int(MAX_SAFE_INTEGER + 1)) {
            Some(Kind::UnsafeNumber(f)) => assert_eq!(f, 9_007_199_254_740_992.0),
            other => panic!("Expected UnsafeNumber, got {:?}", other),
        }
        assert_eq!(kind_name(&Value::Int(i64::MIN)), "UnsafeNumber");
    }

    #[test]
    fn test_integral_float_is_safe_integer() {
        assert!(matches!(
            classify(&Value::Float(53.0)),
            Some(Kind::SafeInteger(53))
        ));
        assert!(matches!(
            classify(&Value::Float(-0.0)),
            Some(Kind::SafeInteger(0))
        ));
    }

    #[test]
    fn test_non_integral_and_special_floats() {
        assert_eq!(kind_name(&Value::Float(53.333)), "UnsafeNumber");
        assert_eq!(kind_name(&Value::Float(f64::NAN)), "UnsafeNumber");
        assert_eq!(kind_name(&Value::Float(f64::INFINITY)), "UnsafeNumber");
        assert_eq!(kind_name(&Value::Float(f64::NEG_INFINITY)), "UnsafeNumber");
        assert_eq!(kind_name(&Value::Float(1e300)), "UnsafeNumber");
    }

    #[test]
    fn test_composites() {
        assert_eq!(kind_name(&Value::array([])), "OrderedList");
        assert_eq!(kind_name(&Value::list([])), "StrictList");
        assert_eq!(kind_name(&Value::int_map([])), "IntKeyedMap");
        assert_eq!(kind_name(&Value::string_map::<&str>([])), "StringKeyedMap");
        assert_eq!(kind_name(&Value::object_map([])), "ValueKeyedMap");
        assert_eq!(kind_name(&Value::object::<&str>([])), "Record");
        assert_eq!(
            kind_name(&Value::instance::<&str>("Point", [])),
            "NamedRecord"
        );
        assert_eq!(
            kind_name(&Value::enum_value(EnumValue::new("Foo", "Bar", 0, vec![]))),
            "TaggedUnion"
        );
    }

    #[test]
    fn test_composite_flag() {
        assert!(classify(&Value::array([])).is_some_and(|k| k.is_composite()));
        assert!(classify(&Value::string("x")).is_some_and(|k| !k.is_composite()));
        assert!(classify(&Value::bytes(vec![1u8])).is_some_and(|k| !k.is_composite()));
        assert!(classify(&Value::error("boom")).is_some_and(|k| !k.is_composite()));
    }

    #[test]
    fn test_function_has_no_kind() {
        assert!(classify(&Value::function("callback")).is_none());
    }
}
