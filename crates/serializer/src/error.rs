//! Serialization errors
//!
//! Every failure aborts the whole `run` call: no partial output is returned
//! and nothing is retried.

/// Error during serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// Value has no serializable kind (carries the value's type name)
    UnsupportedType(String),
    /// Nesting exceeded the configured depth limit. A self-referencing graph
    /// always ends here.
    RecursionExhausted { depth: usize },
    /// Fixed timezone offset outside ±24h (seconds east of UTC)
    InvalidTimezone(i32),
}

impl std::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializeError::UnsupportedType(type_name) => {
                write!(f, "Unsupported type: {} cannot be serialized", type_name)
            }
            SerializeError::RecursionExhausted { depth } => {
                write!(
                    f,
                    "Recursion exhausted at depth {} - value graph is cyclic or too deep",
                    depth
                )
            }
            SerializeError::InvalidTimezone(offset) => {
                write!(f, "Invalid timezone offset: {} seconds", offset)
            }
        }
    }
}

impl std::error::Error for SerializeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unsupported() {
        let err = SerializeError::UnsupportedType("Function".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported type: Function cannot be serialized"
        );
    }

    #[test]
    fn test_display_recursion() {
        let err = SerializeError::RecursionExhausted { depth: 512 };
        assert!(err.to_string().contains("depth 512"));
    }
}
