//! Error types for descriptor construction and method invocation

/// Result type for descriptor construction
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Result type for method thunks
pub type InvokeResult<T> = Result<T, InvokeError>;

/// Descriptor construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The module type never registered its declared-capability interface
    #[error("Module type `{type_name}` does not implement the module interface")]
    MissingInterface {
        /// Rust type name of the offending implementation
        type_name: &'static str,
    },
}

/// Errors raised while executing a method thunk
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvokeError {
    /// The implementation object has already been released
    #[error("Module `{module}` has been released")]
    ModuleReleased {
        /// Public name of the released module
        module: String,
    },

    /// Invalid argument
    #[error("Argument error: {0}")]
    Argument(String),

    /// Operation failed inside the module
    #[error("{0}")]
    Failed(String),
}

impl From<String> for InvokeError {
    fn from(s: String) -> Self {
        InvokeError::Failed(s)
    }
}

impl From<&str> for InvokeError {
    fn from(s: &str) -> Self {
        InvokeError::Failed(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_interface_message() {
        let err = BridgeError::MissingInterface { type_name: "demo::Clock" };
        assert_eq!(
            err.to_string(),
            "Module type `demo::Clock` does not implement the module interface"
        );
    }

    #[test]
    fn test_invoke_error_from_str() {
        let err: InvokeError = "disk full".into();
        assert_eq!(err, InvokeError::Failed("disk full".to_string()));
        assert_eq!(err.to_string(), "disk full");
    }
}
