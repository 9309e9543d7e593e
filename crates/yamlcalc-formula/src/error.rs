//! Formula error types

use thiserror::Error;
use yamlcalc_core::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Formula or definitions parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Name not bound in any scope
    #[error("Name '{0}' is not defined")]
    Name(String),

    /// Operation applied to values of the wrong type
    #[error("Type error: {0}")]
    Type(String),

    /// Division or modulo by zero
    #[error("Division by zero")]
    ZeroDivision,

    /// Integer arithmetic overflowed
    #[error("Integer overflow in {0}")]
    Overflow(&'static str),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Container lookup failed (absent key, index out of range)
    #[error("Lookup error: {0}")]
    Lookup(Error),

    /// Nested evaluation exceeded the configured depth
    #[error("Maximum evaluation depth of {0} exceeded")]
    RecursionLimit(usize),
}

impl FormulaError {
    /// Check if this error must abort the whole read instead of being
    /// substituted by the failure sentinel
    pub fn is_fatal(&self) -> bool {
        matches!(self, FormulaError::RecursionLimit(_))
    }
}

impl From<Error> for FormulaError {
    fn from(err: Error) -> Self {
        match err {
            Error::RecursionLimit(depth) => FormulaError::RecursionLimit(depth),
            other => FormulaError::Lookup(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recursion_survives_conversion() {
        let err: FormulaError = Error::RecursionLimit(8).into();
        assert!(err.is_fatal());

        let err: FormulaError = Error::KeyNotFound("x".into()).into();
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "Lookup error: Key 'x' not found");
    }
}
