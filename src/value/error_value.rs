//! The error-value that lets runtime failures travel through the expression
//! tree instead of unwinding it.
use super::{BoxValue, Native, Value};
use crate::error::RuntimeError;
use crate::types::{well_known, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    error: RuntimeError,
}

impl ErrorValue {
    pub fn new(error: RuntimeError) -> Self {
        Self { error }
    }

    pub fn error(&self) -> &RuntimeError {
        &self.error
    }
}

impl Value for ErrorValue {
    fn type_of(&self) -> Type {
        well_known::error()
    }

    fn native(&self) -> Native {
        Native::String(self.error.to_string())
    }

    fn convert_to(&self, _target: &Type) -> Result<Native, RuntimeError> {
        // An error-value never successfully converts to anything, including
        // bool — this is what lets `and`/`or`/a statement filter detect and
        // surface it rather than silently treating it as `false`.
        Err(self.error.clone())
    }

    fn clone_value(&self) -> BoxValue {
        Box::new(self.clone())
    }

    fn as_error(&self) -> Option<&RuntimeError> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_value_never_converts() {
        let ev = ErrorValue::new(RuntimeError::DivisionByZero);
        assert!(ev.convert_to(&well_known::boolean()).is_err());
        assert_eq!(ev.as_error(), Some(&RuntimeError::DivisionByZero));
    }
}
