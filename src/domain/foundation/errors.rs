//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction and session validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' is required when {condition}")]
    MissingRequired { field: String, condition: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a conditional requirement error.
    pub fn missing_required(field: impl Into<String>, condition: impl Into<String>) -> Self {
        ValidationError::MissingRequired {
            field: field.into(),
            condition: condition.into(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::MissingRequired { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("phone");
        assert_eq!(format!("{}", err), "Field 'phone' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("quantity", 1, 999, 0);
        assert_eq!(
            format!("{}", err),
            "Field 'quantity' must be between 1 and 999, got 0"
        );
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("language", "unknown variant `de`");
        assert_eq!(
            format!("{}", err),
            "Field 'language' has invalid format: unknown variant `de`"
        );
    }

    #[test]
    fn validation_error_missing_required_displays_correctly() {
        let err = ValidationError::missing_required("phone", "registered is true");
        assert_eq!(
            format!("{}", err),
            "Field 'phone' is required when registered is true"
        );
        assert_eq!(err.field(), "phone");
    }
}
