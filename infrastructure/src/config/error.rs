use thiserror::Error;

/// A problem found while validating a loaded [`FileConfig`](super::FileConfig).
///
/// Invalid values never abort loading: the affected field falls back to its
/// default and the issue is reported to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("{field}: unknown value '{value}' (expected one of: {})", valid_values.join(", "))]
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },

    #[error("{field}: unknown role '{value}'")]
    UnknownRole { field: String, value: String },

    #[error("{field} cannot be 0")]
    Zero { field: &'static str },

    #[error("{field}: {value} is outside [0, 1]")]
    NotAProbability { field: &'static str, value: f64 },
}
