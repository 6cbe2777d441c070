use query_structure::DomainError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("Query complexity exceeds the maximum allowed of {max}")]
    ComplexityExceeded { max: usize },

    #[error("Error in schema construction: {}", _0)]
    SchemaError(String),

    #[error("Error in domain logic: {}", _0)]
    DomainError(#[from] DomainError),

    #[error("Unknown fragment \"{}\"", _0)]
    UnknownFragment(String),

    #[error("Variable \"${}\" of a required type was not provided", _0)]
    MissingVariable(String),

    #[error("Invalid argument \"{argument}\": {reason}")]
    ArgumentError { argument: String, reason: String },

    #[error("Invalid input for \"{name}\": {reason}")]
    FilterError { name: String, reason: String },

    #[error("Unsupported feature: {}", _0)]
    UnsupportedFeatureError(String),
}

impl CoreError {
    pub fn schema(message: impl ToString) -> Self {
        Self::SchemaError(message.to_string())
    }

    pub fn argument(argument: impl Into<String>, reason: impl ToString) -> Self {
        Self::ArgumentError {
            argument: argument.into(),
            reason: reason.to_string(),
        }
    }

    pub fn filter(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::FilterError {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable error code, surfaced in the `extensions` of GraphQL errors.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ComplexityExceeded { .. } => "COMPLEXITY_EXCEEDED",
            Self::SchemaError(_) => "SCHEMA_ERROR",
            Self::DomainError(_) => "DOMAIN_ERROR",
            Self::UnknownFragment(_) => "UNKNOWN_FRAGMENT",
            Self::MissingVariable(_) => "MISSING_VARIABLE",
            Self::ArgumentError { .. } => "INVALID_ARGUMENT",
            Self::FilterError { .. } => "INVALID_FILTER",
            Self::UnsupportedFeatureError(_) => "UNSUPPORTED_FEATURE",
        }
    }
}
