use graphql_parser::query::ParseError;
use query_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{}", _0)]
    Core(#[from] CoreError),

    #[error("{}", _0)]
    QueryConversion(String),

    #[error("Unsupported feature: {}. {}", feature_name, message)]
    UnsupportedFeature {
        feature_name: &'static str,
        message: String,
    },
}

impl HandlerError {
    pub fn query_conversion(message: impl ToString) -> Self {
        Self::QueryConversion(message.to_string())
    }

    pub fn unsupported_feature(feature_name: &'static str, message: impl ToString) -> Self {
        let message = message.to_string();

        Self::UnsupportedFeature { feature_name, message }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Core(err) => err.code(),
            Self::QueryConversion(_) => "QUERY_CONVERSION_ERROR",
            Self::UnsupportedFeature { .. } => "UNSUPPORTED_FEATURE",
        }
    }
}

impl From<ParseError> for HandlerError {
    fn from(e: ParseError) -> Self {
        Self::query_conversion(format!("Error parsing GraphQL query: {e}"))
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::query_conversion(format!("Invalid request body: {e}"))
    }
}
