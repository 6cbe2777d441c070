use crate::HandlerError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type Map = IndexMap<String, serde_json::Value>;

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct GQLResponse {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub data: Map,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GQLError>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub extensions: Map,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct GQLError {
    message: String,
    /// Response keys leading to the failed field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    path: Vec<String>,
    extensions: ErrorExtensions,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ErrorExtensions {
    code: String,
}

impl GQLError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: ErrorExtensions { code: code.into() },
        }
    }

    pub fn code(&self) -> &str {
        &self.extensions.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn with_path(mut self, key: impl Into<String>) -> Self {
        self.path.push(key.into());
        self
    }

    pub fn from_handler_error(err: HandlerError) -> Self {
        Self::new(err.to_string(), err.code())
    }
}

impl From<HandlerError> for GQLError {
    fn from(err: HandlerError) -> Self {
        Self::from_handler_error(err)
    }
}

impl GQLResponse {
    pub fn new(data: Map) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: IndexMap::with_capacity(capacity),
            ..Default::default()
        }
    }

    pub fn insert_data(&mut self, key: impl Into<String>, item: serde_json::Value) {
        self.data.insert(key.into(), item);
    }

    pub fn insert_error(&mut self, error: impl Into<GQLError>) {
        self.errors.push(error.into());
    }

    pub fn take_data(&mut self, key: impl AsRef<str>) -> Option<serde_json::Value> {
        self.data.shift_remove(key.as_ref())
    }

    pub fn errors(&self) -> impl Iterator<Item = &GQLError> {
        self.errors.iter()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_data(self) -> Map {
        self.data
    }

    pub fn set_extension(&mut self, key: String, val: serde_json::Value) {
        self.extensions.entry(key).or_insert(val);
    }
}

impl From<GQLError> for GQLResponse {
    fn from(err: GQLError) -> Self {
        let mut gql_response = Self::default();

        gql_response.insert_error(err);
        gql_response
    }
}

impl From<HandlerError> for GQLResponse {
    fn from(err: HandlerError) -> Self {
        GQLError::from(err).into()
    }
}
