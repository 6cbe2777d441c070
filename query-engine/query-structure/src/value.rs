use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

pub type QueryValueObject = IndexMap<String, QueryValue>;

/// A fully resolved input value, e.g. a filter argument after variable substitution.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum QueryValue {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    List(Vec<QueryValue>),
    Object(QueryValueObject),
}

impl QueryValue {
    pub fn object(pairs: impl IntoIterator<Item = (String, QueryValue)>) -> Self {
        Self::Object(pairs.into_iter().collect())
    }

    pub fn list(values: impl IntoIterator<Item = QueryValue>) -> Self {
        Self::List(values.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// String content of string and enum values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&QueryValueObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[QueryValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Coerces a single value into a list of one, the way GraphQL input coercion does.
    pub fn into_list(self) -> Vec<QueryValue> {
        match self {
            Self::List(values) => values,
            Self::Null => Vec::new(),
            other => vec![other],
        }
    }
}

impl From<serde_json::Value> for QueryValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(values) => Self::List(values.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for QueryValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Enum(e) => f.write_str(e),
            Self::List(values) => write!(f, "[{}]", values.iter().join(", ")),
            Self::Object(obj) => write!(f, "{{{}}}", obj.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")),
        }
    }
}
