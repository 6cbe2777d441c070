mod lookup;

pub use lookup::LookupOp;

use crate::QueryValue;
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    /// Path to the compared value, relation hops separated by `__`.
    pub path: String,
    pub op: LookupOp,
    pub value: QueryValue,
}

/// A boolean predicate over the records of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Condition(Condition),
    /// Matches every record.
    #[default]
    Empty,
}

impl Filter {
    /// Builds a condition from a lookup such as `name__icontains`.
    pub fn lookup(lookup: &str, value: impl Into<QueryValue>) -> Self {
        let (path, op) = LookupOp::split(lookup);

        Self::Condition(Condition {
            path: path.to_owned(),
            op,
            value: value.into(),
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Self::Empty, other) => other,
            (this, Self::Empty) => this,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (this, other) => Self::And(vec![this, other]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match (self, other) {
            (Self::Empty, other) => other,
            (this, Self::Empty) => this,
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), other) => {
                left.push(other);
                Self::Or(left)
            }
            (this, other) => Self::Or(vec![this, other]),
        }
    }

    pub fn not(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    pub fn and_all(filters: impl IntoIterator<Item = Filter>) -> Self {
        filters.into_iter().fold(Self::Empty, Self::and)
    }

    pub fn or_all(filters: impl IntoIterator<Item = Filter>) -> Self {
        filters.into_iter().fold(Self::Empty, Self::or)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.path, self.op, self.value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(filters) => write!(f, "({})", filters.iter().join(" AND ")),
            Self::Or(filters) => write!(f, "({})", filters.iter().join(" OR ")),
            Self::Not(inner) => write!(f, "NOT {inner}"),
            Self::Condition(condition) => write!(f, "{condition}"),
            Self::Empty => f.write_str("TRUE"),
        }
    }
}
