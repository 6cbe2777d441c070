use crate::{Filter, QueryValue};
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash, Serialize)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// A computed value attached to a query set as an alias or an annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Expression {
    /// Reference to a field or a previously attached alias, relation hops separated by `__`.
    Field(String),
    Value(QueryValue),
    Aggregate {
        function: AggregateFunction,
        lookup: String,
        distinct: bool,
        filter: Option<Box<Filter>>,
    },
    Function {
        name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn field(path: impl Into<String>) -> Self {
        Self::Field(path.into())
    }

    pub fn value(value: impl Into<QueryValue>) -> Self {
        Self::Value(value.into())
    }

    pub fn aggregate(function: AggregateFunction, lookup: impl Into<String>) -> Self {
        Self::Aggregate {
            function,
            lookup: lookup.into(),
            distinct: false,
            filter: None,
        }
    }

    pub fn count(lookup: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Count, lookup)
    }

    pub fn function(name: impl Into<String>, args: impl IntoIterator<Item = Expression>) -> Self {
        Self::Function {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Marks an aggregate as distinct. No-op for other expressions.
    pub fn distinct(mut self) -> Self {
        if let Self::Aggregate { distinct, .. } = &mut self {
            *distinct = true;
        }

        self
    }

    /// Restricts the rows an aggregate is computed over. No-op for other expressions.
    pub fn filtered(mut self, condition: Filter) -> Self {
        if let Self::Aggregate { filter, .. } = &mut self {
            *filter = Some(Box::new(condition));
        }

        self
    }

    pub fn is_aggregate(&self) -> bool {
        match self {
            Self::Aggregate { .. } => true,
            Self::Function { args, .. } => args.iter().any(Self::is_aggregate),
            Self::Field(_) | Self::Value(_) => false,
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(path) => write!(f, "F({path})"),
            Self::Value(value) => write!(f, "{value}"),
            Self::Aggregate {
                function,
                lookup,
                distinct,
                filter,
            } => {
                write!(f, "{function}({lookup}")?;

                if *distinct {
                    f.write_str(", distinct")?;
                }

                if let Some(filter) = filter {
                    write!(f, ", filter={filter}")?;
                }

                f.write_str(")")
            }
            Self::Function { name, args } => write!(f, "{name}({})", args.iter().join(", ")),
        }
    }
}
