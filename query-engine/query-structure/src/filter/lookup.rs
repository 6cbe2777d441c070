use crate::LOOKUP_SEP;
use serde::Serialize;
use std::fmt;

/// Comparison applied at the end of a lookup path, e.g. `icontains` in `project__name__icontains`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupOp {
    Exact,
    IExact,
    Contains,
    IContains,
    In,
    Gt,
    Gte,
    Lt,
    Lte,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    IsNull,
}

impl LookupOp {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let op = match suffix {
            "exact" => Self::Exact,
            "iexact" => Self::IExact,
            "contains" => Self::Contains,
            "icontains" => Self::IContains,
            "in" => Self::In,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "startswith" => Self::StartsWith,
            "istartswith" => Self::IStartsWith,
            "endswith" => Self::EndsWith,
            "iendswith" => Self::IEndsWith,
            "isnull" => Self::IsNull,
            _ => return None,
        };

        Some(op)
    }

    /// Splits a lookup like `project__name__icontains` into its path and operator.
    /// A path without a known operator suffix compares for equality.
    pub fn split(lookup: &str) -> (&str, LookupOp) {
        match lookup.rsplit_once(LOOKUP_SEP) {
            Some((path, suffix)) => match Self::from_suffix(suffix) {
                Some(op) => (path, op),
                None => (lookup, Self::Exact),
            },
            None => (lookup, Self::Exact),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Exact => "=",
            Self::IExact => "iexact",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::In => "in",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::IsNull => "isnull",
        }
    }
}

impl fmt::Display for LookupOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
