use crate::Expression;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash, Serialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub expression: Expression,
    pub sort_order: SortOrder,
    pub nulls_order: Option<NullsOrder>,
}

impl OrderBy {
    pub fn new(expression: Expression, sort_order: SortOrder) -> Self {
        Self {
            expression,
            sort_order,
            nulls_order: None,
        }
    }

    pub fn asc(path: impl Into<String>) -> Self {
        Self::new(Expression::field(path), SortOrder::Ascending)
    }

    pub fn desc(path: impl Into<String>) -> Self {
        Self::new(Expression::field(path), SortOrder::Descending)
    }

    pub fn with_nulls(mut self, nulls_order: Option<NullsOrder>) -> Self {
        self.nulls_order = nulls_order;
        self
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.sort_order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };

        write!(f, "{} {direction}", self.expression)?;

        match self.nulls_order {
            Some(NullsOrder::First) => f.write_str(" NULLS FIRST"),
            Some(NullsOrder::Last) => f.write_str(" NULLS LAST"),
            None => Ok(()),
        }
    }
}
