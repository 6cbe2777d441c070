mod datamodel;
mod error;
mod expression;
mod field;
mod model;
mod order_by;
mod query_set;
mod value;
mod zipper;

pub mod filter;

pub use datamodel::*;
pub use error::*;
pub use expression::*;
pub use field::*;
pub use filter::{Condition, Filter, LookupOp};
pub use model::*;
pub use order_by::*;
pub use query_set::*;
pub use value::*;
pub use zipper::*;

/// Separator between the hops of a lookup path, e.g. `project__name`.
pub const LOOKUP_SEP: &str = "__";

/// Joins two lookup paths, skipping empty segments.
pub fn join_lookup(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_owned(),
        (_, true) => prefix.to_owned(),
        _ => format!("{prefix}{LOOKUP_SEP}{path}"),
    }
}

pub mod prelude {
    pub use super::{
        Datamodel, DatamodelRef, DomainError, Expression, FieldKind, Filter, Model, ModelField, OrderBy, Prefetch,
        QuerySet, QueryValue, join_lookup,
    };
}
