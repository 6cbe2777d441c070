//! Plans the query set of a GraphQL field from the field's selections.
//!
//! Planning runs in two passes over the selections: [`FilterInfoCompiler`] collects the filter
//! and order arguments of every relation, [`OptimizationCompiler`] builds a [`QueryOptimizer`]
//! tree. The optimizer tree is then applied to the query set, recursively building the query
//! sets of prefetched relations.

mod compiler;
mod filter_info;
mod query_optimizer;
mod results;
mod walker;

pub use compiler::*;
pub use filter_info::*;
pub use query_optimizer::*;
pub use results::*;
pub use walker::*;

use crate::{CoreResult, ResolveInfo};
use query_structure::QuerySet;

/// Optimizes `queryset` for the selections of the field described by `info`.
pub fn optimize(queryset: QuerySet, info: &ResolveInfo) -> CoreResult<QuerySet> {
    let optimizer = OptimizationCompiler::new(info).compile(&queryset)?;
    optimizer.optimize_queryset(queryset, info)
}
