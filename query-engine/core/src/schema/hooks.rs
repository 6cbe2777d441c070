use crate::{CoreResult, FieldNode, GraphQLFilterInfo, QueryOptimizer, ResolveInfo};
use query_structure::QuerySet;
use std::sync::Arc;

/// Builds the base query set of an object type. Receives the unrestricted query set of the
/// type's model.
pub type GetQuerysetHook = Arc<dyn Fn(QuerySet, &ResolveInfo) -> CoreResult<QuerySet> + Send + Sync>;

/// Restricts the query set of an object type after the optimizations are applied, e.g. for
/// visibility rules.
pub type FilterQuerysetHook = Arc<dyn Fn(QuerySet, &ResolveInfo) -> CoreResult<QuerySet> + Send + Sync>;

/// Runs before the optimizations of an object type's query set are applied. May change both the
/// query set and the pending optimizations.
pub type PreOptimizationHook = Arc<dyn Fn(QuerySet, &mut QueryOptimizer) -> QuerySet + Send + Sync>;

/// Optimizes the selection of a custom field.
pub type OptimizerHook = Arc<dyn Fn(&mut QueryOptimizer, &FieldNode, &ResolveInfo) -> CoreResult<()> + Send + Sync>;

/// Changes a query set directly, given the filter info of the selection it was registered for.
pub type ManualOptimizer = Arc<dyn Fn(QuerySet, &GraphQLFilterInfo) -> QuerySet + Send + Sync>;
