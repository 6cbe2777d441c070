use super::{GenericPrefetch, GenericTarget, GraphQLAstWalker, QueryOptimizer, RelationTarget, TraversalContext};
use crate::{CoreError, CoreResult, FieldNode, OutputField, ResolveInfo};
use query_structure::QuerySet;
use tracing::{debug, warn};

/// Walks the selections of the field being resolved and collects the [`QueryOptimizer`] tree
/// for its query set.
///
/// Scalars end up in `only_fields`, to-one relations are joined, to-many relations and generic
/// foreign keys are prefetched. Every relation traversal counts towards the complexity limit.
pub struct OptimizationCompiler<'a> {
    info: &'a ResolveInfo,
    max_complexity: usize,
    complexity: usize,
}

impl<'a> OptimizationCompiler<'a> {
    pub fn new(info: &'a ResolveInfo) -> Self {
        Self {
            info,
            max_complexity: info.schema.settings().max_complexity,
            complexity: 0,
        }
    }

    pub fn with_max_complexity(mut self, max_complexity: usize) -> Self {
        self.max_complexity = max_complexity;
        self
    }

    #[tracing::instrument(skip_all, fields(field = %self.info.field_name, model = %queryset.model().name()))]
    pub fn compile(mut self, queryset: &QuerySet) -> CoreResult<QueryOptimizer> {
        let info = self.info;
        let object_type = info.return_type()?;
        let model = queryset.model().clone();
        let ctx = TraversalContext::new(model.clone(), object_type);

        let mut optimizer = QueryOptimizer::new(model, Some(object_type.clone()));

        for field_node in &info.field_nodes {
            self.walk_selections(&mut optimizer, &ctx, &field_node.selection_set)?;
        }

        debug!(complexity = self.complexity, "compiled query optimizer");

        Ok(optimizer)
    }
}

impl<'a> GraphQLAstWalker<'a> for OptimizationCompiler<'a> {
    type Node = QueryOptimizer;

    fn info(&self) -> &'a ResolveInfo {
        self.info
    }

    fn handle_custom(
        &mut self,
        node: &mut QueryOptimizer,
        ctx: &TraversalContext<'a>,
        field: &'a OutputField,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        match field.hook() {
            Some(hook) => hook(node, field_node, self.info),
            None => {
                warn!(
                    type_name = %ctx.object_type.name(),
                    field = %field.name(),
                    "No optimizer hook registered for custom field, its selection is not optimized"
                );

                Ok(())
            }
        }
    }

    fn handle_scalar(
        &mut self,
        node: &mut QueryOptimizer,
        _ctx: &TraversalContext<'a>,
        attname: String,
        _field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        node.add_only_field(attname);
        Ok(())
    }

    fn handle_to_one(
        &mut self,
        node: &mut QueryOptimizer,
        _ctx: &TraversalContext<'a>,
        target: RelationTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        let ctx = TraversalContext::for_type(target.object_type)?;
        let name = target.model_field.name().to_owned();

        node.add_only_fields(target.model_field.local_attnames());

        let child = node.select_related.entry(name.clone()).or_insert_with(|| {
            QueryOptimizer::for_relation(
                ctx.model.clone(),
                target.object_type.clone(),
                name,
                None,
                target.model_field.remote_attnames(),
            )
        });

        child.add_filter_key(field_node.response_key());

        self.walk_selections(child, &ctx, &field_node.selection_set)
    }

    fn handle_to_many(
        &mut self,
        node: &mut QueryOptimizer,
        _ctx: &TraversalContext<'a>,
        target: RelationTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        let ctx = TraversalContext::for_type(target.object_type)?;
        let name = target.model_field.name();
        let key = field_node.response_key();

        // The same relation selected under different aliases is loaded once per alias.
        let to_attr = (key != name).then(|| key.to_owned());

        let child = node.prefetch_related.entry(key.to_owned()).or_insert_with(|| {
            QueryOptimizer::for_relation(
                ctx.model.clone(),
                target.object_type.clone(),
                name,
                to_attr,
                target.model_field.remote_attnames(),
            )
        });

        self.walk_selections(child, &ctx, &field_node.selection_set)
    }

    fn handle_generic_to_one(
        &mut self,
        node: &mut QueryOptimizer,
        _ctx: &TraversalContext<'a>,
        target: GenericTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        let name = target.model_field.name();
        let key = field_node.response_key();
        let to_attr = (key != name).then(|| key.to_owned());

        node.add_only_fields(target.model_field.local_attnames());

        let prefetch = node
            .generic_prefetches
            .entry(key.to_owned())
            .or_insert_with(|| GenericPrefetch::new(name, to_attr));

        let members: Vec<_> = target
            .member_types
            .into_iter()
            .filter(|member| member.model().is_some())
            .collect();

        if members.is_empty() {
            debug!(
                relation = %name,
                output_type = %target.output_type.name(),
                "no model bound type for generic foreign key"
            );
        }

        for member in members {
            let ctx = TraversalContext::for_type(member)?;

            let child = prefetch
                .optimizers
                .entry(member.name().to_owned())
                .or_insert_with(|| QueryOptimizer::new(ctx.model.clone(), Some(member.clone())));

            self.walk_selections(child, &ctx, &field_node.selection_set)?;
        }

        Ok(())
    }

    fn increase_complexity(&mut self, _ctx: &TraversalContext<'a>, _field_node: &'a FieldNode) -> CoreResult<()> {
        self.complexity += 1;

        if self.complexity > self.max_complexity {
            return Err(CoreError::ComplexityExceeded {
                max: self.max_complexity,
            });
        }

        Ok(())
    }
}
