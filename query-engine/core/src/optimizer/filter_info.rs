use super::{GenericTarget, GraphQLAstWalker, RelationTarget, TraversalContext};
use crate::{CoreResult, FieldNode, ObjectType, OutputField, ResolveInfo};
use indexmap::IndexMap;
use query_structure::{Expression, Filter, Model, OrderBy};

/// The filtering and ordering requested for one selection, and for the selections below it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphQLFilterInfo {
    pub field_name: String,
    pub filters: Option<Filter>,
    pub distinct: bool,
    pub aliases: IndexMap<String, Expression>,
    pub order_by: Vec<OrderBy>,
    /// Keyed by response key.
    pub children: IndexMap<String, GraphQLFilterInfo>,
    /// Filter info per member type of a generic foreign key, keyed by type name.
    pub members: IndexMap<String, GraphQLFilterInfo>,
}

impl GraphQLFilterInfo {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            ..Default::default()
        }
    }

    pub fn child(&self, key: &str) -> Option<&GraphQLFilterInfo> {
        self.children.get(key)
    }

    pub fn member(&self, type_name: &str) -> Option<&GraphQLFilterInfo> {
        self.members.get(type_name)
    }

    /// Adds what `other` has and `self` lacks. Filtering and ordering already present win, the
    /// way repeated selections of one response key keep the arguments seen first.
    pub fn merge(&mut self, other: &GraphQLFilterInfo) {
        if self.filters.is_none() && other.filters.is_some() {
            self.filters = other.filters.clone();
            self.distinct |= other.distinct;
        }

        if self.order_by.is_empty() {
            self.order_by = other.order_by.clone();
        }

        for (name, expression) in &other.aliases {
            self.aliases.entry(name.clone()).or_insert_with(|| expression.clone());
        }

        merge_nodes(&mut self.children, &other.children);
        merge_nodes(&mut self.members, &other.members);
    }
}

fn merge_nodes(nodes: &mut IndexMap<String, GraphQLFilterInfo>, other: &IndexMap<String, GraphQLFilterInfo>) {
    for (key, node) in other {
        match nodes.get_mut(key) {
            Some(existing) => existing.merge(node),
            None => {
                nodes.insert(key.clone(), node.clone());
            }
        }
    }
}

/// Compiles the filter info of the field being resolved.
pub fn get_filter_info(info: &ResolveInfo, model: &Model) -> CoreResult<GraphQLFilterInfo> {
    FilterInfoCompiler::new(info).compile(model)
}

/// Collects the filter and order arguments of every relation in a query into a
/// [`GraphQLFilterInfo`] tree.
pub struct FilterInfoCompiler<'a> {
    info: &'a ResolveInfo,
}

impl<'a> FilterInfoCompiler<'a> {
    pub fn new(info: &'a ResolveInfo) -> Self {
        Self { info }
    }

    #[tracing::instrument(skip_all, fields(field = %self.info.field_name, model = %model.name()))]
    pub fn compile(mut self, model: &Model) -> CoreResult<GraphQLFilterInfo> {
        let info = self.info;
        let field = info.field_definition()?;
        let object_type = info.return_type()?;
        let ctx = TraversalContext::new(model.clone(), object_type);

        let mut filter_info = GraphQLFilterInfo::new(field.name());

        if let Some(field_node) = info.field_nodes.first() {
            self.apply_arguments(&mut filter_info, field, object_type, field_node)?;
        }

        for field_node in &info.field_nodes {
            self.walk_selections(&mut filter_info, &ctx, &field_node.selection_set)?;
        }

        Ok(filter_info)
    }

    fn apply_arguments(
        &self,
        filter_info: &mut GraphQLFilterInfo,
        field: &OutputField,
        object_type: &ObjectType,
        field_node: &FieldNode,
    ) -> CoreResult<()> {
        let settings = self.info.schema.settings();
        let arguments = self.info.argument_values(field, field_node)?;

        let filter_input = arguments.get(&settings.filter_argument).filter(|data| !data.is_null());

        if let (Some(filterset), Some(data)) = (object_type.filterset(), filter_input) {
            let results = filterset.build(data, self.info)?;

            if !results.filter.is_empty() {
                filter_info.filters = Some(match filter_info.filters.take() {
                    Some(existing) => existing.and(results.filter),
                    None => results.filter,
                });
            }

            filter_info.distinct |= results.distinct;
            filter_info.aliases.extend(results.aliases);
        }

        let order_input = arguments.get(&settings.order_by_argument).filter(|data| !data.is_null());

        if let (Some(orderset), Some(data)) = (object_type.orderset(), order_input) {
            let results = orderset.build(data, self.info)?;

            filter_info.order_by = results.order_by;
            filter_info.aliases.extend(results.aliases);
        }

        Ok(())
    }

    /// The filter info of the child selection `field_node`, created on first sight.
    fn child<'n>(
        &self,
        node: &'n mut GraphQLFilterInfo,
        field: &OutputField,
        object_type: &ObjectType,
        field_node: &FieldNode,
    ) -> CoreResult<&'n mut GraphQLFilterInfo> {
        let key = field_node.response_key();

        if !node.children.contains_key(key) {
            let mut child = GraphQLFilterInfo::new(field.name());
            self.apply_arguments(&mut child, field, object_type, field_node)?;
            node.children.insert(key.to_owned(), child);
        }

        Ok(node.children.entry(key.to_owned()).or_default())
    }

    fn walk_relation(
        &mut self,
        node: &mut GraphQLFilterInfo,
        target: RelationTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        let ctx = TraversalContext::for_type(target.object_type)?;
        let child = self.child(node, target.field, target.object_type, field_node)?;

        self.walk_selections(child, &ctx, &field_node.selection_set)
    }
}

impl<'a> GraphQLAstWalker<'a> for FilterInfoCompiler<'a> {
    type Node = GraphQLFilterInfo;

    fn info(&self) -> &'a ResolveInfo {
        self.info
    }

    fn handle_custom(
        &mut self,
        node: &mut GraphQLFilterInfo,
        _ctx: &TraversalContext<'a>,
        field: &'a OutputField,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        // Custom fields returning an object type can still be filtered by their resolver.
        if let Some(object_type) = field.type_name().and_then(|name| self.info.schema.object_type(name)) {
            self.child(node, field, object_type, field_node)?;
        }

        Ok(())
    }

    fn handle_scalar(
        &mut self,
        _node: &mut GraphQLFilterInfo,
        _ctx: &TraversalContext<'a>,
        _attname: String,
        _field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        Ok(())
    }

    fn handle_to_one(
        &mut self,
        node: &mut GraphQLFilterInfo,
        _ctx: &TraversalContext<'a>,
        target: RelationTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        self.walk_relation(node, target, field_node)
    }

    fn handle_to_many(
        &mut self,
        node: &mut GraphQLFilterInfo,
        _ctx: &TraversalContext<'a>,
        target: RelationTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        self.walk_relation(node, target, field_node)
    }

    fn handle_generic_to_one(
        &mut self,
        node: &mut GraphQLFilterInfo,
        _ctx: &TraversalContext<'a>,
        target: GenericTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        let child = node
            .children
            .entry(field_node.response_key().to_owned())
            .or_insert_with(|| GraphQLFilterInfo::new(target.field.name()));

        // Members may select the same response key with different arguments.
        for member in target.member_types.into_iter().filter(|member| member.model().is_some()) {
            let ctx = TraversalContext::for_type(member)?;
            let member_info = child
                .members
                .entry(member.name().to_owned())
                .or_insert_with(|| GraphQLFilterInfo::new(target.field.name()));

            self.walk_selections(member_info, &ctx, &field_node.selection_set)?;
        }

        Ok(())
    }
}
