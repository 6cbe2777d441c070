use crate::{
    CoreError, CoreResult, FieldNode, ObjectTypeRef, OutputField, OutputFieldKind, OutputType, ResolveInfo, Selection,
};
use query_structure::{FieldKind, Model, ModelField};

/// Where the walk currently is: the model and the object type the selections are resolved
/// against. Every descent creates a new context.
#[derive(Debug, Clone)]
pub struct TraversalContext<'a> {
    pub model: Model,
    pub object_type: &'a ObjectTypeRef,
}

impl<'a> TraversalContext<'a> {
    pub fn new(model: Model, object_type: &'a ObjectTypeRef) -> Self {
        Self { model, object_type }
    }

    /// Context for the selections of `object_type`, which must be bound to a model.
    pub fn for_type(object_type: &'a ObjectTypeRef) -> CoreResult<Self> {
        let model = object_type
            .model()
            .cloned()
            .ok_or_else(|| CoreError::schema(format!("Type \"{}\" is not bound to a model", object_type.name())))?;

        Ok(Self::new(model, object_type))
    }
}

/// A relation with a statically known target type.
#[derive(Debug, Clone)]
pub struct RelationTarget<'a> {
    pub field: &'a OutputField,
    pub model_field: ModelField,
    pub object_type: &'a ObjectTypeRef,
}

/// A generic foreign key. Its target can be any of `member_types`.
#[derive(Debug, Clone)]
pub struct GenericTarget<'a> {
    pub field: &'a OutputField,
    pub model_field: ModelField,
    pub output_type: &'a OutputType,
    pub member_types: Vec<&'a ObjectTypeRef>,
}

/// What a selected field resolves to on the current model.
#[derive(Debug, Clone)]
pub enum FieldTarget<'a> {
    /// Introspection fields like `__typename`.
    Meta,
    Custom(&'a OutputField),
    Scalar { field: &'a OutputField, attname: String },
    ToOne(RelationTarget<'a>),
    ToMany(RelationTarget<'a>),
    GenericToOne(GenericTarget<'a>),
    GenericToMany(RelationTarget<'a>),
}

impl FieldTarget<'_> {
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            Self::ToOne(_) | Self::ToMany(_) | Self::GenericToOne(_) | Self::GenericToMany(_)
        )
    }
}

/// Resolves `field_node` against the current context.
pub fn resolve_target<'a>(
    info: &'a ResolveInfo,
    ctx: &TraversalContext<'a>,
    field_node: &FieldNode,
) -> CoreResult<FieldTarget<'a>> {
    if field_node.name.starts_with("__") {
        return Ok(FieldTarget::Meta);
    }

    let object_type: &'a ObjectTypeRef = ctx.object_type;
    let field = object_type.find_field(&field_node.name).ok_or_else(|| {
        CoreError::schema(format!(
            "Type \"{}\" has no field \"{}\"",
            object_type.name(),
            field_node.name
        ))
    })?;

    let source = match field.kind() {
        OutputFieldKind::Custom => return Ok(FieldTarget::Custom(field)),
        OutputFieldKind::Model { field: source } => source,
    };

    let Some(model_field) = ctx.model.find_field(source) else {
        // Selected by attribute name, e.g. `project_id`.
        return match ctx.model.find_field_by_attname(source) {
            Some(_) => Ok(FieldTarget::Scalar {
                field,
                attname: source.clone(),
            }),
            None => Err(CoreError::schema(format!(
                "Model \"{}\" has no field \"{source}\"",
                ctx.model.name()
            ))),
        };
    };

    let plain_attname = || model_field.attname().unwrap_or_else(|| model_field.name().to_owned());

    if model_field.is_scalar() || (model_field.is_forward_to_one() && field_node.selection_set.is_empty()) {
        return Ok(FieldTarget::Scalar {
            field,
            attname: plain_attname(),
        });
    }

    let schema = &*info.schema;
    let type_name = field.type_name().ok_or_else(|| {
        CoreError::schema(format!(
            "Relation \"{}.{}\" has no output type",
            object_type.name(),
            field.name()
        ))
    })?;

    if let FieldKind::GenericForeignKey { .. } = model_field.kind() {
        let output_type = schema
            .find_type(type_name)
            .ok_or_else(|| CoreError::schema(format!("Unknown type \"{type_name}\"")))?;

        return Ok(FieldTarget::GenericToOne(GenericTarget {
            field,
            model_field,
            output_type,
            member_types: schema.possible_types(type_name),
        }));
    }

    let target_type = schema
        .object_type(type_name)
        .ok_or_else(|| CoreError::schema(format!("\"{type_name}\" is not an object type")))?;

    let target = RelationTarget {
        field,
        model_field,
        object_type: target_type,
    };

    match target.model_field.kind() {
        FieldKind::GenericRelation { .. } => Ok(FieldTarget::GenericToMany(target)),
        _ if target.model_field.is_to_many() => Ok(FieldTarget::ToMany(target)),
        _ => Ok(FieldTarget::ToOne(target)),
    }
}

/// Recursive descent over the selections of a query, alongside the model graph.
///
/// Implementors receive one call per resolved field. `Node` is the structure the walk
/// builds, e.g. a query optimizer per relation.
pub trait GraphQLAstWalker<'a> {
    type Node;

    fn info(&self) -> &'a ResolveInfo;

    fn handle_meta(
        &mut self,
        _node: &mut Self::Node,
        _ctx: &TraversalContext<'a>,
        _field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        Ok(())
    }

    fn handle_custom(
        &mut self,
        node: &mut Self::Node,
        ctx: &TraversalContext<'a>,
        field: &'a OutputField,
        field_node: &'a FieldNode,
    ) -> CoreResult<()>;

    fn handle_scalar(
        &mut self,
        node: &mut Self::Node,
        ctx: &TraversalContext<'a>,
        attname: String,
        field_node: &'a FieldNode,
    ) -> CoreResult<()>;

    fn handle_to_one(
        &mut self,
        node: &mut Self::Node,
        ctx: &TraversalContext<'a>,
        target: RelationTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()>;

    fn handle_to_many(
        &mut self,
        node: &mut Self::Node,
        ctx: &TraversalContext<'a>,
        target: RelationTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()>;

    fn handle_generic_to_one(
        &mut self,
        node: &mut Self::Node,
        ctx: &TraversalContext<'a>,
        target: GenericTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()>;

    /// Generic relations have a known target model, so by default they are handled like any
    /// other to-many relation.
    fn handle_generic_to_many(
        &mut self,
        node: &mut Self::Node,
        ctx: &TraversalContext<'a>,
        target: RelationTarget<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        self.handle_to_many(node, ctx, target, field_node)
    }

    /// Called once per relation traversal, before the relation is handled.
    fn increase_complexity(&mut self, _ctx: &TraversalContext<'a>, _field_node: &'a FieldNode) -> CoreResult<()> {
        Ok(())
    }

    fn walk_selections(
        &mut self,
        node: &mut Self::Node,
        ctx: &TraversalContext<'a>,
        selections: &'a [Selection],
    ) -> CoreResult<()> {
        let info = self.info();

        for selection in selections {
            match selection {
                Selection::Field(field_node) => {
                    if info.should_include(&field_node.directives)? {
                        self.walk_field(node, ctx, field_node)?;
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if !info.should_include(&spread.directives)? {
                        continue;
                    }

                    let fragment = info.fragment(&spread.name)?;

                    if let Some(fragment_ctx) = self.fragment_context(ctx, Some(fragment.type_condition.as_str())) {
                        self.walk_selections(node, &fragment_ctx, &fragment.selection_set)?;
                    }
                }
                Selection::InlineFragment(fragment) => {
                    if !info.should_include(&fragment.directives)? {
                        continue;
                    }

                    if let Some(fragment_ctx) = self.fragment_context(ctx, fragment.type_condition.as_deref()) {
                        self.walk_selections(node, &fragment_ctx, &fragment.selection_set)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn walk_field(
        &mut self,
        node: &mut Self::Node,
        ctx: &TraversalContext<'a>,
        field_node: &'a FieldNode,
    ) -> CoreResult<()> {
        let target = resolve_target(self.info(), ctx, field_node)?;

        if target.is_relation() {
            self.increase_complexity(ctx, field_node)?;
        }

        match target {
            FieldTarget::Meta => self.handle_meta(node, ctx, field_node),
            FieldTarget::Custom(field) => self.handle_custom(node, ctx, field, field_node),
            FieldTarget::Scalar { attname, .. } => self.handle_scalar(node, ctx, attname, field_node),
            FieldTarget::ToOne(target) => self.handle_to_one(node, ctx, target, field_node),
            FieldTarget::ToMany(target) => self.handle_to_many(node, ctx, target, field_node),
            FieldTarget::GenericToOne(target) => self.handle_generic_to_one(node, ctx, target, field_node),
            FieldTarget::GenericToMany(target) => self.handle_generic_to_many(node, ctx, target, field_node),
        }
    }

    /// The context to walk a fragment in, or `None` if the fragment cannot apply to the
    /// current model. Fragments on an abstract type the current type belongs to keep the
    /// context; fragments on another object type of the same model switch to that type.
    fn fragment_context(
        &self,
        ctx: &TraversalContext<'a>,
        type_condition: Option<&str>,
    ) -> Option<TraversalContext<'a>> {
        let Some(condition) = type_condition else {
            return Some(ctx.clone());
        };

        if condition == ctx.object_type.name() {
            return Some(ctx.clone());
        }

        match self.info().schema.find_type(condition)? {
            OutputType::Object(object) => match object.model() {
                Some(model) if *model == ctx.model => Some(TraversalContext::new(model.clone(), object)),
                _ => None,
            },
            OutputType::Union(union) => union.contains(ctx.object_type.name()).then(|| ctx.clone()),
            OutputType::Interface(interface) => ctx.object_type.implements(interface.name()).then(|| ctx.clone()),
        }
    }
}
