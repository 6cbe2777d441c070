use super::{Directive, FieldNode, FragmentDefinition, Fragments, Variables};
use crate::{CoreError, CoreResult, ObjectTypeRef, OutputField, QUERY_TYPE_NAME, QuerySchemaRef};
use indexmap::IndexMap;
use query_structure::QueryValue;

/// Everything known about the field being resolved: the schema, the field's nodes in the
/// document, the document's fragments and the request variables.
#[derive(Debug, Clone)]
pub struct ResolveInfo {
    pub schema: QuerySchemaRef,
    pub field_name: String,
    /// All nodes selecting the field under the same response key.
    pub field_nodes: Vec<FieldNode>,
    pub fragments: Fragments,
    pub variables: Variables,
    pub parent_type: String,
}

impl ResolveInfo {
    /// Info for a root query field.
    pub fn new(schema: QuerySchemaRef, field_node: FieldNode) -> Self {
        Self {
            schema,
            field_name: field_node.name.clone(),
            field_nodes: vec![field_node],
            fragments: Fragments::new(),
            variables: Variables::new(),
            parent_type: QUERY_TYPE_NAME.to_owned(),
        }
    }

    pub fn with_fragments(mut self, fragments: Fragments) -> Self {
        self.fragments = fragments;
        self
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn push_field_node(&mut self, field_node: FieldNode) {
        self.field_nodes.push(field_node);
    }

    pub fn field_definition(&self) -> CoreResult<&OutputField> {
        self.schema.find_field(&self.parent_type, &self.field_name).ok_or_else(|| {
            CoreError::schema(format!(
                "Type \"{}\" has no field \"{}\"",
                self.parent_type, self.field_name
            ))
        })
    }

    /// The object type the resolved field returns.
    pub fn return_type(&self) -> CoreResult<&ObjectTypeRef> {
        let field = self.field_definition()?;

        field
            .type_name()
            .and_then(|name| self.schema.object_type(name))
            .ok_or_else(|| CoreError::schema(format!("Field \"{}\" does not return an object type", field.name())))
    }

    pub fn fragment(&self, name: &str) -> CoreResult<&FragmentDefinition> {
        self.fragments
            .get(name)
            .ok_or_else(|| CoreError::UnknownFragment(name.to_owned()))
    }

    /// The resolved arguments of `field_node`, with declared defaults for arguments that were
    /// not given.
    pub fn argument_values(
        &self,
        field: &OutputField,
        field_node: &FieldNode,
    ) -> CoreResult<IndexMap<String, QueryValue>> {
        let mut values = IndexMap::new();

        for (name, value) in &field_node.arguments {
            if field.find_argument(name).is_none() {
                return Err(CoreError::argument(
                    name.as_str(),
                    format!("Unknown argument on field \"{}\"", field.name()),
                ));
            }

            if let Some(value) = value.resolve(&self.variables) {
                values.insert(name.clone(), value);
            }
        }

        for argument in field.arguments() {
            if let (false, Some(default)) = (values.contains_key(&argument.name), &argument.default) {
                values.insert(argument.name.clone(), default.clone());
            }
        }

        Ok(values)
    }

    /// Evaluates `@skip(if:)` and `@include(if:)`.
    pub fn should_include(&self, directives: &[Directive]) -> CoreResult<bool> {
        should_include(directives, &self.variables)
    }
}

/// Evaluates `@skip(if:)` and `@include(if:)` against `variables`. Unknown directives are
/// ignored.
pub fn should_include(directives: &[Directive], variables: &Variables) -> CoreResult<bool> {
    for directive in directives {
        let excluded_when = match directive.name.as_str() {
            "skip" => true,
            "include" => false,
            _ => continue,
        };

        let condition = directive.arguments.get("if").and_then(|value| value.resolve(variables));

        match condition {
            Some(QueryValue::Boolean(flag)) if flag == excluded_when => return Ok(false),
            Some(QueryValue::Boolean(_)) => (),
            _ => {
                return Err(CoreError::argument(
                    "if",
                    format!("Directive \"@{}\" requires a boolean", directive.name),
                ));
            }
        }
    }

    Ok(true)
}
