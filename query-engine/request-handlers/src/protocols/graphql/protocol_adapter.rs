use super::{QueryDocument, VariableDefinition};
use crate::{HandlerError, Result};
use graphql_parser::query::{
    Definition, Directive as GqlDirective, Document, FragmentDefinition as GqlFragmentDefinition,
    OperationDefinition, Selection as GqlSelection, SelectionSet, Type, TypeCondition, Value,
    VariableDefinition as GqlVariableDefinition,
};
use indexmap::IndexMap;
use query_core::{
    ArgumentValue, Directive, FieldNode, FragmentDefinition, FragmentSpread, Fragments, InlineFragment, Selection,
    Variables,
};
use query_structure::QueryValue;

/// Protocol adapter for GraphQL -> Query Document.
///
/// GraphQL is mapped as following:
/// - If the request specifies an operation name, only that operation is picked and the rest ignored.
///   Without a name the document must contain exactly one operation.
/// - A `query { ... }` or single selection block `{ ... }` is converted with all its selections,
///   fragment spreads and inline fragments kept as they are.
/// - Fragment definitions are collected for the whole document.
/// - Argument literals are mapped to `ArgumentValue`s, variables are kept as references.
///
/// Unsupported:
/// - Mutations and subscriptions.
/// - Fragments spreading themselves, directly or through other fragments.
pub struct GraphQLProtocolAdapter;

impl GraphQLProtocolAdapter {
    pub fn convert(gql_doc: Document<'_, String>, operation: Option<&str>) -> Result<QueryDocument> {
        let mut operations = Vec::new();
        let mut fragments = Fragments::new();

        for definition in gql_doc.definitions {
            match definition {
                Definition::Fragment(fragment) => {
                    let fragment = Self::convert_fragment(fragment)?;

                    if fragments.contains_key(&fragment.name) {
                        return Err(HandlerError::query_conversion(format!(
                            "Fragment '{}' is defined more than once.",
                            fragment.name
                        )));
                    }

                    fragments.insert(fragment.name.clone(), fragment);
                }
                Definition::Operation(op) => operations.push(op),
            }
        }

        let operation = match operation {
            Some(name) => operations
                .into_iter()
                .find(|op| Self::matches_operation(op, name))
                .ok_or_else(|| {
                    HandlerError::query_conversion(format!("Operation '{name}' does not match any query."))
                })?,
            None => {
                if operations.len() > 1 {
                    return Err(HandlerError::query_conversion(
                        "Document contains more than one operation, an operation name is required.",
                    ));
                }

                operations
                    .pop()
                    .ok_or_else(|| HandlerError::query_conversion("Document contained no operations."))?
            }
        };

        Self::check_fragment_cycles(&fragments)?;

        let (name, variable_definitions, selection_set) = match operation {
            OperationDefinition::SelectionSet(s) => (None, Vec::new(), s),
            OperationDefinition::Query(q) => (q.name, q.variable_definitions, q.selection_set),
            OperationDefinition::Mutation(m) => {
                return Err(HandlerError::unsupported_feature(
                    "Mutation",
                    format!("At position {}.", m.position),
                ));
            }
            OperationDefinition::Subscription(s) => {
                return Err(HandlerError::unsupported_feature(
                    "Subscription query",
                    format!("At position {}.", s.position),
                ));
            }
        };

        Ok(QueryDocument {
            name,
            selection_set: Self::convert_selection_set(selection_set)?,
            fragments,
            variable_definitions: variable_definitions
                .into_iter()
                .map(Self::convert_variable_definition)
                .collect::<Result<Vec<_>>>()?,
        })
    }

    fn convert_fragment(fragment: GqlFragmentDefinition<'_, String>) -> Result<FragmentDefinition> {
        let TypeCondition::On(type_condition) = fragment.type_condition;

        Ok(FragmentDefinition {
            name: fragment.name,
            type_condition,
            selection_set: Self::convert_selection_set(fragment.selection_set)?,
        })
    }

    fn convert_variable_definition(definition: GqlVariableDefinition<'_, String>) -> Result<VariableDefinition> {
        let default = match definition.default_value {
            Some(value) => Some(Self::convert_value(value)?.resolve(&Variables::new()).ok_or_else(|| {
                HandlerError::query_conversion(format!(
                    "Default value of variable '${}' must not use variables.",
                    definition.name
                ))
            })?),
            None => None,
        };

        Ok(VariableDefinition {
            name: definition.name,
            required: matches!(definition.var_type, Type::NonNullType(_)),
            default,
        })
    }

    fn convert_selection_set(selection_set: SelectionSet<'_, String>) -> Result<Vec<Selection>> {
        selection_set
            .items
            .into_iter()
            .map(|item| match item {
                GqlSelection::Field(f) => {
                    let arguments = Self::convert_arguments(f.arguments)?;

                    Ok(Selection::Field(FieldNode {
                        name: f.name,
                        alias: f.alias,
                        arguments,
                        directives: Self::convert_directives(f.directives)?,
                        selection_set: Self::convert_selection_set(f.selection_set)?,
                    }))
                }

                GqlSelection::FragmentSpread(fs) => Ok(Selection::FragmentSpread(FragmentSpread {
                    name: fs.fragment_name,
                    directives: Self::convert_directives(fs.directives)?,
                })),

                GqlSelection::InlineFragment(i) => Ok(Selection::InlineFragment(InlineFragment {
                    type_condition: i.type_condition.map(|TypeCondition::On(name)| name),
                    directives: Self::convert_directives(i.directives)?,
                    selection_set: Self::convert_selection_set(i.selection_set)?,
                })),
            })
            .collect()
    }

    fn convert_directives(directives: Vec<GqlDirective<'_, String>>) -> Result<Vec<Directive>> {
        directives
            .into_iter()
            .map(|directive| {
                Ok(Directive {
                    name: directive.name,
                    arguments: Self::convert_arguments(directive.arguments)?,
                })
            })
            .collect()
    }

    fn convert_arguments(arguments: Vec<(String, Value<'_, String>)>) -> Result<IndexMap<String, ArgumentValue>> {
        arguments
            .into_iter()
            .map(|(k, v)| Ok((k, Self::convert_value(v)?)))
            .collect()
    }

    /// Checks if the given GraphQL operation matches the operation name that should be executed.
    fn matches_operation(op: &OperationDefinition<'_, String>, operation: &str) -> bool {
        let check = |n: Option<&String>| n.filter(|name| name.as_str() == operation).is_some();

        match op {
            OperationDefinition::Subscription(s) => check(s.name.as_ref()),
            OperationDefinition::SelectionSet(_) => false,
            OperationDefinition::Query(q) => check(q.name.as_ref()),
            OperationDefinition::Mutation(m) => check(m.name.as_ref()),
        }
    }

    fn convert_value(value: Value<'_, String>) -> Result<ArgumentValue> {
        match value {
            Value::Variable(name) => Ok(ArgumentValue::Variable(name)),
            Value::Int(i) => match i.as_i64() {
                Some(i) => Ok(ArgumentValue::from(i)),
                None => Err(HandlerError::query_conversion(format!("Invalid 64 bit integer: {i:?}"))),
            },
            Value::Float(f) => Ok(ArgumentValue::Scalar(QueryValue::Float(f))),
            Value::String(s) => Ok(ArgumentValue::Scalar(s.into())),
            Value::Boolean(b) => Ok(ArgumentValue::from(b)),
            Value::Null => Ok(ArgumentValue::Scalar(QueryValue::Null)),
            Value::Enum(e) => Ok(ArgumentValue::Scalar(QueryValue::Enum(e))),
            Value::List(values) => {
                let values = values
                    .into_iter()
                    .map(Self::convert_value)
                    .collect::<Result<Vec<_>>>()?;

                Ok(ArgumentValue::List(values))
            }
            Value::Object(map) => {
                let values = map
                    .into_iter()
                    .map(|(k, v)| Self::convert_value(v).map(|v| (k, v)))
                    .collect::<Result<IndexMap<_, _>>>()?;

                Ok(ArgumentValue::Object(values))
            }
        }
    }

    fn check_fragment_cycles(fragments: &Fragments) -> Result<()> {
        fn spreads<'a>(selections: &'a [Selection], out: &mut Vec<&'a str>) {
            for selection in selections {
                match selection {
                    Selection::Field(field) => spreads(&field.selection_set, out),
                    Selection::FragmentSpread(spread) => out.push(&spread.name),
                    Selection::InlineFragment(inline) => spreads(&inline.selection_set, out),
                }
            }
        }

        fn visit<'a>(name: &'a str, fragments: &'a Fragments, path: &mut Vec<&'a str>) -> Result<()> {
            if path.contains(&name) {
                return Err(HandlerError::unsupported_feature(
                    "Fragment cycle",
                    format!("Fragment '{name}' spreads itself."),
                ));
            }

            let Some(fragment) = fragments.get(name) else {
                return Ok(());
            };

            let mut children = Vec::new();
            spreads(&fragment.selection_set, &mut children);

            path.push(name);

            for child in children {
                visit(child, fragments, path)?;
            }

            path.pop();

            Ok(())
        }

        for name in fragments.keys() {
            visit(name, fragments, &mut Vec::new())?;
        }

        Ok(())
    }
}
