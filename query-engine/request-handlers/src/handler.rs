use crate::{GQLError, GQLResponse, GraphqlBody, HandlerError, QueryDocument, Result};
use indexmap::IndexMap;
use query_core::{
    CoreError, FieldNode, QUERY_TYPE_NAME, QuerySchemaRef, ResolveInfo, Selection, Variables, optimize, should_include,
};
use std::fmt;
use tracing::debug;

const TYPENAME_FIELD: &str = "__typename";

/// Plans the query sets of all root fields of a GraphQL query.
///
/// The response holds the plan of every root field under its response key. A root field that
/// fails to plan is reported in `errors` and doesn't affect the other root fields.
pub struct OptimizeRequestHandler<'a> {
    query_schema: &'a QuerySchemaRef,
}

impl fmt::Debug for OptimizeRequestHandler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizeRequestHandler").finish()
    }
}

impl<'a> OptimizeRequestHandler<'a> {
    pub fn new(query_schema: &'a QuerySchemaRef) -> Self {
        Self { query_schema }
    }

    pub fn handle_json(&self, body: &str) -> GQLResponse {
        match GraphqlBody::try_from_str(body) {
            Ok(body) => self.handle(body),
            Err(err) => err.into(),
        }
    }

    pub fn handle(&self, body: GraphqlBody) -> GQLResponse {
        debug!("Incoming GraphQL query: {:?}", &body);

        let prepared = body.clone().into_doc().and_then(|document| {
            let variables = document.coerce_variables(&body.variables)?;
            let root_fields = collect_root_fields(&document, &variables)?;

            Ok((document, variables, root_fields))
        });

        let (document, variables, root_fields) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => return err.into(),
        };

        let mut response = GQLResponse::with_capacity(root_fields.len());

        for (key, field_nodes) in root_fields {
            match self.handle_field(&key, &document, &variables, field_nodes) {
                Ok(data) => response.insert_data(key, data),
                Err(err) => {
                    response.insert_data(key.clone(), serde_json::Value::Null);
                    response.insert_error(GQLError::from(err).with_path(key));
                }
            }
        }

        response
    }

    #[tracing::instrument(skip(self, document, variables, field_nodes))]
    fn handle_field(
        &self,
        key: &str,
        document: &QueryDocument,
        variables: &Variables,
        field_nodes: Vec<FieldNode>,
    ) -> Result<serde_json::Value> {
        let mut field_nodes = field_nodes.into_iter();

        let Some(first) = field_nodes.next() else {
            return Ok(serde_json::Value::Null);
        };

        if first.name == TYPENAME_FIELD {
            return Ok(serde_json::Value::String(QUERY_TYPE_NAME.to_owned()));
        }

        if self.query_schema.query_field(&first.name).is_none() {
            return Err(HandlerError::query_conversion(format!(
                "Cannot query field '{}' on type '{QUERY_TYPE_NAME}'.",
                first.name
            )));
        }

        let mut info = ResolveInfo::new(self.query_schema.clone(), first)
            .with_fragments(document.fragments.clone())
            .with_variables(variables.clone());

        for field_node in field_nodes {
            info.push_field_node(field_node);
        }

        let queryset = info.return_type()?.get_queryset(&info)?;
        let queryset = optimize(queryset, &info)?;

        Ok(serde_json::to_value(&queryset)?)
    }
}

/// Root fields grouped by response key. Fragments on the query type are flattened into the
/// root selection.
fn collect_root_fields(document: &QueryDocument, variables: &Variables) -> Result<IndexMap<String, Vec<FieldNode>>> {
    fn collect(
        selections: &[Selection],
        document: &QueryDocument,
        variables: &Variables,
        fields: &mut IndexMap<String, Vec<FieldNode>>,
    ) -> Result<()> {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    if should_include(&field.directives, variables)? {
                        fields
                            .entry(field.response_key().to_owned())
                            .or_default()
                            .push(field.clone());
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if !should_include(&spread.directives, variables)? {
                        continue;
                    }

                    let fragment = document
                        .fragments
                        .get(&spread.name)
                        .ok_or_else(|| CoreError::UnknownFragment(spread.name.clone()))?;

                    if fragment.type_condition == QUERY_TYPE_NAME {
                        collect(&fragment.selection_set, document, variables, fields)?;
                    }
                }
                Selection::InlineFragment(inline) => {
                    let on_query = inline
                        .type_condition
                        .as_deref()
                        .is_none_or(|type_name| type_name == QUERY_TYPE_NAME);

                    if on_query && should_include(&inline.directives, variables)? {
                        collect(&inline.selection_set, document, variables, fields)?;
                    }
                }
            }
        }

        Ok(())
    }

    let mut fields = IndexMap::new();
    collect(&document.selection_set, document, variables, &mut fields)?;

    Ok(fields)
}
