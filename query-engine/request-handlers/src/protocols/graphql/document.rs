use crate::{HandlerError, Result};
use indexmap::IndexMap;
use query_core::{CoreError, Fragments, Selection, Variables};
use query_structure::QueryValue;

/// A query operation of a GraphQL document, with the fragments it can spread.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDocument {
    pub name: Option<String>,
    pub selection_set: Vec<Selection>,
    pub fragments: Fragments,
    pub variable_definitions: Vec<VariableDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub name: String,
    /// Declared with a non-null type.
    pub required: bool,
    pub default: Option<QueryValue>,
}

impl QueryDocument {
    /// Coerces the request variables against the declared variables of the operation. Declared
    /// variables fall back to their default. Variables the operation doesn't declare are dropped.
    pub fn coerce_variables(&self, provided: &IndexMap<String, serde_json::Value>) -> Result<Variables> {
        let mut variables = Variables::with_capacity(self.variable_definitions.len());

        for definition in &self.variable_definitions {
            let value = match provided.get(&definition.name) {
                Some(value) => Some(QueryValue::from(value.clone())),
                None => definition.default.clone(),
            };

            match value {
                Some(QueryValue::Null) | None if definition.required => {
                    return Err(HandlerError::from(CoreError::MissingVariable(definition.name.clone())));
                }
                Some(value) => {
                    variables.insert(definition.name.clone(), value);
                }
                None => (),
            }
        }

        Ok(variables)
    }
}
