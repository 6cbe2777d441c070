use super::{GraphQLProtocolAdapter, QueryDocument};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A GraphQL request as sent over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlBody {
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: IndexMap<String, serde_json::Value>,
}

impl GraphqlBody {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn variables(mut self, variables: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = variables {
            self.variables = map.into_iter().collect();
        }

        self
    }

    pub fn try_from_str(val: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(val)?)
    }

    /// Parses the query and converts the selected operation.
    pub fn into_doc(self) -> crate::Result<QueryDocument> {
        let document = graphql_parser::parse_query::<String>(&self.query)?;

        GraphQLProtocolAdapter::convert(document, self.operation_name.as_deref())
    }
}
