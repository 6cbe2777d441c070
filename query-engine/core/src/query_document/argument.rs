use super::Variables;
use indexmap::IndexMap;
use query_structure::QueryValue;

/// An argument literal as written in the document. Variables are resolved late, against the
/// variables of the request.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Variable(String),
    Scalar(QueryValue),
    List(Vec<ArgumentValue>),
    Object(IndexMap<String, ArgumentValue>),
}

impl ArgumentValue {
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Returns `None` if the value is a variable that was not provided.
    pub fn resolve(&self, variables: &Variables) -> Option<QueryValue> {
        match self {
            Self::Variable(name) => variables.get(name).cloned(),
            _ => Some(self.resolve_nested(variables)),
        }
    }

    // Missing variables nested in lists or objects resolve to null.
    fn resolve_nested(&self, variables: &Variables) -> QueryValue {
        match self {
            Self::Variable(name) => variables.get(name).cloned().unwrap_or_default(),
            Self::Scalar(value) => value.clone(),
            Self::List(values) => QueryValue::list(values.iter().map(|value| value.resolve_nested(variables))),
            Self::Object(fields) => QueryValue::object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.resolve_nested(variables))),
            ),
        }
    }
}

impl From<QueryValue> for ArgumentValue {
    fn from(value: QueryValue) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for ArgumentValue {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn variables_are_substituted_at_any_depth() {
        let variables: Variables = [("term".to_owned(), QueryValue::from("core"))].into_iter().collect();

        let argument = ArgumentValue::Object(
            [
                ("nameContains".to_owned(), ArgumentValue::variable("term")),
                ("done".to_owned(), ArgumentValue::variable("missing")),
            ]
            .into_iter()
            .collect(),
        );

        let resolved = argument.resolve(&variables).unwrap();

        assert_eq!(resolved.to_string(), r#"{nameContains: "core", done: null}"#);
        assert_eq!(ArgumentValue::variable("missing").resolve(&variables), None);
    }
}
