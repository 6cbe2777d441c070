use once_cell::sync::Lazy;
use serde::Deserialize;

/// Relation traversals allowed per planned root field unless a schema sets its own limit.
pub static MAX_COMPLEXITY: Lazy<usize> = Lazy::new(|| match std::env::var("OPTIMIZER_MAX_COMPLEXITY") {
    Ok(max) => max.parse().unwrap_or(10),
    Err(_) => 10,
});

pub static DISABLE_ONLY_FIELDS: Lazy<bool> = Lazy::new(|| match std::env::var("OPTIMIZER_DISABLE_ONLY_FIELDS") {
    Ok(flag) => matches!(flag.as_str(), "1" | "true"),
    Err(_) => false,
});

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerSettings {
    pub max_complexity: usize,
    /// Skips `only(...)` on planned query sets, loading every column.
    pub disable_only_fields_optimization: bool,
    /// Name of the argument carrying filter set input on list fields.
    pub filter_argument: String,
    /// Name of the argument carrying order set input on list fields.
    pub order_by_argument: String,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_complexity: *MAX_COMPLEXITY,
            disable_only_fields_optimization: *DISABLE_ONLY_FIELDS,
            filter_argument: "filter".to_owned(),
            order_by_argument: "orderBy".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings: OptimizerSettings =
            serde_json::from_str(r#"{ "maxComplexity": 3, "orderByArgument": "ordering" }"#).unwrap();

        assert_eq!(settings.max_complexity, 3);
        assert_eq!(settings.order_by_argument, "ordering");
        assert_eq!(settings.filter_argument, "filter");
        assert_eq!(settings.disable_only_fields_optimization, *DISABLE_ONLY_FIELDS);
    }
}
