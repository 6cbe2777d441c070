use crate::{CoreError, CoreResult, ResolveInfo};
use indexmap::IndexMap;
use query_structure::{Expression, NullsOrder, OrderBy, QueryValue, SortOrder};

const ASC_SUFFIX: &str = "Asc";
const DESC_SUFFIX: &str = "Desc";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderResults {
    pub order_by: Vec<OrderBy>,
    pub aliases: IndexMap<String, Expression>,
}

pub trait OrderSet: Send + Sync {
    fn name(&self) -> &str;

    /// Builds the ordering for the input given to a field's order argument.
    fn build(&self, data: &QueryValue, info: &ResolveInfo) -> CoreResult<OrderResults>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDefinition {
    expression: Expression,
    nulls_order: Option<NullsOrder>,
    aliases: IndexMap<String, Expression>,
}

impl OrderDefinition {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            nulls_order: None,
            aliases: IndexMap::new(),
        }
    }

    pub fn field(path: impl Into<String>) -> Self {
        Self::new(Expression::field(path))
    }

    /// Orders by an alias computed from `expression`.
    pub fn aliased(name: impl Into<String>, expression: Expression) -> Self {
        let name = name.into();
        let mut definition = Self::field(name.clone());

        definition.aliases.insert(name, expression);
        definition
    }

    pub fn nulls(mut self, nulls_order: NullsOrder) -> Self {
        self.nulls_order = Some(nulls_order);
        self
    }
}

/// An order set declared as a list of named orderings. Every ordering is exposed as the enum
/// values `<name>Asc` and `<name>Desc`.
#[derive(Debug, Clone)]
pub struct DeclarativeOrderSet {
    name: String,
    orders: IndexMap<String, OrderDefinition>,
}

impl DeclarativeOrderSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            orders: IndexMap::new(),
        }
    }

    pub fn order(mut self, name: impl Into<String>, definition: OrderDefinition) -> Self {
        self.orders.insert(name.into(), definition);
        self
    }

    pub fn enum_values(&self) -> Vec<String> {
        self.orders
            .keys()
            .flat_map(|name| [format!("{name}{ASC_SUFFIX}"), format!("{name}{DESC_SUFFIX}")])
            .collect()
    }

    fn parse_value<'a>(&'a self, value: &'a str) -> CoreResult<(&'a OrderDefinition, SortOrder)> {
        let parsed = match value.strip_suffix(DESC_SUFFIX) {
            Some(name) => Some((name, SortOrder::Descending)),
            None => value.strip_suffix(ASC_SUFFIX).map(|name| (name, SortOrder::Ascending)),
        };

        parsed
            .and_then(|(name, order)| self.orders.get(name).map(|definition| (definition, order)))
            .ok_or_else(|| CoreError::filter(self.name.as_str(), format!("unknown ordering \"{value}\"")))
    }
}

impl OrderSet for DeclarativeOrderSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, data: &QueryValue, _info: &ResolveInfo) -> CoreResult<OrderResults> {
        let mut results = OrderResults::default();

        for value in data.clone().into_list() {
            let value = value
                .as_str()
                .ok_or_else(|| CoreError::filter(self.name.as_str(), format!("expected an ordering, got {value}")))?;

            let (definition, order) = self.parse_value(value)?;

            results
                .order_by
                .push(OrderBy::new(definition.expression.clone(), order).with_nulls(definition.nulls_order));
            results
                .aliases
                .extend(definition.aliases.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Ok(results)
    }
}
