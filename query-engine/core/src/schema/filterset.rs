use crate::{CoreError, CoreResult, ResolveInfo};
use indexmap::IndexMap;
use query_structure::{Expression, Filter, QueryValue};

pub const AND_BLOCK: &str = "AND";
pub const OR_BLOCK: &str = "OR";
pub const NOT_BLOCK: &str = "NOT";

/// What a filter set contributes to the query set of a list field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterResults {
    pub filter: Filter,
    /// Set if any of the applied filters can match a record more than once.
    pub distinct: bool,
    /// Aliases the filter refers to.
    pub aliases: IndexMap<String, Expression>,
}

pub trait FilterSet: Send + Sync {
    fn name(&self) -> &str;

    /// Builds the filter for the input given to a field's filter argument.
    fn build(&self, data: &QueryValue, info: &ResolveInfo) -> CoreResult<FilterResults>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterDefinition {
    lookup: String,
    distinct: bool,
    aliases: IndexMap<String, Expression>,
}

impl FilterDefinition {
    /// A filter comparing the input against `lookup`, e.g. `name__icontains`.
    pub fn new(lookup: impl Into<String>) -> Self {
        Self {
            lookup: lookup.into(),
            distinct: false,
            aliases: IndexMap::new(),
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn alias(mut self, name: impl Into<String>, expression: Expression) -> Self {
        self.aliases.insert(name.into(), expression);
        self
    }
}

/// A filter set declared as a list of named filters. Input objects combine their filters with
/// AND, and may nest `AND`, `OR` and `NOT` blocks.
#[derive(Debug, Clone)]
pub struct DeclarativeFilterSet {
    name: String,
    filters: IndexMap<String, FilterDefinition>,
}

impl DeclarativeFilterSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filters: IndexMap::new(),
        }
    }

    pub fn filter(mut self, input_name: impl Into<String>, definition: FilterDefinition) -> Self {
        self.filters.insert(input_name.into(), definition);
        self
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    fn build_block(&self, data: &QueryValue, results: &mut FilterResults) -> CoreResult<Vec<Filter>> {
        let input = data
            .as_object()
            .ok_or_else(|| CoreError::filter(self.name.as_str(), format!("expected an input object, got {data}")))?;

        let mut filters = Vec::with_capacity(input.len());

        for (key, value) in input {
            let filter = match key.as_str() {
                AND_BLOCK => Filter::and_all(self.build_block(value, results)?),
                OR_BLOCK => Filter::or_all(self.build_block(value, results)?),
                NOT_BLOCK => match Filter::and_all(self.build_block(value, results)?) {
                    Filter::Empty => Filter::Empty,
                    block => block.not(),
                },
                _ if value.is_null() => continue,
                name => {
                    let definition = self
                        .filters
                        .get(name)
                        .ok_or_else(|| CoreError::filter(self.name.as_str(), format!("unknown filter \"{name}\"")))?;

                    results.distinct |= definition.distinct;
                    results
                        .aliases
                        .extend(definition.aliases.iter().map(|(k, v)| (k.clone(), v.clone())));

                    Filter::lookup(&definition.lookup, value.clone())
                }
            };

            filters.push(filter);
        }

        Ok(filters)
    }
}

impl FilterSet for DeclarativeFilterSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, data: &QueryValue, _info: &ResolveInfo) -> CoreResult<FilterResults> {
        let mut results = FilterResults::default();
        let filters = self.build_block(data, &mut results)?;

        results.filter = Filter::and_all(filters);

        Ok(results)
    }
}
