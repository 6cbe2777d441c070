use crate::{Expression, Filter, Model, OrderBy, join_lookup};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::fmt::{self, Write};

/// Eager loading of a relation in a separate query, merged into the parent records in memory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Prefetch {
    /// Prefetch without a custom query set. Used when the target model is not known.
    Lookup { lookup: String },
    Queryset {
        lookup: String,
        to_attr: Option<String>,
        queryset: Box<QuerySet>,
    },
    /// Prefetch of a generic foreign key, one query set per possible target model.
    Generic {
        lookup: String,
        to_attr: Option<String>,
        querysets: Vec<QuerySet>,
    },
}

impl Prefetch {
    pub fn lookup(lookup: impl Into<String>) -> Self {
        Self::Lookup { lookup: lookup.into() }
    }

    pub fn queryset(lookup: impl Into<String>, queryset: QuerySet, to_attr: Option<String>) -> Self {
        Self::Queryset {
            lookup: lookup.into(),
            to_attr,
            queryset: Box::new(queryset),
        }
    }

    pub fn generic(lookup: impl Into<String>, querysets: Vec<QuerySet>, to_attr: Option<String>) -> Self {
        Self::Generic {
            lookup: lookup.into(),
            to_attr,
            querysets,
        }
    }

    pub fn lookup_path(&self) -> &str {
        match self {
            Self::Lookup { lookup } | Self::Queryset { lookup, .. } | Self::Generic { lookup, .. } => lookup,
        }
    }

    pub fn to_attr(&self) -> Option<&str> {
        match self {
            Self::Lookup { .. } => None,
            Self::Queryset { to_attr, .. } | Self::Generic { to_attr, .. } => to_attr.as_deref(),
        }
    }

    /// Name the prefetched records end up under on the parent records.
    pub fn result_key(&self) -> &str {
        self.to_attr().unwrap_or_else(|| self.lookup_path())
    }

    /// Moves the prefetch below `prefix`, e.g. `assignees` becomes `project__assignees`.
    pub fn prefixed(mut self, prefix: &str) -> Self {
        match &mut self {
            Self::Lookup { lookup } | Self::Queryset { lookup, .. } | Self::Generic { lookup, .. } => {
                *lookup = join_lookup(prefix, lookup);
            }
        }

        self
    }
}

/// The plan of a query against one model: which relations are joined or prefetched,
/// which fields are loaded, and which computed values, filters and ordering apply.
///
/// Query sets are values. Every builder method consumes the query set and returns the
/// extended one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySet {
    model: Model,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    select_related: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    prefetch_related: Vec<Prefetch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    only: Option<Vec<String>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    aliases: IndexMap<String, Expression>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    annotations: IndexMap<String, Expression>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    filters: Vec<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    order_by: Vec<OrderBy>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    distinct: bool,
}

impl QuerySet {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            select_related: Vec::new(),
            prefetch_related: Vec::new(),
            only: None,
            aliases: IndexMap::new(),
            annotations: IndexMap::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            distinct: false,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn select_related<I, S>(mut self, lookups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for lookup in lookups {
            let lookup = lookup.into();

            if !self.select_related.contains(&lookup) {
                self.select_related.push(lookup);
            }
        }

        self
    }

    /// Adds prefetches. A prefetch for an already prefetched result key replaces the earlier one.
    pub fn prefetch_related(mut self, prefetches: impl IntoIterator<Item = Prefetch>) -> Self {
        for prefetch in prefetches {
            match self
                .prefetch_related
                .iter()
                .position(|existing| existing.result_key() == prefetch.result_key())
            {
                Some(idx) => self.prefetch_related[idx] = prefetch,
                None => self.prefetch_related.push(prefetch),
            }
        }

        self
    }

    /// Restricts the loaded fields. Replaces any earlier restriction.
    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(fields.into_iter().map(Into::into).unique().collect());
        self
    }

    pub fn alias(mut self, aliases: impl IntoIterator<Item = (String, Expression)>) -> Self {
        self.aliases.extend(aliases);
        self
    }

    pub fn annotate(mut self, annotations: impl IntoIterator<Item = (String, Expression)>) -> Self {
        self.annotations.extend(annotations);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        if !filter.is_empty() {
            self.filters.push(filter);
        }

        self
    }

    /// Sets the ordering. Replaces any earlier ordering.
    pub fn order_by(mut self, order_by: impl IntoIterator<Item = OrderBy>) -> Self {
        self.order_by = order_by.into_iter().collect();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn select_related_lookups(&self) -> &[String] {
        &self.select_related
    }

    pub fn prefetches(&self) -> &[Prefetch] {
        &self.prefetch_related
    }

    pub fn find_prefetch(&self, result_key: &str) -> Option<&Prefetch> {
        self.prefetch_related
            .iter()
            .find(|prefetch| prefetch.result_key() == result_key)
    }

    /// `None` if all fields are loaded.
    pub fn only_fields(&self) -> Option<&[String]> {
        self.only.as_deref()
    }

    pub fn aliases(&self) -> &IndexMap<String, Expression> {
        &self.aliases
    }

    pub fn annotations(&self) -> &IndexMap<String, Expression> {
        &self.annotations
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    fn fmt_body(&self, f: &mut String, indent: usize) -> fmt::Result {
        let pad = " ".repeat(indent);

        if let Some(only) = &self.only {
            writeln!(f, "{pad}only: {}", only.join(", "))?;
        }

        if !self.select_related.is_empty() {
            writeln!(f, "{pad}select_related: {}", self.select_related.join(", "))?;
        }

        for prefetch in &self.prefetch_related {
            let to_attr = prefetch
                .to_attr()
                .map(|attr| format!(" as {attr}"))
                .unwrap_or_default();

            match prefetch {
                Prefetch::Lookup { lookup } => writeln!(f, "{pad}prefetch: {lookup}")?,
                Prefetch::Queryset { lookup, queryset, .. } => {
                    writeln!(f, "{pad}prefetch: {lookup}{to_attr} -> {}", queryset.model)?;
                    queryset.fmt_body(f, indent + 2)?;
                }
                Prefetch::Generic { lookup, querysets, .. } => {
                    writeln!(f, "{pad}prefetch: {lookup}{to_attr} -> generic")?;

                    for queryset in querysets {
                        writeln!(f, "{pad}  {}", queryset.model)?;
                        queryset.fmt_body(f, indent + 4)?;
                    }
                }
            }
        }

        for (name, expr) in &self.aliases {
            writeln!(f, "{pad}alias: {name} = {expr}")?;
        }

        for (name, expr) in &self.annotations {
            writeln!(f, "{pad}annotate: {name} = {expr}")?;
        }

        for filter in &self.filters {
            writeln!(f, "{pad}filter: {filter}")?;
        }

        if !self.order_by.is_empty() {
            writeln!(f, "{pad}order_by: {}", self.order_by.iter().join(", "))?;
        }

        if self.distinct {
            writeln!(f, "{pad}distinct")?;
        }

        Ok(())
    }
}

impl fmt::Display for QuerySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();

        writeln!(out, "{}", self.model)?;
        self.fmt_body(&mut out, 2)?;

        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Datamodel, DatamodelRef};
    use expect_test::expect;
    use pretty_assertions::assert_eq;

    fn datamodel() -> DatamodelRef {
        Datamodel::builder()
            .model("Project", |m| m.scalar("name").reverse_foreign_key("tasks", "Task", "project"))
            .model("Task", |m| {
                m.scalar("name")
                    .foreign_key("project", "Project")
                    .many_to_many("assignees", "Person")
            })
            .model("Person", |m| m.scalar("name"))
            .build()
            .unwrap()
    }

    #[test]
    fn renders_nested_plan() {
        let dm = datamodel();
        let task = dm.find_model("Task").unwrap();
        let person = dm.find_model("Person").unwrap();

        let assignees = QuerySet::new(person)
            .only(["name", "id"])
            .order_by([OrderBy::asc("name")]);

        let queryset = QuerySet::new(task)
            .select_related(["project"])
            .prefetch_related([Prefetch::queryset("assignees", assignees, Some("people".into()))])
            .only(["name", "project_id", "project__name"])
            .annotate([("assignee_count".to_owned(), Expression::count("assignees").distinct())])
            .filter(Filter::lookup("name__icontains", "core"))
            .distinct();

        expect![[r#"
            Task
              only: name, project_id, project__name
              select_related: project
              prefetch: assignees as people -> Person
                only: name, id
                order_by: F(name) ASC
              annotate: assignee_count = Count(assignees, distinct)
              filter: name icontains "core"
              distinct
        "#]]
        .assert_eq(&queryset.to_string());
    }

    #[test]
    fn later_prefetch_for_same_key_replaces_earlier() {
        let dm = datamodel();
        let task = dm.find_model("Task").unwrap();

        let queryset = QuerySet::new(task)
            .prefetch_related([Prefetch::lookup("assignees")])
            .prefetch_related([Prefetch::lookup("assignees")])
            .select_related(["project", "project"]);

        assert_eq!(queryset.prefetches().len(), 1);
        assert_eq!(queryset.select_related_lookups(), vec!["project"]);
    }

    #[test]
    fn prefix_moves_prefetch_below_relation() {
        let prefetch = Prefetch::lookup("assignees").prefixed("task");

        assert_eq!(prefetch.lookup_path(), "task__assignees");
        assert_eq!(prefetch.result_key(), "task__assignees");
    }
}
