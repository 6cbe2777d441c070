use indexmap::IndexMap;
use query_structure::{Expression, Prefetch, QuerySet, join_lookup};
use std::ops::{Add, AddAssign};

/// What one optimizer node contributes to a query set.
///
/// Results of a joined relation are added to the results of the parent, which moves all of
/// their lookups below the relation's name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptimizationResults {
    /// Relation name of the node. `None` for the node owning the query set.
    pub name: Option<String>,
    pub only_fields: Vec<String>,
    pub select_related: Vec<String>,
    pub prefetch_related: Vec<Prefetch>,
    pub aliases: IndexMap<String, Expression>,
    pub annotations: IndexMap<String, Expression>,
}

impl OptimizationResults {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn apply(self, queryset: QuerySet, disable_only_fields: bool) -> QuerySet {
        let mut queryset = queryset;

        if !self.select_related.is_empty() {
            queryset = queryset.select_related(self.select_related);
        }

        if !self.prefetch_related.is_empty() {
            queryset = queryset.prefetch_related(self.prefetch_related);
        }

        if !disable_only_fields && !self.only_fields.is_empty() {
            queryset = queryset.only(self.only_fields);
        }

        if !self.aliases.is_empty() {
            queryset = queryset.alias(self.aliases);
        }

        if !self.annotations.is_empty() {
            queryset = queryset.annotate(self.annotations);
        }

        queryset
    }
}

impl AddAssign for OptimizationResults {
    fn add_assign(&mut self, other: Self) {
        let prefix = other.name.unwrap_or_default();

        if !prefix.is_empty() {
            self.select_related.push(prefix.clone());
        }

        self.only_fields
            .extend(other.only_fields.iter().map(|field| join_lookup(&prefix, field)));
        self.select_related
            .extend(other.select_related.iter().map(|lookup| join_lookup(&prefix, lookup)));
        self.prefetch_related
            .extend(other.prefetch_related.into_iter().map(|prefetch| prefetch.prefixed(&prefix)));
    }
}

impl Add for OptimizationResults {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}
