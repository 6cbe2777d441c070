use super::{GraphQLFilterInfo, OptimizationResults, get_filter_info};
use crate::{CoreResult, ManualOptimizer, ObjectTypeRef, ResolveInfo};
use indexmap::IndexMap;
use query_structure::{Expression, Model, Prefetch, QuerySet};
use std::{fmt, sync::Arc};
use tracing::debug;

/// The pending optimizations of one model in a query, and of the relations selected below it.
///
/// Optimizers form a tree mirroring the selected relations. Joined relations are kept in
/// `select_related`, relations loaded by a separate query in `prefetch_related`.
#[derive(Clone)]
pub struct QueryOptimizer {
    model: Model,
    object_type: Option<ObjectTypeRef>,
    /// Relation name, for optimizers of a relation.
    name: Option<String>,
    to_attr: Option<String>,
    /// Attributes the records need to be linked to their parent when loaded separately.
    link_fields: Vec<String>,
    /// Response keys a joined relation was selected under. Its filter info is found there.
    filter_keys: Vec<String>,
    only_fields: Vec<String>,
    aliases: IndexMap<String, Expression>,
    annotations: IndexMap<String, Expression>,
    pub(crate) select_related: IndexMap<String, QueryOptimizer>,
    pub(crate) prefetch_related: IndexMap<String, QueryOptimizer>,
    pub(crate) generic_prefetches: IndexMap<String, GenericPrefetch>,
    manual_optimizers: IndexMap<String, ManualOptimizer>,
}

impl QueryOptimizer {
    pub fn new(model: Model, object_type: Option<ObjectTypeRef>) -> Self {
        Self {
            model,
            object_type,
            name: None,
            to_attr: None,
            link_fields: Vec::new(),
            filter_keys: Vec::new(),
            only_fields: Vec::new(),
            aliases: IndexMap::new(),
            annotations: IndexMap::new(),
            select_related: IndexMap::new(),
            prefetch_related: IndexMap::new(),
            generic_prefetches: IndexMap::new(),
            manual_optimizers: IndexMap::new(),
        }
    }

    /// An optimizer for the relation `name`, loaded into `to_attr` if given.
    pub fn for_relation(
        model: Model,
        object_type: ObjectTypeRef,
        name: impl Into<String>,
        to_attr: Option<String>,
        link_fields: Vec<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            to_attr,
            link_fields,
            ..Self::new(model, Some(object_type))
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn object_type(&self) -> Option<&ObjectTypeRef> {
        self.object_type.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn to_attr(&self) -> Option<&str> {
        self.to_attr.as_deref()
    }

    pub fn only_fields(&self) -> &[String] {
        &self.only_fields
    }

    pub fn aliases(&self) -> &IndexMap<String, Expression> {
        &self.aliases
    }

    pub fn annotations(&self) -> &IndexMap<String, Expression> {
        &self.annotations
    }

    pub fn select_related(&self) -> &IndexMap<String, QueryOptimizer> {
        &self.select_related
    }

    /// Keyed by response key.
    pub fn prefetch_related(&self) -> &IndexMap<String, QueryOptimizer> {
        &self.prefetch_related
    }

    pub fn generic_prefetches(&self) -> &IndexMap<String, GenericPrefetch> {
        &self.generic_prefetches
    }

    pub(crate) fn add_filter_key(&mut self, key: &str) {
        if !self.filter_keys.iter().any(|existing| existing == key) {
            self.filter_keys.push(key.to_owned());
        }
    }

    pub fn add_only_field(&mut self, attname: impl Into<String>) {
        let attname = attname.into();

        if !self.only_fields.contains(&attname) {
            self.only_fields.push(attname);
        }
    }

    pub fn add_only_fields(&mut self, attnames: impl IntoIterator<Item = String>) {
        for attname in attnames {
            self.add_only_field(attname);
        }
    }

    pub fn alias(&mut self, name: impl Into<String>, expression: Expression) {
        self.aliases.insert(name.into(), expression);
    }

    pub fn annotate(&mut self, name: impl Into<String>, expression: Expression) {
        self.annotations.insert(name.into(), expression);
    }

    /// Registers a function changing the query set of this optimizer directly. It receives the
    /// filter info of the child selection `name`, or the filter info of this optimizer if there
    /// is no such child.
    pub fn add_manual_optimizer<F>(&mut self, name: impl Into<String>, optimizer: F)
    where
        F: Fn(QuerySet, &GraphQLFilterInfo) -> QuerySet + Send + Sync + 'static,
    {
        self.manual_optimizers.insert(name.into(), Arc::new(optimizer));
    }

    /// Joined relations with annotations, aliases or manual optimizers are loaded by a separate
    /// query instead, where those apply to the related records alone.
    pub fn needs_promotion(&self) -> bool {
        !self.annotations.is_empty() || !self.aliases.is_empty() || !self.manual_optimizers.is_empty()
    }

    /// Applies the optimizations to `queryset`, including the filtering and ordering requested in
    /// the arguments of the field being resolved.
    #[tracing::instrument(skip_all, fields(model = %self.model.name()))]
    pub fn optimize_queryset(self, queryset: QuerySet, info: &ResolveInfo) -> CoreResult<QuerySet> {
        let filter_info = get_filter_info(info, queryset.model())?;
        self.process(queryset, &filter_info, info)
    }

    /// Applies the optimizations of this optimizer and all optimizers below it to `queryset`.
    pub fn process(
        mut self,
        queryset: QuerySet,
        filter_info: &GraphQLFilterInfo,
        info: &ResolveInfo,
    ) -> CoreResult<QuerySet> {
        let object_type = self.object_type.clone();
        let mut queryset = queryset;

        if let Some(hook) = object_type.as_ref().and_then(|object| object.pre_optimization_hook()).cloned() {
            queryset = hook(queryset, &mut self);
        }

        for (name, optimizer) in std::mem::take(&mut self.manual_optimizers) {
            queryset = optimizer(queryset, filter_info.child(&name).unwrap_or(filter_info));
        }

        let mut results = self.into_results(filter_info, info)?;
        results
            .aliases
            .extend(filter_info.aliases.iter().map(|(name, expr)| (name.clone(), expr.clone())));

        let disable_only_fields = info.schema.settings().disable_only_fields_optimization;
        let mut queryset = results.apply(queryset, disable_only_fields);

        if let Some(object_type) = &object_type {
            queryset = object_type.filter_queryset(queryset, info)?;
        }

        if !filter_info.order_by.is_empty() {
            queryset = queryset.order_by(filter_info.order_by.iter().cloned());
        }

        if let Some(filter) = &filter_info.filters {
            queryset = queryset.filter(filter.clone());
        }

        if filter_info.distinct {
            queryset = queryset.distinct();
        }

        Ok(queryset)
    }

    fn into_results(self, filter_info: &GraphQLFilterInfo, info: &ResolveInfo) -> CoreResult<OptimizationResults> {
        let empty = GraphQLFilterInfo::default();
        let mut results = OptimizationResults {
            name: self.name,
            only_fields: self.only_fields,
            aliases: self.aliases,
            annotations: self.annotations,
            ..Default::default()
        };

        for (name, optimizer) in self.select_related {
            let child_info = optimizer.joined_filter_info(filter_info);

            if optimizer.needs_promotion() {
                debug!(relation = %name, "promoting joined relation to a prefetch");
                results.prefetch_related.push(optimizer.into_prefetch(&child_info, info)?);
            } else {
                results += optimizer.into_results(&child_info, info)?;
            }
        }

        for (key, optimizer) in self.prefetch_related {
            let child_info = filter_info.child(&key).unwrap_or(&empty);
            results.prefetch_related.push(optimizer.into_prefetch(child_info, info)?);
        }

        for (key, prefetch) in self.generic_prefetches {
            let child_info = filter_info.child(&key).unwrap_or(&empty);
            results.prefetch_related.push(prefetch.into_prefetch(child_info, info)?);
        }

        Ok(results)
    }

    /// The filter info of a joined relation, combined over every response key it was selected
    /// under.
    fn joined_filter_info(&self, parent: &GraphQLFilterInfo) -> GraphQLFilterInfo {
        let mut keys = self.filter_keys.iter();

        let mut combined = keys
            .next()
            .and_then(|key| parent.child(key))
            .cloned()
            .unwrap_or_default();

        for other in keys.filter_map(|key| parent.child(key)) {
            combined.merge(other);
        }

        combined
    }

    fn into_prefetch(mut self, filter_info: &GraphQLFilterInfo, info: &ResolveInfo) -> CoreResult<Prefetch> {
        let lookup = self.name.clone().unwrap_or_default();
        let to_attr = self.to_attr.clone();

        let link_fields = std::mem::take(&mut self.link_fields);
        self.add_only_fields(link_fields);

        let queryset = self.base_queryset(info)?;
        let queryset = self.process(queryset, filter_info, info)?;

        Ok(Prefetch::queryset(lookup, queryset, to_attr))
    }

    fn base_queryset(&self, info: &ResolveInfo) -> CoreResult<QuerySet> {
        match &self.object_type {
            Some(object_type) => object_type.get_queryset(info),
            None => Ok(QuerySet::new(self.model.clone())),
        }
    }
}

impl fmt::Debug for QueryOptimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptimizer")
            .field("model", &self.model.name())
            .field("name", &self.name)
            .field("to_attr", &self.to_attr)
            .field("filter_keys", &self.filter_keys)
            .field("only_fields", &self.only_fields)
            .field("aliases", &self.aliases)
            .field("annotations", &self.annotations)
            .field("select_related", &self.select_related)
            .field("prefetch_related", &self.prefetch_related)
            .field("generic_prefetches", &self.generic_prefetches)
            .field("manual_optimizers", &self.manual_optimizers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Prefetch of a generic foreign key: one optimizer per model-bound type the key can point to.
#[derive(Debug, Clone)]
pub struct GenericPrefetch {
    pub name: String,
    pub to_attr: Option<String>,
    /// Keyed by object type name.
    pub optimizers: IndexMap<String, QueryOptimizer>,
}

impl GenericPrefetch {
    pub fn new(name: impl Into<String>, to_attr: Option<String>) -> Self {
        Self {
            name: name.into(),
            to_attr,
            optimizers: IndexMap::new(),
        }
    }

    fn into_prefetch(self, filter_info: &GraphQLFilterInfo, info: &ResolveInfo) -> CoreResult<Prefetch> {
        if self.optimizers.is_empty() {
            debug!(relation = %self.name, "no model known for generic relation, prefetching by name");
            return Ok(Prefetch::lookup(self.name));
        }

        let empty = GraphQLFilterInfo::default();

        let querysets = self
            .optimizers
            .into_iter()
            .map(|(type_name, optimizer)| {
                let member_info = filter_info.member(&type_name).unwrap_or(&empty);
                let queryset = optimizer.base_queryset(info)?;

                optimizer.process(queryset, member_info, info)
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Prefetch::generic(self.name, querysets, self.to_attr))
    }
}
