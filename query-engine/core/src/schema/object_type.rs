use super::{FilterQuerysetHook, FilterSet, GetQuerysetHook, OrderSet, OutputField, PreOptimizationHook};
use crate::{CoreError, CoreResult, QueryOptimizer, ResolveInfo};
use indexmap::IndexMap;
use query_structure::{DatamodelRef, Model, QuerySet};
use std::{fmt, sync::Arc};

pub type ObjectTypeRef = Arc<ObjectType>;

/// An object type of the schema. Types bound to a model are query types: their fields are
/// planned against the model.
pub struct ObjectType {
    name: String,
    model: Option<Model>,
    fields: IndexMap<String, OutputField>,
    interfaces: Vec<String>,
    filterset: Option<Arc<dyn FilterSet>>,
    orderset: Option<Arc<dyn OrderSet>>,
    get_queryset: Option<GetQuerysetHook>,
    filter_queryset: Option<FilterQuerysetHook>,
    pre_optimization: Option<PreOptimizationHook>,
}

impl ObjectType {
    pub fn builder(name: impl Into<String>) -> ObjectTypeBuilder {
        ObjectTypeBuilder {
            name: name.into(),
            model: None,
            fields: Vec::new(),
            interfaces: Vec::new(),
            filterset: None,
            orderset: None,
            get_queryset: None,
            filter_queryset: None,
            pre_optimization: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn fields(&self) -> impl Iterator<Item = &OutputField> {
        self.fields.values()
    }

    pub fn find_field(&self, name: &str) -> Option<&OutputField> {
        self.fields.get(name)
    }

    pub(crate) fn find_field_mut(&mut self, name: &str) -> Option<&mut OutputField> {
        self.fields.get_mut(name)
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|name| name == interface)
    }

    pub fn filterset(&self) -> Option<&dyn FilterSet> {
        self.filterset.as_deref()
    }

    pub fn orderset(&self) -> Option<&dyn OrderSet> {
        self.orderset.as_deref()
    }

    pub fn pre_optimization_hook(&self) -> Option<&PreOptimizationHook> {
        self.pre_optimization.as_ref()
    }

    /// The base query set for resolving this type.
    pub fn get_queryset(&self, info: &ResolveInfo) -> CoreResult<QuerySet> {
        let model = self
            .model
            .clone()
            .ok_or_else(|| CoreError::schema(format!("Type \"{}\" is not bound to a model", self.name)))?;

        let queryset = QuerySet::new(model);

        match &self.get_queryset {
            Some(hook) => hook(queryset, info),
            None => Ok(queryset),
        }
    }

    pub fn filter_queryset(&self, queryset: QuerySet, info: &ResolveInfo) -> CoreResult<QuerySet> {
        match &self.filter_queryset {
            Some(hook) => hook(queryset, info),
            None => Ok(queryset),
        }
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("fields", &self.fields)
            .field("interfaces", &self.interfaces)
            .field("filterset", &self.filterset.as_ref().map(|set| set.name().to_owned()))
            .field("orderset", &self.orderset.as_ref().map(|set| set.name().to_owned()))
            .finish_non_exhaustive()
    }
}

pub struct ObjectTypeBuilder {
    name: String,
    model: Option<String>,
    fields: Vec<OutputField>,
    interfaces: Vec<String>,
    filterset: Option<Arc<dyn FilterSet>>,
    orderset: Option<Arc<dyn OrderSet>>,
    get_queryset: Option<GetQuerysetHook>,
    filter_queryset: Option<FilterQuerysetHook>,
    pre_optimization: Option<PreOptimizationHook>,
}

impl ObjectTypeBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn field(mut self, field: OutputField) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds scalar fields backed by the model fields of the same names.
    pub fn scalars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(names.into_iter().map(OutputField::scalar));
        self
    }

    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn filterset(mut self, filterset: impl FilterSet + 'static) -> Self {
        self.filterset = Some(Arc::new(filterset));
        self
    }

    pub fn orderset(mut self, orderset: impl OrderSet + 'static) -> Self {
        self.orderset = Some(Arc::new(orderset));
        self
    }

    pub fn get_queryset<F>(mut self, hook: F) -> Self
    where
        F: Fn(QuerySet, &ResolveInfo) -> CoreResult<QuerySet> + Send + Sync + 'static,
    {
        self.get_queryset = Some(Arc::new(hook));
        self
    }

    pub fn filter_queryset<F>(mut self, hook: F) -> Self
    where
        F: Fn(QuerySet, &ResolveInfo) -> CoreResult<QuerySet> + Send + Sync + 'static,
    {
        self.filter_queryset = Some(Arc::new(hook));
        self
    }

    pub fn pre_optimization<F>(mut self, hook: F) -> Self
    where
        F: Fn(QuerySet, &mut QueryOptimizer) -> QuerySet + Send + Sync + 'static,
    {
        self.pre_optimization = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn build(self, datamodel: &DatamodelRef) -> CoreResult<ObjectType> {
        let model = match &self.model {
            Some(name) => Some(datamodel.find_model(name).ok_or_else(|| {
                CoreError::schema(format!("Type \"{}\" is bound to unknown model \"{name}\"", self.name))
            })?),
            None => None,
        };

        let mut fields = IndexMap::with_capacity(self.fields.len());

        for field in self.fields {
            if fields.contains_key(field.name()) {
                return Err(CoreError::schema(format!(
                    "Type \"{}\" declares field \"{}\" more than once",
                    self.name,
                    field.name()
                )));
            }

            fields.insert(field.name().to_owned(), field);
        }

        Ok(ObjectType {
            name: self.name,
            model,
            fields,
            interfaces: self.interfaces,
            filterset: self.filterset,
            orderset: self.orderset,
            get_queryset: self.get_queryset,
            filter_queryset: self.filter_queryset,
            pre_optimization: self.pre_optimization,
        })
    }
}
