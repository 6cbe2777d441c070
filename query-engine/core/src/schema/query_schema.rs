use super::{InterfaceType, ObjectType, ObjectTypeBuilder, ObjectTypeRef, OutputField, OutputType, UnionType};
use crate::{CoreError, CoreResult, OptimizerSettings};
use indexmap::IndexMap;
use itertools::Itertools;
use query_structure::{DatamodelRef, FieldKind};
use std::sync::Arc;

/// Name of the root query type.
pub const QUERY_TYPE_NAME: &str = "Query";

pub type QuerySchemaRef = Arc<QuerySchema>;

/// The output types of a GraphQL schema together with the datamodel they are planned against.
#[derive(Debug)]
pub struct QuerySchema {
    datamodel: DatamodelRef,
    types: IndexMap<String, OutputType>,
    query_fields: IndexMap<String, OutputField>,
    settings: OptimizerSettings,
}

impl QuerySchema {
    pub fn builder(datamodel: DatamodelRef) -> QuerySchemaBuilder {
        QuerySchemaBuilder {
            datamodel,
            objects: Vec::new(),
            unions: Vec::new(),
            interfaces: Vec::new(),
            query_fields: Vec::new(),
            settings: OptimizerSettings::default(),
        }
    }

    pub fn datamodel(&self) -> &DatamodelRef {
        &self.datamodel
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    pub fn types(&self) -> impl Iterator<Item = &OutputType> {
        self.types.values()
    }

    pub fn find_type(&self, name: &str) -> Option<&OutputType> {
        self.types.get(name)
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectTypeRef> {
        self.find_type(name).and_then(OutputType::as_object)
    }

    pub fn query_fields(&self) -> impl Iterator<Item = &OutputField> {
        self.query_fields.values()
    }

    pub fn query_field(&self, name: &str) -> Option<&OutputField> {
        self.query_fields.get(name)
    }

    /// Looks up a field of the root query type or of an object type.
    pub fn find_field(&self, parent_type: &str, name: &str) -> Option<&OutputField> {
        if parent_type == QUERY_TYPE_NAME {
            self.query_field(name)
        } else {
            self.object_type(parent_type).and_then(|object| object.find_field(name))
        }
    }

    /// The object types a value of type `type_name` can have at runtime.
    pub fn possible_types(&self, type_name: &str) -> Vec<&ObjectTypeRef> {
        match self.find_type(type_name) {
            Some(OutputType::Object(object)) => vec![object],
            Some(OutputType::Union(union)) => union
                .members()
                .iter()
                .filter_map(|member| self.object_type(member))
                .collect(),
            Some(OutputType::Interface(interface)) => self
                .types
                .values()
                .filter_map(OutputType::as_object)
                .filter(|object| object.implements(interface.name()))
                .collect(),
            None => Vec::new(),
        }
    }
}

pub struct QuerySchemaBuilder {
    datamodel: DatamodelRef,
    objects: Vec<ObjectTypeBuilder>,
    unions: Vec<UnionType>,
    interfaces: Vec<InterfaceType>,
    query_fields: Vec<OutputField>,
    settings: OptimizerSettings,
}

impl QuerySchemaBuilder {
    pub fn object(mut self, object: ObjectTypeBuilder) -> Self {
        self.objects.push(object);
        self
    }

    pub fn union(mut self, union: UnionType) -> Self {
        self.unions.push(union);
        self
    }

    pub fn interface(mut self, interface: InterfaceType) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Adds a field to the root query type. Root fields return model bound object types.
    pub fn query_field(mut self, field: OutputField) -> Self {
        self.query_fields.push(field);
        self
    }

    pub fn settings(mut self, settings: OptimizerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> CoreResult<QuerySchemaRef> {
        let mut objects: IndexMap<String, ObjectType> = IndexMap::with_capacity(self.objects.len());
        let mut names: Vec<&str> = Vec::new();

        for object in self.objects {
            let object = object.build(&self.datamodel)?;
            objects.insert(object.name().to_owned(), object);
        }

        names.extend(objects.keys().map(String::as_str));
        names.extend(self.unions.iter().map(UnionType::name));
        names.extend(self.interfaces.iter().map(InterfaceType::name));

        if let Some(duplicate) = names.iter().duplicates().next() {
            return Err(CoreError::schema(format!("Type \"{duplicate}\" is declared more than once")));
        }

        let validator = Validator {
            objects: &objects,
            unions: &self.unions,
            interfaces: &self.interfaces,
        };

        validator.validate_types()?;

        // Fields needing the filter and order arguments of their target type.
        let mut list_fields = Vec::new();

        for object in objects.values() {
            for field in object.fields() {
                if validator.validate_field(object, field)? {
                    list_fields.push((object.name().to_owned(), field.name().to_owned()));
                }
            }
        }

        let mut query_fields = IndexMap::with_capacity(self.query_fields.len());

        for mut field in self.query_fields {
            let target = validator.validate_query_field(&field)?;
            add_list_arguments(&mut field, target, &self.settings);

            if query_fields.insert(field.name().to_owned(), field).is_some() {
                return Err(CoreError::schema("Root query fields must have unique names"));
            }
        }

        for (object_name, field_name) in list_fields {
            let target = objects
                .get(&object_name)
                .and_then(|object| object.find_field(&field_name))
                .and_then(|field| field.type_name())
                .and_then(|type_name| objects.get(type_name))
                .map(|target| (target.filterset().is_some(), target.orderset().is_some()));

            let field = objects
                .get_mut(&object_name)
                .and_then(|object| object.find_field_mut(&field_name));

            if let (Some(field), Some(target)) = (field, target) {
                add_list_arguments_for(field, target, &self.settings);
            }
        }

        let mut types: IndexMap<String, OutputType> = IndexMap::new();

        types.extend(
            objects
                .into_iter()
                .map(|(name, object)| (name, OutputType::Object(Arc::new(object)))),
        );
        types.extend(
            self.unions
                .into_iter()
                .map(|union| (union.name().to_owned(), OutputType::Union(union))),
        );
        types.extend(
            self.interfaces
                .into_iter()
                .map(|interface| (interface.name().to_owned(), OutputType::Interface(interface))),
        );

        Ok(Arc::new(QuerySchema {
            datamodel: self.datamodel,
            types,
            query_fields,
            settings: self.settings,
        }))
    }
}

fn add_list_arguments(field: &mut OutputField, target: &ObjectType, settings: &OptimizerSettings) {
    add_list_arguments_for(field, (target.filterset().is_some(), target.orderset().is_some()), settings)
}

fn add_list_arguments_for(field: &mut OutputField, (filterset, orderset): (bool, bool), settings: &OptimizerSettings) {
    if filterset {
        field.ensure_argument(&settings.filter_argument);
    }

    if orderset {
        field.ensure_argument(&settings.order_by_argument);
    }
}

struct Validator<'a> {
    objects: &'a IndexMap<String, ObjectType>,
    unions: &'a [UnionType],
    interfaces: &'a [InterfaceType],
}

impl Validator<'_> {
    fn contains_type(&self, name: &str) -> bool {
        self.objects.contains_key(name)
            || self.unions.iter().any(|union| union.name() == name)
            || self.interfaces.iter().any(|interface| interface.name() == name)
    }

    fn validate_types(&self) -> CoreResult<()> {
        for union in self.unions {
            if let Some(member) = union.members().iter().find(|member| !self.objects.contains_key(*member)) {
                return Err(CoreError::schema(format!(
                    "Member \"{member}\" of union \"{}\" is not an object type",
                    union.name()
                )));
            }
        }

        for object in self.objects.values() {
            if let Some(interface) = object
                .interfaces()
                .iter()
                .find(|name| !self.interfaces.iter().any(|interface| interface.name() == *name))
            {
                return Err(CoreError::schema(format!(
                    "Type \"{}\" implements unknown interface \"{interface}\"",
                    object.name()
                )));
            }
        }

        Ok(())
    }

    /// Returns whether the field is a to-many relation.
    fn validate_field(&self, object: &ObjectType, field: &OutputField) -> CoreResult<bool> {
        let error = |reason: String| {
            CoreError::schema(format!("Field \"{}.{}\" {reason}", object.name(), field.name()))
        };

        if let Some(type_name) = field.type_name().filter(|name| !self.contains_type(name)) {
            return Err(error(format!("returns unknown type \"{type_name}\"")));
        }

        let Some(source) = field.model_field_name() else {
            return Ok(false);
        };

        let model = object
            .model()
            .ok_or_else(|| error(format!("is backed by model field \"{source}\" but the type has no model")))?;

        let model_field = match model.find_field(source) {
            Some(model_field) => model_field,
            None if model.find_field_by_attname(source).is_some() => return Ok(false),
            None => {
                return Err(error(format!(
                    "is backed by unknown field \"{source}\" of model \"{}\"",
                    model.name()
                )));
            }
        };

        if model_field.is_scalar() {
            return Ok(false);
        }

        let Some(type_name) = field.type_name() else {
            return match model_field.is_forward_to_one() {
                true => Ok(false),
                false => Err(error("is a relation without an output type".to_owned())),
            };
        };

        if matches!(model_field.kind(), FieldKind::GenericForeignKey { .. }) {
            return Ok(false);
        }

        let target = self
            .objects
            .get(type_name)
            .ok_or_else(|| error(format!("returns \"{type_name}\" which is not an object type")))?;

        if target.model() != model_field.related_model().as_ref() {
            return Err(error(format!(
                "returns \"{type_name}\" which is not bound to model \"{}\"",
                model_field.related_model().map(|model| model.name().to_owned()).unwrap_or_default()
            )));
        }

        Ok(model_field.is_to_many())
    }

    fn validate_query_field(&self, field: &OutputField) -> CoreResult<&ObjectType> {
        field
            .type_name()
            .and_then(|type_name| self.objects.get(type_name))
            .filter(|object| object.model().is_some())
            .ok_or_else(|| {
                CoreError::schema(format!(
                    "Root field \"{}\" must return an object type bound to a model",
                    field.name()
                ))
            })
    }
}
