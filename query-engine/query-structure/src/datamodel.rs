use crate::{DomainError, FieldId, FieldKind, Model, ModelId};
use indexmap::IndexMap;
use std::sync::Arc;

pub type DatamodelRef = Arc<Datamodel>;

/// The set of models the query planner reasons about.
///
/// A datamodel is immutable once built. Models and fields are addressed through
/// [`Model`] and [`crate::ModelField`] handles, which carry a reference to the
/// datamodel they belong to.
#[derive(Debug)]
pub struct Datamodel {
    pub(crate) models: Vec<ModelData>,
}

#[derive(Debug)]
pub(crate) struct ModelData {
    pub(crate) name: String,
    pub(crate) primary_key: String,
    pub(crate) fields: Vec<FieldData>,
}

#[derive(Debug)]
pub(crate) struct FieldData {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
}

impl Datamodel {
    pub fn builder() -> DatamodelBuilder {
        DatamodelBuilder::default()
    }

    pub fn find_model(self: &Arc<Self>, name: &str) -> Option<Model> {
        self.models
            .iter()
            .position(|model| model.name == name)
            .map(|idx| Arc::clone(self).zip(ModelId(idx)))
    }

    pub fn models(self: &Arc<Self>) -> impl Iterator<Item = Model> + '_ {
        (0..self.models.len()).map(|idx| Arc::clone(self).zip(ModelId(idx)))
    }

    pub(crate) fn model_data(&self, id: ModelId) -> &ModelData {
        &self.models[id.0]
    }

    pub(crate) fn field_data(&self, id: FieldId) -> &FieldData {
        &self.models[id.model.0].fields[id.index]
    }
}

#[derive(Debug, Default)]
pub struct DatamodelBuilder {
    models: Vec<ModelBuilder>,
}

impl DatamodelBuilder {
    pub fn model(mut self, name: impl Into<String>, build: impl FnOnce(ModelBuilder) -> ModelBuilder) -> Self {
        self.models.push(build(ModelBuilder::new(name)));
        self
    }

    /// Resolves all model references and validates the relations between models.
    pub fn build(self) -> Result<DatamodelRef, DomainError> {
        let mut ids: IndexMap<String, ModelId> = IndexMap::with_capacity(self.models.len());

        for (idx, model) in self.models.iter().enumerate() {
            if ids.insert(model.name.clone(), ModelId(idx)).is_some() {
                return Err(DomainError::DuplicateModel {
                    name: model.name.clone(),
                });
            }
        }

        let models = self
            .models
            .into_iter()
            .map(|model| model.build(&ids))
            .collect::<Result<Vec<_>, _>>()?;

        let dm = Arc::new(Datamodel { models });

        for model in dm.models() {
            validate_model(&model)?;
        }

        Ok(dm)
    }
}

#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    primary_key: String,
    fields: Vec<FieldBuilder>,
}

#[derive(Debug)]
enum FieldBuilder {
    Scalar(String),
    ForeignKey(String, String),
    OneToOne(String, String),
    ReverseOneToOne(String, String, String),
    ReverseForeignKey(String, String, String),
    ManyToMany(String, String),
    GenericForeignKey(String, String, String),
    GenericRelation(String, String, String),
}

impl FieldBuilder {
    fn name(&self) -> &str {
        match self {
            Self::Scalar(name)
            | Self::ForeignKey(name, _)
            | Self::OneToOne(name, _)
            | Self::ReverseOneToOne(name, _, _)
            | Self::ReverseForeignKey(name, _, _)
            | Self::ManyToMany(name, _)
            | Self::GenericForeignKey(name, _, _)
            | Self::GenericRelation(name, _, _) => name,
        }
    }
}

impl ModelBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: "id".to_owned(),
            fields: Vec::new(),
        }
    }

    /// Sets the name of the primary key field. A scalar field of that name is
    /// created if the model does not declare one.
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldBuilder::Scalar(name.into()));
        self
    }

    pub fn scalars<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |builder, name| builder.scalar(name))
    }

    pub fn foreign_key(mut self, name: impl Into<String>, related_model: impl Into<String>) -> Self {
        self.fields.push(FieldBuilder::ForeignKey(name.into(), related_model.into()));
        self
    }

    pub fn one_to_one(mut self, name: impl Into<String>, related_model: impl Into<String>) -> Self {
        self.fields.push(FieldBuilder::OneToOne(name.into(), related_model.into()));
        self
    }

    /// The reverse side of a one-to-one field `remote_field` declared on `related_model`.
    pub fn reverse_one_to_one(
        mut self,
        name: impl Into<String>,
        related_model: impl Into<String>,
        remote_field: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldBuilder::ReverseOneToOne(
            name.into(),
            related_model.into(),
            remote_field.into(),
        ));
        self
    }

    /// The reverse side of a foreign key `remote_field` declared on `related_model`.
    pub fn reverse_foreign_key(
        mut self,
        name: impl Into<String>,
        related_model: impl Into<String>,
        remote_field: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldBuilder::ReverseForeignKey(
            name.into(),
            related_model.into(),
            remote_field.into(),
        ));
        self
    }

    pub fn many_to_many(mut self, name: impl Into<String>, related_model: impl Into<String>) -> Self {
        self.fields.push(FieldBuilder::ManyToMany(name.into(), related_model.into()));
        self
    }

    /// A polymorphic to-one relation stored in `content_type_field` and `object_id_field`
    /// of this model.
    pub fn generic_foreign_key(
        mut self,
        name: impl Into<String>,
        content_type_field: impl Into<String>,
        object_id_field: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldBuilder::GenericForeignKey(
            name.into(),
            content_type_field.into(),
            object_id_field.into(),
        ));
        self
    }

    /// The reverse side of the generic foreign key `remote_field` declared on `related_model`.
    pub fn generic_relation(
        mut self,
        name: impl Into<String>,
        related_model: impl Into<String>,
        remote_field: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldBuilder::GenericRelation(
            name.into(),
            related_model.into(),
            remote_field.into(),
        ));
        self
    }

    fn build(self, ids: &IndexMap<String, ModelId>) -> Result<ModelData, DomainError> {
        let model_name = self.name;
        let lookup = |related: &str| {
            ids.get(related).copied().ok_or_else(|| DomainError::ModelNotFound {
                name: related.to_owned(),
            })
        };

        let mut fields: Vec<FieldData> = Vec::with_capacity(self.fields.len() + 1);

        if !self.fields.iter().any(|field| field.name() == self.primary_key) {
            fields.push(FieldData {
                name: self.primary_key.clone(),
                kind: FieldKind::Scalar,
            });
        }

        for field in self.fields {
            if fields.iter().any(|existing| existing.name == field.name()) {
                return Err(DomainError::DuplicateField {
                    model: model_name,
                    field: field.name().to_owned(),
                });
            }

            let (name, kind) = match field {
                FieldBuilder::Scalar(name) => (name, FieldKind::Scalar),
                FieldBuilder::ForeignKey(name, related) => (
                    name,
                    FieldKind::ForeignKey {
                        related: lookup(&related)?,
                    },
                ),
                FieldBuilder::OneToOne(name, related) => (
                    name,
                    FieldKind::OneToOne {
                        related: lookup(&related)?,
                    },
                ),
                FieldBuilder::ReverseOneToOne(name, related, remote_field) => (
                    name,
                    FieldKind::ReverseOneToOne {
                        related: lookup(&related)?,
                        remote_field,
                    },
                ),
                FieldBuilder::ReverseForeignKey(name, related, remote_field) => (
                    name,
                    FieldKind::ReverseForeignKey {
                        related: lookup(&related)?,
                        remote_field,
                    },
                ),
                FieldBuilder::ManyToMany(name, related) => (
                    name,
                    FieldKind::ManyToMany {
                        related: lookup(&related)?,
                    },
                ),
                FieldBuilder::GenericForeignKey(name, content_type_field, object_id_field) => (
                    name,
                    FieldKind::GenericForeignKey {
                        content_type_field,
                        object_id_field,
                    },
                ),
                FieldBuilder::GenericRelation(name, related, remote_field) => (
                    name,
                    FieldKind::GenericRelation {
                        related: lookup(&related)?,
                        remote_field,
                    },
                ),
            };

            fields.push(FieldData { name, kind });
        }

        Ok(ModelData {
            name: model_name,
            primary_key: self.primary_key,
            fields,
        })
    }
}

fn validate_model(model: &Model) -> Result<(), DomainError> {
    for field in model.fields() {
        match field.kind() {
            FieldKind::ReverseOneToOne { .. } | FieldKind::ReverseForeignKey { .. } => {
                let expects_one_to_one = matches!(field.kind(), FieldKind::ReverseOneToOne { .. });
                let remote = field.remote_field().ok_or_else(|| {
                    DomainError::invalid_relation(model.name(), field.name(), "remote field does not exist")
                })?;

                let points_back = match remote.kind() {
                    FieldKind::OneToOne { related } if expects_one_to_one => *related == model.id,
                    FieldKind::ForeignKey { related } if !expects_one_to_one => *related == model.id,
                    _ => false,
                };

                if !points_back {
                    return Err(DomainError::invalid_relation(
                        model.name(),
                        field.name(),
                        format!("`{}` does not point back to `{}`", remote.name(), model.name()),
                    ));
                }
            }
            FieldKind::GenericRelation { .. } => {
                let remote = field.remote_field().ok_or_else(|| {
                    DomainError::invalid_relation(model.name(), field.name(), "remote field does not exist")
                })?;

                if !remote.is_generic_foreign_key() {
                    return Err(DomainError::invalid_relation(
                        model.name(),
                        field.name(),
                        format!("`{}` is not a generic foreign key", remote.name()),
                    ));
                }
            }
            FieldKind::GenericForeignKey {
                content_type_field,
                object_id_field,
            } => {
                for local in [content_type_field, object_id_field] {
                    let stored = model.find_field(local).filter(|f| f.attname().is_some());

                    if stored.is_none() {
                        return Err(DomainError::invalid_relation(
                            model.name(),
                            field.name(),
                            format!("`{local}` is not a concrete field of `{}`", model.name()),
                        ));
                    }
                }
            }
            _ => (),
        }
    }

    Ok(())
}
