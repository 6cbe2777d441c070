use crate::{Model, ModelId, Zipper};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId {
    pub(crate) model: ModelId,
    pub(crate) index: usize,
}

pub type ModelField = Zipper<FieldId>;

/// The closed set of model field kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    /// Many-to-one, stored on this model.
    ForeignKey { related: ModelId },
    /// One-to-one, stored on this model.
    OneToOne { related: ModelId },
    /// One-to-one, stored on the related model in `remote_field`.
    ReverseOneToOne { related: ModelId, remote_field: String },
    /// One-to-many, stored on the related model in `remote_field`.
    ReverseForeignKey { related: ModelId, remote_field: String },
    ManyToMany { related: ModelId },
    /// Polymorphic to-one. The target model is only known per record.
    GenericForeignKey {
        content_type_field: String,
        object_id_field: String,
    },
    /// Reverse side of the generic foreign key `remote_field` on the related model.
    GenericRelation { related: ModelId, remote_field: String },
}

impl ModelField {
    pub fn name(&self) -> &str {
        &self.dm.field_data(self.id).name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.dm.field_data(self.id).kind
    }

    pub fn model(&self) -> Model {
        self.dm.clone().zip(self.id.model)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind(), FieldKind::Scalar)
    }

    pub fn is_relation(&self) -> bool {
        !self.is_scalar()
    }

    pub fn is_generic_foreign_key(&self) -> bool {
        matches!(self.kind(), FieldKind::GenericForeignKey { .. })
    }

    /// Forward relations stored in a column of this model.
    pub fn is_forward_to_one(&self) -> bool {
        matches!(self.kind(), FieldKind::ForeignKey { .. } | FieldKind::OneToOne { .. })
    }

    pub fn is_to_one(&self) -> bool {
        matches!(
            self.kind(),
            FieldKind::ForeignKey { .. }
                | FieldKind::OneToOne { .. }
                | FieldKind::ReverseOneToOne { .. }
                | FieldKind::GenericForeignKey { .. }
        )
    }

    pub fn is_to_many(&self) -> bool {
        matches!(
            self.kind(),
            FieldKind::ReverseForeignKey { .. } | FieldKind::ManyToMany { .. } | FieldKind::GenericRelation { .. }
        )
    }

    /// The statically known target model. `None` for scalars and generic foreign keys.
    pub fn related_model(&self) -> Option<Model> {
        let related = match self.kind() {
            FieldKind::Scalar | FieldKind::GenericForeignKey { .. } => return None,
            FieldKind::ForeignKey { related }
            | FieldKind::OneToOne { related }
            | FieldKind::ReverseOneToOne { related, .. }
            | FieldKind::ReverseForeignKey { related, .. }
            | FieldKind::ManyToMany { related }
            | FieldKind::GenericRelation { related, .. } => *related,
        };

        Some(self.dm.clone().zip(related))
    }

    /// The field on the related model this field is the reverse side of.
    pub fn remote_field(&self) -> Option<ModelField> {
        match self.kind() {
            FieldKind::ReverseOneToOne { remote_field, .. }
            | FieldKind::ReverseForeignKey { remote_field, .. }
            | FieldKind::GenericRelation { remote_field, .. } => {
                self.related_model().and_then(|model| model.find_field(remote_field))
            }
            _ => None,
        }
    }

    /// The attribute name the field is stored under on its own model, if it is stored there at all.
    pub fn attname(&self) -> Option<String> {
        match self.kind() {
            FieldKind::Scalar => Some(self.name().to_owned()),
            FieldKind::ForeignKey { .. } | FieldKind::OneToOne { .. } => Some(format!("{}_id", self.name())),
            _ => None,
        }
    }

    /// Attributes the owning model must load to be able to follow this relation.
    /// The primary key is always loaded and therefore never listed.
    pub fn local_attnames(&self) -> Vec<String> {
        match self.kind() {
            FieldKind::ForeignKey { .. } | FieldKind::OneToOne { .. } => self.attname().into_iter().collect(),
            FieldKind::GenericForeignKey {
                content_type_field,
                object_id_field,
            } => {
                let model = self.model();

                [content_type_field, object_id_field]
                    .into_iter()
                    .filter_map(|name| model.find_field(name).and_then(|field| field.attname()))
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Attributes the related model must load so its records can be linked back to the
    /// records of the owning model.
    pub fn remote_attnames(&self) -> Vec<String> {
        match self.kind() {
            FieldKind::ReverseOneToOne { .. } | FieldKind::ReverseForeignKey { .. } => self
                .remote_field()
                .and_then(|remote| remote.attname())
                .into_iter()
                .collect(),
            FieldKind::ManyToMany { .. } => self
                .related_model()
                .map(|model| vec![model.primary_key().to_owned()])
                .unwrap_or_default(),
            FieldKind::GenericRelation { .. } => self
                .remote_field()
                .map(|remote| remote.local_attnames())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Debug for ModelField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelField")
            .field("model", &self.model().name())
            .field("name", &self.name())
            .field("kind", self.kind())
            .finish()
    }
}
