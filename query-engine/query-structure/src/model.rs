use crate::{FieldId, ModelField, Zipper};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) usize);

pub type Model = Zipper<ModelId>;

impl Model {
    pub fn name(&self) -> &str {
        &self.dm.model_data(self.id).name
    }

    /// Name of the field used as the primary identifier of a record of that model.
    pub fn primary_key(&self) -> &str {
        &self.dm.model_data(self.id).primary_key
    }

    pub fn fields(&self) -> impl Iterator<Item = ModelField> + '_ {
        let count = self.dm.model_data(self.id).fields.len();

        (0..count).map(|index| {
            self.dm.clone().zip(FieldId {
                model: self.id,
                index,
            })
        })
    }

    pub fn find_field(&self, name: &str) -> Option<ModelField> {
        self.fields().find(|field| field.name() == name)
    }

    /// Finds a concrete field by the attribute name it is stored under, e.g. `project_id`
    /// for the foreign key `project`.
    pub fn find_field_by_attname(&self, attname: &str) -> Option<ModelField> {
        self.fields()
            .find(|field| field.attname().is_some_and(|name| name == attname))
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Model").field(&self.name()).finish()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}
