use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Model `{}` is defined more than once.", name)]
    DuplicateModel { name: String },

    #[error("Field `{}` is defined more than once on model `{}`.", field, model)]
    DuplicateField { model: String, field: String },

    #[error("Model `{}` not found.", name)]
    ModelNotFound { name: String },

    #[error("Field `{}` on model `{}` not found.", field, model)]
    FieldNotFound { model: String, field: String },

    #[error("Relation field `{}` on model `{}` is invalid: {}", field, model, reason)]
    InvalidRelation {
        model: String,
        field: String,
        reason: String,
    },
}

impl DomainError {
    pub fn invalid_relation(model: impl Into<String>, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRelation {
            model: model.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}
