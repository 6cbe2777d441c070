use super::OptimizerHook;
use crate::{CoreResult, FieldNode, QueryOptimizer, ResolveInfo};
use query_structure::{Expression, QueryValue};
use std::{fmt, sync::Arc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFieldKind {
    /// Backed by a field of the type's model, addressed by name or attribute name.
    Model { field: String },
    /// Resolved by custom code the optimizer knows nothing about.
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputArgument {
    pub name: String,
    pub default: Option<QueryValue>,
}

#[derive(Clone)]
pub struct OutputField {
    name: String,
    kind: OutputFieldKind,
    type_name: Option<String>,
    arguments: Vec<InputArgument>,
    optimizer_hook: Option<OptimizerHook>,
}

impl OutputField {
    fn new(name: String, kind: OutputFieldKind) -> Self {
        Self {
            name,
            kind,
            type_name: None,
            arguments: Vec::new(),
            optimizer_hook: None,
        }
    }

    /// A leaf field backed by the model field of the same name.
    pub fn scalar(name: impl Into<String>) -> Self {
        let name = name.into();
        let field = name.clone();

        Self::new(name, OutputFieldKind::Model { field })
    }

    /// A relation backed by the model field of the same name, returning `type_name`.
    pub fn relation(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::scalar(name).of_type(type_name)
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(name.into(), OutputFieldKind::Custom)
    }

    /// A custom field computed by `expression`. Selecting it annotates the query set of the
    /// enclosing type with the expression under the field name.
    pub fn expression(name: impl Into<String>, expression: Expression) -> Self {
        let name = name.into();
        let annotation = name.clone();

        Self::custom(name).optimizer_hook(move |optimizer, _, _| {
            optimizer.annotate(annotation.clone(), expression.clone());
            Ok(())
        })
    }

    /// Backs the field by a model field with a different name.
    pub fn source(mut self, model_field: impl Into<String>) -> Self {
        self.kind = OutputFieldKind::Model {
            field: model_field.into(),
        };
        self
    }

    pub fn of_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn argument(mut self, name: impl Into<String>, default: Option<QueryValue>) -> Self {
        self.push_argument(name.into(), default);
        self
    }

    pub fn optimizer_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut QueryOptimizer, &FieldNode, &ResolveInfo) -> CoreResult<()> + Send + Sync + 'static,
    {
        self.optimizer_hook = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &OutputFieldKind {
        &self.kind
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, OutputFieldKind::Custom)
    }

    /// Name of the model field backing this field, if any.
    pub fn model_field_name(&self) -> Option<&str> {
        match &self.kind {
            OutputFieldKind::Model { field } => Some(field),
            OutputFieldKind::Custom => None,
        }
    }

    /// Name of the output type. `None` for leaf fields.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn arguments(&self) -> &[InputArgument] {
        &self.arguments
    }

    pub fn find_argument(&self, name: &str) -> Option<&InputArgument> {
        self.arguments.iter().find(|argument| argument.name == name)
    }

    pub fn hook(&self) -> Option<&OptimizerHook> {
        self.optimizer_hook.as_ref()
    }

    pub(crate) fn push_argument(&mut self, name: String, default: Option<QueryValue>) {
        match self.arguments.iter_mut().find(|argument| argument.name == name) {
            Some(argument) => argument.default = default,
            None => self.arguments.push(InputArgument { name, default }),
        }
    }

    pub(crate) fn ensure_argument(&mut self, name: &str) {
        if self.find_argument(name).is_none() {
            self.push_argument(name.to_owned(), None);
        }
    }
}

impl fmt::Debug for OutputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputField")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .field("arguments", &self.arguments)
            .field("optimizer_hook", &self.optimizer_hook.is_some())
            .finish()
    }
}
