use super::ArgumentValue;
use indexmap::IndexMap;

pub type SelectionArguments = IndexMap<String, ArgumentValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(FieldNode),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

impl Selection {
    pub fn spread(name: impl Into<String>) -> Self {
        Self::FragmentSpread(FragmentSpread {
            name: name.into(),
            directives: Vec::new(),
        })
    }

    pub fn inline<I>(type_condition: Option<&str>, selection_set: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Selection>,
    {
        Self::InlineFragment(InlineFragment {
            type_condition: type_condition.map(ToOwned::to_owned),
            directives: Vec::new(),
            selection_set: selection_set.into_iter().map(Into::into).collect(),
        })
    }
}

impl From<FieldNode> for Selection {
    fn from(field: FieldNode) -> Self {
        Self::Field(field)
    }
}

/// A field as selected in the document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldNode {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: SelectionArguments,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
}

impl FieldNode {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn argument(mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn select(mut self, selection: impl Into<Selection>) -> Self {
        self.selection_set.push(selection.into());
        self
    }

    /// Selects scalar fields by name.
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection_set
            .extend(names.into_iter().map(|name| Selection::Field(FieldNode::with_name(name))));
        self
    }

    /// The key the field's value is returned under: the alias if present, the name otherwise.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpread {
    pub name: String,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<String>,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub arguments: SelectionArguments,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: IndexMap::new(),
        }
    }

    pub fn argument(mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }
}
