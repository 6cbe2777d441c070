use super::ObjectTypeRef;

#[derive(Debug, Clone)]
pub enum OutputType {
    Object(ObjectTypeRef),
    Union(UnionType),
    Interface(InterfaceType),
}

impl OutputType {
    pub fn name(&self) -> &str {
        match self {
            Self::Object(object) => object.name(),
            Self::Union(union) => union.name(),
            Self::Interface(interface) => interface.name(),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectTypeRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType {
    name: String,
    members: Vec<String>,
}

impl UnionType {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.members.iter().any(|member| member == type_name)
    }
}

/// An interface. Object types declare the interfaces they implement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceType {
    name: String,
}

impl InterfaceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
