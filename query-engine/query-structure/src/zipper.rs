use crate::{Datamodel, DatamodelRef};
use std::sync::Arc;

// Invariant: Datamodel must not contain any Zipper, this would be a reference counting
// cycle (memory leak).
#[derive(Clone)]
pub struct Zipper<I> {
    pub id: I,
    pub dm: DatamodelRef,
}

impl<I: PartialEq> PartialEq for Zipper<I> {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq(&other.id)
    }
}

impl<I: Eq> Eq for Zipper<I> {}

impl<I: std::hash::Hash> std::hash::Hash for Zipper<I> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl Datamodel {
    pub fn zip<I>(self: Arc<Self>, id: I) -> Zipper<I> {
        Zipper { id, dm: self }
    }
}
