use std::fmt::Debug;

use serde::Serialize;
pub use serde_with;
use utility::id::{HasId, Id};

pub mod location;
pub mod tree;

pub trait ExampleData {
    fn example_data() -> Self;
}

/// A partial update, which can be applied on top of a complete value.
pub trait Patch<T> {
    /// Overwrites every field of `target` which is present in this patch.
    /// Fields absent from the patch keep their current value.
    fn apply(self, target: T) -> T;

    /// True, if applying this patch would not change anything.
    fn is_empty(&self) -> bool;
}

#[derive(Debug, Clone, Serialize)]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }

    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(V) -> V,
    {
        Self::new(self.id, f(self.content))
    }
}

impl<V> PartialEq for WithId<V>
where
    V: HasId + PartialEq,
    V::IdType: Serialize + Debug + Clone + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.content == other.content
    }
}
