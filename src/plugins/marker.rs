use std::any::TypeId;
use std::fmt::Debug;
use std::hash::Hash;
use std::hash::Hasher;

/// A tag that asks for one specific override.
///
/// Implement it on an uninhabited enum so it can never be constructed:
///
/// ```ignore
/// pub enum MockTransportMarker {}
/// impl Marker for MockTransportMarker {
///     const NAME: &'static str = "mock-transport";
/// }
/// ```
pub trait Marker: 'static {
    const NAME: &'static str;
}

/// Runtime identity of a [`Marker`] type.
#[derive(Clone, Copy)]
pub struct MarkerId {
    type_id: TypeId,
    name: &'static str,
}

impl MarkerId {
    pub fn of<M: Marker>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            name: M::NAME,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MarkerId {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.type_id == other.type_id
    }
}
impl Eq for MarkerId {}

impl Hash for MarkerId {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.type_id.hash(state);
    }
}

impl Debug for MarkerId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "Marker({})", self.name)
    }
}
