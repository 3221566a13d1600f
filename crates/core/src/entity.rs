//! Entity trait: identity that survives state changes.

/// Something with a stable identifier (a coffee keeps its id across updates,
/// a flavor keeps its id across every coffee that links it).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Two entities are the same thing when their identifiers match,
    /// regardless of any other attribute.
    fn same_identity_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
