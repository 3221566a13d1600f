//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are compared by their attributes only.
/// A normalized flavor name is one: two `"vanilla"` names are the same value,
/// whichever request produced them.
///
/// Implementors should be immutable once constructed; "changing" a value object
/// means building a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
