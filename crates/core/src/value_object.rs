//! Value object trait: equality by value, not identity.
//!
//! Every input the restocking core receives (a sales event, a product profile, a
//! model order) is a value object: immutable, compared by its attributes, and
//! owned by the caller that supplied it.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. The core never
/// mutates one; to "change" a profile, build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct LeadTime { days: u32 }
///
/// impl ValueObject for LeadTime {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
