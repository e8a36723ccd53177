//! `stockcast-core`: shared restocking building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no storage, no math engine).

pub mod error;
pub mod id;
pub mod profile;
pub mod sales;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use profile::ProductProfile;
pub use sales::SalesEvent;
pub use value_object::ValueObject;
