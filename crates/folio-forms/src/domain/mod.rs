//! Form domain: the per-form aggregate, its events and value objects.

pub mod aggregates;
pub mod events;
pub mod value_objects;

pub use aggregates::*;
pub use events::*;
pub use value_objects::*;
