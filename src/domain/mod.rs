//! Bundle domain: value objects, aggregates, pricing and events.
pub mod aggregates;
pub mod events;
pub mod metafields;
pub mod pricing;
pub mod value_objects;
