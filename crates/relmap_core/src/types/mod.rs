//! Type resolution machinery.
//!
//! # Responsibility
//! - Map backend type codes to storage descriptors.
//! - Resolve type references into cached, executable basic types.
//! - Expose the binding context references resolve through.
//!
//! # Invariants
//! - Resolution never mutates a reference; all caching lives in
//!   `BasicTypeRegistry`.

pub mod basic_type;
pub mod bindable;
pub mod configuration;
pub mod jdbc;
pub mod registry;
pub mod standard;
