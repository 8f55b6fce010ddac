//! Value converters between domain and relational representations.
//!
//! # Responsibility
//! - Define the converter contract used by type references.
//! - Provide the process-wide standard boolean converters.
//! - Look converters up by name for snapshot restore.
//!
//! # Invariants
//! - A converter instance is shared, never copied: references derived from
//!   one another hold the same `Arc`.

pub mod converter;
pub mod registry;
pub mod standard;

pub use converter::{BasicValueConverter, ConversionError, SharedConverter};
pub use registry::{ConverterRegistry, ConverterRegistryError};
