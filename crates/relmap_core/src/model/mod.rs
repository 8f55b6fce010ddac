//! Basic type model.
//!
//! # Responsibility
//! - Define type references and the in-memory types they describe.
//! - Provide backend type code constants.

pub mod representation;
pub mod sql_types;
pub mod type_reference;
