//! Capabilities shared by anything a query parameter can be bound against.

use crate::model::representation::RepresentationType;
use crate::types::basic_type::BasicType;
use crate::types::configuration::BindingContext;
use crate::types::registry::TypeResult;
use std::sync::Arc;

/// Exposes the in-memory type a bound value must have.
///
/// Parameter binding checks values against this before any resolution.
pub trait Bindable<T> {
    fn bindable_representation_type(&self) -> RepresentationType;
}

/// A bindable that can resolve itself into an executable basic type.
pub trait BindableType<T>: Bindable<T> {
    fn resolve_expressible(&self, ctx: &dyn BindingContext) -> TypeResult<Arc<BasicType<T>>>;
}
