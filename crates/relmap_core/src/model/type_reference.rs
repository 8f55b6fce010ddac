//! Basic type references.
//!
//! # Responsibility
//! - Name a basic value type: in-memory representation, backend type code,
//!   optional converter and immutability flag.
//! - Resolve into an executable `BasicType` through a binding context.
//!
//! # Invariants
//! - A reference never changes after construction; clones share one
//!   allocation and compare equal under `TypeReference::ptr_eq`.
//! - Immutable references are only produced by `as_immutable()` (or by
//!   restoring a snapshot of one), so their names always carry the
//!   `imm_` prefix.
//! - `as_immutable()` on an immutable reference returns the same
//!   allocation.
//! - Names are not validated here; uniqueness is enforced by the registry.
//!   A user name that already starts with `imm_` can collide with a derived
//!   immutable name; nothing here detects it.

use crate::convert::SharedConverter;
use crate::model::representation::{DomainValue, RepresentationType};
use crate::types::basic_type::{same_converter, BasicType};
use crate::types::bindable::{Bindable, BindableType};
use crate::types::configuration::BindingContext;
use crate::types::registry::{TypeResolutionError, TypeResult};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Name prefix of references derived through `as_immutable()`.
pub const IMMUTABLE_PREFIX: &str = "imm_";

/// Immutable, named descriptor of a basic value type.
pub struct TypeReference<T> {
    inner: Arc<ReferenceInner<T>>,
}

struct ReferenceInner<T> {
    name: String,
    representation: RepresentationType,
    type_code: i32,
    converter: Option<SharedConverter<T>>,
    force_immutable: bool,
}

impl<T: DomainValue> TypeReference<T> {
    /// Creates a mutable reference without converter.
    pub fn new(name: impl Into<String>, type_code: i32) -> Self {
        Self::with_mutability(name.into(), type_code, None, false)
    }

    /// Creates a mutable reference whose values pass through `converter`.
    pub fn with_converter(
        name: impl Into<String>,
        type_code: i32,
        converter: SharedConverter<T>,
    ) -> Self {
        Self::with_mutability(name.into(), type_code, Some(converter), false)
    }

    fn with_mutability(
        name: String,
        type_code: i32,
        converter: Option<SharedConverter<T>>,
        force_immutable: bool,
    ) -> Self {
        Self {
            inner: Arc::new(ReferenceInner {
                name,
                representation: RepresentationType::of::<T>(),
                type_code,
                converter,
                force_immutable,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn type_code(&self) -> i32 {
        self.inner.type_code
    }

    pub fn converter(&self) -> Option<&SharedConverter<T>> {
        self.inner.converter.as_ref()
    }

    pub fn is_force_immutable(&self) -> bool {
        self.inner.force_immutable
    }

    /// Returns the immutable variant of this reference.
    ///
    /// An already immutable reference comes back as itself (same
    /// allocation). Otherwise the result is a new reference named
    /// `imm_<name>` sharing representation, type code and converter
    /// instance.
    pub fn as_immutable(&self) -> Self {
        if self.inner.force_immutable {
            return self.clone();
        }
        Self::with_mutability(
            format!("{IMMUTABLE_PREFIX}{}", self.inner.name),
            self.inner.type_code,
            self.inner.converter.clone(),
            true,
        )
    }

    /// Resolves this reference against the registry of `ctx`.
    ///
    /// Registry errors are returned unchanged.
    pub fn resolve(&self, ctx: &dyn BindingContext) -> TypeResult<Arc<BasicType<T>>> {
        ctx.type_configuration()
            .basic_type_registry()
            .resolve(self)
    }

    /// Captures this reference by value.
    pub fn to_snapshot(&self) -> TypeReferenceSnapshot {
        TypeReferenceSnapshot {
            name: self.inner.name.clone(),
            representation: self.inner.representation.name().to_string(),
            type_code: self.inner.type_code,
            converter: self
                .inner
                .converter
                .as_ref()
                .map(|converter| converter.name().to_string()),
            force_immutable: self.inner.force_immutable,
        }
    }

    /// Rebuilds a reference from a snapshot.
    ///
    /// The converter is looked up by name in the converter catalog of `ctx`,
    /// so the restored reference shares the registered instance.
    ///
    /// # Errors
    /// - `RepresentationMismatch` when the snapshot was taken for another `T`.
    /// - `ConverterMismatch` when the converter is unknown or converts
    ///   another type.
    /// - `InvalidSnapshot` when an immutable snapshot lacks the `imm_` prefix.
    pub fn restore(snapshot: &TypeReferenceSnapshot, ctx: &dyn BindingContext) -> TypeResult<Self> {
        let representation = RepresentationType::of::<T>();
        if snapshot.representation != representation.name() {
            return Err(TypeResolutionError::RepresentationMismatch {
                name: snapshot.name.clone(),
                expected: representation.name().to_string(),
                actual: snapshot.representation.clone(),
            });
        }

        if snapshot.force_immutable && !snapshot.name.starts_with(IMMUTABLE_PREFIX) {
            return Err(TypeResolutionError::InvalidSnapshot(format!(
                "immutable reference `{}` must carry the `{IMMUTABLE_PREFIX}` prefix",
                snapshot.name
            )));
        }

        let converter = match &snapshot.converter {
            Some(converter_name) => Some(
                ctx.type_configuration()
                    .converters()
                    .get::<T>(converter_name)
                    .map_err(|err| TypeResolutionError::ConverterMismatch {
                        name: snapshot.name.clone(),
                        reason: err.to_string(),
                    })?,
            ),
            None => None,
        };

        Ok(Self::with_mutability(
            snapshot.name.clone(),
            snapshot.type_code,
            converter,
            snapshot.force_immutable,
        ))
    }
}

impl<T> TypeReference<T> {
    /// Whether both handles share one allocation.
    pub fn ptr_eq(left: &Self, right: &Self) -> bool {
        Arc::ptr_eq(&left.inner, &right.inner)
    }
}

impl<T> Clone for TypeReference<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Value equality; converters compare by identity.
impl<T> PartialEq for TypeReference<T> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
            || (self.inner.name == other.inner.name
                && self.inner.type_code == other.inner.type_code
                && self.inner.force_immutable == other.inner.force_immutable
                && same_converter(self.inner.converter.as_ref(), other.inner.converter.as_ref()))
    }
}

impl<T> Debug for TypeReference<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeReference")
            .field("name", &self.inner.name)
            .field("representation", &self.inner.representation.name())
            .field("type_code", &self.inner.type_code)
            .field(
                "converter",
                &self.inner.converter.as_ref().map(|converter| converter.name()),
            )
            .field("force_immutable", &self.inner.force_immutable)
            .finish()
    }
}

impl<T: DomainValue> Bindable<T> for TypeReference<T> {
    fn bindable_representation_type(&self) -> RepresentationType {
        self.inner.representation
    }
}

impl<T: DomainValue> BindableType<T> for TypeReference<T> {
    fn resolve_expressible(&self, ctx: &dyn BindingContext) -> TypeResult<Arc<BasicType<T>>> {
        self.resolve(ctx)
    }
}

impl<T: DomainValue> Serialize for TypeReference<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_snapshot().serialize(serializer)
    }
}

/// By-value form of a type reference.
///
/// The converter is recorded by name and reattached on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeReferenceSnapshot {
    pub name: String,
    pub representation: String,
    pub type_code: i32,
    pub converter: Option<String>,
    pub force_immutable: bool,
}
