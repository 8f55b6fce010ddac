//! Basic type registry.
//!
//! # Responsibility
//! - Resolve type references into executable basic types, keyed by name.
//! - Cache every resolution so repeated use is a map lookup.
//!
//! # Invariants
//! - One name maps to at most one resolved type for the registry lifetime.
//! - Concurrent first resolutions of a name converge on the first inserted
//!   value; losers discard their own construction.
//! - A reference that disagrees with the cached type under its name
//!   (type code, converter identity, force-immutable flag, representation)
//!   is an error, never a silent overwrite.

use crate::model::representation::{DomainValue, RepresentationType};
use crate::model::type_reference::TypeReference;
use crate::types::basic_type::{same_converter, BasicType};
use crate::types::bindable::Bindable;
use crate::types::jdbc::{JdbcType, JdbcTypeRegistry};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type TypeResult<T> = Result<T, TypeResolutionError>;

/// Resolution and registration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolutionError {
    UnknownName(String),
    UnknownTypeCode {
        name: String,
        code: i32,
    },
    IncompatibleTypeCode {
        name: String,
        code: i32,
        representation: &'static str,
    },
    ConflictingRegistration {
        name: String,
        reason: String,
    },
    ConverterMismatch {
        name: String,
        reason: String,
    },
    RepresentationMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    InvalidSnapshot(String),
}

impl Display for TypeResolutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownName(name) => write!(f, "no basic type registered under `{name}`"),
            Self::UnknownTypeCode { name, code } => {
                write!(f, "basic type `{name}` uses unknown type code {code}")
            }
            Self::IncompatibleTypeCode {
                name,
                code,
                representation,
            } => write!(
                f,
                "basic type `{name}` cannot store {representation} in type code {code}"
            ),
            Self::ConflictingRegistration { name, reason } => {
                write!(f, "conflicting registration for `{name}`: {reason}")
            }
            Self::ConverterMismatch { name, reason } => {
                write!(f, "converter mismatch for `{name}`: {reason}")
            }
            Self::RepresentationMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "basic type `{name}` represents {actual}, but {expected} was requested"
            ),
            Self::InvalidSnapshot(message) => write!(f, "invalid type snapshot: {message}"),
        }
    }
}

impl Error for TypeResolutionError {}

struct RegisteredType {
    representation: RepresentationType,
    // Holds a `BasicType<T>` for `representation`.
    resolved: Arc<dyn Any + Send + Sync>,
}

impl RegisteredType {
    fn new<T: DomainValue>(resolved: Arc<BasicType<T>>) -> Self {
        Self {
            representation: RepresentationType::of::<T>(),
            resolved,
        }
    }

    fn downcast<T: DomainValue>(&self, name: &str) -> TypeResult<Arc<BasicType<T>>> {
        Arc::clone(&self.resolved)
            .downcast::<BasicType<T>>()
            .map_err(|_| TypeResolutionError::RepresentationMismatch {
                name: name.to_string(),
                expected: RepresentationType::of::<T>().name().to_string(),
                actual: self.representation.name().to_string(),
            })
    }
}

/// Name-keyed cache of resolved basic types.
pub struct BasicTypeRegistry {
    jdbc_types: Arc<JdbcTypeRegistry>,
    types: RwLock<HashMap<String, RegisteredType>>,
}

impl BasicTypeRegistry {
    pub fn new(jdbc_types: Arc<JdbcTypeRegistry>) -> Self {
        Self {
            jdbc_types,
            types: RwLock::new(HashMap::new()),
        }
    }

    pub fn jdbc_types(&self) -> &JdbcTypeRegistry {
        &self.jdbc_types
    }

    /// Resolves `reference`, building and caching its basic type on first
    /// use.
    ///
    /// # Errors
    /// - `UnknownTypeCode` when the reference's type code is not registered.
    /// - `ConverterMismatch` when the converter's storage class does not fit
    ///   the type code.
    /// - `ConflictingRegistration` / `RepresentationMismatch` when the name is
    ///   already cached with different attributes.
    pub fn resolve<T: DomainValue>(
        &self,
        reference: &TypeReference<T>,
    ) -> TypeResult<Arc<BasicType<T>>> {
        if let Some(existing) = self.lookup::<T>(reference.name())? {
            check_reference(&existing, reference)?;
            return Ok(existing);
        }

        let created = Arc::new(self.create_basic_type(reference)?);
        let resolved = {
            let mut types = self.types.write();
            match types.get(reference.name()) {
                Some(entry) => entry.downcast::<T>(reference.name())?,
                None => {
                    types.insert(
                        reference.name().to_string(),
                        RegisteredType::new(Arc::clone(&created)),
                    );
                    debug!(
                        "event=type_resolve module=registry status=ok name={} type_code={} immutable={}",
                        reference.name(),
                        reference.type_code(),
                        reference.is_force_immutable()
                    );
                    return Ok(created);
                }
            }
        };

        // Another resolver inserted first; its value is canonical.
        check_reference(&resolved, reference)?;
        Ok(resolved)
    }

    /// Registers a pre-built basic type.
    ///
    /// Returns the cached instance when an identical definition is already
    /// present under the same name.
    pub fn register<T: DomainValue>(&self, basic: BasicType<T>) -> TypeResult<Arc<BasicType<T>>> {
        let name = basic.name().to_string();
        let mut types = self.types.write();
        if let Some(entry) = types.get(name.as_str()) {
            let existing = entry.downcast::<T>(&name)?;
            if existing.same_definition(&basic) {
                return Ok(existing);
            }
            warn!(
                "event=type_register module=registry status=error name={} error_code=conflicting_registration",
                name
            );
            return Err(TypeResolutionError::ConflictingRegistration {
                name,
                reason: "a different definition is already registered".to_string(),
            });
        }

        let registered = Arc::new(basic);
        types.insert(name.clone(), RegisteredType::new(Arc::clone(&registered)));
        info!(
            "event=type_register module=registry status=ok name={} type_code={}",
            name,
            registered.type_code()
        );
        Ok(registered)
    }

    /// Returns the type registered under `name`.
    pub fn get_registered<T: DomainValue>(&self, name: &str) -> TypeResult<Arc<BasicType<T>>> {
        self.lookup::<T>(name)?
            .ok_or_else(|| TypeResolutionError::UnknownName(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Representation type cached under `name`, without naming it.
    pub fn representation_of(&self, name: &str) -> Option<RepresentationType> {
        self.types
            .read()
            .get(name)
            .map(|entry| entry.representation)
    }

    /// Returns registered names in ascending order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn lookup<T: DomainValue>(&self, name: &str) -> TypeResult<Option<Arc<BasicType<T>>>> {
        let types = self.types.read();
        match types.get(name) {
            Some(entry) => entry.downcast::<T>(name).map(Some),
            None => Ok(None),
        }
    }

    fn create_basic_type<T: DomainValue>(
        &self,
        reference: &TypeReference<T>,
    ) -> TypeResult<BasicType<T>> {
        let jdbc_type = self
            .jdbc_types
            .descriptor(reference.type_code())
            .cloned()
            .ok_or_else(|| TypeResolutionError::UnknownTypeCode {
                name: reference.name().to_string(),
                code: reference.type_code(),
            })?;

        match reference.converter() {
            Some(converter) => {
                let storage = converter.relational_storage();
                if !jdbc_type.accepts(storage) {
                    return Err(TypeResolutionError::ConverterMismatch {
                        name: reference.name().to_string(),
                        reason: converter_storage_reason(converter.name(), storage, &jdbc_type),
                    });
                }
            }
            None => {
                if !jdbc_type.accepts(T::natural_storage()) {
                    return Err(TypeResolutionError::IncompatibleTypeCode {
                        name: reference.name().to_string(),
                        code: reference.type_code(),
                        representation: reference.bindable_representation_type().name(),
                    });
                }
            }
        }

        Ok(BasicType::new(
            reference.name(),
            jdbc_type,
            reference.converter().cloned(),
            reference.is_force_immutable(),
        ))
    }
}

fn converter_storage_reason(
    converter: &str,
    storage: rusqlite::types::Type,
    jdbc_type: &JdbcType,
) -> String {
    format!(
        "converter `{converter}` produces {storage} values, but {} ({}) stores {}",
        jdbc_type.name, jdbc_type.code, jdbc_type.storage
    )
}

fn check_reference<T: DomainValue>(
    existing: &BasicType<T>,
    reference: &TypeReference<T>,
) -> TypeResult<()> {
    let conflict = |reason: String| -> TypeResult<()> {
        warn!(
            "event=type_resolve module=registry status=error name={} error_code=conflicting_registration",
            reference.name()
        );
        Err(TypeResolutionError::ConflictingRegistration {
            name: reference.name().to_string(),
            reason,
        })
    };

    if existing.type_code() != reference.type_code() {
        return conflict(format!(
            "registered with type code {}, requested with {}",
            existing.type_code(),
            reference.type_code()
        ));
    }
    if !same_converter(existing.converter(), reference.converter()) {
        return conflict("registered with a different converter".to_string());
    }
    if existing.is_force_immutable() != reference.is_force_immutable() {
        return conflict(format!(
            "registered with force_immutable={}, requested with {}",
            existing.is_force_immutable(),
            reference.is_force_immutable()
        ));
    }
    Ok(())
}
