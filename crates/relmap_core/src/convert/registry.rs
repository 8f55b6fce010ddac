//! Converter lookup by name.
//!
//! Used to reattach the original converter instance when a type reference
//! is restored from a snapshot.

use super::converter::SharedConverter;
use super::standard::standard_converters;
use crate::model::representation::{DomainValue, RepresentationType};
use log::warn;
use std::any::Any;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Converter registration/lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterRegistryError {
    InvalidName(String),
    DuplicateName(String),
    NotFound(String),
    DomainMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl Display for ConverterRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "converter name is invalid: `{value}`"),
            Self::DuplicateName(value) => write!(f, "converter already registered: {value}"),
            Self::NotFound(value) => write!(f, "converter not found: {value}"),
            Self::DomainMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "converter {name} converts {actual}, but {expected} was requested"
            ),
        }
    }
}

impl Error for ConverterRegistryError {}

struct ConverterEntry {
    domain: RepresentationType,
    // Holds a `SharedConverter<D>` for `domain`.
    handle: Box<dyn Any + Send + Sync>,
}

/// Named converter catalog.
#[derive(Default)]
pub struct ConverterRegistry {
    entries: BTreeMap<String, ConverterEntry>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the standard boolean converters.
    pub fn with_standard() -> Self {
        let mut registry = Self::new();
        for converter in standard_converters() {
            let name = converter.name().to_string();
            if let Err(err) = registry.register(converter) {
                warn!(
                    "event=converter_register module=convert status=error name={} error={}",
                    name, err
                );
            }
        }
        registry
    }

    /// Registers one converter under its own name.
    ///
    /// Registering the same instance twice is a no-op; a different instance
    /// under a taken name is rejected.
    pub fn register<D: DomainValue>(
        &mut self,
        converter: SharedConverter<D>,
    ) -> Result<(), ConverterRegistryError> {
        let name = converter.name().trim().to_string();
        if name.is_empty() {
            return Err(ConverterRegistryError::InvalidName(name));
        }

        if let Some(existing) = self.entries.get(name.as_str()) {
            let same_instance = existing
                .handle
                .downcast_ref::<SharedConverter<D>>()
                .is_some_and(|current| Arc::ptr_eq(current, &converter));
            if same_instance {
                return Ok(());
            }
            return Err(ConverterRegistryError::DuplicateName(name));
        }

        self.entries.insert(
            name,
            ConverterEntry {
                domain: RepresentationType::of::<D>(),
                handle: Box::new(converter),
            },
        );
        Ok(())
    }

    /// Returns the registered converter instance for `name`.
    pub fn get<D: DomainValue>(&self, name: &str) -> Result<SharedConverter<D>, ConverterRegistryError> {
        let entry = self
            .entries
            .get(name.trim())
            .ok_or_else(|| ConverterRegistryError::NotFound(name.trim().to_string()))?;

        entry
            .handle
            .downcast_ref::<SharedConverter<D>>()
            .map(Arc::clone)
            .ok_or_else(|| ConverterRegistryError::DomainMismatch {
                name: name.trim().to_string(),
                expected: RepresentationType::of::<D>().name(),
                actual: entry.domain.name(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns sorted converter names.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConverterRegistry, ConverterRegistryError};
    use crate::convert::standard::{standard_converters, yes_no, CharBooleanConverter};
    use crate::convert::SharedConverter;
    use std::sync::Arc;

    #[test]
    fn standard_registry_returns_shared_instances() {
        let registry = ConverterRegistry::with_standard();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.names(),
            vec!["numeric_boolean", "true_false", "yes_no"]
        );

        let found = registry.get::<bool>("yes_no").expect("yes_no registered");
        assert!(Arc::ptr_eq(&found, &yes_no()));
    }

    #[test]
    fn standard_registry_holds_every_standard_converter() {
        let registry = ConverterRegistry::with_standard();
        for converter in standard_converters() {
            let found = registry
                .get::<bool>(converter.name())
                .expect("standard converter registered");
            assert!(Arc::ptr_eq(&found, &converter));
        }
    }

    #[test]
    fn re_registering_same_instance_is_idempotent() {
        let mut registry = ConverterRegistry::with_standard();
        registry
            .register(yes_no())
            .expect("same instance should be accepted");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn rejects_other_instance_under_taken_name() {
        let mut registry = ConverterRegistry::with_standard();
        let impostor: SharedConverter<bool> =
            Arc::new(CharBooleanConverter::new("yes_no", 'J', 'N'));
        let err = registry
            .register(impostor)
            .expect_err("duplicate name must fail");
        assert_eq!(err, ConverterRegistryError::DuplicateName("yes_no".to_string()));
    }

    #[test]
    fn rejects_blank_name() {
        let mut registry = ConverterRegistry::new();
        let blank: SharedConverter<bool> = Arc::new(CharBooleanConverter::new("  ", 'Y', 'N'));
        assert!(matches!(
            registry.register(blank),
            Err(ConverterRegistryError::InvalidName(_))
        ));
    }

    #[test]
    fn lookup_with_wrong_domain_type_fails() {
        let registry = ConverterRegistry::with_standard();
        let err = registry
            .get::<String>("yes_no")
            .expect_err("yes_no converts bool, not String");
        assert!(matches!(err, ConverterRegistryError::DomainMismatch { .. }));
        assert!(matches!(
            registry.get::<bool>("missing"),
            Err(ConverterRegistryError::NotFound(_))
        ));
    }
}
