//! Type configuration and the binding context it is reached through.
//!
//! # Responsibility
//! - Own the backend descriptor table, the converter catalog and the basic
//!   type registry for one persistence setup.
//! - Hand the active configuration to resolving references.
//!
//! # Invariants
//! - Descriptor and converter tables are fixed once the configuration is
//!   shared; only the basic type cache grows afterwards.

use crate::config::{JdbcTypeSetting, TypeSettings};
use crate::convert::ConverterRegistry;
use crate::types::jdbc::{JdbcType, JdbcTypeError, JdbcTypeRegistry};
use crate::types::registry::{BasicTypeRegistry, TypeResolutionError};
use crate::types::standard::StandardBasicTypes;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Ambient environment a type reference resolves against.
pub trait BindingContext {
    fn type_configuration(&self) -> &TypeConfiguration;
}

/// Configuration build errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    JdbcType(JdbcTypeError),
    StandardTypes(TypeResolutionError),
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JdbcType(err) => write!(f, "{err}"),
            Self::StandardTypes(err) => write!(f, "standard type registration failed: {err}"),
        }
    }
}

impl Error for ConfigurationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::JdbcType(err) => Some(err),
            Self::StandardTypes(err) => Some(err),
        }
    }
}

impl From<JdbcTypeError> for ConfigurationError {
    fn from(value: JdbcTypeError) -> Self {
        Self::JdbcType(value)
    }
}

impl From<TypeResolutionError> for ConfigurationError {
    fn from(value: TypeResolutionError) -> Self {
        Self::StandardTypes(value)
    }
}

/// Active type configuration.
pub struct TypeConfiguration {
    jdbc_types: Arc<JdbcTypeRegistry>,
    converters: ConverterRegistry,
    basic_types: BasicTypeRegistry,
}

impl TypeConfiguration {
    /// Creates a configuration with standard codes, standard converters and
    /// the standard basic type catalog registered.
    pub fn new() -> Result<Self, ConfigurationError> {
        Self::from_settings(&TypeSettings::default())
    }

    /// Creates a configuration from settings.
    pub fn from_settings(settings: &TypeSettings) -> Result<Self, ConfigurationError> {
        let mut jdbc_types = JdbcTypeRegistry::with_standard();
        for extra in &settings.extra_jdbc_types {
            jdbc_types.register(jdbc_type_from_setting(extra))?;
        }

        let configuration = Self::with_registries(jdbc_types, ConverterRegistry::with_standard());
        if settings.register_standard_types {
            StandardBasicTypes::register_all(configuration.basic_type_registry())?;
        }

        info!(
            "event=type_config_init module=types status=ok jdbc_types={} converters={} basic_types={}",
            configuration.jdbc_types.len(),
            configuration.converters.len(),
            configuration.basic_types.len()
        );
        Ok(configuration)
    }

    /// Assembles a configuration from explicit registries. Nothing is
    /// pre-registered in the basic type cache.
    pub fn with_registries(jdbc_types: JdbcTypeRegistry, converters: ConverterRegistry) -> Self {
        let jdbc_types = Arc::new(jdbc_types);
        Self {
            basic_types: BasicTypeRegistry::new(Arc::clone(&jdbc_types)),
            jdbc_types,
            converters,
        }
    }

    pub fn basic_type_registry(&self) -> &BasicTypeRegistry {
        &self.basic_types
    }

    pub fn jdbc_type_registry(&self) -> &JdbcTypeRegistry {
        &self.jdbc_types
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Converter catalog, for registration during setup.
    pub fn converters_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.converters
    }
}

impl BindingContext for TypeConfiguration {
    fn type_configuration(&self) -> &TypeConfiguration {
        self
    }
}

impl<C: BindingContext + ?Sized> BindingContext for Arc<C> {
    fn type_configuration(&self) -> &TypeConfiguration {
        (**self).type_configuration()
    }
}

fn jdbc_type_from_setting(setting: &JdbcTypeSetting) -> JdbcType {
    JdbcType::named(setting.code, setting.name.clone(), setting.storage.into())
}
