//! Basic type resolution for relational mapping.
//!
//! Type references name a mapping between an in-memory value type and a
//! relational type code. A `TypeConfiguration` resolves them into shared
//! `BasicType` instances that bind and extract values on SQLite.

pub mod config;
pub mod convert;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod types;

pub use config::{ConfigError, JdbcTypeSetting, LogSettings, StorageSetting, TypeSettings};
pub use convert::converter::{BasicValueConverter, ConversionError, SharedConverter};
pub use convert::registry::{ConverterRegistry, ConverterRegistryError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::representation::{DomainValue, RepresentationType};
pub use model::type_reference::{TypeReference, TypeReferenceSnapshot, IMMUTABLE_PREFIX};
pub use query::parameters::{QueryError, QueryParameterBindings, QueryResult};
pub use repo::snapshot_repo::{
    RepoError, RepoResult, SqliteTypeSnapshotRepository, TypeSnapshotRepository,
};
pub use types::basic_type::{BasicType, MutabilityPlan, TypeValueError};
pub use types::bindable::{Bindable, BindableType};
pub use types::configuration::{BindingContext, ConfigurationError, TypeConfiguration};
pub use types::jdbc::{JdbcType, JdbcTypeError, JdbcTypeRegistry};
pub use types::registry::{BasicTypeRegistry, TypeResolutionError, TypeResult};
pub use types::standard::StandardBasicTypes;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
