//! Converter contract between domain and relational forms.

use rusqlite::types::{Type, Value};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Bidirectional transform between a domain value `D` and its stored form.
///
/// Converters are shared by `Arc`: a mutable reference and its immutable
/// variant point at the same instance.
pub trait BasicValueConverter<D>: Debug + Send + Sync {
    /// Stable converter name, used to look the converter up again when a
    /// reference is restored from a snapshot.
    fn name(&self) -> &str;

    /// Storage class every relational value produced by this converter uses.
    fn relational_storage(&self) -> Type;

    fn to_relational(&self, value: &D) -> Result<Value, ConversionError>;

    fn to_domain(&self, value: Value) -> Result<D, ConversionError>;
}

/// Shared converter handle.
pub type SharedConverter<D> = Arc<dyn BasicValueConverter<D>>;

/// Value conversion errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    UnexpectedStorage { expected: Type, actual: Type },
    OutOfRange { value: String, target: &'static str },
    InvalidValue(String),
}

impl ConversionError {
    /// Builds the error for a value read with the wrong storage class.
    pub fn unexpected(expected: Type, actual: &Value) -> Self {
        Self::UnexpectedStorage {
            expected,
            actual: actual.data_type(),
        }
    }
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedStorage { expected, actual } => {
                write!(f, "expected {expected} storage, found {actual}")
            }
            Self::OutOfRange { value, target } => {
                write!(f, "value {value} is out of range for {target}")
            }
            Self::InvalidValue(message) => write!(f, "invalid value: {message}"),
        }
    }
}

impl Error for ConversionError {}
