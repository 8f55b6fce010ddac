//! In-memory representation types.
//!
//! # Responsibility
//! - Describe the Rust type a basic value takes in memory.
//! - Define the natural relational form of every supported domain type.
//!
//! # Invariants
//! - `RepresentationType` equality is `TypeId` equality.
//! - Representation names are fixed labels chosen per domain type, never
//!   compiler-generated paths, so persisted snapshots survive toolchain
//!   upgrades. Labels must be unique across domain types.
//! - `from_sql_value` rejects values stored with an unexpected storage class
//!   instead of coercing them.

use crate::convert::ConversionError;
use rusqlite::types::{Type, Value};
use std::any::TypeId;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Identity of the in-memory type `T` a basic type binds to.
#[derive(Debug, Clone, Copy)]
pub struct RepresentationType {
    id: TypeId,
    name: &'static str,
}

impl RepresentationType {
    pub fn of<T: DomainValue>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::REPRESENTATION_NAME,
        }
    }

    /// Stable label of the domain type, as persisted in snapshots.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for RepresentationType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RepresentationType {}

impl Hash for RepresentationType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for RepresentationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// A Rust type usable as the in-memory side of a basic type.
///
/// Implementors describe their natural relational form, used whenever a
/// basic type has no converter.
pub trait DomainValue: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Persisted label of this type. Changing it orphans stored snapshots.
    const REPRESENTATION_NAME: &'static str;

    /// Storage class the natural relational form is written with.
    fn natural_storage() -> Type;

    fn to_sql_value(&self) -> Value;

    fn from_sql_value(value: Value) -> Result<Self, ConversionError>;

    /// Whether values can change in place and so need snapshot copies for
    /// dirty checking.
    fn is_naturally_mutable() -> bool {
        false
    }
}

impl DomainValue for bool {
    const REPRESENTATION_NAME: &'static str = "boolean";

    fn natural_storage() -> Type {
        Type::Integer
    }

    fn to_sql_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_sql_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            Value::Integer(other) => Err(ConversionError::InvalidValue(format!(
                "integer `{other}` is not a boolean"
            ))),
            other => Err(ConversionError::unexpected(Type::Integer, &other)),
        }
    }
}

macro_rules! integer_domain_value {
    ($ty:ty, $label:literal) => {
        impl DomainValue for $ty {
            const REPRESENTATION_NAME: &'static str = $label;

            fn natural_storage() -> Type {
                Type::Integer
            }

            fn to_sql_value(&self) -> Value {
                Value::Integer(i64::from(*self))
            }

            fn from_sql_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Integer(raw) => {
                        <$ty>::try_from(raw).map_err(|_| ConversionError::OutOfRange {
                            value: raw.to_string(),
                            target: stringify!($ty),
                        })
                    }
                    other => Err(ConversionError::unexpected(Type::Integer, &other)),
                }
            }
        }
    };
}

integer_domain_value!(i16, "short");
integer_domain_value!(i32, "integer");
integer_domain_value!(i64, "long");

impl DomainValue for f32 {
    const REPRESENTATION_NAME: &'static str = "float";

    fn natural_storage() -> Type {
        Type::Real
    }

    fn to_sql_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }

    fn from_sql_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Real(raw) => Ok(raw as f32),
            // SQLite stores integral REAL values as INTEGER.
            Value::Integer(raw) => Ok(raw as f32),
            other => Err(ConversionError::unexpected(Type::Real, &other)),
        }
    }
}

impl DomainValue for f64 {
    const REPRESENTATION_NAME: &'static str = "double";

    fn natural_storage() -> Type {
        Type::Real
    }

    fn to_sql_value(&self) -> Value {
        Value::Real(*self)
    }

    fn from_sql_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Real(raw) => Ok(raw),
            Value::Integer(raw) => Ok(raw as f64),
            other => Err(ConversionError::unexpected(Type::Real, &other)),
        }
    }
}

impl DomainValue for String {
    const REPRESENTATION_NAME: &'static str = "string";

    fn natural_storage() -> Type {
        Type::Text
    }

    fn to_sql_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_sql_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(text) => Ok(text),
            other => Err(ConversionError::unexpected(Type::Text, &other)),
        }
    }
}

impl DomainValue for char {
    const REPRESENTATION_NAME: &'static str = "character";

    fn natural_storage() -> Type {
        Type::Text
    }

    fn to_sql_value(&self) -> Value {
        Value::Text(self.to_string())
    }

    fn from_sql_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ConversionError::InvalidValue(format!(
                        "text `{text}` is not a single character"
                    ))),
                }
            }
            other => Err(ConversionError::unexpected(Type::Text, &other)),
        }
    }
}

impl DomainValue for Vec<u8> {
    const REPRESENTATION_NAME: &'static str = "bytes";

    fn natural_storage() -> Type {
        Type::Blob
    }

    fn to_sql_value(&self) -> Value {
        Value::Blob(self.clone())
    }

    fn from_sql_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Blob(bytes) => Ok(bytes),
            other => Err(ConversionError::unexpected(Type::Blob, &other)),
        }
    }

    fn is_naturally_mutable() -> bool {
        true
    }
}

impl DomainValue for Uuid {
    const REPRESENTATION_NAME: &'static str = "uuid";

    fn natural_storage() -> Type {
        Type::Text
    }

    fn to_sql_value(&self) -> Value {
        Value::Text(self.to_string())
    }

    fn from_sql_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(text) => Uuid::parse_str(&text).map_err(|_| {
                ConversionError::InvalidValue(format!("text `{text}` is not a uuid"))
            }),
            Value::Blob(bytes) => Uuid::from_slice(&bytes).map_err(|_| {
                ConversionError::InvalidValue(format!("blob of {} bytes is not a uuid", bytes.len()))
            }),
            other => Err(ConversionError::unexpected(Type::Text, &other)),
        }
    }
}
