//! Resolved basic types.
//!
//! # Responsibility
//! - Hold the executable form of a type reference: backend descriptor,
//!   converter and mutability plan.
//! - Bind domain values to SQLite values and extract them from rows.
//!
//! # Invariants
//! - Every bound value passes through the converter when one is present.
//! - A bound value whose storage class the backend type does not accept is
//!   rejected instead of written.

use crate::convert::{ConversionError, SharedConverter};
use crate::model::representation::{DomainValue, RepresentationType};
use crate::types::bindable::Bindable;
use crate::types::jdbc::JdbcType;
use rusqlite::types::{Type, Value};
use rusqlite::Row;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// How values of a basic type are tracked for in-place changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutabilityPlan {
    /// Values never change in place; no snapshot copies are taken.
    Immutable,
    /// Values may change in place and are copied for dirty checking.
    Mutable,
}

impl MutabilityPlan {
    pub fn for_type<T: DomainValue>(force_immutable: bool) -> Self {
        if force_immutable || !T::is_naturally_mutable() {
            Self::Immutable
        } else {
            Self::Mutable
        }
    }

    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Mutable)
    }
}

/// Errors raised while binding or reading values.
#[derive(Debug)]
pub enum TypeValueError {
    Conversion {
        type_name: String,
        source: ConversionError,
    },
    StorageMismatch {
        type_name: String,
        expected: Type,
        actual: Type,
    },
    Sqlite(rusqlite::Error),
}

impl Display for TypeValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conversion { type_name, source } => {
                write!(f, "value conversion failed for {type_name}: {source}")
            }
            Self::StorageMismatch {
                type_name,
                expected,
                actual,
            } => write!(
                f,
                "{type_name} expects {expected} storage, value has {actual}"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TypeValueError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Conversion { source, .. } => Some(source),
            Self::StorageMismatch { .. } => None,
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for TypeValueError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Fully resolved, executable basic type.
pub struct BasicType<T> {
    name: String,
    representation: RepresentationType,
    jdbc_type: JdbcType,
    converter: Option<SharedConverter<T>>,
    force_immutable: bool,
    mutability: MutabilityPlan,
}

impl<T: DomainValue> BasicType<T> {
    /// Assembles a resolved type.
    ///
    /// Callers are expected to have checked that `jdbc_type` accepts the
    /// converter's (or `T`'s natural) storage class.
    pub fn new(
        name: impl Into<String>,
        jdbc_type: JdbcType,
        converter: Option<SharedConverter<T>>,
        force_immutable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            representation: RepresentationType::of::<T>(),
            jdbc_type,
            converter,
            force_immutable,
            mutability: MutabilityPlan::for_type::<T>(force_immutable),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn jdbc_type(&self) -> &JdbcType {
        &self.jdbc_type
    }

    pub fn type_code(&self) -> i32 {
        self.jdbc_type.code
    }

    pub fn converter(&self) -> Option<&SharedConverter<T>> {
        self.converter.as_ref()
    }

    /// Whether the source reference was an `as_immutable()` variant.
    pub fn is_force_immutable(&self) -> bool {
        self.force_immutable
    }

    pub fn mutability(&self) -> MutabilityPlan {
        self.mutability
    }

    pub fn is_mutable(&self) -> bool {
        self.mutability.is_mutable()
    }

    /// Storage class bound values are written with.
    pub fn relational_storage(&self) -> Type {
        match &self.converter {
            Some(converter) => converter.relational_storage(),
            None => T::natural_storage(),
        }
    }

    /// Converts a domain value into the value written to SQLite.
    pub fn bind_value(&self, value: Option<&T>) -> Result<Value, TypeValueError> {
        let Some(value) = value else {
            return Ok(Value::Null);
        };

        let relational = match &self.converter {
            Some(converter) => converter
                .to_relational(value)
                .map_err(|source| self.conversion_error(source))?,
            None => value.to_sql_value(),
        };

        let storage = relational.data_type();
        if !self.jdbc_type.accepts(storage) {
            return Err(TypeValueError::StorageMismatch {
                type_name: self.name.clone(),
                expected: self.jdbc_type.storage,
                actual: storage,
            });
        }
        Ok(relational)
    }

    /// Converts a stored value back into its domain form.
    pub fn from_relational(&self, value: Value) -> Result<Option<T>, TypeValueError> {
        if value == Value::Null {
            return Ok(None);
        }

        let domain = match &self.converter {
            Some(converter) => converter.to_domain(value),
            None => T::from_sql_value(value),
        };
        domain
            .map(Some)
            .map_err(|source| self.conversion_error(source))
    }

    /// Reads column `index` of `row`.
    pub fn extract(&self, row: &Row<'_>, index: usize) -> Result<Option<T>, TypeValueError> {
        let value: Value = row.get(index)?;
        self.from_relational(value)
    }

    /// Copy kept for dirty checking; immutable types need none.
    pub fn snapshot(&self, value: &T) -> Option<T> {
        if self.is_mutable() {
            Some(value.clone())
        } else {
            None
        }
    }

    /// Whether `self` and `other` describe the same type.
    ///
    /// Converters compare by identity.
    pub fn same_definition(&self, other: &Self) -> bool {
        self.name == other.name
            && self.jdbc_type.code == other.jdbc_type.code
            && self.force_immutable == other.force_immutable
            && same_converter(self.converter.as_ref(), other.converter.as_ref())
    }

    fn conversion_error(&self, source: ConversionError) -> TypeValueError {
        TypeValueError::Conversion {
            type_name: self.name.clone(),
            source,
        }
    }
}

impl<T: DomainValue> Bindable<T> for BasicType<T> {
    fn bindable_representation_type(&self) -> RepresentationType {
        self.representation
    }
}

impl<T> Debug for BasicType<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicType")
            .field("name", &self.name)
            .field("representation", &self.representation.name())
            .field("jdbc_type", &self.jdbc_type)
            .field(
                "converter",
                &self.converter.as_ref().map(|converter| converter.name()),
            )
            .field("force_immutable", &self.force_immutable)
            .field("mutability", &self.mutability)
            .finish()
    }
}

pub(crate) fn same_converter<T>(
    left: Option<&SharedConverter<T>>,
    right: Option<&SharedConverter<T>>,
) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => Arc::ptr_eq(left, right),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{BasicType, MutabilityPlan, TypeValueError};
    use crate::convert::standard::{numeric_boolean, yes_no};
    use crate::model::sql_types;
    use crate::types::jdbc::JdbcType;
    use rusqlite::types::{Type, Value};

    fn char_type() -> JdbcType {
        JdbcType::new(sql_types::CHAR, "CHAR", Type::Text)
    }

    #[test]
    fn binds_through_converter() {
        let basic = BasicType::new("yes_no", char_type(), Some(yes_no()), false);
        assert_eq!(
            basic.bind_value(Some(&true)).expect("true binds"),
            Value::Text("Y".to_string())
        );
        assert_eq!(basic.bind_value(None).expect("null binds"), Value::Null);
        assert_eq!(
            basic
                .from_relational(Value::Text("N".to_string()))
                .expect("N reads"),
            Some(false)
        );
        assert_eq!(basic.from_relational(Value::Null).expect("null reads"), None);
    }

    #[test]
    fn rejects_converter_output_the_column_cannot_store() {
        let basic = BasicType::new("bad", char_type(), Some(numeric_boolean()), false);
        let err = basic
            .bind_value(Some(&true))
            .expect_err("integer output into CHAR must fail");
        assert!(matches!(
            err,
            TypeValueError::StorageMismatch {
                expected: Type::Text,
                actual: Type::Integer,
                ..
            }
        ));
    }

    #[test]
    fn mutability_follows_type_unless_forced() {
        let varbinary = JdbcType::new(sql_types::VARBINARY, "VARBINARY", Type::Blob);
        let mutable = BasicType::<Vec<u8>>::new("binary", varbinary.clone(), None, false);
        assert_eq!(mutable.mutability(), MutabilityPlan::Mutable);
        assert_eq!(mutable.snapshot(&vec![1, 2]), Some(vec![1, 2]));

        let forced = BasicType::<Vec<u8>>::new("imm_binary", varbinary, None, true);
        assert!(!forced.is_mutable());
        assert!(forced.is_force_immutable());
        assert!(!mutable.is_force_immutable());
        assert_eq!(forced.snapshot(&vec![1, 2]), None);

        let text = BasicType::<String>::new("string", char_type(), None, false);
        assert!(!text.is_mutable());
        let forced_text = BasicType::<String>::new("string", char_type(), None, true);
        assert_eq!(text.mutability(), forced_text.mutability());
        assert!(!text.same_definition(&forced_text));
    }

    #[test]
    fn same_definition_compares_converter_identity() {
        let a = BasicType::new("yes_no", char_type(), Some(yes_no()), false);
        let b = BasicType::new("yes_no", char_type(), Some(yes_no()), false);
        let c = BasicType::<bool>::new("yes_no", char_type(), None, false);
        assert!(a.same_definition(&b));
        assert!(!a.same_definition(&c));
    }
}
