//! Backend type descriptors keyed by type code.

use crate::model::sql_types;
use rusqlite::types::Type;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Resolved backend type: a type code plus the storage class it is written
/// with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdbcType {
    pub code: i32,
    pub name: Cow<'static, str>,
    pub storage: Type,
}

impl JdbcType {
    pub const fn new(code: i32, name: &'static str, storage: Type) -> Self {
        Self {
            code,
            name: Cow::Borrowed(name),
            storage,
        }
    }

    /// Builds a descriptor with a name known only at runtime.
    pub fn named(code: i32, name: impl Into<String>, storage: Type) -> Self {
        Self {
            code,
            name: Cow::Owned(name.into()),
            storage,
        }
    }

    /// Whether a value of `storage` can be written to this column type.
    ///
    /// `NULL` is always accepted; an integer is accepted where a real is
    /// expected.
    pub fn accepts(&self, storage: Type) -> bool {
        storage == Type::Null
            || storage == self.storage
            || (self.storage == Type::Real && storage == Type::Integer)
    }
}

const STANDARD_JDBC_TYPES: &[JdbcType] = &[
    JdbcType::new(sql_types::BIT, "BIT", Type::Integer),
    JdbcType::new(sql_types::TINYINT, "TINYINT", Type::Integer),
    JdbcType::new(sql_types::SMALLINT, "SMALLINT", Type::Integer),
    JdbcType::new(sql_types::INTEGER, "INTEGER", Type::Integer),
    JdbcType::new(sql_types::BIGINT, "BIGINT", Type::Integer),
    JdbcType::new(sql_types::BOOLEAN, "BOOLEAN", Type::Integer),
    JdbcType::new(sql_types::FLOAT, "FLOAT", Type::Real),
    JdbcType::new(sql_types::REAL, "REAL", Type::Real),
    JdbcType::new(sql_types::DOUBLE, "DOUBLE", Type::Real),
    JdbcType::new(sql_types::NUMERIC, "NUMERIC", Type::Real),
    JdbcType::new(sql_types::DECIMAL, "DECIMAL", Type::Real),
    JdbcType::new(sql_types::CHAR, "CHAR", Type::Text),
    JdbcType::new(sql_types::VARCHAR, "VARCHAR", Type::Text),
    JdbcType::new(sql_types::LONGVARCHAR, "LONGVARCHAR", Type::Text),
    JdbcType::new(sql_types::NCHAR, "NCHAR", Type::Text),
    JdbcType::new(sql_types::NVARCHAR, "NVARCHAR", Type::Text),
    JdbcType::new(sql_types::CLOB, "CLOB", Type::Text),
    JdbcType::new(sql_types::DATE, "DATE", Type::Text),
    JdbcType::new(sql_types::TIME, "TIME", Type::Text),
    JdbcType::new(sql_types::TIMESTAMP, "TIMESTAMP", Type::Text),
    JdbcType::new(sql_types::UUID, "UUID", Type::Text),
    JdbcType::new(sql_types::BINARY, "BINARY", Type::Blob),
    JdbcType::new(sql_types::VARBINARY, "VARBINARY", Type::Blob),
    JdbcType::new(sql_types::LONGVARBINARY, "LONGVARBINARY", Type::Blob),
    JdbcType::new(sql_types::BLOB, "BLOB", Type::Blob),
];

/// Registration errors for backend type codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JdbcTypeError {
    DuplicateTypeCode(i32),
}

impl Display for JdbcTypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTypeCode(code) => {
                write!(f, "type code already registered: {code}")
            }
        }
    }
}

impl Error for JdbcTypeError {}

/// Type code to descriptor table.
///
/// Populated during configuration and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct JdbcTypeRegistry {
    descriptors: BTreeMap<i32, JdbcType>,
}

impl JdbcTypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every standard code.
    pub fn with_standard() -> Self {
        Self {
            descriptors: STANDARD_JDBC_TYPES
                .iter()
                .map(|descriptor| (descriptor.code, descriptor.clone()))
                .collect(),
        }
    }

    pub fn register(&mut self, descriptor: JdbcType) -> Result<(), JdbcTypeError> {
        if self.descriptors.contains_key(&descriptor.code) {
            return Err(JdbcTypeError::DuplicateTypeCode(descriptor.code));
        }
        self.descriptors.insert(descriptor.code, descriptor);
        Ok(())
    }

    pub fn descriptor(&self, code: i32) -> Option<&JdbcType> {
        self.descriptors.get(&code)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Returns registered codes in ascending order.
    pub fn codes(&self) -> Vec<i32> {
        self.descriptors.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{JdbcType, JdbcTypeError, JdbcTypeRegistry};
    use crate::model::sql_types;
    use rusqlite::types::Type;

    #[test]
    fn standard_registry_maps_codes_to_storage() {
        let registry = JdbcTypeRegistry::with_standard();
        let varchar = registry
            .descriptor(sql_types::VARCHAR)
            .expect("varchar registered");
        assert_eq!(varchar.storage, Type::Text);
        assert_eq!(
            registry
                .descriptor(sql_types::BIGINT)
                .expect("bigint registered")
                .storage,
            Type::Integer
        );
        assert!(registry.descriptor(4242).is_none());
    }

    #[test]
    fn rejects_duplicate_code() {
        let mut registry = JdbcTypeRegistry::with_standard();
        let err = registry
            .register(JdbcType::new(sql_types::CHAR, "CHARACTER", Type::Text))
            .expect_err("duplicate code must fail");
        assert_eq!(err, JdbcTypeError::DuplicateTypeCode(sql_types::CHAR));

        registry
            .register(JdbcType::named(4242, "JSON".to_string(), Type::Text))
            .expect("new code registers");
        assert!(registry.codes().contains(&4242));
    }

    #[test]
    fn real_columns_accept_integers_but_not_text() {
        let double = JdbcType::new(sql_types::DOUBLE, "DOUBLE", Type::Real);
        assert!(double.accepts(Type::Integer));
        assert!(double.accepts(Type::Null));
        assert!(!double.accepts(Type::Text));
    }
}
