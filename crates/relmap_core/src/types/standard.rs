//! Process-wide catalog of well-known basic type references.

use crate::convert::standard::{numeric_boolean, true_false, yes_no};
use crate::model::sql_types;
use crate::model::type_reference::TypeReference;
use crate::types::registry::{BasicTypeRegistry, TypeResult};
use once_cell::sync::Lazy;
use uuid::Uuid;

pub static BOOLEAN: Lazy<TypeReference<bool>> =
    Lazy::new(|| TypeReference::new("boolean", sql_types::BOOLEAN));
pub static NUMERIC_BOOLEAN: Lazy<TypeReference<bool>> = Lazy::new(|| {
    TypeReference::with_converter("numeric_boolean", sql_types::INTEGER, numeric_boolean())
});
pub static TRUE_FALSE: Lazy<TypeReference<bool>> =
    Lazy::new(|| TypeReference::with_converter("true_false", sql_types::CHAR, true_false()));
pub static YES_NO: Lazy<TypeReference<bool>> =
    Lazy::new(|| TypeReference::with_converter("yes_no", sql_types::CHAR, yes_no()));
pub static SHORT: Lazy<TypeReference<i16>> =
    Lazy::new(|| TypeReference::new("short", sql_types::SMALLINT));
pub static INTEGER: Lazy<TypeReference<i32>> =
    Lazy::new(|| TypeReference::new("integer", sql_types::INTEGER));
pub static LONG: Lazy<TypeReference<i64>> =
    Lazy::new(|| TypeReference::new("long", sql_types::BIGINT));
pub static FLOAT: Lazy<TypeReference<f32>> =
    Lazy::new(|| TypeReference::new("float", sql_types::FLOAT));
pub static DOUBLE: Lazy<TypeReference<f64>> =
    Lazy::new(|| TypeReference::new("double", sql_types::DOUBLE));
pub static STRING: Lazy<TypeReference<String>> =
    Lazy::new(|| TypeReference::new("string", sql_types::VARCHAR));
pub static TEXT: Lazy<TypeReference<String>> =
    Lazy::new(|| TypeReference::new("text", sql_types::LONGVARCHAR));
pub static CHARACTER: Lazy<TypeReference<char>> =
    Lazy::new(|| TypeReference::new("character", sql_types::CHAR));
pub static BINARY: Lazy<TypeReference<Vec<u8>>> =
    Lazy::new(|| TypeReference::new("binary", sql_types::VARBINARY));
/// Byte arrays treated as immutable: no snapshot copies for dirty checks.
pub static IMM_BINARY: Lazy<TypeReference<Vec<u8>>> = Lazy::new(|| BINARY.as_immutable());
pub static UUID: Lazy<TypeReference<Uuid>> =
    Lazy::new(|| TypeReference::new("uuid", sql_types::UUID));

/// Registration entry point for the standard catalog.
pub struct StandardBasicTypes;

impl StandardBasicTypes {
    /// Resolves every standard reference into `registry`.
    pub fn register_all(registry: &BasicTypeRegistry) -> TypeResult<()> {
        registry.resolve(&BOOLEAN)?;
        registry.resolve(&NUMERIC_BOOLEAN)?;
        registry.resolve(&TRUE_FALSE)?;
        registry.resolve(&YES_NO)?;
        registry.resolve(&SHORT)?;
        registry.resolve(&INTEGER)?;
        registry.resolve(&LONG)?;
        registry.resolve(&FLOAT)?;
        registry.resolve(&DOUBLE)?;
        registry.resolve(&STRING)?;
        registry.resolve(&TEXT)?;
        registry.resolve(&CHARACTER)?;
        registry.resolve(&BINARY)?;
        registry.resolve(&IMM_BINARY)?;
        registry.resolve(&UUID)?;
        Ok(())
    }

    /// Names registered by `register_all`, sorted.
    pub fn names() -> Vec<&'static str> {
        let mut names = vec![
            "binary",
            "boolean",
            "character",
            "double",
            "float",
            "imm_binary",
            "integer",
            "long",
            "numeric_boolean",
            "short",
            "string",
            "text",
            "true_false",
            "uuid",
            "yes_no",
        ];
        names.sort_unstable();
        names
    }
}
