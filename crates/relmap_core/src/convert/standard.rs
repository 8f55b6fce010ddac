//! Well-known boolean converters.
//!
//! Each converter exists once per process; the accessors hand out clones
//! of the same `Arc`.

use super::converter::{BasicValueConverter, ConversionError, SharedConverter};
use once_cell::sync::Lazy;
use rusqlite::types::{Type, Value};
use std::sync::Arc;

pub const YES_NO_CONVERTER_NAME: &str = "yes_no";
pub const TRUE_FALSE_CONVERTER_NAME: &str = "true_false";
pub const NUMERIC_BOOLEAN_CONVERTER_NAME: &str = "numeric_boolean";

static YES_NO: Lazy<SharedConverter<bool>> = Lazy::new(|| {
    Arc::new(CharBooleanConverter::new(YES_NO_CONVERTER_NAME, 'Y', 'N')) as SharedConverter<bool>
});
static TRUE_FALSE: Lazy<SharedConverter<bool>> = Lazy::new(|| {
    Arc::new(CharBooleanConverter::new(TRUE_FALSE_CONVERTER_NAME, 'T', 'F'))
        as SharedConverter<bool>
});
static NUMERIC_BOOLEAN: Lazy<SharedConverter<bool>> =
    Lazy::new(|| Arc::new(NumericBooleanConverter) as SharedConverter<bool>);

/// Shared `'Y'` / `'N'` converter.
pub fn yes_no() -> SharedConverter<bool> {
    Arc::clone(&YES_NO)
}

/// Shared `'T'` / `'F'` converter.
pub fn true_false() -> SharedConverter<bool> {
    Arc::clone(&TRUE_FALSE)
}

/// Shared `1` / `0` converter.
pub fn numeric_boolean() -> SharedConverter<bool> {
    Arc::clone(&NUMERIC_BOOLEAN)
}

/// All standard converters, in registration order.
pub fn standard_converters() -> Vec<SharedConverter<bool>> {
    vec![yes_no(), true_false(), numeric_boolean()]
}

/// Stores a boolean as one of two single-character codes.
///
/// Reads are case-insensitive; writes always use the configured case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharBooleanConverter {
    name: String,
    true_char: char,
    false_char: char,
}

impl CharBooleanConverter {
    pub fn new(name: impl Into<String>, true_char: char, false_char: char) -> Self {
        Self {
            name: name.into(),
            true_char,
            false_char,
        }
    }
}

impl BasicValueConverter<bool> for CharBooleanConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn relational_storage(&self) -> Type {
        Type::Text
    }

    fn to_relational(&self, value: &bool) -> Result<Value, ConversionError> {
        let code = if *value {
            self.true_char
        } else {
            self.false_char
        };
        Ok(Value::Text(code.to_string()))
    }

    fn to_domain(&self, value: Value) -> Result<bool, ConversionError> {
        let text = match value {
            Value::Text(text) => text,
            other => return Err(ConversionError::unexpected(Type::Text, &other)),
        };
        let mut chars = text.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(code), None) => code,
            _ => {
                return Err(ConversionError::InvalidValue(format!(
                    "`{text}` is not a single-character boolean code"
                )))
            }
        };

        if code.eq_ignore_ascii_case(&self.true_char) {
            Ok(true)
        } else if code.eq_ignore_ascii_case(&self.false_char) {
            Ok(false)
        } else {
            Err(ConversionError::InvalidValue(format!(
                "`{code}` is neither `{}` nor `{}`",
                self.true_char, self.false_char
            )))
        }
    }
}

/// Stores a boolean as integer `1` / `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumericBooleanConverter;

impl BasicValueConverter<bool> for NumericBooleanConverter {
    fn name(&self) -> &str {
        NUMERIC_BOOLEAN_CONVERTER_NAME
    }

    fn relational_storage(&self) -> Type {
        Type::Integer
    }

    fn to_relational(&self, value: &bool) -> Result<Value, ConversionError> {
        Ok(Value::Integer(i64::from(*value)))
    }

    fn to_domain(&self, value: Value) -> Result<bool, ConversionError> {
        match value {
            Value::Integer(1) => Ok(true),
            Value::Integer(0) => Ok(false),
            Value::Integer(other) => Err(ConversionError::InvalidValue(format!(
                "`{other}` is neither 1 nor 0"
            ))),
            other => Err(ConversionError::unexpected(Type::Integer, &other)),
        }
    }
}
