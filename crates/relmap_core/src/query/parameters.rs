//! Positional query parameter bindings.
//!
//! # Responsibility
//! - Collect parameter values together with the bindable type they are
//!   encoded with.
//! - Resolve those types at execution time and run statements on SQLite.
//!
//! # Invariants
//! - A value is checked against its bindable's representation type when it
//!   is bound; resolution waits until execution.
//! - Positions are 1-based and must be contiguous at execution.

use crate::model::representation::{DomainValue, RepresentationType};
use crate::types::basic_type::TypeValueError;
use crate::types::bindable::BindableType;
use crate::types::configuration::BindingContext;
use crate::types::registry::TypeResolutionError;
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::any::Any;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type QueryResult<T> = Result<T, QueryError>;

/// Parameter binding and execution errors.
#[derive(Debug)]
pub enum QueryError {
    InvalidPosition(usize),
    ParameterTypeMismatch { position: usize, expected: String },
    MissingParameter(usize),
    Resolution(TypeResolutionError),
    Value(TypeValueError),
    Sqlite(rusqlite::Error),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPosition(position) => {
                write!(f, "parameter positions start at 1, got {position}")
            }
            Self::ParameterTypeMismatch { position, expected } => {
                write!(f, "parameter {position} expects a value of type {expected}")
            }
            Self::MissingParameter(position) => write!(f, "parameter {position} is not bound"),
            Self::Resolution(err) => write!(f, "{err}"),
            Self::Value(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Resolution(err) => Some(err),
            Self::Value(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::InvalidPosition(_)
            | Self::ParameterTypeMismatch { .. }
            | Self::MissingParameter(_) => None,
        }
    }
}

impl From<TypeResolutionError> for QueryError {
    fn from(value: TypeResolutionError) -> Self {
        Self::Resolution(value)
    }
}

impl From<TypeValueError> for QueryError {
    fn from(value: TypeValueError) -> Self {
        Self::Value(value)
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

trait ParameterBinding {
    fn representation(&self) -> RepresentationType;
    fn to_sql_value(&self, ctx: &dyn BindingContext) -> QueryResult<Value>;
}

struct TypedBinding<T, B> {
    bindable: B,
    value: Option<T>,
}

impl<T: DomainValue, B: BindableType<T>> ParameterBinding for TypedBinding<T, B> {
    fn representation(&self) -> RepresentationType {
        self.bindable.bindable_representation_type()
    }

    fn to_sql_value(&self, ctx: &dyn BindingContext) -> QueryResult<Value> {
        let basic = self.bindable.resolve_expressible(ctx)?;
        Ok(basic.bind_value(self.value.as_ref())?)
    }
}

/// Positional parameters for one statement.
#[derive(Default)]
pub struct QueryParameterBindings {
    bindings: BTreeMap<usize, Box<dyn ParameterBinding>>,
}

impl QueryParameterBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` at `position` (1-based), replacing any earlier binding.
    pub fn bind<T, B>(&mut self, position: usize, bindable: &B, value: Option<T>) -> QueryResult<()>
    where
        T: DomainValue,
        B: BindableType<T> + Clone + 'static,
    {
        if position == 0 {
            return Err(QueryError::InvalidPosition(position));
        }
        self.bindings.insert(
            position,
            Box::new(TypedBinding {
                bindable: bindable.clone(),
                value,
            }),
        );
        Ok(())
    }

    /// Binds a dynamically typed value, checking it against the bindable's
    /// representation type first.
    pub fn bind_dynamic<T, B>(
        &mut self,
        position: usize,
        bindable: &B,
        value: &dyn Any,
    ) -> QueryResult<()>
    where
        T: DomainValue,
        B: BindableType<T> + Clone + 'static,
    {
        let Some(typed) = value.downcast_ref::<T>() else {
            return Err(QueryError::ParameterTypeMismatch {
                position,
                expected: bindable.bindable_representation_type().name().to_string(),
            });
        };
        self.bind(position, bindable, Some(typed.clone()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn is_bound(&self, position: usize) -> bool {
        self.bindings.contains_key(&position)
    }

    /// Representation type expected at `position`, if bound.
    pub fn representation_at(&self, position: usize) -> Option<RepresentationType> {
        self.bindings
            .get(&position)
            .map(|binding| binding.representation())
    }

    /// Resolves every binding and returns the values in position order.
    pub fn to_sql_values(&self, ctx: &dyn BindingContext) -> QueryResult<Vec<Value>> {
        let mut values = Vec::with_capacity(self.bindings.len());
        for (expected, (position, binding)) in (1..).zip(self.bindings.iter()) {
            if *position != expected {
                return Err(QueryError::MissingParameter(expected));
            }
            values.push(binding.to_sql_value(ctx)?);
        }
        Ok(values)
    }

    /// Executes a statement and returns the number of changed rows.
    pub fn execute(
        &self,
        conn: &Connection,
        sql: &str,
        ctx: &dyn BindingContext,
    ) -> QueryResult<usize> {
        let started_at = Instant::now();
        let values = self.to_sql_values(ctx)?;
        match conn.execute(sql, params_from_iter(values)) {
            Ok(changed) => {
                debug!(
                    "event=query_execute module=query status=ok params={} changed={} duration_ms={}",
                    self.bindings.len(),
                    changed,
                    started_at.elapsed().as_millis()
                );
                Ok(changed)
            }
            Err(err) => {
                error!(
                    "event=query_execute module=query status=error params={} error={}",
                    self.bindings.len(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Runs a query and reads its first column with `result_type`.
    pub fn query_column<T, B>(
        &self,
        conn: &Connection,
        sql: &str,
        ctx: &dyn BindingContext,
        result_type: &B,
    ) -> QueryResult<Vec<Option<T>>>
    where
        T: DomainValue,
        B: BindableType<T>,
    {
        let basic = result_type.resolve_expressible(ctx)?;
        let values = self.to_sql_values(ctx)?;

        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut column = Vec::new();
        while let Some(row) = rows.next()? {
            column.push(basic.extract(row, 0)?);
        }
        debug!(
            "event=query_column module=query status=ok params={} rows={} result_type={}",
            self.bindings.len(),
            column.len(),
            basic.name()
        );
        Ok(column)
    }
}
