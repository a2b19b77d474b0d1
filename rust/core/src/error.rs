// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for parameter decoding and graph resolution.

use crate::record::DeRef;
use crate::schema::EntityKind;
use thiserror::Error;

/// Result type for decoding and resolution
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding parameter data or resolving pointers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid numeric token {token:?}")]
    NumericFormat { token: String },

    #[error("invalid integer token {token:?}")]
    IntegerFormat { token: String },

    #[error("negative pointer value {value}")]
    NegativePointer { value: i64 },

    #[error("{field}: declared {declared} parameters, {available} available")]
    ParameterCount {
        field: &'static str,
        declared: usize,
        available: usize,
    },

    #[error("invalid parameter {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("unresolved reference to DE {0}")]
    UnresolvedReference(DeRef),

    #[error("DE {de} is {actual}, expected {expected}")]
    UnexpectedEntity {
        de: DeRef,
        expected: EntityKind,
        actual: EntityKind,
    },

    #[error("index {index} out of range for list DE {de} with {len} items")]
    IndexOutOfRange { de: DeRef, index: usize, len: usize },

    #[error("duplicate directory entry {0}")]
    DuplicateEntry(DeRef),

    #[error("entity DE {de} (type {type_code}): {source}")]
    Entity {
        de: DeRef,
        type_code: u16,
        #[source]
        source: Box<Error>,
    },

    #[error("parameter data parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidParameter`]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`Error::Parse`]
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Attach the offending record's DE position and type code
    pub fn in_entity(self, de: DeRef, type_code: u16) -> Self {
        match self {
            already @ Error::Entity { .. } => already,
            other => Error::Entity {
                de,
                type_code,
                source: Box::new(other),
            },
        }
    }

    /// Innermost error, skipping [`Error::Entity`] context wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Entity { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
