// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Directory entry handles and raw parameter records
//!
//! These are the inputs handed over by the file tokenizer: one
//! [`DirectoryEntry`] plus one [`ParameterRecord`] per entity, in file order.

use std::fmt;

use crate::error::{Error, Result};
use crate::parser::{split_parameters, PARAMETER_DELIMITER, RECORD_DELIMITER};
use crate::values::parse_integer;

/// Directory entry reference: the DE sequence number pointers refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeRef(u32);

impl DeRef {
    #[inline]
    pub const fn new(sequence: u32) -> Self {
        Self(sequence)
    }

    /// Raw DE sequence number
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for DeRef {
    fn from(sequence: u32) -> Self {
        Self(sequence)
    }
}

/// Directory entry metadata consumed by the decoders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Position of this entity in the directory section
    pub de: DeRef,
    /// Entity type number
    pub type_code: u16,
    /// Form number (sub-variant of the type)
    pub form: u16,
    /// Transformation matrix pointer (DE field 7)
    pub transform: Option<DeRef>,
}

impl DirectoryEntry {
    pub fn new(de: impl Into<DeRef>, type_code: u16, form: u16) -> Self {
        Self {
            de: de.into(),
            type_code,
            form,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: impl Into<DeRef>) -> Self {
        self.transform = Some(transform.into());
        self
    }
}

/// Ordered raw tokens of one entity's parameter data
///
/// Token 0 is the entity type number; decoded fields start at index 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterRecord {
    tokens: Vec<String>,
}

impl ParameterRecord {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// Build from anything string-like
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Split free-format parameter text using the default `,` and `;` delimiters
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, PARAMETER_DELIMITER, RECORD_DELIMITER)
    }

    /// Split free-format parameter text with file-specific delimiters
    pub fn parse_with(text: &str, delimiter: char, terminator: char) -> Result<Self> {
        let fields = split_parameters(text, delimiter, terminator)?;
        Ok(Self::from_tokens(fields))
    }

    #[inline]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Entity type number stored in token 0
    pub fn type_code(&self) -> Result<u16> {
        let token = self
            .get(0)
            .ok_or_else(|| Error::invalid("type code", "empty parameter record"))?;
        let value = parse_integer(token)?;
        u16::try_from(value)
            .map_err(|_| Error::invalid("type code", format!("{} is not a type number", value)))
    }
}

/// One tokenizer output: directory metadata plus parameter tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub directory: DirectoryEntry,
    pub parameters: ParameterRecord,
}

impl EntityRecord {
    pub fn new(directory: DirectoryEntry, parameters: ParameterRecord) -> Self {
        Self {
            directory,
            parameters,
        }
    }

    /// Record whose type code is read from parameter token 0, form 0
    pub fn from_parameters(de: impl Into<DeRef>, parameters: ParameterRecord) -> Result<Self> {
        let type_code = parameters.type_code()?;
        Ok(Self::new(
            DirectoryEntry::new(de, type_code, 0),
            parameters,
        ))
    }
}
