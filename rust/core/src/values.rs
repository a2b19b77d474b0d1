// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Token value decoding
//!
//! Converts raw parameter tokens into numbers, integers, pointers and
//! strings. Floats go through fast-float, integers through lexical-core.

use crate::error::{Error, Result};
use crate::parser::{hollerith_body, hollerith_prefix};
use crate::record::DeRef;

/// Parse a real number token
///
/// Handles FORTRAN double precision exponents: `1.2D3` parses like `1.2E3`.
#[inline]
pub fn parse_number(token: &str) -> Result<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(numeric_error(token));
    }

    if let Ok(value) = fast_float::parse::<f64, _>(trimmed) {
        return Ok(value);
    }

    if !trimmed.bytes().any(|b| b == b'D' || b == b'd') {
        return Err(numeric_error(token));
    }

    let normalized: String = trimmed
        .chars()
        .map(|c| match c {
            'D' | 'd' => 'E',
            other => other,
        })
        .collect();

    fast_float::parse::<f64, _>(&normalized).map_err(|_| numeric_error(token))
}

/// Parse a strict integer token (no fraction, no exponent)
#[inline]
pub fn parse_integer(token: &str) -> Result<i64> {
    let trimmed = token.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    lexical_core::parse::<i64>(digits.as_bytes()).map_err(|_| Error::IntegerFormat {
        token: token.to_string(),
    })
}

/// Parse a pointer token; zero means "no reference"
#[inline]
pub fn parse_pointer(token: &str) -> Result<Option<DeRef>> {
    let value = parse_integer(token)?;
    if value < 0 {
        return Err(Error::NegativePointer { value });
    }
    if value == 0 {
        return Ok(None);
    }
    u32::try_from(value)
        .map(|v| Some(DeRef::new(v)))
        .map_err(|_| Error::invalid("pointer", format!("{} exceeds the DE range", value)))
}

/// Parse a string token, stripping a Hollerith `nH` prefix when present
///
/// A Hollerith string yields exactly its `n` counted characters, blanks
/// included; a body shorter than the count is an error. Other tokens are
/// returned trimmed.
pub fn parse_string(token: &str) -> Result<String> {
    let text = token.trim_start();
    if hollerith_prefix(text).is_err() {
        return Ok(text.trim_end().to_string());
    }

    match hollerith_body(text) {
        Ok((rest, body)) if rest.trim().is_empty() => Ok(body.to_string()),
        Ok((rest, _)) => Err(Error::parse(format!(
            "Hollerith string {:?} has {} trailing characters",
            text,
            rest.len()
        ))),
        Err(_) => Err(Error::parse(format!(
            "Hollerith string {:?} is shorter than its count",
            text
        ))),
    }
}

/// Parse an integer flag: zero is false, anything else true
#[inline]
pub fn parse_flag(token: &str) -> Result<bool> {
    Ok(parse_integer(token)? != 0)
}

fn numeric_error(token: &str) -> Error {
    Error::NumericFormat {
        token: token.to_string(),
    }
}
