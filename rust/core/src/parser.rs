// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Free-format parameter data splitting using nom
//!
//! Splits one entity's concatenated parameter text into raw tokens. Hollerith
//! strings (`5HHELLO`) may contain delimiter characters, so they are
//! recognised before plain fields.

use nom::{
    branch::alt,
    bytes::complete::{take, take_till},
    character::complete::{digit1, one_of, space0},
    combinator::{flat_map, map, map_res, recognize},
    sequence::{delimited, terminated},
    IResult,
};

use crate::error::{Error, Result};

/// Default IGES parameter delimiter
pub const PARAMETER_DELIMITER: char = ',';
/// Default IGES record delimiter
pub const RECORD_DELIMITER: char = ';';

/// Hollerith body: `nH` followed by exactly n characters, returns the characters
pub(crate) fn hollerith_body(input: &str) -> IResult<&str, &str> {
    flat_map(
        terminated(map_res(digit1, |s: &str| s.parse::<usize>()), one_of("Hh")),
        |count: usize| take(count),
    )(input)
}

/// `nH` count prefix of a Hollerith string
pub(crate) fn hollerith_prefix(input: &str) -> IResult<&str, &str> {
    recognize(terminated(digit1, one_of("Hh")))(input)
}

/// Complete Hollerith token including its `nH` prefix
fn hollerith(input: &str) -> IResult<&str, &str> {
    recognize(hollerith_body)(input)
}

/// One parameter field, up to (not including) the next delimiter
///
/// Blanks around a field are dropped; blanks counted inside a Hollerith
/// string are kept.
fn field(delimiter: char, terminator: char) -> impl FnMut(&str) -> IResult<&str, &str> {
    move |input: &str| {
        alt((
            delimited(space0, hollerith, space0),
            map(take_till(|c: char| c == delimiter || c == terminator), str::trim),
        ))(input)
    }
}

/// Split parameter text into tokens
///
/// Stops at the first record terminator outside a Hollerith string; a
/// missing terminator ends the record at end of input. Empty fields are
/// kept as empty tokens.
pub fn split_parameters(input: &str, delimiter: char, terminator: char) -> Result<Vec<&str>> {
    let bytes = input.as_bytes();

    // Fast path: no Hollerith marker anywhere, plain delimiter split
    if delimiter.is_ascii()
        && terminator.is_ascii()
        && memchr::memchr2(b'H', b'h', bytes).is_none()
    {
        let end = memchr::memchr(terminator as u8, bytes).unwrap_or(bytes.len());
        return Ok(input[..end].split(delimiter).map(str::trim).collect());
    }

    let mut parse_field = field(delimiter, terminator);
    let mut fields = Vec::with_capacity(bytes.len() / 4 + 1);
    let mut rest = input;

    loop {
        let (after, value) = parse_field(rest)
            .map_err(|e| Error::parse(format!("failed to split parameters: {}", e)))?;
        fields.push(value);

        let mut chars = after.chars();
        match chars.next() {
            Some(c) if c == delimiter => rest = chars.as_str(),
            Some(c) if c == terminator => break,
            None => break,
            Some(c) => {
                return Err(Error::parse(format!(
                    "unexpected {:?} after parameter {:?}",
                    c, value
                )))
            }
        }
    }

    Ok(fields)
}
