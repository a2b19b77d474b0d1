// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity Decoder - positional parameter extraction
//!
//! [`decode`] dispatches on the type number to one [`DecodeParameters`]
//! implementation per entity kind. Decoders pull fields through a
//! [`ParamReader`], which checks every read against the tokens left in the
//! record and records which slots hold DE pointers.

use nalgebra::{Point2, Point3, Vector3};
use smallvec::SmallVec;

use crate::entities::{
    Boundary, BoundedSurface, CircularArc, Color, CompositeCurve, ConicArc,
    CurveOnParametricSurface, EdgeList, Face, Line, Loop, ParametricSplineCurve, Point,
    PropertyEntity, RationalBSplineCurve, RationalBSplineSurface, SingularSubfigureInstance,
    Subfigure, SurfaceOfRevolution, TabulatedCylinder, Transformation, TrimmedSurface,
    VertexList,
};
use crate::entity::EntityData;
use crate::error::{Error, Result};
use crate::record::{DeRef, DirectoryEntry, ParameterRecord};
use crate::schema::EntityKind;
use crate::values::{parse_flag, parse_integer, parse_number, parse_pointer, parse_string};

/// Decoder for one entity kind's parameter layout
pub trait DecodeParameters: Sized {
    /// Decode from a reader positioned at the first field after the type number
    fn decode(directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self>;
}

/// Decoded data plus the pointer marker array, parallel to the token list
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedParameters {
    pub data: EntityData,
    pub pointer_slots: Vec<bool>,
}

/// Decode one record
///
/// Unknown type numbers never fail: they produce [`EntityData::Unsupported`]
/// with every slot unmarked.
pub fn decode(directory: &DirectoryEntry, parameters: &ParameterRecord) -> Result<DecodedParameters> {
    let mut reader = ParamReader::new(parameters);

    let data = match EntityKind::from_code(directory.type_code) {
        Some(kind) => decode_kind(kind, directory, &mut reader)?,
        None => EntityData::Unsupported,
    };

    Ok(DecodedParameters {
        data,
        pointer_slots: reader.into_pointer_slots(),
    })
}

fn decode_kind(
    kind: EntityKind,
    directory: &DirectoryEntry,
    reader: &mut ParamReader<'_>,
) -> Result<EntityData> {
    let data = match kind {
        EntityKind::CircularArc => EntityData::CircularArc(CircularArc::decode(directory, reader)?),
        EntityKind::CompositeCurve => {
            EntityData::CompositeCurve(CompositeCurve::decode(directory, reader)?)
        }
        EntityKind::ConicArc => EntityData::ConicArc(ConicArc::decode(directory, reader)?),
        EntityKind::Line => EntityData::Line(Line::decode(directory, reader)?),
        EntityKind::ParametricSplineCurve => {
            EntityData::ParametricSplineCurve(ParametricSplineCurve::decode(directory, reader)?)
        }
        EntityKind::Point => EntityData::Point(Point::decode(directory, reader)?),
        EntityKind::SurfaceOfRevolution => {
            EntityData::SurfaceOfRevolution(SurfaceOfRevolution::decode(directory, reader)?)
        }
        EntityKind::TabulatedCylinder => {
            EntityData::TabulatedCylinder(TabulatedCylinder::decode(directory, reader)?)
        }
        EntityKind::Transformation => {
            EntityData::Transformation(Transformation::decode(directory, reader)?)
        }
        EntityKind::RationalBSplineCurve => {
            EntityData::RationalBSplineCurve(RationalBSplineCurve::decode(directory, reader)?)
        }
        EntityKind::RationalBSplineSurface => {
            EntityData::RationalBSplineSurface(RationalBSplineSurface::decode(directory, reader)?)
        }
        EntityKind::Boundary => EntityData::Boundary(Boundary::decode(directory, reader)?),
        EntityKind::CurveOnParametricSurface => EntityData::CurveOnParametricSurface(
            CurveOnParametricSurface::decode(directory, reader)?,
        ),
        EntityKind::BoundedSurface => {
            EntityData::BoundedSurface(BoundedSurface::decode(directory, reader)?)
        }
        EntityKind::TrimmedSurface => {
            EntityData::TrimmedSurface(TrimmedSurface::decode(directory, reader)?)
        }
        EntityKind::Subfigure => EntityData::Subfigure(Subfigure::decode(directory, reader)?),
        EntityKind::Color => EntityData::Color(Color::decode(directory, reader)?),
        EntityKind::PropertyEntity => {
            EntityData::PropertyEntity(PropertyEntity::decode(directory, reader)?)
        }
        EntityKind::SingularSubfigureInstance => EntityData::SingularSubfigureInstance(
            SingularSubfigureInstance::decode(directory, reader)?,
        ),
        EntityKind::VertexList => EntityData::VertexList(VertexList::decode(directory, reader)?),
        EntityKind::EdgeList => EntityData::EdgeList(EdgeList::decode(directory, reader)?),
        EntityKind::Loop => EntityData::Loop(Loop::decode(directory, reader)?),
        EntityKind::Face => EntityData::Face(Face::decode(directory, reader)?),
        EntityKind::Unsupported | EntityKind::Malformed => EntityData::Unsupported,
    };
    Ok(data)
}

/// Checked arithmetic for lengths derived from decoded fields
#[inline]
pub(crate) fn derived_len(field: &'static str, value: Option<usize>) -> Result<usize> {
    value.ok_or_else(|| Error::invalid(field, "derived length overflows"))
}

/// Sequential cursor over one record's tokens
///
/// Starts after token 0 (the type number). Every multi-token read checks the
/// declared length against what is left before touching any token.
#[derive(Debug)]
pub struct ParamReader<'a> {
    tokens: &'a [String],
    position: usize,
    pointer_slots: Vec<bool>,
}

impl<'a> ParamReader<'a> {
    pub fn new(record: &'a ParameterRecord) -> Self {
        let tokens = record.tokens();
        Self {
            tokens,
            position: 1,
            pointer_slots: vec![false; tokens.len()],
        }
    }

    /// Index of the next token in the record
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Tokens not yet consumed
    #[inline]
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.position)
    }

    /// Fail with a parameter count error unless `declared` tokens remain
    #[inline]
    pub fn require(&self, field: &'static str, declared: usize) -> Result<()> {
        let available = self.remaining();
        if available < declared {
            return Err(Error::ParameterCount {
                field,
                declared,
                available,
            });
        }
        Ok(())
    }

    #[inline]
    fn next_token(&mut self, field: &'static str) -> Result<&'a str> {
        self.require(field, 1)?;
        let token = self.tokens[self.position].as_str();
        self.position += 1;
        Ok(token)
    }

    /// Next token if any remain and it is not a defaulted (empty) field
    fn next_present(&mut self) -> Option<&'a str> {
        if self.remaining() == 0 {
            return None;
        }
        let token = self.tokens[self.position].as_str();
        self.position += 1;
        if token.trim().is_empty() {
            None
        } else {
            Some(token)
        }
    }

    pub fn number(&mut self, field: &'static str) -> Result<f64> {
        parse_number(self.next_token(field)?)
    }

    /// Number with an IGES default for absent or empty tokens
    pub fn number_or(&mut self, default: f64) -> Result<f64> {
        match self.next_present() {
            Some(token) => parse_number(token),
            None => Ok(default),
        }
    }

    pub fn numbers(&mut self, field: &'static str, count: usize) -> Result<Vec<f64>> {
        self.require(field, count)?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.number(field)?);
        }
        Ok(values)
    }

    pub fn point2(&mut self, field: &'static str) -> Result<Point2<f64>> {
        self.require(field, 2)?;
        Ok(Point2::new(self.number(field)?, self.number(field)?))
    }

    pub fn point(&mut self, field: &'static str) -> Result<Point3<f64>> {
        self.require(field, 3)?;
        Ok(Point3::new(
            self.number(field)?,
            self.number(field)?,
            self.number(field)?,
        ))
    }

    pub fn vector(&mut self, field: &'static str) -> Result<Vector3<f64>> {
        Ok(self.point(field)?.coords)
    }

    /// `count` consecutive XYZ triples
    pub fn points(&mut self, field: &'static str, count: usize) -> Result<Vec<Point3<f64>>> {
        let declared = derived_len(field, count.checked_mul(3))?;
        self.require(field, declared)?;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            points.push(self.point(field)?);
        }
        Ok(points)
    }

    pub fn integer(&mut self, field: &'static str) -> Result<i64> {
        parse_integer(self.next_token(field)?)
    }

    /// Non-negative count or index
    pub fn count(&mut self, field: &'static str) -> Result<usize> {
        let value = self.integer(field)?;
        usize::try_from(value)
            .map_err(|_| Error::invalid(field, format!("expected a non-negative count, got {}", value)))
    }

    pub fn flag(&mut self, field: &'static str) -> Result<bool> {
        parse_flag(self.next_token(field)?)
    }

    pub fn string(&mut self, field: &'static str) -> Result<String> {
        parse_string(self.next_token(field)?)
    }

    /// Optional trailing string; absent or empty yields `None`
    pub fn optional_string(&mut self) -> Result<Option<String>> {
        self.next_present().map(parse_string).transpose()
    }

    /// Raw token text
    pub fn raw(&mut self, field: &'static str) -> Result<String> {
        Ok(self.next_token(field)?.to_string())
    }

    /// Pointer slot; zero is a null pointer but the slot is still marked
    pub fn pointer(&mut self, field: &'static str) -> Result<Option<DeRef>> {
        self.require(field, 1)?;
        let slot = self.position;
        let value = parse_pointer(self.next_token(field)?)?;
        self.pointer_slots[slot] = true;
        Ok(value)
    }

    /// Trailing pointer that may be absent or defaulted
    pub fn optional_pointer(&mut self) -> Result<Option<DeRef>> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        self.pointer_slots[self.position] = true;
        self.next_present().map(parse_pointer).transpose().map(Option::flatten)
    }

    /// Pointer slot that must not be null
    pub fn reference(&mut self, field: &'static str) -> Result<DeRef> {
        self.pointer(field)?
            .ok_or_else(|| Error::invalid(field, "null pointer where a reference is required"))
    }

    /// `count` consecutive non-null pointers
    pub fn references<const N: usize>(
        &mut self,
        field: &'static str,
        count: usize,
    ) -> Result<SmallVec<[DeRef; N]>>
    where
        [DeRef; N]: smallvec::Array<Item = DeRef>,
    {
        self.require(field, count)?;
        let mut refs = SmallVec::with_capacity(count);
        for _ in 0..count {
            refs.push(self.reference(field)?);
        }
        Ok(refs)
    }

    /// Pointer marker array, same length as the token list
    pub fn into_pointer_slots(self) -> Vec<bool> {
        self.pointer_slots
    }
}
