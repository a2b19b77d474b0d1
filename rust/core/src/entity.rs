// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded entities
//!
//! An [`Entity`] keeps its directory metadata, its raw parameter tokens, the
//! pointer marker array and the typed [`EntityData`]. Cross references are
//! plain [`DeRef`] values; following them always goes through a
//! [`ModelGraph`].

use crate::decoder::DecodedParameters;
use crate::entities::{
    Boundary, BoundedSurface, CircularArc, Color, CompositeCurve, ConicArc,
    CurveOnParametricSurface, EdgeList, Face, Line, Loop, ParametricSplineCurve, Point,
    PropertyEntity, RationalBSplineCurve, RationalBSplineSurface, SingularSubfigureInstance,
    Subfigure, SurfaceOfRevolution, TabulatedCylinder, Transformation, TrimmedSurface,
    VertexList,
};
use crate::error::{Error, Result};
use crate::graph::ModelGraph;
use crate::record::{DeRef, DirectoryEntry, ParameterRecord};
use crate::schema::EntityKind;
use crate::values::parse_pointer;

/// Typed projection of [`EntityData`] onto one variant's struct
pub trait EntityVariant: Sized {
    const KIND: EntityKind;

    fn from_data(data: &EntityData) -> Option<&Self>;
}

macro_rules! entity_data {
    ($($variant:ident),* $(,)?) => {
        /// Strongly typed parameter data, one variant per supported type number
        #[derive(Debug, Clone, PartialEq)]
        pub enum EntityData {
            $($variant($variant),)*
            /// No decoder for the type number; raw tokens stay on the entity
            Unsupported,
            /// Known type number whose parameters failed to decode
            Malformed(Error),
        }

        impl EntityData {
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(EntityData::$variant(_) => EntityKind::$variant,)*
                    EntityData::Unsupported => EntityKind::Unsupported,
                    EntityData::Malformed(_) => EntityKind::Malformed,
                }
            }
        }

        $(
            impl EntityVariant for $variant {
                const KIND: EntityKind = EntityKind::$variant;

                #[inline]
                fn from_data(data: &EntityData) -> Option<&Self> {
                    match data {
                        EntityData::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

entity_data!(
    CircularArc,
    CompositeCurve,
    ConicArc,
    Line,
    ParametricSplineCurve,
    Point,
    SurfaceOfRevolution,
    TabulatedCylinder,
    Transformation,
    RationalBSplineCurve,
    RationalBSplineSurface,
    Boundary,
    CurveOnParametricSurface,
    BoundedSurface,
    TrimmedSurface,
    Subfigure,
    Color,
    PropertyEntity,
    SingularSubfigureInstance,
    VertexList,
    EdgeList,
    Loop,
    Face,
);

/// Decoded IGES entity
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    directory: DirectoryEntry,
    parameters: ParameterRecord,
    pointer_slots: Vec<bool>,
    data: EntityData,
}

impl Entity {
    pub(crate) fn decoded(
        directory: DirectoryEntry,
        parameters: ParameterRecord,
        decoded: DecodedParameters,
    ) -> Self {
        Self {
            directory,
            parameters,
            pointer_slots: decoded.pointer_slots,
            data: decoded.data,
        }
    }

    /// Placeholder for a record that failed to decode
    pub(crate) fn malformed(
        directory: DirectoryEntry,
        parameters: ParameterRecord,
        error: Error,
    ) -> Self {
        Self {
            pointer_slots: vec![false; parameters.len()],
            directory,
            parameters,
            data: EntityData::Malformed(error),
        }
    }

    #[inline]
    pub fn de(&self) -> DeRef {
        self.directory.de
    }

    #[inline]
    pub fn type_code(&self) -> u16 {
        self.directory.type_code
    }

    #[inline]
    pub fn form(&self) -> u16 {
        self.directory.form
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.data.kind()
    }

    pub fn directory(&self) -> &DirectoryEntry {
        &self.directory
    }

    /// Raw parameter tokens, verbatim
    pub fn parameters(&self) -> &ParameterRecord {
        &self.parameters
    }

    /// Pointer markers, parallel to [`Entity::parameters`]
    pub fn pointer_slots(&self) -> &[bool] {
        &self.pointer_slots
    }

    #[inline]
    pub fn is_pointer(&self, index: usize) -> bool {
        self.pointer_slots.get(index).copied().unwrap_or(false)
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self.data, EntityData::Unsupported)
    }

    /// Decode error kept by a lenient build
    pub fn decode_error(&self) -> Option<&Error> {
        match &self.data {
            EntityData::Malformed(error) => Some(error),
            _ => None,
        }
    }

    /// Typed view of this entity's data
    #[inline]
    pub fn as_variant<T: EntityVariant>(&self) -> Option<&T> {
        T::from_data(&self.data)
    }

    /// Typed view, failing with [`Error::UnexpectedEntity`] on a mismatch
    pub fn expect_variant<T: EntityVariant>(&self) -> Result<&T> {
        self.as_variant::<T>().ok_or(Error::UnexpectedEntity {
            de: self.de(),
            expected: T::KIND,
            actual: self.kind(),
        })
    }

    /// Non-null pointers found in marked slots, as `(slot, target)` pairs
    pub fn references(&self) -> impl Iterator<Item = (usize, DeRef)> + '_ {
        self.pointer_slots
            .iter()
            .enumerate()
            .filter(|(_, is_pointer)| **is_pointer)
            .filter_map(move |(slot, _)| {
                let token = self.parameters.get(slot)?;
                parse_pointer(token).ok().flatten().map(|target| (slot, target))
            })
    }

    /// Transformation matrix named by the directory entry, if any
    pub fn transformation<'g>(&self, graph: &'g ModelGraph) -> Result<Option<&'g Transformation>> {
        self.directory
            .transform
            .map(|de| graph.resolve_as::<Transformation>(de))
            .transpose()
    }
}
