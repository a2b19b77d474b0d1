// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity decoders, one typed struct per supported type number
//!
//! Each sub-module handles a family of IGES entities:
//!
//! - `curves`: Circular Arc, Composite Curve, Conic Arc, Line, Parametric
//!   Spline, Point, Rational B-Spline Curve, Curve on a Parametric Surface
//! - `surfaces`: Surface of Revolution, Tabulated Cylinder, Rational B-Spline
//!   Surface, Boundary, Bounded Surface, Trimmed Surface
//! - `structure`: Transformation Matrix, Subfigure, Color, Property,
//!   Singular Subfigure Instance
//! - `brep`: Vertex List, Edge List, Loop, Face
//!
//! Reference fields hold [`DeRef`](crate::DeRef) values. Accessors that
//! follow them take the [`ModelGraph`](crate::ModelGraph) explicitly.

mod brep;
mod curves;
mod structure;
mod surfaces;

pub use brep::{Edge, EdgeList, Face, Loop, LoopEdge, LoopEdgeKind, ParameterCurve, VertexList};
pub use curves::{
    CircularArc, CompositeCurve, ConicArc, ConicKind, CurveCreation, CurveOnParametricSurface,
    Line, ParametricSplineCurve, Point, PreferredRepresentation, RationalBSplineCurve,
    SplineSegment,
};
pub use structure::{
    Color, PropertyEntity, SingularSubfigureInstance, Subfigure, Transformation,
};
pub use surfaces::{
    Boundary, BoundaryCurve, BoundedSurface, RationalBSplineSurface, SurfaceOfRevolution,
    TabulatedCylinder, TrimmedSurface,
};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::GraphConfig;
    use crate::decoder::{DecodeParameters, ParamReader};
    use crate::error::Result;
    use crate::graph::ModelGraph;
    use crate::record::{DirectoryEntry, EntityRecord, ParameterRecord};

    /// Decode one token list with a given form number
    pub(crate) fn decode_form<T: DecodeParameters>(form: u16, tokens: &[&str]) -> Result<T> {
        let record = ParameterRecord::from_tokens(tokens.iter().copied());
        let type_code = record.type_code()?;
        let directory = DirectoryEntry::new(1, type_code, form);
        T::decode(&directory, &mut ParamReader::new(&record))
    }

    pub(crate) fn decode<T: DecodeParameters>(tokens: &[&str]) -> Result<T> {
        decode_form(0, tokens)
    }

    /// Strict graph from `(de, tokens)` pairs
    pub(crate) fn graph(records: &[(u32, &[&str])]) -> ModelGraph {
        let records = records.iter().map(|(de, tokens)| {
            EntityRecord::from_parameters(*de, ParameterRecord::from_tokens(tokens.iter().copied()))
                .unwrap()
        });
        ModelGraph::build(records, &GraphConfig::strict()).unwrap()
    }
}
