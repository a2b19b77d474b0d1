// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IGES entity type registry
//!
//! Fast type checking using an enum instead of raw type numbers. The set is
//! closed: a type number without a variant decodes as [`EntityKind::Unsupported`].

use std::fmt;

/// IGES entity kinds with a decoder, plus the two fallback kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    // Curves
    CircularArc,
    CompositeCurve,
    ConicArc,
    Line,
    ParametricSplineCurve,
    Point,
    RationalBSplineCurve,
    CurveOnParametricSurface,

    // Surfaces
    SurfaceOfRevolution,
    TabulatedCylinder,
    RationalBSplineSurface,
    Boundary,
    BoundedSurface,
    TrimmedSurface,

    // Structure
    Transformation,
    Subfigure,
    Color,
    PropertyEntity,
    SingularSubfigureInstance,

    // B-Rep topology
    VertexList,
    EdgeList,
    Loop,
    Face,

    // Fallbacks
    Unsupported,
    Malformed,
}

impl EntityKind {
    /// Every kind with a registered decoder
    pub const SUPPORTED: [EntityKind; 23] = [
        EntityKind::CircularArc,
        EntityKind::CompositeCurve,
        EntityKind::ConicArc,
        EntityKind::Line,
        EntityKind::ParametricSplineCurve,
        EntityKind::Point,
        EntityKind::SurfaceOfRevolution,
        EntityKind::TabulatedCylinder,
        EntityKind::Transformation,
        EntityKind::RationalBSplineCurve,
        EntityKind::RationalBSplineSurface,
        EntityKind::Boundary,
        EntityKind::CurveOnParametricSurface,
        EntityKind::BoundedSurface,
        EntityKind::TrimmedSurface,
        EntityKind::Subfigure,
        EntityKind::Color,
        EntityKind::PropertyEntity,
        EntityKind::SingularSubfigureInstance,
        EntityKind::VertexList,
        EntityKind::EdgeList,
        EntityKind::Loop,
        EntityKind::Face,
    ];

    /// Look up the decoder kind for an IGES type number
    #[inline]
    pub fn from_code(code: u16) -> Option<Self> {
        let kind = match code {
            100 => Self::CircularArc,
            102 => Self::CompositeCurve,
            104 => Self::ConicArc,
            110 => Self::Line,
            112 => Self::ParametricSplineCurve,
            116 => Self::Point,
            120 => Self::SurfaceOfRevolution,
            122 => Self::TabulatedCylinder,
            124 => Self::Transformation,
            126 => Self::RationalBSplineCurve,
            128 => Self::RationalBSplineSurface,
            141 => Self::Boundary,
            142 => Self::CurveOnParametricSurface,
            143 => Self::BoundedSurface,
            144 => Self::TrimmedSurface,
            308 => Self::Subfigure,
            314 => Self::Color,
            406 => Self::PropertyEntity,
            408 => Self::SingularSubfigureInstance,
            502 => Self::VertexList,
            504 => Self::EdgeList,
            508 => Self::Loop,
            510 => Self::Face,
            _ => return None,
        };
        Some(kind)
    }

    /// IGES type number, `None` for the fallback kinds
    pub fn code(&self) -> Option<u16> {
        let code = match self {
            Self::CircularArc => 100,
            Self::CompositeCurve => 102,
            Self::ConicArc => 104,
            Self::Line => 110,
            Self::ParametricSplineCurve => 112,
            Self::Point => 116,
            Self::SurfaceOfRevolution => 120,
            Self::TabulatedCylinder => 122,
            Self::Transformation => 124,
            Self::RationalBSplineCurve => 126,
            Self::RationalBSplineSurface => 128,
            Self::Boundary => 141,
            Self::CurveOnParametricSurface => 142,
            Self::BoundedSurface => 143,
            Self::TrimmedSurface => 144,
            Self::Subfigure => 308,
            Self::Color => 314,
            Self::PropertyEntity => 406,
            Self::SingularSubfigureInstance => 408,
            Self::VertexList => 502,
            Self::EdgeList => 504,
            Self::Loop => 508,
            Self::Face => 510,
            Self::Unsupported | Self::Malformed => return None,
        };
        Some(code)
    }

    /// Whether a type number has a registered decoder
    #[inline]
    pub fn is_supported(code: u16) -> bool {
        Self::from_code(code).is_some()
    }

    /// Human-readable IGES entity name
    pub fn name(&self) -> &'static str {
        match self {
            Self::CircularArc => "Circular Arc",
            Self::CompositeCurve => "Composite Curve",
            Self::ConicArc => "Conic Arc",
            Self::Line => "Line",
            Self::ParametricSplineCurve => "Parametric Spline Curve",
            Self::Point => "Point",
            Self::SurfaceOfRevolution => "Surface of Revolution",
            Self::TabulatedCylinder => "Tabulated Cylinder",
            Self::Transformation => "Transformation Matrix",
            Self::RationalBSplineCurve => "Rational B-Spline Curve",
            Self::RationalBSplineSurface => "Rational B-Spline Surface",
            Self::Boundary => "Boundary",
            Self::CurveOnParametricSurface => "Curve on a Parametric Surface",
            Self::BoundedSurface => "Bounded Surface",
            Self::TrimmedSurface => "Trimmed Surface",
            Self::Subfigure => "Subfigure Definition",
            Self::Color => "Color Definition",
            Self::PropertyEntity => "Property",
            Self::SingularSubfigureInstance => "Singular Subfigure Instance",
            Self::VertexList => "Vertex List",
            Self::EdgeList => "Edge List",
            Self::Loop => "Loop",
            Self::Face => "Face",
            Self::Unsupported => "Unsupported",
            Self::Malformed => "Malformed",
        }
    }

    /// Curve-like kinds (usable as model or parameter space curves)
    pub fn is_curve(&self) -> bool {
        matches!(
            self,
            Self::CircularArc
                | Self::CompositeCurve
                | Self::ConicArc
                | Self::Line
                | Self::ParametricSplineCurve
                | Self::RationalBSplineCurve
                | Self::CurveOnParametricSurface
        )
    }

    /// Surface-like kinds
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            Self::SurfaceOfRevolution
                | Self::TabulatedCylinder
                | Self::RationalBSplineSurface
                | Self::BoundedSurface
                | Self::TrimmedSurface
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(code) => write!(f, "{} ({})", self.name(), code),
            None => f.write_str(self.name()),
        }
    }
}
