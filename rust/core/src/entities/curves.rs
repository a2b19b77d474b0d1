// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curve entities: 100, 102, 104, 110, 112, 116, 126, 142

use nalgebra::{Matrix2, Matrix3, Point2, Point3, Vector3};
use smallvec::SmallVec;

use crate::decoder::{derived_len, DecodeParameters, ParamReader};
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::graph::ModelGraph;
use crate::record::{DeRef, DirectoryEntry};

/// Circular Arc (100), defined in the plane `z = ZT` of its definition space
#[derive(Debug, Clone, PartialEq)]
pub struct CircularArc {
    z_displacement: f64,
    center: Point2<f64>,
    start: Point2<f64>,
    end: Point2<f64>,
}

impl DecodeParameters for CircularArc {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("circular arc", 7)?;
        Ok(Self {
            z_displacement: reader.number("zt")?,
            center: reader.point2("center")?,
            start: reader.point2("start point")?,
            end: reader.point2("end point")?,
        })
    }
}

impl CircularArc {
    #[inline]
    pub fn z_displacement(&self) -> f64 {
        self.z_displacement
    }

    pub fn center(&self) -> Point3<f64> {
        self.lift(self.center)
    }

    pub fn start(&self) -> Point3<f64> {
        self.lift(self.start)
    }

    pub fn end(&self) -> Point3<f64> {
        self.lift(self.end)
    }

    /// Distance from center to start point
    pub fn radius(&self) -> f64 {
        nalgebra::distance(&self.center, &self.start)
    }

    /// Start and end coincide
    pub fn is_full_circle(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    fn lift(&self, point: Point2<f64>) -> Point3<f64> {
        Point3::new(point.x, point.y, self.z_displacement)
    }
}

/// Composite Curve (102): ordered list of constituent curves
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeCurve {
    curves: SmallVec<[DeRef; 4]>,
}

impl DecodeParameters for CompositeCurve {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        let count = reader.count("curve count")?;
        Ok(Self {
            curves: reader.references("curves", count)?,
        })
    }
}

impl CompositeCurve {
    pub fn curve_refs(&self) -> &[DeRef] {
        &self.curves
    }

    /// Constituent curves in order
    pub fn curves<'g>(&self, graph: &'g ModelGraph) -> Result<Vec<&'g Entity>> {
        graph.resolve_all(&self.curves)
    }
}

/// Parent conic type of a [`ConicArc`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConicKind {
    Ellipse,
    Hyperbola,
    Parabola,
    /// Coefficients describe none of the three (e.g. a line pair)
    Degenerate,
}

const CONIC_TOLERANCE: f64 = 1e-12;

/// Conic Arc (104): `A x² + B xy + C y² + D x + E y + F = 0` in the plane `z = ZT`
#[derive(Debug, Clone, PartialEq)]
pub struct ConicArc {
    form: u16,
    coefficients: [f64; 6],
    z_displacement: f64,
    start: Point2<f64>,
    end: Point2<f64>,
}

impl DecodeParameters for ConicArc {
    fn decode(directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("conic arc", 11)?;
        let mut coefficients = [0.0; 6];
        for coefficient in &mut coefficients {
            *coefficient = reader.number("coefficients")?;
        }
        Ok(Self {
            form: directory.form,
            coefficients,
            z_displacement: reader.number("zt")?,
            start: reader.point2("start point")?,
            end: reader.point2("end point")?,
        })
    }
}

impl ConicArc {
    /// `[A, B, C, D, E, F]`
    pub fn coefficients(&self) -> [f64; 6] {
        self.coefficients
    }

    #[inline]
    pub fn z_displacement(&self) -> f64 {
        self.z_displacement
    }

    pub fn start(&self) -> Point3<f64> {
        Point3::new(self.start.x, self.start.y, self.z_displacement)
    }

    pub fn end(&self) -> Point3<f64> {
        Point3::new(self.end.x, self.end.y, self.z_displacement)
    }

    /// Conic type, from the form number when set (1 ellipse, 2 hyperbola,
    /// 3 parabola), otherwise classified from the coefficients
    pub fn kind(&self) -> ConicKind {
        match self.form {
            1 => ConicKind::Ellipse,
            2 => ConicKind::Hyperbola,
            3 => ConicKind::Parabola,
            _ => self.classify(),
        }
    }

    /// Classify with the Q1/Q2/Q3 invariants
    pub fn classify(&self) -> ConicKind {
        let [a, b, c, d, e, f] = self.coefficients;
        let q1 = Matrix3::new(
            a, b / 2.0, d / 2.0,
            b / 2.0, c, e / 2.0,
            d / 2.0, e / 2.0, f,
        )
        .determinant();
        let q2 = Matrix2::new(a, b / 2.0, b / 2.0, c).determinant();
        let q3 = a + c;

        let q1_zero = q1.abs() <= CONIC_TOLERANCE;
        if q2 > CONIC_TOLERANCE && q1 * q3 < 0.0 {
            ConicKind::Ellipse
        } else if q2 < -CONIC_TOLERANCE && !q1_zero {
            ConicKind::Hyperbola
        } else if q2.abs() <= CONIC_TOLERANCE && !q1_zero {
            ConicKind::Parabola
        } else {
            ConicKind::Degenerate
        }
    }
}

/// Line (110)
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    start: Point3<f64>,
    end: Point3<f64>,
}

impl DecodeParameters for Line {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("line", 6)?;
        Ok(Self {
            start: reader.point("start point")?,
            end: reader.point("end point")?,
        })
    }
}

impl Line {
    #[inline]
    pub fn start(&self) -> Point3<f64> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point3<f64> {
        self.end
    }

    pub fn coordinates(&self) -> [Point3<f64>; 2] {
        [self.start, self.end]
    }

    pub fn direction(&self) -> Vector3<f64> {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.direction().norm()
    }
}

/// Cubic polynomial coefficients of one spline segment, `[A, B, C, D]` per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineSegment {
    pub x: [f64; 4],
    pub y: [f64; 4],
    pub z: [f64; 4],
}

impl SplineSegment {
    fn read(reader: &mut ParamReader<'_>, field: &'static str) -> Result<Self> {
        Ok(Self {
            x: read_cubic(reader, field)?,
            y: read_cubic(reader, field)?,
            z: read_cubic(reader, field)?,
        })
    }
}

fn read_cubic(reader: &mut ParamReader<'_>, field: &'static str) -> Result<[f64; 4]> {
    Ok([
        reader.number(field)?,
        reader.number(field)?,
        reader.number(field)?,
        reader.number(field)?,
    ])
}

/// Parametric Spline Curve (112): piecewise cubic polynomial
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricSplineCurve {
    spline_type: i64,
    continuity: i64,
    dimension: i64,
    breakpoints: Vec<f64>,
    segments: Vec<SplineSegment>,
    terminal: SplineSegment,
}

impl DecodeParameters for ParametricSplineCurve {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("spline header", 4)?;
        let spline_type = reader.integer("spline type")?;
        let continuity = reader.integer("continuity")?;
        let dimension = reader.integer("dimension")?;
        let count = reader.count("segment count")?;
        if count == 0 {
            return Err(Error::invalid("segment count", "a spline needs at least one segment"));
        }

        let breakpoints = reader.numbers("breakpoints", derived_len("breakpoints", count.checked_add(1))?)?;

        reader.require("segments", derived_len("segments", count.checked_mul(12))?)?;
        let segments = (0..count)
            .map(|_| SplineSegment::read(reader, "segments"))
            .collect::<Result<Vec<_>>>()?;

        reader.require("terminal values", 12)?;
        let terminal = SplineSegment::read(reader, "terminal values")?;

        Ok(Self {
            spline_type,
            continuity,
            dimension,
            breakpoints,
            segments,
            terminal,
        })
    }
}

impl ParametricSplineCurve {
    /// CTYPE: 1 linear, 2 quadratic, 3 cubic, 4 Wilson-Fowler, 5 modified
    /// Wilson-Fowler, 6 B-spline
    pub fn spline_type(&self) -> i64 {
        self.spline_type
    }

    /// H: degree of continuity with respect to arc length
    pub fn continuity(&self) -> i64 {
        self.continuity
    }

    /// NDIM: 2 for planar, 3 for non-planar
    pub fn dimension(&self) -> i64 {
        self.dimension
    }

    pub fn is_planar(&self) -> bool {
        self.dimension == 2
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    pub fn segments(&self) -> &[SplineSegment] {
        &self.segments
    }

    /// Values and scaled derivatives at the last breakpoint
    pub fn terminal(&self) -> &SplineSegment {
        &self.terminal
    }

    pub fn parameter_range(&self) -> (f64, f64) {
        // Decoding guarantees at least two breakpoints
        (self.breakpoints[0], self.breakpoints[self.breakpoints.len() - 1])
    }
}

/// Point (116)
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    coordinate: Point3<f64>,
    display_symbol: Option<DeRef>,
}

impl DecodeParameters for Point {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        Ok(Self {
            coordinate: reader.point("point")?,
            display_symbol: reader.optional_pointer()?,
        })
    }
}

impl Point {
    #[inline]
    pub fn coordinate(&self) -> Point3<f64> {
        self.coordinate
    }

    pub fn display_symbol_ref(&self) -> Option<DeRef> {
        self.display_symbol
    }

    /// Subfigure used as the display symbol, if any
    pub fn display_symbol<'g>(&self, graph: &'g ModelGraph) -> Result<Option<&'g Entity>> {
        graph.resolve_optional(self.display_symbol)
    }
}

/// Rational B-Spline Curve (126)
///
/// Array lengths follow from the upper index `K` and degree `M`:
/// `K + M + 2` knots, `K + 1` weights and `K + 1` control points. The unit
/// normal of a planar curve is present only when three more tokens follow
/// the parameter range.
#[derive(Debug, Clone, PartialEq)]
pub struct RationalBSplineCurve {
    upper_index: usize,
    degree: usize,
    planar: bool,
    closed: bool,
    polynomial: bool,
    periodic: bool,
    knots: Vec<f64>,
    weights: Vec<f64>,
    control_points: Vec<Point3<f64>>,
    parameter_range: (f64, f64),
    normal: Option<Vector3<f64>>,
}

impl DecodeParameters for RationalBSplineCurve {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("b-spline header", 6)?;
        let upper_index = reader.count("upper index")?;
        let degree = reader.count("degree")?;
        if degree > upper_index {
            return Err(Error::invalid(
                "degree",
                format!("degree {} exceeds upper index {}", degree, upper_index),
            ));
        }
        let planar = reader.flag("planar flag")?;
        let closed = reader.flag("closed flag")?;
        let polynomial = reader.flag("polynomial flag")?;
        let periodic = reader.flag("periodic flag")?;

        let knot_count = derived_len(
            "knots",
            upper_index.checked_add(degree).and_then(|n| n.checked_add(2)),
        )?;
        let point_count = derived_len("weights", upper_index.checked_add(1))?;

        let knots = reader.numbers("knots", knot_count)?;
        let weights = reader.numbers("weights", point_count)?;
        let control_points = reader.points("control points", point_count)?;

        reader.require("parameter range", 2)?;
        let parameter_range = (reader.number("parameter range")?, reader.number("parameter range")?);

        let normal = if reader.remaining() >= 3 {
            Some(reader.vector("normal")?)
        } else {
            None
        };

        Ok(Self {
            upper_index,
            degree,
            planar,
            closed,
            polynomial,
            periodic,
            knots,
            weights,
            control_points,
            parameter_range,
            normal,
        })
    }
}

impl RationalBSplineCurve {
    /// Upper index of the control point sum (`K`)
    #[inline]
    pub fn upper_index(&self) -> usize {
        self.upper_index
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn is_planar(&self) -> bool {
        self.planar
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// All weights equal: the curve is polynomial, not rational
    pub fn is_polynomial(&self) -> bool {
        self.polynomial
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn control_points(&self) -> &[Point3<f64>] {
        &self.control_points
    }

    /// `(V0, V1)`
    pub fn parameter_range(&self) -> (f64, f64) {
        self.parameter_range
    }

    /// Unit normal of a planar curve, when the record carries one
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.normal
    }
}

/// How a [`CurveOnParametricSurface`] was created (CRTN)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveCreation {
    Unspecified,
    Projection,
    Intersection,
    Isoparametric,
}

impl CurveCreation {
    fn from_code(code: i64) -> Result<Self> {
        Ok(match code {
            0 => Self::Unspecified,
            1 => Self::Projection,
            2 => Self::Intersection,
            3 => Self::Isoparametric,
            _ => return Err(Error::invalid("creation", format!("unknown creation code {}", code))),
        })
    }
}

/// Which representation of a [`CurveOnParametricSurface`] a sender prefers (PREF)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferredRepresentation {
    Unspecified,
    /// `S(B(t))`, the parameter space curve composed with the surface
    ParameterSpace,
    /// `C(t)`, the model space curve
    ModelSpace,
    Either,
}

impl PreferredRepresentation {
    fn from_code(code: i64) -> Result<Self> {
        Ok(match code {
            0 => Self::Unspecified,
            1 => Self::ParameterSpace,
            2 => Self::ModelSpace,
            3 => Self::Either,
            _ => {
                return Err(Error::invalid(
                    "preferred representation",
                    format!("unknown preference code {}", code),
                ))
            }
        })
    }
}

/// Curve on a Parametric Surface (142)
#[derive(Debug, Clone, PartialEq)]
pub struct CurveOnParametricSurface {
    creation: CurveCreation,
    surface: DeRef,
    parameter_curve: Option<DeRef>,
    model_curve: Option<DeRef>,
    preferred: PreferredRepresentation,
}

impl DecodeParameters for CurveOnParametricSurface {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("curve on surface", 5)?;
        Ok(Self {
            creation: CurveCreation::from_code(reader.integer("creation")?)?,
            surface: reader.reference("surface")?,
            parameter_curve: reader.pointer("parameter curve")?,
            model_curve: reader.pointer("model curve")?,
            preferred: PreferredRepresentation::from_code(reader.integer("preferred representation")?)?,
        })
    }
}

impl CurveOnParametricSurface {
    pub fn creation(&self) -> CurveCreation {
        self.creation
    }

    pub fn preferred(&self) -> PreferredRepresentation {
        self.preferred
    }

    pub fn surface_ref(&self) -> DeRef {
        self.surface
    }

    pub fn parameter_curve_ref(&self) -> Option<DeRef> {
        self.parameter_curve
    }

    pub fn model_curve_ref(&self) -> Option<DeRef> {
        self.model_curve
    }

    pub fn surface<'g>(&self, graph: &'g ModelGraph) -> Result<&'g Entity> {
        graph.resolve(self.surface)
    }

    /// `B(t)`, the curve in the surface's parameter space
    pub fn curve<'g>(&self, graph: &'g ModelGraph) -> Result<Option<&'g Entity>> {
        graph.resolve_optional(self.parameter_curve)
    }

    /// `C(t)`, the curve in model space
    pub fn model_curve<'g>(&self, graph: &'g ModelGraph) -> Result<Option<&'g Entity>> {
        graph.resolve_optional(self.model_curve)
    }
}
