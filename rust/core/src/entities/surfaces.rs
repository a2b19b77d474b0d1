// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface entities: 120, 122, 128, 141, 143, 144
//!
//! Boundaries and the surfaces they bound usually point at each other, so
//! nothing here resolves during decoding.

use nalgebra::Point3;
use smallvec::SmallVec;

use crate::decoder::{derived_len, DecodeParameters, ParamReader};
use crate::entities::Line;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::graph::ModelGraph;
use crate::record::{DeRef, DirectoryEntry};

/// Surface of Revolution (120)
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOfRevolution {
    axis: DeRef,
    generatrix: DeRef,
    start_angle: f64,
    end_angle: f64,
}

impl DecodeParameters for SurfaceOfRevolution {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("surface of revolution", 4)?;
        Ok(Self {
            axis: reader.reference("axis")?,
            generatrix: reader.reference("generatrix")?,
            start_angle: reader.number("start angle")?,
            end_angle: reader.number("end angle")?,
        })
    }
}

impl SurfaceOfRevolution {
    pub fn axis_ref(&self) -> DeRef {
        self.axis
    }

    pub fn generatrix_ref(&self) -> DeRef {
        self.generatrix
    }

    /// `(start, end)` in radians
    pub fn angles(&self) -> (f64, f64) {
        (self.start_angle, self.end_angle)
    }

    /// Axis of rotation
    pub fn axis<'g>(&self, graph: &'g ModelGraph) -> Result<&'g Line> {
        graph.resolve_as::<Line>(self.axis)
    }

    pub fn generatrix<'g>(&self, graph: &'g ModelGraph) -> Result<&'g Entity> {
        graph.resolve(self.generatrix)
    }
}

/// Tabulated Cylinder (122): directrix swept along a straight generatrix
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedCylinder {
    directrix: DeRef,
    line_end: Point3<f64>,
}

impl DecodeParameters for TabulatedCylinder {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("tabulated cylinder", 4)?;
        Ok(Self {
            directrix: reader.reference("directrix")?,
            line_end: reader.point("generatrix end")?,
        })
    }
}

impl TabulatedCylinder {
    pub fn directrix_ref(&self) -> DeRef {
        self.directrix
    }

    /// Terminate point of the generatrix
    pub fn line_end(&self) -> Point3<f64> {
        self.line_end
    }

    pub fn directrix<'g>(&self, graph: &'g ModelGraph) -> Result<&'g Entity> {
        graph.resolve(self.directrix)
    }
}

/// Rational B-Spline Surface (128)
///
/// Control points and weights are stored with the first parametric
/// direction varying fastest: entry `(i, j)` lives at `j * (K1 + 1) + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct RationalBSplineSurface {
    upper_index: (usize, usize),
    degree: (usize, usize),
    closed: (bool, bool),
    polynomial: bool,
    periodic: (bool, bool),
    knots_u: Vec<f64>,
    knots_v: Vec<f64>,
    weights: Vec<f64>,
    control_points: Vec<Point3<f64>>,
    parameter_range: [f64; 4],
}

fn check_degree(field: &'static str, degree: usize, upper_index: usize) -> Result<()> {
    if degree > upper_index {
        return Err(Error::invalid(
            field,
            format!("degree {} exceeds upper index {}", degree, upper_index),
        ));
    }
    Ok(())
}

fn knot_count(field: &'static str, upper_index: usize, degree: usize) -> Result<usize> {
    derived_len(
        field,
        upper_index.checked_add(degree).and_then(|n| n.checked_add(2)),
    )
}

impl DecodeParameters for RationalBSplineSurface {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("b-spline header", 9)?;
        let k1 = reader.count("upper index u")?;
        let k2 = reader.count("upper index v")?;
        let m1 = reader.count("degree u")?;
        let m2 = reader.count("degree v")?;
        check_degree("degree u", m1, k1)?;
        check_degree("degree v", m2, k2)?;

        let closed = (reader.flag("closed u flag")?, reader.flag("closed v flag")?);
        let polynomial = reader.flag("polynomial flag")?;
        let periodic = (reader.flag("periodic u flag")?, reader.flag("periodic v flag")?);

        let knots_u = reader.numbers("knots u", knot_count("knots u", k1, m1)?)?;
        let knots_v = reader.numbers("knots v", knot_count("knots v", k2, m2)?)?;

        let grid = derived_len(
            "weights",
            k1.checked_add(1)
                .zip(k2.checked_add(1))
                .and_then(|(u, v)| u.checked_mul(v)),
        )?;
        let weights = reader.numbers("weights", grid)?;
        let control_points = reader.points("control points", grid)?;

        reader.require("parameter range", 4)?;
        let mut parameter_range = [0.0; 4];
        for value in &mut parameter_range {
            *value = reader.number("parameter range")?;
        }

        Ok(Self {
            upper_index: (k1, k2),
            degree: (m1, m2),
            closed,
            polynomial,
            periodic,
            knots_u,
            knots_v,
            weights,
            control_points,
            parameter_range,
        })
    }
}

impl RationalBSplineSurface {
    /// `(K1, K2)`
    pub fn upper_index(&self) -> (usize, usize) {
        self.upper_index
    }

    /// `(M1, M2)`
    pub fn degree(&self) -> (usize, usize) {
        self.degree
    }

    /// `(closed in u, closed in v)`
    pub fn closed(&self) -> (bool, bool) {
        self.closed
    }

    pub fn is_polynomial(&self) -> bool {
        self.polynomial
    }

    /// `(periodic in u, periodic in v)`
    pub fn periodic(&self) -> (bool, bool) {
        self.periodic
    }

    pub fn knots_u(&self) -> &[f64] {
        &self.knots_u
    }

    pub fn knots_v(&self) -> &[f64] {
        &self.knots_v
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn control_points(&self) -> &[Point3<f64>] {
        &self.control_points
    }

    /// Control point `(i, j)`, `i` in `0..=K1`, `j` in `0..=K2`
    pub fn control_point(&self, i: usize, j: usize) -> Option<Point3<f64>> {
        self.grid_index(i, j).map(|index| self.control_points[index])
    }

    pub fn weight(&self, i: usize, j: usize) -> Option<f64> {
        self.grid_index(i, j).map(|index| self.weights[index])
    }

    /// `((U0, U1), (V0, V1))`
    pub fn parameter_range(&self) -> ((f64, f64), (f64, f64)) {
        let [u0, u1, v0, v1] = self.parameter_range;
        ((u0, u1), (v0, v1))
    }

    fn grid_index(&self, i: usize, j: usize) -> Option<usize> {
        let (k1, k2) = self.upper_index;
        if i > k1 || j > k2 {
            return None;
        }
        Some(j * (k1 + 1) + i)
    }
}

/// One model space curve of a [`Boundary`] with its parameter space images
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCurve {
    pub model_curve: DeRef,
    /// Orientation code: 1 agrees with the curve direction, 2 reversed
    pub sense: i64,
    pub parameter_curves: SmallVec<[DeRef; 2]>,
}

impl BoundaryCurve {
    #[inline]
    pub fn reversed(&self) -> bool {
        self.sense == 2
    }
}

/// Boundary (141): closed boundary on a surface, as model space curves and
/// optional parameter space curves
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    boundary_type: i64,
    preferred: i64,
    surface: DeRef,
    curves: Vec<BoundaryCurve>,
}

impl DecodeParameters for Boundary {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("boundary header", 4)?;
        let boundary_type = reader.integer("boundary type")?;
        let preferred = reader.integer("preferred representation")?;
        let surface = reader.reference("surface")?;
        let count = reader.count("curve count")?;

        // Each curve needs at least CRVPT, SENSE and K
        reader.require("boundary curves", derived_len("boundary curves", count.checked_mul(3))?)?;
        let mut curves = Vec::with_capacity(count);
        for _ in 0..count {
            reader.require("boundary curves", 3)?;
            let model_curve = reader.reference("model curve")?;
            let sense = reader.integer("sense")?;
            let parameter_count = reader.count("parameter curve count")?;
            let parameter_curves = reader.references("parameter curves", parameter_count)?;
            curves.push(BoundaryCurve {
                model_curve,
                sense,
                parameter_curves,
            });
        }

        Ok(Self {
            boundary_type,
            preferred,
            surface,
            curves,
        })
    }
}

impl Boundary {
    /// 0: model space curves only, 1: model and parameter space curves
    pub fn boundary_type(&self) -> i64 {
        self.boundary_type
    }

    /// 0 unspecified, 1 model space, 2 parameter space, 3 equal
    pub fn preferred(&self) -> i64 {
        self.preferred
    }

    pub fn surface_ref(&self) -> DeRef {
        self.surface
    }

    pub fn curves(&self) -> &[BoundaryCurve] {
        &self.curves
    }

    pub fn surface<'g>(&self, graph: &'g ModelGraph) -> Result<&'g Entity> {
        graph.resolve(self.surface)
    }

    /// Every model space curve, in boundary order
    pub fn model_curves<'g>(&self, graph: &'g ModelGraph) -> Result<Vec<&'g Entity>> {
        self.curves
            .iter()
            .map(|curve| graph.resolve(curve.model_curve))
            .collect()
    }

    /// Every parameter space curve of every boundary curve, flattened in order
    pub fn parameter_curves<'g>(&self, graph: &'g ModelGraph) -> Result<Vec<&'g Entity>> {
        self.curves
            .iter()
            .flat_map(|curve| curve.parameter_curves.iter())
            .map(|&de| graph.resolve(de))
            .collect()
    }
}

/// Bounded Surface (143)
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedSurface {
    boundary_type: i64,
    surface: DeRef,
    boundaries: SmallVec<[DeRef; 4]>,
}

impl DecodeParameters for BoundedSurface {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("bounded surface", 3)?;
        let boundary_type = reader.integer("boundary type")?;
        let surface = reader.reference("surface")?;
        let count = reader.count("boundary count")?;
        Ok(Self {
            boundary_type,
            surface,
            boundaries: reader.references("boundaries", count)?,
        })
    }
}

impl BoundedSurface {
    pub fn boundary_type(&self) -> i64 {
        self.boundary_type
    }

    pub fn surface_ref(&self) -> DeRef {
        self.surface
    }

    pub fn boundary_refs(&self) -> &[DeRef] {
        &self.boundaries
    }

    pub fn surface<'g>(&self, graph: &'g ModelGraph) -> Result<&'g Entity> {
        graph.resolve(self.surface)
    }

    pub fn boundaries<'g>(&self, graph: &'g ModelGraph) -> Result<Vec<&'g Boundary>> {
        self.boundaries
            .iter()
            .map(|&de| graph.resolve_as::<Boundary>(de))
            .collect()
    }
}

/// Trimmed (Parametric) Surface (144)
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedSurface {
    surface: DeRef,
    outer_specified: bool,
    outer: Option<DeRef>,
    inner: SmallVec<[DeRef; 4]>,
}

impl DecodeParameters for TrimmedSurface {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("trimmed surface", 4)?;
        let surface = reader.reference("surface")?;
        let outer_specified = reader.flag("outer boundary flag")?;
        let inner_count = reader.count("inner boundary count")?;
        let outer = reader.pointer("outer boundary")?;
        Ok(Self {
            surface,
            outer_specified,
            outer,
            inner: reader.references("inner boundaries", inner_count)?,
        })
    }
}

impl TrimmedSurface {
    pub fn surface_ref(&self) -> DeRef {
        self.surface
    }

    /// N1: false when the outer boundary is the boundary of the surface itself
    pub fn has_outer_boundary(&self) -> bool {
        self.outer_specified
    }

    pub fn outer_boundary_ref(&self) -> Option<DeRef> {
        self.outer
    }

    pub fn inner_boundary_refs(&self) -> &[DeRef] {
        &self.inner
    }

    pub fn surface<'g>(&self, graph: &'g ModelGraph) -> Result<&'g Entity> {
        graph.resolve(self.surface)
    }

    pub fn outer_boundary<'g>(&self, graph: &'g ModelGraph) -> Result<Option<&'g Entity>> {
        graph.resolve_optional(self.outer)
    }

    pub fn inner_boundaries<'g>(&self, graph: &'g ModelGraph) -> Result<Vec<&'g Entity>> {
        graph.resolve_all(&self.inner)
    }
}
