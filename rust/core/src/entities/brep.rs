// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! B-Rep topology entities: Vertex List (502), Edge List (504), Loop (508), Face (510)
//!
//! Edges and loops address list members by 1-based index into a referenced
//! list entity. Index lookups fail with [`Error::IndexOutOfRange`].

use nalgebra::Point3;
use smallvec::SmallVec;

use crate::decoder::{derived_len, DecodeParameters, ParamReader};
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::graph::ModelGraph;
use crate::record::{DeRef, DirectoryEntry};

/// Resolve a 1-based list index
#[inline]
fn list_member<T>(de: DeRef, items: &[T], index: usize) -> Result<&T> {
    index
        .checked_sub(1)
        .and_then(|offset| items.get(offset))
        .ok_or(Error::IndexOutOfRange {
            de,
            index,
            len: items.len(),
        })
}

/// Vertex List (502)
#[derive(Debug, Clone, PartialEq)]
pub struct VertexList {
    de: DeRef,
    vertices: Vec<Point3<f64>>,
}

impl DecodeParameters for VertexList {
    fn decode(directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        let count = reader.count("vertex count")?;
        Ok(Self {
            de: directory.de,
            vertices: reader.points("vertices", count)?,
        })
    }
}

impl VertexList {
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex by 1-based index
    pub fn vertex(&self, index: usize) -> Result<Point3<f64>> {
        list_member(self.de, &self.vertices, index).copied()
    }
}

/// One edge of an [`EdgeList`]
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Model space curve
    pub curve: DeRef,
    pub start_list: DeRef,
    pub start_index: usize,
    pub end_list: DeRef,
    pub end_index: usize,
}

impl Edge {
    pub fn curve<'g>(&self, graph: &'g ModelGraph) -> Result<&'g Entity> {
        graph.resolve(self.curve)
    }

    pub fn start_vertex(&self, graph: &ModelGraph) -> Result<Point3<f64>> {
        graph
            .resolve_as::<VertexList>(self.start_list)?
            .vertex(self.start_index)
    }

    pub fn end_vertex(&self, graph: &ModelGraph) -> Result<Point3<f64>> {
        graph
            .resolve_as::<VertexList>(self.end_list)?
            .vertex(self.end_index)
    }
}

/// Edge List (504)
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeList {
    de: DeRef,
    edges: Vec<Edge>,
}

impl DecodeParameters for EdgeList {
    fn decode(directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        let count = reader.count("edge count")?;
        reader.require("edges", derived_len("edges", count.checked_mul(5))?)?;
        let mut edges = Vec::with_capacity(count);
        for _ in 0..count {
            edges.push(Edge {
                curve: reader.reference("edge curve")?,
                start_list: reader.reference("start vertex list")?,
                start_index: reader.count("start vertex index")?,
                end_list: reader.reference("end vertex list")?,
                end_index: reader.count("end vertex index")?,
            });
        }
        Ok(Self {
            de: directory.de,
            edges,
        })
    }
}

impl EdgeList {
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edge by 1-based index
    pub fn edge(&self, index: usize) -> Result<&Edge> {
        list_member(self.de, &self.edges, index)
    }
}

/// Whether a loop member names an edge or a single vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopEdgeKind {
    Edge,
    Vertex,
}

/// Parameter space image of a loop edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterCurve {
    pub isoparametric: bool,
    pub curve: DeRef,
}

/// One member of a [`Loop`]
#[derive(Debug, Clone, PartialEq)]
pub struct LoopEdge {
    pub kind: LoopEdgeKind,
    /// Edge List or Vertex List, depending on `kind`
    pub list: DeRef,
    /// 1-based index into `list`
    pub index: usize,
    /// True when the edge agrees with its model space curve direction
    pub orientation: bool,
    pub parameter_curves: SmallVec<[ParameterCurve; 2]>,
}

impl LoopEdge {
    fn read(reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("loop edges", 5)?;
        let kind = match reader.integer("edge type")? {
            0 => LoopEdgeKind::Edge,
            1 => LoopEdgeKind::Vertex,
            other => {
                return Err(Error::invalid(
                    "edge type",
                    format!("expected 0 (edge) or 1 (vertex), got {}", other),
                ))
            }
        };
        let list = reader.reference("edge list")?;
        let index = reader.count("edge index")?;
        let orientation = reader.flag("orientation")?;
        let curve_count = reader.count("parameter curve count")?;

        reader.require(
            "parameter curves",
            derived_len("parameter curves", curve_count.checked_mul(2))?,
        )?;
        let mut parameter_curves = SmallVec::with_capacity(curve_count);
        for _ in 0..curve_count {
            parameter_curves.push(ParameterCurve {
                isoparametric: reader.flag("isoparametric flag")?,
                curve: reader.reference("parameter curve")?,
            });
        }

        Ok(Self {
            kind,
            list,
            index,
            orientation,
            parameter_curves,
        })
    }

    /// Model space curve of an edge member; `None` for a vertex member
    pub fn model_curve<'g>(&self, graph: &'g ModelGraph) -> Result<Option<&'g Entity>> {
        match self.kind {
            LoopEdgeKind::Edge => {
                let edges = graph.resolve_as::<EdgeList>(self.list)?;
                edges.edge(self.index)?.curve(graph).map(Some)
            }
            LoopEdgeKind::Vertex => Ok(None),
        }
    }

    /// Position of a vertex member; `None` for an edge member
    pub fn vertex(&self, graph: &ModelGraph) -> Result<Option<Point3<f64>>> {
        match self.kind {
            LoopEdgeKind::Vertex => graph
                .resolve_as::<VertexList>(self.list)?
                .vertex(self.index)
                .map(Some),
            LoopEdgeKind::Edge => Ok(None),
        }
    }
}

/// Loop (508)
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    edges: Vec<LoopEdge>,
}

impl DecodeParameters for Loop {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        let count = reader.count("loop edge count")?;
        // Each member needs at least TYPE, EDGE, NDX, OF and K
        reader.require("loop edges", derived_len("loop edges", count.checked_mul(5))?)?;
        let edges = (0..count)
            .map(|_| LoopEdge::read(reader))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { edges })
    }
}

impl Loop {
    pub fn edges(&self) -> &[LoopEdge] {
        &self.edges
    }

    /// Model space curves of the edge members, in loop order
    pub fn model_curves<'g>(&self, graph: &'g ModelGraph) -> Result<Vec<&'g Entity>> {
        let mut curves = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            if let Some(curve) = edge.model_curve(graph)? {
                curves.push(curve);
            }
        }
        Ok(curves)
    }
}

/// Face (510)
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    surface: DeRef,
    outer_loop: bool,
    loops: SmallVec<[DeRef; 4]>,
}

impl DecodeParameters for Face {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("face", 3)?;
        let surface = reader.reference("surface")?;
        let count = reader.count("loop count")?;
        let outer_loop = reader.flag("outer loop flag")?;
        Ok(Self {
            surface,
            outer_loop,
            loops: reader.references("loops", count)?,
        })
    }
}

impl Face {
    pub fn surface_ref(&self) -> DeRef {
        self.surface
    }

    pub fn loop_refs(&self) -> &[DeRef] {
        &self.loops
    }

    /// True when the first loop is the outer loop
    pub fn has_outer_loop(&self) -> bool {
        self.outer_loop
    }

    pub fn surface<'g>(&self, graph: &'g ModelGraph) -> Result<&'g Entity> {
        graph.resolve(self.surface)
    }

    pub fn loops<'g>(&self, graph: &'g ModelGraph) -> Result<Vec<&'g Loop>> {
        self.loops
            .iter()
            .map(|&de| graph.resolve_as::<Loop>(de))
            .collect()
    }

    pub fn outer_loop<'g>(&self, graph: &'g ModelGraph) -> Result<Option<&'g Loop>> {
        match self.loops.first() {
            Some(&de) if self.outer_loop => graph.resolve_as::<Loop>(de).map(Some),
            _ => Ok(None),
        }
    }
}
