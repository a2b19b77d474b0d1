// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IGES-Lite Core
//!
//! Decoder for the parameter data of IGES files and the cross-referenced
//! entity graph it populates.
//!
//! ## Overview
//!
//! - **Parameter splitting**: Hollerith-aware free-format splitting built with [nom](https://docs.rs/nom)
//! - **Value decoding**: FORTRAN `D` exponents, pointers, Hollerith strings
//! - **Typed entities**: one decoder per supported type number, with
//!   value-dependent array lengths checked before any token is read
//! - **Model graph**: entities indexed by directory entry, references
//!   resolved lazily through the graph
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use iges_lite_core::{EntityRecord, Line, ModelGraph, ParameterRecord};
//!
//! // One record per directory entry, as produced by the file tokenizer
//! let line = ParameterRecord::parse("110,0.,0.,0.,1.D1,0.,0.;")?;
//! let records = vec![EntityRecord::from_parameters(1, line)?];
//!
//! let graph = ModelGraph::from_records(records)?;
//! for (entity, line) in graph.entities_of::<Line>() {
//!     println!("{}: {:?} -> {:?}", entity.de(), line.start(), line.end());
//! }
//! ```
//!
//! ## Following references
//!
//! Entities store pointers as [`DeRef`] values. Accessors that follow them
//! take the graph explicitly and report dangling pointers as
//! [`Error::UnresolvedReference`]:
//!
//! ```rust,ignore
//! use iges_lite_core::{DeRef, Face};
//!
//! let face = graph.resolve_as::<Face>(DeRef::new(41))?;
//! for lp in face.loops(&graph)? {
//!     for curve in lp.model_curves(&graph)? {
//!         println!("edge curve {}", curve.kind());
//!     }
//! }
//! ```
//!
//! ## Error policy
//!
//! By default a record that fails to decode becomes a
//! [`EntityKind::Malformed`] placeholder and the rest of the file still
//! loads; [`GraphConfig::strict`] turns the first failure into an error.
//! Unknown type numbers are never errors: they decode as
//! [`EntityKind::Unsupported`] with their raw tokens kept.

pub mod config;
pub mod decoder;
pub mod entities;
pub mod entity;
pub mod error;
pub mod graph;
pub mod parser;
pub mod record;
pub mod schema;
pub mod values;

pub use config::{ErrorPolicy, GraphConfig};
pub use decoder::{decode, DecodeParameters, DecodedParameters, ParamReader};
pub use entities::*;
pub use entity::{Entity, EntityData, EntityVariant};
pub use error::{Error, Result};
pub use graph::ModelGraph;
pub use parser::split_parameters;
pub use record::{DeRef, DirectoryEntry, EntityRecord, ParameterRecord};
pub use schema::EntityKind;
pub use values::{parse_flag, parse_integer, parse_number, parse_pointer, parse_string};
