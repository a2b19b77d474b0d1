// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structure entities: transformation matrix, subfigures, color, property

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use smallvec::SmallVec;

use crate::decoder::{DecodeParameters, ParamReader};
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::graph::ModelGraph;
use crate::record::{DeRef, DirectoryEntry};
use crate::values::{parse_integer, parse_number, parse_string};

/// Transformation Matrix (124): `p' = R p + T`
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    form: u16,
    rotation: Matrix3<f64>,
    translation: Vector3<f64>,
}

impl DecodeParameters for Transformation {
    fn decode(directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("transformation", 12)?;
        let mut rotation = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        // Row-major: R(i,1) R(i,2) R(i,3) T(i)
        for row in 0..3 {
            for column in 0..3 {
                rotation[(row, column)] = reader.number("rotation")?;
            }
            translation[row] = reader.number("translation")?;
        }
        Ok(Self {
            form: directory.form,
            rotation,
            translation,
        })
    }
}

impl Transformation {
    /// Form 0: right-handed rotation (det = 1); form 1: left-handed (det = -1)
    pub fn form(&self) -> u16 {
        self.form
    }

    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    /// Homogeneous 4x4 matrix
    pub fn to_affine(&self) -> Matrix4<f64> {
        let mut affine = self.rotation.to_homogeneous();
        affine.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        affine
    }

    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    /// Rotate a direction (no translation)
    pub fn apply_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }
}

/// Subfigure Definition (308)
#[derive(Debug, Clone, PartialEq)]
pub struct Subfigure {
    depth: i64,
    name: String,
    members: SmallVec<[DeRef; 8]>,
}

impl DecodeParameters for Subfigure {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("subfigure", 3)?;
        let depth = reader.integer("depth")?;
        let name = reader.string("name")?;
        let count = reader.count("member count")?;
        Ok(Self {
            depth,
            name,
            members: reader.references("members", count)?,
        })
    }
}

impl Subfigure {
    /// Nesting depth; 0 when no member is itself a subfigure instance
    pub fn depth(&self) -> i64 {
        self.depth
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member_refs(&self) -> &[DeRef] {
        &self.members
    }

    pub fn members<'g>(&self, graph: &'g ModelGraph) -> Result<Vec<&'g Entity>> {
        graph.resolve_all(&self.members)
    }
}

/// Color Definition (314)
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    components: [f64; 3],
    name: Option<String>,
}

impl DecodeParameters for Color {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        reader.require("color", 3)?;
        Ok(Self {
            components: [
                reader.number("red")?,
                reader.number("green")?,
                reader.number("blue")?,
            ],
            name: reader.optional_string()?,
        })
    }
}

impl Color {
    /// Red, green, blue as percentages (0 to 100)
    pub fn components(&self) -> [f64; 3] {
        self.components
    }

    /// Red, green, blue scaled to 0 to 1
    pub fn rgb(&self) -> [f64; 3] {
        self.components.map(|c| (c / 100.0).clamp(0.0, 1.0))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Property (406)
///
/// Value meaning depends on the form number, so values stay as raw tokens
/// and are interpreted on access.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntity {
    de: DeRef,
    form: u16,
    values: Vec<String>,
}

impl DecodeParameters for PropertyEntity {
    fn decode(directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        let count = reader.count("property count")?;
        reader.require("property values", count)?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(reader.raw("property values")?);
        }
        Ok(Self {
            de: directory.de,
            form: directory.form,
            values,
        })
    }
}

impl PropertyEntity {
    pub fn form(&self) -> u16 {
        self.form
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value `index` (0-based) read as a number
    pub fn number(&self, index: usize) -> Result<f64> {
        parse_number(self.value(index)?)
    }

    pub fn integer(&self, index: usize) -> Result<i64> {
        parse_integer(self.value(index)?)
    }

    /// Value `index` (0-based) read as a string, Hollerith prefix removed
    pub fn string(&self, index: usize) -> Result<String> {
        parse_string(self.value(index)?)
    }

    fn value(&self, index: usize) -> Result<&str> {
        self.values
            .get(index)
            .map(String::as_str)
            .ok_or(Error::IndexOutOfRange {
                de: self.de,
                index,
                len: self.values.len(),
            })
    }
}

/// Singular Subfigure Instance (408)
#[derive(Debug, Clone, PartialEq)]
pub struct SingularSubfigureInstance {
    definition: DeRef,
    translation: Vector3<f64>,
    scale: f64,
}

impl DecodeParameters for SingularSubfigureInstance {
    fn decode(_directory: &DirectoryEntry, reader: &mut ParamReader<'_>) -> Result<Self> {
        let definition = reader.reference("subfigure")?;
        let translation = Vector3::new(
            reader.number_or(0.0)?,
            reader.number_or(0.0)?,
            reader.number_or(0.0)?,
        );
        let scale = reader.number_or(1.0)?;
        Ok(Self {
            definition,
            translation,
            scale,
        })
    }
}

impl SingularSubfigureInstance {
    pub fn definition_ref(&self) -> DeRef {
        self.definition
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Place a point of the definition into the instance
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(point.coords * self.scale + self.translation)
    }

    pub fn definition<'g>(&self, graph: &'g ModelGraph) -> Result<&'g Subfigure> {
        graph.resolve_as::<Subfigure>(self.definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::test_support::{decode, graph};
    use crate::schema::EntityKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_transformation_layout() {
        let transform: Transformation = decode(&[
            "124", "0", "-1", "0", "10", "1", "0", "0", "20", "0", "0", "1", "30",
        ])
        .unwrap();
        assert_eq!(transform.translation(), &Vector3::new(10.0, 20.0, 30.0));
        assert_eq!(transform.rotation()[(0, 1)], -1.0);
        assert_eq!(transform.rotation()[(1, 0)], 1.0);

        let moved = transform.apply(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(moved, Point3::new(10.0, 21.0, 30.0));

        let affine = transform.to_affine();
        assert_eq!(affine[(0, 3)], 10.0);
        assert_eq!(affine[(2, 3)], 30.0);
        assert_eq!(affine[(3, 3)], 1.0);
        assert_eq!(affine[(3, 0)], 0.0);
        let homogeneous = affine * Point3::new(1.0, 0.0, 0.0).to_homogeneous();
        assert_relative_eq!(Point3::from_homogeneous(homogeneous).unwrap(), moved);
    }

    #[test]
    fn test_transformation_short() {
        let err = decode::<Transformation>(&["124", "1", "0", "0"]).unwrap_err();
        assert_eq!(
            err,
            Error::ParameterCount {
                field: "transformation",
                declared: 12,
                available: 3
            }
        );
    }

    #[test]
    fn test_entity_transformation_pointer() {
        use crate::record::{EntityRecord, ParameterRecord};

        let records = vec![
            EntityRecord::new(
                DirectoryEntry::new(1, 116, 0).with_transform(3),
                ParameterRecord::from_tokens(["116", "1", "1", "1"]),
            ),
            EntityRecord::from_parameters(
                3,
                ParameterRecord::from_tokens([
                    "124", "1", "0", "0", "5", "0", "1", "0", "0", "0", "0", "1", "0",
                ]),
            )
            .unwrap(),
        ];
        let graph = ModelGraph::from_records(records).unwrap();
        let point = graph.resolve(DeRef::new(1)).unwrap();
        let transform = point.transformation(&graph).unwrap().unwrap();
        assert_eq!(transform.apply(&Point3::new(1.0, 1.0, 1.0)), Point3::new(6.0, 1.0, 1.0));
        assert!(graph
            .resolve(DeRef::new(3))
            .unwrap()
            .transformation(&graph)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_color() {
        let color: Color = decode(&["314", "100.", "50.", "0.", "6HOrange"]).unwrap();
        assert_eq!(color.rgb(), [1.0, 0.5, 0.0]);
        assert_eq!(color.name(), Some("Orange"));

        let unnamed: Color = decode(&["314", "0", "0", "100"]).unwrap();
        assert_eq!(unnamed.name(), None);
    }

    #[test]
    fn test_property_values() {
        let property: PropertyEntity = decode(&["406", "3", "2.5D1", "7", "4Hnote"]).unwrap();
        assert_eq!(property.len(), 3);
        assert_eq!(property.number(0).unwrap(), 25.0);
        assert_eq!(property.integer(1).unwrap(), 7);
        assert_eq!(property.string(2).unwrap(), "note");
        assert_eq!(
            property.number(3),
            Err(Error::IndexOutOfRange {
                de: DeRef::new(1),
                index: 3,
                len: 3
            })
        );
    }

    #[test]
    fn test_subfigure_instance_defaults() {
        let instance: SingularSubfigureInstance = decode(&["408", "5"]).unwrap();
        assert_eq!(instance.translation(), &Vector3::zeros());
        assert_eq!(instance.scale(), 1.0);

        let placed: SingularSubfigureInstance = decode(&["408", "5", "1", "", "3", "2"]).unwrap();
        assert_eq!(placed.translation(), &Vector3::new(1.0, 0.0, 3.0));
        assert_eq!(placed.apply(&Point3::new(1.0, 1.0, 1.0)), Point3::new(3.0, 2.0, 5.0));
    }

    #[test]
    fn test_subfigure_members() {
        let graph = graph(&[
            (1, &["308", "0", "5HBRACE", "2", "3", "5"]),
            (3, &["110", "0", "0", "0", "1", "0", "0"]),
            (5, &["116", "1", "0", "0"]),
            (7, &["408", "1", "10", "0", "0"]),
            (9, &["408", "3"]),
        ]);
        let instance = graph.resolve_as::<SingularSubfigureInstance>(DeRef::new(7)).unwrap();
        let definition = instance.definition(&graph).unwrap();
        assert_eq!(definition.name(), "BRACE");
        let kinds: Vec<_> = definition
            .members(&graph)
            .unwrap()
            .iter()
            .map(|e| e.kind())
            .collect();
        assert_eq!(kinds, vec![EntityKind::Line, EntityKind::Point]);

        let wrong = graph.resolve_as::<SingularSubfigureInstance>(DeRef::new(9)).unwrap();
        assert!(matches!(
            wrong.definition(&graph),
            Err(Error::UnexpectedEntity { .. })
        ));
    }
}
