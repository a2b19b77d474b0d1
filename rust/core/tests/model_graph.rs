// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use iges_lite_core::{
    parse_number, Boundary, BoundedSurface, Color, CompositeCurve, CurveOnParametricSurface,
    DeRef, DirectoryEntry, EdgeList, EntityKind, EntityRecord, Error, Face, GraphConfig, Line,
    Loop, ModelGraph, ParameterRecord, PropertyEntity, RationalBSplineCurve, SingularSubfigureInstance,
    Subfigure, TrimmedSurface,
};
use nalgebra::{Point3, Vector3};
use std::fs;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = PathBuf::from(manifest_dir).join("tests").join("data").join(name);
    if !path.exists() {
        panic!("Test fixture not found at: {}", path.display());
    }
    path
}

/// Load `<DE> <form> <transformation DE> <parameter text>` lines
fn load_records(name: &str) -> Vec<EntityRecord> {
    let content = fs::read_to_string(fixture_path(name)).unwrap();
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| {
            let mut parts = line.splitn(4, ' ');
            let de: u32 = parts.next().unwrap().parse().unwrap();
            let form: u16 = parts.next().unwrap().parse().unwrap();
            let transform: u32 = parts.next().unwrap().parse().unwrap();
            let parameters = ParameterRecord::parse(parts.next().unwrap()).unwrap();

            let mut directory = DirectoryEntry::new(de, parameters.type_code().unwrap(), form);
            if transform != 0 {
                directory = directory.with_transform(transform);
            }
            EntityRecord::new(directory, parameters)
        })
        .collect()
}

fn square_face() -> ModelGraph {
    ModelGraph::build(load_records("square_face.txt"), &GraphConfig::default()).unwrap()
}

fn record(de: u32, tokens: &[&str]) -> EntityRecord {
    EntityRecord::from_parameters(de, ParameterRecord::from_tokens(tokens.iter().copied())).unwrap()
}

fn bspline_tokens() -> Vec<&'static str> {
    let mut tokens = vec!["126", "3", "3", "0", "0", "1", "0"];
    tokens.extend(["0", "0", "0", "0", "1", "1", "1", "1"]);
    tokens.extend(["1", "1", "1", "1"]);
    tokens.extend(["0", "0", "0", "1", "1", "0", "2", "1", "0", "3", "0", "0"]);
    tokens.extend(["0", "1"]);
    tokens
}

#[test]
fn test_fortran_exponent_matches_standard_notation() {
    for literal in ["1.2E3", "-4.5E-2", "6E0", "0.125e+10", "7.5E1"] {
        let legacy = literal.replace(['E', 'e'], "D");
        assert_eq!(parse_number(&legacy).unwrap(), parse_number(literal).unwrap());
    }
    assert_eq!(parse_number("1.2D3").unwrap(), 1200.0);
    assert!(matches!(
        parse_number("1.2Q3"),
        Err(Error::NumericFormat { .. })
    ));
}

#[test]
fn test_line_end_to_end() {
    let records = vec![record(1, &["110", "1", "2", "3", "4", "5", "6"])];
    let graph = ModelGraph::from_records(records).unwrap();
    let line = graph.resolve_as::<Line>(DeRef::new(1)).unwrap();
    assert_eq!(line.start(), Point3::new(1.0, 2.0, 3.0));
    assert_eq!(line.end(), Point3::new(4.0, 5.0, 6.0));
}

#[test]
fn test_line_extra_token_is_left_unconsumed() {
    // Token 0 is always the type number, so a seventh value is surplus
    let records = vec![record(1, &["110", "1", "1", "2", "3", "4", "5", "6"])];
    let graph = ModelGraph::build(records, &GraphConfig::strict()).unwrap();
    let entity = graph.resolve(DeRef::new(1)).unwrap();
    let line = graph.resolve_as::<Line>(DeRef::new(1)).unwrap();

    assert_eq!(line.start(), Point3::new(1.0, 1.0, 2.0));
    assert_eq!(line.end(), Point3::new(3.0, 4.0, 5.0));
    assert_eq!(entity.parameters().len(), 8);
    assert_eq!(entity.pointer_slots(), &[false; 8]);
}

#[test]
fn test_blank_padded_hollerith_names() {
    let records = vec![
        EntityRecord::from_parameters(1, ParameterRecord::parse("308,0,8HBRACE   ,0;").unwrap())
            .unwrap(),
        EntityRecord::from_parameters(3, ParameterRecord::parse("314,100.,0.,0.,5HRED  ;").unwrap())
            .unwrap(),
    ];
    let graph = ModelGraph::build(records, &GraphConfig::strict()).unwrap();

    let subfigure = graph.resolve_as::<Subfigure>(DeRef::new(1)).unwrap();
    assert_eq!(subfigure.name(), "BRACE   ");
    assert!(subfigure.members(&graph).unwrap().is_empty());

    let color = graph.resolve_as::<Color>(DeRef::new(3)).unwrap();
    assert_eq!(color.name(), Some("RED  "));
}

#[test]
fn test_short_hollerith_name_is_malformed() {
    let records = vec![record(1, &["308", "0", "8HBRACE", "0"])];
    let graph = ModelGraph::from_records(records).unwrap();
    let (entity, error) = graph.malformed().next().unwrap();
    assert_eq!(entity.de(), DeRef::new(1));
    assert!(matches!(error.root_cause(), Error::Parse(_)));
}

#[test]
fn test_bspline_value_dependent_lengths() {
    let graph = ModelGraph::build(vec![record(1, &bspline_tokens())], &GraphConfig::strict())
        .unwrap();
    let curve = graph.resolve_as::<RationalBSplineCurve>(DeRef::new(1)).unwrap();
    assert_eq!(curve.upper_index(), 3);
    assert_eq!(curve.degree(), 3);
    assert_eq!(curve.knots().len(), 8);
    assert_eq!(curve.weights().len(), 4);
    assert_eq!(curve.control_points().len(), 4);
}

#[test]
fn test_bspline_truncated_knots() {
    let tokens = bspline_tokens();
    let records = vec![record(1, &tokens[..14])];

    let err = ModelGraph::build(records.clone(), &GraphConfig::strict()).unwrap_err();
    assert_eq!(
        err.root_cause(),
        &Error::ParameterCount {
            field: "knots",
            declared: 8,
            available: 7
        }
    );
    assert!(err.to_string().contains("declared 8 parameters, 7 available"));

    // Lenient builds keep going with a placeholder
    let graph = ModelGraph::from_records(records).unwrap();
    assert_eq!(graph.len(), 1);
    assert_eq!(
        graph.resolve(DeRef::new(1)).unwrap().kind(),
        EntityKind::Malformed
    );
}

#[test]
fn test_unknown_type_keeps_tokens() {
    let tokens = ["999", "7", "1.5", "3HABC"];
    let graph = ModelGraph::build(vec![record(1, &tokens)], &GraphConfig::strict()).unwrap();
    let entity = graph.resolve(DeRef::new(1)).unwrap();
    assert!(entity.is_unsupported());
    assert_eq!(entity.type_code(), 999);
    assert_eq!(entity.parameters().tokens(), &tokens);
    assert_eq!(entity.pointer_slots(), &[false; 4]);
}

#[test]
fn test_cyclic_references_resolve() {
    // Boundary (1) -> bounded surface (3) -> boundary (1), forward reference first
    let graph = ModelGraph::build(
        vec![
            record(1, &["141", "0", "1", "3", "1", "5", "1", "0"]),
            record(3, &["143", "0", "1", "1", "1"]),
            record(5, &["110", "0", "0", "0", "1", "0", "0"]),
        ],
        &GraphConfig::strict(),
    )
    .unwrap();

    let boundary = graph.resolve_as::<Boundary>(DeRef::new(1)).unwrap();
    let surface = boundary.surface(&graph).unwrap();
    assert_eq!(surface.kind(), EntityKind::BoundedSurface);

    let bounded = surface.expect_variant::<BoundedSurface>().unwrap();
    let back = bounded.boundaries(&graph).unwrap();
    assert!(std::ptr::eq(back[0], boundary));
}

#[test]
fn test_resolution_returns_shared_entity() {
    let graph = square_face();
    let first = graph.resolve(DeRef::new(17)).unwrap();
    let second = graph.resolve(DeRef::new(17)).unwrap();
    assert!(std::ptr::eq(first, second));

    let via_face = graph
        .resolve_as::<Face>(DeRef::new(19))
        .unwrap()
        .loops(&graph)
        .unwrap()[0];
    assert!(std::ptr::eq(
        via_face,
        first.as_variant::<Loop>().unwrap()
    ));
}

#[test]
fn test_missing_reference_is_reported() {
    let graph = square_face();
    assert_eq!(
        graph.resolve(DeRef::new(2)).unwrap_err(),
        Error::UnresolvedReference(DeRef::new(2))
    );

    let dangling = ModelGraph::from_records(vec![
        record(1, &["102", "2", "3", "41"]),
        record(3, &["110", "0", "0", "0", "1", "0", "0"]),
    ])
    .unwrap();
    let composite = dangling.resolve_as::<CompositeCurve>(DeRef::new(1)).unwrap();
    assert_eq!(
        composite.curves(&dangling).unwrap_err(),
        Error::UnresolvedReference(DeRef::new(41))
    );
}

#[test]
fn test_fixture_inventory() {
    let graph = square_face();
    assert_eq!(graph.len(), 20);

    let counts = graph.kind_counts();
    assert_eq!(counts[&EntityKind::Line], 4);
    assert_eq!(counts[&EntityKind::Unsupported], 1);
    assert_eq!(counts[&EntityKind::Malformed], 1);

    let (broken, error) = graph.malformed().next().unwrap();
    assert_eq!(broken.de(), DeRef::new(39));
    assert!(matches!(
        error,
        Error::Entity {
            type_code: 110,
            ..
        }
    ));

    // Every pointer slot array stays parallel to its token list
    for entity in &graph {
        assert_eq!(entity.pointer_slots().len(), entity.parameters().len());
    }

    let order: Vec<u32> = graph
        .entities_of_kind(EntityKind::Line)
        .map(|e| e.de().get())
        .collect();
    assert_eq!(order, vec![5, 7, 9, 11]);
}

#[test]
fn test_fixture_strict_build_names_bad_record() {
    let err = ModelGraph::build(load_records("square_face.txt"), &GraphConfig::strict())
        .unwrap_err();
    match err {
        Error::Entity { de, type_code, .. } => {
            assert_eq!(de, DeRef::new(39));
            assert_eq!(type_code, 110);
        }
        other => panic!("expected entity context, got {:?}", other),
    }
}

#[test]
fn test_face_topology_chain() {
    let graph = square_face();
    let face = graph.resolve_as::<Face>(DeRef::new(19)).unwrap();
    assert_eq!(
        face.surface(&graph).unwrap().kind(),
        EntityKind::RationalBSplineSurface
    );

    let outer = face.outer_loop(&graph).unwrap().unwrap();
    let curves: Vec<&Line> = outer
        .model_curves(&graph)
        .unwrap()
        .into_iter()
        .map(|curve| curve.expect_variant::<Line>().unwrap())
        .collect();
    assert_eq!(curves.len(), 4);

    // Consecutive edges share endpoints around the square
    for (current, next) in curves.iter().zip(curves.iter().cycle().skip(1)) {
        assert_eq!(current.end(), next.start());
    }

    let edges = graph.resolve_as::<EdgeList>(DeRef::new(15)).unwrap();
    for edge in edges.edges() {
        let line = edge.curve(&graph).unwrap().expect_variant::<Line>().unwrap();
        assert_eq!(edge.start_vertex(&graph).unwrap(), line.start());
        assert_eq!(edge.end_vertex(&graph).unwrap(), line.end());
    }
}

#[test]
fn test_trimmed_surface_chain() {
    let graph = square_face();
    let trimmed = graph.resolve_as::<TrimmedSurface>(DeRef::new(25)).unwrap();
    let outer = trimmed.outer_boundary(&graph).unwrap().unwrap();
    let on_surface = outer.expect_variant::<CurveOnParametricSurface>().unwrap();
    assert!(on_surface.curve(&graph).unwrap().is_none());

    let model = on_surface.model_curve(&graph).unwrap().unwrap();
    let composite = model.expect_variant::<CompositeCurve>().unwrap();
    assert_eq!(composite.curves(&graph).unwrap().len(), 4);
    assert!(trimmed.inner_boundaries(&graph).unwrap().is_empty());
}

#[test]
fn test_directory_transformation() {
    let graph = square_face();
    let edge = graph.resolve(DeRef::new(9)).unwrap();
    let line = edge.expect_variant::<Line>().unwrap();
    let transform = edge.transformation(&graph).unwrap().unwrap();
    assert_eq!(transform.apply(&line.start()), Point3::new(11.0, 1.0, 0.0));

    let untransformed = graph.resolve(DeRef::new(5)).unwrap();
    assert!(untransformed.transformation(&graph).unwrap().is_none());
}

#[test]
fn test_structure_entities() {
    let graph = square_face();

    let color = graph.resolve_as::<Color>(DeRef::new(27)).unwrap();
    assert_eq!(color.rgb(), [1.0, 0.0, 0.0]);
    assert_eq!(color.name(), Some("RED"));

    let instance = graph
        .resolve_as::<SingularSubfigureInstance>(DeRef::new(31))
        .unwrap();
    assert_eq!(instance.translation(), &Vector3::new(10.0, 0.0, 0.0));
    assert_eq!(instance.scale(), 2.0);

    let definition: &Subfigure = instance.definition(&graph).unwrap();
    assert_eq!(definition.name(), "A,B;C D");
    assert_eq!(definition.members(&graph).unwrap().len(), 2);

    let property = graph.resolve_as::<PropertyEntity>(DeRef::new(33)).unwrap();
    assert_eq!(property.form(), 1);
    assert_relative_eq!(property.number(0).unwrap(), 1.5);
    assert_eq!(property.string(1).unwrap(), "NOTE");
}

#[test]
fn test_planar_bspline_normal() {
    let graph = square_face();
    let curve = graph.resolve_as::<RationalBSplineCurve>(DeRef::new(37)).unwrap();
    assert_eq!(curve.normal(), Some(Vector3::new(0.0, 0.0, 1.0)));
    assert_eq!(curve.parameter_range(), (0.0, 1.0));
}

#[test]
fn test_parallel_build_matches_serial() {
    let records = load_records("square_face.txt");
    let serial = ModelGraph::build(records.clone(), &GraphConfig::default().with_parallel(false))
        .unwrap();
    let parallel = ModelGraph::build(records, &GraphConfig::default().with_parallel_threshold(0))
        .unwrap();
    assert_eq!(serial.entities(), parallel.entities());

    let shared = std::sync::Arc::new(parallel);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let graph = std::sync::Arc::clone(&shared);
            std::thread::spawn(move || graph.resolve_as::<Face>(DeRef::new(19)).is_ok())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
