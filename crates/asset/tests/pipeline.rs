//! End-to-end OBJ ingestion against fixture files.

use std::path::PathBuf;

use asset::{
    BoundingExtent, MeshBuffer, ObjError, VertexLayout, load_mesh,
    obj::{load_obj_from_path, read_face_indices},
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn max_abs_coord(buffer: &MeshBuffer) -> f32 {
    buffer
        .positions()
        .flatten()
        .map(f32::abs)
        .fold(0.0, f32::max)
}

#[test]
fn reader_yields_single_triangle() {
    let faces = read_face_indices(fixture("triangle.obj")).expect("read faces");
    assert_eq!(faces.position, vec![[0, 1, 2]]);
}

#[test]
fn vertex_count_matches_face_kinds() {
    // one quad and two triangles
    let faces = read_face_indices(fixture("mixed.obj")).expect("read faces");
    assert_eq!(faces.triangle_count(), 2 + 2);
    assert_eq!(faces.position[0], [0, 1, 2]);
    assert_eq!(faces.position[1], [0, 2, 3]);

    let mesh = load_mesh(fixture("mixed.obj"), VertexLayout::PositionNormal).expect("mesh");
    assert_eq!(mesh.vertex_count(), 3 * faces.triangle_count());
}

#[test]
fn cube_normalizes_into_unit_box() {
    let mesh = load_mesh(fixture("cube.obj"), VertexLayout::PositionNormal).expect("mesh");
    assert_eq!(mesh.vertex_count(), 6 * 2 * 3);
    assert_eq!(max_abs_coord(&mesh), 1.0);

    // Longest axis (z, span 8) maps to [-1, 1]; others shrink by the same factor.
    let extent = BoundingExtent::from_buffer(&mesh);
    assert_eq!(extent.min, [-0.25, -0.5, -1.0]);
    assert_eq!(extent.max, [0.25, 0.5, 1.0]);
}

#[test]
fn cube_keeps_its_normals() {
    let source = load_obj_from_path(fixture("cube.obj")).expect("parse");
    let mesh = load_mesh(fixture("cube.obj"), VertexLayout::PositionNormal).expect("mesh");
    let first_face_normal = source.normals[0];
    for v in mesh.vertices().take(6) {
        assert_eq!([v[3], v[4], v[5]], first_face_normal);
    }
}

#[test]
fn textured_layout_carries_uvs() {
    let mesh =
        load_mesh(fixture("cube.obj"), VertexLayout::PositionNormalTexcoord).expect("mesh");
    assert_eq!(mesh.stride(), 8);
    let uvs: Vec<[f32; 2]> = mesh.vertices().take(3).map(|v| [v[6], v[7]]).collect();
    assert_eq!(uvs, vec![[0.0f32, 0.0], [0.0, 1.0], [1.0, 1.0]]);
}

#[test]
fn non_numeric_index_fails_whole_pipeline() {
    let err = load_mesh(fixture("bad_index.obj"), VertexLayout::PositionNormal).unwrap_err();
    let obj_err = err.downcast_ref::<ObjError>().expect("ObjError in chain");
    assert!(matches!(obj_err, ObjError::Parse { line: 5, .. }));
}

#[test]
fn out_of_range_index_is_fatal() {
    let err = load_mesh(fixture("out_of_range.obj"), VertexLayout::PositionNormal).unwrap_err();
    let obj_err = err.downcast_ref::<ObjError>().expect("ObjError in chain");
    assert!(matches!(
        obj_err,
        ObjError::IndexOutOfRange {
            table: "position",
            index: 8,
            ..
        }
    ));
}

#[test]
fn missing_file_reports_path() {
    let err = load_mesh(fixture("nope.obj"), VertexLayout::PositionColor).unwrap_err();
    assert!(format!("{err:#}").contains("nope.obj"));
}
