use fenics_ice::io::msh::{load_msh_from_bytes, load_msh_from_file};
use nalgebra::Point2;
use util::unit_test_output_dir;

/// Unit square split into two triangles, with boundary lines that must be skipped.
const UNIT_SQUARE_MSH: &str = "$MeshFormat
4.1 0 8
$EndMeshFormat
$Nodes
1 4 1 4
2 1 0 4
1
2
3
4
0.0 0.0 0.0
1.0 0.0 0.0
1.0 1.0 0.0
0.0 1.0 0.0
$EndNodes
$Elements
2 4 1 4
1 1 1 2
1 1 2
2 2 3
2 1 2 2
3 1 2 3
4 1 3 4
$EndElements
";

#[test]
fn triangles_are_read_and_lines_skipped() {
    let mesh = load_msh_from_bytes(UNIT_SQUARE_MSH.as_bytes()).unwrap();
    assert_eq!(mesh.num_vertices(), 4);
    assert_eq!(mesh.num_cells(), 2);
    assert_eq!(mesh.vertices()[2], Point2::new(1.0, 1.0));
    assert_eq!(mesh.connectivity()[0].0, [0, 1, 2]);
    assert_eq!(mesh.connectivity()[1].0, [0, 2, 3]);
    assert!(mesh.cell_iter().all(|cell| cell.signed_area() > 0.0));
}

#[test]
fn mesh_without_triangles_is_rejected() {
    let lines_only = "$MeshFormat
4.1 0 8
$EndMeshFormat
$Nodes
1 2 1 2
1 1 0 2
1
2
0.0 0.0 0.0
1.0 0.0 0.0
$EndNodes
$Elements
1 1 1 1
1 1 1 1
1 1 2
$EndElements
";
    assert!(load_msh_from_bytes(lines_only.as_bytes()).is_err());
    assert!(load_msh_from_bytes(b"not a mesh").is_err());
}

#[test]
fn mesh_is_loaded_from_file() {
    let dir = unit_test_output_dir("io/msh");
    let path = dir.join("unit_square.msh");
    std::fs::write(&path, UNIT_SQUARE_MSH).unwrap();

    let mesh = load_msh_from_file(&path).unwrap();
    assert_eq!(mesh.num_cells(), 2);
    assert!(load_msh_from_file(dir.join("missing.msh")).is_err());
}
