use crate::square_mesh_4x4;
use fenics_ice::error::Error;
use fenics_ice::space::{is_automatic_name, Function, FunctionSpace, SpaceKind};
use matrixcompare::assert_scalar_eq;
use nalgebra::Point2;
use std::sync::Arc;

#[test]
fn lagrange1_dofs_are_mesh_vertices() {
    let mesh = Arc::new(square_mesh_4x4());
    let space = FunctionSpace::lagrange1(mesh.clone());

    assert_eq!(space.kind(), SpaceKind::Lagrange1);
    assert_eq!(space.dim(), 25);
    assert_eq!(space.tabulate_dof_coordinates(), mesh.vertices());
    assert_eq!(space.cell_dofs(3), mesh.connectivity()[3].vertex_indices().to_vec());
}

#[test]
fn dg0_dofs_are_cell_centroids() {
    let mesh = Arc::new(square_mesh_4x4());
    let space = FunctionSpace::dg0(mesh.clone());

    assert_eq!(space.kind(), SpaceKind::Dg0);
    assert_eq!(space.dim(), 32);
    assert_eq!(space.cell_dofs(7), vec![7]);

    // The first cell is the lower-right half of the unit square at the origin
    let centroid = space.tabulate_dof_coordinates()[0];
    assert_scalar_eq!(centroid.x, 2.0 / 3.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(centroid.y, 1.0 / 3.0, comp = abs, tol = 1e-14);
    assert!(Arc::ptr_eq(space.mesh(), &mesh));
}

#[test]
fn functions_have_one_value_per_dof() {
    let space = Arc::new(FunctionSpace::lagrange1(Arc::new(square_mesh_4x4())));

    let zero = Function::new(space.clone(), "zero");
    assert!(zero.values().iter().all(|&v| v == 0.0));

    let mut constant = Function::constant(space.clone(), "c", 2.5);
    assert_eq!(constant.values().len(), 25);
    constant.values_mut()[0] = 1.0;
    assert_eq!(constant.values()[0], 1.0);

    let wrong = Function::from_values(space.clone(), "w", vec![1.0; 24]);
    assert!(matches!(wrong, Err(Error::DimensionMismatch(_))));

    let values: Vec<_> = space.tabulate_dof_coordinates().iter().map(|p: &Point2<f64>| p.x).collect();
    let x = Function::from_values(space.clone(), "x", values).unwrap();
    assert_eq!(x.values()[4], 4.0);
    assert!(Arc::ptr_eq(x.space(), &space));
}

#[test]
fn unnamed_functions_get_automatic_names() {
    let space = Arc::new(FunctionSpace::dg0(Arc::new(square_mesh_4x4())));
    let mut f = Function::unnamed(space.clone());
    let g = Function::unnamed(space);

    assert!(f.name().starts_with("f_"));
    assert_ne!(f.name(), g.name());
    assert!(!f.is_named());

    f.rename("thick");
    assert!(f.is_named());
    assert_eq!(f.name(), "thick");
}

#[test]
fn automatic_names_require_a_digit() {
    assert!(is_automatic_name("f_0"));
    assert!(is_automatic_name("f_12abc"));
    assert!(!is_automatic_name("f_"));
    assert!(!is_automatic_name("f_x"));
    assert!(!is_automatic_name("bed"));
}
