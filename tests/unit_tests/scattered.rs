use fenics_ice::error::Error;
use fenics_ice::scattered::ScatteredPointSet;
use nalgebra::Point2;

#[test]
fn from_coordinates_pairs_up_points() {
    let point_set = ScatteredPointSet::from_coordinates(&[0.0, 1.0, 2.0], &[3.0, 4.0, 5.0]).unwrap();
    assert_eq!(point_set.num_points(), 3);
    assert_eq!(point_set.points()[1], Point2::new(1.0, 4.0));
}

#[test]
fn from_coordinates_rejects_unequal_lengths() {
    let result = ScatteredPointSet::from_coordinates(&[0.0, 1.0], &[3.0]);
    assert!(matches!(result, Err(Error::DimensionMismatch(_))));
}

#[test]
fn value_arrays_are_named_and_checked() {
    let point_set = ScatteredPointSet::from_coordinates(&[0.0, 1.0], &[0.0, 1.0])
        .unwrap()
        .with_values("v", vec![2.0, 3.0])
        .unwrap()
        .with_values("u", vec![0.0, 1.0])
        .unwrap();

    assert_eq!(point_set.values("u"), Some(&[0.0, 1.0][..]));
    assert_eq!(point_set.values("w"), None);
    assert_eq!(point_set.value_names().collect::<Vec<_>>(), vec!["u", "v"]);
    assert!(matches!(
        point_set.try_values("w"),
        Err(Error::MissingField { name }) if name == "w"
    ));

    let replaced = point_set.clone().with_values("u", vec![5.0, 6.0]).unwrap();
    assert_eq!(replaced.try_values("u").unwrap(), &[5.0, 6.0]);

    let too_short = point_set.with_values("x", vec![1.0]);
    assert!(matches!(too_short, Err(Error::DimensionMismatch(_))));
}
