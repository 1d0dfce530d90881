use super::*;
use crate::pipeline::fixtures::small_data;

#[test]
fn test_basis_resolves_with_prefix() {
    let data = small_data();
    assert_eq!(resolve_basis_key(&data, "umap").unwrap(), "X_umap");
    assert_eq!(resolve_basis_key(&data, "X_pca").unwrap(), "X_pca");
}

#[test]
fn test_unknown_basis_lists_available_keys() {
    let data = small_data();
    let err = resolve_basis_key(&data, "phate").unwrap_err();
    match err {
        PlotError::UnknownBasis { basis, available } => {
            assert_eq!(basis, "phate");
            assert!(available.contains(&"X_umap".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_default_selection_is_first_two_axes() {
    let data = small_data();
    let points = get_data_points(&data, "pca", Projection::TwoD, None, None).unwrap();
    assert_eq!(points.selections.len(), 1);
    let sel = &points.selections[0];
    assert_eq!(sel.components, None);
    assert_eq!(sel.coords.x(), &[0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    assert_eq!(sel.coords.y(), &[1.0, 11.0, 21.0, 31.0, 41.0, 51.0]);
}

#[test]
fn test_string_components_are_zero_based() {
    let data = small_data();
    let spec = ComponentSpec::Single("2,3".to_string());
    let points = get_data_points(&data, "pca", Projection::TwoD, Some(&spec), None).unwrap();
    assert_eq!(points.selections[0].components, Some(vec![1, 2]));
    assert_eq!(points.selections[0].coords.x()[1], 11.0);
    assert_eq!(points.selections[0].coords.y()[1], 12.0);
}

#[test]
fn test_all_components_on_four_axes() {
    let mut data = small_data();
    data.obsm
        .insert("X_four".to_string(), crate::pipeline::fixtures::matrix(6, 4));
    let points =
        get_data_points(&data, "four", Projection::TwoD, Some(&ComponentSpec::All), None).unwrap();
    let comps: Vec<_> = points
        .selections
        .iter()
        .map(|s| s.components.clone().unwrap())
        .collect();
    assert_eq!(comps.len(), 6);
    assert_eq!(comps[0], vec![0, 1]);
    assert_eq!(comps[5], vec![2, 3]);
}

#[test]
fn test_many_components_one_selection_each() {
    let data = small_data();
    let spec = ComponentSpec::Many(vec!["1,2".to_string(), "2,3".to_string()]);
    let points = get_data_points(&data, "pca", Projection::TwoD, Some(&spec), None).unwrap();
    assert_eq!(points.selections.len(), 2);
    assert_eq!(points.selections[1].components, Some(vec![1, 2]));
}

#[test]
fn test_out_of_range_component_is_fatal() {
    let data = small_data();
    let spec = ComponentSpec::Single("1,6".to_string());
    let err = get_data_points(&data, "pca", Projection::TwoD, Some(&spec), None).unwrap_err();
    assert!(matches!(err, PlotError::InvalidComponents { .. }));

    let zero = ComponentSpec::Indices(vec![0, 1]);
    let err = get_data_points(&data, "pca", Projection::TwoD, Some(&zero), None).unwrap_err();
    assert!(matches!(err, PlotError::InvalidComponents { .. }));
}

#[test]
fn test_diffmap_offset_skips_first_axis() {
    let data = small_data();
    let points = get_data_points(&data, "diffmap", Projection::TwoD, None, None).unwrap();
    assert_eq!(points.selections[0].coords.x()[1], 11.0);

    let spec = ComponentSpec::Single("1,2".to_string());
    let points = get_data_points(&data, "diffmap", Projection::TwoD, Some(&spec), None).unwrap();
    assert_eq!(points.selections[0].components, Some(vec![0, 1]));
    assert_eq!(points.selections[0].coords.x()[1], 11.0);
    assert_eq!(points.selections[0].coords.y()[1], 12.0);

    // Three usable axes after the offset.
    let all =
        get_data_points(&data, "diffmap", Projection::TwoD, Some(&ComponentSpec::All), None)
            .unwrap();
    assert_eq!(all.selections.len(), 3);
}

#[test]
fn test_three_d_downgrades_on_two_axes() {
    let data = small_data();
    let points = get_data_points(&data, "umap", Projection::ThreeD, None, None).unwrap();
    assert_eq!(points.projection, Projection::TwoD);
    assert_eq!(points.selections[0].coords.axes.len(), 2);

    let points = get_data_points(&data, "pca", Projection::ThreeD, None, None).unwrap();
    assert_eq!(points.projection, Projection::ThreeD);
    assert!(points.selections[0].coords.z().is_some());
}

#[test]
fn test_scale_factor_multiplies_first_selection() {
    let data = small_data();
    let points = get_data_points(&data, "umap", Projection::TwoD, None, Some(0.5)).unwrap();
    assert_eq!(points.selections[0].coords.x()[2], 10.0);
    assert_eq!(points.selections[0].coords.y()[2], 10.5);
}

#[test]
fn test_basis2name() {
    assert_eq!(basis2name("diffmap"), "DC");
    assert_eq!(basis2name("tsne"), "tSNE");
    assert_eq!(basis2name("umap"), "UMAP");
    assert_eq!(basis2name("pca"), "PC");
    assert_eq!(basis2name("draw_graph_fa"), "FA");
    assert_eq!(basis2name("spatial"), "spatial");
}

#[test]
fn test_axis_labels_are_one_based() {
    assert_eq!(axis_labels("umap", None, 2), vec!["UMAP1", "UMAP2"]);
    assert_eq!(axis_labels("pca", Some(&[1, 2]), 2), vec!["PC2", "PC3"]);
}

#[test]
fn test_coords_permute_roundtrip() {
    let coords = Coords {
        axes: vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
    };
    let order = [2, 0, 1];
    let mut inverse = [0usize; 3];
    for (pos, &i) in order.iter().enumerate() {
        inverse[i] = pos;
    }
    assert_eq!(coords.permute(&order).permute(&inverse), coords);
}

#[test]
fn test_combinations_count() {
    assert_eq!(combinations(5, 3).len(), 10);
    assert!(combinations(1, 2).is_empty());
}
