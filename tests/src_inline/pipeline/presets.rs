use super::*;
use crate::input::DrawGraphInfo;
use crate::pipeline::fixtures::{matrix, small_data};

#[test]
fn test_simple_presets_set_basis() {
    let data = small_data();
    let params = Preset::Umap
        .prepare(&data, EmbeddingParams::default())
        .unwrap();
    assert_eq!(params.basis, "umap");
    let params = Preset::Diffmap
        .prepare(&data, EmbeddingParams::default())
        .unwrap();
    assert_eq!(params.basis, "diffmap");
}

#[test]
fn test_pca_variance_labels() {
    let data = small_data();
    let params = Preset::Pca {
        annotate_var_explained: true,
    }
    .prepare(&data, EmbeddingParams::default())
    .unwrap();
    assert_eq!(params.basis, "pca");
    assert_eq!(params.axis_label_map["PC1"], "PC1 (12.34%)");
    assert_eq!(params.axis_label_map.len(), 5);

    let mut bare = small_data();
    bare.uns.pca = None;
    assert!(matches!(
        Preset::Pca {
            annotate_var_explained: true
        }
        .prepare(&bare, EmbeddingParams::default()),
        Err(PlotError::MissingVarianceRatio)
    ));
    assert!(Preset::Pca {
        annotate_var_explained: false
    }
    .prepare(&bare, EmbeddingParams::default())
    .unwrap()
    .axis_label_map
    .is_empty());
}

#[test]
fn test_pca_variance_labels_keep_a_decimal() {
    let mut data = small_data();
    data.uns.pca.as_mut().unwrap().variance_ratio = vec![0.12, 0.05];
    let params = Preset::Pca {
        annotate_var_explained: true,
    }
    .prepare(&data, EmbeddingParams::default())
    .unwrap();
    assert_eq!(params.axis_label_map["PC1"], "PC1 (12.0%)");
    assert_eq!(params.axis_label_map["PC2"], "PC2 (5.0%)");
}

#[test]
fn test_draw_graph_layout_resolution() {
    let mut data = small_data();
    assert!(matches!(
        Preset::DrawGraph { layout: None }.prepare(&data, EmbeddingParams::default()),
        Err(PlotError::MissingDrawGraphLayout)
    ));
    data.uns.draw_graph = Some(DrawGraphInfo {
        layout: "fa".to_string(),
    });
    assert!(matches!(
        Preset::DrawGraph { layout: None }.prepare(&data, EmbeddingParams::default()),
        Err(PlotError::MissingDrawGraph { .. })
    ));
    data.obsm
        .insert("X_draw_graph_fa".to_string(), matrix(data.n_obs, 2));
    let params = Preset::DrawGraph { layout: None }
        .prepare(&data, EmbeddingParams::default())
        .unwrap();
    assert_eq!(params.basis, "draw_graph_fa");
}
