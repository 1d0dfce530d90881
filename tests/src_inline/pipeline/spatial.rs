use super::*;
use crate::pipeline::fixtures::{library, spatial_data, tiny_image};
use crate::render::recording::{DrawCall, RecordingCanvas};

#[test]
fn test_library_auto_selection() {
    let one = spatial_data(&["lib1"]);
    let selected = check_spatial_data(&one.uns.spatial, &LibrarySelection::Auto).unwrap();
    assert_eq!(selected.map(|(id, _)| id), Some("lib1"));

    let none = spatial_data(&[]);
    assert!(check_spatial_data(&none.uns.spatial, &LibrarySelection::Auto)
        .unwrap()
        .is_none());

    let two = spatial_data(&["lib1", "lib2"]);
    match check_spatial_data(&two.uns.spatial, &LibrarySelection::Auto) {
        Err(PlotError::AmbiguousLibrary { available }) => {
            assert_eq!(available, vec!["lib1".to_string(), "lib2".to_string()]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    let named =
        check_spatial_data(&two.uns.spatial, &LibrarySelection::Named("lib2".to_string()))
            .unwrap();
    assert_eq!(named.map(|(id, _)| id), Some("lib2"));
    assert!(matches!(
        check_spatial_data(&two.uns.spatial, &LibrarySelection::Named("x".to_string())),
        Err(PlotError::UnknownLibrary { .. })
    ));
    assert!(check_spatial_data(&two.uns.spatial, &LibrarySelection::Disabled)
        .unwrap()
        .is_none());
}

#[test]
fn test_image_selection_prefers_hires() {
    let lib = library(true);
    let (image, key) =
        check_img(Some(("lib1", &lib)), None, &ImageKeySelection::Auto, false).unwrap();
    assert!(image.is_some());
    assert_eq!(key.as_deref(), Some("hires"));

    let mut low_only = library(true);
    low_only.images.remove("hires");
    let (_, key) =
        check_img(Some(("lib1", &low_only)), None, &ImageKeySelection::Auto, false).unwrap();
    assert_eq!(key.as_deref(), Some("lowres"));

    let mut empty = library(true);
    empty.images.clear();
    let (image, key) =
        check_img(Some(("lib1", &empty)), None, &ImageKeySelection::Auto, false).unwrap();
    assert!(image.is_none() && key.is_none());
}

#[test]
fn test_explicit_image_and_greyscale() {
    let lib = library(true);
    let mut explicit = tiny_image();
    explicit.data[0] = 0.0;
    let (image, key) = check_img(
        Some(("lib1", &lib)),
        Some(&explicit),
        &ImageKeySelection::Auto,
        true,
    )
    .unwrap();
    let image = image.unwrap();
    assert_eq!(image.channels, 1);
    assert_eq!(image.data[0], 0.0);
    assert!((image.data[3] - 1.0).abs() < 1e-3);
    assert_eq!(key, None);

    assert!(matches!(
        check_img(
            Some(("lib1", &lib)),
            None,
            &ImageKeySelection::Named("fullres".to_string()),
            false
        ),
        Err(PlotError::UnknownImageKey { .. })
    ));
}

#[test]
fn test_spot_size_resolution() {
    assert_eq!(check_spot_size(None, Some(3.0)).unwrap(), 3.0);
    assert_eq!(check_spot_size(Some(&library(true)), None).unwrap(), 20.0);
    assert!(matches!(
        check_spot_size(None, None),
        Err(PlotError::MissingSpotSize)
    ));
    assert!(matches!(
        check_spot_size(Some(&library(false)), None),
        Err(PlotError::MissingSpotSize)
    ));
}

#[test]
fn test_scale_factor_resolution() {
    let lib = library(true);
    assert_eq!(check_scale_factor(Some(("l", &lib)), Some("hires"), Some(2.0)).unwrap(), 2.0);
    assert_eq!(check_scale_factor(Some(("l", &lib)), Some("lowres"), None).unwrap(), 0.1);
    assert_eq!(check_scale_factor(Some(("l", &lib)), None, None).unwrap(), 1.0);
    assert_eq!(check_scale_factor(None, Some("hires"), None).unwrap(), 1.0);
    assert!(matches!(
        check_scale_factor(Some(("l", &lib)), Some("fullres"), None),
        Err(PlotError::MissingScaleFactor { .. })
    ));
}

#[test]
fn test_crop_and_na_color() {
    assert_eq!(check_crop_coord(None, 2.0).unwrap(), None);
    assert_eq!(
        check_crop_coord(Some(&[1.0, 2.0, 3.0, 4.0]), 0.5).unwrap(),
        Some([0.5, 1.0, 1.5, 2.0])
    );
    assert!(matches!(
        check_crop_coord(Some(&[1.0, 2.0]), 1.0),
        Err(PlotError::InvalidCrop(2))
    ));
    assert_eq!(check_na_color(None, true), Rgba::TRANSPARENT);
    assert_eq!(check_na_color(None, false), Rgba::LIGHT_GRAY);
    assert_eq!(check_na_color(Some(Rgba::BLACK), true), Rgba::BLACK);
}

#[test]
fn test_missing_spot_size_without_metadata_is_fatal() {
    let data = spatial_data(&[]);
    let err = resolve_overlay(&data, &SpatialParams::default()).unwrap_err();
    assert!(matches!(err, PlotError::MissingSpotSize));
}

#[test]
fn test_overlay_radius() {
    let data = spatial_data(&["lib1"]);
    let params = SpatialParams {
        size: 2.0,
        ..SpatialParams::default()
    };
    let overlay = resolve_overlay(&data, &params).unwrap();
    assert_eq!(overlay.library_id.as_deref(), Some("lib1"));
    assert_eq!(overlay.scale_factor, 0.5);
    assert_eq!(overlay.spot_size, 20.0);
    assert_eq!(overlay.circle_radius, 2.0 * 0.5 * 20.0 * 0.5);
    assert_eq!(overlay.na_color, Rgba::TRANSPARENT);
}

#[test]
fn test_render_spatial_with_image() {
    let data = spatial_data(&["lib1"]);
    let mut store = PaletteStore::new();
    let mut canvas = RecordingCanvas::new();
    let report = render_spatial(&data, &mut store, &mut canvas, &SpatialParams::default()).unwrap();
    assert_eq!(report.img_key.as_deref(), Some("hires"));
    let panel = report.embedding.panels[0].panel;
    let scatter = canvas.scatters(panel)[0];
    assert_eq!(scatter.unit, SizeUnit::DataRadius);
    assert_eq!(scatter.sizes, Sizes::Uniform { value: 5.0 });
    // Coordinates are scaled into image pixels.
    assert_eq!(scatter.xs[1], 5.0);
    assert!(canvas
        .calls()
        .iter()
        .any(|c| matches!(c, DrawCall::Image { alpha, .. } if *alpha == 1.0)));
    assert!(canvas.calls().iter().any(
        |c| matches!(c, DrawCall::SetEqualAspect { panel: p } if *p == panel)
    ));
    let limits = canvas
        .calls()
        .iter()
        .find_map(|c| match c {
            DrawCall::SetLimits { y, .. } => Some(*y),
            _ => None,
        })
        .unwrap();
    assert!(limits.0 > limits.1);
}

#[test]
fn test_render_spatial_without_image_uses_equal_aspect_and_crop() {
    let data = spatial_data(&[]);
    let mut store = PaletteStore::new();
    let mut canvas = RecordingCanvas::new();
    let params = SpatialParams {
        spot_size: Some(4.0),
        crop_coord: Some(vec![0.0, 30.0, 5.0, 25.0]),
        ..SpatialParams::default()
    };
    let report = render_spatial(&data, &mut store, &mut canvas, &params).unwrap();
    assert_eq!(report.scale_factor, 1.0);
    assert_eq!(report.circle_radius, 2.0);
    assert!(canvas
        .calls()
        .iter()
        .any(|c| matches!(c, DrawCall::SetEqualAspect { .. })));
    assert!(canvas.calls().iter().any(|c| matches!(
        c,
        DrawCall::SetLimits { x, y, .. } if *x == (0.0, 30.0) && *y == (25.0, 5.0)
    )));
}
