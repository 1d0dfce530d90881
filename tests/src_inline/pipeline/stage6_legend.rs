use super::*;
use crate::model::Projection;
use crate::render::FigureSpec;
use crate::render::recording::{DrawCall, RecordingCanvas};

fn canvas_with_panel() -> (RecordingCanvas, PanelId) {
    let mut canvas = RecordingCanvas::new();
    canvas
        .begin_figure(FigureSpec {
            width: 4.0,
            height: 4.0,
        })
        .unwrap();
    let panel = canvas
        .add_panel(PanelRect::SINGLE, Projection::TwoD)
        .unwrap();
    (canvas, panel)
}

fn source(categories: &[&str], codes: &[Option<usize>]) -> ColorSource {
    ColorSource::Categorical {
        categories: categories.iter().map(|s| s.to_string()).collect(),
        codes: codes.to_vec(),
    }
}

fn coords() -> Coords {
    Coords {
        axes: vec![
            vec![0.0, 1.0, 2.0, 10.0, 11.0],
            vec![0.0, 2.0, 4.0, 10.0, 12.0],
        ],
    }
}

fn palette(categories: &[&str]) -> CategoryPalette {
    let cats: Vec<String> = categories.iter().map(|s| s.to_string()).collect();
    CategoryPalette::new(&cats, &[Rgba::BLACK, Rgba::WHITE, Rgba::GREY])
}

fn legend<'a>(
    source: &'a ColorSource,
    palette: &'a CategoryPalette,
    coords: &'a Coords,
    loc: LegendLoc,
) -> CategoricalLegend<'a> {
    CategoricalLegend {
        source,
        palette,
        coords,
        loc,
        style: LegendStyle::default(),
        multi_panel: false,
        na_color: Rgba::LIGHT_GRAY,
        na_in_legend: true,
    }
}

#[test]
fn test_legend_columns() {
    assert_eq!(legend_columns(14), 1);
    assert_eq!(legend_columns(15), 2);
    assert_eq!(legend_columns(30), 2);
    assert_eq!(legend_columns(31), 3);
}

#[test]
fn test_legend_loc_parse() {
    assert_eq!("right margin".parse::<LegendLoc>().unwrap(), LegendLoc::RightMargin);
    assert_eq!("on_data".parse::<LegendLoc>().unwrap(), LegendLoc::OnData);
    assert_eq!("None".parse::<LegendLoc>().unwrap(), LegendLoc::None);
    assert!("top".parse::<LegendLoc>().is_err());
}

#[test]
fn test_side_legend_adds_na_entry() {
    let (mut canvas, panel) = canvas_with_panel();
    let src = source(&["a", "b"], &[Some(0), Some(1), None, Some(0), Some(1)]);
    let pal = palette(&["a", "b"]);
    let xy = coords();
    let outcome =
        add_categorical_legend(&mut canvas, panel, &legend(&src, &pal, &xy, LegendLoc::RightMargin))
            .unwrap();
    assert_eq!(outcome, LegendOutcome::Side { entries: 3, ncols: 1 });
    let side = canvas
        .calls()
        .iter()
        .find_map(|c| match c {
            DrawCall::Legend { legend, .. } => Some(legend.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(side.entries[2].label, "NA");
    assert_eq!(side.entries[2].color, Rgba::LIGHT_GRAY);
}

#[test]
fn test_existing_na_category_skips_synthetic_entry() {
    let (mut canvas, panel) = canvas_with_panel();
    let src = source(&["NA", "b"], &[Some(0), Some(1), None, Some(0), Some(1)]);
    let pal = palette(&["NA", "b"]);
    let xy = coords();
    let outcome =
        add_categorical_legend(&mut canvas, panel, &legend(&src, &pal, &xy, LegendLoc::RightMargin))
            .unwrap();
    assert_eq!(outcome, LegendOutcome::Side { entries: 2, ncols: 1 });
}

#[test]
fn test_on_data_labels_at_median_and_returned() {
    let (mut canvas, panel) = canvas_with_panel();
    let src = source(&["a", "b", "c"], &[Some(0), Some(0), Some(0), Some(1), Some(1)]);
    let pal = palette(&["a", "b", "c"]);
    let xy = coords();
    let outcome =
        add_categorical_legend(&mut canvas, panel, &legend(&src, &pal, &xy, LegendLoc::OnData))
            .unwrap();
    let LegendOutcome::OnData { centroids } = outcome else {
        panic!("expected centroids");
    };
    // "c" has no points.
    assert_eq!(centroids.len(), 2);
    assert_eq!(centroids[0].label, "a");
    assert_eq!((centroids[0].x, centroids[0].y), (1.0, 2.0));
    assert_eq!((centroids[1].x, centroids[1].y), (10.5, 11.0));
    let texts = canvas
        .calls()
        .iter()
        .filter(|c| matches!(c, DrawCall::Text { .. }))
        .count();
    assert_eq!(texts, 2);
}

#[test]
fn test_multi_panel_shrinks_width() {
    let (mut canvas, panel) = canvas_with_panel();
    let src = source(&["a", "b"], &[Some(0), Some(1), Some(0), Some(0), Some(1)]);
    let pal = palette(&["a", "b"]);
    let xy = coords();
    let mut request = legend(&src, &pal, &xy, LegendLoc::RightMargin);
    request.multi_panel = true;
    add_categorical_legend(&mut canvas, panel, &request).unwrap();
    let rect = canvas.panel_rect(panel).unwrap();
    assert!((rect.width - PanelRect::SINGLE.width * 0.91).abs() < 1e-12);
    assert_eq!(rect.left, PanelRect::SINGLE.left);
}

#[test]
fn test_colorbar_falls_back_to_data_range() {
    let (mut canvas, panel) = canvas_with_panel();
    let outcome = add_colorbar(
        &mut canvas,
        panel,
        Colormap::default(),
        &[2.0, f64::NAN, -1.0],
        None,
        Some(5.0),
    )
    .unwrap();
    assert_eq!(outcome, LegendOutcome::Colorbar { vmin: -1.0, vmax: 5.0 });
    assert!(matches!(
        canvas.calls().last(),
        Some(DrawCall::Colorbar { colorbar, .. }) if colorbar.aspect == 30.0
    ));
}
