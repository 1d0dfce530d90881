use super::*;
use crate::render::{PointColors, ScatterLayer, SizeUnit, Sizes};

fn figure() -> FigureSpec {
    FigureSpec {
        width: 4.0,
        height: 4.0,
    }
}

fn dot() -> ScatterCall {
    ScatterCall {
        layer: ScatterLayer::Plain,
        xs: vec![1.0],
        ys: vec![2.0],
        zs: None,
        sizes: Sizes::Uniform { value: 10.0 },
        unit: SizeUnit::Area,
        colors: PointColors::Uniform { color: Rgba::BLACK },
        alpha: None,
        edges: false,
    }
}

#[test]
fn test_panel_requires_figure() {
    let mut canvas = RecordingCanvas::new();
    assert!(matches!(
        canvas.add_panel(PanelRect::SINGLE, Projection::TwoD),
        Err(RenderError::NoFigure)
    ));
}

#[test]
fn test_calls_are_recorded_in_order() {
    let mut canvas = RecordingCanvas::new();
    canvas.begin_figure(figure()).unwrap();
    let panel = canvas
        .add_panel(PanelRect::SINGLE, Projection::TwoD)
        .unwrap();
    canvas.scatter(panel, &dot()).unwrap();
    canvas.set_title(panel, "t").unwrap();
    assert_eq!(canvas.calls().len(), 4);
    assert!(matches!(canvas.calls()[2], DrawCall::Scatter { .. }));
    assert_eq!(canvas.scatters(panel).len(), 1);
    assert_eq!(canvas.figure(), Some(figure()));
}

#[test]
fn test_unknown_panel_is_rejected() {
    let mut canvas = RecordingCanvas::new();
    canvas.begin_figure(figure()).unwrap();
    assert!(matches!(
        canvas.scatter(PanelId(0), &dot()),
        Err(RenderError::UnknownPanel(PanelId(0)))
    ));
    assert_eq!(canvas.calls().len(), 1);
}

#[test]
fn test_json_tags_calls_by_op() {
    let mut canvas = RecordingCanvas::new();
    canvas.begin_figure(figure()).unwrap();
    let panel = canvas
        .add_panel(PanelRect::SINGLE, Projection::TwoD)
        .unwrap();
    canvas.clear_ticks(panel).unwrap();
    canvas.scatter(panel, &dot()).unwrap();
    let json = canvas.to_json().unwrap();
    assert!(json.contains("\"op\": \"begin_figure\""));
    assert!(json.contains("\"op\": \"clear_ticks\""));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let scatter = &value[3];
    assert_eq!(scatter["op"], "scatter");
    assert_eq!(scatter["panel"], 0);
    assert_eq!(scatter["call"]["layer"], "plain");
    assert_eq!(scatter["call"]["xs"][0], 1.0);
}
