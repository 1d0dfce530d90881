use super::*;

#[test]
fn test_four_panels_four_columns_is_one_row() {
    let (figure, grid) = panel_grid(0.25, 0.2, 4, 4, (4.0, 4.0));
    assert_eq!(grid.nrows, 1);
    assert_eq!(grid.ncols, 4);
    assert_eq!(grid.len(), 4);
    assert!((figure.width - 4.0 * 4.0 * 1.2).abs() < 1e-9);
    assert!((figure.height - 4.0).abs() < 1e-9);
}

#[test]
fn test_columns_capped_by_panel_count() {
    let (_, grid) = panel_grid(0.25, 0.2, 4, 2, (4.0, 4.0));
    assert_eq!((grid.nrows, grid.ncols), (1, 2));
    let (_, grid) = panel_grid(0.25, 0.2, 2, 5, (4.0, 4.0));
    assert_eq!((grid.nrows, grid.ncols), (3, 2));
    assert!(grid.slot(5).is_none());
}

#[test]
fn test_slots_do_not_overlap_and_stay_inside() {
    let (_, grid) = panel_grid(0.25, 0.2, 3, 6, (4.0, 4.0));
    for i in 0..grid.len() {
        let r = grid.slot(i).unwrap();
        assert!(r.left >= 0.0 && r.left + r.width <= 1.0);
        assert!(r.bottom >= 0.0 && r.top() <= 1.0);
    }
    let a = grid.slot(0).unwrap();
    let b = grid.slot(1).unwrap();
    let below = grid.slot(3).unwrap();
    assert!(a.left + a.width < b.left);
    assert!(below.top() < a.bottom);
    assert!((a.width - b.width).abs() < 1e-12);
}

#[test]
fn test_default_wspace() {
    assert!((default_wspace(4.0) - 0.2075).abs() < 1e-12);
}

#[test]
fn test_single_panel_uses_bare_figure() {
    let (figure, rect) = single_panel((5.0, 3.0));
    assert_eq!(figure.width, 5.0);
    assert_eq!(rect, PanelRect::SINGLE);
}
