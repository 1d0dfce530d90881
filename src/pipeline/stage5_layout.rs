use serde::Serialize;

use crate::render::{FigureSpec, PanelRect};

/// Column spacing that stays proportionate for a panel `figwidth` inches wide.
pub fn default_wspace(figwidth: f64) -> f64 {
    0.75 / figwidth + 0.02
}

/// Panel slots of a multi-panel figure, row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelGrid {
    pub nrows: usize,
    pub ncols: usize,
    slots: Vec<PanelRect>,
}

impl PanelGrid {
    pub fn slot(&self, index: usize) -> Option<PanelRect> {
        self.slots.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Figure of `ncols` x `rows` panels, each `panel_size` inches, with margins
/// shrinking as the grid grows so every panel keeps its size.
pub fn panel_grid(
    hspace: f64,
    wspace: f64,
    ncols: usize,
    num_panels: usize,
    panel_size: (f64, f64),
) -> (FigureSpec, PanelGrid) {
    let nx = ncols.max(1).min(num_panels.max(1));
    let ny = num_panels.max(1).div_ceil(nx);
    let (nxf, nyf) = (nx as f64, ny as f64);

    let figure = FigureSpec {
        width: nxf * panel_size.0 * (1.0 + wspace),
        height: nyf * panel_size.1,
    };

    let left = 0.2 / nxf;
    let bottom = 0.13 / nyf;
    let right = 1.0 - (nxf - 1.0) * left - 0.01 / nxf;
    let top = 1.0 - (nyf - 1.0) * bottom - 0.1 / nyf;

    let cell_w = (right - left) / (nxf + wspace * (nxf - 1.0));
    let cell_h = (top - bottom) / (nyf + hspace * (nyf - 1.0));
    let sep_w = wspace * cell_w;
    let sep_h = hspace * cell_h;

    let slots = (0..num_panels)
        .map(|i| {
            let (row, col) = ((i / nx) as f64, (i % nx) as f64);
            let cell_top = top - row * (cell_h + sep_h);
            PanelRect {
                left: left + col * (cell_w + sep_w),
                bottom: cell_top - cell_h,
                width: cell_w,
                height: cell_h,
            }
        })
        .collect();

    (
        figure,
        PanelGrid {
            nrows: ny,
            ncols: nx,
            slots,
        },
    )
}

/// Bare figure for a single panel.
pub fn single_panel(panel_size: (f64, f64)) -> (FigureSpec, PanelRect) {
    (
        FigureSpec {
            width: panel_size.0,
            height: panel_size.1,
        },
        PanelRect::SINGLE,
    )
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_layout.rs"]
mod tests;
