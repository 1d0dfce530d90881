use serde::Serialize;

use crate::input::spatial::Image;
use crate::model::{Projection, Rgba};
use crate::render::{
    Arrow, Canvas, Colorbar, FigureSpec, PanelId, PanelRect, RenderError, ScatterCall, Segment,
    SideLegend, TextLabel,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCall {
    BeginFigure {
        figure: FigureSpec,
    },
    AddPanel {
        panel: PanelId,
        rect: PanelRect,
        projection: Projection,
    },
    SetPanelRect {
        panel: PanelId,
        rect: PanelRect,
    },
    Scatter {
        panel: PanelId,
        call: ScatterCall,
    },
    SetTitle {
        panel: PanelId,
        title: String,
    },
    SetAxisLabels {
        panel: PanelId,
        labels: Vec<String>,
    },
    ClearTicks {
        panel: PanelId,
    },
    AxisOff {
        panel: PanelId,
    },
    SetLimits {
        panel: PanelId,
        x: (f64, f64),
        y: (f64, f64),
    },
    SetEqualAspect {
        panel: PanelId,
    },
    Image {
        panel: PanelId,
        height: usize,
        width: usize,
        channels: usize,
        alpha: f64,
        greyscale: bool,
    },
    Segments {
        panel: PanelId,
        count: usize,
        width: f64,
        color: Rgba,
    },
    Arrows {
        panel: PanelId,
        count: usize,
        color: Rgba,
    },
    Legend {
        panel: PanelId,
        legend: SideLegend,
    },
    Text {
        panel: PanelId,
        label: TextLabel,
    },
    Colorbar {
        panel: PanelId,
        colorbar: Colorbar,
    },
}

/// Canvas that records every call in order; used by `--backend record` and tests.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    figure: Option<FigureSpec>,
    panels: Vec<PanelRect>,
    calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn figure(&self) -> Option<FigureSpec> {
        self.figure
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn scatters(&self, panel: PanelId) -> Vec<&ScatterCall> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Scatter { panel: p, call } if *p == panel => Some(call),
                _ => None,
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.calls)
    }

    fn check(&self, panel: PanelId) -> Result<(), RenderError> {
        if panel.0 < self.panels.len() {
            Ok(())
        } else {
            Err(RenderError::UnknownPanel(panel))
        }
    }

    fn record(&mut self, panel: PanelId, call: DrawCall) -> Result<(), RenderError> {
        self.check(panel)?;
        self.calls.push(call);
        Ok(())
    }
}

impl Canvas for RecordingCanvas {
    fn begin_figure(&mut self, figure: FigureSpec) -> Result<(), RenderError> {
        self.figure = Some(figure);
        self.calls.push(DrawCall::BeginFigure { figure });
        Ok(())
    }

    fn add_panel(
        &mut self,
        rect: PanelRect,
        projection: Projection,
    ) -> Result<PanelId, RenderError> {
        if self.figure.is_none() {
            return Err(RenderError::NoFigure);
        }
        let panel = PanelId(self.panels.len());
        self.panels.push(rect);
        self.calls.push(DrawCall::AddPanel {
            panel,
            rect,
            projection,
        });
        Ok(panel)
    }

    fn panel_rect(&self, panel: PanelId) -> Result<PanelRect, RenderError> {
        self.panels
            .get(panel.0)
            .copied()
            .ok_or(RenderError::UnknownPanel(panel))
    }

    fn set_panel_rect(&mut self, panel: PanelId, rect: PanelRect) -> Result<(), RenderError> {
        self.check(panel)?;
        self.panels[panel.0] = rect;
        self.calls.push(DrawCall::SetPanelRect { panel, rect });
        Ok(())
    }

    fn scatter(&mut self, panel: PanelId, call: &ScatterCall) -> Result<(), RenderError> {
        self.record(
            panel,
            DrawCall::Scatter {
                panel,
                call: call.clone(),
            },
        )
    }

    fn set_title(&mut self, panel: PanelId, title: &str) -> Result<(), RenderError> {
        self.record(
            panel,
            DrawCall::SetTitle {
                panel,
                title: title.to_string(),
            },
        )
    }

    fn set_axis_labels(&mut self, panel: PanelId, labels: &[String]) -> Result<(), RenderError> {
        self.record(
            panel,
            DrawCall::SetAxisLabels {
                panel,
                labels: labels.to_vec(),
            },
        )
    }

    fn clear_ticks(&mut self, panel: PanelId) -> Result<(), RenderError> {
        self.record(panel, DrawCall::ClearTicks { panel })
    }

    fn axis_off(&mut self, panel: PanelId) -> Result<(), RenderError> {
        self.record(panel, DrawCall::AxisOff { panel })
    }

    fn set_limits(
        &mut self,
        panel: PanelId,
        x: (f64, f64),
        y: (f64, f64),
    ) -> Result<(), RenderError> {
        self.record(panel, DrawCall::SetLimits { panel, x, y })
    }

    fn set_equal_aspect(&mut self, panel: PanelId) -> Result<(), RenderError> {
        self.record(panel, DrawCall::SetEqualAspect { panel })
    }

    fn image(
        &mut self,
        panel: PanelId,
        image: &Image,
        alpha: f64,
        greyscale: bool,
    ) -> Result<(), RenderError> {
        self.record(
            panel,
            DrawCall::Image {
                panel,
                height: image.height,
                width: image.width,
                channels: image.channels,
                alpha,
                greyscale,
            },
        )
    }

    fn segments(
        &mut self,
        panel: PanelId,
        segments: &[Segment],
        width: f64,
        color: Rgba,
    ) -> Result<(), RenderError> {
        self.record(
            panel,
            DrawCall::Segments {
                panel,
                count: segments.len(),
                width,
                color,
            },
        )
    }

    fn arrows(&mut self, panel: PanelId, arrows: &[Arrow], color: Rgba) -> Result<(), RenderError> {
        self.record(
            panel,
            DrawCall::Arrows {
                panel,
                count: arrows.len(),
                color,
            },
        )
    }

    fn legend(&mut self, panel: PanelId, legend: &SideLegend) -> Result<(), RenderError> {
        self.record(
            panel,
            DrawCall::Legend {
                panel,
                legend: legend.clone(),
            },
        )
    }

    fn text(&mut self, panel: PanelId, label: &TextLabel) -> Result<(), RenderError> {
        self.record(
            panel,
            DrawCall::Text {
                panel,
                label: label.clone(),
            },
        )
    }

    fn colorbar(&mut self, panel: PanelId, colorbar: &Colorbar) -> Result<(), RenderError> {
        self.record(
            panel,
            DrawCall::Colorbar {
                panel,
                colorbar: colorbar.clone(),
            },
        )
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/render/recording.rs"]
mod tests;
