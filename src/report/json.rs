use std::path::Path;

use serde::Serialize;

use crate::model::PaletteStore;

pub const TOOL_NAME: &str = "kira-embedplot";

/// Run metadata shared by every report file.
#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
    pub command: String,
    pub input: String,
    pub n_obs: usize,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    tool: &'static str,
    version: &'static str,
    #[serde(flatten)]
    run: &'a RunInfo,
    /// Palettes after the render, including any generated or extended ones.
    palettes: &'a PaletteStore,
    result: &'a T,
}

pub fn render_report_json<T: Serialize>(
    run: &RunInfo,
    palettes: &PaletteStore,
    result: &T,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Envelope {
        tool: TOOL_NAME,
        version: env!("CARGO_PKG_VERSION"),
        run,
        palettes,
        result,
    })
}

pub fn write_report_json<T: Serialize>(
    path: &Path,
    run: &RunInfo,
    palettes: &PaletteStore,
    result: &T,
) -> std::io::Result<()> {
    let json = render_report_json(run, palettes, result)?;
    std::fs::write(path, json)
}
