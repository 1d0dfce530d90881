mod input;
mod logging;
mod model;
mod pipeline;
mod render;
mod report;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::input::{AnnotatedData, InputError, load_data};
use crate::model::{ComponentSpec, PaletteSpec, PaletteStore, Projection, RangeBound, Rgba};
use crate::pipeline::PlotError;
use crate::pipeline::presets::Preset;
use crate::pipeline::spatial::{
    ImageKeySelection, LibrarySelection, SpatialParams, render_spatial,
};
use crate::pipeline::stage6_legend::LegendLoc;
use crate::pipeline::stage7_render::{EmbeddingParams, render_embedding};
use crate::render::recording::RecordingCanvas;
use crate::render::svg::SvgCanvas;
use crate::render::{Canvas, FontWeight, RenderError, Sizes};
use crate::report::json::{RunInfo, write_report_json};
use crate::report::{format_f64_6, minmax};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Plot(#[from] PlotError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize draw calls: {0}")]
    Json(#[from] serde_json::Error),
    #[error("primary matrix has no finite values")]
    EmptyMatrix,
}

#[derive(Debug, Parser)]
#[command(name = "kira-embedplot", version, about = "Embedding and spatial scatter plots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scatter plot of any basis in `obsm`.
    Embedding {
        #[arg(long)]
        basis: String,
        #[command(flatten)]
        plot: PlotArgs,
    },
    Umap {
        #[command(flatten)]
        plot: PlotArgs,
    },
    Tsne {
        #[command(flatten)]
        plot: PlotArgs,
    },
    Diffmap {
        #[command(flatten)]
        plot: PlotArgs,
    },
    Pca {
        /// Label axes with the explained variance ratio.
        #[arg(long)]
        annotate_var_explained: bool,
        #[command(flatten)]
        plot: PlotArgs,
    },
    DrawGraph {
        /// Defaults to the layout recorded in `uns.draw_graph`.
        #[arg(long)]
        layout: Option<String>,
        #[command(flatten)]
        plot: PlotArgs,
    },
    /// Spatial coordinates over the tissue image.
    Spatial {
        #[command(flatten)]
        spatial: SpatialArgs,
        #[command(flatten)]
        plot: PlotArgs,
    },
    /// Prints min and max of the primary matrix.
    Stats {
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum Backend {
    #[default]
    Svg,
    /// Ordered draw calls as JSON.
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum ProjectionArg {
    #[default]
    #[value(name = "2d")]
    TwoD,
    #[value(name = "3d")]
    ThreeD,
}

impl From<ProjectionArg> for Projection {
    fn from(value: ProjectionArg) -> Self {
        match value {
            ProjectionArg::TwoD => Projection::TwoD,
            ProjectionArg::ThreeD => Projection::ThreeD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum WeightArg {
    Normal,
    #[default]
    Bold,
}

impl From<WeightArg> for FontWeight {
    fn from(value: WeightArg) -> Self {
        match value {
            WeightArg::Normal => FontWeight::Normal,
            WeightArg::Bold => FontWeight::Bold,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct PlotArgs {
    /// Annotated data as JSON, optionally gzipped.
    #[arg(long)]
    input: PathBuf,
    #[arg(long, default_value = ".")]
    out: PathBuf,
    #[arg(long, value_enum, default_value_t = Backend::Svg)]
    backend: Backend,
    /// Pixels per inch of the SVG output.
    #[arg(long, default_value_t = 100.0)]
    dpi: f64,
    /// Annotation or feature to colour by; repeat for several panels, `none` for plain points.
    #[arg(long)]
    color: Vec<String>,
    /// `all`, `"1,2"`, or repeated for one panel each.
    #[arg(long)]
    components: Vec<String>,
    #[arg(long, value_enum, default_value_t = ProjectionArg::TwoD)]
    projection: ProjectionArg,
    #[arg(long)]
    layer: Option<String>,
    #[arg(long)]
    use_raw: Option<bool>,
    #[arg(long)]
    gene_symbols: Option<String>,
    #[arg(long, value_delimiter = ',')]
    groups: Option<Vec<String>>,
    /// Draw points in input order instead of by value.
    #[arg(long)]
    no_sort_order: bool,
    #[arg(long)]
    edges: bool,
    #[arg(long, default_value_t = 0.1)]
    edges_width: f64,
    #[arg(long, value_parser = parse_color, default_value = "grey")]
    edges_color: Rgba,
    #[arg(long)]
    neighbors_key: Option<String>,
    #[arg(long)]
    arrows: bool,
    #[arg(long)]
    cmap: Option<String>,
    #[arg(long)]
    color_map: Option<String>,
    /// Palette name, or comma-separated colours.
    #[arg(long, value_parser = PaletteSpec::parse)]
    palette: Option<PaletteSpec>,
    #[arg(long, value_parser = parse_color)]
    na_color: Option<Rgba>,
    #[arg(long)]
    no_na_in_legend: bool,
    /// One marker size, or a comma-separated value per point.
    #[arg(long, value_parser = parse_sizes)]
    size: Option<Sizes>,
    /// Hide axes and frame.
    #[arg(long)]
    no_frame: bool,
    #[arg(long, value_parser = parse_legend_loc, default_value = "right margin")]
    legend_loc: LegendLoc,
    #[arg(long)]
    legend_fontsize: Option<f64>,
    #[arg(long, value_enum, default_value_t = WeightArg::Bold)]
    legend_fontweight: WeightArg,
    #[arg(long)]
    legend_fontoutline: Option<f64>,
    /// Literal, `pN` percentile, or `none`; repeat per panel.
    #[arg(long)]
    vmin: Vec<String>,
    #[arg(long)]
    vmax: Vec<String>,
    #[arg(long)]
    add_outline: bool,
    /// Background ring and gap widths.
    #[arg(long, value_parser = parse_pair, default_value = "0.3,0.05")]
    outline_width: (f64, f64),
    #[arg(long, value_parser = parse_color_pair, default_value = "black,white")]
    outline_color: (Rgba, Rgba),
    #[arg(long, default_value_t = 4)]
    ncols: usize,
    #[arg(long, default_value_t = 0.25)]
    hspace: f64,
    #[arg(long)]
    wspace: Option<f64>,
    #[arg(long)]
    title: Vec<String>,
    /// Panel width and height in inches.
    #[arg(long, value_parser = parse_pair, default_value = "4,4")]
    figsize: (f64, f64),
    #[arg(long)]
    alpha: Option<f64>,
    #[arg(long)]
    marker_edges: bool,
}

#[derive(Debug, Clone, Args)]
struct SpatialArgs {
    #[arg(long, default_value = "spatial")]
    basis: String,
    #[arg(long, conflicts_with = "no_library")]
    library_id: Option<String>,
    /// Ignore spatial metadata.
    #[arg(long)]
    no_library: bool,
    #[arg(long, conflicts_with = "no_image")]
    img_key: Option<String>,
    #[arg(long)]
    no_image: bool,
    /// `left,right,top,bottom` in basis units.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    crop: Option<Vec<f64>>,
    #[arg(long, default_value_t = 1.0)]
    alpha_img: f64,
    /// Greyscale background image.
    #[arg(long)]
    bw: bool,
    #[arg(long)]
    spot_size: Option<f64>,
    #[arg(long)]
    scale_factor: Option<f64>,
    /// Multiplier on the spot diameter.
    #[arg(long, default_value_t = 1.0)]
    spot_scale: f64,
}

fn main() {
    logging::init_logging();
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    execute(Cli::parse())
}

fn execute(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Stats { input } => {
            let data = load_data(&input)?;
            let (lo, hi) = minmax(&data.x).ok_or(AppError::EmptyMatrix)?;
            info!("stats over {} x {} values", data.n_obs, data.var_names.len());
            println!("min = {}", format_f64_6(lo));
            println!("max = {}", format_f64_6(hi));
            Ok(())
        }
        Command::Embedding { basis, plot } => {
            let data = load_data(&plot.input)?;
            let params = plot.embedding_params(basis);
            run_embedding("embedding", &data, &plot, params)
        }
        Command::Umap { plot } => run_preset("umap", Preset::Umap, &plot),
        Command::Tsne { plot } => run_preset("tsne", Preset::Tsne, &plot),
        Command::Diffmap { plot } => run_preset("diffmap", Preset::Diffmap, &plot),
        Command::Pca {
            annotate_var_explained,
            plot,
        } => run_preset(
            "pca",
            Preset::Pca {
                annotate_var_explained,
            },
            &plot,
        ),
        Command::DrawGraph { layout, plot } => {
            run_preset("draw-graph", Preset::DrawGraph { layout }, &plot)
        }
        Command::Spatial { spatial, plot } => {
            let data = load_data(&plot.input)?;
            let params = spatial.spatial_params(&plot);
            let stem = file_stem(&params.embedding.basis);
            write_outputs("spatial", &data, &plot, &stem, |canvas, palettes| {
                render_spatial(&data, palettes, canvas, &params)
            })
        }
    }
}

fn run_preset(command: &str, preset: Preset, plot: &PlotArgs) -> Result<(), AppError> {
    let data = load_data(&plot.input)?;
    let params = preset.prepare(&data, plot.embedding_params(String::new()))?;
    run_embedding(command, &data, plot, params)
}

fn run_embedding(
    command: &str,
    data: &AnnotatedData,
    plot: &PlotArgs,
    params: EmbeddingParams,
) -> Result<(), AppError> {
    let stem = file_stem(&params.basis);
    write_outputs(command, data, plot, &stem, |canvas, palettes| {
        render_embedding(data, palettes, canvas, &params)
    })
}

/// Renders on the selected backend, then writes the figure and `<stem>_report.json`.
fn write_outputs<R: Serialize>(
    command: &str,
    data: &AnnotatedData,
    plot: &PlotArgs,
    stem: &str,
    render: impl FnOnce(&mut dyn Canvas, &mut PaletteStore) -> Result<R, PlotError>,
) -> Result<(), AppError> {
    std::fs::create_dir_all(&plot.out).map_err(|source| AppError::Io {
        path: plot.out.clone(),
        source,
    })?;
    let mut palettes = data.uns.palettes.clone();

    let result = match plot.backend {
        Backend::Svg => {
            let mut canvas = SvgCanvas::new().with_dpi(plot.dpi);
            let result = render(&mut canvas, &mut palettes)?;
            let path = plot.out.join(format!("{stem}.svg"));
            canvas.save(&path)?;
            info!("wrote {}", path.display());
            result
        }
        Backend::Record => {
            let mut canvas = RecordingCanvas::new();
            let result = render(&mut canvas, &mut palettes)?;
            let path = plot.out.join(format!("{stem}_calls.json"));
            write_file(&path, &canvas.to_json()?)?;
            info!("wrote {} draw calls to {}", canvas.calls().len(), path.display());
            result
        }
    };

    let run = RunInfo {
        command: command.to_string(),
        input: plot.input.display().to_string(),
        n_obs: data.n_obs,
    };
    let path = plot.out.join(format!("{stem}_report.json"));
    write_report_json(&path, &run, &palettes, &result)
        .map_err(|source| AppError::Io { path: path.clone(), source })?;
    info!("wrote {}", path.display());
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), AppError> {
    std::fs::write(path, contents).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn file_stem(basis: &str) -> String {
    basis.replace(['/', '\\', ' '], "_")
}

impl PlotArgs {
    fn embedding_params(&self, basis: String) -> EmbeddingParams {
        let color = if self.color.is_empty() {
            vec![None]
        } else {
            self.color
                .iter()
                .map(|c| (!is_none(c)).then(|| c.clone()))
                .collect()
        };
        EmbeddingParams {
            basis,
            color,
            gene_symbols: self.gene_symbols.clone(),
            use_raw: self.use_raw,
            layer: self.layer.clone(),
            groups: self.groups.clone(),
            sort_order: !self.no_sort_order,
            edges: self.edges,
            edges_width: self.edges_width,
            edges_color: self.edges_color,
            neighbors_key: self.neighbors_key.clone(),
            arrows: self.arrows,
            components: ComponentSpec::from_args(&self.components),
            projection: self.projection.into(),
            cmap: self.cmap.clone(),
            color_map: self.color_map.clone(),
            palette: self.palette.clone(),
            na_color: self.na_color.unwrap_or(Rgba::LIGHT_GRAY),
            na_in_legend: !self.no_na_in_legend,
            size: self.size.clone(),
            frameon: !self.no_frame,
            legend_fontsize: self.legend_fontsize,
            legend_fontweight: self.legend_fontweight.into(),
            legend_loc: self.legend_loc,
            legend_fontoutline: self.legend_fontoutline,
            vmin: parse_bounds(&self.vmin),
            vmax: parse_bounds(&self.vmax),
            add_outline: self.add_outline,
            outline_width: self.outline_width,
            outline_color: self.outline_color,
            ncols: self.ncols,
            hspace: self.hspace,
            wspace: self.wspace,
            title: (!self.title.is_empty()).then(|| self.title.clone()),
            figsize: self.figsize,
            alpha: self.alpha,
            marker_edges: self.marker_edges,
            ..EmbeddingParams::default()
        }
    }
}

impl SpatialArgs {
    fn spatial_params(&self, plot: &PlotArgs) -> SpatialParams {
        let library_id = match (&self.library_id, self.no_library) {
            (_, true) => LibrarySelection::Disabled,
            (Some(id), false) => LibrarySelection::Named(id.clone()),
            (None, false) => LibrarySelection::Auto,
        };
        let img_key = match (&self.img_key, self.no_image) {
            (_, true) => ImageKeySelection::Disabled,
            (Some(key), false) => ImageKeySelection::Named(key.clone()),
            (None, false) => ImageKeySelection::Auto,
        };
        SpatialParams {
            embedding: plot.embedding_params(self.basis.clone()),
            library_id,
            img: None,
            img_key,
            crop_coord: self.crop.clone(),
            alpha_img: self.alpha_img,
            bw: self.bw,
            size: self.spot_scale,
            scale_factor: self.scale_factor,
            spot_size: self.spot_size,
            na_color: plot.na_color,
        }
    }
}

fn is_none(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("none")
}

fn parse_bounds(values: &[String]) -> Vec<Option<RangeBound>> {
    values
        .iter()
        .map(|v| (!is_none(v)).then(|| RangeBound::parse(v)))
        .collect()
}

fn parse_color(text: &str) -> Result<Rgba, String> {
    Rgba::parse(text).ok_or_else(|| format!("invalid colour: {text}"))
}

fn parse_color_pair(text: &str) -> Result<(Rgba, Rgba), String> {
    let (a, b) = text
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated colours, got {text}"))?;
    Ok((parse_color(a.trim())?, parse_color(b.trim())?))
}

fn parse_pair(text: &str) -> Result<(f64, f64), String> {
    let (a, b) = text
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated numbers, got {text}"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid number: {s}"))
    };
    Ok((parse(a)?, parse(b)?))
}

fn parse_sizes(text: &str) -> Result<Sizes, String> {
    let values = text
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid size: {s}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        [value] => Ok(Sizes::Uniform { value: *value }),
        _ => Ok(Sizes::PerPoint { values }),
    }
}

fn parse_legend_loc(text: &str) -> Result<LegendLoc, String> {
    text.parse()
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
