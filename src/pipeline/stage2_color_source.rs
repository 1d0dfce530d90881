use crate::input::AnnotatedData;
use crate::input::features::var_name_for_symbol;
use crate::model::ColorSource;
use crate::pipeline::PlotError;

/// Where per-sample values are looked up.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorSourceRequest<'a> {
    pub layer: Option<&'a str>,
    pub use_raw: bool,
    /// Var column holding alternative feature names.
    pub gene_symbols: Option<&'a str>,
    /// Categories outside this list become unknown.
    pub groups: Option<&'a [String]>,
}

/// Settles the raw flag: unset means "raw when present and no layer is requested".
pub fn resolve_use_raw(
    data: &AnnotatedData,
    use_raw: Option<bool>,
    layer: Option<&str>,
) -> Result<bool, PlotError> {
    let use_raw = use_raw.unwrap_or(layer.is_none() && data.raw.is_some());
    if use_raw {
        if let Some(layer) = layer {
            return Err(PlotError::RawWithLayer {
                layer: layer.to_string(),
            });
        }
        if data.raw.is_none() {
            return Err(PlotError::MissingRaw);
        }
    }
    Ok(use_raw)
}

pub fn get_color_source_vector(
    data: &AnnotatedData,
    value: Option<&str>,
    request: &ColorSourceRequest<'_>,
) -> Result<ColorSource, PlotError> {
    let Some(value) = value else {
        return Ok(ColorSource::Unknown { n: data.n_obs });
    };

    let mut key = value.to_string();
    if let Some(column) = request.gene_symbols {
        if !data.has_obs_column(value) && !data.has_var_name(value) {
            key = var_name_for_symbol(&data.var_names, &data.var, column, value)?;
        }
    }

    let values = match (&data.raw, request.use_raw) {
        (Some(raw), true) if !data.has_obs_column(&key) => raw.obs_vector(&key)?,
        (None, true) => return Err(PlotError::MissingRaw),
        _ => data.obs_vector(&key, request.layer)?,
    };

    Ok(match (values, request.groups) {
        (ColorSource::Categorical { categories, codes }, Some(groups)) if !groups.is_empty() => {
            let codes = codes
                .into_iter()
                .map(|code| code.filter(|&c| groups.contains(&categories[c])))
                .collect();
            ColorSource::Categorical { categories, codes }
        }
        (values, _) => values,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_color_source.rs"]
mod tests;
