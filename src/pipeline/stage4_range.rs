use tracing::error;

use crate::model::RangeBound;
use crate::report::quantile_linear;

/// Resolves `(vmin, vmax)` for panel `index`.
///
/// A list of one bound applies to every panel; longer lists are indexed per panel.
/// Every invalid setting is logged and falls back to `None`.
pub fn get_vmin_vmax(
    vmin: &[Option<RangeBound>],
    vmax: &[Option<RangeBound>],
    index: usize,
    values: &[f64],
) -> (Option<f64>, Option<f64>) {
    (
        resolve_bound("vmin", vmin, index, values),
        resolve_bound("vmax", vmax, index, values),
    )
}

fn resolve_bound(
    name: &str,
    bounds: &[Option<RangeBound>],
    index: usize,
    values: &[f64],
) -> Option<f64> {
    let bound = match bounds {
        [] => return None,
        [single] => single.as_ref()?,
        many => match many.get(index) {
            Some(bound) => bound.as_ref()?,
            None => {
                error!(
                    "the parameter {} is not valid: {} values given for plot number {}; \
                     the list length must equal the number of plots",
                    name,
                    many.len(),
                    index + 1
                );
                return None;
            }
        },
    };

    match bound {
        RangeBound::Literal(v) if v.is_finite() => Some(*v),
        RangeBound::Literal(v) => {
            error!(
                "the given {}={} for plot number {} is not a finite number",
                name,
                v,
                index + 1
            );
            None
        }
        RangeBound::Percentile(q) if (0.0..=100.0).contains(q) => {
            let p = nan_percentile(values, *q);
            if p.is_none() {
                error!(
                    "the parameter {}=p{} for plot number {} has no finite values to take a percentile of",
                    name,
                    q,
                    index + 1
                );
            }
            p
        }
        RangeBound::Percentile(q) => {
            error!(
                "the parameter {}=p{} for plot number {} is not valid; percentiles lie in [0, 100]",
                name,
                q,
                index + 1
            );
            None
        }
        RangeBound::Reducer(f) => {
            let v = f(values);
            if v.is_finite() {
                Some(v)
            } else {
                error!(
                    "the function given for {} returned {} for plot number {}; it must return a finite number",
                    name,
                    v,
                    index + 1
                );
                None
            }
        }
        RangeBound::Invalid(text) => {
            error!(
                "the given {}={} for plot number {} is not valid; use a number, a percentile \
                 such as 'p99.5', or a function",
                name,
                text,
                index + 1
            );
            None
        }
    }
}

/// `q`-th percentile of the finite entries with linear interpolation.
pub fn nan_percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);
    Some(quantile_linear(&finite, q / 100.0))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_range.rs"]
mod tests;
