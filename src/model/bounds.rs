use std::fmt;
use std::sync::Arc;

/// Reduces a panel's colour values to a single bound.
pub type Reducer = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// One vmin/vmax setting.
#[derive(Clone)]
pub enum RangeBound {
    Literal(f64),
    /// Percentile in [0, 100] of the finite values.
    Percentile(f64),
    Reducer(Reducer),
    /// Text that is neither a number nor a well-formed `pN`; reported when resolved.
    Invalid(String),
}

impl RangeBound {
    /// `p99.5` is a percentile, anything parsing as `f64` is a literal.
    pub fn parse(text: &str) -> RangeBound {
        let trimmed = text.trim();
        if let Some(rest) = trimmed.strip_prefix('p') {
            return match rest.parse::<f64>() {
                Ok(q) => RangeBound::Percentile(q),
                Err(_) => RangeBound::Invalid(trimmed.to_string()),
            };
        }
        match trimmed.parse::<f64>() {
            Ok(v) => RangeBound::Literal(v),
            Err(_) => RangeBound::Invalid(trimmed.to_string()),
        }
    }

    pub fn reducer(f: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> RangeBound {
        RangeBound::Reducer(Arc::new(f))
    }
}

impl fmt::Debug for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeBound::Literal(v) => write!(f, "Literal({v})"),
            RangeBound::Percentile(q) => write!(f, "Percentile({q})"),
            RangeBound::Reducer(_) => f.write_str("Reducer(..)"),
            RangeBound::Invalid(text) => write!(f, "Invalid({text:?})"),
        }
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeBound::Literal(v) => write!(f, "{v}"),
            RangeBound::Percentile(q) => write!(f, "p{q}"),
            RangeBound::Reducer(_) => f.write_str("<function>"),
            RangeBound::Invalid(text) => f.write_str(text),
        }
    }
}
