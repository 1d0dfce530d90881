use crate::model::color::Rgba;

/// Raw per-sample values for one annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSource {
    /// No annotation; every sample is unknown.
    Unknown { n: usize },
    Categorical {
        categories: Vec<String>,
        codes: Vec<Option<usize>>,
    },
    /// NaN marks an unknown value.
    Continuous { values: Vec<f64> },
}

impl ColorSource {
    pub fn len(&self) -> usize {
        match self {
            ColorSource::Unknown { n } => *n,
            ColorSource::Categorical { codes, .. } => codes.len(),
            ColorSource::Continuous { values } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, ColorSource::Categorical { .. })
    }

    pub fn is_null(&self, i: usize) -> bool {
        match self {
            ColorSource::Unknown { .. } => true,
            ColorSource::Categorical { codes, .. } => codes[i].is_none(),
            ColorSource::Continuous { values } => values[i].is_nan(),
        }
    }

    pub fn has_nulls(&self) -> bool {
        (0..self.len()).any(|i| self.is_null(i))
    }

    pub fn permute(&self, order: &[usize]) -> ColorSource {
        match self {
            ColorSource::Unknown { n } => ColorSource::Unknown { n: *n },
            ColorSource::Categorical { categories, codes } => ColorSource::Categorical {
                categories: categories.clone(),
                codes: order.iter().map(|&i| codes[i]).collect(),
            },
            ColorSource::Continuous { values } => ColorSource::Continuous {
                values: order.iter().map(|&i| values[i]).collect(),
            },
        }
    }
}

/// Resolved per-sample colours: display colours, or continuous values for a colour scale.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorVector {
    Colors(Vec<Rgba>),
    Values(Vec<f64>),
}

impl ColorVector {
    pub fn len(&self) -> usize {
        match self {
            ColorVector::Colors(c) => c.len(),
            ColorVector::Values(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Option<&[f64]> {
        match self {
            ColorVector::Values(v) => Some(v),
            ColorVector::Colors(_) => None,
        }
    }

    pub fn permute(&self, order: &[usize]) -> ColorVector {
        match self {
            ColorVector::Colors(c) => ColorVector::Colors(order.iter().map(|&i| c[i]).collect()),
            ColorVector::Values(v) => ColorVector::Values(order.iter().map(|&i| v[i]).collect()),
        }
    }
}
