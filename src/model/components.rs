use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Projection {
    #[default]
    TwoD,
    ThreeD,
}

impl Projection {
    pub fn n_dims(self) -> usize {
        match self {
            Projection::TwoD => 2,
            Projection::ThreeD => 3,
        }
    }
}

/// User-facing component selection; axis numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSpec {
    /// Every pair (or triple in 3D) of axes.
    All,
    /// `"2,3"`
    Single(String),
    /// `[2, 3]`
    Indices(Vec<usize>),
    /// `["1,2", "2,3"]`, one panel each.
    Many(Vec<String>),
}

impl ComponentSpec {
    /// Builds a spec from repeated `--components` values.
    pub fn from_args(values: &[String]) -> Option<ComponentSpec> {
        match values {
            [] => None,
            [one] if one.trim().eq_ignore_ascii_case("all") => Some(ComponentSpec::All),
            [one] => Some(ComponentSpec::Single(one.clone())),
            many => Some(ComponentSpec::Many(many.to_vec())),
        }
    }
}

impl std::fmt::Display for ComponentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentSpec::All => f.write_str("all"),
            ComponentSpec::Single(s) => f.write_str(s),
            ComponentSpec::Indices(v) => write!(f, "{v:?}"),
            ComponentSpec::Many(v) => write!(f, "{v:?}"),
        }
    }
}
