//! Run configuration, read from TOML.
//!
//! ```toml
//! [gradient]
//! start = [33.0, 0.0, 0.0]
//! end = [93.0, 0.0, 0.0]
//! steps = 10
//! method = "alternating"     # linear | polar | alternating
//! first_axis = "lightness"   # lightness | chroma
//!
//! [matching]
//! metric = "ciede2000"       # cie76 | ciede2000
//! filters = [{ axis = "lightness", tolerance = 7.5 },
//!            { axis = "chroma", tolerance = 10.0 }]
//!
//! [catalog]
//! delimiter = ";"          # text files
//! sheet = "Каталог Folio"   # spreadsheets, first sheet if absent
//! header = true
//! skip_rows = 0
//! columns = { name = "name", l = "L", a = "a", b = "b" }
//! ```
//!
//! Every key is optional.

use std::{fs, path::Path};
use serde::Deserialize;
use crate::{catalog::parse_number, gradient::Interpolation, Axis, CatalogSource,
            DeltaE, Error, Filter, Lab, Matcher, Method, Result};

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub gradient: GradientConfig,
    pub matching: MatchingConfig,
    pub catalog: CatalogSource,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradientConfig {
    /// L\*, a\*, b\* of the first color.
    pub start: [f64; 3],
    /// L\*, a\*, b\* of the last color.
    pub end: [f64; 3],
    pub steps: usize,
    pub method: Interpolation,
    pub first_axis: Axis,
}

impl Default for GradientConfig {
    fn default() -> Self {
        GradientConfig { start: [33., 0., 0.], end: [93., 0., 0.], steps: 10,
                         method: Interpolation::Linear,
                         first_axis: Axis::Lightness }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    pub metric: DeltaE,
    /// Applied in order, see [`Matcher::candidates`].
    pub filters: Vec<Filter>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        Config::from_toml(&fs::read_to_string(path)?)
    }

    pub fn from_toml(s: &str) -> Result<Config> {
        Ok(toml::from_str(s)?)
    }

    pub fn validate(&self) -> Result<()> {
        let g = &self.gradient;
        if g.steps < 2 {
            return Err(Error::InvalidArgument(format!(
                "steps must be at least 2, got {}", g.steps)));
        }
        if !g.start.iter().chain(&g.end).all(|x| x.is_finite()) {
            return Err(Error::InvalidArgument(
                "gradient endpoints must be finite".to_string()));
        }
        for f in &self.matching.filters {
            let t = f.tolerance();
            if !(t.is_finite() && t >= 0.) {
                return Err(Error::InvalidArgument(format!(
                    "invalid tolerance {t} for filter {f:?}")));
            }
        }
        Ok(())
    }

    pub fn start(&self) -> Lab { Lab::from(self.gradient.start) }

    pub fn end(&self) -> Lab { Lab::from(self.gradient.end) }

    pub fn method(&self) -> Method {
        self.gradient.method.method(self.gradient.first_axis)
    }

    pub fn matcher(&self) -> Matcher {
        self.matching.filters.iter()
            .fold(Matcher::new(self.matching.metric), |m, &f| m.filter(f))
    }
}

/// Settings given on the command line, replacing those of the
/// configuration file.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct Overrides {
    /// Number of gradient steps.
    #[cfg_attr(feature = "cli", arg(long))]
    pub steps: Option<usize>,

    /// First color, "L,a,b".
    #[cfg_attr(feature = "cli",
               arg(long, value_parser = lab_arg, allow_hyphen_values = true))]
    pub start: Option<[f64; 3]>,

    /// Last color, "L,a,b".
    #[cfg_attr(feature = "cli",
               arg(long, value_parser = lab_arg, allow_hyphen_values = true))]
    pub end: Option<[f64; 3]>,

    #[cfg_attr(feature = "cli", arg(long, value_enum))]
    pub method: Option<Interpolation>,

    /// Axis moved first by the alternating method.
    #[cfg_attr(feature = "cli", arg(long, value_enum))]
    pub first_axis: Option<Axis>,

    #[cfg_attr(feature = "cli", arg(long, value_enum))]
    pub metric: Option<DeltaE>,
}

impl Overrides {
    /// Replace the settings of `config` given here.  The result is not
    /// validated.
    pub fn apply(&self, config: &mut Config) {
        let g = &mut config.gradient;
        if let Some(steps) = self.steps { g.steps = steps }
        if let Some(start) = self.start { g.start = start }
        if let Some(end) = self.end { g.end = end }
        if let Some(method) = self.method { g.method = method }
        if let Some(axis) = self.first_axis { g.first_axis = axis }
        if let Some(metric) = self.metric { config.matching.metric = metric }
    }
}

#[cfg(feature = "cli")]
fn lab_arg(s: &str) -> std::result::Result<[f64; 3], String> {
    parse_lab(s).map_err(|e| e.to_string())
}

/// Parse "L,a,b".  When the values are separated by `;` or blanks, a
/// decimal comma is accepted as well ("53,3; 2,3; -3,9").
pub fn parse_lab(s: &str) -> Result<[f64; 3]> {
    let fields: Vec<&str> = if s.contains(';') { s.split(';').collect() }
        else if s.trim().contains(char::is_whitespace) {
            s.split_whitespace().collect()
        } else { s.split(',').collect() };
    let invalid = || Error::InvalidArgument(format!(
        "{s:?} is not a color \"L,a,b\""));
    match fields[..] {
        [l, a, b] => Ok([parse_number(l).ok_or_else(invalid)?,
                         parse_number(a).ok_or_else(invalid)?,
                         parse_number(b).ok_or_else(invalid)?]),
        _ => Err(invalid()),
    }
}
