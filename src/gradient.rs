//! Target colors between two endpoints.
//!
//! [`Method::Linear`] blends the three L\*a\*b\* coordinates,
//! [`Method::Polar`] blends in L\*C\*h along the shorter hue arc and
//! [`Method::Alternating`] moves lightness and chroma one at a time
//! at a fixed hue, which keeps intermediate colors closer to what can
//! actually be printed.

use serde::Deserialize;
use tracing::debug;
use crate::{normalize_hue, ColorRange, Error, Lab, Lch, Result, ACHROMATIC};

/// Coordinate adjusted by a transition of [`Method::Alternating`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Axis {
    #[default]
    Lightness,
    Chroma,
}

impl Axis {
    fn other(self) -> Axis {
        match self {
            Axis::Lightness => Axis::Chroma,
            Axis::Chroma => Axis::Lightness,
        }
    }
}

/// Interpolation method of [`generate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Linear,
    Polar,
    /// Odd transitions (1st, 3rd,…) move the given axis, even ones
    /// the other axis.
    Alternating(Axis),
}

/// Name of a [`Method`] without its parameters, as used in
/// configuration files and on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Interpolation {
    #[default]
    Linear,
    Polar,
    Alternating,
}

impl Interpolation {
    /// `first` is only used by [`Interpolation::Alternating`].
    pub fn method(self, first: Axis) -> Method {
        match self {
            Interpolation::Linear => Method::Linear,
            Interpolation::Polar => Method::Polar,
            Interpolation::Alternating => Method::Alternating(first),
        }
    }
}

/// Return `steps` colors going from `start` to `end` (both included).
///
/// # Example
///
/// ```
/// use color_scale::{gradient, Lab, Method};
/// let start = Lab::new(22.26, 3.29, -5.94);
/// let end = Lab::new(92.52, 1.05, -1.82);
/// let g = gradient::generate(start, end, 10, Method::Linear).unwrap();
/// assert_eq!(g.len(), 10);
/// assert_eq!(g[9], end);
/// ```
pub fn generate(start: Lab, end: Lab, steps: usize, method: Method)
                -> Result<Vec<Lab>> {
    if steps < 2 {
        return Err(Error::InvalidArgument(format!(
            "a gradient needs at least 2 steps, got {steps}")));
    }
    let colors: Vec<Lab> = match method {
        Method::Linear => Linear::new(start, end).sample(steps).collect(),
        Method::Polar => Polar::new(start, end).sample(steps).collect(),
        Method::Alternating(first) => alternating(start, end, steps, first),
    };
    debug!(?method, steps, "generated gradient from ({start}) to ({end})");
    Ok(colors)
}

/// Straight line between two colors in L\*a\*b\*.
pub struct Linear {
    start: Lab,
    end: Lab,
}

impl Linear {
    pub fn new(start: Lab, end: Lab) -> Self { Linear { start, end } }
}

impl ColorRange for Linear {
    /// Returns the color corresponding to `t` ∈ \[0., 1.\], where
    /// `t == 0.` returns the first color and `t == 1.` the second.
    fn lab(&self, t: f64) -> Lab {
        let t = t.clamp(0., 1.);
        if t == 1. { self.end }
        else { self.start + t * (self.end - self.start) }
    }
}

/// Gradient in L\*C\*h going around the hue circle the short way.
pub struct Polar {
    start: Lab,
    end: Lab,
    c0: Lch, // first color
    dc: Lch, // last - first color
}

impl Polar {
    pub fn new(start: Lab, end: Lab) -> Self {
        let lch0 = start.to_lch();
        let lch1 = end.to_lch();
        let (h0, h1) = (lch0.h, lch1.h);
        let dh = {
            if h1 > h0 && h1 - h0 > 180. { h1 - (h0 + 360.) }
            else if h1 < h0 && h0 - h1 > 180. { h1 + 360. - h0 }
            else { h1 - h0 } };
        Polar { start, end, c0: lch0,
                dc: Lch { l: lch1.l - lch0.l, c: lch1.c - lch0.c, h: dh } }
    }
}

impl ColorRange for Polar {
    fn lab(&self, t: f64) -> Lab {
        let t = t.clamp(0., 1.);
        if t == 0. { return self.start }
        if t == 1. { return self.end }
        Lch { l: self.c0.l + t * self.dc.l,
              c: (self.c0.c + t * self.dc.c).max(0.),
              h: normalize_hue(self.c0.h + t * self.dc.h) }.to_lab()
    }
}

/// Mean of two hues (in degrees) on the circle, in \[0, 360).
///
/// ```
/// let h = color_scale::gradient::circular_mean_hue(350., 10.);
/// assert!(h < 1e-9 || 360. - h < 1e-9);
/// ```
pub fn circular_mean_hue(h0: f64, h1: f64) -> f64 {
    let (h0, h1) = (h0.to_radians(), h1.to_radians());
    let y = h0.sin() + h1.sin();
    let x = h0.cos() + h1.cos();
    normalize_hue(y.atan2(x).to_degrees())
}

fn representative_hue(c0: &Lch, c1: &Lch) -> f64 {
    match (c0.c <= ACHROMATIC, c1.c <= ACHROMATIC) {
        (true, true) => 0.,
        (true, false) => c1.h,
        (false, true) => c0.h,
        (false, false) => circular_mean_hue(c0.h, c1.h),
    }
}

fn alternating(start: Lab, end: Lab, steps: usize, first: Axis) -> Vec<Lab> {
    let c0 = start.to_lch();
    let c1 = end.to_lch();
    let h = representative_hue(&c0, &c1);
    let transitions = steps - 1;
    let n_first = (transitions + 1) / 2;
    let n_second = transitions / 2;
    let (n_l, n_c) = match first {
        Axis::Lightness => (n_first, n_second),
        Axis::Chroma => (n_second, n_first),
    };
    let dl = if n_l > 0 { (c1.l - c0.l) / n_l as f64 } else { 0. };
    let dc = if n_c > 0 { (c1.c - c0.c) / n_c as f64 } else { 0. };

    let mut colors = Vec::with_capacity(steps);
    colors.push(start);
    let (mut l, mut c) = (c0.l, c0.c);
    let (mut kl, mut kc) = (0, 0);
    // The last transition lands on `end` itself.
    for k in 1 .. transitions {
        let axis = if k % 2 == 1 { first } else { first.other() };
        match axis {
            Axis::Lightness => { kl += 1;  l = c0.l + kl as f64 * dl }
            Axis::Chroma => { kc += 1;  c = (c0.c + kc as f64 * dc).max(0.) }
        }
        colors.push(Lch { l, c, h }.to_lab());
    }
    colors.push(end);
    colors
}
