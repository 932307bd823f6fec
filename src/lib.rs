//! Color scales matched against a catalog of reference colors.
//!
//! - [`gradient::generate`] samples target colors between two
//!   endpoints in CIE L\*a\*b\* (see [`Method`]).
//! - [`Matcher`] finds, for each target, the closest entry of a
//!   [`Catalog`] according to a [`DeltaE`] formula, possibly after
//!   narrowing the candidates with [`Filter`]s.
//! - [`Report`] renders the result as a static HTML page.
//!
//! [`pipeline::run`] chains the three from a [`Config`].

use std::ops::{Add, Mul, Sub};
use rgb::{RGB, RGB8};

pub mod catalog;
pub mod config;
pub mod delta;
pub mod error;
pub mod gradient;
pub mod logger;
pub mod matcher;
pub mod pipeline;
pub mod report;

pub use catalog::{Catalog, CatalogEntry, CatalogSource, Column};
pub use config::Config;
pub use delta::DeltaE;
pub use error::{Error, Result};
pub use gradient::{Axis, Method};
pub use matcher::{Filter, GradientStep, Match, Matcher};
pub use report::{Report, Swatch};

/// A color in the CIE L\*a\*b\* color space with a D50 reference
/// white point.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Lab {
    /// The lightness, conventionally in the range 0. to 100.
    pub l: f64,
    /// Green (negative) to red (positive) axis.
    pub a: f64,
    /// Blue (negative) to yellow (positive) axis.
    pub b: f64,
}

/// The type for colors in the CIE L\*C\*h\*_ab color space, that is
/// CIE L\*a\*b\* with polar coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Lch {
    /// The lightness in the range 0. to 100.
    pub l: f64,
    /// The chroma, in the range 0. to 181.02, but less in practice.
    pub c: f64,
    /// The hue in degrees in the range 0. to 360.
    pub h: f64,
}

const EPS0: f64 = 6. / 29.;
/// Slack allowed on sRGB components before a color counts as out of
/// gamut.
const GAMUT_TOL: f64 = 1e-6;
/// Below this chroma the hue of a color carries no information.
pub(crate) const ACHROMATIC: f64 = 1e-9;

impl Lab {
    #[inline]
    pub const fn new(l: f64, a: f64, b: f64) -> Lab { Lab { l, a, b } }

    /// Return the chroma √(a² + b²).
    #[inline]
    pub fn chroma(&self) -> f64 { self.a.hypot(self.b) }

    pub fn to_lch(&self) -> Lch {
        let h = self.b.atan2(self.a).to_degrees();
        Lch { l: self.l, c: self.chroma(), h: normalize_hue(h) }
    }

    /// Return the linear-light sRGB components (nominally in
    /// \[0, 1\], but not clamped).
    pub fn to_linear_rgb(&self) -> RGB<f64> {
        // Bradford-adapted D50 → sRGB, see
        // https://github.com/dbuenzli/gg/blob/b8704687d669d139bb4ac7a54115afc7e5caaa55/src/gg.ml#L2926
        const C0: f64 = 108. / 841.;
        const C1: f64 = 4. / 29.;
        let fy = (self.l + 16.) / 116.;
        let fx = self.a / 500. + fy;
        let fz = fy - self.b / 200.;
        let fx1 = if fx > EPS0 { fx * fx * fx } else { C0 * (fx - C1) };
        let fy1 = if fy > EPS0 { fy * fy * fy } else { C0 * (fy - C1) };
        let fz1 = if fz > EPS0 { fz * fz * fz } else { C0 * (fz - C1) };
        let r = 3.0215932  * fx1 - 1.6168777 * fy1 - 0.4047152 * fz1;
        let g = -0.9437222 * fx1 + 1.9161365 * fy1 + 0.0275856 * fz1;
        let b = 0.0693906  * fx1 - 0.2290271 * fy1 + 1.1596365 * fz1;
        RGB { r, g, b }
    }

    /// Return the gamma-encoded sRGB components, not clamped: values
    /// outside \[0, 1\] mean the color is out of gamut.
    pub fn to_rgb(&self) -> RGB<f64> {
        let RGB { r, g, b } = self.to_linear_rgb();
        RGB { r: encode_srgb(r), g: encode_srgb(g), b: encode_srgb(b) }
    }

    /// Convert to a displayable 8-bit sRGB color.  Out of gamut
    /// components are clamped to \[0, 1\] before being quantized.
    pub fn to_rgb8(&self) -> RGB8 {
        let RGB { r, g, b } = self.to_rgb();
        RGB8 { r: quantize(r), g: quantize(g), b: quantize(b) }
    }

    /// Say whether the color can be displayed in sRGB without
    /// clamping (up to a small tolerance).
    pub fn is_in_gamut(&self) -> bool {
        let RGB { r, g, b } = self.to_rgb();
        [r, g, b].iter().all(|&c| (-GAMUT_TOL ..= 1. + GAMUT_TOL).contains(&c))
    }
}

impl Add for Lab {
    type Output = Lab;
    #[inline]
    fn add(self, c: Lab) -> Lab {
        Lab { l: self.l + c.l, a: self.a + c.a, b: self.b + c.b }
    }
}

impl Sub for Lab {
    type Output = Lab;
    #[inline]
    fn sub(self, c: Lab) -> Lab {
        Lab { l: self.l - c.l, a: self.a - c.a, b: self.b - c.b }
    }
}

impl Mul<Lab> for f64 {
    type Output = Lab;
    #[inline]
    fn mul(self, c: Lab) -> Lab {
        Lab { l: self * c.l, a: self * c.a, b: self * c.b }
    }
}

impl From<[f64; 3]> for Lab {
    #[inline]
    fn from([l, a, b]: [f64; 3]) -> Lab { Lab { l, a, b } }
}

impl std::fmt::Display for Lab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}, {:.2}, {:.2}", self.l, self.a, self.b)
    }
}

impl Lch {
    pub fn to_lab(&self) -> Lab {
        let h = self.h.to_radians();
        Lab { l: self.l, a: self.c * h.cos(), b: self.c * h.sin() }
    }
}

/// Bring an angle in degrees into \[0, 360).
pub(crate) fn normalize_hue(h: f64) -> f64 {
    let h = h.rem_euclid(360.);
    // `rem_euclid` may round up to exactly 360 for tiny negatives.
    if h >= 360. { 0. } else { h }
}

fn encode_srgb(c: f64) -> f64 {
    if c <= 0.0031308 { 12.92 * c }
    else { 1.055 * c.powf(1. / 2.4) - 0.055 }
}

#[inline]
fn quantize(c: f64) -> u8 {
    // The D50 matrix maps white to 1 ± 1e-7: let it reach 255.
    let c = if c > 1. - GAMUT_TOL { 1. } else { c };
    // NaN clamps to NaN and `as` maps it to 0.
    (255. * c.clamp(0., 1.)) as u8
}

/// A “continuous” range of colors parametrized by reals in \[0, 1\].
pub trait ColorRange {
    /// Returns the color corresponding to `t` ∈ \[0., 1.\].
    fn lab(&self, t: f64) -> Lab;

    /// Return an iterator yielding `n` colors uniformly spaced on the
    /// range, the first one being `self.lab(0.)` and the last one
    /// `self.lab(1.)` (when `n ≥ 2`).
    fn sample(&self, n: usize) -> Samples<'_, Self> where Self: Sized {
        Samples { range: self, last: n.saturating_sub(1), i: 0, n }
    }
}

/// Iterator returned by [`ColorRange::sample`].
pub struct Samples<'a, R> {
    range: &'a R,
    last: usize,
    i: usize, // next position to be consumed
    n: usize,
}

impl<R: ColorRange> Iterator for Samples<'_, R> {
    type Item = Lab;

    fn next(&mut self) -> Option<Lab> {
        if self.i >= self.n { return None }
        let k = self.i;
        self.i += 1;
        // Bounds are requested exactly so that they are not subject
        // to rounding in `k / last`.
        Some(if k == 0 { self.range.lab(0.) }
             else if k == self.last { self.range.lab(1.) }
             else { self.range.lab(k as f64 / self.last as f64) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.n - self.i;
        (len, Some(len))
    }
}

impl<R: ColorRange> ExactSizeIterator for Samples<'_, R> {}
