//! Perceptual color differences (ΔE).
//!
//! Rough reading of ΔE₀₀ values: below 1 the difference is not
//! perceptible, 1–2 is barely perceptible, 2–10 is noticeable at a
//! glance and above 10 the colors look distinct.

use serde::Deserialize;
use crate::Lab;

/// Color difference formula.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DeltaE {
    /// Euclidean distance in L\*a\*b\* (CIE 1976).
    Cie76,
    /// CIE Technical Report 142-2001 (ΔE₀₀) with kL = kC = kH = 1.
    #[default]
    Ciede2000,
}

impl DeltaE {
    /// Return the difference between `c0` and `c1`.  It is symmetric,
    /// non-negative and zero iff the colors are equal.
    #[inline]
    pub fn between(self, c0: &Lab, c1: &Lab) -> f64 {
        match self {
            DeltaE::Cie76 => cie76(c0, c1),
            DeltaE::Ciede2000 => ciede2000(c0, c1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeltaE::Cie76 => "dE76",
            DeltaE::Ciede2000 => "dE2000",
        }
    }
}

pub fn cie76(c0: &Lab, c1: &Lab) -> f64 {
    let dl = c0.l - c1.l;
    let da = c0.a - c1.a;
    let db = c0.b - c1.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Hue angle h' in degrees in \[0, 360), 0 for achromatic colors.
fn hue_prime(a: f64, b: f64) -> f64 {
    if a == 0. && b == 0. { return 0. }
    let h = b.atan2(a).to_degrees();
    if h < 0. { h + 360. } else { h }
}

pub fn ciede2000(c0: &Lab, c1: &Lab) -> f64 {
    const POW25_7: f64 = 6_103_515_625.; // 25⁷
    let Lab { l: l1, a: a1, b: b1 } = *c0;
    let Lab { l: l2, a: a2, b: b2 } = *c1;

    let c_mean = (a1.hypot(b1) + a2.hypot(b2)) / 2.;
    let c_mean7 = c_mean.powi(7);
    let g = 0.5 * (1. - (c_mean7 / (c_mean7 + POW25_7)).sqrt());
    let a1p = a1 * (1. + g);
    let a2p = a2 * (1. + g);
    let c1p = a1p.hypot(b1);
    let c2p = a2p.hypot(b2);
    let h1p = hue_prime(a1p, b1);
    let h2p = hue_prime(a2p, b2);

    let dlp = l2 - l1;
    let dcp = c2p - c1p;
    let chroma_product = c1p * c2p;
    let dhp = if chroma_product == 0. { 0. }
        else {
            let dh = h2p - h1p;
            if dh > 180. { dh - 360. }
            else if dh < -180. { dh + 360. }
            else { dh }
        };
    let dhp_big = 2. * chroma_product.sqrt() * (dhp.to_radians() / 2.).sin();

    let lp_mean = (l1 + l2) / 2.;
    let cp_mean = (c1p + c2p) / 2.;
    let hp_mean = if chroma_product == 0. { h1p + h2p }
        else if (h1p - h2p).abs() <= 180. { (h1p + h2p) / 2. }
        else if h1p + h2p < 360. { (h1p + h2p + 360.) / 2. }
        else { (h1p + h2p - 360.) / 2. };

    let t = 1. - 0.17 * (hp_mean - 30.).to_radians().cos()
        + 0.24 * (2. * hp_mean).to_radians().cos()
        + 0.32 * (3. * hp_mean + 6.).to_radians().cos()
        - 0.20 * (4. * hp_mean - 63.).to_radians().cos();
    let l50 = (lp_mean - 50.) * (lp_mean - 50.);
    let sl = 1. + 0.015 * l50 / (20. + l50).sqrt();
    let sc = 1. + 0.045 * cp_mean;
    let sh = 1. + 0.015 * cp_mean * t;
    let d_theta = 30. * (-((hp_mean - 275.) / 25.).powi(2)).exp();
    let cp_mean7 = cp_mean.powi(7);
    let rc = 2. * (cp_mean7 / (cp_mean7 + POW25_7)).sqrt();
    let rt = -rc * (2. * d_theta).to_radians().sin();

    let tl = dlp / sl;
    let tc = dcp / sc;
    let th = dhp_big / sh;
    // Rounding may push the radicand slightly below zero for
    // near-identical colors.
    (tl * tl + tc * tc + th * th + rt * tc * th).max(0.).sqrt()
}
