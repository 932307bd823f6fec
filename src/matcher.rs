//! Nearest catalog entry of a target color.

use std::cmp::Ordering;
use serde::Deserialize;
use tracing::{debug, trace};
use crate::{CatalogEntry, DeltaE, Error, Lab, Result, ACHROMATIC};

/// Restricts the candidates to entries close to the target along one
/// axis.  Tolerances are in L\*a\*b\* units, degrees for the hue.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "axis", rename_all = "lowercase")]
pub enum Filter {
    /// |L − L_target| ≤ tolerance.
    Lightness { tolerance: f64 },
    /// C ≤ C_target + tolerance, i.e. not much more saturated than
    /// the target.
    Chroma { tolerance: f64 },
    /// Hue angle within `tolerance` degrees of the target's.  Grey
    /// colors have no hue: an achromatic target accepts everything and
    /// an achromatic candidate is always accepted.
    Hue { tolerance: f64 },
}

impl Filter {
    pub fn tolerance(&self) -> f64 {
        match *self {
            Filter::Lightness { tolerance }
            | Filter::Chroma { tolerance }
            | Filter::Hue { tolerance } => tolerance,
        }
    }

    /// Whether `c` passes the filter for `target`.
    pub fn accepts(&self, target: &Lab, c: &Lab) -> bool {
        match *self {
            Filter::Lightness { tolerance } => (c.l - target.l).abs() <= tolerance,
            Filter::Chroma { tolerance } => c.chroma() <= target.chroma() + tolerance,
            Filter::Hue { tolerance } => {
                if target.chroma() <= ACHROMATIC || c.chroma() <= ACHROMATIC {
                    return true
                }
                let dh = (c.to_lch().h - target.to_lch().h).abs();
                dh.min(360. - dh) <= tolerance
            }
        }
    }
}

/// The closest entry and its difference to the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match<'a> {
    pub entry: &'a CatalogEntry,
    pub delta_e: f64,
}

/// A gradient position together with its match.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientStep<'a> {
    /// Position in the gradient, starting at 1.
    pub index: usize,
    pub target: Lab,
    pub entry: &'a CatalogEntry,
    pub delta_e: f64,
}

/// Finds the closest catalog entry of a color.
///
/// # Example
///
/// ```
/// use color_scale::{CatalogEntry, DeltaE, Filter, Lab, Matcher};
/// let catalog = vec![CatalogEntry::new("Folio-100", Lab::new(53., 2.5, -4.)),
///                    CatalogEntry::new("Folio-200", Lab::new(80., 0., 0.))];
/// let m = Matcher::new(DeltaE::Ciede2000)
///     .filter(Filter::Lightness { tolerance: 7.5 })
///     .closest(&Lab::new(53.49, 2.29, -4.11), &catalog)
///     .unwrap();
/// assert_eq!(m.entry.name, "Folio-100");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matcher {
    metric: DeltaE,
    filters: Vec<Filter>,
}

impl Matcher {
    pub fn new(metric: DeltaE) -> Self {
        Matcher { metric, filters: vec![] }
    }

    /// Add a filter stage.  Stages are applied in the order they are
    /// added.  Use several times to narrow the candidates further.
    pub fn filter(mut self, f: Filter) -> Self {
        self.filters.push(f);
        self
    }

    pub fn metric(&self) -> DeltaE { self.metric }

    pub fn filters(&self) -> &[Filter] { &self.filters }

    /// Return the entries of `catalog` surviving the filter stages.
    /// A stage that would leave no candidate is skipped, so the
    /// result is non-empty whenever `catalog` is.
    pub fn candidates<'a>(&self, target: &Lab, catalog: &'a [CatalogEntry])
                          -> Vec<&'a CatalogEntry> {
        let mut candidates: Vec<&CatalogEntry> = catalog.iter().collect();
        for f in &self.filters {
            let kept: Vec<_> = candidates.iter().copied()
                .filter(|e| f.accepts(target, &e.lab))
                .collect();
            if kept.is_empty() {
                debug!(filter = ?f, "no candidate left for ({target}), \
                                     filter skipped");
            } else {
                candidates = kept;
            }
        }
        candidates
    }

    /// Return the entry of `catalog` minimizing the difference to
    /// `target` among the filtered candidates.  Ties are resolved in
    /// favor of the first entry in catalog order.
    pub fn closest<'a>(&self, target: &Lab, catalog: &'a [CatalogEntry])
                       -> Result<Match<'a>> {
        if catalog.is_empty() { return Err(Error::EmptyCatalog) }
        let candidates = self.candidates(target, catalog);
        trace!(n = candidates.len(), "candidates for ({target})");
        // `min_by` returns the first of equal elements.
        candidates.into_iter()
            .map(|entry| Match { entry,
                                 delta_e: self.metric.between(target, &entry.lab) })
            .min_by(|m0, m1| by_distance(m0.delta_e, m1.delta_e))
            .ok_or(Error::EmptyCatalog)
    }

    /// Match each of `targets`, numbering the steps from 1.
    pub fn match_all<'a>(&self, targets: &[Lab], catalog: &'a [CatalogEntry])
                         -> Result<Vec<GradientStep<'a>>> {
        targets.iter().enumerate().map(|(i, target)| {
            let m = self.closest(target, catalog)?;
            debug!("step {}: ({target}) → {} ({} {:.2})",
                   i + 1, m.entry.name, self.metric.name(), m.delta_e);
            Ok(GradientStep { index: i + 1, target: *target,
                              entry: m.entry, delta_e: m.delta_e })
        }).collect()
    }
}

/// Order differences, NaN last.
fn by_distance(d0: f64, d1: f64) -> Ordering {
    d0.partial_cmp(&d1).unwrap_or_else(|| d0.is_nan().cmp(&d1.is_nan()))
}
