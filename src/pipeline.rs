use std::path::Path;
use tracing::{debug, info};
use crate::{gradient, Catalog, Config, GradientStep, Matcher, Report, Result,
            Swatch};

/// Generate the gradient described by `config` and match every step
/// against `catalog`.
pub fn scale<'a>(config: &Config, catalog: &'a Catalog)
                 -> Result<Vec<GradientStep<'a>>> {
    config.validate()?;
    let targets = gradient::generate(config.start(), config.end(),
                                     config.gradient.steps, config.method())?;
    let matcher = config.matcher();
    debug!(metric = matcher.metric().name(), filters = ?matcher.filters(),
           "matching {} targets", targets.len());
    matcher.match_all(&targets, catalog)
}

/// Side-by-side report of the targets and the matches found by
/// `matcher`.
pub fn report(matcher: &Matcher, steps: &[GradientStep]) -> Report {
    Report::new("Color scale")
        .delta_label(matcher.metric().name())
        .column("Gradient", Swatch::targets(steps))
        .column("Catalog", Swatch::matches(steps))
}

/// Load the catalog at `input`, match the gradient and write the
/// report to `output`.  Nothing is written if any step fails.
/// Returns the number of steps.
pub fn run(config: &Config, input: &Path, output: &Path) -> Result<usize> {
    let catalog = config.catalog.load(input)?;
    let steps = scale(config, &catalog)?;
    let mut distinct: Vec<&str> = steps.iter().map(|s| s.entry.name.as_str())
        .collect();
    distinct.sort_unstable();
    distinct.dedup();
    info!(steps = steps.len(), distinct = distinct.len(),
          "matched gradient against {} catalog colors", catalog.len());
    report(&config.matcher(), &steps).save(output)?;
    Ok(steps.len())
}
