use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use color_scale::{config::Overrides, logger, pipeline, Config};

/// Match a color gradient against a catalog of reference colors and
/// render the result as HTML.
#[derive(Parser, Debug)]
#[command(name = "color-scale", version)]
struct Cli {
    /// Catalog of named L*a*b* colors (delimited text or spreadsheet).
    #[arg(short, long, default_value = "catalog.csv")]
    input: PathBuf,

    /// HTML report to write.
    #[arg(short, long, default_value = "color_scale.html")]
    output: PathBuf,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path).with_context(
                || format!("cannot read configuration {}", path.display()))?,
            None => Config::default(),
        };
        self.overrides.apply(&mut config);
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);
    tracing::debug!("{:?}", cli);

    let config = cli.config()?;
    let n = pipeline::run(&config, &cli.input, &cli.output)
        .with_context(|| format!("cannot build the color scale from {}",
                                 cli.input.display()))?;
    println!("{n} steps written to {}", cli.output.display());
    Ok(())
}
