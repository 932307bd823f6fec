//! Static HTML rendering of color sequences.

use std::{fs::{self, File},
          io::{self, BufWriter, Write},
          path::{Path, PathBuf}};
use rgb::RGB8;
use tracing::info;
use crate::{Error, GradientStep, Lab, Result};

/// One colored rectangle of the report.
#[derive(Clone, Debug, PartialEq)]
pub struct Swatch {
    pub label: String,
    pub lab: Lab,
    /// Name of the catalog entry, if the swatch is a match.
    pub name: Option<String>,
    pub delta_e: Option<f64>,
}

impl Swatch {
    pub fn new(label: impl Into<String>, lab: Lab) -> Self {
        Swatch { label: label.into(), lab, name: None, delta_e: None }
    }

    pub fn matched(mut self, name: impl Into<String>, delta_e: f64) -> Self {
        self.name = Some(name.into());
        self.delta_e = Some(delta_e);
        self
    }

    /// The generated targets of `steps`.
    pub fn targets(steps: &[GradientStep]) -> Vec<Swatch> {
        steps.iter()
            .map(|s| Swatch::new(format!("Step {}", s.index), s.target))
            .collect()
    }

    /// The catalog entries matched by `steps`.
    pub fn matches(steps: &[GradientStep]) -> Vec<Swatch> {
        steps.iter()
            .map(|s| Swatch::new(format!("Step {}", s.index), s.entry.lab)
                 .matched(s.entry.name.as_str(), s.delta_e))
            .collect()
    }
}

/// An HTML page showing one or more named columns of [`Swatch`]es
/// side by side, one row per position.
#[derive(Clone, Debug)]
pub struct Report {
    title: String,
    delta_label: String,
    columns: Vec<(String, Vec<Swatch>)>,
}

fn css_string(c: RGB8) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const STYLE: &str = "\
body { font-family: sans-serif; background-color: #f0f0f0; margin: 2em; }
table { border-spacing: 0px; margin: auto; box-shadow: 0 4px 8px rgba(0,0,0,0.1); }
th { padding: 8px; background-color: #ffffff; }
td.swatch { width: 320px; min-height: 80px; padding: 20px; text-align: center; }
td.swatch p { margin: 2px 0; }
.clamped { font-style: italic; }";

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Report { title: title.into(), delta_label: "dE".to_string(),
                 columns: vec![] }
    }

    /// Label printed in front of differences (e.g. "dE2000").
    pub fn delta_label(mut self, label: impl Into<String>) -> Self {
        self.delta_label = label.into();
        self
    }

    /// Add a column.  Use several times to compare sequences.
    pub fn column(mut self, name: impl Into<String>, swatches: Vec<Swatch>)
                  -> Self {
        self.columns.push((name.into(), swatches));
        self
    }

    fn rows(&self) -> usize {
        self.columns.iter().map(|(_, s)| s.len()).max().unwrap_or(0)
    }

    fn swatch(&self, fh: &mut impl Write, s: &Swatch) -> io::Result<()> {
        let rgb = s.lab.to_rgb8();
        let text = if s.lab.l > 50. { "black" } else { "white" };
        writeln!(fh, "  <td class=\"swatch\" style=\"background-color: {}; \
                      color: {text}\">", css_string(rgb))?;
        writeln!(fh, "    <p><b>{}</b></p>", escape(&s.label))?;
        writeln!(fh, "    <p>LAB: {}</p>", s.lab)?;
        if s.lab.is_in_gamut() {
            writeln!(fh, "    <p>RGB: {}, {}, {}</p>", rgb.r, rgb.g, rgb.b)?;
        } else {
            writeln!(fh, "    <p class=\"clamped\">RGB: {}, {}, {} \
                          (clamped)</p>", rgb.r, rgb.g, rgb.b)?;
        }
        match (&s.name, s.delta_e) {
            (Some(name), Some(d)) =>
                writeln!(fh, "    <p>Closest match: {} ({}: {d:.2})</p>",
                         escape(name), escape(&self.delta_label))?,
            (Some(name), None) => writeln!(fh, "    <p>{}</p>", escape(name))?,
            (None, Some(d)) =>
                writeln!(fh, "    <p>{}: {d:.2}</p>", escape(&self.delta_label))?,
            (None, None) => (),
        }
        writeln!(fh, "  </td>")
    }

    /// Write the HTML page to `fh`.
    pub fn write_to(&self, fh: &mut impl Write) -> io::Result<()> {
        writeln!(fh, "<!DOCTYPE html>\n\
                      <html>\n\
                      <head>\n\
                      <meta charset=\"UTF-8\">\n\
                      <title>{}</title>\n\
                      <style>\n{STYLE}\n</style>\n\
                      </head>\n\
                      <body>\n\
                      <table>",
                 escape(&self.title))?;
        write!(fh, "<tr>")?;
        for (name, _) in &self.columns {
            write!(fh, "<th>{}</th>", escape(name))?;
        }
        writeln!(fh, "</tr>")?;
        for i in 0 .. self.rows() {
            writeln!(fh, "<tr>")?;
            for (_, swatches) in &self.columns {
                match swatches.get(i) {
                    Some(s) => self.swatch(fh, s)?,
                    None => writeln!(fh, "  <td></td>")?,
                }
            }
            writeln!(fh, "</tr>")?;
        }
        writeln!(fh, "</table>\n\
                      </body>\n\
                      </html>")
    }

    /// Write the page to `path`.  The content goes to a temporary
    /// file in the same directory first, so that `path` is never left
    /// half written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp = temporary_path(path)?;
        let written = File::create(&tmp).and_then(|f| {
            let mut fh = BufWriter::new(f);
            self.write_to(&mut fh)?;
            fh.flush()
        }).and_then(|()| fs::rename(&tmp, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        info!("report written to {}", path.display());
        Ok(())
    }
}

fn temporary_path(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| Error::InvalidArgument(
        format!("{} is not a file path", path.display())))?;
    let mut tmp = std::ffi::OsString::from(".");
    tmp.push(name);
    tmp.push(".tmp");
    Ok(path.with_file_name(tmp))
}
