//! Catalog of named reference colors, read from delimited text or
//! from a sheet of a spreadsheet workbook.

use std::{fs::File, io, ops::Deref, path::Path};
use calamine::{Data, Range, Reader};
use csv::StringRecord;
use serde::Deserialize;
use tracing::{debug, info, warn};
use crate::{Error, Lab, Result};

/// A named reference color.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub lab: Lab,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, lab: Lab) -> Self {
        CatalogEntry { name: name.into(), lab }
    }
}

/// Ordered, non-empty collection of [`CatalogEntry`].
#[derive(Clone, Debug)]
pub struct Catalog {
    entries: Vec<CatalogEntry>, // Invariant: non-empty
}

impl Catalog {
    /// Fails with [`Error::EmptyCatalog`] if `entries` is empty.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        if entries.is_empty() { return Err(Error::EmptyCatalog) }
        Ok(Catalog { entries })
    }
}

impl Deref for Catalog {
    type Target = [CatalogEntry];

    fn deref(&self) -> &[CatalogEntry] { &self.entries }
}

/// A column of the catalog file, by header name or by 0-based index.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Column {
    Index(usize),
    Name(String),
}

impl Column {
    fn resolve(&self, header: Option<&StringRecord>) -> Result<usize> {
        match self {
            Column::Index(i) => Ok(*i),
            Column::Name(name) => header
                .and_then(|h| h.iter()
                          .position(|f| f.trim().eq_ignore_ascii_case(name)))
                .ok_or_else(|| Error::MissingColumn(name.clone())),
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self { Column::Name(name.to_string()) }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub name: Column,
    pub l: Column,
    pub a: Column,
    pub b: Column,
}

impl Default for Columns {
    fn default() -> Self {
        Columns { name: "name".into(), l: "L".into(),
                  a: "a".into(), b: "b".into() }
    }
}

/// Layout of a catalog file.  Files with a spreadsheet extension
/// (`.xlsx`, `.xls`, `.ods`,...) are read from the sheet `sheet`, other
/// files as text separated by `delimiter`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogSource {
    /// Field separator of text files, an ASCII character.
    pub delimiter: char,
    /// Name of the worksheet to read; the first one if absent.
    pub sheet: Option<String>,
    /// Whether the first row (after `skip_rows`) holds column names.
    pub header: bool,
    /// Number of leading rows to ignore, before the header if any.
    pub skip_rows: usize,
    pub columns: Columns,
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource { delimiter: ';', sheet: None, header: true,
                        skip_rows: 0, columns: Columns::default() }
    }
}

struct Indices { name: usize, l: usize, a: usize, b: usize }

const SPREADSHEET_EXTENSIONS: [&str; 7] =
    ["xlsx", "xlsm", "xlsb", "xls", "xla", "xlam", "ods"];

fn is_spreadsheet(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| {
        SPREADSHEET_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e))
    })
}

impl CatalogSource {
    /// Read the catalog stored at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Catalog> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let catalog = if is_spreadsheet(path) {
            let mut workbook = calamine::open_workbook_auto(path)?;
            let sheet = self.sheet_name(&workbook.sheet_names())?;
            debug!(%sheet, "reading {}", path.display());
            self.read_range(&workbook.worksheet_range(&sheet)?)?
        } else {
            self.read(File::open(path)?)?
        };
        info!("loaded {} colors from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Read a catalog from any source of delimited text.  Rows with
    /// a blank name or a missing or non-numeric coordinate are
    /// skipped.
    pub fn read<R: io::Read>(&self, rdr: R) -> Result<Catalog> {
        if !self.delimiter.is_ascii() {
            return Err(Error::InvalidArgument(format!(
                "the delimiter {:?} is not an ASCII character", self.delimiter)));
        }
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter as u8)
            .has_headers(false)
            .flexible(true)
            .from_reader(rdr);
        self.collect(reader.records())
    }

    /// Read a catalog from the cells of a worksheet, with the same
    /// rules as [`CatalogSource::read`].  Row and column numbers are
    /// those of the sheet, even if `range` does not start at A1.
    pub fn read_range(&self, range: &Range<Data>) -> Result<Catalog> {
        let (row0, col0) = range.start().unwrap_or((0, 0));
        let leading = (0 .. row0).map(|_| StringRecord::new());
        let rows = range.rows().map(|cells| {
            let mut record = StringRecord::new();
            for _ in 0 .. col0 { record.push_field("") }
            for cell in cells { record.push_field(&cell.to_string()) }
            record
        });
        self.collect(leading.chain(rows).map(Ok))
    }

    fn sheet_name(&self, names: &[String]) -> Result<String> {
        match &self.sheet {
            Some(sheet) => names.iter().find(|n| *n == sheet).cloned()
                .ok_or_else(|| Error::SheetNotFound(sheet.clone())),
            None => names.first().cloned().ok_or(Error::EmptyCatalog),
        }
    }

    fn collect<I>(&self, records: I) -> Result<Catalog>
    where I: Iterator<Item = csv::Result<StringRecord>> {
        let mut records = records.skip(self.skip_rows);
        let header = if self.header { records.next().transpose()? }
                     else { None };
        let idx = self.indices(header.as_ref())?;
        // 1-based row number of the first data row.
        let first = self.skip_rows + usize::from(self.header) + 1;

        let mut entries = Vec::new();
        let mut discarded = 0_usize;
        for (i, record) in records.enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                    warn!("skipping catalog row: {e}");
                    discarded += 1;
                    continue
                }
                Err(e) => return Err(e.into()),
            };
            match parse_row(&record, &idx) {
                Some(entry) => entries.push(entry),
                None => {
                    debug!(row = first + i, "skipping catalog row {:?}", record);
                    discarded += 1;
                }
            }
        }
        if discarded > 0 {
            info!(discarded, "skipped catalog rows with missing or invalid data");
        }
        Catalog::new(entries)
    }

    fn indices(&self, header: Option<&StringRecord>) -> Result<Indices> {
        let c = &self.columns;
        Ok(Indices { name: c.name.resolve(header)?, l: c.l.resolve(header)?,
                     a: c.a.resolve(header)?, b: c.b.resolve(header)? })
    }
}

fn parse_row(record: &StringRecord, idx: &Indices) -> Option<CatalogEntry> {
    let name = record.get(idx.name)?.trim();
    if name.is_empty() { return None }
    let l = parse_number(record.get(idx.l)?)?;
    let a = parse_number(record.get(idx.a)?)?;
    let b = parse_number(record.get(idx.b)?)?;
    Some(CatalogEntry::new(name, Lab::new(l, a, b)))
}

/// Parse a decimal number written with either `.` or `,` as decimal
/// separator.  Whitespace (including non-breaking spaces used as
/// thousands separator) is ignored.  Non-finite values are rejected.
pub fn parse_number(s: &str) -> Option<f64> {
    let s: String = s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if s.is_empty() { return None }
    s.parse::<f64>().ok().filter(|x| x.is_finite())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_with_decimal_comma() {
        assert_eq!(parse_number("53,5"), Some(53.5));
        assert_eq!(parse_number(" -4.25 "), Some(-4.25));
        assert_eq!(parse_number("1\u{a0}234,5"), Some(1234.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("  "), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn invalid_rows_are_discarded() {
        let data = "name;L;a;b\n\
                    Folio-100;53,0;2,5;-4,0\n\
                    ;50;0;0\n\
                    Folio-101;;1;1\n\
                    Folio-102;abc;1;1\n\
                    Folio-103;40\n\
                    Folio-104;  61.2 ; -0,5;3\n";
        let catalog = CatalogSource::default().read(data.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0], CatalogEntry::new("Folio-100",
                                                 Lab::new(53., 2.5, -4.)));
        assert_eq!(catalog[1].name, "Folio-104");
        assert_eq!(catalog[1].lab, Lab::new(61.2, -0.5, 3.));
    }

    #[test]
    fn columns_by_name_in_any_order() {
        let data = "B,Code,l,A\n-1.5,X1,70,2\n";
        let source = CatalogSource {
            delimiter: ',',
            columns: Columns { name: "code".into(), ..Columns::default() },
            ..CatalogSource::default() };
        let catalog = source.read(data.as_bytes()).unwrap();
        assert_eq!(catalog[0], CatalogEntry::new("X1", Lab::new(70., 2., -1.5)));
    }

    #[test]
    fn columns_by_index_after_skipped_rows() {
        let data = "Folio catalog\n\
                    id;name;x;L;y;a;z;b\n\
                    1;Grey 40;-;40,1;-;0,2;-;-0,3\n\
                    2;Grey 60;-;60;-;0;-;0\n";
        let source = CatalogSource {
            header: false,
            skip_rows: 2,
            columns: Columns { name: Column::Index(1), l: Column::Index(3),
                               a: Column::Index(5), b: Column::Index(7) },
            ..CatalogSource::default() };
        let catalog = source.read(data.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].lab, Lab::new(40.1, 0.2, -0.3));
        assert_eq!(catalog[1].name, "Grey 60");
    }

    #[test]
    fn missing_column() {
        let data = "name;L;a;beta\nX;1;2;3\n";
        let err = CatalogSource::default().read(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "b"), "{err}");
        let headerless = CatalogSource { header: false,
                                         ..CatalogSource::default() };
        assert!(matches!(headerless.read(data.as_bytes()),
                         Err(Error::MissingColumn(_))));
    }

    #[test]
    fn empty_catalog() {
        let data = "name;L;a;b\n;1;2;3\nX;?;2;3\n";
        assert!(matches!(CatalogSource::default().read(data.as_bytes()),
                         Err(Error::EmptyCatalog)));
        assert!(matches!(CatalogSource::default().read(&b""[..]),
                         Err(Error::MissingColumn(_))));
        assert!(matches!(Catalog::new(vec![]), Err(Error::EmptyCatalog)));
    }

    fn folio_sheet() -> Range<Data> {
        // Two title rows, then name in D and L*, a*, b* in AQ, AS, AU.
        let mut range = Range::new((0, 0), (4, 46));
        range.set_value((0, 0), Data::String("Каталог Folio".into()));
        range.set_value((1, 3), Data::String("Цвет".into()));
        range.set_value((1, 42), Data::String("L".into()));
        let rows: [(&str, Data, Data, Data); 3] = [
            ("Folio-100", Data::Float(53.), Data::Float(2.5), Data::Float(-4.)),
            ("Folio-150", Data::String("61,2".into()), Data::Int(0),
             Data::Float(-3.5)),
            ("Folio-999", Data::Empty, Data::Float(1.), Data::Float(1.)),
        ];
        for (i, (name, l, a, b)) in rows.into_iter().enumerate() {
            let r = i as u32 + 2;
            range.set_value((r, 3), Data::String(name.into()));
            range.set_value((r, 42), l);
            range.set_value((r, 44), a);
            range.set_value((r, 46), b);
        }
        range
    }

    fn folio_source() -> CatalogSource {
        CatalogSource {
            sheet: Some("Каталог Folio".into()),
            header: false,
            skip_rows: 2,
            columns: Columns { name: Column::Index(3), l: Column::Index(42),
                               a: Column::Index(44), b: Column::Index(46) },
            ..CatalogSource::default() }
    }

    #[test]
    fn worksheet_columns_by_index() {
        let catalog = folio_source().read_range(&folio_sheet()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0], CatalogEntry::new("Folio-100",
                                                 Lab::new(53., 2.5, -4.)));
        assert_eq!(catalog[1], CatalogEntry::new("Folio-150",
                                                 Lab::new(61.2, 0., -3.5)));
    }

    #[test]
    fn worksheet_not_starting_at_a1() {
        // Cells B2:E3, the first row and column of the sheet are empty.
        let mut range = Range::new((1, 1), (2, 4));
        for (j, h) in ["Name", "L", "A", "B"].into_iter().enumerate() {
            range.set_value((1, j as u32 + 1), Data::String(h.into()));
        }
        range.set_value((2, 1), Data::String("Grey 60".into()));
        range.set_value((2, 2), Data::Float(60.));
        range.set_value((2, 3), Data::Float(0.5));
        range.set_value((2, 4), Data::Float(-0.5));
        let by_name = CatalogSource { skip_rows: 1, ..CatalogSource::default() };
        let catalog = by_name.read_range(&range).unwrap();
        assert_eq!(catalog[0], CatalogEntry::new("Grey 60",
                                                 Lab::new(60., 0.5, -0.5)));
        let by_index = CatalogSource {
            header: false, skip_rows: 2,
            columns: Columns { name: Column::Index(1), l: Column::Index(2),
                               a: Column::Index(3), b: Column::Index(4) },
            ..CatalogSource::default() };
        assert_eq!(by_index.read_range(&range).unwrap()[0], catalog[0]);
        assert!(matches!(by_index.read_range(&Range::empty()),
                         Err(Error::EmptyCatalog)));
    }

    #[test]
    fn sheet_selection() {
        let names = vec!["Notes".to_string(), "Каталог Folio".to_string()];
        assert_eq!(folio_source().sheet_name(&names).unwrap(), "Каталог Folio");
        assert_eq!(CatalogSource::default().sheet_name(&names).unwrap(), "Notes");
        let other = CatalogSource { sheet: Some("Folio".into()),
                                    ..CatalogSource::default() };
        let err = other.sheet_name(&names).unwrap_err();
        assert!(matches!(err, Error::SheetNotFound(ref s) if s == "Folio"), "{err}");
    }

    #[test]
    fn spreadsheets_by_extension() {
        assert!(is_spreadsheet(Path::new("Каталог.XLSX")));
        assert!(is_spreadsheet(Path::new("dir/catalog.ods")));
        assert!(!is_spreadsheet(Path::new("catalog.csv")));
        assert!(!is_spreadsheet(Path::new("xlsx")));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.xlsx");
        std::fs::write(&path, "name;L;a;b\nX;1;2;3\n").unwrap();
        let err = CatalogSource::default().load(&path).unwrap_err();
        assert!(matches!(err, Error::Spreadsheet(_)), "{err}");
    }

    #[test]
    fn missing_file() {
        let err = CatalogSource::default()
            .load("/nonexistent/catalog.csv").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
