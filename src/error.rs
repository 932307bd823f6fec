use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("the catalog contains no usable color")]
    EmptyCatalog,

    #[error("column {0:?} not found in the catalog header")]
    MissingColumn(String),

    #[error("sheet {0:?} not found in the workbook")]
    SheetNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
