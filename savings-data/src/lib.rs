//! Import and export of savings data.

pub mod export;
pub mod import;

pub use export::{CSV_HEADER, ExportError, to_csv, to_json, write_csv};
pub use import::{CsvImportError, load_from_file, load_from_str};
