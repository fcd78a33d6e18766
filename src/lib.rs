// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Rust xlsx/xlsm workbook model
//!
//! # Status
//!
//! **xlmodel** parses an Office Open XML spreadsheet package (`.xlsx`/`.xlsm`)
//! into a fully materialized, mutable in-memory [`Workbook`]: cells, formulas,
//! styles, shared strings, document properties, sheet metadata and the package
//! parts it does not interpret (drawings, external links, macros...), kept as
//! raw bytes.
//!
//! Formulas are kept as text and never evaluated.
//!
//! # Examples
//! ```no_run
//! use xlmodel::{open_workbook, CellValue};
//!
//! let workbook = open_workbook("report.xlsx").expect("Cannot open file");
//!
//! for sheet in &workbook.worksheets {
//!     let numbers = sheet
//!         .cells()
//!         .filter(|c| matches!(c.value, Some(CellValue::Int(_) | CellValue::Float(_))))
//!         .count();
//!     println!("'{}' has {} numeric cells", sheet.name, numbers);
//! }
//!
//! // Formulas are available as text
//! if let Some(sheet) = workbook.worksheet("Totals") {
//!     for cell in sheet.cells().filter(|c| c.formula.is_some()) {
//!         println!("{}: ={}", cell.reference(), cell.formula.as_ref().unwrap().text);
//!     }
//! }
//! ```
//!
//! Parsing is tunable through [`ParseOptions`]:
//! ```no_run
//! use xlmodel::{open_workbook_with_options, ParseOptions};
//!
//! // values only: no styles, properties, sheet metadata or opaque parts
//! let options = ParseOptions::default().data_only(true).read_only(true);
//! let workbook = open_workbook_with_options("large.xlsx", &options).unwrap();
//! # let _ = workbook;
//! ```
#![deny(missing_docs)]

#[macro_use]
mod utils;

mod datatype;
pub mod errors;
mod formats;
mod package;
mod reference;
mod strings;
mod style;
mod workbook;
mod worksheet;
mod xlsx;

use std::path::{Path, PathBuf};

use log::debug;

pub use crate::datatype::{CellErrorType, CellValue};
pub use crate::errors::Error;
pub use crate::formats::{builtin_format_by_id, detect_custom_number_format, FormatKind};
pub use crate::package::ExtractionError;
pub use crate::reference::{
    column_index, column_name, encode, ColumnCache, Dimensions, ReferenceCodec, MAX_COLUMNS,
    MAX_ROWS,
};
pub use crate::strings::SharedStrings;
pub use crate::style::{
    Alignment, Border, BorderSide, CellFormat, Color, DanglingStyle, Fill, Font, NamedStyle,
    NumberFormat, Protection, StyleEntry, StyleTables,
};
pub use crate::workbook::{
    DefinedName, DocumentProperties, OpaquePart, OpaqueResources, SheetInfo, SheetVisible,
    Workbook,
};
pub use crate::worksheet::{
    Cell, CellType, ColumnInfo, DataValidation, Formula, FormulaKind, Pane, RowInfo, Selection,
    SheetView, Worksheet,
};
pub use crate::xlsx::XlsxError;

/// Options controlling what a parse materializes.
///
/// ```
/// use xlmodel::ParseOptions;
///
/// let options = ParseOptions::default().read_only(true).strict_counts(true);
/// assert!(options.read_only);
/// assert!(!options.data_only);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Only read cell values and formulas.
    ///
    /// Styles, core and app properties (except sheet names), sheet metadata and
    /// opaque resources are skipped and every style id is 0.
    pub data_only: bool,
    /// Load the shared string table without its reverse index and drop the raw
    /// markup kept for re-serialization
    pub read_only: bool,
    /// Fail on advisory count mismatches and dangling style references instead
    /// of logging a warning
    pub strict_counts: bool,
    /// Parent directory for the extraction, the system temp directory if `None`
    pub work_dir: Option<PathBuf>,
}

impl ParseOptions {
    /// Sets data only mode
    pub fn data_only(mut self, data_only: bool) -> Self {
        self.data_only = data_only;
        self
    }

    /// Sets read only mode
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets strict count checks
    pub fn strict_counts(mut self, strict_counts: bool) -> Self {
        self.strict_counts = strict_counts;
        self
    }

    /// Sets the extraction parent directory
    pub fn work_dir<P: Into<PathBuf>>(mut self, work_dir: P) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }
}

/// Workbook parser, holding its options and the reference codec.
///
/// The codec, and its column cache, is reused across parses.
#[derive(Debug)]
pub struct WorkbookParser<C = std::collections::HashMap<String, u32>> {
    options: ParseOptions,
    codec: ReferenceCodec<C>,
}

impl WorkbookParser {
    /// Creates a parser with a default codec
    pub fn new(options: ParseOptions) -> Self {
        WorkbookParser {
            options,
            codec: ReferenceCodec::new(),
        }
    }
}

impl Default for WorkbookParser {
    fn default() -> Self {
        WorkbookParser::new(ParseOptions::default())
    }
}

impl<C: ColumnCache> WorkbookParser<C> {
    /// Replaces the reference codec
    pub fn with_codec<D: ColumnCache>(self, codec: ReferenceCodec<D>) -> WorkbookParser<D> {
        WorkbookParser {
            options: self.options,
            codec,
        }
    }

    /// Gets the options
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Gets the reference codec
    pub fn codec(&self) -> &ReferenceCodec<C> {
        &self.codec
    }

    /// Parses the workbook at `path`.
    ///
    /// Only `.xlsx` and `.xlsm` files are accepted, the extension is checked
    /// before touching the file system.
    pub fn parse<P: AsRef<Path>>(&mut self, path: P) -> Result<Workbook, Error> {
        let path = path.as_ref();
        check_extension(path)?;
        debug!("parsing {} with {:?}", path.display(), self.options);
        let workbook = xlsx::read_workbook(path, &self.options, &mut self.codec)?;
        debug!(
            "parsed {} sheets, {} shared strings",
            workbook.worksheets.len(),
            workbook.shared_strings.len()
        );
        Ok(workbook)
    }
}

fn check_extension(path: &Path) -> Result<(), Error> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm") => {
            Ok(())
        }
        Some(ext) => Err(Error::UnsupportedFormat(ext.to_owned())),
        None => Err(Error::UnsupportedFormat(String::new())),
    }
}

/// Opens a workbook with default options
pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook, Error> {
    open_workbook_with_options(path, &ParseOptions::default())
}

/// Opens a workbook with the given options
pub fn open_workbook_with_options<P: AsRef<Path>>(
    path: P,
    options: &ParseOptions,
) -> Result<Workbook, Error> {
    WorkbookParser::new(options.clone()).parse(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("book.xlsx")]
    #[case("BOOK.XLSM")]
    #[case("dir.v2/Book.XlSx")]
    fn accepted_extensions(#[case] name: &str) {
        assert!(check_extension(Path::new(name)).is_ok());
    }

    #[rstest]
    #[case("book.xls", "xls")]
    #[case("book.xlsb", "xlsb")]
    #[case("book.ods", "ods")]
    #[case("book", "")]
    fn rejected_extensions(#[case] name: &str, #[case] ext: &str) {
        match check_extension(Path::new(name)) {
            Err(Error::UnsupportedFormat(e)) => assert_eq!(e, ext),
            r => panic!("unexpected {r:?}"),
        }
    }

    #[test]
    fn unsupported_format_does_no_io() {
        // the file does not exist: an extraction attempt would be an Io error
        assert!(matches!(
            open_workbook("/nonexistent/book.csv"),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn options_builder() {
        let options = ParseOptions::default()
            .data_only(true)
            .read_only(true)
            .strict_counts(true)
            .work_dir("/tmp/x");
        assert_eq!(
            options,
            ParseOptions {
                data_only: true,
                read_only: true,
                strict_counts: true,
                work_dir: Some(PathBuf::from("/tmp/x")),
            }
        );
    }
}
