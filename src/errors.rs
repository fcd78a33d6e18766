// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Error management module
//!
//! Provides all workbook parsing error conversion and description

use crate::package::ExtractionError;
use crate::xlsx::XlsxError;

/// A struct to handle any error and a message
#[derive(Debug)]
pub enum Error {
    /// IO error
    Io(std::io::Error),

    /// The file extension is neither xlsx nor xlsm
    UnsupportedFormat(String),
    /// The archive could not be extracted
    ExtractionFailed(ExtractionError),
    /// A document of the package could not be read
    Xlsx(XlsxError),

    /// The shared string table was loaded in read-only mode
    ReadOnly,
}

from_err!(std::io::Error, Error, Io);
from_err!(ExtractionError, Error, ExtractionFailed);
from_err!(XlsxError, Error, Xlsx);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::UnsupportedFormat(ext) => {
                write!(f, "Unsupported format '{ext}', expecting .xlsx or .xlsm")
            }
            Error::ExtractionFailed(e) => write!(f, "Cannot extract workbook: {e}"),
            Error::Xlsx(e) => write!(f, "Xlsx error: {e}"),
            Error::ReadOnly => write!(f, "Shared strings were loaded read-only"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::ExtractionFailed(e) => Some(e),
            Error::Xlsx(e) => Some(e),
            _ => None,
        }
    }
}
