// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

use std::collections::BTreeMap;

use crate::strings::SharedStrings;
use crate::style::StyleTables;
use crate::worksheet::{Cell, Worksheet};

/// Type of visible sheet.
///
/// <http://officeopenxml.com/SSsheet.php>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetVisible {
    /// Visible
    #[default]
    Visible,
    /// Hidden
    Hidden,
    /// The sheet is hidden and cannot be displayed using the user interface. It is supported only by Excel formats.
    VeryHidden,
}

/// A `<sheet>` entry of the workbook manifest
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetInfo {
    /// Name declared in the manifest
    pub name: String,
    /// `sheetId`
    pub sheet_id: Option<u32>,
    /// Relationship id pointing at the sheet part
    pub relationship_id: Option<String>,
    /// Visibility
    pub visible: SheetVisible,
}

/// A `<definedName>` of the workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinedName {
    /// Name
    pub name: String,
    /// Formula the name stands for
    pub formula: String,
    /// Sheet the name is scoped to, `None` for workbook scope
    pub local_sheet_id: Option<u32>,
    /// Hidden from the user interface
    pub hidden: bool,
}

/// Document metadata from `docProps/core.xml` and `docProps/app.xml`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentProperties {
    /// `dc:creator`
    pub creator: Option<String>,
    /// `cp:lastModifiedBy`
    pub last_modified_by: Option<String>,
    /// `dcterms:created`, W3CDTF text
    pub created: Option<String>,
    /// `dcterms:modified`, W3CDTF text
    pub modified: Option<String>,
    /// Producing application
    pub application: Option<String>,
    /// Producing application version
    pub app_version: Option<String>,
    /// Company
    pub company: Option<String>,
}

#[cfg(feature = "chrono")]
impl DocumentProperties {
    /// Parses the creation timestamp
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        chrono::DateTime::parse_from_rfc3339(self.created.as_deref()?).ok()
    }

    /// Parses the last modification timestamp
    pub fn modified_at(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        chrono::DateTime::parse_from_rfc3339(self.modified.as_deref()?).ok()
    }
}

/// A file copied verbatim from the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaquePart {
    /// File name within its directory
    pub name: String,
    /// Raw bytes
    pub data: Vec<u8>,
}

/// Package parts preserved without interpretation.
///
/// Directory shaped resources are keyed by a sequential id starting at 1, in
/// file name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpaqueResources {
    /// `xl/externalLinks`
    pub external_links: BTreeMap<u32, OpaquePart>,
    /// `xl/drawings`
    pub drawings: BTreeMap<u32, OpaquePart>,
    /// `xl/printerSettings`
    pub printer_settings: BTreeMap<u32, OpaquePart>,
    /// `xl/worksheets/_rels`
    pub worksheet_rels: BTreeMap<u32, OpaquePart>,
    /// `xl/vbaProject.bin`
    pub macros: Option<Vec<u8>>,
}

impl OpaqueResources {
    /// Whether nothing was preserved
    pub fn is_empty(&self) -> bool {
        self.external_links.is_empty()
            && self.drawings.is_empty()
            && self.printer_settings.is_empty()
            && self.worksheet_rels.is_empty()
            && self.macros.is_none()
    }
}

/// A fully materialized workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    /// Worksheets in manifest order
    pub worksheets: Vec<Worksheet>,
    /// Manifest entries, one per worksheet
    pub sheets: Vec<SheetInfo>,
    /// Shared strings
    pub shared_strings: SharedStrings,
    /// Total string references declared by the shared string part
    pub string_references: Option<u32>,
    /// Style tables
    pub styles: StyleTables,
    /// Document metadata
    pub properties: DocumentProperties,
    /// Dates use the 1904 system
    pub date1904: bool,
    /// Defined names
    pub defined_names: Vec<DefinedName>,
    /// Raw `<definedNames>` markup
    pub defined_names_xml: Option<String>,
    /// Preserved resources
    pub resources: OpaqueResources,
}

impl Workbook {
    /// Sheet names in order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(|w| w.name.as_str()).collect()
    }

    /// Gets a worksheet by name
    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|w| w.name == name)
    }

    /// Gets a worksheet by name, mutably
    pub fn worksheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.worksheets.iter_mut().find(|w| w.name == name)
    }

    /// Gets the worksheet owning a cell
    pub fn worksheet_of(&self, cell: &Cell) -> Option<&Worksheet> {
        self.worksheets.get(cell.sheet)
    }

    /// Whether a macro project was preserved
    pub fn has_vba(&self) -> bool {
        self.resources.macros.is_some()
    }

    /// Reads a cell as a datetime when its number format is a date format.
    ///
    /// Always `None` for workbooks parsed in data-only mode, which carry no
    /// style tables.
    #[cfg(feature = "chrono")]
    pub fn cell_datetime(&self, cell: &Cell) -> Option<chrono::NaiveDateTime> {
        use crate::formats::FormatKind;

        match self.styles.format_kind(cell.style_id) {
            FormatKind::DateTime | FormatKind::TimeDelta => {
                cell.value.as_ref()?.as_datetime(self.date1904)
            }
            FormatKind::Other => None,
        }
    }
}


#[cfg(all(test, feature = "chrono"))]
mod date_tests {
    use super::*;
    use crate::datatype::CellValue;
    use crate::style::CellFormat;

    #[test]
    fn dates_follow_number_format() {
        let mut wb = Workbook::default();
        wb.styles.cell_xfs = vec![
            CellFormat::default(),
            CellFormat {
                num_fmt_id: 14,
                ..Default::default()
            },
        ];
        let mut cell = Cell::new(0, 0, 0, Some(CellValue::Int(25569)));
        assert!(wb.cell_datetime(&cell).is_none());
        cell.style_id = 1;
        assert_eq!(
            wb.cell_datetime(&cell).unwrap().to_string(),
            "1970-01-01 00:00:00"
        );

        wb.properties.created = Some("2024-03-01T10:00:00Z".to_string());
        assert!(wb.properties.created_at().is_some());
        assert!(wb.properties.modified_at().is_none());
    }
}
