// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

use std::collections::BTreeMap;

use log::warn;

use crate::datatype::CellValue;
use crate::reference::{encode, Dimensions};

/// The `t` attribute of a `<c>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellType {
    /// Number (no `t` attribute or `t="n"`)
    #[default]
    Number,
    /// Boolean (`t="b"`), stored as the integer 0 or 1
    Boolean,
    /// Index into the shared string table (`t="s"`)
    SharedString,
    /// Formula result string (`t="str"`)
    FormulaString,
    /// Inline rich or plain string (`t="inlineStr"`)
    InlineString,
    /// Error code (`t="e"`)
    Error,
    /// ISO 8601 date (`t="d"`)
    Date,
}

impl CellType {
    pub(crate) fn from_attribute(t: Option<&[u8]>) -> CellType {
        match t {
            Some(b"s") => CellType::SharedString,
            Some(b"str") => CellType::FormulaString,
            Some(b"inlineStr") => CellType::InlineString,
            Some(b"e") => CellType::Error,
            Some(b"d") => CellType::Date,
            Some(b"b") => CellType::Boolean,
            _ => CellType::Number,
        }
    }
}

/// The `t` attribute of a `<f>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaKind {
    /// Plain cell formula
    Normal,
    /// Array formula
    Array,
    /// Data table formula
    DataTable,
    /// Shared formula, see [`Formula::shared_index`]
    Shared,
}

/// A formula, kept as text. Formulas are never evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    /// Formula text, without the leading `=`
    pub text: String,
    /// Formula type
    pub kind: Option<FormulaKind>,
    /// Range the formula applies to (shared and array formulas)
    pub reference: Option<String>,
    /// Shared formula group id
    pub shared_index: Option<u32>,
}

/// A populated cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Index of the owning worksheet in its workbook
    pub sheet: usize,
    /// Row, 0 based
    pub row: u32,
    /// Column, 0 based
    pub col: u32,
    /// Resolved value, `None` when the cell has no value
    pub value: Option<CellValue>,
    /// Source type of the value
    pub kind: CellType,
    /// Formula
    pub formula: Option<Formula>,
    /// Index into [`StyleTables::cell_xfs`](crate::StyleTables::cell_xfs)
    pub style_id: u32,
}

impl Cell {
    /// Creates a plain cell with the default style.
    ///
    /// A string value is tagged [`CellType::InlineString`]: it has no shared
    /// string table slot.
    pub fn new(sheet: usize, row: u32, col: u32, value: Option<CellValue>) -> Cell {
        let kind = match value {
            Some(CellValue::String(_)) => CellType::InlineString,
            Some(CellValue::Error(_)) => CellType::Error,
            _ => CellType::Number,
        };
        Cell {
            sheet,
            row,
            col,
            value,
            kind,
            formula: None,
            style_id: 0,
        }
    }

    /// Gets the `A1` style reference of the cell
    pub fn reference(&self) -> String {
        encode(self.row, self.col)
    }
}

/// Row level formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowInfo {
    /// Row style id, 0 when unattributed
    pub style: u32,
    /// Explicit height in points
    pub height: Option<f64>,
}

/// A `<col>` record, applying to columns `min..=max` (1 based, as in the file)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnInfo {
    /// First column
    pub min: u32,
    /// Last column
    pub max: u32,
    /// Width in characters
    pub width: Option<f64>,
    /// Style id
    pub style: Option<u32>,
    /// Hidden
    pub hidden: bool,
    /// Width set by the user
    pub custom_width: bool,
    /// Width fitted to content
    pub best_fit: bool,
    /// Outline level
    pub outline_level: Option<u8>,
}

/// A `<dataValidation>` rule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataValidation {
    /// Ranges the rule applies to, space separated
    pub sqref: String,
    /// Validation type (`list`, `whole`, `decimal`, ...)
    pub validation_type: Option<String>,
    /// Comparison operator
    pub operator: Option<String>,
    /// Blank cells are valid
    pub allow_blank: bool,
    /// Show the input prompt
    pub show_input_message: bool,
    /// Show the error alert
    pub show_error_message: bool,
    /// Error alert title
    pub error_title: Option<String>,
    /// Error alert text
    pub error: Option<String>,
    /// Input prompt title
    pub prompt_title: Option<String>,
    /// Input prompt text
    pub prompt: Option<String>,
    /// First formula
    pub formula1: Option<String>,
    /// Second formula
    pub formula2: Option<String>,
}

/// Frozen or split panes of a sheet view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pane {
    /// Horizontal split position
    pub x_split: Option<f64>,
    /// Vertical split position
    pub y_split: Option<f64>,
    /// Top left visible cell of the bottom right pane
    pub top_left_cell: Option<String>,
    /// Active pane
    pub active_pane: Option<String>,
    /// `frozen`, `split` or `frozenSplit`
    pub state: Option<String>,
}

/// A `<selection>` of a sheet view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Pane the selection is in
    pub pane: Option<String>,
    /// Active cell
    pub active_cell: Option<String>,
    /// Selected ranges
    pub sqref: Option<String>,
}

/// The first `<sheetView>` of a worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetView {
    /// Sheet tab is selected
    pub tab_selected: bool,
    /// Zoom percentage
    pub zoom_scale: Option<u32>,
    /// Grid lines shown
    pub show_grid_lines: Option<bool>,
    /// Workbook view id
    pub workbook_view_id: u32,
    /// Panes
    pub pane: Option<Pane>,
    /// Selections
    pub selections: Vec<Selection>,
}

/// A worksheet: a sparse grid of cells plus sheet level metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    /// Position of the sheet in its workbook
    pub index: usize,
    /// Sheet name
    pub name: String,
    pub(crate) cells: BTreeMap<(u32, u32), Cell>,
    /// Row formatting by 0 based row index
    pub rows: BTreeMap<u32, RowInfo>,
    /// Merged ranges
    pub merged_cells: Vec<Dimensions>,
    /// Column formatting
    pub columns: Vec<ColumnInfo>,
    /// Data validation rules
    pub validations: Vec<DataValidation>,
    /// Sheet view
    pub sheet_view: Option<SheetView>,
    /// Relationship id of the legacy (VML) drawing
    pub legacy_drawing: Option<String>,
    /// Raw `<extLst>` markup
    pub ext_lst: Option<String>,
}

impl Worksheet {
    /// Creates an empty worksheet
    pub fn new(index: usize, name: &str) -> Worksheet {
        Worksheet {
            index,
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Gets the cell at (row, col)
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Gets the cell at (row, col) mutably
    pub fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        self.cells.get_mut(&(row, col))
    }

    /// Gets the value at (row, col)
    pub fn value(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cell(row, col)?.value.as_ref()
    }

    /// Stores a cell at its position, replacing any previous one.
    ///
    /// The cell is re-homed to this worksheet.
    pub fn insert_cell(&mut self, mut cell: Cell) -> Option<Cell> {
        cell.sheet = self.index;
        self.cells.insert((cell.row, cell.col), cell)
    }

    /// Sets the value at (row, col), creating the cell if needed.
    ///
    /// The cell type follows the value, strings are [`CellType::InlineString`].
    pub fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
        let sheet = self.index;
        let cell = self
            .cells
            .entry((row, col))
            .or_insert_with(|| Cell::new(sheet, row, col, None));
        cell.kind = match value {
            CellValue::String(_) => CellType::InlineString,
            CellValue::Error(_) => CellType::Error,
            _ => CellType::Number,
        };
        cell.value = Some(value);
    }

    /// Removes the cell at (row, col)
    pub fn remove_cell(&mut self, row: u32, col: u32) -> Option<Cell> {
        self.cells.remove(&(row, col))
    }

    /// Iterates cells in row major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Iterates the cells of one row, left to right
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = &Cell> {
        self.cells.range((row, 0)..=(row, u32::MAX)).map(|(_, c)| c)
    }

    /// Number of populated cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Smallest range holding every populated cell
    pub fn dimensions(&self) -> Option<Dimensions> {
        let (&(first_row, _), _) = self.cells.first_key_value()?;
        let (&(last_row, _), _) = self.cells.last_key_value()?;
        let (min_col, max_col) = self
            .cells
            .keys()
            .fold((u32::MAX, 0), |(min, max), &(_, c)| (min.min(c), max.max(c)));
        Some(Dimensions::new((first_row, min_col), (last_row, max_col)))
    }

    /// Sets an explicit row height in points.
    ///
    /// Negative or non finite heights are ignored.
    pub fn change_row_height(&mut self, row: u32, height: f64) {
        if !height.is_finite() || height < 0. {
            warn!("ignoring invalid height {height} for row {row}");
            return;
        }
        self.rows.entry(row).or_default().height = Some(height);
    }

    /// Gets the merged range covering (row, col), if any
    pub fn merged_range_at(&self, row: u32, col: u32) -> Option<&Dimensions> {
        self.merged_cells.iter().find(|d| d.contains(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_grid() {
        let mut ws = Worksheet::new(2, "Data");
        assert!(ws.dimensions().is_none());
        ws.set_value(4, 1, CellValue::Int(1));
        ws.set_value(0, 3, CellValue::from("a"));
        ws.set_value(2, 0, CellValue::Float(0.5));
        assert_eq!(ws.cell_count(), 3);
        assert_eq!(ws.value(4, 1), Some(&CellValue::Int(1)));
        assert_eq!(ws.cell(0, 3).unwrap().kind, CellType::InlineString);
        assert_eq!(ws.cell(0, 3).unwrap().sheet, 2);
        assert_eq!(
            ws.dimensions(),
            Some(Dimensions::new((0, 0), (4, 3)))
        );
        let order: Vec<_> = ws.cells().map(Cell::reference).collect();
        assert_eq!(order, ["D1", "A3", "B5"]);
    }

    #[test]
    fn string_cells_are_inline() {
        let cell = Cell::new(0, 0, 0, Some(CellValue::from("x")));
        assert_eq!(cell.kind, CellType::InlineString);

        let mut ws = Worksheet::new(0, "S");
        ws.set_value(0, 0, CellValue::Int(3));
        assert_eq!(ws.cell(0, 0).unwrap().kind, CellType::Number);
        ws.set_value(0, 0, CellValue::from("text"));
        assert_eq!(ws.cell(0, 0).unwrap().kind, CellType::InlineString);
    }

    #[test]
    fn insert_overwrites() {
        let mut ws = Worksheet::new(0, "S");
        assert!(ws
            .insert_cell(Cell::new(7, 1, 1, Some(CellValue::Int(1))))
            .is_none());
        let old = ws.insert_cell(Cell::new(7, 1, 1, Some(CellValue::Int(2))));
        assert_eq!(old.unwrap().value, Some(CellValue::Int(1)));
        assert_eq!(ws.cell(1, 1).unwrap().sheet, 0);
        assert_eq!(ws.value(1, 1), Some(&CellValue::Int(2)));
    }

    #[test]
    fn row_cells() {
        let mut ws = Worksheet::new(0, "S");
        ws.set_value(1, 5, CellValue::Int(5));
        ws.set_value(1, 0, CellValue::Int(0));
        ws.set_value(2, 0, CellValue::Int(9));
        let row: Vec<_> = ws.row_cells(1).map(|c| c.col).collect();
        assert_eq!(row, [0, 5]);
    }

    #[test]
    fn row_heights() {
        let mut ws = Worksheet::new(0, "S");
        ws.change_row_height(3, 21.5);
        ws.change_row_height(4, -1.);
        ws.change_row_height(5, f64::NAN);
        assert_eq!(ws.rows.get(&3).unwrap().height, Some(21.5));
        assert_eq!(ws.rows.get(&3).unwrap().style, 0);
        assert!(!ws.rows.contains_key(&4));
        assert!(!ws.rows.contains_key(&5));
    }

    #[test]
    fn merged_lookup() {
        let mut ws = Worksheet::new(0, "S");
        ws.merged_cells.push(Dimensions::new((0, 0), (1, 2)));
        assert!(ws.merged_range_at(1, 1).is_some());
        assert!(ws.merged_range_at(2, 1).is_none());
    }
}
