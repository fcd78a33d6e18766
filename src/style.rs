// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Typed style records and the workbook style tables.
//!
//! Fonts, fills and borders are addressed by their position in `styles.xml`.
//! Each entry carries a usage count derived from the `cellXfs` list; the count is
//! informative only and never used for indexing.

use std::fmt;

use log::warn;

use crate::formats::{builtin_format_by_id, detect_custom_number_format, FormatKind};

/// A color as found in a style part.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// ARGB color (`rgb="FFFF0000"`)
    Argb {
        /// Alpha channel
        a: u8,
        /// Red channel
        r: u8,
        /// Green channel
        g: u8,
        /// Blue channel
        b: u8,
    },
    /// Theme color with an optional tint in `[-1.0, 1.0]`
    Theme {
        /// Theme color index
        theme: u32,
        /// Tint
        tint: Option<f64>,
    },
    /// Legacy indexed palette color
    Indexed(u32),
    /// System automatic color
    Auto,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Argb { a, r, g, b } => write!(f, "{a:02X}{r:02X}{g:02X}{b:02X}"),
            Color::Theme { theme, tint: None } => write!(f, "theme:{theme}"),
            Color::Theme {
                theme,
                tint: Some(tint),
            } => write!(f, "theme:{theme}:{tint}"),
            Color::Indexed(i) => write!(f, "indexed:{i}"),
            Color::Auto => write!(f, "auto"),
        }
    }
}

/// A `<font>` record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Font {
    /// Font name
    pub name: Option<String>,
    /// Size in points
    pub size: Option<f64>,
    /// Bold
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Strike through
    pub strike: bool,
    /// Underline style (`single`, `double`, ...)
    pub underline: Option<String>,
    /// Font color
    pub color: Option<Color>,
    /// Font family
    pub family: Option<u32>,
    /// Character set
    pub charset: Option<u32>,
    /// Font scheme (`minor`, `major`)
    pub scheme: Option<String>,
}

/// A `<fill>` record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fill {
    /// Pattern type (`none`, `solid`, `gray125`, ...)
    pub pattern_type: Option<String>,
    /// Pattern foreground color
    pub foreground: Option<Color>,
    /// Pattern background color
    pub background: Option<Color>,
    /// Raw `<gradientFill>` markup, kept as is
    pub gradient: Option<String>,
}

/// One edge of a border
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorderSide {
    /// Line style (`thin`, `medium`, ...)
    pub style: Option<String>,
    /// Line color
    pub color: Option<Color>,
}

/// A `<border>` record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Border {
    /// Left edge
    pub left: Option<BorderSide>,
    /// Right edge
    pub right: Option<BorderSide>,
    /// Top edge
    pub top: Option<BorderSide>,
    /// Bottom edge
    pub bottom: Option<BorderSide>,
    /// Diagonal line
    pub diagonal: Option<BorderSide>,
    /// Diagonal from bottom left to top right
    pub diagonal_up: bool,
    /// Diagonal from top left to bottom right
    pub diagonal_down: bool,
}

/// A custom `<numFmt>`
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    /// Number format id, referenced by [`CellFormat::num_fmt_id`]
    pub id: u32,
    /// Format code, e.g. `yyyy-mm-dd`
    pub code: String,
}

/// Text alignment of an `<xf>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    /// Horizontal alignment
    pub horizontal: Option<String>,
    /// Vertical alignment
    pub vertical: Option<String>,
    /// Wrap text
    pub wrap_text: Option<bool>,
    /// Indent level
    pub indent: Option<u32>,
    /// Shrink to fit
    pub shrink_to_fit: Option<bool>,
    /// Text rotation in degrees (255 for vertical text)
    pub text_rotation: Option<i32>,
    /// Reading order
    pub reading_order: Option<u32>,
}

/// Cell protection of an `<xf>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Protection {
    /// Locked
    pub locked: Option<bool>,
    /// Formula hidden
    pub hidden: Option<bool>,
}

/// An `<xf>` record, from either `cellStyleXfs` or `cellXfs`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFormat {
    /// Number format id, built-in or custom
    pub num_fmt_id: u32,
    /// Position in the font table
    pub font_id: Option<u32>,
    /// Position in the fill table
    pub fill_id: Option<u32>,
    /// Position in the border table
    pub border_id: Option<u32>,
    /// Position in `cellStyleXfs` (only meaningful in `cellXfs`)
    pub xf_id: Option<u32>,
    /// applyNumberFormat
    pub apply_number_format: Option<bool>,
    /// applyFont
    pub apply_font: Option<bool>,
    /// applyFill
    pub apply_fill: Option<bool>,
    /// applyBorder
    pub apply_border: Option<bool>,
    /// applyAlignment
    pub apply_alignment: Option<bool>,
    /// applyProtection
    pub apply_protection: Option<bool>,
    /// Alignment
    pub alignment: Option<Alignment>,
    /// Protection
    pub protection: Option<Protection>,
}

/// A named `<cellStyle>`, e.g. "Normal"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedStyle {
    /// Style name
    pub name: String,
    /// Position in `cellStyleXfs`
    pub xf_id: u32,
    /// Built-in style id
    pub builtin_id: Option<u32>,
}

/// A style definition with the number of `cellXfs` records pointing at it
#[derive(Debug, Clone, PartialEq)]
pub struct StyleEntry<T> {
    /// The definition
    pub definition: T,
    /// Usage count
    pub count: usize,
}

impl<T> StyleEntry<T> {
    /// Creates an unused entry
    pub fn new(definition: T) -> Self {
        StyleEntry {
            definition,
            count: 0,
        }
    }
}

/// A style reference from a `cellXfs` record that does not resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingStyle {
    /// Position of the `xf` in `cellXfs`
    pub xf: usize,
    /// Table referenced ("font", "fill" or "border")
    pub table: &'static str,
    /// The unresolved id
    pub id: u32,
}

impl fmt::Display for DanglingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cellXfs[{}] references {} {} which does not exist",
            self.xf, self.table, self.id
        )
    }
}

/// All style tables of a workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleTables {
    /// Fonts, id is the position
    pub fonts: Vec<StyleEntry<Font>>,
    /// Fills, id is the position
    pub fills: Vec<StyleEntry<Fill>>,
    /// Borders, id is the position
    pub borders: Vec<StyleEntry<Border>>,
    /// Custom number formats, in document order
    pub number_formats: Vec<NumberFormat>,
    /// Master formats of named styles
    pub cell_style_xfs: Vec<CellFormat>,
    /// Cell formats, referenced by [`Cell::style_id`](crate::Cell::style_id)
    pub cell_xfs: Vec<CellFormat>,
    /// Named cell styles
    pub cell_styles: Vec<NamedStyle>,
    /// Custom indexed palette (`rgb` values)
    pub indexed_colors: Vec<String>,
    /// Most recently used colors
    pub mru_colors: Vec<String>,
}

impl StyleTables {
    /// Recomputes font, fill and border usage counts from `cell_xfs`.
    ///
    /// A record without one of the ids does not count toward that table.
    /// References that do not resolve are skipped and returned.
    pub fn tally_usage(&mut self) -> Vec<DanglingStyle> {
        for font in &mut self.fonts {
            font.count = 0;
        }
        for fill in &mut self.fills {
            fill.count = 0;
        }
        for border in &mut self.borders {
            border.count = 0;
        }

        let mut dangling = Vec::new();
        for (xf, format) in self.cell_xfs.iter().enumerate() {
            if let Some(id) = format.font_id {
                match self.fonts.get_mut(id as usize) {
                    Some(e) => e.count += 1,
                    None => dangling.push(DanglingStyle {
                        xf,
                        table: "font",
                        id,
                    }),
                }
            }
            if let Some(id) = format.fill_id {
                match self.fills.get_mut(id as usize) {
                    Some(e) => e.count += 1,
                    None => dangling.push(DanglingStyle {
                        xf,
                        table: "fill",
                        id,
                    }),
                }
            }
            if let Some(id) = format.border_id {
                match self.borders.get_mut(id as usize) {
                    Some(e) => e.count += 1,
                    None => dangling.push(DanglingStyle {
                        xf,
                        table: "border",
                        id,
                    }),
                }
            }
        }
        dangling
    }

    /// Gets the cell format of a cell style id
    pub fn cell_format(&self, style_id: u32) -> Option<&CellFormat> {
        self.cell_xfs.get(style_id as usize)
    }

    /// Gets the font used by a cell style id
    pub fn font(&self, style_id: u32) -> Option<&Font> {
        let id = self.cell_format(style_id)?.font_id?;
        self.fonts.get(id as usize).map(|e| &e.definition)
    }

    /// Gets the fill used by a cell style id
    pub fn fill(&self, style_id: u32) -> Option<&Fill> {
        let id = self.cell_format(style_id)?.fill_id?;
        self.fills.get(id as usize).map(|e| &e.definition)
    }

    /// Gets the border used by a cell style id
    pub fn border(&self, style_id: u32) -> Option<&Border> {
        let id = self.cell_format(style_id)?.border_id?;
        self.borders.get(id as usize).map(|e| &e.definition)
    }

    /// Gets the custom format code of a cell style id, if it uses one
    pub fn number_format_code(&self, style_id: u32) -> Option<&str> {
        let id = self.cell_format(style_id)?.num_fmt_id;
        self.number_formats
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.code.as_str())
    }

    /// Classifies the number format of a cell style id.
    ///
    /// Custom formats take precedence over built-in ids, as in Excel.
    pub fn format_kind(&self, style_id: u32) -> FormatKind {
        let Some(format) = self.cell_format(style_id) else {
            return FormatKind::Other;
        };
        match self.number_format_code(style_id) {
            Some(code) => detect_custom_number_format(code),
            None => builtin_format_by_id(format.num_fmt_id),
        }
    }

    /// Finds a font equal to `font` or appends it, returning its id.
    pub fn get_or_insert_font(&mut self, font: Font) -> u32 {
        match self.fonts.iter().position(|e| e.definition == font) {
            Some(id) => id as u32,
            None => {
                self.fonts.push(StyleEntry::new(font));
                (self.fonts.len() - 1) as u32
            }
        }
    }

    /// Logs every dangling reference found by [`StyleTables::tally_usage`]
    pub(crate) fn warn_dangling(dangling: &[DanglingStyle]) {
        for d in dangling {
            warn!("{d}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xf(font: Option<u32>, fill: Option<u32>, border: Option<u32>) -> CellFormat {
        CellFormat {
            font_id: font,
            fill_id: fill,
            border_id: border,
            ..Default::default()
        }
    }

    fn tables() -> StyleTables {
        StyleTables {
            fonts: vec![
                StyleEntry::new(Font::default()),
                StyleEntry::new(Font {
                    bold: true,
                    ..Default::default()
                }),
                StyleEntry::new(Font {
                    italic: true,
                    ..Default::default()
                }),
            ],
            fills: vec![StyleEntry::new(Fill::default())],
            borders: vec![StyleEntry::new(Border::default())],
            ..Default::default()
        }
    }

    #[test]
    fn usage_counts() {
        let mut styles = tables();
        styles.cell_xfs = vec![
            xf(Some(0), Some(0), Some(0)),
            xf(Some(0), None, Some(0)),
            xf(Some(1), None, None),
        ];
        assert!(styles.tally_usage().is_empty());
        let counts: Vec<_> = styles.fonts.iter().map(|f| f.count).collect();
        assert_eq!(counts, [2, 1, 0]);
        assert_eq!(styles.fills[0].count, 1);
        assert_eq!(styles.borders[0].count, 2);

        // counting again does not accumulate
        styles.tally_usage();
        assert_eq!(styles.fonts[0].count, 2);
    }

    #[test]
    fn dangling_references() {
        let mut styles = tables();
        styles.cell_xfs = vec![xf(Some(7), Some(0), Some(3))];
        let dangling = styles.tally_usage();
        assert_eq!(
            dangling,
            [
                DanglingStyle {
                    xf: 0,
                    table: "font",
                    id: 7
                },
                DanglingStyle {
                    xf: 0,
                    table: "border",
                    id: 3
                }
            ]
        );
        assert_eq!(styles.fills[0].count, 1);
    }

    #[test]
    fn format_lookup() {
        let mut styles = tables();
        styles.number_formats = vec![NumberFormat {
            id: 164,
            code: "yyyy-mm-dd".to_string(),
        }];
        styles.cell_xfs = vec![
            CellFormat::default(),
            CellFormat {
                num_fmt_id: 164,
                font_id: Some(1),
                ..Default::default()
            },
            CellFormat {
                num_fmt_id: 14,
                ..Default::default()
            },
        ];
        assert_eq!(styles.format_kind(0), FormatKind::Other);
        assert_eq!(styles.format_kind(1), FormatKind::DateTime);
        assert_eq!(styles.format_kind(2), FormatKind::DateTime);
        assert_eq!(styles.format_kind(9), FormatKind::Other);
        assert_eq!(styles.number_format_code(1), Some("yyyy-mm-dd"));
        assert!(styles.font(1).unwrap().bold);
        assert!(styles.font(0).is_none());
    }

    #[test]
    fn insert_font_dedupes() {
        let mut styles = tables();
        let bold = Font {
            bold: true,
            ..Default::default()
        };
        assert_eq!(styles.get_or_insert_font(bold), 1);
        let big = Font {
            size: Some(20.0),
            ..Default::default()
        };
        assert_eq!(styles.get_or_insert_font(big), 3);
        assert_eq!(styles.fonts.len(), 4);
    }

    #[test]
    fn colors() {
        let c = Color::Argb {
            a: 0xFF,
            r: 0x12,
            g: 0xAB,
            b: 0x00,
        };
        assert_eq!(c.to_string(), "FF12AB00");
        assert_eq!(Color::Indexed(64).to_string(), "indexed:64");
    }
}
