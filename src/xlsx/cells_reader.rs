// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

use std::borrow::Cow;

use log::warn;
use quick_xml::{
    events::{BytesStart, Event},
    name::QName,
};

use super::{
    attr_string, read_raw_fragment, read_string, read_text, xml_reader, XlReader, XlsxError,
};
use crate::{
    datatype::{CellErrorType, CellValue},
    reference::{encode, ColumnCache, ReferenceCodec, MAX_COLUMNS, MAX_ROWS},
    strings::SharedStrings,
    utils::parse_bool,
    worksheet::{
        Cell, CellType, ColumnInfo, DataValidation, Formula, FormulaKind, Pane, RowInfo,
        Selection, SheetView, Worksheet,
    },
};

/// Read-only state shared by every worksheet of a workbook
pub(crate) struct SheetContext<'a> {
    pub strings: &'a SharedStrings,
    pub data_only: bool,
    /// Keep raw markup (`<extLst>`) for later re-serialization
    pub keep_raw: bool,
}

/// Materializes one worksheet document
pub(crate) fn read_worksheet<C: ColumnCache>(
    data: &[u8],
    index: usize,
    name: &str,
    ctx: &SheetContext<'_>,
    codec: &mut ReferenceCodec<C>,
) -> Result<Worksheet, XlsxError> {
    let mut xml = xml_reader(data);
    let mut sheet = Worksheet::new(index, name);
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"worksheet" => (),
                b"sheetData" => read_sheet_data(&mut xml, &mut sheet, ctx, codec)?,
                b"sheetViews" if !ctx.data_only => sheet.sheet_view = read_sheet_views(&mut xml)?,
                b"cols" if !ctx.data_only => sheet.columns = read_columns(&mut xml)?,
                b"mergeCells" if !ctx.data_only => read_merge_cells(&mut xml, &mut sheet, codec)?,
                b"dataValidations" if !ctx.data_only => {
                    sheet.validations = read_data_validations(&mut xml)?
                }
                b"legacyDrawing" if !ctx.data_only => {
                    for a in e.attributes() {
                        let a = a.map_err(XlsxError::XmlAttr)?;
                        if a.key.local_name().as_ref() == b"id" {
                            sheet.legacy_drawing = Some(attr_string(&xml, &a)?);
                        }
                    }
                    xml.read_to_end_into(e.name(), &mut Vec::new())?;
                }
                b"extLst" if !ctx.data_only && ctx.keep_raw => {
                    sheet.ext_lst = Some(read_raw_fragment(&mut xml, e, "extLst")?)
                }
                _ => {
                    xml.read_to_end_into(e.name(), &mut Vec::new())?;
                }
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"worksheet" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("worksheet")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(sheet)
}

/// A `<c>` read but not stored yet: its row may not qualify
struct PendingCell {
    cell: Cell,
    has_value: bool,
}

fn read_sheet_data<C: ColumnCache>(
    xml: &mut XlReader<'_>,
    sheet: &mut Worksheet,
    ctx: &SheetContext<'_>,
    codec: &mut ReferenceCodec<C>,
) -> Result<(), XlsxError> {
    let mut row_index = 0;
    let mut cells = Vec::new();
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref row_element)) if row_element.local_name().as_ref() == b"row" => {
                let mut style = None;
                let mut height = None;
                for a in row_element.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    match a.key {
                        QName(b"r") => {
                            row_index = match atoi_simd::parse::<u32>(&a.value) {
                                Ok(r) if r > 0 && r <= MAX_ROWS => r - 1,
                                _ => {
                                    return Err(XlsxError::InvalidReference(
                                        String::from_utf8_lossy(&a.value).into_owned(),
                                    ))
                                }
                            }
                        }
                        QName(b"s") => style = Some(atoi_simd::parse::<u32>(&a.value).unwrap_or(0)),
                        QName(b"ht") => height = Some(a.value.into_owned()),
                        _ => (),
                    }
                }

                // the running counter walked off the sheet
                if row_index >= MAX_ROWS {
                    return Err(XlsxError::InvalidReference(format!("row {}", row_index + 1)));
                }

                cells.clear();
                read_row(xml, sheet.index, row_index, ctx, codec, &mut cells)?;
                let qualifies = cells.iter().any(|c| c.has_value);

                if !ctx.data_only && (qualifies || style.is_some() || height.is_some()) {
                    let height = height.and_then(|ht| match fast_float2::parse::<f64, _>(&ht) {
                        Ok(h) if h.is_finite() && h >= 0. => Some(h),
                        _ => {
                            warn!(
                                "ignoring invalid height '{}' for row {}",
                                String::from_utf8_lossy(&ht),
                                row_index + 1
                            );
                            None
                        }
                    });
                    sheet.rows.insert(
                        row_index,
                        RowInfo {
                            style: style.unwrap_or(0),
                            height,
                        },
                    );
                }
                if qualifies {
                    for pending in cells.drain(..) {
                        sheet.insert_cell(pending.cell);
                    }
                }
                row_index += 1;
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sheetData" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("sheetData")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(())
}

fn read_row<C: ColumnCache>(
    xml: &mut XlReader<'_>,
    sheet_index: usize,
    row: u32,
    ctx: &SheetContext<'_>,
    codec: &mut ReferenceCodec<C>,
    cells: &mut Vec<PendingCell>,
) -> Result<(), XlsxError> {
    let mut col_index = 0;
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref c_element)) if c_element.local_name().as_ref() == b"c" => {
                // Extract all needed attributes in one pass
                let mut pos_attr = None;
                let mut style_attr = None;
                let mut type_attr = None;
                for a in c_element.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    let Cow::Borrowed(val) = a.value else {
                        continue;
                    };
                    match a.key {
                        QName(b"r") => pos_attr = Some(val),
                        QName(b"s") => style_attr = Some(val),
                        QName(b"t") => type_attr = Some(val),
                        _ => {}
                    }
                }
                let (row, col) = match pos_attr {
                    Some(r) => codec.decode(&xml.decoder().decode(r)?)?,
                    None if col_index < MAX_COLUMNS => (row, col_index),
                    None => return Err(XlsxError::InvalidReference(encode(row, col_index))),
                };
                col_index = col + 1;

                let kind = CellType::from_attribute(type_attr);
                let style_id = match style_attr {
                    Some(s) if !ctx.data_only => atoi_simd::parse::<u32>(s).unwrap_or(0),
                    _ => 0,
                };
                let mut cell = Cell {
                    sheet: sheet_index,
                    row,
                    col,
                    value: None,
                    kind,
                    formula: None,
                    style_id,
                };
                let has_value = read_cell_content(xml, &mut cell, ctx.strings)?;
                cells.push(PendingCell { cell, has_value });
            }
            Ok(Event::Start(ref e)) => {
                xml.read_to_end_into(e.name(), &mut Vec::new())?;
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"row" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("row")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(())
}

/// Reads the children of a `<c>` into `cell`.
///
/// Returns whether the cell has a value child (`<v>` or `<is>`), empty or not.
fn read_cell_content(
    xml: &mut XlReader<'_>,
    cell: &mut Cell,
    strings: &SharedStrings,
) -> Result<bool, XlsxError> {
    let mut raw = None;
    let mut inline = None;
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"v" => raw = Some(read_text(xml, e.name())?),
                b"is" => inline = Some(read_string(xml, e.name())?),
                b"f" => cell.formula = read_formula(xml, e)?,
                _ => {
                    xml.read_to_end_into(e.name(), &mut Vec::new())?;
                }
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"c" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("c")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }

    let has_value = raw.is_some() || inline.is_some();
    cell.value = match (inline, raw) {
        (Some(s), _) if !s.is_empty() => Some(CellValue::String(s)),
        (_, Some(v)) if !v.is_empty() => Some(read_v(v, cell.kind, strings)?),
        _ => None,
    };
    Ok(has_value)
}

/// Resolves the raw text of a `<v>` according to the cell type
fn read_v(v: String, kind: CellType, strings: &SharedStrings) -> Result<CellValue, XlsxError> {
    match kind {
        CellType::SharedString => {
            let index = atoi_simd::parse::<usize>(v.trim().as_bytes())
                .map_err(|_| XlsxError::MalformedNumber(v.clone()))?;
            match strings.get(index) {
                Some(s) => Ok(CellValue::String(s.to_owned())),
                None => Err(XlsxError::DanglingStringIndex {
                    index,
                    len: strings.len(),
                }),
            }
        }
        CellType::FormulaString | CellType::InlineString | CellType::Date => {
            Ok(CellValue::String(v))
        }
        CellType::Error => Ok(CellValue::Error(CellErrorType::from_code(&v))),
        CellType::Number | CellType::Boolean => parse_number(&v),
    }
}

/// Floats when the text has a decimal point or an exponent, integers otherwise.
///
/// Non finite values (`NaN`, `inf`, overflowing exponents) are malformed.
fn parse_number(v: &str) -> Result<CellValue, XlsxError> {
    let v = v.trim();
    let malformed = || XlsxError::MalformedNumber(v.to_owned());
    let parse_float = || match fast_float2::parse::<f64, _>(v.as_bytes()) {
        Ok(f) if f.is_finite() => Ok(CellValue::Float(f)),
        _ => Err(malformed()),
    };
    if v.contains(['.', 'e', 'E']) {
        return parse_float();
    }
    match atoi_simd::parse::<i64>(v.as_bytes()) {
        Ok(i) => Ok(CellValue::Int(i)),
        // integers past i64 are still numbers
        Err(_) if is_integer(v) => parse_float(),
        Err(_) => Err(malformed()),
    }
}

/// `[+-]?[0-9]+`
fn is_integer(v: &str) -> bool {
    let digits = v.strip_prefix(['+', '-']).unwrap_or(v);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn read_formula(xml: &mut XlReader<'_>, e: &BytesStart<'_>) -> Result<Option<Formula>, XlsxError> {
    let mut kind = None;
    let mut reference = None;
    let mut shared_index = None;
    for a in e.attributes() {
        let a = a.map_err(XlsxError::XmlAttr)?;
        match a.key {
            QName(b"t") => {
                kind = match a.value.as_ref() {
                    b"normal" => Some(FormulaKind::Normal),
                    b"array" => Some(FormulaKind::Array),
                    b"dataTable" => Some(FormulaKind::DataTable),
                    b"shared" => Some(FormulaKind::Shared),
                    t => {
                        warn!("unknown formula type '{}'", String::from_utf8_lossy(t));
                        None
                    }
                }
            }
            QName(b"ref") => reference = Some(attr_string(xml, &a)?),
            QName(b"si") => shared_index = atoi_simd::parse::<u32>(&a.value).ok(),
            _ => (),
        }
    }
    let text = read_text(xml, e.name())?;
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(Formula {
        text,
        kind,
        reference,
        shared_index,
    }))
}

/// Only the first `<sheetView>` is kept
fn read_sheet_views(xml: &mut XlReader<'_>) -> Result<Option<SheetView>, XlsxError> {
    let mut view: Option<SheetView> = None;
    let mut buf = Vec::with_capacity(512);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sheetView" => {
                if view.is_some() {
                    xml.read_to_end_into(e.name(), &mut Vec::new())?;
                    continue;
                }
                let mut v = SheetView::default();
                for a in e.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    match a.key {
                        QName(b"tabSelected") => v.tab_selected = parse_bool(&a.value).unwrap_or(false),
                        QName(b"zoomScale") => v.zoom_scale = atoi_simd::parse::<u32>(&a.value).ok(),
                        QName(b"showGridLines") => v.show_grid_lines = parse_bool(&a.value),
                        QName(b"workbookViewId") => {
                            v.workbook_view_id = atoi_simd::parse::<u32>(&a.value).unwrap_or(0)
                        }
                        _ => (),
                    }
                }
                view = Some(v);
            }
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"pane" => {
                let mut pane = Pane::default();
                for a in e.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    match a.key {
                        QName(b"xSplit") => pane.x_split = fast_float2::parse::<f64, _>(&*a.value).ok(),
                        QName(b"ySplit") => pane.y_split = fast_float2::parse::<f64, _>(&*a.value).ok(),
                        QName(b"topLeftCell") => pane.top_left_cell = Some(attr_string(xml, &a)?),
                        QName(b"activePane") => pane.active_pane = Some(attr_string(xml, &a)?),
                        QName(b"state") => pane.state = Some(attr_string(xml, &a)?),
                        _ => (),
                    }
                }
                if let Some(v) = view.as_mut() {
                    v.pane = Some(pane);
                }
            }
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"selection" => {
                let mut selection = Selection::default();
                for a in e.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    match a.key {
                        QName(b"pane") => selection.pane = Some(attr_string(xml, &a)?),
                        QName(b"activeCell") => selection.active_cell = Some(attr_string(xml, &a)?),
                        QName(b"sqref") => selection.sqref = Some(attr_string(xml, &a)?),
                        _ => (),
                    }
                }
                if let Some(v) = view.as_mut() {
                    v.selections.push(selection);
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sheetViews" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("sheetViews")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(view)
}

fn read_columns(xml: &mut XlReader<'_>) -> Result<Vec<ColumnInfo>, XlsxError> {
    let mut columns = Vec::new();
    let mut buf = Vec::with_capacity(512);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"col" => {
                let mut col = ColumnInfo::default();
                for a in e.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    let v = &a.value;
                    match a.key {
                        QName(b"min") => col.min = atoi_simd::parse::<u32>(v).unwrap_or(0),
                        QName(b"max") => col.max = atoi_simd::parse::<u32>(v).unwrap_or(0),
                        QName(b"width") => col.width = fast_float2::parse::<f64, _>(&**v).ok(),
                        QName(b"style") => col.style = atoi_simd::parse::<u32>(v).ok(),
                        QName(b"hidden") => col.hidden = parse_bool(v).unwrap_or(false),
                        QName(b"customWidth") => col.custom_width = parse_bool(v).unwrap_or(false),
                        QName(b"bestFit") => col.best_fit = parse_bool(v).unwrap_or(false),
                        QName(b"outlineLevel") => col.outline_level = atoi_simd::parse::<u8>(v).ok(),
                        _ => (),
                    }
                }
                columns.push(col);
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"cols" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("cols")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(columns)
}

fn read_merge_cells<C: ColumnCache>(
    xml: &mut XlReader<'_>,
    sheet: &mut Worksheet,
    codec: &mut ReferenceCodec<C>,
) -> Result<(), XlsxError> {
    let mut buf = Vec::with_capacity(512);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"mergeCell" => {
                for a in e.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    if a.key == QName(b"ref") {
                        let range = xml.decoder().decode(&a.value)?;
                        sheet.merged_cells.push(codec.decode_range(&range)?);
                        break;
                    }
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"mergeCells" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("mergeCells")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(())
}

fn read_data_validations(xml: &mut XlReader<'_>) -> Result<Vec<DataValidation>, XlsxError> {
    let mut validations = Vec::new();
    let mut buf = Vec::with_capacity(512);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"dataValidation" => {
                let mut dv = DataValidation::default();
                for a in e.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    match a.key {
                        QName(b"sqref") => dv.sqref = attr_string(xml, &a)?,
                        QName(b"type") => dv.validation_type = Some(attr_string(xml, &a)?),
                        QName(b"operator") => dv.operator = Some(attr_string(xml, &a)?),
                        QName(b"allowBlank") => dv.allow_blank = parse_bool(&a.value).unwrap_or(false),
                        QName(b"showInputMessage") => {
                            dv.show_input_message = parse_bool(&a.value).unwrap_or(false)
                        }
                        QName(b"showErrorMessage") => {
                            dv.show_error_message = parse_bool(&a.value).unwrap_or(false)
                        }
                        QName(b"errorTitle") => dv.error_title = Some(attr_string(xml, &a)?),
                        QName(b"error") => dv.error = Some(attr_string(xml, &a)?),
                        QName(b"promptTitle") => dv.prompt_title = Some(attr_string(xml, &a)?),
                        QName(b"prompt") => dv.prompt = Some(attr_string(xml, &a)?),
                        _ => (),
                    }
                }
                let mut inner = Vec::with_capacity(128);
                loop {
                    inner.clear();
                    match xml.read_event_into(&mut inner) {
                        Ok(Event::Start(ref f)) if f.local_name().as_ref() == b"formula1" => {
                            dv.formula1 = Some(read_text(xml, f.name())?)
                        }
                        Ok(Event::Start(ref f)) if f.local_name().as_ref() == b"formula2" => {
                            dv.formula2 = Some(read_text(xml, f.name())?)
                        }
                        Ok(Event::End(ref end)) if end.local_name().as_ref() == b"dataValidation" => {
                            break
                        }
                        Ok(Event::Eof) => return Err(XlsxError::XmlEof("dataValidation")),
                        Err(e) => return Err(XlsxError::Xml(e)),
                        _ => (),
                    }
                }
                validations.push(dv);
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"dataValidations" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("dataValidations")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(validations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Dimensions;
    use rstest::rstest;

    fn sheet_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{body}</worksheet>"#
        )
    }

    fn read(body: &str, strings: &SharedStrings, data_only: bool) -> Result<Worksheet, XlsxError> {
        let ctx = SheetContext {
            strings,
            data_only,
            keep_raw: true,
        };
        read_worksheet(
            sheet_xml(body).as_bytes(),
            1,
            "Sheet",
            &ctx,
            &mut ReferenceCodec::new(),
        )
    }

    fn strings() -> SharedStrings {
        SharedStrings::from_strings(vec!["zero".to_string(), "one".to_string()], true)
    }

    #[rstest]
    #[case("3.0", CellValue::Float(3.0))]
    #[case("3", CellValue::Int(3))]
    #[case("-12", CellValue::Int(-12))]
    #[case("1E-3", CellValue::Float(0.001))]
    #[case("2.5e2", CellValue::Float(250.0))]
    fn numeric_values(#[case] raw: &str, #[case] expected: CellValue) {
        let body = format!(r#"<sheetData><row r="1"><c r="A1"><v>{raw}</v></c></row></sheetData>"#);
        let ws = read(&body, &strings(), false).unwrap();
        assert_eq!(ws.value(0, 0), Some(&expected));
    }

    #[test]
    fn typed_values() {
        let body = r#"<sheetData><row r="2">
<c r="A2" t="s"><v>1</v></c>
<c r="B2" t="str"><f>CONCAT("a","b")</f><v>ab</v></c>
<c r="C2" t="e"><v>#DIV/0!</v></c>
<c r="D2" t="e"><v>#WEIRD!</v></c>
<c r="E2" t="b"><v>1</v></c>
<c r="F2" t="inlineStr"><is><r><t>in</t></r><r><t>line</t></r></is></c>
<c r="G2" t="d"><v>2024-05-01T00:00:00</v></c>
<c r="H2" t="s"><v></v></c>
</row></sheetData>"#;
        let ws = read(body, &strings(), false).unwrap();
        assert_eq!(ws.value(1, 0), Some(&CellValue::String("one".to_string())));
        assert_eq!(ws.cell(1, 0).unwrap().kind, CellType::SharedString);
        assert_eq!(ws.value(1, 1), Some(&CellValue::String("ab".to_string())));
        assert_eq!(
            ws.cell(1, 1).unwrap().formula.as_ref().unwrap().text,
            r#"CONCAT("a","b")"#
        );
        assert_eq!(ws.value(1, 2), Some(&CellValue::Error(CellErrorType::Div0)));
        assert_eq!(
            ws.value(1, 3),
            Some(&CellValue::Error(CellErrorType::Other("#WEIRD!".to_string())))
        );
        assert_eq!(ws.value(1, 4), Some(&CellValue::Int(1)));
        assert_eq!(ws.cell(1, 4).unwrap().kind, CellType::Boolean);
        assert_eq!(ws.value(1, 5), Some(&CellValue::String("inline".to_string())));
        assert_eq!(
            ws.value(1, 6),
            Some(&CellValue::String("2024-05-01T00:00:00".to_string()))
        );
        let empty = ws.cell(1, 7).unwrap();
        assert_eq!(empty.value, None);
        assert_eq!(empty.kind, CellType::SharedString);
        assert!(ws.cells().all(|c| c.sheet == 1));
    }

    #[test]
    fn dangling_string_index() {
        let body = r#"<sheetData><row r="1"><c r="A1" t="s"><v>2</v></c></row></sheetData>"#;
        assert!(matches!(
            read(body, &strings(), false),
            Err(XlsxError::DanglingStringIndex { index: 2, len: 2 })
        ));
    }

    #[rstest]
    #[case(r#"<c r="a1"><v>1</v></c>"#)]
    #[case(r#"<c r="1A"><v>1</v></c>"#)]
    #[case(r#"<c r="A0"><v>1</v></c>"#)]
    fn invalid_references(#[case] cell: &str) {
        let body = format!(r#"<sheetData><row r="1">{cell}</row></sheetData>"#);
        assert!(matches!(
            read(&body, &strings(), false),
            Err(XlsxError::InvalidReference(_))
        ));
    }

    #[rstest]
    #[case("abc")]
    #[case("NaN")]
    #[case("inf")]
    #[case("-Infinity")]
    #[case("1e999")]
    #[case("12a")]
    fn malformed_number(#[case] raw: &str) {
        let body = format!(r#"<sheetData><row r="1"><c r="A1"><v>{raw}</v></c></row></sheetData>"#);
        assert!(matches!(
            read(&body, &strings(), false),
            Err(XlsxError::MalformedNumber(_))
        ));
    }

    #[rstest]
    #[case("99999999999999999999", 1e20)]
    #[case("-99999999999999999999", -1e20)]
    fn integers_past_i64(#[case] raw: &str, #[case] expected: f64) {
        let body = format!(r#"<sheetData><row r="1"><c r="A1"><v>{raw}</v></c></row></sheetData>"#);
        let ws = read(&body, &strings(), false).unwrap();
        assert_eq!(ws.value(0, 0), Some(&CellValue::Float(expected)));
    }

    #[rstest]
    #[case(r#"<row r="1048576"><c><v>1</v></c></row><row><c><v>2</v></c></row>"#)]
    #[case(r#"<row r="1048577"><c><v>1</v></c></row>"#)]
    #[case(r#"<row r="4294967295"><c><v>1</v></c></row>"#)]
    #[case(r#"<row r="1"><c r="XFD1"><v>1</v></c><c><v>2</v></c></row>"#)]
    #[case(r#"<row r="1"><c r="XFE1"><v>1</v></c></row>"#)]
    fn positions_past_sheet_bounds(#[case] rows: &str) {
        let body = format!("<sheetData>{rows}</sheetData>");
        assert!(matches!(
            read(&body, &strings(), false),
            Err(XlsxError::InvalidReference(_))
        ));
    }

    #[test]
    fn last_row_and_column() {
        let body = r#"<sheetData><row r="1048576"><c r="XFC1048576"><v>1</v></c><c><v>2</v></c></row></sheetData>"#;
        let ws = read(body, &strings(), false).unwrap();
        assert_eq!(ws.value(MAX_ROWS - 1, MAX_COLUMNS - 1), Some(&CellValue::Int(2)));
    }

    #[test]
    fn rows_without_values() {
        let body = r#"<sheetData>
<row r="1"><c r="A1" s="3"/><c r="B1" s="4"/></row>
<row r="2" s="5" customFormat="1" ht="30" customHeight="1"><c r="A2" s="5"/></row>
<row r="3" ht="oops"><c r="A3"><v>7</v></c><c r="B3" s="2"/></row>
<row r="4" ht="-3"/>
</sheetData>"#;
        let ws = read(body, &strings(), false).unwrap();

        // row 1: no value, no row attributes
        assert!(ws.row_cells(0).next().is_none());
        assert!(!ws.rows.contains_key(&0));

        // row 2: no value, but metadata is kept
        assert!(ws.row_cells(1).next().is_none());
        assert_eq!(
            ws.rows[&1],
            RowInfo {
                style: 5,
                height: Some(30.0)
            }
        );

        // row 3 qualifies: every cell is kept
        assert_eq!(ws.row_cells(2).count(), 2);
        assert_eq!(ws.cell(2, 1).unwrap().value, None);
        assert_eq!(ws.cell(2, 1).unwrap().style_id, 2);
        assert_eq!(ws.rows[&2], RowInfo::default());

        assert_eq!(ws.rows[&3].height, None);
    }

    #[test]
    fn positions_without_references() {
        let body = r#"<sheetData>
<row><c><v>1</v></c><c><v>2</v></c><c r="E1"><v>3</v></c><c><v>4</v></c></row>
<row><c><v>5</v></c></row>
<row r="10"><c><v>6</v></c></row>
</sheetData>"#;
        let ws = read(body, &strings(), false).unwrap();
        let refs: Vec<_> = ws.cells().map(Cell::reference).collect();
        assert_eq!(refs, ["A1", "B1", "E1", "F1", "A2", "A10"]);
    }

    #[test]
    fn last_write_wins() {
        let body = r#"<sheetData><row r="1"><c r="A1"><v>1</v></c><c r="A1"><v>2</v></c></row></sheetData>"#;
        let ws = read(body, &strings(), false).unwrap();
        assert_eq!(ws.cell_count(), 1);
        assert_eq!(ws.value(0, 0), Some(&CellValue::Int(2)));
    }

    #[test]
    fn formulas() {
        let body = r#"<sheetData><row r="1">
<c r="A1"><f t="shared" ref="A1:A3" si="0">B1*2</f><v>4</v></c>
<c r="B1"><f t="array" ref="B1:B1">SUM(C1:C2 &gt; 0)</f><v>1</v></c>
<c r="C1"><f t="shared" si="0"/><v>6</v></c>
</row></sheetData>"#;
        let ws = read(body, &strings(), false).unwrap();
        assert_eq!(
            ws.cell(0, 0).unwrap().formula,
            Some(Formula {
                text: "B1*2".to_string(),
                kind: Some(FormulaKind::Shared),
                reference: Some("A1:A3".to_string()),
                shared_index: Some(0),
            })
        );
        let array = ws.cell(0, 1).unwrap().formula.as_ref().unwrap();
        assert_eq!(array.text, "SUM(C1:C2 > 0)");
        assert_eq!(array.kind, Some(FormulaKind::Array));
        assert!(ws.cell(0, 2).unwrap().formula.is_none());
    }

    const METADATA: &str = r#"<sheetPr><tabColor rgb="FFFF0000"/></sheetPr>
<dimension ref="A1:B2"/>
<sheetViews>
  <sheetView tabSelected="1" zoomScale="125" workbookViewId="0">
    <pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/>
    <selection pane="bottomLeft" activeCell="B2" sqref="B2"/>
  </sheetView>
  <sheetView workbookViewId="1"/>
</sheetViews>
<cols><col min="1" max="2" width="12.5" style="1" customWidth="1"/><col min="3" max="3" width="4" hidden="1" outlineLevel="1"/></cols>
<sheetData><row r="1" s="1" ht="20"><c r="A1" s="1"><v>1</v></c></row></sheetData>
<mergeCells count="2"><mergeCell ref="A1:B1"/><mergeCell ref="C3"/></mergeCells>
<dataValidations count="1">
  <dataValidation type="list" allowBlank="1" showErrorMessage="1" errorTitle="Oops" sqref="A2:A9">
    <formula1>"yes,no"</formula1>
  </dataValidation>
</dataValidations>
<legacyDrawing r:id="rId3"/>
<extLst><ext uri="{X}"><x14:thing xmlns:x14="urn:x14"/></ext></extLst>"#;

    #[test]
    fn sheet_metadata() {
        let ws = read(METADATA, &strings(), false).unwrap();

        let view = ws.sheet_view.as_ref().unwrap();
        assert!(view.tab_selected);
        assert_eq!(view.zoom_scale, Some(125));
        let pane = view.pane.as_ref().unwrap();
        assert_eq!(pane.y_split, Some(1.0));
        assert_eq!(pane.state.as_deref(), Some("frozen"));
        assert_eq!(view.selections.len(), 1);
        assert_eq!(view.selections[0].active_cell.as_deref(), Some("B2"));

        assert_eq!(ws.columns.len(), 2);
        assert_eq!(ws.columns[0].width, Some(12.5));
        assert!(ws.columns[0].custom_width);
        assert!(ws.columns[1].hidden);
        assert_eq!(ws.columns[1].outline_level, Some(1));

        assert_eq!(
            ws.merged_cells,
            [
                Dimensions::new((0, 0), (0, 1)),
                Dimensions::new((2, 2), (2, 2))
            ]
        );

        assert_eq!(ws.validations.len(), 1);
        let dv = &ws.validations[0];
        assert_eq!(dv.validation_type.as_deref(), Some("list"));
        assert!(dv.allow_blank);
        assert!(dv.show_error_message);
        assert!(!dv.show_input_message);
        assert_eq!(dv.error_title.as_deref(), Some("Oops"));
        assert_eq!(dv.formula1.as_deref(), Some("\"yes,no\""));
        assert_eq!(dv.formula2, None);

        assert_eq!(ws.legacy_drawing.as_deref(), Some("rId3"));
        assert!(ws.ext_lst.as_deref().unwrap().starts_with("<extLst>"));
        assert_eq!(ws.value(0, 0), Some(&CellValue::Int(1)));
        assert_eq!(ws.cell(0, 0).unwrap().style_id, 1);
    }

    #[test]
    fn data_only_skips_metadata() {
        let ws = read(METADATA, &strings(), true).unwrap();
        assert!(ws.sheet_view.is_none());
        assert!(ws.columns.is_empty());
        assert!(ws.merged_cells.is_empty());
        assert!(ws.validations.is_empty());
        assert!(ws.legacy_drawing.is_none());
        assert!(ws.ext_lst.is_none());
        assert!(ws.rows.is_empty());
        assert_eq!(ws.value(0, 0), Some(&CellValue::Int(1)));
        assert_eq!(ws.cell(0, 0).unwrap().style_id, 0);
    }
}
