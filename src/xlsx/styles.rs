// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! `xl/styles.xml` reader.
//!
//! Collections are read with a single routine, [`read_list`], whatever the number of
//! children. Ids are positional: any id attribute found on an item is ignored.

use log::warn;
use quick_xml::{
    events::{attributes::Attributes, BytesStart, Event},
    name::QName,
};

use super::{attr_string, get_attribute, read_raw_fragment, xml_reader, XlReader, XlsxError};
use crate::style::{
    Alignment, Border, BorderSide, CellFormat, Color, Fill, Font, NamedStyle, NumberFormat,
    Protection, StyleEntry, StyleTables,
};
use crate::utils::parse_bool;

fn parse_u32(v: &[u8]) -> Option<u32> {
    atoi_simd::parse::<u32>(v).ok()
}

fn parse_f64(v: &[u8]) -> Option<f64> {
    fast_float2::parse::<f64, _>(v).ok()
}

/// Reports an advisory inconsistency, fatal when `strict`
fn malformed(msg: String, strict: bool) -> Result<(), XlsxError> {
    if strict {
        return Err(XlsxError::MalformedStyles(msg));
    }
    warn!("{msg}");
    Ok(())
}

/// Builds the style tables and their usage counts
pub(crate) fn read_styles(data: &[u8], strict: bool) -> Result<StyleTables, XlsxError> {
    let mut xml = xml_reader(data);
    let mut styles = StyleTables::default();
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"numFmts" => {
                    styles.number_formats =
                        read_list(&mut xml, e, b"numFmt", strict, read_number_format)?
                }
                b"fonts" => {
                    styles.fonts = read_list(&mut xml, e, b"font", strict, |xml, e| {
                        read_font(xml, e).map(StyleEntry::new)
                    })?
                }
                b"fills" => {
                    styles.fills = read_list(&mut xml, e, b"fill", strict, |xml, e| {
                        read_fill(xml, e).map(StyleEntry::new)
                    })?
                }
                b"borders" => {
                    styles.borders = read_list(&mut xml, e, b"border", strict, |xml, e| {
                        read_border(xml, e).map(StyleEntry::new)
                    })?
                }
                b"cellStyleXfs" => {
                    styles.cell_style_xfs = read_list(&mut xml, e, b"xf", strict, read_xf)?
                }
                b"cellXfs" => styles.cell_xfs = read_list(&mut xml, e, b"xf", strict, read_xf)?,
                b"cellStyles" => {
                    styles.cell_styles =
                        read_list(&mut xml, e, b"cellStyle", strict, read_named_style)?
                }
                b"colors" => read_colors(&mut xml, &mut styles)?,
                b"dxfs" | b"tableStyles" | b"extLst" => {
                    xml.read_to_end_into(e.name(), &mut Vec::new())?;
                }
                _ => (),
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"styleSheet" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("styleSheet")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }

    let dangling = styles.tally_usage();
    if let Some(first) = dangling.first() {
        if strict {
            return Err(XlsxError::MalformedStyles(first.to_string()));
        }
        StyleTables::warn_dangling(&dangling);
    }
    Ok(styles)
}

/// Reads every `item` child of the `list` collection in document order.
///
/// The number of items read is checked against the declared `count`.
fn read_list<T, F>(
    xml: &mut XlReader<'_>,
    list: &BytesStart<'_>,
    item: &[u8],
    strict: bool,
    mut read_item: F,
) -> Result<Vec<T>, XlsxError>
where
    F: FnMut(&mut XlReader<'_>, &BytesStart<'_>) -> Result<T, XlsxError>,
{
    let declared = get_attribute(list.attributes(), QName(b"count"))?.and_then(parse_u32);
    let mut items = Vec::new();
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == item => {
                items.push(read_item(xml, e)?)
            }
            Ok(Event::Start(ref e)) => {
                xml.read_to_end_into(e.name(), &mut Vec::new())?;
            }
            Ok(Event::End(ref e)) if e.local_name() == list.local_name() => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("styles collection")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    if let Some(declared) = declared {
        if declared as usize != items.len() {
            let name = String::from_utf8_lossy(list.local_name().as_ref()).into_owned();
            malformed(
                format!(
                    "<{name}> declares {declared} items but has {}",
                    items.len()
                ),
                strict,
            )?;
        }
    }
    Ok(items)
}

fn read_number_format(xml: &mut XlReader<'_>, e: &BytesStart<'_>) -> Result<NumberFormat, XlsxError> {
    let mut format = NumberFormat {
        id: 0,
        code: String::new(),
    };
    for a in e.attributes() {
        let a = a.map_err(XlsxError::XmlAttr)?;
        match a.key {
            QName(b"numFmtId") => format.id = parse_u32(&a.value).unwrap_or(0),
            QName(b"formatCode") => format.code = attr_string(xml, &a)?,
            _ => (),
        }
    }
    xml.read_to_end_into(e.name(), &mut Vec::new())?;
    Ok(format)
}

fn read_font(xml: &mut XlReader<'_>, e: &BytesStart<'_>) -> Result<Font, XlsxError> {
    let mut font = Font::default();
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref child)) => {
                let val = get_attribute(child.attributes(), QName(b"val"))?;
                match child.local_name().as_ref() {
                    b"b" => font.bold = val.and_then(parse_bool).unwrap_or(true),
                    b"i" => font.italic = val.and_then(parse_bool).unwrap_or(true),
                    b"strike" => font.strike = val.and_then(parse_bool).unwrap_or(true),
                    b"u" => {
                        font.underline = Some(match val {
                            Some(v) => xml.decoder().decode(v)?.into_owned(),
                            None => "single".to_owned(),
                        })
                    }
                    b"sz" => font.size = val.and_then(parse_f64),
                    b"name" => {
                        if let Some(v) = val {
                            font.name = Some(xml.decoder().decode(v)?.into_owned());
                        }
                    }
                    b"family" => font.family = val.and_then(parse_u32),
                    b"charset" => font.charset = val.and_then(parse_u32),
                    b"scheme" => {
                        if let Some(v) = val {
                            font.scheme = Some(xml.decoder().decode(v)?.into_owned());
                        }
                    }
                    b"color" => font.color = parse_color(child.attributes())?,
                    _ => {
                        xml.read_to_end_into(child.name(), &mut Vec::new())?;
                    }
                }
            }
            Ok(Event::End(ref end)) if end.local_name() == e.local_name() => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("font")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(font)
}

fn read_fill(xml: &mut XlReader<'_>, e: &BytesStart<'_>) -> Result<Fill, XlsxError> {
    let mut fill = Fill::default();
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref child)) => match child.local_name().as_ref() {
                b"patternFill" => {
                    if let Some(v) = get_attribute(child.attributes(), QName(b"patternType"))? {
                        fill.pattern_type = Some(xml.decoder().decode(v)?.into_owned());
                    }
                }
                b"fgColor" => fill.foreground = parse_color(child.attributes())?,
                b"bgColor" => fill.background = parse_color(child.attributes())?,
                b"gradientFill" => {
                    fill.gradient = Some(read_raw_fragment(xml, child, "gradientFill")?)
                }
                _ => {
                    xml.read_to_end_into(child.name(), &mut Vec::new())?;
                }
            },
            Ok(Event::End(ref end)) if end.local_name() == e.local_name() => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("fill")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(fill)
}

fn read_border(xml: &mut XlReader<'_>, e: &BytesStart<'_>) -> Result<Border, XlsxError> {
    let mut border = Border::default();
    for a in e.attributes() {
        let a = a.map_err(XlsxError::XmlAttr)?;
        match a.key {
            QName(b"diagonalUp") => border.diagonal_up = parse_bool(&a.value).unwrap_or(false),
            QName(b"diagonalDown") => {
                border.diagonal_down = parse_bool(&a.value).unwrap_or(false)
            }
            _ => (),
        }
    }
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref side)) => match side.local_name().as_ref() {
                b"left" | b"start" => border.left = read_border_side(xml, side)?,
                b"right" | b"end" => border.right = read_border_side(xml, side)?,
                b"top" => border.top = read_border_side(xml, side)?,
                b"bottom" => border.bottom = read_border_side(xml, side)?,
                b"diagonal" => border.diagonal = read_border_side(xml, side)?,
                _ => {
                    xml.read_to_end_into(side.name(), &mut Vec::new())?;
                }
            },
            Ok(Event::End(ref end)) if end.local_name() == e.local_name() => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("border")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(border)
}

/// An edge without style nor color is `None`
fn read_border_side(
    xml: &mut XlReader<'_>,
    element: &BytesStart<'_>,
) -> Result<Option<BorderSide>, XlsxError> {
    let style = match get_attribute(element.attributes(), QName(b"style"))? {
        Some(v) => Some(xml.decoder().decode(v)?.into_owned()),
        None => None,
    };
    let mut color = None;
    let mut buf = Vec::with_capacity(128);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"color" => {
                color = parse_color(e.attributes())?;
            }
            Ok(Event::End(ref e)) if e.local_name() == element.local_name() => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("border side")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    if style.is_none() && color.is_none() {
        return Ok(None);
    }
    Ok(Some(BorderSide { style, color }))
}

fn read_xf(xml: &mut XlReader<'_>, e: &BytesStart<'_>) -> Result<CellFormat, XlsxError> {
    let mut xf = CellFormat::default();
    for a in e.attributes() {
        let a = a.map_err(XlsxError::XmlAttr)?;
        let v = &a.value;
        match a.key {
            QName(b"numFmtId") => xf.num_fmt_id = parse_u32(v).unwrap_or(0),
            QName(b"fontId") => xf.font_id = parse_u32(v),
            QName(b"fillId") => xf.fill_id = parse_u32(v),
            QName(b"borderId") => xf.border_id = parse_u32(v),
            QName(b"xfId") => xf.xf_id = parse_u32(v),
            QName(b"applyNumberFormat") => xf.apply_number_format = parse_bool(v),
            QName(b"applyFont") => xf.apply_font = parse_bool(v),
            QName(b"applyFill") => xf.apply_fill = parse_bool(v),
            QName(b"applyBorder") => xf.apply_border = parse_bool(v),
            QName(b"applyAlignment") => xf.apply_alignment = parse_bool(v),
            QName(b"applyProtection") => xf.apply_protection = parse_bool(v),
            _ => (),
        }
    }

    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref child)) if child.local_name().as_ref() == b"alignment" => {
                xf.alignment = Some(read_alignment(xml, child.attributes())?);
            }
            Ok(Event::Start(ref child)) if child.local_name().as_ref() == b"protection" => {
                let mut protection = Protection::default();
                for a in child.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    match a.key {
                        QName(b"locked") => protection.locked = parse_bool(&a.value),
                        QName(b"hidden") => protection.hidden = parse_bool(&a.value),
                        _ => (),
                    }
                }
                xf.protection = Some(protection);
            }
            Ok(Event::Start(ref child)) => {
                xml.read_to_end_into(child.name(), &mut Vec::new())?;
            }
            Ok(Event::End(ref end)) if end.local_name() == e.local_name() => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("xf")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(xf)
}

fn read_alignment(xml: &XlReader<'_>, attributes: Attributes<'_>) -> Result<Alignment, XlsxError> {
    let mut alignment = Alignment::default();
    for a in attributes {
        let a = a.map_err(XlsxError::XmlAttr)?;
        match a.key {
            QName(b"horizontal") => alignment.horizontal = Some(attr_string(xml, &a)?),
            QName(b"vertical") => alignment.vertical = Some(attr_string(xml, &a)?),
            QName(b"wrapText") => alignment.wrap_text = parse_bool(&a.value),
            QName(b"indent") => alignment.indent = parse_u32(&a.value),
            QName(b"shrinkToFit") => alignment.shrink_to_fit = parse_bool(&a.value),
            QName(b"textRotation") => {
                alignment.text_rotation = atoi_simd::parse::<i32>(&a.value).ok()
            }
            QName(b"readingOrder") => alignment.reading_order = parse_u32(&a.value),
            _ => (),
        }
    }
    Ok(alignment)
}

fn read_named_style(xml: &mut XlReader<'_>, e: &BytesStart<'_>) -> Result<NamedStyle, XlsxError> {
    let mut style = NamedStyle::default();
    for a in e.attributes() {
        let a = a.map_err(XlsxError::XmlAttr)?;
        match a.key {
            QName(b"name") => style.name = attr_string(xml, &a)?,
            QName(b"xfId") => style.xf_id = parse_u32(&a.value).unwrap_or(0),
            QName(b"builtinId") => style.builtin_id = parse_u32(&a.value),
            _ => (),
        }
    }
    xml.read_to_end_into(e.name(), &mut Vec::new())?;
    Ok(style)
}

/// `<colors>`: the custom indexed palette and the most recently used colors
fn read_colors(xml: &mut XlReader<'_>, styles: &mut StyleTables) -> Result<(), XlsxError> {
    let mut in_mru = false;
    let mut buf = Vec::with_capacity(512);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"mruColors" => in_mru = true,
                b"rgbColor" | b"color" => {
                    if let Some(rgb) = get_attribute(e.attributes(), QName(b"rgb"))? {
                        let rgb = xml.decoder().decode(rgb)?.into_owned();
                        if in_mru {
                            styles.mru_colors.push(rgb);
                        } else {
                            styles.indexed_colors.push(rgb);
                        }
                    }
                }
                _ => (),
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"mruColors" => in_mru = false,
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"colors" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("colors")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(())
}

fn parse_hex(s: &[u8]) -> Option<u8> {
    u8::from_str_radix(std::str::from_utf8(s).ok()?, 16).ok()
}

/// Parses color attributes.
/// Follows Excel precedence: rgb > theme > indexed > auto
fn parse_color(attributes: Attributes<'_>) -> Result<Option<Color>, XlsxError> {
    let mut rgb = None;
    let mut theme = None;
    let mut indexed = None;
    let mut auto = false;
    let mut tint = None;

    for a in attributes {
        let a = a.map_err(XlsxError::XmlAttr)?;
        match a.key {
            QName(b"rgb") => {
                let v = &a.value;
                rgb = match v.len() {
                    8 => match (
                        parse_hex(&v[0..2]),
                        parse_hex(&v[2..4]),
                        parse_hex(&v[4..6]),
                        parse_hex(&v[6..8]),
                    ) {
                        (Some(a), Some(r), Some(g), Some(b)) => Some(Color::Argb { a, r, g, b }),
                        _ => None,
                    },
                    6 => match (parse_hex(&v[0..2]), parse_hex(&v[2..4]), parse_hex(&v[4..6])) {
                        (Some(r), Some(g), Some(b)) => Some(Color::Argb { a: 0xFF, r, g, b }),
                        _ => None,
                    },
                    _ => None,
                };
                if rgb.is_none() {
                    warn!("invalid rgb color '{}'", String::from_utf8_lossy(v));
                }
            }
            QName(b"theme") => theme = parse_u32(&a.value),
            QName(b"tint") => tint = parse_f64(&a.value).map(|t| t.clamp(-1.0, 1.0)),
            QName(b"indexed") => indexed = parse_u32(&a.value),
            QName(b"auto") => auto = parse_bool(&a.value).unwrap_or(false),
            _ => (),
        }
    }

    Ok(if let Some(color) = rgb {
        Some(color)
    } else if let Some(theme) = theme {
        Some(Color::Theme { theme, tint })
    } else if let Some(indexed) = indexed {
        Some(Color::Indexed(indexed))
    } else if auto {
        Some(Color::Auto)
    } else {
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font>
    <font><b/><i val="0"/><u/><sz val="14"/><color rgb="FFFF0000"/><name val="Arial"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill>
    <fill><gradientFill degree="90"><stop position="0"><color theme="0"/></stop></gradientFill></fill>
  </fills>
  <borders count="1">
    <border diagonalUp="1"><left style="thin"><color auto="1"/></left><right/><top/><bottom style="double"/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="164" fontId="0" fillId="1" borderId="0" xfId="0" applyNumberFormat="1"><alignment horizontal="center" wrapText="1" textRotation="-45"/></xf>
    <xf numFmtId="14" fontId="1" xfId="0" applyFont="1"><protection locked="0"/></xf>
  </cellXfs>
  <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
  <dxfs count="1"><dxf><font><b/></font></dxf></dxfs>
  <colors>
    <indexedColors><rgbColor rgb="00000000"/><rgbColor rgb="00FFFFFF"/></indexedColors>
    <mruColors><color rgb="FF00B050"/></mruColors>
  </colors>
</styleSheet>"#;

    #[test]
    fn full_stylesheet() {
        let styles = read_styles(STYLES, true).unwrap();

        assert_eq!(styles.number_formats.len(), 1);
        assert_eq!(styles.number_formats[0].id, 164);
        assert_eq!(styles.number_formats[0].code, "yyyy\\-mm\\-dd");

        assert_eq!(styles.fonts.len(), 2);
        let calibri = &styles.fonts[0].definition;
        assert_eq!(calibri.name.as_deref(), Some("Calibri"));
        assert_eq!(calibri.size, Some(11.0));
        assert_eq!(calibri.family, Some(2));
        assert_eq!(calibri.scheme.as_deref(), Some("minor"));
        assert_eq!(
            calibri.color,
            Some(Color::Theme {
                theme: 1,
                tint: None
            })
        );
        let arial = &styles.fonts[1].definition;
        assert!(arial.bold);
        assert!(!arial.italic);
        assert_eq!(arial.underline.as_deref(), Some("single"));
        assert_eq!(arial.color.as_ref().map(ToString::to_string).as_deref(), Some("FFFF0000"));

        assert_eq!(styles.fills.len(), 3);
        assert_eq!(styles.fills[0].definition.pattern_type.as_deref(), Some("none"));
        assert_eq!(styles.fills[1].definition.background, Some(Color::Indexed(64)));
        let gradient = styles.fills[2].definition.gradient.as_deref().unwrap();
        assert!(gradient.starts_with(r#"<gradientFill degree="90">"#));

        let border = &styles.borders[0].definition;
        assert!(border.diagonal_up);
        assert_eq!(
            border.left,
            Some(BorderSide {
                style: Some("thin".to_string()),
                color: Some(Color::Auto)
            })
        );
        assert!(border.right.is_none());
        assert_eq!(
            border.bottom.as_ref().and_then(|b| b.style.as_deref()),
            Some("double")
        );

        assert_eq!(styles.cell_style_xfs.len(), 1);
        assert_eq!(styles.cell_xfs.len(), 3);
        let dated = &styles.cell_xfs[1];
        assert_eq!(dated.num_fmt_id, 164);
        assert_eq!(dated.apply_number_format, Some(true));
        let alignment = dated.alignment.as_ref().unwrap();
        assert_eq!(alignment.horizontal.as_deref(), Some("center"));
        assert_eq!(alignment.wrap_text, Some(true));
        assert_eq!(alignment.text_rotation, Some(-45));
        assert_eq!(
            styles.cell_xfs[2].protection.as_ref().unwrap().locked,
            Some(false)
        );
        assert_eq!(styles.cell_xfs[2].fill_id, None);

        assert_eq!(styles.cell_styles[0].name, "Normal");
        assert_eq!(styles.cell_styles[0].builtin_id, Some(0));
        assert_eq!(styles.indexed_colors, ["00000000", "00FFFFFF"]);
        assert_eq!(styles.mru_colors, ["FF00B050"]);
    }

    #[test]
    fn usage_counts_from_cell_xfs() {
        let styles = read_styles(STYLES, true).unwrap();
        let fonts: Vec<_> = styles.fonts.iter().map(|f| f.count).collect();
        assert_eq!(fonts, [2, 1]);
        let fills: Vec<_> = styles.fills.iter().map(|f| f.count).collect();
        assert_eq!(fills, [1, 1, 0]);
        assert_eq!(styles.borders[0].count, 2);
    }

    #[test]
    fn singleton_font_list() {
        let data = br#"<styleSheet><fonts count="1"><font><sz val="10"/><name val="Arial"/></font></fonts>
<cellXfs count="1"><xf fontId="0"/></cellXfs></styleSheet>"#;
        let styles = read_styles(data, true).unwrap();
        assert_eq!(styles.fonts.len(), 1);
        assert_eq!(styles.fonts[0].definition.name.as_deref(), Some("Arial"));
        assert_eq!(styles.fonts[0].count, 1);
    }

    #[test]
    fn count_mismatch() {
        let data = br#"<styleSheet><fonts count="2"><font><b/></font></fonts></styleSheet>"#;
        let styles = read_styles(data, false).unwrap();
        assert_eq!(styles.fonts.len(), 1);
        assert!(matches!(
            read_styles(data, true),
            Err(XlsxError::MalformedStyles(_))
        ));
    }

    #[test]
    fn dangling_font_reference() {
        let data = br#"<styleSheet><fonts count="1"><font/></fonts>
<cellXfs count="2"><xf fontId="0"/><xf fontId="3"/></cellXfs></styleSheet>"#;
        let styles = read_styles(data, false).unwrap();
        assert_eq!(styles.fonts[0].count, 1);
        assert!(matches!(
            read_styles(data, true),
            Err(XlsxError::MalformedStyles(_))
        ));
    }

    #[test]
    fn empty_stylesheet() {
        let styles = read_styles(b"<styleSheet/>", true).unwrap();
        assert_eq!(styles, StyleTables::default());
    }
}
