// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

mod cells_reader;
mod shared_strings;
mod styles;

use std::path::Path;

use log::debug;
use quick_xml::{
    events::{
        attributes::{Attribute, Attributes},
        BytesStart, Event,
    },
    name::QName,
    Reader as XmlReader, Writer,
};

use crate::errors::Error;
use crate::package::Package;
use crate::reference::{ColumnCache, ReferenceCodec};
use crate::strings::SharedStrings;
use crate::utils::{parse_bool, unescape_entity_to_buffer};
use crate::workbook::{
    DefinedName, DocumentProperties, OpaqueResources, SheetInfo, SheetVisible, Workbook,
};
use crate::ParseOptions;

pub(crate) use cells_reader::{read_worksheet, SheetContext};
pub(crate) use shared_strings::read_shared_strings;
pub(crate) use styles::read_styles;

pub(crate) type XlReader<'a> = XmlReader<&'a [u8]>;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const STYLES_PART: &str = "xl/styles.xml";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const APP_PART: &str = "docProps/app.xml";
const CORE_PART: &str = "docProps/core.xml";
const WORKSHEETS_DIR: &str = "xl/worksheets";

/// An enum for Xlsx specific errors
#[derive(Debug)]
pub enum XlsxError {
    /// Io error
    Io(std::io::Error),
    /// Xml error
    Xml(quick_xml::Error),
    /// Xml attribute error
    XmlAttr(quick_xml::events::attributes::AttrError),
    /// XML Encoding error
    Encoding(quick_xml::encoding::EncodingError),
    /// Unexpected end of xml
    XmlEof(&'static str),
    /// Unexpected node
    UnexpectedNode(&'static str),

    /// A part is not well formed or a required part is missing
    MalformedDocument {
        /// Part name within the package
        part: String,
        /// What went wrong
        reason: String,
    },
    /// The manifest and the worksheet documents disagree
    SheetCountMismatch {
        /// Sheets declared in the manifest
        declared: usize,
        /// `sheet*.xml` documents found
        found: usize,
    },
    /// A cell reference is not of the form `[A-Z]+[0-9]+`
    InvalidReference(String),
    /// A cell points past the end of the shared string table
    DanglingStringIndex {
        /// Referenced index
        index: usize,
        /// Table length
        len: usize,
    },
    /// A numeric cell value does not parse
    MalformedNumber(String),
    /// The style part is inconsistent
    MalformedStyles(String),
    /// `uniqueCount` disagrees with the number of `<si>` items
    MalformedSharedStrings {
        /// Declared `uniqueCount`
        declared: usize,
        /// Items found
        found: usize,
    },
}

from_err!(std::io::Error, XlsxError, Io);
from_err!(quick_xml::Error, XlsxError, Xml);
from_err!(quick_xml::encoding::EncodingError, XlsxError, Encoding);
from_err!(quick_xml::events::attributes::AttrError, XlsxError, XmlAttr);

impl std::fmt::Display for XlsxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XlsxError::Io(e) => write!(f, "I/O error: {e}"),
            XlsxError::Xml(e) => write!(f, "Xml error: {e}"),
            XlsxError::XmlAttr(e) => write!(f, "Xml attribute error: {e}"),
            XlsxError::Encoding(e) => write!(f, "XML encoding error: {e}"),
            XlsxError::XmlEof(e) => write!(f, "Unexpected end of xml, expecting '</{e}>'"),
            XlsxError::UnexpectedNode(e) => write!(f, "Expecting '{e}' node"),
            XlsxError::MalformedDocument { part, reason } => {
                write!(f, "Malformed document '{part}': {reason}")
            }
            XlsxError::SheetCountMismatch { declared, found } => write!(
                f,
                "Workbook declares {declared} sheets but {found} worksheet documents were found"
            ),
            XlsxError::InvalidReference(r) => write!(f, "Invalid cell reference '{r}'"),
            XlsxError::DanglingStringIndex { index, len } => write!(
                f,
                "Shared string index {index} out of range (table has {len} strings)"
            ),
            XlsxError::MalformedNumber(v) => write!(f, "Cannot parse '{v}' as a number"),
            XlsxError::MalformedStyles(e) => write!(f, "Malformed styles: {e}"),
            XlsxError::MalformedSharedStrings { declared, found } => write!(
                f,
                "Shared strings declare {declared} unique strings but {found} were found"
            ),
        }
    }
}

impl std::error::Error for XlsxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XlsxError::Io(e) => Some(e),
            XlsxError::Xml(e) => Some(e),
            XlsxError::XmlAttr(e) => Some(e),
            XlsxError::Encoding(e) => Some(e),
            _ => None,
        }
    }
}

impl XlsxError {
    /// Attributes low level xml failures to the part being read
    pub(crate) fn within(self, part: &str) -> XlsxError {
        match self {
            XlsxError::Xml(_)
            | XlsxError::XmlAttr(_)
            | XlsxError::Encoding(_)
            | XlsxError::XmlEof(_)
            | XlsxError::UnexpectedNode(_) => XlsxError::MalformedDocument {
                part: part.to_owned(),
                reason: self.to_string(),
            },
            e => e,
        }
    }
}

pub(crate) fn xml_reader(data: &[u8]) -> XlReader<'_> {
    let mut r = XmlReader::from_reader(data);
    let config = r.config_mut();
    config.check_end_names = false;
    config.trim_text(false);
    config.check_comments = false;
    config.expand_empty_elements = true;
    r
}

/// search through an Element's attributes for the named one
pub(crate) fn get_attribute<'a>(
    atts: Attributes<'a>,
    n: QName,
) -> Result<Option<&'a [u8]>, XlsxError> {
    for a in atts {
        match a {
            Ok(Attribute {
                key,
                value: std::borrow::Cow::Borrowed(value),
            }) if key == n => return Ok(Some(value)),
            Err(e) => return Err(XlsxError::XmlAttr(e)),
            _ => {} // ignore other attributes
        }
    }
    Ok(None)
}

/// Decodes and unescapes an attribute value
pub(crate) fn attr_string(xml: &XlReader<'_>, a: &Attribute<'_>) -> Result<String, XlsxError> {
    Ok(a.decode_and_unescape_value(xml.decoder())?.into_owned())
}

/// Reads the text content up to the `closing` tag, resolving entities.
pub(crate) fn read_text(xml: &mut XlReader<'_>, closing: QName<'_>) -> Result<String, XlsxError> {
    let mut buf = Vec::with_capacity(64);
    let mut value = String::new();
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            Event::Text(t) => value.push_str(&t.xml10_content()?),
            Event::GeneralRef(e) => unescape_entity_to_buffer(&e, &mut value)?,
            Event::End(end) if end.name() == closing => break,
            Event::Eof => return Err(XlsxError::XmlEof("text")),
            _ => (),
        }
    }
    Ok(value)
}

/// Reads either a simple or a rich text string (`<si>`, `<is>`).
///
/// Rich text runs are concatenated, their formatting dropped. Phonetic runs are
/// skipped.
pub(crate) fn read_string(xml: &mut XlReader<'_>, closing: QName<'_>) -> Result<String, XlsxError> {
    let mut buf = Vec::with_capacity(1024);
    let mut value = String::new();
    let mut is_phonetic_text = false;
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.local_name().as_ref() == b"rPh" => is_phonetic_text = true,
            Event::End(ref e) if e.local_name().as_ref() == b"rPh" => is_phonetic_text = false,
            Event::Start(ref e) if e.local_name().as_ref() == b"t" && !is_phonetic_text => {
                value.push_str(&read_text(xml, e.name())?);
            }
            Event::End(ref e) if e.name() == closing => return Ok(value),
            Event::Eof => return Err(XlsxError::XmlEof("si")),
            _ => (),
        }
    }
}

/// Re-serializes `start` and everything up to its matching end tag
pub(crate) fn read_raw_fragment(
    xml: &mut XlReader<'_>,
    start: &BytesStart<'_>,
    name: &'static str,
) -> Result<String, XlsxError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Start(start.borrow()))?;
    let mut buf = Vec::with_capacity(512);
    let mut depth = 0usize;
    loop {
        buf.clear();
        let event = xml.read_event_into(&mut buf)?;
        let done = match event {
            Event::Start(_) => {
                depth += 1;
                false
            }
            Event::End(_) if depth == 0 => true,
            Event::End(_) => {
                depth -= 1;
                false
            }
            Event::Eof => return Err(XlsxError::XmlEof(name)),
            _ => false,
        };
        writer.write_event(event)?;
        if done {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// What `xl/workbook.xml` declares
#[derive(Debug, Default)]
struct Manifest {
    sheets: Vec<SheetInfo>,
    date1904: bool,
    defined_names: Vec<DefinedName>,
    defined_names_xml: Option<String>,
}

fn read_manifest(data: &[u8], keep_raw: bool) -> Result<Manifest, XlsxError> {
    let mut xml = xml_reader(data);
    let mut manifest = Manifest::default();
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sheet" => {
                let mut sheet = SheetInfo::default();
                for a in e.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    match a.key.local_name().as_ref() {
                        b"name" => sheet.name = attr_string(&xml, &a)?,
                        b"sheetId" => sheet.sheet_id = atoi_simd::parse::<u32>(&a.value).ok(),
                        b"id" => sheet.relationship_id = Some(attr_string(&xml, &a)?),
                        b"state" => {
                            sheet.visible = match a.value.as_ref() {
                                b"hidden" => SheetVisible::Hidden,
                                b"veryHidden" => SheetVisible::VeryHidden,
                                _ => SheetVisible::Visible,
                            }
                        }
                        _ => (),
                    }
                }
                manifest.sheets.push(sheet);
            }
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"workbookPr" => {
                if let Some(v) = get_attribute(e.attributes(), QName(b"date1904"))? {
                    manifest.date1904 = parse_bool(v).unwrap_or(false);
                }
            }
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"definedNames" => {
                let raw = read_raw_fragment(&mut xml, e, "definedNames")?;
                manifest.defined_names = read_defined_names(raw.as_bytes())?;
                if keep_raw {
                    manifest.defined_names_xml = Some(raw);
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"workbook" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("workbook")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }
    Ok(manifest)
}

fn read_defined_names(data: &[u8]) -> Result<Vec<DefinedName>, XlsxError> {
    let mut xml = xml_reader(data);
    let mut names = Vec::new();
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.local_name().as_ref() == b"definedName" => {
                let mut name = DefinedName::default();
                for a in e.attributes() {
                    let a = a.map_err(XlsxError::XmlAttr)?;
                    match a.key {
                        QName(b"name") => name.name = attr_string(&xml, &a)?,
                        QName(b"localSheetId") => {
                            name.local_sheet_id = atoi_simd::parse::<u32>(&a.value).ok()
                        }
                        QName(b"hidden") => name.hidden = parse_bool(&a.value).unwrap_or(false),
                        _ => (),
                    }
                }
                name.formula = read_text(&mut xml, e.name())?;
                names.push(name);
            }
            Event::End(ref e) if e.local_name().as_ref() == b"definedNames" => break,
            Event::Eof => return Err(XlsxError::XmlEof("definedNames")),
            _ => (),
        }
    }
    Ok(names)
}

/// What `docProps/app.xml` declares
#[derive(Debug, Default)]
struct AppProperties {
    titles: Vec<String>,
    application: Option<String>,
    app_version: Option<String>,
    company: Option<String>,
}

fn read_app_properties(data: &[u8]) -> Result<AppProperties, XlsxError> {
    let mut xml = xml_reader(data);
    let mut app = AppProperties::default();
    let mut in_titles = false;
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"TitlesOfParts" => in_titles = true,
                b"lpstr" if in_titles => app.titles.push(read_text(&mut xml, e.name())?),
                b"Application" => app.application = non_empty(read_text(&mut xml, e.name())?),
                b"AppVersion" => app.app_version = non_empty(read_text(&mut xml, e.name())?),
                b"Company" => app.company = non_empty(read_text(&mut xml, e.name())?),
                _ => (),
            },
            Event::End(ref e) if e.local_name().as_ref() == b"TitlesOfParts" => in_titles = false,
            Event::End(ref e) if e.local_name().as_ref() == b"Properties" => break,
            Event::Eof => return Err(XlsxError::XmlEof("Properties")),
            _ => (),
        }
    }
    Ok(app)
}

fn read_core_properties(data: &[u8], props: &mut DocumentProperties) -> Result<(), XlsxError> {
    let mut xml = xml_reader(data);
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"creator" => props.creator = non_empty(read_text(&mut xml, e.name())?),
                b"lastModifiedBy" => {
                    props.last_modified_by = non_empty(read_text(&mut xml, e.name())?)
                }
                b"created" => props.created = non_empty(read_text(&mut xml, e.name())?),
                b"modified" => props.modified = non_empty(read_text(&mut xml, e.name())?),
                _ => (),
            },
            Event::End(ref e) if e.local_name().as_ref() == b"coreProperties" => break,
            Event::Eof => return Err(XlsxError::XmlEof("coreProperties")),
            _ => (),
        }
    }
    Ok(())
}

/// Sheet names from `TitlesOfParts`, or from the manifest when app.xml lists
/// fewer titles than sheets
fn sheet_names(sheets: &[SheetInfo], titles: &[String]) -> Vec<String> {
    if titles.len() >= sheets.len() {
        titles[..sheets.len()].to_vec()
    } else {
        sheets.iter().map(|s| s.name.clone()).collect()
    }
}

/// `sheet{n}.xml`, case insensitive
fn is_worksheet_part(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower
        .strip_prefix("sheet")
        .and_then(|n| n.strip_suffix(".xml"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

fn read_resources(package: &Package) -> std::io::Result<OpaqueResources> {
    Ok(OpaqueResources {
        external_links: package.read_dir("xl/externalLinks")?,
        drawings: package.read_dir("xl/drawings")?,
        printer_settings: package.read_dir("xl/printerSettings")?,
        worksheet_rels: package.read_dir("xl/worksheets/_rels")?,
        macros: package.read("xl/vbaProject.bin")?,
    })
}

/// Extracts the package at `path` and materializes the whole workbook.
///
/// The extraction directory is dropped, and removed, before this returns.
pub(crate) fn read_workbook<C: ColumnCache>(
    path: &Path,
    options: &ParseOptions,
    codec: &mut ReferenceCodec<C>,
) -> Result<Workbook, Error> {
    let package = Package::extract(path, options.work_dir.as_deref())?;
    let mutable = !options.read_only;

    let manifest = match package.read(WORKBOOK_PART)? {
        Some(data) => read_manifest(&data, mutable).map_err(|e| e.within(WORKBOOK_PART))?,
        None => {
            return Err(XlsxError::MalformedDocument {
                part: WORKBOOK_PART.to_owned(),
                reason: "missing part".to_owned(),
            }
            .into())
        }
    };
    let app = match package.read(APP_PART)? {
        Some(data) => read_app_properties(&data).map_err(|e| e.within(APP_PART))?,
        None => {
            debug!("no {APP_PART}, sheet names taken from the manifest");
            AppProperties::default()
        }
    };
    let names = sheet_names(&manifest.sheets, &app.titles);

    let mut workbook = Workbook {
        sheets: manifest.sheets,
        date1904: manifest.date1904,
        defined_names: manifest.defined_names,
        defined_names_xml: manifest.defined_names_xml,
        ..Default::default()
    };

    if !options.data_only {
        workbook.properties.application = app.application;
        workbook.properties.app_version = app.app_version;
        workbook.properties.company = app.company;
        if let Some(data) = package.read(CORE_PART)? {
            read_core_properties(&data, &mut workbook.properties)
                .map_err(|e| e.within(CORE_PART))?;
        }
        if let Some(data) = package.read(STYLES_PART)? {
            workbook.styles =
                read_styles(&data, options.strict_counts).map_err(|e| e.within(STYLES_PART))?;
            debug!(
                "read {} fonts, {} fills, {} borders, {} cell formats",
                workbook.styles.fonts.len(),
                workbook.styles.fills.len(),
                workbook.styles.borders.len(),
                workbook.styles.cell_xfs.len()
            );
        }
    }

    match package.read(SHARED_STRINGS_PART)? {
        Some(data) => {
            let (strings, references) = read_shared_strings(&data, mutable, options.strict_counts)
                .map_err(|e| e.within(SHARED_STRINGS_PART))?;
            debug!("read {} shared strings", strings.len());
            workbook.shared_strings = strings;
            workbook.string_references = references;
        }
        None => workbook.shared_strings = SharedStrings::new(mutable),
    }

    let declared = names.len();
    let found = package
        .files_in(WORKSHEETS_DIR)
        .into_iter()
        .filter(|n| is_worksheet_part(n))
        .count();
    if found != declared {
        return Err(XlsxError::SheetCountMismatch { declared, found }.into());
    }

    let ctx = SheetContext {
        strings: &workbook.shared_strings,
        data_only: options.data_only,
        keep_raw: mutable,
    };
    let mut worksheets = Vec::with_capacity(declared);
    for (index, name) in names.iter().enumerate() {
        let part = format!("{WORKSHEETS_DIR}/sheet{}.xml", index + 1);
        let data = package
            .read(&part)?
            .ok_or(XlsxError::SheetCountMismatch { declared, found })?;
        let worksheet =
            read_worksheet(&data, index, name, &ctx, codec).map_err(|e| e.within(&part))?;
        debug!(
            "materialized sheet '{}' with {} cells",
            worksheet.name,
            worksheet.cell_count()
        );
        worksheets.push(worksheet);
    }
    workbook.worksheets = worksheets;

    if !options.data_only {
        workbook.resources = read_resources(&package)?;
    }
    Ok(workbook)
}
