// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

use log::warn;
use quick_xml::{events::Event, name::QName};

use super::{get_attribute, read_string, xml_reader, XlsxError};
use crate::strings::SharedStrings;

/// Reads `xl/sharedStrings.xml`.
///
/// Returns the table with the declared total reference count (`count`).
pub(crate) fn read_shared_strings(
    data: &[u8],
    mutable: bool,
    strict: bool,
) -> Result<(SharedStrings, Option<u32>), XlsxError> {
    let mut xml = xml_reader(data);
    let mut strings = Vec::new();
    let mut unique_count = None;
    let mut references = None;
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sst" => {
                unique_count = get_attribute(e.attributes(), QName(b"uniqueCount"))?
                    .and_then(|v| atoi_simd::parse::<usize>(v).ok());
                references = get_attribute(e.attributes(), QName(b"count"))?
                    .and_then(|v| atoi_simd::parse::<u32>(v).ok());
                if let Some(n) = unique_count.filter(|&n| n < 100_000) {
                    strings.reserve(n);
                }
            }
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"si" => {
                strings.push(read_string(&mut xml, e.name())?);
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sst" => break,
            Ok(Event::Eof) => return Err(XlsxError::XmlEof("sst")),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => (),
        }
    }

    if let Some(declared) = unique_count {
        if declared != strings.len() {
            let err = XlsxError::MalformedSharedStrings {
                declared,
                found: strings.len(),
            };
            if strict {
                return Err(err);
            }
            warn!("{err}");
        }
    }
    Ok((SharedStrings::from_strings(strings, mutable), references))
}
