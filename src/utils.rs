// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Internal module providing handy function

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::BytesRef;

use crate::xlsx::XlsxError;

macro_rules! from_err {
    ($from:ty, $to:tt, $var:tt) => {
        impl From<$from> for $to {
            fn from(e: $from) -> $to {
                $to::$var(e)
            }
        }
    };
}

/// Appends the text an entity or character reference stands for.
///
/// Unknown named entities are kept verbatim (`&name;`) rather than dropped.
pub(crate) fn unescape_entity_to_buffer(
    entity: &BytesRef<'_>,
    buf: &mut String,
) -> Result<(), XlsxError> {
    if let Some(ch) = entity.resolve_char_ref()? {
        buf.push(ch);
        return Ok(());
    }
    let name = entity.decode()?;
    match resolve_predefined_entity(&name) {
        Some(text) => buf.push_str(text),
        None => {
            buf.push('&');
            buf.push_str(&name);
            buf.push(';');
        }
    }
    Ok(())
}

/// Files dropped by desktop file managers that never belong to the package.
pub(crate) fn is_os_artifact(file_name: &str) -> bool {
    file_name.starts_with('.')
        || file_name.eq_ignore_ascii_case("Thumbs.db")
        || file_name.eq_ignore_ascii_case("desktop.ini")
}

/// Parses an OOXML boolean attribute (`1`/`true`/`0`/`false`).
pub(crate) fn parse_bool(v: &[u8]) -> Option<bool> {
    match v {
        b"1" | b"true" => Some(true),
        b"0" | b"false" => Some(false),
        _ => None,
    }
}
