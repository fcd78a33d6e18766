// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Classification of number formats, used to tell dates apart from plain numbers.

/// What a number format renders a numeric cell as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// A calendar date and/or time of day
    DateTime,
    /// An elapsed duration (`[h]:mm:ss`)
    TimeDelta,
    /// Anything else
    Other,
}

/// Check excel number format is datetime
pub fn detect_custom_number_format(format: &str) -> FormatKind {
    let mut escaped = false;
    let mut is_quote = false;
    let mut brackets = 0u8;
    let mut prev = ' ';
    let mut hms = false;
    let mut ap = false;

    for s in format.chars() {
        match (s, escaped, is_quote, ap, brackets) {
            (_, true, ..) => escaped = false, // if escaped, ignore
            ('_' | '\\', ..) => escaped = true,
            ('"', _, true, _, _) => is_quote = false,
            (_, _, true, _, _) => (),
            ('"', _, _, _, _) => is_quote = true,
            (';', ..) => return FormatKind::Other, // first format only
            ('[', ..) => brackets = brackets.saturating_add(1),
            (']', .., 1) if hms => return FormatKind::TimeDelta, // if closing
            (']', ..) => brackets = brackets.saturating_sub(1),
            ('a' | 'A', _, _, false, 0) => ap = true,
            ('p' | 'm' | '/' | 'P' | 'M', _, _, true, 0) => return FormatKind::DateTime,
            ('d' | 'm' | 'h' | 'y' | 's' | 'D' | 'M' | 'H' | 'Y' | 'S', _, _, false, 0) => {
                return FormatKind::DateTime
            }
            _ => {
                if hms && s.eq_ignore_ascii_case(&prev) {
                    // ok ...
                } else {
                    hms = prev == '[' && matches!(s, 'm' | 'h' | 's' | 'M' | 'H' | 'S');
                }
            }
        }
        prev = s;
    }

    FormatKind::Other
}

/// Determine format kind from a built-in format id
pub fn builtin_format_by_id(id: u32) -> FormatKind {
    match id {
        // mm-dd-yy, d-mmm-yy, d-mmm, mmm-yy, h:mm AM/PM, h:mm:ss AM/PM, h:mm, h:mm:ss,
        // m/d/yy h:mm
        14..=22 |
        // mm:ss
        45 |
        // mmss.0
        47 => FormatKind::DateTime,
        // [h]:mm:ss
        46 => FormatKind::TimeDelta,
        _ => FormatKind::Other,
    }
}
