// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Conversion between `A1`-style cell references and zero-based `(row, column)` indices.
//!
//! Column letters repeat on every row of a sheet, so [`ReferenceCodec`] memoizes the
//! letters → column mapping in a [`ColumnCache`] it owns. The cache is explicit and
//! injectable: tests (or callers parsing many workbooks) can hand in their own.

use std::collections::HashMap;

use crate::xlsx::XlsxError;

/// Maximum number of rows allowed in an xlsx file
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns allowed in an xlsx file
pub const MAX_COLUMNS: u32 = 16_384;

/// Memo of column letters (e.g. `"AB"`) to zero-based column index.
pub trait ColumnCache {
    /// Gets a previously computed column
    fn get(&self, letters: &str) -> Option<u32>;
    /// Stores a computed column
    fn insert(&mut self, letters: &str, column: u32);
}

impl ColumnCache for HashMap<String, u32> {
    fn get(&self, letters: &str) -> Option<u32> {
        HashMap::get(self, letters).copied()
    }

    fn insert(&mut self, letters: &str, column: u32) {
        HashMap::insert(self, letters.to_owned(), column);
    }
}

/// Decodes cell references, caching column letters.
#[derive(Debug)]
pub struct ReferenceCodec<C = HashMap<String, u32>> {
    cache: C,
}

impl Default for ReferenceCodec {
    fn default() -> Self {
        ReferenceCodec::new()
    }
}

impl ReferenceCodec {
    /// Creates a codec with an empty, unbounded cache
    pub fn new() -> Self {
        ReferenceCodec {
            cache: HashMap::new(),
        }
    }
}

impl<C: ColumnCache> ReferenceCodec<C> {
    /// Creates a codec backed by the given cache
    pub fn with_cache(cache: C) -> Self {
        ReferenceCodec { cache }
    }

    /// Gets the underlying cache
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Converts a reference such as `"AA17"` into `(row, column)`, both 0 based.
    ///
    /// The reference must be one or more uppercase letters followed by one or
    /// more digits, within [`MAX_ROWS`] and [`MAX_COLUMNS`]. Anything else is an
    /// [`XlsxError::InvalidReference`].
    ///
    /// ```
    /// use xlmodel::ReferenceCodec;
    ///
    /// let mut codec = ReferenceCodec::new();
    /// assert_eq!(codec.decode("B5").unwrap(), (4, 1));
    /// assert!(codec.decode("1A").is_err());
    /// ```
    pub fn decode(&mut self, reference: &str) -> Result<(u32, u32), XlsxError> {
        let (letters, digits) = split_reference(reference)?;
        let row = parse_row(digits)
            .filter(|&r| r < MAX_ROWS)
            .ok_or_else(|| invalid(reference))?;
        let col = match self.cache.get(letters) {
            Some(col) => col,
            None => {
                let col = column_index(letters)
                    .ok()
                    .filter(|&c| c < MAX_COLUMNS)
                    .ok_or_else(|| invalid(reference))?;
                self.cache.insert(letters, col);
                col
            }
        };
        Ok((row, col))
    }

    /// Converts a range such as `"A1:C3"` into its [`Dimensions`].
    ///
    /// A single reference is read as a one cell range.
    pub fn decode_range(&mut self, range: &str) -> Result<Dimensions, XlsxError> {
        let mut parts = range.split(':');
        let start = match parts.next() {
            Some(p) => self.decode(p)?,
            None => return Err(invalid(range)),
        };
        let end = match parts.next() {
            Some(p) => self.decode(p)?,
            None => start,
        };
        if parts.next().is_some() {
            return Err(invalid(range));
        }
        Ok(Dimensions { start, end })
    }
}

fn invalid(reference: &str) -> XlsxError {
    XlsxError::InvalidReference(reference.to_owned())
}

/// Splits `"AB12"` into `("AB", "12")`, rejecting anything else
fn split_reference(reference: &str) -> Result<(&str, &str), XlsxError> {
    let split = reference
        .bytes()
        .position(|c| !c.is_ascii_uppercase())
        .ok_or_else(|| invalid(reference))?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return Err(invalid(reference));
    }
    Ok((letters, digits))
}

fn parse_row(digits: &str) -> Option<u32> {
    let mut row: u32 = 0;
    for c in digits.bytes() {
        row = row.checked_mul(10)?.checked_add((c - b'0') as u32)?;
    }
    row.checked_sub(1)
}

/// Converts column letters into a 0 based column index, without caching.
///
/// Letters are a bijective base 26 numeral, `A` = 1 up to `Z` = 26, most
/// significant first.
pub fn column_index(letters: &str) -> Result<u32, XlsxError> {
    if letters.is_empty() {
        return Err(invalid(letters));
    }
    let mut col: u32 = 0;
    for c in letters.bytes() {
        if !c.is_ascii_uppercase() {
            return Err(invalid(letters));
        }
        col = col
            .checked_mul(26)
            .and_then(|col| col.checked_add((c - b'A') as u32 + 1))
            .ok_or_else(|| invalid(letters))?;
    }
    Ok(col - 1)
}

/// Converts a 0 based column index into its letters (`0` is `A`, `26` is `AA`)
pub fn column_name(col: u32) -> String {
    let mut name = Vec::new();
    let mut num = col as u64 + 1;
    while num > 0 {
        name.push(((num - 1) % 26) as u8 + b'A');
        num = (num - 1) / 26;
    }
    name.reverse();
    // only ascii uppercase letters were pushed
    String::from_utf8(name).unwrap_or_default()
}

/// Converts a `(row, column)` position into its reference, e.g. `(4, 1)` is `B5`
pub fn encode(row: u32, col: u32) -> String {
    format!("{}{}", column_name(col), row as u64 + 1)
}

/// A rectangular range of cells, both corners included
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct Dimensions {
    /// start: (row, col)
    pub start: (u32, u32),
    /// end: (row, col)
    pub end: (u32, u32),
}

impl Dimensions {
    /// create dimensions info with start position and end position
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        Self { start, end }
    }

    /// check if a position is in it
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start.0 && row <= self.end.0 && col >= self.start.1 && col <= self.end.1
    }

    /// len
    pub fn len(&self) -> u64 {
        (self.end.0.saturating_sub(self.start.0) as u64 + 1)
            * (self.end.1.saturating_sub(self.start.1) as u64 + 1)
    }

    /// Always false, a range holds at least one cell
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", encode(self.start.0, self.start.1))
        } else {
            write!(
                f,
                "{}:{}",
                encode(self.start.0, self.start.1),
                encode(self.end.0, self.end.1)
            )
        }
    }
}
