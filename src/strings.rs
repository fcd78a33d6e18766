// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

use std::collections::HashMap;

use crate::errors::Error;

/// The shared string table of a workbook.
///
/// Index → string lookups are always available. The reverse map is only kept
/// for mutable workbooks, where it lets new strings be appended without
/// duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedStrings {
    strings: Vec<String>,
    indices: Option<HashMap<String, u32>>,
}

impl SharedStrings {
    /// Creates an empty table, `mutable` deciding whether the reverse map is kept
    pub fn new(mutable: bool) -> Self {
        SharedStrings {
            strings: Vec::new(),
            indices: mutable.then(HashMap::new),
        }
    }

    /// Builds a table from strings in index order
    pub fn from_strings(strings: Vec<String>, mutable: bool) -> Self {
        let indices = mutable.then(|| {
            let mut indices = HashMap::with_capacity(strings.len());
            for (i, s) in strings.iter().enumerate() {
                // first occurrence wins if the part repeats a string
                indices.entry(s.clone()).or_insert(i as u32);
            }
            indices
        });
        SharedStrings { strings, indices }
    }

    /// Gets the string at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Gets the index of `s`, only available on mutable tables
    pub fn index_of(&self, s: &str) -> Option<u32> {
        self.indices.as_ref()?.get(s).copied()
    }

    /// Returns the index of `s`, appending it first if it is new.
    ///
    /// Fails with [`Error::ReadOnly`] on a table loaded in read-only mode.
    pub fn get_or_insert(&mut self, s: &str) -> Result<u32, Error> {
        let indices = self.indices.as_mut().ok_or(Error::ReadOnly)?;
        if let Some(&i) = indices.get(s) {
            return Ok(i);
        }
        let i = self.strings.len() as u32;
        indices.insert(s.to_owned(), i);
        self.strings.push(s.to_owned());
        Ok(i)
    }

    /// Whether the reverse map is available
    pub fn is_mutable(&self) -> bool {
        self.indices.is_some()
    }

    /// Number of unique strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the table has no string
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterates strings in index order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutable_table_dedupes() {
        let mut sst = SharedStrings::from_strings(vec!["a".into(), "b".into()], true);
        assert_eq!(sst.index_of("b"), Some(1));
        assert_eq!(sst.get_or_insert("a").unwrap(), 0);
        assert_eq!(sst.get_or_insert("c").unwrap(), 2);
        assert_eq!(sst.get_or_insert("c").unwrap(), 2);
        assert_eq!(sst.len(), 3);
        assert_eq!(sst.get(2), Some("c"));
    }

    #[test]
    fn read_only_table() {
        let mut sst = SharedStrings::from_strings(vec!["a".into()], false);
        assert_eq!(sst.get(0), Some("a"));
        assert_eq!(sst.index_of("a"), None);
        assert!(matches!(sst.get_or_insert("b"), Err(Error::ReadOnly)));
        assert!(!sst.is_mutable());
    }
}
