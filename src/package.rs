// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Extraction of the zip package into a scoped working directory.
//!
//! The directory lives exactly as long as the [`Package`]: it is removed when the
//! package is dropped, whichever way the parse ends.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::TempDir;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::utils::is_os_artifact;
use crate::workbook::OpaquePart;

/// Compound File Binary header, used by encrypted OOXML packages
const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// An enum for package extraction errors
#[derive(Debug)]
pub enum ExtractionError {
    /// Io error
    Io(std::io::Error),
    /// Zip error
    Zip(ZipError),
    /// Workbook is password protected
    Encrypted,
}

from_err!(std::io::Error, ExtractionError, Io);
from_err!(ZipError, ExtractionError, Zip);

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionError::Io(e) => write!(f, "I/O error: {e}"),
            ExtractionError::Zip(e) => write!(f, "Zip error: {e}"),
            ExtractionError::Encrypted => write!(f, "Workbook is password protected"),
        }
    }
}

impl std::error::Error for ExtractionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractionError::Io(e) => Some(e),
            ExtractionError::Zip(e) => Some(e),
            ExtractionError::Encrypted => None,
        }
    }
}

/// An extracted package
#[derive(Debug)]
pub struct Package {
    dir: TempDir,
    /// Lowercased part name → name as stored in the archive
    parts: BTreeMap<String, String>,
}

impl Package {
    /// Extracts the archive at `path` into a fresh directory under `work_dir`
    /// (the system temp directory if `None`).
    ///
    /// On failure nothing is left behind.
    pub fn extract(path: &Path, work_dir: Option<&Path>) -> Result<Package, ExtractionError> {
        let mut file = BufReader::new(File::open(path)?);
        check_for_password_protected(&mut file)?;
        let mut zip = ZipArchive::new(BufReader::new(File::open(path)?))?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("xlmodel-");
        let dir = match work_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        debug!("extracting {} into {}", path.display(), dir.path().display());

        // `dir` is removed on drop if this fails half way
        zip.extract(dir.path())?;

        let parts = zip
            .file_names()
            .filter(|n| !n.ends_with('/'))
            .map(|n| (n.to_ascii_lowercase(), n.to_owned()))
            .collect();
        Ok(Package { dir, parts })
    }

    fn part_path(&self, name: &str) -> Option<PathBuf> {
        let actual = self.parts.get(&name.to_ascii_lowercase())?;
        Some(self.dir.path().join(actual))
    }

    /// Reads a part, `None` if the package has no such part
    pub fn read(&self, name: &str) -> std::io::Result<Option<Vec<u8>>> {
        match self.part_path(name) {
            Some(p) => std::fs::read(p).map(Some),
            None => Ok(None),
        }
    }

    /// File names directly inside `dir` (no trailing `/`), OS artifacts excluded,
    /// sorted
    pub fn files_in(&self, dir: &str) -> Vec<&str> {
        let prefix = format!("{}/", dir.to_ascii_lowercase());
        self.parts
            .iter()
            .filter_map(|(lower, actual)| {
                let rest = lower.strip_prefix(&prefix)?;
                if rest.is_empty() || rest.contains('/') {
                    return None;
                }
                let name = &actual[actual.len() - rest.len()..];
                (!is_os_artifact(name)).then_some(name)
            })
            .collect()
    }

    /// Reads every file directly inside `dir`, keyed 1, 2, ... in name order
    pub fn read_dir(&self, dir: &str) -> std::io::Result<BTreeMap<u32, OpaquePart>> {
        let mut names = self.files_in(dir);
        names.sort_unstable();
        let mut files = BTreeMap::new();
        for (i, name) in names.into_iter().enumerate() {
            let data = self.read(&format!("{dir}/{name}"))?.unwrap_or_default();
            files.insert(
                i as u32 + 1,
                OpaquePart {
                    name: name.to_owned(),
                    data,
                },
            );
        }
        Ok(files)
    }
}

fn check_for_password_protected<R: Read>(reader: &mut R) -> Result<(), ExtractionError> {
    let mut header = [0u8; 8];
    match reader.read_exact(&mut header) {
        Ok(()) if header == CFB_SIGNATURE => Err(ExtractionError::Encrypted),
        // too short for a zip anyway, let the zip reader report it
        Ok(()) | Err(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn extract_and_cleanup() {
        let scratch = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("book.xlsx");
        write_zip(
            &archive,
            &[
                ("xl/workbook.xml", b"<workbook/>"),
                ("xl/drawings/drawing2.xml", b"two"),
                ("xl/drawings/drawing1.xml", b"one"),
                ("xl/drawings/.DS_Store", b"junk"),
                ("xl/drawings/_rels/drawing1.xml.rels", b"rels"),
            ],
        );

        let package = Package::extract(&archive, Some(work.path())).unwrap();
        let extracted = package.dir.path().to_path_buf();
        assert!(extracted.starts_with(work.path()));
        assert_eq!(
            package.read("XL/Workbook.xml").unwrap().unwrap(),
            b"<workbook/>"
        );
        assert!(package.read("xl/styles.xml").unwrap().is_none());

        let drawings = package.read_dir("xl/drawings").unwrap();
        assert_eq!(drawings.len(), 2);
        assert_eq!(drawings[&1].name, "drawing1.xml");
        assert_eq!(drawings[&1].data, b"one");
        assert_eq!(drawings[&2].data, b"two");
        assert!(package.read_dir("xl/externalLinks").unwrap().is_empty());

        drop(package);
        assert!(!extracted.exists());
    }

    #[test]
    fn corrupt_archive_leaves_nothing() {
        let scratch = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("broken.xlsx");
        std::fs::write(&archive, b"definitely not a zip file").unwrap();

        assert!(matches!(
            Package::extract(&archive, Some(work.path())),
            Err(ExtractionError::Zip(_))
        ));
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[test]
    fn encrypted_package() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("secret.xlsx");
        let mut data = CFB_SIGNATURE.to_vec();
        data.extend_from_slice(&[0; 504]);
        std::fs::write(&archive, data).unwrap();

        assert!(matches!(
            Package::extract(&archive, Some(scratch.path())),
            Err(ExtractionError::Encrypted)
        ));
    }

    #[test]
    fn missing_archive() {
        let scratch = tempfile::tempdir().unwrap();
        assert!(matches!(
            Package::extract(&scratch.path().join("nope.xlsx"), None),
            Err(ExtractionError::Io(_))
        ));
    }
}
