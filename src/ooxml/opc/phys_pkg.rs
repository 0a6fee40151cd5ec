//! Physical package I/O: the zip container underneath an OPC package.
//!
//! Entries are read into memory in central-directory order and written back
//! in the same order with the same compression method, so that a package
//! that is only partially modified stays as close as possible to its source.

use std::io::{Cursor, Read, Write};

use bytes::Bytes;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::ooxml::error::{FormatError, Result};

/// One member of the zip container.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    /// Member name as stored (no leading slash)
    pub name: String,
    pub data: Bytes,
    pub compression: CompressionMethod,
    pub is_dir: bool,
}

impl ZipEntry {
    fn options(&self) -> SimpleFileOptions {
        let method = match self.compression {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        SimpleFileOptions::default().compression_method(method)
    }
}

/// Read every entry of a zip archive held in memory.
///
/// Any failure to read the archive is reported as [`FormatError::NotAPackage`].
pub fn read_entries(data: &[u8]) -> Result<Vec<ZipEntry>> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| FormatError::NotAPackage(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| FormatError::NotAPackage(e.to_string()))?;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| FormatError::NotAPackage(format!("{}: {}", file.name(), e)))?;
        entries.push(ZipEntry {
            name: file.name().to_string(),
            data: Bytes::from(buf),
            compression: file.compression(),
            is_dir: file.is_dir(),
        });
    }
    Ok(entries)
}

/// Write entries, in order, into a new zip archive.
pub fn write_entries<'a, I>(entries: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a ZipEntry>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in entries {
        if entry.is_dir {
            writer.add_directory(entry.name.trim_end_matches('/'), entry.options())?;
        } else {
            writer.start_file(entry.name.as_str(), entry.options())?;
            writer.write_all(&entry.data)?;
        }
    }
    Ok(writer.finish()?.into_inner())
}
