/// In-memory OPC package.
///
/// [`Package`] holds every zip member of the source file in its original
/// order. Parts are addressed by [`PackURI`]; replacing a part swaps its bytes
/// but keeps its position and compression method, and nothing is ever
/// dropped on save.
use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use zip::CompressionMethod;

use crate::ooxml::error::{FormatError, Result};
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::{self, ZipEntry};
use crate::ooxml::opc::rel::{Relationship, Relationships};

/// A relationship whose internal target is not a part of the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRelationship {
    pub source: PackURI,
    pub relationship: Relationship,
}

#[derive(Debug)]
pub struct Package {
    entries: Vec<ZipEntry>,
    index: HashMap<PackURI, usize>,
}

impl Package {
    /// Open a package from bytes.
    ///
    /// # Errors
    ///
    /// [`FormatError::NotAPackage`] if the bytes are not a readable zip archive,
    /// [`FormatError::MissingManifest`] if `[Content_Types].xml` is absent.
    pub fn open(data: &[u8]) -> Result<Self> {
        let entries = phys_pkg::read_entries(data)?;
        let index = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_dir)
            .map(|(i, e)| (PackURI::from_member_name(&e.name), i))
            .collect::<HashMap<_, _>>();

        if !index.contains_key(&PackURI::from_member_name(&CONTENT_TYPES_URI[1..])) {
            return Err(FormatError::MissingManifest);
        }
        log::debug!("opened package with {} entries", entries.len());
        Ok(Self { entries, index })
    }

    /// Open a package from a file path.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::open(&data)
    }

    /// Get a part's bytes.
    #[inline]
    pub fn part(&self, name: &PackURI) -> Option<&[u8]> {
        self.index.get(name).map(|&i| &self.entries[i].data[..])
    }

    /// Get a part's bytes as a cheaply clonable buffer.
    #[inline]
    pub fn part_bytes(&self, name: &PackURI) -> Option<Bytes> {
        self.index.get(name).map(|&i| self.entries[i].data.clone())
    }

    #[inline]
    pub fn contains(&self, name: &PackURI) -> bool {
        self.index.contains_key(name)
    }

    /// Replace a part wholesale, or append it when new.
    pub fn put_part(&mut self, name: &PackURI, data: impl Into<Bytes>) {
        let data = data.into();
        match self.index.get(name) {
            Some(&i) => self.entries[i].data = data,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(ZipEntry {
                    name: name.membername().to_string(),
                    data,
                    compression: CompressionMethod::Deflated,
                    is_dir: false,
                });
            },
        }
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = PackURI> + '_ {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| PackURI::from_member_name(&e.name))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Relationships declared by a part (or by the package for "/").
    ///
    /// A part without a `.rels` part has no relationships.
    pub fn relationships_of(&self, part: &PackURI) -> Result<Relationships> {
        let rels_uri = part.rels_uri();
        match self.part(&rels_uri) {
            Some(xml) => Relationships::parse(rels_uri.as_str(), part.base_uri(), xml),
            None => Ok(Relationships::default()),
        }
    }

    /// The main document part, reached through the package-level
    /// `officeDocument` relationship.
    pub fn main_part(&self) -> Result<PackURI> {
        let root = PackURI::new(PACKAGE_URI)?;
        let rels = self.relationships_of(&root)?;
        let rel = rels
            .of_type(relationship_type::OFFICE_DOCUMENT)
            .next()
            .ok_or_else(|| FormatError::PartNotFound("officeDocument relationship".to_string()))?;
        let main = rel.target_partname()?;
        if !self.contains(&main) {
            return Err(FormatError::PartNotFound(main.to_string()));
        }
        Ok(main)
    }

    /// Every internal relationship whose target part is missing.
    pub fn dangling_relationships(&self) -> Result<Vec<DanglingRelationship>> {
        let mut dangling = Vec::new();
        for rels_uri in self.part_names().filter(PackURI::is_rels) {
            let Some(source) = rels_uri.rels_source() else {
                continue;
            };
            for rel in self.relationships_of(&source)?.into_vec() {
                if rel.is_external() {
                    continue;
                }
                let resolved = rel.target_partname();
                if resolved.map_or(true, |target| !self.contains(&target)) {
                    dangling.push(DanglingRelationship {
                        source: source.clone(),
                        relationship: rel,
                    });
                }
            }
        }
        Ok(dangling)
    }

    /// Serialize the package into zip bytes.
    pub fn save(&self) -> Result<Vec<u8>> {
        phys_pkg::write_entries(&self.entries)
    }

    /// Serialize the package into a file.
    pub fn save_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.save()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn create_package(with_manifest: bool, slide_target: &str) -> Vec<u8> {
        let mut zip_data = Vec::new();
        {
            let cursor = Cursor::new(&mut zip_data);
            let mut writer = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();

            if with_manifest {
                writer.start_file("[Content_Types].xml", options).unwrap();
                writer
                    .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
                    .unwrap();
            }

            writer.start_file("_rels/.rels", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#).unwrap();

            writer.start_file("ppt/presentation.xml", options).unwrap();
            writer.write_all(b"<p:presentation/>").unwrap();

            writer.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
            write!(
                writer,
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="{}"/></Relationships>"#,
                slide_target
            )
            .unwrap();

            writer.start_file("ppt/slides/slide1.xml", options).unwrap();
            writer.write_all(b"<p:sld/>").unwrap();

            writer.start_file("docProps/unreferenced.bin", options).unwrap();
            writer.write_all(b"\x00\x01").unwrap();

            writer.finish().unwrap();
        }
        zip_data
    }

    #[test]
    fn test_open_and_main_part() {
        let pkg = Package::open(&create_package(true, "slides/slide1.xml")).unwrap();
        assert_eq!(pkg.main_part().unwrap().as_str(), "/ppt/presentation.xml");
        assert_eq!(pkg.len(), 6);
    }

    #[test]
    fn test_missing_manifest() {
        let err = Package::open(&create_package(false, "slides/slide1.xml")).unwrap_err();
        assert!(matches!(err, FormatError::MissingManifest));
    }

    #[test]
    fn test_not_a_package() {
        assert!(matches!(
            Package::open(b"<xml/>"),
            Err(FormatError::NotAPackage(_))
        ));
    }

    #[test]
    fn test_save_keeps_order_and_unreferenced_parts() {
        let mut pkg = Package::open(&create_package(true, "slides/slide1.xml")).unwrap();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        pkg.put_part(&slide, b"<p:sld><p:cSld/></p:sld>".to_vec());

        let saved = Package::open(&pkg.save().unwrap()).unwrap();
        let names: Vec<_> = saved.part_names().map(|p| p.to_string()).collect();
        assert_eq!(
            names,
            [
                "/[Content_Types].xml",
                "/_rels/.rels",
                "/ppt/presentation.xml",
                "/ppt/_rels/presentation.xml.rels",
                "/ppt/slides/slide1.xml",
                "/docProps/unreferenced.bin",
            ]
        );
        assert_eq!(saved.part(&slide).unwrap(), b"<p:sld><p:cSld/></p:sld>");
    }

    #[test]
    fn test_relationships_of_part_without_rels() {
        let pkg = Package::open(&create_package(true, "slides/slide1.xml")).unwrap();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        assert!(pkg.relationships_of(&slide).unwrap().is_empty());
    }

    #[test]
    fn test_dangling_relationships() {
        let pkg = Package::open(&create_package(true, "slides/slide1.xml")).unwrap();
        assert!(pkg.dangling_relationships().unwrap().is_empty());

        let pkg = Package::open(&create_package(true, "slides/slide9.xml")).unwrap();
        let dangling = pkg.dangling_relationships().unwrap();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].source.as_str(), "/ppt/presentation.xml");
        assert_eq!(dangling[0].relationship.r_id(), "rId2");
    }
}
