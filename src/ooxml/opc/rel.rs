use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;

use crate::ooxml::error::{FormatError, Result};
use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::packuri::PackURI;

/// A single relationship from a source part to a target.
///
/// Identified by an rId. Internal relationships point at another part and
/// are resolved against the source part's base URI; external ones hold a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    r_id: String,
    reltype: String,
    target_ref: String,
    base_uri: String,
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Target as written in the `.rels` part.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Get the absolute target partname for internal relationships.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(FormatError::InvalidPackUri(format!(
                "{} is an external target",
                self.target_ref
            )));
        }
        // Fragment identifiers do not name a part
        let target = self.target_ref.split('#').next().unwrap_or_default();
        PackURI::from_rel_ref(&self.base_uri, target)
    }
}

/// Relationships declared by one source part, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    rels: SmallVec<[Relationship; 8]>,
}

impl Relationships {
    /// Parse a `.rels` part for a source part whose base URI is `base_uri`.
    pub fn parse(rels_part: &str, base_uri: &str, rels_xml: &[u8]) -> Result<Self> {
        let mut rels = SmallVec::new();
        let mut reader = Reader::from_reader(rels_xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut r_id = None;
                        let mut reltype = None;
                        let mut target_ref = None;
                        let mut mode = target_mode::INTERNAL.to_string();

                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| FormatError::malformed(rels_part, e))?;
                            let value = attr
                                .unescape_value()
                                .map_err(|e| FormatError::malformed(rels_part, e))?
                                .to_string();
                            match attr.key.as_ref() {
                                b"Id" => r_id = Some(value),
                                b"Type" => reltype = Some(value),
                                b"Target" => target_ref = Some(value),
                                b"TargetMode" => mode = value,
                                _ => {},
                            }
                        }

                        if let (Some(id), Some(rt), Some(tr)) = (r_id, reltype, target_ref) {
                            rels.push(Relationship::new(
                                id,
                                rt,
                                tr,
                                base_uri.to_string(),
                                mode == target_mode::EXTERNAL,
                            ));
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(FormatError::malformed(rels_part, e)),
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { rels })
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.r_id == r_id)
    }

    /// All relationships of one type, in document order.
    pub fn of_type<'a>(&'a self, reltype: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.rels.iter().filter(move |r| r.reltype == reltype)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn into_vec(self) -> Vec<Relationship> {
        self.rels.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::relationship_type as RT;

    const SLIDE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart1.xml"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
</Relationships>"#;

    #[test]
    fn test_parse_keeps_document_order() {
        let rels =
            Relationships::parse("/ppt/slides/_rels/slide1.xml.rels", "/ppt/slides", SLIDE_RELS.as_bytes())
                .unwrap();
        let ids: Vec<_> = rels.iter().map(|r| r.r_id()).collect();
        assert_eq!(ids, ["rId3", "rId2", "rId1"]);
    }

    #[test]
    fn test_target_resolution() {
        let rels =
            Relationships::parse("/ppt/slides/_rels/slide1.xml.rels", "/ppt/slides", SLIDE_RELS.as_bytes())
                .unwrap();
        let chart = rels.of_type(RT::CHART).next().unwrap();
        assert_eq!(chart.target_partname().unwrap().as_str(), "/ppt/charts/chart1.xml");

        let link = rels.get("rId3").unwrap();
        assert!(link.is_external());
        assert_eq!(link.target_ref(), "https://example.com/?a=1&b=2");
        assert!(link.target_partname().is_err());
    }

    #[test]
    fn test_malformed_rels() {
        let err = Relationships::parse("/_rels/.rels", "/", b"<Relationships><Relationship Id=\"rId1\"")
            .unwrap_err();
        assert!(matches!(err, FormatError::MalformedXml { .. }));
    }
}
