/// Discovery of the parts that make up a presentation.
///
/// The presentation part lists its slides and masters by relationship id;
/// layouts are found through each master's relationships and charts through
/// each slide's.
use crate::common::unit::{DEFAULT_SLIDE_HEIGHT, DEFAULT_SLIDE_WIDTH, Emu};
use crate::ooxml::error::{FormatError, Result};
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::{Package, PackURI, Relationships};
use crate::ooxml::pptx::frame::Frame;
use crate::ooxml::xml::ns;
use crate::ooxml::xml::{Element, Tree};

/// A slide, numbered from 1 in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    pub number: usize,
    pub part: PackURI,
}

#[derive(Debug, Clone)]
pub struct Presentation {
    /// The presentation part itself
    pub part: PackURI,
    pub width: Emu,
    pub height: Emu,
    pub slides: Vec<SlideRef>,
    pub masters: Vec<PackURI>,
    pub layouts: Vec<PackURI>,
}

impl Presentation {
    /// Read the presentation structure of a package.
    pub fn load(package: &Package) -> Result<Self> {
        let part = package.main_part()?;
        let xml = package
            .part(&part)
            .ok_or_else(|| FormatError::PartNotFound(part.to_string()))?;
        let tree = Tree::parse_part(part.as_str(), xml)?;
        let root = tree.root();
        if !root.is(ns::P, "presentation") {
            return Err(FormatError::malformed(
                part.as_str(),
                format!("unexpected root element {}", root.name()),
            ));
        }
        let rels = package.relationships_of(&part)?;

        let size = root.child(ns::P, "sldSz");
        let width = size
            .and_then(|s| s.attr_emu("cx"))
            .unwrap_or(DEFAULT_SLIDE_WIDTH);
        let height = size
            .and_then(|s| s.attr_emu("cy"))
            .unwrap_or(DEFAULT_SLIDE_HEIGHT);

        let slides = listed_parts(root, "sldIdLst", "sldId", &rels)?
            .into_iter()
            .enumerate()
            .map(|(i, part)| SlideRef { number: i + 1, part })
            .collect::<Vec<_>>();
        let masters = listed_parts(root, "sldMasterIdLst", "sldMasterId", &rels)?;

        let mut layouts = Vec::new();
        for master in &masters {
            for rel in package
                .relationships_of(master)?
                .of_type(relationship_type::SLIDE_LAYOUT)
            {
                let layout = rel.target_partname()?;
                if !layouts.contains(&layout) {
                    layouts.push(layout);
                }
            }
        }

        log::debug!(
            "presentation {}: {} slides, {} masters, {} layouts",
            part,
            slides.len(),
            masters.len(),
            layouts.len()
        );
        Ok(Self {
            part,
            width,
            height,
            slides,
            masters,
            layouts,
        })
    }

    /// The slide coordinate frame.
    #[inline]
    pub fn frame(&self) -> Frame {
        Frame::slide(self.width, self.height)
    }
}

/// Resolve the `r:id`s of an id list (`p:sldIdLst/p:sldId`) to parts.
///
/// Entries whose relationship is missing are skipped with a warning; a
/// target part that is absent from the package is an error.
fn listed_parts(
    root: &Element,
    list: &str,
    entry: &str,
    rels: &Relationships,
) -> Result<Vec<PackURI>> {
    let Some(list) = root.child(ns::P, list) else {
        return Ok(Vec::new());
    };
    let mut parts = Vec::new();
    for item in list.children_named(ns::P, entry) {
        let Some(r_id) = item.attr_ns(ns::R, "id") else {
            continue;
        };
        match rels.get(r_id) {
            Some(rel) => parts.push(rel.target_partname()?),
            None => log::warn!("{} {} has no relationship", entry, r_id),
        }
    }
    Ok(parts)
}

/// Chart parts referenced by a part, with the relationship ids used to
/// reach them.
pub fn charts_of(package: &Package, part: &PackURI) -> Result<Vec<(String, PackURI)>> {
    let rels = package.relationships_of(part)?;
    rels.of_type(relationship_type::CHART)
        .map(|rel| Ok((rel.r_id().to_string(), rel.target_partname()?)))
        .collect()
}
