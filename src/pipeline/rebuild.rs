//! Writing transformed parts back into the package.
//!
//! Before anything is written, every relationship a mutated part relies on
//! must resolve. Each serialized part is then re-parsed; a part that no
//! longer parses is reverted to its original bytes and the document is
//! still delivered.

use bytes::Bytes;

use crate::ooxml::error::ValidationError;
use crate::ooxml::opc::{Package, PackURI};
use crate::ooxml::pptx::ExtractionRecord;
use crate::ooxml::xml::ns;
use crate::ooxml::xml::Tree;

/// A transformed part ready to be written.
#[derive(Debug)]
pub struct MutatedPart {
    pub part: PackURI,
    pub tree: Tree,
    /// Bytes as read from the package
    pub original: Bytes,
    pub records: Vec<ExtractionRecord>,
}

#[derive(Debug, Default)]
pub struct Rebuilt {
    pub written: Vec<PackURI>,
    pub reverted: Vec<PackURI>,
    /// Non-fatal findings: round-trip failures and untranslated slots
    pub warnings: Vec<ValidationError>,
}

/// Write `parts` into `package`.
///
/// # Errors
///
/// [`ValidationError::DanglingRelationship`] when a mutated part refers to
/// a relationship id it does not declare, or declares an internal
/// relationship whose target is missing. The package is left untouched.
pub fn rebuild(package: &mut Package, parts: &[MutatedPart]) -> Result<Rebuilt, ValidationError> {
    for part in parts {
        check_references(package, part)?;
    }

    let mut rebuilt = Rebuilt::default();
    for part in parts {
        let name = part.part.as_str();
        let serialized = part.tree.serialize();
        match Tree::parse_part(name, &serialized) {
            Ok(_) => {
                package.put_part(&part.part, serialized);
                rebuilt.written.push(part.part.clone());
            },
            Err(error) => {
                log::warn!("{} does not re-parse, reverting: {}", name, error);
                package.put_part(&part.part, part.original.clone());
                rebuilt.reverted.push(part.part.clone());
                rebuilt
                    .warnings
                    .push(ValidationError::SerializationRoundtripFailed {
                        part: name.to_string(),
                        message: error.to_string(),
                    });
            },
        }

        for record in &part.records {
            if record.required && record.has_text() && !record.injected {
                rebuilt.warnings.push(ValidationError::IncompleteInjection {
                    part: name.to_string(),
                    id: record.id.clone(),
                });
            }
        }
    }

    log::debug!(
        "rebuilt {} parts, {} reverted, {} warnings",
        rebuilt.written.len(),
        rebuilt.reverted.len(),
        rebuilt.warnings.len()
    );
    Ok(rebuilt)
}

fn check_references(package: &Package, part: &MutatedPart) -> Result<(), ValidationError> {
    let dangling = |reference: String| ValidationError::DanglingRelationship {
        part: part.part.to_string(),
        reference,
    };
    let rels = package
        .relationships_of(&part.part)
        .map_err(|e| dangling(e.to_string()))?;

    for element in part.tree.find_all(|_| true) {
        for attr in element.attributes() {
            if attr.namespace() != Some(ns::R) || attr.value().is_empty() {
                continue;
            }
            if rels.get(attr.value()).is_none() {
                return Err(dangling(format!("{}=\"{}\"", attr.name(), attr.value())));
            }
        }
    }

    for rel in rels.iter().filter(|r| !r.is_external()) {
        let resolves = rel
            .target_partname()
            .is_ok_and(|target| package.contains(&target));
        if !resolves {
            return Err(dangling(format!("{} -> {}", rel.r_id(), rel.target_ref())));
        }
    }
    Ok(())
}
