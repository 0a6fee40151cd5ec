//! JSON interchange of extraction records.
//!
//! Records are keyed by part name, then by element id:
//!
//! ```json
//! {
//!   "document": "deck.pptx",
//!   "stage": "translated",
//!   "parts": {
//!     "/ppt/slides/slide1.xml": {
//!       "3": {"id": "3", "role": "title", "paragraphs": [...], ...}
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::error::Result;
use crate::ooxml::pptx::ExtractionRecord;
use crate::pipeline::report::DocumentReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Before translation
    Source,
    /// After translation and injection
    Translated,
}

impl Stage {
    fn suffix(self) -> &'static str {
        match self {
            Stage::Source => "source",
            Stage::Translated => "translated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interchange {
    pub document: String,
    pub stage: Stage,
    pub parts: BTreeMap<String, BTreeMap<String, ExtractionRecord>>,
}

impl Interchange {
    pub fn new(document: impl Into<String>, stage: Stage) -> Self {
        Self {
            document: document.into(),
            stage,
            parts: BTreeMap::new(),
        }
    }

    /// Add the records of one part. Parts without records are left out.
    pub fn insert<'a>(&mut self, part: &str, records: impl IntoIterator<Item = &'a ExtractionRecord>) {
        let entry: BTreeMap<String, ExtractionRecord> = records
            .into_iter()
            .map(|r| (r.id.clone(), r.clone()))
            .collect();
        if !entry.is_empty() {
            self.parts.insert(part.to_string(), entry);
        }
    }

    /// Number of records across all parts.
    pub fn len(&self) -> usize {
        self.parts.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self, part: &str) -> impl Iterator<Item = &ExtractionRecord> {
        self.parts.get(part).into_iter().flat_map(BTreeMap::values)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Copy replacements from `self` onto matching records.
    ///
    /// Returns how many paragraphs received a replacement.
    pub fn apply(&self, part: &str, records: &mut [ExtractionRecord]) -> usize {
        let Some(translated) = self.parts.get(part) else {
            return 0;
        };
        let mut applied = 0;
        for record in records.iter_mut() {
            let Some(source) = translated.get(&record.id) else {
                continue;
            };
            for (paragraph, from) in record.paragraphs.iter_mut().zip(&source.paragraphs) {
                if paragraph.index == from.index && from.replacement.is_some() {
                    paragraph.replacement = from.replacement.clone();
                    applied += 1;
                }
            }
        }
        applied
    }
}

/// Files written to an audit directory for one document.
#[derive(Debug, Clone)]
pub struct AuditFiles {
    pub source: PathBuf,
    pub translated: PathBuf,
    pub report: PathBuf,
}

/// Write the record sets and the report of a document into `dir`.
///
/// File names are derived from `stem`: `{stem}.source.json`,
/// `{stem}.translated.json` and `{stem}.report.json`.
pub fn write_audit(
    dir: &Path,
    stem: &str,
    source: &Interchange,
    translated: &Interchange,
    report: &DocumentReport,
) -> Result<AuditFiles> {
    std::fs::create_dir_all(dir)?;
    let path = |suffix: &str| dir.join(format!("{}.{}.json", stem, suffix));
    let files = AuditFiles {
        source: path(source.stage.suffix()),
        translated: path(translated.stage.suffix()),
        report: path("report"),
    };
    std::fs::write(&files.source, source.to_json()?)?;
    std::fs::write(&files.translated, translated.to_json()?)?;
    std::fs::write(&files.report, serde_json::to_string_pretty(report)?)?;
    log::info!("audit records written to {}", dir.display());
    Ok(files)
}
