//! Document transformation engine.
//!
//! A document goes through three stages:
//!
//! 1. **prepare** (blocking, rayon): open the package, resolve slides,
//!    layouts, masters and charts, then parse, extract and mirror every
//!    part as an independent job,
//! 2. **translate** (async): one batched, retried request per part,
//! 3. **finish** (blocking, rayon): inject translations, then rebuild and
//!    validate the package in a single writer.
//!
//! Element and part failures become warnings; only format and integrity
//! failures reject the document.

use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::common::error::Result;
use crate::config::EngineConfig;
use crate::ooxml::charts;
use crate::ooxml::error::FormatError;
use crate::ooxml::opc::{Package, PackURI};
use crate::ooxml::pptx::presentation::charts_of;
use crate::ooxml::pptx::{self, ExtractionRecord, Frame, InjectionReport, Presentation, SlideSelection};
use crate::ooxml::xml::Tree;
use crate::pipeline::interchange::{Interchange, Stage};
use crate::pipeline::rebuild::{MutatedPart, rebuild};
use crate::pipeline::report::{DocumentReport, Rejection, Statistics, Warning};
use crate::translate::{TranslatedElement, TranslationElement, Translator, translate_with_retry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartKind {
    Presentation,
    Master(usize),
    Layout(usize),
    Slide(usize),
    Chart,
}

impl PartKind {
    /// Label of a shape-tree part, used as the translation context.
    fn label(self) -> Option<String> {
        match self {
            PartKind::Master(n) => Some(format!("Master {}", n)),
            PartKind::Layout(n) => Some(format!("Layout {}", n)),
            PartKind::Slide(n) => Some(format!("Slide {}", n)),
            PartKind::Presentation | PartKind::Chart => None,
        }
    }
}

/// A part after extraction and mirroring.
#[derive(Debug)]
struct PreparedPart {
    part: PackURI,
    kind: PartKind,
    tree: Tree,
    original: Bytes,
    records: Vec<ExtractionRecord>,
}

#[derive(Debug)]
struct Prepared {
    package: Package,
    parts: Vec<PreparedPart>,
    statistics: Statistics,
    warnings: Vec<Warning>,
}

/// Result of transforming one document.
#[derive(Debug)]
pub struct Processed {
    pub report: DocumentReport,
    /// The rebuilt package, absent when the document was rejected
    pub output: Option<Vec<u8>>,
    /// Records as extracted
    pub source: Option<Interchange>,
    /// Records after translation and injection
    pub translated: Option<Interchange>,
}

impl Processed {
    fn rejected(document: &str, rejection: Rejection) -> Self {
        Self {
            report: DocumentReport::rejected(document, rejection),
            output: None,
            source: None,
            translated: None,
        }
    }
}

pub struct Engine<T> {
    config: EngineConfig,
    selection: SlideSelection,
    translator: T,
    cancel: CancellationToken,
}

impl<T: Translator> Engine<T> {
    pub fn new(config: EngineConfig, translator: T) -> Self {
        Self {
            config,
            selection: SlideSelection::All,
            translator,
            cancel: CancellationToken::new(),
        }
    }

    /// Restrict slide transformation to a selection. Layouts, masters and
    /// the presentation default style are still mirrored.
    pub fn with_selection(mut self, selection: SlideSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Use `token` to cancel pending translation requests.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Transform a package held in memory. Never fails: rejections are
    /// reported in [`Processed::report`].
    pub async fn transform(&self, document: &str, input: impl Into<Bytes>) -> Processed {
        let input = input.into();
        let config = self.config.clone();
        let selection = self.selection.clone();
        let mut prepared =
            match tokio::task::spawn_blocking(move || prepare(&config, &selection, &input)).await {
                Ok(Ok(prepared)) => prepared,
                Ok(Err(rejection)) => return Processed::rejected(document, rejection),
                Err(e) => return Processed::rejected(document, Rejection::Internal(e.to_string())),
            };

        let source = interchange(document, Stage::Source, &prepared.parts);
        self.translate(&mut prepared).await;

        let config = self.config.clone();
        let name = document.to_string();
        match tokio::task::spawn_blocking(move || finish(&name, prepared, &config)).await {
            Ok(mut processed) => {
                processed.source = Some(source);
                processed
            },
            Err(e) => Processed::rejected(document, Rejection::Internal(e.to_string())),
        }
    }

    /// Transform `input` into `output`. The output file is only written
    /// when the document is delivered.
    pub async fn transform_file(&self, input: &Path, output: &Path) -> Result<Processed> {
        let bytes = tokio::fs::read(input).await?;
        let document = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        let processed = self.transform(&document, bytes).await;
        if let Some(bytes) = &processed.output {
            tokio::fs::write(output, bytes).await?;
            log::info!("{}: written to {}", document, output.display());
        }
        Ok(processed)
    }

    async fn translate(&self, prepared: &mut Prepared) {
        for part in prepared.parts.iter_mut().filter(|p| !p.records.is_empty()) {
            let elements = translation_elements(&part.records);
            let context = part
                .records
                .iter()
                .map(|r| r.context.as_str())
                .find(|c| !c.is_empty())
                .unwrap_or_default()
                .to_string();

            match translate_with_retry(
                &self.translator,
                &context,
                &elements,
                &self.config.retry,
                &self.cancel,
            )
            .await
            {
                Ok(translated) => apply_translations(&mut part.records, translated),
                Err(error) => {
                    log::warn!("{}: translation failed, keeping source text: {}", part.part, error);
                    prepared.warnings.push(Warning::new(
                        part.part.as_str(),
                        None,
                        format!("translation failed: {}", error),
                    ));
                },
            }
        }
    }
}

fn format_rejection(error: FormatError) -> Rejection {
    Rejection::Format(error.to_string())
}

fn prepare(config: &EngineConfig, selection: &SlideSelection, input: &[u8]) -> std::result::Result<Prepared, Rejection> {
    let package = Package::open(input).map_err(format_rejection)?;
    let presentation = Presentation::load(&package).map_err(format_rejection)?;
    selection
        .validate(presentation.slides.len())
        .map_err(|e| Rejection::Selection(e.to_string()))?;

    let mut jobs: Vec<(PackURI, PartKind)> = Vec::new();
    if config.geometry.include_masters {
        jobs.push((presentation.part.clone(), PartKind::Presentation));
        jobs.extend(
            presentation
                .masters
                .iter()
                .enumerate()
                .map(|(i, m)| (m.clone(), PartKind::Master(i + 1))),
        );
        jobs.extend(
            presentation
                .layouts
                .iter()
                .enumerate()
                .map(|(i, l)| (l.clone(), PartKind::Layout(i + 1))),
        );
    }
    let mut chart_parts: Vec<PackURI> = Vec::new();
    let mut statistics = Statistics::default();
    for slide in presentation.slides.iter().filter(|s| selection.contains(s.number)) {
        jobs.push((slide.part.clone(), PartKind::Slide(slide.number)));
        statistics.slides += 1;
        for (_, chart) in charts_of(&package, &slide.part).map_err(format_rejection)? {
            if !chart_parts.contains(&chart) {
                chart_parts.push(chart);
            }
        }
    }
    statistics.charts = chart_parts.len();
    jobs.extend(chart_parts.into_iter().map(|c| (c, PartKind::Chart)));

    let frame = presentation.frame();
    let outcomes = jobs
        .into_par_iter()
        .map(|(part, kind)| prepare_part(&package, part, kind, frame, config))
        .collect::<std::result::Result<Vec<_>, FormatError>>()
        .map_err(format_rejection)?;

    let mut parts = Vec::with_capacity(outcomes.len());
    let mut warnings = Vec::new();
    for (part, geometry, reversed) in outcomes {
        statistics.shapes_mirrored += geometry.mirrored;
        statistics.shapes_flipped += geometry.flipped;
        statistics.tables_reversed += geometry.tables;
        statistics.bar_charts_reversed += usize::from(reversed);
        statistics.records += part.records.len();
        for fault in geometry.faults {
            warnings.push(Warning::new(part.part.as_str(), Some(fault.path), fault.error));
        }
        parts.push(part);
    }

    log::info!(
        "{} slides, {} charts, {} text records, {} shapes mirrored",
        statistics.slides,
        statistics.charts,
        statistics.records,
        statistics.shapes_mirrored
    );
    Ok(Prepared {
        package,
        parts,
        statistics,
        warnings,
    })
}

fn prepare_part(
    package: &Package,
    part: PackURI,
    kind: PartKind,
    frame: Frame,
    config: &EngineConfig,
) -> std::result::Result<(PreparedPart, pptx::GeometryReport, bool), FormatError> {
    let original = package
        .part_bytes(&part)
        .ok_or_else(|| FormatError::PartNotFound(part.to_string()))?;
    let mut tree = Tree::parse_part(part.as_str(), &original)?;
    let mut records = Vec::new();
    let mut geometry = pptx::GeometryReport::default();
    let mut reversed = false;

    match kind {
        PartKind::Presentation => {
            pptx::mirror_presentation(&mut tree);
        },
        PartKind::Master(_) | PartKind::Layout(_) | PartKind::Slide(_) => {
            let label = kind.label().unwrap_or_default();
            records = pptx::extract(&tree, &label, frame, &config.roles);
            geometry = pptx::mirror_part(&mut tree, frame, &config.geometry);
        },
        PartKind::Chart => {
            records = charts::extract_chart_text(&tree);
            let context = format!("Chart {}", part.filename());
            for record in &mut records {
                record.context.clone_from(&context);
            }
            charts::mirror_chart(&mut tree);
            reversed = charts::reverse_bar_orientation(&mut tree);
        },
    }

    log::debug!(
        "{}: {} records, {} shapes mirrored",
        part,
        records.len(),
        geometry.mirrored
    );
    let prepared = PreparedPart {
        part,
        kind,
        tree,
        original,
        records,
    };
    Ok((prepared, geometry, reversed))
}

/// Translation id of a paragraph: `{record}#p{index}`.
fn paragraph_id(record: &str, paragraph: usize) -> String {
    format!("{}#p{}", record, paragraph)
}

fn translation_elements(records: &[ExtractionRecord]) -> Vec<TranslationElement> {
    records
        .iter()
        .flat_map(|record| {
            record
                .paragraphs
                .iter()
                .filter(|p| p.has_text())
                .map(move |p| TranslationElement {
                    id: paragraph_id(&record.id, p.index),
                    role: record.role,
                    text: p.text.clone(),
                })
        })
        .collect()
}

fn apply_translations(records: &mut [ExtractionRecord], translated: Vec<TranslatedElement>) {
    let mut by_id: HashMap<String, String> = translated.into_iter().map(|t| (t.id, t.text)).collect();
    for record in records.iter_mut() {
        for paragraph in record.paragraphs.iter_mut().filter(|p| p.has_text()) {
            if let Some(text) = by_id.remove(&paragraph_id(&record.id, paragraph.index)) {
                paragraph.replacement = Some(text);
            }
        }
    }
}

fn interchange(document: &str, stage: Stage, parts: &[PreparedPart]) -> Interchange {
    let mut interchange = Interchange::new(document, stage);
    for part in parts {
        interchange.insert(part.part.as_str(), &part.records);
    }
    interchange
}

fn finish(document: &str, prepared: Prepared, config: &EngineConfig) -> Processed {
    let Prepared {
        mut package,
        mut parts,
        mut statistics,
        mut warnings,
    } = prepared;

    let reports: Vec<InjectionReport> = parts
        .par_iter_mut()
        .map(|p| match p.kind {
            PartKind::Master(_) | PartKind::Layout(_) | PartKind::Slide(_) => {
                pptx::inject(&mut p.tree, &mut p.records, config)
            },
            PartKind::Chart => charts::inject_chart_text(&mut p.tree, &mut p.records, config),
            _ => InjectionReport::default(),
        })
        .collect();
    for (part, report) in parts.iter().zip(&reports) {
        statistics.records_injected += report.injected.len();
        warnings.extend(report.errors.iter().map(|e| Warning::injection(part.part.as_str(), e)));
    }

    let translated = interchange(document, Stage::Translated, &parts);
    let mutated: Vec<MutatedPart> = parts
        .into_iter()
        .map(|p| MutatedPart {
            part: p.part,
            tree: p.tree,
            original: p.original,
            records: p.records,
        })
        .collect();

    let rebuilt = match rebuild(&mut package, &mutated) {
        Ok(rebuilt) => rebuilt,
        Err(error) => {
            let mut processed = Processed::rejected(document, Rejection::Validation(error.to_string()));
            processed.translated = Some(translated);
            return processed;
        },
    };
    warnings.extend(rebuilt.warnings.iter().map(Warning::validation));

    let output = match package.save() {
        Ok(bytes) => bytes,
        Err(error) => return Processed::rejected(document, Rejection::Internal(error.to_string())),
    };

    let report = DocumentReport::delivered(document, warnings, statistics);
    log::info!(
        "{}: {:?}, {} of {} records injected, {} warnings",
        document,
        report.outcome,
        report.statistics.records_injected,
        report.statistics.records,
        report.warnings.len()
    );
    Processed {
        report,
        output: Some(output),
        source: None,
        translated: Some(translated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use crate::ooxml::pptx::{ParagraphSnapshot, Role};
    use crate::ooxml::xml::ns;
    use crate::translate::MockTranslator;

    const RT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    fn rels(kind: &str, target: &str) -> String {
        format!(
            concat!(
                "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
                "<Relationship Id=\"rId1\" Type=\"{}/{}\" Target=\"{}\"/></Relationships>"
            ),
            RT, kind, target
        )
    }

    fn shape_tree(root: &str, shapes: &str, tail: &str) -> String {
        format!(
            concat!(
                "<p:{root} xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\"><p:cSld><p:spTree>",
                "<p:nvGrpSpPr/><p:grpSpPr/>{shapes}</p:spTree></p:cSld>{tail}</p:{root}>"
            ),
            root = root,
            a = ns::A,
            r = ns::R,
            p = ns::P,
            shapes = shapes,
            tail = tail
        )
    }

    fn text_box(x: i64, text: &str) -> String {
        format!(
            concat!(
                "<p:sp><p:nvSpPr><p:cNvPr id=\"5\" name=\"Tagline\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>",
                "<p:spPr><a:xfrm><a:off x=\"{}\" y=\"6000000\"/><a:ext cx=\"4000000\" cy=\"400000\"/></a:xfrm></p:spPr>",
                "<p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"
            ),
            x, text
        )
    }

    /// One slide, one layout and one master, each with a text box.
    fn deck() -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut data));
            let options = SimpleFileOptions::default();
            let entries = [
                ("[Content_Types].xml".to_string(), "<Types/>".to_string()),
                ("_rels/.rels".to_string(), rels("officeDocument", "ppt/presentation.xml")),
                (
                    "ppt/presentation.xml".to_string(),
                    format!(
                        concat!(
                            "<p:presentation xmlns:r=\"{}\" xmlns:p=\"{}\">",
                            "<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId2\"/></p:sldMasterIdLst>",
                            "<p:sldIdLst><p:sldId id=\"256\" r:id=\"rId1\"/></p:sldIdLst>",
                            "<p:sldSz cx=\"9144000\" cy=\"6858000\"/></p:presentation>"
                        ),
                        ns::R,
                        ns::P
                    ),
                ),
                (
                    "ppt/_rels/presentation.xml.rels".to_string(),
                    format!(
                        concat!(
                            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
                            "<Relationship Id=\"rId1\" Type=\"{rt}/slide\" Target=\"slides/slide1.xml\"/>",
                            "<Relationship Id=\"rId2\" Type=\"{rt}/slideMaster\" Target=\"slideMasters/slideMaster1.xml\"/>",
                            "</Relationships>"
                        ),
                        rt = RT
                    ),
                ),
                (
                    "ppt/slideMasters/slideMaster1.xml".to_string(),
                    shape_tree(
                        "sldMaster",
                        &text_box(500_000, "Confidential"),
                        "<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>",
                    ),
                ),
                (
                    "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
                    rels("slideLayout", "../slideLayouts/slideLayout1.xml"),
                ),
                (
                    "ppt/slideLayouts/slideLayout1.xml".to_string(),
                    shape_tree("sldLayout", &text_box(1_000_000, "Built for growth"), ""),
                ),
                (
                    "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
                    rels("slideMaster", "../slideMasters/slideMaster1.xml"),
                ),
                (
                    "ppt/slides/slide1.xml".to_string(),
                    shape_tree("sld", &text_box(0, "Agenda"), ""),
                ),
                (
                    "ppt/slides/_rels/slide1.xml.rels".to_string(),
                    rels("slideLayout", "../slideLayouts/slideLayout1.xml"),
                ),
            ];
            for (name, body) in entries {
                zip.start_file(name, options).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        data
    }

    fn part_xml(output: &[u8], name: &str) -> String {
        let package = Package::open(output).unwrap();
        let bytes = package.part(&PackURI::new(name).unwrap()).unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_layout_and_master_text_is_translated() {
        let engine = Engine::new(EngineConfig::default(), MockTranslator);
        let processed = engine.transform("deck.pptx", deck()).await;
        assert!(processed.report.is_delivered(), "{:?}", processed.report);
        assert_eq!(processed.report.statistics.records, 3);
        assert_eq!(processed.report.statistics.records_injected, 3);

        let output = processed.output.unwrap();
        let layout = part_xml(&output, "/ppt/slideLayouts/slideLayout1.xml");
        assert!(!layout.contains("Built for growth"));
        assert!(layout.contains("(#2#p0)"));
        assert!(layout.contains("<a:off x=\"4144000\" y=\"6000000\"/>"));
        let master = part_xml(&output, "/ppt/slideMasters/slideMaster1.xml");
        assert!(!master.contains("Confidential"));
        assert!(master.contains("<a:off x=\"4644000\" y=\"6000000\"/>"));

        let source = processed.source.unwrap();
        let layout_records: Vec<_> = source.records("/ppt/slideLayouts/slideLayout1.xml").collect();
        assert_eq!(layout_records.len(), 1);
        assert_eq!(layout_records[0].context, "Layout 1");
        assert_eq!(layout_records[0].text(), "Built for growth");
        let master_records: Vec<_> = source.records("/ppt/slideMasters/slideMaster1.xml").collect();
        assert_eq!(master_records[0].context, "Master 1");
    }

    #[tokio::test]
    async fn test_masters_can_be_left_alone() {
        let mut config = EngineConfig::default();
        config.geometry.include_masters = false;
        let input = deck();
        let processed = Engine::new(config, MockTranslator).transform("deck.pptx", input.clone()).await;
        let output = processed.output.unwrap();
        assert_eq!(processed.report.statistics.records, 1);
        for name in ["/ppt/slideLayouts/slideLayout1.xml", "/ppt/slideMasters/slideMaster1.xml"] {
            assert_eq!(part_xml(&output, name), part_xml(&input, name));
        }
    }

    fn record(id: &str, texts: &[&str]) -> ExtractionRecord {
        let paragraphs = texts
            .iter()
            .enumerate()
            .map(|(index, text)| ParagraphSnapshot {
                index,
                text: text.to_string(),
                level: 0,
                bold: false,
                alignment: None,
                replacement: None,
            })
            .collect();
        ExtractionRecord::new(id, Role::Body, paragraphs)
    }

    #[test]
    fn test_blank_paragraphs_are_not_sent() {
        let records = [record("3", &["Hello", " ", "World"]), record("5:r0c1", &["Cell"])];
        let ids: Vec<String> = translation_elements(&records).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["3#p0", "3#p2", "5:r0c1#p0"]);
    }

    #[test]
    fn test_translations_land_on_their_paragraphs() {
        let mut records = [record("3", &["Hello", " ", "World"])];
        let translated = vec![
            TranslatedElement {
                id: "3#p2".into(),
                text: "عالم".into(),
            },
            TranslatedElement {
                id: "3#p0".into(),
                text: "مرحبا".into(),
            },
        ];
        apply_translations(&mut records, translated);
        let replacements: Vec<Option<&str>> = records[0]
            .paragraphs
            .iter()
            .map(|p| p.replacement.as_deref())
            .collect();
        assert_eq!(replacements, [Some("مرحبا"), None, Some("عالم")]);
        assert_eq!(records[0].validate(), Ok(true));
    }
}
