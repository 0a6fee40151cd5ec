//! Extraction and re-injection of slide text.
//!
//! Every text container of a slide becomes an [`ExtractionRecord`] with an
//! id that only depends on the container's position in the shape tree:
//!
//! ```text
//! 3          third element child of p:spTree
//! 4.2        third element child of the group at 4
//! 6.0.2      shape 2 of the mc:Choice branch of the block at 6
//! 5:r1c0     table at 5, row 1, logical column 0
//! ```
//!
//! Table columns are numbered as in the unmirrored table, so ids derived
//! before and after mirroring agree.

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, RoleConfig};
use crate::ooxml::error::InjectionError;
use crate::ooxml::pptx::frame::Frame;
use crate::ooxml::pptx::role::{ContainerFacts, Role, RoleClassifier, explicit_sizes};
use crate::ooxml::pptx::shape::{self, GraphicKind, ShapeKind, format_path, parse_path};
use crate::ooxml::pptx::table;
use crate::ooxml::pptx::text::{self, RUN, localize_run_properties, replace_paragraph_text};
use crate::ooxml::xml::ns;
use crate::ooxml::xml::{Element, Tree};

/// One paragraph of an extracted container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphSnapshot {
    /// Ordinal of the paragraph within its container
    pub index: usize,
    pub text: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    /// Translated text, filled in by the translation step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

impl ParagraphSnapshot {
    #[inline]
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// A text container and its paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub id: String,
    pub role: Role,
    pub paragraphs: Vec<ParagraphSnapshot>,
    /// Slide-level context passed along to the translator
    #[serde(default)]
    pub context: String,
    /// Whether a missing translation makes the document partial
    pub required: bool,
    #[serde(default)]
    pub injected: bool,
}

impl ExtractionRecord {
    pub fn new(id: impl Into<String>, role: Role, paragraphs: Vec<ParagraphSnapshot>) -> Self {
        Self {
            id: id.into(),
            role,
            paragraphs,
            context: String::new(),
            required: role.is_required(),
            injected: false,
        }
    }

    /// Whether any paragraph has visible text.
    pub fn has_text(&self) -> bool {
        self.paragraphs.iter().any(ParagraphSnapshot::has_text)
    }

    /// Source text, paragraphs joined by newlines.
    pub fn text(&self) -> String {
        let texts: Vec<&str> = self.paragraphs.iter().map(|p| p.text.as_str()).collect();
        texts.join("\n")
    }

    /// Check replacements before touching the tree.
    ///
    /// `Ok(false)` means nothing was translated and the container keeps its
    /// text without error.
    pub fn validate(&self) -> Result<bool, InjectionError> {
        let mut any = false;
        for p in self.paragraphs.iter().filter(|p| p.has_text()) {
            match p.replacement.as_deref() {
                Some(r) if r.trim().is_empty() => {
                    return Err(InjectionError::EmptyTranslation {
                        id: self.id.clone(),
                        paragraph: p.index,
                    });
                },
                Some(_) => any = true,
                None => {},
            }
        }
        Ok(any)
    }
}

/// Outcome of an injection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// Ids of records whose text was written
    pub injected: Vec<String>,
    pub errors: Vec<InjectionError>,
}

impl InjectionReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: InjectionReport) {
        self.injected.extend(other.injected);
        self.errors.extend(other.errors);
    }

    pub(crate) fn fail(&mut self, error: InjectionError) {
        log::warn!("{}", error);
        self.errors.push(error);
    }
}

/// Snapshot the paragraphs of a text body.
pub fn snapshot_body(body: &Element) -> Vec<ParagraphSnapshot> {
    body.children_named(ns::A, "p")
        .enumerate()
        .map(|(index, p)| {
            let ppr = p.child(ns::A, "pPr");
            ParagraphSnapshot {
                index,
                text: text::run_text(p),
                level: ppr
                    .and_then(|ppr| ppr.attr_emu("lvl"))
                    .and_then(|l| u8::try_from(l).ok())
                    .unwrap_or(0),
                bold: p
                    .children_named(ns::A, "r")
                    .filter_map(|r| r.child(ns::A, "rPr"))
                    .any(|rpr| rpr.attr_bool("b") == Some(true)),
                alignment: ppr.and_then(|ppr| ppr.attr("algn")).map(str::to_string),
                replacement: None,
            }
        })
        .collect()
}

/// Write a validated record into a text body.
///
/// Paragraphs without a replacement keep their text. Every run of the body
/// is localized afterwards. `mirrored` is the transform state of the tree
/// the body belongs to; new runs of a mirrored body are marked right-to-left.
pub fn inject_body(
    body: &mut Element,
    record: &ExtractionRecord,
    config: &EngineConfig,
    mirrored: bool,
) -> Result<(), InjectionError> {
    let count = body.children_named(ns::A, "p").count();
    if record.paragraphs.iter().any(|p| p.index >= count) {
        return Err(InjectionError::UnmatchedRecord {
            id: record.id.clone(),
        });
    }

    for snapshot in &record.paragraphs {
        let Some(replacement) = snapshot.replacement.as_deref() else {
            continue;
        };
        if !snapshot.has_text() {
            continue;
        }
        if let Some(p) = body.children_named_mut(ns::A, "p").nth(snapshot.index) {
            replace_paragraph_text(p, replacement, &config.target_locale, &config.fonts, mirrored);
        }
    }

    for p in body.children_named_mut(ns::A, "p") {
        for run in p.children_named_mut(ns::A, "r") {
            let rpr = run.ensure_child("rPr", RUN);
            localize_run_properties(rpr, &config.target_locale, &config.fonts);
        }
    }
    Ok(())
}

struct Container<'t> {
    id: String,
    facts: ContainerFacts<'t>,
    body: &'t Element,
    y: i64,
}

/// Extract the text containers of a slide, layout or master.
///
/// `label` names the slide ("Slide 3"); the title text, when there is one,
/// is appended to form each record's context. Records are ordered top to
/// bottom. Empty containers are skipped.
pub fn extract(tree: &Tree, label: &str, frame: Frame, config: &RoleConfig) -> Vec<ExtractionRecord> {
    let Some(spt) = shape::shape_tree(tree.root()) else {
        return Vec::new();
    };
    let mut containers = Vec::new();
    collect(spt, tree.state.mirrored, &mut Vec::new(), None, &mut containers);

    let sizes: Vec<i64> = containers
        .iter()
        .filter(|c| text::has_translatable_text(c.body))
        .flat_map(|c| explicit_sizes(c.body))
        .collect();
    let mut classifier = RoleClassifier::new(config, frame, sizes);

    let mut ranked: Vec<(i64, ExtractionRecord)> = Vec::new();
    for container in &containers {
        if !text::has_translatable_text(container.body) {
            continue;
        }
        let role = classifier.classify(&container.facts);
        let record = ExtractionRecord::new(container.id.clone(), role, snapshot_body(container.body));
        ranked.push((container.y, record));
    }
    ranked.sort_by_key(|(y, _)| *y);

    let mut records: Vec<ExtractionRecord> = ranked.into_iter().map(|(_, r)| r).collect();
    let title = records
        .iter()
        .find(|r| r.role == Role::Title)
        .map(|r| r.text().replace('\n', " "));
    let context = match title {
        Some(title) if !title.trim().is_empty() => format!("{}: {}", label, title.trim()),
        _ => label.to_string(),
    };
    for record in &mut records {
        record.context = context.clone();
    }
    log::debug!("{}: extracted {} records", label, records.len());
    records
}

fn collect<'t>(
    container: &'t Element,
    mirrored: bool,
    path: &mut Vec<usize>,
    outer_y: Option<i64>,
    out: &mut Vec<Container<'t>>,
) {
    for (ordinal, child) in container.elements().enumerate() {
        path.push(ordinal);
        let placement = shape::placement(child);
        let y = outer_y.or(placement.map(|p| p.y));
        match ShapeKind::of(child) {
            ShapeKind::Shape => {
                if let Some(body) = shape::text_body(child) {
                    out.push(Container {
                        id: format_path(path),
                        facts: ContainerFacts {
                            in_table_cell: false,
                            placeholder: shape::placeholder_type(child),
                            max_size: explicit_sizes(body).max(),
                            placement,
                        },
                        body,
                        y: y.unwrap_or(0),
                    });
                }
            },
            ShapeKind::GraphicFrame if shape::graphic_kind(child) == GraphicKind::Table => {
                if let Some(tbl) = shape::table(child) {
                    collect_cells(tbl, mirrored, &format_path(path), y.unwrap_or(0), out);
                }
            },
            ShapeKind::Group => collect(child, mirrored, path, y, out),
            ShapeKind::AlternateContent => {
                for (branch_ordinal, branch) in child.elements().enumerate() {
                    if branch.is(ns::MC, "Choice") || branch.is(ns::MC, "Fallback") {
                        path.push(branch_ordinal);
                        collect(branch, mirrored, path, y, out);
                        path.pop();
                    }
                }
            },
            _ => {},
        }
        path.pop();
    }
}

fn collect_cells<'t>(
    tbl: &'t Element,
    mirrored: bool,
    frame_id: &str,
    y: i64,
    out: &mut Vec<Container<'t>>,
) {
    for (row, tr) in tbl.children_named(ns::A, "tr").enumerate() {
        let columns = table::logical_columns(tr, mirrored);
        let mut cells: Vec<(usize, &Element)> = tr
            .children_named(ns::A, "tc")
            .zip(columns)
            .filter_map(|(tc, col)| tc.child(ns::A, "txBody").map(|body| (col, body)))
            .collect();
        cells.sort_by_key(|(col, _)| *col);
        for (col, body) in cells {
            out.push(Container {
                id: format!("{}:r{}c{}", frame_id, row, col),
                facts: ContainerFacts {
                    in_table_cell: true,
                    ..ContainerFacts::default()
                },
                body,
                y,
            });
        }
    }
}

/// Write translated records back into a slide.
///
/// Records are matched by id. Each failure is recorded in the report and
/// leaves that container untouched; the `injected` flag is set on every
/// record whose text was written.
pub fn inject(
    tree: &mut Tree,
    records: &mut [ExtractionRecord],
    config: &EngineConfig,
) -> InjectionReport {
    let mut report = InjectionReport::default();
    let mirrored = tree.state.mirrored;

    for record in records.iter_mut() {
        match record.validate() {
            Ok(true) => {},
            Ok(false) => continue,
            Err(error) => {
                report.fail(error);
                continue;
            },
        }

        let Some(body) = shape::shape_tree_mut(tree.root_mut())
            .and_then(|spt| locate_body(spt, &record.id, mirrored))
        else {
            report.fail(InjectionError::UnmatchedRecord {
                id: record.id.clone(),
            });
            continue;
        };

        match inject_body(body, record, config, mirrored) {
            Ok(()) => {
                record.injected = true;
                report.injected.push(record.id.clone());
            },
            Err(error) => report.fail(error),
        }
    }

    if !report.injected.is_empty() {
        tree.state.text_injected = true;
    }
    report
}

/// Find the text body a record id points at.
fn locate_body<'t>(spt: &'t mut Element, id: &str, mirrored: bool) -> Option<&'t mut Element> {
    let (shape_path, cell) = match id.split_once(':') {
        Some((path, cell)) => (path, Some(parse_cell(cell)?)),
        None => (id, None),
    };

    let mut current = spt;
    for ordinal in parse_path(shape_path)? {
        current = current.nth_element_mut(ordinal)?;
    }

    match cell {
        Some((row, col)) => {
            let tbl = shape::table_mut(current)?;
            table::cell_mut(tbl, row, col, mirrored)?.child_mut(ns::A, "txBody")
        },
        None if ShapeKind::of(current) == ShapeKind::Shape => shape::text_body_mut(current),
        None => None,
    }
}

/// Parse "r{row}c{col}".
fn parse_cell(cell: &str) -> Option<(usize, usize)> {
    let (row, col) = cell.strip_prefix('r')?.split_once('c')?;
    let row = atoi_simd::parse::<u32, false, false>(row.as_bytes()).ok()? as usize;
    let col = atoi_simd::parse::<u32, false, false>(col.as_bytes()).ok()? as usize;
    Some((row, col))
}
