//! Chart parts (`c:chartSpace`).
//!
//! Charts are transformed in three steps, each guarded by the chart tree's
//! transform state:
//!
//! - [`mirror_chart`] gives every rich text body right-to-left direction and
//!   swaps a left/right legend,
//! - [`reverse_bar_orientation`] reverses the value axis of horizontal bar
//!   plots so bars grow from the right,
//! - [`extract_chart_text`] and [`inject_chart_text`] move the title, axis
//!   titles, series names and category labels through translation.
//!
//! Record ids: `title`, `axis{axId}`, `ser{idx}` and `cat{ptIdx}`. Category
//! labels are shared: one record per point index, written into every
//! series that caches a label for that index.

pub mod types;

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::ooxml::error::InjectionError;
use crate::ooxml::pptx::content::{ExtractionRecord, InjectionReport, ParagraphSnapshot, inject_body, snapshot_body};
use crate::ooxml::pptx::role::Role;
use crate::ooxml::pptx::text::mirror_text_body;
use crate::ooxml::xml::ns;
use crate::ooxml::xml::{Element, Tree};

pub use types::{AxisOrientation, BarDirection, LegendPosition};

/// Child order of `CT_Scaling`.
const SCALING: &[&str] = &["logBase", "orientation", "max", "min", "extLst"];
/// Child order of `CT_ValAx`.
const VAL_AX: &[&str] = &[
    "axId",
    "scaling",
    "delete",
    "axPos",
    "majorGridlines",
    "minorGridlines",
    "title",
    "numFmt",
    "majorTickMark",
    "minorTickMark",
    "tickLblPos",
    "spPr",
    "txPr",
    "crossAx",
    "crosses",
    "crossesAt",
    "crossBetween",
    "majorUnit",
    "minorUnit",
    "dispUnits",
    "extLst",
];
/// Child order of `CT_Legend`.
const LEGEND: &[&str] = &["legendPos", "legendEntry", "layout", "overlay", "spPr", "txPr", "extLst"];

const AXES: &[&str] = &["catAx", "valAx", "dateAx", "serAx"];
const BAR_PLOTS: &[&str] = &["barChart", "bar3DChart"];

#[inline]
fn is_axis(e: &Element) -> bool {
    e.namespace() == Some(ns::C) && AXES.contains(&e.local_name())
}

#[inline]
fn axis_id(axis: &Element) -> Option<&str> {
    axis.child(ns::C, "axId").and_then(|a| a.attr("val"))
}

/// Apply right-to-left direction to chart text and swap the legend side.
///
/// Returns false when the chart was already mirrored.
pub fn mirror_chart(tree: &mut Tree) -> bool {
    if tree.state.mirrored {
        return false;
    }
    let root = tree.root_mut();
    root.for_each_element_mut(&mut |e| {
        if e.is(ns::C, "rich") || e.is(ns::C, "txPr") {
            mirror_text_body(e);
        }
    });

    if let Some(legend) = root.path_mut(&[(ns::C, "chart"), (ns::C, "legend")]) {
        let position = legend.ensure_child("legendPos", LEGEND);
        let current = position
            .attr("val")
            .and_then(LegendPosition::from_xml)
            .unwrap_or(LegendPosition::Right);
        position.set_attr("val", current.mirrored().xml_value());
    }

    tree.state.mirrored = true;
    true
}

/// Reverse the value axis of horizontal bar plots.
///
/// Toggles `c:scaling/c:orientation` of every value axis referenced by a
/// plot with `c:barDir val="bar"`, creating missing elements in schema
/// position. Category axes and data are untouched. Returns whether any
/// axis was toggled; column, line and pie charts return false.
pub fn reverse_bar_orientation(tree: &mut Tree) -> bool {
    if tree.state.orientation_reversed {
        return false;
    }
    let Some(plot_area) = tree
        .root_mut()
        .path_mut(&[(ns::C, "chart"), (ns::C, "plotArea")])
    else {
        return false;
    };

    let axis_ids: Vec<String> = plot_area
        .elements()
        .filter(|e| e.namespace() == Some(ns::C) && BAR_PLOTS.contains(&e.local_name()))
        .filter(|plot| bar_direction(plot) == BarDirection::Bar)
        .flat_map(|plot| plot.children_named(ns::C, "axId"))
        .filter_map(|a| a.attr("val").map(str::to_string))
        .collect();
    if axis_ids.is_empty() {
        return false;
    }

    let mut toggled = false;
    for axis in plot_area.children_named_mut(ns::C, "valAx") {
        let referenced = axis_id(axis).is_some_and(|id| axis_ids.iter().any(|a| a == id));
        if !referenced {
            continue;
        }
        let orientation = axis
            .ensure_child("scaling", VAL_AX)
            .ensure_child("orientation", SCALING);
        let current = orientation
            .attr("val")
            .and_then(AxisOrientation::from_xml)
            .unwrap_or_default();
        orientation.set_attr("val", current.reversed().xml_value());
        toggled = true;
    }

    if toggled {
        tree.state.orientation_reversed = true;
    }
    toggled
}

/// `c:barDir` of a bar plot; `col` when unspecified.
fn bar_direction(plot: &Element) -> BarDirection {
    plot.child(ns::C, "barDir")
        .and_then(|d| d.attr("val"))
        .and_then(BarDirection::from_xml)
        .unwrap_or(BarDirection::Column)
}

fn single_paragraph(text: String) -> Vec<ParagraphSnapshot> {
    vec![ParagraphSnapshot {
        index: 0,
        text,
        level: 0,
        bold: false,
        alignment: None,
        replacement: None,
    }]
}

/// First cached string of a `c:tx`: `c:strRef/c:strCache/c:pt/c:v`, or an
/// inline `c:v`.
fn cached_value(tx: &Element) -> Option<&Element> {
    tx.path(&[(ns::C, "strRef"), (ns::C, "strCache")])
        .and_then(|cache| cache.child(ns::C, "pt"))
        .and_then(|pt| pt.child(ns::C, "v"))
        .or_else(|| tx.child(ns::C, "v"))
}

fn cached_value_mut(tx: &mut Element) -> Option<&mut Element> {
    if tx.path(&[(ns::C, "strRef"), (ns::C, "strCache"), (ns::C, "pt"), (ns::C, "v")]).is_some() {
        return tx.path_mut(&[(ns::C, "strRef"), (ns::C, "strCache"), (ns::C, "pt"), (ns::C, "v")]);
    }
    tx.child_mut(ns::C, "v")
}

fn title_paragraphs(title: &Element) -> Option<Vec<ParagraphSnapshot>> {
    let tx = title.child(ns::C, "tx")?;
    match tx.child(ns::C, "rich") {
        Some(rich) => Some(snapshot_body(rich)),
        None => cached_value(tx).map(|v| single_paragraph(v.text())),
    }
}

fn series(plot_area: &Element) -> impl Iterator<Item = &Element> {
    plot_area
        .elements()
        .flat_map(|plot| plot.children_named(ns::C, "ser"))
}

fn series_mut(plot_area: &mut Element) -> impl Iterator<Item = &mut Element> {
    plot_area
        .elements_mut()
        .flat_map(|plot| plot.children_named_mut(ns::C, "ser"))
}

fn series_index(ser: &Element) -> Option<&str> {
    ser.child(ns::C, "idx").and_then(|i| i.attr("val"))
}

/// Extract the text slots of a chart.
///
/// Records come in the order title, axis titles, series names, categories.
pub fn extract_chart_text(tree: &Tree) -> Vec<ExtractionRecord> {
    let mut records = Vec::new();
    let Some(chart) = tree.root().child(ns::C, "chart") else {
        return records;
    };

    if let Some(paragraphs) = chart.child(ns::C, "title").and_then(title_paragraphs) {
        records.push(ExtractionRecord::new("title", Role::ChartTitle, paragraphs));
    }

    if let Some(plot_area) = chart.child(ns::C, "plotArea") {
        for axis in plot_area.elements().filter(|e| is_axis(e)) {
            let title = axis.child(ns::C, "title").and_then(title_paragraphs);
            if let (Some(id), Some(paragraphs)) = (axis_id(axis), title) {
                records.push(ExtractionRecord::new(
                    format!("axis{}", id),
                    Role::ChartLabel,
                    paragraphs,
                ));
            }
        }

        for ser in series(plot_area) {
            let name = ser.child(ns::C, "tx").and_then(cached_value);
            if let (Some(idx), Some(v)) = (series_index(ser), name) {
                records.push(ExtractionRecord::new(
                    format!("ser{}", idx),
                    Role::ChartSeries,
                    single_paragraph(v.text()),
                ));
            }
        }

        let mut categories: BTreeMap<u32, String> = BTreeMap::new();
        for ser in series(plot_area) {
            let Some(cache) = ser.path(&[(ns::C, "cat"), (ns::C, "strRef"), (ns::C, "strCache")])
            else {
                continue;
            };
            for pt in cache.children_named(ns::C, "pt") {
                let idx = pt
                    .attr("idx")
                    .and_then(|i| atoi_simd::parse::<u32, false, false>(i.as_bytes()).ok());
                if let (Some(idx), Some(v)) = (idx, pt.child(ns::C, "v")) {
                    categories.entry(idx).or_insert_with(|| v.text());
                }
            }
        }
        for (idx, text) in categories {
            records.push(ExtractionRecord::new(
                format!("cat{}", idx),
                Role::ChartLabel,
                single_paragraph(text),
            ));
        }
    }

    records.retain(ExtractionRecord::has_text);
    records
}

/// Write translated chart records back.
///
/// Failures are isolated per record, as for slide text.
pub fn inject_chart_text(
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
        match inject_record(tree.root_mut(), record, config, mirrored) {
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

fn inject_record(
    root: &mut Element,
    record: &ExtractionRecord,
    config: &EngineConfig,
    mirrored: bool,
) -> Result<(), InjectionError> {
    let unmatched = || InjectionError::UnmatchedRecord {
        id: record.id.clone(),
    };
    let chart = root.child_mut(ns::C, "chart").ok_or_else(unmatched)?;
    let id = record.id.as_str();

    if id == "title" {
        let title = chart.child_mut(ns::C, "title").ok_or_else(unmatched)?;
        return inject_title(title, record, config, mirrored).ok_or_else(unmatched)?;
    }

    let plot_area = chart.child_mut(ns::C, "plotArea").ok_or_else(unmatched)?;
    let replacement = record
        .paragraphs
        .iter()
        .find_map(|p| p.replacement.as_deref())
        .ok_or_else(unmatched)?;

    if let Some(axis) = id.strip_prefix("axis") {
        let title = plot_area
            .elements_mut()
            .find(|e| is_axis(e) && axis_id(e) == Some(axis))
            .and_then(|e| e.child_mut(ns::C, "title"))
            .ok_or_else(unmatched)?;
        return inject_title(title, record, config, mirrored).ok_or_else(unmatched)?;
    }

    if let Some(idx) = id.strip_prefix("ser") {
        let v = series_mut(plot_area)
            .find(|ser| series_index(ser) == Some(idx))
            .and_then(|ser| ser.child_mut(ns::C, "tx"))
            .and_then(cached_value_mut)
            .ok_or_else(unmatched)?;
        v.set_text(replacement);
        return Ok(());
    }

    if let Some(idx) = id.strip_prefix("cat") {
        let mut written = 0;
        for ser in series_mut(plot_area) {
            let Some(cache) =
                ser.path_mut(&[(ns::C, "cat"), (ns::C, "strRef"), (ns::C, "strCache")])
            else {
                continue;
            };
            for pt in cache.children_named_mut(ns::C, "pt") {
                if pt.attr("idx") != Some(idx) {
                    continue;
                }
                if let Some(v) = pt.child_mut(ns::C, "v") {
                    v.set_text(replacement);
                    written += 1;
                }
            }
        }
        return if written > 0 { Ok(()) } else { Err(unmatched()) };
    }

    Err(unmatched())
}

/// Write a record into a `c:title`, rich or cached. `None` when the title
/// has no text slot.
fn inject_title(
    title: &mut Element,
    record: &ExtractionRecord,
    config: &EngineConfig,
    mirrored: bool,
) -> Option<Result<(), InjectionError>> {
    let tx = title.child_mut(ns::C, "tx")?;
    if tx.child(ns::C, "rich").is_some() {
        let rich = tx.child_mut(ns::C, "rich")?;
        return Some(inject_body(rich, record, config, mirrored));
    }
    let replacement = record
        .paragraphs
        .iter()
        .find_map(|p| p.replacement.as_deref())?;
    cached_value_mut(tx)?.set_text(replacement);
    Some(Ok(()))
}
