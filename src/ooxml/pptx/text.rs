//! DrawingML text bodies: direction flags, alignment and run rewriting.
//!
//! The same functions serve shape text (`p:txBody`), table cells
//! (`a:txBody`) and chart text (`c:rich`, `c:txPr`); all of them hold
//! `a:bodyPr`, an optional `a:lstStyle` and a sequence of `a:p`.

use crate::config::FallbackFonts;
use crate::ooxml::xml::ns;
use crate::ooxml::xml::{Element, Node};

/// Child order of a text body.
pub const TX_BODY: &[&str] = &["bodyPr", "lstStyle", "p"];
/// Child order of a paragraph.
pub const PARAGRAPH: &[&str] = &["pPr", "r", "br", "fld", "endParaRPr"];
/// Child order of a run.
pub const RUN: &[&str] = &["rPr", "t"];
/// Child order of `CT_TextCharacterProperties`.
pub const RUN_PROPERTIES: &[&str] = &[
    "ln",
    "noFill",
    "solidFill",
    "gradFill",
    "blipFill",
    "pattFill",
    "grpFill",
    "effectLst",
    "effectDag",
    "highlight",
    "uLnTx",
    "uLn",
    "uFillTx",
    "uFill",
    "latin",
    "ea",
    "cs",
    "sym",
    "hlinkClick",
    "hlinkMouseOver",
    "rtl",
    "extLst",
];

/// List-style levels that carry paragraph properties.
const LIST_LEVELS: &[&str] = &[
    "defPPr", "lvl1pPr", "lvl2pPr", "lvl3pPr", "lvl4pPr", "lvl5pPr", "lvl6pPr", "lvl7pPr",
    "lvl8pPr", "lvl9pPr",
];

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    JustifyLow,
    Distributed,
    ThaiDistributed,
}

impl Alignment {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "l" => Alignment::Left,
            "ctr" => Alignment::Center,
            "r" => Alignment::Right,
            "just" => Alignment::Justify,
            "justLow" => Alignment::JustifyLow,
            "dist" => Alignment::Distributed,
            "thaiDist" => Alignment::ThaiDistributed,
            _ => return None,
        })
    }

    pub const fn token(self) -> &'static str {
        match self {
            Alignment::Left => "l",
            Alignment::Center => "ctr",
            Alignment::Right => "r",
            Alignment::Justify => "just",
            Alignment::JustifyLow => "justLow",
            Alignment::Distributed => "dist",
            Alignment::ThaiDistributed => "thaiDist",
        }
    }

    /// Left and right swap; everything else is symmetric.
    #[inline]
    pub const fn mirrored(self) -> Self {
        match self {
            Alignment::Left => Alignment::Right,
            Alignment::Right => Alignment::Left,
            other => other,
        }
    }
}

/// Swap the alignment of a paragraph-properties element and set `rtl`.
///
/// With `fill_default`, a missing alignment is treated as the implicit
/// left alignment and written as right.
pub fn mirror_paragraph_properties(ppr: &mut Element, fill_default: bool) {
    match ppr.attr("algn").and_then(Alignment::from_token) {
        Some(align) => ppr.set_attr("algn", align.mirrored().token()),
        None if fill_default && ppr.attr("algn").is_none() => {
            ppr.set_attr("algn", Alignment::Right.token())
        },
        None => {},
    }
    ppr.set_attr("rtl", "1");
}

/// Mirror every level of a list style.
///
/// `chain_root` marks the end of an inheritance chain (master text styles,
/// the presentation default text style), where an absent alignment means
/// left.
pub fn mirror_list_style(list_style: &mut Element, chain_root: bool) {
    for level in list_style.elements_mut() {
        if level.namespace() == Some(ns::A) && LIST_LEVELS.contains(&level.local_name()) {
            mirror_paragraph_properties(level, chain_root);
        }
    }
}

/// Apply right-to-left direction to a text body.
///
/// Sets `a:bodyPr/@rtlCol`, mirrors any inline list style, and for each
/// paragraph swaps the alignment, sets `a:pPr/@rtl` and marks every run
/// with `a:rPr/a:rtl`.
pub fn mirror_text_body(body: &mut Element) {
    body.ensure_child_in(ns::A, "bodyPr", TX_BODY)
        .set_attr("rtlCol", "1");
    if let Some(list_style) = body.child_mut(ns::A, "lstStyle") {
        mirror_list_style(list_style, false);
    }
    for paragraph in body.children_named_mut(ns::A, "p") {
        mirror_paragraph(paragraph);
    }
}

fn mirror_paragraph(paragraph: &mut Element) {
    mirror_paragraph_properties(paragraph.ensure_child("pPr", PARAGRAPH), false);
    for run in paragraph.children_named_mut(ns::A, "r") {
        run.ensure_child("rPr", RUN)
            .ensure_child("rtl", RUN_PROPERTIES)
            .set_attr("val", "1");
    }
}

/// Whether any paragraph of a text body has visible text.
pub fn has_text(body: &Element) -> bool {
    body.children_named(ns::A, "p")
        .any(|p| !paragraph_text(p).trim().is_empty())
}

/// Whether any paragraph has run text that can be translated.
///
/// Field-only bodies (slide numbers, dates) are visible but not translatable.
pub fn has_translatable_text(body: &Element) -> bool {
    body.children_named(ns::A, "p")
        .any(|p| !run_text(p).trim().is_empty())
}

/// Text of a paragraph, fields included, with line breaks as `\n`.
pub fn paragraph_text(paragraph: &Element) -> String {
    collect_text(paragraph, true)
}

/// Text of a paragraph's runs and line breaks. Field values are computed
/// by the renderer and are left out.
pub fn run_text(paragraph: &Element) -> String {
    collect_text(paragraph, false)
}

fn collect_text(paragraph: &Element, fields: bool) -> String {
    let mut text = String::new();
    for child in paragraph.elements() {
        if child.namespace() != Some(ns::A) {
            continue;
        }
        match child.local_name() {
            "r" => push_t(child, &mut text),
            "fld" if fields => push_t(child, &mut text),
            "br" => text.push('\n'),
            _ => {},
        }
    }
    text
}

fn push_t(element: &Element, text: &mut String) {
    if let Some(t) = element.child(ns::A, "t") {
        text.push_str(&t.text());
    }
}

/// Set the language and fallback fonts of a run-properties element.
///
/// `a:cs` is added when the run has no complex-script font, and `a:latin`
/// as well when it had neither.
pub fn localize_run_properties(rpr: &mut Element, locale: &str, fonts: &FallbackFonts) {
    rpr.set_attr("lang", locale);
    let has_latin = rpr.child(ns::A, "latin").is_some();
    if rpr.child(ns::A, "cs").is_some() {
        return;
    }
    let cs = rpr.ensure_child("cs", RUN_PROPERTIES);
    cs.set_attr("typeface", &fonts.complex_script);
    cs.set_attr("pitchFamily", &fonts.pitch_family);
    cs.set_attr("charset", &fonts.charset);
    if !has_latin {
        rpr.ensure_child("latin", RUN_PROPERTIES)
            .set_attr("typeface", &fonts.latin);
    }
}

/// Replace the run text of a paragraph.
///
/// Runs and line breaks are removed and the new runs are inserted where the
/// first of them stood. Fields stay in place. Lines separated by `\n`
/// become runs joined by `a:br`. The properties of the first run, or else
/// of the first field, or else `a:endParaRPr`, are reused for the new runs.
/// With `rtl` every new run is marked right-to-left, as mirroring marks
/// existing runs.
pub fn replace_paragraph_text(
    paragraph: &mut Element,
    text: &str,
    locale: &str,
    fonts: &FallbackFonts,
    rtl: bool,
) {
    let template = run_properties_template(paragraph);
    let is_run_or_break =
        |e: &Element| e.namespace() == Some(ns::A) && matches!(e.local_name(), "r" | "br");

    let first = paragraph
        .children()
        .iter()
        .position(|n| n.as_element().is_some_and(is_run_or_break));
    paragraph.remove_elements(is_run_or_break);

    let mut at = match first {
        Some(index) => index,
        None => paragraph
            .children()
            .iter()
            .position(|n| {
                n.as_element()
                    .is_some_and(|e| e.is(ns::A, "fld") || e.is(ns::A, "endParaRPr"))
            })
            .unwrap_or(paragraph.children().len()),
    };

    let new_rpr = |run: bool| {
        let mut rpr = template
            .clone()
            .unwrap_or_else(|| paragraph.sibling("rPr"));
        localize_run_properties(&mut rpr, locale, fonts);
        if run && rtl {
            rpr.ensure_child("rtl", RUN_PROPERTIES).set_attr("val", "1");
        }
        rpr
    };

    let mut nodes = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            let mut br = paragraph.sibling("br");
            br.push(new_rpr(false));
            nodes.push(br);
        }
        let mut run = paragraph.sibling("r");
        run.push(new_rpr(true));
        let mut t = paragraph.sibling("t");
        t.set_text(line);
        run.push(t);
        nodes.push(run);
    }
    for node in nodes {
        paragraph.children_mut().insert(at, Node::Element(node));
        at += 1;
    }
}

fn run_properties_template(paragraph: &Element) -> Option<Element> {
    let from_text = paragraph
        .children_named(ns::A, "r")
        .chain(paragraph.children_named(ns::A, "fld"))
        .find_map(|e| e.child(ns::A, "rPr"))
        .cloned();
    from_text.or_else(|| {
        paragraph.child(ns::A, "endParaRPr").map(|end| {
            let mut rpr = end.clone();
            rpr.set_local_name("rPr");
            rpr
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xml::Tree;

    fn body(inner: &str) -> Tree {
        Tree::parse(
            format!(
                "<p:txBody xmlns:p=\"{}\" xmlns:a=\"{}\">{}</p:txBody>",
                ns::P,
                ns::A,
                inner
            )
            .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_alignment_swap_closure() {
        for align in [
            Alignment::Left,
            Alignment::Right,
            Alignment::Center,
            Alignment::Justify,
        ] {
            assert_eq!(align.mirrored().mirrored(), align);
            assert_eq!(Alignment::from_token(align.token()), Some(align));
        }
        assert_eq!(Alignment::Left.mirrored(), Alignment::Right);
        assert_eq!(Alignment::Center.mirrored(), Alignment::Center);
        assert_eq!(Alignment::Justify.mirrored(), Alignment::Justify);
    }

    #[test]
    fn test_mirror_text_body_sets_direction() {
        let mut tree = body(concat!(
            "<a:bodyPr wrap=\"square\"/><a:lstStyle><a:lvl1pPr algn=\"l\"/></a:lstStyle>",
            "<a:p><a:pPr algn=\"l\" lvl=\"1\"/><a:r><a:rPr lang=\"en-US\"/><a:t>One</a:t></a:r>",
            "<a:fld id=\"x\" type=\"slidenum\"><a:t>3</a:t></a:fld></a:p>",
            "<a:p><a:r><a:t>Two</a:t></a:r></a:p>"
        ));
        mirror_text_body(tree.root_mut());
        let xml = String::from_utf8(tree.serialize()).unwrap();
        assert!(xml.contains("<a:bodyPr wrap=\"square\" rtlCol=\"1\"/>"));
        assert!(xml.contains("<a:lvl1pPr algn=\"r\" rtl=\"1\"/>"));
        assert!(xml.contains("<a:pPr algn=\"r\" lvl=\"1\" rtl=\"1\"/>"));
        assert!(xml.contains("<a:rPr lang=\"en-US\"><a:rtl val=\"1\"/></a:rPr>"));
        // second paragraph gains pPr before its run; fields are untouched
        assert!(xml.contains("<a:p><a:pPr rtl=\"1\"/><a:r><a:rPr><a:rtl val=\"1\"/></a:rPr><a:t>Two</a:t>"));
        assert!(xml.contains("<a:fld id=\"x\" type=\"slidenum\"><a:t>3</a:t></a:fld>"));
    }

    #[test]
    fn test_mirror_twice_restores_alignment() {
        let mut tree = body("<a:bodyPr/><a:p><a:pPr algn=\"ctr\"/></a:p><a:p><a:pPr algn=\"r\"/></a:p>");
        mirror_text_body(tree.root_mut());
        let once = String::from_utf8(tree.serialize()).unwrap();
        mirror_text_body(tree.root_mut());
        let twice = String::from_utf8(tree.serialize()).unwrap();
        assert!(once.contains("algn=\"l\""));
        assert!(twice.contains("<a:pPr algn=\"ctr\" rtl=\"1\"/>"));
        assert!(twice.contains("<a:pPr algn=\"r\" rtl=\"1\"/>"));
    }

    #[test]
    fn test_chain_root_fills_default_alignment() {
        let mut tree = body("<a:lvl1pPr marL=\"0\"/><a:lvl2pPr algn=\"ctr\"/><a:extLst/>");
        mirror_list_style(tree.root_mut(), true);
        let root = tree.root();
        assert_eq!(root.child(ns::A, "lvl1pPr").unwrap().attr("algn"), Some("r"));
        assert_eq!(root.child(ns::A, "lvl2pPr").unwrap().attr("algn"), Some("ctr"));
        assert_eq!(root.child(ns::A, "extLst").unwrap().attr("rtl"), None);
    }

    #[test]
    fn test_localize_adds_fonts_in_schema_order() {
        let fonts = FallbackFonts::default();
        let mut rpr = Element::new("a", ns::A, "rPr");
        rpr.push(rpr.sibling("solidFill"));
        rpr.push(rpr.sibling("hlinkClick"));
        localize_run_properties(&mut rpr, "ar-SA", &fonts);
        let names: Vec<_> = rpr.elements().map(|e| e.local_name().to_string()).collect();
        assert_eq!(names, ["solidFill", "latin", "cs", "hlinkClick"]);
        assert_eq!(rpr.attr("lang"), Some("ar-SA"));
        let cs = rpr.child(ns::A, "cs").unwrap();
        assert_eq!(cs.attr("typeface"), Some("Simplified Arabic"));
        assert_eq!(cs.attr("charset"), Some("-78"));

        let mut latin_only = Element::new("a", ns::A, "rPr");
        latin_only.push(latin_only.sibling("latin").with_attr("typeface", "Calibri"));
        localize_run_properties(&mut latin_only, "ar-SA", &fonts);
        assert_eq!(latin_only.elements().count(), 2);
        assert_eq!(
            latin_only.child(ns::A, "latin").unwrap().attr("typeface"),
            Some("Calibri")
        );
    }

    #[test]
    fn test_replace_paragraph_text() {
        let mut tree = body(concat!(
            "<a:p><a:pPr algn=\"ctr\"/><a:r><a:rPr b=\"1\" sz=\"2400\"/><a:t>Hello</a:t></a:r>",
            "<a:br/><a:r><a:t>World</a:t></a:r><a:endParaRPr sz=\"2400\"/></a:p>"
        ));
        let fonts = FallbackFonts::default();
        let paragraph = tree.root_mut().child_mut(ns::A, "p").unwrap();
        assert_eq!(paragraph_text(paragraph), "Hello\nWorld");

        replace_paragraph_text(paragraph, "مرحبا\nبالعالم", "ar-SA", &fonts, false);
        assert_eq!(paragraph_text(paragraph), "مرحبا\nبالعالم");
        let names: Vec<_> = paragraph
            .elements()
            .map(|e| e.local_name().to_string())
            .collect();
        assert_eq!(names, ["pPr", "r", "br", "r", "endParaRPr"]);
        let rpr = paragraph.child(ns::A, "r").unwrap().child(ns::A, "rPr").unwrap();
        assert_eq!(rpr.attr("b"), Some("1"));
        assert_eq!(rpr.attr("lang"), Some("ar-SA"));
    }

    #[test]
    fn test_replace_text_of_empty_paragraph_uses_end_properties() {
        let mut tree = body("<a:p><a:endParaRPr lang=\"en-US\" sz=\"1800\"/></a:p>");
        let paragraph = tree.root_mut().child_mut(ns::A, "p").unwrap();
        replace_paragraph_text(paragraph, "نص", "ar-SA", &FallbackFonts::default(), true);
        let rpr = paragraph.child(ns::A, "r").unwrap().child(ns::A, "rPr").unwrap();
        assert_eq!(rpr.name(), "a:rPr");
        assert_eq!(rpr.attr("sz"), Some("1800"));
        assert_eq!(rpr.attr("lang"), Some("ar-SA"));
        assert_eq!(rpr.child(ns::A, "rtl").unwrap().attr("val"), Some("1"));
    }

    #[test]
    fn test_replace_text_keeps_fields() {
        let mut tree = body(concat!(
            "<a:p><a:r><a:rPr lang=\"en-US\" sz=\"1200\"/><a:t>Slide </a:t></a:r>",
            "<a:fld id=\"{B6F15528}\" type=\"slidenum\"><a:rPr lang=\"en-US\"/><a:t>3</a:t></a:fld>",
            "<a:endParaRPr lang=\"en-US\"/></a:p>"
        ));
        let paragraph = tree.root_mut().child_mut(ns::A, "p").unwrap();
        assert_eq!(paragraph_text(paragraph), "Slide 3");
        assert_eq!(run_text(paragraph), "Slide ");

        replace_paragraph_text(paragraph, "الشريحة ", "ar-SA", &FallbackFonts::default(), true);
        let names: Vec<_> = paragraph
            .elements()
            .map(|e| e.local_name().to_string())
            .collect();
        assert_eq!(names, ["r", "fld", "endParaRPr"]);
        let fld = paragraph.child(ns::A, "fld").unwrap();
        assert_eq!(fld.attr("type"), Some("slidenum"));
        assert_eq!(fld.child(ns::A, "t").unwrap().text(), "3");
        let rpr = paragraph.child(ns::A, "r").unwrap().child(ns::A, "rPr").unwrap();
        assert_eq!(rpr.attr("sz"), Some("1200"));
        assert!(rpr.child(ns::A, "rtl").is_some());
    }

    #[test]
    fn test_field_only_body_is_not_translatable() {
        let tree = body(concat!(
            "<a:bodyPr/><a:p><a:fld id=\"{1}\" type=\"datetime1\"><a:rPr lang=\"en-US\" sz=\"900\"/>",
            "<a:t>10/14/2026</a:t></a:fld></a:p>"
        ));
        assert!(has_text(tree.root()));
        assert!(!has_translatable_text(tree.root()));
    }

    #[test]
    fn test_replace_text_takes_field_properties() {
        let mut tree = body(concat!(
            "<a:p><a:fld id=\"{1}\" type=\"slidenum\"><a:rPr lang=\"en-US\" sz=\"900\"/><a:t>3</a:t></a:fld>",
            "<a:endParaRPr sz=\"1800\"/></a:p>"
        ));
        let paragraph = tree.root_mut().child_mut(ns::A, "p").unwrap();
        replace_paragraph_text(paragraph, "صفحة", "ar-SA", &FallbackFonts::default(), false);
        let names: Vec<_> = paragraph
            .elements()
            .map(|e| e.local_name().to_string())
            .collect();
        assert_eq!(names, ["r", "fld", "endParaRPr"]);
        let rpr = paragraph.child(ns::A, "r").unwrap().child(ns::A, "rPr").unwrap();
        assert_eq!(rpr.attr("sz"), Some("900"));
        assert!(rpr.child(ns::A, "rtl").is_none());
    }
}
