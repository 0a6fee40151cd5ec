//! Horizontal mirroring of shape trees.
//!
//! [`mirror_part`] walks the shape tree of a slide, layout or master and
//! moves every placement to its mirror image inside the enclosing frame.
//! Groups are mirrored in the parent frame and their children in the
//! group's own child frame. Text bodies get right-to-left direction, tables
//! are reversed, connectors and directional presets are flipped.
//!
//! Element-level failures (overflowing coordinates) are collected in the
//! [`GeometryReport`] and leave that element unchanged.

use phf::phf_set;

use crate::config::{GeometryConfig, PictureBackgroundPolicy};
use crate::ooxml::error::ElementError;
use crate::ooxml::pptx::frame::{Frame, Placement, mirror_xfrm, toggle_flip_h};
use crate::ooxml::pptx::shape::{self, GraphicKind, ShapeKind, format_path};
use crate::ooxml::pptx::table;
use crate::ooxml::pptx::text::{self, mirror_list_style, mirror_text_body};
use crate::ooxml::xml::ns;
use crate::ooxml::xml::{Element, Tree};

/// Preset geometries whose shape points one way.
static DIRECTIONAL_PRESETS: phf::Set<&'static str> = phf_set! {
    "rightArrow",
    "leftArrow",
    "leftRightArrow",
    "stripedRightArrow",
    "notchedRightArrow",
    "rightArrowCallout",
    "leftArrowCallout",
    "bentArrow",
    "bentUpArrow",
    "uturnArrow",
    "curvedRightArrow",
    "curvedLeftArrow",
    "circularArrow",
    "leftCircularArrow",
    "chevron",
    "homePlate",
    "flowChartOffpageConnector",
    "flowChartPunchedCard",
    "flowChartManualInput",
    "rtTriangle",
    "wedgeRectCallout",
    "wedgeRoundRectCallout",
    "wedgeEllipseCallout",
    "cloudCallout",
    "borderCallout1",
    "borderCallout2",
    "borderCallout3",
    "snip1Rect",
    "round1Rect",
    "pie",
    "moon",
};

/// Words in a shape's name or description that mark it as a logo or
/// watermark.
static LOGO_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "logo",
    "watermark",
    "brand",
    "trademark",
    "icon",
    "emblem",
    "badge",
    "seal",
    "copyright",
};

/// A shape that could not be mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryFault {
    /// Dotted shape path
    pub path: String,
    pub error: ElementError,
}

/// Outcome of mirroring one part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryReport {
    /// Shapes whose placement was mirrored
    pub mirrored: usize,
    /// Shapes whose `flipH` was toggled
    pub flipped: usize,
    /// Tables whose columns were reversed
    pub tables: usize,
    pub faults: Vec<GeometryFault>,
    /// The part had already been mirrored and was left alone
    pub skipped: bool,
}

/// Mirror a slide, layout or master part.
///
/// Master text styles are mirrored as the root of the paragraph
/// inheritance chain. The tree's transform state prevents a second pass.
pub fn mirror_part(tree: &mut Tree, slide: Frame, config: &GeometryConfig) -> GeometryReport {
    let mut report = GeometryReport::default();
    if tree.state.mirrored {
        log::debug!("part already mirrored, skipping");
        report.skipped = true;
        return report;
    }

    let root = tree.root_mut();
    if root.is(ns::P, "sldMaster") {
        if let Some(styles) = root.child_mut(ns::P, "txStyles") {
            for style in styles.elements_mut() {
                mirror_list_style(style, true);
            }
        }
    }
    if let Some(spt) = shape::shape_tree_mut(root) {
        let mut path = Vec::new();
        mirror(spt, &slide, config, &mut path, &mut report);
    }

    tree.state.mirrored = true;
    report
}

/// Mirror the presentation-wide default text style.
///
/// Returns false when the presentation part was already mirrored.
pub fn mirror_presentation(tree: &mut Tree) -> bool {
    if tree.state.mirrored {
        return false;
    }
    let root = tree.root_mut();
    if let Some(style) = root.child_mut(ns::P, "defaultTextStyle") {
        mirror_list_style(style, true);
    }
    root.set_attr("rtl", "1");
    tree.state.mirrored = true;
    true
}

/// Mirror the children of a shape container inside `frame`.
///
/// `container` is a shape tree, a group, or an alternate-content branch.
pub fn mirror(
    container: &mut Element,
    frame: &Frame,
    config: &GeometryConfig,
    path: &mut Vec<usize>,
    report: &mut GeometryReport,
) {
    for (ordinal, child) in container.elements_mut().enumerate() {
        path.push(ordinal);
        match ShapeKind::of(child) {
            ShapeKind::Group => mirror_group(child, frame, config, path, report),
            ShapeKind::AlternateContent => {
                for (branch_ordinal, branch) in shape::alternate_branches_mut(child).enumerate() {
                    path.push(branch_ordinal);
                    mirror(branch, frame, config, path, report);
                    path.pop();
                }
            },
            ShapeKind::Other => {},
            kind => mirror_shape(child, kind, frame, config, path, report),
        }
        path.pop();
    }
}

fn mirror_group(
    group: &mut Element,
    frame: &Frame,
    config: &GeometryConfig,
    path: &mut Vec<usize>,
    report: &mut GeometryReport,
) {
    let child_frame = shape::xfrm(group).and_then(Frame::of_group);
    if let Some(xfrm) = shape::xfrm_mut(group) {
        match mirror_xfrm(xfrm, frame, config.mirror_rotation) {
            Ok(()) => report.mirrored += 1,
            Err(error) => fault(report, path, error),
        }
    }
    match child_frame {
        Some(child_frame) => mirror(group, &child_frame, config, path, report),
        None => log::debug!("group {} has no transform, children left in place", format_path(path)),
    }
}

fn mirror_shape(
    shape: &mut Element,
    kind: ShapeKind,
    frame: &Frame,
    config: &GeometryConfig,
    path: &[usize],
    report: &mut GeometryReport,
) {
    let placement = shape::placement(shape);
    let background = placement.is_some_and(|p| is_background(&p, frame, config));
    let position_only =
        kind == ShapeKind::Picture || placement.is_some_and(|p| is_logo(shape, &p, frame));
    let has_text = shape::text_body(shape).is_some_and(text::has_text);

    let flip = match kind {
        ShapeKind::Connector => config.flip_connectors,
        ShapeKind::Picture => {
            background && config.picture_policy == PictureBackgroundPolicy::Flip
        },
        ShapeKind::Shape if !position_only && !has_text => {
            is_directional(shape) && (background || config.flip_directional_foreground)
        },
        _ => false,
    };
    let rotate = config.mirror_rotation && !position_only;

    if let Some(xfrm) = shape::xfrm_mut(shape) {
        match mirror_xfrm(xfrm, frame, rotate) {
            Ok(()) => {
                report.mirrored += 1;
                if flip {
                    toggle_flip_h(xfrm);
                    report.flipped += 1;
                }
            },
            Err(error) => fault(report, path, error),
        }
    }

    // content follows the part's transform state even when the placement faulted
    if let Some(body) = shape::text_body_mut(shape) {
        mirror_text_body(body);
    }
    if kind == ShapeKind::GraphicFrame && shape::graphic_kind(shape) == GraphicKind::Table {
        if let Some(tbl) = shape::table_mut(shape) {
            table::reverse_columns(tbl);
            report.tables += 1;
        }
    }
}

fn fault(report: &mut GeometryReport, path: &[usize], error: ElementError) {
    let path = format_path(path);
    log::warn!("shape {} not mirrored: {}", path, error);
    report.faults.push(GeometryFault { path, error });
}

/// Wider than the background ratio of the frame, or covering more than one
/// quadrant.
pub fn is_background(placement: &Placement, frame: &Frame, config: &GeometryConfig) -> bool {
    frame.width_fraction(placement) > config.background_ratio || frame.spans_quadrants(placement)
}

/// Whether a shape uses an asymmetric preset geometry.
pub fn is_directional(shape: &Element) -> bool {
    shape
        .path(&[(ns::P, "spPr"), (ns::A, "prstGeom")])
        .and_then(|g| g.attr("prst"))
        .is_some_and(|prst| DIRECTIONAL_PRESETS.contains(prst))
}

/// Logo-like shapes: named like one, or small, roughly square and tucked
/// into a corner of the frame.
pub fn is_logo(shape: &Element, placement: &Placement, frame: &Frame) -> bool {
    if has_logo_keyword(&shape::label(shape)) {
        return true;
    }
    if ShapeKind::of(shape) != ShapeKind::Picture {
        return false;
    }

    let small = frame.width_fraction(placement) <= 0.15 && frame.height_fraction(placement) <= 0.15;
    let squarish = placement.aspect().is_some_and(|a| (0.5..=2.0).contains(&a));
    let (left, right) = (frame.x + frame.cx / 4, frame.x + frame.cx * 3 / 4);
    let (top, bottom) = (frame.y + frame.cy / 4, frame.y + frame.cy * 3 / 4);
    let horizontal_edge = placement.x + placement.cx <= left || placement.x >= right;
    let vertical_edge = placement.y + placement.cy <= top || placement.y >= bottom;
    small && squarish && horizontal_edge && vertical_edge
}

fn has_logo_keyword(label: &str) -> bool {
    label
        .split(|c: char| !c.is_alphabetic())
        .any(|word| LOGO_KEYWORDS.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: i64 = 9_144_000;
    const H: i64 = 6_858_000;

    fn slide(shapes: &str) -> Tree {
        Tree::parse(
            format!(
                concat!(
                    "<p:sld xmlns:a=\"{}\" xmlns:p=\"{}\" xmlns:mc=\"{}\"><p:cSld><p:spTree>",
                    "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>",
                    "<p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"
                ),
                ns::A,
                ns::P,
                ns::MC,
                shapes
            )
            .as_bytes(),
        )
        .unwrap()
    }

    fn sp(name: &str, x: i64, y: i64, cx: i64, cy: i64, extra: &str, body: &str) -> String {
        format!(
            concat!(
                "<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"{}\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>",
                "<p:spPr><a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>{}</p:spPr>{}</p:sp>"
            ),
            name, x, y, cx, cy, extra, body
        )
    }

    fn shape_x(tree: &Tree, index: usize) -> i64 {
        let spt = shape::shape_tree(tree.root()).unwrap();
        let shape = spt.nth_element(index).unwrap();
        shape::placement(shape).unwrap().x
    }

    #[test]
    fn test_mirror_top_level_shapes() {
        let mut tree = slide(&sp("Box", 914_400, 100, 1_828_800, 100, "", ""));
        let report = mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());
        assert_eq!(report.mirrored, 1);
        assert!(report.faults.is_empty());
        assert_eq!(shape_x(&tree, 2), 6_400_800);
        assert!(tree.state.mirrored);
    }

    #[test]
    fn test_second_pass_is_skipped() {
        let mut tree = slide(&sp("Box", 0, 0, 100, 100, "", ""));
        mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());
        let report = mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());
        assert!(report.skipped);
        assert_eq!(shape_x(&tree, 2), W - 100);
    }

    #[test]
    fn test_group_children_use_child_frame() {
        let group = format!(
            concat!(
                "<p:grpSp><p:nvGrpSpPr><p:cNvPr id=\"3\" name=\"Group\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>",
                "<p:grpSpPr><a:xfrm><a:off x=\"1000000\" y=\"0\"/><a:ext cx=\"500000\" cy=\"500000\"/>",
                "<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"500000\" cy=\"500000\"/></a:xfrm></p:grpSpPr>",
                "{}</p:grpSp>"
            ),
            sp("Child", 100_000, 0, 50_000, 50_000, "", "")
        );
        let mut tree = slide(&group);
        mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());

        let spt = shape::shape_tree(tree.root()).unwrap();
        let grp = spt.nth_element(2).unwrap();
        assert_eq!(shape::placement(grp).unwrap().x, W - 1_000_000 - 500_000);
        let child = grp.nth_element(2).unwrap();
        assert_eq!(shape::placement(child).unwrap().x, 350_000);
        let xfrm = shape::xfrm(grp).unwrap();
        assert_eq!(xfrm.child(ns::A, "chOff").unwrap().attr_emu("x"), Some(0));
    }

    #[test]
    fn test_directional_background_flips_without_text() {
        let arrow = "<a:prstGeom prst=\"rightArrow\"><a:avLst/></a:prstGeom>";
        let labelled = "<p:txBody><a:bodyPr/><a:p><a:r><a:t>Next</a:t></a:r></a:p></p:txBody>";
        let shapes = [
            sp("Wide arrow", 0, 0, W / 2, 100, arrow, ""),
            sp("Small arrow", 0, 0, 100, 100, arrow, ""),
            sp("Labelled", 0, 0, W / 2, 100, arrow, labelled),
        ]
        .concat();
        let mut tree = slide(&shapes);
        let report = mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());
        assert_eq!(report.flipped, 1);

        let spt = shape::shape_tree(tree.root()).unwrap();
        let flip = |i| shape::xfrm(spt.nth_element(i).unwrap()).unwrap().attr("flipH");
        assert_eq!(flip(2), Some("1"));
        assert_eq!(flip(3), None);
        assert_eq!(flip(4), None);

        let body_pr = spt
            .nth_element(4)
            .unwrap()
            .descendants()
            .find(|e| e.is(ns::A, "bodyPr"))
            .unwrap();
        assert_eq!(body_pr.attr("rtlCol"), Some("1"));
    }

    #[test]
    fn test_connector_and_picture_policy() {
        let shapes = concat!(
            "<p:cxnSp><p:nvCxnSpPr><p:cNvPr id=\"5\" name=\"Line\"/><p:cNvCxnSpPr/><p:nvPr/></p:nvCxnSpPr>",
            "<p:spPr><a:xfrm rot=\"5400000\"><a:off x=\"0\" y=\"0\"/><a:ext cx=\"100\" cy=\"100\"/></a:xfrm></p:spPr></p:cxnSp>",
            "<p:pic><p:nvPicPr><p:cNvPr id=\"6\" name=\"Photo\"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>",
            "<p:blipFill/><p:spPr><a:xfrm rot=\"600000\"><a:off x=\"0\" y=\"0\"/><a:ext cx=\"9144000\" cy=\"6858000\"/></a:xfrm></p:spPr></p:pic>"
        );
        let mut tree = slide(shapes);
        mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());
        let spt = shape::shape_tree(tree.root()).unwrap();
        let line = shape::xfrm(spt.nth_element(2).unwrap()).unwrap();
        assert_eq!(line.attr("flipH"), Some("1"));
        assert_eq!(line.attr("rot"), Some("16200000"));
        let pic = shape::xfrm(spt.nth_element(3).unwrap()).unwrap();
        assert_eq!(pic.attr("flipH"), None);
        assert_eq!(pic.attr("rot"), Some("600000"));

        let config = GeometryConfig {
            picture_policy: PictureBackgroundPolicy::Flip,
            ..GeometryConfig::default()
        };
        let mut tree = slide(shapes);
        mirror_part(&mut tree, Frame::slide(W, H), &config);
        let spt = shape::shape_tree(tree.root()).unwrap();
        let pic = shape::xfrm(spt.nth_element(3).unwrap()).unwrap();
        assert_eq!(pic.attr("flipH"), Some("1"));
    }

    #[test]
    fn test_alternate_content_branches_are_mirrored() {
        let shapes = format!(
            "<mc:AlternateContent><mc:Choice Requires=\"x\">{}</mc:Choice><mc:Fallback>{}</mc:Fallback></mc:AlternateContent>",
            sp("A", 0, 0, 100, 100, "", ""),
            sp("B", 0, 0, 200, 100, "", "")
        );
        let mut tree = slide(&shapes);
        let report = mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());
        assert_eq!(report.mirrored, 2);
        let xs: Vec<_> = tree
            .find_all(|e| e.is(ns::P, "sp"))
            .map(|s| shape::placement(s).unwrap().x)
            .collect();
        assert_eq!(xs, [W - 100, W - 200]);
    }

    #[test]
    fn test_overflow_is_isolated() {
        let shapes = [
            sp("Broken", -27_273_042_316_900, 0, 1, 1, "", ""),
            sp("Fine", 0, 0, 100, 100, "", ""),
        ]
        .concat();
        let mut tree = slide(&shapes);
        let report = mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());
        assert_eq!(report.faults.len(), 1);
        assert_eq!(report.faults[0].path, "2");
        assert_eq!(shape_x(&tree, 2), -27_273_042_316_900);
        assert_eq!(shape_x(&tree, 3), W - 100);
    }

    fn grp(x: i64, cx: i64, ch_x: i64, ch_cx: i64, children: &str) -> String {
        format!(
            concat!(
                "<p:grpSp><p:nvGrpSpPr><p:cNvPr id=\"3\" name=\"Group\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>",
                "<p:grpSpPr><a:xfrm><a:off x=\"{}\" y=\"0\"/><a:ext cx=\"{}\" cy=\"500000\"/>",
                "<a:chOff x=\"{}\" y=\"0\"/><a:chExt cx=\"{}\" cy=\"500000\"/></a:xfrm></p:grpSpPr>",
                "{}</p:grpSp>"
            ),
            x, cx, ch_x, ch_cx, children
        )
    }

    #[test]
    fn test_nested_groups_use_their_own_child_frames() {
        let inner = grp(200_000, 400_000, 50_000, 400_000, &sp("Leaf", 100_000, 0, 50_000, 50_000, "", ""));
        let outer = grp(1_000_000, 1_000_000, 0, 1_000_000, &inner);
        let mut tree = slide(&outer);
        let report = mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());
        assert_eq!(report.mirrored, 3);

        let spt = shape::shape_tree(tree.root()).unwrap();
        let outer = spt.nth_element(2).unwrap();
        assert_eq!(shape::placement(outer).unwrap().x, W - 2_000_000);
        let inner = outer.nth_element(2).unwrap();
        assert_eq!(shape::placement(inner).unwrap().x, 400_000);
        let leaf = inner.nth_element(2).unwrap();
        assert_eq!(shape::placement(leaf).unwrap().x, 350_000);
    }

    #[test]
    fn test_faulted_table_still_reverses_columns() {
        let frame = concat!(
            "<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id=\"4\" name=\"Table\"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>",
            "<p:xfrm><a:off x=\"-27273042316900\" y=\"0\"/><a:ext cx=\"1\" cy=\"1\"/></p:xfrm>",
            "<a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/table\"><a:tbl>",
            "<a:tblGrid><a:gridCol w=\"100\"/><a:gridCol w=\"100\"/></a:tblGrid><a:tr h=\"100\">",
            "<a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>A</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>",
            "<a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>B</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>",
            "</a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"
        );
        let mut tree = slide(frame);
        let report = mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());
        assert_eq!(report.faults.len(), 1);
        assert_eq!(report.tables, 1);
        assert!(tree.state.mirrored);

        let spt = shape::shape_tree(tree.root()).unwrap();
        let tbl = shape::table(spt.nth_element(2).unwrap()).unwrap();
        let cells: Vec<String> = tbl
            .descendants()
            .filter(|e| e.is(ns::A, "p"))
            .map(text::paragraph_text)
            .collect();
        assert_eq!(cells, ["B", "A"]);
    }

    #[test]
    fn test_logo_keywords_match_whole_words() {
        assert!(has_logo_keyword("company logo"));
        assert!(has_logo_keyword("logo1 footer"));
        assert!(has_logo_keyword("app-icon"));
        assert!(!has_logo_keyword("silicon chip"));
        assert!(!has_logo_keyword("branding strategy"));
        assert!(!has_logo_keyword("sealed envelope"));

        let frame = Frame::slide(W, H);
        let tree = slide(&[
            sp("Silicon chip", 100, 100, 500_000, 400_000, "", ""),
            sp("Company Logo", 100, 100, 5_000_000, 4_000_000, "", ""),
        ]
        .concat());
        let spt = shape::shape_tree(tree.root()).unwrap();
        let chip = spt.nth_element(2).unwrap();
        let logo = spt.nth_element(3).unwrap();
        assert!(!is_logo(chip, &shape::placement(chip).unwrap(), &frame));
        assert!(is_logo(logo, &shape::placement(logo).unwrap(), &frame));
    }

    #[test]
    fn test_master_text_styles_and_logo() {
        let mut tree = Tree::parse(
            format!(
                concat!(
                    "<p:sldMaster xmlns:a=\"{}\" xmlns:p=\"{}\"><p:cSld><p:spTree><p:nvGrpSpPr/><p:grpSpPr/>",
                    "<p:pic><p:nvPicPr><p:cNvPr id=\"7\" name=\"Picture 3\"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill/>",
                    "<p:spPr><a:xfrm><a:off x=\"100\" y=\"100\"/><a:ext cx=\"500000\" cy=\"400000\"/></a:xfrm></p:spPr></p:pic>",
                    "</p:spTree></p:cSld><p:txStyles><p:titleStyle><a:lvl1pPr/></p:titleStyle>",
                    "<p:bodyStyle><a:lvl1pPr algn=\"ctr\"/></p:bodyStyle></p:txStyles></p:sldMaster>"
                ),
                ns::A,
                ns::P
            )
            .as_bytes(),
        )
        .unwrap();
        let spt = shape::shape_tree(tree.root()).unwrap();
        let pic = spt.nth_element(2).unwrap();
        assert!(is_logo(pic, &shape::placement(pic).unwrap(), &Frame::slide(W, H)));

        mirror_part(&mut tree, Frame::slide(W, H), &GeometryConfig::default());
        let styles = tree.root().child(ns::P, "txStyles").unwrap();
        let title = styles.path(&[(ns::P, "titleStyle"), (ns::A, "lvl1pPr")]).unwrap();
        assert_eq!(title.attr("algn"), Some("r"));
        assert_eq!(title.attr("rtl"), Some("1"));
        let body = styles.path(&[(ns::P, "bodyStyle"), (ns::A, "lvl1pPr")]).unwrap();
        assert_eq!(body.attr("algn"), Some("ctr"));
    }

    #[test]
    fn test_mirror_presentation_once() {
        let mut tree = Tree::parse(
            format!(
                "<p:presentation xmlns:a=\"{}\" xmlns:p=\"{}\"><p:defaultTextStyle><a:defPPr/></p:defaultTextStyle></p:presentation>",
                ns::A,
                ns::P
            )
            .as_bytes(),
        )
        .unwrap();
        assert!(mirror_presentation(&mut tree));
        assert!(!mirror_presentation(&mut tree));
        assert_eq!(tree.root().attr("rtl"), Some("1"));
        let def = tree.root().descendants().find(|e| e.is(ns::A, "defPPr")).unwrap();
        assert_eq!(def.attr("algn"), Some("r"));
    }
}
