/// Shape-tree element kinds and accessors shared by the geometry and
/// content passes.
use smallvec::SmallVec;

use crate::ooxml::pptx::frame::Placement;
use crate::ooxml::xml::ns;
use crate::ooxml::xml::Element;

/// Shape type of a shape-tree child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// A shape that may carry text (p:sp)
    Shape,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table, chart or diagram (p:graphicFrame)
    GraphicFrame,
    /// A group shape with its own child coordinate frame (p:grpSp)
    Group,
    /// A connector shape (p:cxnSp)
    Connector,
    /// A markup-compatibility wrapper (mc:AlternateContent)
    AlternateContent,
    /// Anything else: non-visual properties, extension lists, unknown markup
    Other,
}

impl ShapeKind {
    pub fn of(element: &Element) -> Self {
        match (element.namespace(), element.local_name()) {
            (Some(ns::P), "sp") => ShapeKind::Shape,
            (Some(ns::P), "pic") => ShapeKind::Picture,
            (Some(ns::P), "graphicFrame") => ShapeKind::GraphicFrame,
            (Some(ns::P), "grpSp") => ShapeKind::Group,
            (Some(ns::P), "cxnSp") => ShapeKind::Connector,
            (Some(ns::MC), "AlternateContent") => ShapeKind::AlternateContent,
            _ => ShapeKind::Other,
        }
    }

    /// Name of the element holding `p:cNvPr`.
    fn non_visual(self) -> Option<&'static str> {
        match self {
            ShapeKind::Shape => Some("nvSpPr"),
            ShapeKind::Picture => Some("nvPicPr"),
            ShapeKind::GraphicFrame => Some("nvGraphicFramePr"),
            ShapeKind::Group => Some("nvGrpSpPr"),
            ShapeKind::Connector => Some("nvCxnSpPr"),
            _ => None,
        }
    }
}

/// What kind of object a graphic frame embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicKind {
    Table,
    Chart,
    Diagram,
    Other,
}

/// Positional id of a shape: ordinals among element children, from the
/// shape tree down.
pub type ShapePath = SmallVec<[usize; 4]>;

/// Format a shape path as "4.1".
pub fn format_path(path: &[usize]) -> String {
    let mut out = String::new();
    for (i, ordinal) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(itoa::Buffer::new().format(*ordinal));
    }
    out
}

/// Parse a shape path written by [`format_path`].
pub fn parse_path(text: &str) -> Option<ShapePath> {
    text.split('.')
        .map(|part| atoi_simd::parse::<u32, false, false>(part.as_bytes()).ok().map(|n| n as usize))
        .collect()
}

/// Locate the `p:cSld/p:spTree` of a slide, layout or master root.
pub fn shape_tree(root: &Element) -> Option<&Element> {
    root.path(&[(ns::P, "cSld"), (ns::P, "spTree")])
}

pub fn shape_tree_mut(root: &mut Element) -> Option<&mut Element> {
    root.path_mut(&[(ns::P, "cSld"), (ns::P, "spTree")])
}

/// The `p:cNvPr` of a shape.
pub fn c_nv_pr(shape: &Element) -> Option<&Element> {
    let nv = ShapeKind::of(shape).non_visual()?;
    shape.path(&[(ns::P, nv), (ns::P, "cNvPr")])
}

/// Name and description of a shape, lowercased, for keyword matching.
pub fn label(shape: &Element) -> String {
    let Some(c_nv_pr) = c_nv_pr(shape) else {
        return String::new();
    };
    let mut label = c_nv_pr.attr("name").unwrap_or_default().to_lowercase();
    if let Some(descr) = c_nv_pr.attr("descr") {
        label.push(' ');
        label.push_str(&descr.to_lowercase());
    }
    label
}

/// The `p:ph` element of a placeholder shape.
pub fn placeholder(shape: &Element) -> Option<&Element> {
    let nv = ShapeKind::of(shape).non_visual()?;
    shape.path(&[(ns::P, nv), (ns::P, "nvPr"), (ns::P, "ph")])
}

/// Placeholder type; `p:ph` without a type attribute is an object placeholder.
pub fn placeholder_type(shape: &Element) -> Option<&str> {
    placeholder(shape).map(|ph| ph.attr("type").unwrap_or("obj"))
}

/// The transform holding the shape's own placement.
pub fn xfrm(shape: &Element) -> Option<&Element> {
    match ShapeKind::of(shape) {
        ShapeKind::Shape | ShapeKind::Picture | ShapeKind::Connector => {
            shape.path(&[(ns::P, "spPr"), (ns::A, "xfrm")])
        },
        ShapeKind::Group => shape.path(&[(ns::P, "grpSpPr"), (ns::A, "xfrm")]),
        ShapeKind::GraphicFrame => shape.child(ns::P, "xfrm"),
        _ => None,
    }
}

pub fn xfrm_mut(shape: &mut Element) -> Option<&mut Element> {
    match ShapeKind::of(shape) {
        ShapeKind::Shape | ShapeKind::Picture | ShapeKind::Connector => {
            shape.path_mut(&[(ns::P, "spPr"), (ns::A, "xfrm")])
        },
        ShapeKind::Group => shape.path_mut(&[(ns::P, "grpSpPr"), (ns::A, "xfrm")]),
        ShapeKind::GraphicFrame => shape.child_mut(ns::P, "xfrm"),
        _ => None,
    }
}

/// Explicit placement of a shape, if it has one.
///
/// Placeholders commonly omit it and inherit from their layout.
#[inline]
pub fn placement(shape: &Element) -> Option<Placement> {
    xfrm(shape).and_then(Placement::read)
}

/// The shape's text body (`p:txBody`).
#[inline]
pub fn text_body(shape: &Element) -> Option<&Element> {
    shape.child(ns::P, "txBody")
}

#[inline]
pub fn text_body_mut(shape: &mut Element) -> Option<&mut Element> {
    shape.child_mut(ns::P, "txBody")
}

/// `a:graphic/a:graphicData` of a graphic frame.
pub fn graphic_data(frame: &Element) -> Option<&Element> {
    frame.path(&[(ns::A, "graphic"), (ns::A, "graphicData")])
}

pub fn graphic_data_mut(frame: &mut Element) -> Option<&mut Element> {
    frame.path_mut(&[(ns::A, "graphic"), (ns::A, "graphicData")])
}

/// Kind of object embedded in a graphic frame.
pub fn graphic_kind(frame: &Element) -> GraphicKind {
    match graphic_data(frame).and_then(|g| g.attr("uri")) {
        Some(ns::GRAPHIC_TABLE) => GraphicKind::Table,
        Some(ns::GRAPHIC_CHART) => GraphicKind::Chart,
        Some(ns::GRAPHIC_DIAGRAM) => GraphicKind::Diagram,
        _ => GraphicKind::Other,
    }
}

/// The `a:tbl` of a table graphic frame.
pub fn table_mut(frame: &mut Element) -> Option<&mut Element> {
    graphic_data_mut(frame)?.child_mut(ns::A, "tbl")
}

pub fn table(frame: &Element) -> Option<&Element> {
    graphic_data(frame)?.child(ns::A, "tbl")
}

/// The branches (`mc:Choice`, `mc:Fallback`) of an alternate-content block.
pub fn alternate_branches_mut(alt: &mut Element) -> impl Iterator<Item = &mut Element> {
    alt.elements_mut()
        .filter(|e| e.is(ns::MC, "Choice") || e.is(ns::MC, "Fallback"))
}
