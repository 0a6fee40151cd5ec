/// Table column reversal.
///
/// Every row of an `a:tbl` holds one `a:tc` per grid column, including the
/// `hMerge` placeholders that follow a `gridSpan` anchor. Columns are
/// reversed in span groups (the anchor and its followers move together,
/// anchor first) so merged cells stay well formed.
use crate::common::xml::unescape_xml;
use crate::ooxml::pptx::text::mirror_text_body;
use crate::ooxml::xml::ns;
use crate::ooxml::xml::{Element, Node};

/// Reverse the columns of a table and mirror its cell text.
///
/// The grid, every row, cell margins and borders, and the first/last column
/// style flags are swapped. `a:tblPr/@rtl` is not set: the renderer would
/// reverse the columns a second time.
pub fn reverse_columns(table: &mut Element) {
    if let Some(props) = table.child_mut(ns::A, "tblPr") {
        swap_attrs(props, "firstCol", "lastCol");
    }
    if let Some(grid) = table.child_mut(ns::A, "tblGrid") {
        reverse_matching(grid.children_mut(), |e| e.is(ns::A, "gridCol"));
    }

    for row in table.children_named_mut(ns::A, "tr") {
        reverse_row(row);
        for cell in row.children_named_mut(ns::A, "tc") {
            mirror_cell(cell);
        }
    }
}

/// Reverse the span groups of a row, leaving non-cell children in place.
fn reverse_row(row: &mut Element) {
    let slots: Vec<usize> = row
        .children()
        .iter()
        .enumerate()
        .filter(|(_, n)| n.as_element().is_some_and(is_cell))
        .map(|(i, _)| i)
        .collect();
    if slots.len() < 2 {
        return;
    }

    let children = row.children_mut();
    let mut groups: Vec<Vec<Node>> = Vec::new();
    for &slot in &slots {
        let node = std::mem::replace(&mut children[slot], Node::Text(String::new()));
        let follower = node.as_element().is_some_and(is_merge_follower);
        match groups.last_mut() {
            Some(group) if follower => group.push(node),
            _ => groups.push(vec![node]),
        }
    }

    for (slot, node) in slots.into_iter().zip(groups.into_iter().rev().flatten()) {
        children[slot] = node;
    }
}

fn mirror_cell(cell: &mut Element) {
    if let Some(body) = cell.child_mut(ns::A, "txBody") {
        mirror_text_body(body);
    }
    if let Some(props) = cell.child_mut(ns::A, "tcPr") {
        swap_attrs(props, "marL", "marR");
        swap_borders(props);
    }
}

/// Exchange `a:lnL` and `a:lnR`, keeping `lnL` first.
fn swap_borders(props: &mut Element) {
    let mut left = None;
    let mut right = None;
    for (i, node) in props.children_mut().iter_mut().enumerate() {
        let Some(e) = node.as_element_mut() else {
            continue;
        };
        if e.is(ns::A, "lnL") {
            e.set_local_name("lnR");
            left = Some(i);
        } else if e.is(ns::A, "lnR") {
            e.set_local_name("lnL");
            right = Some(i);
        }
    }
    if let (Some(l), Some(r)) = (left, right) {
        props.children_mut().swap(l, r);
    }
}

fn swap_attrs(e: &mut Element, a: &str, b: &str) {
    let va = e.remove_attr(a);
    let vb = e.remove_attr(b);
    if let Some(v) = vb {
        e.set_attr(a, &unescape_xml(&v));
    }
    if let Some(v) = va {
        e.set_attr(b, &unescape_xml(&v));
    }
}

fn reverse_matching(children: &mut [Node], pred: impl Fn(&Element) -> bool) {
    let slots: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, n)| n.as_element().is_some_and(&pred))
        .map(|(i, _)| i)
        .collect();
    let (mut lo, mut hi) = (0, slots.len());
    while lo + 1 < hi {
        hi -= 1;
        children.swap(slots[lo], slots[hi]);
        lo += 1;
    }
}

#[inline]
fn is_cell(e: &Element) -> bool {
    e.is(ns::A, "tc")
}

#[inline]
fn is_merge_follower(e: &Element) -> bool {
    e.attr_bool("hMerge") == Some(true)
}

/// Logical grid column of each cell in a row, in the unmirrored table.
///
/// Cells are listed in their current order. For a mirrored row, a cell at
/// position `c` inside a span group starting at `a'` of size `s` came from
/// column `n - a' - s + (c - a')`.
pub fn logical_columns(row: &Element, mirrored: bool) -> Vec<usize> {
    let cells: Vec<&Element> = row.children_named(ns::A, "tc").collect();
    let n = cells.len();
    if !mirrored {
        return (0..n).collect();
    }

    let mut columns = Vec::with_capacity(n);
    let mut start = 0;
    while start < n {
        let mut size = 1;
        while start + size < n && is_merge_follower(cells[start + size]) {
            size += 1;
        }
        for k in 0..size {
            columns.push(n - start - size + k);
        }
        start += size;
    }
    columns
}

/// The cell at a logical (row, column) position.
pub fn cell_mut(
    table: &mut Element,
    row: usize,
    column: usize,
    mirrored: bool,
) -> Option<&mut Element> {
    let tr = table.children_named_mut(ns::A, "tr").nth(row)?;
    let position = logical_columns(tr, mirrored)
        .into_iter()
        .position(|c| c == column)?;
    tr.children_named_mut(ns::A, "tc").nth(position)
}
