//! Coordinate frames and the horizontal mirror transform.
//!
//! A shape's placement is expressed in the frame of its container: the slide
//! for top-level shapes, or a group's child frame (`a:chOff`/`a:chExt`) for
//! shapes inside a group. Mirroring is always done inside the enclosing frame:
//!
//! ```text
//! x' = off + (W - (x - off) - cx)
//! ```
//!
//! which reduces to `x' = W - x - cx` for a frame at offset 0. `y` and the
//! extents are unchanged. All arithmetic is checked integer math.

use crate::common::unit::{Emu, FULL_ROTATION};
use crate::ooxml::error::ElementError;
use crate::ooxml::xml::ns;
use crate::ooxml::xml::Element;

/// Position and size of a shape inside its parent frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: Emu,
    pub y: Emu,
    pub cx: Emu,
    pub cy: Emu,
}

impl Placement {
    /// Read `a:off` and `a:ext` from a transform element.
    pub fn read(xfrm: &Element) -> Option<Self> {
        let off = xfrm.child(ns::A, "off")?;
        let ext = xfrm.child(ns::A, "ext")?;
        Some(Self {
            x: off.attr_emu("x")?,
            y: off.attr_emu("y")?,
            cx: ext.attr_emu("cx")?,
            cy: ext.attr_emu("cy")?,
        })
    }

    /// Width over height, or `None` for a degenerate shape.
    #[inline]
    pub fn aspect(&self) -> Option<f64> {
        (self.cy > 0).then(|| self.cx as f64 / self.cy as f64)
    }
}

/// A coordinate frame: an offset and an extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: Emu,
    pub y: Emu,
    pub cx: Emu,
    pub cy: Emu,
}

impl Frame {
    #[inline]
    pub const fn new(x: Emu, y: Emu, cx: Emu, cy: Emu) -> Self {
        Self { x, y, cx, cy }
    }

    /// The slide frame.
    #[inline]
    pub const fn slide(width: Emu, height: Emu) -> Self {
        Self::new(0, 0, width, height)
    }

    /// The internal child frame of a group transform.
    ///
    /// Without `a:chOff`/`a:chExt` the group's own extent at offset 0 is used.
    pub fn of_group(xfrm: &Element) -> Option<Self> {
        let child = xfrm
            .child(ns::A, "chOff")
            .zip(xfrm.child(ns::A, "chExt"))
            .and_then(|(off, ext)| {
                Some(Self::new(
                    off.attr_emu("x")?,
                    off.attr_emu("y")?,
                    ext.attr_emu("cx")?,
                    ext.attr_emu("cy")?,
                ))
            });
        child.or_else(|| Placement::read(xfrm).map(|p| Self::new(0, 0, p.cx, p.cy)))
    }

    /// Mirror a horizontal position inside this frame.
    ///
    /// Returns `None` on arithmetic overflow.
    pub fn mirror_x(&self, x: Emu, cx: Emu) -> Option<Emu> {
        let local = x.checked_sub(self.x)?;
        let mirrored_local = self.cx.checked_sub(local)?.checked_sub(cx)?;
        self.x.checked_add(mirrored_local)
    }

    /// Whether a placement straddles the frame's vertical or horizontal
    /// center line, i.e. covers more than one quadrant.
    pub fn spans_quadrants(&self, p: &Placement) -> bool {
        let mid_x = self.x as i128 + self.cx as i128 / 2;
        let mid_y = self.y as i128 + self.cy as i128 / 2;
        let (x0, x1) = (p.x as i128, p.x as i128 + p.cx as i128);
        let (y0, y1) = (p.y as i128, p.y as i128 + p.cy as i128);
        (x0 < mid_x && mid_x < x1) || (y0 < mid_y && mid_y < y1)
    }

    /// Placement width as a fraction of the frame width.
    #[inline]
    pub fn width_fraction(&self, p: &Placement) -> f64 {
        if self.cx <= 0 {
            return 0.0;
        }
        p.cx as f64 / self.cx as f64
    }

    #[inline]
    pub fn height_fraction(&self, p: &Placement) -> f64 {
        if self.cy <= 0 {
            return 0.0;
        }
        p.cy as f64 / self.cy as f64
    }
}

/// Negate a rotation angle, keeping it in `[0, 21600000)`.
#[inline]
pub fn mirror_rotation(rot: i64) -> i64 {
    (FULL_ROTATION - rot.rem_euclid(FULL_ROTATION)).rem_euclid(FULL_ROTATION)
}

/// Mirror the placement held by a transform element inside `frame`.
///
/// Rotation is negated when `rotate` is set. Elements without a complete
/// `a:off`/`a:ext` pair are left alone.
pub fn mirror_xfrm(xfrm: &mut Element, frame: &Frame, rotate: bool) -> Result<(), ElementError> {
    let Some(placement) = Placement::read(xfrm) else {
        return Ok(());
    };
    let x = frame
        .mirror_x(placement.x, placement.cx)
        .ok_or_else(|| ElementError::Overflow {
            element: xfrm.name().to_string(),
        })?;

    if let Some(off) = xfrm.child_mut(ns::A, "off") {
        off.set_emu("x", x)?;
    }

    if rotate {
        if let Some(rot) = xfrm.attr_emu("rot").filter(|r| *r != 0) {
            let mirrored = mirror_rotation(rot);
            if mirrored == 0 {
                xfrm.remove_attr("rot");
            } else {
                xfrm.set_attr("rot", &crate::common::unit::format_emu(mirrored));
            }
        }
    }
    Ok(())
}

/// Toggle horizontal flipping on a transform element.
pub fn toggle_flip_h(xfrm: &mut Element) {
    if xfrm.attr_bool("flipH") == Some(true) {
        xfrm.remove_attr("flipH");
    } else {
        xfrm.set_attr("flipH", "1");
    }
}
