//! Unit constants and conversions for DrawingML coordinates.
//!
//! All placement arithmetic is done on integer EMUs (English Metric Units).

/// A distance in English Metric Units.
pub type Emu = i64;

pub const EMUS_PER_INCH: Emu = 914_400;
pub const EMUS_PER_PT: Emu = 12_700;

/// Largest magnitude allowed for `ST_Coordinate` values.
pub const MAX_COORDINATE: Emu = 27_273_042_316_900;

/// Angles are stored in 60000ths of a degree.
pub const FULL_ROTATION: i64 = 21_600_000;

/// Default 16:9 slide width used when `p:sldSz` is absent.
pub const DEFAULT_SLIDE_WIDTH: Emu = 12_192_000;
pub const DEFAULT_SLIDE_HEIGHT: Emu = 6_858_000;

/// Parse an integer attribute value.
#[inline]
pub fn parse_emu(value: &str) -> Option<Emu> {
    atoi_simd::parse::<i64, false, false>(value.trim().as_bytes()).ok()
}

/// Format an integer for writing back into an attribute.
#[inline]
pub fn format_emu(value: Emu) -> String {
    let mut buffer = itoa::Buffer::new();
    buffer.format(value).to_owned()
}

#[inline]
pub fn emu_to_pt_f64(emu: Emu) -> f64 {
    emu as f64 / EMUS_PER_PT as f64
}

#[inline]
pub fn emu_to_inches_f64(emu: Emu) -> f64 {
    emu as f64 / EMUS_PER_INCH as f64
}

/// Whether an EMU coordinate lies in the `ST_Coordinate` range.
#[inline]
pub const fn is_coordinate(value: Emu) -> bool {
    value >= -MAX_COORDINATE && value <= MAX_COORDINATE
}
