//! # Color Mapper
//!
//! Maps a chunk's density count, normalized by the running maximum, onto a
//! three-anchor heat gradient (LOW → MID → HIGH) and derives the overlay opacity.

/// A 24-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Builds a color from a `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Packs the color into a `0xRRGGBB` value.
    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Per-channel linear blend from `self` towards `other`.
    ///
    /// `t` is clamped to `[0, 1]` and every channel to `[0, 255]`. Channels truncate
    /// towards zero.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let channel = |a: u8, b: u8| -> u8 {
            let value = a as f32 + (b as f32 - a as f32) * t;
            (value as i32).clamp(0, 255) as u8
        };
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

/// Light yellow; the color of the sparsest chunks.
pub const COLOR_LOW: Rgb = Rgb::from_hex(0xFFFFE0);
/// Dark orange; the midpoint, also used when there is nothing to normalize against.
pub const COLOR_MID: Rgb = Rgb::from_hex(0xFF8C00);
/// Dark red; the color of the densest chunks.
pub const COLOR_HIGH: Rgb = Rgb::from_hex(0x8B0000);

/// Opacity floor so sparse chunks stay visible but dim.
pub const MIN_FILL_OPACITY: f32 = 0.2;
/// Added to the fill opacity to get the outline opacity.
pub const STROKE_OPACITY_BOOST: f32 = 0.15;

/// Maps `count` onto the heat gradient.
///
/// With `running_max <= 1` there is no meaningful gradient and [`COLOR_MID`] is
/// returned regardless of `count`.
pub fn heat_color(count: u32, running_max: u32) -> Rgb {
    if running_max <= 1 {
        return COLOR_MID;
    }

    let t = count as f32 / running_max as f32;

    if t < 0.5 {
        COLOR_LOW.lerp(COLOR_MID, t * 2.0)
    } else {
        COLOR_MID.lerp(COLOR_HIGH, (t - 0.5) * 2.0)
    }
}

/// Normalized density in `[0, 1]`.
pub fn density(count: u32, running_max: u32) -> f32 {
    (count as f32 / running_max.max(1) as f32).min(1.0)
}

/// Fill opacity for a chunk: `floor + density * (max_opacity - floor)`.
pub fn fill_opacity(count: u32, running_max: u32, max_opacity: f32) -> f32 {
    MIN_FILL_OPACITY + density(count, running_max) * (max_opacity - MIN_FILL_OPACITY)
}

/// Outline opacity derived from the fill opacity, capped at fully opaque.
pub fn stroke_opacity(fill_opacity: f32) -> f32 {
    (fill_opacity + STROKE_OPACITY_BOOST).min(1.0)
}
