//! Redmean color distance and nearest-color lookup.
//!
//! The metric is the low-cost approximation described at
//! <https://www.compuphase.com/cmetric.htm>: a weighted Euclidean distance
//! whose red/blue weights shift with the mean red level of the two colors.

use rgb::RGB8;

/// A 3-channel color. Alpha is never part of a color value; it is forced
/// opaque whenever a color is written back into a pixel buffer.
pub type Color = RGB8;

/// Largest value `sqrt(d)` can reach, used to normalize into `[0, 1]`.
const NORMALIZER: f64 = 3.0 * 255.0;

/// Perceptual distance between two colors, normalized to `[0, 1]`.
#[inline]
pub fn distance(a: &Color, b: &Color) -> f64 {
    let mr = 0.5 * (a.r as f64 + b.r as f64);
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;
    let d = 2.0 * dr * dr + 4.0 * dg * dg + 3.0 * db * db + mr * (dr * dr - db * db) / 256.0;
    // d is never negative for 8-bit channels, the clamp only absorbs rounding.
    d.max(0.0).sqrt() / NORMALIZER
}

/// Index of the palette color closest to `color`.
///
/// Ties go to the earliest index. Returns `None` for an empty palette.
#[inline]
pub fn nearest_color_index(color: &Color, palette: &[Color]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in palette.iter().enumerate() {
        let d = distance(color, candidate);
        match best {
            Some((_, best_dist)) if d >= best_dist => {}
            _ => best = Some((idx, d)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Min/max/mean of pairwise distances between two lists of colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Compare two equally sized color lists element by element.
///
/// Extra entries in the longer list are ignored; two empty lists give all zeros.
pub fn distance_stats(a: &[Color], b: &[Color]) -> DistanceStats {
    let n = a.len().min(b.len());
    if n == 0 {
        return DistanceStats { min: 0.0, max: 0.0, mean: 0.0 };
    }

    let mut stats = DistanceStats { min: f64::INFINITY, max: 0.0, mean: 0.0 };
    for (x, y) in a.iter().zip(b.iter()) {
        let d = distance(x, y);
        stats.min = stats.min.min(d);
        stats.max = stats.max.max(d);
        stats.mean += d;
    }
    stats.mean /= n as f64;
    stats
}

/// Format a color as `#rrggbb`.
pub fn to_hex(color: &Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Parse `#rrggbb` or `rrggbb`.
pub fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::new(channel(0)?, channel(2)?, channel(4)?))
}
