//! Pixel-space geometry shared by the demo apps.
//!
//! Angles follow one convention everywhere: the directed sweep from ray BA
//! to ray BC, `atan2(BC) - atan2(BA)`, wrapped into `[0, 360)`. With image
//! coordinates (y grows downward) a positive sweep is clockwise on screen.

use crate::landmarks::domain::landmark::PixelPoint;

/// Directed angle at vertex `b` from `a` to `c`, in degrees within `[0, 360)`.
///
/// Swapping `a` and `c` gives `(360 - θ) % 360`. Use [`interior_angle`]
/// for an order-independent magnitude.
pub fn angle_at_vertex(a: &PixelPoint, b: &PixelPoint, c: &PixelPoint) -> f64 {
    let to_c = ((c.y - b.y) as f64).atan2((c.x - b.x) as f64);
    let to_a = ((a.y - b.y) as f64).atan2((a.x - b.x) as f64);
    let degrees = (to_c - to_a).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Smaller of the two angles between rays BA and BC, in `[0, 180]`.
pub fn interior_angle(a: &PixelPoint, b: &PixelPoint, c: &PixelPoint) -> f64 {
    let directed = angle_at_vertex(a, b, c);
    directed.min(360.0 - directed)
}

pub fn distance(a: &PixelPoint, b: &PixelPoint) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx.hypot(dy)
}

pub fn midpoint(a: &PixelPoint, b: &PixelPoint) -> (i32, i32) {
    ((a.x + b.x) / 2, (a.y + b.y) / 2)
}

/// Linearly maps `value` from `from` onto `to`.
///
/// With `clamp`, inputs beyond `from` saturate at the nearest endpoint of
/// `to` instead of extrapolating. Both ranges may be descending. A
/// zero-width `from` maps everything to `to.0`.
pub fn interpolate(value: f64, from: (f64, f64), to: (f64, f64), clamp: bool) -> f64 {
    let (from_lo, from_hi) = from;
    let (to_lo, to_hi) = to;
    let span = from_hi - from_lo;
    if span == 0.0 {
        return to_lo;
    }

    let t = (value - from_lo) / span;
    let t = if clamp { t.clamp(0.0, 1.0) } else { t };
    let mapped = to_lo + t * (to_hi - to_lo);

    if clamp {
        mapped.clamp(to_lo.min(to_hi), to_lo.max(to_hi))
    } else {
        mapped
    }
}
