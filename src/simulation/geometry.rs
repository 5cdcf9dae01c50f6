//! Geometric primitives for ray casting and collision detection.
//!
//! Points are `geo` coordinates and road borders are `geo` lines, so the
//! same types flow from the road through the sensor into the snapshots.

use geo::{Coord, Line};
use serde::{Deserialize, Serialize};

/// A plain 2D point.
pub type Vector2 = Coord<f32>;

/// A straight border segment.
pub type Segment = Line<f32>;

/// A car footprint: always exactly four corners.
pub type Polygon = [Vector2; 4];

/// The point where two segments cross.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    /// Crossing point.
    pub point: Vector2,
    /// Parametric position of the crossing along the first segment, in `[0, 1]`.
    pub offset: f32,
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Intersects segment `a`-`b` with segment `c`-`d`.
///
/// # Returns
///
/// The crossing point and its offset along `a`-`b`, or `None` if the
/// segments are parallel, collinear, degenerate, or miss each other.
/// Endpoints count as hits.
pub fn segment_intersection(a: Vector2, b: Vector2, c: Vector2, d: Vector2) -> Option<Intersection> {
    let t_top = (d.x - c.x) * (a.y - c.y) - (d.y - c.y) * (a.x - c.x);
    let u_top = (c.y - a.y) * (a.x - b.x) - (c.x - a.x) * (a.y - b.y);
    let bottom = (d.y - c.y) * (b.x - a.x) - (d.x - c.x) * (b.y - a.y);

    if bottom == 0.0 || !bottom.is_finite() {
        return None;
    }

    let t = t_top / bottom;
    let u = u_top / bottom;

    // NaN fails both range checks
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Intersection {
            point: Vector2 {
                x: lerp(a.x, b.x, t),
                y: lerp(a.y, b.y, t),
            },
            offset: t,
        })
    } else {
        None
    }
}

/// Intersects a segment given as a `geo` line.
#[inline]
pub fn line_intersection(ray: &Segment, other: &Segment) -> Option<Intersection> {
    segment_intersection(ray.start, ray.end, other.start, other.end)
}

/// Iterates the closed edges of a polygon (last vertex wraps to the first).
pub fn edges(polygon: &[Vector2]) -> impl Iterator<Item = (Vector2, Vector2)> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| (polygon[i], polygon[(i + 1) % n]))
}

/// Checks whether any edge of `p` crosses any edge of `q`.
///
/// Symmetric in its arguments. A two-point slice is treated as a segment
/// (its two "edges" coincide), which is how road borders are tested.
pub fn polygons_intersect(p: &[Vector2], q: &[Vector2]) -> bool {
    edges(p).any(|(a, b)| edges(q).any(|(c, d)| segment_intersection(a, b, c, d).is_some()))
}

/// Checks whether a polygon touches a border segment.
#[inline]
pub fn polygon_touches_segment(polygon: &[Vector2], segment: &Segment) -> bool {
    polygons_intersect(polygon, &[segment.start, segment.end])
}
