//! Small segment helpers shared by the path search and the scene snapshot.

use glam::Vec3;

/// Closest point of segment `[p0, p1]` to `point`.
#[inline]
pub fn closest_point_on_segment(p0: Vec3, p1: Vec3, point: Vec3) -> Vec3 {
    let d = p1 - p0;
    let a = d.dot(d);
    if a <= 1e-12 {
        return p0;
    }
    let t = ((point - p0).dot(d) / a).clamp(0.0, 1.0);
    p0 + d * t
}

#[inline]
pub fn distance_to_segment(p0: Vec3, p1: Vec3, point: Vec3) -> f32 {
    closest_point_on_segment(p0, p1, point).distance(point)
}

#[inline]
pub fn segment_hits_sphere(p0: Vec3, p1: Vec3, center: Vec3, radius: f32) -> bool {
    distance_to_segment(p0, p1, center) <= radius
}

/// Offsets of `point` relative to a ray from `origin` along unit `dir`:
/// `(along, lateral)`, where `along` may be negative or exceed the segment.
#[inline]
pub fn ray_offsets(origin: Vec3, dir: Vec3, point: Vec3) -> (f32, f32) {
    let rel = point - origin;
    let along = rel.dot(dir);
    let lateral = (rel - dir * along).length();
    (along, lateral)
}

/// Unit direction on the ground plane (XZ) for heading `index` of `headings`
/// evenly spaced headings, starting at +X and turning toward +Z.
#[inline]
pub fn heading_direction(index: u16, headings: u16) -> Vec3 {
    let step = std::f32::consts::TAU / f32::from(headings.max(1));
    let angle = step * f32::from(index);
    Vec3::new(angle.cos(), 0.0, angle.sin())
}
