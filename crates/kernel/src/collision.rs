use glam::Vec3;
use labyrinth_common::Aabb;

/// Push-out overshoot so a resolved sphere does not re-penetrate next frame.
pub const COLLISION_SLOP: f32 = 1.1;

/// Push a sphere out of every volume it overlaps.
///
/// Volumes are applied one after another in table order, each correcting the
/// position left by the previous one. Degenerate (cleared) volumes are skipped.
pub fn resolve(position: Vec3, radius: f32, volumes: &[Aabb]) -> Vec3 {
    volumes
        .iter()
        .filter(|v| !v.is_degenerate())
        .fold(position, |p, v| push_out(p, radius, v))
}

fn push_out(position: Vec3, radius: f32, volume: &Aabb) -> Vec3 {
    let closest = volume.closest_point(position);
    let separation = position - closest;
    let distance = separation.length();
    if distance >= radius {
        return position;
    }
    if distance > f32::EPSILON {
        return position + separation / distance * (radius - distance) * COLLISION_SLOP;
    }
    push_through_nearest_face(position, radius, volume)
}

/// Fallback when the centre lies inside the box: leave through the closest
/// side face. Height is pinned by the caller, so top and bottom are never used.
fn push_through_nearest_face(position: Vec3, radius: f32, volume: &Aabb) -> Vec3 {
    let reach = radius * COLLISION_SLOP;
    let faces = [
        (position.x - volume.min.x, Vec3::new(volume.min.x - reach, position.y, position.z)),
        (volume.max.x - position.x, Vec3::new(volume.max.x + reach, position.y, position.z)),
        (position.z - volume.min.z, Vec3::new(position.x, position.y, volume.min.z - reach)),
        (volume.max.z - position.z, Vec3::new(position.x, position.y, volume.max.z + reach)),
    ];
    let mut best = faces[0];
    for face in &faces[1..] {
        if face.0 < best.0 {
            best = *face;
        }
    }
    best.1
}
