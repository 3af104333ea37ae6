// Math utilities and helper functions

use glam::{Mat3, Quat, Vec3};

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Inverse of `lerp`, clamped to [0, 1]. Returns 0 when `a == b`.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if approx_equal(a, b, f32::EPSILON) {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Check if two f32 values are approximately equal
pub fn approx_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Frame-rate independent interpolation factor for a first-order response.
///
/// Always in [0, 1), so lerping with it never overshoots the target.
pub fn exp_smoothing(response: f32, dt: f32) -> f32 {
    1.0 - (-response * dt).exp()
}

/// Remove the component of `vector` along `normal`.
pub fn project_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    let len_sq = normal.length_squared();
    if len_sq < f32::EPSILON {
        return vector;
    }
    vector - normal * (vector.dot(normal) / len_sq)
}

/// Shorten `vector` to `max_length` if it is longer.
pub fn clamp_magnitude(vector: Vec3, max_length: f32) -> Vec3 {
    vector.clamp_length_max(max_length.max(0.0))
}

/// Redirect `direction` so it lies in the surface plane while keeping its heading.
///
/// Unlike `project_on_plane` the result is normalized, so moving up a slope is as
/// fast as moving on flat ground.
pub fn direction_tangent_to_surface(direction: Vec3, surface_normal: Vec3, up: Vec3) -> Vec3 {
    let right = direction.cross(up);
    surface_normal.cross(right).normalize_or_zero()
}

/// Rotation whose local +Z points along `forward` with local +Y as close to `up` as possible.
///
/// Returns `None` for a degenerate forward vector or when `forward` is parallel to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let forward = forward.try_normalize()?;
    let right = up.cross(forward).try_normalize()?;
    let up = forward.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)))
}

/// Length of the part of `vector` that lies in the plane perpendicular to `up`.
pub fn planar_speed(vector: Vec3, up: Vec3) -> f32 {
    project_on_plane(vector, up).length()
}
