use glam::{Mat4, Vec3, Vec4};

/// Vertical field of view of the main camera, in radians.
pub const FOV: f32 = 60.0 * (std::f32::consts::PI / 180.0);

/// Near plane of the main camera.
pub const Z_NEAR: f32 = 0.01;

/// Far plane of the main camera. Cascade splits derive from this.
pub const Z_FAR: f32 = 1000.0;

/// Free camera: position plus pitch/yaw rotation in degrees.
///
/// The view matrix is rebuilt on demand via [`update_view_matrix`]
/// (`Camera::update_view_matrix`) after movement, not implicitly on every
/// mutation.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation in degrees: x = pitch, y = yaw (roll unused).
    pub rotation: Vec3,
    view_matrix: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            view_matrix: Mat4::IDENTITY,
        }
    }

    /// Moves relative to the viewing direction: ±z walks forward/back,
    /// ±x strafes, y is world-vertical.
    pub fn move_position(&mut self, offset_x: f32, offset_y: f32, offset_z: f32) {
        if offset_z != 0.0 {
            self.position.x -= self.rotation.y.to_radians().sin() * offset_z;
            self.position.z += self.rotation.y.to_radians().cos() * offset_z;
        }
        if offset_x != 0.0 {
            self.position.x -= (self.rotation.y - 90.0).to_radians().sin() * offset_x;
            self.position.z += (self.rotation.y - 90.0).to_radians().cos() * offset_x;
        }
        self.position.y += offset_y;
    }

    pub fn move_rotation(&mut self, offset_x: f32, offset_y: f32, offset_z: f32) {
        self.rotation += Vec3::new(offset_x, offset_y, offset_z);
    }

    /// Rebuilds the view matrix from the current position and rotation.
    pub fn update_view_matrix(&mut self) {
        self.view_matrix = generic_view_matrix(self.position, self.rotation);
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Perspective projection for the main camera constants.
    #[must_use]
    pub fn projection_matrix(aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV, aspect, Z_NEAR, Z_FAR)
    }
}

/// View matrix from a position and pitch/yaw rotation in degrees:
/// rotate about X, then Y, then translate by the negated position. Shared
/// by the camera and the shadow light view.
#[must_use]
pub fn generic_view_matrix(position: Vec3, rotation_degrees: Vec3) -> Mat4 {
    Mat4::from_rotation_x(rotation_degrees.x.to_radians())
        * Mat4::from_rotation_y(rotation_degrees.y.to_radians())
        * Mat4::from_translation(-position)
}

/// Six view-frustum planes extracted from a projection×view matrix.
///
/// Gribb–Hartmann extraction for wgpu-style `[0, 1]` clip depth: the near
/// plane is row 2 alone, the far plane row 3 − row 2.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    planes: [Vec4; 6], // Left, Right, Bottom, Top, Near, Far
}

impl Frustum {
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [
            rows[3] + rows[0], // Left
            rows[3] - rows[0], // Right
            rows[3] + rows[1], // Bottom
            rows[3] - rows[1], // Top
            rows[2],           // Near ([0,1] depth)
            rows[3] - rows[2], // Far
        ];

        for plane in &mut planes {
            let length = Vec3::new(plane.x, plane.y, plane.z).length();
            if length > f32::EPSILON {
                *plane /= length;
            }
        }

        Self { planes }
    }

    /// True when a sphere is at least partly inside the frustum.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            let dist = plane.x * center.x + plane.y * center.y + plane.z * center.z + plane.w;
            if dist < -radius {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_matrix_translates_world_opposite_camera() {
        let view = generic_view_matrix(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let p = view.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-6);
    }

    #[test]
    fn frustum_contains_point_ahead_of_camera() {
        let proj = Camera::projection_matrix(1.0);
        let view = generic_view_matrix(Vec3::ZERO, Vec3::ZERO);
        let frustum = Frustum::from_matrix(proj * view);
        // Camera looks down -Z
        assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, -10.0), 0.1));
        assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, 10.0), 0.1));
    }
}
