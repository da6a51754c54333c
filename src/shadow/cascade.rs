use glam::{Mat4, Vec3};

use crate::scene::{generic_view_matrix, FOV, Z_FAR, Z_NEAR};

/// Number of shadow cascades along the view depth range.
pub const CASCADE_COUNT: usize = 3;

/// Far distances of each cascade slice. The last slice reaches the camera
/// far plane; the near slices cover the depth range closest to the viewer
/// at the highest shadow-map density.
pub const CASCADE_SPLITS: [f32; CASCADE_COUNT] = [Z_FAR / 20.0, Z_FAR / 10.0, Z_FAR];

/// One depth slice of the camera frustum with its matching light-space
/// view and orthographic projection.
///
/// [`update`](ShadowCascade::update) recomputes the world-space corners of
/// the slice, positions a virtual light camera behind its centroid along
/// the light direction, and fits an orthographic box around the corners in
/// light space.
#[derive(Debug, Clone)]
pub struct ShadowCascade {
    z_near: f32,
    z_far: f32,
    frustum_corners: [Vec3; 8],
    centroid: Vec3,
    light_view: Mat4,
    ortho_proj: Mat4,
}

impl ShadowCascade {
    #[must_use]
    pub fn new(z_near: f32, z_far: f32) -> Self {
        Self {
            z_near,
            z_far,
            frustum_corners: [Vec3::ZERO; 8],
            centroid: Vec3::ZERO,
            light_view: Mat4::IDENTITY,
            ortho_proj: Mat4::IDENTITY,
        }
    }

    /// Rebuilds the light matrices for the current camera view and light
    /// direction. `aspect` is the render target aspect ratio.
    pub fn update(&mut self, view: Mat4, aspect: f32, light_direction: Vec3) {
        let projection = Mat4::perspective_rh(FOV, aspect, self.z_near, self.z_far);
        let inverse = (projection * view).inverse();

        // Unproject the corners of the clip-space cube ([0, 1] depth).
        let mut centroid = Vec3::ZERO;
        let mut index = 0;
        for z in [0.0, 1.0] {
            for y in [-1.0, 1.0] {
                for x in [-1.0, 1.0] {
                    let corner = inverse.project_point3(Vec3::new(x, y, z));
                    self.frustum_corners[index] = corner;
                    centroid += corner;
                    index += 1;
                }
            }
        }
        self.centroid = centroid / 8.0;

        let direction = light_direction.normalize_or(Vec3::Y);
        self.update_light_view_matrix(direction);
        self.update_light_projection_matrix();
    }

    /// Positions a light camera behind the centroid, looking along the
    /// light direction. The standoff distance spans the world-space depth
    /// extent of the slice so the whole slice sits in front of the camera.
    fn update_light_view_matrix(&mut self, direction: Vec3) {
        let mut min_z = f32::MAX;
        let mut max_z = f32::MIN;
        for corner in &self.frustum_corners {
            min_z = min_z.min(corner.z);
            max_z = max_z.max(corner.z);
        }
        let distance = max_z - min_z;
        let position = self.centroid + direction * distance;

        let angle_x = direction.z.clamp(-1.0, 1.0).acos().to_degrees();
        let angle_y = direction.x.clamp(-1.0, 1.0).asin().to_degrees();
        self.light_view = generic_view_matrix(position, Vec3::new(angle_x, angle_y, 0.0));
    }

    /// Fits an axis-aligned orthographic box around the slice corners in
    /// light space. Near stays at zero; far covers the light-space depth
    /// extent of the corners.
    fn update_light_projection_matrix(&mut self) {
        let mut min = Vec3::MAX;
        let mut max = Vec3::MIN;
        for corner in &self.frustum_corners {
            let lit = self.light_view.transform_point3(*corner);
            min = min.min(lit);
            max = max.max(lit);
        }
        let depth = max.z - min.z;
        self.ortho_proj = Mat4::orthographic_rh(min.x, max.x, min.y, max.y, 0.0, depth);
    }

    #[inline]
    #[must_use]
    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    #[inline]
    #[must_use]
    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    #[inline]
    #[must_use]
    pub fn frustum_corners(&self) -> &[Vec3; 8] {
        &self.frustum_corners
    }

    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    #[inline]
    #[must_use]
    pub fn light_view(&self) -> &Mat4 {
        &self.light_view
    }

    #[inline]
    #[must_use]
    pub fn ortho_proj(&self) -> &Mat4 {
        &self.ortho_proj
    }
}

/// All cascades of the shadow pass, nearest first.
#[derive(Debug, Clone)]
pub struct CascadeSet {
    cascades: [ShadowCascade; CASCADE_COUNT],
}

impl Default for CascadeSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CascadeSet {
    #[must_use]
    pub fn new() -> Self {
        let mut z_near = Z_NEAR;
        let cascades = CASCADE_SPLITS.map(|z_far| {
            let cascade = ShadowCascade::new(z_near, z_far);
            z_near = z_far;
            cascade
        });
        Self { cascades }
    }

    /// Recomputes every cascade for the current camera and light.
    pub fn update(&mut self, view: Mat4, aspect: f32, light_direction: Vec3) {
        for cascade in &mut self.cascades {
            cascade.update(view, aspect, light_direction);
        }
    }

    #[must_use]
    pub fn cascades(&self) -> &[ShadowCascade; CASCADE_COUNT] {
        &self.cascades
    }

    /// Far distance of each cascade slice, for shader-side slice lookup.
    #[must_use]
    pub fn split_distances(&self) -> [f32; CASCADE_COUNT] {
        CASCADE_SPLITS
    }
}
