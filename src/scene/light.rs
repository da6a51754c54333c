use glam::Vec3;

/// Directional light with no position, only a direction toward the light.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub colour: Vec3,
    /// Unit vector pointing from the scene toward the light.
    pub direction: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            colour: Vec3::ONE,
            direction: Vec3::new(0.0, 1.0, 1.0).normalize(),
            intensity: 1.0,
        }
    }
}

impl DirectionalLight {
    #[must_use]
    pub fn new(colour: Vec3, direction: Vec3, intensity: f32) -> Self {
        Self {
            colour,
            direction: direction.normalize_or(Vec3::Y),
            intensity,
        }
    }

    /// Sweeps the light across the sky. `angle_degrees` is measured from
    /// the horizon; 90° is directly overhead.
    pub fn set_angle(&mut self, angle_degrees: f32) {
        let rad = angle_degrees.to_radians();
        self.direction = Vec3::new(0.0, rad.sin(), rad.cos()).normalize_or(Vec3::Y);
    }
}
