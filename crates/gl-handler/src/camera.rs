//! Look-at camera.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// A camera whose view matrix is rebuilt whenever its placement changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    config: CameraConfig,
    view: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            view: Mat4::look_at_rh(config.position, config.target, config.up),
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CameraConfig) {
        *self = Self::new(config);
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.set_config(CameraConfig { position, ..self.config });
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.set_config(CameraConfig { target, ..self.config });
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// World-space viewing direction: the negated third row of the view
    /// matrix.
    pub fn view_dir(&self) -> Vec3 {
        -self.view.row(2).truncate()
    }

    /// World-space right vector: the first row of the view matrix.
    pub fn right(&self) -> Vec3 {
        self.view.row(0).truncate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-6)
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(close(camera.view_dir(), Vec3::NEG_Z));
        assert!(close(camera.right(), Vec3::X));
        assert!(close(camera.view_matrix().transform_point3(Vec3::ZERO), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn moving_the_camera_rebuilds_the_view() {
        let mut camera = Camera::default();
        camera.set_position(Vec3::new(5.0, 0.0, 0.0));
        assert!(close(camera.view_dir(), Vec3::NEG_X));
        assert!(close(camera.right(), Vec3::NEG_Z));
    }
}
