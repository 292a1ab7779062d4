//! Plain configuration structs with working defaults.

use glam::{Mat4, Vec3};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl ProjectionConfig {
    /// Right-handed perspective matrix with GL's [-1, 1] depth range.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }
}

/// Look-at camera placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::Z,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

/// Subscriber settings for [`init_logging`](crate::logging::init_logging).
///
/// `filter` uses `EnvFilter` directive syntax, e.g. `"gl_handler=debug"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Defaults, with ANSI colour off when `NO_COLOR` is set.
    pub fn from_env() -> Self {
        Self {
            filter: None,
            ansi: std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_projection_maps_near_plane_to_minus_one() {
        let projection = ProjectionConfig::default().matrix(1.0);
        let clip = projection * glam::Vec4::new(0.0, 0.0, -0.1, 1.0);
        assert!((clip.z / clip.w + 1.0).abs() < 1e-5);
    }
}
