//! Model transforms driven by elapsed time.
//!
//! The matrix is rebuilt on every call; nothing is cached between frames.

use glam::{Mat4, Quat, Vec3};

/// How the rotation angle evolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spin {
    /// A constant angle in radians.
    Fixed(f32),
    /// `time_ms * speed` radians.
    Continuous { speed: f32 },
    /// `sin(time_ms / 1000) * 90 * speed` radians.
    Oscillating { speed: f32 },
}

impl Default for Spin {
    fn default() -> Self {
        Spin::Fixed(0.0)
    }
}

impl Spin {
    pub fn angle(&self, time_ms: f32) -> f32 {
        match *self {
            Spin::Fixed(angle) => angle,
            Spin::Continuous { speed } => time_ms * speed,
            Spin::Oscillating { speed } => (time_ms * 0.001).sin() * 90.0 * speed,
        }
    }
}

/// Rotation about an axis. A zero axis means no rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub axis: Vec3,
    pub spin: Spin,
}

/// Translate, then rotate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModelTransform {
    pub translation: Vec3,
    pub rotation: Rotation,
}

impl ModelTransform {
    pub fn new(translation: Vec3, rotation: Rotation) -> Self {
        Self { translation, rotation }
    }

    /// Model matrix at `time_ms` milliseconds.
    pub fn matrix(&self, time_ms: f32) -> Mat4 {
        let translation = Mat4::from_translation(self.translation);
        match self.rotation.axis.try_normalize() {
            Some(axis) => {
                let angle = self.rotation.spin.angle(time_ms);
                translation * Mat4::from_quat(Quat::from_axis_angle(axis, angle))
            }
            None => translation,
        }
    }

    /// Inverse model matrix at `time_ms`.
    pub fn inverse_matrix(&self, time_ms: f32) -> Mat4 {
        self.matrix(time_ms).inverse()
    }
}
