//! Math types for Sonicue

pub use glam::Vec3;

use crate::error::{Result, SonicueError};
use std::f32::consts::TAU;

const MIN_AXIS_LENGTH: f32 = 1e-6;

/// Orthonormal front/top/right frame built from a front and top vector.
///
/// Right is `top × front`, so with front +Z and top +Y it points to +X.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    front: Vec3,
    top: Vec3,
    right: Vec3,
}

impl Orientation {
    /// Fails if either axis is degenerate or the two are parallel.
    pub fn new(front: Vec3, top: Vec3) -> Result<Self> {
        let front = front
            .try_normalize()
            .ok_or_else(|| SonicueError::invalid("front orientation is zero or not finite"))?;
        let right = top.cross(front);
        if right.length() < MIN_AXIS_LENGTH {
            return Err(SonicueError::invalid(
                "top orientation is zero or parallel to front",
            ));
        }
        let right = right.normalize();
        let top = front.cross(right);
        Ok(Self { front, top, right })
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn top(&self) -> Vec3 {
        self.top
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Expresses a world-space direction as (right, top, front) components.
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.right), v.dot(self.top), v.dot(self.front))
    }

    /// Clockwise azimuth of `v` seen from above, in `[0, 2π)`; front is 0
    /// and right is π/2. None if `v` has no horizontal component.
    pub fn azimuth_of(&self, v: Vec3) -> Option<f32> {
        let local = self.to_local(v);
        if local.x.hypot(local.z) < MIN_AXIS_LENGTH {
            return None;
        }
        Some(wrap_angle(local.x.atan2(local.z)))
    }

    /// World-space direction for an azimuth in this frame's horizontal plane.
    pub fn direction_at(&self, azimuth: f32) -> Vec3 {
        self.right * azimuth.sin() + self.front * azimuth.cos()
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            front: Vec3::Z,
            top: Vec3::Y,
            right: Vec3::X,
        }
    }
}

/// Wraps an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}
