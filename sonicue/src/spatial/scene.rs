use super::curve::DistanceCurve;
use crate::math::Vec3;
use std::f32::consts::TAU;

/// Directional attenuation cone.
///
/// Inside half the inner angle the inner volume applies, outside half the
/// outer angle the outer volume applies, and in between the two blend
/// linearly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub inner_angle: f32,
    pub outer_angle: f32,
    pub inner_volume: f32,
    pub outer_volume: f32,
}

impl Cone {
    pub fn new(inner_angle: f32, outer_angle: f32, inner_volume: f32, outer_volume: f32) -> Self {
        Self {
            inner_angle,
            outer_angle,
            inner_volume,
            outer_volume,
        }
    }

    /// Gain for a direction `angle` radians off the cone axis.
    pub fn volume_at(&self, angle: f32) -> f32 {
        let inner = self.inner_angle.clamp(0.0, TAU) * 0.5;
        let outer = self.outer_angle.clamp(0.0, TAU).max(self.inner_angle) * 0.5;
        let angle = angle.abs();
        if angle <= inner {
            self.inner_volume
        } else if angle >= outer {
            self.outer_volume
        } else {
            let t = (angle - inner) / (outer - inner);
            self.inner_volume + (self.outer_volume - self.inner_volume) * t
        }
    }
}

/// Point that hears the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Listener {
    pub orient_front: Vec3,
    pub orient_top: Vec3,
    pub position: Vec3,
    /// Units per second; only used for doppler.
    pub velocity: Vec3,
    pub cone: Option<Cone>,
}

impl Default for Listener {
    fn default() -> Self {
        Self {
            orient_front: Vec3::Z,
            orient_top: Vec3::Y,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            cone: None,
        }
    }
}

impl Listener {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// Sound source in the scene.
///
/// Multi-channel emitters spread their channels on a circle of
/// `channel_radius` around `position`, at `channel_azimuths`. When the
/// azimuths or curves are left unset, calculation fills in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitter {
    pub cone: Option<Cone>,
    pub orient_front: Vec3,
    pub orient_top: Vec3,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Within this distance the sound spreads over all speakers.
    pub inner_radius: f32,
    pub channel_count: u32,
    pub channel_radius: f32,
    pub channel_azimuths: Option<Vec<f32>>,
    pub volume_curve: Option<DistanceCurve>,
    pub lfe_curve: Option<DistanceCurve>,
    /// Divides distances before curve lookups.
    pub curve_distance_scaler: f32,
    pub doppler_scaler: f32,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            cone: None,
            orient_front: Vec3::Z,
            orient_top: Vec3::Y,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            inner_radius: 0.0,
            channel_count: 1,
            channel_radius: 0.0,
            channel_azimuths: None,
            volume_curve: None,
            lfe_curve: None,
            curve_distance_scaler: 1.0,
            doppler_scaler: 1.0,
        }
    }
}

impl Emitter {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_channels(mut self, channel_count: u32) -> Self {
        self.channel_count = channel_count;
        self
    }
}
