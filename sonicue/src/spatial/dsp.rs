use crate::error::{Result, SonicueError};
use crate::matrix::{ChannelMatrix, MAX_SOURCE_CHANNELS};

/// Output of a spatial calculation, ready to apply to a cue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DspSettings {
    pub matrix: ChannelMatrix,
    /// Pitch ratio; 1.0 means no shift.
    pub doppler_factor: f32,
    /// Signed angle between the emitter-to-listener direction and the
    /// listener's front, in radians. Positive toward the listener's right.
    pub emitter_to_listener_angle: f32,
    pub emitter_to_listener_distance: f32,
    pub emitter_velocity_component: f32,
    pub listener_velocity_component: f32,
}

impl DspSettings {
    /// Settings with a zeroed `src_channels × dst_channels` matrix.
    pub fn new(src_channels: u32, dst_channels: u32) -> Result<Self> {
        if src_channels == 0 || src_channels > MAX_SOURCE_CHANNELS {
            return Err(SonicueError::invalid(format!(
                "source channel count {src_channels} outside 1..={MAX_SOURCE_CHANNELS}"
            )));
        }
        if dst_channels == 0 {
            return Err(SonicueError::invalid("destination channel count is zero"));
        }
        Ok(Self {
            matrix: ChannelMatrix::zeroed(src_channels, dst_channels),
            doppler_factor: 1.0,
            ..Default::default()
        })
    }

    pub fn src_channel_count(&self) -> u32 {
        self.matrix.src_channels()
    }

    pub fn dst_channel_count(&self) -> u32 {
        self.matrix.dst_channels()
    }

    /// The angle in degrees, as written to a cue's `OrientationAngle`.
    pub fn emitter_to_listener_degrees(&self) -> f32 {
        self.emitter_to_listener_angle * (180.0 / std::f32::consts::PI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_new_allocates_matrix() {
        let settings = DspSettings::new(2, 6).unwrap();
        assert_eq!(settings.matrix.coefficients().len(), 12);
        assert_eq!(settings.doppler_factor, 1.0);
        assert!(DspSettings::new(0, 2).is_err());
        assert!(DspSettings::new(2, 0).is_err());
    }

    #[test]
    fn test_degrees() {
        let settings = DspSettings {
            emitter_to_listener_angle: FRAC_PI_2,
            ..Default::default()
        };
        assert!((settings.emitter_to_listener_degrees() - 90.0).abs() < 1e-4);
    }
}
