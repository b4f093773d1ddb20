use crate::error::{Result, SonicueError};

/// Largest source channel count a cue or wave may route.
pub const MAX_SOURCE_CHANNELS: u32 = 8;

/// Source-to-output gain matrix, stored row-major with one row per source
/// channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelMatrix {
    src_channels: u32,
    dst_channels: u32,
    coefficients: Vec<f32>,
}

impl ChannelMatrix {
    pub fn new(src_channels: u32, dst_channels: u32, coefficients: &[f32]) -> Result<Self> {
        if src_channels == 0 || src_channels > MAX_SOURCE_CHANNELS {
            return Err(SonicueError::invalid(format!(
                "source channel count {src_channels} outside 1..={MAX_SOURCE_CHANNELS}"
            )));
        }
        if dst_channels == 0 {
            return Err(SonicueError::invalid("destination channel count is zero"));
        }
        let expected = (src_channels * dst_channels) as usize;
        if coefficients.len() != expected {
            return Err(SonicueError::invalid(format!(
                "expected {expected} coefficients, got {}",
                coefficients.len()
            )));
        }
        Ok(Self {
            src_channels,
            dst_channels,
            coefficients: coefficients.to_vec(),
        })
    }

    /// All gains zero.
    pub fn zeroed(src_channels: u32, dst_channels: u32) -> Self {
        Self {
            src_channels,
            dst_channels,
            coefficients: vec![0.0; (src_channels * dst_channels) as usize],
        }
    }

    /// Pass-through routing: a mono source feeds every output, otherwise
    /// source `i` feeds every output `j` with `j % src == i`.
    pub fn passthrough(src_channels: u32, dst_channels: u32) -> Self {
        let mut matrix = Self::zeroed(src_channels, dst_channels);
        for src in 0..src_channels {
            for dst in 0..dst_channels {
                if src_channels == 1 || dst % src_channels == src {
                    matrix.set(src, dst, 1.0);
                }
            }
        }
        matrix
    }

    pub fn src_channels(&self) -> u32 {
        self.src_channels
    }

    pub fn dst_channels(&self) -> u32 {
        self.dst_channels
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    pub fn get(&self, src: u32, dst: u32) -> f32 {
        self.coefficients[(src * self.dst_channels + dst) as usize]
    }

    pub fn set(&mut self, src: u32, dst: u32, gain: f32) {
        self.coefficients[(src * self.dst_channels + dst) as usize] = gain;
    }

    pub(crate) fn fill(&mut self, gain: f32) {
        self.coefficients.fill(gain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_shape() {
        assert!(ChannelMatrix::new(2, 2, &[1.0, 0.0, 0.0, 1.0]).is_ok());
        assert!(ChannelMatrix::new(2, 2, &[1.0, 0.0, 0.0]).is_err());
        assert!(ChannelMatrix::new(0, 2, &[]).is_err());
        assert!(ChannelMatrix::new(9, 1, &[0.0; 9]).is_err());
    }

    #[test]
    fn test_passthrough() {
        let mono = ChannelMatrix::passthrough(1, 2);
        assert_eq!(mono.coefficients(), &[1.0, 1.0]);

        let stereo = ChannelMatrix::passthrough(2, 6);
        assert_eq!(stereo.get(0, 0), 1.0);
        assert_eq!(stereo.get(0, 1), 0.0);
        assert_eq!(stereo.get(1, 1), 1.0);
        assert_eq!(stereo.get(0, 4), 1.0);
        assert_eq!(stereo.get(1, 5), 1.0);
    }
}
