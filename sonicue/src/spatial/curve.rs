use crate::error::{Result, SonicueError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Normalized distance.
    pub distance: f32,
    pub dsp_setting: f32,
}

/// Piecewise-linear map from distance to a DSP setting such as gain.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceCurve {
    points: Vec<CurvePoint>,
}

impl DistanceCurve {
    /// Points must be finite, non-empty and sorted by distance.
    pub fn new(points: Vec<CurvePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(SonicueError::invalid("distance curve has no points"));
        }
        if points
            .iter()
            .any(|p| !p.distance.is_finite() || !p.dsp_setting.is_finite())
        {
            return Err(SonicueError::invalid("distance curve has non-finite points"));
        }
        if points.windows(2).any(|w| w[1].distance < w[0].distance) {
            return Err(SonicueError::invalid(
                "distance curve points are not sorted by distance",
            ));
        }
        Ok(Self { points })
    }

    pub fn from_pairs(pairs: &[(f32, f32)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(distance, dsp_setting)| CurvePoint {
                    distance,
                    dsp_setting,
                })
                .collect(),
        )
    }

    /// Full level at every distance: `{(0, 1), (1, 1)}`.
    pub fn identity() -> Self {
        Self {
            points: vec![
                CurvePoint {
                    distance: 0.0,
                    dsp_setting: 1.0,
                },
                CurvePoint {
                    distance: 1.0,
                    dsp_setting: 1.0,
                },
            ],
        }
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Interpolates linearly between neighbouring points and holds the end
    /// values outside the curve.
    pub fn evaluate(&self, distance: f32) -> f32 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 1.0,
        };
        if distance <= first.distance {
            return first.dsp_setting;
        }
        if distance >= last.distance {
            return last.dsp_setting;
        }
        for window in self.points.windows(2) {
            let (a, b) = (window[0], window[1]);
            if distance <= b.distance {
                let span = b.distance - a.distance;
                if span <= f32::EPSILON {
                    return b.dsp_setting;
                }
                let t = (distance - a.distance) / span;
                return a.dsp_setting + (b.dsp_setting - a.dsp_setting) * t;
            }
        }
        last.dsp_setting
    }
}

impl Default for DistanceCurve {
    fn default() -> Self {
        Self::identity()
    }
}
