use super::calculate::{self, CalculateFlags, Geometry, SpeakerRing};
use super::curve::DistanceCurve;
use super::dsp::DspSettings;
use super::layout::ChannelLayout;
use super::scene::{Emitter, Listener};
use crate::cue::Cue;
use crate::engine::Engine;
use crate::error::{Result, SonicueError};
use crate::graph::{CueId, Runtime};
use crate::math::Orientation;

/// Global variable holding the speed of sound in world units per second.
pub const SPEED_OF_SOUND: &str = "SpeedOfSound";
/// Cue variable receiving the emitter-to-listener distance.
pub const DISTANCE: &str = "Distance";
/// Cue variable receiving the doppler pitch ratio.
pub const DOPPLER_PITCH_SCALAR: &str = "DopplerPitchScalar";
/// Cue variable receiving the emitter-to-listener angle in degrees.
pub const ORIENTATION_ANGLE: &str = "OrientationAngle";

/// 3D positioning bound to one engine's speaker layout and speed of sound.
#[derive(Debug, Clone)]
pub struct Spatializer {
    channel_mask: u32,
    channel_count: u32,
    speed_of_sound: f32,
    speakers: SpeakerRing,
}

impl Spatializer {
    /// Reads the final-mix speaker mask and the `SpeedOfSound` global
    /// variable from `engine`.
    pub fn new(engine: &Engine) -> Result<Self> {
        let format = engine.final_mix_format()?;
        let index = engine
            .get_global_variable_index(SPEED_OF_SOUND)?
            .ok_or_else(|| {
                SonicueError::Configuration(format!(
                    "global settings define no '{SPEED_OF_SOUND}' variable"
                ))
            })?;
        let speed_of_sound = engine.get_global_variable(index)?;
        Self::with_parameters(format.channel_mask, speed_of_sound)
    }

    pub fn with_parameters(channel_mask: u32, speed_of_sound: f32) -> Result<Self> {
        if channel_mask == 0 {
            return Err(SonicueError::invalid("speaker mask is empty"));
        }
        if !speed_of_sound.is_finite() || speed_of_sound < f32::MIN_POSITIVE {
            return Err(SonicueError::invalid(format!(
                "speed of sound {speed_of_sound} must be positive"
            )));
        }
        log::debug!(
            "Spatializer for mask {channel_mask:#x}, speed of sound {speed_of_sound}"
        );
        Ok(Self {
            channel_mask,
            channel_count: channel_mask.count_ones(),
            speed_of_sound,
            speakers: SpeakerRing::from_mask(channel_mask),
        })
    }

    pub fn channel_mask(&self) -> u32 {
        self.channel_mask
    }

    pub fn speed_of_sound(&self) -> f32 {
        self.speed_of_sound
    }

    /// Computes matrix, doppler and angle for one emitter.
    ///
    /// Multi-channel emitters without azimuths get the default layout for
    /// their channel count and a channel radius of 1; emitters without
    /// curves get the identity curve. Those defaults are written back into
    /// `emitter`. Every argument is validated first, so on error neither
    /// `emitter` nor `settings` has changed.
    pub fn calculate(
        &self,
        listener: &Listener,
        emitter: &mut Emitter,
        settings: &mut DspSettings,
    ) -> Result<()> {
        if emitter.channel_count == 0 {
            return Err(SonicueError::invalid("emitter has no channels"));
        }
        if settings.src_channel_count() != emitter.channel_count {
            return Err(SonicueError::invalid(format!(
                "settings hold {} source channels, emitter has {}",
                settings.src_channel_count(),
                emitter.channel_count
            )));
        }
        if settings.dst_channel_count() != self.channel_count {
            return Err(SonicueError::invalid(format!(
                "settings hold {} destination channels, output has {}",
                settings.dst_channel_count(),
                self.channel_count
            )));
        }
        let listener_frame = Orientation::new(listener.orient_front, listener.orient_top)?;
        let emitter_frame = if emitter.channel_count > 1 || emitter.cone.is_some() {
            Orientation::new(emitter.orient_front, emitter.orient_top)?
        } else {
            Orientation::default()
        };

        let default_layout = match (&emitter.channel_azimuths, emitter.channel_count) {
            (_, 1) => None,
            (Some(azimuths), count) if azimuths.len() == count as usize => None,
            (Some(azimuths), count) => {
                return Err(SonicueError::invalid(format!(
                    "{} channel azimuths for {count} channels",
                    azimuths.len()
                )));
            }
            (None, count) => Some(ChannelLayout::for_channel_count(count)?),
        };

        if let Some(layout) = default_layout {
            log::debug!("Using {layout:?} layout for {}-channel emitter", emitter.channel_count);
            emitter.channel_azimuths = Some(layout.azimuths().to_vec());
            emitter.channel_radius = 1.0;
        }
        emitter.volume_curve.get_or_insert_with(DistanceCurve::identity);
        emitter.lfe_curve.get_or_insert_with(DistanceCurve::identity);

        let emitter: &Emitter = emitter;
        let identity = DistanceCurve::identity();
        let geometry = Geometry {
            listener_frame,
            emitter_frame,
            azimuths: emitter.channel_azimuths.as_deref().unwrap_or(&[]),
            volume_curve: emitter.volume_curve.as_ref().unwrap_or(&identity),
            lfe_curve: emitter.lfe_curve.as_ref().unwrap_or(&identity),
        };
        calculate::calculate(
            &self.speakers,
            self.speed_of_sound,
            listener,
            emitter,
            &geometry,
            CalculateFlags::ALL,
            settings,
        );
        Ok(())
    }
}

/// Writes calculated settings to a cue: the routing matrix, then the
/// `Distance`, `DopplerPitchScalar` and `OrientationAngle` variables.
///
/// Missing settings or cue make this a no-op. Variables the cue does not
/// define are skipped.
pub fn apply(settings: Option<&DspSettings>, cue: Option<&Cue>) -> Result<()> {
    let (Some(settings), Some(cue)) = (settings, cue) else {
        log::debug!("Nothing to apply: settings or cue missing");
        return Ok(());
    };
    cue.engine()
        .with_runtime_mut(|rt| apply_to_cue(rt, cue.id(), settings))
}

pub(crate) fn apply_to_cue(rt: &mut Runtime, cue: CueId, settings: &DspSettings) -> Result<()> {
    if settings.src_channel_count() == 0 {
        return Err(SonicueError::invalid("settings hold no matrix"));
    }
    let mut writes = Vec::with_capacity(3);
    for (name, value) in [
        (DISTANCE, settings.emitter_to_listener_distance),
        (DOPPLER_PITCH_SCALAR, settings.doppler_factor),
        (ORIENTATION_ANGLE, settings.emitter_to_listener_degrees()),
    ] {
        match rt.lookup_cue_variable(cue, name)? {
            Some(index) => match rt.check_cue_variable_writable(index) {
                Ok(()) => writes.push((index, value)),
                Err(err) => log::warn!("Skipping '{name}': {err}"),
            },
            None => log::debug!("{cue} has no '{name}' variable, skipping"),
        }
    }

    rt.set_cue_matrix(cue, settings.matrix.clone())?;
    for (index, value) in writes {
        rt.set_cue_variable(cue, index, value)?;
    }
    Ok(())
}
