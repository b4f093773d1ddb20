//! 3D spatialization for cues.
//!
//! A [`Spatializer`] is created from an initialized engine. Each frame the
//! caller fills a [`Listener`] and an [`Emitter`], runs
//! [`Spatializer::calculate`] into a [`DspSettings`], and hands the result
//! to [`apply`] (or to `SoundBank::play_3d` when starting a cue).
//!
//! ```rust,ignore
//! let spatializer = Spatializer::new(&engine)?;
//! let mut emitter = Emitter::at(Vec3::new(0.0, 0.0, 10.0));
//! let mut settings = DspSettings::new(1, engine.final_mix_format()?.channel_count)?;
//! spatializer.calculate(&Listener::default(), &mut emitter, &mut settings)?;
//! spatial::apply(Some(&settings), Some(&cue))?;
//! ```

mod calculate;
mod curve;
mod dsp;
pub mod layout;
mod scene;
mod spatializer;

pub use curve::{CurvePoint, DistanceCurve};
pub use dsp::DspSettings;
pub use layout::{ChannelLayout, speakers};
pub use scene::{Cone, Emitter, Listener};
pub use spatializer::{
    DISTANCE, DOPPLER_PITCH_SCALAR, ORIENTATION_ANGLE, SPEED_OF_SOUND, Spatializer, apply,
};

pub(crate) use spatializer::apply_to_cue;
