//! # Sonicue
//!
//! A cue-based audio object model with a bridge from 3D positions to cue
//! parameters.
//!
//! An [`Engine`] owns sound banks (authored cues) and wave banks (raw wave
//! entries). Cues and waves are instances prepared from a bank and driven
//! through a small state machine. The [`spatial`] module turns a listener
//! and an emitter into [`DspSettings`](spatial::DspSettings) and writes them
//! onto a cue.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sonicue::*;
//! use sonicue::math::Vec3;
//! use sonicue::spatial::{DspSettings, Emitter, Listener, Spatializer};
//! # fn decoder() -> std::sync::Arc<dyn sonicue::content::ContentDecoder> { unimplemented!() }
//! # let settings_bytes: Vec<u8> = Vec::new();
//! # let bank_bytes: Vec<u8> = Vec::new();
//!
//! // Create and initialize the engine
//! let engine = Engine::create();
//! engine.initialize(RuntimeParameters::new(settings_bytes, decoder()))?;
//!
//! // Load a bank and prepare a cue
//! let bank = engine.create_sound_bank(&bank_bytes, 0)?;
//! let index = bank.get_cue_index("explosion")?.unwrap_or(0);
//! let cue = bank.prepare(index, 0, 0)?;
//!
//! // Position it in the world
//! let spatializer = Spatializer::new(&engine)?;
//! let mut emitter = Emitter::at(Vec3::new(3.0, 0.0, 4.0));
//! let mut dsp = DspSettings::new(1, engine.final_mix_format()?.channel_count)?;
//! spatializer.calculate(&Listener::default(), &mut emitter, &mut dsp)?;
//! spatial::apply(Some(&dsp), Some(&cue))?;
//! cue.play()?;
//!
//! // Advance the engine and poll for events
//! engine.do_work()?;
//! for notification in engine.poll_notifications()? {
//!     println!("{notification:?}");
//! }
//! # Ok::<(), SonicueError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`Engine`]**: Reference-counted root object, owner of every bank
//! - **[`SoundBank`]** / **[`Cue`]**: Authored sounds and their playing instances
//! - **[`WaveBank`]** / **[`Wave`]**: Raw wave entries, in memory or streamed
//! - **[`Notification`]**: Events delivered for registered targets
//! - **[`ContentDecoder`](content::ContentDecoder)**: Parses authored bank buffers
//!
//! ## Threading
//!
//! An engine and its handles are single-threaded. Notifications travel over
//! a channel whose receiver may be handed to another thread.

pub mod config;
pub mod content;
pub mod cue;
pub mod engine;
pub mod error;
pub mod events;
mod graph;
pub mod math;
pub mod matrix;
pub mod notification;
pub mod sound_bank;
pub mod spatial;
pub mod state;
pub mod wave;
pub mod wave_bank;

#[cfg(test)]
mod test_content;

pub use config::{
    FinalMixFormat, HandleMode, RuntimeParameters, StopFlags, StreamingParameters,
    WavePrepareFlags,
};
pub use cue::{Cue, CueInstanceProperties};
pub use engine::{Engine, InterfaceId};
pub use error::{Result, SonicueError};
pub use events::{Notification, NotificationKind};
pub use graph::{CueId, SoundBankId, WaveBankId, WaveId};
pub use matrix::ChannelMatrix;
pub use notification::{
    NOTIFICATION_PERSIST, NotificationDescription, NotificationTarget, RawNotificationDescription,
};
pub use sound_bank::{CueProperties, SoundBank};
pub use state::StateFlags;
pub use wave::{Wave, WaveInstanceProperties};
pub use wave_bank::{WaveBank, WaveProperties};
