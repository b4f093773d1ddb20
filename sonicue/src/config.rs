//! Engine configuration descriptors and flag constants.

use crate::content::{ContentDecoder, ReadSeek};
use crate::error::{Result, SonicueError};
use crate::spatial::speakers;
use std::sync::Arc;

bitflags::bitflags! {
    /// How a stop request ends a cue or wave.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StopFlags: u32 {
        /// Stop at once, skipping any release phase.
        const IMMEDIATE = 0x1;
    }
}

impl StopFlags {
    /// Let the cue or wave finish its release phase.
    pub const RELEASE: Self = Self::empty();
}

bitflags::bitflags! {
    /// Options for preparing or playing a wave.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WavePrepareFlags: u32 {
        /// Wave is background music.
        const BACKGROUND_MUSIC = 0x2;
        /// Play offset is given in milliseconds.
        const UNITS_MS = 0x4;
        /// Play offset is given in samples.
        const UNITS_SAMPLES = 0x8;
    }
}

/// Whether a play call hands back a handle to the new instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleMode {
    /// Return a handle; the caller destroys the instance.
    #[default]
    Wrap,
    /// No handle; the engine reaps the instance once it has stopped.
    FireAndForget,
}

/// Parameters for [`Engine::initialize`](crate::Engine::initialize).
#[derive(Clone)]
pub struct RuntimeParameters {
    /// Authored global settings, decoded through `decoder`.
    pub global_settings: Vec<u8>,
    /// Decoder used for global settings and every bank created later.
    pub decoder: Arc<dyn ContentDecoder>,
    /// Speaker mask of the final mix.
    pub output_channel_mask: u32,
    /// Look-ahead for streaming wave banks, in milliseconds.
    pub lookahead_ms: u32,
    /// Bound on undelivered notifications. None means unbounded.
    pub notification_capacity: Option<usize>,
}

impl RuntimeParameters {
    pub fn new(global_settings: Vec<u8>, decoder: Arc<dyn ContentDecoder>) -> Self {
        Self {
            global_settings,
            decoder,
            output_channel_mask: speakers::STEREO,
            lookahead_ms: 250,
            notification_capacity: None,
        }
    }

    pub fn with_output_channel_mask(mut self, mask: u32) -> Self {
        self.output_channel_mask = mask;
        self
    }

    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = Some(capacity);
        self
    }
}

impl std::fmt::Debug for RuntimeParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeParameters")
            .field("global_settings_len", &self.global_settings.len())
            .field("output_channel_mask", &format_args!("{:#x}", self.output_channel_mask))
            .field("lookahead_ms", &self.lookahead_ms)
            .field("notification_capacity", &self.notification_capacity)
            .finish()
    }
}

/// Parameters for a streaming wave bank.
pub struct StreamingParameters {
    pub file: Box<dyn ReadSeek>,
    /// Byte offset of the bank inside `file`.
    pub offset: u64,
    pub flags: u32,
    /// Read granularity in sectors. Must be non-zero.
    pub packet_size: u16,
}

impl StreamingParameters {
    pub fn new(file: Box<dyn ReadSeek>) -> Self {
        Self {
            file,
            offset: 0,
            flags: 0,
            packet_size: 64,
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

/// Channel layout of the engine's final mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalMixFormat {
    pub channel_mask: u32,
    pub channel_count: u32,
}

impl FinalMixFormat {
    pub fn from_mask(channel_mask: u32) -> Result<Self> {
        let channel_count = channel_mask.count_ones();
        if channel_count == 0 {
            return Err(SonicueError::Configuration(
                "output channel mask has no speakers".to_string(),
            ));
        }
        Ok(Self {
            channel_mask,
            channel_count,
        })
    }
}
