use super::{GlobalSettings, IoStream, SoundBankData, WaveBankData};
use thiserror::Error;

/// Failure reported by a [`ContentDecoder`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Turns authored binaries into decoded content.
///
/// Implementations own the binary formats. The engine only calls these
/// methods while creating objects, so a failure here never leaves a
/// half-built bank behind.
pub trait ContentDecoder {
    fn decode_global_settings(&self, buffer: &[u8]) -> Result<GlobalSettings, DecodeError>;

    fn decode_sound_bank(&self, buffer: &[u8]) -> Result<SoundBankData, DecodeError>;

    fn decode_wave_bank(&self, buffer: &[u8]) -> Result<WaveBankData, DecodeError>;

    /// Decodes the header of a streaming wave bank. The stream is already
    /// positioned at the bank offset.
    ///
    /// The default reads the rest of the stream and hands it to
    /// [`decode_wave_bank`](Self::decode_wave_bank).
    fn decode_streaming_wave_bank(&self, stream: &mut IoStream) -> crate::Result<WaveBankData> {
        let buffer = stream.read_to_end()?;
        Ok(self.decode_wave_bank(&buffer)?)
    }
}
