//! In-memory content shared by the unit tests.

use crate::config::RuntimeParameters;
use crate::content::{
    CategoryDesc, ContentDecoder, CueDefinition, DecodeError, GlobalSettings, InstanceBehavior,
    SoundBankData, VariableDesc, WaveBankData, WaveEntry,
};
use crate::engine::Engine;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) const GLOBAL_SETTINGS: &[u8] = b"global-settings";
pub(crate) const SFX_BANK: &[u8] = b"sound-bank:effects";
pub(crate) const LIMITED_BANK: &[u8] = b"sound-bank:limited";
pub(crate) const WAVE_BANK: &[u8] = b"wave-bank:effects";

/// Decoder that looks buffers up by their exact bytes.
pub(crate) struct MemoryDecoder {
    settings: GlobalSettings,
    sound_banks: HashMap<Vec<u8>, SoundBankData>,
    wave_banks: HashMap<Vec<u8>, WaveBankData>,
}

impl MemoryDecoder {
    pub fn standard() -> Self {
        Self::with_settings(settings())
    }

    pub fn with_settings(settings: GlobalSettings) -> Self {
        let mut sound_banks = HashMap::new();
        sound_banks.insert(SFX_BANK.to_vec(), sound_bank());
        sound_banks.insert(LIMITED_BANK.to_vec(), limited_bank());
        let mut wave_banks = HashMap::new();
        wave_banks.insert(WAVE_BANK.to_vec(), wave_bank());
        Self {
            settings,
            sound_banks,
            wave_banks,
        }
    }
}

impl ContentDecoder for MemoryDecoder {
    fn decode_global_settings(&self, buffer: &[u8]) -> Result<GlobalSettings, DecodeError> {
        if buffer != GLOBAL_SETTINGS {
            return Err(DecodeError::new("not a global settings buffer"));
        }
        Ok(self.settings.clone())
    }

    fn decode_sound_bank(&self, buffer: &[u8]) -> Result<SoundBankData, DecodeError> {
        self.sound_banks
            .get(buffer)
            .cloned()
            .ok_or_else(|| DecodeError::new("unknown sound bank"))
    }

    fn decode_wave_bank(&self, buffer: &[u8]) -> Result<WaveBankData, DecodeError> {
        self.wave_banks
            .get(buffer)
            .cloned()
            .ok_or_else(|| DecodeError::new("unknown wave bank"))
    }
}

/// Categories: Global(0) > Music(1), Global(0) > Sfx(2).
pub(crate) fn settings() -> GlobalSettings {
    GlobalSettings::new()
        .with_category(CategoryDesc::new("Global"))
        .with_category(CategoryDesc::new("Music").with_parent(0).with_volume(0.8))
        .with_category(CategoryDesc::new("Sfx").with_parent(0))
        .with_variable(VariableDesc::global("SpeedOfSound", 343.0, 0.0, 1_000_000.0))
        .with_variable(VariableDesc::global("MusicLevel", 1.0, 0.0, 1.0))
        .with_variable(VariableDesc::global("Elapsed", 0.0, 0.0, f32::MAX).read_only())
        .with_variable(VariableDesc::instance("Distance", 0.0, 0.0, 1_000_000.0))
        .with_variable(VariableDesc::instance("DopplerPitchScalar", 1.0, 0.0, 4.0))
        .with_variable(VariableDesc::instance("OrientationAngle", 0.0, -180.0, 180.0))
        .with_variable(VariableDesc::instance("NumCueInstances", 0.0, 0.0, 1024.0).read_only())
        .with_variable(VariableDesc::instance("Intensity", 0.5, 0.0, 1.0))
}

/// Cues: explosion(0, Sfx, mono), footsteps(1, Sfx, stereo), theme(2, Music, stereo).
pub(crate) fn sound_bank() -> SoundBankData {
    SoundBankData {
        name: "Effects".to_string(),
        cues: vec![
            CueDefinition::new("explosion", 2, 1),
            CueDefinition::new("footsteps", 2, 2),
            CueDefinition::new("theme", 1, 2),
        ],
    }
}

/// Cues limited to one instance: alarm(0, fails), siren(1, replaces oldest).
pub(crate) fn limited_bank() -> SoundBankData {
    SoundBankData {
        name: "Limited".to_string(),
        cues: vec![
            CueDefinition::new("alarm", 2, 1).with_instance_limit(1, InstanceBehavior::Fail),
            CueDefinition::new("siren", 2, 1)
                .with_instance_limit(1, InstanceBehavior::ReplaceOldest),
        ],
    }
}

/// Waves: boom(0, mono 48k), unnamed rain(1, stereo 44.1k).
pub(crate) fn wave_bank() -> WaveBankData {
    WaveBankData {
        name: "Effects".to_string(),
        entries: vec![
            WaveEntry::new(1, 48_000, 96_000).named("boom"),
            WaveEntry::new(2, 44_100, 441_000),
        ],
    }
}

pub(crate) fn parameters(mask: u32) -> RuntimeParameters {
    RuntimeParameters::new(GLOBAL_SETTINGS.to_vec(), Arc::new(MemoryDecoder::standard()))
        .with_output_channel_mask(mask)
}

/// Initialized engine with a stereo final mix.
pub(crate) fn engine() -> Engine {
    engine_with_mask(crate::spatial::speakers::STEREO)
}

/// Routes library logs through the test harness.
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn engine_with_mask(mask: u32) -> Engine {
    init_logging();
    let engine = Engine::create();
    engine
        .initialize(parameters(mask))
        .expect("test content initializes");
    engine
}

pub(crate) fn engine_with_settings(settings: GlobalSettings) -> Engine {
    init_logging();
    let engine = Engine::create();
    let decoder = Arc::new(MemoryDecoder::with_settings(settings));
    engine
        .initialize(RuntimeParameters::new(GLOBAL_SETTINGS.to_vec(), decoder))
        .expect("test content initializes");
    engine
}
