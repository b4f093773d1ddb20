use crate::config::StopFlags;
use crate::engine::EngineShared;
use crate::error::{Result, SonicueError};
use crate::graph::WaveId;
use crate::matrix::ChannelMatrix;
use crate::notification::check_same_engine;
use crate::state::StateFlags;
use crate::wave_bank::WaveProperties;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct WaveInstanceProperties {
    pub wave: WaveProperties,
    pub background_music: bool,
    /// Start position in samples.
    pub initial_position: u32,
    pub loop_count: u8,
}

/// Handle to one instance of a wave-bank entry.
pub struct Wave {
    engine: Rc<EngineShared>,
    id: WaveId,
    index: u16,
}

impl Wave {
    pub(crate) fn new(engine: Rc<EngineShared>, id: WaveId, index: u16) -> Self {
        Self { engine, id, index }
    }

    pub fn id(&self) -> WaveId {
        self.id
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub(crate) fn attached_id(&self, engine: &Rc<EngineShared>) -> Result<WaveId> {
        check_same_engine(&self.engine, engine)?;
        self.engine.with_runtime(|rt| rt.wave(self.id).map(|_| self.id))
    }

    pub fn play(&self) -> Result<()> {
        self.engine.with_runtime_mut(|rt| rt.play_wave(self.id))
    }

    pub fn stop(&self, flags: StopFlags) -> Result<()> {
        self.engine.with_runtime_mut(|rt| rt.stop_wave(self.id, flags))
    }

    pub fn pause(&self, paused: bool) -> Result<()> {
        self.engine
            .with_runtime_mut(|rt| rt.pause_wave(self.id, paused))
    }

    pub fn get_state(&self) -> Result<StateFlags> {
        self.engine.with_runtime(|rt| Ok(rt.wave(self.id)?.state))
    }

    /// Pitch in cents, clamped to ±2400.
    pub fn set_pitch(&self, pitch: i16) -> Result<()> {
        self.engine
            .with_runtime_mut(|rt| rt.set_wave_pitch(self.id, pitch))
    }

    pub fn pitch(&self) -> Result<i16> {
        self.engine.with_runtime(|rt| Ok(rt.wave(self.id)?.pitch))
    }

    /// Linear volume, clamped to `[0, 2^24]`.
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.engine
            .with_runtime_mut(|rt| rt.set_wave_volume(self.id, volume))
    }

    pub fn volume(&self) -> Result<f32> {
        self.engine.with_runtime(|rt| Ok(rt.wave(self.id)?.volume))
    }

    pub fn set_matrix_coefficients(
        &self,
        src_channels: u32,
        dst_channels: u32,
        coefficients: &[f32],
    ) -> Result<()> {
        let matrix = ChannelMatrix::new(src_channels, dst_channels, coefficients)?;
        self.engine
            .with_runtime_mut(|rt| rt.set_wave_matrix(self.id, matrix))
    }

    pub fn get_matrix_coefficients(&self) -> Result<ChannelMatrix> {
        self.engine
            .with_runtime(|rt| Ok(rt.wave(self.id)?.matrix.clone()))
    }

    pub fn get_properties(&self) -> Result<WaveInstanceProperties> {
        self.engine.with_runtime(|rt| {
            let wave = rt.wave(self.id)?;
            let bank = wave
                .bank
                .ok_or_else(|| SonicueError::lifecycle(format!("{} has no wave bank", self.id)))?;
            let entry = rt.wave_entry(bank, wave.index)?;
            Ok(WaveInstanceProperties {
                wave: WaveProperties {
                    name: entry.name.clone(),
                    channels: entry.channels,
                    sample_rate: entry.sample_rate,
                    duration_samples: entry.duration_samples,
                    loop_region: entry.loop_region,
                    streaming: rt.wave_bank(bank)?.stream.is_some(),
                },
                background_music: wave.background_music,
                initial_position: wave.initial_position,
                loop_count: wave.loop_count,
            })
        })
    }

    pub fn destroy(self) -> Result<()> {
        self.engine.with_runtime_mut(|rt| {
            rt.wave(self.id)?;
            rt.destroy_wave(self.id);
            Ok(())
        })
    }
}

impl std::fmt::Debug for Wave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wave")
            .field("id", &self.id)
            .field("index", &self.index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{StopFlags, WavePrepareFlags};
    use crate::events::{Notification, NotificationKind};
    use crate::notification::{NotificationDescription, NotificationTarget};
    use crate::test_content::{self, WAVE_BANK};

    #[test]
    fn test_pitch_and_volume_clamp() {
        let engine = test_content::engine();
        let bank = engine.create_in_memory_wave_bank(WAVE_BANK, 0).unwrap();
        let wave = bank.prepare(0, WavePrepareFlags::empty(), 0, 0).unwrap();
        assert_eq!(wave.volume().unwrap(), 1.0);
        assert_eq!(wave.pitch().unwrap(), 0);

        wave.set_pitch(3000).unwrap();
        assert_eq!(wave.pitch().unwrap(), 2400);
        wave.set_pitch(-3000).unwrap();
        assert_eq!(wave.pitch().unwrap(), -2400);

        wave.set_volume(-1.0).unwrap();
        assert_eq!(wave.volume().unwrap(), 0.0);
        wave.set_volume(1.0e9).unwrap();
        assert_eq!(wave.volume().unwrap(), 16_777_216.0);
        assert!(wave.set_volume(f32::NAN).is_err());
    }

    #[test]
    fn test_stop_notification_after_release() {
        let engine = test_content::engine();
        let bank = engine.create_in_memory_wave_bank(WAVE_BANK, 0).unwrap();
        let wave = bank.prepare(1, WavePrepareFlags::BACKGROUND_MUSIC, 0, 2).unwrap();
        let properties = wave.get_properties().unwrap();
        assert!(properties.background_music);
        assert_eq!(properties.loop_count, 2);

        engine
            .register_notification(
                &NotificationDescription::new(NotificationTarget::WaveStop(&wave))
                    .persistent()
                    .with_context(3),
            )
            .unwrap();

        wave.play().unwrap();
        wave.stop(StopFlags::RELEASE).unwrap();
        assert!(engine.poll_notifications().unwrap().is_empty());
        engine.do_work().unwrap();
        assert_eq!(
            engine.poll_notifications().unwrap(),
            vec![Notification::WaveStop {
                context: 3,
                wave_index: 1
            }]
        );

        wave.destroy().unwrap();
        let kinds: Vec<_> = engine
            .poll_notifications()
            .unwrap()
            .iter()
            .map(Notification::kind)
            .collect();
        assert!(!kinds.contains(&NotificationKind::WaveStop));
    }

    #[test]
    fn test_default_matrix_and_override() {
        let engine = test_content::engine();
        let bank = engine.create_in_memory_wave_bank(WAVE_BANK, 0).unwrap();
        let wave = bank.prepare(0, WavePrepareFlags::empty(), 0, 0).unwrap();
        assert_eq!(wave.get_matrix_coefficients().unwrap().coefficients(), &[1.0, 1.0]);
        wave.set_matrix_coefficients(1, 2, &[0.25, 0.75]).unwrap();
        assert_eq!(
            wave.get_matrix_coefficients().unwrap().coefficients(),
            &[0.25, 0.75]
        );
        assert!(wave.set_matrix_coefficients(1, 1, &[1.0]).is_err());
    }
}
