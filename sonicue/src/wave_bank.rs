use crate::config::{HandleMode, StopFlags, WavePrepareFlags};
use crate::content::LoopRegion;
use crate::engine::EngineShared;
use crate::error::Result;
use crate::graph::WaveBankId;
use crate::notification::check_same_engine;
use crate::state::StateFlags;
use crate::wave::Wave;
use std::rc::Rc;

/// Static description of one wave in a wave bank.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveProperties {
    pub name: Option<String>,
    pub channels: u16,
    pub sample_rate: u32,
    pub duration_samples: u32,
    pub loop_region: LoopRegion,
    pub streaming: bool,
}

/// Handle to a loaded wave bank, in memory or streaming.
pub struct WaveBank {
    engine: Rc<EngineShared>,
    id: WaveBankId,
}

impl WaveBank {
    pub(crate) fn new(engine: Rc<EngineShared>, id: WaveBankId) -> Self {
        Self { engine, id }
    }

    pub fn id(&self) -> WaveBankId {
        self.id
    }

    pub(crate) fn attached_id(&self, engine: &Rc<EngineShared>) -> Result<WaveBankId> {
        check_same_engine(&self.engine, engine)?;
        self.engine
            .with_runtime(|rt| rt.wave_bank(self.id).map(|_| self.id))
    }

    pub fn get_num_waves(&self) -> Result<u16> {
        self.engine
            .with_runtime(|rt| Ok(rt.wave_bank(self.id)?.data.entries.len() as u16))
    }

    /// Index of the wave named `name`. Unnamed entries never match.
    pub fn get_wave_index(&self, name: &str) -> Result<Option<u16>> {
        self.engine.with_runtime(|rt| rt.lookup_wave(self.id, name))
    }

    pub fn get_wave_properties(&self, index: u16) -> Result<WaveProperties> {
        self.engine.with_runtime(|rt| {
            let entry = rt.wave_entry(self.id, index)?;
            Ok(WaveProperties {
                name: entry.name.clone(),
                channels: entry.channels,
                sample_rate: entry.sample_rate,
                duration_samples: entry.duration_samples,
                loop_region: entry.loop_region,
                streaming: rt.wave_bank(self.id)?.stream.is_some(),
            })
        })
    }

    /// Creates a prepared wave.
    ///
    /// # Arguments
    ///
    /// * `index` - Wave index within this bank
    /// * `flags` - Offset units and the background-music marker
    /// * `play_offset` - Start position, in samples unless `UNITS_MS` is set
    /// * `loop_count` - Extra passes through the loop region
    pub fn prepare(
        &self,
        index: u16,
        flags: WavePrepareFlags,
        play_offset: u32,
        loop_count: u8,
    ) -> Result<Wave> {
        let id = self.engine.with_runtime_mut(|rt| {
            rt.prepare_wave(self.id, index, flags, play_offset, loop_count, false)
        })?;
        Ok(Wave::new(Rc::clone(&self.engine), id, index))
    }

    pub fn play(
        &self,
        index: u16,
        flags: WavePrepareFlags,
        play_offset: u32,
        loop_count: u8,
        mode: HandleMode,
    ) -> Result<Option<Wave>> {
        let managed = mode == HandleMode::FireAndForget;
        let id = self.engine.with_runtime_mut(|rt| {
            rt.play_wave_from_bank(self.id, index, flags, play_offset, loop_count, managed)
        })?;
        Ok((!managed).then(|| Wave::new(Rc::clone(&self.engine), id, index)))
    }

    pub fn stop(&self, index: u16, flags: StopFlags) -> Result<()> {
        self.engine
            .with_runtime_mut(|rt| rt.stop_wave_in_bank(self.id, index, flags))
    }

    pub fn get_state(&self) -> Result<StateFlags> {
        self.engine.with_runtime(|rt| rt.wave_bank_state(self.id))
    }

    /// Unloads the bank and closes its stream, if any.
    pub fn destroy(self) -> Result<()> {
        self.engine.with_runtime_mut(|rt| {
            rt.wave_bank(self.id)?;
            rt.destroy_wave_bank(self.id);
            Ok(())
        })
    }
}

impl std::fmt::Debug for WaveBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveBank").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamingParameters;
    use crate::error::SonicueError;
    use crate::test_content::{self, WAVE_BANK};
    use std::io::Cursor;

    #[test]
    fn test_lookup_and_properties() {
        let engine = test_content::engine();
        let bank = engine.create_in_memory_wave_bank(WAVE_BANK, 0).unwrap();
        assert_eq!(bank.get_num_waves().unwrap(), 2);
        assert_eq!(bank.get_wave_index("boom").unwrap(), Some(0));
        assert_eq!(bank.get_wave_index("rain").unwrap(), None);

        let properties = bank.get_wave_properties(1).unwrap();
        assert_eq!(properties.channels, 2);
        assert_eq!(properties.sample_rate, 44_100);
        assert!(!properties.streaming);
        assert!(bank.get_wave_properties(2).is_err());
    }

    #[test]
    fn test_streaming_bank_reads_from_offset() {
        let engine = test_content::engine();
        let mut file = b"padding!".to_vec();
        file.extend_from_slice(WAVE_BANK);
        let params = StreamingParameters::new(Box::new(Cursor::new(file))).with_offset(8);
        let bank = engine.create_streaming_wave_bank(params).unwrap();
        assert!(bank.get_wave_properties(0).unwrap().streaming);

        let params = StreamingParameters::new(Box::new(Cursor::new(WAVE_BANK.to_vec())));
        let params = StreamingParameters {
            packet_size: 0,
            ..params
        };
        assert!(matches!(
            engine.create_streaming_wave_bank(params),
            Err(SonicueError::InvalidArgument(_))
        ));
        bank.destroy().unwrap();
    }

    #[test]
    fn test_prepare_and_in_use() {
        let engine = test_content::engine();
        let bank = engine.create_in_memory_wave_bank(WAVE_BANK, 0).unwrap();
        let wave = bank.prepare(0, WavePrepareFlags::UNITS_MS, 500, 0).unwrap();
        assert_eq!(wave.get_properties().unwrap().initial_position, 24_000);
        assert!(bank.get_state().unwrap().contains(StateFlags::IN_USE));

        wave.destroy().unwrap();
        assert!(!bank.get_state().unwrap().contains(StateFlags::IN_USE));
        assert!(bank.prepare(5, WavePrepareFlags::empty(), 0, 0).is_err());
    }

    #[test]
    fn test_stop_and_destroy() {
        let engine = test_content::engine();
        let bank = engine.create_in_memory_wave_bank(WAVE_BANK, 0).unwrap();
        let flags = WavePrepareFlags::empty();
        let held = bank.play(1, flags, 0, 0, HandleMode::Wrap).unwrap().unwrap();
        assert!(bank.play(1, flags, 0, 0, HandleMode::FireAndForget).unwrap().is_none());

        bank.stop(1, StopFlags::IMMEDIATE).unwrap();
        assert_eq!(held.get_state().unwrap(), StateFlags::STOPPED);

        held.play().unwrap();
        bank.destroy().unwrap();
        assert_eq!(held.get_state().unwrap(), StateFlags::STOPPED);
        assert!(matches!(
            held.get_properties(),
            Err(SonicueError::LifecycleViolation(_))
        ));
        held.destroy().unwrap();
    }
}
