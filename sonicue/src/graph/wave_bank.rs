use super::{Runtime, Subscription, Target, WaveBankId, WaveBankNode, WaveId, WaveNode};
use crate::config::{StopFlags, StreamingParameters, WavePrepareFlags};
use crate::content::{IoStream, WaveBankData, WaveEntry};
use crate::error::{Result, SonicueError};
use crate::events::Notification;
use crate::matrix::ChannelMatrix;
use crate::state::StateFlags;
use std::io::SeekFrom;

impl Runtime {
    pub fn create_in_memory_wave_bank(&mut self, buffer: &[u8], flags: u32) -> Result<WaveBankId> {
        if flags != 0 {
            return Err(SonicueError::invalid(format!(
                "unsupported wave bank flags {flags:#x}"
            )));
        }
        let data = self.decoder.decode_wave_bank(buffer)?;
        Ok(self.insert_wave_bank(data, None))
    }

    pub fn create_streaming_wave_bank(
        &mut self,
        params: StreamingParameters,
    ) -> Result<WaveBankId> {
        if params.packet_size == 0 {
            return Err(SonicueError::invalid("streaming packet size is zero"));
        }
        if params.flags != 0 {
            return Err(SonicueError::invalid(format!(
                "unsupported wave bank flags {:#x}",
                params.flags
            )));
        }
        let mut stream = IoStream::new(params.file);
        stream.seek(SeekFrom::Start(params.offset))?;
        let data = self.decoder.decode_streaming_wave_bank(&mut stream)?;
        log::debug!(
            "Streaming wave bank '{}' uses {}ms look-ahead, packet size {}",
            data.name,
            self.lookahead_ms,
            params.packet_size
        );
        Ok(self.insert_wave_bank(data, Some(stream)))
    }

    fn insert_wave_bank(&mut self, data: WaveBankData, stream: Option<IoStream>) -> WaveBankId {
        let id = WaveBankId(self.allocate_id());
        log::info!(
            "Created {id} '{}' with {} waves{}",
            data.name,
            data.entries.len(),
            if stream.is_some() { " (streaming)" } else { "" }
        );
        self.wave_banks.insert(
            id,
            WaveBankNode {
                entry_refs: vec![0; data.entries.len()],
                data,
                waves: Vec::new(),
                stream,
            },
        );
        id
    }

    pub fn wave_bank(&self, id: WaveBankId) -> Result<&WaveBankNode> {
        self.wave_banks
            .get(&id)
            .ok_or_else(|| SonicueError::lifecycle(format!("{id} has been destroyed")))
    }

    pub fn wave_entry(&self, bank: WaveBankId, index: u16) -> Result<&WaveEntry> {
        self.wave_bank(bank)?
            .data
            .entries
            .get(usize::from(index))
            .ok_or_else(|| SonicueError::invalid(format!("wave index {index} out of range")))
    }

    pub fn lookup_wave(&self, bank: WaveBankId, name: &str) -> Result<Option<u16>> {
        Ok(self
            .wave_bank(bank)?
            .data
            .entries
            .iter()
            .position(|entry| entry.name.as_deref() == Some(name))
            .map(|index| index as u16))
    }

    pub fn wave_bank_state(&self, bank: WaveBankId) -> Result<StateFlags> {
        let node = self.wave_bank(bank)?;
        let mut state = StateFlags::PREPARED;
        if node.entry_refs.iter().any(|refs| *refs > 0) {
            state.insert(StateFlags::IN_USE);
        }
        Ok(state)
    }

    pub fn prepare_wave(
        &mut self,
        bank: WaveBankId,
        index: u16,
        flags: WavePrepareFlags,
        play_offset: u32,
        loop_count: u8,
        managed: bool,
    ) -> Result<WaveId> {
        let entry = self.wave_entry(bank, index)?;
        let initial_position = if flags.contains(WavePrepareFlags::UNITS_MS) {
            ((entry.sample_rate as f32 / 1000.0) * play_offset as f32) as u32
        } else {
            play_offset
        };
        let matrix =
            ChannelMatrix::passthrough(u32::from(entry.channels).max(1), self.format.channel_count);

        let id = WaveId(self.allocate_id());
        self.waves.insert(
            id,
            WaveNode {
                bank: Some(bank),
                index,
                managed,
                state: StateFlags::PREPARED,
                background_music: flags.contains(WavePrepareFlags::BACKGROUND_MUSIC),
                volume: 1.0,
                pitch: 0,
                initial_position,
                loop_count,
                matrix,
            },
        );
        if let Some(node) = self.wave_banks.get_mut(&bank) {
            node.entry_refs[usize::from(index)] += 1;
            node.waves.push(id);
        }
        log::debug!("Prepared {id} from {bank} wave {index}");
        Ok(id)
    }

    pub fn play_wave_from_bank(
        &mut self,
        bank: WaveBankId,
        index: u16,
        flags: WavePrepareFlags,
        play_offset: u32,
        loop_count: u8,
        managed: bool,
    ) -> Result<WaveId> {
        let id = self.prepare_wave(bank, index, flags, play_offset, loop_count, managed)?;
        if let Err(err) = self.play_wave(id) {
            self.destroy_wave(id);
            return Err(err);
        }
        Ok(id)
    }

    pub fn stop_wave_in_bank(
        &mut self,
        bank: WaveBankId,
        index: u16,
        flags: StopFlags,
    ) -> Result<()> {
        self.wave_entry(bank, index)?;
        let instances: Vec<WaveId> = self
            .wave_bank(bank)?
            .waves
            .iter()
            .copied()
            .filter(|id| self.waves.get(id).is_some_and(|wave| wave.index == index))
            .collect();
        for id in instances {
            let managed = self.waves.get(&id).is_some_and(|wave| wave.managed);
            if managed && flags.contains(StopFlags::IMMEDIATE) {
                self.destroy_wave(id);
            } else {
                self.stop_wave(id, flags)?;
            }
        }
        Ok(())
    }

    pub fn destroy_wave_bank(&mut self, bank: WaveBankId) {
        let Some(waves) = self.wave_banks.get(&bank).map(|node| node.waves.clone()) else {
            return;
        };
        for id in waves {
            let managed = self.waves.get(&id).is_some_and(|wave| wave.managed);
            if managed {
                self.destroy_wave(id);
            } else {
                self.force_stop_wave(id);
                if let Some(wave) = self.waves.get_mut(&id) {
                    wave.bank = None;
                }
            }
        }
        if let Some(mut node) = self.wave_banks.remove(&bank) {
            if let Some(stream) = node.stream.as_mut() {
                stream.close();
            }
            log::info!("Destroyed {bank} '{}'", node.data.name);
        }
        self.notifications
            .fire(Subscription::WaveBankDestroyed(bank), |context| {
                Notification::WaveBankDestroyed { context }
            });
        self.notifications.forget(Target::WaveBank(bank));
    }
}
