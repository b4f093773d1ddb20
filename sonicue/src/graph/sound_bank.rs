use super::{CueId, CueNode, Runtime, SoundBankId, SoundBankNode, Subscription, Target};
use crate::config::StopFlags;
use crate::content::CueDefinition;
use crate::error::{Result, SonicueError};
use crate::events::Notification;
use crate::matrix::ChannelMatrix;
use crate::sound_bank::CueProperties;
use crate::state::StateFlags;

impl Runtime {
    pub fn create_sound_bank(&mut self, buffer: &[u8], flags: u32) -> Result<SoundBankId> {
        if flags != 0 {
            return Err(SonicueError::invalid(format!(
                "unsupported sound bank flags {flags:#x}"
            )));
        }
        let data = self.decoder.decode_sound_bank(buffer)?;
        let categories = self.tables.categories().len();
        if let Some(cue) = data
            .cues
            .iter()
            .find(|cue| usize::from(cue.category) >= categories)
        {
            return Err(SonicueError::invalid(format!(
                "cue '{}' references unknown category {}",
                cue.name, cue.category
            )));
        }
        if data.cues.len() > usize::from(u16::MAX) {
            return Err(SonicueError::invalid("sound bank has too many cues"));
        }

        let id = SoundBankId(self.allocate_id());
        log::info!("Created {id} '{}' with {} cues", data.name, data.cues.len());
        self.sound_banks.insert(
            id,
            SoundBankNode {
                instance_counts: vec![0; data.cues.len()],
                data,
                cues: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn sound_bank(&self, id: SoundBankId) -> Result<&SoundBankNode> {
        self.sound_banks
            .get(&id)
            .ok_or_else(|| SonicueError::lifecycle(format!("{id} has been destroyed")))
    }

    pub fn cue_definition(&self, bank: SoundBankId, index: u16) -> Result<&CueDefinition> {
        self.sound_bank(bank)?
            .data
            .cues
            .get(usize::from(index))
            .ok_or_else(|| SonicueError::invalid(format!("cue index {index} out of range")))
    }

    pub fn cue_properties(&self, bank: SoundBankId, index: u16) -> Result<CueProperties> {
        let definition = self.cue_definition(bank, index)?;
        Ok(CueProperties {
            name: definition.name.clone(),
            category: definition.category,
            channels: definition.channels,
            interactive: definition.interactive,
            max_instances: definition.max_instances,
            current_instances: self.sound_bank(bank)?.instance_counts[usize::from(index)],
        })
    }

    pub fn lookup_cue(&self, bank: SoundBankId, name: &str) -> Result<Option<u16>> {
        Ok(self
            .sound_bank(bank)?
            .data
            .cues
            .iter()
            .position(|cue| cue.name == name)
            .map(|index| index as u16))
    }

    pub fn sound_bank_state(&self, bank: SoundBankId) -> Result<StateFlags> {
        let node = self.sound_bank(bank)?;
        let mut state = StateFlags::PREPARED;
        if node.instance_counts.iter().any(|count| *count > 0) {
            state.insert(StateFlags::IN_USE);
        }
        Ok(state)
    }

    /// Builds a prepared cue. A failure leaves nothing registered.
    pub fn prepare_cue(
        &mut self,
        bank: SoundBankId,
        index: u16,
        flags: u32,
        time_offset_ms: i32,
        managed: bool,
    ) -> Result<CueId> {
        if flags != 0 {
            return Err(SonicueError::invalid(format!(
                "unsupported cue prepare flags {flags:#x}"
            )));
        }
        let definition = self.cue_definition(bank, index)?;
        let category = definition.category;
        let src_channels = u32::from(definition.channels).max(1);
        let matrix = ChannelMatrix::passthrough(src_channels, self.format.channel_count);
        let variables = self
            .tables
            .variables()
            .iter()
            .map(|v| v.initial_value)
            .collect();

        let id = CueId(self.allocate_id());
        self.cues.insert(
            id,
            CueNode {
                bank: Some(bank),
                index,
                category,
                managed,
                state: StateFlags::PREPARED,
                active: false,
                time_offset_ms,
                variables,
                matrix,
            },
        );
        if let Some(node) = self.sound_banks.get_mut(&bank) {
            node.cues.push(id);
        }
        log::debug!("Prepared {id} from {bank} cue {index}");
        Ok(id)
    }

    /// Prepares and starts a cue. If starting fails the prepared cue is
    /// destroyed again.
    pub fn play_cue_from_bank(
        &mut self,
        bank: SoundBankId,
        index: u16,
        flags: u32,
        time_offset_ms: i32,
        managed: bool,
    ) -> Result<CueId> {
        let id = self.prepare_cue(bank, index, flags, time_offset_ms, managed)?;
        if let Err(err) = self.play_cue(id) {
            self.destroy_cue(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Stops every instance of one cue definition. Fire-and-forget instances
    /// stopped immediately are destroyed.
    pub fn stop_cue_in_bank(
        &mut self,
        bank: SoundBankId,
        index: u16,
        flags: StopFlags,
    ) -> Result<()> {
        self.cue_definition(bank, index)?;
        let instances: Vec<CueId> = self
            .sound_bank(bank)?
            .cues
            .iter()
            .copied()
            .filter(|id| self.cues.get(id).is_some_and(|cue| cue.index == index))
            .collect();
        for id in instances {
            let managed = self.cues.get(&id).is_some_and(|cue| cue.managed);
            if managed && flags.contains(StopFlags::IMMEDIATE) {
                self.destroy_cue(id);
            } else {
                self.stop_cue(id, flags)?;
            }
        }
        Ok(())
    }

    /// Destroys the bank. Its fire-and-forget cues go with it; cues the
    /// caller still holds are stopped and detached.
    pub fn destroy_sound_bank(&mut self, bank: SoundBankId) {
        let Some(cues) = self.sound_banks.get(&bank).map(|node| node.cues.clone()) else {
            return;
        };
        for id in cues {
            let managed = self.cues.get(&id).is_some_and(|cue| cue.managed);
            if managed {
                self.destroy_cue(id);
            } else {
                self.force_stop_cue(id);
                if let Some(cue) = self.cues.get_mut(&id) {
                    cue.bank = None;
                }
            }
        }
        if let Some(node) = self.sound_banks.remove(&bank) {
            log::info!("Destroyed {bank} '{}'", node.data.name);
        }
        self.notifications
            .fire(Subscription::SoundBankDestroyed(bank), |context| {
                Notification::SoundBankDestroyed { context }
            });
        self.notifications.forget(Target::SoundBank(bank));
    }
}
