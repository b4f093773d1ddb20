use super::{CueId, CueNode, Runtime, SoundBankId, Subscription, Target};
use crate::config::StopFlags;
use crate::content::InstanceBehavior;
use crate::error::{Result, SonicueError};
use crate::events::Notification;
use crate::matrix::ChannelMatrix;
use crate::state::StateFlags;

/// Read-only variable reporting how many instances of the cue are playing.
pub(crate) const NUM_CUE_INSTANCES: &str = "NumCueInstances";

impl Runtime {
    pub fn cue(&self, id: CueId) -> Result<&CueNode> {
        self.cues
            .get(&id)
            .ok_or_else(|| SonicueError::lifecycle(format!("{id} has been destroyed")))
    }

    fn cue_mut(&mut self, id: CueId) -> Result<&mut CueNode> {
        self.cues
            .get_mut(&id)
            .ok_or_else(|| SonicueError::lifecycle(format!("{id} has been destroyed")))
    }

    pub fn play_cue(&mut self, id: CueId) -> Result<()> {
        let cue = self.cue(id)?;
        if cue.state.intersects(StateFlags::PLAYING | StateFlags::STOPPING) {
            return Err(SonicueError::invalid(format!("{id} is already playing")));
        }
        let (bank, index) = (cue.bank, cue.index);
        if let Some(bank) = bank {
            self.make_room_for_instance(bank, index, id)?;
        }
        let cue = self.cue_mut(id)?;
        cue.state.remove(StateFlags::PREPARED | StateFlags::PAUSED | StateFlags::STOPPED);
        cue.state.insert(StateFlags::PLAYING);
        cue.active = true;
        if let Some(node) = bank.and_then(|bank| self.sound_banks.get_mut(&bank)) {
            node.instance_counts[usize::from(index)] += 1;
        }
        log::debug!("Playing {id}");
        Ok(())
    }

    /// Applies the cue definition's instance limit before `id` starts.
    fn make_room_for_instance(&mut self, bank: SoundBankId, index: u16, id: CueId) -> Result<()> {
        let node = self.sound_bank(bank)?;
        let definition = self.cue_definition(bank, index)?;
        if node.instance_counts[usize::from(index)] < u32::from(definition.max_instances) {
            return Ok(());
        }
        if definition.instance_behavior == InstanceBehavior::Fail {
            return Err(SonicueError::invalid(format!(
                "cue '{}' already has {} instances playing",
                definition.name, definition.max_instances
            )));
        }
        let oldest = node.cues.iter().copied().find(|other| {
            *other != id
                && self
                    .cues
                    .get(other)
                    .is_some_and(|cue| cue.index == index && cue.active)
        });
        if let Some(oldest) = oldest {
            log::debug!("Replacing {oldest} with {id}");
            self.finish_cue_stop(oldest);
        }
        Ok(())
    }

    /// Immediate stops (and stops of paused cues) finish at once; otherwise
    /// the cue is left stopping until the next `do_work`.
    pub fn stop_cue(&mut self, id: CueId, flags: StopFlags) -> Result<()> {
        let cue = self.cue_mut(id)?;
        if cue.state.contains(StateFlags::STOPPED) {
            return Ok(());
        }
        if flags.contains(StopFlags::IMMEDIATE) || cue.state.contains(StateFlags::PAUSED) {
            self.finish_cue_stop(id);
        } else {
            cue.state.insert(StateFlags::STOPPING);
        }
        Ok(())
    }

    pub(crate) fn force_stop_cue(&mut self, id: CueId) {
        if self
            .cues
            .get(&id)
            .is_some_and(|cue| !cue.state.contains(StateFlags::STOPPED))
        {
            self.finish_cue_stop(id);
        }
    }

    pub(crate) fn finish_cue_stop(&mut self, id: CueId) {
        let Some(cue) = self.cues.get_mut(&id) else {
            return;
        };
        cue.state = StateFlags::STOPPED;
        let was_active = std::mem::replace(&mut cue.active, false);
        let (bank, index) = (cue.bank, cue.index);
        if was_active {
            if let Some(node) = bank.and_then(|bank| self.sound_banks.get_mut(&bank)) {
                let count = &mut node.instance_counts[usize::from(index)];
                *count = count.saturating_sub(1);
            }
        }
        log::debug!("Stopped {id}");
        self.notifications
            .fire(Subscription::CueStop(id), |context| Notification::CueStop {
                context,
                cue_index: index,
            });
    }

    /// Pausing a stopping or stopped cue is ignored.
    pub fn pause_cue(&mut self, id: CueId, paused: bool) -> Result<()> {
        let cue = self.cue_mut(id)?;
        if cue.state.intersects(StateFlags::STOPPING | StateFlags::STOPPED) {
            return Ok(());
        }
        if paused {
            cue.state.insert(StateFlags::PAUSED);
        } else {
            cue.state.remove(StateFlags::PAUSED);
        }
        Ok(())
    }

    pub fn destroy_cue(&mut self, id: CueId) {
        if !self.cues.contains_key(&id) {
            return;
        }
        self.force_stop_cue(id);
        let Some(cue) = self.cues.remove(&id) else {
            return;
        };
        if let Some(node) = cue.bank.and_then(|bank| self.sound_banks.get_mut(&bank)) {
            node.cues.retain(|other| *other != id);
        }
        log::debug!("Destroyed {id}");
        self.notifications
            .fire(Subscription::CueDestroyed(id), |context| {
                Notification::CueDestroyed {
                    context,
                    cue_index: cue.index,
                }
            });
        self.notifications.forget(Target::Cue(id));
    }

    pub fn set_cue_matrix(&mut self, id: CueId, matrix: ChannelMatrix) -> Result<()> {
        let output = self.format.channel_count;
        if matrix.dst_channels() != output {
            return Err(SonicueError::invalid(format!(
                "matrix has {} destination channels, output has {output}",
                matrix.dst_channels()
            )));
        }
        self.cue_mut(id)?.matrix = matrix;
        Ok(())
    }

    pub fn lookup_cue_variable(&self, id: CueId, name: &str) -> Result<Option<u16>> {
        self.cue(id)?;
        Ok(self.tables.instance_variable(name))
    }

    /// Checks that `index` names a public, writable cue-instance variable.
    pub fn check_cue_variable_writable(&self, index: u16) -> Result<()> {
        let desc = self
            .tables
            .variable(index)
            .ok_or_else(|| SonicueError::invalid(format!("variable index {index} out of range")))?;
        if !desc.access.cue_instance {
            return Err(SonicueError::invalid(format!(
                "variable '{}' is global, not per-cue",
                desc.name
            )));
        }
        if !desc.access.public || desc.access.read_only {
            return Err(SonicueError::invalid(format!(
                "variable '{}' is not writable",
                desc.name
            )));
        }
        Ok(())
    }

    pub fn set_cue_variable(&mut self, id: CueId, index: u16, value: f32) -> Result<()> {
        self.cue(id)?;
        self.check_cue_variable_writable(index)?;
        let value = self.tables.variables()[usize::from(index)].clamp(value);
        self.cue_mut(id)?.variables[usize::from(index)] = value;
        Ok(())
    }

    pub fn cue_variable(&self, id: CueId, index: u16) -> Result<f32> {
        let cue = self.cue(id)?;
        let desc = self
            .tables
            .variable(index)
            .ok_or_else(|| SonicueError::invalid(format!("variable index {index} out of range")))?;
        if !desc.access.cue_instance {
            return Err(SonicueError::invalid(format!(
                "variable '{}' is global, not per-cue",
                desc.name
            )));
        }
        if desc.name == NUM_CUE_INSTANCES {
            let count = cue
                .bank
                .and_then(|bank| self.sound_banks.get(&bank))
                .map_or(0, |node| node.instance_counts[usize::from(cue.index)]);
            return Ok(count as f32);
        }
        Ok(cue.variables[usize::from(index)])
    }
}
