use super::{Runtime, Subscription, Target, WaveId, WaveNode};
use crate::config::StopFlags;
use crate::error::{Result, SonicueError};
use crate::events::Notification;
use crate::matrix::ChannelMatrix;
use crate::state::StateFlags;

pub(crate) const MIN_PITCH: i16 = -2400;
pub(crate) const MAX_PITCH: i16 = 2400;
pub(crate) const MAX_VOLUME: f32 = 16_777_216.0;

impl Runtime {
    pub fn wave(&self, id: WaveId) -> Result<&WaveNode> {
        self.waves
            .get(&id)
            .ok_or_else(|| SonicueError::lifecycle(format!("{id} has been destroyed")))
    }

    fn wave_mut(&mut self, id: WaveId) -> Result<&mut WaveNode> {
        self.waves
            .get_mut(&id)
            .ok_or_else(|| SonicueError::lifecycle(format!("{id} has been destroyed")))
    }

    pub fn play_wave(&mut self, id: WaveId) -> Result<()> {
        let wave = self.wave_mut(id)?;
        if wave.state.intersects(StateFlags::PLAYING | StateFlags::STOPPING) {
            return Err(SonicueError::invalid(format!("{id} is already playing")));
        }
        wave.state.remove(StateFlags::PREPARED | StateFlags::PAUSED | StateFlags::STOPPED);
        wave.state.insert(StateFlags::PLAYING);
        log::debug!("Playing {id}");
        Ok(())
    }

    pub fn stop_wave(&mut self, id: WaveId, flags: StopFlags) -> Result<()> {
        let wave = self.wave_mut(id)?;
        if wave.state.contains(StateFlags::STOPPED) {
            return Ok(());
        }
        if flags.contains(StopFlags::IMMEDIATE) || wave.state.contains(StateFlags::PAUSED) {
            self.finish_wave_stop(id);
        } else {
            wave.state.insert(StateFlags::STOPPING);
        }
        Ok(())
    }

    pub(crate) fn force_stop_wave(&mut self, id: WaveId) {
        if self
            .waves
            .get(&id)
            .is_some_and(|wave| !wave.state.contains(StateFlags::STOPPED))
        {
            self.finish_wave_stop(id);
        }
    }

    pub(crate) fn finish_wave_stop(&mut self, id: WaveId) {
        let Some(wave) = self.waves.get_mut(&id) else {
            return;
        };
        wave.state = StateFlags::STOPPED;
        let index = wave.index;
        log::debug!("Stopped {id}");
        self.notifications
            .fire(Subscription::WaveStop(id), |context| Notification::WaveStop {
                context,
                wave_index: index,
            });
    }

    pub fn pause_wave(&mut self, id: WaveId, paused: bool) -> Result<()> {
        let wave = self.wave_mut(id)?;
        if wave.state.intersects(StateFlags::STOPPING | StateFlags::STOPPED) {
            return Ok(());
        }
        if paused {
            wave.state.insert(StateFlags::PAUSED);
        } else {
            wave.state.remove(StateFlags::PAUSED);
        }
        Ok(())
    }

    pub fn set_wave_pitch(&mut self, id: WaveId, pitch: i16) -> Result<()> {
        self.wave_mut(id)?.pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
        Ok(())
    }

    pub fn set_wave_volume(&mut self, id: WaveId, volume: f32) -> Result<()> {
        if volume.is_nan() {
            return Err(SonicueError::invalid("volume is NaN"));
        }
        self.wave_mut(id)?.volume = volume.clamp(0.0, MAX_VOLUME);
        Ok(())
    }

    pub fn set_wave_matrix(&mut self, id: WaveId, matrix: ChannelMatrix) -> Result<()> {
        let output = self.format.channel_count;
        if matrix.dst_channels() != output {
            return Err(SonicueError::invalid(format!(
                "matrix has {} destination channels, output has {output}",
                matrix.dst_channels()
            )));
        }
        self.wave_mut(id)?.matrix = matrix;
        Ok(())
    }

    pub fn destroy_wave(&mut self, id: WaveId) {
        if !self.waves.contains_key(&id) {
            return;
        }
        self.force_stop_wave(id);
        let Some(wave) = self.waves.remove(&id) else {
            return;
        };
        if let Some(node) = wave.bank.and_then(|bank| self.wave_banks.get_mut(&bank)) {
            node.waves.retain(|other| *other != id);
            let refs = &mut node.entry_refs[usize::from(wave.index)];
            *refs = refs.saturating_sub(1);
        }
        log::debug!("Destroyed {id}");
        self.notifications
            .fire(Subscription::WaveDestroyed(id), |context| {
                Notification::WaveDestroyed {
                    context,
                    wave_index: wave.index,
                }
            });
        self.notifications.forget(Target::Wave(id));
    }
}
