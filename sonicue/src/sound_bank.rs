use crate::config::{HandleMode, StopFlags};
use crate::cue::Cue;
use crate::engine::EngineShared;
use crate::error::Result;
use crate::graph::SoundBankId;
use crate::notification::check_same_engine;
use crate::spatial::{self, DspSettings};
use crate::state::StateFlags;
use std::rc::Rc;

/// Static description of one cue in a sound bank.
#[derive(Debug, Clone, PartialEq)]
pub struct CueProperties {
    pub name: String,
    pub category: u16,
    pub channels: u16,
    pub interactive: bool,
    pub max_instances: u8,
    pub current_instances: u32,
}

/// Handle to a loaded sound bank.
///
/// Dropping the handle does not unload the bank; call
/// [`destroy`](Self::destroy).
pub struct SoundBank {
    engine: Rc<EngineShared>,
    id: SoundBankId,
}

impl SoundBank {
    pub(crate) fn new(engine: Rc<EngineShared>, id: SoundBankId) -> Self {
        Self { engine, id }
    }

    pub fn id(&self) -> SoundBankId {
        self.id
    }

    pub(crate) fn attached_id(&self, engine: &Rc<EngineShared>) -> Result<SoundBankId> {
        check_same_engine(&self.engine, engine)?;
        self.engine
            .with_runtime(|rt| rt.sound_bank(self.id).map(|_| self.id))
    }

    /// Index of the cue named `name`, or None.
    pub fn get_cue_index(&self, name: &str) -> Result<Option<u16>> {
        self.engine.with_runtime(|rt| rt.lookup_cue(self.id, name))
    }

    pub fn get_num_cues(&self) -> Result<u16> {
        self.engine
            .with_runtime(|rt| Ok(rt.sound_bank(self.id)?.data.cues.len() as u16))
    }

    pub fn get_cue_properties(&self, index: u16) -> Result<CueProperties> {
        self.engine
            .with_runtime(|rt| rt.cue_properties(self.id, index))
    }

    /// Creates a prepared, not yet playing, cue.
    ///
    /// # Arguments
    ///
    /// * `index` - Cue index within this bank
    /// * `flags` - Must be zero
    /// * `time_offset_ms` - Start offset into the cue
    pub fn prepare(&self, index: u16, flags: u32, time_offset_ms: i32) -> Result<Cue> {
        let id = self
            .engine
            .with_runtime_mut(|rt| rt.prepare_cue(self.id, index, flags, time_offset_ms, false))?;
        Ok(Cue::new(Rc::clone(&self.engine), id, index))
    }

    /// Prepares and plays a cue.
    ///
    /// With [`HandleMode::Wrap`] the new cue is returned; with
    /// [`HandleMode::FireAndForget`] the engine destroys it after it stops
    /// and `None` is returned.
    pub fn play(
        &self,
        index: u16,
        flags: u32,
        time_offset_ms: i32,
        mode: HandleMode,
    ) -> Result<Option<Cue>> {
        let managed = mode == HandleMode::FireAndForget;
        let id = self.engine.with_runtime_mut(|rt| {
            rt.play_cue_from_bank(self.id, index, flags, time_offset_ms, managed)
        })?;
        Ok((!managed).then(|| Cue::new(Rc::clone(&self.engine), id, index)))
    }

    /// Like [`play`](Self::play), applying `settings` to the cue before it
    /// starts.
    pub fn play_3d(
        &self,
        index: u16,
        flags: u32,
        time_offset_ms: i32,
        settings: &DspSettings,
        mode: HandleMode,
    ) -> Result<Option<Cue>> {
        let managed = mode == HandleMode::FireAndForget;
        let id = self.engine.with_runtime_mut(|rt| {
            let id = rt.prepare_cue(self.id, index, flags, time_offset_ms, managed)?;
            let started = spatial::apply_to_cue(rt, id, settings).and_then(|()| rt.play_cue(id));
            if let Err(err) = started {
                rt.destroy_cue(id);
                return Err(err);
            }
            Ok(id)
        })?;
        Ok((!managed).then(|| Cue::new(Rc::clone(&self.engine), id, index)))
    }

    /// Stops every instance of the cue at `index`.
    pub fn stop(&self, index: u16, flags: StopFlags) -> Result<()> {
        self.engine
            .with_runtime_mut(|rt| rt.stop_cue_in_bank(self.id, index, flags))
    }

    pub fn get_state(&self) -> Result<StateFlags> {
        self.engine.with_runtime(|rt| rt.sound_bank_state(self.id))
    }

    /// Unloads the bank. Fire-and-forget cues are destroyed, cues still
    /// held by the caller are stopped and detached.
    pub fn destroy(self) -> Result<()> {
        self.engine.with_runtime_mut(|rt| {
            rt.sound_bank(self.id)?;
            rt.destroy_sound_bank(self.id);
            Ok(())
        })
    }
}

impl std::fmt::Debug for SoundBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundBank").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SonicueError;
    use crate::test_content::{self, LIMITED_BANK, SFX_BANK};

    #[test]
    fn test_lookup_and_properties() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        assert_eq!(bank.get_num_cues().unwrap(), 3);
        assert_eq!(bank.get_cue_index("theme").unwrap(), Some(2));
        assert_eq!(bank.get_cue_index("missing").unwrap(), None);

        let properties = bank.get_cue_properties(1).unwrap();
        assert_eq!(properties.name, "footsteps");
        assert_eq!(properties.channels, 2);
        assert_eq!(properties.current_instances, 0);
        assert!(matches!(
            bank.get_cue_properties(3),
            Err(SonicueError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_failed_creation_leaves_nothing() {
        let engine = test_content::engine();
        assert!(matches!(
            engine.create_sound_bank(b"not a bank", 0),
            Err(SonicueError::Underlying(_))
        ));

        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        assert!(matches!(
            bank.prepare(7, 0, 0),
            Err(SonicueError::InvalidArgument(_))
        ));
        assert!(matches!(
            bank.play(7, 0, 0, HandleMode::Wrap),
            Err(SonicueError::InvalidArgument(_))
        ));
        assert_eq!(bank.get_state().unwrap(), StateFlags::PREPARED);
        assert!(!bank.get_state().unwrap().contains(StateFlags::IN_USE));
    }

    #[test]
    fn test_play_tracks_instances() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        let first = bank.play(0, 0, 0, HandleMode::Wrap).unwrap().unwrap();
        let second = bank.play(0, 0, 0, HandleMode::Wrap).unwrap().unwrap();
        assert_eq!(bank.get_cue_properties(0).unwrap().current_instances, 2);
        assert!(bank.get_state().unwrap().contains(StateFlags::IN_USE));

        bank.stop(0, StopFlags::IMMEDIATE).unwrap();
        assert_eq!(first.get_state().unwrap(), StateFlags::STOPPED);
        assert_eq!(second.get_state().unwrap(), StateFlags::STOPPED);
        assert_eq!(bank.get_cue_properties(0).unwrap().current_instances, 0);
        assert!(!bank.get_state().unwrap().contains(StateFlags::IN_USE));
    }

    #[test]
    fn test_instance_limit_rejects_extra_play() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(LIMITED_BANK, 0).unwrap();
        let first = bank.play(0, 0, 0, HandleMode::Wrap).unwrap().unwrap();
        assert!(matches!(
            bank.play(0, 0, 0, HandleMode::Wrap),
            Err(SonicueError::InvalidArgument(_))
        ));

        let waiting = bank.prepare(0, 0, 0).unwrap();
        assert!(matches!(
            waiting.play(),
            Err(SonicueError::InvalidArgument(_))
        ));
        assert_eq!(waiting.get_state().unwrap(), StateFlags::PREPARED);
        let properties = bank.get_cue_properties(0).unwrap();
        assert_eq!(properties.max_instances, 1);
        assert_eq!(properties.current_instances, 1);
        assert_eq!(first.get_properties().unwrap().cue, properties);

        first.stop(StopFlags::IMMEDIATE).unwrap();
        waiting.play().unwrap();
        assert_eq!(bank.get_cue_properties(0).unwrap().current_instances, 1);
    }

    #[test]
    fn test_instance_limit_replaces_oldest() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(LIMITED_BANK, 0).unwrap();
        let first = bank.play(1, 0, 0, HandleMode::Wrap).unwrap().unwrap();
        let second = bank.play(1, 0, 0, HandleMode::Wrap).unwrap().unwrap();
        let third = bank.play(1, 0, 0, HandleMode::Wrap).unwrap().unwrap();

        assert_eq!(first.get_state().unwrap(), StateFlags::STOPPED);
        assert_eq!(second.get_state().unwrap(), StateFlags::STOPPED);
        assert_eq!(third.get_state().unwrap(), StateFlags::PLAYING);
        assert_eq!(bank.get_cue_properties(1).unwrap().current_instances, 1);
    }

    #[test]
    fn test_fire_and_forget_is_reaped() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        assert!(bank.play(1, 0, 0, HandleMode::FireAndForget).unwrap().is_none());
        assert_eq!(bank.get_cue_properties(1).unwrap().current_instances, 1);

        bank.stop(1, StopFlags::RELEASE).unwrap();
        assert_eq!(bank.get_cue_properties(1).unwrap().current_instances, 1);
        engine.do_work().unwrap();
        assert_eq!(bank.get_cue_properties(1).unwrap().current_instances, 0);
        engine.do_work().unwrap();
        assert!(!bank.get_state().unwrap().contains(StateFlags::IN_USE));
    }

    #[test]
    fn test_destroy_detaches_held_cues() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        let held = bank.play(2, 0, 0, HandleMode::Wrap).unwrap().unwrap();
        bank.play(0, 0, 0, HandleMode::FireAndForget).unwrap();

        bank.destroy().unwrap();
        assert_eq!(held.get_state().unwrap(), StateFlags::STOPPED);
        assert!(matches!(
            held.get_properties(),
            Err(SonicueError::LifecycleViolation(_))
        ));
        held.destroy().unwrap();
    }
}
