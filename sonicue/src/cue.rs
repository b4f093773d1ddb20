use crate::config::StopFlags;
use crate::engine::EngineShared;
use crate::error::{Result, SonicueError};
use crate::graph::CueId;
use crate::matrix::ChannelMatrix;
use crate::notification::check_same_engine;
use crate::sound_bank::CueProperties;
use crate::state::StateFlags;
use std::rc::Rc;

/// Per-instance view of a cue.
#[derive(Debug, Clone, PartialEq)]
pub struct CueInstanceProperties {
    pub cue: CueProperties,
    pub time_offset_ms: i32,
}

/// Handle to one playing (or playable) instance of a cue.
///
/// The instance lives until [`destroy`](Self::destroy) or until its engine
/// shuts down. If its sound bank is destroyed first the cue is stopped and
/// detached; state queries and `destroy` still work.
pub struct Cue {
    engine: Rc<EngineShared>,
    id: CueId,
    index: u16,
}

impl Cue {
    pub(crate) fn new(engine: Rc<EngineShared>, id: CueId, index: u16) -> Self {
        Self { engine, id, index }
    }

    pub fn id(&self) -> CueId {
        self.id
    }

    /// Index of this cue's definition in its sound bank.
    pub fn index(&self) -> u16 {
        self.index
    }

    pub(crate) fn engine(&self) -> &Rc<EngineShared> {
        &self.engine
    }

    pub(crate) fn attached_id(&self, engine: &Rc<EngineShared>) -> Result<CueId> {
        check_same_engine(&self.engine, engine)?;
        self.engine.with_runtime(|rt| rt.cue(self.id).map(|_| self.id))
    }

    /// Fails with `InvalidArgument` if the cue is playing or stopping.
    pub fn play(&self) -> Result<()> {
        self.engine.with_runtime_mut(|rt| rt.play_cue(self.id))
    }

    pub fn stop(&self, flags: StopFlags) -> Result<()> {
        self.engine.with_runtime_mut(|rt| rt.stop_cue(self.id, flags))
    }

    /// Ignored while the cue is stopping or stopped.
    pub fn pause(&self, paused: bool) -> Result<()> {
        self.engine
            .with_runtime_mut(|rt| rt.pause_cue(self.id, paused))
    }

    pub fn get_state(&self) -> Result<StateFlags> {
        self.engine.with_runtime(|rt| Ok(rt.cue(self.id)?.state))
    }

    /// Replaces the routing matrix.
    ///
    /// # Arguments
    ///
    /// * `src_channels` - Source channel count, 1 to 8
    /// * `dst_channels` - Must equal the engine's output channel count
    /// * `coefficients` - `src_channels * dst_channels` gains, one row per source channel
    pub fn set_matrix_coefficients(
        &self,
        src_channels: u32,
        dst_channels: u32,
        coefficients: &[f32],
    ) -> Result<()> {
        let matrix = ChannelMatrix::new(src_channels, dst_channels, coefficients)?;
        self.engine
            .with_runtime_mut(|rt| rt.set_cue_matrix(self.id, matrix))
    }

    pub fn get_matrix_coefficients(&self) -> Result<ChannelMatrix> {
        self.engine
            .with_runtime(|rt| Ok(rt.cue(self.id)?.matrix.clone()))
    }

    /// Index of a cue-instance variable by name. Global variables are not
    /// visible here.
    pub fn get_variable_index(&self, name: &str) -> Result<Option<u16>> {
        self.engine
            .with_runtime(|rt| rt.lookup_cue_variable(self.id, name))
    }

    /// Sets a variable, clamped to its authored range.
    pub fn set_variable(&self, index: u16, value: f32) -> Result<()> {
        self.engine
            .with_runtime_mut(|rt| rt.set_cue_variable(self.id, index, value))
    }

    pub fn get_variable(&self, index: u16) -> Result<f32> {
        self.engine
            .with_runtime(|rt| rt.cue_variable(self.id, index))
    }

    pub fn get_properties(&self) -> Result<CueInstanceProperties> {
        self.engine.with_runtime(|rt| {
            let cue = rt.cue(self.id)?;
            let bank = cue
                .bank
                .ok_or_else(|| SonicueError::lifecycle(format!("{} has no sound bank", self.id)))?;
            Ok(CueInstanceProperties {
                cue: rt.cue_properties(bank, cue.index)?,
                time_offset_ms: cue.time_offset_ms,
            })
        })
    }

    pub fn destroy(self) -> Result<()> {
        self.engine.with_runtime_mut(|rt| {
            rt.cue(self.id)?;
            rt.destroy_cue(self.id);
            Ok(())
        })
    }
}

impl std::fmt::Debug for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cue")
            .field("id", &self.id)
            .field("index", &self.index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::speakers;
    use crate::test_content::{self, SFX_BANK};

    #[test]
    fn test_state_transitions() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        let cue = bank.prepare(0, 0, 250).unwrap();
        assert_eq!(cue.get_state().unwrap(), StateFlags::PREPARED);
        assert_eq!(cue.get_properties().unwrap().time_offset_ms, 250);

        cue.play().unwrap();
        assert_eq!(cue.get_state().unwrap(), StateFlags::PLAYING);
        assert!(matches!(cue.play(), Err(SonicueError::InvalidArgument(_))));

        cue.pause(true).unwrap();
        assert_eq!(
            cue.get_state().unwrap(),
            StateFlags::PLAYING | StateFlags::PAUSED
        );
        // Stopping a paused cue completes at once.
        cue.stop(StopFlags::RELEASE).unwrap();
        assert_eq!(cue.get_state().unwrap(), StateFlags::STOPPED);

        cue.pause(true).unwrap();
        assert_eq!(cue.get_state().unwrap(), StateFlags::STOPPED);

        cue.play().unwrap();
        cue.stop(StopFlags::RELEASE).unwrap();
        assert!(cue.get_state().unwrap().contains(StateFlags::STOPPING));
        assert!(matches!(cue.play(), Err(SonicueError::InvalidArgument(_))));
        engine.do_work().unwrap();
        assert_eq!(cue.get_state().unwrap(), StateFlags::STOPPED);

        cue.destroy().unwrap();
    }

    #[test]
    fn test_default_matrix() {
        let engine = test_content::engine_with_mask(speakers::FIVE_POINT_ONE);
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();

        let mono = bank.prepare(0, 0, 0).unwrap();
        assert_eq!(mono.get_matrix_coefficients().unwrap().coefficients(), &[1.0; 6]);

        let stereo = bank.prepare(1, 0, 0).unwrap();
        let matrix = stereo.get_matrix_coefficients().unwrap();
        assert_eq!(
            matrix.coefficients(),
            &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_set_matrix_validation() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        let cue = bank.prepare(1, 0, 0).unwrap();

        cue.set_matrix_coefficients(2, 2, &[0.5, 0.0, 0.0, 0.5]).unwrap();
        assert_eq!(
            cue.get_matrix_coefficients().unwrap().coefficients(),
            &[0.5, 0.0, 0.0, 0.5]
        );
        assert!(matches!(
            cue.set_matrix_coefficients(2, 6, &[0.0; 12]),
            Err(SonicueError::InvalidArgument(_))
        ));
        assert!(matches!(
            cue.set_matrix_coefficients(2, 2, &[0.0; 3]),
            Err(SonicueError::InvalidArgument(_))
        ));
        assert_eq!(
            cue.get_matrix_coefficients().unwrap().coefficients(),
            &[0.5, 0.0, 0.0, 0.5]
        );
    }

    #[test]
    fn test_variables() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        let cue = bank.play(0, 0, 0, crate::HandleMode::Wrap).unwrap().unwrap();

        assert_eq!(cue.get_variable_index("SpeedOfSound").unwrap(), None);
        let intensity = cue.get_variable_index("Intensity").unwrap().unwrap();
        assert_eq!(cue.get_variable(intensity).unwrap(), 0.5);
        cue.set_variable(intensity, 2.0).unwrap();
        assert_eq!(cue.get_variable(intensity).unwrap(), 1.0);

        let instances = cue.get_variable_index("NumCueInstances").unwrap().unwrap();
        assert_eq!(cue.get_variable(instances).unwrap(), 1.0);
        assert!(matches!(
            cue.set_variable(instances, 3.0),
            Err(SonicueError::InvalidArgument(_))
        ));

        let speed = engine
            .get_global_variable_index("SpeedOfSound")
            .unwrap()
            .unwrap();
        assert!(cue.set_variable(speed, 1.0).is_err());
        assert!(cue.get_variable(speed).is_err());

        let other = bank.prepare(0, 0, 0).unwrap();
        assert_eq!(other.get_variable(intensity).unwrap(), 0.5);
    }

    #[test]
    fn test_handles_fail_after_shutdown() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        let cue = bank.prepare(0, 0, 0).unwrap();
        engine.shutdown().unwrap();
        assert!(matches!(
            cue.stop(StopFlags::IMMEDIATE),
            Err(SonicueError::LifecycleViolation(_))
        ));
        assert!(matches!(
            cue.destroy(),
            Err(SonicueError::LifecycleViolation(_))
        ));
    }
}
