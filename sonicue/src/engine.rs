use crate::config::{FinalMixFormat, RuntimeParameters, StopFlags, StreamingParameters};
use crate::error::{Result, SonicueError};
use crate::events::Notification;
use crate::graph::{EngineCore, Runtime};
use crate::notification::NotificationDescription;
use crate::sound_bank::SoundBank;
use crate::wave_bank::WaveBank;
use crossbeam_channel::Receiver;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// State shared by an engine and every handle created from it.
pub(crate) struct EngineShared {
    ref_count: Cell<u32>,
    core: RefCell<EngineCore>,
}

impl EngineShared {
    pub(crate) fn with_runtime<T>(&self, f: impl FnOnce(&Runtime) -> Result<T>) -> Result<T> {
        let core = self
            .core
            .try_borrow()
            .map_err(|_| SonicueError::lifecycle("engine is busy"))?;
        f(core.runtime()?)
    }

    pub(crate) fn with_runtime_mut<T>(
        &self,
        f: impl FnOnce(&mut Runtime) -> Result<T>,
    ) -> Result<T> {
        let mut core = self
            .core
            .try_borrow_mut()
            .map_err(|_| SonicueError::lifecycle("engine is busy"))?;
        f(core.runtime_mut()?)
    }

    fn teardown(&self) {
        match self.core.try_borrow_mut() {
            Ok(mut core) => core.shutdown(),
            Err(_) => log::error!("Engine released while borrowed, skipping teardown"),
        }
    }
}

/// Interfaces an object can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceId {
    Unknown,
    Engine,
    SoundBank,
    WaveBank,
    Cue,
    Wave,
}

/// Reference-counted handle to an audio engine.
///
/// `create` hands out the first reference. Every [`add_ref`](Self::add_ref)
/// (or `clone`) adds one and every [`release`](Self::release) (or drop)
/// removes one. The last release shuts the engine down; bank, cue and wave
/// handles that outlive it report [`SonicueError::LifecycleViolation`].
///
/// Engines are single-threaded and not `Send`.
pub struct Engine {
    shared: Rc<EngineShared>,
}

impl Engine {
    /// Creates an uninitialized engine holding one reference.
    pub fn create() -> Self {
        log::debug!("Engine created");
        Self {
            shared: Rc::new(EngineShared {
                ref_count: Cell::new(1),
                core: RefCell::new(EngineCore::Created),
            }),
        }
    }

    /// Adds a reference and returns it as a new handle.
    pub fn add_ref(&self) -> Engine {
        self.shared.ref_count.set(self.shared.ref_count.get() + 1);
        Self {
            shared: Rc::clone(&self.shared),
        }
    }

    /// Gives up this reference and returns how many remain.
    pub fn release(self) -> u32 {
        let remaining = self.shared.ref_count.get().saturating_sub(1);
        drop(self);
        remaining
    }

    pub fn ref_count(&self) -> u32 {
        self.shared.ref_count.get()
    }

    /// Returns a new reference if the engine implements `interface`.
    pub fn query_interface(&self, interface: InterfaceId) -> Result<Engine> {
        match interface {
            InterfaceId::Unknown | InterfaceId::Engine => Ok(self.add_ref()),
            other => Err(SonicueError::NotFound(format!(
                "engine does not implement {other:?}"
            ))),
        }
    }

    /// Decodes the global settings and brings the engine up.
    ///
    /// # Arguments
    ///
    /// * `params` - Authored settings, decoder and output format
    pub fn initialize(&self, params: RuntimeParameters) -> Result<()> {
        let mut core = self
            .shared
            .core
            .try_borrow_mut()
            .map_err(|_| SonicueError::lifecycle("engine is busy"))?;
        core.initialize(&params)
    }

    /// Destroys every bank, cue and wave and stops the engine.
    pub fn shutdown(&self) -> Result<()> {
        let mut core = self
            .shared
            .core
            .try_borrow_mut()
            .map_err(|_| SonicueError::lifecycle("engine is busy"))?;
        core.runtime()?;
        core.shutdown();
        Ok(())
    }

    /// Completes pending stops and reaps fire-and-forget instances.
    pub fn do_work(&self) -> Result<()> {
        self.shared.with_runtime_mut(|rt| {
            rt.do_work();
            Ok(())
        })
    }

    pub fn final_mix_format(&self) -> Result<FinalMixFormat> {
        self.shared.with_runtime(|rt| Ok(rt.format))
    }

    /// Creates a sound bank from an authored buffer.
    ///
    /// Nothing is registered with the engine if decoding fails.
    pub fn create_sound_bank(&self, buffer: &[u8], flags: u32) -> Result<SoundBank> {
        let id = self
            .shared
            .with_runtime_mut(|rt| rt.create_sound_bank(buffer, flags))?;
        Ok(SoundBank::new(Rc::clone(&self.shared), id))
    }

    pub fn create_in_memory_wave_bank(&self, buffer: &[u8], flags: u32) -> Result<WaveBank> {
        let id = self
            .shared
            .with_runtime_mut(|rt| rt.create_in_memory_wave_bank(buffer, flags))?;
        Ok(WaveBank::new(Rc::clone(&self.shared), id))
    }

    /// Creates a wave bank that reads from `params.file`, which the bank
    /// owns until it is destroyed.
    pub fn create_streaming_wave_bank(&self, params: StreamingParameters) -> Result<WaveBank> {
        let id = self
            .shared
            .with_runtime_mut(|rt| rt.create_streaming_wave_bank(params))?;
        Ok(WaveBank::new(Rc::clone(&self.shared), id))
    }

    pub fn register_notification(&self, description: &NotificationDescription<'_>) -> Result<()> {
        let registration = description.registration(&self.shared)?;
        self.shared.with_runtime_mut(|rt| {
            rt.notifications.register(registration);
            Ok(())
        })
    }

    pub fn unregister_notification(
        &self,
        description: &NotificationDescription<'_>,
    ) -> Result<()> {
        let registration = description.registration(&self.shared)?;
        self.shared.with_runtime_mut(|rt| {
            if !rt.notifications.unregister(registration.subscription) {
                log::debug!(
                    "No registration for {:?} to remove",
                    registration.subscription
                );
            }
            Ok(())
        })
    }

    /// Drains notifications delivered since the last poll.
    pub fn poll_notifications(&self) -> Result<Vec<Notification>> {
        self.shared.with_runtime(|rt| Ok(rt.notifications.drain()))
    }

    /// Receiver for notifications, for callers that prefer to block or
    /// select on the queue.
    pub fn notification_receiver(&self) -> Result<Receiver<Notification>> {
        self.shared.with_runtime(|rt| Ok(rt.notifications.receiver()))
    }

    /// Index of a category by name, or None if no category has that name.
    pub fn get_category(&self, name: &str) -> Result<Option<u16>> {
        self.shared.with_runtime(|rt| Ok(rt.lookup_category(name)))
    }

    /// Stops every playing cue in `category` and its descendants.
    pub fn stop(&self, category: u16, flags: StopFlags) -> Result<()> {
        self.shared
            .with_runtime_mut(|rt| rt.stop_category(category, flags))
    }

    pub fn pause(&self, category: u16, paused: bool) -> Result<()> {
        self.shared
            .with_runtime_mut(|rt| rt.pause_category(category, paused))
    }

    /// Scales the category's authored volume; descendants follow.
    pub fn set_volume(&self, category: u16, volume: f32) -> Result<()> {
        self.shared
            .with_runtime_mut(|rt| rt.set_category_volume(category, volume))
    }

    pub fn get_volume(&self, category: u16) -> Result<f32> {
        self.shared.with_runtime(|rt| rt.category_volume(category))
    }

    /// Index of a global variable by name. Cue-instance variables are not
    /// visible here.
    pub fn get_global_variable_index(&self, name: &str) -> Result<Option<u16>> {
        self.shared
            .with_runtime(|rt| Ok(rt.lookup_global_variable(name)))
    }

    /// Sets a global variable, clamped to its authored range.
    pub fn set_global_variable(&self, index: u16, value: f32) -> Result<()> {
        self.shared
            .with_runtime_mut(|rt| rt.set_global_variable(index, value))
    }

    pub fn get_global_variable(&self, index: u16) -> Result<f32> {
        self.shared.with_runtime(|rt| rt.global_variable(index))
    }
}

impl Clone for Engine {
    fn clone(&self) -> Self {
        self.add_ref()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        let remaining = self.shared.ref_count.get().saturating_sub(1);
        self.shared.ref_count.set(remaining);
        if remaining == 0 {
            log::info!("Last engine reference released");
            self.shared.teardown();
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("ref_count", &self.ref_count())
            .finish()
    }
}
