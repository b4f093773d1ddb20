//! The engine's object graph.
//!
//! All banks, cues and waves of one engine live in a single [`Runtime`],
//! keyed by id. Public handles only carry ids, so every cross-object rule
//! (a bank destroying its cues, a category stopping its cues) is enforced
//! here with plain map lookups.

mod cue;
mod notify;
mod sound_bank;
mod tables;
mod wave;
mod wave_bank;

pub(crate) use notify::{NotificationHub, Registration, Subscription, Target};
pub(crate) use tables::EngineTables;

use crate::config::{FinalMixFormat, RuntimeParameters, StopFlags};
use crate::content::{ContentDecoder, IoStream, SoundBankData, WaveBankData};
use crate::error::{Result, SonicueError};
use crate::matrix::ChannelMatrix;
use crate::state::StateFlags;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        ///
        /// Only the engine hands out ids:
        ///
        #[doc = concat!("```compile_fail\nlet forged = sonicue::", stringify!($name), "(7);\n```")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// Identifies a live sound bank within its engine.
    SoundBankId,
    "SoundBank"
);
define_id!(
    /// Identifies a live wave bank within its engine.
    WaveBankId,
    "WaveBank"
);
define_id!(
    /// Identifies a live cue instance within its engine.
    CueId,
    "Cue"
);
define_id!(
    /// Identifies a live wave instance within its engine.
    WaveId,
    "Wave"
);

pub(crate) struct SoundBankNode {
    pub data: SoundBankData,
    /// Playing instances per cue definition.
    pub instance_counts: Vec<u32>,
    /// Live cues in creation order.
    pub cues: Vec<CueId>,
}

pub(crate) struct WaveBankNode {
    pub data: WaveBankData,
    /// Prepared waves per entry.
    pub entry_refs: Vec<u32>,
    pub waves: Vec<WaveId>,
    pub stream: Option<IoStream>,
}

pub(crate) struct CueNode {
    /// None once the owning bank was destroyed underneath an unmanaged cue.
    pub bank: Option<SoundBankId>,
    pub index: u16,
    pub category: u16,
    pub managed: bool,
    pub state: StateFlags,
    /// Counted in the bank's instance counts.
    pub active: bool,
    pub time_offset_ms: i32,
    pub variables: Vec<f32>,
    pub matrix: ChannelMatrix,
}

pub(crate) struct WaveNode {
    pub bank: Option<WaveBankId>,
    pub index: u16,
    pub managed: bool,
    pub state: StateFlags,
    pub background_music: bool,
    pub volume: f32,
    pub pitch: i16,
    pub initial_position: u32,
    pub loop_count: u8,
    pub matrix: ChannelMatrix,
}

/// Everything an initialized engine owns.
pub(crate) struct Runtime {
    pub tables: EngineTables,
    pub global_values: Vec<f32>,
    pub category_volumes: Vec<f32>,
    pub format: FinalMixFormat,
    pub lookahead_ms: u32,
    pub decoder: Arc<dyn ContentDecoder>,
    pub sound_banks: HashMap<SoundBankId, SoundBankNode>,
    pub wave_banks: HashMap<WaveBankId, WaveBankNode>,
    pub cues: HashMap<CueId, CueNode>,
    pub waves: HashMap<WaveId, WaveNode>,
    pub notifications: NotificationHub,
    next_id: u64,
}

impl Runtime {
    pub fn new(params: &RuntimeParameters) -> Result<Self> {
        let format = FinalMixFormat::from_mask(params.output_channel_mask)?;
        let settings = params.decoder.decode_global_settings(&params.global_settings)?;
        let tables = EngineTables::build(settings)?;

        let global_values = tables.variables().iter().map(|v| v.initial_value).collect();
        let category_volumes = tables.categories().iter().map(|c| c.volume).collect();

        log::info!(
            "Engine initialized: {} categories, {} variables, {} output channels",
            tables.categories().len(),
            tables.variables().len(),
            format.channel_count
        );

        Ok(Self {
            tables,
            global_values,
            category_volumes,
            format,
            lookahead_ms: params.lookahead_ms,
            decoder: Arc::clone(&params.decoder),
            sound_banks: HashMap::new(),
            wave_banks: HashMap::new(),
            cues: HashMap::new(),
            waves: HashMap::new(),
            notifications: NotificationHub::new(params.notification_capacity),
            next_id: 1,
        })
    }

    pub(crate) fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Finishes pending releases, then reaps fire-and-forget instances that
    /// have stopped.
    pub fn do_work(&mut self) {
        for id in matching_ids(&self.cues, |cue| cue.state.contains(StateFlags::STOPPING)) {
            self.finish_cue_stop(id);
        }
        for id in matching_ids(&self.waves, |wave| wave.state.contains(StateFlags::STOPPING)) {
            self.finish_wave_stop(id);
        }

        let finished = matching_ids(&self.cues, |cue| {
            cue.managed && cue.state.contains(StateFlags::STOPPED)
        });
        for id in finished {
            log::debug!("Reaping fire-and-forget {id}");
            self.destroy_cue(id);
        }
        let finished = matching_ids(&self.waves, |wave| {
            wave.managed && wave.state.contains(StateFlags::STOPPED)
        });
        for id in finished {
            log::debug!("Reaping fire-and-forget {id}");
            self.destroy_wave(id);
        }
    }

    pub fn lookup_category(&self, name: &str) -> Option<u16> {
        self.tables.category(name)
    }

    fn check_category(&self, category: u16) -> Result<()> {
        if usize::from(category) >= self.tables.categories().len() {
            return Err(SonicueError::invalid(format!(
                "category index {category} out of range"
            )));
        }
        Ok(())
    }

    /// Cues in `category` or any of its descendants that have started playing.
    fn cues_in_category(&self, category: u16) -> Vec<CueId> {
        matching_ids(&self.cues, |cue| {
            cue.state.intersects(StateFlags::PLAYING | StateFlags::STOPPING)
                && self.tables.is_in_category(cue.category, category)
        })
    }

    pub fn stop_category(&mut self, category: u16, flags: StopFlags) -> Result<()> {
        self.check_category(category)?;
        let immediate = flags.contains(StopFlags::IMMEDIATE);
        for id in self.cues_in_category(category) {
            let managed = self.cues.get(&id).is_some_and(|cue| cue.managed);
            if managed && immediate {
                self.destroy_cue(id);
            } else {
                self.stop_cue(id, flags)?;
            }
        }
        Ok(())
    }

    pub fn pause_category(&mut self, category: u16, paused: bool) -> Result<()> {
        self.check_category(category)?;
        for id in self.cues_in_category(category) {
            self.pause_cue(id, paused)?;
        }
        Ok(())
    }

    /// Scales the authored volume of `category` and recomputes its
    /// descendants from the new value.
    pub fn set_category_volume(&mut self, category: u16, volume: f32) -> Result<()> {
        self.check_category(category)?;
        if !volume.is_finite() || volume < 0.0 {
            return Err(SonicueError::invalid(format!("invalid volume {volume}")));
        }
        let base = self.tables.categories()[usize::from(category)].volume;
        self.category_volumes[usize::from(category)] = base * volume;

        let mut pending = vec![category];
        while let Some(parent) = pending.pop() {
            let parent_volume = self.category_volumes[usize::from(parent)];
            for child in self.tables.children(parent) {
                let base = self.tables.categories()[usize::from(child)].volume;
                self.category_volumes[usize::from(child)] = base * parent_volume;
                pending.push(child);
            }
        }
        Ok(())
    }

    pub fn category_volume(&self, category: u16) -> Result<f32> {
        self.check_category(category)?;
        Ok(self.category_volumes[usize::from(category)])
    }

    pub fn lookup_global_variable(&self, name: &str) -> Option<u16> {
        self.tables.global_variable(name)
    }

    pub fn set_global_variable(&mut self, index: u16, value: f32) -> Result<()> {
        let desc = self
            .tables
            .variable(index)
            .ok_or_else(|| SonicueError::invalid(format!("variable index {index} out of range")))?;
        if desc.access.cue_instance {
            return Err(SonicueError::invalid(format!(
                "variable '{}' is per-cue, not global",
                desc.name
            )));
        }
        if !desc.access.public || desc.access.read_only {
            return Err(SonicueError::invalid(format!(
                "variable '{}' is not writable",
                desc.name
            )));
        }
        let value = desc.clamp(value);
        self.global_values[usize::from(index)] = value;
        self.notifications
            .fire(Subscription::GlobalVariableChanged, |context| {
                crate::events::Notification::GlobalVariableChanged {
                    context,
                    variable_index: index,
                    value,
                }
            });
        Ok(())
    }

    pub fn global_variable(&self, index: u16) -> Result<f32> {
        let desc = self
            .tables
            .variable(index)
            .ok_or_else(|| SonicueError::invalid(format!("variable index {index} out of range")))?;
        if desc.access.cue_instance {
            return Err(SonicueError::invalid(format!(
                "variable '{}' is per-cue, not global",
                desc.name
            )));
        }
        Ok(self.global_values[usize::from(index)])
    }

    /// Destroys every live object, firing the usual destroyed notifications.
    pub fn shutdown(&mut self) {
        for id in matching_ids(&self.sound_banks, |_| true) {
            log::warn!("{id} still alive at shutdown, destroying it");
            self.destroy_sound_bank(id);
        }
        for id in matching_ids(&self.wave_banks, |_| true) {
            log::warn!("{id} still alive at shutdown, destroying it");
            self.destroy_wave_bank(id);
        }

        for id in matching_ids(&self.cues, |_| true) {
            self.destroy_cue(id);
        }
        for id in matching_ids(&self.waves, |_| true) {
            self.destroy_wave(id);
        }
        log::info!("Engine shut down");
    }
}

/// Ids of the entries matching `predicate`, oldest first.
pub(crate) fn matching_ids<K: Copy + Ord, V>(
    map: &HashMap<K, V>,
    predicate: impl Fn(&V) -> bool,
) -> Vec<K> {
    let mut ids: Vec<K> = map
        .iter()
        .filter(|(_, value)| predicate(value))
        .map(|(id, _)| *id)
        .collect();
    ids.sort();
    ids
}

/// Lifecycle of the engine core behind a handle.
pub(crate) enum EngineCore {
    Created,
    Running(Box<Runtime>),
    ShutDown,
}

impl EngineCore {
    pub fn runtime(&self) -> Result<&Runtime> {
        match self {
            Self::Running(runtime) => Ok(runtime),
            Self::Created => Err(SonicueError::lifecycle("engine is not initialized")),
            Self::ShutDown => Err(SonicueError::lifecycle("engine has been shut down")),
        }
    }

    pub fn runtime_mut(&mut self) -> Result<&mut Runtime> {
        match self {
            Self::Running(runtime) => Ok(runtime),
            Self::Created => Err(SonicueError::lifecycle("engine is not initialized")),
            Self::ShutDown => Err(SonicueError::lifecycle("engine has been shut down")),
        }
    }

    pub fn initialize(&mut self, params: &RuntimeParameters) -> Result<()> {
        match self {
            Self::Created => {
                *self = Self::Running(Box::new(Runtime::new(params)?));
                Ok(())
            }
            Self::Running(_) => Err(SonicueError::lifecycle("engine is already initialized")),
            Self::ShutDown => Err(SonicueError::lifecycle("engine has been shut down")),
        }
    }

    /// Tears the runtime down. Shutting down a shut-down engine is a no-op.
    pub fn shutdown(&mut self) {
        if let Self::Running(runtime) = self {
            runtime.shutdown();
        }
        *self = Self::ShutDown;
    }
}
