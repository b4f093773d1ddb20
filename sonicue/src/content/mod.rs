//! Decoded audio content and the decoder seam.
//!
//! The engine never parses authored binaries itself. A [`ContentDecoder`]
//! turns global settings, sound bank and wave bank buffers into the plain
//! data types defined here, and the object graph is built from those.

mod decoder;
mod io_stream;

pub use decoder::{ContentDecoder, DecodeError};
pub use io_stream::{IoStream, ReadSeek};

/// Accessibility bits of an authored variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VariableAccess {
    pub public: bool,
    pub read_only: bool,
    pub cue_instance: bool,
}

impl VariableAccess {
    pub const PUBLIC: u8 = 0x01;
    pub const READ_ONLY: u8 = 0x02;
    pub const CUE_INSTANCE: u8 = 0x04;

    pub fn from_bits(bits: u8) -> Self {
        Self {
            public: bits & Self::PUBLIC != 0,
            read_only: bits & Self::READ_ONLY != 0,
            cue_instance: bits & Self::CUE_INSTANCE != 0,
        }
    }

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.public {
            bits |= Self::PUBLIC;
        }
        if self.read_only {
            bits |= Self::READ_ONLY;
        }
        if self.cue_instance {
            bits |= Self::CUE_INSTANCE;
        }
        bits
    }
}

/// An authored variable. Global variables live on the engine, cue-instance
/// variables get a private copy in every cue.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDesc {
    pub name: String,
    pub access: VariableAccess,
    pub initial_value: f32,
    pub min_value: f32,
    pub max_value: f32,
}

impl VariableDesc {
    /// Public, writable engine-wide variable.
    pub fn global(
        name: impl Into<String>,
        initial_value: f32,
        min_value: f32,
        max_value: f32,
    ) -> Self {
        Self {
            name: name.into(),
            access: VariableAccess {
                public: true,
                ..Default::default()
            },
            initial_value,
            min_value,
            max_value,
        }
    }

    /// Public, writable variable copied into each cue.
    pub fn instance(
        name: impl Into<String>,
        initial_value: f32,
        min_value: f32,
        max_value: f32,
    ) -> Self {
        Self {
            name: name.into(),
            access: VariableAccess {
                public: true,
                cue_instance: true,
                ..Default::default()
            },
            initial_value,
            min_value,
            max_value,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.access.read_only = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.access.public = false;
        self
    }

    pub(crate) fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min_value, self.max_value)
    }
}

/// An authored category. Categories form a tree through `parent`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDesc {
    pub name: String,
    pub parent: Option<u16>,
    pub volume: f32,
    pub instance_limit: u8,
}

impl CategoryDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            volume: 1.0,
            instance_limit: 0xFF,
        }
    }

    pub fn with_parent(mut self, parent: u16) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }
}

/// Decoded global settings: the category tree and variable table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlobalSettings {
    pub categories: Vec<CategoryDesc>,
    pub variables: Vec<VariableDesc>,
}

impl GlobalSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: CategoryDesc) -> Self {
        self.categories.push(category);
        self
    }

    pub fn with_variable(mut self, variable: VariableDesc) -> Self {
        self.variables.push(variable);
        self
    }
}

/// What playing a cue does once `max_instances` of it are already playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstanceBehavior {
    /// The play call fails.
    #[default]
    Fail,
    /// The oldest playing instance is stopped to make room.
    ReplaceOldest,
}

/// One cue as authored in a sound bank.
#[derive(Debug, Clone, PartialEq)]
pub struct CueDefinition {
    pub name: String,
    pub category: u16,
    /// Source channel count of the cue's sounds.
    pub channels: u16,
    pub interactive: bool,
    pub max_instances: u8,
    pub instance_behavior: InstanceBehavior,
}

impl CueDefinition {
    pub fn new(name: impl Into<String>, category: u16, channels: u16) -> Self {
        Self {
            name: name.into(),
            category,
            channels,
            interactive: false,
            max_instances: 0xFF,
            instance_behavior: InstanceBehavior::Fail,
        }
    }

    pub fn with_instance_limit(mut self, max_instances: u8, behavior: InstanceBehavior) -> Self {
        self.max_instances = max_instances;
        self.instance_behavior = behavior;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SoundBankData {
    pub name: String,
    pub cues: Vec<CueDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopRegion {
    pub start_sample: u32,
    pub total_samples: u32,
}

/// One wave as described by a wave bank's entry table.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveEntry {
    pub name: Option<String>,
    pub channels: u16,
    pub sample_rate: u32,
    pub duration_samples: u32,
    pub loop_region: LoopRegion,
}

impl WaveEntry {
    pub fn new(channels: u16, sample_rate: u32, duration_samples: u32) -> Self {
        Self {
            name: None,
            channels,
            sample_rate,
            duration_samples,
            loop_region: LoopRegion::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaveBankData {
    pub name: String,
    pub entries: Vec<WaveEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_access_bits() {
        let access = VariableAccess::from_bits(0x05);
        assert!(access.public);
        assert!(!access.read_only);
        assert!(access.cue_instance);
        assert_eq!(access.bits(), 0x05);
    }

    #[test]
    fn test_variable_clamp() {
        let desc = VariableDesc::instance("Distance", 0.0, 0.0, 100.0);
        assert_eq!(desc.clamp(150.0), 100.0);
        assert_eq!(desc.clamp(-1.0), 0.0);
        assert_eq!(desc.clamp(42.0), 42.0);
    }
}
