//! Notification types delivered by the engine

/// Kinds of notification a caller can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    CueStop,
    CueDestroyed,
    SoundBankDestroyed,
    WaveBankDestroyed,
    WaveStop,
    WaveDestroyed,
    GlobalVariableChanged,
}

impl NotificationKind {
    /// Wire code used in raw notification descriptions.
    pub fn code(self) -> u8 {
        match self {
            Self::CueStop => 3,
            Self::CueDestroyed => 4,
            Self::SoundBankDestroyed => 6,
            Self::WaveBankDestroyed => 7,
            Self::GlobalVariableChanged => 9,
            Self::WaveStop => 14,
            Self::WaveDestroyed => 16,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            3 => Self::CueStop,
            4 => Self::CueDestroyed,
            6 => Self::SoundBankDestroyed,
            7 => Self::WaveBankDestroyed,
            9 => Self::GlobalVariableChanged,
            14 => Self::WaveStop,
            16 => Self::WaveDestroyed,
            _ => return None,
        })
    }
}

/// A notification fired by the engine, drained with
/// [`Engine::poll_notifications`](crate::Engine::poll_notifications).
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    CueStop {
        context: usize,
        cue_index: u16,
    },
    CueDestroyed {
        context: usize,
        cue_index: u16,
    },
    SoundBankDestroyed {
        context: usize,
    },
    WaveBankDestroyed {
        context: usize,
    },
    WaveStop {
        context: usize,
        wave_index: u16,
    },
    WaveDestroyed {
        context: usize,
        wave_index: u16,
    },
    GlobalVariableChanged {
        context: usize,
        variable_index: u16,
        value: f32,
    },
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::CueStop { .. } => NotificationKind::CueStop,
            Self::CueDestroyed { .. } => NotificationKind::CueDestroyed,
            Self::SoundBankDestroyed { .. } => NotificationKind::SoundBankDestroyed,
            Self::WaveBankDestroyed { .. } => NotificationKind::WaveBankDestroyed,
            Self::WaveStop { .. } => NotificationKind::WaveStop,
            Self::WaveDestroyed { .. } => NotificationKind::WaveDestroyed,
            Self::GlobalVariableChanged { .. } => NotificationKind::GlobalVariableChanged,
        }
    }

    /// The opaque value supplied at registration.
    pub fn context(&self) -> usize {
        match self {
            Self::CueStop { context, .. }
            | Self::CueDestroyed { context, .. }
            | Self::SoundBankDestroyed { context }
            | Self::WaveBankDestroyed { context }
            | Self::WaveStop { context, .. }
            | Self::WaveDestroyed { context, .. }
            | Self::GlobalVariableChanged { context, .. } => *context,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(
            self,
            Self::CueDestroyed { .. }
                | Self::SoundBankDestroyed { .. }
                | Self::WaveBankDestroyed { .. }
                | Self::WaveDestroyed { .. }
        )
    }
}
