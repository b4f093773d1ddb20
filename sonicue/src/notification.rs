//! Notification registration.
//!
//! A [`NotificationDescription`] pairs a notification kind with the handle
//! it watches. The kind and the handle type always agree because the target
//! is a tagged enum; the flat [`RawNotificationDescription`] is checked for
//! that agreement when converted.

use crate::cue::Cue;
use crate::engine::EngineShared;
use crate::error::{Result, SonicueError};
use crate::events::NotificationKind;
use crate::graph::{Registration, Subscription};
use crate::sound_bank::SoundBank;
use crate::wave::Wave;
use crate::wave_bank::WaveBank;
use std::rc::Rc;

/// Keep the registration after it has fired once.
pub const NOTIFICATION_PERSIST: u8 = 0x01;

/// A notification kind together with the object it is about.
#[derive(Debug, Clone, Copy)]
pub enum NotificationTarget<'a> {
    CueStop(&'a Cue),
    CueDestroyed(&'a Cue),
    SoundBankDestroyed(&'a SoundBank),
    WaveBankDestroyed(&'a WaveBank),
    WaveStop(&'a Wave),
    WaveDestroyed(&'a Wave),
    GlobalVariableChanged,
}

impl NotificationTarget<'_> {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::CueStop(_) => NotificationKind::CueStop,
            Self::CueDestroyed(_) => NotificationKind::CueDestroyed,
            Self::SoundBankDestroyed(_) => NotificationKind::SoundBankDestroyed,
            Self::WaveBankDestroyed(_) => NotificationKind::WaveBankDestroyed,
            Self::WaveStop(_) => NotificationKind::WaveStop,
            Self::WaveDestroyed(_) => NotificationKind::WaveDestroyed,
            Self::GlobalVariableChanged => NotificationKind::GlobalVariableChanged,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NotificationDescription<'a> {
    pub target: NotificationTarget<'a>,
    pub flags: u8,
    /// Opaque value echoed back in every delivered notification.
    pub context: usize,
}

impl<'a> NotificationDescription<'a> {
    pub fn new(target: NotificationTarget<'a>) -> Self {
        Self {
            target,
            flags: 0,
            context: 0,
        }
    }

    pub fn persistent(mut self) -> Self {
        self.flags |= NOTIFICATION_PERSIST;
        self
    }

    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    pub fn is_persistent(&self) -> bool {
        self.flags & NOTIFICATION_PERSIST != 0
    }

    /// Resolves the target to ids of `engine`, checking that it is still
    /// alive there.
    pub(crate) fn registration(&self, engine: &Rc<EngineShared>) -> Result<Registration> {
        if self.flags & !NOTIFICATION_PERSIST != 0 {
            return Err(SonicueError::invalid(format!(
                "unknown notification flags {:#x}",
                self.flags
            )));
        }
        let subscription = match self.target {
            NotificationTarget::CueStop(cue) => Subscription::CueStop(cue.attached_id(engine)?),
            NotificationTarget::CueDestroyed(cue) => {
                Subscription::CueDestroyed(cue.attached_id(engine)?)
            }
            NotificationTarget::SoundBankDestroyed(bank) => {
                Subscription::SoundBankDestroyed(bank.attached_id(engine)?)
            }
            NotificationTarget::WaveBankDestroyed(bank) => {
                Subscription::WaveBankDestroyed(bank.attached_id(engine)?)
            }
            NotificationTarget::WaveStop(wave) => Subscription::WaveStop(wave.attached_id(engine)?),
            NotificationTarget::WaveDestroyed(wave) => {
                Subscription::WaveDestroyed(wave.attached_id(engine)?)
            }
            NotificationTarget::GlobalVariableChanged => Subscription::GlobalVariableChanged,
        };
        Ok(Registration {
            subscription,
            persist: self.is_persistent(),
            context: self.context,
        })
    }
}

/// Fails unless `handle_engine` is `engine`.
pub(crate) fn check_same_engine(
    handle_engine: &Rc<EngineShared>,
    engine: &Rc<EngineShared>,
) -> Result<()> {
    if Rc::ptr_eq(handle_engine, engine) {
        Ok(())
    } else {
        Err(SonicueError::invalid("handle belongs to a different engine"))
    }
}

/// Flat notification record with one optional slot per target type.
///
/// Exactly the slot matching `kind` must be filled. `cue_index` and
/// `wave_index`, when given, must match the target's index.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawNotificationDescription<'a> {
    pub kind: u8,
    pub flags: u8,
    pub sound_bank: Option<&'a SoundBank>,
    pub wave_bank: Option<&'a WaveBank>,
    pub cue: Option<&'a Cue>,
    pub wave: Option<&'a Wave>,
    pub cue_index: Option<u16>,
    pub wave_index: Option<u16>,
    pub context: usize,
}

impl<'a> TryFrom<RawNotificationDescription<'a>> for NotificationDescription<'a> {
    type Error = SonicueError;

    fn try_from(raw: RawNotificationDescription<'a>) -> Result<Self> {
        let kind = NotificationKind::from_code(raw.kind).ok_or_else(|| {
            SonicueError::invalid(format!("unsupported notification type {}", raw.kind))
        })?;

        let filled = [
            raw.sound_bank.is_some(),
            raw.wave_bank.is_some(),
            raw.cue.is_some(),
            raw.wave.is_some(),
        ]
        .iter()
        .filter(|slot| **slot)
        .count();
        let expected = usize::from(kind != NotificationKind::GlobalVariableChanged);
        if filled != expected {
            return Err(SonicueError::invalid(format!(
                "{kind:?} takes {expected} target(s), got {filled}"
            )));
        }

        let missing = || SonicueError::invalid(format!("{kind:?} is missing its target"));
        let target = match kind {
            NotificationKind::CueStop => NotificationTarget::CueStop(raw.cue.ok_or_else(missing)?),
            NotificationKind::CueDestroyed => {
                NotificationTarget::CueDestroyed(raw.cue.ok_or_else(missing)?)
            }
            NotificationKind::SoundBankDestroyed => {
                NotificationTarget::SoundBankDestroyed(raw.sound_bank.ok_or_else(missing)?)
            }
            NotificationKind::WaveBankDestroyed => {
                NotificationTarget::WaveBankDestroyed(raw.wave_bank.ok_or_else(missing)?)
            }
            NotificationKind::WaveStop => {
                NotificationTarget::WaveStop(raw.wave.ok_or_else(missing)?)
            }
            NotificationKind::WaveDestroyed => {
                NotificationTarget::WaveDestroyed(raw.wave.ok_or_else(missing)?)
            }
            NotificationKind::GlobalVariableChanged => NotificationTarget::GlobalVariableChanged,
        };

        if let (Some(index), Some(cue)) = (raw.cue_index, raw.cue) {
            if index != cue.index() {
                return Err(SonicueError::invalid(format!(
                    "cue index {index} does not match target cue {}",
                    cue.index()
                )));
            }
        }
        if let (Some(index), Some(wave)) = (raw.wave_index, raw.wave) {
            if index != wave.index() {
                return Err(SonicueError::invalid(format!(
                    "wave index {index} does not match target wave {}",
                    wave.index()
                )));
            }
        }

        Ok(Self {
            target,
            flags: raw.flags,
            context: raw.context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StopFlags, WavePrepareFlags};
    use crate::events::Notification;
    use crate::test_content::{self, SFX_BANK, WAVE_BANK};

    #[test]
    fn test_cue_stop_round_trip() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        let cue = bank.prepare(1, 0, 0).unwrap();

        let description =
            NotificationDescription::new(NotificationTarget::CueStop(&cue)).with_context(42);
        engine.register_notification(&description).unwrap();

        cue.play().unwrap();
        cue.stop(StopFlags::IMMEDIATE).unwrap();
        assert_eq!(
            engine.poll_notifications().unwrap(),
            vec![Notification::CueStop {
                context: 42,
                cue_index: 1
            }]
        );

        // One-shot: a second stop cycle delivers nothing.
        cue.play().unwrap();
        cue.stop(StopFlags::IMMEDIATE).unwrap();
        assert!(engine.poll_notifications().unwrap().is_empty());
    }

    #[test]
    fn test_destroy_notifications_persist() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        let waves = engine.create_in_memory_wave_bank(WAVE_BANK, 0).unwrap();
        let cue = bank.prepare(0, 0, 0).unwrap();
        let wave = waves.prepare(0, WavePrepareFlags::empty(), 0, 0).unwrap();

        for target in [
            NotificationTarget::CueDestroyed(&cue),
            NotificationTarget::WaveDestroyed(&wave),
            NotificationTarget::SoundBankDestroyed(&bank),
            NotificationTarget::WaveBankDestroyed(&waves),
        ] {
            let description = NotificationDescription::new(target)
                .persistent()
                .with_context(target.kind().code() as usize);
            engine.register_notification(&description).unwrap();
        }

        cue.destroy().unwrap();
        wave.destroy().unwrap();
        bank.destroy().unwrap();
        waves.destroy().unwrap();

        let kinds: Vec<NotificationKind> = engine
            .poll_notifications()
            .unwrap()
            .iter()
            .map(Notification::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::CueDestroyed,
                NotificationKind::WaveDestroyed,
                NotificationKind::SoundBankDestroyed,
                NotificationKind::WaveBankDestroyed,
            ]
        );
    }

    #[test]
    fn test_unregister() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        let cue = bank.prepare(0, 0, 0).unwrap();
        let description =
            NotificationDescription::new(NotificationTarget::CueDestroyed(&cue)).persistent();
        engine.register_notification(&description).unwrap();
        engine.unregister_notification(&description).unwrap();
        cue.destroy().unwrap();
        assert!(engine.poll_notifications().unwrap().is_empty());
    }

    #[test]
    fn test_foreign_and_dead_targets_rejected() {
        let engine = test_content::engine();
        let other = test_content::engine();
        let bank = other.create_sound_bank(SFX_BANK, 0).unwrap();
        let description =
            NotificationDescription::new(NotificationTarget::SoundBankDestroyed(&bank));
        assert!(matches!(
            engine.register_notification(&description),
            Err(SonicueError::InvalidArgument(_))
        ));

        let cue = bank.prepare(0, 0, 0).unwrap();
        other.shutdown().unwrap();
        assert!(matches!(
            other.register_notification(&NotificationDescription::new(
                NotificationTarget::CueStop(&cue)
            )),
            Err(SonicueError::LifecycleViolation(_))
        ));
    }

    #[test]
    fn test_raw_description_validation() {
        let engine = test_content::engine();
        let bank = engine.create_sound_bank(SFX_BANK, 0).unwrap();
        let cue = bank.prepare(2, 0, 0).unwrap();

        let raw = RawNotificationDescription {
            kind: NotificationKind::CueStop.code(),
            cue: Some(&cue),
            cue_index: Some(2),
            context: 5,
            ..Default::default()
        };
        let description = NotificationDescription::try_from(raw).unwrap();
        assert_eq!(description.target.kind(), NotificationKind::CueStop);
        assert_eq!(description.context, 5);

        let wrong_slot = RawNotificationDescription {
            kind: NotificationKind::CueStop.code(),
            sound_bank: Some(&bank),
            ..Default::default()
        };
        assert!(NotificationDescription::try_from(wrong_slot).is_err());

        let wrong_index = RawNotificationDescription {
            kind: NotificationKind::CueDestroyed.code(),
            cue: Some(&cue),
            cue_index: Some(0),
            ..Default::default()
        };
        assert!(NotificationDescription::try_from(wrong_index).is_err());

        let unknown = RawNotificationDescription {
            kind: 0xEE,
            ..Default::default()
        };
        assert!(NotificationDescription::try_from(unknown).is_err());

        let global = RawNotificationDescription {
            kind: NotificationKind::GlobalVariableChanged.code(),
            flags: NOTIFICATION_PERSIST,
            ..Default::default()
        };
        let description = NotificationDescription::try_from(global).unwrap();
        assert!(description.is_persistent());
        assert!(engine.register_notification(&description).is_ok());
    }
}
