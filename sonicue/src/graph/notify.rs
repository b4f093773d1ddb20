use super::{CueId, SoundBankId, WaveBankId, WaveId};
use crate::events::Notification;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};

/// What a registration listens for, resolved to engine ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Subscription {
    CueStop(CueId),
    CueDestroyed(CueId),
    SoundBankDestroyed(SoundBankId),
    WaveBankDestroyed(WaveBankId),
    WaveStop(WaveId),
    WaveDestroyed(WaveId),
    GlobalVariableChanged,
}

/// The object a subscription is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Cue(CueId),
    SoundBank(SoundBankId),
    WaveBank(WaveBankId),
    Wave(WaveId),
}

impl Subscription {
    fn target(&self) -> Option<Target> {
        match *self {
            Self::CueStop(id) | Self::CueDestroyed(id) => Some(Target::Cue(id)),
            Self::SoundBankDestroyed(id) => Some(Target::SoundBank(id)),
            Self::WaveBankDestroyed(id) => Some(Target::WaveBank(id)),
            Self::WaveStop(id) | Self::WaveDestroyed(id) => Some(Target::Wave(id)),
            Self::GlobalVariableChanged => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Registration {
    pub subscription: Subscription,
    /// Keep the registration after it fires once.
    pub persist: bool,
    pub context: usize,
}

/// Registrations plus the queue notifications are delivered on.
pub(crate) struct NotificationHub {
    registrations: Vec<Registration>,
    sender: Sender<Notification>,
    receiver: Receiver<Notification>,
}

impl NotificationHub {
    pub fn new(capacity: Option<usize>) -> Self {
        let (sender, receiver) = match capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };
        Self {
            registrations: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Adds a registration, replacing any existing one for the same
    /// subscription.
    pub fn register(&mut self, registration: Registration) {
        match self
            .registrations
            .iter_mut()
            .find(|r| r.subscription == registration.subscription)
        {
            Some(existing) => *existing = registration,
            None => self.registrations.push(registration),
        }
    }

    /// Returns false if nothing was registered for `subscription`.
    pub fn unregister(&mut self, subscription: Subscription) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.subscription != subscription);
        self.registrations.len() != before
    }

    pub fn is_registered(&self, subscription: Subscription) -> bool {
        self.registrations
            .iter()
            .any(|r| r.subscription == subscription)
    }

    /// Delivers a notification for every matching registration and drops the
    /// one-shot ones.
    pub fn fire(&mut self, subscription: Subscription, build: impl Fn(usize) -> Notification) {
        let sender = &self.sender;
        self.registrations.retain(|registration| {
            if registration.subscription != subscription {
                return true;
            }
            match sender.try_send(build(registration.context)) {
                Ok(()) => {}
                Err(TrySendError::Full(dropped)) => {
                    log::warn!("Notification queue full, dropping {:?}", dropped.kind());
                }
                Err(TrySendError::Disconnected(_)) => {}
            }
            registration.persist
        });
    }

    /// Removes every registration attached to a destroyed object.
    pub fn forget(&mut self, target: Target) {
        self.registrations
            .retain(|r| r.subscription.target() != Some(target));
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.receiver.try_iter().collect()
    }

    pub fn receiver(&self) -> Receiver<Notification> {
        self.receiver.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_notification(context: usize) -> Notification {
        Notification::CueStop {
            context,
            cue_index: 0,
        }
    }

    #[test]
    fn test_one_shot_and_persistent() {
        let mut hub = NotificationHub::new(None);
        hub.register(Registration {
            subscription: Subscription::CueStop(CueId(1)),
            persist: false,
            context: 11,
        });
        hub.register(Registration {
            subscription: Subscription::CueStop(CueId(2)),
            persist: true,
            context: 22,
        });

        for _ in 0..2 {
            hub.fire(Subscription::CueStop(CueId(1)), stop_notification);
            hub.fire(Subscription::CueStop(CueId(2)), stop_notification);
        }

        let contexts: Vec<usize> = hub.drain().iter().map(Notification::context).collect();
        assert_eq!(contexts, vec![11, 22, 22]);
        assert!(!hub.is_registered(Subscription::CueStop(CueId(1))));
        assert!(hub.is_registered(Subscription::CueStop(CueId(2))));
    }

    #[test]
    fn test_register_replaces_and_forget() {
        let mut hub = NotificationHub::new(None);
        let subscription = Subscription::CueDestroyed(CueId(3));
        hub.register(Registration {
            subscription,
            persist: true,
            context: 1,
        });
        hub.register(Registration {
            subscription,
            persist: true,
            context: 2,
        });
        hub.register(Registration {
            subscription: Subscription::CueStop(CueId(3)),
            persist: true,
            context: 3,
        });

        hub.fire(subscription, |context| Notification::CueDestroyed {
            context,
            cue_index: 0,
        });
        assert_eq!(hub.drain().len(), 1);

        hub.forget(Target::Cue(CueId(3)));
        assert!(!hub.is_registered(subscription));
        assert!(!hub.is_registered(Subscription::CueStop(CueId(3))));
        assert!(!hub.unregister(subscription));
    }

    #[test]
    fn test_bounded_queue_drops_overflow() {
        let mut hub = NotificationHub::new(Some(1));
        hub.register(Registration {
            subscription: Subscription::GlobalVariableChanged,
            persist: true,
            context: 0,
        });
        hub.fire(Subscription::GlobalVariableChanged, stop_notification);
        hub.fire(Subscription::GlobalVariableChanged, stop_notification);
        assert_eq!(hub.receiver().try_iter().count(), 1);
    }
}
