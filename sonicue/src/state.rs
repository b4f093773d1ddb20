bitflags::bitflags! {
    /// Lifecycle state bits reported by banks, cues and waves.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StateFlags: u32 {
        const CREATED = 0x0000_0001;
        const PREPARING = 0x0000_0002;
        const PREPARED = 0x0000_0004;
        const PLAYING = 0x0000_0008;
        const STOPPING = 0x0000_0010;
        const STOPPED = 0x0000_0020;
        const PAUSED = 0x0000_0040;
        const IN_USE = 0x0000_0080;
        const PREPARE_FAILED = 0x8000_0000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut state = StateFlags::PLAYING;
        state.insert(StateFlags::PAUSED);
        assert!(state.contains(StateFlags::PLAYING | StateFlags::PAUSED));
        state.remove(StateFlags::PAUSED);
        assert_eq!(state, StateFlags::PLAYING);
        assert!(!state.intersects(StateFlags::STOPPING | StateFlags::STOPPED));
        assert_eq!(format!("{state:?}"), "StateFlags(PLAYING)");
    }

    #[test]
    fn test_bit_values() {
        assert_eq!(StateFlags::PLAYING.bits(), 0x08);
        assert_eq!(StateFlags::PREPARE_FAILED.bits(), 0x8000_0000);
        assert_eq!(
            StateFlags::from_bits(0x48),
            Some(StateFlags::PLAYING | StateFlags::PAUSED)
        );
        assert_eq!(StateFlags::from_bits(0x100), None);
    }
}
