//! Speaker masks, speaker azimuths and default emitter channel layouts.
//!
//! Azimuths are measured clockwise from the front when seen from above, in
//! radians. `LOW_FREQUENCY` is a sentinel outside `[0, 2π)` marking a
//! channel that is routed to the subwoofer rather than panned.

use crate::error::{Result, SonicueError};
use std::f32::consts::TAU;

/// Speaker position bits of a channel mask.
pub mod speakers {
    pub const FRONT_LEFT: u32 = 0x1;
    pub const FRONT_RIGHT: u32 = 0x2;
    pub const FRONT_CENTER: u32 = 0x4;
    pub const LOW_FREQUENCY: u32 = 0x8;
    pub const BACK_LEFT: u32 = 0x10;
    pub const BACK_RIGHT: u32 = 0x20;
    pub const FRONT_LEFT_OF_CENTER: u32 = 0x40;
    pub const FRONT_RIGHT_OF_CENTER: u32 = 0x80;
    pub const BACK_CENTER: u32 = 0x100;
    pub const SIDE_LEFT: u32 = 0x200;
    pub const SIDE_RIGHT: u32 = 0x400;
    pub const TOP_CENTER: u32 = 0x800;
    pub const TOP_FRONT_LEFT: u32 = 0x1000;
    pub const TOP_FRONT_CENTER: u32 = 0x2000;
    pub const TOP_FRONT_RIGHT: u32 = 0x4000;
    pub const TOP_BACK_LEFT: u32 = 0x8000;
    pub const TOP_BACK_CENTER: u32 = 0x10000;
    pub const TOP_BACK_RIGHT: u32 = 0x20000;

    pub const MONO: u32 = FRONT_CENTER;
    pub const STEREO: u32 = FRONT_LEFT | FRONT_RIGHT;
    pub const TWO_POINT_ONE: u32 = STEREO | LOW_FREQUENCY;
    pub const SURROUND: u32 = STEREO | FRONT_CENTER | BACK_CENTER;
    pub const QUAD: u32 = STEREO | BACK_LEFT | BACK_RIGHT;
    pub const FOUR_POINT_ONE: u32 = QUAD | LOW_FREQUENCY;
    pub const FIVE_POINT_ONE: u32 = QUAD | FRONT_CENTER | LOW_FREQUENCY;
    pub const SEVEN_POINT_ONE: u32 = FIVE_POINT_ONE | FRONT_LEFT_OF_CENTER | FRONT_RIGHT_OF_CENTER;
    pub const FIVE_POINT_ONE_SURROUND: u32 =
        STEREO | FRONT_CENTER | LOW_FREQUENCY | SIDE_LEFT | SIDE_RIGHT;
    pub const SEVEN_POINT_ONE_SURROUND: u32 = FIVE_POINT_ONE | SIDE_LEFT | SIDE_RIGHT;
}

/// Speaker azimuths in radians.
pub mod azimuth {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8, PI, TAU};

    pub const FRONT_CENTER: f32 = 0.0;
    pub const FRONT_RIGHT_OF_CENTER: f32 = FRAC_PI_8;
    pub const FRONT_RIGHT: f32 = FRAC_PI_4;
    pub const RIGHT: f32 = FRAC_PI_2;
    pub const BACK_RIGHT: f32 = 3.0 * FRAC_PI_4;
    pub const BACK_CENTER: f32 = PI;
    pub const BACK_LEFT: f32 = 5.0 * FRAC_PI_4;
    pub const LEFT: f32 = 3.0 * FRAC_PI_2;
    pub const FRONT_LEFT: f32 = 7.0 * FRAC_PI_4;
    pub const FRONT_LEFT_OF_CENTER: f32 = 15.0 * FRAC_PI_8;
    /// Not a direction: the channel feeds the LFE speaker.
    pub const LOW_FREQUENCY: f32 = TAU;
}

/// True for the subwoofer sentinel azimuth.
pub fn is_low_frequency(azimuth: f32) -> bool {
    azimuth >= TAU
}

/// One speaker of the final mix, in channel-mask bit order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speaker {
    pub channel: u32,
    pub mask_bit: u32,
    /// None for the LFE speaker and for height speakers, which are not
    /// panned to.
    pub azimuth: Option<f32>,
}

impl Speaker {
    pub fn is_low_frequency(&self) -> bool {
        self.mask_bit == speakers::LOW_FREQUENCY
    }
}

fn speaker_azimuth(bit: u32) -> Option<f32> {
    Some(match bit {
        speakers::FRONT_LEFT => azimuth::FRONT_LEFT,
        speakers::FRONT_RIGHT => azimuth::FRONT_RIGHT,
        speakers::FRONT_CENTER => azimuth::FRONT_CENTER,
        speakers::BACK_LEFT => azimuth::BACK_LEFT,
        speakers::BACK_RIGHT => azimuth::BACK_RIGHT,
        speakers::FRONT_LEFT_OF_CENTER => azimuth::FRONT_LEFT_OF_CENTER,
        speakers::FRONT_RIGHT_OF_CENTER => azimuth::FRONT_RIGHT_OF_CENTER,
        speakers::BACK_CENTER => azimuth::BACK_CENTER,
        speakers::SIDE_LEFT => azimuth::LEFT,
        speakers::SIDE_RIGHT => azimuth::RIGHT,
        _ => return None,
    })
}

/// Speakers named by `mask`, one per set bit, lowest bit first.
pub fn speakers_for_mask(mask: u32) -> Vec<Speaker> {
    (0..u32::BITS)
        .map(|shift| 1u32 << shift)
        .filter(|bit| mask & bit != 0)
        .enumerate()
        .map(|(channel, mask_bit)| Speaker {
            channel: channel as u32,
            mask_bit,
            azimuth: speaker_azimuth(mask_bit),
        })
        .collect()
}

/// Default channel placement for multi-channel emitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Stereo,
    TwoPointOne,
    Quad,
    FourPointOne,
    FivePointOne,
    SevenPointOne,
}

const STEREO_AZIMUTHS: [f32; 2] = [azimuth::LEFT, azimuth::RIGHT];
const TWO_POINT_ONE_AZIMUTHS: [f32; 3] = [azimuth::LEFT, azimuth::RIGHT, azimuth::LOW_FREQUENCY];
const QUAD_AZIMUTHS: [f32; 4] = [
    azimuth::FRONT_LEFT,
    azimuth::FRONT_RIGHT,
    azimuth::BACK_LEFT,
    azimuth::BACK_RIGHT,
];
const FOUR_POINT_ONE_AZIMUTHS: [f32; 5] = [
    azimuth::FRONT_LEFT,
    azimuth::FRONT_RIGHT,
    azimuth::LOW_FREQUENCY,
    azimuth::BACK_LEFT,
    azimuth::BACK_RIGHT,
];
const FIVE_POINT_ONE_AZIMUTHS: [f32; 6] = [
    azimuth::FRONT_LEFT,
    azimuth::FRONT_RIGHT,
    azimuth::FRONT_CENTER,
    azimuth::LOW_FREQUENCY,
    azimuth::BACK_LEFT,
    azimuth::BACK_RIGHT,
];
const SEVEN_POINT_ONE_AZIMUTHS: [f32; 8] = [
    azimuth::FRONT_LEFT,
    azimuth::FRONT_RIGHT,
    azimuth::FRONT_CENTER,
    azimuth::LOW_FREQUENCY,
    azimuth::BACK_LEFT,
    azimuth::BACK_RIGHT,
    azimuth::LEFT,
    azimuth::RIGHT,
];

impl ChannelLayout {
    /// Layout for an emitter with `channel_count` channels.
    pub fn for_channel_count(channel_count: u32) -> Result<Self> {
        Ok(match channel_count {
            2 => Self::Stereo,
            3 => Self::TwoPointOne,
            4 => Self::Quad,
            5 => Self::FourPointOne,
            6 => Self::FivePointOne,
            8 => Self::SevenPointOne,
            other => {
                return Err(SonicueError::invalid(format!(
                    "no known layout for {other} channels"
                )));
            }
        })
    }

    pub fn azimuths(&self) -> &'static [f32] {
        match self {
            Self::Stereo => &STEREO_AZIMUTHS,
            Self::TwoPointOne => &TWO_POINT_ONE_AZIMUTHS,
            Self::Quad => &QUAD_AZIMUTHS,
            Self::FourPointOne => &FOUR_POINT_ONE_AZIMUTHS,
            Self::FivePointOne => &FIVE_POINT_ONE_AZIMUTHS,
            Self::SevenPointOne => &SEVEN_POINT_ONE_AZIMUTHS,
        }
    }

    pub fn channel_count(&self) -> u32 {
        self.azimuths().len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_layouts_match_channel_counts() {
        for count in [2, 3, 4, 5, 6, 8] {
            let layout = ChannelLayout::for_channel_count(count).unwrap();
            assert_eq!(layout.channel_count(), count);
        }
        for count in [0, 1, 7, 9] {
            assert!(ChannelLayout::for_channel_count(count).is_err());
        }
    }

    #[test]
    fn test_stereo_layout() {
        let layout = ChannelLayout::for_channel_count(2).unwrap();
        assert_eq!(layout.azimuths(), &[3.0 * FRAC_PI_2, FRAC_PI_2]);
    }

    #[test]
    fn test_low_frequency_positions() {
        let five_one = ChannelLayout::FivePointOne.azimuths();
        let lfe: Vec<usize> = five_one
            .iter()
            .enumerate()
            .filter(|(_, a)| is_low_frequency(**a))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(lfe, vec![3]);
    }

    #[test]
    fn test_speakers_for_mask() {
        let layout = speakers_for_mask(speakers::FIVE_POINT_ONE);
        assert_eq!(layout.len(), 6);
        assert_eq!(layout[3].mask_bit, speakers::LOW_FREQUENCY);
        assert!(layout[3].is_low_frequency());
        assert_eq!(layout[3].azimuth, None);
        assert_eq!(layout[4].channel, 4);
        assert_eq!(layout[4].azimuth, Some(azimuth::BACK_LEFT));
    }
}
