//! Geometry behind [`Spatializer::calculate`](super::Spatializer::calculate):
//! per-channel panning, distance and cone attenuation, doppler and the
//! emitter-to-listener angle.

use super::curve::DistanceCurve;
use super::dsp::DspSettings;
use super::layout::{self, Speaker};
use super::scene::{Emitter, Listener};
use crate::math::{Orientation, Vec3, wrap_angle};
use std::f32::consts::FRAC_PI_2;

const MIN_DISTANCE: f32 = 1e-6;
const MIN_DOPPLER: f32 = 0.5;
const MAX_DOPPLER: f32 = 4.0;

bitflags::bitflags! {
    /// Which outputs of [`calculate`] to compute.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct CalculateFlags: u32 {
        const MATRIX = 0x01;
        const DOPPLER = 0x20;
        const EMITTER_ANGLE = 0x40;
        const ALL = Self::MATRIX.bits() | Self::DOPPLER.bits() | Self::EMITTER_ANGLE.bits();
    }
}

/// Final-mix speakers split into the panning ring and the LFE channel.
#[derive(Debug, Clone)]
pub(crate) struct SpeakerRing {
    channel_count: usize,
    /// (azimuth, output channel), sorted by azimuth.
    ring: Vec<(f32, u32)>,
    lfe: Option<u32>,
}

impl SpeakerRing {
    pub fn from_mask(mask: u32) -> Self {
        let speakers: Vec<Speaker> = layout::speakers_for_mask(mask);
        let mut ring: Vec<(f32, u32)> = speakers
            .iter()
            .filter_map(|s| s.azimuth.map(|azimuth| (azimuth, s.channel)))
            .collect();
        ring.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            channel_count: speakers.len(),
            ring,
            lfe: speakers
                .iter()
                .find(|s| s.is_low_frequency())
                .map(|s| s.channel),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Constant-power pan between the two ring speakers around `azimuth`.
    fn pan(&self, azimuth: f32, gains: &mut [f32]) {
        match self.ring.as_slice() {
            [] => {}
            [(_, only)] => gains[*only as usize] += 1.0,
            ring => {
                let azimuth = wrap_angle(azimuth);
                let next = ring.iter().position(|(a, _)| *a > azimuth).unwrap_or(0);
                let prev = (next + ring.len() - 1) % ring.len();
                let (from, from_channel) = ring[prev];
                let (to, to_channel) = ring[next];
                let span = wrap_angle(to - from);
                if span <= MIN_DISTANCE {
                    gains[from_channel as usize] += 1.0;
                    return;
                }
                let t = (wrap_angle(azimuth - from) / span).clamp(0.0, 1.0);
                let angle = t * FRAC_PI_2;
                gains[from_channel as usize] += angle.cos();
                gains[to_channel as usize] += angle.sin();
            }
        }
    }

    /// Equal power on every ring speaker.
    fn spread(&self, gains: &mut [f32]) {
        if self.ring.is_empty() {
            return;
        }
        let gain = 1.0 / (self.ring.len() as f32).sqrt();
        for (_, channel) in &self.ring {
            gains[*channel as usize] += gain;
        }
    }
}

/// Resolved inputs that calculation does not take from the emitter itself.
pub(crate) struct Geometry<'a> {
    pub listener_frame: Orientation,
    pub emitter_frame: Orientation,
    pub azimuths: &'a [f32],
    pub volume_curve: &'a DistanceCurve,
    pub lfe_curve: &'a DistanceCurve,
}

pub(crate) fn calculate(
    speakers: &SpeakerRing,
    speed_of_sound: f32,
    listener: &Listener,
    emitter: &Emitter,
    geometry: &Geometry<'_>,
    flags: CalculateFlags,
    settings: &mut DspSettings,
) {
    let emitter_to_listener = listener.position - emitter.position;
    let distance = emitter_to_listener.length();
    settings.emitter_to_listener_distance = distance;

    if flags.contains(CalculateFlags::MATRIX) {
        fill_matrix(speakers, listener, emitter, geometry, distance, settings);
    }
    if flags.contains(CalculateFlags::DOPPLER) {
        apply_doppler(speed_of_sound, listener, emitter, emitter_to_listener, distance, settings);
    }
    if flags.contains(CalculateFlags::EMITTER_ANGLE) {
        settings.emitter_to_listener_angle =
            emitter_angle(&geometry.listener_frame, emitter_to_listener, distance);
    }
}

fn fill_matrix(
    speakers: &SpeakerRing,
    listener: &Listener,
    emitter: &Emitter,
    geometry: &Geometry<'_>,
    distance: f32,
    settings: &mut DspSettings,
) {
    let scaled_distance = distance / emitter.curve_distance_scaler.max(MIN_DISTANCE);
    let lfe_gain = geometry.lfe_curve.evaluate(scaled_distance);
    let volume_gain =
        geometry.volume_curve.evaluate(scaled_distance) * cone_gain(listener, emitter, geometry);

    let src_channels = settings.matrix.src_channels();
    let dst_channels = settings.matrix.dst_channels();
    settings.matrix.fill(0.0);

    let mut gains = vec![0.0; speakers.channel_count()];
    for src in 0..src_channels {
        gains.fill(0.0);
        let channel_azimuth = (src_channels > 1).then(|| geometry.azimuths[src as usize]);

        if let Some(azimuth) = channel_azimuth.filter(|a| layout::is_low_frequency(*a)) {
            log::trace!("Channel {src} at {azimuth} routed to LFE");
            if let Some(lfe) = speakers.lfe {
                gains[lfe as usize] = lfe_gain;
            }
        } else {
            let position = match channel_azimuth {
                Some(azimuth) if emitter.channel_radius > 0.0 => {
                    emitter.position
                        + geometry.emitter_frame.direction_at(azimuth) * emitter.channel_radius
                }
                _ => emitter.position,
            };
            match geometry
                .listener_frame
                .azimuth_of(position - listener.position)
            {
                Some(azimuth) => speakers.pan(azimuth, &mut gains),
                None => speakers.spread(&mut gains),
            }

            if emitter.inner_radius > 0.0 && distance < emitter.inner_radius {
                let weight = 1.0 - distance / emitter.inner_radius;
                let mut spread = vec![0.0; gains.len()];
                speakers.spread(&mut spread);
                for (gain, even) in gains.iter_mut().zip(&spread) {
                    *gain = *gain * (1.0 - weight) + even * weight;
                }
            }
            for gain in gains.iter_mut() {
                *gain *= volume_gain;
            }
            if src_channels == 1 {
                if let Some(lfe) = speakers.lfe {
                    gains[lfe as usize] = lfe_gain;
                }
            }
        }

        for dst in 0..dst_channels.min(gains.len() as u32) {
            settings.matrix.set(src, dst, gains[dst as usize]);
        }
    }
}

fn cone_gain(listener: &Listener, emitter: &Emitter, geometry: &Geometry<'_>) -> f32 {
    let to_listener = (listener.position - emitter.position).try_normalize();
    let mut gain = 1.0;
    if let Some(cone) = &emitter.cone {
        let angle = to_listener.map_or(0.0, |dir| off_axis(geometry.emitter_frame.front(), dir));
        gain *= cone.volume_at(angle);
    }
    if let Some(cone) = &listener.cone {
        let angle = to_listener.map_or(0.0, |dir| off_axis(geometry.listener_frame.front(), -dir));
        gain *= cone.volume_at(angle);
    }
    gain
}

fn off_axis(axis: Vec3, direction: Vec3) -> f32 {
    axis.dot(direction).clamp(-1.0, 1.0).acos()
}

fn apply_doppler(
    speed_of_sound: f32,
    listener: &Listener,
    emitter: &Emitter,
    emitter_to_listener: Vec3,
    distance: f32,
    settings: &mut DspSettings,
) {
    let (listener_component, emitter_component) = if distance > MIN_DISTANCE {
        (
            emitter_to_listener.dot(listener.velocity) / distance,
            emitter_to_listener.dot(emitter.velocity) / distance,
        )
    } else {
        (0.0, 0.0)
    };
    settings.listener_velocity_component = listener_component;
    settings.emitter_velocity_component = emitter_component;

    if emitter.doppler_scaler <= 0.0 || speed_of_sound <= 0.0 {
        settings.doppler_factor = 1.0;
        return;
    }
    let scaler = emitter.doppler_scaler;
    let limit = speed_of_sound / scaler;
    let listener_component = listener_component.min(limit);
    let emitter_component = emitter_component.min(limit);
    let factor = (speed_of_sound - scaler * listener_component)
        / (speed_of_sound - scaler * emitter_component);
    settings.doppler_factor = if factor.is_nan() {
        1.0
    } else {
        factor.clamp(MIN_DOPPLER, MAX_DOPPLER)
    };
}

/// Angle between the emitter-to-listener direction and the listener's
/// front, signed by which side of the listener the direction points to.
fn emitter_angle(listener_frame: &Orientation, emitter_to_listener: Vec3, distance: f32) -> f32 {
    if distance <= MIN_DISTANCE {
        return 0.0;
    }
    let direction = emitter_to_listener / distance;
    let magnitude = off_axis(listener_frame.front(), direction);
    if direction.dot(listener_frame.right()) < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}
