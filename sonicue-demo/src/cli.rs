use crate::content::{SETTINGS, SOUND_BANK, TextDecoder, WAVE_BANK};
use anyhow::{Context, Result};
use sonicue::math::Vec3;
use sonicue::spatial::{self, DspSettings, Emitter, Listener, Spatializer, speakers};
use sonicue::{
    Engine, HandleMode, NotificationDescription, NotificationTarget, RuntimeParameters, StopFlags,
    WavePrepareFlags,
};
use std::io::Cursor;
use std::sync::Arc;

pub fn run_cli_tests() {
    log::info!("=== Running Flyby Test ===");
    if let Err(e) = test_flyby() {
        log::error!("Flyby test failed: {e:#}");
    }

    log::info!("\n=== Running Wave Bank Test ===");
    if let Err(e) = test_wave_bank() {
        log::error!("Wave bank test failed: {e:#}");
    }
}

fn create_engine(mask: u32) -> Result<Engine> {
    let engine = Engine::create();
    let params = RuntimeParameters::new(SETTINGS.as_bytes().to_vec(), Arc::new(TextDecoder))
        .with_output_channel_mask(mask);
    engine
        .initialize(params)
        .context("Failed to initialize engine")?;
    Ok(engine)
}

fn drain_notifications(engine: &Engine) -> Result<()> {
    for notification in engine.poll_notifications()? {
        log::info!("Notification: {notification:?}");
    }
    Ok(())
}

/// Moves a helicopter past a 5.1 listener and feeds the result to its cue.
fn test_flyby() -> Result<()> {
    let engine = create_engine(speakers::FIVE_POINT_ONE)?;
    let format = engine.final_mix_format()?;
    log::info!(
        "Engine initialized: mask {:#x}, {} channels",
        format.channel_mask,
        format.channel_count
    );

    let bank = engine.create_sound_bank(SOUND_BANK.as_bytes(), 0)?;
    let index = bank
        .get_cue_index("helicopter")?
        .context("sound bank has no helicopter cue")?;
    let cue = bank.prepare(index, 0, 0)?;
    engine.register_notification(
        &NotificationDescription::new(NotificationTarget::CueStop(&cue))
            .with_context(usize::from(index)),
    )?;
    engine.register_notification(
        &NotificationDescription::new(NotificationTarget::GlobalVariableChanged).persistent(),
    )?;

    let spatializer = Spatializer::new(&engine)?;
    let listener = Listener::default();
    let mut emitter = Emitter {
        velocity: Vec3::new(40.0, 0.0, 0.0),
        ..Emitter::at(Vec3::new(-100.0, 10.0, 20.0))
    };
    let mut settings = DspSettings::new(emitter.channel_count, format.channel_count)?;

    cue.play()?;
    for frame in 0..6 {
        spatializer.calculate(&listener, &mut emitter, &mut settings)?;
        spatial::apply(Some(&settings), Some(&cue))?;
        log::info!(
            "Frame {frame}: distance {:.1}, doppler {:.3}, angle {:.1} deg, gains {:?}",
            settings.emitter_to_listener_distance,
            settings.doppler_factor,
            settings.emitter_to_listener_degrees(),
            settings.matrix.coefficients()
        );
        emitter.position += emitter.velocity;
        engine.do_work()?;
    }

    if let Some(level) = engine.get_global_variable_index("MasterLevel")? {
        engine.set_global_variable(level, 0.5)?;
    }
    cue.stop(StopFlags::RELEASE)?;
    engine.do_work()?;
    drain_notifications(&engine)?;

    cue.destroy()?;
    bank.destroy()?;
    let remaining = engine.release();
    log::info!("Engine released, {remaining} references left");
    Ok(())
}

/// Plays waves from an in-memory bank and from a stream.
fn test_wave_bank() -> Result<()> {
    let engine = create_engine(speakers::STEREO)?;

    let bank = engine.create_in_memory_wave_bank(WAVE_BANK.as_bytes(), 0)?;
    for index in 0..bank.get_num_waves()? {
        let properties = bank.get_wave_properties(index)?;
        log::info!("Wave {index}: {properties:?}");
    }

    let wave = bank.prepare(0, WavePrepareFlags::empty(), 0, 0)?;
    engine.register_notification(
        &NotificationDescription::new(NotificationTarget::WaveStop(&wave)).persistent(),
    )?;
    wave.play()?;
    wave.set_pitch(-600)?;
    wave.set_volume(0.7)?;
    log::info!("Wave state {:?}, pitch {}", wave.get_state()?, wave.pitch()?);
    wave.stop(StopFlags::IMMEDIATE)?;
    drain_notifications(&engine)?;

    // The same bank, stored after a 16-byte header in a "file".
    let mut file = vec![0u8; 16];
    file.extend_from_slice(WAVE_BANK.as_bytes());
    let streaming = engine.create_streaming_wave_bank(
        sonicue::StreamingParameters::new(Box::new(Cursor::new(file))).with_offset(16),
    )?;
    let fire_and_forget = streaming.play(
        1,
        WavePrepareFlags::UNITS_MS,
        250,
        0,
        HandleMode::FireAndForget,
    )?;
    log::info!(
        "Streaming bank state {:?}, handle returned: {}",
        streaming.get_state()?,
        fire_and_forget.is_some()
    );
    streaming.stop(1, StopFlags::IMMEDIATE)?;
    engine.do_work()?;

    engine.shutdown()?;
    log::info!("Engine shut down");
    Ok(())
}
