//! A line-based authoring format for the demo's banks.
//!
//! The first line names the buffer kind (`settings`, `soundbank <name>` or
//! `wavebank <name>`); every following line declares one item. Blank lines
//! and `#` comments are ignored.

use sonicue::content::{
    CategoryDesc, ContentDecoder, CueDefinition, DecodeError, GlobalSettings, SoundBankData,
    VariableDesc, WaveBankData, WaveEntry,
};

pub const SETTINGS: &str = "\
settings
category Global
category Music parent=0 volume=0.8
category Sfx parent=0
global SpeedOfSound 343 0 1000000
global MasterLevel 1 0 1
instance Distance 0 0 1000000
instance DopplerPitchScalar 1 0 4
instance OrientationAngle 0 -180 180
";

pub const SOUND_BANK: &str = "\
soundbank Flyby
# name category channels
cue helicopter 2 1
cue engine_loop 2 2
cue score 1 2
";

pub const WAVE_BANK: &str = "\
wavebank Flyby
wave rotor 1 48000 480000
wave wind 2 44100 441000
";

#[derive(Debug, Default)]
pub struct TextDecoder;

impl TextDecoder {
    fn lines<'a>(buffer: &'a [u8], kind: &str) -> Result<(String, Vec<Vec<&'a str>>), DecodeError> {
        let text = std::str::from_utf8(buffer)
            .map_err(|e| DecodeError::new(format!("buffer is not UTF-8: {e}")))?;
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.split_whitespace().collect::<Vec<_>>());

        let header = lines
            .next()
            .ok_or_else(|| DecodeError::new("empty buffer"))?;
        if header.first() != Some(&kind) {
            return Err(DecodeError::new(format!(
                "expected a '{kind}' buffer, found '{}'",
                header.join(" ")
            )));
        }
        let name = header.get(1).copied().unwrap_or_default().to_string();
        Ok((name, lines.collect()))
    }
}

fn number<T: std::str::FromStr>(token: Option<&&str>, what: &str) -> Result<T, DecodeError> {
    token
        .ok_or_else(|| DecodeError::new(format!("missing {what}")))?
        .parse()
        .map_err(|_| DecodeError::new(format!("invalid {what}")))
}

fn option<'a>(fields: &[&'a str], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find_map(|field| field.strip_prefix(key)?.strip_prefix('='))
}

fn variable(fields: &[&str]) -> Result<(String, f32, f32, f32), DecodeError> {
    let name = fields
        .get(1)
        .ok_or_else(|| DecodeError::new("variable without a name"))?;
    Ok((
        name.to_string(),
        number(fields.get(2), "initial value")?,
        number(fields.get(3), "minimum")?,
        number(fields.get(4), "maximum")?,
    ))
}

impl ContentDecoder for TextDecoder {
    fn decode_global_settings(&self, buffer: &[u8]) -> Result<GlobalSettings, DecodeError> {
        let (_, lines) = Self::lines(buffer, "settings")?;
        let mut settings = GlobalSettings::new();
        for fields in lines {
            match fields[0] {
                "category" => {
                    let name = fields
                        .get(1)
                        .ok_or_else(|| DecodeError::new("category without a name"))?;
                    let mut category = CategoryDesc::new(*name);
                    if let Some(parent) = option(&fields, "parent") {
                        category = category.with_parent(number(Some(&parent), "parent")?);
                    }
                    if let Some(volume) = option(&fields, "volume") {
                        category = category.with_volume(number(Some(&volume), "volume")?);
                    }
                    settings = settings.with_category(category);
                }
                "global" => {
                    let (name, initial, min, max) = variable(&fields)?;
                    settings =
                        settings.with_variable(VariableDesc::global(name, initial, min, max));
                }
                "instance" => {
                    let (name, initial, min, max) = variable(&fields)?;
                    settings =
                        settings.with_variable(VariableDesc::instance(name, initial, min, max));
                }
                other => return Err(DecodeError::new(format!("unknown settings item '{other}'"))),
            }
        }
        Ok(settings)
    }

    fn decode_sound_bank(&self, buffer: &[u8]) -> Result<SoundBankData, DecodeError> {
        let (name, lines) = Self::lines(buffer, "soundbank")?;
        let cues = lines
            .iter()
            .map(|fields| match fields.as_slice() {
                ["cue", name, category, channels] => Ok(CueDefinition::new(
                    *name,
                    number(Some(category), "category")?,
                    number(Some(channels), "channel count")?,
                )),
                _ => Err(DecodeError::new(format!("bad cue line '{}'", fields.join(" ")))),
            })
            .collect::<Result<_, _>>()?;
        Ok(SoundBankData { name, cues })
    }

    fn decode_wave_bank(&self, buffer: &[u8]) -> Result<WaveBankData, DecodeError> {
        let (name, lines) = Self::lines(buffer, "wavebank")?;
        let entries = lines
            .iter()
            .map(|fields| match fields.as_slice() {
                ["wave", name, channels, rate, samples] => Ok(WaveEntry::new(
                    number(Some(channels), "channel count")?,
                    number(Some(rate), "sample rate")?,
                    number(Some(samples), "duration")?,
                )
                .named(*name)),
                _ => Err(DecodeError::new(format!("bad wave line '{}'", fields.join(" ")))),
            })
            .collect::<Result<_, _>>()?;
        Ok(WaveBankData { name, entries })
    }
}
