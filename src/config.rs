use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config_file::FromConfigFile;
use serde::Deserialize;

use crate::error::Error;

pub const DEFAULT_ASSET: &str = "jingle-bells-mono.wav";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PulseSettings {
    pub cycle_ms: f32,
    pub peak: f32,
    pub saturation: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlickerSettings {
    pub interval_ms: f32,
    pub min: f32,
    pub max: f32,
    /// Mono channels are on while the flicker value is above this.
    pub threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    pub idle: PulseSettings,
    pub triggered: PulseSettings,
    pub flicker: FlickerSettings,
    /// Fixed RNG seed for reproducible animations.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TriggerSettings {
    pub confirm_delay_secs: f32,
    pub asset: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlayerSettings {
    /// Spawns an external program with the WAV path as its only argument.
    Command { program: String },
    /// In-process playback through SDL2, needs the `sdl` feature.
    Sdl,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub wav_root: PathBuf,
    pub player: PlayerSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SensorSettings {
    Gpio {
        chip: PathBuf,
        line: u32,
        #[serde(default)]
        active_low: bool,
    },
    Osc {
        listen: SocketAddr,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub ola_addr: SocketAddr,
    pub universe: u16,
    /// First of three consecutive DMX channels for red, green and blue.
    pub rgb_channel: u16,
    /// First of six consecutive DMX channels for the mono outputs.
    pub mono_channel: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub effects: EffectSettings,
    pub trigger: TriggerSettings,
    pub audio: AudioSettings,
    pub sensor: SensorSettings,
    pub output: OutputSettings,
    /// Pause between loop iterations, bounds CPU use only.
    pub frame_pause_ms: u64,
}

impl Default for PulseSettings {
    fn default() -> Self {
        PulseSettings {
            cycle_ms: 1000.0,
            peak: 1.0,
            saturation: 1.0,
        }
    }
}

impl Default for FlickerSettings {
    fn default() -> Self {
        FlickerSettings {
            interval_ms: 1200.0,
            min: 0.0,
            max: 1.0,
            threshold: 0.5,
        }
    }
}

impl Default for EffectSettings {
    fn default() -> Self {
        EffectSettings {
            idle: PulseSettings {
                cycle_ms: 4800.0,
                peak: 0.25,
                saturation: 1.0,
            },
            triggered: PulseSettings {
                cycle_ms: 600.0,
                peak: 1.0,
                saturation: 1.0,
            },
            flicker: FlickerSettings::default(),
            seed: None,
        }
    }
}

impl Default for TriggerSettings {
    fn default() -> Self {
        TriggerSettings {
            confirm_delay_secs: 2.0,
            asset: DEFAULT_ASSET.to_string(),
        }
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        PlayerSettings::Command {
            program: "aplay".to_string(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        AudioSettings {
            wav_root: PathBuf::from("/wav"),
            player: PlayerSettings::default(),
        }
    }
}

impl Default for SensorSettings {
    fn default() -> Self {
        SensorSettings::Gpio {
            chip: PathBuf::from("/dev/gpiochip0"),
            line: 17,
            active_low: false,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            ola_addr: SocketAddr::from(([127, 0, 0, 1], 7770)),
            universe: 0,
            rgb_channel: 0,
            mono_channel: 3,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            effects: EffectSettings::default(),
            trigger: TriggerSettings::default(),
            audio: AudioSettings::default(),
            sensor: SensorSettings::default(),
            output: OutputSettings::default(),
            frame_pause_ms: 10,
        }
    }
}

fn unit_range(name: &str, value: f32) -> Result<(), Error> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} must be within 0..=1, got {value}")))
    }
}

fn positive(name: &str, value: f32) -> Result<(), Error> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} must be positive, got {value}")))
    }
}

impl PulseSettings {
    fn validate(&self, name: &str) -> Result<(), Error> {
        positive(&format!("effects.{name}.cycle_ms"), self.cycle_ms)?;
        unit_range(&format!("effects.{name}.peak"), self.peak)?;
        unit_range(&format!("effects.{name}.saturation"), self.saturation)
    }
}

impl FlickerSettings {
    fn validate(&self) -> Result<(), Error> {
        positive("effects.flicker.interval_ms", self.interval_ms)?;
        unit_range("effects.flicker.min", self.min)?;
        unit_range("effects.flicker.max", self.max)?;
        unit_range("effects.flicker.threshold", self.threshold)?;
        if self.min > self.max {
            return Err(Error::Config(
                "effects.flicker.min must not exceed effects.flicker.max".to_string(),
            ));
        }
        Ok(())
    }
}

impl TriggerSettings {
    pub fn confirm_delay(&self) -> Result<Duration, Error> {
        Duration::try_from_secs_f32(self.confirm_delay_secs).map_err(|err| {
            Error::Config(format!(
                "trigger.confirm_delay_secs {}: {}",
                self.confirm_delay_secs, err
            ))
        })
    }
}

impl Settings {
    /// Reads `path` without validating it, so callers can apply overrides first.
    pub fn load(path: &Path) -> Result<Settings, Error> {
        Settings::from_config_file(path)
            .map_err(|err| Error::Config(format!("{}: {}", path.display(), err)))
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.effects.idle.validate("idle")?;
        self.effects.triggered.validate("triggered")?;
        self.effects.flicker.validate()?;

        self.trigger.confirm_delay()?;
        if self.trigger.asset.is_empty() {
            return Err(Error::Config("trigger.asset must not be empty".to_string()));
        }

        let dmx_end = |start: u16, count: u16| start as usize + count as usize;
        if dmx_end(self.output.rgb_channel, 3) > 512 || dmx_end(self.output.mono_channel, 6) > 512
        {
            return Err(Error::Config(
                "output channels must fit into one DMX universe".to_string(),
            ));
        }

        Ok(())
    }

    pub fn frame_pause(&self) -> Duration {
        Duration::from_millis(self.frame_pause_ms)
    }

    pub fn asset_path(&self) -> PathBuf {
        self.audio.wav_root.join(&self.trigger.asset)
    }
}
