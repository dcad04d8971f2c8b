use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use pirlicht::cmdplayer::CommandPlayer;
use pirlicht::config::{PlayerSettings, SensorSettings, Settings};
use pirlicht::gpiosensor::GpioMotionSensor;
use pirlicht::olaoutput::OlaOutput;
use pirlicht::osc::OscMotionSensor;
use pirlicht::peripherals::{self, AudioPlayer, MotionSensor, SystemClock};
use pirlicht::runner::{self, Board};
use pirlicht::{EffectStateMachine, Error};

#[derive(Parser)]
#[command(about = "Motion triggered ambient light and audio")]
struct Cli {
    /// TOML settings file, defaults are used for anything missing
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the effect randomness, for reproducible animations
    #[arg(long)]
    seed: Option<u64>,

    /// More log output, repeat for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Run the light and audio controller
    Run,
    /// Log the raw PIR level once per second
    Readout,
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_settings(args: &Cli) -> Result<Settings, Error> {
    let mut settings = match args.config.as_deref() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if args.seed.is_some() {
        settings.effects.seed = args.seed;
    }
    settings.validate()?;
    Ok(settings)
}

fn create_sensor(settings: &SensorSettings) -> Result<Box<dyn MotionSensor>, Error> {
    match settings {
        SensorSettings::Gpio {
            chip,
            line,
            active_low,
        } => Ok(Box::new(GpioMotionSensor::open(chip, *line, *active_low)?)),
        SensorSettings::Osc { listen } => Ok(Box::new(OscMotionSensor::spawn(*listen)?)),
    }
}

fn create_player(settings: &Settings) -> Result<Box<dyn AudioPlayer>, Error> {
    let wav_root = settings.audio.wav_root.clone();
    match &settings.audio.player {
        PlayerSettings::Command { program } => Ok(Box::new(CommandPlayer::new(program, wav_root))),
        #[cfg(feature = "sdl")]
        PlayerSettings::Sdl => Ok(Box::new(pirlicht::sdlplayer::SdlPlayer::new(wav_root)?)),
        #[cfg(not(feature = "sdl"))]
        PlayerSettings::Sdl => Err(Error::Config(
            "SDL playback needs a build with the `sdl` feature".to_string(),
        )),
    }
}

fn main() -> Result<(), Error> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let settings = load_settings(&args)?;
    let shutdown = peripherals::install_shutdown_handler()?;
    let mut sensor = create_sensor(&settings.sensor)?;

    if args.mode == Some(Mode::Readout) {
        runner::readout(&SystemClock, &mut sensor, &shutdown, Duration::from_secs(1));
        return Ok(());
    }

    if !settings.asset_path().exists() {
        log::warn!("{} does not exist", settings.asset_path().display());
    }

    let mut board = Board {
        clock: SystemClock,
        sensor,
        lights: OlaOutput::new(&settings.output)?,
        audio: create_player(&settings)?,
    };
    let mut machine = EffectStateMachine::new(&settings)?;

    runner::run(&mut machine, &mut board, &shutdown, settings.frame_pause())
}
