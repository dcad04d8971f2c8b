//! Contracts between the effect engine and the hardware around it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::Error;

/// Number of mono LED channels on the board.
pub const MONO_CHANNELS: usize = 6;

pub trait Clock {
    fn now(&self) -> Instant;

    fn elapsed(&self, since: Instant) -> Duration {
        self.now().saturating_duration_since(since)
    }

    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Raw PIR level, `true` while motion is asserted. Must not block.
pub trait MotionSensor {
    fn read(&mut self) -> bool;
}

/// One RGB channel and [`MONO_CHANNELS`] on/off channels.
///
/// Writes may be buffered until [`LightOutput::flush`].
pub trait LightOutput {
    fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), Error>;
    fn mono_on(&mut self, channel: usize) -> Result<(), Error>;
    fn mono_off(&mut self, channel: usize) -> Result<(), Error>;

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn all_mono_off(&mut self) -> Result<(), Error> {
        for channel in 0..MONO_CHANNELS {
            self.mono_off(channel)?;
        }
        Ok(())
    }

    fn blackout(&mut self) -> Result<(), Error> {
        self.set_rgb(0, 0, 0)?;
        self.all_mono_off()?;
        self.flush()
    }
}

pub trait AudioPlayer {
    /// Starts playing `asset` and returns immediately.
    fn play(&mut self, asset: &str) -> Result<(), Error>;
    fn is_playing(&mut self) -> bool;
    fn stop(&mut self) -> Result<(), Error>;
}

impl<T: MotionSensor + ?Sized> MotionSensor for Box<T> {
    fn read(&mut self) -> bool {
        (**self).read()
    }
}

impl<T: AudioPlayer + ?Sized> AudioPlayer for Box<T> {
    fn play(&mut self, asset: &str) -> Result<(), Error> {
        (**self).play(asset)
    }

    fn is_playing(&mut self) -> bool {
        (**self).is_playing()
    }

    fn stop(&mut self) -> Result<(), Error> {
        (**self).stop()
    }
}

pub trait ShutdownSignal {
    fn is_requested(&self) -> bool;
}

impl ShutdownSignal for Arc<AtomicBool> {
    fn is_requested(&self) -> bool {
        self.load(Ordering::SeqCst)
    }
}

/// Flags the returned token once Ctrl-C is received.
pub fn install_shutdown_handler() -> Result<Arc<AtomicBool>, Error> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        log::info!("Shutdown requested");
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|err| Error::Config(format!("Cannot install signal handler: {err}")))?;

    Ok(shutdown)
}
