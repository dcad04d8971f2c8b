//! Test doubles for the peripherals.

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::error::Error;
use crate::peripherals::{AudioPlayer, Clock, LightOutput, MotionSensor, MONO_CHANNELS};

/// Clock that only moves when told to. `sleep` advances it.
pub(crate) struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub(crate) fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Sensor returning a fixed level, or queued levels first when present.
pub(crate) struct ScriptedSensor {
    pub(crate) level: bool,
    pub(crate) queued: VecDeque<bool>,
    pub(crate) reads: usize,
}

impl ScriptedSensor {
    pub(crate) fn new(level: bool) -> Self {
        Self {
            level,
            queued: VecDeque::new(),
            reads: 0,
        }
    }
}

impl MotionSensor for ScriptedSensor {
    fn read(&mut self) -> bool {
        self.reads += 1;
        self.queued.pop_front().unwrap_or(self.level)
    }
}

pub(crate) struct RecordingLights {
    pub(crate) rgb: [u8; 3],
    pub(crate) mono: [bool; MONO_CHANNELS],
    pub(crate) rgb_writes: usize,
    pub(crate) flushes: usize,
    pub(crate) fail_after: Option<usize>,
}

impl RecordingLights {
    pub(crate) fn new() -> Self {
        Self {
            rgb: [0; 3],
            mono: [false; MONO_CHANNELS],
            rgb_writes: 0,
            flushes: 0,
            fail_after: None,
        }
    }
}

impl LightOutput for RecordingLights {
    fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), Error> {
        if let Some(limit) = self.fail_after {
            if self.rgb_writes >= limit {
                // The cleanup path still has to get through.
                if [r, g, b] != [0, 0, 0] {
                    return Err(Error::Osc("output unreachable".to_string()));
                }
            }
        }
        self.rgb = [r, g, b];
        self.rgb_writes += 1;
        Ok(())
    }

    fn mono_on(&mut self, channel: usize) -> Result<(), Error> {
        self.mono[channel] = true;
        Ok(())
    }

    fn mono_off(&mut self, channel: usize) -> Result<(), Error> {
        self.mono[channel] = false;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.flushes += 1;
        Ok(())
    }
}

/// Player whose `is_playing` answers come from a script, then `playing`.
pub(crate) struct ScriptedPlayer {
    pub(crate) started: Vec<String>,
    pub(crate) playing: bool,
    pub(crate) answers: VecDeque<bool>,
    pub(crate) polls: usize,
    pub(crate) stops: usize,
}

impl ScriptedPlayer {
    pub(crate) fn new() -> Self {
        Self {
            started: Vec::new(),
            playing: false,
            answers: VecDeque::new(),
            polls: 0,
            stops: 0,
        }
    }
}

impl AudioPlayer for ScriptedPlayer {
    fn play(&mut self, asset: &str) -> Result<(), Error> {
        self.started.push(asset.to_string());
        self.playing = true;
        Ok(())
    }

    fn is_playing(&mut self) -> bool {
        self.polls += 1;
        self.answers.pop_front().unwrap_or(self.playing)
    }

    fn stop(&mut self) -> Result<(), Error> {
        self.stops += 1;
        self.playing = false;
        Ok(())
    }
}
