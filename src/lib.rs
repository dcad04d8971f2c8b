//! Motion triggered ambient lighting and audio.
//!
//! A PIR sensor switches between a slow ambient color pulse and a triggered
//! mode that plays a sound while the RGB channel pulses fast and the mono
//! channels flicker at random. [`EffectStateMachine::tick`] runs one frame and
//! can be driven by [`runner::run`] or any other loop.

pub mod cmdplayer;
pub mod config;
pub mod effects;
pub mod error;
pub mod frametimer;
pub mod gpiosensor;
pub mod olaoutput;
pub mod osc;
pub mod peripherals;
pub mod runner;
#[cfg(feature = "sdl")]
pub mod sdlplayer;
pub mod statemachine;
#[cfg(test)]
pub(crate) mod testing;
pub mod triggerdebouncer;

pub use error::Error;
pub use statemachine::{EffectStateMachine, TriggerState};
