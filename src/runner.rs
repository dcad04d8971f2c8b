use std::time::Duration;

use crate::error::Error;
use crate::frametimer::FrameTimer;
use crate::peripherals::{AudioPlayer, Clock, LightOutput, MotionSensor, ShutdownSignal};
use crate::statemachine::EffectStateMachine;

/// Everything the main loop talks to.
pub struct Board<C, S, L, A> {
    pub clock: C,
    pub sensor: S,
    pub lights: L,
    pub audio: A,
}

/// Drives the state machine until shutdown is requested or a collaborator
/// fails. Either way all outputs are switched off before returning.
pub fn run<C, S, L, A, X>(
    machine: &mut EffectStateMachine,
    board: &mut Board<C, S, L, A>,
    shutdown: &X,
    pause: Duration,
) -> Result<(), Error>
where
    C: Clock,
    S: MotionSensor,
    L: LightOutput,
    A: AudioPlayer,
    X: ShutdownSignal,
{
    log::info!("Waiting for motion");
    let result = drive(machine, board, shutdown, pause);
    if let Err(err) = &result {
        log::error!("Stopping after failure: {err}");
    }

    let cleanup = switch_off(board);
    result.and(cleanup)
}

fn drive<C, S, L, A, X>(
    machine: &mut EffectStateMachine,
    board: &mut Board<C, S, L, A>,
    shutdown: &X,
    pause: Duration,
) -> Result<(), Error>
where
    C: Clock,
    S: MotionSensor,
    L: LightOutput,
    A: AudioPlayer,
    X: ShutdownSignal,
{
    let mut timer = FrameTimer::new(&board.clock, pause);

    while !shutdown.is_requested() {
        let (now, delta_ms) = timer.next_frame(&board.clock);
        machine.tick(
            delta_ms,
            now,
            &mut board.sensor,
            &mut board.lights,
            &mut board.audio,
        )?;
        board.lights.flush()?;
        timer.pause(&board.clock);
    }

    Ok(())
}

fn switch_off<C, S, L, A>(board: &mut Board<C, S, L, A>) -> Result<(), Error>
where
    L: LightOutput,
    A: AudioPlayer,
{
    log::info!("Switching all outputs off");
    // Lights go first, a failing player must not keep them on.
    let lights = board.lights.blackout();
    let audio = board.audio.stop();
    lights.and(audio)
}

/// Logs the raw sensor level once per `interval`, for checking the wiring.
pub fn readout<C, S, X>(clock: &C, sensor: &mut S, shutdown: &X, interval: Duration)
where
    C: Clock,
    S: MotionSensor,
    X: ShutdownSignal,
{
    let mut last = None;
    while !shutdown.is_requested() {
        let motion = sensor.read();
        if motion {
            log::info!("Motion");
        } else {
            log::info!("No motion");
        }
        if last.is_some_and(|last| last != motion) {
            log::debug!("Sensor level changed");
        }
        last = Some(motion);
        clock.sleep(interval);
    }
}
