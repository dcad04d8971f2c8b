use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Settings;
use crate::effects::{rgb_to_device, Effect, HsvPulse, RandomFlicker};
use crate::error::Error;
use crate::peripherals::{AudioPlayer, LightOutput, MotionSensor, MONO_CHANNELS};
use crate::triggerdebouncer::TriggerDebouncer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    /// Slow ambient pulse, waiting for motion.
    Idle,
    /// Audio is playing, fast pulse plus flickering mono channels.
    Triggered,
}

/// Owns every effect and decides which of them drive the outputs.
///
/// The idle pulse is paused while triggered and picks up where it left off.
pub struct EffectStateMachine {
    state: TriggerState,
    debouncer: TriggerDebouncer,
    idle_color: HsvPulse,
    triggered_color: HsvPulse,
    flickers: [RandomFlicker; MONO_CHANNELS],
    flicker_threshold: f32,
    asset: String,
}

impl EffectStateMachine {
    pub fn new(settings: &Settings) -> Result<EffectStateMachine, Error> {
        let effects = &settings.effects;
        // One generator per effect.
        let mut next_rng = {
            let mut stream = 0u64;
            move || {
                stream += 1;
                match effects.seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
                    None => StdRng::from_entropy(),
                }
            }
        };

        let idle_color = HsvPulse::new(
            next_rng(),
            effects.idle.cycle_ms,
            effects.idle.peak,
            effects.idle.saturation,
        );
        let triggered_color = HsvPulse::new(
            next_rng(),
            effects.triggered.cycle_ms,
            effects.triggered.peak,
            effects.triggered.saturation,
        );
        let flicker = &effects.flicker;
        let flickers = std::array::from_fn(|_| {
            RandomFlicker::new(next_rng(), flicker.interval_ms, flicker.min, flicker.max)
        });

        Ok(EffectStateMachine {
            state: TriggerState::Idle,
            debouncer: TriggerDebouncer::new(settings.trigger.confirm_delay()?),
            idle_color,
            triggered_color,
            flickers,
            flicker_threshold: flicker.threshold,
            asset: settings.trigger.asset.clone(),
        })
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn idle_color(&self) -> &HsvPulse {
        &self.idle_color
    }

    pub fn triggered_color(&self) -> &HsvPulse {
        &self.triggered_color
    }

    pub fn flickers(&self) -> &[RandomFlicker] {
        &self.flickers
    }

    pub fn debouncer(&self) -> &TriggerDebouncer {
        &self.debouncer
    }

    /// Runs one frame. The sensor is read once, plus once more if a trigger
    /// is up for confirmation.
    pub fn tick<S, L, A>(
        &mut self,
        delta_ms: f32,
        now: Instant,
        sensor: &mut S,
        lights: &mut L,
        audio: &mut A,
    ) -> Result<TriggerState, Error>
    where
        S: MotionSensor,
        L: LightOutput,
        A: AudioPlayer,
    {
        let motion = sensor.read();

        match self.state {
            TriggerState::Idle => {
                self.idle_color.tick(delta_ms);
                let [r, g, b] = rgb_to_device(self.idle_color.sample());
                lights.set_rgb(r, g, b)?;
                lights.all_mono_off()?;

                if self.debouncer.update(motion, now, || sensor.read()) {
                    self.enter_triggered(audio)?;
                }
            }
            TriggerState::Triggered => {
                self.triggered_color.tick(delta_ms);
                let [r, g, b] = rgb_to_device(self.triggered_color.sample());
                lights.set_rgb(r, g, b)?;

                for (channel, flicker) in self.flickers.iter_mut().enumerate() {
                    flicker.tick(delta_ms);
                    if flicker.sample() > self.flicker_threshold {
                        lights.mono_on(channel)?;
                    } else {
                        lights.mono_off(channel)?;
                    }
                }

                if !audio.is_playing() {
                    log::info!("Playback finished, back to idle");
                    self.state = TriggerState::Idle;
                    lights.all_mono_off()?;
                }
            }
        }

        Ok(self.state)
    }

    fn enter_triggered<A: AudioPlayer>(&mut self, audio: &mut A) -> Result<(), Error> {
        log::info!("Motion confirmed, playing {}", self.asset);
        self.state = TriggerState::Triggered;
        self.triggered_color.reset();
        for flicker in &mut self.flickers {
            flicker.reset();
        }
        audio.play(&self.asset)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{RecordingLights, ScriptedPlayer, ScriptedSensor};

    const FRAME_MS: u64 = 100;

    struct Rig {
        machine: EffectStateMachine,
        now: Instant,
        sensor: ScriptedSensor,
        lights: RecordingLights,
        audio: ScriptedPlayer,
    }

    impl Rig {
        fn new() -> Rig {
            let mut settings = Settings::default();
            settings.effects.seed = Some(42);
            Rig {
                machine: EffectStateMachine::new(&settings).unwrap(),
                now: Instant::now(),
                sensor: ScriptedSensor::new(false),
                lights: RecordingLights::new(),
                audio: ScriptedPlayer::new(),
            }
        }

        fn tick(&mut self) -> TriggerState {
            self.now += Duration::from_millis(FRAME_MS);
            self.machine
                .tick(
                    FRAME_MS as f32,
                    self.now,
                    &mut self.sensor,
                    &mut self.lights,
                    &mut self.audio,
                )
                .unwrap()
        }

        /// Holds motion until the trigger fires, returns the ticks it took.
        fn trigger(&mut self) -> usize {
            self.sensor.level = true;
            let mut ticks = 0;
            while self.machine.state() == TriggerState::Idle {
                self.tick();
                ticks += 1;
                assert!(ticks < 100, "trigger never fired");
            }
            ticks
        }
    }

    #[test]
    fn starts_idle_with_ambient_pulse() {
        let mut rig = Rig::new();
        assert_eq!(rig.machine.state(), TriggerState::Idle);

        for _ in 0..2 {
            assert_eq!(rig.tick(), TriggerState::Idle);
            let expected = rgb_to_device(rig.machine.idle_color().sample());
            assert_eq!(rig.lights.rgb, expected);
            assert_eq!(rig.lights.mono, [false; MONO_CHANNELS]);
        }

        assert_eq!(rig.machine.idle_color().elapsed_ms(), 200.0);
        assert!(rig.audio.started.is_empty());
    }

    #[test]
    fn confirmed_motion_triggers_playback_once() {
        let mut rig = Rig::new();
        rig.tick();
        rig.tick();

        let ticks = rig.trigger();
        // Arms on the first motion tick, fires 2s later.
        assert_eq!(ticks, 21);
        assert_eq!(rig.machine.state(), TriggerState::Triggered);
        assert_eq!(rig.audio.started, vec!["jingle-bells-mono.wav".to_string()]);

        assert_eq!(rig.machine.triggered_color().elapsed_ms(), 0.0);
        for flicker in rig.machine.flickers() {
            assert_eq!(flicker.elapsed_ms(), 0.0);
        }

        for _ in 0..5 {
            rig.tick();
        }
        assert_eq!(rig.audio.started.len(), 1);
    }

    #[test]
    fn trigger_resets_timers_from_a_previous_episode() {
        let mut rig = Rig::new();
        rig.trigger();
        rig.sensor.level = false;
        for _ in 0..7 {
            rig.tick();
        }
        assert_eq!(rig.machine.triggered_color().elapsed_ms(), 100.0);
        assert_eq!(rig.machine.flickers()[0].elapsed_ms(), 700.0);

        rig.audio.playing = false;
        assert_eq!(rig.tick(), TriggerState::Idle);

        rig.trigger();
        assert_eq!(rig.machine.triggered_color().elapsed_ms(), 0.0);
        for flicker in rig.machine.flickers() {
            assert_eq!(flicker.elapsed_ms(), 0.0);
        }
        assert_eq!(rig.audio.started.len(), 2);
    }

    #[test]
    fn failed_recheck_keeps_idle() {
        let mut rig = Rig::new();
        rig.sensor.level = true;
        for _ in 0..20 {
            rig.tick();
        }
        assert!(rig.machine.debouncer().is_pending());

        // Tick 21 reads motion, then the recheck sees nothing.
        rig.sensor.queued.extend([true, false]);
        assert_eq!(rig.tick(), TriggerState::Idle);
        assert!(!rig.machine.debouncer().is_pending());
        assert!(rig.audio.started.is_empty());
    }

    #[test]
    fn stays_triggered_while_playing_regardless_of_motion() {
        let mut rig = Rig::new();
        rig.trigger();

        for i in 0..10 {
            rig.sensor.level = i % 2 == 0;
            assert_eq!(rig.tick(), TriggerState::Triggered);
        }
        assert_eq!(rig.audio.started.len(), 1);
    }

    #[test]
    fn returns_to_idle_on_first_finished_poll() {
        let mut rig = Rig::new();
        rig.trigger();
        rig.sensor.level = false;
        rig.audio.answers.extend([true; 10]);
        rig.audio.answers.push_back(false);

        for _ in 0..10 {
            assert_eq!(rig.tick(), TriggerState::Triggered);
        }
        assert_eq!(rig.tick(), TriggerState::Idle);
        assert_eq!(rig.lights.mono, [false; MONO_CHANNELS]);
    }

    #[test]
    fn mono_channels_follow_flicker_threshold() {
        let mut rig = Rig::new();
        rig.trigger();
        rig.sensor.level = false;

        for _ in 0..30 {
            rig.tick();
            for (channel, flicker) in rig.machine.flickers().iter().enumerate() {
                assert_eq!(rig.lights.mono[channel], flicker.sample() > 0.5);
            }
            let expected = rgb_to_device(rig.machine.triggered_color().sample());
            assert_eq!(rig.lights.rgb, expected);
        }
    }

    #[test]
    fn idle_pulse_is_paused_while_triggered() {
        let mut rig = Rig::new();
        rig.trigger();
        let paused_at = rig.machine.idle_color().elapsed_ms();

        rig.sensor.level = false;
        for _ in 0..5 {
            rig.tick();
        }
        assert_eq!(rig.machine.idle_color().elapsed_ms(), paused_at);

        rig.audio.playing = false;
        rig.tick();
        rig.tick();
        let expected = (paused_at + FRAME_MS as f32) % 4800.0;
        assert_eq!(rig.machine.idle_color().elapsed_ms(), expected);
    }

    #[test]
    fn unrepresentable_confirm_delay_is_a_config_error() {
        let mut settings = Settings::default();
        settings.trigger.confirm_delay_secs = 1e30;
        assert!(matches!(
            EffectStateMachine::new(&settings),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn output_failures_propagate() {
        let mut rig = Rig::new();
        rig.lights.fail_after = Some(0);
        let result = rig.machine.tick(
            10.0,
            rig.now,
            &mut rig.sensor,
            &mut rig.lights,
            &mut rig.audio,
        );
        // The idle pulse starts dark, so the first write is black and passes.
        assert!(result.is_ok());

        let result = rig.machine.tick(
            1200.0,
            rig.now,
            &mut rig.sensor,
            &mut rig.lights,
            &mut rig.audio,
        );
        assert!(matches!(result, Err(Error::Osc(_))));
    }
}
