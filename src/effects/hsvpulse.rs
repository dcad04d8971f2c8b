use std::f32::consts::PI;

use palette::{FromColor, Hsv, Srgb};
use rand::rngs::StdRng;
use rand::Rng;

use crate::effects::Effect;

/// Breathing color: a half-sine brightness envelope per cycle, with a fresh
/// random hue for every cycle.
pub struct HsvPulse<R: Rng = StdRng> {
    rng: R,
    cycle_ms: f32,
    peak: f32,
    saturation: f32,
    hue: f32,
    elapsed_ms: f32,
}

impl<R: Rng> HsvPulse<R> {
    pub fn new(mut rng: R, cycle_ms: f32, peak: f32, saturation: f32) -> HsvPulse<R> {
        debug_assert!(cycle_ms > 0.0);
        debug_assert!((0.0..=1.0).contains(&peak));
        debug_assert!((0.0..=1.0).contains(&saturation));
        let hue = rng.gen::<f32>();

        HsvPulse {
            rng,
            cycle_ms,
            peak,
            saturation,
            hue,
            elapsed_ms: 0.0,
        }
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Position within the current cycle. Only exceeds 1 after a tick longer
    /// than a whole cycle, until the next wrap.
    pub fn phase(&self) -> f32 {
        self.elapsed_ms / self.cycle_ms
    }

    /// Envelope brightness in [0, peak]. Held dark while the phase is past
    /// the end of the cycle.
    pub fn intensity(&self) -> f32 {
        (self.phase().min(1.0) * PI).sin().max(0.0) * self.peak
    }

    /// Restarts the envelope at zero brightness. The hue is kept.
    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }
}

impl<R: Rng> Effect for HsvPulse<R> {
    type Output = Srgb;

    // Wraps by subtraction to keep the phase under uneven frame timing. A delta
    // spanning several cycles still wraps only once.
    fn tick(&mut self, delta_ms: f32) {
        self.elapsed_ms += delta_ms.max(0.0);
        if self.elapsed_ms >= self.cycle_ms {
            self.elapsed_ms -= self.cycle_ms;
            self.hue = self.rng.gen::<f32>();
            log::trace!("Pulse cycle wrapped, new hue {:.3}", self.hue);
        }
    }

    fn sample(&self) -> Srgb {
        let hsv = Hsv::new(self.hue * 360.0, self.saturation, self.intensity());
        Srgb::from_color(hsv)
    }
}
