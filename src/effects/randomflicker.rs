use rand::rngs::StdRng;
use rand::Rng;

use crate::effects::Effect;

/// Holds a random brightness for a fixed interval, then picks another one.
pub struct RandomFlicker<R: Rng = StdRng> {
    rng: R,
    interval_ms: f32,
    min: f32,
    max: f32,
    value: f32,
    elapsed_ms: f32,
}

impl<R: Rng> RandomFlicker<R> {
    pub fn new(mut rng: R, interval_ms: f32, min: f32, max: f32) -> RandomFlicker<R> {
        debug_assert!(interval_ms > 0.0);
        debug_assert!(min <= max);
        let value = rng.gen_range(min..=max);

        RandomFlicker {
            rng,
            interval_ms,
            min,
            max,
            value,
            elapsed_ms: 0.0,
        }
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Restarts the interval timer. The current value is kept until the next
    /// boundary.
    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }
}

impl<R: Rng> Effect for RandomFlicker<R> {
    type Output = f32;

    fn tick(&mut self, delta_ms: f32) {
        self.elapsed_ms += delta_ms.max(0.0);
        if self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms -= self.interval_ms;
            self.value = self.rng.gen_range(self.min..=self.max);
        }
    }

    fn sample(&self) -> f32 {
        self.value
    }
}
