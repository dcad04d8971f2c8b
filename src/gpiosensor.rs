use std::path::Path;

use gpio_cdev::{Chip, LineHandle, LineRequestFlags};

use crate::error::Error;
use crate::peripherals::MotionSensor;

const CONSUMER: &str = "pirlicht";

/// PIR output wired to a GPIO line, read through the character device.
pub struct GpioMotionSensor {
    handle: LineHandle,
    failing: bool,
}

impl GpioMotionSensor {
    pub fn open(chip: &Path, line: u32, active_low: bool) -> Result<Self, Error> {
        let mut chip = Chip::new(chip)?;
        let mut flags = LineRequestFlags::INPUT;
        if active_low {
            flags |= LineRequestFlags::ACTIVE_LOW;
        }
        // Error will appear here if line is occupied
        let handle = chip.get_line(line)?.request(flags, 0, CONSUMER)?;
        log::info!("Reading PIR on {} line {}", chip.path().display(), line);

        Ok(GpioMotionSensor {
            handle,
            failing: false,
        })
    }
}

impl MotionSensor for GpioMotionSensor {
    /// A failed read counts as "no motion", so it can never cause a trigger.
    fn read(&mut self) -> bool {
        match self.handle.get_value() {
            Ok(value) => {
                if self.failing {
                    log::info!("PIR line readable again");
                    self.failing = false;
                }
                value == 1
            }
            Err(err) => {
                if !self.failing {
                    log::warn!("Cannot read PIR line: {err}");
                    self.failing = true;
                }
                false
            }
        }
    }
}
