pub mod hsvpulse;
pub mod randomflicker;

pub use hsvpulse::HsvPulse;
pub use randomflicker::RandomFlicker;

/// A time driven effect. Effects only change when ticked; sampling is pure.
pub trait Effect {
    type Output;

    /// Advances the effect by `delta_ms` milliseconds.
    fn tick(&mut self, delta_ms: f32);

    fn sample(&self) -> Self::Output;
}

/// Scales a normalized color component to the 0-255 device range.
///
/// Truncates like the board firmware did, so 0.999 maps to 254.
pub fn to_device(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

pub fn rgb_to_device(rgb: palette::Srgb) -> [u8; 3] {
    [to_device(rgb.red), to_device(rgb.green), to_device(rgb.blue)]
}
