use std::fmt;
use std::io;

/// Failures raised by collaborators or while setting the program up.
///
/// The effect engine itself never fails; everything here comes from the
/// outputs, the audio player, the sensor hardware or the configuration.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Osc(String),
    Audio(String),
    Gpio(gpio_cdev::Error),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::Osc(msg) => write!(f, "OSC error: {msg}"),
            Error::Audio(msg) => write!(f, "audio error: {msg}"),
            Error::Gpio(err) => write!(f, "GPIO error: {err}"),
            Error::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Gpio(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<rosc::OscError> for Error {
    fn from(err: rosc::OscError) -> Self {
        Error::Osc(format!("{:?}", err))
    }
}

impl From<gpio_cdev::Error> for Error {
    fn from(err: gpio_cdev::Error) -> Self {
        Error::Gpio(err)
    }
}
