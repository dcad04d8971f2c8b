use std::net::{SocketAddr, UdpSocket};

use rosc::{encoder, OscMessage, OscPacket, OscType};

use crate::config::OutputSettings;
use crate::error::Error;
use crate::peripherals::{LightOutput, MONO_CHANNELS};

const UNIVERSE_SIZE: usize = 512;

/// Sends one DMX universe to OLA's OSC plugin on every flush.
pub struct OlaOutput {
    sock: UdpSocket,
    target_addr: SocketAddr,
    address: String,
    rgb_channel: usize,
    mono_channel: usize,
    buffer: Vec<u8>,
}

impl OlaOutput {
    pub fn new(settings: &OutputSettings) -> Result<Self, Error> {
        let sock = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))?;
        log::info!(
            "Sending DMX universe {} to OLA at {}",
            settings.universe,
            settings.ola_addr
        );

        Ok(OlaOutput {
            sock,
            target_addr: settings.ola_addr,
            address: format!("/dmx/universe/{}", settings.universe),
            rgb_channel: settings.rgb_channel as usize,
            mono_channel: settings.mono_channel as usize,
            buffer: vec![0; UNIVERSE_SIZE],
        })
    }

    fn set(&mut self, channel: usize, value: u8) {
        self.buffer[channel] = value;
    }

    fn mono(&mut self, channel: usize, value: u8) {
        debug_assert!(channel < MONO_CHANNELS);
        self.set(self.mono_channel + channel, value);
    }

    fn encode(&self) -> Result<Vec<u8>, Error> {
        let packet = OscPacket::Message(OscMessage {
            addr: self.address.clone(),
            args: vec![OscType::Blob(self.buffer.clone())],
        });
        Ok(encoder::encode(&packet)?)
    }
}

impl LightOutput for OlaOutput {
    fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), Error> {
        for (offset, value) in [r, g, b].into_iter().enumerate() {
            self.set(self.rgb_channel + offset, value);
        }
        Ok(())
    }

    fn mono_on(&mut self, channel: usize) -> Result<(), Error> {
        self.mono(channel, u8::MAX);
        Ok(())
    }

    fn mono_off(&mut self, channel: usize) -> Result<(), Error> {
        self.mono(channel, 0);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        let msg_buf = self.encode()?;
        self.sock.send_to(&msg_buf, self.target_addr)?;
        Ok(())
    }
}
