use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use rosc::{decoder, OscMessage, OscPacket, OscType};

use crate::error::Error;
use crate::peripherals::MotionSensor;

pub const MOTION_ADDR: &str = "/sensor/motion";

/// Motion level reported over OSC, e.g. by a networked PIR node.
pub struct OscMotionSensor {
    motion: Arc<AtomicBool>,
}

struct OscReceiver {
    sock: UdpSocket,
    motion: Arc<AtomicBool>,
}

impl OscMotionSensor {
    /// Binds `listen_addr` and starts the receiver thread.
    pub fn spawn(listen_addr: SocketAddr) -> Result<Self, Error> {
        let motion = Arc::new(AtomicBool::new(false));
        let receiver = OscReceiver {
            sock: UdpSocket::bind(listen_addr)?,
            motion: Arc::clone(&motion),
        };
        log::info!("Listening for {MOTION_ADDR} on {listen_addr}");

        thread::Builder::new()
            .name("OSC".to_string())
            .spawn(move || receiver.run())?;

        Ok(OscMotionSensor { motion })
    }
}

impl MotionSensor for OscMotionSensor {
    fn read(&mut self) -> bool {
        self.motion.load(Ordering::SeqCst)
    }
}

impl OscReceiver {
    fn run(&self) {
        let mut buf = [0u8; decoder::MTU];

        loop {
            match self.sock.recv_from(&mut buf) {
                Ok((size, addr)) => {
                    log::trace!("Received packet with size {} from: {}", size, addr);
                    match decoder::decode(&buf[..size]) {
                        Ok(packet) => self.handle_packet(packet),
                        Err(err) => log::warn!("Cannot decode OSC packet from {addr}: {err:?}"),
                    }
                }
                Err(err) => {
                    log::error!("Error receiving from socket: {}", err);
                    break;
                }
            }
        }
    }

    fn handle_packet(&self, packet: OscPacket) {
        match packet {
            OscPacket::Message(msg) => {
                if let Some(motion) = motion_level(&msg) {
                    log::debug!("Remote motion level: {motion}");
                    self.motion.store(motion, Ordering::SeqCst);
                }
            }
            OscPacket::Bundle(bundle) => {
                for packet in bundle.content {
                    self.handle_packet(packet);
                }
            }
        }
    }
}

/// Extracts the motion level from a `/sensor/motion` message.
fn motion_level(msg: &OscMessage) -> Option<bool> {
    if msg.addr != MOTION_ADDR {
        log::debug!("Ignoring OSC address: {}", msg.addr);
        return None;
    }

    match msg.args.first() {
        Some(OscType::Bool(value)) => Some(*value),
        Some(OscType::Int(value)) => Some(*value != 0),
        Some(OscType::Float(value)) => Some(*value >= 0.5),
        Some(arg) => {
            log::warn!("{} Unexpected OSC parameter type: {:?}", msg.addr, arg);
            None
        }
        None => {
            log::warn!("{} Missing OSC parameter", msg.addr);
            None
        }
    }
}
