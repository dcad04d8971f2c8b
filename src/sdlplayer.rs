extern crate sdl2;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sdl2::audio::{AudioCallback, AudioDevice, AudioFormat, AudioSpecDesired, AudioSpecWAV};
use sdl2::{AudioSubsystem, Sdl};

use crate::error::Error;
use crate::peripherals::AudioPlayer;

const SAMPLE_RATE: i32 = 44100;

fn u8_to_i16(v: &[u8]) -> Vec<i16> {
    v.chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

struct WavFileCallback {
    samples: Vec<i16>,
    file_pos: usize,
    playing: Arc<AtomicBool>,
}

impl AudioCallback for WavFileCallback {
    type Channel = i16;

    fn callback(&mut self, out: &mut [i16]) {
        let remaining = self.samples.len().saturating_sub(self.file_pos);
        let count = remaining.min(out.len());

        out[..count].copy_from_slice(&self.samples[self.file_pos..self.file_pos + count]);
        out[count..].fill(0);
        self.file_pos += count;

        if self.file_pos >= self.samples.len() {
            self.playing.store(false, Ordering::SeqCst);
        }
    }
}

/// Plays mono s16le 44.1kHz WAV files through SDL2.
pub struct SdlPlayer {
    _sdl_context: Sdl,
    sdl_audio: AudioSubsystem,
    wav_root: PathBuf,
    device: Option<AudioDevice<WavFileCallback>>,
    playing: Arc<AtomicBool>,
}

impl SdlPlayer {
    pub fn new(wav_root: PathBuf) -> Result<SdlPlayer, Error> {
        let sdl_context =
            sdl2::init().map_err(|err| Error::Audio(format!("Cannot initialize SDL2: {err}")))?;
        let sdl_audio = sdl_context
            .audio()
            .map_err(|err| Error::Audio(format!("Cannot init SDL audio: {err}")))?;

        Ok(SdlPlayer {
            _sdl_context: sdl_context,
            sdl_audio,
            wav_root,
            device: None,
            playing: Arc::new(AtomicBool::new(false)),
        })
    }

    fn load_samples(&self, asset: &str) -> Result<Vec<i16>, Error> {
        let path = self.wav_root.join(asset);
        let wav_file_spec = AudioSpecWAV::load_wav(&path)
            .map_err(|err| Error::Audio(format!("Cannot load {}: {}", path.display(), err)))?;

        if wav_file_spec.channels != 1
            || wav_file_spec.format != AudioFormat::S16LSB
            || wav_file_spec.freq != SAMPLE_RATE
        {
            return Err(Error::Audio(format!(
                "{} needs to be s16le, 44100 Hz, mono",
                path.display()
            )));
        }

        Ok(u8_to_i16(wav_file_spec.buffer()))
    }
}

impl AudioPlayer for SdlPlayer {
    fn play(&mut self, asset: &str) -> Result<(), Error> {
        self.stop()?;
        let samples = self.load_samples(asset)?;
        let desired_spec = AudioSpecDesired {
            freq: Some(SAMPLE_RATE),
            channels: Some(1),
            samples: None, // Default sample buffer size
        };

        self.playing.store(true, Ordering::SeqCst);
        let playing = Arc::clone(&self.playing);
        let device = self
            .sdl_audio
            .open_playback(None, &desired_spec, |spec| {
                if spec.freq != SAMPLE_RATE || spec.channels != 1 {
                    log::warn!(
                        "Audio device opened with {} Hz, {} channels",
                        spec.freq,
                        spec.channels
                    );
                }
                WavFileCallback {
                    samples,
                    file_pos: 0,
                    playing,
                }
            })
            .map_err(|err| Error::Audio(format!("Cannot open audio device: {err}")))?;

        device.resume();
        self.device = Some(device);
        Ok(())
    }

    fn is_playing(&mut self) -> bool {
        self.device.is_some() && self.playing.load(Ordering::SeqCst)
    }

    fn stop(&mut self) -> Result<(), Error> {
        if let Some(device) = self.device.take() {
            device.pause();
        }
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }
}
