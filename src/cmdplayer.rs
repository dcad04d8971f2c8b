use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::error::Error;
use crate::peripherals::AudioPlayer;

/// Plays WAV files by running an external program such as `aplay`.
pub struct CommandPlayer {
    program: String,
    wav_root: PathBuf,
    child: Option<Child>,
}

impl CommandPlayer {
    pub fn new(program: &str, wav_root: PathBuf) -> CommandPlayer {
        CommandPlayer {
            program: program.to_string(),
            wav_root,
            child: None,
        }
    }
}

impl AudioPlayer for CommandPlayer {
    fn play(&mut self, asset: &str) -> Result<(), Error> {
        self.stop()?;

        let path = self.wav_root.join(asset);
        log::debug!("Starting {} {}", self.program, path.display());
        let child = Command::new(&self.program)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|err| Error::Audio(format!("Cannot start {}: {}", self.program, err)))?;
        self.child = Some(child);
        Ok(())
    }

    fn is_playing(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                if !status.success() {
                    log::warn!("{} exited with {}", self.program, status);
                }
                self.child = None;
                false
            }
            Err(err) => {
                log::warn!("Cannot poll {}: {}", self.program, err);
                self.child = None;
                false
            }
        }
    }

    fn stop(&mut self) -> Result<(), Error> {
        if let Some(mut child) = self.child.take() {
            if child.try_wait()?.is_none() {
                child.kill()?;
            }
            child.wait()?;
        }
        Ok(())
    }
}
