use nb_core::{Error, Result};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::engine::{SpeechEngine, Utterance, UtteranceId};

/// Words per minute at rate 1.0.
pub const BASE_WPM: f32 = 175.0;

#[derive(Debug, Clone)]
pub struct ProcessEngineConfig {
    pub program: String,
    pub voice: String,
}

impl Default for ProcessEngineConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            voice: "ko".to_string(),
        }
    }
}

/// Speaks through an external TTS command, one child process per utterance.
/// Finished utterances are reported on the completion channel; cancelled ones
/// are killed and never reported.
#[derive(Debug)]
pub struct ProcessEngine {
    config: ProcessEngineConfig,
    completions: mpsc::UnboundedSender<UtteranceId>,
    active: Option<oneshot::Sender<()>>,
}

impl ProcessEngine {
    pub fn new(config: ProcessEngineConfig) -> (Self, mpsc::UnboundedReceiver<UtteranceId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Self {
            config,
            completions: tx,
            active: None,
        };
        (engine, rx)
    }

    fn command(&self, utterance: &Utterance) -> Command {
        let wpm = (BASE_WPM * utterance.rate).round() as u32;
        let mut command = Command::new(&self.config.program);
        command
            .arg("-v")
            .arg(&self.config.voice)
            .arg("-s")
            .arg(wpm.to_string())
            .arg(&utterance.text)
            .kill_on_drop(true);
        command
    }
}

impl SpeechEngine for ProcessEngine {
    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.cancel();

        let id = utterance.id;
        if utterance.muted {
            let _ = self.completions.send(id);
            return Ok(());
        }

        let mut child = self
            .command(&utterance)
            .spawn()
            .map_err(|e| Error::Speech(format!("failed to start {}: {}", self.config.program, e)))?;

        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.active = Some(cancel_tx);
        let completions = self.completions.clone();

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    match status {
                        Ok(status) if !status.success() => warn!("TTS exited with {} for {}", status, id),
                        Err(e) => warn!("TTS wait failed for {}: {}", id, e),
                        _ => debug!("Utterance {} finished", id),
                    }
                    let _ = completions.send(id);
                }
                _ = cancel_rx => {
                    if let Err(e) = child.kill().await {
                        debug!("Kill after cancel failed for {}: {}", id, e);
                    }
                }
            }
        });
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.active.take() {
            let _ = cancel.send(());
        }
    }
}
