//! Async loop that owns a [`PlaybackController`] and serializes everything
//! touching it: user commands and engine completions.

use nb_core::{NewsSummary, Result};
use tokio::sync::mpsc;
use tracing::warn;

use crate::controller::PlaybackController;
use crate::engine::{SpeechEngine, UtteranceId};

#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    ToggleItem(NewsSummary),
    StartAutoPlay(Vec<NewsSummary>),
    StopAutoPlay,
    ToggleSound,
    CycleSpeed,
}

/// Cheap handle for sending commands to a running driver.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    commands: mpsc::UnboundedSender<PlaybackCommand>,
}

impl PlaybackHandle {
    /// Returns false once the driver has gone away.
    pub fn send(&self, command: PlaybackCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn stop(&self) -> bool {
        self.send(PlaybackCommand::StopAutoPlay)
    }
}

pub struct PlaybackDriver<E: SpeechEngine> {
    controller: PlaybackController<E>,
    completions: mpsc::UnboundedReceiver<UtteranceId>,
    commands: mpsc::UnboundedReceiver<PlaybackCommand>,
}

impl<E: SpeechEngine> PlaybackDriver<E> {
    pub fn new(
        controller: PlaybackController<E>,
        completions: mpsc::UnboundedReceiver<UtteranceId>,
    ) -> (Self, PlaybackHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            controller,
            completions,
            commands: rx,
        };
        (driver, PlaybackHandle { commands: tx })
    }

    pub fn controller(&self) -> &PlaybackController<E> {
        &self.controller
    }

    pub fn into_controller(self) -> PlaybackController<E> {
        self.controller
    }

    fn apply(&mut self, command: PlaybackCommand) -> Result<()> {
        match command {
            PlaybackCommand::ToggleItem(item) => self.controller.toggle_item(&item),
            PlaybackCommand::StartAutoPlay(items) => self.controller.start_auto_play(&items).map(|_| ()),
            PlaybackCommand::StopAutoPlay => {
                self.controller.stop_auto_play();
                Ok(())
            }
            PlaybackCommand::ToggleSound => {
                self.controller.toggle_sound();
                Ok(())
            }
            PlaybackCommand::CycleSpeed => {
                self.controller.cycle_speed();
                Ok(())
            }
        }
    }

    /// Processes queued commands, then keeps handling completions and commands
    /// until playback is idle.
    pub async fn run_until_idle(&mut self) -> Result<()> {
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command)?;
        }

        while !self.controller.is_idle() {
            tokio::select! {
                Some(id) = self.completions.recv() => {
                    self.controller.on_utterance_finished(id)?;
                }
                Some(command) = self.commands.recv() => {
                    self.apply(command)?;
                }
                else => {
                    warn!("Playback channels closed while speaking");
                    self.controller.stop_auto_play();
                }
            }
        }
        Ok(())
    }
}
