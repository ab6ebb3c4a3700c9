//! Playback state machine for reading news summaries aloud.
//!
//! All playback state lives in one [`PlaybackState`] value. Engine completions
//! come back as [`UtteranceId`]s and are matched against the active utterance,
//! so a completion that arrives after a stop or a switch is dropped instead of
//! resuming a queue the user already left.

use nb_core::{NewsSummary, Result};
use tracing::{debug, info};

use crate::engine::{PlaybackSpeed, SpeechEngine, Utterance, UtteranceId};

/// Spoken before each autoplayed item; items past the fifth get no ordinal.
pub const ORDINALS: [&str; 5] = ["첫 번째", "두 번째", "세 번째", "네 번째", "다섯 번째"];

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackState {
    Idle,
    PlayingSingle {
        item: NewsSummary,
        utterance: UtteranceId,
    },
    AutoPlaying {
        queue: Vec<NewsSummary>,
        current_index: usize,
        utterance: UtteranceId,
    },
}

pub struct PlaybackController<E: SpeechEngine> {
    engine: E,
    state: PlaybackState,
    speed: PlaybackSpeed,
    sound_enabled: bool,
    next_id: u64,
}

impl<E: SpeechEngine> std::fmt::Debug for PlaybackController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("speed", &self.speed)
            .field("sound_enabled", &self.sound_enabled)
            .finish()
    }
}

fn single_text(item: &NewsSummary) -> String {
    format!("{}. {}", item.title, item.summary)
}

fn queued_text(item: &NewsSummary, index: usize) -> String {
    match ORDINALS.get(index) {
        Some(ordinal) => format!("{} 소식입니다. {}. {}", ordinal, item.title, item.summary),
        None => single_text(item),
    }
}

impl<E: SpeechEngine> PlaybackController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlaybackState::Idle,
            speed: PlaybackSpeed::default(),
            sound_enabled: true,
            next_id: 0,
        }
    }

    pub fn with_speed(mut self, speed: PlaybackSpeed) -> Self {
        self.speed = speed;
        self
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, PlaybackState::Idle)
    }

    pub fn is_auto_playing(&self) -> bool {
        matches!(self.state, PlaybackState::AutoPlaying { .. })
    }

    pub fn active_utterance(&self) -> Option<UtteranceId> {
        match &self.state {
            PlaybackState::Idle => None,
            PlaybackState::PlayingSingle { utterance, .. }
            | PlaybackState::AutoPlaying { utterance, .. } => Some(*utterance),
        }
    }

    /// Title of the item being read, if any.
    pub fn currently_playing(&self) -> Option<&str> {
        match &self.state {
            PlaybackState::Idle => None,
            PlaybackState::PlayingSingle { item, .. } => Some(&item.title),
            PlaybackState::AutoPlaying { queue, current_index, .. } => {
                queue.get(*current_index).map(|item| item.title.as_str())
            }
        }
    }

    /// Items still waiting after the current one.
    pub fn queued(&self) -> usize {
        match &self.state {
            PlaybackState::AutoPlaying { queue, current_index, .. } => {
                queue.len().saturating_sub(current_index + 1)
            }
            _ => 0,
        }
    }

    fn speak(&mut self, text: String) -> Result<UtteranceId> {
        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        debug!("Speaking utterance {} at {}", id, self.speed);
        self.engine.speak(Utterance {
            id,
            text,
            rate: self.speed.rate(),
            muted: !self.sound_enabled,
        })?;
        Ok(id)
    }

    /// Cancels whatever is active and returns to `Idle`.
    fn halt(&mut self) {
        if !self.is_idle() {
            self.engine.cancel();
            self.state = PlaybackState::Idle;
        }
    }

    /// Starts reading `item`, or stops it if it is the one being read.
    /// Any autoplay in progress is abandoned.
    pub fn toggle_item(&mut self, item: &NewsSummary) -> Result<()> {
        if !self.sound_enabled {
            return Ok(());
        }
        let same = self.currently_playing() == Some(item.title.as_str());
        self.halt();
        if same {
            info!("⏹️ Stopped \"{}\"", item.title);
            return Ok(());
        }

        let utterance = self.speak(single_text(item))?;
        self.state = PlaybackState::PlayingSingle {
            item: item.clone(),
            utterance,
        };
        Ok(())
    }

    /// Reads every summary in order. Does nothing with sound off or nothing to read.
    pub fn start_auto_play(&mut self, summaries: &[NewsSummary]) -> Result<bool> {
        if !self.sound_enabled || summaries.is_empty() {
            return Ok(false);
        }
        self.halt();

        let queue = summaries.to_vec();
        let utterance = self.speak(queued_text(&queue[0], 0))?;
        info!("🔊 Autoplaying {} summaries", queue.len());
        self.state = PlaybackState::AutoPlaying {
            queue,
            current_index: 0,
            utterance,
        };
        Ok(true)
    }

    pub fn stop_auto_play(&mut self) {
        self.halt();
    }

    pub fn toggle_auto_play(&mut self, summaries: &[NewsSummary]) -> Result<()> {
        if self.is_auto_playing() {
            self.stop_auto_play();
        } else {
            self.start_auto_play(summaries)?;
        }
        Ok(())
    }

    /// Feeds an engine completion back in. Returns false for a stale id.
    pub fn on_utterance_finished(&mut self, id: UtteranceId) -> Result<bool> {
        if self.active_utterance() != Some(id) {
            debug!("Ignoring stale completion {}", id);
            return Ok(false);
        }

        match std::mem::replace(&mut self.state, PlaybackState::Idle) {
            PlaybackState::AutoPlaying { queue, current_index, .. } => {
                let next = current_index + 1;
                if !self.sound_enabled || next >= queue.len() {
                    info!("✅ Autoplay finished");
                    return Ok(true);
                }
                let utterance = self.speak(queued_text(&queue[next], next))?;
                self.state = PlaybackState::AutoPlaying {
                    queue,
                    current_index: next,
                    utterance,
                };
            }
            PlaybackState::PlayingSingle { .. } | PlaybackState::Idle => {}
        }
        Ok(true)
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
        if !enabled {
            self.halt();
        }
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.set_sound_enabled(!self.sound_enabled);
        self.sound_enabled
    }

    /// Moves to the next rate; the current utterance keeps its own.
    pub fn cycle_speed(&mut self) -> PlaybackSpeed {
        self.speed = self.speed.next();
        self.speed
    }
}
