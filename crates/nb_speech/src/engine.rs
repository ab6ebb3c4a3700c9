use std::fmt;
use nb_core::Result;
use serde::{Deserialize, Serialize};

/// Identifies one utterance; completion signals carry it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub rate: f32,
    pub muted: bool,
}

/// Playback rate, cycled by a single control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    #[default]
    Normal,
    Fast,
    Faster,
}

impl PlaybackSpeed {
    pub fn rate(&self) -> f32 {
        match self {
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Fast => 1.2,
            PlaybackSpeed::Faster => 1.5,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            PlaybackSpeed::Normal => PlaybackSpeed::Fast,
            PlaybackSpeed::Fast => PlaybackSpeed::Faster,
            PlaybackSpeed::Faster => PlaybackSpeed::Normal,
        }
    }

    /// Accepts `1.0`, `1.2`, `1.5` (with or without a trailing `x`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_end_matches(['x', 'X']) {
            "1" | "1.0" => Some(PlaybackSpeed::Normal),
            "1.2" => Some(PlaybackSpeed::Fast),
            "1.5" => Some(PlaybackSpeed::Faster),
            _ => None,
        }
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x", self.rate())
    }
}

/// A text-to-speech backend. At most one utterance is active; a finished
/// utterance is reported once, a cancelled one never.
pub trait SpeechEngine: Send {
    fn speak(&mut self, utterance: Utterance) -> Result<()>;

    fn cancel(&mut self);
}

/// Engine that only remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub spoken: Vec<Utterance>,
    pub cancels: usize,
}

impl RecordingEngine {
    pub fn last(&self) -> Option<&Utterance> {
        self.spoken.last()
    }
}

impl SpeechEngine for RecordingEngine {
    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.spoken.push(utterance);
        Ok(())
    }

    fn cancel(&mut self) {
        self.cancels += 1;
    }
}
