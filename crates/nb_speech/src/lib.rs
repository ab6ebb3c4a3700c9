pub mod controller;
pub mod driver;
pub mod engine;
pub mod process;

pub use controller::{PlaybackController, PlaybackState, ORDINALS};
pub use driver::{PlaybackCommand, PlaybackDriver, PlaybackHandle};
pub use engine::{PlaybackSpeed, RecordingEngine, SpeechEngine, Utterance, UtteranceId};
pub use process::{ProcessEngine, ProcessEngineConfig};
