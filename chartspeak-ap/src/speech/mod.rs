//! Text-to-speech
//!
//! [`SpeechController`] is the Idle / Speaking / Paused state machine reading
//! insights aloud. Synthesis itself sits behind [`SpeechEngine`]; the
//! [`ConsoleSpeechEngine`] "speaks" by writing words to a terminal at
//! speaking pace.

mod console;
mod controller;
mod engine;
mod markup;

pub use console::{ConsoleSpeechEngine, BASE_WORDS_PER_MINUTE};
pub use controller::{SpeechController, SpeechState, SPEECH_PITCH, SPEECH_RATE};
pub use engine::{EngineEvent, EngineEventSender, SpeechEngine, Utterance, UtteranceHandle};
pub use markup::strip_markup;
