//! Speech engine boundary

use crate::error::Result;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Text handed to an engine
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: Uuid,
    pub text: String,
    /// Speaking rate, 1.0 is normal
    pub rate: f32,
    pub pitch: f32,
    /// 0.0 (silent) to 1.0
    pub volume: f32,
}

/// Engine progress callback
///
/// Every event names the utterance it belongs to so that callbacks from a
/// preempted utterance can be told apart from the current one.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Started(Uuid),
    Finished(Uuid),
    Error { id: Uuid, message: String },
}

impl EngineEvent {
    pub fn utterance_id(&self) -> Uuid {
        match self {
            EngineEvent::Started(id) | EngineEvent::Finished(id) => *id,
            EngineEvent::Error { id, .. } => *id,
        }
    }
}

pub type EngineEventSender = mpsc::UnboundedSender<EngineEvent>;

/// Control over one in-flight utterance
pub trait UtteranceHandle: Send {
    fn pause(&self);
    fn resume(&self);
    fn set_volume(&self, volume: f32);
    /// Stop speaking; no further events are required afterwards
    fn cancel(self: Box<Self>);
}

/// Speech synthesizer
pub trait SpeechEngine: Send + Sync {
    /// Begin speaking, reporting progress on `events`
    fn speak(&self, utterance: Utterance, events: EngineEventSender)
        -> Result<Box<dyn UtteranceHandle>>;
}
