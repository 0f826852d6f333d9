//! Scriptable speech engine
//!
//! Records every utterance and every call made on its handles, and lets a
//! test fire engine events as if the synthesizer produced them.

use chartspeak_ap::error::{Error, Result};
use chartspeak_ap::speech::{
    EngineEvent, EngineEventSender, SpeechEngine, Utterance, UtteranceHandle,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum HandleCall {
    Pause(Uuid),
    Resume(Uuid),
    SetVolume(Uuid, f32),
    Cancel(Uuid),
}

#[derive(Default)]
struct Log {
    utterances: Vec<Utterance>,
    calls: Vec<HandleCall>,
    sender: Option<EngineEventSender>,
    refuse: bool,
}

#[derive(Clone, Default)]
pub struct FakeSpeechEngine {
    log: Arc<Mutex<Log>>,
}

impl FakeSpeechEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future `speak` fail
    pub fn refuse(&self) {
        self.log.lock().unwrap().refuse = true;
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.log.lock().unwrap().utterances.clone()
    }

    pub fn last_utterance(&self) -> Utterance {
        self.utterances().last().cloned().expect("no utterance spoken")
    }

    pub fn calls(&self) -> Vec<HandleCall> {
        self.log.lock().unwrap().calls.clone()
    }

    /// Fire an engine event through the channel the controller supplied
    pub fn emit(&self, event: EngineEvent) {
        let log = self.log.lock().unwrap();
        let sender = log.sender.as_ref().expect("speak was never called");
        sender.send(event).unwrap();
    }
}

struct FakeHandle {
    id: Uuid,
    log: Arc<Mutex<Log>>,
}

impl FakeHandle {
    fn record(&self, call: HandleCall) {
        self.log.lock().unwrap().calls.push(call);
    }
}

impl UtteranceHandle for FakeHandle {
    fn pause(&self) {
        self.record(HandleCall::Pause(self.id));
    }

    fn resume(&self) {
        self.record(HandleCall::Resume(self.id));
    }

    fn set_volume(&self, volume: f32) {
        self.record(HandleCall::SetVolume(self.id, volume));
    }

    fn cancel(self: Box<Self>) {
        self.record(HandleCall::Cancel(self.id));
    }
}

impl SpeechEngine for FakeSpeechEngine {
    fn speak(
        &self,
        utterance: Utterance,
        events: EngineEventSender,
    ) -> Result<Box<dyn UtteranceHandle>> {
        let mut log = self.log.lock().unwrap();
        if log.refuse {
            return Err(Error::Speech("no voice available".to_string()));
        }
        let id = utterance.id;
        log.utterances.push(utterance);
        log.sender = Some(events);
        Ok(Box::new(FakeHandle {
            id,
            log: Arc::clone(&self.log),
        }))
    }
}
