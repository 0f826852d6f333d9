//! Speech controller state machine tests
//!
//! The fake engine records utterances and handle calls; engine callbacks are
//! fired by the test and delivered through the controller's event pump.

mod helpers;

use chartspeak_ap::speech::{EngineEvent, SpeechController, SPEECH_PITCH, SPEECH_RATE};
use chartspeak_common::chat::ChatMessage;
use chartspeak_common::events::{EventBus, SpeechStatus};
use helpers::fake_speech::{FakeSpeechEngine, HandleCall};
use helpers::{announcements, settle};
use std::sync::Arc;
use tokio::sync::broadcast;

struct SpeechHarness {
    controller: SpeechController,
    engine: FakeSpeechEngine,
    rx: broadcast::Receiver<chartspeak_common::events::ChartSpeakEvent>,
}

fn harness() -> SpeechHarness {
    let engine = FakeSpeechEngine::new();
    let events = EventBus::new(256);
    let rx = events.subscribe();
    let controller = SpeechController::new(Arc::new(engine.clone()), events);
    SpeechHarness {
        controller,
        engine,
        rx,
    }
}

fn conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::assistant("## Chart Type\nA **bar** chart."),
        ChatMessage::user("Which month is highest?"),
        ChatMessage::assistant("December, at `100` percent."),
    ]
}

#[tokio::test]
async fn test_play_from_idle_speaks_stripped_text() {
    let h = harness();

    h.controller.play("## Overall Trend\n**Up** and *steady*");

    assert_eq!(h.controller.state().status, SpeechStatus::Speaking);
    let utterance = h.engine.last_utterance();
    assert_eq!(utterance.text, "Overall Trend\nUp and steady");
    assert_eq!(utterance.rate, SPEECH_RATE);
    assert_eq!(utterance.pitch, SPEECH_PITCH);
    assert_eq!(utterance.volume, 1.0);
}

#[tokio::test]
async fn test_play_while_speaking_is_a_no_op() {
    let h = harness();

    h.controller.play("first");
    h.controller.play("second");

    assert_eq!(h.engine.utterances().len(), 1);
    assert_eq!(h.engine.last_utterance().text, "first");
    assert_eq!(h.controller.state().status, SpeechStatus::Speaking);
}

#[tokio::test]
async fn test_stop_from_idle_is_a_no_op() {
    let mut h = harness();

    h.controller.stop();

    assert_eq!(h.controller.state().status, SpeechStatus::Idle);
    assert!(announcements(&mut h.rx).is_empty());
    assert!(h.engine.calls().is_empty());
}

#[tokio::test]
async fn test_pause_resume_stop_cycle() {
    let mut h = harness();
    h.controller.play("insights");
    let id = h.engine.last_utterance().id;

    h.controller.pause();
    assert_eq!(h.controller.state().status, SpeechStatus::Paused);

    h.controller.resume();
    assert_eq!(h.controller.state().status, SpeechStatus::Speaking);

    h.controller.stop();
    assert_eq!(h.controller.state().status, SpeechStatus::Idle);

    assert_eq!(
        h.engine.calls(),
        vec![
            HandleCall::Pause(id),
            HandleCall::Resume(id),
            HandleCall::Cancel(id)
        ]
    );
    assert_eq!(
        announcements(&mut h.rx),
        vec!["Speech paused", "Speech resumed", "Speech stopped and reset"]
    );
}

#[tokio::test]
async fn test_play_after_stop_restarts_from_first_message() {
    let h = harness();
    let messages = conversation();

    // Given: the second assistant message selected and being read
    h.controller.set_message_index(1);
    h.controller.toggle(&messages);
    assert_eq!(h.engine.last_utterance().text, "December, at 100 percent.");

    // When: stopping and toggling again
    h.controller.stop();
    assert_eq!(h.controller.state().message_index, 0);
    h.controller.toggle(&messages);

    // Then: a fresh utterance of the first assistant message
    let utterances = h.engine.utterances();
    assert_eq!(utterances.len(), 2);
    assert_ne!(utterances[0].id, utterances[1].id);
    assert_eq!(utterances[1].text, "Chart Type\nA bar chart.");
}

#[tokio::test]
async fn test_toggle_falls_back_to_first_assistant_message() {
    let h = harness();

    h.controller.set_message_index(7);
    h.controller.toggle(&conversation());

    assert_eq!(h.engine.last_utterance().text, "Chart Type\nA bar chart.");
}

#[tokio::test]
async fn test_toggle_without_assistant_messages_does_nothing() {
    let h = harness();

    h.controller.toggle(&[ChatMessage::user("hello")]);

    assert!(h.engine.utterances().is_empty());
    assert_eq!(h.controller.state().status, SpeechStatus::Idle);
}

#[tokio::test]
async fn test_toggle_pauses_and_resumes() {
    let h = harness();
    let messages = conversation();

    h.controller.toggle(&messages);
    h.controller.toggle(&messages);
    assert_eq!(h.controller.state().status, SpeechStatus::Paused);

    h.controller.toggle(&messages);
    assert_eq!(h.controller.state().status, SpeechStatus::Speaking);
    assert_eq!(h.engine.utterances().len(), 1);
}

#[tokio::test]
async fn test_mute_is_applied_before_speaking() {
    let h = harness();

    h.controller.set_muted(true);
    h.controller.play("quiet");

    assert_eq!(h.engine.last_utterance().volume, 0.0);
}

#[tokio::test]
async fn test_mute_while_speaking_keeps_state() {
    let mut h = harness();
    h.controller.play("insights");
    let id = h.engine.last_utterance().id;

    assert!(h.controller.toggle_mute());
    assert_eq!(h.controller.state().status, SpeechStatus::Speaking);
    assert!(h.controller.state().muted);

    h.controller.set_muted(false);
    assert_eq!(
        h.engine.calls(),
        vec![HandleCall::SetVolume(id, 0.0), HandleCall::SetVolume(id, 1.0)]
    );
    assert_eq!(announcements(&mut h.rx), vec!["Muted", "Unmuted"]);
}

#[tokio::test]
async fn test_engine_callbacks_drive_state() {
    let mut h = harness();
    h.controller.play("insights");
    let id = h.engine.last_utterance().id;

    h.engine.emit(EngineEvent::Started(id));
    settle().await;
    assert_eq!(
        announcements(&mut h.rx),
        vec!["Started reading insights"]
    );

    h.engine.emit(EngineEvent::Finished(id));
    settle().await;
    assert_eq!(h.controller.state().status, SpeechStatus::Idle);
    assert_eq!(
        announcements(&mut h.rx),
        vec!["Finished reading insights"]
    );
}

#[tokio::test]
async fn test_engine_error_returns_to_idle() {
    let mut h = harness();
    h.controller.play("insights");
    let id = h.engine.last_utterance().id;

    h.engine.emit(EngineEvent::Error {
        id,
        message: "synthesis-failed".to_string(),
    });
    settle().await;

    assert_eq!(h.controller.state().status, SpeechStatus::Idle);
    assert!(announcements(&mut h.rx).is_empty());

    // And: speaking again works
    h.controller.play("again");
    assert_eq!(h.controller.state().status, SpeechStatus::Speaking);
}

#[tokio::test]
async fn test_callbacks_from_preempted_utterance_are_ignored() {
    let h = harness();

    // Given: utterance A stopped and utterance B playing
    h.controller.play("first");
    let first = h.engine.last_utterance().id;
    h.controller.stop();
    h.controller.play("second");

    // When: A's late completion callback arrives
    h.engine.emit(EngineEvent::Finished(first));
    settle().await;

    // Then: B is still speaking
    assert_eq!(h.controller.state().status, SpeechStatus::Speaking);
}

#[tokio::test]
async fn test_engine_refusal_leaves_controller_idle() {
    let h = harness();
    h.engine.refuse();

    h.controller.play("insights");

    assert_eq!(h.controller.state().status, SpeechStatus::Idle);
}

#[tokio::test]
async fn test_blank_text_is_not_spoken() {
    let h = harness();

    h.controller.play("** ## **");

    assert!(h.engine.utterances().is_empty());
    assert_eq!(h.controller.state().status, SpeechStatus::Idle);
}
