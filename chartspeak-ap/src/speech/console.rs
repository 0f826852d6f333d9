//! Console speech engine
//!
//! Writes an utterance word by word at roughly speaking pace. Useful on
//! machines without a synthesizer and for following along in a terminal.

use super::engine::{EngineEvent, EngineEventSender, SpeechEngine, Utterance, UtteranceHandle};
use crate::error::Result;
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Words per minute at rate 1.0
pub const BASE_WORDS_PER_MINUTE: f32 = 180.0;

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Speech engine writing to a terminal (or any writer)
pub struct ConsoleSpeechEngine {
    writer: SharedWriter,
    words_per_minute: f32,
}

impl ConsoleSpeechEngine {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
            words_per_minute: BASE_WORDS_PER_MINUTE,
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Pace at rate 1.0; values below 1 wpm are raised to 1
    pub fn with_words_per_minute(mut self, words_per_minute: f32) -> Self {
        self.words_per_minute = words_per_minute.max(1.0);
        self
    }

    fn word_delay(&self, rate: f32) -> Duration {
        Duration::from_secs_f32(60.0 / (self.words_per_minute * rate.max(0.1)))
    }
}

struct ConsoleUtterance {
    cancel: CancellationToken,
    paused: watch::Sender<bool>,
    volume: Arc<AtomicU32>,
}

impl UtteranceHandle for ConsoleUtterance {
    fn pause(&self) {
        let _ = self.paused.send(true);
    }

    fn resume(&self) {
        let _ = self.paused.send(false);
    }

    fn set_volume(&self, volume: f32) {
        self.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    fn cancel(self: Box<Self>) {
        self.cancel.cancel();
    }
}

impl SpeechEngine for ConsoleSpeechEngine {
    fn speak(
        &self,
        utterance: Utterance,
        events: EngineEventSender,
    ) -> Result<Box<dyn UtteranceHandle>> {
        let cancel = CancellationToken::new();
        let (paused_tx, paused_rx) = watch::channel(false);
        let volume = Arc::new(AtomicU32::new(utterance.volume.to_bits()));

        tokio::spawn(read_aloud(
            utterance.id,
            utterance.text,
            self.word_delay(utterance.rate),
            Arc::clone(&self.writer),
            events,
            cancel.clone(),
            paused_rx,
            Arc::clone(&volume),
        ));

        Ok(Box::new(ConsoleUtterance {
            cancel,
            paused: paused_tx,
            volume,
        }))
    }
}

fn write_text(writer: &SharedWriter, text: &str) -> std::io::Result<()> {
    let mut writer = writer
        .lock()
        .map_err(|_| std::io::Error::other("console writer poisoned"))?;
    writer.write_all(text.as_bytes())?;
    writer.flush()
}

#[allow(clippy::too_many_arguments)]
async fn read_aloud(
    id: uuid::Uuid,
    text: String,
    delay: Duration,
    writer: SharedWriter,
    events: EngineEventSender,
    cancel: CancellationToken,
    mut paused: watch::Receiver<bool>,
    volume: Arc<AtomicU32>,
) {
    let _ = events.send(EngineEvent::Started(id));

    for line in text.lines() {
        for word in line.split_whitespace() {
            loop {
                let is_paused = *paused.borrow_and_update();
                if !is_paused {
                    break;
                }
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    changed = paused.changed() => if changed.is_err() { return },
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(utterance = %id, "Utterance cancelled");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            // Muted utterances keep their pace but print nothing
            if f32::from_bits(volume.load(Ordering::Relaxed)) > 0.0 {
                if let Err(e) = write_text(&writer, &format!("{word} ")) {
                    let _ = events.send(EngineEvent::Error {
                        id,
                        message: e.to_string(),
                    });
                    return;
                }
            }
        }
        if f32::from_bits(volume.load(Ordering::Relaxed)) > 0.0 {
            let _ = write_text(&writer, "\n");
        }
    }

    let _ = events.send(EngineEvent::Finished(id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn utterance(text: &str, volume: f32) -> Utterance {
        Utterance {
            id: uuid::Uuid::new_v4(),
            text: text.to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_speaks_every_word_then_finishes() {
        let sink = Sink::default();
        let engine = ConsoleSpeechEngine::new(sink.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let u = utterance("Sales rise\nsteadily", 1.0);
        let id = u.id;

        let _handle = engine.speak(u, tx).unwrap();

        assert_eq!(rx.recv().await, Some(EngineEvent::Started(id)));
        assert_eq!(rx.recv().await, Some(EngineEvent::Finished(id)));
        assert_eq!(sink.text(), "Sales rise \nsteadily \n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_muted_utterance_prints_nothing() {
        let sink = Sink::default();
        let engine = ConsoleSpeechEngine::new(sink.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let u = utterance("quiet words", 0.0);
        let id = u.id;

        let _handle = engine.speak(u, tx).unwrap();

        assert_eq!(rx.recv().await, Some(EngineEvent::Started(id)));
        assert_eq!(rx.recv().await, Some(EngineEvent::Finished(id)));
        assert_eq!(sink.text(), "");
    }

    #[test]
    fn test_word_delay_follows_pace_and_rate() {
        let engine = ConsoleSpeechEngine::new(Sink::default()).with_words_per_minute(120.0);
        assert_eq!(engine.word_delay(1.0), Duration::from_millis(500));
        assert_eq!(engine.word_delay(2.0), Duration::from_millis(250));

        let floor = ConsoleSpeechEngine::new(Sink::default()).with_words_per_minute(0.0);
        assert_eq!(floor.word_delay(1.0), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_without_finishing() {
        let sink = Sink::default();
        let engine = ConsoleSpeechEngine::new(sink.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let u = utterance("one two three four", 1.0);

        let handle = engine.speak(u, tx).unwrap();
        assert!(matches!(rx.recv().await, Some(EngineEvent::Started(_))));
        handle.cancel();

        // Sender dropped by the cancelled task, no Finished event
        assert_eq!(rx.recv().await, None);
        assert!(!sink.text().contains("four"));
    }
}
