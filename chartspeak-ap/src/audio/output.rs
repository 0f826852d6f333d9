//! Audio output using cpal
//!
//! The cpal stream is not `Send`, so it lives on a dedicated thread. Tone
//! commands reach that thread over a channel and update a single shared
//! oscillator read by the audio callback; starting a tone replaces whatever
//! the oscillator was playing.

use super::{ActiveTone, ToneOutput, ToneSpec};
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use tracing::{debug, error, info, warn};

enum Command {
    Start { id: u64, tone: ToneSpec },
    Stop { id: u64 },
}

/// Oscillator state shared with the audio callback
#[derive(Debug, Default)]
struct Oscillator {
    id: Option<u64>,
    phase: f64,
    step: f64,
    gain: f32,
    remaining_frames: u64,
}

impl Oscillator {
    fn next_sample(&mut self) -> f32 {
        if self.id.is_none() || self.remaining_frames == 0 {
            self.id = None;
            return 0.0;
        }
        self.remaining_frames -= 1;
        let sample = (self.phase.sin() as f32) * self.gain;
        self.phase = (self.phase + self.step) % TAU;
        sample
    }
}

/// Sine tone output on a cpal device
pub struct CpalToneOutput {
    commands: Mutex<mpsc::Sender<Command>>,
    next_id: AtomicU64,
}

impl CpalToneOutput {
    /// List available audio output devices
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open the named device (or the default one) and start its stream
    pub fn open(device_name: Option<String>) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        std::thread::Builder::new()
            .name("chartspeak-tone-output".to_string())
            .spawn(move || run_output_thread(device_name, rx, ready_tx))?;

        ready_rx
            .recv()
            .map_err(|_| Error::AudioOutput("Audio thread exited during startup".to_string()))??;

        Ok(Self {
            commands: Mutex::new(tx),
            next_id: AtomicU64::new(1),
        })
    }

    fn send(&self, command: Command) -> Result<()> {
        let tx = self
            .commands
            .lock()
            .map_err(|_| Error::AudioOutput("Command channel poisoned".to_string()))?;
        tx.send(command)
            .map_err(|_| Error::AudioOutput("Audio thread is not running".to_string()))
    }
}

struct CpalTone {
    id: u64,
    commands: mpsc::Sender<Command>,
}

impl ActiveTone for CpalTone {
    fn stop(self: Box<Self>) {
        // Audio thread gone means nothing is sounding
        let _ = self.commands.send(Command::Stop { id: self.id });
    }
}

impl ToneOutput for CpalToneOutput {
    fn start(&self, tone: ToneSpec) -> Result<Box<dyn ActiveTone>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.send(Command::Start { id, tone })?;

        let commands = self
            .commands
            .lock()
            .map_err(|_| Error::AudioOutput("Command channel poisoned".to_string()))?
            .clone();
        Ok(Box::new(CpalTone { id, commands }))
    }
}

fn select_device(device_name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();

    if let Some(name) = device_name {
        let mut devices = host
            .output_devices()
            .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?;
        if let Some(device) = devices.find(|d| d.name().ok().as_deref() == Some(name)) {
            info!("Found requested audio device: {}", name);
            return Ok(device);
        }
        warn!("Requested device '{}' not found, falling back to default device", name);
    }

    let device = host
        .default_output_device()
        .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?;
    info!(
        "Using default audio device: {}",
        device.name().unwrap_or_else(|_| "Unknown".to_string())
    );
    Ok(device)
}

fn run_output_thread(
    device_name: Option<String>,
    commands: mpsc::Receiver<Command>,
    ready: mpsc::Sender<Result<()>>,
) {
    let oscillator = Arc::new(Mutex::new(Oscillator::default()));

    let started = (|| -> Result<(cpal::Stream, u32)> {
        let device = select_device(device_name.as_deref())?;
        let supported = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("Failed to get default config: {}", e)))?;
        if supported.sample_format() != SampleFormat::F32 {
            return Err(Error::AudioOutput(format!(
                "Unsupported sample format: {:?}",
                supported.sample_format()
            )));
        }

        let config: StreamConfig = supported.config();
        let channels = usize::from(config.channels);
        let sample_rate = config.sample_rate.0;
        debug!("Audio config: sample_rate={}, channels={}", sample_rate, channels);

        let callback_osc = Arc::clone(&oscillator);
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    // Never block the audio thread; emit silence on contention
                    let Ok(mut osc) = callback_osc.try_lock() else {
                        data.fill(0.0);
                        return;
                    };
                    for frame in data.chunks_mut(channels) {
                        let sample = osc.next_sample();
                        frame.fill(sample);
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;
        Ok((stream, sample_rate))
    })();

    let (_stream, sample_rate) = match started {
        Ok(started) => {
            let _ = ready.send(Ok(()));
            started
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    info!("Tone output stream started");

    // Runs until every sender (output + tone handles) is dropped
    for command in commands {
        let Ok(mut osc) = oscillator.lock() else {
            break;
        };
        match command {
            Command::Start { id, tone } => {
                osc.id = Some(id);
                osc.phase = 0.0;
                osc.step = TAU * tone.frequency_hz / f64::from(sample_rate);
                osc.gain = tone.gain.clamp(0.0, 1.0);
                osc.remaining_frames =
                    (tone.duration.as_secs_f64() * f64::from(sample_rate)) as u64;
            }
            Command::Stop { id } => {
                if osc.id == Some(id) {
                    osc.id = None;
                    osc.remaining_frames = 0;
                }
            }
        }
    }

    debug!("Tone output thread exiting");
}
