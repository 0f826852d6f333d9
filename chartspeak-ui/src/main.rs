//! chartspeak-ui - terminal client
//!
//! Uploads a chart image to chartspeak-ai, prints the insights, then takes
//! follow-up questions. Announcements (the screen-reader status line) are
//! printed to stderr; insights can be read aloud with `:speak`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chartspeak_ap::speech::{ConsoleSpeechEngine, BASE_WORDS_PER_MINUTE};
use chartspeak_ap::SpeechController;
use chartspeak_common::chat::Role;
use chartspeak_common::config;
use chartspeak_common::events::EventBus;
use chartspeak_ui::{enter_insights, AnalysisClient, Handoff, Screen, UploadFlow};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

const HELP: &str = "Ask a question about the chart, or use :speak (play/pause), :pause, :stop, :mute, :quit";

/// Command-line arguments for chartspeak-ui
#[derive(Parser, Debug)]
#[command(name = "chartspeak-ui")]
#[command(about = "Accessible chart insights in the terminal")]
#[command(version)]
struct Args {
    /// Chart image to analyze
    image: PathBuf,

    /// Base URL of chartspeak-ai
    #[arg(short, long, env = "CHARTSPEAK_SERVER")]
    server: Option<String>,

    /// Path to config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reading pace for :speak
    #[arg(long, default_value_t = BASE_WORDS_PER_MINUTE)]
    words_per_minute: f32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, config_source) = config::load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    config::init_tracing(&config::log_directives("chartspeak_ui", &toml_config.logging));
    config_source.log();

    let server = args
        .server
        .unwrap_or_else(|| format!("http://127.0.0.1:{}", toml_config.ai.port));
    info!("Analysis server: {}", server);

    let events = EventBus::default();
    let mut announcements = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = announcements.recv().await {
            if let Some(message) = event.as_announcement() {
                eprintln!("[status] {message}");
            }
        }
    });

    let service = Arc::new(
        AnalysisClient::new(
            &server,
            Duration::from_secs(toml_config.ai.request_timeout_secs),
        )
        .context("Failed to build analysis client")?,
    );

    let mut upload = UploadFlow::new(service.clone(), events.clone());
    upload
        .select_path(&args.image)
        .await
        .with_context(|| format!("Cannot use {}", args.image.display()))?;
    let result = upload.analyze().await.context("Analysis failed")?;

    let mut session = match enter_insights(Handoff::from(result), service, events.clone()) {
        Screen::Insights(session) => session,
        Screen::Upload => anyhow::bail!("No chart data found"),
    };

    for message in session.messages() {
        println!("\n{}\n", message.content);
    }
    println!("{HELP}");

    let engine = ConsoleSpeechEngine::stdout().with_words_per_minute(args.words_per_minute);
    let speech = SpeechController::new(Arc::new(engine), events.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match line.trim() {
            ":quit" | ":q" => break,
            ":speak" => speech.toggle(session.messages()),
            ":pause" => speech.pause(),
            ":stop" => speech.stop(),
            ":mute" => {
                speech.toggle_mute();
            }
            ":help" => println!("{HELP}"),
            question => {
                if let Some(reply) = session.ask(question).await {
                    println!("\n{}\n", reply.content);
                }
                // :speak reads the newest answer
                let answers = session
                    .messages()
                    .iter()
                    .filter(|m| m.role == Role::Assistant)
                    .count();
                speech.set_message_index(answers.saturating_sub(1));
            }
        }
    }

    speech.shutdown();
    info!("Session ended");
    Ok(())
}
