//! Upload and analyze flow
//!
//! ```text
//! Empty --select--> FileSelected --analyze--> Uploading --ok--> (handoff)
//!                        ^                        |
//!                        +-------- failure -------+
//! ```
//!
//! A rejected selection leaves the state untouched. A failed analysis keeps
//! the selected file so the user can retry.

use crate::client::{AnalysisRequest, ChartAnalysisService};
use crate::error::{FlowError, Result};
use crate::flow::AnalysisResult;
use crate::image::ChartImage;
use chartspeak_common::events::EventBus;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Upload screen state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Empty,
    FileSelected {
        image: ChartImage,
        /// Data-URL preview of the image
        preview: String,
    },
    Uploading {
        image: ChartImage,
    },
}

pub struct UploadFlow {
    service: Arc<dyn ChartAnalysisService>,
    events: EventBus,
    state: UploadState,
    error: Option<String>,
}

impl UploadFlow {
    pub fn new(service: Arc<dyn ChartAnalysisService>, events: EventBus) -> Self {
        Self {
            service,
            events,
            state: UploadState::Empty,
            error: None,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Alert from the last failed analysis
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected(&self) -> Option<&ChartImage> {
        match &self.state {
            UploadState::Empty => None,
            UploadState::FileSelected { image, .. } | UploadState::Uploading { image } => {
                Some(image)
            }
        }
    }

    /// Whether the Analyze action is available
    pub fn can_analyze(&self) -> bool {
        matches!(self.state, UploadState::FileSelected { .. })
    }

    /// Select a file by content
    pub fn select_file(
        &mut self,
        file_name: &str,
        declared_mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let Some(image) = ChartImage::detect(file_name, declared_mime, bytes) else {
            warn!(file_name, "Rejected non-image file");
            self.events.announce(FlowError::InvalidFileType.to_string());
            return Err(FlowError::InvalidFileType);
        };

        info!(file_name, mime_type = %image.mime_type, "File selected");
        let preview = image.data_url();
        self.state = UploadState::FileSelected { image, preview };
        self.error = None;
        self.events.announce(format!(
            "File selected: {file_name}. Press the Analyze Chart button to continue."
        ));
        Ok(())
    }

    /// Select a file from disk
    pub async fn select_path(&mut self, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.select_file(&file_name, None, bytes)
    }

    /// Clear the selection
    pub fn remove_file(&mut self) {
        self.state = UploadState::Empty;
        self.error = None;
        self.events
            .announce("File removed. Upload area ready for new file.");
    }

    /// Send the selected image for analysis
    ///
    /// On success the flow resets and the result is handed to the caller;
    /// on failure the file stays selected and the error is announced.
    pub async fn analyze(&mut self) -> Result<AnalysisResult> {
        let image = match &self.state {
            UploadState::FileSelected { image, .. } => image.clone(),
            _ => return Err(FlowError::NoFileSelected),
        };

        self.state = UploadState::Uploading {
            image: image.clone(),
        };
        self.error = None;
        self.events.announce("Processing chart. Please wait.");

        match self
            .service
            .analyze(AnalysisRequest::initial(image.clone()))
            .await
        {
            Ok(insights) => {
                info!(insights_len = insights.len(), "Analysis complete");
                self.state = UploadState::Empty;
                self.events
                    .announce("Analysis complete. Redirecting to insights.");
                Ok(AnalysisResult { insights, image })
            }
            Err(e) => {
                error!("Error analyzing chart: {}", e);
                let message = e.to_string();
                self.state = UploadState::FileSelected {
                    preview: image.data_url(),
                    image,
                };
                self.error = Some(message.clone());
                self.events.announce(message);
                Err(FlowError::Analysis(e))
            }
        }
    }
}
