//! Chart image handling
//!
//! Validates that a selected file is an image and renders the data-URL
//! preview shown next to the insights.

use base64::Engine as _;

/// An image file accepted for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ChartImage {
    /// Accept `bytes` if they are an image
    ///
    /// The content is sniffed first; the declared type is only trusted when
    /// sniffing is inconclusive. Returns `None` for anything else.
    pub fn detect(
        file_name: impl Into<String>,
        declared_mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Option<Self> {
        let mime_type = image_mime_type(declared_mime, &bytes)?;
        Some(Self {
            file_name: file_name.into(),
            mime_type,
            bytes,
        })
    }

    /// `data:<mime>;base64,<payload>` preview
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// MIME type of an image, or `None` if the content is not an image
pub fn image_mime_type(declared: Option<&str>, bytes: &[u8]) -> Option<String> {
    match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {
            Some(kind.mime_type().to_string())
        }
        Some(_) => None,
        None => declared
            .filter(|mime| mime.starts_with("image/"))
            .map(str::to_string),
    }
}
