use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to encode page content: {0}")]
    ContentError(String),

    #[error("Failed to prepare image: {0}")]
    ImageError(String),

    #[error("Failed to write PDF: {0}")]
    WriteError(String),
}
