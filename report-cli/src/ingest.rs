//! Image intake: file picks, dropped batches and piped clipboard data.
//!
//! Every source in a batch is read and compressed on the blocking pool at
//! the same time. Finished images are handed back in completion order so the
//! caller can append each one against the latest list.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use report_core::image_codec::{mime_from_path, prepare, sniff_mime};
use report_core::{CompressOptions, EncodedImage, ImageCodecError};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Bytes {
        name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl ImageSource {
    fn name(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("clipboard access denied: {0}; add the image with --file instead")]
    ClipboardAccessDenied(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Codec(#[from] ImageCodecError),
}

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Encoded images in completion order.
    pub images: Vec<EncodedImage>,
    /// Items that were not images.
    pub skipped: usize,
    /// `(source, reason)` for items that could not be read.
    pub failed: Vec<(String, String)>,
}

/// Expand a dropped selection: directories contribute their files, sorted
/// by name; anything else is taken as is.
pub fn dropped_sources(paths: &[PathBuf]) -> Result<Vec<ImageSource>, IngestError> {
    let mut sources = Vec::new();
    for path in paths {
        if !path.is_dir() {
            sources.push(ImageSource::File(path.clone()));
            continue;
        }
        let mut entries = fs::read_dir(path)
            .map_err(|source| IngestError::Io {
                path: path.clone(),
                source,
            })?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .collect::<Vec<_>>();
        entries.sort();
        sources.extend(entries.into_iter().map(ImageSource::File));
    }
    Ok(sources)
}

/// Take one pasted image from `reader`.
///
/// `interactive` is true when the reader is a terminal, i.e. nothing was
/// piped in.
pub fn clipboard_source(
    mut reader: impl Read,
    interactive: bool,
) -> Result<ImageSource, IngestError> {
    if interactive {
        return Err(IngestError::ClipboardAccessDenied(
            "no image data was piped on stdin".to_string(),
        ));
    }
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| IngestError::Io {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
    if bytes.is_empty() {
        return Err(IngestError::ClipboardAccessDenied(
            "the clipboard was empty".to_string(),
        ));
    }
    let mime = sniff_mime(&bytes).unwrap_or(OCTET_STREAM).to_string();
    Ok(ImageSource::Bytes {
        name: "clipboard".to_string(),
        mime,
        bytes,
    })
}

fn read_file(path: &Path) -> Result<(String, Vec<u8>), IngestError> {
    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mime = match mime_from_path(path) {
        OCTET_STREAM => sniff_mime(&bytes).unwrap_or(OCTET_STREAM),
        mime => mime,
    };
    Ok((mime.to_string(), bytes))
}

/// Read and compress one source. `Ok(None)` means it was not an image.
fn load(
    source: ImageSource,
    options: CompressOptions,
) -> Result<Option<EncodedImage>, IngestError> {
    let (mime, bytes) = match source {
        ImageSource::File(path) => read_file(&path)?,
        ImageSource::Bytes { mime, bytes, .. } => (mime, bytes),
    };
    if !mime.starts_with("image/") {
        return Ok(None);
    }
    Ok(Some(prepare(&bytes, &mime, options)?))
}

/// Process a batch concurrently. Non-image items are skipped silently.
pub async fn ingest(
    sources: Vec<ImageSource>,
    options: CompressOptions,
) -> IngestReport {
    let mut tasks = JoinSet::new();
    for source in sources {
        let name = source.name();
        tasks.spawn_blocking(move || (name, load(source, options)));
    }

    let mut report = IngestReport::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, Ok(Some(image)))) => {
                debug!(source = %name, "image ready");
                report.images.push(image);
            }
            Ok((name, Ok(None))) => {
                debug!(source = %name, "not an image, skipped");
                report.skipped += 1;
            }
            Ok((name, Err(e))) => {
                warn!(source = %name, error = %e, "image could not be added");
                report.failed.push((name, e.to_string()));
            }
            Err(e) => {
                warn!(error = %e, "image task did not finish");
                report.failed.push(("<task>".to_string(), e.to_string()));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};
    use pretty_assertions::assert_eq;

    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 6, Rgb([200, 30, 30]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "inspection-report-ingest-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    // ── batches ──

    #[tokio::test]
    async fn batch_skips_non_images() {
        let dir = scratch_dir("batch");
        fs::write(dir.join("a.png"), png_bytes()).unwrap();
        fs::write(dir.join("b.png"), png_bytes()).unwrap();
        fs::write(dir.join("notes.txt"), "not a picture").unwrap();

        let sources = dropped_sources(&[dir.clone()]).unwrap();
        assert_eq!(sources.len(), 3);

        let report = ingest(sources, CompressOptions::default()).await;

        assert_eq!(report.images.len(), 2);
        assert_eq!(report.skipped, 1);
        assert!(report.failed.is_empty());
        for image in &report.images {
            assert_eq!(image.mime_type(), Some("image/jpeg"));
        }
        fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn missing_file_fails_alone() {
        let dir = scratch_dir("missing");
        let good = dir.join("ok.png");
        fs::write(&good, png_bytes()).unwrap();

        let report = ingest(
            vec![
                ImageSource::File(good),
                ImageSource::File(dir.join("gone.png")),
            ],
            CompressOptions::default(),
        )
        .await;

        assert_eq!(report.images.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].0.ends_with("gone.png"));
        fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn unnamed_image_file_is_sniffed() {
        let dir = scratch_dir("sniff");
        let path = dir.join("upload");
        fs::write(&path, png_bytes()).unwrap();

        let report = ingest(vec![ImageSource::File(path)], CompressOptions::default()).await;

        assert_eq!(report.images.len(), 1);
        fs::remove_dir_all(dir).unwrap();
    }

    // ── clipboard ──

    #[test]
    fn terminal_stdin_is_denied_with_hint() {
        let err = clipboard_source(std::io::empty(), true).unwrap_err();

        assert!(matches!(err, IngestError::ClipboardAccessDenied(_)));
        assert!(err.to_string().contains("--file"));
    }

    #[test]
    fn piped_bytes_become_a_source() {
        let bytes = png_bytes();

        let source = clipboard_source(Cursor::new(bytes.clone()), false).unwrap();

        assert_eq!(
            source,
            ImageSource::Bytes {
                name: "clipboard".to_string(),
                mime: "image/png".to_string(),
                bytes,
            }
        );
    }

    #[test]
    fn empty_pipe_is_denied() {
        assert!(matches!(
            clipboard_source(std::io::empty(), false),
            Err(IngestError::ClipboardAccessDenied(_))
        ));
    }
}
