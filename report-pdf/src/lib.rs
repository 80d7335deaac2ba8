//! PDF materializer for report documents.
//!
//! [`materialize`] paginates a [`Document`] and writes it with lopdf using
//! the standard Helvetica faces, vector icons and embedded JPEG/PNG images.

mod error;
mod fonts;
mod layout;
mod raster;
mod svg_path;
mod writer;

pub use error::PdfError;
pub use layout::{DrawOp, Layout, Page, paginate};

use report_core::{Document, ReportData, export_filename, render};
use tracing::info;

/// A finished export, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Produce the complete PDF for `document`, or an error. Never partial.
pub fn materialize(document: &Document) -> Result<Vec<u8>, PdfError> {
    writer::write_pdf(&paginate(document))
}

/// Render and materialize `report`.
pub fn export_report(report: &ReportData) -> Result<ExportedReport, PdfError> {
    let layout = paginate(&render(report));
    let bytes = writer::write_pdf(&layout)?;
    let exported = ExportedReport {
        filename: export_filename(report),
        bytes,
        page_count: layout.pages.len(),
    };
    info!(
        filename = %exported.filename,
        pages = exported.page_count,
        bytes = exported.bytes.len(),
        "report exported"
    );
    Ok(exported)
}
