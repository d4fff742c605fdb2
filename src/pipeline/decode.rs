//! PDF decoding: page count, metadata, per-page text, and rasterisation via
//! pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking thread
//! pool so Tokio worker threads never stall inside a render call.
//!
//! All entry points take owned bytes: the caller has already read the file,
//! and pdfium can parse from memory without a second disk round-trip.

use crate::error::ConvertError;
use crate::format::SourceFormat;
use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// PDF document metadata, available without converting anything.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

fn decode_err(e: impl std::fmt::Debug) -> ConvertError {
    ConvertError::DecodeFailed {
        format: SourceFormat::Pdf,
        detail: format!("{e:?}"),
    }
}

fn join_err(e: tokio::task::JoinError) -> ConvertError {
    ConvertError::Internal(format!("pdfium task panicked: {e}"))
}

/// Extract the text of every page, strictly ordered by page number 1..N.
pub async fn page_texts(bytes: Vec<u8>) -> Result<Vec<String>, ConvertError> {
    tokio::task::spawn_blocking(move || page_texts_blocking(&bytes))
        .await
        .map_err(join_err)?
}

fn page_texts_blocking(bytes: &[u8]) -> Result<Vec<String>, ConvertError> {
    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(decode_err)?;

    let pages = document.pages();
    let total = pages.len() as usize;
    if total == 0 {
        return Err(ConvertError::DecodeFailed {
            format: SourceFormat::Pdf,
            detail: "document has no pages".into(),
        });
    }
    info!("PDF loaded: {} pages", total);

    let mut texts = Vec::with_capacity(total);
    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(decode_err)?.all();
        debug!("Extracted page {} → {} chars", idx + 1, text.len());
        texts.push(text);
    }

    Ok(texts)
}

/// Rasterise only the first page at the given scale factor.
///
/// Later pages are never touched regardless of the document's page count.
pub async fn rasterize_first_page(
    bytes: Vec<u8>,
    scale: f32,
) -> Result<DynamicImage, ConvertError> {
    tokio::task::spawn_blocking(move || rasterize_first_page_blocking(&bytes, scale))
        .await
        .map_err(join_err)?
}

fn rasterize_first_page_blocking(bytes: &[u8], scale: f32) -> Result<DynamicImage, ConvertError> {
    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(decode_err)?;

    let pages = document.pages();
    if pages.is_empty() {
        return Err(ConvertError::DecodeFailed {
            format: SourceFormat::Pdf,
            detail: "document has no pages".into(),
        });
    }

    let page = pages.get(0).map_err(decode_err)?;
    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| ConvertError::RenderFailed {
            detail: format!("page 1 rasterisation: {e:?}"),
        })?;

    let image = bitmap.as_image();
    debug!(
        "Rasterised page 1 at {}x → {}x{} px",
        scale,
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Read document metadata without rendering or extracting anything.
pub async fn inspect(bytes: Vec<u8>) -> Result<DocumentInfo, ConvertError> {
    tokio::task::spawn_blocking(move || inspect_blocking(&bytes))
        .await
        .map_err(join_err)?
}

fn inspect_blocking(bytes: &[u8]) -> Result<DocumentInfo, ConvertError> {
    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(decode_err)?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentInfo {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}
