//! Text extraction from PDFs and standalone images.
//!
//! ## Why two stages for PDFs?
//!
//! pdfium wraps a C++ library with thread-local state, so the whole
//! document walk (page text + embedded image decode) happens inside one
//! blocking dispatcher job. Recognition is the expensive part, so it fans
//! out per page afterwards — each page task carries its page index, and
//! fan-in sorts by that index. Completion order can never change output
//! order; only the explicit index join determines it.

use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::error::ConvertError;
use crate::models::TextRecognizer;
use crate::registry::{ModelHandle, ModelRegistry};

/// Registry of recognition models, keyed by language.
pub type RecognizerRegistry = ModelRegistry<dyn TextRecognizer>;

/// The outcome of text extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Extracted text; never whitespace-only (that case is `NoTextFound`).
    pub text: String,
    /// The language the text was recognized under.
    pub language: String,
}

/// Everything we need from one PDF page before recognition.
struct PdfPageContent {
    index: usize,
    text: String,
    images: Vec<DynamicImage>,
}

/// Extracts text from documents and images via cached recognition models.
pub struct Extractor {
    registry: Arc<RecognizerRegistry>,
    dispatcher: Dispatcher,
    page_concurrency: usize,
}

impl Extractor {
    pub fn new(
        registry: Arc<RecognizerRegistry>,
        dispatcher: Dispatcher,
        page_concurrency: usize,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            page_concurrency: page_concurrency.max(1),
        }
    }

    /// Extract text from a standalone raster image.
    pub async fn extract_from_image(
        &self,
        path: &Path,
        language: &str,
    ) -> Result<Extraction, ConvertError> {
        let image = {
            let path = path.to_path_buf();
            self.dispatcher
                .dispatch(move || image::open(&path))
                .await?
                .map_err(|e| ConvertError::Extraction {
                    detail: format!("failed to decode image: {e}"),
                })?
        };

        let handle = self.registry.acquire(language).await?;
        let fragments = recognize(&self.dispatcher, &handle, image).await?;
        let text = fragments.join(" ");
        debug!("image recognized: {} fragments, {} chars", fragments.len(), text.len());

        finish(text, language)
    }

    /// Extract text from every page of a PDF, in document order.
    ///
    /// Per page: embedded text first, then recognized text of each embedded
    /// raster image, all single-space separated. Pages fan out up to
    /// `page_concurrency` wide and fan back in by page index.
    pub async fn extract_from_pdf(
        &self,
        path: &Path,
        language: &str,
    ) -> Result<Extraction, ConvertError> {
        let pages = {
            let path = path.to_path_buf();
            self.dispatcher
                .dispatch(move || read_pdf_pages(&path))
                .await??
        };
        info!("PDF opened: {} pages", pages.len());

        let handle = self.recognizer_for(&pages, language).await?;
        let text =
            recognize_pages(&self.dispatcher, handle.as_ref(), pages, self.page_concurrency)
                .await?;

        finish(text, language)
    }

    /// Resolve a recognition model only when the document needs one.
    ///
    /// Text-only PDFs are common and must convert even when the OCR backend
    /// is unavailable, so the (expensive) model load is deferred until a
    /// page actually carries raster images. Returns `None` exactly when no
    /// page does.
    async fn recognizer_for(
        &self,
        pages: &[PdfPageContent],
        language: &str,
    ) -> Result<Option<Arc<ModelHandle<dyn TextRecognizer>>>, ConvertError> {
        if pages.iter().all(|p| p.images.is_empty()) {
            debug!("no embedded images; skipping recognition model");
            return Ok(None);
        }
        Ok(Some(self.registry.acquire(language).await?))
    }
}

/// Apply the empty-extraction policy: whitespace-only text is `NoTextFound`.
fn finish(text: String, language: &str) -> Result<Extraction, ConvertError> {
    if text.trim().is_empty() {
        return Err(ConvertError::NoTextFound);
    }
    Ok(Extraction {
        text,
        language: language.to_string(),
    })
}

/// Run one recognition call on the dispatcher.
async fn recognize(
    dispatcher: &Dispatcher,
    handle: &Arc<ModelHandle<dyn TextRecognizer>>,
    image: DynamicImage,
) -> Result<Vec<String>, ConvertError> {
    let handle = Arc::clone(handle);
    dispatcher
        .dispatch(move || handle.with_model(|m| m.recognize(&image)))
        .await?
        .map_err(|e| ConvertError::Extraction {
            detail: format!("text recognition failed: {e}"),
        })
}

/// Fan recognition out per page, fan back in by page index.
///
/// `handle` is `None` only for documents without embedded images; pages
/// then contribute their embedded text alone.
async fn recognize_pages(
    dispatcher: &Dispatcher,
    handle: Option<&Arc<ModelHandle<dyn TextRecognizer>>>,
    pages: Vec<PdfPageContent>,
    concurrency: usize,
) -> Result<String, ConvertError> {
    let handle = handle.map(Arc::clone);
    let tagged: Vec<(usize, Result<String, ConvertError>)> =
        stream::iter(pages.into_iter().map(|page| {
            let dispatcher = dispatcher.clone();
            let handle = handle.clone();
            async move {
                let index = page.index;
                let result = recognize_page(&dispatcher, handle.as_ref(), page).await;
                (index, result)
            }
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut parts = Vec::with_capacity(tagged.len());
    for (index, result) in tagged {
        parts.push((index, result?));
    }
    // The explicit index join: completion order is irrelevant.
    parts.sort_by_key(|(index, _)| *index);

    Ok(parts
        .into_iter()
        .map(|(_, text)| text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" "))
}

/// Recognize one page: embedded text plus every embedded image's text.
async fn recognize_page(
    dispatcher: &Dispatcher,
    handle: Option<&Arc<ModelHandle<dyn TextRecognizer>>>,
    page: PdfPageContent,
) -> Result<String, ConvertError> {
    let mut pieces = Vec::with_capacity(1 + page.images.len());
    let trimmed = page.text.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }

    // `handle` is only `None` when no page in the document has images.
    if let Some(handle) = handle {
        for image in page.images {
            let fragments = recognize(dispatcher, handle, image).await?;
            let text = fragments.join(" ");
            if !text.trim().is_empty() {
                pieces.push(text);
            }
        }
    }

    debug!("page {}: {} text pieces", page.index + 1, pieces.len());
    Ok(pieces.join(" "))
}

/// Blocking document walk: embedded text and decoded raster images per page.
fn read_pdf_pages(path: &Path) -> Result<Vec<PdfPageContent>, ConvertError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| ConvertError::Extraction {
                detail: format!("failed to open PDF: {:?}", e),
            })?;

    let mut pages = Vec::new();
    for (index, page) in document.pages().iter().enumerate() {
        let text = page.text().map(|t| t.all()).unwrap_or_default();

        let mut images = Vec::new();
        for object in page.objects().iter() {
            if let Some(image_object) = object.as_image_object() {
                match image_object.get_raw_image() {
                    Ok(image) => images.push(image),
                    // A broken embedded image should not sink the page;
                    // its surrounding text still converts.
                    Err(e) => warn!(
                        "page {}: skipping unreadable embedded image: {:?}",
                        index + 1,
                        e
                    ),
                }
            }
        }

        pages.push(PdfPageContent { index, text, images });
    }

    Ok(pages)
}
