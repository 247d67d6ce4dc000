//! Pipeline stages for document-to-audio conversion.
//!
//! Each submodule implements exactly one transformation step, so stages are
//! independently testable and a backend can be swapped without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ extract ──▶ (summarize) ──▶ synth ──▶ persist
//! (staged)   (pdfium+OCR)  (collaborator)  (TTS+WAV)  (store)
//! ```
//!
//! 1. [`extract`] — pull text out of PDFs (per-page, including embedded
//!    raster images) and standalone images; pdfium and recognition models
//!    run on the dispatcher because neither is async-safe
//! 2. [`synth`] — turn the final text into a WAV artifact with bounded
//!    retry; the only stage that writes durable output

pub mod extract;
pub mod synth;
