//! Pipeline stages for document conversion.
//!
//! Each submodule wraps exactly one collaborator library or transformation
//! step. Keeping stages separate makes each independently testable and lets
//! us swap a collaborator (e.g. the PDF renderer) without touching other
//! stages.
//!
//! ## Data flow
//!
//! ```text
//! input ──▶ decode ──▶ { ebook | raster | layout } ──▶ Artifact
//! (path)   (pdfium /     (per-target assembly)
//!           docx-rs /
//!           calamine)
//! ```
//!
//! 1. [`input`]    — read the file, sniff its format from magic bytes
//! 2. [`decode`]   — pdfium: page count, text, rasterisation; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`wordproc`] — docx-rs: DOCX bytes → intermediate block tree
//! 4. [`sheet`]    — calamine: XLSX bytes → first-sheet string table
//! 5. [`ebook`]    — page texts → EPUB-style XHTML package
//! 6. [`raster`]   — rasterised page → JPEG bytes
//! 7. [`layout`]   — printpdf: blocks / tables / images → output PDF bytes

pub mod decode;
pub mod ebook;
pub mod input;
pub mod layout;
pub mod raster;
pub mod sheet;
pub mod wordproc;
