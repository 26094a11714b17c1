//! Pdfium-backed [`penpdf_core::Engine`].
//!
//! Rendering always goes through a full-page raster that is cached per page and
//! raster size; patches are copied out of it.

mod html;
mod raster;

#[cfg(feature = "pdf")]
mod pdfium;

pub use html::blocks_to_html;
pub use raster::{copy_patch, RenderedPage};

#[cfg(feature = "pdf")]
pub use pdfium::{PdfiumEngine, PdfiumProvider, LIBRARY_PATH_VAR};
