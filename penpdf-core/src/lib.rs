//! Document session layer over a native rendering engine.
//!
//! A [`Session`] owns one open document and serializes every engine call
//! behind a single lock. The engine itself is abstract ([`Engine`]); the
//! `penpdf-render` crate provides a pdfium-backed implementation.

pub mod alerts;
pub mod engine;
pub mod error;
pub mod links;
pub mod session;
pub mod style;
pub mod text;
pub mod types;

pub use alerts::{Alert, AlertBridge, AlertButton, AlertButtons, AlertIcon, AlertReply};
pub use engine::{Engine, EngineProvider};
pub use error::{ConfigError, SessionError, SessionResult};
pub use session::{session_id_for_path, DocumentSource, Session, SessionId};
pub use style::AnnotationStyle;
pub use text::segment_words;
pub use types::{
    Annotation, AnnotationKind, Bitmap, ClickResult, LinkInfo, LinkTarget, OutlineItem,
    PageRaster, PageSize, Patch, Point, Rect, Rgb, SignatureState, TextBlock, TextChar, TextLine,
    TextSpan, TextWord, WidgetKind,
};
