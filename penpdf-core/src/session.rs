use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::alerts::{Alert, AlertBridge, AlertReply};
use crate::engine::{Engine, EngineProvider};
use crate::error::{SessionError, SessionResult};
use crate::links::normalize_links;
use crate::style::AnnotationStyle;
use crate::text::segment_words;
use crate::types::{
    Annotation, AnnotationKind, Bitmap, ClickResult, LinkInfo, OutlineItem, PageRaster, PageSize,
    Patch, Point, Rect, Rgb, TextWord, WidgetKind,
};

pub type SessionId = Uuid;

static SESSION_NAMESPACE: Lazy<Uuid> = Lazy::new(|| {
    Uuid::parse_str("3f0c7f5e-6a1d-5b8e-9a44-2d1e8c0b7a61").expect("valid namespace UUID")
});

/// Stable id for a document opened from `path`.
pub fn session_id_for_path(path: &Path) -> SessionId {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let rendered = resolved.to_string_lossy();
    Uuid::new_v5(&*SESSION_NAMESPACE, rendered.as_bytes())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DocumentSource {
    Path(PathBuf),
    Buffer { name: String, len: usize },
}

/// Where the engine's cursor sits and the size it reported for that page.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    page: usize,
    size: PageSize,
}

struct Inner {
    engine: Option<Box<dyn Engine>>,
    cursor: Option<Cursor>,
}

impl Inner {
    fn engine_mut(&mut self) -> SessionResult<&mut (dyn Engine + 'static)> {
        self.engine.as_deref_mut().ok_or(SessionError::Closed)
    }
}

/// One open document.
///
/// Every call that touches the engine holds the session lock for its whole
/// duration, so a render thread and a UI thread can share one `Session`
/// (typically behind an `Arc`). The page count is cached behind its own lock
/// and can be read without waiting for a render to finish.
pub struct Session {
    id: SessionId,
    source: DocumentSource,
    format: String,
    inner: Mutex<Inner>,
    page_count: Mutex<Option<usize>>,
    alerts: Arc<AlertBridge>,
    closed: AtomicBool,
}

impl Session {
    #[instrument(skip(provider, path), fields(path = %path.as_ref().display()))]
    pub fn open_path<P: AsRef<Path>>(provider: &dyn EngineProvider, path: P) -> SessionResult<Self> {
        let path = path.as_ref();
        let engine = provider.open_path(path).ok_or_else(|| SessionError::Open {
            path: path.display().to_string(),
        })?;
        let id = session_id_for_path(path);
        Ok(Self::with_engine_and_source(
            id,
            DocumentSource::Path(path.to_path_buf()),
            engine,
        ))
    }

    #[instrument(skip(provider, data), fields(len = data.len()))]
    pub fn open_buffer(
        provider: &dyn EngineProvider,
        data: Vec<u8>,
        name: &str,
    ) -> SessionResult<Self> {
        let len = data.len();
        let engine = provider
            .open_buffer(data, name)
            .ok_or_else(|| SessionError::OpenBuffer {
                name: name.to_owned(),
            })?;
        Ok(Self::with_engine_and_source(
            Uuid::new_v4(),
            DocumentSource::Buffer {
                name: name.to_owned(),
                len,
            },
            engine,
        ))
    }

    fn with_engine_and_source(
        id: SessionId,
        source: DocumentSource,
        mut engine: Box<dyn Engine>,
    ) -> Self {
        let alerts = Arc::new(AlertBridge::new());
        engine.attach_alerts(Arc::clone(&alerts));
        let format = engine.format();
        debug!(%id, %format, "document session opened");
        Self {
            id,
            source,
            format,
            inner: Mutex::new(Inner {
                engine: Some(engine),
                cursor: None,
            }),
            page_count: Mutex::new(None),
            alerts,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// File format reported by the engine at open time.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            DocumentSource::Path(path) => Some(path),
            DocumentSource::Buffer { .. } => None,
        }
    }

    /// Last path component for file sessions, the display name for buffers.
    pub fn file_name(&self) -> &str {
        match &self.source {
            DocumentSource::Path(path) => {
                let rendered = path.to_str().unwrap_or_default();
                rendered.rsplit('/').next().unwrap_or(rendered)
            }
            DocumentSource::Buffer { name, .. } => name,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> SessionResult<()> {
        if self.is_closed() {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    /// Page the engine is positioned at, if any call has positioned it yet.
    pub fn current_page(&self) -> Option<usize> {
        self.inner.lock().cursor.map(|cursor| cursor.page)
    }

    pub fn page_count(&self) -> SessionResult<usize> {
        self.ensure_open()?;
        if let Some(count) = *self.page_count.lock() {
            return Ok(count);
        }
        let mut inner = self.inner.lock();
        let engine = inner.engine_mut()?;
        Ok(self.cached_page_count(engine))
    }

    /// Caller holds the session lock; the count lock nests inside it.
    fn cached_page_count(&self, engine: &mut dyn Engine) -> usize {
        let mut cached = self.page_count.lock();
        *cached.get_or_insert_with(|| engine.count_pages())
    }

    fn invalidate_page_count(&self, inner: &mut Inner) {
        *self.page_count.lock() = None;
        inner.cursor = None;
        debug!(id = %self.id, "page count invalidated");
    }

    /// Positions the engine on `page`, clamped into the document, and refreshes
    /// the cached page size.
    fn goto_locked(&self, inner: &mut Inner, page: i64) -> SessionResult<Cursor> {
        let engine = inner.engine.as_deref_mut().ok_or(SessionError::Closed)?;
        let count = self.cached_page_count(engine);
        let index = clamp_page(page, count).ok_or(SessionError::NoPages)?;
        if i64::try_from(index) != Ok(page) {
            debug!(requested = page, clamped = index, "page index clamped");
        }

        engine.goto_page(index);
        let cursor = Cursor {
            page: index,
            size: PageSize {
                width: engine.page_width(),
                height: engine.page_height(),
            },
        };
        inner.cursor = Some(cursor);
        Ok(cursor)
    }

    fn with_engine<R, F>(&self, f: F) -> SessionResult<R>
    where
        F: FnOnce(&mut dyn Engine) -> R,
    {
        let mut inner = self.inner.lock();
        let engine = inner.engine_mut()?;
        Ok(f(engine))
    }

    fn with_page<R, F>(&self, page: i32, f: F) -> SessionResult<R>
    where
        F: FnOnce(&mut dyn Engine, usize) -> R,
    {
        let mut inner = self.inner.lock();
        let cursor = self.goto_locked(&mut inner, i64::from(page))?;
        let engine = inner.engine_mut()?;
        Ok(f(engine, cursor.page))
    }

    pub fn page_size(&self, page: i32) -> SessionResult<PageSize> {
        let mut inner = self.inner.lock();
        Ok(self.goto_locked(&mut inner, i64::from(page))?.size)
    }

    /// Renders `patch` of `page` (scaled to `raster`) into `target`.
    #[instrument(skip(self, target), fields(id = %self.id))]
    pub fn draw_page(
        &self,
        target: &mut Bitmap,
        page: i32,
        raster: PageRaster,
        patch: Patch,
    ) -> SessionResult<()> {
        self.with_page(page, |engine, _| engine.draw_page(target, raster, patch))
    }

    /// Refreshes `patch` of `page` after an edit. Does not move the cursor.
    #[instrument(skip(self, target), fields(id = %self.id))]
    pub fn update_page(
        &self,
        target: &mut Bitmap,
        page: usize,
        raster: PageRaster,
        patch: Patch,
    ) -> SessionResult<()> {
        self.with_engine(|engine| engine.update_page(target, page, raster, patch))
    }

    pub fn pass_click(&self, page: usize, at: Point) -> SessionResult<ClickResult> {
        self.with_engine(|engine| {
            let changed = engine.pass_click(page, at.x, at.y);
            focused_widget_result(engine, changed)
        })
    }

    pub fn set_focused_widget_text(&self, page: i32, text: &str) -> SessionResult<bool> {
        self.with_page(page, |engine, _| engine.set_focused_widget_text(text))
    }

    pub fn set_focused_widget_choice_selected(&self, selected: &[String]) -> SessionResult<()> {
        self.with_engine(|engine| engine.set_focused_widget_choice_selected(selected))
    }

    pub fn check_focused_signature(&self) -> SessionResult<Option<String>> {
        self.with_engine(|engine| engine.check_focused_signature())
    }

    pub fn sign_focused_signature(&self, key_file: &Path, password: &str) -> SessionResult<bool> {
        self.with_engine(|engine| engine.sign_focused_signature(key_file, password))
    }

    /// Links on `page`. Internal destinations come back in the same top-left
    /// space as the link hot spots.
    #[instrument(skip(self), fields(id = %self.id))]
    pub fn page_links(&self, page: i32) -> SessionResult<Option<Vec<LinkInfo>>> {
        let mut inner = self.inner.lock();
        let cursor = self.goto_locked(&mut inner, i64::from(page))?;
        let Some(mut links) = inner.engine_mut()?.page_links(cursor.page) else {
            return Ok(None);
        };
        normalize_links(&mut links, |target| {
            let target = i64::try_from(target).unwrap_or(i64::MAX);
            self.goto_locked(&mut inner, target)
                .map(|cursor| cursor.size.height)
        })?;
        Ok(Some(links))
    }

    pub fn widget_areas(&self, page: i32) -> SessionResult<Vec<Rect>> {
        self.with_page(page, |engine, index| engine.widget_areas(index))
    }

    pub fn annotations(&self, page: i32) -> SessionResult<Vec<Annotation>> {
        self.with_page(page, |engine, index| engine.annotations(index))
    }

    pub fn search(&self, page: i32, text: &str) -> SessionResult<Option<Vec<Rect>>> {
        self.with_page(page, |engine, _| engine.search(text))
    }

    pub fn html(&self, page: i32) -> SessionResult<Option<Vec<u8>>> {
        self.with_page(page, |engine, _| engine.html())
    }

    /// Text of `page` as lines of words.
    #[instrument(skip(self), fields(id = %self.id))]
    pub fn text_lines(&self, page: i32) -> SessionResult<Vec<Vec<TextWord>>> {
        let blocks = self.with_page(page, |engine, _| engine.text())?;
        Ok(segment_words(&blocks))
    }

    pub fn add_markup_annotation(
        &self,
        page: i32,
        quad_points: &[Point],
        kind: AnnotationKind,
    ) -> SessionResult<()> {
        self.with_page(page, |engine, _| {
            engine.add_markup_annotation(quad_points, kind)
        })
    }

    pub fn add_ink_annotation(&self, page: i32, arcs: &[Vec<Point>]) -> SessionResult<()> {
        self.with_page(page, |engine, _| engine.add_ink_annotation(arcs))
    }

    pub fn delete_annotation(&self, page: i32, index: usize) -> SessionResult<()> {
        self.with_page(page, |engine, _| engine.delete_annotation(index))
    }

    pub fn has_outline(&self) -> SessionResult<bool> {
        self.with_engine(|engine| engine.has_outline())
    }

    pub fn outline(&self) -> SessionResult<Option<Vec<OutlineItem>>> {
        self.with_engine(|engine| engine.outline())
    }

    pub fn needs_password(&self) -> SessionResult<bool> {
        self.with_engine(|engine| engine.needs_password())
    }

    /// Unlocks the document. A successful unlock drops the cached page count,
    /// which a locked document reports as zero.
    pub fn authenticate_password(&self, password: &str) -> SessionResult<bool> {
        let mut inner = self.inner.lock();
        let unlocked = inner.engine_mut()?.authenticate_password(password);
        if unlocked {
            self.invalidate_page_count(&mut inner);
        }
        Ok(unlocked)
    }

    pub fn has_changes(&self) -> SessionResult<bool> {
        self.with_engine(|engine| engine.has_changes())
    }

    /// Saves over the source document.
    pub fn save(&self) -> SessionResult<bool> {
        self.with_engine(|engine| engine.save_as(None))
    }

    pub fn save_as(&self, path: &Path) -> SessionResult<bool> {
        self.with_engine(|engine| engine.save_as(Some(path)))
    }

    pub fn insert_blank_page_before(&self, index: usize) -> SessionResult<bool> {
        let mut inner = self.inner.lock();
        let inserted = inner.engine_mut()?.insert_blank_page_before(index);
        self.invalidate_page_count(&mut inner);
        Ok(inserted)
    }

    pub fn insert_blank_page_at_end(&self) -> SessionResult<bool> {
        let mut inner = self.inner.lock();
        let engine = inner.engine_mut()?;
        let count = self.cached_page_count(engine);
        let inserted = engine.insert_blank_page_before(count);
        self.invalidate_page_count(&mut inner);
        Ok(inserted)
    }

    pub fn javascript_supported(&self) -> SessionResult<bool> {
        self.with_engine(|engine| engine.javascript_supported())
    }

    pub fn set_ink_thickness(&self, thickness: f32) -> SessionResult<()> {
        self.with_engine(|engine| engine.set_ink_thickness(thickness))
    }

    pub fn set_ink_color(&self, color: Rgb) -> SessionResult<()> {
        self.with_engine(|engine| engine.set_ink_color(color))
    }

    pub fn set_highlight_color(&self, color: Rgb) -> SessionResult<()> {
        self.with_engine(|engine| engine.set_highlight_color(color))
    }

    pub fn set_underline_color(&self, color: Rgb) -> SessionResult<()> {
        self.with_engine(|engine| engine.set_underline_color(color))
    }

    pub fn set_strikeout_color(&self, color: Rgb) -> SessionResult<()> {
        self.with_engine(|engine| engine.set_strikeout_color(color))
    }

    /// Pushes every annotation setting to the engine in one locked step.
    pub fn apply_style(&self, style: &AnnotationStyle) -> SessionResult<()> {
        self.with_engine(|engine| {
            engine.set_ink_thickness(style.ink_radius());
            engine.set_ink_color(style.ink_color);
            engine.set_highlight_color(style.highlight_color);
            engine.set_underline_color(style.underline_color);
            engine.set_strikeout_color(style.strikeout_color);
        })
    }

    /// Blocks until the document raises an alert. `None` once alerts are
    /// stopped.
    pub fn wait_for_alert(&self) -> SessionResult<Option<Alert>> {
        self.ensure_open()?;
        Ok(self.alerts.wait_for_alert())
    }

    pub fn reply_to_alert(&self, reply: AlertReply) -> SessionResult<()> {
        self.ensure_open()?;
        self.alerts.reply(reply);
        Ok(())
    }

    pub fn start_alerts(&self) -> SessionResult<()> {
        self.ensure_open()?;
        self.alerts.start();
        Ok(())
    }

    pub fn stop_alerts(&self) -> SessionResult<()> {
        self.ensure_open()?;
        self.alerts.stop();
        Ok(())
    }

    /// Stops alert delivery and releases the engine. Every later call fails
    /// with [`SessionError::Closed`].
    #[instrument(skip(self), fields(id = %self.id))]
    pub fn close(&self) {
        // An engine call blocked on an unanswered alert holds the session lock.
        self.alerts.stop();
        let mut inner = self.inner.lock();
        if let Some(mut engine) = inner.engine.take() {
            engine.release();
            debug!("engine released");
        }
        inner.cursor = None;
        *self.page_count.lock() = None;
        self.closed.store(true, Ordering::Release);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(mut engine) = self.inner.get_mut().engine.take() {
            self.alerts.stop();
            engine.release();
        }
    }
}

/// Clamps a requested page into `0..count`. `None` for an empty document.
fn clamp_page(page: i64, count: usize) -> Option<usize> {
    let last = count.checked_sub(1)?;
    if page <= 0 {
        Some(0)
    } else {
        Some(usize::try_from(page).map_or(last, |page| page.min(last)))
    }
}

fn focused_widget_result(engine: &mut dyn Engine, changed: bool) -> ClickResult {
    match engine.focused_widget_kind() {
        WidgetKind::Text => ClickResult::Text {
            changed,
            text: engine.focused_widget_text(),
        },
        WidgetKind::ListBox | WidgetKind::ComboBox => ClickResult::Choice {
            changed,
            options: engine.focused_widget_choice_options(),
            selected: engine.focused_widget_choice_selected(),
        },
        WidgetKind::Signature => ClickResult::Signature {
            changed,
            state: engine.focused_widget_signature_state(),
        },
        WidgetKind::None
        | WidgetKind::PushButton
        | WidgetKind::CheckBox
        | WidgetKind::RadioButton => ClickResult::Plain { changed },
    }
}
