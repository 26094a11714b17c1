use std::convert::TryFrom;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use pdfium_render::prelude::*;
use penpdf_core::{
    Annotation, AnnotationKind, AnnotationStyle, Bitmap, Engine, EngineProvider, LinkInfo,
    LinkTarget, OutlineItem, PageRaster, Patch, Point, Rect, Rgb, SignatureState, TextBlock,
    TextChar, TextLine, TextSpan, WidgetKind,
};
use tracing::{debug, instrument, warn};

use crate::html::blocks_to_html;
use crate::raster::{copy_patch, RenderedPage};

/// Runtime override for the pdfium shared library location.
pub const LIBRARY_PATH_VAR: &str = "PENPDF_PDFIUM_LIBRARY_PATH";

pub struct PdfiumProvider {
    pdfium: Arc<Pdfium>,
}

impl PdfiumProvider {
    pub fn new() -> Result<Self> {
        let pdfium = match bind_pdfium_from_env() {
            Some(pdfium) => pdfium,
            None => bind_pdfium_default()?,
        };
        Ok(Self {
            pdfium: Arc::new(pdfium),
        })
    }

    fn open(&self, source: Source) -> Option<Box<dyn Engine>> {
        let mut engine = PdfiumEngine::new(Arc::clone(&self.pdfium), source);
        match engine.load(None) {
            Ok(()) => Some(Box::new(engine)),
            Err(PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError)) => {
                debug!("document is password protected");
                engine.locked = true;
                Some(Box::new(engine))
            }
            Err(err) => {
                warn!(?err, "pdfium could not open document");
                None
            }
        }
    }
}

impl EngineProvider for PdfiumProvider {
    #[instrument(skip(self))]
    fn open_path(&self, path: &Path) -> Option<Box<dyn Engine>> {
        self.open(Source::File(path.to_path_buf()))
    }

    #[instrument(skip(self, data), fields(len = data.len()))]
    fn open_buffer(&self, data: Vec<u8>, name: &str) -> Option<Box<dyn Engine>> {
        self.open(Source::Bytes(data))
    }
}

enum Source {
    File(PathBuf),
    Bytes(Vec<u8>),
}

pub struct PdfiumEngine {
    document: Option<PdfDocument<'static>>,
    source: Source,
    pdfium: Arc<Pdfium>,
    current: usize,
    locked: bool,
    changed: bool,
    render_cache: Option<RenderedPage>,
    /// Pens for annotations created on this document.
    style: AnnotationStyle,
}

// SAFETY: pdfium is bound with the `sync` feature, which serializes every call
// into the library. The document never leaves this engine and the session only
// calls an engine from one thread at a time.
unsafe impl Send for PdfiumEngine {}

impl PdfiumEngine {
    fn new(pdfium: Arc<Pdfium>, source: Source) -> Self {
        Self {
            document: None,
            source,
            pdfium,
            current: 0,
            locked: false,
            changed: false,
            render_cache: None,
            style: AnnotationStyle::default(),
        }
    }

    fn load(&mut self, password: Option<&str>) -> Result<(), PdfiumError> {
        let document = match &self.source {
            Source::File(path) => self.pdfium.load_pdf_from_file(path, password)?,
            Source::Bytes(bytes) => self.pdfium.load_pdf_from_byte_vec(bytes.clone(), password)?,
        };
        // SAFETY: the document borrows the bindings owned by self.pdfium. It is
        // stored in self.document, which is declared before pdfium and so is
        // dropped first. release() drops it explicitly as well.
        let document = unsafe { mem::transmute::<PdfDocument<'_>, PdfDocument<'static>>(document) };
        self.document = Some(document);
        self.render_cache = None;
        Ok(())
    }

    fn document(&self) -> Result<&PdfDocument<'static>> {
        self.document
            .as_ref()
            .ok_or_else(|| anyhow!("no document loaded"))
    }

    fn page(&self, index: usize) -> Result<PdfPage<'static>> {
        let page_index: PdfPageIndex = index
            .try_into()
            .map_err(|_| anyhow!("page {} is out of supported range", index))?;
        self.document()?
            .pages()
            .get(page_index)
            .with_context(|| format!("page {} out of range", index))
    }

    fn current_size(&self) -> Result<(f32, f32)> {
        let page = self.page(self.current)?;
        Ok((page.width().value, page.height().value))
    }

    #[instrument(skip(self))]
    fn render(&self, page_index: usize, raster: PageRaster) -> Result<RenderedPage> {
        if raster.width == 0 || raster.height == 0 {
            bail!("empty raster {}x{}", raster.width, raster.height);
        }
        let width = i32::try_from(raster.width).context("raster width out of range")?;
        let height = i32::try_from(raster.height).context("raster height out of range")?;

        let page = self.page(page_index)?;
        let config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);
        let bitmap = page
            .render_with_config(&config)
            .with_context(|| format!("failed to render page {}", page_index))?;
        let pixels = bitmap.as_image().to_rgba8().into_raw();

        Ok(RenderedPage {
            page: page_index,
            raster,
            width: u32::try_from(bitmap.width()).unwrap_or_default(),
            height: u32::try_from(bitmap.height()).unwrap_or_default(),
            pixels,
        })
    }

    fn render_into(
        &mut self,
        target: &mut Bitmap,
        page: usize,
        raster: PageRaster,
        patch: Patch,
        refresh: bool,
    ) -> Result<()> {
        let cached = !refresh
            && self
                .render_cache
                .as_ref()
                .is_some_and(|entry| entry.matches(page, raster));
        if !cached {
            let rendered = self.render(page, raster)?;
            self.render_cache = Some(rendered);
        }
        if let Some(rendered) = &self.render_cache {
            copy_patch(rendered, target, patch);
        }
        Ok(())
    }

    fn search_current(&self, query: &str) -> Result<Option<Vec<Rect>>> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        let page = self.page(self.current)?;
        let page_height = page.height().value;
        let text = page
            .text()
            .with_context(|| format!("failed to extract text for page {}", self.current))?;
        let search = text
            .search(query, &PdfSearchOptions::new())
            .with_context(|| format!("failed to perform search on page {}", self.current))?;

        let mut hits = Vec::new();
        while let Some(segments) = search.find_next() {
            for segment in segments.iter() {
                hits.push(flip_rect(&segment.bounds(), page_height));
            }
        }
        Ok(Some(hits))
    }

    #[instrument(skip(self), fields(page = self.current))]
    fn extract_text(&self) -> Result<Vec<TextBlock>> {
        let page = self.page(self.current)?;
        let page_height = page.height().value;
        let text = page
            .text()
            .with_context(|| format!("failed to extract text for page {}", self.current))?;

        let mut block = TextBlock::default();
        let mut span = TextSpan::default();
        for ch in text.chars().iter() {
            let Some(c) = ch.unicode_char() else {
                continue;
            };
            if c == '\n' || c == '\r' {
                end_line(&mut block, &mut span);
                continue;
            }
            let rect = ch
                .loose_bounds()
                .map(|bounds| flip_rect(&bounds, page_height))
                .unwrap_or_default();
            span.chars.push(TextChar::new(c, rect));
        }
        end_line(&mut block, &mut span);

        if block.lines.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![block])
        }
    }

    fn links_on(&self, index: usize) -> Result<Option<Vec<LinkInfo>>> {
        let page = self.page(index)?;
        let page_height = page.height().value;

        let mut links = Vec::new();
        for link in page.links().iter() {
            let rect = match link.rect() {
                Ok(rect) => rect,
                Err(err) => {
                    warn!(?err, page = index, "failed to resolve link rectangle");
                    continue;
                }
            };
            let Some(target) = link_target(&link) else {
                continue;
            };
            links.push(LinkInfo {
                rect: flip_rect(&rect, page_height),
                target,
            });
        }
        Ok(Some(links))
    }

    fn annotations_on(&self, index: usize) -> Result<Vec<Annotation>> {
        let page = self.page(index)?;
        let page_height = page.height().value;

        let mut annotations = Vec::new();
        for annotation in page.annotations().iter() {
            let rect = annotation
                .bounds()
                .map(|bounds| flip_rect(&bounds, page_height))
                .unwrap_or_default();
            annotations.push(Annotation {
                rect,
                kind: annotation_kind(annotation.annotation_type()),
            });
        }
        Ok(annotations)
    }

    fn outline_items(&self) -> Result<Option<Vec<OutlineItem>>> {
        let document = self.document()?;
        Ok(document.bookmarks().root().map(collect_outline))
    }

    fn insert_blank(&mut self, index: usize) -> Result<()> {
        let page_index: PdfPageIndex = index
            .try_into()
            .map_err(|_| anyhow!("page {} is out of supported range", index))?;
        let document = self
            .document
            .as_mut()
            .ok_or_else(|| anyhow!("no document loaded"))?;
        document
            .pages_mut()
            .create_page_at_index(PdfPagePaperSize::a4(), page_index)
            .with_context(|| format!("failed to insert blank page at {}", index))?;
        self.mark_edited();
        Ok(())
    }

    /// Adds one text markup annotation covering every quad in `quad_points`
    /// (four top-left-origin corners per quad).
    fn add_markup(&mut self, quad_points: &[Point], kind: AnnotationKind) -> Result<()> {
        let color = match kind {
            AnnotationKind::Highlight => self.style.highlight_color,
            AnnotationKind::Underline | AnnotationKind::Squiggly => self.style.underline_color,
            AnnotationKind::StrikeOut => self.style.strikeout_color,
            other => bail!("{:?} is not a text markup annotation", other),
        };
        let color = pdf_color(color);

        let mut page = self.page(self.current)?;
        let page_height = page.height().value;
        let quads: Vec<PdfQuadPoints> = quad_points
            .chunks_exact(4)
            .map(|corners| quad(corners, page_height))
            .collect();
        if quads.is_empty() {
            bail!("markup needs at least one quad, got {} points", quad_points.len());
        }

        let annotations = page.annotations_mut();
        match kind {
            AnnotationKind::Highlight => {
                let mut annotation = annotations.create_highlight_annotation()?;
                for points in &quads {
                    annotation.attachment_points_mut().create_attachment_point_at_end(*points)?;
                }
                annotation.set_stroke_color(color)?;
            }
            AnnotationKind::Underline => {
                let mut annotation = annotations.create_underline_annotation()?;
                for points in &quads {
                    annotation.attachment_points_mut().create_attachment_point_at_end(*points)?;
                }
                annotation.set_stroke_color(color)?;
            }
            AnnotationKind::Squiggly => {
                let mut annotation = annotations.create_squiggly_annotation()?;
                for points in &quads {
                    annotation.attachment_points_mut().create_attachment_point_at_end(*points)?;
                }
                annotation.set_stroke_color(color)?;
            }
            _ => {
                let mut annotation = annotations.create_strikeout_annotation()?;
                for points in &quads {
                    annotation.attachment_points_mut().create_attachment_point_at_end(*points)?;
                }
                annotation.set_stroke_color(color)?;
            }
        }
        self.mark_edited();
        Ok(())
    }

    /// Adds one ink annotation with a stroked polyline per arc.
    fn add_ink(&mut self, arcs: &[Vec<Point>]) -> Result<()> {
        let color = pdf_color(self.style.ink_color);
        let stroke_width = PdfPoints::new(self.style.ink_thickness);

        let mut page = self.page(self.current)?;
        let page_height = page.height().value;
        let mut annotation = page.annotations_mut().create_ink_annotation()?;
        for arc in arcs {
            for segment in arc.windows(2) {
                let (x1, y1) = to_pdf_space(segment[0], page_height);
                let (x2, y2) = to_pdf_space(segment[1], page_height);
                annotation.objects_mut().create_path_object_line(
                    PdfPoints::new(x1),
                    PdfPoints::new(y1),
                    PdfPoints::new(x2),
                    PdfPoints::new(y2),
                    color,
                    stroke_width,
                )?;
            }
        }
        annotation.set_stroke_color(color)?;
        self.mark_edited();
        Ok(())
    }

    /// `index` counts in the order [`Engine::annotations`] lists them.
    fn delete_annotation_at(&mut self, index: usize) -> Result<()> {
        let mut page = self.page(self.current)?;
        let annotation = page
            .annotations()
            .get(index)
            .with_context(|| format!("no annotation {} on page {}", index, self.current))?;
        page.annotations_mut()
            .delete_annotation(annotation)
            .with_context(|| format!("failed to delete annotation {}", index))?;
        self.mark_edited();
        Ok(())
    }

    fn mark_edited(&mut self) {
        self.changed = true;
        self.render_cache = None;
    }

    fn save_to(&mut self, path: Option<&Path>) -> Result<()> {
        let target = match (path, &self.source) {
            (Some(path), _) => path.to_path_buf(),
            (None, Source::File(path)) => path.clone(),
            (None, Source::Bytes(_)) => bail!("in-memory document has no path to save over"),
        };
        self.document()?
            .save_to_file(&target)
            .with_context(|| format!("failed to save {:?}", target))?;
        self.changed = false;
        Ok(())
    }
}

impl Engine for PdfiumEngine {
    fn format(&mut self) -> String {
        "PDF".to_owned()
    }

    fn count_pages(&mut self) -> usize {
        self.document()
            .map(|document| usize::try_from(document.pages().len()).unwrap_or_default())
            .unwrap_or(0)
    }

    fn goto_page(&mut self, index: usize) {
        self.current = index;
    }

    fn page_width(&mut self) -> f32 {
        logged("page width", self.current_size().map(|(width, _)| width))
    }

    fn page_height(&mut self) -> f32 {
        logged("page height", self.current_size().map(|(_, height)| height))
    }

    fn draw_page(&mut self, target: &mut Bitmap, raster: PageRaster, patch: Patch) {
        let page = self.current;
        let result = self.render_into(target, page, raster, patch, false);
        logged("draw page", result)
    }

    fn update_page(&mut self, target: &mut Bitmap, page: usize, raster: PageRaster, patch: Patch) {
        let result = self.render_into(target, page, raster, patch, true);
        logged("update page", result)
    }

    fn search(&mut self, text: &str) -> Option<Vec<Rect>> {
        logged("search", self.search_current(text))
    }

    fn text(&mut self) -> Vec<TextBlock> {
        logged("text extraction", self.extract_text())
    }

    fn html(&mut self) -> Option<Vec<u8>> {
        logged(
            "html export",
            self.extract_text().map(|blocks| Some(blocks_to_html(&blocks))),
        )
    }

    fn add_markup_annotation(&mut self, quad_points: &[Point], kind: AnnotationKind) {
        let result = self.add_markup(quad_points, kind);
        logged("markup annotation", result)
    }

    fn add_ink_annotation(&mut self, arcs: &[Vec<Point>]) {
        let result = self.add_ink(arcs);
        logged("ink annotation", result)
    }

    fn delete_annotation(&mut self, index: usize) {
        let result = self.delete_annotation_at(index);
        logged("annotation deletion", result)
    }

    fn pass_click(&mut self, _page: usize, _x: f32, _y: f32) -> bool {
        unsupported("form interaction");
        false
    }

    fn focused_widget_kind(&mut self) -> WidgetKind {
        WidgetKind::None
    }

    fn focused_widget_text(&mut self) -> String {
        String::new()
    }

    fn set_focused_widget_text(&mut self, _text: &str) -> bool {
        unsupported("form interaction");
        false
    }

    fn focused_widget_choice_options(&mut self) -> Vec<String> {
        Vec::new()
    }

    fn focused_widget_choice_selected(&mut self) -> Vec<String> {
        Vec::new()
    }

    fn set_focused_widget_choice_selected(&mut self, _selected: &[String]) {
        unsupported("form interaction");
    }

    fn focused_widget_signature_state(&mut self) -> SignatureState {
        SignatureState::NoSupport
    }

    fn check_focused_signature(&mut self) -> Option<String> {
        None
    }

    fn sign_focused_signature(&mut self, _key_file: &Path, _password: &str) -> bool {
        unsupported("signing");
        false
    }

    #[instrument(skip(self))]
    fn page_links(&mut self, page: usize) -> Option<Vec<LinkInfo>> {
        logged("links", self.links_on(page))
    }

    fn widget_areas(&mut self, page: usize) -> Vec<Rect> {
        let annotations = logged("widget areas", self.annotations_on(page));
        annotations
            .into_iter()
            .filter(|annotation| annotation.kind == AnnotationKind::Widget)
            .map(|annotation| annotation.rect)
            .collect()
    }

    fn annotations(&mut self, page: usize) -> Vec<Annotation> {
        logged("annotations", self.annotations_on(page))
    }

    fn outline(&mut self) -> Option<Vec<OutlineItem>> {
        logged("outline", self.outline_items())
    }

    fn has_outline(&mut self) -> bool {
        self.document()
            .map(|document| document.bookmarks().root().is_some())
            .unwrap_or(false)
    }

    fn needs_password(&mut self) -> bool {
        self.locked
    }

    fn authenticate_password(&mut self, password: &str) -> bool {
        match self.load(Some(password)) {
            Ok(()) => {
                self.locked = false;
                true
            }
            Err(err) => {
                debug!(?err, "password rejected");
                false
            }
        }
    }

    fn has_changes(&mut self) -> bool {
        self.changed
    }

    fn save_as(&mut self, path: Option<&Path>) -> bool {
        match self.save_to(path) {
            Ok(()) => true,
            Err(err) => {
                warn!(?err, "save failed");
                false
            }
        }
    }

    fn insert_blank_page_before(&mut self, index: usize) -> bool {
        match self.insert_blank(index) {
            Ok(()) => true,
            Err(err) => {
                warn!(?err, "insert failed");
                false
            }
        }
    }

    fn set_ink_thickness(&mut self, radius: f32) {
        self.style.ink_thickness = radius * 2.0;
    }

    fn set_ink_color(&mut self, color: Rgb) {
        self.style.ink_color = color;
    }

    fn set_highlight_color(&mut self, color: Rgb) {
        self.style.highlight_color = color;
    }

    fn set_underline_color(&mut self, color: Rgb) {
        self.style.underline_color = color;
    }

    fn set_strikeout_color(&mut self, color: Rgb) {
        self.style.strikeout_color = color;
        debug!(style = ?self.style, "annotation style updated");
    }

    fn release(&mut self) {
        self.render_cache = None;
        self.document = None;
    }
}

fn logged<T: Default>(operation: &'static str, result: Result<T>) -> T {
    result.unwrap_or_else(|err| {
        warn!(?err, operation, "pdfium operation failed");
        T::default()
    })
}

fn unsupported(operation: &'static str) {
    warn!(operation, "not supported by the pdfium engine");
}

fn end_line(block: &mut TextBlock, span: &mut TextSpan) {
    if !span.chars.is_empty() {
        block.lines.push(TextLine {
            spans: vec![mem::take(span)],
        });
    }
}

/// Pdfium reports rectangles with a bottom-left origin.
fn flip_rect(rect: &PdfRect, page_height: f32) -> Rect {
    Rect::new(
        rect.left().value,
        page_height - rect.top().value,
        rect.right().value,
        page_height - rect.bottom().value,
    )
}

fn link_target(link: &PdfLink<'_>) -> Option<LinkTarget> {
    let action = link.action();
    let uri = action
        .as_ref()
        .and_then(|action| action.as_uri_action())
        .and_then(|uri_action| uri_action.uri().ok())
        .filter(|uri| !uri.is_empty());
    if let Some(uri) = uri {
        return Some(LinkTarget::External { uri });
    }

    let destination = action
        .as_ref()
        .and_then(|action| action.as_local_destination_action())
        .and_then(|local| local.destination().ok())
        .or_else(|| link.destination())?;
    let page = destination.page_index().ok()? as usize;
    let target = destination
        .view_settings()
        .ok()
        .map(|view| view_target(&view))
        .unwrap_or_default();
    Some(LinkTarget::Internal { page, target })
}

/// Destination point in the target page's native (bottom-left) space, as a
/// zero-size rectangle. Views without an explicit point land on the origin.
fn view_target(view: &PdfDestinationViewSettings) -> Rect {
    match view {
        PdfDestinationViewSettings::SpecificCoordinatesAndZoom(x, y, _) => {
            let left = x.map_or(0.0, |x| x.value);
            let top = y.map_or(0.0, |y| y.value);
            Rect::new(left, top, left, top)
        }
        _ => Rect::default(),
    }
}

/// Flattens the bookmark tree in reading order; `level` is the nesting depth.
/// Bookmarks without a resolvable page are skipped but their children are not.
fn collect_outline(root: PdfBookmark<'_>) -> Vec<OutlineItem> {
    let mut items = Vec::new();
    let mut pending = vec![(root, 0usize)];
    while let Some((bookmark, level)) = pending.pop() {
        if let Some(sibling) = bookmark.next_sibling() {
            pending.push((sibling, level));
        }
        if let Some(child) = bookmark.first_child() {
            pending.push((child, level + 1));
        }
        let page = bookmark
            .destination()
            .and_then(|destination| destination.page_index().ok());
        if let (Some(title), Some(page)) = (bookmark.title(), page) {
            items.push(OutlineItem {
                level,
                title,
                page: page as usize,
            });
        }
    }
    items
}

fn to_pdf_space(point: Point, page_height: f32) -> (f32, f32) {
    (point.x, page_height - point.y)
}

fn quad(corners: &[Point], page_height: f32) -> PdfQuadPoints {
    let [a, b, c, d] = [corners[0], corners[1], corners[2], corners[3]]
        .map(|corner| to_pdf_space(corner, page_height));
    PdfQuadPoints::new(
        PdfPoints::new(a.0),
        PdfPoints::new(a.1),
        PdfPoints::new(b.0),
        PdfPoints::new(b.1),
        PdfPoints::new(c.0),
        PdfPoints::new(c.1),
        PdfPoints::new(d.0),
        PdfPoints::new(d.1),
    )
}

fn pdf_color(color: Rgb) -> PdfColor {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    PdfColor::new(channel(color.r), channel(color.g), channel(color.b), 255)
}

fn annotation_kind(kind: PdfPageAnnotationType) -> AnnotationKind {
    match kind {
        PdfPageAnnotationType::Text => AnnotationKind::Text,
        PdfPageAnnotationType::Link => AnnotationKind::Link,
        PdfPageAnnotationType::FreeText => AnnotationKind::FreeText,
        PdfPageAnnotationType::Line => AnnotationKind::Line,
        PdfPageAnnotationType::Square => AnnotationKind::Square,
        PdfPageAnnotationType::Circle => AnnotationKind::Circle,
        PdfPageAnnotationType::Polygon => AnnotationKind::Polygon,
        PdfPageAnnotationType::Polyline => AnnotationKind::PolyLine,
        PdfPageAnnotationType::Highlight => AnnotationKind::Highlight,
        PdfPageAnnotationType::Underline => AnnotationKind::Underline,
        PdfPageAnnotationType::Squiggly => AnnotationKind::Squiggly,
        PdfPageAnnotationType::Strikeout => AnnotationKind::StrikeOut,
        PdfPageAnnotationType::Stamp => AnnotationKind::Stamp,
        PdfPageAnnotationType::Caret => AnnotationKind::Caret,
        PdfPageAnnotationType::Ink => AnnotationKind::Ink,
        PdfPageAnnotationType::Popup => AnnotationKind::Popup,
        PdfPageAnnotationType::FileAttachment => AnnotationKind::FileAttachment,
        PdfPageAnnotationType::Sound => AnnotationKind::Sound,
        PdfPageAnnotationType::Movie => AnnotationKind::Movie,
        PdfPageAnnotationType::Widget | PdfPageAnnotationType::XfaWidget => {
            AnnotationKind::Widget
        }
        PdfPageAnnotationType::Screen => AnnotationKind::Screen,
        PdfPageAnnotationType::PrinterMark => AnnotationKind::PrinterMark,
        PdfPageAnnotationType::TrapNet => AnnotationKind::TrapNet,
        PdfPageAnnotationType::Watermark => AnnotationKind::Watermark,
        PdfPageAnnotationType::ThreeD => AnnotationKind::ThreeD,
        _ => AnnotationKind::Unknown,
    }
}

fn bind_pdfium_from_env() -> Option<Pdfium> {
    let path = std::env::var_os(LIBRARY_PATH_VAR).filter(|path| !path.is_empty())?;
    let path = PathBuf::from(path);
    match Pdfium::bind_to_library(&path) {
        Ok(bindings) => Some(Pdfium::new(bindings)),
        Err(err) => {
            warn!(
                "failed to load Pdfium from {} {}: {}",
                LIBRARY_PATH_VAR,
                path.display(),
                err
            );
            None
        }
    }
}

/// Looks beside the executable, then in the working directory, then asks the
/// system loader.
fn bind_pdfium_default() -> Result<Pdfium> {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(Pdfium::pdfium_platform_library_name_at_path(&dir));
    }
    candidates.push(Pdfium::pdfium_platform_library_name_at_path("./"));

    let mut failures = Vec::new();
    for path in &candidates {
        match Pdfium::bind_to_library(path) {
            Ok(bindings) => {
                debug!(path = %path.display(), "bound pdfium");
                return Ok(Pdfium::new(bindings));
            }
            Err(err) => failures.push(format!("{}: {}", path.display(), err)),
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|err| {
            failures.push(format!("system: {err}"));
            anyhow!(
                "failed to bind to a pdfium library; set {} or install it ({})",
                LIBRARY_PATH_VAR,
                failures.join(", ")
            )
        })
}
