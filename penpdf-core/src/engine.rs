use std::path::Path;
use std::sync::Arc;

use crate::alerts::AlertBridge;
use crate::types::{
    Annotation, AnnotationKind, Bitmap, LinkInfo, OutlineItem, PageRaster, Patch, Point, Rect,
    Rgb, SignatureState, TextBlock, WidgetKind,
};

/// Opens documents and hands back an engine positioned nowhere in particular.
///
/// `None` means the engine could not make sense of the source; adapters log the
/// underlying cause themselves.
pub trait EngineProvider: Send + Sync {
    fn open_path(&self, path: &Path) -> Option<Box<dyn Engine>>;
    fn open_buffer(&self, data: Vec<u8>, name: &str) -> Option<Box<dyn Engine>>;
}

/// The native rendering engine behind a [`crate::Session`].
///
/// Engines keep a single page cursor. Methods documented as acting on the
/// current page rely on a preceding [`Engine::goto_page`]; the session takes
/// care of that ordering and never calls into an engine from two threads at
/// once.
pub trait Engine: Send {
    fn format(&mut self) -> String;
    fn count_pages(&mut self) -> usize;

    /// Moves the cursor. `index` is always within `0..count_pages()`.
    fn goto_page(&mut self, index: usize);
    fn page_width(&mut self) -> f32;
    fn page_height(&mut self) -> f32;

    /// Renders the current page scaled to `raster`, writing only `patch` into
    /// `target` (which is `patch.width` x `patch.height`).
    fn draw_page(&mut self, target: &mut Bitmap, raster: PageRaster, patch: Patch);
    /// Refreshes `patch` of `page` in place without moving the cursor.
    fn update_page(&mut self, target: &mut Bitmap, page: usize, raster: PageRaster, patch: Patch);

    /// Current page. `None` when the engine has no result to report.
    fn search(&mut self, text: &str) -> Option<Vec<Rect>>;
    /// Current page.
    fn text(&mut self) -> Vec<TextBlock>;
    /// Current page.
    fn html(&mut self) -> Option<Vec<u8>>;

    /// Current page.
    fn add_markup_annotation(&mut self, quad_points: &[Point], kind: AnnotationKind);
    /// Current page.
    fn add_ink_annotation(&mut self, arcs: &[Vec<Point>]);
    /// Current page.
    fn delete_annotation(&mut self, index: usize);

    /// Returns whether the click changed the document.
    fn pass_click(&mut self, page: usize, x: f32, y: f32) -> bool;
    fn focused_widget_kind(&mut self) -> WidgetKind;
    fn focused_widget_text(&mut self) -> String;
    /// Current page.
    fn set_focused_widget_text(&mut self, text: &str) -> bool;
    fn focused_widget_choice_options(&mut self) -> Vec<String>;
    fn focused_widget_choice_selected(&mut self) -> Vec<String>;
    fn set_focused_widget_choice_selected(&mut self, selected: &[String]);
    fn focused_widget_signature_state(&mut self) -> SignatureState;
    fn check_focused_signature(&mut self) -> Option<String>;
    fn sign_focused_signature(&mut self, key_file: &Path, password: &str) -> bool;

    fn page_links(&mut self, page: usize) -> Option<Vec<LinkInfo>>;
    fn widget_areas(&mut self, page: usize) -> Vec<Rect>;
    fn annotations(&mut self, page: usize) -> Vec<Annotation>;
    fn outline(&mut self) -> Option<Vec<OutlineItem>>;
    fn has_outline(&mut self) -> bool;

    fn needs_password(&mut self) -> bool;
    fn authenticate_password(&mut self, password: &str) -> bool;

    fn has_changes(&mut self) -> bool;
    /// `None` saves over the source.
    fn save_as(&mut self, path: Option<&Path>) -> bool;
    fn insert_blank_page_before(&mut self, index: usize) -> bool;

    fn set_ink_thickness(&mut self, thickness: f32);
    fn set_ink_color(&mut self, color: Rgb);
    fn set_highlight_color(&mut self, color: Rgb);
    fn set_underline_color(&mut self, color: Rgb);
    fn set_strikeout_color(&mut self, color: Rgb);

    fn javascript_supported(&self) -> bool {
        false
    }

    /// Gives the engine the channel it raises document alerts through.
    fn attach_alerts(&mut self, _bridge: Arc<AlertBridge>) {}

    /// Releases every native resource. No other method is called afterwards.
    fn release(&mut self);
}
