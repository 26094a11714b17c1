use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Grows `self` to enclose `other`. Empty rectangles never contribute, and an
    /// empty `self` is replaced outright by a non-empty `other`.
    pub fn union(&mut self, other: &Rect) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        self.left = self.left.min(other.left);
        self.top = self.top.min(other.top);
        self.right = self.right.max(other.right);
        self.bottom = self.bottom.max(other.bottom);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Page dimensions in points, as reported by the engine for the current page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Pixel size the whole page is rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRaster {
    pub width: u32,
    pub height: u32,
}

/// Sub-rectangle of a [`PageRaster`] that a draw call fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Patch {
    pub fn full(raster: PageRaster) -> Self {
        Self {
            x: 0,
            y: 0,
            width: raster.width,
            height: raster.height,
        }
    }

    /// Splits `raster` into row-major tiles no larger than `tile` on either side.
    pub fn tiles(raster: PageRaster, tile: u32) -> Vec<Patch> {
        let tile = tile.max(1);
        let mut patches = Vec::new();
        let mut y = 0;
        while y < raster.height {
            let height = tile.min(raster.height - y);
            let mut x = 0;
            while x < raster.width {
                let width = tile.min(raster.width - x);
                patches.push(Patch {
                    x,
                    y,
                    width,
                    height,
                });
                x += width;
            }
            y += height;
        }
        patches
    }
}

/// Caller-owned RGBA8888 pixel buffer. The session only borrows it for the
/// duration of a single draw or update call.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextChar {
    pub c: char,
    pub rect: Rect,
}

impl TextChar {
    pub fn new(c: char, rect: Rect) -> Self {
        Self { c, rect }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub chars: Vec<TextChar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextWord {
    pub text: String,
    pub rect: Rect,
}

impl TextWord {
    pub fn push(&mut self, ch: &TextChar) {
        self.text.push(ch.c);
        self.rect.union(&ch.rect);
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkTarget {
    /// A page of the open document.
    Internal { page: usize, target: Rect },
    /// A URI handled outside the viewer.
    External { uri: String },
    /// A page of another document.
    Remote {
        file: String,
        page: Option<usize>,
        new_window: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub rect: Rect,
    pub target: LinkTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    Text,
    Link,
    FreeText,
    Line,
    Square,
    Circle,
    Polygon,
    PolyLine,
    Highlight,
    Underline,
    Squiggly,
    StrikeOut,
    Stamp,
    Caret,
    Ink,
    Popup,
    FileAttachment,
    Sound,
    Movie,
    Widget,
    Screen,
    PrinterMark,
    TrapNet,
    Watermark,
    ThreeD,
    Unknown,
}

impl AnnotationKind {
    pub fn is_text_markup(self) -> bool {
        matches!(
            self,
            AnnotationKind::Highlight
                | AnnotationKind::Underline
                | AnnotationKind::Squiggly
                | AnnotationKind::StrikeOut
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub rect: Rect,
    pub kind: AnnotationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineItem {
    pub level: usize,
    pub title: String,
    pub page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WidgetKind {
    #[default]
    None,
    PushButton,
    CheckBox,
    RadioButton,
    Text,
    ListBox,
    ComboBox,
    Signature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureState {
    NoSupport,
    Unsigned,
    SignedValid,
    SignedInvalid,
}

/// Outcome of passing a click to the engine, shaped by the widget that ends up
/// focused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum ClickResult {
    Plain {
        changed: bool,
    },
    Text {
        changed: bool,
        text: String,
    },
    Choice {
        changed: bool,
        options: Vec<String>,
        selected: Vec<String>,
    },
    Signature {
        changed: bool,
        state: SignatureState,
    },
}

impl ClickResult {
    /// Whether the click mutated document state.
    pub fn changed(&self) -> bool {
        match self {
            ClickResult::Plain { changed }
            | ClickResult::Text { changed, .. }
            | ClickResult::Choice { changed, .. }
            | ClickResult::Signature { changed, .. } => *changed,
        }
    }
}

/// Linear RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}
