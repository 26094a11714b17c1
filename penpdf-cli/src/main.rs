use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use image::{ImageFormat, RgbaImage};
use penpdf_core::{AnnotationStyle, Bitmap, PageRaster, Patch, Session};
use penpdf_render::PdfiumProvider;
use serde::Serialize;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    name = "penpdf",
    version,
    about = "Inspect and edit PDF documents from the command line"
)]
struct Args {
    /// Document to open
    file: PathBuf,

    /// Password for encrypted documents
    #[arg(long)]
    password: Option<String>,

    /// Annotation style file (defaults to style.toml in the config directory)
    #[arg(long)]
    style: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Page count, format and capabilities
    Info,
    /// Page size in points
    Size { page: i32 },
    /// Words on a page, grouped by line
    Words { page: i32 },
    /// Page text as an HTML fragment
    Html { page: i32 },
    /// Rectangles of every hit of TEXT on a page
    Search { page: i32, text: String },
    /// Link hot spots on a page
    Links { page: i32 },
    /// Document outline
    Outline,
    /// Annotations on a page
    Annotations { page: i32 },
    /// Form widget areas on a page
    Widgets { page: i32 },
    /// Render a page to a PNG file, tile by tile
    Render {
        page: i32,
        #[arg(short, long)]
        output: PathBuf,
        /// Pixels per point
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
        /// Tile edge in pixels
        #[arg(long, default_value_t = 256)]
        tile: u32,
    },
    /// Insert a blank page and write the result to OUTPUT
    InsertBlank {
        output: PathBuf,
        /// Insert before this page instead of appending
        #[arg(long)]
        before: Option<usize>,
    },
    /// Write the document to OUTPUT
    SaveAs { output: PathBuf },
}

#[derive(Debug, Serialize)]
struct Info<'a> {
    id: String,
    file_name: &'a str,
    format: &'a str,
    pages: usize,
    needs_password: bool,
    has_outline: bool,
    has_changes: bool,
    javascript: bool,
}

#[derive(Debug, Serialize)]
struct EditReport {
    changed: bool,
    saved: bool,
    pages: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let project_dirs = ProjectDirs::from("net", "penpdf", "penpdf")
        .ok_or_else(|| anyhow!("unable to resolve platform data directories"))?;
    let _log_guard = init_logging(&project_dirs)?;

    let style = load_style(args.style.as_deref())?;
    let provider = PdfiumProvider::new()?;
    let session = Session::open_path(&provider, &args.file)
        .with_context(|| format!("failed to open {:?}", args.file))?;
    let session = Arc::new(session);

    if let Some(password) = &args.password {
        if !session.authenticate_password(password)? {
            return Err(anyhow!("password rejected for {:?}", args.file));
        }
    }
    session.apply_style(&style)?;

    let result = run(Arc::clone(&session), args.command).await;
    session.close();
    result
}

async fn run(session: Arc<Session>, command: Command) -> Result<()> {
    match command {
        Command::Info => {
            let id = session.id().to_string();
            print_json(&Info {
                id,
                file_name: session.file_name(),
                format: session.format(),
                pages: session.page_count()?,
                needs_password: session.needs_password()?,
                has_outline: session.has_outline()?,
                has_changes: session.has_changes()?,
                javascript: session.javascript_supported()?,
            })
        }
        Command::Size { page } => print_json(&session.page_size(page)?),
        Command::Words { page } => print_json(&session.text_lines(page)?),
        Command::Html { page } => {
            let html = session
                .html(page)?
                .ok_or_else(|| anyhow!("no HTML available for page {page}"))?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&html)?;
            stdout.flush()?;
            Ok(())
        }
        Command::Search { page, text } => print_json(&session.search(page, &text)?),
        Command::Links { page } => print_json(&session.page_links(page)?),
        Command::Outline => print_json(&session.outline()?),
        Command::Annotations { page } => print_json(&session.annotations(page)?),
        Command::Widgets { page } => print_json(&session.widget_areas(page)?),
        Command::Render {
            page,
            output,
            scale,
            tile,
        } => render_to_png(session, page, scale, tile, &output).await,
        Command::InsertBlank { output, before } => {
            let changed = match before {
                Some(index) => session.insert_blank_page_before(index)?,
                None => session.insert_blank_page_at_end()?,
            };
            let saved = session.save_as(&output)?;
            print_json(&EditReport {
                changed,
                saved,
                pages: session.page_count()?,
            })
        }
        Command::SaveAs { output } => {
            let saved = session.save_as(&output)?;
            print_json(&EditReport {
                changed: false,
                saved,
                pages: session.page_count()?,
            })
        }
    }
}

/// Renders every tile on the blocking pool. The session serializes the
/// draws; tiles are stitched back together in order.
async fn render_to_png(
    session: Arc<Session>,
    page: i32,
    scale: f32,
    tile: u32,
    output: &Path,
) -> Result<()> {
    let size = session.page_size(page)?;
    let raster = PageRaster {
        width: (size.width * scale).round().max(1.0) as u32,
        height: (size.height * scale).round().max(1.0) as u32,
    };

    let mut tasks = Vec::new();
    for patch in Patch::tiles(raster, tile) {
        let session = Arc::clone(&session);
        tasks.push(tokio::task::spawn_blocking(move || -> Result<(Patch, Bitmap)> {
            let mut bitmap = Bitmap::new(patch.width, patch.height);
            session.draw_page(&mut bitmap, page, raster, patch)?;
            Ok((patch, bitmap))
        }));
    }

    let mut canvas = RgbaImage::new(raster.width, raster.height);
    for task in tasks {
        let (patch, bitmap) = task.await.context("render task panicked")??;
        let tile = RgbaImage::from_raw(bitmap.width, bitmap.height, bitmap.pixels)
            .ok_or_else(|| anyhow!("tile buffer does not match its size"))?;
        image::imageops::replace(&mut canvas, &tile, i64::from(patch.x), i64::from(patch.y));
    }

    canvas
        .save_with_format(output, ImageFormat::Png)
        .with_context(|| format!("failed to write {:?}", output))?;
    info!(
        page,
        width = raster.width,
        height = raster.height,
        "rendered {}",
        output.display()
    );
    Ok(())
}

fn load_style(explicit: Option<&Path>) -> Result<AnnotationStyle> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match AnnotationStyle::default_path() {
            Ok(path) => path,
            Err(err) => {
                warn!(?err, "using default annotation style");
                return Ok(AnnotationStyle::default());
            }
        },
    };
    AnnotationStyle::load(&path).with_context(|| format!("failed to load style {:?}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn init_logging(project_dirs: &ProjectDirs) -> Result<WorkerGuard> {
    let log_dir = project_dirs.data_local_dir().join("logs");
    fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, "penpdf.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}
