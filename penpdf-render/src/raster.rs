use penpdf_core::{Bitmap, PageRaster, Patch};
use rayon::prelude::*;

/// A whole page rendered at one raster size, RGBA8888.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page: usize,
    pub raster: PageRaster,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RenderedPage {
    pub fn matches(&self, page: usize, raster: PageRaster) -> bool {
        self.page == page && self.raster == raster
    }
}

/// Copies `patch` of `source` into the top-left corner of `target`. Rows and
/// columns falling outside either buffer are skipped.
pub fn copy_patch(source: &RenderedPage, target: &mut Bitmap, patch: Patch) {
    let dst_stride = target.stride();
    if dst_stride == 0 || patch.x >= source.width {
        return;
    }
    let src_stride = source.width as usize * 4;
    let columns = patch
        .width
        .min(target.width)
        .min(source.width - patch.x) as usize;
    let rows = patch.height.min(target.height) as usize;
    let x_offset = patch.x as usize * 4;

    target
        .pixels
        .par_chunks_exact_mut(dst_stride)
        .take(rows)
        .enumerate()
        .for_each(|(row, dst)| {
            let y = patch.y as usize + row;
            if y >= source.height as usize {
                return;
            }
            let start = y * src_stride + x_offset;
            dst[..columns * 4].copy_from_slice(&source.pixels[start..start + columns * 4]);
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RenderedPage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        RenderedPage {
            page: 0,
            raster: PageRaster { width, height },
            width,
            height,
            pixels,
        }
    }

    #[test]
    fn copies_requested_region() {
        let source = gradient(8, 8);
        let mut target = Bitmap::new(3, 2);
        copy_patch(
            &source,
            &mut target,
            Patch {
                x: 4,
                y: 5,
                width: 3,
                height: 2,
            },
        );
        assert_eq!(&target.pixels[..4], &[4, 5, 0, 255]);
        let last = target.pixels.len() - 4;
        assert_eq!(&target.pixels[last..], &[6, 6, 0, 255]);
    }

    #[test]
    fn clips_patch_hanging_off_the_page() {
        let source = gradient(4, 4);
        let mut target = Bitmap::new(4, 4);
        copy_patch(
            &source,
            &mut target,
            Patch {
                x: 2,
                y: 2,
                width: 4,
                height: 4,
            },
        );
        assert_eq!(&target.pixels[..8], &[2, 2, 0, 255, 3, 2, 0, 255]);
        assert_eq!(&target.pixels[8..16], &[0; 8]);
        assert!(target.pixels[2 * 16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn cache_entry_matches_page_and_raster() {
        let page = gradient(2, 2);
        assert!(page.matches(0, PageRaster { width: 2, height: 2 }));
        assert!(!page.matches(1, PageRaster { width: 2, height: 2 }));
        assert!(!page.matches(0, PageRaster { width: 4, height: 2 }));
    }
}
