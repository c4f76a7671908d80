//! Software rasterizer: turns the background and the dot list into pixels.
//!
//! Both the window and the PNG export go through [`flatten`], so what is on
//! screen is exactly what gets saved.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use rayon::prelude::*;

use crate::canvas::Dot;
use crate::painter::Painter;

/// A dot resolved to pixel space
struct Disc {
    cx: f64,
    cy: f64,
    radius: f64,
    color: [f32; 3],
    alpha: f32,
}

impl Disc {
    fn from_dot(dot: &Dot) -> Option<Self> {
        let radius = dot.diameter / 2.0;
        if !(radius > 0.0) || dot.opacity <= 0.0 {
            return None;
        }
        let center = dot.center();
        Some(Disc {
            cx: center.x,
            cy: center.y,
            radius,
            color: [dot.color.0 as f32, dot.color.1 as f32, dot.color.2 as f32],
            alpha: dot.opacity.min(1.0),
        })
    }

    /// Column span covered on pixel row `y`, clipped to `width`
    fn span(&self, y: u32, width: u32) -> Option<(u32, u32)> {
        let dy = y as f64 + 0.5 - self.cy;
        let h2 = self.radius * self.radius - dy * dy;
        if h2 < 0.0 {
            return None;
        }
        let half = h2.sqrt();
        // pixel centers at x + 0.5 inside [cx - half, cx + half]
        let first = (self.cx - half - 0.5).ceil().max(0.0);
        let last = (self.cx + half - 0.5).floor().min(width as f64 - 1.0);
        if first > last {
            return None;
        }
        Some((first as u32, last as u32))
    }
}

/// Straight-alpha source-over of one color onto an RGBA pixel
#[inline(always)]
fn blend_over(pixel: &mut [u8], color: [f32; 3], alpha: f32) {
    let dst_a = pixel[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let dst = pixel[c] as f32;
        let out = (color[c] * alpha + dst * dst_a * (1.0 - alpha)) / out_a;
        pixel[c] = out.round().clamp(0.0, 255.0) as u8;
    }
    pixel[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Scale `background` to fit `width`x`height` keeping its aspect ratio.
/// Returns the fitted image and the top-left corner it is centered at.
fn fit_background(background: &RgbaImage, width: u32, height: u32) -> Option<(RgbaImage, i64, i64)> {
    let (bw, bh) = background.dimensions();
    if bw == 0 || bh == 0 || width == 0 || height == 0 {
        return None;
    }
    let scale = (width as f64 / bw as f64).min(height as f64 / bh as f64);
    let fw = ((bw as f64 * scale).round() as u32).clamp(1, width);
    let fh = ((bh as f64 * scale).round() as u32).clamp(1, height);
    let fitted = if (fw, fh) == (bw, bh) {
        background.clone()
    } else {
        imageops::resize(background, fw, fh, FilterType::Triangle)
    };
    let x = ((width - fw) / 2) as i64;
    let y = ((height - fh) / 2) as i64;
    Some((fitted, x, y))
}

/// Composite background and dots, in z-order, into a `width`x`height` image.
/// Pixels not covered by the background stay fully transparent.
pub fn flatten(background: Option<&RgbaImage>, dots: &[Dot], width: u32, height: u32) -> RgbaImage {
    let mut scene = RgbaImage::new(width, height);
    if width == 0 || height == 0 {
        return scene;
    }

    if let Some((fitted, x, y)) = background.and_then(|bg| fit_background(bg, width, height)) {
        imageops::replace(&mut scene, &fitted, x, y);
    }

    let discs: Vec<Disc> = dots.iter().filter_map(Disc::from_dot).collect();
    if discs.is_empty() {
        return scene;
    }

    // Rows are independent; within a row dots are applied in list order
    let raw: &mut [u8] = &mut scene;
    raw.par_chunks_mut((width * 4) as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            for disc in &discs {
                if let Some((first, last)) = disc.span(y, width) {
                    for x in first..=last {
                        let offset = (x * 4) as usize;
                        blend_over(&mut row[offset..offset + 4], disc.color, disc.alpha);
                    }
                }
            }
        });

    scene
}

/// Copy `scene` onto an opaque window frame at (`origin_x`, `origin_y`)
pub fn blit(frame: &mut [u8], frame_width: u32, frame_height: u32, scene: &RgbaImage, origin_x: u32, origin_y: u32) {
    let (scene_width, scene_height) = scene.dimensions();
    if origin_x >= frame_width || origin_y >= frame_height {
        return;
    }
    let visible_width = scene_width.min(frame_width - origin_x);
    let visible_height = scene_height.min(frame_height - origin_y);
    let src: &[u8] = scene;

    frame
        .par_chunks_mut((frame_width * 4) as usize)
        .enumerate()
        .skip(origin_y as usize)
        .take(visible_height as usize)
        .for_each(|(screen_y, row)| {
            let scene_y = screen_y as u32 - origin_y;
            let row_start = (scene_y * scene_width * 4) as usize;
            for x in 0..visible_width {
                let src_offset = row_start + (x * 4) as usize;
                let dst_offset = ((origin_x + x) * 4) as usize;
                let alpha = src[src_offset + 3];

                if alpha == 0 {
                    continue;
                }

                if alpha == 255 {
                    row[dst_offset..dst_offset + 3].copy_from_slice(&src[src_offset..src_offset + 3]);
                } else {
                    let inv_alpha = 255 - alpha;
                    for c in 0..3 {
                        row[dst_offset + c] = ((src[src_offset + c] as u16 * alpha as u16
                            + row[dst_offset + c] as u16 * inv_alpha as u16)
                            / 255) as u8;
                    }
                }
                row[dst_offset + 3] = 255;
            }
        });
}

/// Last flattened scene, rebuilt only when the painter changed
pub struct SceneCache {
    image: RgbaImage,
    revision: Option<u64>,
}

impl SceneCache {
    pub fn new() -> Self {
        SceneCache {
            image: RgbaImage::new(0, 0),
            revision: None,
        }
    }

    pub fn scene(&mut self, painter: &Painter) -> &RgbaImage {
        let (width, height) = painter.extent();
        let stale = self.revision != Some(painter.revision()) || self.image.dimensions() != (width, height);
        if stale {
            self.image = painter.render_scene();
            self.revision = Some(painter.revision());
        }
        &self.image
    }
}
