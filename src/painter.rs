//! The canvas painter: background image, dot list and session state.

use std::f64::consts::TAU;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;

use crate::canvas::{Canvas, Dot, Margin, Point, Rgb, DOT_OPACITY};
use crate::dialog;
use crate::error::{ExportError, ImageLoadError};
use crate::render;

/// Dots generated per spray sample
pub const SPRAY_DOTS: usize = 200;

/// Radius of the scatter around the pointer
pub const SPRAY_RADIUS: f64 = 15.0;

/// Window offset of the canvas surface. Pointer samples arrive in window
/// coordinates and the spray rectangle's origin is shifted back by this.
pub const CANVAS_ORIGIN: f64 = 45.0;

/// Largest value the thickness slider produces
pub const MAX_THICKNESS: f64 = 50.0;

/// What a pointer drag does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Draw,
    Erase,
}

/// Decoded background and where it came from
pub struct Background {
    pub path: PathBuf,
    pub image: RgbaImage,
}

/// User selections that shape the next stroke
#[derive(Debug, Clone)]
pub struct Session {
    pub color: Rgb,
    pub thickness: f64,
    pub mode: Mode,
    pub keep_background: bool,
    last_sample: Option<Point>,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            color: Rgb::BLACK,
            thickness: 1.0,
            mode: Mode::Draw,
            keep_background: false,
            last_sample: None,
        }
    }
}

pub struct Painter {
    background: Option<Background>,
    canvas: Canvas,
    session: Session,
    extent: (u32, u32),
    // bumped on every visible change so renderers can skip work
    revision: u64,
}

/// Decode a PNG or JPEG file into RGBA
pub fn decode_image(path: &Path) -> Result<RgbaImage, ImageLoadError> {
    if !dialog::is_supported_image(path) {
        return Err(ImageLoadError::Unsupported(path.to_path_buf()));
    }

    let io_err = |source| ImageLoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?;

    match reader.format() {
        Some(ImageFormat::Png) | Some(ImageFormat::Jpeg) => {}
        _ => return Err(ImageLoadError::Unsupported(path.to_path_buf())),
    }

    let img = reader.decode().map_err(|source| ImageLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

impl Painter {
    pub fn new(session: Session) -> Self {
        Painter {
            background: None,
            canvas: Canvas::new(),
            session,
            extent: (0, 0),
            revision: 0,
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Replace the background. On failure the previous one stays.
    pub fn load_image(&mut self, path: &Path) -> Result<(), ImageLoadError> {
        let image = decode_image(path)?;
        log::info!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
        self.background = Some(Background {
            path: path.to_path_buf(),
            image,
        });
        self.touch();
        Ok(())
    }

    pub fn begin_stroke(&mut self, point: Point) {
        self.session.last_sample = Some(point);
    }

    /// Apply the current mode to the segment from the previous sample to `point`
    pub fn continue_stroke(&mut self, point: Point) {
        let anchor = self.session.last_sample.unwrap_or(point);
        match self.session.mode {
            Mode::Draw => self.spray(anchor, point),
            Mode::Erase => {
                self.erase(anchor, point);
            }
        }
        self.session.last_sample = Some(point);
    }

    pub fn end_stroke(&mut self) {
        self.session.last_sample = None;
    }

    pub fn is_stroking(&self) -> bool {
        self.session.last_sample.is_some()
    }

    /// Scatter `SPRAY_DOTS` dots using a freshly seeded generator
    pub fn spray(&mut self, anchor: Point, target: Point) {
        let mut rng = StdRng::from_entropy();
        self.spray_with(&mut rng, anchor, target);
    }

    pub fn spray_with<R: Rng>(&mut self, rng: &mut R, anchor: Point, target: Point) {
        let color = self.session.color;
        let diameter = self.session.thickness;

        for _ in 0..SPRAY_DOTS {
            let theta = rng.gen_range(0.0..TAU);
            let r = rng.gen_range(0.0..SPRAY_RADIUS);
            let (ox, oy) = (theta.cos() * r, theta.sin() * r);

            self.canvas.push(Dot {
                margin: Margin::new(
                    anchor.x + ox - CANVAS_ORIGIN,
                    anchor.y + oy - CANVAS_ORIGIN,
                    target.x + ox,
                    target.y + oy,
                ),
                diameter,
                color,
                opacity: DOT_OPACITY,
            });
        }
        self.touch();
    }

    /// Remove every dot overlapping the probe spanned by `anchor`..`target`.
    /// The probe keeps the raw corners, unlike a spray margin.
    /// Returns the number of dots removed.
    pub fn erase(&mut self, anchor: Point, target: Point) -> usize {
        if self.canvas.is_empty() {
            return 0;
        }
        let probe = Margin::new(anchor.x, anchor.y, target.x, target.y);
        let removed = self.canvas.remove_overlapping(&probe);
        if removed > 0 {
            self.touch();
        }
        removed
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.session.color = color;
    }

    pub fn set_thickness(&mut self, value: f64) {
        if value.is_finite() {
            self.session.thickness = value.max(0.0);
        } else {
            log::warn!("Ignoring thickness {}", value);
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.session.mode = mode;
    }

    pub fn set_keep_background(&mut self, keep: bool) {
        self.session.keep_background = keep;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Size of the canvas surface as currently shown
    pub fn set_extent(&mut self, width: u32, height: u32) {
        if self.extent != (width, height) {
            self.extent = (width, height);
            self.touch();
        }
    }

    pub fn extent(&self) -> (u32, u32) {
        self.extent
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Composite background and dots at the current extent
    pub fn render_scene(&self) -> RgbaImage {
        let (width, height) = self.extent;
        render::flatten(
            self.background.as_ref().map(|bg| &bg.image),
            self.canvas.dots(),
            width,
            height,
        )
    }

    pub fn flatten(&self) -> Result<RgbaImage, ExportError> {
        let (width, height) = self.extent;
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyCanvas(width, height));
        }
        Ok(self.render_scene())
    }

    /// Flatten and encode as PNG bytes
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        let scene = self.flatten()?;
        let mut bytes = Vec::new();
        scene.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Write the flattened scene to `path`. The PNG is encoded fully in
    /// memory and written through a temp file in the same directory, so a
    /// failure never leaves a partial file at `path`.
    pub fn export(&self, path: &Path) -> Result<(), ExportError> {
        let bytes = self.encode_png()?;

        let io_err = |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        log::info!("Exported {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Release the background unless the user asked to keep it
    pub fn teardown(&mut self) {
        if !self.session.keep_background && self.background.take().is_some() {
            self.touch();
        }
    }
}
