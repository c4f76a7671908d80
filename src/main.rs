mod canvas;
mod dialog;
mod error;
mod painter;
mod render;
mod settings;
mod toolbar;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use log::LevelFilter;
use pixels::{Pixels, SurfaceTexture};
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorIcon, Window, WindowId};

use canvas::Point;
use painter::{Mode, Painter, Session};
use render::SceneCache;
use settings::Settings;
use toolbar::{Action, Slider, Toolbar, BAND};

const LOG_FILE: &str = "spraypaint.log";
const SAVED_MESSAGE: &str = "IMAGE SAVED";

/// Spray paint over a PNG or JPEG image and export the result as PNG
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Background image to open (*.jpg, *.jpeg, *.png)
    image: Option<PathBuf>,

    /// File name the save dialog suggests
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file
    #[arg(short, long, default_value = settings::DEFAULT_SETTINGS_PATH)]
    config: PathBuf,

    /// Keep the background for the next session
    #[arg(long)]
    keep_background: bool,
}

/// Which control a held primary button is driving
#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    None,
    Stroke,
    Slider(Slider),
}

struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    painter: Painter,
    toolbar: Toolbar,
    scene: SceneCache,
    settings: Settings,
    settings_path: PathBuf,
    // suggested in the save dialog, updated after each export
    export_path: PathBuf,
    // the open dialog starts next to this one
    image_path: Option<PathBuf>,
    drag: Drag,
    cursor_pos: (f64, f64),
    render_width: u32,
    render_height: u32,
    saved_message_until: Option<Instant>,
}

impl App {
    fn new(cli: Cli, settings: Settings, settings_path: PathBuf) -> Self {
        let mut painter = Painter::new(Session::default());
        painter.set_color(settings.color);
        painter.set_thickness(settings.thickness);
        painter.set_keep_background(settings.keep_background || cli.keep_background);

        let image_path = cli.image.or_else(|| {
            if settings.keep_background {
                settings.last_image.clone()
            } else {
                None
            }
        });
        let export_path = dialog::resolve_export_path(cli.output.as_deref().or(settings.export_path.as_deref()));

        App {
            window: None,
            pixels: None,
            painter,
            toolbar: Toolbar::new(),
            scene: SceneCache::new(),
            render_width: settings.window_width,
            render_height: settings.window_height,
            settings,
            settings_path,
            export_path,
            image_path,
            drag: Drag::None,
            cursor_pos: (0.0, 0.0),
            saved_message_until: None,
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn update_cursor(&self) {
        if let Some(window) = &self.window {
            let icon = match self.painter.session().mode {
                Mode::Draw => CursorIcon::Crosshair,
                Mode::Erase => CursorIcon::Text,
            };
            window.set_cursor(icon);
        }
    }

    fn resize_canvas(&mut self, width: u32, height: u32) {
        self.render_width = width;
        self.render_height = height;
        self.painter.set_extent(width.saturating_sub(BAND), height.saturating_sub(BAND));
    }

    fn load(&mut self, path: &Path) {
        if !dialog::is_supported_image(path) {
            log::error!("{} is not one of {}", path.display(), dialog::filter_description());
            return;
        }
        match self.painter.load_image(path) {
            Ok(()) => self.image_path = Some(path.to_path_buf()),
            Err(e) => log::error!("{}", e),
        }
    }

    fn open(&mut self) {
        match dialog::pick_image(self.image_path.as_deref()) {
            Some(path) => self.load(&path),
            None => log::info!("Open cancelled"),
        }
    }

    fn save(&mut self) {
        let Some(path) = dialog::pick_export(&self.export_path) else {
            log::info!("Save cancelled");
            return;
        };
        log::info!("Saving {} dots to {}", self.painter.canvas().len(), path.display());
        match self.painter.export(&path) {
            Ok(()) => {
                self.export_path = path;
                self.saved_message_until = Some(Instant::now() + Duration::from_millis(1500));
            }
            Err(e) => log::error!("{}", e),
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Load => self.open(),
            Action::Draw => self.painter.set_mode(Mode::Draw),
            Action::Erase => self.painter.set_mode(Mode::Erase),
            Action::Save => self.save(),
            Action::ToggleKeep => {
                let keep = !self.painter.session().keep_background;
                self.painter.set_keep_background(keep);
            }
            Action::Thickness(value) => self.painter.set_thickness(value),
            Action::Color(color) => self.painter.set_color(color),
        }
        self.update_cursor();
    }

    /// Release the background unless kept and write settings back
    fn shutdown(&mut self) {
        self.painter.teardown();

        let session = self.painter.session();
        self.settings.keep_background = session.keep_background;
        self.settings.color = session.color;
        self.settings.thickness = session.thickness;
        self.settings.last_image = self.painter.background().map(|bg| bg.path.clone());
        self.settings.export_path = Some(self.export_path.clone());
        self.settings.window_width = self.render_width;
        self.settings.window_height = self.render_height;
        if let Err(e) = self.settings.save(&self.settings_path) {
            log::error!("Cannot save settings to {}: {}", self.settings_path.display(), e);
        }
        log::info!("Application end");
    }

    fn redraw(&mut self) {
        let show_saved = match self.saved_message_until {
            Some(until) if Instant::now() < until => true,
            Some(_) => {
                self.saved_message_until = None;
                false
            }
            None => false,
        };

        let Some(pixels) = &mut self.pixels else {
            return;
        };
        let (width, height) = (self.render_width, self.render_height);
        let frame = pixels.frame_mut();
        if frame.len() != (width * height * 4) as usize {
            return;
        }

        self.toolbar.render(frame, width, height, &self.painter);
        let scene = self.scene.scene(&self.painter);
        render::blit(frame, width, height, scene, BAND, BAND);
        if show_saved {
            self.toolbar.render_banner(frame, width, height, SAVED_MESSAGE);
        }

        if let Err(e) = pixels.render() {
            log::error!("Render error: {}", e);
        }

        // keep redrawing until the banner expires
        if show_saved {
            self.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.pixels.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title("SprayPaint")
            .with_inner_size(winit::dpi::PhysicalSize::new(self.render_width, self.render_height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = match Pixels::new(size.width, size.height, surface_texture) {
            Ok(pixels) => pixels,
            Err(e) => {
                log::error!("Failed to create pixel surface: {}", e);
                event_loop.exit();
                return;
            }
        };

        self.window = Some(window);
        self.pixels = Some(pixels);
        self.resize_canvas(size.width, size.height);
        self.update_cursor();

        if let Some(path) = self.image_path.clone() {
            self.load(&path);
        }
        self.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width == 0 || new_size.height == 0 {
                    return;
                }
                if let Some(pixels) = &mut self.pixels {
                    if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                        log::error!("Failed to resize surface: {}", e);
                    }
                    if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                        log::error!("Failed to resize buffer: {}", e);
                    }
                }
                self.resize_canvas(new_size.width, new_size.height);
                self.request_redraw();
            }

            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => match state {
                ElementState::Pressed => {
                    let (x, y) = self.cursor_pos;
                    if Toolbar::in_canvas(x, y) {
                        self.drag = Drag::Stroke;
                        self.painter.begin_stroke(Point::new(x, y));
                    } else if let Some(action) = self.toolbar.hit_test(x, y, self.painter.session().color) {
                        if let Some(slider) = Toolbar::slider_at(x, y) {
                            self.drag = Drag::Slider(slider);
                        }
                        self.apply(action);
                    }
                    self.request_redraw();
                }
                ElementState::Released => {
                    self.drag = Drag::None;
                    self.painter.end_stroke();
                }
            },

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_pos = (position.x, position.y);
                match self.drag {
                    Drag::Stroke if self.painter.is_stroking() => {
                        self.painter.continue_stroke(Point::new(position.x, position.y));
                        self.request_redraw();
                    }
                    Drag::Slider(slider) => {
                        let action = toolbar::slider_action(slider, position.x, self.painter.session().color);
                        self.apply(action);
                        self.request_redraw();
                    }
                    Drag::Stroke => {}
                    Drag::None => {}
                }
            }

            WindowEvent::DroppedFile(path) => {
                self.load(&path);
                self.request_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    let action = match keycode {
                        KeyCode::Escape => {
                            self.shutdown();
                            event_loop.exit();
                            return;
                        }
                        KeyCode::KeyL => Action::Load,
                        KeyCode::KeyD => Action::Draw,
                        KeyCode::KeyE => Action::Erase,
                        KeyCode::KeyS => Action::Save,
                        KeyCode::KeyK => Action::ToggleKeep,
                        KeyCode::Equal | KeyCode::NumpadAdd => {
                            Action::Thickness((self.painter.session().thickness + 1.0).min(painter::MAX_THICKNESS))
                        }
                        KeyCode::Minus | KeyCode::NumpadSubtract => {
                            Action::Thickness(self.painter.session().thickness - 1.0)
                        }
                        _ => return,
                    };
                    self.apply(action);
                    self.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => self.redraw(),

            _ => {}
        }
    }
}

fn init_logging() {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    match File::create(LOG_FILE) {
        Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Info, Config::default(), file)),
        Err(e) => eprintln!("Cannot open {}: {}", LOG_FILE, e),
    }
    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Logger already initialised: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();
    log::info!("Application start");

    let settings = match Settings::load(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Cannot read {}: {}; using defaults", cli.config.display(), e);
            Settings::default()
        }
    };
    let settings_path = cli.config.clone();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Cannot create event loop: {}", e);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(cli, settings, settings_path);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}
