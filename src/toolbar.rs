//! On-screen controls drawn straight into the frame buffer.
//!
//! Layout: a 45px band across the top holds the buttons, the thickness
//! slider and the red/green/blue sliders. A 45px column down the left
//! holds the color swatches. The canvas surface fills the rest, starting
//! at (45, 45).

use crate::canvas::Rgb;
use crate::painter::{Mode, Painter, CANVAS_ORIGIN, MAX_THICKNESS};

pub const BAND: u32 = CANVAS_ORIGIN as u32;

const WORKSPACE: [u8; 4] = [64, 64, 64, 255];
const PANEL: [u8; 4] = [32, 32, 32, 255];
const TEXT: [u8; 4] = [230, 230, 230, 255];
const ACTIVE: [u8; 4] = [40, 120, 200, 255];
const BUTTON: [u8; 4] = [70, 70, 70, 255];

const BUTTON_Y: u32 = 12;
const BUTTON_HEIGHT: u32 = 21;

const SLIDER_X: u32 = 300;
const SLIDER_Y: u32 = 16;
const SLIDER_WIDTH: u32 = 140;
const SLIDER_HEIGHT: u32 = 13;

const CHANNEL_X: u32 = 540;
const CHANNEL_Y: [u32; 3] = [4, 17, 30];
const CHANNEL_WIDTH: u32 = 128;
const CHANNEL_HEIGHT: u32 = 10;
const CHANNEL_LABELS: [&str; 3] = ["R", "G", "B"];

const PREVIEW_X: u32 = 684;
const PREVIEW_Y: u32 = 8;
const PREVIEW_SIZE: u32 = 29;

const SWATCH_X: u32 = 8;
const SWATCH_Y: u32 = 52;
const SWATCH_SIZE: u32 = 30;
const SWATCH_STEP: u32 = 34;

/// What a click on the controls asks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Load,
    Draw,
    Erase,
    Save,
    ToggleKeep,
    Thickness(f64),
    Color(Rgb),
}

struct Button {
    x: u32,
    width: u32,
    label: &'static str,
    action: Action,
}

pub struct Toolbar {
    buttons: Vec<Button>,
    palette: Vec<Rgb>,
}

/// A control that keeps tracking the pointer while the button is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slider {
    Thickness,
    /// 0 = red, 1 = green, 2 = blue
    Channel(usize),
}

/// Thickness for a pointer x over the slider
pub fn slider_value(x: f64) -> f64 {
    let offset = (x - SLIDER_X as f64).clamp(0.0, SLIDER_WIDTH as f64);
    ((offset / SLIDER_WIDTH as f64) * MAX_THICKNESS).round()
}

/// Channel intensity for a pointer x over a color slider
pub fn channel_value(x: f64) -> u8 {
    let offset = (x - CHANNEL_X as f64).clamp(0.0, CHANNEL_WIDTH as f64);
    ((offset / CHANNEL_WIDTH as f64) * 255.0).round() as u8
}

/// Action for `slider` with the pointer at `x`, starting from `current`
pub fn slider_action(slider: Slider, x: f64, current: Rgb) -> Action {
    match slider {
        Slider::Thickness => Action::Thickness(slider_value(x)),
        Slider::Channel(channel) => Action::Color(current.with_channel(channel, channel_value(x))),
    }
}

fn within(x: f64, y: f64, left: u32, top: u32, w: u32, h: u32) -> bool {
    x >= left as f64 && x <= (left + w) as f64 && y >= top as f64 && y <= (top + h) as f64
}

impl Toolbar {
    pub fn new() -> Self {
        let buttons = vec![
            Button { x: 55, width: 40, label: "LOAD", action: Action::Load },
            Button { x: 100, width: 40, label: "DRAW", action: Action::Draw },
            Button { x: 145, width: 46, label: "ERASE", action: Action::Erase },
            Button { x: 196, width: 40, label: "SAVE", action: Action::Save },
            Button { x: 241, width: 40, label: "KEEP", action: Action::ToggleKeep },
        ];
        let palette = vec![
            Rgb(0, 0, 0),
            Rgb(255, 255, 255),
            Rgb(128, 128, 128),
            Rgb(255, 0, 0),
            Rgb(255, 128, 0),
            Rgb(255, 255, 0),
            Rgb(0, 255, 0),
            Rgb(0, 128, 0),
            Rgb(0, 255, 255),
            Rgb(30, 144, 255),
            Rgb(0, 0, 255),
            Rgb(255, 0, 255),
        ];
        Toolbar { buttons, palette }
    }

    /// True if the pointer is over the painting surface
    pub fn in_canvas(x: f64, y: f64) -> bool {
        x >= CANVAS_ORIGIN && y >= CANVAS_ORIGIN
    }

    pub fn slider_at(x: f64, y: f64) -> Option<Slider> {
        if within(x, y, SLIDER_X, SLIDER_Y, SLIDER_WIDTH, SLIDER_HEIGHT) {
            return Some(Slider::Thickness);
        }
        CHANNEL_Y
            .iter()
            .position(|&top| within(x, y, CHANNEL_X, top, CHANNEL_WIDTH, CHANNEL_HEIGHT))
            .map(Slider::Channel)
    }

    /// Map a click to an action, if it hit a control. Color sliders change
    /// one channel of `current`.
    pub fn hit_test(&self, x: f64, y: f64, current: Rgb) -> Option<Action> {
        if y >= BUTTON_Y as f64 && y <= (BUTTON_Y + BUTTON_HEIGHT) as f64 {
            for button in &self.buttons {
                if x >= button.x as f64 && x <= (button.x + button.width) as f64 {
                    return Some(button.action);
                }
            }
        }

        if let Some(slider) = Self::slider_at(x, y) {
            return Some(slider_action(slider, x, current));
        }

        if x >= SWATCH_X as f64 && x <= (SWATCH_X + SWATCH_SIZE) as f64 && y >= SWATCH_Y as f64 {
            let index = ((y - SWATCH_Y as f64) / SWATCH_STEP as f64) as usize;
            let top = SWATCH_Y + index as u32 * SWATCH_STEP;
            if y <= (top + SWATCH_SIZE) as f64 {
                return self.palette.get(index).map(|&c| Action::Color(c));
            }
        }

        None
    }

    /// Paint the workspace and controls. The canvas is blitted afterwards.
    pub fn render(&self, frame: &mut [u8], width: u32, height: u32, painter: &Painter) {
        fill_rect(frame, width, height, 0, 0, width, height, WORKSPACE);
        fill_rect(frame, width, height, 0, 0, width, BAND, PANEL);
        fill_rect(frame, width, height, 0, BAND, BAND, height.saturating_sub(BAND), PANEL);

        let session = painter.session();
        for button in &self.buttons {
            let lit = match button.action {
                Action::Draw => session.mode == Mode::Draw,
                Action::Erase => session.mode == Mode::Erase,
                Action::ToggleKeep => session.keep_background,
                _ => false,
            };
            let fill = if lit { ACTIVE } else { BUTTON };
            fill_rect(frame, width, height, button.x, BUTTON_Y, button.width, BUTTON_HEIGHT, fill);
            let text_width = button.label.len() as u32 * 6 - 1;
            let text_x = button.x + button.width.saturating_sub(text_width) / 2;
            draw_text(frame, width, height, text_x, BUTTON_Y + 7, button.label, TEXT);
        }

        // Thickness slider
        let track_y = SLIDER_Y + SLIDER_HEIGHT / 2;
        fill_rect(frame, width, height, SLIDER_X, track_y - 1, SLIDER_WIDTH, 3, BUTTON);
        let fraction = (session.thickness / MAX_THICKNESS).clamp(0.0, 1.0);
        let knob_x = SLIDER_X + (fraction * SLIDER_WIDTH as f64) as u32;
        fill_rect(frame, width, height, knob_x.saturating_sub(3), SLIDER_Y, 7, SLIDER_HEIGHT, TEXT);
        let label = format!("SIZE: {}", session.thickness.round() as u32);
        draw_text(frame, width, height, SLIDER_X + SLIDER_WIDTH + 12, BUTTON_Y + 7, &label, TEXT);

        // Color sliders and a preview of the mixed color
        let rgb = [session.color.0, session.color.1, session.color.2];
        for (channel, &top) in CHANNEL_Y.iter().enumerate() {
            draw_text(frame, width, height, CHANNEL_X - 10, top + 1, CHANNEL_LABELS[channel], TEXT);
            fill_rect(frame, width, height, CHANNEL_X, top, CHANNEL_WIDTH, CHANNEL_HEIGHT, BUTTON);
            let mut tint = [0, 0, 0, 255];
            tint[channel] = 255;
            let filled = rgb[channel] as u32 * CHANNEL_WIDTH / 255;
            fill_rect(frame, width, height, CHANNEL_X, top + 3, filled, CHANNEL_HEIGHT - 6, tint);
            fill_rect(frame, width, height, (CHANNEL_X + filled).saturating_sub(1), top, 3, CHANNEL_HEIGHT, TEXT);
        }
        fill_rect(frame, width, height, PREVIEW_X, PREVIEW_Y, PREVIEW_SIZE, PREVIEW_SIZE, [rgb[0], rgb[1], rgb[2], 255]);

        // Swatches, the selected one framed
        for (i, color) in self.palette.iter().enumerate() {
            let y = SWATCH_Y + i as u32 * SWATCH_STEP;
            if *color == session.color {
                fill_rect(frame, width, height, SWATCH_X - 2, y.saturating_sub(2), SWATCH_SIZE + 4, SWATCH_SIZE + 4, ACTIVE);
            }
            fill_rect(frame, width, height, SWATCH_X, y, SWATCH_SIZE, SWATCH_SIZE, [color.0, color.1, color.2, 255]);
        }
    }

    /// Semi-transparent confirmation banner centered over the canvas
    pub fn render_banner(&self, frame: &mut [u8], width: u32, height: u32, message: &str) {
        let text_width = message.len() as u32 * 6;
        let panel_width = text_width + 40;
        let panel_height = 30;
        let panel_x = (width / 2).saturating_sub(panel_width / 2);
        let panel_y = (height / 2).saturating_sub(panel_height / 2);

        blend_rect(frame, width, height, panel_x, panel_y, panel_width, panel_height, [0, 0, 0, 200]);
        draw_text(frame, width, height, panel_x + 20, panel_y + 11, message, TEXT);
    }
}

fn fill_rect(frame: &mut [u8], width: u32, height: u32, x: u32, y: u32, w: u32, h: u32, color: [u8; 4]) {
    let x_end = (x + w).min(width);
    let y_end = (y + h).min(height);
    for py in y..y_end {
        for px in x..x_end {
            let offset = ((py * width + px) * 4) as usize;
            frame[offset..offset + 4].copy_from_slice(&color);
        }
    }
}

fn blend_rect(frame: &mut [u8], width: u32, height: u32, x: u32, y: u32, w: u32, h: u32, color: [u8; 4]) {
    let alpha = color[3] as u16;
    let inv_alpha = 255 - alpha;
    let x_end = (x + w).min(width);
    let y_end = (y + h).min(height);
    for py in y..y_end {
        for px in x..x_end {
            let offset = ((py * width + px) * 4) as usize;
            for c in 0..3 {
                frame[offset + c] = ((color[c] as u16 * alpha + frame[offset + c] as u16 * inv_alpha) / 255) as u8;
            }
            frame[offset + 3] = 255;
        }
    }
}

pub fn draw_text(frame: &mut [u8], width: u32, height: u32, x: u32, y: u32, text: &str, color: [u8; 4]) {
    for (i, ch) in text.chars().enumerate() {
        draw_char(frame, width, height, x + (i as u32 * 6), y, ch, color);
    }
}

/// 5x7 bitmap glyph
fn draw_char(frame: &mut [u8], width: u32, height: u32, x: u32, y: u32, ch: char, color: [u8; 4]) {
    let pattern: &[u8] = match ch.to_ascii_uppercase() {
        'A' => &[0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => &[0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => &[0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => &[0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => &[0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => &[0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => &[0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => &[0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'K' => &[0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => &[0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => &[0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => &[0b10001, 0b11001, 0b10101, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => &[0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'R' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => &[0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => &[0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => &[0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => &[0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => &[0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => &[0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => &[0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => &[0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => &[0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => &[0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => &[0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => &[0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => &[0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => &[0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => &[0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => &[0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => &[0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => &[0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => &[0b00000, 0b00100, 0b00000, 0b00000, 0b00000, 0b00100, 0b00000],
        '.' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100],
        '-' => &[0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ' ' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        _ => &[0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    };

    for (row, &bits) in pattern.iter().enumerate() {
        for col in 0..5 {
            if (bits >> (4 - col)) & 1 == 1 {
                let px = x + col;
                let py = y + row as u32;
                if px < width && py < height {
                    let offset = ((py * width + px) * 4) as usize;
                    frame[offset..offset + 4].copy_from_slice(&color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painter::Session;

    impl Toolbar {
        fn hit_test_black(&self, x: f64, y: f64) -> Option<Action> {
            self.hit_test(x, y, Rgb::BLACK)
        }
    }

    #[test]
    fn buttons_map_to_actions() {
        let toolbar = Toolbar::new();
        assert_eq!(toolbar.hit_test_black(60.0, 20.0), Some(Action::Load));
        assert_eq!(toolbar.hit_test_black(120.0, 20.0), Some(Action::Draw));
        assert_eq!(toolbar.hit_test_black(150.0, 20.0), Some(Action::Erase));
        assert_eq!(toolbar.hit_test_black(200.0, 20.0), Some(Action::Save));
        assert_eq!(toolbar.hit_test_black(250.0, 20.0), Some(Action::ToggleKeep));
        // gap between buttons
        assert_eq!(toolbar.hit_test_black(97.0, 20.0), None);
    }

    #[test]
    fn slider_maps_position_to_thickness() {
        let toolbar = Toolbar::new();
        assert_eq!(toolbar.hit_test_black(300.0, 20.0), Some(Action::Thickness(0.0)));
        assert_eq!(toolbar.hit_test_black(370.0, 20.0), Some(Action::Thickness(25.0)));
        assert_eq!(toolbar.hit_test_black(440.0, 20.0), Some(Action::Thickness(50.0)));
        assert_eq!(slider_value(1000.0), MAX_THICKNESS);
        assert_eq!(slider_value(0.0), 0.0);
    }

    #[test]
    fn swatches_pick_palette_colors() {
        let toolbar = Toolbar::new();
        assert_eq!(toolbar.hit_test_black(20.0, 60.0), Some(Action::Color(Rgb(0, 0, 0))));
        assert_eq!(toolbar.hit_test_black(20.0, 52.0 + 3.0 * 34.0 + 5.0), Some(Action::Color(Rgb(255, 0, 0))));
        // spacing between swatches
        assert_eq!(toolbar.hit_test_black(20.0, 52.0 + 32.0), None);
        // below the last swatch
        assert_eq!(toolbar.hit_test_black(20.0, 52.0 + 12.0 * 34.0 + 5.0), None);
    }

    #[test]
    fn color_sliders_reach_any_channel_value() {
        let toolbar = Toolbar::new();
        let current = Rgb(10, 20, 30);
        assert_eq!(toolbar.hit_test(540.0, 8.0, current), Some(Action::Color(Rgb(0, 20, 30))));
        assert_eq!(toolbar.hit_test(668.0, 20.0, current), Some(Action::Color(Rgb(10, 255, 30))));
        assert_eq!(toolbar.hit_test(604.0, 35.0, current), Some(Action::Color(Rgb(10, 20, 128))));
        // between the red and green tracks
        assert_eq!(toolbar.hit_test(600.0, 15.5, current), None);
    }

    #[test]
    fn dragging_a_slider_past_its_ends_clamps() {
        assert_eq!(Toolbar::slider_at(545.0, 33.0), Some(Slider::Channel(2)));
        assert_eq!(Toolbar::slider_at(310.0, 20.0), Some(Slider::Thickness));
        assert_eq!(Toolbar::slider_at(310.0, 40.0), None);

        let current = Rgb(1, 2, 3);
        assert_eq!(slider_action(Slider::Channel(0), 9000.0, current), Action::Color(Rgb(255, 2, 3)));
        assert_eq!(slider_action(Slider::Channel(1), -50.0, current), Action::Color(Rgb(1, 0, 3)));
        assert_eq!(slider_action(Slider::Thickness, 9000.0, current), Action::Thickness(MAX_THICKNESS));
    }

    #[test]
    fn canvas_area_is_not_a_control() {
        let toolbar = Toolbar::new();
        assert_eq!(toolbar.hit_test_black(300.0, 300.0), None);
        assert!(Toolbar::in_canvas(45.0, 45.0));
        assert!(!Toolbar::in_canvas(44.0, 300.0));
    }

    #[test]
    fn render_fits_small_frames() {
        let toolbar = Toolbar::new();
        let painter = Painter::new(Session::default());
        let (w, h) = (60u32, 40u32);
        let mut frame = vec![0u8; (w * h * 4) as usize];
        toolbar.render(&mut frame, w, h, &painter);
        assert!(frame.chunks(4).all(|px| px[3] == 255));

        let (w, h) = (1024u32, 100u32);
        let mut frame = vec![0u8; (w * h * 4) as usize];
        toolbar.render(&mut frame, w, h, &painter);
        toolbar.render_banner(&mut frame, w, h, "IMAGE SAVED");
        assert!(frame.chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn text_is_clipped_at_frame_edge() {
        let (w, h) = (8u32, 8u32);
        let mut frame = vec![0u8; (w * h * 4) as usize];
        draw_text(&mut frame, w, h, 4, 4, "WW", [255, 255, 255, 255]);
        // first column of 'W' is lit at the origin row
        assert_eq!(frame[((4 * w + 4) * 4) as usize], 255);
    }
}
