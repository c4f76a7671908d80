use serde::{Deserialize, Serialize};

/// Opacity of every sprayed dot
pub const DOT_OPACITY: f32 = 0.4;

/// Represents a point in window coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// RGB fill color picked by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Copy with one channel (0 = red, 1 = green, 2 = blue) replaced
    pub fn with_channel(self, channel: usize, value: u8) -> Rgb {
        match channel {
            0 => Rgb(value, self.1, self.2),
            1 => Rgb(self.0, value, self.2),
            2 => Rgb(self.0, self.1, value),
            _ => self,
        }
    }
}

/// Bounding rectangle of a shape, stored as raw margins.
///
/// The four edges are kept exactly as they were computed. `left` may be
/// greater than `right` (and `top` greater than `bottom`) when a stroke runs
/// up or to the left; overlap tests work on the raw values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margin {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Margin { left, top, right, bottom }
    }

    /// Axis-aligned overlap test used by the eraser
    pub fn overlaps(&self, other: &Margin) -> bool {
        self.right > other.left
            && self.left < other.right
            && self.bottom > other.top
            && self.top < other.bottom
    }
}

/// One spray-paint mark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub margin: Margin,
    pub diameter: f64,
    pub color: Rgb,
    pub opacity: f32,
}

impl Dot {
    /// Center of the drawn circle in canvas coordinates. The circle sits in
    /// a `diameter`-sized box whose top-left corner is the margin origin.
    pub fn center(&self) -> Point {
        let r = self.diameter / 2.0;
        Point::new(self.margin.left + r, self.margin.top + r)
    }
}

/// Ordered dot list, drawn back to front
#[derive(Debug, Default)]
pub struct Canvas {
    dots: Vec<Dot>,
}

impl Canvas {
    pub fn new() -> Self {
        Canvas { dots: Vec::new() }
    }

    pub fn push(&mut self, dot: Dot) {
        self.dots.push(dot);
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    /// Remove every dot whose margin overlaps `probe`. Returns how many went.
    pub fn remove_overlapping(&mut self, probe: &Margin) -> usize {
        let before = self.dots.len();
        self.dots.retain(|dot| !probe.overlaps(&dot.margin));
        before - self.dots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot_at(left: f64, top: f64, right: f64, bottom: f64) -> Dot {
        Dot {
            margin: Margin::new(left, top, right, bottom),
            diameter: 4.0,
            color: Rgb(255, 0, 0),
            opacity: DOT_OPACITY,
        }
    }

    #[test]
    fn overlap_is_strict_on_edges() {
        let a = Margin::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Margin::new(5.0, 5.0, 15.0, 15.0)));
        // touching edges do not overlap
        assert!(!a.overlaps(&Margin::new(10.0, 0.0, 20.0, 10.0)));
        assert!(!a.overlaps(&Margin::new(0.0, 10.0, 10.0, 20.0)));
        assert!(!a.overlaps(&Margin::new(30.0, 30.0, 40.0, 40.0)));
    }

    #[test]
    fn inverted_margins_use_raw_values() {
        // right < left: nothing can satisfy right > other.left and left < other.right
        // for a box sitting between them
        let inverted = Margin::new(10.0, 10.0, 0.0, 0.0);
        assert!(!inverted.overlaps(&Margin::new(2.0, 2.0, 8.0, 8.0)));
        // but a wide box spanning both still overlaps
        assert!(inverted.overlaps(&Margin::new(-5.0, -5.0, 15.0, 15.0)));
    }

    #[test]
    fn remove_overlapping_keeps_order_of_survivors() {
        let mut canvas = Canvas::new();
        canvas.push(dot_at(0.0, 0.0, 5.0, 5.0));
        canvas.push(dot_at(100.0, 100.0, 105.0, 105.0));
        canvas.push(dot_at(2.0, 2.0, 6.0, 6.0));
        canvas.push(dot_at(200.0, 200.0, 205.0, 205.0));

        let removed = canvas.remove_overlapping(&Margin::new(1.0, 1.0, 3.0, 3.0));
        assert_eq!(removed, 2);
        assert_eq!(canvas.len(), 2);
        assert_eq!(canvas.dots()[0].margin.left, 100.0);
        assert_eq!(canvas.dots()[1].margin.left, 200.0);
    }

    #[test]
    fn remove_on_empty_canvas_is_noop() {
        let mut canvas = Canvas::new();
        assert_eq!(canvas.remove_overlapping(&Margin::new(0.0, 0.0, 50.0, 50.0)), 0);
        assert!(canvas.is_empty());
    }

    #[test]
    fn with_channel_replaces_one_component() {
        let c = Rgb(1, 2, 3);
        assert_eq!(c.with_channel(0, 9), Rgb(9, 2, 3));
        assert_eq!(c.with_channel(1, 9), Rgb(1, 9, 3));
        assert_eq!(c.with_channel(2, 9), Rgb(1, 2, 9));
        assert_eq!(c.with_channel(3, 9), c);
    }

    #[test]
    fn dot_center_is_offset_by_radius() {
        let dot = dot_at(10.0, 20.0, 0.0, 0.0);
        assert_eq!(dot.center(), Point::new(12.0, 22.0));
    }
}
