use ratatui::style::Color;

/// A primitive on the canvas. Coordinates are canvas units.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Circle {
        x: f32,
        y: f32,
        r: f32,
        color: Color,
    },
    /// Text centred on `(x, y)`.
    Text {
        x: f32,
        y: f32,
        text: String,
        color: Color,
    },
    /// Faint lattice over the whole canvas, one line every `cell` units.
    Grid { cell: f32, color: Color },
}

/// Logical drawing surface shared by the games.
///
/// Games repaint it from scratch every tick; the UI rasterises the display
/// list into whatever terminal area is available.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: f32,
    height: f32,
    shapes: Vec<Shape>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[cfg(test)]
    pub fn is_blank(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.shapes.push(Shape::Rect { x, y, w, h, color });
    }

    pub fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Color) {
        self.shapes.push(Shape::Circle { x, y, r, color });
    }

    pub fn text(&mut self, x: f32, y: f32, text: impl Into<String>, color: Color) {
        self.shapes.push(Shape::Text {
            x,
            y,
            text: text.into(),
            color,
        });
    }

    pub fn grid(&mut self, cell: f32, color: Color) {
        self.shapes.push(Shape::Grid { cell, color });
    }
}
