use ratatui::prelude::*;

use crate::canvas::{Canvas, Shape};

const BACKGROUND: Color = Color::Rgb(10, 10, 20);

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg: BACKGROUND,
        }
    }
}

/// Scale the display list onto a `width` x `height` cell grid.
///
/// Rectangles paint the background of every cell they cover (at least one),
/// circles and text paint glyphs on top and keep the background.
pub(crate) fn rasterize(canvas: &Canvas, width: usize, height: usize) -> Vec<Vec<Cell>> {
    let mut grid = vec![vec![Cell::default(); width]; height];
    if width == 0 || height == 0 || canvas.width() <= 0.0 || canvas.height() <= 0.0 {
        return grid;
    }

    let sx = width as f32 / canvas.width();
    let sy = height as f32 / canvas.height();

    // Cell span [start, end) covered by the segment [a, a + len), empty when
    // the segment is entirely off the grid.
    let span = |a: f32, len: f32, scale: f32, max: usize| -> (usize, usize) {
        let start = (a * scale).floor();
        let end = ((a + len) * scale).ceil();
        if end <= 0.0 || start >= max as f32 {
            return (0, 0);
        }
        let start = start.max(0.0) as usize;
        let end = (end as usize).min(max);
        (start, end.max(start + 1))
    };

    for shape in canvas.shapes() {
        match shape {
            Shape::Grid { cell, color } => {
                if *cell <= 0.0 {
                    continue;
                }
                let step_x = (cell * sx).max(1.0);
                let step_y = (cell * sy).max(1.0);
                let mut y = 0.0;
                while (y as usize) < height {
                    let mut x = 0.0;
                    while (x as usize) < width {
                        let c = &mut grid[y as usize][x as usize];
                        if c.ch == ' ' {
                            c.ch = '·';
                            c.fg = *color;
                        }
                        x += step_x;
                    }
                    y += step_y;
                }
            }
            Shape::Rect { x, y, w, h, color } => {
                let (x0, x1) = span(*x, *w, sx, width);
                let (y0, y1) = span(*y, *h, sy, height);
                for row in &mut grid[y0..y1] {
                    for c in &mut row[x0..x1] {
                        *c = Cell {
                            ch: ' ',
                            fg: Color::Reset,
                            bg: *color,
                        };
                    }
                }
            }
            Shape::Circle { x, y, r, color } => {
                let (x0, x1) = span(x - r, 2.0 * r, sx, width);
                let (y0, y1) = span(y - r, 2.0 * r, sy, height);
                for row in &mut grid[y0..y1] {
                    for c in &mut row[x0..x1] {
                        c.ch = '●';
                        c.fg = *color;
                    }
                }
            }
            Shape::Text { x, y, text, color } => {
                let len = text.chars().count();
                let cx = (x * sx) as isize;
                let cy = (y * sy) as usize;
                if cy >= height {
                    continue;
                }
                let start = cx - len as isize / 2;
                for (i, ch) in text.chars().enumerate() {
                    let col = start + i as isize;
                    if col >= 0 && (col as usize) < width {
                        let c = &mut grid[cy][col as usize];
                        c.ch = ch;
                        c.fg = *color;
                    }
                }
            }
        }
    }

    grid
}

pub(crate) fn render_canvas(canvas: &Canvas, width: usize, height: usize) -> Vec<Line<'static>> {
    rasterize(canvas, width, height)
        .into_iter()
        .map(|row| {
            let spans: Vec<Span<'static>> = row
                .into_iter()
                .map(|c| {
                    let style = Style::default().fg(c.fg).bg(c.bg).add_modifier(Modifier::BOLD);
                    Span::styled(String::from(c.ch), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}
