/// Axis-aligned rectangle, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Space reserved around the plot for labels, plus the border stroke width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub line_width: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 60.0,
            bottom: 100.0,
            left: 180.0,
            right: 100.0,
            line_width: 4.0,
        }
    }
}

/// The drawable plot region for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub margins: Margins,
    pub start_x: f64,
    pub start_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    /// Lays out the plot region inside a `canvas_width` x `canvas_height`
    /// canvas. Degenerate sizes collapse to an empty region.
    pub fn plan(canvas_width: f64, canvas_height: f64, margins: Margins) -> Self {
        let width = (canvas_width - margins.left - margins.right - margins.line_width).max(0.0);
        let height = (canvas_height - margins.top - margins.bottom).max(0.0);
        Self {
            margins,
            start_x: margins.left + margins.line_width / 2.0,
            start_y: margins.top + margins.line_width / 2.0,
            width,
            height,
        }
    }

    pub fn end_x(&self) -> f64 {
        self.start_x + self.width
    }

    pub fn end_y(&self) -> f64 {
        self.start_y + self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.start_x, self.start_y, self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Horizontal space per bar.
    pub fn pitch(&self, bar_count: usize) -> f64 {
        if bar_count == 0 {
            0.0
        } else {
            self.width / bar_count as f64
        }
    }

    pub fn step_height(&self, steps: u32) -> f64 {
        if steps == 0 {
            0.0
        } else {
            self.height / steps as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plans_region_inside_margins() {
        let g = Geometry::plan(1280.0, 720.0, Margins::default());
        assert_eq!(g.start_x, 182.0);
        assert_eq!(g.start_y, 62.0);
        assert_eq!(g.width, 996.0);
        assert_eq!(g.height, 560.0);
        assert_eq!(g.end_x(), 1178.0);
        assert_eq!(g.end_y(), 622.0);
        assert_eq!(g.pitch(20), 49.8);
        assert_eq!(g.step_height(20), 28.0);
    }

    #[test]
    fn tiny_canvas_collapses() {
        let g = Geometry::plan(100.0, 100.0, Margins::default());
        assert!(g.is_empty());
        assert_eq!(g.width, 0.0);
        assert_eq!(g.pitch(0), 0.0);
    }
}
