/// A detector-reported position as fractions of the frame size.
///
/// Fractions normally lie in `[0, 1]` but may fall slightly outside near
/// the frame edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

/// A landmark resolved to integer pixel coordinates.
///
/// Coordinates are not clamped; out-of-frame values are valid and left to
/// the renderer to clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub id: usize,
    pub x: i32,
    pub y: i32,
}

impl Landmark {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    /// `(floor(x * width), floor(y * height))`.
    pub fn to_pixel(&self, width: u32, height: u32) -> PixelPoint {
        debug_assert!(width > 0 && height > 0, "frame dimensions must be positive");
        PixelPoint {
            id: self.id,
            x: (self.x * width as f64).floor() as i32,
            y: (self.y * height as f64).floor() as i32,
        }
    }
}

impl PixelPoint {
    pub fn new(id: usize, x: i32, y: i32) -> Self {
        Self { id, x, y }
    }

    pub fn xy(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn is_inside(&self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width as i32 && self.y < height as i32
    }
}
