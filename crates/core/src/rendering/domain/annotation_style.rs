use serde::{Deserialize, Serialize};

/// An RGB colour. Serialized as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const WHITE: Color = Color(255, 255, 255);

    pub fn rgb(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }

    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }
}

/// How closed shapes are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stroke {
    Filled,
    Outline(u32),
}

/// Colours and sizes used for one detector's overlays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    pub landmark_color: Color,
    pub connection_color: Color,
    pub emphasis_color: Color,
    pub text_color: Color,
    pub landmark_radius: i32,
    pub connection_thickness: u32,
    /// Glyph height in pixels.
    pub font_scale: f32,
}

impl AnnotationStyle {
    pub fn new() -> Self {
        Self {
            landmark_color: Color(255, 0, 0),
            connection_color: Color(224, 224, 224),
            emphasis_color: Color(246, 0, 26),
            text_color: Color(255, 0, 255),
            landmark_radius: 2,
            connection_thickness: 2,
            font_scale: 32.0,
        }
    }

    pub fn with_colors(mut self, landmark: Color, connection: Color) -> Self {
        self.landmark_color = landmark;
        self.connection_color = connection;
        self
    }

    pub fn with_sizes(mut self, landmark_radius: i32, connection_thickness: u32) -> Self {
        self.landmark_radius = landmark_radius;
        self.connection_thickness = connection_thickness;
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self::new()
    }
}
