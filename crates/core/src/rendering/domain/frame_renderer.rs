use crate::shared::frame::Frame;

use super::annotation_style::{Color, Stroke};

/// Domain interface for drawing primitives onto a frame in place.
///
/// Coordinates are pixels and may lie outside the frame; anything out of
/// bounds is clipped, never an error.
pub trait FrameRenderer {
    fn circle(&self, frame: &mut Frame, center: (i32, i32), radius: i32, color: Color, stroke: Stroke);

    fn line(&self, frame: &mut Frame, from: (i32, i32), to: (i32, i32), color: Color, thickness: u32);

    /// Axis-aligned rectangle spanning both corners, inclusive.
    fn rectangle(
        &self,
        frame: &mut Frame,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        color: Color,
        stroke: Stroke,
    );

    /// Draws `text` with its top-left corner at `origin`. `scale` is the
    /// glyph height in pixels.
    fn text(&self, frame: &mut Frame, origin: (i32, i32), text: &str, color: Color, scale: f32);

    /// Copies `image` onto `frame` with its top-left corner at `origin`.
    fn paste(&self, frame: &mut Frame, origin: (i32, i32), image: &Frame);
}
