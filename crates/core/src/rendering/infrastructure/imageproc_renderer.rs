use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing;
use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::rendering::domain::annotation_style::{Color, Stroke};
use crate::rendering::domain::frame_renderer::FrameRenderer;
use crate::shared::frame::Frame;

/// Draws with `imageproc`. Text needs a TrueType/OpenType font; without
/// one, text calls are skipped.
#[derive(Default)]
pub struct ImageprocRenderer {
    font: Option<FontArc>,
}

impl ImageprocRenderer {
    pub fn new() -> Self {
        Self { font: None }
    }

    pub fn with_font(font: FontArc) -> Self {
        Self { font: Some(font) }
    }

    pub fn with_font_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| format!("invalid font {}: {e}", path.display()))?;
        Ok(Self::with_font(font))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

fn rgb(color: Color) -> Rgb<u8> {
    Rgb(color.rgb())
}

/// Rect spanning both corners inclusive, or `None` when degenerate.
fn span_rect(a: (i32, i32), b: (i32, i32)) -> Option<Rect> {
    let (x1, x2) = (a.0.min(b.0), a.0.max(b.0));
    let (y1, y2) = (a.1.min(b.1), a.1.max(b.1));
    let w = (x2 - x1 + 1) as u32;
    let h = (y2 - y1 + 1) as u32;
    (w > 0 && h > 0).then(|| Rect::at(x1, y1).of_size(w, h))
}

fn thick_line(img: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>, thickness: u32) {
    if thickness <= 1 {
        drawing::draw_line_segment_mut(
            img,
            (from.0 as f32, from.1 as f32),
            (to.0 as f32, to.1 as f32),
            color,
        );
        return;
    }

    let half = thickness as f32 / 2.0;
    let (dx, dy) = ((to.0 - from.0) as f32, (to.1 - from.1) as f32);
    let len = dx.hypot(dy);
    if len >= 1.0 {
        let nx = (-dy / len * half).round() as i32;
        let ny = (dx / len * half).round() as i32;
        let quad = [
            Point::new(from.0 + nx, from.1 + ny),
            Point::new(to.0 + nx, to.1 + ny),
            Point::new(to.0 - nx, to.1 - ny),
            Point::new(from.0 - nx, from.1 - ny),
        ];
        drawing::draw_polygon_mut(img, &quad, color);
    }
    // Round caps
    let cap = (half.round() as i32 - 1).max(0);
    drawing::draw_filled_circle_mut(img, from, cap, color);
    drawing::draw_filled_circle_mut(img, to, cap, color);
}

impl FrameRenderer for ImageprocRenderer {
    fn circle(&self, frame: &mut Frame, center: (i32, i32), radius: i32, color: Color, stroke: Stroke) {
        let radius = radius.max(0);
        frame.with_image_mut(|img| match stroke {
            Stroke::Filled => drawing::draw_filled_circle_mut(img, center, radius, rgb(color)),
            Stroke::Outline(t) => {
                let t = t.max(1) as i32;
                let inner = (radius - t / 2).max(0);
                for r in inner..inner + t {
                    drawing::draw_hollow_circle_mut(img, center, r, rgb(color));
                }
            }
        });
    }

    fn line(&self, frame: &mut Frame, from: (i32, i32), to: (i32, i32), color: Color, thickness: u32) {
        frame.with_image_mut(|img| thick_line(img, from, to, rgb(color), thickness));
    }

    fn rectangle(
        &self,
        frame: &mut Frame,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        color: Color,
        stroke: Stroke,
    ) {
        frame.with_image_mut(|img| match stroke {
            Stroke::Filled => {
                if let Some(rect) = span_rect(top_left, bottom_right) {
                    drawing::draw_filled_rect_mut(img, rect, rgb(color));
                }
            }
            Stroke::Outline(t) => {
                let t = t.max(1) as i32;
                // Centered on the nominal edge, like a pen of width `t`.
                for offset in -(t / 2)..t - t / 2 {
                    let a = (top_left.0 - offset, top_left.1 - offset);
                    let b = (bottom_right.0 + offset, bottom_right.1 + offset);
                    if a.0 > b.0 || a.1 > b.1 {
                        continue;
                    }
                    if let Some(rect) = span_rect(a, b) {
                        drawing::draw_hollow_rect_mut(img, rect, rgb(color));
                    }
                }
            }
        });
    }

    fn text(&self, frame: &mut Frame, origin: (i32, i32), text: &str, color: Color, scale: f32) {
        let Some(font) = &self.font else {
            log::debug!("No font configured, skipping label {text:?}");
            return;
        };
        frame.with_image_mut(|img| {
            drawing::draw_text_mut(img, rgb(color), origin.0, origin.1, PxScale::from(scale), font, text);
        });
    }

    fn paste(&self, frame: &mut Frame, origin: (i32, i32), image: &Frame) {
        let Some(top) = RgbImage::from_raw(image.width(), image.height(), image.data().to_vec()) else {
            return;
        };
        frame.with_image_mut(|img| {
            image::imageops::overlay(img, &top, origin.0 as i64, origin.1 as i64);
        });
    }
}
