use serde::{Deserialize, Serialize};

use crate::landmarks::domain::detection::{Detection, Subject};
use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::rendering::domain::annotation_style::{Color, Stroke};
use crate::rendering::domain::frame_renderer::FrameRenderer;
use crate::shared::frame::{Frame, CHANNELS};

use super::finger_counter::{finger_states, FingerSettings};

const INDEX_TIP: usize = 8;
const MIDDLE_TIP: usize = 12;
const CURSOR_RADIUS: i32 = 15;
const SELECTION_MARGIN: i32 = 25;

/// One pickable pen in the header band, hit-tested on `x` only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Exclusive on both ends.
    pub x_range: (i32, i32),
    pub color: Color,
}

impl PaletteEntry {
    fn contains(&self, x: i32) -> bool {
        self.x_range.0 < x && x < self.x_range.1
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainterSettings {
    /// Rows from the top that make up the palette header.
    pub header_height: i32,
    /// The last black entry acts as the eraser.
    pub palette: Vec<PaletteEntry>,
    pub pen_thickness: u32,
    /// Added to the pen thickness while erasing.
    pub eraser_extra_thickness: u32,
}

impl Default for PainterSettings {
    fn default() -> Self {
        let entry = |lo, hi, color| PaletteEntry {
            x_range: (lo, hi),
            color,
        };
        Self {
            header_height: 140,
            palette: vec![
                entry(100, 250, Color(0, 216, 255)),
                entry(350, 500, Color(255, 0, 0)),
                entry(700, 850, Color(0, 255, 0)),
                entry(950, 1200, Color::BLACK),
            ],
            pen_thickness: 15,
            eraser_extra_thickness: 20,
        }
    }
}

/// What the first hand is doing this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PainterMode {
    /// Index and middle finger up: pick from the palette, no drawing.
    Selecting,
    /// Only the index finger up: draw with the current pen.
    Drawing,
    Idle,
}

/// Air drawing with the index fingertip onto a persistent canvas that is
/// composited over every frame.
pub struct VirtualPainter {
    settings: PainterSettings,
    fingers: FingerSettings,
    headers: Vec<Frame>,
    canvas: Option<Frame>,
    selected: usize,
    previous: Option<(i32, i32)>,
}

impl VirtualPainter {
    pub fn new(settings: PainterSettings) -> Self {
        Self {
            settings,
            fingers: FingerSettings::default(),
            headers: Vec::new(),
            canvas: None,
            selected: 0,
            previous: None,
        }
    }

    /// Header images indexed like the palette; pasted instead of the drawn
    /// palette while their entry is selected.
    pub fn with_headers(mut self, headers: Vec<Frame>) -> Self {
        self.headers = headers;
        self
    }

    pub fn selected_color(&self) -> Color {
        self.settings
            .palette
            .get(self.selected)
            .map(|e| e.color)
            .unwrap_or(Color::WHITE)
    }

    pub fn canvas(&self) -> Option<&Frame> {
        self.canvas.as_ref()
    }

    fn pen_thickness(&self) -> u32 {
        if self.selected_color().is_black() {
            self.settings.pen_thickness + self.settings.eraser_extra_thickness
        } else {
            self.settings.pen_thickness
        }
    }

    fn mode(&self, hand: &Subject) -> Result<PainterMode, Box<dyn std::error::Error>> {
        let states = finger_states(hand, &self.fingers.tip_ids)?;
        Ok(match (states[1], states[2]) {
            (true, true) => PainterMode::Selecting,
            (true, false) => PainterMode::Drawing,
            _ => PainterMode::Idle,
        })
    }

    fn select(
        &mut self,
        renderer: &dyn FrameRenderer,
        frame: &mut Frame,
        hand: &Subject,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let index = hand.point(INDEX_TIP)?;
        let middle = hand.point(MIDDLE_TIP)?;
        if index.y < self.settings.header_height {
            if let Some(i) = self.settings.palette.iter().position(|e| e.contains(index.x)) {
                self.selected = i;
            }
        }
        renderer.rectangle(
            frame,
            (index.x, index.y - SELECTION_MARGIN),
            (middle.x, middle.y + SELECTION_MARGIN),
            self.selected_color(),
            Stroke::Filled,
        );
        Ok(())
    }

    fn draw(
        &mut self,
        renderer: &dyn FrameRenderer,
        frame: &mut Frame,
        hand: &Subject,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let tip = hand.point(INDEX_TIP)?.xy();
        let color = self.selected_color();
        let thickness = self.pen_thickness();
        let from = self.previous.unwrap_or(tip);

        renderer.circle(frame, tip, CURSOR_RADIUS, color, Stroke::Filled);
        renderer.line(frame, from, tip, color, thickness);
        if let Some(canvas) = self.canvas.as_mut() {
            renderer.line(canvas, from, tip, color, thickness);
        }
        self.previous = Some(tip);
        Ok(())
    }

    fn draw_header(&self, renderer: &dyn FrameRenderer, frame: &mut Frame) {
        if let Some(header) = self.headers.get(self.selected) {
            renderer.paste(frame, (0, 0), header);
            return;
        }
        let bottom = self.settings.header_height - 1;
        for (i, entry) in self.settings.palette.iter().enumerate() {
            let (left, right) = entry.x_range;
            renderer.rectangle(frame, (left, 10), (right, bottom - 10), entry.color, Stroke::Filled);
            if i == self.selected {
                renderer.rectangle(
                    frame,
                    (left, 10),
                    (right, bottom - 10),
                    Color::WHITE,
                    Stroke::Outline(3),
                );
            }
        }
    }

    fn ensure_canvas(&mut self, frame: &Frame) {
        let stale = match &self.canvas {
            Some(c) => c.width() != frame.width() || c.height() != frame.height(),
            None => true,
        };
        if stale {
            self.canvas = Some(Frame::filled(frame.width(), frame.height(), [0; 3], 0));
        }
    }
}

/// Copies every non-black canvas pixel over the frame.
fn composite(frame: &mut Frame, canvas: &Frame) {
    for (dst, src) in frame
        .data_mut()
        .chunks_exact_mut(CHANNELS)
        .zip(canvas.data().chunks_exact(CHANNELS))
    {
        if src.iter().any(|&v| v != 0) {
            dst.copy_from_slice(src);
        }
    }
}

impl FrameProcessor for VirtualPainter {
    fn process(
        &mut self,
        frame: &mut Frame,
        detection: &Detection,
        renderer: &dyn FrameRenderer,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.ensure_canvas(frame);

        let mode = match detection.first() {
            Some(hand) => {
                let mode = self.mode(hand)?;
                match mode {
                    PainterMode::Selecting => self.select(renderer, frame, hand)?,
                    PainterMode::Drawing => self.draw(renderer, frame, hand)?,
                    PainterMode::Idle => {}
                }
                mode
            }
            None => PainterMode::Idle,
        };
        if mode != PainterMode::Drawing {
            self.previous = None;
        }
        logger.metric("palette", self.selected as f64);

        if let Some(canvas) = self.canvas.as_ref() {
            composite(frame, canvas);
        }
        self.draw_header(renderer, frame);
        Ok(())
    }
}
