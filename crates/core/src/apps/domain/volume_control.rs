use serde::{Deserialize, Serialize};

use crate::landmarks::domain::detection::Detection;
use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::rendering::domain::annotation_style::{AnnotationStyle, Color, Stroke};
use crate::rendering::domain::frame_renderer::FrameRenderer;
use crate::rendering::domain::overlay::draw_progress_bar;
use crate::shared::frame::Frame;
use crate::shared::geometry::{distance, interpolate, midpoint};

const BAR_TOP_LEFT: (i32, i32) = (50, 150);
const BAR_BOTTOM_RIGHT: (i32, i32) = (85, 400);
const TIP_RADIUS: i32 = 15;
const PINCH_LINE_THICKNESS: u32 = 3;
const PINCHED_COLOR: Color = Color(0, 255, 0);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSettings {
    /// Thumb tip and index tip.
    pub landmarks: (usize, usize),
    /// Pinch distances in pixels mapped onto `volume_range`.
    pub distance_range: (f64, f64),
    pub volume_range: (f64, f64),
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            landmarks: (4, 8),
            distance_range: (50.0, 300.0),
            volume_range: (0.0, 100.0),
        }
    }
}

impl VolumeSettings {
    /// Volume for a pinch distance, saturating at both ends.
    pub fn level(&self, pinch: f64) -> f64 {
        interpolate(pinch, self.distance_range, self.volume_range, true)
    }
}

/// Gesture volume: the thumb-index pinch of the first hand sets a level
/// that is drawn as a bar and reported as the `volume` metric.
pub struct VolumeControl {
    settings: VolumeSettings,
    style: AnnotationStyle,
    last_level: Option<f64>,
}

impl VolumeControl {
    pub fn new(settings: VolumeSettings, style: AnnotationStyle) -> Self {
        Self {
            settings,
            style,
            last_level: None,
        }
    }

    /// Level from the most recent frame that had a hand.
    pub fn last_level(&self) -> Option<f64> {
        self.last_level
    }
}

impl FrameProcessor for VolumeControl {
    fn process(
        &mut self,
        frame: &mut Frame,
        detection: &Detection,
        renderer: &dyn FrameRenderer,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(hand) = detection.first() else {
            return Ok(());
        };
        let (a, b) = self.settings.landmarks;
        let (thumb, index) = (hand.point(a)?, hand.point(b)?);
        let pinch = distance(&thumb, &index);
        let level = self.settings.level(pinch);
        self.last_level = Some(level);
        logger.metric("volume", level);

        let color = self.style.landmark_color;
        renderer.line(frame, thumb.xy(), index.xy(), color, PINCH_LINE_THICKNESS);
        renderer.circle(frame, thumb.xy(), TIP_RADIUS, color, Stroke::Filled);
        renderer.circle(frame, index.xy(), TIP_RADIUS, color, Stroke::Filled);
        let centre_color = if pinch < self.settings.distance_range.0 {
            PINCHED_COLOR
        } else {
            self.style.emphasis_color
        };
        renderer.circle(frame, midpoint(&thumb, &index), TIP_RADIUS, centre_color, Stroke::Filled);

        let fill_top = interpolate(
            level,
            self.settings.volume_range,
            (BAR_BOTTOM_RIGHT.1 as f64, BAR_TOP_LEFT.1 as f64),
            true,
        );
        draw_progress_bar(
            renderer,
            frame,
            BAR_TOP_LEFT,
            BAR_BOTTOM_RIGHT,
            fill_top as i32,
            self.style.text_color,
            &format!("{} %", level as i32),
            self.style.font_scale,
        );
        Ok(())
    }
}
