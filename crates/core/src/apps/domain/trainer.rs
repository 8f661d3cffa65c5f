use serde::{Deserialize, Serialize};

use crate::landmarks::domain::detection::{Detection, Subject};
use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::rendering::domain::annotation_style::{AnnotationStyle, Color, Stroke};
use crate::rendering::domain::frame_renderer::FrameRenderer;
use crate::rendering::domain::overlay::draw_progress_bar;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::geometry::{angle_at_vertex, interpolate};

use super::rep_counter::RepCounter;

/// Shoulder, elbow, wrist of the right arm in the 33-point pose schema.
pub const RIGHT_ARM: [usize; 3] = [12, 14, 16];
/// Shoulder, elbow, wrist of the left arm.
pub const LEFT_ARM: [usize; 3] = [11, 13, 15];

// Overlay layout, in pixels of a 1280x720 frame; scaled to the real size.
const REFERENCE_SIZE: (i32, i32) = (1280, 720);
const BAR_LEFT: i32 = 1100;
const BAR_RIGHT: i32 = 1175;
const BAR_TOP: i32 = 100;
const BAR_BOTTOM: i32 = 650;
const COUNT_BOX: ((i32, i32), (i32, i32)) = ((0, 450), (250, 720));
const COUNT_ORIGIN: (i32, i32) = (45, 540);

const JOINT_RADIUS: i32 = 10;
const JOINT_RING_RADIUS: i32 = 15;
const LIMB_THICKNESS: u32 = 3;
const COMPLETE_COLOR: Color = Color(0, 255, 0);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    /// `[a, vertex, c]` landmark ids; the angle is measured at the vertex.
    pub joints: [usize; 3],
    /// Angles mapped onto 0-100% completion by the rep counter.
    pub angle_range: (f64, f64),
    /// Angles mapped onto the bar fill, bottom to top.
    pub bar_angle_range: (f64, f64),
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            joints: RIGHT_ARM,
            angle_range: (210.0, 310.0),
            bar_angle_range: (220.0, 310.0),
        }
    }
}

/// Curl trainer: joint angle overlay, completion bar and rep count for the
/// first tracked pose.
pub struct TrainerOverlay {
    settings: TrainerSettings,
    style: AnnotationStyle,
    counter: RepCounter,
}

fn scaled(point: (i32, i32), frame: &Frame) -> (i32, i32) {
    let x = point.0 as i64 * frame.width() as i64 / REFERENCE_SIZE.0 as i64;
    let y = point.1 as i64 * frame.height() as i64 / REFERENCE_SIZE.1 as i64;
    (x as i32, y as i32)
}

impl TrainerOverlay {
    pub fn new(settings: TrainerSettings, style: AnnotationStyle) -> Self {
        let counter = RepCounter::new(settings.angle_range);
        Self {
            settings,
            style,
            counter,
        }
    }

    pub fn count(&self) -> f64 {
        self.counter.count()
    }

    /// Draws the limb and returns its angle.
    fn draw_joint_angle(
        &self,
        renderer: &dyn FrameRenderer,
        frame: &mut Frame,
        pose: &Subject,
    ) -> Result<f64, PipelineError> {
        let [a, b, c] = self.settings.joints;
        let (pa, pb, pc) = (pose.point(a)?, pose.point(b)?, pose.point(c)?);
        let angle = angle_at_vertex(&pa, &pb, &pc);

        renderer.line(frame, pa.xy(), pb.xy(), Color::WHITE, LIMB_THICKNESS);
        renderer.line(frame, pc.xy(), pb.xy(), Color::WHITE, LIMB_THICKNESS);
        for p in [pa, pb, pc] {
            renderer.circle(frame, p.xy(), JOINT_RADIUS, self.style.emphasis_color, Stroke::Filled);
            renderer.circle(
                frame,
                p.xy(),
                JOINT_RING_RADIUS,
                self.style.emphasis_color,
                Stroke::Outline(2),
            );
        }
        renderer.text(
            frame,
            (pb.x - 50, pb.y + 50),
            &format!("{}", angle as i32),
            self.style.text_color,
            self.style.font_scale,
        );
        Ok(angle)
    }

    fn draw_bar(&self, renderer: &dyn FrameRenderer, frame: &mut Frame, angle: f64, pct: f64) {
        let fill = interpolate(
            angle,
            self.settings.bar_angle_range,
            (BAR_BOTTOM as f64, BAR_TOP as f64),
            true,
        );
        let color = if pct <= 0.0 || pct >= 100.0 {
            COMPLETE_COLOR
        } else {
            self.style.text_color
        };
        let top_left = scaled((BAR_LEFT, BAR_TOP), frame);
        let bottom_right = scaled((BAR_RIGHT, BAR_BOTTOM), frame);
        let fill_top = scaled((0, fill as i32), frame).1;
        draw_progress_bar(
            renderer,
            frame,
            top_left,
            bottom_right,
            fill_top,
            color,
            &format!("{} %", pct as i32),
            self.style.font_scale,
        );
    }

    fn draw_count(&self, renderer: &dyn FrameRenderer, frame: &mut Frame) {
        let (a, b) = COUNT_BOX;
        let (top_left, bottom_right) = (scaled(a, frame), scaled(b, frame));
        renderer.rectangle(frame, top_left, bottom_right, COMPLETE_COLOR, Stroke::Filled);
        let origin = scaled(COUNT_ORIGIN, frame);
        renderer.text(
            frame,
            origin,
            &format!("{}", self.counter.count() as i32),
            self.style.emphasis_color,
            self.style.font_scale * 3.0,
        );
    }
}

impl FrameProcessor for TrainerOverlay {
    fn process(
        &mut self,
        frame: &mut Frame,
        detection: &Detection,
        renderer: &dyn FrameRenderer,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(pose) = detection.first() {
            let angle = self.draw_joint_angle(renderer, frame, pose)?;
            let pct = self.counter.update(angle);
            self.draw_bar(renderer, frame, angle, pct);
            logger.metric("completion", pct);
        }
        self.draw_count(renderer, frame);
        logger.metric("reps", self.counter.count());
        Ok(())
    }
}
