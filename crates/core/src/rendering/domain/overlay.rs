//! Composite annotations built from [`FrameRenderer`] primitives.

use crate::landmarks::domain::detection::{Detection, Subject};
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

use super::annotation_style::{AnnotationStyle, Color, Stroke};
use super::frame_renderer::FrameRenderer;

const CORNER_MARKER_LENGTH: i32 = 30;
const CORNER_MARKER_THICKNESS: u32 = 10;
const FACE_BOX_THICKNESS: u32 = 1;
const SCORE_LABEL_OFFSET: i32 = 20;
const HIGHLIGHT_RADIUS: i32 = 12;
const CONNECT_THICKNESS: u32 = 4;
const BAR_OUTLINE_THICKNESS: u32 = 3;

/// Draws connection lines, then every landmark as a filled dot.
///
/// Edges whose endpoints the subject does not carry are skipped.
pub fn draw_skeleton(
    renderer: &dyn FrameRenderer,
    frame: &mut Frame,
    subject: &Subject,
    connections: &[(usize, usize)],
    style: &AnnotationStyle,
) {
    for &(a, b) in connections {
        if let (Ok(pa), Ok(pb)) = (subject.point(a), subject.point(b)) {
            renderer.line(
                frame,
                pa.xy(),
                pb.xy(),
                style.connection_color,
                style.connection_thickness,
            );
        }
    }
    for p in subject.points() {
        renderer.circle(
            frame,
            p.xy(),
            style.landmark_radius,
            style.landmark_color,
            Stroke::Filled,
        );
    }
}

/// Box around the subject's landmarks with thick corner markers and an
/// `NN%` score label above it.
pub fn draw_face_box(
    renderer: &dyn FrameRenderer,
    frame: &mut Frame,
    subject: &Subject,
    style: &AnnotationStyle,
) {
    let Some((x, y, w, h)) = subject.bounding_box() else {
        return;
    };
    let (x2, y2) = (x + w, y + h);
    let color = style.connection_color;
    renderer.rectangle(frame, (x, y), (x2, y2), color, Stroke::Outline(FACE_BOX_THICKNESS));

    let l = CORNER_MARKER_LENGTH;
    let corners = [
        ((x, y), (x + l, y), (x, y + l)),
        ((x2, y), (x2 - l, y), (x2, y + l)),
        ((x2, y2), (x2 - l, y2), (x2, y2 - l)),
        ((x, y2), (x + l, y2), (x, y2 - l)),
    ];
    for (corner, horizontal, vertical) in corners {
        renderer.line(frame, corner, horizontal, color, CORNER_MARKER_THICKNESS);
        renderer.line(frame, corner, vertical, color, CORNER_MARKER_THICKNESS);
    }

    if let Some(score) = subject.score() {
        let label = format!("{}%", (score * 100.0) as i32);
        let top = y - SCORE_LABEL_OFFSET - style.font_scale as i32;
        renderer.text(frame, (x, top), &label, style.text_color, style.font_scale);
    }
}

/// Draws an emphasis dot on landmark `id` of every subject.
pub fn highlight_landmark(
    renderer: &dyn FrameRenderer,
    frame: &mut Frame,
    detection: &Detection,
    id: usize,
    style: &AnnotationStyle,
) -> Result<(), PipelineError> {
    for subject in detection.subjects() {
        let p = subject.point(id)?;
        renderer.circle(frame, p.xy(), HIGHLIGHT_RADIUS, style.emphasis_color, Stroke::Filled);
    }
    Ok(())
}

/// Draws an emphasis line between landmarks `a` and `b` of every subject.
pub fn connect_landmarks(
    renderer: &dyn FrameRenderer,
    frame: &mut Frame,
    detection: &Detection,
    a: usize,
    b: usize,
    style: &AnnotationStyle,
) -> Result<(), PipelineError> {
    for subject in detection.subjects() {
        let pa = subject.point(a)?;
        let pb = subject.point(b)?;
        renderer.line(frame, pa.xy(), pb.xy(), style.emphasis_color, CONNECT_THICKNESS);
    }
    Ok(())
}

/// Vertical bar outline filled from `fill_top` down to the bottom edge,
/// with `label` drawn above it.
pub fn draw_progress_bar(
    renderer: &dyn FrameRenderer,
    frame: &mut Frame,
    top_left: (i32, i32),
    bottom_right: (i32, i32),
    fill_top: i32,
    color: Color,
    label: &str,
    font_scale: f32,
) {
    renderer.rectangle(frame, top_left, bottom_right, color, Stroke::Outline(BAR_OUTLINE_THICKNESS));
    let fill_top = fill_top.clamp(top_left.1, bottom_right.1);
    renderer.rectangle(
        frame,
        (top_left.0, fill_top),
        bottom_right,
        color,
        Stroke::Filled,
    );
    let label_top = top_left.1 - 25 - font_scale as i32;
    renderer.text(frame, (top_left.0, label_top), label, color, font_scale);
}
