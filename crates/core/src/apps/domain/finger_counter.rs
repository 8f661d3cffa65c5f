use serde::{Deserialize, Serialize};

use crate::landmarks::domain::detection::{Detection, Subject};
use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::rendering::domain::annotation_style::{AnnotationStyle, Color, Stroke};
use crate::rendering::domain::frame_renderer::FrameRenderer;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

const INDEX_MCP: usize = 5;
const PINKY_MCP: usize = 17;
const COUNT_BOX: ((i32, i32), (i32, i32)) = ((20, 225), (170, 425));
const COUNT_ORIGIN: (i32, i32) = (45, 260);
const COUNT_BOX_COLOR: Color = Color(0, 255, 0);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerSettings {
    /// Thumb, index, middle, ring and pinky tips in the 21-point hand schema.
    pub tip_ids: [usize; 5],
}

impl Default for FingerSettings {
    fn default() -> Self {
        Self {
            tip_ids: [4, 8, 12, 16, 20],
        }
    }
}

/// Which fingers of `hand` are extended, thumb first.
///
/// The thumb is compared sideways against the joint below its tip, on the
/// side the thumb is on: a hand whose index knuckle lies right of its pinky
/// knuckle has its thumb on the right. The other fingers are up when the
/// tip is above the joint two ids below it.
pub fn finger_states(hand: &Subject, tip_ids: &[usize; 5]) -> Result<[bool; 5], PipelineError> {
    let thumb_on_right = hand.point(INDEX_MCP)?.x > hand.point(PINKY_MCP)?.x;

    let mut states = [false; 5];
    let thumb_tip = hand.point(tip_ids[0])?;
    let thumb_joint = hand.point(joint_below(hand, tip_ids[0], 1)?)?;
    states[0] = if thumb_on_right {
        thumb_tip.x > thumb_joint.x
    } else {
        thumb_tip.x < thumb_joint.x
    };

    for (state, &tip) in states[1..].iter_mut().zip(&tip_ids[1..]) {
        *state = hand.point(tip)?.y < hand.point(joint_below(hand, tip, 2)?)?.y;
    }
    Ok(states)
}

/// Id `steps` below `tip`. A tip too close to 0 has no such joint.
fn joint_below(hand: &Subject, tip: usize, steps: usize) -> Result<usize, PipelineError> {
    tip.checked_sub(steps)
        .ok_or(PipelineError::InvalidLandmarkReference {
            id: tip,
            available: hand.len(),
        })
}

/// Counts raised fingers on the first hand and shows the count, plus the
/// overlay image registered for that count when one exists.
pub struct FingerCounter {
    settings: FingerSettings,
    style: AnnotationStyle,
    overlays: Vec<Frame>,
}

impl FingerCounter {
    pub fn new(settings: FingerSettings, style: AnnotationStyle) -> Self {
        Self {
            settings,
            style,
            overlays: Vec::new(),
        }
    }

    /// Images indexed by finger count: the first is shown for 0, and so on.
    pub fn with_overlays(mut self, overlays: Vec<Frame>) -> Self {
        self.overlays = overlays;
        self
    }
}

impl FrameProcessor for FingerCounter {
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
        let states = finger_states(hand, &self.settings.tip_ids)?;
        let count = states.iter().filter(|&&up| up).count();
        logger.metric("fingers", count as f64);

        if let Some(image) = self.overlays.get(count) {
            renderer.paste(frame, (0, 0), image);
        }
        let (top_left, bottom_right) = COUNT_BOX;
        renderer.rectangle(frame, top_left, bottom_right, COUNT_BOX_COLOR, Stroke::Filled);
        renderer.text(
            frame,
            COUNT_ORIGIN,
            &count.to_string(),
            self.style.emphasis_color,
            self.style.font_scale * 4.0,
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::landmarks::domain::landmark::PixelPoint;
    use crate::pipeline::pipeline_logger::{NullPipelineLogger, StdoutPipelineLogger};
    use crate::rendering::domain::overlay::tests::{Call, RecordingRenderer};
    use rstest::rstest;

    /// A right hand (thumb on the right side of the image) with the
    /// requested fingers raised, thumb first.
    pub(crate) fn right_hand(up: [bool; 5]) -> Subject {
        let mut points: Vec<PixelPoint> = (0..21).map(|id| PixelPoint::new(id, 300, 300)).collect();
        points[5] = PixelPoint::new(5, 340, 250);
        points[17] = PixelPoint::new(17, 260, 250);

        points[3] = PixelPoint::new(3, 380, 240);
        points[4] = PixelPoint::new(4, if up[0] { 420 } else { 350 }, 230);

        for (finger, tip) in [8usize, 12, 16, 20].into_iter().enumerate() {
            let x = 340 - 25 * finger as i32;
            points[tip - 2] = PixelPoint::new(tip - 2, x, 200);
            let y = if up[finger + 1] { 150 } else { 230 };
            points[tip] = PixelPoint::new(tip, x, y);
        }
        Subject::new(points, None)
    }

    fn mirrored(hand: &Subject) -> Subject {
        let points = hand
            .points()
            .iter()
            .map(|p| PixelPoint::new(p.id, 640 - p.x, p.y))
            .collect();
        Subject::new(points, None)
    }

    #[rstest]
    #[case([false; 5])]
    #[case([true; 5])]
    #[case([false, true, false, false, false])]
    #[case([true, false, false, false, true])]
    #[case([false, true, true, false, false])]
    fn test_states_for_either_hand(#[case] up: [bool; 5]) {
        let tips = FingerSettings::default().tip_ids;
        let hand = right_hand(up);
        assert_eq!(finger_states(&hand, &tips).unwrap(), up);
        assert_eq!(finger_states(&mirrored(&hand), &tips).unwrap(), up);
    }

    #[test]
    fn test_short_hand_is_error() {
        let hand = Subject::new(vec![PixelPoint::new(0, 0, 0)], None);
        let err = finger_states(&hand, &FingerSettings::default().tip_ids).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidLandmarkReference { .. }));
    }

    #[rstest]
    #[case::thumb_at_zero([0, 8, 12, 16, 20], 0)]
    #[case::finger_at_zero([4, 0, 12, 16, 20], 0)]
    #[case::finger_at_one([4, 8, 12, 16, 1], 1)]
    fn test_tip_without_joint_below_is_error(#[case] tips: [usize; 5], #[case] bad: usize) {
        let err = finger_states(&right_hand([true; 5]), &tips).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidLandmarkReference { id, available: 21 } if id == bad
        ));
    }

    #[test]
    fn test_counter_with_low_tip_ids_returns_error() {
        let settings = FingerSettings {
            tip_ids: [0, 1, 12, 16, 20],
        };
        let mut counter = FingerCounter::new(settings, AnnotationStyle::new());
        let renderer = RecordingRenderer::default();
        let mut frame = Frame::filled(640, 480, [0; 3], 0);
        let detection = Detection::new(vec![right_hand([true; 5])]);

        let err = counter
            .process(&mut frame, &detection, &renderer, &mut NullPipelineLogger)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidLandmarkReference { id: 0, .. })
        ));
    }

    #[test]
    fn test_counter_reports_count_and_overlay() {
        let overlays: Vec<Frame> = (0..6).map(|i| Frame::filled(10 + i, 10, [0; 3], 0)).collect();
        let mut counter = FingerCounter::new(FingerSettings::default(), AnnotationStyle::new())
            .with_overlays(overlays);
        let renderer = RecordingRenderer::default();
        let mut logger = StdoutPipelineLogger::new(10);
        let mut frame = Frame::filled(640, 480, [0; 3], 0);
        let detection = Detection::new(vec![right_hand([false, true, true, true, false])]);

        counter
            .process(&mut frame, &detection, &renderer, &mut logger)
            .unwrap();

        assert_eq!(logger.metric_mean("fingers"), Some(3.0));
        let calls = renderer.calls.borrow();
        assert_eq!(calls[0], Call::Paste((0, 0), 13, 10));
        assert!(calls.contains(&Call::Text(COUNT_ORIGIN, "3".to_string())));
    }

    #[test]
    fn test_counter_without_overlays_still_draws_count() {
        let mut counter = FingerCounter::new(FingerSettings::default(), AnnotationStyle::new());
        let renderer = RecordingRenderer::default();
        let mut frame = Frame::filled(640, 480, [0; 3], 0);
        let detection = Detection::new(vec![right_hand([true; 5])]);

        counter
            .process(&mut frame, &detection, &renderer, &mut NullPipelineLogger)
            .unwrap();

        let calls = renderer.calls.borrow();
        assert!(!calls.iter().any(|c| matches!(c, Call::Paste(..))));
        assert!(calls.contains(&Call::Text(COUNT_ORIGIN, "5".to_string())));
    }

    #[test]
    fn test_counter_ignores_frames_without_hands() {
        let mut counter = FingerCounter::new(FingerSettings::default(), AnnotationStyle::new());
        let renderer = RecordingRenderer::default();
        let mut frame = Frame::filled(64, 64, [0; 3], 0);
        counter
            .process(&mut frame, &Detection::empty(), &renderer, &mut NullPipelineLogger)
            .unwrap();
        assert!(renderer.calls.borrow().is_empty());
    }
}
