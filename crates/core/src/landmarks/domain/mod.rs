pub mod detection;
pub mod detector_kind;
pub mod landmark;
pub mod landmark_detector;
