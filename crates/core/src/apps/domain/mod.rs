pub mod finger_counter;
pub mod landmark_overlay;
pub mod rep_counter;
pub mod trainer;
pub mod virtual_painter;
pub mod volume_control;
