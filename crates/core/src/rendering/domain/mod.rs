pub mod annotation_style;
pub mod frame_renderer;
pub mod overlay;
