pub mod constants;
pub mod error;
pub mod file_type;
pub mod frame;
pub mod geometry;
pub mod output_layout;
pub mod video_metadata;
