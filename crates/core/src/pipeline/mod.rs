pub mod frame_processor;
pub mod frame_stage;
pub mod muxed_output;
pub mod pipeline_logger;
pub mod process_image_use_case;
pub mod process_video_use_case;
