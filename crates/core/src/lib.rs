pub mod apps;
pub mod config;
pub mod landmarks;
pub mod pipeline;
pub mod rendering;
pub mod shared;
pub mod video;
