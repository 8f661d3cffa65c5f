/// Still-image suffixes recognised by [`crate::shared::file_type::classify`].
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "tiff", "psd", "raw", "bmp", "heif", "indd",
];

/// Video suffixes recognised by [`crate::shared::file_type::classify`].
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "webm", "mpg", "mp2", "mpeg", "mpe", "mpv", "ogg", "mp4", "m4p", "m4v", "avi", "wmv", "mov",
    "qt", "flv", "swf",
];

/// Frame rate used when a source does not report one.
pub const DEFAULT_FPS: f64 = 30.0;

/// Root directory for per-category outputs.
pub const DEFAULT_OUTPUT_ROOT: &str = "out";

/// Prefix of the silent video written before audio is re-attached.
pub const BUFFER_FILE_PREFIX: &str = "buffer-";

/// Requested capture size for live cameras.
pub const DEFAULT_CAMERA_WIDTH: u32 = 640;
pub const DEFAULT_CAMERA_HEIGHT: u32 = 480;

pub const APP_DIR_NAME: &str = "Landmark Demos";
pub const CONFIG_FILE_NAME: &str = "config.json";
