use std::path::{Path, PathBuf};

use super::constants::BUFFER_FILE_PREFIX;

const CAMERA_OUTPUT_EXTENSION: &str = "mp4";

/// Derives output locations: `<root>/<category>/<input file name>`.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.root.join(category)
    }

    /// Final output for an input file. Only the last path segment of the
    /// input is kept.
    pub fn output_for(&self, category: &str, input: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "output".into());
        self.category_dir(category).join(name)
    }

    /// Output for a live camera run, which has no input file name.
    pub fn output_for_camera(&self, category: &str, device_index: u32) -> PathBuf {
        self.category_dir(category)
            .join(format!("camera-{device_index}.{CAMERA_OUTPUT_EXTENSION}"))
    }
}

/// Sibling path of `output` where the silent video is written before muxing.
pub fn buffer_path_for(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{BUFFER_FILE_PREFIX}{name}"))
}
