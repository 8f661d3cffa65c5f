use std::path::Path;

use crate::shared::file_type::{classify, MediaKind};
use crate::shared::frame::Frame;

/// Loads every image in `dir`, ordered by file name.
///
/// Files without an image suffix are ignored; an image that fails to
/// decode is an error.
pub fn load_overlay_images(dir: &Path) -> Result<Vec<Frame>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .map_err(|e| format!("cannot read overlay directory {}: {e}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && classify(&path) == MediaKind::Image {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut images = Vec::with_capacity(paths.len());
    for (i, path) in paths.iter().enumerate() {
        let image = image::open(path)
            .map_err(|e| format!("cannot load overlay {}: {e}", path.display()))?
            .to_rgb8();
        images.push(Frame::from_image(image, i));
    }
    log::debug!("Loaded {} overlay images from {}", images.len(), dir.display());
    Ok(images)
}
