pub mod overlay_images;
