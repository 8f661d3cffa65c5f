pub mod imageproc_renderer;
