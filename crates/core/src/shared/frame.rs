use image::RgbImage;
use ndarray::ArrayView3;

/// Bytes per pixel. Frames are always RGB24.
pub const CHANNELS: usize = 3;

/// A single video/image frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only. Stages that hold a
/// frame own it exclusively and mutate it in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// A frame filled with one colour.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], index: usize) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * CHANNELS)
            .collect();
        Self::new(data, width, height, index)
    }

    pub fn from_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// RGB value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ])
    }

    /// Runs `f` over the pixel buffer viewed as an [`RgbImage`] without
    /// copying. The buffer is moved out and restored afterwards.
    pub fn with_image_mut<R>(&mut self, f: impl FnOnce(&mut RgbImage) -> R) -> R {
        let data = std::mem::take(&mut self.data);
        let mut image = RgbImage::from_raw(self.width, self.height, data)
            .expect("Frame data length must match dimensions");
        let result = f(&mut image);
        self.data = image.into_raw();
        result
    }

    /// A copy scaled to `width` x `height` with bilinear filtering.
    pub fn resized(&self, width: u32, height: u32) -> Frame {
        let image = RgbImage::from_raw(self.width, self.height, self.data.clone())
            .expect("Frame data length must match dimensions");
        let scaled =
            image::imageops::resize(&image, width, height, image::imageops::FilterType::Triangle);
        Frame::from_image(scaled, self.index)
    }

    /// Mirrors the frame around its vertical axis.
    pub fn flip_horizontal(&mut self) {
        let row_len = self.width as usize * CHANNELS;
        for row in self.data.chunks_exact_mut(row_len) {
            let pixels = row.len() / CHANNELS;
            for i in 0..pixels / 2 {
                let j = pixels - 1 - i;
                for c in 0..CHANNELS {
                    row.swap(i * CHANNELS + c, j * CHANNELS + c);
                }
            }
        }
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}
