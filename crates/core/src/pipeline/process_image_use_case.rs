use std::path::Path;

use crate::shared::error::PipelineError;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

use super::frame_stage::FrameStage;
use super::pipeline_logger::PipelineLogger;

/// Single-image pipeline: read → stage → write.
pub struct ProcessImageUseCase {
    reader: Box<dyn VideoReader>,
    image_writer: Box<dyn ImageWriter>,
    stage: Box<dyn FrameStage>,
    logger: Box<dyn PipelineLogger>,
}

impl ProcessImageUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        image_writer: Box<dyn ImageWriter>,
        stage: Box<dyn FrameStage>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            image_writer,
            stage,
            logger,
        }
    }

    /// Reads the image, runs the stage on it and writes the result.
    ///
    /// The reader is released before the output is written, so `output`
    /// may be the input path.
    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.reader.open(input_path)?;
        let first = self.reader.frames().next();
        self.reader.close();

        let mut frame = first.ok_or(PipelineError::NoFrames)??;
        self.stage.apply(&mut frame, self.logger.as_mut())?;
        self.logger.progress(1, 1);

        self.image_writer.write(output_path, &frame)?;
        self.logger
            .info(&format!("Output written to {}", output_path.display()));
        self.logger.summary();
        Ok(())
    }
}
