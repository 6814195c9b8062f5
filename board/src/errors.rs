use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("pixel ({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("could not encode snapshot: {0}")]
    CouldNotEncodeSnapshot(image::ImageError),
    #[error("could not decode snapshot: {0}")]
    CouldNotDecodeSnapshot(image::ImageError),
}
