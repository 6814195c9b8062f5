use std::io::Cursor;

use image::{imageops, ImageOutputFormat, Rgba, RgbaImage};
use log::debug;

use crate::{
    constants::{SNAPSHOT_FORMAT, UNSET_PIXEL},
    errors::BoardError,
};

/// The shared pixel grid. Unset pixels are stored as fully transparent.
pub struct Board {
    canvas: RgbaImage,
    dirty: bool,
}

impl Board {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(width, height, UNSET_PIXEL),
            dirty: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height()
    }

    /// Overwrites a single pixel. There is no blending, the last write wins.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) -> Result<(), BoardError> {
        if !self.contains(x, y) {
            return Err(BoardError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }

        self.canvas.put_pixel(x, y, color);
        self.dirty = true;

        Ok(())
    }

    /// Returns `None` for pixels that were never placed (or are out of bounds).
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        let pixel = *self.canvas.get_pixel_checked(x, y)?;

        if pixel[3] == 0 {
            None
        } else {
            Some(pixel)
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn to_image(&self) -> RgbaImage {
        self.canvas.clone()
    }

    /// Encodes the whole grid as a PNG.
    pub fn serialize(&self) -> Result<Vec<u8>, BoardError> {
        let mut buf = Cursor::new(Vec::new());

        // needs a seekable writer
        self.canvas
            .write_to(&mut buf, ImageOutputFormat::Png)
            .map_err(BoardError::CouldNotEncodeSnapshot)?;

        Ok(buf.into_inner())
    }

    /// Repaints the grid from a snapshot. The snapshot is drawn at the origin,
    /// so a differently sized one is cropped or leaves the remainder unset.
    /// On a corrupt snapshot the board is left blank.
    pub fn restore(&mut self, snapshot: &[u8]) -> Result<(), BoardError> {
        self.canvas = RgbaImage::from_pixel(self.width(), self.height(), UNSET_PIXEL);
        self.dirty = false;

        let decoded = image::load_from_memory_with_format(snapshot, SNAPSHOT_FORMAT)
            .map_err(BoardError::CouldNotDecodeSnapshot)?
            .to_rgba8();

        if decoded.dimensions() != self.canvas.dimensions() {
            debug!(
                "restoring {}x{} snapshot onto {}x{} board",
                decoded.width(),
                decoded.height(),
                self.width(),
                self.height()
            );
        }

        imageops::replace(&mut self.canvas, &decoded, 0, 0);

        Ok(())
    }

    /// Reallocates the grid, keeping whatever overlaps the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        let mut canvas = RgbaImage::from_pixel(width, height, UNSET_PIXEL);
        imageops::replace(&mut canvas, &self.canvas, 0, 0);

        self.canvas = canvas;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use rand::Rng;

    use super::Board;
    use crate::BoardError;

    const RED: Rgba<u8> = Rgba([0xE5, 0x00, 0x00, 0xFF]);
    const BLUE: Rgba<u8> = Rgba([0x00, 0x00, 0xEA, 0xFF]);

    #[test]
    fn new_board_is_blank() {
        let board = Board::new(4, 3);

        assert_eq!(board.width(), 4);
        assert_eq!(board.height(), 3);
        for x in 0..4 {
            for y in 0..3 {
                assert_eq!(board.get_pixel(x, y), None);
            }
        }
        assert!(!board.is_dirty());
    }

    #[test]
    fn set_pixel_overwrites() {
        let mut board = Board::new(8, 8);

        board.set_pixel(2, 5, RED).unwrap();
        assert_eq!(board.get_pixel(2, 5), Some(RED));
        assert!(board.is_dirty());

        board.set_pixel(2, 5, BLUE).unwrap();
        assert_eq!(board.get_pixel(2, 5), Some(BLUE));
    }

    #[test]
    fn set_pixel_rejects_out_of_bounds() {
        let mut board = Board::new(8, 4);

        assert!(matches!(
            board.set_pixel(8, 0, RED),
            Err(BoardError::OutOfBounds { x: 8, y: 0, .. })
        ));
        assert!(matches!(
            board.set_pixel(0, 4, RED),
            Err(BoardError::OutOfBounds { .. })
        ));
        assert!(!board.is_dirty());
    }

    #[test]
    fn snapshot_restores_identical_grid() {
        let mut rng = rand::thread_rng();
        let mut board = Board::new(32, 16);

        for x in 0..32 {
            for y in 0..16 {
                if rng.gen_bool(0.5) {
                    let color = Rgba([rng.gen(), rng.gen(), rng.gen(), 0xFF]);
                    board.set_pixel(x, y, color).unwrap();
                }
            }
        }

        let snapshot = board.serialize().unwrap();
        let mut restored = Board::new(32, 16);
        restored.restore(&snapshot).unwrap();

        assert_eq!(restored.to_image(), board.to_image());
        assert!(!restored.is_dirty());
    }

    #[test]
    fn corrupt_snapshot_leaves_board_blank() {
        let mut board = Board::new(4, 4);
        board.set_pixel(1, 1, RED).unwrap();

        assert!(matches!(
            board.restore(b"definitely not a png"),
            Err(BoardError::CouldNotDecodeSnapshot(_))
        ));
        assert_eq!(board.get_pixel(1, 1), None);
    }

    #[test]
    fn smaller_snapshot_fills_overlap_only() {
        let mut small = Board::new(2, 2);
        small.set_pixel(1, 1, RED).unwrap();

        let mut board = Board::new(4, 4);
        board.restore(&small.serialize().unwrap()).unwrap();

        assert_eq!(board.get_pixel(1, 1), Some(RED));
        assert_eq!(board.get_pixel(3, 3), None);

        let mut tiny = Board::new(1, 1);
        tiny.restore(&board.serialize().unwrap()).unwrap();
        assert_eq!(tiny.width(), 1);
        assert_eq!(tiny.get_pixel(0, 0), None);
    }

    #[test]
    fn resize_keeps_overlap() {
        let mut board = Board::new(4, 4);
        board.set_pixel(0, 0, RED).unwrap();
        board.set_pixel(3, 3, BLUE).unwrap();

        board.resize(2, 6);

        assert_eq!(board.width(), 2);
        assert_eq!(board.height(), 6);
        assert_eq!(board.get_pixel(0, 0), Some(RED));
        assert_eq!(board.get_pixel(1, 5), None);
    }
}
