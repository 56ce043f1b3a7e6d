//! The pixel buffer the renderer writes into and the PPM (P6) encoder.

use std::fs;
use std::io::Write;
use std::path::Path;

use image::{Rgb, RgbImage};

use crate::color::Color;
use crate::error::RenderError;

/// Row-major RGB pixel buffer. Backed by `image::RgbImage`, the same
/// `ImageBuffer` container the reference renderer's film uses, rather than a
/// hand-rolled `Vec<u8>` wrapper — its raw storage is already the
/// interleaved R,G,B byte layout the PPM writer needs, with no encoder
/// (we never ask `image` to encode; PPM is written by hand per §4.5).
pub struct Canvas {
    buffer: RgbImage,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Canvas {
        assert!(width > 0 && height > 0, "canvas width and height must be greater than 0");

        Canvas {
            buffer: RgbImage::new(width as u32, height as u32),
        }
    }

    pub fn width(&self) -> usize {
        self.buffer.width() as usize
    }

    pub fn height(&self) -> usize {
        self.buffer.height() as usize
    }

    /// Writes a pixel. Panics on out-of-bounds coordinates: this is a
    /// programmer bug, not a recoverable error.
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        assert!(
            x < self.width() && y < self.height(),
            "pixel coordinates out of bounds - tried to access pixel ({x}, {y}) in a {}x{} canvas",
            self.width(),
            self.height()
        );
        self.buffer.put_pixel(x as u32, y as u32, Rgb([color.r, color.g, color.b]));
    }

    /// Direct mutable access to the raw interleaved byte buffer, for
    /// parallel per-row rendering: callers chunk by `width() * 3` to get
    /// disjoint per-scanline slices that distinct workers can write
    /// independently.
    pub fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn get(&self, x: usize, y: usize) -> Color {
        let p = self.buffer.get_pixel(x as u32, y as u32);
        Color::new(p[0], p[1], p[2])
    }

    /// 2x2 box downsample: each output channel byte is the integer-truncated
    /// average of the corresponding 2x2 source block. `self` must have even
    /// dimensions (the caller doubles canvas size up front when SSAA is on).
    pub fn ssaa_downsample(&self) -> Canvas {
        let (width, height) = (self.width(), self.height());
        assert_eq!(width % 2, 0, "SSAA source canvas width must be even");
        assert_eq!(height % 2, 0, "SSAA source canvas height must be even");

        let mut out = Canvas::new(width / 2, height / 2);

        for y in 0..out.height() {
            for x in 0..out.width() {
                let samples = [
                    self.buffer.get_pixel((x * 2) as u32, (y * 2) as u32),
                    self.buffer.get_pixel((x * 2 + 1) as u32, (y * 2) as u32),
                    self.buffer.get_pixel((x * 2) as u32, (y * 2 + 1) as u32),
                    self.buffer.get_pixel((x * 2 + 1) as u32, (y * 2 + 1) as u32),
                ];

                let average = |channel: usize| -> u8 {
                    (samples.iter().map(|p| p[channel] as u32).sum::<u32>() / 4) as u8
                };

                out.set(x, y, Color::new(average(0), average(1), average(2)));
            }
        }

        out
    }

    /// Writes a PPM P6 file. Any existing file at `path` is renamed to
    /// `<path>.bak` first; it's fine for no such file to exist.
    pub fn write_ppm(&self, path: &Path) -> Result<(), RenderError> {
        let mut backup = path.as_os_str().to_os_string();
        backup.push(".bak");
        match fs::rename(path, &backup) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(RenderError::Io(e)),
        }

        let file = fs::File::create(path).map_err(RenderError::Io)?;
        let mut writer = std::io::BufWriter::new(file);

        writer
            .write_all(format!("P6\n{} {}\n255\n", self.width(), self.height()).as_bytes())
            .map_err(RenderError::Io)?;
        writer.write_all(&self.buffer).map_err(RenderError::Io)?;
        writer.flush().map_err(RenderError::Io)?;
        Ok(())
    }
}
