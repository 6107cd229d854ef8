//! Frame compositing: minimap resampling, vector overlays, text and the final frame layout.

pub mod altibar;
pub mod compositor;
pub mod goal;
pub mod minimap;
pub mod outline;
pub(crate) mod painter;
pub mod ruler;
pub mod text;

use crate::foundation::math::{premul_over, unpremultiply_rgba8_in_place};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the `premultiplied` flag makes this explicit at sink
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
            premultiplied: true,
        }
    }

    /// Pixel at `(x, y)`; panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Copy of the pixels with straight (unpremultiplied) alpha, as image files expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// Source-over a `w × h` premultiplied block with its top-left at `(x, y)`, clipped.
    pub(crate) fn blend_block(&mut self, x: i64, y: i64, w: u32, h: u32, src: &[u8]) {
        let fw = i64::from(self.width);
        let fh = i64::from(self.height);
        for row in 0..i64::from(h) {
            let dy = y + row;
            if dy < 0 || dy >= fh {
                continue;
            }
            for col in 0..i64::from(w) {
                let dx = x + col;
                if dx < 0 || dx >= fw {
                    continue;
                }
                let si = ((row * i64::from(w) + col) * 4) as usize;
                let di = ((dy * fw + dx) * 4) as usize;
                let s = [src[si], src[si + 1], src[si + 2], src[si + 3]];
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                self.data[di..di + 4].copy_from_slice(&premul_over(d, s));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/mod.rs"]
mod tests;
