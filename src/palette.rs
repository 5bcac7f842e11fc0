//! Dominant-colour extraction over decoded RGBA pixels.
//!
//! Each channel is snapped down to a multiple of the bucket size, which folds
//! the RGB cube into coarse cells. Cells are ranked by how many pixels land in
//! them; the eight busiest become the shader palette.

use std::collections::HashMap;
use std::num::NonZeroU8;

use crate::error::PixelBufferError;

/// Number of colours in the `iPalette` uniform.
pub const PALETTE_SIZE: usize = 8;

/// Width of one quantization cell per channel.
pub const DEFAULT_BUCKET_SIZE: NonZeroU8 = match NonZeroU8::new(24) {
    Some(size) => size,
    None => unreachable!(),
};

/// Normalized RGB triple, each channel in `[0, 1]`.
pub type Rgb = [f32; 3];

/// Borrowed row-major RGBA8 image with its top-left pixel first.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, PixelBufferError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or(PixelBufferError::TooLarge { width, height })?;
        if data.len() != expected {
            return Err(PixelBufferError::LengthMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// RGB of every pixel in scan order; alpha is dropped.
    pub fn rgb(&self) -> impl Iterator<Item = [u8; 3]> + 'a {
        self.data.chunks_exact(4).map(|px| [px[0], px[1], px[2]])
    }
}

/// Fixed-length palette handed to the shaders, busiest colour first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette([Rgb; PALETTE_SIZE]);

impl Default for Palette {
    fn default() -> Self {
        Self([[0.0; 3]; PALETTE_SIZE])
    }
}

impl Palette {
    /// Takes up to eight colours, filling any remaining slots with black.
    pub fn from_colors(colors: &[Rgb]) -> Self {
        let mut palette = Self::default();
        for (slot, color) in palette.0.iter_mut().zip(colors) {
            *slot = *color;
        }
        palette
    }

    pub fn from_pixels(pixels: &PixelBuffer<'_>, bucket_size: NonZeroU8) -> Self {
        Self::from_colors(&extract_palette(pixels, bucket_size))
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.0
    }

    /// Channel values laid out for a `vec3[8]` uniform upload.
    pub fn flattened(&self) -> [f32; PALETTE_SIZE * 3] {
        let mut out = [0.0; PALETTE_SIZE * 3];
        for (chunk, color) in out.chunks_exact_mut(3).zip(self.0.iter()) {
            chunk.copy_from_slice(color);
        }
        out
    }
}

fn quantize(value: u8, bucket: u8) -> u8 {
    value / bucket * bucket
}

/// Returns at most [`PALETTE_SIZE`] colours ordered by descending pixel count.
///
/// Buckets with equal counts keep the order in which the scan first met them.
/// An empty buffer yields an empty list.
pub fn extract_palette(pixels: &PixelBuffer<'_>, bucket_size: NonZeroU8) -> Vec<Rgb> {
    let bucket = bucket_size.get();
    let mut slots: HashMap<[u8; 3], usize> = HashMap::new();
    let mut counts: Vec<([u8; 3], u32)> = Vec::new();

    for [r, g, b] in pixels.rgb() {
        let key = [
            quantize(r, bucket),
            quantize(g, bucket),
            quantize(b, bucket),
        ];
        match slots.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    log::debug!(
        "palette: {} buckets over {}x{} pixels",
        counts.len(),
        pixels.width(),
        pixels.height()
    );

    counts
        .into_iter()
        .take(PALETTE_SIZE)
        .map(|(key, _)| key.map(|channel| f32::from(channel) / 255.0))
        .collect()
}
