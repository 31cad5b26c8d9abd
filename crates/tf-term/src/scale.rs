// SPDX-License-Identifier: MIT
//
// Frame scaling — pixel frames down to the terminal's character grid.
//
// An engine hands us a full-resolution RGBA frame (320×200 for the classic
// engines, anything for others). The terminal has maybe 80×23 usable cells.
// We resample with nearest neighbor: each destination cell picks exactly
// one source pixel, no blending. Terminal cells are few and coarse, so a
// smoothing filter would cost time per frame and only blur the edges that
// make glyph art readable.
//
// The grid is one row shorter than the terminal. Writing a CRLF after the
// last column of the bottom row would scroll the whole screen up by one
// line every frame.

use thiserror::Error;

use crate::terminal::Size;

/// Grid used when the terminal size is unknown or unusably small.
pub const DEFAULT_SIZE: Size = Size { cols: 80, rows: 24 };

/// Smallest terminal we are willing to render into.
pub const MIN_SIZE: Size = Size { cols: 20, rows: 10 };

/// Bytes per source pixel (R, G, B, A).
const BYTES_PER_PIXEL: usize = 4;

// ─── Rgb ─────────────────────────────────────────────────────────────────────

/// A 24-bit color. Alpha from the source frame is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// ─── Frame ───────────────────────────────────────────────────────────────────

/// Why a pixel buffer was rejected as a frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame dimensions must be non-zero (got {width}x{height})")]
    EmptyDimensions { width: usize, height: usize },
    #[error("frame buffer holds {actual} bytes, {width}x{height} RGBA needs {expected}")]
    LengthMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// An immutable RGBA pixel frame borrowed from the engine.
///
/// Pixels are row major, 4 bytes each, no row padding.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    width: usize,
    height: usize,
    pixels: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Wrap an RGBA buffer as a `width × height` frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] if either dimension is zero or the buffer
    /// length is not exactly `width * height * 4`.
    pub fn from_rgba(width: usize, height: usize, pixels: &'a [u8]) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyDimensions { width, height });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL));
        match expected {
            Some(expected) if expected == pixels.len() => Ok(Self {
                width,
                height,
                pixels,
            }),
            _ => Err(FrameError::LengthMismatch {
                width,
                height,
                expected: expected.unwrap_or(usize::MAX),
                actual: pixels.len(),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Color of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the frame.
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let o = (y * self.width + x) * BYTES_PER_PIXEL;
        Rgb::new(self.pixels[o], self.pixels[o + 1], self.pixels[o + 2])
    }
}

// ─── CellGrid ────────────────────────────────────────────────────────────────

/// One color per terminal cell, row major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    cols: usize,
    rows: usize,
    cells: Vec<Rgb>,
}

impl CellGrid {
    /// A grid of `cols × rows` cells, all `fill`.
    #[must_use]
    pub fn filled(cols: usize, rows: usize, fill: Rgb) -> Self {
        Self {
            cols,
            rows,
            cells: vec![fill; cols * rows],
        }
    }

    /// Build a grid from row-major cells.
    ///
    /// Returns `None` if `cells.len() != cols * rows`.
    #[must_use]
    pub fn from_cells(cols: usize, rows: usize, cells: Vec<Rgb>) -> Option<Self> {
        (cells.len() == cols * rows).then_some(Self { cols, rows, cells })
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.cols && y < self.rows {
            Some(self.cells[y * self.cols + x])
        } else {
            None
        }
    }

    /// Iterate rows as slices, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Rgb]> {
        // `max(1)` keeps `chunks_exact` happy for a zero-column grid, which
        // has no cells and therefore yields nothing anyway.
        self.cells.chunks_exact(self.cols.max(1))
    }
}

// ─── Sizing ──────────────────────────────────────────────────────────────────

/// Turn a terminal size query result into the grid to render.
///
/// Falls back to [`DEFAULT_SIZE`] when the query failed or the terminal is
/// smaller than [`MIN_SIZE`] in either dimension, then reserves the last
/// row.
#[must_use]
pub fn grid_size(queried: Option<Size>) -> Size {
    let size = match queried {
        Some(s) if s.cols >= MIN_SIZE.cols && s.rows >= MIN_SIZE.rows => s,
        _ => DEFAULT_SIZE,
    };
    Size {
        cols: size.cols,
        rows: size.rows - 1,
    }
}

// ─── Scaling ─────────────────────────────────────────────────────────────────

/// Nearest-neighbor resample `frame` to exactly `target.cols × target.rows`.
///
/// Cell `(x, y)` takes the source pixel at
/// `(⌊x·W/cols⌋, ⌊y·H/rows⌋)`. Pure: the same frame and target always
/// produce the same grid.
#[must_use]
pub fn scale(frame: &Frame<'_>, target: Size) -> CellGrid {
    let cols = usize::from(target.cols);
    let rows = usize::from(target.rows);
    let mut cells = Vec::with_capacity(cols * rows);

    // Source column per destination column is the same on every row.
    let src_x: Vec<usize> = (0..cols).map(|x| x * frame.width() / cols).collect();

    for y in 0..rows {
        let sy = y * frame.height() / rows;
        cells.extend(src_x.iter().map(|&sx| frame.pixel(sx, sy)));
    }

    CellGrid { cols, rows, cells }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
