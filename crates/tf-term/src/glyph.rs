// SPDX-License-Identifier: MIT
//
// Glyph + color encoding — a cell grid to ANSI bytes.
//
// Every cell becomes one ASCII glyph picked by brightness from a fixed
// ramp, drawn in the cell's own 24-bit color. The glyph carries the shape
// (dark cells are sparse, bright cells dense) and the color carries the hue.
//
// Output volume is the bottleneck. A 24-bit SGR is up to 19 bytes; the glyph
// is one. Engine frames have long horizontal runs of one color (walls,
// floors, sky), so we track the last color written in the current row and
// only emit an SGR when the next cell differs. The tracked color resets at
// every row start, because each row ends with SGR 0.

use std::io::{self, Write};

use crate::ansi;
use crate::scale::{CellGrid, Rgb};

/// Glyphs from darkest to brightest.
pub const RAMP: &[u8; 10] = b" .:-=+*#%@";

/// Largest possible value of [`luma`] (`255 · (3 + 6 + 1)`).
pub const MAX_LUMA: u32 = 255 * 10;

/// Brightness estimate weighted toward green: `3R + 6G + B`.
#[inline]
#[must_use]
pub fn luma(c: Rgb) -> u32 {
    3 * u32::from(c.r) + 6 * u32::from(c.g) + u32::from(c.b)
}

/// Ramp index for a luma value, clamped into the ramp.
#[inline]
#[must_use]
pub fn ramp_index(l: u32) -> usize {
    let last = RAMP.len() - 1;
    #[allow(clippy::cast_possible_truncation)] // last ≤ 9.
    let idx = (l * last as u32 / MAX_LUMA) as usize;
    idx.min(last)
}

/// The ramp glyph for a cell color.
#[inline]
#[must_use]
pub fn glyph_for(c: Rgb) -> u8 {
    RAMP[ramp_index(luma(c))]
}

/// Encode `grid` as glyph rows with run-length color escapes.
///
/// For each row: an SGR foreground escape whenever the color changes from
/// the previous cell of the same row (the first cell always gets one), one
/// glyph byte per cell, then `SGR 0` and CRLF. Deterministic for a given
/// grid; the only error is the writer's.
///
/// # Errors
///
/// Returns any error from writing to `w`.
pub fn encode(grid: &CellGrid, w: &mut impl Write) -> io::Result<()> {
    for row in grid.rows_iter() {
        encode_row(row, w)?;
    }
    Ok(())
}

fn encode_row(row: &[Rgb], w: &mut impl Write) -> io::Result<()> {
    // `None` never equals a real color, so the first cell always emits.
    let mut last: Option<Rgb> = None;

    for &cell in row {
        if last != Some(cell) {
            ansi::fg_rgb(w, cell)?;
            last = Some(cell);
        }
        w.write_all(&[glyph_for(cell)])?;
    }

    ansi::reset(w)?;
    ansi::crlf(w)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: encode a grid and return the output as a string.
    fn encoded(grid: &CellGrid) -> String {
        let mut buf = Vec::new();
        encode(grid, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn grid(cols: usize, rows: usize, cells: &[Rgb]) -> CellGrid {
        CellGrid::from_cells(cols, rows, cells.to_vec()).unwrap()
    }

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    // ── Luma + ramp ─────────────────────────────────────────────────────

    #[test]
    fn ramp_has_ten_glyphs() {
        assert_eq!(RAMP.len(), 10);
    }

    #[test]
    fn luma_weights() {
        assert_eq!(luma(Rgb::new(1, 0, 0)), 3);
        assert_eq!(luma(Rgb::new(0, 1, 0)), 6);
        assert_eq!(luma(Rgb::new(0, 0, 1)), 1);
        assert_eq!(luma(Rgb::WHITE), MAX_LUMA);
    }

    #[test]
    fn black_is_darkest_glyph() {
        assert_eq!(ramp_index(0), 0);
        assert_eq!(glyph_for(Rgb::BLACK), b' ');
    }

    #[test]
    fn white_is_brightest_glyph() {
        assert_eq!(ramp_index(MAX_LUMA), RAMP.len() - 1);
        assert_eq!(glyph_for(Rgb::WHITE), b'@');
    }

    #[test]
    fn ramp_index_is_monotonic() {
        let mut prev = 0;
        for l in 0..=MAX_LUMA {
            let idx = ramp_index(l);
            assert!(idx >= prev, "index dropped at luma {l}");
            prev = idx;
        }
    }

    #[test]
    fn ramp_index_clamps_beyond_max() {
        assert_eq!(ramp_index(u32::MAX / 16), RAMP.len() - 1);
    }

    #[test]
    fn ramp_bucket_boundaries() {
        // idx = floor(l · 9 / 2550); bucket 1 starts at l = 284 (9·284 = 2556).
        assert_eq!(ramp_index(283), 0);
        assert_eq!(ramp_index(284), 1);
    }

    #[test]
    fn pure_channels_pick_expected_glyphs() {
        // red: 765·9/2550 = 2.7 → ':'; green: 1530·9/2550 = 5.4 → '+';
        // blue: 255·9/2550 = 0.9 → ' '.
        assert_eq!(glyph_for(RED), b':');
        assert_eq!(glyph_for(Rgb::new(0, 255, 0)), b'+');
        assert_eq!(glyph_for(BLUE), b' ');
    }

    // ── Run-length color ────────────────────────────────────────────────

    #[test]
    fn uniform_row_emits_one_escape() {
        let out = encoded(&grid(5, 1, &[RED; 5]));
        assert_eq!(out, "\x1b[38;2;255;0;0m:::::\x1b[0m\r\n");
        assert_eq!(out.matches("\x1b[38;2;").count(), 1);
    }

    #[test]
    fn escape_only_on_change() {
        let out = encoded(&grid(4, 1, &[RED, RED, BLUE, RED]));
        assert_eq!(
            out,
            "\x1b[38;2;255;0;0m::\x1b[38;2;0;0;255m \x1b[38;2;255;0;0m:\x1b[0m\r\n"
        );
    }

    #[test]
    fn alternating_colors_escape_every_cell() {
        let out = encoded(&grid(4, 1, &[RED, BLUE, RED, BLUE]));
        assert_eq!(out.matches("\x1b[38;2;").count(), 4);
    }

    #[test]
    fn row_state_resets_between_rows() {
        // Row 1 starts with the color row 0 ended on; it still gets an escape.
        let out = encoded(&grid(2, 2, &[RED, RED, RED, RED]));
        assert_eq!(
            out,
            "\x1b[38;2;255;0;0m::\x1b[0m\r\n\x1b[38;2;255;0;0m::\x1b[0m\r\n"
        );
    }

    #[test]
    fn black_first_cell_still_emits() {
        let out = encoded(&grid(1, 1, &[Rgb::BLACK]));
        assert_eq!(out, "\x1b[38;2;0;0;0m \x1b[0m\r\n");
    }

    #[test]
    fn one_glyph_byte_per_cell() {
        let cells: Vec<Rgb> = (0..=255u8).map(|v| Rgb::new(v, v, v)).collect();
        let g = CellGrid::from_cells(16, 16, cells).unwrap();
        let mut buf = Vec::new();
        encode(&g, &mut buf).unwrap();

        // Strip escapes and CRLFs: what remains is exactly the glyphs.
        let text = String::from_utf8(buf).unwrap();
        let glyphs: usize = text
            .split("\r\n")
            .map(|line| {
                line.split('\x1b')
                    .enumerate()
                    .map(|(i, part)| if i == 0 { part.len() } else { part.len() - part.find('m').unwrap() - 1 })
                    .sum::<usize>()
            })
            .sum();
        assert_eq!(glyphs, 256);
    }

    #[test]
    fn encode_is_deterministic() {
        let g = grid(3, 2, &[RED, BLUE, Rgb::WHITE, Rgb::BLACK, RED, RED]);
        assert_eq!(encoded(&g), encoded(&g));
    }

    #[test]
    fn empty_grid_encodes_nothing() {
        assert_eq!(encoded(&CellGrid::filled(0, 0, RED)), "");
    }

    #[test]
    fn writer_error_propagates() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let err = encode(&grid(1, 1, &[RED]), &mut Broken).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
