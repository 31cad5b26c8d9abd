// SPDX-License-Identifier: MIT
//
// Frame rendering — the engine's frame callback.
//
// Each frame: ask the terminal how big it is, scale the engine's pixels to
// that grid, encode glyphs and colors into one in-memory buffer, then hand
// the whole buffer to the sink in a single write. The buffer keeps its
// allocation between frames; a 200×60 terminal produces a few hundred KB
// per frame in the worst case and we don't want to regrow that 35 times a
// second.
//
// Every frame is a full redraw from the home position. There is no diffing:
// engine frames change almost everywhere every tick anyway.
//
// Sink failures are swallowed. A display that can't be written this frame
// (terminal closed, `EAGAIN` on a non-blocking tty) is cosmetic; the engine
// keeps running and the next frame tries again.

use std::io::{self, Write};

use log::{debug, warn};

use crate::ansi;
use crate::glyph;
use crate::scale::{self, Frame};
use crate::terminal::{self, Size};

/// Starting capacity of the frame buffer (64 KB).
const DEFAULT_CAPACITY: usize = 65_536;

/// Receiver of rendered frames.
pub trait FrameConsumer {
    /// Draw one complete frame.
    fn draw_frame(&mut self, frame: &Frame<'_>);

    /// Set the window title. Default: ignored.
    fn set_title(&mut self, _title: &str) {}
}

/// Terminal size provider, swappable for tests.
pub type SizeQuery = fn() -> Option<Size>;

/// Glyph-art renderer writing to `W` (stdout in production).
pub struct TerminalRenderer<W: Write> {
    out: W,
    buf: Vec<u8>,
    query_size: SizeQuery,
    frames: u64,
    failed_writes: u64,
}

impl TerminalRenderer<io::Stdout> {
    /// Renderer on stdout, sized by `ioctl(TIOCGWINSZ)`.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout(), terminal::get_size)
    }
}

impl<W: Write> TerminalRenderer<W> {
    #[must_use]
    pub fn new(out: W, query_size: SizeQuery) -> Self {
        Self {
            out,
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
            query_size,
            frames: 0,
            failed_writes: 0,
        }
    }

    /// Frames drawn so far, including ones whose write failed.
    #[inline]
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames or titles whose write to the sink failed.
    #[inline]
    #[must_use]
    pub const fn failed_writes(&self) -> u64 {
        self.failed_writes
    }

    /// The sink. Useful to inspect output in tests.
    #[inline]
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// Encode `frame` for a terminal of `queried` size into the buffer.
    fn encode_frame(&mut self, frame: &Frame<'_>, queried: Option<Size>) {
        let grid = scale::scale(frame, scale::grid_size(queried));
        self.buf.clear();
        // Writes into a Vec can't fail.
        let _ = ansi::cursor_home(&mut self.buf);
        let _ = glyph::encode(&grid, &mut self.buf);
    }

    /// Write the buffer to the sink, counting and logging failures.
    fn flush_buf(&mut self) {
        let result = self
            .out
            .write_all(&self.buf)
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            self.failed_writes += 1;
            // First failure is worth a warning; a dead terminal would
            // otherwise flood the log at frame rate.
            if self.failed_writes == 1 {
                warn!("display write failed: {e}");
            } else {
                debug!("display write failed ({} total): {e}", self.failed_writes);
            }
        }
    }
}

impl<W: Write> FrameConsumer for TerminalRenderer<W> {
    fn draw_frame(&mut self, frame: &Frame<'_>) {
        let queried = (self.query_size)();
        self.encode_frame(frame, queried);
        self.frames += 1;
        self.flush_buf();
    }

    fn set_title(&mut self, title: &str) {
        self.buf.clear();
        let _ = ansi::set_title(&mut self.buf, title);
        self.flush_buf();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
