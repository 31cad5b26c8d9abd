// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; that's the glyph encoder's job. This
// module just knows the byte-level encoding of every terminal command a
// full-frame glyph renderer needs.
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to the renderer's frame buffer (a Vec).
use std::io::{self, Write};

use crate::scale::Rgb;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to the top-left cell (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Carriage return + line feed.
///
/// Raw mode disables `OPOST`, so a bare `\n` would only move down a line
/// without returning to column 0.
#[inline]
pub fn crlf(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\r\n")
}

// ─── Foreground Color ────────────────────────────────────────────────────────

/// Set the foreground (glyph) color as 24-bit `TrueColor`.
#[inline]
pub fn fg_rgb(w: &mut impl Write, color: Rgb) -> io::Result<()> {
    let Rgb { r, g, b } = color;
    write!(w, "\x1b[38;2;{r};{g};{b}m")
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Opening bracket for a rendering session: clear, home, hide cursor.
pub fn begin_session(w: &mut impl Write) -> io::Result<()> {
    clear_screen(w)?;
    cursor_home(w)?;
    cursor_hide(w)
}

/// Closing bracket for a rendering session: reset, clear, home, show cursor.
///
/// Leaves the terminal as a shell expects it: default colors, empty
/// screen, visible cursor in the top-left corner.
pub fn end_session(w: &mut impl Write) -> io::Result<()> {
    reset(w)?;
    clear_screen(w)?;
    cursor_home(w)?;
    cursor_show(w)
}

// ─── Window Title ────────────────────────────────────────────────────────────

/// Set the terminal window title (OSC 0, BEL-terminated).
///
/// Control characters in `title` are dropped so a hostile or sloppy title
/// cannot terminate the OSC early and inject escape sequences.
pub fn set_title(w: &mut impl Write, title: &str) -> io::Result<()> {
    w.write_all(b"\x1b]0;")?;
    for ch in title.chars().filter(|c| !c.is_control()) {
        let mut enc = [0u8; 4];
        w.write_all(ch.encode_utf8(&mut enc).as_bytes())?;
    }
    w.write_all(b"\x07")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
