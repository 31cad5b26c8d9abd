// SPDX-License-Identifier: MIT
//
// tf-term — terminal presentation layer for termframe.
//
// Turns an engine's RGBA frames into full-color ASCII glyph art, and raw
// keyboard bytes into the press/release key events an engine expects.
//
// Frames flow one way:
//
//   Frame → scale (nearest neighbor to the cell grid)
//         → glyph (brightness ramp + run-length 24-bit color)
//         → one write to the terminal
//
// Keys flow the other:
//
//   stdin → reader thread → bounded queue → input::decode → EventSynthesizer
//
// The raw terminal only reports key *presses*. The synthesizer invents the
// matching releases from a dwell timer so the engine sees proper edges.
//
// Like the rest of termframe this talks to the terminal directly with
// escape sequences and termios; there is no TUI framework underneath.

pub mod ansi;
pub mod events;
pub mod glyph;
pub mod input;
pub mod reader;
pub mod render;
pub mod scale;
pub mod session;
pub mod terminal;
