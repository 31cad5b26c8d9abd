// SPDX-License-Identifier: MIT
//
// Plasma — the built-in demo engine.
//
// A stand-in for a real game engine: it owns a fixed-resolution RGBA
// framebuffer, reads key edges once per tick, and hands a finished frame to
// the terminal every tick. It exercises every path of the presentation
// layer: smooth gradients (glyph ramp), long color runs (escape
// compression), held keys (synthesized releases).
//
// Controls:
//
//   arrows      move the marker while held
//   , / space   flash the marker while held
//   1-9         plasma speed
//   Esc         quit
//
// Engine arguments (everything after the frontend's own flags):
//
//   --size WxH  source framebuffer resolution (default 320x200)

use std::collections::BTreeSet;

use log::{debug, info, warn};

use tf_term::events::{EventSource, KeyEventKind};
use tf_term::input::Key;
use tf_term::render::FrameConsumer;
use tf_term::scale::Frame;
use tf_term::session::{Action, Engine};

/// Default source resolution, the classic 320×200.
const DEFAULT_WIDTH: usize = 320;
const DEFAULT_HEIGHT: usize = 200;

/// Largest accepted `--size` in either dimension.
const MAX_DIM: usize = 4096;

/// Marker travel per tick while an arrow is held, as a fraction of width.
const MARKER_STEP_DIVISOR: usize = 80;

// ─── Options ─────────────────────────────────────────────────────────────────

/// Options parsed from the engine's argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoOptions {
    pub width: usize,
    pub height: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl DemoOptions {
    /// Parse engine arguments. Unknown or malformed arguments are logged and
    /// skipped; an engine shouldn't refuse to start over a bad flag.
    #[must_use]
    pub fn from_args(args: &[String]) -> Self {
        let mut opts = Self::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--size" => match iter.next().and_then(|v| parse_size(v)) {
                    Some((w, h)) => {
                        opts.width = w;
                        opts.height = h;
                    }
                    None => warn!("--size expects WxH (1..={MAX_DIM}), keeping default"),
                },
                other => warn!("ignoring unknown engine argument {other:?}"),
            }
        }

        opts
    }
}

/// Parse `WxH`, e.g. `640x400`.
fn parse_size(s: &str) -> Option<(usize, usize)> {
    let (w, h) = s.split_once(['x', 'X'])?;
    let w: usize = w.trim().parse().ok()?;
    let h: usize = h.trim().parse().ok()?;
    ((1..=MAX_DIM).contains(&w) && (1..=MAX_DIM).contains(&h)).then_some((w, h))
}

// ─── Plasma ──────────────────────────────────────────────────────────────────

/// The demo engine.
pub struct Plasma {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    /// Animation phase, advanced `speed` steps per tick.
    phase: u32,
    speed: u32,
    marker_x: usize,
    marker_y: usize,
    /// Keys currently down, as reported by the event source.
    held: BTreeSet<Key>,
    /// Held count shown in the title last time, to avoid title spam.
    shown_held: Option<usize>,
}

impl Plasma {
    #[must_use]
    pub fn new(opts: DemoOptions) -> Self {
        info!("plasma demo at {}x{}", opts.width, opts.height);
        Self {
            width: opts.width,
            height: opts.height,
            pixels: vec![0; opts.width * opts.height * 4],
            phase: 0,
            speed: 3,
            marker_x: opts.width / 2,
            marker_y: opts.height / 2,
            held: BTreeSet::new(),
            shown_held: None,
        }
    }

    #[must_use]
    pub const fn marker(&self) -> (usize, usize) {
        (self.marker_x, self.marker_y)
    }

    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Apply all pending key edges. Returns `Quit` on Escape.
    fn handle_input(&mut self, events: &mut dyn EventSource) -> Action {
        while let Some(ev) = events.next_event() {
            debug!("{:?} {:?} (code {:#04x})", ev.kind, ev.key, ev.key.code());
            match ev.kind {
                KeyEventKind::Down => {
                    self.held.insert(ev.key);
                    match ev.key {
                        Key::Escape => return Action::Quit,
                        Key::Char(d @ b'1'..=b'9') => self.speed = u32::from(d - b'0'),
                        _ => {}
                    }
                }
                KeyEventKind::Up => {
                    self.held.remove(&ev.key);
                }
            }
        }
        Action::Continue
    }

    /// Move the marker for every held arrow, clamped to the frame.
    fn move_marker(&mut self) {
        let step = (self.width / MARKER_STEP_DIVISOR).max(1);
        if self.held.contains(&Key::Left) {
            self.marker_x = self.marker_x.saturating_sub(step);
        }
        if self.held.contains(&Key::Right) {
            self.marker_x = (self.marker_x + step).min(self.width - 1);
        }
        if self.held.contains(&Key::Up) {
            self.marker_y = self.marker_y.saturating_sub(step);
        }
        if self.held.contains(&Key::Down) {
            self.marker_y = (self.marker_y + step).min(self.height - 1);
        }
    }

    /// Paint the plasma field and the marker into the framebuffer.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn paint(&mut self) {
        let t = self.phase as f32 * 0.02;
        let sx = 320.0 / self.width as f32;
        let sy = 200.0 / self.height as f32;

        for y in 0..self.height {
            let fy = y as f32 * sy;
            for x in 0..self.width {
                let fx = x as f32 * sx;
                let v = (fx * 0.06 + t).sin()
                    + (fy * 0.08 + t * 1.3).sin()
                    + ((fx + fy) * 0.04 + t * 0.7).sin();
                // v ∈ [-3, 3] → three phase-shifted channels.
                let channel = |offset: f32| ((v * 1.2 + offset).sin() * 127.5 + 127.5) as u8;
                let o = (y * self.width + x) * 4;
                self.pixels[o..o + 4].copy_from_slice(&[channel(0.0), channel(2.1), channel(4.2), 255]);
            }
        }

        let flash = self.held.contains(&Key::Fire) || self.held.contains(&Key::Use);
        let color: [u8; 4] = if flash { [255, 255, 255, 255] } else { [0, 0, 0, 255] };
        let half = (self.width / 40).max(1);
        let x0 = self.marker_x.saturating_sub(half);
        let x1 = (self.marker_x + half).min(self.width - 1);
        let y0 = self.marker_y.saturating_sub(half);
        let y1 = (self.marker_y + half).min(self.height - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let o = (y * self.width + x) * 4;
                self.pixels[o..o + 4].copy_from_slice(&color);
            }
        }
    }

    fn update_title(&mut self, frames: &mut dyn FrameConsumer) {
        let n = self.held.len();
        if self.shown_held != Some(n) {
            frames.set_title(&format!("termframe plasma [{n} held, speed {}]", self.speed));
            self.shown_held = Some(n);
        }
    }
}

impl Engine for Plasma {
    fn tick(&mut self, frames: &mut dyn FrameConsumer, events: &mut dyn EventSource) -> Action {
        if self.handle_input(events) == Action::Quit {
            info!("escape pressed, quitting");
            return Action::Quit;
        }

        self.move_marker();
        self.phase = self.phase.wrapping_add(self.speed);
        self.paint();
        self.update_title(frames);

        match Frame::from_rgba(self.width, self.height, &self.pixels) {
            Ok(frame) => frames.draw_frame(&frame),
            Err(e) => warn!("skipping frame: {e}"),
        }
        Action::Continue
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
