// SPDX-License-Identifier: MIT
//
// Session — the fixed-rate loop that hosts an engine in the terminal.
//
// The engine is the one driving: each tick it polls input and, when it has
// a new picture, hands over a frame. We only supply the two capabilities it
// needs, a `FrameConsumer` and an `EventSource`, and the clock that calls
// `tick` at a steady rate.
//
// # Timing
//
// The classic engines run their game logic at 35 Hz, so that's our default
// tick. The loop sleeps until the next tick deadline rather than a fixed
// interval, so a slow frame doesn't push every later frame back. If we fall
// more than a tick behind we drop the backlog instead of spinning to catch
// up.
//
// Input never blocks: the byte reader runs on its own thread, and the
// synthesizer polls it with `try_recv`.
//
// # Shutdown
//
// Only the engine ends the session, by returning `Action::Quit`. Closed
// stdin just means no more key events; the engine keeps ticking. The
// terminal is restored on every path out, including errors (and panics,
// via the terminal's hook).

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::events::{DEFAULT_DWELL, EventSource, EventSynthesizer};
use crate::reader::{ByteReader, ByteSource};
use crate::render::{FrameConsumer, TerminalRenderer};
use crate::terminal::Terminal;

/// What the engine tells the session to do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep running.
    Continue,
    /// Leave the loop and restore the terminal.
    Quit,
}

/// An application driven by the session loop.
pub trait Engine {
    /// Run one tick of the engine.
    ///
    /// Poll `events` as often as wanted (each call yields zero or one key
    /// event) and draw into `frames` when a new picture is ready.
    fn tick(&mut self, frames: &mut dyn FrameConsumer, events: &mut dyn EventSource) -> Action;
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Session timing and presentation settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time between engine ticks.
    pub tick_interval: Duration,
    /// How long a key stays down after its last press signal.
    pub dwell: Duration,
    /// Initial window title. `None` leaves the title alone.
    pub title: Option<String>,
}

impl SessionConfig {
    /// Tick interval for a rate in Hz. Zero is treated as 1 Hz.
    #[must_use]
    pub fn interval_for_hz(hz: u32) -> Duration {
        Duration::from_secs(1) / hz.max(1)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Self::interval_for_hz(35),
            dwell: DEFAULT_DWELL,
            title: None,
        }
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Hosts an [`Engine`] in the terminal.
///
/// # Example
///
/// ```no_run
/// use tf_term::events::EventSource;
/// use tf_term::render::FrameConsumer;
/// use tf_term::session::{Action, Engine, Session, SessionConfig};
///
/// struct Idle;
///
/// impl Engine for Idle {
///     fn tick(&mut self, _: &mut dyn FrameConsumer, events: &mut dyn EventSource) -> Action {
///         while events.next_event().is_some() {}
///         Action::Continue
///     }
/// }
///
/// Session::new(SessionConfig::default()).run(&mut Idle)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Session {
    config: SessionConfig,
}

impl Session {
    #[must_use]
    pub const fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run `engine` on the real terminal until it quits.
    ///
    /// Enters raw mode, clears the screen and hides the cursor, spawns the
    /// stdin reader, and ticks. The terminal is restored before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be put into or taken out of
    /// raw mode. Frame write failures are not errors.
    pub fn run(&self, engine: &mut impl Engine) -> io::Result<()> {
        let mut terminal = Terminal::new();
        terminal.enter()?;

        let mut renderer = TerminalRenderer::stdout();
        let mut events = EventSynthesizer::with_dwell(ByteReader::stdin(), self.config.dwell);

        self.drive(engine, &mut renderer, &mut events);

        terminal.leave()
    }

    /// The tick loop, independent of the real terminal.
    ///
    /// Returns when the engine quits. Input closing is logged once and
    /// otherwise ignored.
    pub fn drive<S: ByteSource>(
        &self,
        engine: &mut impl Engine,
        frames: &mut dyn FrameConsumer,
        events: &mut EventSynthesizer<S>,
    ) {
        if let Some(title) = &self.config.title {
            frames.set_title(title);
        }

        let interval = self.config.tick_interval;
        let mut next = Instant::now();
        let mut ticks: u64 = 0;
        let mut saw_close = false;

        loop {
            if engine.tick(frames, events) == Action::Quit {
                info!("engine quit after {ticks} ticks");
                return;
            }
            ticks += 1;

            if !saw_close && events.is_closed() {
                saw_close = true;
                info!("input closed after {ticks} ticks, engine keeps running");
            }

            next += interval;
            let now = Instant::now();
            if next > now {
                thread::sleep(next - now);
            } else if now - next > interval {
                debug!("tick {ticks} overran by {:?}, resyncing", now - next);
                next = now;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
