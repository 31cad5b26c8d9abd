// SPDX-License-Identifier: MIT
//
// Key event synthesis — press/release pairs from a press-only stream.
//
// A terminal in raw mode only tells us a key went down. It never says when
// it came up; holding a key just repeats the down bytes at the keyboard's
// repeat rate. The engine wants both edges: it sets "moving forward" on
// key-down and clears it on key-up.
//
// So we fake the release. Every decoded key records the time it last went
// down. When a key has not been re-pressed for the dwell time (60 ms), we
// report it released. A held key keeps refreshing its timestamp and stays
// down; a tapped key comes back up one dwell later.
//
// Each poll returns at most one event, releases first. The clock is a
// parameter (`poll_at`) so the dwell logic is testable without sleeping.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::{info, trace};

use crate::input::{self, Decoded, Key};
use crate::reader::ByteSource;

/// Default time a key stays down after its last press signal.
pub const DEFAULT_DWELL: Duration = Duration::from_millis(60);

/// Edge of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// One discrete key edge delivered to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: Key,
}

impl KeyEvent {
    #[must_use]
    pub const fn down(key: Key) -> Self {
        Self {
            kind: KeyEventKind::Down,
            key,
        }
    }

    #[must_use]
    pub const fn up(key: Key) -> Self {
        Self {
            kind: KeyEventKind::Up,
            key,
        }
    }
}

/// Pollable source of key events, one at a time.
///
/// The engine calls [`next_event`](EventSource::next_event) once per loop
/// iteration; `None` means nothing happened since the last call.
pub trait EventSource {
    fn next_event(&mut self) -> Option<KeyEvent>;
}

// ─── EventSynthesizer ────────────────────────────────────────────────────────

/// Turns decoded key presses into down/up event pairs.
///
/// Owns the byte source and the held-key table. All state lives here and
/// is only touched by the loop that polls it.
pub struct EventSynthesizer<S> {
    source: S,
    /// Key → time of its most recent down signal. One entry per key.
    held: BTreeMap<Key, Instant>,
    dwell: Duration,
    /// Set once the source reports closed; we never decode after that.
    closed: bool,
}

impl<S: ByteSource> EventSynthesizer<S> {
    /// Synthesizer with the default 60 ms dwell.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self::with_dwell(source, DEFAULT_DWELL)
    }

    #[must_use]
    pub const fn with_dwell(source: S, dwell: Duration) -> Self {
        Self {
            source,
            held: BTreeMap::new(),
            dwell,
            closed: false,
        }
    }

    /// Number of keys currently considered down.
    #[inline]
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Whether `key` is currently considered down.
    #[inline]
    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains_key(&key)
    }

    /// Whether the byte source has closed.
    ///
    /// Held keys are still released after a close; once this is `true`
    /// and [`held_count`](Self::held_count) is zero, no event will ever
    /// be produced again.
    #[inline]
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Poll using the current time.
    pub fn poll(&mut self) -> Option<KeyEvent> {
        self.poll_at(Instant::now())
    }

    /// Poll as if the current time were `now`.
    ///
    /// 1. If a held key's last press is at least one dwell old, release it.
    ///    With several eligible, the oldest goes first (ties: key order).
    /// 2. Otherwise decode one key; on success record it as held at `now`
    ///    and report it down.
    /// 3. Otherwise, nothing.
    pub fn poll_at(&mut self, now: Instant) -> Option<KeyEvent> {
        if let Some(key) = self.expired(now) {
            self.held.remove(&key);
            trace!("key up {key:?}");
            return Some(KeyEvent::up(key));
        }

        if self.closed {
            return None;
        }

        match input::decode(&mut self.source) {
            Decoded::Key(key) => {
                // Insert or refresh: a repeat press extends the hold.
                self.held.insert(key, now);
                trace!("key down {key:?}");
                Some(KeyEvent::down(key))
            }
            Decoded::Nothing => None,
            Decoded::Closed => {
                info!("key input closed, {} key(s) still held", self.held.len());
                self.closed = true;
                None
            }
        }
    }

    /// The held key most overdue for release at `now`, if any.
    fn expired(&self, now: Instant) -> Option<Key> {
        self.held
            .iter()
            .filter(|&(_, &at)| now.saturating_duration_since(at) >= self.dwell)
            .min_by_key(|&(&key, &at)| (at, key))
            .map(|(&key, _)| key)
    }
}

impl<S: ByteSource> EventSource for EventSynthesizer<S> {
    fn next_event(&mut self) -> Option<KeyEvent> {
        self.poll()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
