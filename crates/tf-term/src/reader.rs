// SPDX-License-Identifier: MIT
//
// Background byte reader — raw keyboard bytes without blocking the loop.
//
// A dedicated thread reads the input device in blocking mode and pushes
// each byte into a bounded channel. The engine loop takes bytes out with
// `try_recv`, which never waits.
//
// Why a dedicated thread? Because `read()` on a raw-mode stdin blocks until
// a key arrives, and the engine loop has frames to draw at a fixed rate.
// Nobody types at 35 keys per tick; the loop must not care.
//
// The channel holds 128 bytes. When it is full the reader blocks in `send`,
// which stops it calling `read()`, which leaves the rest in the kernel's
// tty buffer. Nothing is dropped. When the device hits EOF or errors, the
// thread exits, the sender drops, and the loop sees `Closed` from then on.
//
// There is no stop flag. A thread parked in `read()` on stdin can't be
// interrupted portably; it dies with the process.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::thread;

use log::debug;

/// Capacity of the byte channel between reader thread and loop.
pub const QUEUE_CAPACITY: usize = 128;

/// Size of a single `read()` call.
///
/// A keypress is 1-3 bytes; a held key repeats at ~30 Hz. Small reads keep
/// the reader from hoarding bytes it can't enqueue yet.
const READ_BUF_SIZE: usize = 64;

/// Outcome of a non-blocking take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Take {
    /// A byte was waiting.
    Byte(u8),
    /// Nothing available right now; the source is still open.
    Empty,
    /// The source has ended and every byte has been taken.
    Closed,
}

/// A source of raw input bytes that can be polled without blocking.
pub trait ByteSource {
    /// Take the next byte if one is available. Never blocks.
    fn try_take(&mut self) -> Take;
}

/// An in-memory source. Reports [`Take::Empty`] when drained, never closes.
impl ByteSource for VecDeque<u8> {
    fn try_take(&mut self) -> Take {
        self.pop_front().map_or(Take::Empty, Take::Byte)
    }
}

// ─── ByteReader ──────────────────────────────────────────────────────────────

/// The loop-side handle of a background reader thread.
///
/// # Example
///
/// ```no_run
/// use tf_term::reader::{ByteReader, ByteSource, Take};
///
/// let mut keys = ByteReader::stdin();
/// match keys.try_take() {
///     Take::Byte(b) => println!("got {b:#04x}"),
///     Take::Empty => {}
///     Take::Closed => println!("stdin closed"),
/// }
/// ```
pub struct ByteReader {
    rx: Receiver<u8>,
}

impl ByteReader {
    /// Spawn a reader thread on `source`.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a new thread (extremely rare).
    #[must_use]
    pub fn spawn<R>(source: R) -> Self
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(QUEUE_CAPACITY);

        thread::Builder::new()
            .name("key-reader".into())
            .spawn(move || reader_loop(source, &tx))
            .expect("failed to spawn key reader thread");

        Self { rx }
    }

    /// Spawn a reader thread on the process's stdin.
    #[must_use]
    pub fn stdin() -> Self {
        Self::spawn(io::stdin())
    }
}

impl ByteSource for ByteReader {
    fn try_take(&mut self) -> Take {
        match self.rx.try_recv() {
            Ok(b) => Take::Byte(b),
            Err(TryRecvError::Empty) => Take::Empty,
            Err(TryRecvError::Disconnected) => Take::Closed,
        }
    }
}

/// Blocking read loop. Returns on EOF, read error, or a dropped receiver.
fn reader_loop<R: Read>(mut source: R, tx: &SyncSender<u8>) {
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => {
                debug!("key reader: end of input");
                return;
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("key reader: read failed: {e}");
                return;
            }
        };

        for &b in &buf[..n] {
            if tx.send(b).is_err() {
                // Receiver dropped, nobody's listening.
                return;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
