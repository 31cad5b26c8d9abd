// SPDX-License-Identifier: MIT
//
// Key decoding — raw bytes to the engine's logical keys.
//
// The engine only understands a handful of keys: arrows, use, fire, enter,
// escape, tab, digits (weapon select) and y/n (prompts). So the decoder is
// small and deliberately lossy: anything it doesn't recognize decodes to
// nothing and is forgotten.
//
// # Escape sequences without waiting
//
// A lone ESC (0x1B) is ambiguous: the Escape key, or the start of a
// `CSI`/`SS3` sequence like `ESC [ A`. A terminal sends a sequence's bytes in
// one write, so by the time we see its ESC the rest is normally already
// queued. We take up to two more bytes *only if they are already there*,
// and decide with whatever we got. We never wait for a continuation byte:
// the decoder runs on the frame loop.
//
// The cost: if the continuation arrives a moment late, the ESC decodes as
// the Escape key and the `[` and letter bytes decode separately on later
// calls, to nothing. That is accepted.

use crate::reader::{ByteSource, Take};

/// Lead byte of every escape sequence.
const ESC: u8 = 0x1B;

/// Longest escape sequence we recognize (`ESC [ A`).
const MAX_SEQ: usize = 3;

// ─── Key ─────────────────────────────────────────────────────────────────────

/// A logical engine key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Open doors, flip switches (`space` or `F1`/`ESC O P`).
    Use,
    /// Attack (`,`).
    Fire,
    Enter,
    Escape,
    Tab,
    /// A literal key: `'0'..='9'`, `'y'` or `'n'` (always lowercase).
    Char(u8),
}

impl Key {
    /// The classic id-engine key code for this key.
    ///
    /// Arrow and action keys use the engine's private range above 0x80;
    /// everything else is its ASCII value.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Right => 0xAE,
            Self::Left => 0xAC,
            Self::Up => 0xAD,
            Self::Down => 0xAF,
            Self::Use => 0xA2,
            Self::Fire => 0xA3,
            Self::Enter => 13,
            Self::Escape => 27,
            Self::Tab => 9,
            Self::Char(c) => c,
        }
    }
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Result of one decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A recognized key went down.
    Key(Key),
    /// Nothing recognized: no bytes waiting, or bytes we don't map.
    Nothing,
    /// The byte source has closed; no key will ever decode again.
    Closed,
}

/// Decode at most one key from `src` without blocking.
///
/// Takes one byte; if it is ESC, greedily takes up to two more that are
/// already available. A close seen while collecting continuation bytes ends
/// the sequence early and is reported on the next call.
pub fn decode(src: &mut impl ByteSource) -> Decoded {
    let lead = match src.try_take() {
        Take::Byte(b) => b,
        Take::Empty => return Decoded::Nothing,
        Take::Closed => return Decoded::Closed,
    };

    let mut seq = [lead, 0, 0];
    let mut len = 1;
    if lead == ESC {
        while len < MAX_SEQ {
            match src.try_take() {
                Take::Byte(b) => {
                    seq[len] = b;
                    len += 1;
                }
                Take::Empty | Take::Closed => break,
            }
        }
    }

    map_sequence(&seq[..len]).map_or(Decoded::Nothing, Decoded::Key)
}

/// Map a complete byte sequence to a key.
#[must_use]
pub fn map_sequence(seq: &[u8]) -> Option<Key> {
    match seq {
        b"\x1b[A" => Some(Key::Up),
        b"\x1b[B" => Some(Key::Down),
        b"\x1b[C" => Some(Key::Right),
        b"\x1b[D" => Some(Key::Left),
        b"\x1bOP" | b" " => Some(Key::Use),
        b"\r" | b"\n" => Some(Key::Enter),
        b"\x1b" => Some(Key::Escape),
        b"\t" => Some(Key::Tab),
        b"," => Some(Key::Fire),
        &[d @ b'0'..=b'9'] => Some(Key::Char(d)),
        &[c @ (b'y' | b'n' | b'Y' | b'N')] => Some(Key::Char(c.to_ascii_lowercase())),
        _ => None,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// Helper: a source holding exactly `bytes`.
    fn src(bytes: &[u8]) -> VecDeque<u8> {
        bytes.iter().copied().collect()
    }

    /// Helper: decode everything in `bytes`, collecting only the keys.
    fn decode_all(bytes: &[u8]) -> Vec<Key> {
        let mut s = src(bytes);
        let mut keys = Vec::new();
        while !s.is_empty() {
            if let Decoded::Key(k) = decode(&mut s) {
                keys.push(k);
            }
        }
        keys
    }

    /// Source that yields its bytes, then reports closed forever.
    struct Closing(VecDeque<u8>);
    impl ByteSource for Closing {
        fn try_take(&mut self) -> Take {
            self.0.pop_front().map_or(Take::Closed, Take::Byte)
        }
    }

    // ── Arrows + SS3 ────────────────────────────────────────────────────

    #[test]
    fn arrow_up() {
        let mut s = src(b"\x1b[A");
        assert_eq!(decode(&mut s), Decoded::Key(Key::Up));
        assert!(s.is_empty());
    }

    #[test]
    fn all_arrows() {
        assert_eq!(
            decode_all(b"\x1b[A\x1b[B\x1b[C\x1b[D"),
            vec![Key::Up, Key::Down, Key::Right, Key::Left]
        );
    }

    #[test]
    fn ss3_f1_is_use() {
        assert_eq!(decode(&mut src(b"\x1bOP")), Decoded::Key(Key::Use));
    }

    #[test]
    fn escape_takes_at_most_three_bytes() {
        let mut s = src(b"\x1b[Ay");
        assert_eq!(decode(&mut s), Decoded::Key(Key::Up));
        assert_eq!(decode(&mut s), Decoded::Key(Key::Char(b'y')));
    }

    // ── Lone / short escapes ────────────────────────────────────────────

    #[test]
    fn lone_escape_is_escape_key() {
        let mut s = src(b"\x1b");
        assert_eq!(decode(&mut s), Decoded::Key(Key::Escape));
        assert_eq!(decode(&mut s), Decoded::Nothing);
    }

    #[test]
    fn two_byte_escape_is_nothing() {
        // `ESC [` with the final byte not yet arrived: short sequence, unmapped.
        let mut s = src(b"\x1b[");
        assert_eq!(decode(&mut s), Decoded::Nothing);
        assert!(s.is_empty());
    }

    #[test]
    fn alt_letter_is_nothing() {
        assert_eq!(decode(&mut src(b"\x1bx")), Decoded::Nothing);
    }

    #[test]
    fn unknown_csi_is_nothing() {
        let mut s = src(b"\x1b[Z");
        assert_eq!(decode(&mut s), Decoded::Nothing);
        assert!(s.is_empty(), "whole sequence consumed");
    }

    #[test]
    fn late_continuation_decodes_separately() {
        let mut s = src(b"\x1b");
        assert_eq!(decode(&mut s), Decoded::Key(Key::Escape));
        s.extend(b"[A");
        assert_eq!(decode(&mut s), Decoded::Nothing); // '['
        assert_eq!(decode(&mut s), Decoded::Nothing); // 'A'
    }

    // ── Single bytes ────────────────────────────────────────────────────

    #[test]
    fn space_is_use() {
        assert_eq!(decode(&mut src(b" ")), Decoded::Key(Key::Use));
    }

    #[test]
    fn cr_and_lf_are_enter() {
        assert_eq!(decode_all(b"\r\n"), vec![Key::Enter, Key::Enter]);
    }

    #[test]
    fn tab_and_comma() {
        assert_eq!(decode_all(b"\t,"), vec![Key::Tab, Key::Fire]);
    }

    #[test]
    fn digits_are_literal() {
        let keys = decode_all(b"0123456789");
        let expected: Vec<Key> = (b'0'..=b'9').map(Key::Char).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn yes_no_fold_to_lowercase() {
        assert_eq!(
            decode_all(b"yYnN"),
            vec![
                Key::Char(b'y'),
                Key::Char(b'y'),
                Key::Char(b'n'),
                Key::Char(b'n')
            ]
        );
    }

    #[test]
    fn other_letters_are_nothing() {
        for b in b"abxzAQ~[".iter().copied() {
            assert_eq!(decode(&mut src(&[b])), Decoded::Nothing, "byte {b:?}");
        }
    }

    #[test]
    fn high_bytes_are_nothing() {
        assert_eq!(decode(&mut src(&[0xC3])), Decoded::Nothing);
    }

    // ── Source state ────────────────────────────────────────────────────

    #[test]
    fn empty_source_is_nothing() {
        assert_eq!(decode(&mut src(b"")), Decoded::Nothing);
    }

    #[test]
    fn closed_source_is_closed() {
        assert_eq!(decode(&mut Closing(VecDeque::new())), Decoded::Closed);
    }

    #[test]
    fn escape_before_close_still_decodes() {
        let mut s = Closing(src(b"\x1b"));
        assert_eq!(decode(&mut s), Decoded::Key(Key::Escape));
        assert_eq!(decode(&mut s), Decoded::Closed);
    }

    // ── Key codes ───────────────────────────────────────────────────────

    #[test]
    fn engine_key_codes() {
        assert_eq!(Key::Right.code(), 0xAE);
        assert_eq!(Key::Left.code(), 0xAC);
        assert_eq!(Key::Up.code(), 0xAD);
        assert_eq!(Key::Down.code(), 0xAF);
        assert_eq!(Key::Use.code(), 0xA2);
        assert_eq!(Key::Fire.code(), 0xA3);
        assert_eq!(Key::Enter.code(), 13);
        assert_eq!(Key::Escape.code(), 27);
        assert_eq!(Key::Tab.code(), 9);
        assert_eq!(Key::Char(b'7').code(), b'7');
        assert_eq!(Key::Char(b'y').code(), b'y');
    }

    #[test]
    fn map_sequence_rejects_empty() {
        assert_eq!(map_sequence(b""), None);
    }
}
