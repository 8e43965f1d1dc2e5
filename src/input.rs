// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! A line-based pad controller for terminals.
//!
//! Translates `press X Y` / `release X Y` lines on stdin into pad events.
//! This is a stand-in for a hardware grid; the instrument only ever sees
//! [`PadEvent`]s, whatever the transport.

use std::io::BufRead;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::warn;

use crate::grid::{Pad, PadEvent};
use crate::playsync::CancelHandle;

/// One parsed controller line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Press(Pad),
    Release(Pad),
    Quit,
}

/// Parses a controller line. Returns None for blank and malformed lines.
pub fn parse_line(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;

    if verb.eq_ignore_ascii_case("quit") || verb.eq_ignore_ascii_case("exit") {
        return Some(Command::Quit);
    }

    let x: u8 = parts.next()?.parse().ok()?;
    let y: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let pad = Pad::new(x, y);
    if verb.eq_ignore_ascii_case("press") {
        Some(Command::Press(pad))
    } else if verb.eq_ignore_ascii_case("release") {
        Some(Command::Release(pad))
    } else {
        None
    }
}

fn forward_lines(
    reader: impl BufRead,
    sender: &Sender<PadEvent>,
    cancel_handle: &CancelHandle,
) {
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Some(Command::Press(pad)) => {
                if sender.send(PadEvent::press(pad)).is_err() {
                    break;
                }
            }
            Some(Command::Release(pad)) => {
                if sender.send(PadEvent::release(pad)).is_err() {
                    break;
                }
            }
            Some(Command::Quit) => {
                cancel_handle.cancel();
                break;
            }
            None => warn!(line, "Unrecognized controller line"),
        }
    }
}

/// Spawns a thread reading controller lines from stdin. The returned channel
/// closes when stdin does; a `quit` line also cancels the handle.
pub fn spawn_stdin_controller(cancel_handle: CancelHandle) -> Receiver<PadEvent> {
    let (sender, receiver) = unbounded();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        forward_lines(stdin.lock(), &sender, &cancel_handle);
    });
    receiver
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_press_and_release() {
        assert_eq!(parse_line("press 2 3"), Some(Command::Press(Pad::new(2, 3))));
        assert_eq!(
            parse_line("release 0 7"),
            Some(Command::Release(Pad::new(0, 7)))
        );
        assert_eq!(parse_line("  PRESS 1 1  "), Some(Command::Press(Pad::new(1, 1))));
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_line("quit"), Some(Command::Quit));
        assert_eq!(parse_line("exit"), Some(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_line("press"), None);
        assert_eq!(parse_line("press x y"), None);
        assert_eq!(parse_line("press 1"), None);
        assert_eq!(parse_line("press 1 2 3"), None);
        assert_eq!(parse_line("poke 1 2"), None);
        assert_eq!(parse_line("press 300 1"), None);
    }

    #[test]
    fn test_forward_lines() {
        let input = "press 1 2\nrelease 1 2\nnonsense\nquit\npress 9 9\n";
        let (sender, receiver) = unbounded();
        let cancel_handle = CancelHandle::new();

        forward_lines(input.as_bytes(), &sender, &cancel_handle);
        drop(sender);

        let events: Vec<PadEvent> = receiver.iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].pad, Pad::new(1, 2));
        assert!(events[0].pressed);
        assert!(!events[1].pressed);
        // quit stops reading before the trailing press.
        assert!(cancel_handle.is_cancelled());
    }
}
