/// ANSI escape code stripping
///
/// Service logs written by programs that colourise their terminal output keep
/// the escape sequences on disk. They are removed before format detection so
/// that a coloured `ERROR` tag or a leading `{` is still recognised.

use std::borrow::Cow;

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Strip ANSI escape codes from a line
///
/// Handles:
/// - CSI sequences: `ESC [ ... final` (colours, cursor movement)
/// - OSC sequences: `ESC ] ... BEL` or `ESC ] ... ESC \` (hyperlinks, titles)
/// - Two-character Fe sequences: `ESC 0x40..=0x5F`
///
/// Returns `Cow::Borrowed` when the line has no escape byte.
pub fn strip_ansi_codes(input: &str) -> Cow<'_, str> {
    if !input.contains(ESC) {
        return Cow::Borrowed(input);
    }

    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != ESC {
            output.push(c);
            continue;
        }

        match chars.peek().copied() {
            // Lone trailing ESC
            None => break,
            Some('[') => {
                chars.next();
                for b in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&b) {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(b) = chars.next() {
                    if b == BEL {
                        break;
                    }
                    if b == ESC && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            Some(next) if ('\x40'..='\x5f').contains(&next) => {
                chars.next();
            }
            // Not a sequence we know; drop just the ESC
            Some(_) => {}
        }
    }

    Cow::Owned(output)
}
