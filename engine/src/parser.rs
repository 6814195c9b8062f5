//! Pulls `<x> <y> <color>` out of free-form message text.
//!
//! Matching is split from number conversion: `match_command` only finds the
//! syntactic pattern, `CommandMatch::into_command` then rejects coordinates
//! that aren't safe integers.

use std::ops::Range;

use structures::PlacementCommand;

use crate::constants::is_safe_integer;

/// The three captures of the first `[0-9]+ [0-9]+ [a-z]+` in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    pub x: String,
    pub y: String,
    pub color_token: String,
}

impl CommandMatch {
    /// Converts the digit captures. Anything beyond 2^53 - 1 is rejected.
    pub fn into_command(self, author: &str) -> Option<PlacementCommand> {
        Some(PlacementCommand {
            x: parse_coordinate(&self.x)?,
            y: parse_coordinate(&self.y)?,
            color_token: self.color_token,
            author: author.to_string(),
        })
    }
}

/// Lowercases the text and returns the leftmost match. Everything after it is
/// ignored, one command per message.
pub fn match_command(text: &str) -> Option<CommandMatch> {
    let text = text.to_lowercase();
    let bytes = text.as_bytes();

    let mut start = 0;
    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() {
            start += 1;
            continue;
        }

        if let Some((x, y, color)) = match_at(bytes, start) {
            return Some(CommandMatch {
                x: text[x].to_string(),
                y: text[y].to_string(),
                color_token: text[color].to_string(),
            });
        }

        // Any later start inside this digit run ends at the same place and fails the same way
        start = run(bytes, start, u8::is_ascii_digit).map_or(start + 1, |digits| digits.end);
    }

    None
}

/// `None` means no match, including coordinates that aren't safe integers.
pub fn parse(text: &str, author: &str) -> Option<PlacementCommand> {
    match_command(text)?.into_command(author)
}

fn match_at(bytes: &[u8], start: usize) -> Option<(Range<usize>, Range<usize>, Range<usize>)> {
    let x = run(bytes, start, u8::is_ascii_digit)?;
    let y = run(bytes, space_after(bytes, x.end)?, u8::is_ascii_digit)?;
    let color = run(bytes, space_after(bytes, y.end)?, u8::is_ascii_lowercase)?;

    Some((x, y, color))
}

fn run(bytes: &[u8], start: usize, accept: fn(&u8) -> bool) -> Option<Range<usize>> {
    let len = bytes
        .get(start..)?
        .iter()
        .take_while(|byte| accept(byte))
        .count();

    if len == 0 {
        None
    } else {
        Some(start..start + len)
    }
}

fn space_after(bytes: &[u8], at: usize) -> Option<usize> {
    (bytes.get(at) == Some(&b' ')).then_some(at + 1)
}

fn parse_coordinate(digits: &str) -> Option<i64> {
    digits
        .parse::<i64>()
        .ok()
        .filter(|value| is_safe_integer(*value))
}
