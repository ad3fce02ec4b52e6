//! Transcript text segmentation
//!
//! Each `\n`-separated line becomes one [`Block`]:
//! - blank (after trimming) → [`Block::Spacer`]
//! - first `:` at a character index in `1..SPEAKER_LABEL_LIMIT` → [`Block::Spoken`]
//! - anything else → [`Block::Plain`]
//!
//! The label limit keeps ordinary sentences that happen to contain a colon
//! late in the line from being read as speaker turns.

use serde::Serialize;
use std::str::Split;

/// Exclusive upper bound on the character index of a speaker label's colon
pub const SPEAKER_LABEL_LIMIT: usize = 30;

/// One rendered unit of a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block<'a> {
    /// Blank line
    Spacer,
    /// Speaker turn, e.g. `Host: Welcome back`
    Spoken { speaker: &'a str, content: &'a str },
    Plain { content: &'a str },
}

/// Lazy block sequence over borrowed transcript text
///
/// Cloning yields an independent cursor at the same point, so a consumer can
/// restart iteration without re-splitting the source.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    lines: Split<'a, char>,
}

/// Segment `text` into blocks
pub fn segment(text: &str) -> Segments<'_> {
    Segments {
        lines: text.split('\n'),
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Block<'a>> {
        self.lines.next().map(classify)
    }
}

fn classify(line: &str) -> Block<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Block::Spacer;
    }

    // Character index, not byte index, so accented names count correctly
    let colon = line
        .char_indices()
        .enumerate()
        .find(|(_, (_, c))| *c == ':')
        .map(|(char_idx, (byte_idx, _))| (char_idx, byte_idx));

    match colon {
        Some((char_idx, byte_idx)) if char_idx > 0 && char_idx < SPEAKER_LABEL_LIMIT => {
            Block::Spoken {
                speaker: line[..byte_idx].trim(),
                content: line[byte_idx + 1..].trim(),
            }
        }
        _ => Block::Plain { content: line },
    }
}
