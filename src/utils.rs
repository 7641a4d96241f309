//! Utility functions for loading stories and ordering passage names
use std::cmp::Ordering;
use std::path::Path;

use crate::error::{Error, Result};

/// Reads the file at the given path
///
/// Use `str::lines` on the result to get lines without their newlines
pub fn load_source<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| Error::Filesystem {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

/// Splits a string into alternating runs of ASCII digits and other characters
fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_number = None;
    for (pos, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_number {
            Some(prev) if prev != digit => {
                chunks.push(chunk(&s[start..pos], prev));
                start = pos;
            }
            _ => {}
        }
        in_number = Some(digit);
    }
    if let Some(digit) = in_number {
        chunks.push(chunk(&s[start..], digit));
    }
    chunks
}

fn chunk(s: &str, digit: bool) -> Chunk<'_> {
    if digit {
        Chunk::Number(s)
    } else {
        Chunk::Text(s)
    }
}

/// Compares two runs of digits by value without parsing them, so arbitrarily
/// long runs cannot overflow
fn cmp_digits(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

/// Compares strings in natural order
///
/// Runs of digits compare as integers and everything else compares as text,
/// so `p2` sorts before `p10`. A number sorts before text at the same
/// position.
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let left_chunks = chunks(left);
    let right_chunks = chunks(right);
    for (l, r) in left_chunks.iter().zip(right_chunks.iter()) {
        let ordering = match (l, r) {
            (Chunk::Number(l), Chunk::Number(r)) => {
                cmp_digits(l, r).then_with(|| l.len().cmp(&r.len()))
            }
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
            (Chunk::Text(l), Chunk::Text(r)) => l.cmp(r),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left_chunks.len().cmp(&right_chunks.len())
}
