//! Assembles passages from the lines of a Twee 2 story file
use crate::error::{Error, Result};
use crate::issue::{Warning, WarningKind};
use crate::passage::{Header, Passage};

/// What to do with content lines that appear before the first header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentPolicy {
    /// Abort with a structure error
    Strict,

    /// Drop the line and record a `StrayContent` warning
    Permissive,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        ContentPolicy::Strict
    }
}

/// The passages of a story, in source order, along with any warnings
#[derive(Debug, Default)]
pub struct Assembled {
    pub passages: Vec<Passage>,
    pub warnings: Vec<Warning>,
}

/// Turns a sequence of lines into passages
///
/// Every header line opens a new passage, and every other line is appended to
/// the passage opened most recently. Lines should already have their newlines
/// stripped.
pub fn assemble<I, S>(lines: I, policy: ContentPolicy) -> Result<Assembled>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut assembled = Assembled::default();
    let mut current: Option<Passage> = None;

    for (index, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        if let Some(header) = Header::parse(line) {
            if let Some(passage) = current.take() {
                assembled.passages.push(passage);
            }
            current = Some(Passage::new(header));
            continue;
        }

        match current.as_mut() {
            Some(passage) => passage.content.push(line.to_string()),
            None => match policy {
                ContentPolicy::Strict => {
                    return Err(Error::Structure {
                        line: index + 1,
                        text: line.to_string(),
                    })
                }
                ContentPolicy::Permissive => {
                    tracing::debug!(line = index + 1, "dropping content before first passage");
                    assembled
                        .warnings
                        .push(Warning::at_line(WarningKind::StrayContent, index + 1));
                }
            },
        }
    }

    if let Some(passage) = current {
        assembled.passages.push(passage);
    }

    tracing::debug!(passages = assembled.passages.len(), "assembled passages");
    Ok(assembled)
}
