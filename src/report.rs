//! Reports the issues of a split based on the given [`Config`]
//!
//! [`Config`]: ../struct.Config.html

use crate::issue::{self, Issue, StoryFile, Warning};
use crate::Config;
use codespan_reporting::term;
use color_eyre::Result;
use eyre::eyre;
use std::io::Write;
use termcolor::StandardStream;

/// Outputs errors and warnings to the given stream
///
/// Warnings are ignored or promoted to errors as specified in the config.
/// Fails if any reported issue is an error
pub fn report(
    errors: Vec<Issue>,
    warnings: Vec<Warning>,
    config: &Config,
    story_file: &StoryFile,
    stdout: &mut StandardStream,
) -> Result<()> {
    let (issues, is_err) =
        issue::filter_and_sort_issues(errors, warnings, &config.allowed, &config.denied);

    if config.compact {
        for issue in &issues {
            issue::print_issue(issue, stdout)?;
        }
    } else {
        let term_config = term::Config::default();
        for issue in &issues {
            let diagnostic = issue.report(story_file);
            term::emit(&mut stdout.lock(), &term_config, story_file, &diagnostic)?;
        }
    }

    // Force reset of color
    stdout.flush()?;

    if is_err {
        Err(eyre!("Failed due to previous errors"))
    } else {
        Ok(())
    }
}
