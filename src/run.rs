//! Handles the actual running of the splitter

use crate::issue::{Issue, StoryFile};
use crate::report;
use crate::utils;
use crate::Config;
use crate::Error;

use color_eyre::Result;
use eyre::WrapErr;

use std::io::Write;

use termcolor::{Color, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::EnvFilter;

fn init_logging(verbosity: u64) {
    let default_filter = match verbosity {
        0 => "tweesplit=warn",
        1 => "tweesplit=info",
        _ => "tweesplit=debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // Keeps an already installed subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs the splitter
pub fn run() -> Result<()> {
    let config = Config::build()?;
    init_logging(config.verbosity);

    let mut stdout = StandardStream::stdout(config.use_color);

    let source = utils::load_source(&config.input)
        .wrap_err_with(|| format!("Failed to read story file {:?}", &config.input))?;
    let story_file = StoryFile::new(config.input.display().to_string(), source.clone());

    let mut split = match crate::split_lines(source.lines(), &config.options) {
        Ok(split) => split,
        Err(Error::Structure { line, text }) => {
            let error = Issue::Error {
                message: format!("Line does not belong to any passage: {:?}", text),
                line: Some(line),
            };
            // Errors are always fatal, so this reports and fails
            return report::report(vec![error], Vec::new(), &config, &story_file, &mut stdout);
        }
        Err(e) => return Err(e.into()),
    };

    let warnings = std::mem::take(&mut split.warnings);
    report::report(Vec::new(), warnings, &config, &story_file, &mut stdout)?;

    if config.print_tree {
        write!(stdout, "{}", split.tree)?;
        return Ok(());
    }

    let output = match &config.output {
        Some(output) => output,
        None => return Ok(()),
    };
    split
        .write_to(output)
        .wrap_err_with(|| format!("Failed to write project to {:?}", output))?;

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    writeln!(stdout, "Wrote project to {}", output.display())?;
    stdout.reset()?;
    Ok(())
}
