//! The full pipeline from story lines to a planned project layout
use crate::error::Result;
use crate::filter::{self, FilterRules};
use crate::issue::Warning;
use crate::parser::{self, ContentPolicy};
use crate::project::{Layout, ProjectTree};
use crate::reconstruct::{self, Plan};
use crate::utils;
use std::path::Path;

/// Everything that controls how a story is split
#[derive(Clone, Debug, Default)]
pub struct SplitOptions {
    pub rules: FilterRules,
    pub layout: Layout,
    pub policy: ContentPolicy,
}

/// A story split into a project tree, ready to be written
#[derive(Debug)]
pub struct Split {
    pub tree: ProjectTree,
    pub plan: Plan,

    /// Warnings from every stage, in pipeline order
    pub warnings: Vec<Warning>,
}

impl Split {
    /// Writes the project under the given output root
    pub fn write_to(&self, root: &Path) -> Result<()> {
        reconstruct::apply(&self.plan.writes, root)
    }
}

/// Splits the lines of a story, without touching the filesystem
pub fn split_lines<I, S>(lines: I, options: &SplitOptions) -> Result<Split>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let assembled = parser::assemble(lines, options.policy)?;
    let mut warnings = assembled.warnings;

    let (passages, mut filter_warnings) =
        filter::filter_passages(assembled.passages, &options.rules);
    warnings.append(&mut filter_warnings);

    let tree = ProjectTree::from_passages(passages, &options.layout);
    let mut plan = reconstruct::plan(&tree, &options.layout);
    warnings.append(&mut plan.warnings);

    Ok(Split {
        tree,
        plan,
        warnings,
    })
}

/// Splits the story file at `input` and writes the project under `output`
pub fn split_file(input: &Path, output: &Path, options: &SplitOptions) -> Result<Split> {
    let source = utils::load_source(input)?;
    tracing::info!(input = %input.display(), "splitting story");
    let split = split_lines(source.lines(), options)?;
    split.write_to(output)?;
    Ok(split)
}
