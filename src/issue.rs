//! Warnings and errors found while splitting a story, and their reporting
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::{Files, SimpleFile};
use std::cmp::Ordering;
use std::fmt;
use std::io::Write;
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

/// The input story, as seen by codespan
pub type StoryFile = SimpleFile<String, String>;

/// Something worth telling the user that does not stop the split by itself
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WarningKind {
    /// A line before the first passage header was dropped
    StrayContent,

    /// Two passages share a full name. The later one replaced the earlier one
    DuplicatePassage(String),

    /// A passage sits on a node that is never written as a file
    UnwrittenPassage(String),

    /// A passage name cannot be mapped to a path and was skipped
    InvalidName(String),
}

impl WarningKind {
    /// The name used to allow or deny this kind of warning
    pub fn get_name(&self) -> &'static str {
        match self {
            WarningKind::StrayContent => "StrayContent",
            WarningKind::DuplicatePassage(_) => "DuplicatePassage",
            WarningKind::UnwrittenPassage(_) => "UnwrittenPassage",
            WarningKind::InvalidName(_) => "InvalidName",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::StrayContent => write!(f, "Content before the first passage was dropped"),
            WarningKind::DuplicatePassage(name) => {
                write!(f, "Duplicate passage \"{}\" replaced an earlier one", name)
            }
            WarningKind::UnwrittenPassage(name) => write!(
                f,
                "Passage \"{}\" is on a module and will not be written to any file",
                name
            ),
            WarningKind::InvalidName(name) => write!(
                f,
                "Passage \"{}\" has an empty or path-like name segment and was skipped",
                name
            ),
        }
    }
}

/// A warning, with the 1-based input line it refers to if there is one
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub line: Option<usize>,
}

impl Warning {
    pub fn new(kind: WarningKind) -> Self {
        Warning { kind, line: None }
    }

    pub fn at_line(kind: WarningKind, line: usize) -> Self {
        Warning {
            kind,
            line: Some(line),
        }
    }

    pub fn get_name(&self) -> &'static str {
        self.kind.get_name()
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {})", self.kind, line),
            None => write!(f, "{}", self.kind),
        }
    }
}

pub enum Issue {
    /// A fatal problem in the input
    Error { message: String, line: Option<usize> },
    Warning { warning: Warning, denied: bool },
}

impl Issue {
    fn get_name(&self) -> &str {
        match self {
            Issue::Error { .. } => "Error",
            Issue::Warning { warning, .. } => warning.get_name(),
        }
    }

    fn get_message(&self) -> String {
        match self {
            Issue::Error { message, .. } => message.clone(),
            Issue::Warning { warning, .. } => format!("{}", warning.kind),
        }
    }

    fn get_line(&self) -> Option<usize> {
        match self {
            Issue::Error { line, .. } => *line,
            Issue::Warning { warning, .. } => warning.line,
        }
    }

    /// True if this issue fails the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Issue::Error { .. } | Issue::Warning { denied: true, .. })
    }

    /// Builds a diagnostic pointing at the offending line of the story
    pub fn report(&self, story_file: &StoryFile) -> Diagnostic<()> {
        let diagnostic = if self.is_fatal() {
            Diagnostic::error()
        } else {
            Diagnostic::warning()
        }
        .with_message(self.get_message())
        .with_code(self.get_name());

        let range = self
            .get_line()
            .and_then(|line| story_file.line_range((), line.checked_sub(1)?));
        match range {
            Some(range) => diagnostic.with_labels(vec![Label::primary((), range)]),
            None => diagnostic,
        }
    }
}

/// Drops allowed warnings, marks denied ones, and sorts everything by line
///
/// The name `all` allows or denies every warning. Returns the issues and
/// whether any of them is fatal.
pub fn filter_and_sort_issues(
    errors: Vec<Issue>,
    mut warnings: Vec<Warning>,
    allowed: &[String],
    denied: &[String],
) -> (Vec<Issue>, bool) {
    let mut issues = errors;

    let allow_all = allowed.iter().any(|a| a == "all");
    let deny_all = denied.iter().any(|d| d == "all");
    for warning in warnings.drain(..) {
        let name = warning.get_name();
        if allow_all || allowed.iter().any(|a| a == name) {
            continue;
        }
        let is_denied = deny_all || denied.iter().any(|d| d == name);
        issues.push(Issue::Warning {
            warning,
            denied: is_denied,
        });
    }

    issues.sort_by(|left, right| match (left.get_line(), right.get_line()) {
        (None, None) => Ordering::Equal,
        (None, _) => Ordering::Less,
        (_, None) => Ordering::Greater,
        (Some(l), Some(r)) => l.cmp(&r),
    });

    let is_err = issues.iter().any(Issue::is_fatal);
    (issues, is_err)
}

/// Prints an issue on a single line
pub fn print_issue(issue: &Issue, stdout: &mut StandardStream) -> std::io::Result<()> {
    let kind = if issue.is_fatal() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        "Error"
    } else {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        "Warning"
    };
    write!(stdout, "{}: ", kind)?;
    stdout.reset()?;
    match issue {
        Issue::Error {
            message,
            line: Some(line),
        } => writeln!(stdout, "{} (line {})", message, line),
        Issue::Error { message, .. } => writeln!(stdout, "{}", message),
        Issue::Warning { warning, .. } => writeln!(stdout, "{}", warning),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codespan_reporting::diagnostic::Severity;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn warnings() -> Vec<Warning> {
        vec![
            Warning::new(WarningKind::DuplicatePassage("a".to_string())),
            Warning::at_line(WarningKind::StrayContent, 3),
            Warning::at_line(WarningKind::StrayContent, 1),
        ]
    }

    #[test]
    fn sorted_by_line() {
        let (issues, is_err) = filter_and_sort_issues(Vec::new(), warnings(), &[], &[]);
        assert!(!is_err);
        let lines: Vec<_> = issues.iter().map(Issue::get_line).collect();
        assert_eq!(lines, vec![None, Some(1), Some(3)]);
    }

    #[test]
    fn allowed_warnings_are_dropped() {
        let (issues, _) =
            filter_and_sort_issues(Vec::new(), warnings(), &strings(&["StrayContent"]), &[]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].get_name(), "DuplicatePassage");

        let (issues, _) = filter_and_sort_issues(Vec::new(), warnings(), &strings(&["all"]), &[]);
        assert!(issues.is_empty());
    }

    #[test]
    fn denied_warnings_are_fatal() {
        let (issues, is_err) = filter_and_sort_issues(
            Vec::new(),
            warnings(),
            &[],
            &strings(&["DuplicatePassage"]),
        );
        assert!(is_err);
        assert_eq!(issues.iter().filter(|i| i.is_fatal()).count(), 1);
    }

    #[test]
    fn allow_overrides_deny() {
        let (issues, is_err) =
            filter_and_sort_issues(Vec::new(), warnings(), &strings(&["all"]), &strings(&["all"]));
        assert!(issues.is_empty());
        assert!(!is_err);
    }

    #[test]
    fn errors_are_always_fatal() {
        let error = Issue::Error {
            message: "broken".to_string(),
            line: Some(2),
        };
        let (issues, is_err) = filter_and_sort_issues(vec![error], Vec::new(), &[], &[]);
        assert!(is_err);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn report_labels_the_line() {
        let file = StoryFile::new("story.tw2".to_string(), "stray\n::A\nbody\n".to_string());
        let issue = Issue::Warning {
            warning: Warning::at_line(WarningKind::StrayContent, 1),
            denied: false,
        };
        let diagnostic = issue.report(&file);
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.code.as_deref(), Some("StrayContent"));
        assert_eq!(diagnostic.labels.len(), 1);
        assert_eq!(diagnostic.labels[0].range.start, 0);

        let issue = Issue::Warning {
            warning: Warning::new(WarningKind::UnwrittenPassage("m".to_string())),
            denied: true,
        };
        let diagnostic = issue.report(&file);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert!(diagnostic.labels.is_empty());
    }
}
