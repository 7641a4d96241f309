//! Selects and renames the passages that make up a project
use crate::issue::{Warning, WarningKind};
use crate::passage::{split_name, Passage, NAME_PATH_DELIMITER};
use crate::utils;
use serde::Deserialize;
use std::collections::HashMap;

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_namespace() -> String {
    "stella".to_string()
}

fn default_special_passages() -> Vec<String> {
    names(&[
        "Start",
        "StorySubtitle",
        "StoryAuthor",
        "StoryMenu",
        "StorySettings",
        "StoryIncludes",
        "StoryTitle",
    ])
}

fn default_special_tags() -> Vec<String> {
    names(&["stylesheet", "script", "haml", "twee2"])
}

fn default_project_passages() -> Vec<String> {
    names(&[
        "PassageDone",
        "PassageHeader",
        "PassageFooter",
        "PassageReady",
        "Start",
        "StoryAuthor",
        "StoryBanner",
        "StoryCaption",
        "StoryInit",
        "StoryInterface",
        "StoryMenu",
        "StorySettings",
        "StoryShare",
        "StorySubtitle",
        "StoryTitle",
        "StoryIncludes",
    ])
}

fn default_project_tags() -> Vec<String> {
    names(&["script", "stylesheet", "widget"])
}

/// Decides which passages are left out of a project and which ones are moved
/// into the project namespace
#[derive(Clone, Debug, Deserialize)]
pub struct FilterRules {
    /// The namespace segment that project-level passages are moved under
    #[serde(default = "default_namespace")]
    pub project_namespace: String,

    /// Names of passages that never end up in a project
    #[serde(default = "default_special_passages")]
    pub special_passages: Vec<String>,

    /// Tags of passages that never end up in a project
    #[serde(default = "default_special_tags")]
    pub special_tags: Vec<String>,

    /// Names of project-level passages
    #[serde(default = "default_project_passages")]
    pub project_passages: Vec<String>,

    /// Tags of project-level passages
    #[serde(default = "default_project_tags")]
    pub project_tags: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        FilterRules {
            project_namespace: default_namespace(),
            special_passages: default_special_passages(),
            special_tags: default_special_tags(),
            project_passages: default_project_passages(),
            project_tags: default_project_tags(),
        }
    }
}

impl FilterRules {
    /// True if the passage should be left out entirely
    pub fn is_special(&self, passage: &Passage) -> bool {
        self.special_passages.iter().any(|n| n == passage.name())
            || self.special_tags.iter().any(|t| passage.has_tag(t))
    }

    /// True if the passage belongs in the project namespace
    pub fn is_project(&self, passage: &Passage) -> bool {
        self.project_passages.iter().any(|n| n == passage.name())
            || self.project_tags.iter().any(|t| passage.has_tag(t))
    }

    /// The name the passage is filed under
    pub fn full_name(&self, passage: &Passage) -> String {
        if self.is_project(passage) {
            format!(
                "{}{}{}",
                self.project_namespace,
                NAME_PATH_DELIMITER,
                passage.name()
            )
        } else {
            passage.name().to_string()
        }
    }
}

/// Passages keyed by their full name, iterated in insertion order
#[derive(Debug, Default)]
pub struct PassageMap {
    entries: Vec<(String, Passage)>,
    index: HashMap<String, usize>,
}

impl PassageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a passage, replacing any passage with the same name in place
    ///
    /// Returns the replaced passage, if any
    pub fn insert(&mut self, name: String, passage: Passage) -> Option<Passage> {
        match self.index.get(&name) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, passage)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, passage));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Passage> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl IntoIterator for PassageMap {
    type Item = (String, Passage);
    type IntoIter = std::vec::IntoIter<(String, Passage)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// True if every namespace segment of the name can be used as a path
/// component under the output root
///
/// A trailing delimiter is ignored, so `a.` files the passage on `a`.
pub fn is_valid_name(name: &str) -> bool {
    let mut rest = name;
    loop {
        let (fragment, remainder) = split_name(rest);
        if fragment.is_empty() || fragment.contains(|c: char| c == '/' || c == '\\') {
            return false;
        }
        if remainder.is_empty() {
            return true;
        }
        rest = remainder;
    }
}

/// Sorts passages in natural name order, drops special passages, and keys
/// the rest by their full name
///
/// Passages whose full name has an empty segment or a path separator are
/// skipped with an `InvalidName` warning. When two passages share a full name
/// the later one wins and a `DuplicatePassage` warning is recorded.
pub fn filter_passages(
    mut passages: Vec<Passage>,
    rules: &FilterRules,
) -> (PassageMap, Vec<Warning>) {
    passages.sort_by(|l, r| utils::natural_cmp(l.name(), r.name()));

    let mut map = PassageMap::new();
    let mut warnings = Vec::new();
    for passage in passages {
        if rules.is_special(&passage) {
            tracing::debug!(name = passage.name(), "skipping special passage");
            continue;
        }
        let name = rules.full_name(&passage);
        if !is_valid_name(&name) {
            tracing::debug!(name = name.as_str(), "skipping passage with invalid name");
            warnings.push(Warning::new(WarningKind::InvalidName(name)));
            continue;
        }
        if map.insert(name.clone(), passage).is_some() {
            tracing::debug!(name = name.as_str(), "passage replaced by a later duplicate");
            warnings.push(Warning::new(WarningKind::DuplicatePassage(name)));
        }
    }

    tracing::debug!(passages = map.len(), "filtered passages");
    (map, warnings)
}
