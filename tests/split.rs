use std::collections::BTreeMap;
use std::path::Path;
use tweesplit::issue::WarningKind;
use tweesplit::{split_file, split_lines, ContentPolicy, Error, FilterRules, SplitOptions};

const STORY: &str = "::StoryTitle
A Test Story

::Start
[[Intro]]

::Styles [stylesheet]
body { color: red; }

::StoryInit
<<set $x to 1>>

::Intro
Hello

::Intro.next [foo]
World

::ch.p10
ten

::ch.p2
two

::ch.p1
one

::ch.deep
The deep group

::ch.deep.a.b.c
Nested

::ch.deep.x
Sibling
";

/// Reads every file under `root`, keyed by its path relative to `root`
fn snapshot(root: &Path) -> BTreeMap<String, String> {
    fn walk(root: &Path, dir: &Path, files: &mut BTreeMap<String, String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, files);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
                files.insert(rel, std::fs::read_to_string(&path).unwrap());
            }
        }
    }
    let mut files = BTreeMap::new();
    walk(root, root, &mut files);
    files
}

fn options(namespace: &str) -> SplitOptions {
    SplitOptions {
        rules: FilterRules {
            project_namespace: namespace.to_string(),
            ..FilterRules::default()
        },
        ..SplitOptions::default()
    }
}

fn split_story(story: &str, namespace: &str) -> (tempfile::TempDir, BTreeMap<String, String>) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("story.tw2");
    std::fs::write(&input, story).unwrap();
    let output = dir.path().join("out");
    split_file(&input, &output, &options(namespace)).unwrap();
    let files = snapshot(&output);
    (dir, files)
}

#[test]
fn module_directory_with_file() {
    let story = ":: Intro\nHello\n\n:: Intro.next [foo]\nWorld\n";
    let (_dir, files) = split_story(story, "projectns");
    assert_eq!(files["includes.txt"], "Intro/\n");
    assert_eq!(files["Intro/includes.txt"], "next\n");
    assert_eq!(files["Intro/next.tw2"], "::Intro.next [foo]\nWorld\n");
    assert_eq!(files.len(), 3);
}

#[test]
fn full_story_layout() {
    let (_dir, files) = split_story(STORY, "projectns");
    let paths: Vec<&str> = files.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "Intro/includes.txt",
            "Intro/next.tw2",
            "ch/deep.tw2",
            "ch/deep/a.tw2",
            "ch/deep/includes.txt",
            "ch/deep/x.tw2",
            "ch/includes.txt",
            "ch/p1.tw2",
            "ch/p10.tw2",
            "ch/p2.tw2",
            "includes.txt",
            "projectns/StoryInit.tw2",
            "projectns/includes.txt",
        ]
    );

    assert_eq!(files["includes.txt"], "Intro/\nprojectns/\nch/\n");
    assert_eq!(files["ch/includes.txt"], "deep/\ndeep\np1\np2\np10\n");
    assert_eq!(files["ch/deep/includes.txt"], "a\nx\n");
    assert_eq!(files["ch/deep.tw2"], "::ch.deep\nThe deep group\n\n");
    assert_eq!(files["ch/deep/a.tw2"], "::ch.deep.a.b.c\nNested\n\n");
    assert_eq!(files["projectns/StoryInit.tw2"], "::StoryInit\n<<set $x to 1>>\n\n");
}

#[test]
fn special_passages_are_absent() {
    let (_dir, files) = split_story(STORY, "projectns");
    for (path, contents) in &files {
        assert!(!contents.contains("::Start"), "Start found in {}", path);
        assert!(!contents.contains("StoryTitle"), "StoryTitle found in {}", path);
        assert!(!contents.contains("Styles"), "stylesheet found in {}", path);
    }
}

#[test]
fn reconstruction_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("story.tw2");
    std::fs::write(&input, STORY).unwrap();
    let output = dir.path().join("out");

    split_file(&input, &output, &options("stella")).unwrap();
    let first = snapshot(&output);
    split_file(&input, &output, &options("stella")).unwrap();
    let second = snapshot(&output);
    assert_eq!(first, second);
}

#[test]
fn warnings_are_collected() {
    let lines = vec!["stray", "::Intro", "Hello", "::m.a", "one", "::m.a", "two"];
    let options = SplitOptions {
        policy: ContentPolicy::Permissive,
        ..SplitOptions::default()
    };
    let split = split_lines(lines, &options).unwrap();
    let kinds: Vec<WarningKind> = split.warnings.iter().map(|w| w.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            WarningKind::StrayContent,
            WarningKind::DuplicatePassage("m.a".to_string()),
            WarningKind::UnwrittenPassage("Intro".to_string()),
        ]
    );
    assert_eq!(split.plan.file("m/a.tw2"), Some("::m.a\ntwo\n"));
}

#[test]
fn strict_mode_rejects_stray_content() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("story.tw2");
    std::fs::write(&input, "Title page\n::Intro\nHello\n").unwrap();
    let output = dir.path().join("out");

    match split_file(&input, &output, &SplitOptions::default()) {
        Err(Error::Structure { line, text }) => {
            assert_eq!(line, 1);
            assert_eq!(text, "Title page");
        }
        other => panic!("expected structure error, got {:?}", other.map(|_| ())),
    }
    assert!(!output.exists());
}

#[test]
fn missing_input_is_a_filesystem_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.tw2");
    match split_file(&input, &dir.path().join("out"), &SplitOptions::default()) {
        Err(Error::Filesystem { path, .. }) => assert_eq!(path, input),
        other => panic!("expected filesystem error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn invalid_names_stay_inside_the_project() {
    let lines = vec!["::m.a", "A", "::.x", "X", "::a..b", "B", "::...evil", "E"];
    let split = split_lines(lines, &SplitOptions::default()).unwrap();
    assert_eq!(split.plan.file("includes.txt"), Some("m/\n"));
    assert_eq!(split.plan.file("m/includes.txt"), Some("a\n"));
    let skipped = split
        .warnings
        .iter()
        .filter(|w| matches!(w.kind, WarningKind::InvalidName(_)))
        .count();
    assert_eq!(skipped, 3);

    let story = "::m.a\nA\n::m.and/or\nslash\n";
    let (_dir, files) = split_story(story, "stella");
    assert_eq!(files["includes.txt"], "m/\n");
    assert_eq!(files["m/includes.txt"], "a\n");
    assert_eq!(files["m/a.tw2"], "::m.a\nA\n");
    assert_eq!(files.len(), 3);
}

#[test]
fn passages_in_one_file_keep_their_source_spacing() {
    let story = "::m.a\nA\n\n::m.a.b\nB\n\n::m.a.c\nC\n";
    let (_dir, files) = split_story(story, "stella");
    assert_eq!(files["m/a.tw2"], "::m.a\nA\n\n::m.a.b\nB\n\n::m.a.c\nC\n");
}
