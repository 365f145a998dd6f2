use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::thread;

use globex::{glob, ExploreError, Match, SearchPlan};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a temporary directory tree for testing.
///
/// Structure:
/// ```
/// tmp/
///   top.txt
///   readme.md
///   .git/
///     HEAD.txt
///   alpha/
///     a1.txt  a2.txt  a.log
///     deep/
///       d1.txt  d2.txt
///       deeper/
///         x.txt
///   beta/
///     b1.txt  b2.TXT
///     nested/
///       n1.txt  n2.txt
///   gamma/
///     g1.txt  notes.md
///     inner/
///       i1.txt  i2.txt
/// ```
///
/// 13 `.txt` files outside `.git`: 1 at the top, 5 one level down, 6 two
/// levels down and 1 three levels down.
fn setup_test_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let files = [
        "top.txt",
        "readme.md",
        ".git/HEAD.txt",
        "alpha/a1.txt",
        "alpha/a2.txt",
        "alpha/a.log",
        "alpha/deep/d1.txt",
        "alpha/deep/d2.txt",
        "alpha/deep/deeper/x.txt",
        "beta/b1.txt",
        "beta/b2.TXT",
        "beta/nested/n1.txt",
        "beta/nested/n2.txt",
        "gamma/g1.txt",
        "gamma/notes.md",
        "gamma/inner/i1.txt",
        "gamma/inner/i2.txt",
    ];
    for file in files {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, file).unwrap();
    }

    dir
}

fn pattern(root: &Path, rest: &str) -> String {
    format!("{}/{}", root.display(), rest)
}

fn run(plan: &SearchPlan) -> (Vec<Match>, Vec<ExploreError>) {
    let mut matches = Vec::new();
    let mut errors = Vec::new();
    for item in plan.explore() {
        match item {
            Ok(m) => matches.push(m),
            Err(e) => errors.push(e),
        }
    }
    (matches, errors)
}

fn path_set(matches: &[Match]) -> HashSet<PathBuf> {
    matches.iter().map(|m| m.path.clone()).collect()
}

/// Independent count of entries below `root`, skipping `.git`.
fn walkdir_count(root: &Path, keep: impl Fn(&walkdir::DirEntry) -> bool) -> usize {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|e| keep(e))
        .count()
}

fn is_txt(e: &walkdir::DirEntry) -> bool {
    e.file_type().is_file()
        && e.path()
            .extension()
            .map(|x| x.eq_ignore_ascii_case("txt"))
            .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn star_lists_top_level_files_and_dirs() {
    let dir = setup_test_dir();
    let plan = glob(format!("{}\\*", dir.path().display())).compile().unwrap();

    let (matches, errors) = run(&plan);

    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(matches.iter().filter(|m| !m.is_dir).count(), 2, "top.txt and readme.md");
    assert_eq!(matches.iter().filter(|m| m.is_dir).count(), 3, "alpha, beta, gamma");
}

#[test]
fn recursive_pattern_finds_txt_at_every_depth() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "**/*.txt")).compile().unwrap();

    let (matches, errors) = run(&plan);

    assert!(errors.is_empty());
    assert_eq!(matches.len(), 13);
    assert_eq!(matches.len(), walkdir_count(dir.path(), is_txt));
    assert!(matches.iter().all(|m| !m.is_dir));
}

#[test]
fn non_recursive_pattern_stays_in_one_directory() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "*.txt")).compile().unwrap();

    let (matches, _) = run(&plan);

    assert_eq!(matches.len(), 1);
    assert!(matches[0].path.ends_with("top.txt"));
}

#[test]
fn autorecurse_inserts_recursion_before_last_filter() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "*.txt"))
        .autorecurse(true)
        .compile()
        .unwrap();

    assert!(plan.segments()[0].is_recurse());
    assert_eq!(run(&plan).0.len(), 13);
}

#[test]
fn autorecurse_expands_bare_directory() {
    let dir = setup_test_dir();
    let plan = glob(dir.path().display().to_string())
        .autorecurse(true)
        .compile()
        .unwrap();

    let (matches, errors) = run(&plan);

    assert!(errors.is_empty());
    assert_eq!(matches.len(), walkdir_count(dir.path(), |_| true));
    assert_eq!(matches.iter().filter(|m| m.is_dir).count(), 7);
}

#[test]
fn bare_path_yields_single_match() {
    let dir = setup_test_dir();

    let file = glob(pattern(dir.path(), "alpha/a.log")).compile().unwrap();
    assert!(file.segments().is_empty());
    let (matches, errors) = run(&file);
    assert!(errors.is_empty());
    assert_eq!(matches.len(), 1);
    assert!(!matches[0].is_dir);

    let folder = glob(pattern(dir.path(), "alpha")).compile().unwrap();
    let (matches, _) = run(&folder);
    assert_eq!(matches.len(), 1);
    assert!(matches[0].is_dir);
}

#[test]
fn missing_bare_path_yields_single_error() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "nope.txt")).compile().unwrap();

    let items: Vec<_> = plan.explore().collect();

    assert_eq!(items.len(), 1);
    match &items[0] {
        Err(ExploreError::NotFound(path)) => assert!(path.ends_with("nope.txt")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn missing_root_yields_error_and_ends() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "missing/*.txt")).compile().unwrap();

    let (matches, errors) = run(&plan);

    assert!(matches.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].path().unwrap().ends_with("missing"));
}

#[test]
fn file_as_root_is_not_a_directory() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "top.txt/*")).compile().unwrap();

    let (_, errors) = run(&plan);

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ExploreError::NotADirectory(_)));
}

#[test]
fn default_ignores_skip_git_metadata() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "**/HEAD.txt")).compile().unwrap();

    assert!(plan.is_ignored(".GIT"));
    assert!(run(&plan).0.is_empty());
}

#[test]
fn ignored_dir_removes_whole_subtree() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "**/*.txt"))
        .add_ignore_dir("BETA")
        .compile()
        .unwrap();

    let (matches, _) = run(&plan);

    assert_eq!(matches.len(), 9, "beta holds 4 of the 13");
    assert!(matches
        .iter()
        .all(|m| !m.path.components().any(|c| c.as_os_str() == "beta")));
    assert!(matches.iter().any(|m| m.path.ends_with("alpha/deep/deeper/x.txt")));
}

#[test]
fn max_depth_results_nest() {
    let dir = setup_test_dir();
    let at_depth = |n| {
        let plan = glob(pattern(dir.path(), "**/*.txt"))
            .max_depth(n)
            .compile()
            .unwrap();
        path_set(&run(&plan).0)
    };

    let one = at_depth(1);
    let two = at_depth(2);
    let all = at_depth(0);

    assert_eq!((one.len(), two.len(), all.len()), (6, 12, 13));
    assert!(one.is_subset(&two));
    assert!(two.is_subset(&all));
}

#[test]
fn matching_is_case_insensitive() {
    let dir = setup_test_dir();

    let upper = glob(pattern(dir.path(), "**/*.TXT")).compile().unwrap();
    assert_eq!(run(&upper).0.len(), 13);

    let constant = glob(pattern(dir.path(), "*/DEEP/*.txt")).compile().unwrap();
    let (matches, errors) = run(&constant);
    assert!(errors.is_empty());
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| {
        let parent = m.path.parent().unwrap().file_name().unwrap();
        parent.eq_ignore_ascii_case("deep")
    }));
}

#[test]
fn constant_last_segment_matches_directory() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "*/deep")).compile().unwrap();

    let (matches, _) = run(&plan);

    assert_eq!(matches.len(), 1);
    assert!(matches[0].is_dir);
    assert!(matches[0].path.ends_with("alpha/deep"));
}

#[test]
fn constant_under_recursion_searches_every_level() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "**/deeper/x.txt")).compile().unwrap();

    let (matches, _) = run(&plan);

    assert_eq!(matches.len(), 1);
    assert!(matches[0].path.ends_with("alpha/deep/deeper/x.txt"));
}

#[test]
fn brace_alternation_selects_extensions() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "**/*.{md,log}")).compile().unwrap();

    assert_eq!(run(&plan).0.len(), 3);
}

#[test]
fn results_arrive_breadth_first() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "**/*.txt")).compile().unwrap();

    let depths: Vec<usize> = run(&plan)
        .0
        .iter()
        .map(|m| m.path.strip_prefix(dir.path()).unwrap().components().count())
        .collect();

    assert!(depths.windows(2).all(|w| w[0] <= w[1]), "{depths:?}");
    assert_eq!(depths.first(), Some(&1));
    assert_eq!(depths.last(), Some(&4));
}

#[test]
fn plan_is_reusable_and_shareable() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "**/*"))
        .channel_size(8)
        .compile()
        .unwrap();

    let first = path_set(&run(&plan).0);
    let second = path_set(&run(&plan).0);
    assert_eq!(first, second);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let plan = plan.clone();
            thread::spawn(move || path_set(&run(&plan).0))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), first);
    }
}

#[test]
fn dropping_matches_early_stops_the_walk() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "**/*")).compile().unwrap();

    let mut matches = plan.explore();
    assert!(matches.next().is_some());
    drop(matches);

    // The plan is still usable after an abandoned walk.
    assert!(!run(&plan).0.is_empty());
}

#[test]
fn shutdown_flag_ends_the_sequence() {
    let dir = setup_test_dir();
    let plan = glob(pattern(dir.path(), "**/*")).compile().unwrap();

    let mut matches = plan.explore();
    assert!(matches.next().is_some());
    matches.shutdown_flag().store(true, Ordering::Relaxed);

    let total = walkdir_count(dir.path(), |_| true);
    assert!(matches.count() < total);
}

#[cfg(target_os = "linux")]
#[test]
fn constant_matches_every_case_variant() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("readme.md"), "lower").unwrap();
    fs::write(sub.join("README.md"), "upper").unwrap();

    let plan = glob(pattern(dir.path(), "*/readme.md")).compile().unwrap();
    let (matches, errors) = run(&plan);

    assert!(errors.is_empty(), "{errors:?}");
    let expected: HashSet<PathBuf> = [sub.join("readme.md"), sub.join("README.md")].into();
    assert_eq!(matches.len(), 2);
    assert_eq!(path_set(&matches), expected);
}

#[test]
fn directory_removed_mid_walk_is_reported_in_band() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for file in ["0.txt", "1.txt", "2.txt", "a/x/f.txt", "b/x/f.txt", "c/x/f.txt"] {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, file).unwrap();
    }

    // The first item means the top level has been listed. With a one-slot
    // queue the worker then stalls on the third top-level file, before any
    // subdirectory has been visited.
    let plan = glob(pattern(root, "**/*.txt")).compile().unwrap();
    let mut matches = plan.explore();
    let first = matches.next().unwrap().unwrap();
    fs::remove_dir_all(root.join("b")).unwrap();

    let mut found = HashSet::from([first.path]);
    let mut errors = Vec::new();
    for item in matches {
        match item {
            Ok(m) => {
                found.insert(m.path);
            }
            Err(e) => errors.push(e),
        }
    }

    assert_eq!(errors.len(), 1, "{errors:?}");
    match &errors[0] {
        ExploreError::NotFound(p) => assert!(p.ends_with("b"), "{}", p.display()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(errors[0].path(), Some(root.join("b").as_path()));
    let expected: HashSet<PathBuf> = ["0.txt", "1.txt", "2.txt", "a/x/f.txt", "c/x/f.txt"]
        .iter()
        .map(|f| root.join(f))
        .collect();
    assert_eq!(found, expected);
}

#[cfg(unix)]
#[test]
fn symlink_to_directory_is_flagged_but_not_entered() {
    let dir = setup_test_dir();
    std::os::unix::fs::symlink(dir.path().join("alpha"), dir.path().join("link")).unwrap();

    let plan = glob(pattern(dir.path(), "l*")).compile().unwrap();
    let (matches, errors) = run(&plan);
    assert!(errors.is_empty());
    assert_eq!(matches.len(), 1);
    assert!(matches[0].path.ends_with("link"));
    assert!(matches[0].is_dir);

    let all = glob(pattern(dir.path(), "**/*.txt")).compile().unwrap();
    assert_eq!(run(&all).0.len(), 13);
}
