// ABOUTME: Integration tests for exclusion-rule compilation and matching

use mirror_watch::watcher::IgnoreSet;

fn compile(patterns: &[&str]) -> IgnoreSet {
    let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
    IgnoreSet::compile(&patterns).expect("patterns should compile")
}

#[test]
fn test_path_matching_any_pattern_is_excluded() {
    let set = compile(&["*.log", "target", "*.tmp"]);

    assert!(set.is_excluded("debug.log"));
    assert!(set.is_excluded("scratch.tmp"));
    assert!(set.is_excluded("target"));
}

#[test]
fn test_path_matching_no_pattern_is_not_excluded() {
    let set = compile(&["*.log", "target"]);

    assert!(!set.is_excluded("src/main.rs"));
    assert!(!set.is_excluded("README.md"));
}

#[test]
fn test_empty_pattern_set_excludes_nothing() {
    let set = compile(&[]);

    assert!(!set.is_excluded("debug.log"));
    assert!(!set.is_excluded("anything/at/all"));
    assert!(!set.is_excluded("."));
}

#[test]
fn test_excluded_directory_excludes_everything_beneath_it() {
    let set = compile(&["node_modules", "dist"]);

    assert!(set.is_excluded("node_modules"));
    assert!(set.is_excluded("node_modules/left-pad/index.js"));
    assert!(set.is_excluded("dist/assets/app.css"));
    assert!(!set.is_excluded("src/node_modules.rs"));
}

#[test]
fn test_patterns_for_hidden_entries() {
    let set = compile(&[".git", ".env*"]);

    assert!(set.is_excluded(".git/HEAD"));
    assert!(set.is_excluded(".env"));
    assert!(set.is_excluded(".env.local"));
    assert!(!set.is_excluded("src/env.rs"));
}

#[test]
fn test_malformed_pattern_is_a_startup_error() {
    let patterns = vec!["src/{broken".to_string()];
    let result = IgnoreSet::compile(&patterns);

    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    assert!(message.contains("src/{broken"));
}
