//! Parameterized tests using test-case
//!
//! These tests use test-case to run the same test logic with different inputs.

use p5::core::models::Stage;
use p5::core::services::{extract_failing_files, is_generated_path, overlap_score};
use std::collections::BTreeSet;
use test_case::test_case;

// =============================================================================
// Extraction Tests
// =============================================================================

#[test_case("src/app.ts:12:5: error Unexpected any", &["src/app.ts"] ; "eslint unix format")]
#[test_case("src/app.ts:3:5 - error TS2322: Type 'string'", &["src/app.ts"] ; "tsc pretty format")]
#[test_case("    at render (src/components/App.tsx:10:7)", &["src/components/App.tsx"] ; "stack frame")]
#[test_case("Error in src/lib/util.js: boom", &["src/lib/util.js"] ; "error in prefix")]
#[test_case("Failed to compile src/index.tsx.", &["src/index.tsx"] ; "failed to compile")]
#[test_case("./src/a.ts:1:1: x", &["src/a.ts"] ; "leading dot slash stripped")]
#[test_case("\x1b[31msrc/a.ts:1:1:\x1b[0m error", &["src/a.ts"] ; "ansi colours stripped")]
#[test_case("node_modules/react/index.js:1:1: error", &[] ; "generated dir ignored")]
#[test_case("All checks passed", &[] ; "no diagnostics")]
fn test_extract(output: &str, expected: &[&str]) {
    let files = extract_failing_files(output);
    let files: Vec<&str> = files.iter().map(String::as_str).collect();
    assert_eq!(files, expected);
}

#[test_case("node_modules/x/index.js", true ; "node modules")]
#[test_case("packages/web/dist/app.js", true ; "nested dist")]
#[test_case(".next/server/page.js", true ; "next output")]
#[test_case("src/build.ts", false ; "file named like a dir")]
#[test_case("src/distance.ts", false ; "prefix of a dir name")]
fn test_generated_path(path: &str, expected: bool) {
    assert_eq!(is_generated_path(path), expected);
}

// =============================================================================
// Scoring Tests
// =============================================================================

#[test_case(&["src/a.ts"], &["src/a.ts"], 1 ; "exact")]
#[test_case(&["/repo/src/a.ts"], &["src/a.ts"], 1 ; "absolute failing path")]
#[test_case(&["a.ts"], &["src/a.ts"], 1 ; "bare file name")]
#[test_case(&["src/a.ts", "src/b.ts"], &["src/a.ts", "src/b.ts", "README.md"], 2 ; "counts failing files")]
#[test_case(&["src/a.ts"], &["docs/guide.md"], 0 ; "disjoint")]
fn test_overlap(failing: &[&str], changed: &[&str], expected: usize) {
    let failing: BTreeSet<String> = failing.iter().map(ToString::to_string).collect();
    let changed: Vec<String> = changed.iter().map(ToString::to_string).collect();
    assert_eq!(overlap_score(&failing, &changed), expected);
}

// =============================================================================
// Stage Parsing Tests
// =============================================================================

#[test_case("pre-commit", Stage::PreCommit ; "pre commit")]
#[test_case("pre-push", Stage::PrePush ; "pre push")]
#[test_case("PRE-PUSH", Stage::PrePush ; "case insensitive")]
#[test_case("ci", Stage::Ci ; "ci")]
fn test_stage_parse(input: &str, expected: Stage) {
    assert_eq!(input.parse::<Stage>().unwrap(), expected);
}
