//! Failure-pattern extraction - pulls implicated file paths out of tool output
//!
//! Diagnostics from linters, compilers and test runners have no common format,
//! so extraction is a best-effort chain of independent regex rules. Each rule
//! is applied to the whole text before the next one runs, and every path it
//! captures lands in one set.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Directory names whose contents are generated or vendored and never blamed
pub const GENERATED_DIRS: &[&str] =
    &["node_modules", "dist", "build", "out", "target", "vendor", "coverage", ".next", ".git"];

/// Built-in rules, in the order they are applied
///
/// Each captures the path in its first group.
const BUILTIN_RULES: &[&str] = &[
    // src/foo.ts:10:3: error ...
    r#"([^\s:()'"]+\.[A-Za-z0-9]+):\d+:\d+:"#,
    // src/foo.ts:10: error ...
    r#"([^\s:()'"]+\.[A-Za-z0-9]+):\d+:"#,
    // at src/foo.ts:10:3  /  at Object.<anonymous> (src/foo.ts:10:3)
    r#"\bat\s+(?:[^\s()]+\s+)?\(?([^\s:()'"]+):\d+:\d+"#,
    // Error in src/foo.ts: ...
    r#"Error in\s+([^\s:()'"]+):"#,
    // Failed to compile src/foo.ts
    r#"Failed to compile\s+([^\s:()'"]+\.[A-Za-z0-9]+)"#,
];

static ANSI_ESCAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").ok());

static DEFAULT_PATTERNS: LazyLock<FailurePatterns> = LazyLock::new(FailurePatterns::builtin);

/// Ordered chain of extraction rules plus the directories to ignore
///
/// The chain is open: callers append rules for tool formats the built-ins do
/// not cover. A rule contributes its `path` named group if it has one, else
/// its first capture group, else the whole match.
#[derive(Debug, Clone)]
pub struct FailurePatterns {
    rules: Vec<Regex>,
    ignored_dirs: Vec<String>,
}

impl FailurePatterns {
    /// The built-in rule chain with the default generated directories
    #[must_use]
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES.iter().filter_map(|pattern| Regex::new(pattern).ok()).collect();
        Self {
            rules,
            ignored_dirs: GENERATED_DIRS.iter().map(ToString::to_string).collect(),
        }
    }

    /// A chain with no rules, only the default generated directories
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            ignored_dirs: GENERATED_DIRS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Append a compiled rule to the end of the chain
    #[must_use]
    pub fn with_rule(mut self, rule: Regex) -> Self {
        self.rules.push(rule);
        self
    }

    /// Compile and append a rule
    pub fn with_pattern(self, pattern: &str) -> Result<Self, regex::Error> {
        Ok(self.with_rule(Regex::new(pattern)?))
    }

    /// Treat another directory name as generated
    #[must_use]
    pub fn with_ignored_dir(mut self, dir: impl Into<String>) -> Self {
        let dir = dir.into();
        if !self.ignored_dirs.contains(&dir) {
            self.ignored_dirs.push(dir);
        }
        self
    }

    /// Rules in application order
    #[must_use]
    pub fn rules(&self) -> &[Regex] {
        &self.rules
    }

    /// Whether any path segment names an ignored directory
    #[must_use]
    pub fn is_ignored(&self, path: &str) -> bool {
        path.split(['/', '\\']).any(|segment| self.ignored_dirs.iter().any(|d| d == segment))
    }

    /// Run every rule over `output` and collect the implicated paths
    #[must_use]
    pub fn extract(&self, output: &str) -> BTreeSet<String> {
        let text = ANSI_ESCAPE
            .as_ref()
            .map_or(Cow::Borrowed(output), |ansi| ansi.replace_all(output, ""));
        let mut files = BTreeSet::new();

        for rule in &self.rules {
            for caps in rule.captures_iter(&text) {
                let Some(m) = caps.name("path").or_else(|| caps.get(1)).or_else(|| caps.get(0))
                else {
                    continue;
                };
                let path = clean_path(m.as_str());
                if !path.is_empty() && !self.is_ignored(path) {
                    files.insert(path.to_string());
                }
            }
        }

        files
    }
}

impl Default for FailurePatterns {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Extract failing files with the built-in rules
#[must_use]
pub fn extract_failing_files(output: &str) -> BTreeSet<String> {
    DEFAULT_PATTERNS.extract(output)
}

/// Whether a path lies under one of the [`GENERATED_DIRS`]
#[must_use]
pub fn is_generated_path(path: &str) -> bool {
    DEFAULT_PATTERNS.is_ignored(path)
}

fn clean_path(raw: &str) -> &str {
    let trimmed = raw.trim().trim_end_matches([',', ';', '.']);
    trimmed.strip_prefix("./").unwrap_or(trimmed)
}
