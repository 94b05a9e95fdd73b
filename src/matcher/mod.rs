//! Wildcard Matcher
//!
//! Expands a sentinel-form pattern against a working directory. The core
//! pipeline only talks to the `WildcardMatcher` trait; `FsMatcher` is the
//! filesystem-backed implementation used by embedders, the demonstration
//! binary, and the tests.
//!
//! Patterns arrive with `ANY_CHAR` / `ANY_STRING` / `ANY_STRING_RECURSIVE`
//! sentinels in place of `?` / `*` / `**`; every other character is
//! literal. Results are pattern-shaped: a relative pattern produces
//! relative paths, the working directory only anchors the lookups. An
//! empty working directory means "absolute patterns only".

pub mod fs;

use std::collections::HashSet;
use std::sync::Arc;

use crate::completion::{Completion, CompletionFlags};
use crate::path::normalize_path;
use crate::sentinels::{literalize_wildcards, ANY_CHAR, ANY_STRING, ANY_STRING_RECURSIVE};

pub use fs::{DirEntry, FileKind, FileSystem, FsError, InMemoryFs, OsFs};

/// Outcome of one matcher invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardResult {
    /// At least one path matched.
    Match,
    /// Nothing matched.
    NoMatch,
    /// The walk was cancelled; the pipeline surfaces this as an error.
    Cancel,
}

/// The subset of expansion flags the matcher cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WildcardParams {
    /// Prefix-match the last segment and emit replace-token completions.
    pub for_completions: bool,
    /// Only executable files (and directories) are candidates.
    pub executables_only: bool,
    /// Leave completion descriptions empty.
    pub no_descriptions: bool,
}

pub trait WildcardMatcher {
    fn expand(
        &self,
        pattern: &str,
        working_dir: &str,
        params: &WildcardParams,
        out: &mut Vec<Completion>,
    ) -> WildcardResult;
}

lazy_static::lazy_static! {
    /// Characters that must be escaped when a literal lands in a regex.
    static ref REGEX_SPECIALS: HashSet<char> = {
        let mut set = HashSet::new();
        for c in ['.', '+', '*', '?', '(', ')', '[', ']', '{', '}', '|', '^', '$', '\\'] {
            set.insert(c);
        }
        set
    };
}

/// Translate one path segment to an anchored regex. In prefix mode the
/// trailing anchor is dropped so the segment matches name prefixes.
fn segment_to_regex(segment: &[char], prefix_mode: bool) -> String {
    let mut re = String::from("^");
    for &c in segment {
        match c {
            ANY_CHAR => re.push('.'),
            ANY_STRING | ANY_STRING_RECURSIVE => re.push_str(".*"),
            c if REGEX_SPECIALS.contains(&c) => {
                re.push('\\');
                re.push(c);
            }
            c => re.push(c),
        }
    }
    if !prefix_mode {
        re.push('$');
    }
    re
}

fn segment_matches(segment: &[char], name: &str, prefix_mode: bool) -> bool {
    // Dotfiles only match when the pattern spells the leading dot.
    if name.starts_with('.') && segment.first() != Some(&'.') {
        return false;
    }
    let regex_str = segment_to_regex(segment, prefix_mode);
    if let Ok(re) = regex_lite::Regex::new(&regex_str) {
        re.is_match(name)
    } else {
        false
    }
}

/// Filesystem-backed matcher.
pub struct FsMatcher {
    fs: Arc<dyn FileSystem>,
}

impl FsMatcher {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn push_match(
        &self,
        rel_prefix: &str,
        entry: &DirEntry,
        params: &WildcardParams,
        out: &mut Vec<Completion>,
    ) {
        let mut text = format!("{}{}", rel_prefix, entry.name);
        let mut description = String::new();
        let mut flags = CompletionFlags::default();
        if params.for_completions {
            if entry.kind == FileKind::Directory {
                text.push('/');
            }
            flags.replaces_token = true;
            if !params.no_descriptions {
                description = match entry.kind {
                    FileKind::Directory => "directory".to_string(),
                    FileKind::File if params.executables_only => "command".to_string(),
                    FileKind::File => "file".to_string(),
                };
            }
        }
        out.push(Completion {
            text,
            description,
            flags,
        });
    }

    fn entry_is_candidate(&self, entry: &DirEntry, params: &WildcardParams) -> bool {
        !params.executables_only || entry.kind == FileKind::Directory || entry.executable
    }

    /// Emit everything under `dir_path`, recursively. Used for a trailing
    /// recursive wildcard.
    fn walk_all(
        &self,
        dir_path: &str,
        rel_prefix: &str,
        params: &WildcardParams,
        out: &mut Vec<Completion>,
        matched: &mut bool,
    ) {
        let Ok(entries) = self.fs.read_dir(dir_path) else {
            return;
        };
        for entry in entries {
            if entry.name.starts_with('.') {
                continue;
            }
            if self.entry_is_candidate(&entry, params) {
                self.push_match(rel_prefix, &entry, params, out);
                *matched = true;
            }
            if entry.kind == FileKind::Directory {
                let child_dir = format!("{}{}/", dir_path, entry.name);
                let child_rel = format!("{}{}/", rel_prefix, entry.name);
                self.walk_all(&child_dir, &child_rel, params, out, matched);
            }
        }
    }

    fn walk(
        &self,
        dir_path: &str,
        rel_prefix: &str,
        segments: &[Vec<char>],
        params: &WildcardParams,
        out: &mut Vec<Completion>,
        matched: &mut bool,
    ) {
        let Some((segment, rest)) = segments.split_first() else {
            return;
        };
        let last = rest.is_empty();

        // Empty segments (doubled slashes) and literal dot segments walk in
        // place or up; they never consult the listing.
        if segment.is_empty() && !last {
            self.walk(dir_path, rel_prefix, rest, params, out, matched);
            return;
        }
        let literal: String = segment.iter().collect();
        if literal == "." || literal == ".." {
            if last {
                return;
            }
            let child_dir = format!("{}/", normalize_path(&format!("{}{}", dir_path, literal)));
            let child_rel = format!("{}{}/", rel_prefix, literal);
            self.walk(&child_dir, &child_rel, rest, params, out, matched);
            return;
        }

        // A bare `**` segment crosses directory levels.
        if segment.as_slice() == [ANY_STRING_RECURSIVE] {
            if last {
                self.walk_all(dir_path, rel_prefix, params, out, matched);
                return;
            }
            // Zero levels consumed.
            self.walk(dir_path, rel_prefix, rest, params, out, matched);
            let Ok(entries) = self.fs.read_dir(dir_path) else {
                return;
            };
            for entry in entries {
                if entry.kind != FileKind::Directory || entry.name.starts_with('.') {
                    continue;
                }
                let child_dir = format!("{}{}/", dir_path, entry.name);
                let child_rel = format!("{}{}/", rel_prefix, entry.name);
                self.walk(&child_dir, &child_rel, segments, params, out, matched);
            }
            return;
        }

        let Ok(entries) = self.fs.read_dir(dir_path) else {
            return;
        };
        for entry in entries {
            if last {
                if segment_matches(segment, &entry.name, params.for_completions)
                    && self.entry_is_candidate(&entry, params)
                {
                    self.push_match(rel_prefix, &entry, params, out);
                    *matched = true;
                }
            } else if entry.kind == FileKind::Directory
                && segment_matches(segment, &entry.name, false)
            {
                let child_dir = format!("{}{}/", dir_path, entry.name);
                let child_rel = format!("{}{}/", rel_prefix, entry.name);
                self.walk(&child_dir, &child_rel, rest, params, out, matched);
            }
        }
    }
}

impl WildcardMatcher for FsMatcher {
    fn expand(
        &self,
        pattern: &str,
        working_dir: &str,
        params: &WildcardParams,
        out: &mut Vec<Completion>,
    ) -> WildcardResult {
        let absolute = pattern.starts_with('/');
        let mut matched = false;
        if absolute || !working_dir.is_empty() {
            let (base, rel_seed, pattern_body) = if absolute {
                ("/".to_string(), "/".to_string(), &pattern[1..])
            } else {
                let base = format!("{}/", normalize_path(working_dir));
                (base, String::new(), pattern)
            };
            let segments: Vec<Vec<char>> = pattern_body
                .split('/')
                .map(|s| s.chars().collect())
                .collect();
            self.walk(&base, &rel_seed, &segments, params, out, &mut matched);
        }
        if matched {
            WildcardResult::Match
        } else if params.for_completions {
            // Echo the token back so the UI can keep what the user typed.
            out.push(Completion {
                text: literalize_wildcards(pattern),
                description: String::new(),
                flags: CompletionFlags {
                    replaces_token: true,
                    dont_escape_tildes: false,
                },
            });
            WildcardResult::NoMatch
        } else {
            WildcardResult::NoMatch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matcher() -> FsMatcher {
        let mut fs = InMemoryFs::new();
        fs.add_file("/work/file1");
        fs.add_file("/work/file2");
        fs.add_file("/work/file10");
        fs.add_file("/work/.hidden");
        fs.add_file("/work/src/main.rs");
        fs.add_file("/work/src/deep/inner.rs");
        fs.add_executable("/bin/grep");
        fs.add_file("/bin/README");
        FsMatcher::new(Arc::new(fs))
    }

    fn expand(pattern: &str, working_dir: &str, params: WildcardParams) -> (WildcardResult, Vec<String>) {
        let matcher = sample_matcher();
        let mut out = Vec::new();
        let result = matcher.expand(pattern, working_dir, &params, &mut out);
        (result, out.into_iter().map(|c| c.text).collect())
    }

    fn pattern(parts: &[&str]) -> String {
        // Join literal text with the star sentinel.
        parts.join(&ANY_STRING.to_string())
    }

    #[test]
    fn test_star_matches_in_working_dir() {
        let (result, texts) = expand(&pattern(&["file", ""]), "/work/", WildcardParams::default());
        assert_eq!(result, WildcardResult::Match);
        assert_eq!(texts.len(), 3);
        assert!(texts.contains(&"file1".to_string()));
        assert!(texts.contains(&"file10".to_string()));
    }

    #[test]
    fn test_no_match() {
        let (result, texts) = expand(&pattern(&["nope", ""]), "/work/", WildcardParams::default());
        assert_eq!(result, WildcardResult::NoMatch);
        assert!(texts.is_empty());
    }

    #[test]
    fn test_completion_no_match_echoes_token() {
        let params = WildcardParams {
            for_completions: true,
            ..Default::default()
        };
        let (result, texts) = expand(&pattern(&["nope", ""]), "/work/", params);
        assert_eq!(result, WildcardResult::NoMatch);
        assert_eq!(texts, vec!["nope*"]);
    }

    #[test]
    fn test_hidden_files_need_explicit_dot() {
        let (_, texts) = expand(&pattern(&["", ""]), "/work/", WildcardParams::default());
        assert!(!texts.iter().any(|t| t.starts_with('.')));
        let dotted = format!(".{}", ANY_STRING);
        let (_, texts) = expand(&dotted, "/work/", WildcardParams::default());
        assert_eq!(texts, vec![".hidden"]);
    }

    #[test]
    fn test_any_char() {
        let p = format!("file{}", ANY_CHAR);
        let (_, texts) = expand(&p, "/work/", WildcardParams::default());
        assert_eq!(texts, vec!["file1", "file2"]);
    }

    #[test]
    fn test_absolute_pattern() {
        let p = format!("/work/file{}", ANY_STRING);
        let (result, texts) = expand(&p, "", WildcardParams::default());
        assert_eq!(result, WildcardResult::Match);
        assert!(texts.contains(&"/work/file1".to_string()));
    }

    #[test]
    fn test_relative_pattern_without_working_dir() {
        let (result, texts) = expand(&pattern(&["file", ""]), "", WildcardParams::default());
        assert_eq!(result, WildcardResult::NoMatch);
        assert!(texts.is_empty());
    }

    #[test]
    fn test_multi_segment() {
        let p = format!("src/{}.rs", ANY_STRING);
        let (_, texts) = expand(&p, "/work", WildcardParams::default());
        assert_eq!(texts, vec!["src/main.rs"]);
    }

    #[test]
    fn test_recursive_wildcard() {
        let p = format!("{}/{}.rs", ANY_STRING_RECURSIVE, ANY_STRING);
        let (_, mut texts) = expand(&p, "/work", WildcardParams::default());
        texts.sort();
        assert_eq!(texts, vec!["src/deep/inner.rs", "src/main.rs"]);
    }

    #[test]
    fn test_executables_only() {
        let params = WildcardParams {
            executables_only: true,
            ..Default::default()
        };
        let p = ANY_STRING.to_string();
        let (_, texts) = expand(&p, "/bin/", params);
        assert_eq!(texts, vec!["grep"]);
    }

    #[test]
    fn test_completion_marks_replaces_token_and_dirs() {
        let matcher = sample_matcher();
        let mut out = Vec::new();
        let params = WildcardParams {
            for_completions: true,
            ..Default::default()
        };
        matcher.expand("sr", "/work/", &params, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "src/");
        assert!(out[0].flags.replaces_token);
        assert_eq!(out[0].description, "directory");
    }
}
