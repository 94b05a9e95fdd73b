//! Wildcard Stage
//!
//! The last pipeline stage. Scrubs the internal separators out of the
//! word, decides whether the wildcard matcher should run, assembles the
//! working-directory list (plain cwd, or `CDPATH`/`PATH` derived for the
//! cd/command special cases), and naturally sorts whatever matched.

use crate::completion::Completion;
use crate::matcher::{WildcardParams, WildcardResult};
use crate::natural::natural_compare;
use crate::path::apply_working_directory;
use crate::sentinels::{has_wildcard, remove_internal_separator};

use super::{ExpandContext, ExpandFlags, ExpandResult};

/// Compute the directories the matcher should search. The empty string in
/// a PATH list means "absolute paths only" and is preserved.
fn effective_working_dirs(
    path_to_expand: &str,
    ctx: &ExpandContext,
    flags: ExpandFlags,
) -> Vec<String> {
    let working_dir = ctx.vars.pwd_slash();
    let for_cd = flags.special_for_cd;
    let for_command = flags.special_for_command;
    if !for_cd && !for_command {
        return vec![working_dir];
    }

    // An anchored path never consults the search list; neither does a
    // command containing a slash.
    let anchored = path_to_expand.starts_with('/')
        || path_to_expand.starts_with("./")
        || path_to_expand.starts_with("../")
        || (for_command && path_to_expand.contains('/'));
    if anchored {
        return vec![working_dir];
    }

    let list_name = if for_cd { "CDPATH" } else { "PATH" };
    let mut paths: Vec<String> = ctx
        .vars
        .get(list_name)
        .map(|var| var.as_list().to_vec())
        .unwrap_or_default();
    if paths.is_empty() {
        paths = if for_cd {
            vec![".".to_string()]
        } else {
            vec![String::new()]
        };
    }
    paths
        .iter()
        .map(|p| apply_working_directory(p, &working_dir))
        .collect()
}

/// The pipeline stage entry point.
pub(crate) fn stage_wildcards(
    input: String,
    ctx: &ExpandContext,
    flags: ExpandFlags,
    out: &mut Vec<Completion>,
) -> ExpandResult {
    let path_to_expand = remove_internal_separator(&input, flags.skip_wildcards);
    let wildcard_present = has_wildcard(&path_to_expand);

    if wildcard_present && flags.executables_only {
        // Historical behavior: never glob when resolving executables.
        return ExpandResult::Ok;
    }

    let should_expand = (flags.for_completions && !flags.skip_wildcards) || wildcard_present;
    if !should_expand {
        if !flags.for_completions {
            out.push(Completion::new(path_to_expand));
        }
        // When completing, a skipped word is dropped silently.
        return ExpandResult::Ok;
    }

    let params = WildcardParams {
        for_completions: flags.for_completions,
        executables_only: flags.executables_only,
        no_descriptions: flags.no_descriptions,
    };
    let mut expanded: Vec<Completion> = Vec::new();
    let mut any_match = false;
    for dir in effective_working_dirs(&path_to_expand, ctx, flags) {
        match ctx.matcher.expand(&path_to_expand, &dir, &params, &mut expanded) {
            WildcardResult::Match => any_match = true,
            WildcardResult::NoMatch => {}
            WildcardResult::Cancel => return ExpandResult::Error,
        }
    }

    expanded.sort_by(|a, b| natural_compare(&a.text, &b.text));
    expanded.dedup_by(|a, b| a.text == b.text);
    out.append(&mut expanded);

    if any_match {
        ExpandResult::WildcardMatch
    } else if wildcard_present {
        ExpandResult::WildcardNoMatch
    } else {
        ExpandResult::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{FsMatcher, InMemoryFs, WildcardMatcher};
    use crate::sentinels::{ANY_STRING, INTERNAL_SEPARATOR};
    use crate::users::UserTable;
    use crate::vars::VarTable;
    use std::sync::Arc;

    fn sample_fs() -> InMemoryFs {
        let mut fs = InMemoryFs::new();
        fs.add_file("/cwd/file1");
        fs.add_file("/cwd/file10");
        fs.add_file("/cwd/file2");
        fs.add_dir("/proj/app");
        fs.add_executable("/bin/grep");
        fs
    }

    fn sample_vars() -> VarTable {
        let mut vars = VarTable::new();
        vars.set_one("PWD", "/cwd");
        vars
    }

    fn run(input: String, vars: &VarTable, flags: ExpandFlags) -> (ExpandResult, Vec<String>) {
        let users = UserTable::new();
        let matcher = FsMatcher::new(Arc::new(sample_fs()));
        let ctx = ExpandContext::new(vars, &users, &matcher);
        let mut out = Vec::new();
        let result = stage_wildcards(input, &ctx, flags, &mut out);
        (result, out.into_iter().map(|c| c.text).collect())
    }

    #[test]
    fn test_plain_word_passes_through() {
        let vars = sample_vars();
        let (result, texts) = run("word".to_string(), &vars, ExpandFlags::default());
        assert_eq!(result, ExpandResult::Ok);
        assert_eq!(texts, vec!["word"]);
    }

    #[test]
    fn test_separators_scrubbed() {
        let vars = sample_vars();
        let input = format!("wo{}rd", INTERNAL_SEPARATOR);
        let (_, texts) = run(input, &vars, ExpandFlags::default());
        assert_eq!(texts, vec!["word"]);
    }

    #[test]
    fn test_natural_sort_of_matches() {
        let vars = sample_vars();
        let input = format!("file{}", ANY_STRING);
        let (result, texts) = run(input, &vars, ExpandFlags::default());
        assert_eq!(result, ExpandResult::WildcardMatch);
        assert_eq!(texts, vec!["file1", "file2", "file10"]);
    }

    #[test]
    fn test_no_match_reported() {
        let vars = sample_vars();
        let input = format!("nope{}", ANY_STRING);
        let (result, texts) = run(input, &vars, ExpandFlags::default());
        assert_eq!(result, ExpandResult::WildcardNoMatch);
        assert!(texts.is_empty());
    }

    #[test]
    fn test_skip_wildcards_literalizes() {
        let vars = sample_vars();
        let input = format!("file{}", ANY_STRING);
        let flags = ExpandFlags {
            skip_wildcards: true,
            ..Default::default()
        };
        let (result, texts) = run(input, &vars, flags);
        assert_eq!(result, ExpandResult::Ok);
        assert_eq!(texts, vec!["file*"]);
    }

    #[test]
    fn test_executables_only_never_globs() {
        let vars = sample_vars();
        let input = format!("file{}", ANY_STRING);
        let flags = ExpandFlags {
            executables_only: true,
            ..Default::default()
        };
        let (result, texts) = run(input, &vars, flags);
        assert_eq!(result, ExpandResult::Ok);
        assert!(texts.is_empty());
    }

    #[test]
    fn test_cdpath_search() {
        let mut vars = sample_vars();
        vars.set("CDPATH", ["/proj"]);
        let input = format!("a{}", ANY_STRING);
        let flags = ExpandFlags {
            special_for_cd: true,
            ..Default::default()
        };
        let (result, texts) = run(input, &vars, flags);
        assert_eq!(result, ExpandResult::WildcardMatch);
        assert_eq!(texts, vec!["app"]);
    }

    #[test]
    fn test_cd_anchored_path_ignores_cdpath() {
        let mut vars = sample_vars();
        vars.set("CDPATH", ["/proj"]);
        let input = format!("./a{}", ANY_STRING);
        let flags = ExpandFlags {
            special_for_cd: true,
            ..Default::default()
        };
        let (result, _) = run(input, &vars, flags);
        assert_eq!(result, ExpandResult::WildcardNoMatch);
    }

    #[test]
    fn test_command_path_search() {
        let mut vars = sample_vars();
        vars.set("PATH", ["/bin"]);
        let input = format!("gr{}", ANY_STRING);
        let flags = ExpandFlags {
            special_for_command: true,
            ..Default::default()
        };
        let (result, texts) = run(input, &vars, flags);
        assert_eq!(result, ExpandResult::WildcardMatch);
        assert_eq!(texts, vec!["grep"]);
    }

    #[test]
    fn test_cancellation_surfaces_as_error() {
        struct CancellingMatcher;
        impl WildcardMatcher for CancellingMatcher {
            fn expand(
                &self,
                _pattern: &str,
                _working_dir: &str,
                _params: &WildcardParams,
                _out: &mut Vec<Completion>,
            ) -> WildcardResult {
                WildcardResult::Cancel
            }
        }
        let vars = sample_vars();
        let users = UserTable::new();
        let matcher = CancellingMatcher;
        let ctx = ExpandContext::new(&vars, &users, &matcher);
        let mut out = Vec::new();
        let input = format!("x{}", ANY_STRING);
        assert_eq!(
            stage_wildcards(input, &ctx, ExpandFlags::default(), &mut out),
            ExpandResult::Error
        );
    }
}
