//! Home Directory and Process Self
//!
//! Resolves a leading `HOME_DIRECTORY` sentinel to the current or named
//! user's home, and a leading `PROCESS_EXPAND_SELF` to the shell's process
//! id. Runs once per completion, after brace expansion has produced the
//! final word shapes.

use crate::completion::Completion;
use crate::path::normalize_path;
use crate::sentinels::{HOME_DIRECTORY, PROCESS_EXPAND_SELF};

use super::{ExpandContext, ExpandFlags, ExpandResult};

/// Split a sentinel-form tilde word into the username and the index of the
/// tail (the first `/`, or the end of the word). An empty username means
/// the current user.
pub(crate) fn home_directory_name(input: &str) -> (String, usize) {
    let chars: Vec<char> = input.chars().collect();
    debug_assert!(matches!(chars.first(), Some(&HOME_DIRECTORY) | Some(&'~')));
    let tail_idx = chars
        .iter()
        .position(|&c| c == '/')
        .unwrap_or(chars.len());
    (chars[1..tail_idx].iter().collect(), tail_idx)
}

/// Resolve a leading `HOME_DIRECTORY` in place.
pub(crate) fn expand_home_directory(input: &mut String, ctx: &ExpandContext) {
    if !input.starts_with(HOME_DIRECTORY) {
        return;
    }
    let (username, tail_idx) = home_directory_name(input);
    let chars: Vec<char> = input.chars().collect();
    let tail: String = chars[tail_idx..].iter().collect();

    let home = if username.is_empty() {
        match ctx.vars.get("HOME") {
            Some(var) if !var.missing_or_empty() => Some(var.as_string()),
            // An unset or empty HOME collapses the whole word.
            _ => {
                input.clear();
                return;
            }
        }
    } else {
        ctx.users.home_dir(&username)
    };

    match home {
        Some(home) => {
            *input = format!("{}{}", normalize_path(&home), tail);
        }
        None => {
            // Unknown user: restore the literal tilde.
            let mut restored = String::with_capacity(input.len());
            restored.push('~');
            restored.extend(chars[1..].iter());
            *input = restored;
        }
    }
}

/// Resolve a leading literal `~` the same way the pipeline would. Used by
/// the post-pipeline tilde un-expander.
pub(crate) fn expand_tilde(input: &mut String, ctx: &ExpandContext) {
    if input.starts_with('~') {
        let mut sentinel_form = String::with_capacity(input.len());
        sentinel_form.push(HOME_DIRECTORY);
        sentinel_form.extend(input.chars().skip(1));
        *input = sentinel_form;
        expand_home_directory(input, ctx);
    }
}

/// Replace a leading `PROCESS_EXPAND_SELF` with the process id.
pub(crate) fn expand_percent_self(input: &mut String, ctx: &ExpandContext) {
    if input.starts_with(PROCESS_EXPAND_SELF) {
        let rest: String = input.chars().skip(1).collect();
        *input = format!("{}{}", ctx.process_id, rest);
    }
}

/// Replace a leading sentinel with its literal spelling. No sentinel may
/// survive past this stage, so a skipped rewrite still restores the text.
fn restore_literal(input: &mut String, sentinel: char, literal: &str) {
    if input.starts_with(sentinel) {
        let rest: String = input.chars().skip(1).collect();
        *input = format!("{}{}", literal, rest);
    }
}

/// The pipeline stage: both rewrites, then pass the word along.
pub(crate) fn stage_home_and_self(
    mut input: String,
    ctx: &ExpandContext,
    flags: ExpandFlags,
    out: &mut Vec<Completion>,
) -> ExpandResult {
    if flags.skip_home_directories {
        restore_literal(&mut input, HOME_DIRECTORY, "~");
    } else {
        expand_home_directory(&mut input, ctx);
    }
    if flags.skip_jobs {
        restore_literal(&mut input, PROCESS_EXPAND_SELF, "%self");
    } else {
        expand_percent_self(&mut input, ctx);
    }
    out.push(Completion::new(input));
    ExpandResult::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{FsMatcher, InMemoryFs};
    use crate::users::UserTable;
    use crate::vars::VarTable;
    use std::sync::Arc;

    fn run(input: String, vars: &VarTable, users: &UserTable) -> Vec<String> {
        let matcher = FsMatcher::new(Arc::new(InMemoryFs::new()));
        let mut ctx = ExpandContext::new(vars, users, &matcher);
        ctx.process_id = 4321;
        let mut out = Vec::new();
        let result = stage_home_and_self(input, &ctx, ExpandFlags::default(), &mut out);
        assert_eq!(result, ExpandResult::Ok);
        out.into_iter().map(|c| c.text).collect()
    }

    #[test]
    fn test_bare_tilde() {
        let mut vars = VarTable::new();
        vars.set_one("HOME", "/u/me");
        let users = UserTable::new();
        assert_eq!(run(HOME_DIRECTORY.to_string(), &vars, &users), vec!["/u/me"]);
    }

    #[test]
    fn test_tilde_with_tail() {
        let mut vars = VarTable::new();
        vars.set_one("HOME", "/u/me/");
        let users = UserTable::new();
        let input = format!("{}/x", HOME_DIRECTORY);
        assert_eq!(run(input, &vars, &users), vec!["/u/me/x"]);
    }

    #[test]
    fn test_missing_home_collapses_word() {
        let vars = VarTable::new();
        let users = UserTable::new();
        let input = format!("{}/x", HOME_DIRECTORY);
        assert_eq!(run(input, &vars, &users), vec![""]);
    }

    #[test]
    fn test_named_user() {
        let vars = VarTable::new();
        let mut users = UserTable::new();
        users.insert("alice", "/home/alice");
        let input = format!("{}alice/docs", HOME_DIRECTORY);
        assert_eq!(run(input, &vars, &users), vec!["/home/alice/docs"]);
    }

    #[test]
    fn test_unknown_user_restores_tilde() {
        let vars = VarTable::new();
        let users = UserTable::new();
        let input = format!("{}foo/x", HOME_DIRECTORY);
        assert_eq!(run(input, &vars, &users), vec!["~foo/x"]);
    }

    #[test]
    fn test_home_path_normalized() {
        let mut vars = VarTable::new();
        vars.set_one("HOME", "/u//me/./sub/..");
        let users = UserTable::new();
        let input = format!("{}/x", HOME_DIRECTORY);
        assert_eq!(run(input, &vars, &users), vec!["/u/me/x"]);
    }

    #[test]
    fn test_percent_self() {
        let vars = VarTable::new();
        let users = UserTable::new();
        let input = PROCESS_EXPAND_SELF.to_string();
        assert_eq!(run(input, &vars, &users), vec!["4321"]);
    }

    #[test]
    fn test_skip_flags_restore_literals() {
        let mut vars = VarTable::new();
        vars.set_one("HOME", "/u/me");
        let users = UserTable::new();
        let matcher = FsMatcher::new(Arc::new(InMemoryFs::new()));
        let ctx = ExpandContext::new(&vars, &users, &matcher);
        let flags = ExpandFlags {
            skip_home_directories: true,
            skip_jobs: true,
            ..Default::default()
        };
        let mut out = Vec::new();
        stage_home_and_self(format!("{}/x", HOME_DIRECTORY), &ctx, flags, &mut out);
        stage_home_and_self(PROCESS_EXPAND_SELF.to_string(), &ctx, flags, &mut out);
        assert_eq!(out[0].text, "~/x");
        assert_eq!(out[1].text, "%self");
    }

    #[test]
    fn test_not_first_position_untouched() {
        let vars = VarTable::new();
        let users = UserTable::new();
        assert_eq!(run("plain".to_string(), &vars, &users), vec!["plain"]);
    }
}
