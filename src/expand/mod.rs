//! Argument Expansion
//!
//! The five-stage pipeline that turns one raw argument token into the
//! concrete strings used for execution, completion, or assignment:
//!
//! 1. command substitution,
//! 2. unescape + variable substitution,
//! 3. brace expansion,
//! 4. home directory and `%self`,
//! 5. wildcard / path expansion.
//!
//! Each stage is a function from one in-flight string to a list of
//! completions; the driver here is the fold. A stage that multiplies a
//! word (variables, braces, substitutions) defines the product order, so
//! the Nth completion for a given input is deterministic.

pub mod braces;
pub mod cmdsubst;
pub mod home_self;
pub mod slices;
pub mod variables;
pub mod wildcards;

use crate::completion::Completion;
use crate::errors::ParseErrorList;
use crate::history::HistoryStore;
use crate::matcher::WildcardMatcher;
use crate::subshell::SubshellExecutor;
use crate::users::UserDatabase;
use crate::vars::VariableStore;

use braces::expand_braces;
use cmdsubst::stage_cmdsubst;
use home_self::{expand_tilde, home_directory_name, stage_home_and_self};
use variables::stage_variables;
use wildcards::stage_wildcards;

/// Caller-selected behavior for one expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandFlags {
    /// Produce completion candidates instead of execution arguments.
    pub for_completions: bool,
    /// Reject `(...)` regions instead of evaluating them.
    pub skip_cmdsubst: bool,
    /// Leave `$NAME` references as typed.
    pub skip_variables: bool,
    /// Treat wildcard characters literally.
    pub skip_wildcards: bool,
    /// Leave a leading `~` as typed.
    pub skip_home_directories: bool,
    /// Leave `%self` as typed.
    pub skip_jobs: bool,
    /// Only executables are wildcard candidates.
    pub executables_only: bool,
    /// Leave completion descriptions empty.
    pub no_descriptions: bool,
    /// Search `CDPATH` for relative patterns.
    pub special_for_cd: bool,
    /// Search `PATH` for slash-free patterns.
    pub special_for_command: bool,
}

/// Outcome of an expansion or of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandResult {
    Ok,
    /// A wildcard was present and nothing on disk matched it.
    WildcardNoMatch,
    /// A wildcard was present and matched.
    WildcardMatch,
    Error,
}

/// The collaborators one expansion runs against. The core holds no state
/// of its own; everything it consults lives behind these borrows.
pub struct ExpandContext<'a> {
    pub vars: &'a dyn VariableStore,
    pub users: &'a dyn UserDatabase,
    pub matcher: &'a dyn WildcardMatcher,
    /// Only supplied on the interactive thread; `$history` is otherwise
    /// treated as absent.
    pub history: Option<&'a dyn HistoryStore>,
    /// Absent when the caller cannot evaluate subshells.
    pub subshell: Option<&'a dyn SubshellExecutor>,
    /// The shell's process id, substituted for `%self`.
    pub process_id: u32,
}

impl<'a> ExpandContext<'a> {
    pub fn new(
        vars: &'a dyn VariableStore,
        users: &'a dyn UserDatabase,
        matcher: &'a dyn WildcardMatcher,
    ) -> Self {
        Self {
            vars,
            users,
            matcher,
            history: None,
            subshell: None,
            process_id: std::process::id(),
        }
    }

    pub fn with_subshell(mut self, subshell: &'a dyn SubshellExecutor) -> Self {
        self.subshell = Some(subshell);
        self
    }

    pub fn with_history(mut self, history: &'a dyn HistoryStore) -> Self {
        self.history = Some(history);
        self
    }
}

/// Characters that disqualify the fast path in first position only.
const UNCLEAN_FIRST: &str = "~%";
/// Characters that disqualify the fast path anywhere.
const UNCLEAN: &str = "$*?\\\"'({})";

/// A clean string expands to itself; the pipeline can be skipped.
pub fn expand_is_clean(input: &str) -> bool {
    let Some(first) = input.chars().next() else {
        return true;
    };
    if UNCLEAN_FIRST.contains(first) {
        return false;
    }
    !input.chars().any(|c| UNCLEAN.contains(c))
}

#[derive(Clone, Copy)]
enum Stage {
    Cmdsubst,
    Variables,
    Braces,
    HomeAndSelf,
    Wildcards,
}

const STAGES: [Stage; 5] = [
    Stage::Cmdsubst,
    Stage::Variables,
    Stage::Braces,
    Stage::HomeAndSelf,
    Stage::Wildcards,
];

/// Run the full pipeline without the fast path.
fn expand_string_slow(
    input: &str,
    out_completions: &mut Vec<Completion>,
    flags: ExpandFlags,
    ctx: &ExpandContext,
    mut errors: Option<&mut ParseErrorList>,
) -> ExpandResult {
    let mut completions = vec![Completion::new(input)];
    let mut total = ExpandResult::Ok;
    for stage in STAGES {
        let mut next: Vec<Completion> = Vec::new();
        for comp in completions.drain(..) {
            let this_result = match stage {
                Stage::Cmdsubst => {
                    stage_cmdsubst(comp.text, ctx, flags, &mut next, errors.as_deref_mut())
                }
                Stage::Variables => {
                    stage_variables(comp.text, ctx, flags, &mut next, errors.as_deref_mut())
                }
                Stage::Braces => expand_braces(comp.text, flags, &mut next, errors.as_deref_mut()),
                Stage::HomeAndSelf => stage_home_and_self(comp.text, ctx, flags, &mut next),
                Stage::Wildcards => stage_wildcards(comp.text, ctx, flags, &mut next),
            };
            match this_result {
                ExpandResult::Error => return ExpandResult::Error,
                ExpandResult::WildcardMatch => total = ExpandResult::WildcardMatch,
                ExpandResult::WildcardNoMatch => {
                    // A match earlier in the same stage is never masked.
                    if total != ExpandResult::WildcardMatch {
                        total = ExpandResult::WildcardNoMatch;
                    }
                }
                ExpandResult::Ok => {}
            }
        }
        completions = next;
    }
    if !flags.skip_home_directories {
        unexpand_tildes(input, ctx, &mut completions);
    }
    out_completions.append(&mut completions);
    total
}

/// Expand one argument token into a list of completions.
pub fn expand_string(
    input: &str,
    out_completions: &mut Vec<Completion>,
    flags: ExpandFlags,
    ctx: &ExpandContext,
    errors: Option<&mut ParseErrorList>,
) -> ExpandResult {
    // Fast path: nothing to do for a clean execution-mode token.
    if !flags.for_completions && expand_is_clean(input) {
        out_completions.push(Completion::new(input));
        return ExpandResult::Ok;
    }
    expand_string_slow(input, out_completions, flags, ctx, errors)
}

/// Expand a token expected to produce exactly one result, in place.
pub fn expand_one(
    token: &mut String,
    flags: ExpandFlags,
    ctx: &ExpandContext,
    errors: Option<&mut ParseErrorList>,
) -> bool {
    if !flags.for_completions && expand_is_clean(token) {
        return true;
    }
    let mut completions = Vec::new();
    if expand_string(token, &mut completions, flags, ctx, errors) == ExpandResult::Error {
        return false;
    }
    if completions.len() != 1 {
        return false;
    }
    *token = completions.remove(0).text;
    true
}

/// Expand a token into a command and its leading arguments. Substitutions
/// stay unevaluated here; a token carrying one is an error.
pub fn expand_to_command_and_args(
    input: &str,
    ctx: &ExpandContext,
    out_cmd: &mut String,
    out_args: &mut Vec<String>,
    errors: Option<&mut ParseErrorList>,
) -> ExpandResult {
    if expand_is_clean(input) {
        *out_cmd = input.to_string();
        return ExpandResult::Ok;
    }
    let eflags = ExpandFlags {
        skip_cmdsubst: true,
        no_descriptions: true,
        skip_jobs: true,
        ..Default::default()
    };
    let mut completions = Vec::new();
    let result = expand_string(input, &mut completions, eflags, ctx, errors);
    if matches!(result, ExpandResult::Ok | ExpandResult::WildcardMatch) {
        let mut iter = completions.into_iter();
        if let Some(first) = iter.next() {
            *out_cmd = first.text;
        }
        out_args.extend(iter.map(|c| c.text));
    }
    result
}

/// After the pipeline, restore the user's `~` spelling on completions that
/// replace the token, so completion never rewrites what was typed.
fn unexpand_tildes(input: &str, ctx: &ExpandContext, completions: &mut [Completion]) {
    if !input.starts_with('~') {
        return;
    }
    if !completions.iter().any(|c| c.flags.replaces_token) {
        return;
    }
    let (username, _) = home_directory_name(input);
    let username_with_tilde = format!("~{}", username);
    let mut home = username_with_tilde.clone();
    expand_tilde(&mut home, ctx);
    if home.is_empty() {
        return;
    }
    for comp in completions.iter_mut() {
        if comp.flags.replaces_token && comp.text.starts_with(&home) {
            comp.text = format!("{}{}", username_with_tilde, &comp.text[home.len()..]);
            comp.flags.dont_escape_tildes = true;
        }
    }
}
