//! Command Substitution
//!
//! The first pipeline stage. Finds the leftmost top-level `(...)` region,
//! evaluates it through the subshell collaborator, applies an optional
//! slice to the output lines, and multiplies the result against every
//! expansion of the tail. Output lines are backslash-escaped so they pass
//! through the later unescape untouched.

use crate::completion::Completion;
use crate::errors::{
    append_cmdsubst_error, append_syntax_error, ParseErrorList, SOURCE_LOCATION_UNKNOWN,
};
use crate::escape::escape_string;
use crate::lexer::{locate_cmdsubst, CmdsubstSearch};
use crate::sentinels::INTERNAL_SEPARATOR;
use crate::subshell::STATUS_READ_TOO_MUCH;

use super::slices::{parse_slice, select_indexes};
use super::{ExpandContext, ExpandFlags, ExpandResult};

/// The pipeline stage entry point.
pub(crate) fn stage_cmdsubst(
    input: String,
    ctx: &ExpandContext,
    flags: ExpandFlags,
    out: &mut Vec<Completion>,
    errors: Option<&mut ParseErrorList>,
) -> ExpandResult {
    let chars: Vec<char> = input.chars().collect();
    if flags.skip_cmdsubst {
        return match locate_cmdsubst(&chars, true) {
            CmdsubstSearch::None => {
                out.push(Completion::new(input));
                ExpandResult::Ok
            }
            CmdsubstSearch::Found { begin, end } => {
                append_cmdsubst_error(
                    errors,
                    begin,
                    end - begin + 1,
                    "Command substitutions not allowed",
                );
                ExpandResult::Error
            }
            CmdsubstSearch::Incomplete { begin } => {
                append_cmdsubst_error(
                    errors,
                    begin,
                    chars.len() - begin,
                    "Command substitutions not allowed",
                );
                ExpandResult::Error
            }
            CmdsubstSearch::Mismatched => {
                append_cmdsubst_error(
                    errors,
                    SOURCE_LOCATION_UNKNOWN,
                    0,
                    "Command substitutions not allowed",
                );
                ExpandResult::Error
            }
        };
    }
    expand_cmdsubst(&chars, ctx, flags, out, errors)
}

/// Expand the first substitution of `chars`, recursing on the tail.
fn expand_cmdsubst(
    chars: &[char],
    ctx: &ExpandContext,
    flags: ExpandFlags,
    out: &mut Vec<Completion>,
    mut errors: Option<&mut ParseErrorList>,
) -> ExpandResult {
    let (paren_begin, paren_end) = match locate_cmdsubst(chars, false) {
        CmdsubstSearch::None => {
            out.push(Completion::new(chars.iter().collect::<String>()));
            return ExpandResult::Ok;
        }
        CmdsubstSearch::Found { begin, end } => (begin, end),
        CmdsubstSearch::Incomplete { .. } | CmdsubstSearch::Mismatched => {
            append_syntax_error(errors, SOURCE_LOCATION_UNKNOWN, 0, "Mismatched parenthesis");
            return ExpandResult::Error;
        }
    };

    let subcmd: String = chars[paren_begin + 1..paren_end].iter().collect();
    let Some(subshell) = ctx.subshell else {
        append_cmdsubst_error(
            errors,
            paren_begin,
            paren_end - paren_begin + 1,
            "Command substitutions not allowed",
        );
        return ExpandResult::Error;
    };

    let mut sub_res: Vec<String> = Vec::new();
    let status = subshell.exec_subshell(&subcmd, &mut sub_res, false, true);
    if status == -1 {
        append_cmdsubst_error(
            errors.as_deref_mut(),
            paren_begin,
            paren_end - paren_begin + 1,
            "Unknown error while evaluating command substitution",
        );
        return ExpandResult::Error;
    }
    if status == STATUS_READ_TOO_MUCH {
        append_cmdsubst_error(
            errors.as_deref_mut(),
            paren_begin,
            paren_end - paren_begin + 1,
            "Too much data emitted by command substitution so it was discarded",
        );
        return ExpandResult::Error;
    }

    // An optional slice right after the closing paren selects output lines;
    // out-of-range indices are silently dropped.
    let mut tail_begin = paren_end + 1;
    if chars.get(tail_begin) == Some(&'[') {
        match parse_slice(chars, tail_begin, sub_res.len()) {
            Err(bad_pos) => {
                append_syntax_error(errors.as_deref_mut(), bad_pos, 1, "Invalid index value");
                return ExpandResult::Error;
            }
            Ok(parsed) => {
                sub_res = select_indexes(&sub_res, &parsed.indexes);
                tail_begin = parsed.end;
            }
        }
    }

    // The tail may hold further substitutions.
    let mut tail_expand: Vec<Completion> = Vec::new();
    let tail: Vec<char> = chars[tail_begin..].to_vec();
    let tail_result = expand_cmdsubst(&tail, ctx, flags, &mut tail_expand, errors.as_deref_mut());
    if tail_result == ExpandResult::Error {
        return tail_result;
    }

    let prefix: String = chars[..paren_begin].iter().collect();
    for sub_item in &sub_res {
        let escaped = escape_string(sub_item);
        for tail_item in &tail_expand {
            let mut whole =
                String::with_capacity(prefix.len() + escaped.len() + tail_item.text.len() + 2);
            whole.push_str(&prefix);
            whole.push(INTERNAL_SEPARATOR);
            whole.push_str(&escaped);
            whole.push(INTERNAL_SEPARATOR);
            whole.push_str(&tail_item.text);
            out.push(Completion::new(whole));
        }
    }
    ExpandResult::Ok
}
