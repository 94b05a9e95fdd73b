//! Variable Expansion
//!
//! The second pipeline stage: a reversible unescape into sentinel form,
//! then right-to-left substitution of variable markers. Scanning backward
//! makes the recursion natural — find the last marker, reduce it, recurse
//! on the remainder — and gives compound words like `$a$b` their cartesian
//! product in the right order.

use crate::completion::Completion;
use crate::errors::{append_syntax_error, ParseErrorList, SOURCE_LOCATION_UNKNOWN};
use crate::escape::{unescape_string, UnescapeFlags};
use crate::lexer::valid_var_name_char;
use crate::sentinels::{
    INTERNAL_SEPARATOR, VARIABLE_EXPAND, VARIABLE_EXPAND_EMPTY, VARIABLE_EXPAND_SINGLE,
};
use crate::history::HistoryStore;
use crate::vars::EnvVar;

use super::slices::{parse_slice, select_indexes};
use super::{ExpandContext, ExpandFlags, ExpandResult};

/// The variable name that routes to the history collaborator.
const HISTORY_VARIABLE: &str = "history";

/// Where a name resolved to.
enum Source<'a> {
    History(&'a dyn HistoryStore),
    Var(EnvVar),
    Missing,
}

/// The pipeline stage: unescape, then substitute.
pub(crate) fn stage_variables(
    input: String,
    ctx: &ExpandContext,
    flags: ExpandFlags,
    out: &mut Vec<Completion>,
    errors: Option<&mut ParseErrorList>,
) -> ExpandResult {
    let Some(unescaped) = unescape_string(&input, UnescapeFlags::special_incomplete()) else {
        append_syntax_error(errors, SOURCE_LOCATION_UNKNOWN, 0, "Unexpected end of string");
        return ExpandResult::Error;
    };

    if flags.skip_variables {
        // Put the dollars back; later stages must see what the user typed.
        let restored: String = unescaped
            .chars()
            .map(|c| {
                if c == VARIABLE_EXPAND || c == VARIABLE_EXPAND_SINGLE {
                    '$'
                } else {
                    c
                }
            })
            .collect();
        out.push(Completion::new(restored));
        return ExpandResult::Ok;
    }

    let chars: Vec<char> = unescaped.chars().collect();
    let last_idx = chars.len().saturating_sub(1);
    expand_variables(chars, out, last_idx, ctx, errors)
}

/// Substitute the last variable marker at or before `last_idx`, recursing
/// on every produced string. A string with no marker left is final.
fn expand_variables(
    instr: Vec<char>,
    out: &mut Vec<Completion>,
    last_idx: usize,
    ctx: &ExpandContext,
    mut errors: Option<&mut ParseErrorList>,
) -> ExpandResult {
    let len = instr.len();
    let mut marker: Option<usize> = None;
    if len > 0 {
        let mut i = last_idx.min(len - 1) as isize;
        while i >= 0 {
            let c = instr[i as usize];
            if c == VARIABLE_EXPAND || c == VARIABLE_EXPAND_SINGLE {
                marker = Some(i as usize);
                break;
            }
            i -= 1;
        }
    }
    let Some(varexp_idx) = marker else {
        out.push(Completion::new(instr.into_iter().collect::<String>()));
        return ExpandResult::Ok;
    };
    let is_single = instr[varexp_idx] == VARIABLE_EXPAND_SINGLE;

    // Read the name: a run of name characters, or a terminating
    // empty-name marker left behind by an earlier reduction.
    let name_start = varexp_idx + 1;
    let mut name_stop = name_start;
    while name_stop < len {
        let nc = instr[name_stop];
        if nc == VARIABLE_EXPAND_EMPTY {
            name_stop += 1;
            break;
        }
        if !valid_var_name_char(nc) {
            break;
        }
        name_stop += 1;
    }
    if name_stop == name_start {
        append_syntax_error(
            errors,
            varexp_idx,
            1,
            "Expected a variable name after this $",
        );
        return ExpandResult::Error;
    }
    let is_empty_marker =
        name_stop - name_start == 1 && instr[name_start] == VARIABLE_EXPAND_EMPTY;
    let var_name: String = instr[name_start..name_stop].iter().collect();

    let source = if is_empty_marker {
        Source::Missing
    } else if var_name == HISTORY_VARIABLE {
        // Off the interactive thread there is no history collaborator and
        // the variable is treated as absent.
        match ctx.history {
            Some(history) => Source::History(history),
            None => Source::Missing,
        }
    } else {
        match ctx.vars.get(&var_name) {
            Some(var) => Source::Var(var),
            None => Source::Missing,
        }
    };

    // A missing variable still admits a slice; it checks against length 1
    // so `$unset[1]` stays syntactically valid.
    let effective_len = match &source {
        Source::History(history) => history.size(),
        Source::Var(var) => var.as_list().len(),
        Source::Missing => 1,
    };

    let mut region_stop = name_stop;
    let mut slice_indexes: Option<Vec<i64>> = None;
    if instr.get(name_stop) == Some(&'[') {
        match parse_slice(&instr, name_stop, effective_len) {
            Err(bad_pos) => {
                append_syntax_error(errors.as_deref_mut(), bad_pos, 1, "Invalid index value");
                return ExpandResult::Error;
            }
            Ok(parsed) => {
                slice_indexes = Some(parsed.indexes);
                region_stop = parsed.end;
            }
        }
    }

    let delimiter = match &source {
        Source::History(_) => ' ',
        Source::Var(var) => var.delimiter(),
        Source::Missing => ' ',
    };

    let items: Option<Vec<String>> = match &source {
        Source::Missing => None,
        Source::History(history) => {
            match &slice_indexes {
                None => Some(history.get_history()),
                Some(indexes) => {
                    let wanted: Vec<usize> = indexes
                        .iter()
                        .filter(|&&i| i >= 1)
                        .map(|&i| i as usize)
                        .collect();
                    let found = history.items_at_indexes(&wanted);
                    Some(
                        indexes
                            .iter()
                            .filter_map(|&i| {
                                if i >= 1 {
                                    found.get(&(i as usize)).cloned()
                                } else {
                                    None
                                }
                            })
                            .collect(),
                    )
                }
            }
        }
        Source::Var(var) => {
            let list = var.as_list().to_vec();
            match &slice_indexes {
                None => Some(list),
                Some(indexes) => Some(select_indexes(&list, indexes)),
            }
        }
    };

    match items {
        None => {
            if is_single {
                // Keep a placeholder so the quoted word survives as an
                // empty string instead of vanishing. The separator stops
                // the splice point from merging into an unreduced name
                // run on the left.
                let mut res: Vec<char> = instr[..varexp_idx].to_vec();
                if let Some(&last) = res.last() {
                    if last != VARIABLE_EXPAND_SINGLE {
                        res.push(INTERNAL_SEPARATOR);
                    } else {
                        res.push(VARIABLE_EXPAND_EMPTY);
                    }
                }
                res.extend_from_slice(&instr[region_stop..]);
                expand_variables(res, out, varexp_idx, ctx, errors)
            } else {
                // Unquoted: the whole argument expands to nothing.
                ExpandResult::Ok
            }
        }
        Some(item_list) => {
            if is_single {
                let joined = item_list.join(&delimiter.to_string());
                let mut res: Vec<char> = instr[..varexp_idx].to_vec();
                if let Some(&last) = res.last() {
                    if last != VARIABLE_EXPAND_SINGLE {
                        res.push(INTERNAL_SEPARATOR);
                    } else if joined.is_empty() {
                        res.push(VARIABLE_EXPAND_EMPTY);
                    }
                }
                res.extend(joined.chars());
                res.extend_from_slice(&instr[region_stop..]);
                expand_variables(res, out, varexp_idx, ctx, errors)
            } else {
                for item in &item_list {
                    let mut new_in: Vec<char> = instr[..varexp_idx].to_vec();
                    if let Some(&last) = new_in.last() {
                        if last != VARIABLE_EXPAND {
                            new_in.push(INTERNAL_SEPARATOR);
                        } else if item.is_empty() {
                            // Keep the preceding marker live so an empty
                            // value inside a compound still re-expands.
                            new_in.push(VARIABLE_EXPAND_EMPTY);
                        }
                    }
                    new_in.extend(item.chars());
                    new_in.extend_from_slice(&instr[region_stop..]);
                    let result =
                        expand_variables(new_in, out, varexp_idx, ctx, errors.as_deref_mut());
                    if result == ExpandResult::Error {
                        return result;
                    }
                }
                ExpandResult::Ok
            }
        }
    }
}
