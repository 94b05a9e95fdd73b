//! Brace Expansion
//!
//! Splits the first top-level `{a,b,c}` group and recurses so nested
//! groups expand too. The stage only sees brace *sentinels*; braces the
//! user quoted were never converted and pass through as plain text.

use crate::completion::Completion;
use crate::errors::{append_syntax_error, ParseErrorList, SOURCE_LOCATION_UNKNOWN};
use crate::sentinels::{BRACE_BEGIN, BRACE_END, BRACE_SEP, BRACE_SPACE};

use super::{ExpandFlags, ExpandResult};

/// Expand the first top-level brace group of `input` into `out`, one
/// completion per item, recursing on each result.
pub(crate) fn expand_braces(
    input: String,
    flags: ExpandFlags,
    out: &mut Vec<Completion>,
    mut errors: Option<&mut ParseErrorList>,
) -> ExpandResult {
    let chars: Vec<char> = input.chars().collect();

    // Locate the first non-nested group and the last top-level separator.
    let mut depth: i32 = 0;
    let mut syntax_error = false;
    let mut brace_begin: Option<usize> = None;
    let mut brace_end: Option<usize> = None;
    let mut last_sep: Option<usize> = None;
    for (pos, &c) in chars.iter().enumerate() {
        match c {
            BRACE_BEGIN => {
                if depth == 0 && brace_begin.is_none() {
                    brace_begin = Some(pos);
                }
                depth += 1;
            }
            BRACE_END => {
                depth -= 1;
                if depth < 0 {
                    syntax_error = true;
                    break;
                }
                if depth == 0 && brace_end.is_none() {
                    brace_end = Some(pos);
                }
            }
            BRACE_SEP => {
                if depth == 1 {
                    last_sep = Some(pos);
                }
            }
            _ => {}
        }
    }

    if !syntax_error && depth > 0 {
        if !flags.for_completions {
            syntax_error = true;
        } else {
            // The user has not typed the closing brace yet. Make one up,
            // keeping only the item after the last separator, and expand
            // that. Command substitution stays off in the retry.
            let begin = brace_begin.unwrap_or(0);
            let mut synthesized = String::new();
            if let Some(sep) = last_sep {
                synthesized.extend(&chars[..=begin]);
                synthesized.extend(&chars[sep + 1..]);
            } else {
                synthesized.extend(&chars);
            }
            synthesized.push(BRACE_END);
            let retry_flags = ExpandFlags {
                skip_cmdsubst: true,
                ..flags
            };
            return expand_braces(synthesized, retry_flags, out, errors);
        }
    }

    if syntax_error {
        append_syntax_error(errors, SOURCE_LOCATION_UNKNOWN, 0, "Mismatched braces");
        return ExpandResult::Error;
    }

    let (Some(begin), Some(end)) = (brace_begin, brace_end) else {
        // No group left, the string is final.
        out.push(Completion::new(input));
        return ExpandResult::Ok;
    };

    // Split the group body on top-level separators and emit
    // prefix + item + suffix for each piece.
    let prefix = &chars[..begin];
    let suffix = &chars[end + 1..];
    let mut depth = 0i32;
    let mut item_begin = begin + 1;
    for pos in begin + 1..=end {
        let c = chars[pos];
        if depth == 0 && (c == BRACE_SEP || pos == end) {
            let item = trim_brace_space(&chars[item_begin..pos]);
            let mut whole: String = prefix.iter().collect();
            whole.extend(item);
            whole.extend(suffix);
            let result = expand_braces(whole, flags, out, errors.as_deref_mut());
            if result == ExpandResult::Error {
                return result;
            }
            item_begin = pos + 1;
        }
        match c {
            BRACE_BEGIN => depth += 1,
            BRACE_END => depth -= 1,
            _ => {}
        }
    }
    ExpandResult::Ok
}

/// Trim `BRACE_SPACE` from the margins of an item and make the interior
/// ones literal spaces.
fn trim_brace_space(item: &[char]) -> Vec<char> {
    let start = item
        .iter()
        .position(|&c| c != BRACE_SPACE)
        .unwrap_or(item.len());
    let stop = item
        .iter()
        .rposition(|&c| c != BRACE_SPACE)
        .map(|p| p + 1)
        .unwrap_or(start);
    item[start..stop]
        .iter()
        .map(|&c| if c == BRACE_SPACE { ' ' } else { c })
        .collect()
}
