//! Slice Parsing
//!
//! The `[...]` index expression shared by variable and command-substitution
//! expansion. Indices are 1-based; negative values count from the end, so
//! `-1` is the last element. A literal `0` anywhere is an error, reported
//! at its own offset.

use crate::sentinels::INTERNAL_SEPARATOR;

/// A parsed slice: the selected 1-based indices in order (possibly
/// repeated or reversed) and the offset just past the closing `]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSlice {
    pub indexes: Vec<i64>,
    pub end: usize,
}

fn skip_blank(chars: &[char], mut pos: usize) -> usize {
    while pos < chars.len() && (chars[pos].is_whitespace() || chars[pos] == INTERNAL_SEPARATOR) {
        pos += 1;
    }
    pos
}

/// Read a signed integer. Returns the value and the position just past it,
/// or Err at the token's offset when it is missing, malformed, or zero.
fn read_index(chars: &[char], pos: usize) -> Result<(i64, usize), usize> {
    let start = pos;
    let mut cursor = pos;
    let negative = match chars.get(cursor) {
        Some('-') => {
            cursor += 1;
            true
        }
        Some('+') => {
            cursor += 1;
            false
        }
        _ => false,
    };
    let digits_start = cursor;
    let mut value: i64 = 0;
    while let Some(d) = chars.get(cursor).and_then(|c| c.to_digit(10)) {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(d as i64))
            .ok_or(start)?;
        cursor += 1;
    }
    if cursor == digits_start {
        return Err(start);
    }
    if value == 0 {
        return Err(start);
    }
    Ok((if negative { -value } else { value }, cursor))
}

/// Parse the slice starting at `pos` (the `[`) against a collection of
/// `array_size` elements. Returns Err with the offset of the bad token.
pub fn parse_slice(chars: &[char], pos: usize, array_size: usize) -> Result<ParsedSlice, usize> {
    debug_assert_eq!(chars.get(pos), Some(&'['));
    let size = array_size as i64;
    let mut indexes = Vec::new();
    let mut cursor = pos + 1;
    loop {
        cursor = skip_blank(chars, cursor);
        match chars.get(cursor) {
            None => return Err(cursor),
            Some(']') => {
                cursor += 1;
                break;
            }
            Some(_) => {}
        }
        let (first, after_first) = read_index(chars, cursor)?;
        let first_negative = first < 0;
        let i1 = if first_negative { size + first + 1 } else { first };
        cursor = skip_blank(chars, after_first);
        if chars.get(cursor) == Some(&'.') && chars.get(cursor + 1) == Some(&'.') {
            cursor = skip_blank(chars, cursor + 2);
            let (second, after_second) = read_index(chars, cursor)?;
            let second_negative = second < 0;
            let mut i2 = if second_negative { size + second + 1 } else { second };
            cursor = after_second;
            // A range lying entirely past the end selects nothing.
            if i1 > size && i2 > size {
                continue;
            }
            let mut i1 = i1;
            let direction: i64;
            if first_negative != second_negative {
                // One negative endpoint fixes the direction, so a range
                // like [2..-1] keeps counting forward on short arrays.
                direction = if first_negative { -1 } else { 1 };
            } else {
                direction = if i2 < i1 { -1 } else { 1 };
                i1 = i1.min(size);
                i2 = i2.min(size);
            }
            let mut j = i1;
            while j * direction <= i2 * direction {
                indexes.push(j);
                j += direction;
            }
            continue;
        }
        indexes.push(i1);
    }
    Ok(ParsedSlice {
        indexes,
        end: cursor,
    })
}

/// Select the elements of `items` named by 1-based `indexes`, silently
/// dropping anything out of range.
pub fn select_indexes<T: Clone>(items: &[T], indexes: &[i64]) -> Vec<T> {
    let mut selected = Vec::with_capacity(indexes.len());
    for &idx in indexes {
        if idx >= 1 && (idx as usize) <= items.len() {
            selected.push(items[idx as usize - 1].clone());
        }
    }
    selected
}
